//! Input decoding and sentence streams
//!
//! Sources are read as raw bytes one line at a time and decoded with the
//! configured encoding. A malformed byte sequence stops the run with an
//! encoding error instead of being replaced.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};

use encoding_rs::Encoding;

use oie_core::{InputSource, OieError, Result};
use oie_parser::Segmenter;

/// Open a source for line-oriented reading
pub fn open_source(source: &InputSource) -> Result<Box<dyn BufRead>> {
    match source {
        InputSource::Stdin => Ok(Box::new(std::io::stdin().lock())),
        InputSource::File(path) => {
            let file = File::open(path)?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Lines of a reader decoded with a fixed encoding, without line terminators
pub struct DecodedLines<R> {
    reader: R,
    encoding: &'static Encoding,
    source_name: String,
    buffer: Vec<u8>,
    line: usize,
    failed: bool,
}

impl<R: BufRead> DecodedLines<R> {
    pub fn new(reader: R, encoding: &'static Encoding, source_name: impl Into<String>) -> Self {
        Self {
            reader,
            encoding,
            source_name: source_name.into(),
            buffer: Vec::new(),
            line: 0,
            failed: false,
        }
    }

    fn decode(&self, mut bytes: &[u8]) -> Result<String> {
        if let Some(stripped) = bytes.strip_suffix(b"\n") {
            bytes = stripped;
        }
        if let Some(stripped) = bytes.strip_suffix(b"\r") {
            bytes = stripped;
        }
        if self.line == 1 && self.encoding == encoding_rs::UTF_8 {
            bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        }

        self.encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
            .ok_or_else(|| OieError::EncodingError {
                source_name: format!("{} (line {})", self.source_name, self.line),
                encoding: self.encoding.name().to_string(),
            })
    }
}

impl<R: BufRead> Iterator for DecodedLines<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        self.buffer.clear();
        let item = match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => return None,
            Ok(_) => {
                self.line += 1;
                self.decode(&self.buffer)
            }
            Err(e) => Err(e.into()),
        };

        self.failed = item.is_err();
        Some(item)
    }
}

/// Sentences re-segmented across line boundaries
///
/// A sentence is released once the segmenter sees its end; an unterminated
/// tail waits for the next line. Blank lines and the end of input flush
/// whatever is buffered.
pub struct SegmentedLines<'a, I> {
    lines: I,
    segmenter: &'a dyn Segmenter,
    buffer: String,
    ready: VecDeque<String>,
    done: bool,
}

impl<'a, I> SegmentedLines<'a, I>
where
    I: Iterator<Item = Result<String>>,
{
    pub fn new(lines: I, segmenter: &'a dyn Segmenter) -> Self {
        Self {
            lines,
            segmenter,
            buffer: String::new(),
            ready: VecDeque::new(),
            done: false,
        }
    }

    fn flush(&mut self) {
        let text = std::mem::take(&mut self.buffer);
        self.ready.extend(self.segmenter.segment(&text));
    }

    fn push_line(&mut self, line: &str) {
        if line.trim().is_empty() {
            self.flush();
            return;
        }

        if !self.buffer.is_empty() {
            self.buffer.push(' ');
        }
        self.buffer.push_str(line.trim());

        if self.segmenter.ends_sentence(&self.buffer) {
            self.flush();
            return;
        }

        let mut sentences = self.segmenter.segment(&self.buffer);
        if let Some(tail) = sentences.pop() {
            self.buffer = tail;
        }
        self.ready.extend(sentences);
    }
}

impl<'a, I> Iterator for SegmentedLines<'a, I>
where
    I: Iterator<Item = Result<String>>,
{
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(sentence) = self.ready.pop_front() {
                return Some(Ok(sentence));
            }
            if self.done {
                return None;
            }

            match self.lines.next() {
                Some(Ok(line)) => self.push_line(&line),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    self.flush();
                }
            }
        }
    }
}
