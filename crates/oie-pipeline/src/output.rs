//! Output sink
//!
//! One sink per run. Every write encodes a whole line and flushes it under a
//! single lock, so lines from parallel workers never split.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use encoding_rs::Encoding;

use oie_core::{OieError, Result};

/// Marker written before reading interactive input
pub const PROMPT: &str = "> ";

pub struct OutputSink {
    writer: Mutex<Box<dyn Write + Send>>,
    encoding: &'static Encoding,
}

impl OutputSink {
    pub fn new(writer: Box<dyn Write + Send>, encoding: &'static Encoding) -> Self {
        Self {
            writer: Mutex::new(writer),
            encoding,
        }
    }

    pub fn stdout(encoding: &'static Encoding) -> Self {
        Self::new(Box::new(std::io::stdout()), encoding)
    }

    /// Create or truncate `path`
    pub fn file(path: &Path, encoding: &'static Encoding) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(Box::new(BufWriter::new(file)), encoding))
    }

    /// Write `line` followed by a newline, then flush
    pub fn write_line(&self, line: &str) -> Result<()> {
        let mut text = String::with_capacity(line.len() + 1);
        text.push_str(line);
        text.push('\n');
        self.write_raw(&text)
    }

    /// Write the interactive prompt marker without a newline
    pub fn prompt(&self) -> Result<()> {
        self.write_raw(PROMPT)
    }

    pub fn flush(&self) -> Result<()> {
        self.lock()?.flush()?;
        Ok(())
    }

    fn write_raw(&self, text: &str) -> Result<()> {
        let (bytes, _, unmappable) = self.encoding.encode(text);
        if unmappable {
            tracing::warn!(
                encoding = self.encoding.name(),
                "Output contains characters the encoding cannot represent"
            );
        }

        let mut writer = self.lock()?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Box<dyn Write + Send>>> {
        self.writer
            .lock()
            .map_err(|_| OieError::OutputError("output writer lock poisoned".to_string()))
    }
}

impl Drop for OutputSink {
    fn drop(&mut self) {
        if let Ok(writer) = self.writer.get_mut() {
            if let Err(e) = writer.flush() {
                tracing::error!(error = %e, "Failed to flush output");
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    /// Writer whose contents stay readable after the sink takes it
    #[derive(Clone, Default)]
    pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        pub fn bytes(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }

        pub fn contents(&self) -> String {
            String::from_utf8(self.bytes()).unwrap()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
