//! OIE Pipeline - Extraction orchestrator
//!
//! This crate drives a run end to end:
//! - reads and decodes each input source in order
//! - optionally re-segments lines into sentences
//! - groups sentences into batches and processes each batch sequentially or
//!   on the rayon pool
//! - parses, extracts, scores, filters and ranks per sentence
//! - writes formatted lines through one shared output sink
//!
//! Per-sentence failures either abort the run or are logged and skipped,
//! depending on the `ErrorPolicy`.
//!
//! Author: hephaex@gmail.com

use std::io::BufRead;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use oie_core::{rank, OieError, Result, RunSettings, ScoredExtraction};
use oie_extractor::{load_extractor, load_scorer, ConfidenceScorer, Extractor};
use oie_parser::{load_parser, DependencyGraph, DependencyParser, RuleSegmenter, Segmenter};

pub mod input;
pub mod output;

pub use input::{open_source, DecodedLines, SegmentedLines};
pub use output::{OutputSink, PROMPT};

/// Sentences per batch in parallel mode
pub const BATCH_SIZE: usize = 10_000;

/// Line written in interactive format when a sentence yields nothing
pub const NO_EXTRACTIONS: &str = "No extractions found.";

// ============================================================================
// Error Policy
// ============================================================================

/// Result of processing one sentence
#[derive(Debug)]
pub enum SentenceOutcome {
    /// Sentence handled; number of extraction lines written
    Processed { extractions: usize },
    /// Sentence failed somewhere between echo and the last output line
    Failed(OieError),
}

impl From<Result<usize>> for SentenceOutcome {
    fn from(result: Result<usize>) -> Self {
        match result {
            Ok(extractions) => Self::Processed { extractions },
            Err(e) => Self::Failed(e),
        }
    }
}

/// What to do with a failed sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// The first failure ends the run
    Abort,
    /// Failures are logged and the sentence is skipped
    Skip,
}

impl ErrorPolicy {
    pub fn from_invincible(invincible: bool) -> Self {
        if invincible {
            Self::Skip
        } else {
            Self::Abort
        }
    }

    /// Fold an outcome into the run counters, or surface the failure
    fn apply(&self, sentence: &str, outcome: SentenceOutcome, counters: &Counters) -> Result<()> {
        counters.sentences.fetch_add(1, Ordering::Relaxed);

        match outcome {
            SentenceOutcome::Processed { extractions } => {
                counters.extractions.fetch_add(extractions, Ordering::Relaxed);
                Ok(())
            }
            SentenceOutcome::Failed(error) => match self {
                Self::Skip => {
                    counters.skipped.fetch_add(1, Ordering::Relaxed);
                    tracing::error!(sentence, error = %error, "Skipping sentence");
                    Ok(())
                }
                Self::Abort => Err(error),
            },
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    sentences: AtomicUsize,
    extractions: AtomicUsize,
    skipped: AtomicUsize,
}

// ============================================================================
// Summaries
// ============================================================================

/// Totals for one source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSummary {
    pub sentences: usize,
    pub extractions: usize,
    pub skipped: usize,
    pub elapsed: Duration,
}

/// Totals for a whole run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub sources: usize,
    pub sentences: usize,
    pub extractions: usize,
    pub skipped: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    fn add(&mut self, source: &SourceSummary) {
        self.sources += 1;
        self.sentences += source.sentences;
        self.extractions += source.extractions;
        self.skipped += source.skipped;
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Extraction pipeline
pub struct Pipeline {
    /// Sentence parser; `None` when input lines are serialized graphs
    parser: Option<Arc<dyn DependencyParser>>,

    /// Re-segments input lines when set
    segmenter: Option<Arc<dyn Segmenter>>,

    extractor: Arc<dyn Extractor>,

    /// Confidence scorer; every extraction scores 0.0 without one
    scorer: Option<Arc<dyn ConfidenceScorer>>,

    settings: RunSettings,
}

impl Pipeline {
    /// Pipeline without parser, segmenter or scorer
    pub fn new(settings: RunSettings, extractor: Arc<dyn Extractor>) -> Self {
        Self {
            parser: None,
            segmenter: None,
            extractor,
            scorer: None,
            settings,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn DependencyParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn with_segmenter(mut self, segmenter: Arc<dyn Segmenter>) -> Self {
        self.segmenter = Some(segmenter);
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn ConfidenceScorer>) -> Self {
        self.scorer = Some(scorer);
        self
    }

    /// Validate `settings` and load every model they name
    pub fn from_settings(settings: RunSettings) -> Result<Self> {
        settings.validate()?;

        let start = Instant::now();
        let extractor = load_extractor(
            settings.extractor_model.as_deref(),
            settings.openparse_threshold,
        )?;
        let scorer = load_scorer(&settings.confidence_model)?;
        let parser = if settings.parsed_input {
            None
        } else {
            Some(load_parser(settings.parser_model.as_deref())?)
        };
        let split = settings.split;

        let mut pipeline = Self::new(settings, Arc::new(extractor));
        if let Some(parser) = parser {
            pipeline = pipeline.with_parser(Arc::new(parser));
        }
        if let Some(scorer) = scorer {
            pipeline = pipeline.with_scorer(Arc::new(scorer));
        }
        if split {
            pipeline = pipeline.with_segmenter(Arc::new(RuleSegmenter::new()));
        }

        tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "Models loaded");
        Ok(pipeline)
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// Process every source into the configured output
    pub fn run(&self) -> Result<RunSummary> {
        let sink = match &self.settings.output {
            Some(path) => OutputSink::file(path, self.settings.encoding)?,
            None => OutputSink::stdout(self.settings.encoding),
        };

        let sources = self.settings.sources();
        self.run_with(&sink, sources.into_iter().map(|source| {
            let reader = open_source(&source)?;
            Ok((source.to_string(), reader))
        }))
    }

    /// Process `sources` in order into `sink`
    ///
    /// The header is written first; the sink is flushed whether or not the
    /// run succeeds.
    pub fn run_with<I, R>(&self, sink: &OutputSink, sources: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<(String, R)>>,
        R: BufRead,
    {
        let start = Instant::now();
        let result = self.run_sources(sink, sources);
        let flushed = sink.flush();

        let mut summary = result?;
        flushed?;

        summary.elapsed = start.elapsed();
        tracing::info!(
            sources = summary.sources,
            sentences = summary.sentences,
            extractions = summary.extractions,
            skipped = summary.skipped,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Run complete"
        );
        Ok(summary)
    }

    fn run_sources<I, R>(&self, sink: &OutputSink, sources: I) -> Result<RunSummary>
    where
        I: IntoIterator<Item = Result<(String, R)>>,
        R: BufRead,
    {
        if let Some(header) = self.settings.output_format.header() {
            sink.write_line(header)?;
        }

        let mut summary = RunSummary::default();
        for source in sources {
            let (name, reader) = source?;
            let source_summary = self.process_source(&name, reader, sink)?;
            summary.add(&source_summary);
        }
        Ok(summary)
    }

    /// Process one source; sentences are read lazily one batch at a time
    pub fn process_source<R: BufRead>(
        &self,
        name: &str,
        reader: R,
        sink: &OutputSink,
    ) -> Result<SourceSummary> {
        let start = Instant::now();
        let counters = Counters::default();

        tracing::info!(source = name, "Processing source");
        if self.settings.writes_prompt() {
            sink.prompt()?;
        }

        let lines = DecodedLines::new(reader, self.settings.encoding, name);
        match &self.segmenter {
            Some(segmenter) => {
                let sentences = SegmentedLines::new(lines, segmenter.as_ref());
                self.process_sentences(name, sentences, sink, &counters)?;
            }
            None => {
                let sentences = lines.filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()));
                self.process_sentences(name, sentences, sink, &counters)?;
            }
        }

        let summary = SourceSummary {
            sentences: counters.sentences.into_inner(),
            extractions: counters.extractions.into_inner(),
            skipped: counters.skipped.into_inner(),
            elapsed: start.elapsed(),
        };
        tracing::info!(
            source = name,
            sentences = summary.sentences,
            extractions = summary.extractions,
            skipped = summary.skipped,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Source complete"
        );
        Ok(summary)
    }

    /// Batch `sentences` and process one batch at a time
    fn process_sentences<I>(
        &self,
        name: &str,
        mut sentences: I,
        sink: &OutputSink,
        counters: &Counters,
    ) -> Result<()>
    where
        I: Iterator<Item = Result<String>>,
    {
        let policy = ErrorPolicy::from_invincible(self.settings.invincible);
        let batch_size = if self.settings.parallel { BATCH_SIZE } else { 1 };
        let mut batch = Vec::with_capacity(batch_size.min(1024));

        loop {
            batch.clear();
            for sentence in sentences.by_ref().take(batch_size) {
                batch.push(sentence?);
            }
            if batch.is_empty() {
                return Ok(());
            }

            tracing::debug!(source = name, size = batch.len(), "Processing batch");
            self.process_batch(&batch, sink, policy, counters)?;

            if self.settings.writes_prompt() {
                sink.prompt()?;
            }
        }
    }

    fn process_batch(
        &self,
        batch: &[String],
        sink: &OutputSink,
        policy: ErrorPolicy,
        counters: &Counters,
    ) -> Result<()> {
        let handle = |sentence: &String| {
            let outcome = SentenceOutcome::from(self.process_sentence(sentence, sink));
            policy.apply(sentence, outcome, counters)
        };

        if self.settings.parallel {
            batch.par_iter().try_for_each(handle)
        } else {
            batch.iter().try_for_each(handle)
        }
    }

    /// Echo, extract, rank and write one sentence; returns the number of
    /// extraction lines written
    pub fn process_sentence(&self, sentence: &str, sink: &OutputSink) -> Result<usize> {
        let format = self.settings.output_format;

        if format.is_interactive() {
            sink.write_line(sentence)?;
        }

        let scored = self.extract(sentence)?;
        let written = if scored.is_empty() {
            if format.is_interactive() {
                sink.write_line(NO_EXTRACTIONS)?;
            }
            0
        } else {
            let lines = rank(scored, self.settings.threshold)
                .iter()
                .map(|s| format.render(s.confidence, &s.extraction))
                .collect::<Result<Vec<_>>>()?;
            for line in &lines {
                sink.write_line(line)?;
            }
            lines.len()
        };

        if format.is_interactive() {
            sink.write_line("")?;
        }
        Ok(written)
    }

    /// Scored candidates for one sentence, in extractor order
    pub fn extract(&self, sentence: &str) -> Result<Vec<ScoredExtraction>> {
        let graph = match &self.parser {
            Some(parser) => parser.parse(sentence)?,
            None => DependencyGraph::deserialize(sentence)?,
        };

        self.extractor
            .extract(&graph)?
            .into_iter()
            .map(|candidate| {
                let confidence = match &self.scorer {
                    Some(scorer) => scorer.score(&candidate)?.unwrap_or(0.0),
                    None => 0.0,
                };
                Ok(ScoredExtraction::new(confidence, candidate))
            })
            .collect()
    }
}
