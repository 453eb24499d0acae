//! OIE Parser - Sentence segmentation and dependency parsing
//!
//! Provides:
//! - `DependencyGraph`, the parsed form of one sentence, with its
//!   single-line serialization
//! - `RuleSegmenter`, splitting free text into sentences
//! - `ShallowParser`, a lexicon-driven heuristic dependency parser
//!
//! Parsers implement `DependencyParser` and segmenters implement
//! `Segmenter` so the pipeline can run with either swapped out.

pub mod graph;
pub mod lexicon;
pub mod segment;
pub mod shallow;

pub use graph::{Dependency, DependencyGraph, Token};
pub use lexicon::Lexicon;
pub use segment::RuleSegmenter;
pub use shallow::ShallowParser;

use std::path::Path;

use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while segmenting or parsing
#[derive(Error, Debug)]
pub enum ParserError {
    /// Serialized graph could not be read back
    #[error("Malformed dependency graph: {0}")]
    MalformedGraph(String),

    /// Nothing to parse
    #[error("Sentence has no tokens")]
    EmptySentence,

    /// IO error while reading a model file
    #[error("IO error reading file: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Lexicon line is not `word<TAB>TAG`
    #[error("Invalid lexicon entry on line {line}: {content}")]
    InvalidLexicon { line: usize, content: String },
}

pub type Result<T> = std::result::Result<T, ParserError>;

impl From<ParserError> for oie_core::OieError {
    fn from(err: ParserError) -> Self {
        match err {
            ParserError::MalformedGraph(_) | ParserError::EmptySentence => {
                Self::ParseError(err.to_string())
            }
            other => Self::Other(anyhow::Error::new(other)),
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Turns one sentence into a dependency graph
pub trait DependencyParser: Send + Sync {
    fn parse(&self, sentence: &str) -> Result<DependencyGraph>;
}

/// Splits text into sentences
pub trait Segmenter: Send + Sync {
    /// Complete sentences in `text`, trimmed, plus any unterminated tail
    fn segment(&self, text: &str) -> Vec<String>;

    /// Whether `text` ends exactly at a sentence boundary
    fn ends_sentence(&self, text: &str) -> bool;
}

/// Build the parser for an optional lexicon model file
pub fn load_parser(model: Option<&Path>) -> Result<ShallowParser> {
    match model {
        Some(path) => {
            let lexicon = Lexicon::from_file(path)?;
            tracing::debug!(path = %path.display(), entries = lexicon.len(), "Loaded parser lexicon");
            Ok(ShallowParser::with_lexicon(lexicon))
        }
        None => Ok(ShallowParser::new()),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parser_error_conversion() {
        let err: oie_core::OieError = ParserError::EmptySentence.into();
        assert!(matches!(err, oie_core::OieError::ParseError(_)));

        let err: oie_core::OieError = ParserError::InvalidLexicon {
            line: 3,
            content: "x".to_string(),
        }
        .into();
        assert!(matches!(err, oie_core::OieError::Other(_)));
    }

    #[test]
    fn test_load_parser_with_lexicon() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "blorps\tVBZ").unwrap();

        let parser = load_parser(Some(file.path())).unwrap();
        let graph = parser.parse("The dog blorps the ball.").unwrap();
        assert_eq!(graph.token(2).unwrap().pos, "VBZ");
    }

    #[test]
    fn test_load_parser_missing_file() {
        let err = load_parser(Some(Path::new("/nonexistent/lexicon.tsv"))).unwrap_err();
        assert!(matches!(err, ParserError::IoError { .. }));
    }
}
