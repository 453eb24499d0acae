//! OIE Core - Domain models, settings, and shared types
//!
//! This crate defines the core abstractions used throughout the OIE system:
//! - Extraction models (parts, candidates, scored extractions)
//! - Ranking of scored extractions
//! - Common error types
//! - Run settings, validation and the settings file
//! - Output format rendering

pub mod config;
pub mod format;

pub use config::{
    resolve_encoding, ConfigError, InputSource, LoggingConfig, OutputFormat, RunSettings,
    ScorerModel, SettingsFile, DEFAULT_OPENPARSE_THRESHOLD,
};
pub use format::format_confidence;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for OIE operations
#[derive(Error, Debug)]
pub enum OieError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not decode {source_name} as {encoding}")]
    EncodingError {
        source_name: String,
        encoding: String,
    },

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Extraction error: {0}")]
    ExtractionError(String),

    #[error("Scoring error: {0}")]
    ScoringError(String),

    #[error("Output error: {0}")]
    OutputError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OieError {
    /// User-facing hint printed next to the error, if there is one
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            Self::EncodingError { .. } => Some(
                "Try converting the input to UTF-8, or pass the input's character encoding with --encoding.",
            ),
            Self::Config(_) => Some("Run with --help for usage."),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, OieError>;

// ============================================================================
// Extraction Models
// ============================================================================

/// A span of the source sentence playing one role in an extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Surface text, taken from the source sentence
    pub text: String,

    /// Indices of the source tokens covered by this part, in sentence order
    pub tokens: Vec<usize>,
}

impl Part {
    pub fn new(text: impl Into<String>, tokens: Vec<usize>) -> Self {
        Self {
            text: text.into(),
            tokens,
        }
    }
}

impl std::fmt::Display for Part {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// A relational tuple produced by an extractor for one sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionCandidate {
    /// First argument (usually the subject)
    pub arg1: Part,

    /// Relation phrase
    pub rel: Part,

    /// Second argument
    pub arg2: Part,

    /// Condition under which the relation holds ("if it rains")
    pub enabler: Option<Part>,

    /// Who asserts the relation ("John said")
    pub attribution: Option<Part>,

    /// Identifier of the pattern that produced this candidate
    pub pattern: String,

    /// Source sentence text
    pub sentence: String,

    /// Serialized dependency graph of the source sentence
    pub dependencies: String,

    /// Extractor-internal confidence of the supporting pattern
    pub extractor_confidence: f64,
}

impl ExtractionCandidate {
    /// Human-readable form: `(arg1; rel; arg2)[enabler=..][attrib=..]`
    pub fn display_text(&self) -> String {
        let mut text = format!("({}; {}; {})", self.arg1, self.rel, self.arg2);
        if let Some(enabler) = &self.enabler {
            text.push_str(&format!("[enabler={}]", enabler));
        }
        if let Some(attribution) = &self.attribution {
            text.push_str(&format!("[attrib={}]", attribution));
        }
        text
    }
}

impl std::fmt::Display for ExtractionCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display_text())
    }
}

/// A candidate paired with its confidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredExtraction {
    pub confidence: f64,
    pub extraction: ExtractionCandidate,
}

impl ScoredExtraction {
    pub fn new(confidence: f64, extraction: ExtractionCandidate) -> Self {
        Self {
            confidence,
            extraction,
        }
    }
}

/// Drop extractions below `threshold` and order the rest by descending
/// confidence. Equal confidences keep their input order.
pub fn rank(scored: Vec<ScoredExtraction>, threshold: f64) -> Vec<ScoredExtraction> {
    let mut kept: Vec<ScoredExtraction> = scored
        .into_iter()
        .filter(|s| s.confidence >= threshold)
        .collect();

    // sort_by is stable
    kept.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    kept
}

// ============================================================================
// Tests
// ============================================================================


#[cfg(test)]
mod tests {
    use super::test_support::candidate;
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_display_text() {
        let mut c = candidate("The cat", "sat on", "the mat");
        assert_eq!(c.display_text(), "(The cat; sat on; the mat)");

        c.enabler = Some(Part::new("if it rains", vec![5, 6, 7]));
        c.attribution = Some(Part::new("John said", vec![8, 9]));
        assert_eq!(
            c.to_string(),
            "(The cat; sat on; the mat)[enabler=if it rains][attrib=John said]"
        );
    }

    #[test]
    fn test_rank_threshold() {
        let scored = vec![
            ScoredExtraction::new(0.5, candidate("a", "b", "c")),
            ScoredExtraction::new(0.8, candidate("d", "e", "f")),
        ];

        let ranked = rank(scored, 0.6);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].confidence, 0.8);
    }

    #[test]
    fn test_rank_keeps_ties_in_order() {
        let scored = vec![
            ScoredExtraction::new(0.2, candidate("first", "r", "x")),
            ScoredExtraction::new(0.9, candidate("top", "r", "x")),
            ScoredExtraction::new(0.2, candidate("second", "r", "x")),
            ScoredExtraction::new(0.2, candidate("third", "r", "x")),
        ];

        let ranked = rank(scored, 0.0);
        let order: Vec<&str> = ranked.iter().map(|s| s.extraction.arg1.text.as_str()).collect();
        assert_eq!(order, vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_rank_drops_nan() {
        let scored = vec![ScoredExtraction::new(f64::NAN, candidate("a", "b", "c"))];
        assert!(rank(scored, 0.0).is_empty());
    }

    #[test]
    fn test_encoding_error_has_remediation() {
        let err = OieError::EncodingError {
            source_name: "input.txt".to_string(),
            encoding: "UTF-8".to_string(),
        };
        assert!(err.remediation().unwrap().contains("--encoding"));
        assert!(OieError::ParseError("x".into()).remediation().is_none());
    }

    proptest! {
        #[test]
        fn prop_rank_respects_threshold_and_order(
            confidences in proptest::collection::vec(-1.0f64..2.0, 0..40),
            threshold in -1.0f64..2.0,
        ) {
            let scored: Vec<ScoredExtraction> = confidences
                .iter()
                .enumerate()
                .map(|(i, c)| ScoredExtraction::new(*c, candidate(&i.to_string(), "r", "x")))
                .collect();

            let ranked = rank(scored, threshold);

            for s in &ranked {
                prop_assert!(s.confidence >= threshold);
            }
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].confidence >= pair[1].confidence);
                if pair[0].confidence == pair[1].confidence {
                    let a: usize = pair[0].extraction.arg1.text.parse().unwrap();
                    let b: usize = pair[1].extraction.arg1.text.parse().unwrap();
                    prop_assert!(a < b);
                }
            }
            let expected = confidences.iter().filter(|c| **c >= threshold).count();
            prop_assert_eq!(ranked.len(), expected);
        }
    }
}
