//! Logistic confidence scorer
//!
//! Features of a candidate are named reals; the confidence is
//! `sigmoid(bias + sum(weight * value))` over the features the model has a
//! weight for. Unknown features are ignored.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use oie_core::{ExtractionCandidate, Result};

use crate::{read_model, ConfidenceScorer};

const PRONOUNS: &[&str] = &[
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "this", "that",
];

/// Sentences longer than this many words are considered long
const LONG_SENTENCE_WORDS: usize = 20;

/// Weights of a logistic model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticScorer {
    #[serde(default)]
    bias: f64,
    #[serde(default)]
    weights: HashMap<String, f64>,
}

impl LogisticScorer {
    pub fn new(bias: f64, weights: HashMap<String, f64>) -> Self {
        Self { bias, weights }
    }

    /// Load weights from a JSON (`{"bias": .., "weights": {..}}`) or TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        read_model(path.as_ref(), "confidence model")
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn weights(&self) -> &HashMap<String, f64> {
        &self.weights
    }

    /// Named feature values of a candidate
    pub fn features(candidate: &ExtractionCandidate) -> Vec<(String, f64)> {
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let words = |text: &str| text.split_whitespace().count() as f64;

        let arg1 = candidate.arg1.text.to_lowercase();
        vec![
            (format!("pattern:{}", candidate.pattern), 1.0),
            (
                "extractor_confidence".to_string(),
                candidate.extractor_confidence,
            ),
            ("has_enabler".to_string(), flag(candidate.enabler.is_some())),
            (
                "has_attribution".to_string(),
                flag(candidate.attribution.is_some()),
            ),
            (
                "arg1_is_pronoun".to_string(),
                flag(PRONOUNS.contains(&arg1.as_str())),
            ),
            (
                "arg2_has_number".to_string(),
                flag(candidate.arg2.text.chars().any(|c| c.is_ascii_digit())),
            ),
            (
                "rel_multiword".to_string(),
                flag(words(&candidate.rel.text) > 1.0),
            ),
            (
                "long_sentence".to_string(),
                flag(words(&candidate.sentence) > LONG_SENTENCE_WORDS as f64),
            ),
            (
                "arg_length".to_string(),
                (words(&candidate.arg1.text) + words(&candidate.arg2.text)) / 10.0,
            ),
        ]
    }
}

impl Default for LogisticScorer {
    fn default() -> Self {
        let weights = [
            ("extractor_confidence", 2.0),
            ("pattern:nsubj-dobj", 0.9),
            ("pattern:nsubj-prep", 0.4),
            ("pattern:nsubjpass-prep", 0.3),
            ("pattern:nsubj-attr", 0.2),
            ("has_enabler", -0.2),
            ("has_attribution", -0.3),
            ("arg1_is_pronoun", -0.6),
            ("arg2_has_number", 0.2),
            ("rel_multiword", -0.1),
            ("long_sentence", -0.4),
            ("arg_length", -0.3),
        ]
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect();

        Self::new(-0.5, weights)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl ConfidenceScorer for LogisticScorer {
    fn score(&self, candidate: &ExtractionCandidate) -> Result<Option<f64>> {
        let z = Self::features(candidate)
            .into_iter()
            .filter_map(|(name, value)| self.weights.get(&name).map(|w| w * value))
            .fold(self.bias, |acc, term| acc + term);

        let confidence = sigmoid(z);
        if confidence.is_nan() {
            tracing::warn!(pattern = %candidate.pattern, "Confidence model produced NaN");
            return Ok(None);
        }
        Ok(Some(confidence))
    }
}
