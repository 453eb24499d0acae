//! OIE Extractor - Relation extraction and confidence scoring
//!
//! Turns a parsed sentence into relational tuples and assigns each tuple a
//! confidence. Extractors implement `Extractor`, scorers implement
//! `ConfidenceScorer`; both are shared read-only across worker threads.

use std::path::Path;

use serde::de::DeserializeOwned;

use oie_core::{ExtractionCandidate, OieError, Result, ScorerModel};
use oie_parser::DependencyGraph;

pub mod pattern;
pub mod scorer;

pub use pattern::{ExtractionPattern, PatternExtractor};
pub use scorer::LogisticScorer;

/// Trait for relation extractors
pub trait Extractor: Send + Sync {
    /// Candidates for one sentence, in a deterministic order
    fn extract(&self, graph: &DependencyGraph) -> Result<Vec<ExtractionCandidate>>;
}

/// Trait for confidence scorers
pub trait ConfidenceScorer: Send + Sync {
    /// Confidence in `[0, 1]`, or `None` when no value can be computed
    fn score(&self, candidate: &ExtractionCandidate) -> Result<Option<f64>>;
}

/// Build the extractor for an optional pattern model file
pub fn load_extractor(model: Option<&Path>, openparse_threshold: f64) -> Result<PatternExtractor> {
    let extractor = match model {
        Some(path) => PatternExtractor::from_file(path, openparse_threshold)?,
        None => PatternExtractor::new(openparse_threshold),
    };

    tracing::debug!(
        patterns = extractor.patterns().len(),
        openparse_threshold,
        "Loaded extraction patterns"
    );
    Ok(extractor)
}

/// Build the scorer selected by `model`; `None` when scoring is disabled
pub fn load_scorer(model: &ScorerModel) -> Result<Option<LogisticScorer>> {
    let scorer = match model {
        ScorerModel::Builtin => LogisticScorer::default(),
        ScorerModel::File(path) => LogisticScorer::from_file(path)?,
        ScorerModel::Disabled => {
            tracing::debug!("Confidence scoring disabled");
            return Ok(None);
        }
    };

    tracing::debug!(features = scorer.weights().len(), "Loaded confidence model");
    Ok(Some(scorer))
}

/// Read a model file as TOML (`.toml` extension) or JSON (anything else)
fn read_model<T: DeserializeOwned>(path: &Path, kind: &str) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        OieError::Other(anyhow::Error::new(e).context(format!(
            "Failed to read {} {}",
            kind,
            path.display()
        )))
    })?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let parsed = if is_toml {
        toml::from_str(&content).map_err(anyhow::Error::new)
    } else {
        serde_json::from_str(&content).map_err(anyhow::Error::new)
    };

    parsed.map_err(|e| OieError::Other(e.context(format!("Invalid {} {}", kind, path.display()))))
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_scorer_variants() {
        assert!(load_scorer(&ScorerModel::Disabled).unwrap().is_none());
        assert!(load_scorer(&ScorerModel::Builtin).unwrap().is_some());
    }

    #[test]
    fn test_load_scorer_from_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "bias = 0.25\n\n[weights]\nhas_enabler = -1.0").unwrap();

        let scorer = load_scorer(&ScorerModel::File(file.path().to_path_buf()))
            .unwrap()
            .unwrap();
        assert_eq!(scorer.bias(), 0.25);
        assert_eq!(scorer.weights().get("has_enabler"), Some(&-1.0));
    }

    #[test]
    fn test_invalid_model_is_reported() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = load_extractor(Some(file.path()), 0.0).unwrap_err();
        assert!(err.to_string().contains("Invalid extraction model"));
    }
}
