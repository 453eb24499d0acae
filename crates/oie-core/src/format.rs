//! Output rendering
//!
//! Each `OutputFormat` maps a (confidence, extraction) pair to one line of
//! text. Tabbed formats also define a header line.

use crate::config::OutputFormat;
use crate::{ExtractionCandidate, OieError, Result};

const TABBED_HEADER: &str =
    "confidence\targ1\trel\targ2\tenabler\tattribution\ttext\tpattern\tdependencies";

const TABBED_SINGLE_HEADER: &str =
    "confidence\textraction\tenabler\tattribution\ttext\tpattern\tdependencies";

/// Confidence with exactly three decimals
///
/// Values exactly halfway between two outputs round to even, so 0.0625
/// becomes "0.062".
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.3}", confidence)
}

/// Keep a field on one line and inside its column
fn column(text: &str) -> String {
    text.replace(['\t', '\n', '\r'], " ")
}

fn optional_column(part: Option<&crate::Part>) -> String {
    part.map(|p| column(&p.text)).unwrap_or_default()
}

impl OutputFormat {
    /// Header line, written once per output stream
    pub fn header(&self) -> Option<&'static str> {
        match self {
            Self::Interactive | Self::Serialized => None,
            Self::Tabbed => Some(TABBED_HEADER),
            Self::TabbedSingleColumn => Some(TABBED_SINGLE_HEADER),
        }
    }

    /// Render one extraction as a line (without the trailing newline)
    pub fn render(&self, confidence: f64, extraction: &ExtractionCandidate) -> Result<String> {
        let conf = format_confidence(confidence);

        let line = match self {
            Self::Interactive => format!("{}: {}", conf, extraction.display_text()),
            Self::Tabbed => [
                conf,
                column(&extraction.arg1.text),
                column(&extraction.rel.text),
                column(&extraction.arg2.text),
                optional_column(extraction.enabler.as_ref()),
                optional_column(extraction.attribution.as_ref()),
                column(&extraction.sentence),
                column(&extraction.pattern),
                column(&extraction.dependencies),
            ]
            .join("\t"),
            Self::TabbedSingleColumn => [
                conf,
                column(&extraction.display_text()),
                optional_column(extraction.enabler.as_ref()),
                optional_column(extraction.attribution.as_ref()),
                column(&extraction.sentence),
                column(&extraction.pattern),
                column(&extraction.dependencies),
            ]
            .join("\t"),
            Self::Serialized => {
                let json = serde_json::to_string(extraction)
                    .map_err(|e| OieError::OutputError(e.to_string()))?;
                format!("{}\t{}\t{}", conf, column(&extraction.display_text()), json)
            }
        };

        Ok(line)
    }
}
