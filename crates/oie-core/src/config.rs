//! OIE Configuration Management
//!
//! `RunSettings` is the read-only snapshot a run is driven by. It is built
//! from command-line arguments layered over an optional TOML settings file,
//! and validated before any model is loaded or any input is read.

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default minimum internal confidence for extractor patterns
pub const DEFAULT_OPENPARSE_THRESHOLD: f64 = 0.005;

// ============================================================================
// Run Settings
// ============================================================================

/// Where sentences are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => write!(f, "<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Which confidence model to use
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScorerModel {
    /// Built-in weights
    #[default]
    Builtin,
    /// Weights loaded from a file
    File(PathBuf),
    /// No scoring, every extraction gets 0.0
    Disabled,
}

impl ScorerModel {
    /// Interpret a `--confidence-model` argument; `None` in any case disables scoring
    pub fn from_arg(arg: &str) -> Self {
        if arg.eq_ignore_ascii_case("none") {
            Self::Disabled
        } else {
            Self::File(PathBuf::from(arg))
        }
    }
}

/// Settings for one run of the pipeline
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Input files, processed in order; empty means standard input
    pub inputs: Vec<PathBuf>,

    /// Output file; `None` means standard output
    pub output: Option<PathBuf>,

    /// Character encoding for all reads and writes
    pub encoding: &'static Encoding,

    /// Extraction pattern model
    pub extractor_model: Option<PathBuf>,

    /// Confidence model
    pub confidence_model: ScorerModel,

    /// Parser lexicon model
    pub parser_model: Option<PathBuf>,

    /// Minimum confidence for an extraction to be written
    pub threshold: f64,

    /// Minimum internal extractor confidence for a pattern to be applied
    pub openparse_threshold: f64,

    /// Process batches on a worker pool
    pub parallel: bool,

    /// Re-segment input lines into sentences
    pub split: bool,

    /// Input lines are serialized dependency graphs
    pub parsed_input: bool,

    /// Output format
    pub output_format: OutputFormat,

    /// Skip sentences that fail instead of aborting the run
    pub invincible: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            output: None,
            encoding: encoding_rs::UTF_8,
            extractor_model: None,
            confidence_model: ScorerModel::Builtin,
            parser_model: None,
            threshold: 0.0,
            openparse_threshold: DEFAULT_OPENPARSE_THRESHOLD,
            parallel: false,
            split: false,
            parsed_input: false,
            output_format: OutputFormat::Interactive,
            invincible: false,
        }
    }
}

impl RunSettings {
    /// Sources in processing order
    pub fn sources(&self) -> Vec<InputSource> {
        if self.inputs.is_empty() {
            vec![InputSource::Stdin]
        } else {
            self.inputs.iter().cloned().map(InputSource::File).collect()
        }
    }

    /// Input is interactive when no files were given
    pub fn is_interactive(&self) -> bool {
        self.inputs.is_empty()
    }

    /// The prompt marker goes to the terminal only; never into an output file
    pub fn writes_prompt(&self) -> bool {
        self.is_interactive() && self.output.is_none()
    }

    /// Check option combinations and referenced files
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.split && self.parsed_input {
            return Err(ConfigError::ExclusiveOptions {
                first: "--split".to_string(),
                second: "--dependencies".to_string(),
            });
        }

        for (key, value) in [
            ("threshold", self.threshold),
            ("openparse-threshold", self.openparse_threshold),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
        }

        for input in &self.inputs {
            require_file("input", input)?;
        }
        if let Some(path) = &self.extractor_model {
            require_file("extraction model", path)?;
        }
        if let ScorerModel::File(path) = &self.confidence_model {
            require_file("confidence model", path)?;
        }
        if let Some(path) = &self.parser_model {
            require_file("parser model", path)?;
        }

        Ok(())
    }
}

fn require_file(kind: &str, path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::MissingFile {
            kind: kind.to_string(),
            path: path.to_path_buf(),
        })
    }
}

/// Look up an encoding by its WHATWG label ("utf-8", "latin1", "windows-1252", ...)
///
/// Input is decoded line by line, so only ASCII-compatible encodings are
/// accepted.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, ConfigError> {
    let encoding = Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ConfigError::UnknownEncoding(label.to_string()))?;

    if !encoding.is_ascii_compatible() {
        return Err(ConfigError::UnsupportedEncoding(encoding.name().to_string()));
    }
    Ok(encoding)
}

// ============================================================================
// Output Format
// ============================================================================

/// How extractions are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Echo each sentence, then `conf: extraction` lines and a blank line
    #[default]
    Interactive,
    /// One column per extraction part
    Tabbed,
    /// The extraction in a single column
    #[serde(alias = "tabbedsingle")]
    TabbedSingleColumn,
    /// Confidence, display text and a JSON serialization
    Serialized,
}

impl OutputFormat {
    /// Name accepted by `--output-format`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Interactive => "interactive",
            Self::Tabbed => "tabbed",
            Self::TabbedSingleColumn => "tabbedsingle",
            Self::Serialized => "serialized",
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "interactive" => Ok(Self::Interactive),
            "tabbed" => Ok(Self::Tabbed),
            "tabbedsingle" | "tabbed-single-column" => Ok(Self::TabbedSingleColumn),
            "serialized" => Ok(Self::Serialized),
            _ => Err(ConfigError::UnknownOutputFormat(s.to_string())),
        }
    }
}

// ============================================================================
// Settings File
// ============================================================================

/// Defaults loaded from a TOML file; command-line flags take precedence
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsFile {
    /// Model locations
    pub models: ModelPaths,

    /// Extraction defaults
    pub extraction: ExtractionDefaults,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl SettingsFile {
    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }
}

/// Model file locations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelPaths {
    pub extractor: Option<PathBuf>,

    /// Path, or `None` to disable scoring
    pub confidence: Option<String>,

    pub parser: Option<PathBuf>,
}

/// Extraction defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionDefaults {
    pub threshold: Option<f64>,
    pub openparse_threshold: Option<f64>,
    pub output_format: Option<String>,
    pub encoding: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,

    /// Include file/line in logs
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json_format: false,
            include_location: false,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("{first} and {second} cannot be used together")]
    ExclusiveOptions { first: String, second: String },

    #[error("{kind} file not found: {path}")]
    MissingFile { kind: String, path: PathBuf },

    #[error("Unknown output format: {0} (expected interactive, tabbed, tabbedsingle or serialized)")]
    UnknownOutputFormat(String),

    #[error("Unknown character encoding: {0}")]
    UnknownEncoding(String),

    #[error("Unsupported character encoding: {0} (only ASCII-compatible encodings can be read line by line)")]
    UnsupportedEncoding(String),
}
