//! Command-line arguments and their mapping onto `RunSettings`
//!
//! Values given on the command line win over the settings file, which wins
//! over built-in defaults.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use oie_core::{
    resolve_encoding, ConfigError, OutputFormat, RunSettings, ScorerModel, SettingsFile,
    DEFAULT_OPENPARSE_THRESHOLD,
};

#[derive(Parser, Debug)]
#[command(name = "oie")]
#[command(about = "Extract (arg1; relation; arg2) triples from English sentences")]
#[command(version)]
pub struct Args {
    /// Input files, processed in order; reads standard input when omitted
    pub inputs: Vec<PathBuf>,

    /// Output file (default: standard output)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Character encoding for input and output (default: utf-8)
    #[arg(short, long, env = "OIE_ENCODING")]
    pub encoding: Option<String>,

    /// Extraction pattern model
    #[arg(short = 'm', long = "model", alias = "extraction-model", env = "OIE_EXTRACTION_MODEL")]
    pub extraction_model: Option<PathBuf>,

    /// Confidence model, or `None` to give every extraction 0.0
    #[arg(short, long, env = "OIE_CONFIDENCE_MODEL")]
    pub confidence_model: Option<String>,

    /// Parser lexicon model
    #[arg(long, alias = "parser-model", env = "OIE_PARSER_MODEL")]
    pub malt_model: Option<PathBuf>,

    /// Minimum confidence for an extraction to be written (default: 0.0)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Minimum internal confidence for an extraction pattern (default: 0.005)
    #[arg(long)]
    pub openparse_threshold: Option<f64>,

    /// Process sentences on a worker pool
    #[arg(short, long)]
    pub parallel: bool,

    /// Split input lines into sentences
    #[arg(short, long)]
    pub split: bool,

    /// Input lines are serialized dependency graphs
    #[arg(long)]
    pub dependencies: bool,

    /// interactive, tabbed, tabbedsingle or serialized
    #[arg(long)]
    pub output_format: Option<String>,

    /// Skip sentences that fail instead of stopping
    #[arg(long, alias = "invincible")]
    pub ignore_errors: bool,

    /// Settings file with defaults for the options above
    #[arg(long, env = "OIE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log more; repeat for more detail
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print usage
    #[arg(long, action = ArgAction::Help)]
    pub usage: Option<bool>,
}

impl Args {
    /// Load the settings file named by `--config`, if any
    pub fn settings_file(&self) -> Result<SettingsFile, ConfigError> {
        match &self.config {
            Some(path) => SettingsFile::from_file(path),
            None => Ok(SettingsFile::default()),
        }
    }

    /// Layer these arguments over `file`
    pub fn into_settings(self, file: &SettingsFile) -> Result<RunSettings, ConfigError> {
        let encoding = match self.encoding.as_deref().or(file.extraction.encoding.as_deref()) {
            Some(label) => resolve_encoding(label)?,
            None => RunSettings::default().encoding,
        };

        let output_format = match self
            .output_format
            .as_deref()
            .or(file.extraction.output_format.as_deref())
        {
            Some(name) => name.parse()?,
            None => OutputFormat::default(),
        };

        let confidence_model = self
            .confidence_model
            .as_deref()
            .or(file.models.confidence.as_deref())
            .map(ScorerModel::from_arg)
            .unwrap_or_default();

        Ok(RunSettings {
            inputs: self.inputs,
            output: self.output,
            encoding,
            extractor_model: self.extraction_model.or_else(|| file.models.extractor.clone()),
            confidence_model,
            parser_model: self.malt_model.or_else(|| file.models.parser.clone()),
            threshold: self.threshold.or(file.extraction.threshold).unwrap_or(0.0),
            openparse_threshold: self
                .openparse_threshold
                .or(file.extraction.openparse_threshold)
                .unwrap_or(DEFAULT_OPENPARSE_THRESHOLD),
            parallel: self.parallel,
            split: self.split,
            parsed_input: self.dependencies,
            output_format,
            invincible: self.ignore_errors,
        })
    }

    /// Log level: `-v` flags override the settings file
    pub fn log_level<'a>(&self, configured: &'a str) -> &'a str {
        match self.verbose {
            0 => configured,
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("oie").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let settings = parse(&[]).into_settings(&SettingsFile::default()).unwrap();

        assert!(settings.inputs.is_empty());
        assert!(settings.output.is_none());
        assert_eq!(settings.encoding.name(), "UTF-8");
        assert_eq!(settings.confidence_model, ScorerModel::Builtin);
        assert_eq!(settings.threshold, 0.0);
        assert_eq!(settings.openparse_threshold, 0.005);
        assert_eq!(settings.output_format, OutputFormat::Interactive);
        assert!(!settings.parallel);
        assert!(!settings.split);
        assert!(!settings.parsed_input);
        assert!(!settings.invincible);
    }

    #[test]
    fn test_all_flags() {
        let args = parse(&[
            "a.txt",
            "b.txt",
            "-o",
            "out.tsv",
            "-e",
            "latin1",
            "-m",
            "patterns.json",
            "-c",
            "None",
            "--malt-model",
            "lexicon.txt",
            "-t",
            "0.5",
            "--openparse-threshold",
            "0.1",
            "-p",
            "-s",
            "--output-format",
            "TabbedSingle",
            "--ignore-errors",
        ]);
        let settings = args.into_settings(&SettingsFile::default()).unwrap();

        assert_eq!(
            settings.inputs,
            vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
        assert_eq!(settings.output, Some(PathBuf::from("out.tsv")));
        assert_eq!(settings.encoding.name(), "windows-1252");
        assert_eq!(settings.extractor_model, Some(PathBuf::from("patterns.json")));
        assert_eq!(settings.confidence_model, ScorerModel::Disabled);
        assert_eq!(settings.parser_model, Some(PathBuf::from("lexicon.txt")));
        assert_eq!(settings.threshold, 0.5);
        assert_eq!(settings.openparse_threshold, 0.1);
        assert!(settings.parallel);
        assert!(settings.split);
        assert_eq!(settings.output_format, OutputFormat::TabbedSingleColumn);
        assert!(settings.invincible);
    }

    #[test]
    fn test_model_long_flag() {
        let settings = parse(&["--model", "patterns.toml"])
            .into_settings(&SettingsFile::default())
            .unwrap();
        assert_eq!(settings.extractor_model, Some(PathBuf::from("patterns.toml")));
    }

    #[test]
    fn test_confidence_model_path() {
        let settings = parse(&["-c", "weights.toml"])
            .into_settings(&SettingsFile::default())
            .unwrap();
        assert_eq!(
            settings.confidence_model,
            ScorerModel::File(PathBuf::from("weights.toml"))
        );
    }

    #[test]
    fn test_split_and_dependencies_reach_validation() {
        let settings = parse(&["-s", "--dependencies"])
            .into_settings(&SettingsFile::default())
            .unwrap();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::ExclusiveOptions { .. })
        ));
    }

    #[test]
    fn test_unknown_output_format() {
        let result = parse(&["--output-format", "xml"]).into_settings(&SettingsFile::default());
        assert!(matches!(result, Err(ConfigError::UnknownOutputFormat(_))));
    }

    #[test]
    fn test_unknown_encoding() {
        let result = parse(&["-e", "klingon"]).into_settings(&SettingsFile::default());
        assert!(matches!(result, Err(ConfigError::UnknownEncoding(_))));
    }

    #[test]
    fn test_flags_override_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[models]
confidence = "None"
extractor = "from-file.json"

[extraction]
threshold = 0.25
output_format = "serialized"
"#
        )
        .unwrap();

        let args = parse(&[
            "--config",
            file.path().to_str().unwrap(),
            "-t",
            "0.75",
        ]);
        let settings_file = args.settings_file().unwrap();
        let settings = args.into_settings(&settings_file).unwrap();

        assert_eq!(settings.threshold, 0.75);
        assert_eq!(settings.output_format, OutputFormat::Serialized);
        assert_eq!(settings.confidence_model, ScorerModel::Disabled);
        assert_eq!(
            settings.extractor_model,
            Some(PathBuf::from("from-file.json"))
        );
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(parse(&[]).log_level("warn"), "warn");
        assert_eq!(parse(&["-v"]).log_level("warn"), "info");
        assert_eq!(parse(&["-vv"]).log_level("warn"), "debug");
        assert_eq!(parse(&["-vvv"]).log_level("warn"), "trace");
    }

    #[test]
    fn test_usage_prints_help() {
        let err = Args::try_parse_from(["oie", "--usage"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
