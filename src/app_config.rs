use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles loading, validating and defaulting the converter
/// settings. Every field has a default so an empty `{}` file is valid.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Input discovery settings
    #[serde(default)]
    pub input: InputConfig,

    /// Table rendering settings
    #[serde(default)]
    pub output: OutputConfig,

    /// What to do with events whose tier is not declared
    #[serde(default)]
    pub unresolved_tiers: UnresolvedTierPolicy,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Handling of events that reference an unknown tier
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnresolvedTierPolicy {
    /// Keep the row, leave tier and speaker columns blank
    #[default]
    Blank,
    /// Drop the row and log a warning
    Skip,
}

impl std::fmt::Display for UnresolvedTierPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank => write!(f, "blank"),
            Self::Skip => write!(f, "skip"),
        }
    }
}

/// Unit of the `time` values on the common timeline
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    #[default]
    Seconds,
    Milliseconds,
}

impl TimeUnit {
    // @returns: Factor turning one unit into milliseconds
    pub fn millis_factor(&self) -> f64 {
        match self {
            Self::Seconds => 1000.0,
            Self::Milliseconds => 1.0,
        }
    }

    /// Parse a unit as written in a document's meta information
    pub fn from_declaration(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "s" | "sec" | "secs" | "second" | "seconds" => Some(Self::Seconds),
            "ms" | "msec" | "millisecond" | "milliseconds" => Some(Self::Milliseconds),
            _ => None,
        }
    }
}

/// How language codes are rendered in the L1/L2/Languages-Used cells
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LanguageCodeStyle {
    /// Exactly as written in the transcript
    #[default]
    AsDeclared,
    /// ISO 639-1 where one exists, otherwise ISO 639-2/T
    Part1,
    /// ISO 639-2/T
    Part2t,
}

/// Input discovery configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InputConfig {
    /// File extension of transcripts, without the dot
    #[serde(default = "default_input_extension")]
    pub extension: String,

    /// Also convert files whose name starts with a dot
    #[serde(default)]
    pub include_hidden: bool,

    /// Time unit assumed when a transcript does not declare one
    #[serde(default)]
    pub default_time_unit: TimeUnit,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            extension: default_input_extension(),
            include_hidden: false,
            default_time_unit: TimeUnit::default(),
        }
    }
}

/// Output table configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    /// File extension of written tables, without the dot
    #[serde(default = "default_output_extension")]
    pub extension: String,

    /// Separator between values inside a multi-valued cell
    #[serde(default = "default_list_separator")]
    pub list_separator: String,

    /// Rendered in place of empty metadata and time cells ("NA" suits R)
    #[serde(default)]
    pub missing_value: String,

    /// Language code rendering
    #[serde(default)]
    pub language_codes: LanguageCodeStyle,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            extension: default_output_extension(),
            list_separator: default_list_separator(),
            missing_value: String::new(),
            language_codes: LanguageCodeStyle::default(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_input_extension() -> String {
    "exb".to_string()
}

fn default_output_extension() -> String {
    "tsv".to_string()
}

fn default_list_separator() -> String {
    ",".to_string()
}

fn has_line_breaking_chars(value: &str) -> bool {
    value.contains(['\t', '\n', '\r'])
}

impl Config {
    /// Load a configuration file, or the defaults when it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let config: Config = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.input.extension.trim_start_matches('.').is_empty() {
            return Err(anyhow!("Input extension must not be empty"));
        }
        if self.output.extension.trim_start_matches('.').is_empty() {
            return Err(anyhow!("Output extension must not be empty"));
        }

        // Both would break the one-record-per-line layout
        if self.output.list_separator.is_empty() {
            return Err(anyhow!("List separator must not be empty"));
        }
        if has_line_breaking_chars(&self.output.list_separator) {
            return Err(anyhow!(
                "List separator must not contain tabs or line breaks: {:?}",
                self.output.list_separator
            ));
        }
        if has_line_breaking_chars(&self.output.missing_value) {
            return Err(anyhow!(
                "Missing value must not contain tabs or line breaks: {:?}",
                self.output.missing_value
            ));
        }

        Ok(())
    }
}
