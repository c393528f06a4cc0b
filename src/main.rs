// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use log::{error, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use exbtsv::app_config::{self, Config, LanguageCodeStyle, UnresolvedTierPolicy};
use exbtsv::file_utils::FileManager;
use exbtsv::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for LanguageCodeStyle to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLanguageCodes {
    AsDeclared,
    Part1,
    Part2t,
}

impl From<CliLanguageCodes> for LanguageCodeStyle {
    fn from(cli_style: CliLanguageCodes) -> Self {
        match cli_style {
            CliLanguageCodes::AsDeclared => LanguageCodeStyle::AsDeclared,
            CliLanguageCodes::Part1 => LanguageCodeStyle::Part1,
            CliLanguageCodes::Part2t => LanguageCodeStyle::Part2t,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert transcripts to TSV tables (default command)
    Convert(ConvertArgs),

    /// Generate shell completions for exbtsv
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Transcript file or directory to convert
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Directory the tables are written to (created if missing)
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Drop events whose tier is not declared instead of blanking their metadata
    #[arg(long)]
    skip_unresolved: bool,

    /// Separator inside L1, L2 and Languages-Used cells
    #[arg(long)]
    list_separator: Option<String>,

    /// Text written into empty metadata and time cells
    #[arg(long)]
    missing_value: Option<String>,

    /// Language code style in the language columns
    #[arg(long, value_enum)]
    language_codes: Option<CliLanguageCodes>,
}

/// exbtsv - EXMARaLDA transcripts to tab-separated tables
///
/// Flattens EXMARaLDA basic-transcription files into one row per event,
/// joining speaker and tier metadata onto every row.
#[derive(Parser, Debug)]
#[command(name = "exbtsv")]
#[command(version)]
#[command(about = "Convert EXMARaLDA transcripts to TSV tables")]
#[command(long_about = "exbtsv flattens EXMARaLDA basic-transcription (.exb) files into tab-separated tables.

EXAMPLES:
    exbtsv corpus/ tables/                      # Convert every .exb below corpus/
    exbtsv session1.exb tables/                 # Convert a single file
    exbtsv --skip-unresolved corpus/ tables/    # Drop events of undeclared tiers
    exbtsv --missing-value NA corpus/ tables/   # Write NA into empty cells
    exbtsv completions bash > exbtsv.bash       # Generate bash completions

CONFIGURATION:
    Settings are read from conf.json if it exists. You can specify a different
    file with --config-path. Command line flags override the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Transcript file or directory to convert
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Directory the tables are written to (created if missing)
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Drop events whose tier is not declared instead of blanking their metadata
    #[arg(long)]
    skip_unresolved: bool,

    /// Separator inside L1, L2 and Languages-Used cells
    #[arg(long)]
    list_separator: Option<String>,

    /// Text written into empty metadata and time cells
    #[arg(long)]
    missing_value: Option<String>,

    /// Language code style in the language columns
    #[arg(long, value_enum)]
    language_codes: Option<CliLanguageCodes>,
}

// @struct: Stderr logger with timestamps and coloured levels
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (colour, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    if let Err(e) = run() {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "exbtsv", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Convert(args)) => run_convert(args),
        None => {
            // Default behavior - top-level args
            let input_path = cli.input_path.ok_or_else(|| {
                anyhow!("INPUT_PATH is required when no subcommand is specified")
            })?;
            let output_dir = cli.output_dir.ok_or_else(|| {
                anyhow!("OUTPUT_DIR is required when no subcommand is specified")
            })?;

            run_convert(ConvertArgs {
                input_path,
                output_dir,
                config_path: cli.config_path,
                log_level: cli.log_level,
                skip_unresolved: cli.skip_unresolved,
                list_separator: cli.list_separator,
                missing_value: cli.missing_value,
                language_codes: cli.language_codes,
            })
        }
    }
}

// @applies: Command line overrides on top of the file configuration
fn build_config(options: &ConvertArgs) -> Result<Config> {
    let mut config = Config::load_or_default(&options.config_path)?;

    if let Some(level) = &options.log_level {
        config.log_level = level.clone().into();
    }
    if options.skip_unresolved {
        config.unresolved_tiers = UnresolvedTierPolicy::Skip;
    }
    if let Some(separator) = &options.list_separator {
        config.output.list_separator = separator.clone();
    }
    if let Some(missing) = &options.missing_value {
        config.output.missing_value = missing.clone();
    }
    if let Some(style) = &options.language_codes {
        config.output.language_codes = style.clone().into();
    }

    Ok(config)
}

fn run_convert(options: ConvertArgs) -> Result<()> {
    // Apply a command line level before the config is read, so config errors show
    if let Some(level) = &options.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = build_config(&options)?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    if FileManager::file_exists(&options.input_path) {
        controller.run(&options.input_path, &options.output_dir)?;
        return Ok(());
    }

    if !FileManager::dir_exists(&options.input_path) {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    let summary = controller.run_folder(&options.input_path, &options.output_dir)?;
    if summary.has_failures() {
        return Err(anyhow!(
            "{} of {} files failed to convert",
            summary.failed.len(),
            summary.total()
        ));
    }

    Ok(())
}
