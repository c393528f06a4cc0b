use anyhow::{Result, anyhow};
use log::{error, warn, info, debug};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use indicatif::{ProgressBar, ProgressStyle};
use crate::app_config::Config;
use crate::converter::{self, ConversionOptions, ConvertedTable};
use crate::errors::ConversionError;
use crate::file_utils::FileManager;

// @module: Batch conversion controller

// @const: Issues log written next to the outputs when files fail
pub const ISSUES_LOG_NAME: &str = "exbtsv.issues.log";

/// A file that could not be converted
#[derive(Debug)]
pub struct FailedFile {
    pub input: PathBuf,
    pub error: ConversionError,
}

/// Outcome of converting a batch of transcripts
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Output paths written, in processing order
    pub converted: Vec<PathBuf>,
    pub failed: Vec<FailedFile>,
    /// Data rows written across all files
    pub rows: usize,
    /// Events dropped by the skip policy across all files
    pub skipped_events: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.converted.len() + self.failed.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Main application controller for transcript conversion
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn options(&self) -> ConversionOptions {
        ConversionOptions::from(&self.config)
    }

    /// Output path for an input transcript
    pub fn output_path_for(&self, input_file: &Path, output_dir: &Path) -> PathBuf {
        FileManager::generate_output_path(input_file, output_dir, &self.config.output.extension)
    }

    /// Convert a single transcript into `output_dir`
    pub fn run(&self, input_file: &Path, output_dir: &Path) -> Result<ConvertedTable> {
        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        FileManager::ensure_dir(output_dir)?;

        let output = self.output_path_for(input_file, output_dir);
        let table = converter::convert_file(input_file, &output, &self.options())?;
        Self::report_file(input_file, &output, &table);
        Ok(table)
    }

    fn report_file(input: &Path, output: &Path, table: &ConvertedTable) {
        if table.skipped() > 0 {
            info!(
                "Converted {:?} -> {:?}: {} rows ({} events skipped)",
                input, output, table.rows, table.skipped()
            );
        } else {
            info!("Converted {:?} -> {:?}: {} rows", input, output, table.rows);
        }
    }

    /// Convert every transcript below `input_dir` into `output_dir`.
    /// A failing file is logged and recorded; the batch goes on.
    pub fn run_folder(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let inputs = FileManager::find_files(
            input_dir,
            &self.config.input.extension,
            self.config.input.include_hidden,
        )?;
        FileManager::ensure_dir(output_dir)?;
        Self::clear_issues_log(output_dir);

        if inputs.is_empty() {
            warn!(
                "No .{} files found in directory: {:?}",
                self.config.input.extension.trim_start_matches('.'),
                input_dir
            );
            return Ok(BatchSummary::default());
        }
        debug!("Found {} transcripts in {:?}", inputs.len(), input_dir);

        let progress = ProgressBar::new(inputs.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style.progress_chars("=> "));

        let options = self.options();
        let mut summary = BatchSummary::default();
        let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
        // Rows and skipped events per written output, replaced on collision
        let mut written: HashMap<PathBuf, (usize, usize)> = HashMap::new();

        for input in &inputs {
            let file_name = input
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            progress.set_message(file_name.clone());

            let output = self.output_path_for(input, output_dir);
            if let Some(previous) = claimed.insert(output.clone(), input.clone()) {
                warn!(
                    "{:?} and {:?} both map to {:?}; the later one wins",
                    previous, input, output
                );
            }

            match converter::convert_file(input, &output, &options) {
                Ok(table) => {
                    progress.suspend(|| Self::report_file(input, &output, &table));
                    match written.insert(output.clone(), (table.rows, table.skipped())) {
                        Some((rows, skipped)) => {
                            summary.rows -= rows;
                            summary.skipped_events -= skipped;
                        }
                        None => summary.converted.push(output),
                    }
                    summary.rows += table.rows;
                    summary.skipped_events += table.skipped();
                }
                Err(e) => {
                    progress.suspend(|| error!("{} in {}: {}", e.kind(), file_name, e));
                    summary.failed.push(FailedFile {
                        input: input.clone(),
                        error: e,
                    });
                }
            }

            progress.inc(1);
        }

        progress.finish_and_clear();

        info!(
            "Batch finished in {}: {} converted, {} failed, {} rows",
            Self::format_duration(start_time.elapsed()),
            summary.converted.len(),
            summary.failed.len(),
            summary.rows
        );

        if summary.has_failures() {
            self.write_issues_log(output_dir, &summary);
        }

        Ok(summary)
    }

    // @removes: Issues log left by an earlier run
    fn clear_issues_log(output_dir: &Path) {
        let log_path = output_dir.join(ISSUES_LOG_NAME);
        if FileManager::file_exists(&log_path) {
            if let Err(e) = std::fs::remove_file(&log_path) {
                warn!("Failed to remove old issues log {:?}: {}", log_path, e);
            }
        }
    }

    fn write_issues_log(&self, output_dir: &Path, summary: &BatchSummary) {
        let log_path = output_dir.join(ISSUES_LOG_NAME);
        for failed in &summary.failed {
            let line = format!("{} {:?}: {}", failed.error.kind(), failed.input, failed.error);
            if let Err(e) = FileManager::append_to_log_file(&log_path, &line) {
                warn!("Failed to write issues log: {}", e);
                return;
            }
        }
        info!("Failures recorded in {:?}", log_path);
    }

    // @formats: Duration as "1m 02s" or "3.4s"
    fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs >= 60 {
            format!("{}m {:02}s", secs / 60, secs % 60)
        } else {
            format!("{:.1}s", duration.as_secs_f64())
        }
    }
}
