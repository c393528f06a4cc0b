/*!
 * # exbtsv - EXMARaLDA transcripts to tab-separated tables
 *
 * Flattens EXMARaLDA basic-transcription documents (`.exb`) into one table
 * row per event, with the event's tier and that tier's speaker joined onto
 * every row. The tables load directly into R, pandas and spreadsheet tools.
 *
 * ## Pipeline
 *
 * Each document goes through the same linear steps:
 * - `document`: XML loading into a small element tree
 * - `metadata`: speaker and tier tables keyed by id
 * - `timeline`: timeline points (in milliseconds) and events
 * - `joiner`: lazy join of events with tier and speaker metadata
 * - `tsv_writer`: header plus one tab-separated line per record
 *
 * `converter` ties these together as a stateless function, and
 * `app_controller` runs it over a directory tree with per-file error
 * isolation.
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod converter;
pub mod document;
pub mod errors;
pub mod file_utils;
pub mod joiner;
pub mod language_utils;
pub mod metadata;
pub mod timeline;
pub mod tsv_writer;

use std::path::Path;

// Re-export main types for easier usage
pub use app_config::{Config, UnresolvedTierPolicy};
pub use app_controller::{BatchSummary, Controller};
pub use converter::{ConversionOptions, ConvertedTable, convert_file, convert_str};
pub use errors::ConversionError;
pub use joiner::FlattenedRecord;
pub use metadata::{Speaker, Tier};
pub use timeline::Event;

/// Convert every transcript below `input_dir` into `output_dir` with the
/// default configuration
pub fn convert<P1: AsRef<Path>, P2: AsRef<Path>>(input_dir: P1, output_dir: P2) -> anyhow::Result<BatchSummary> {
    Controller::with_config(Config::default())?.run_folder(input_dir.as_ref(), output_dir.as_ref())
}
