/*!
 * The conversion pipeline for a single transcript.
 *
 * `convert_str` is a pure function from document text to table text:
 * load, extract the speaker and tier tables, join the events against them and
 * render the result. Running it twice on the same input yields identical
 * bytes. `convert_file` wraps it with file I/O.
 */

use log::debug;
use std::path::Path;

use crate::app_config::{Config, TimeUnit, UnresolvedTierPolicy};
use crate::document::{self, Document};
use crate::errors::ConversionError;
use crate::joiner::{self, JoinContext};
use crate::metadata;
use crate::timeline;
use crate::tsv_writer::{self, CellFormat};

/// Settings that influence the output of one conversion
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    pub default_time_unit: TimeUnit,
    pub unresolved_tiers: UnresolvedTierPolicy,
    pub format: CellFormat,
}

impl From<&Config> for ConversionOptions {
    fn from(config: &Config) -> Self {
        Self {
            default_time_unit: config.input.default_time_unit,
            unresolved_tiers: config.unresolved_tiers,
            format: CellFormat::from(&config.output),
        }
    }
}

/// Result of converting one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedTable {
    /// Full table text, header included
    pub content: String,
    /// Events found in the document
    pub events: usize,
    /// Data rows written
    pub rows: usize,
}

impl ConvertedTable {
    /// Events dropped by the skip policy
    pub fn skipped(&self) -> usize {
        self.events - self.rows
    }
}

/// Convert an already parsed document
pub fn convert_document(document: &Document, options: &ConversionOptions) -> Result<ConvertedTable, ConversionError> {
    document.check_structure()?;

    let speakers = metadata::extract_speakers(document)?;
    let tiers = metadata::extract_tiers(document)?;
    let timeline = timeline::extract_timeline(document, options.default_time_unit)?;
    let events = timeline::extract_events(document)?;

    let context = JoinContext {
        speakers: &speakers,
        tiers: &tiers,
        timeline: &timeline,
        policy: options.unresolved_tiers,
    };
    let records = joiner::join_events(&events, context);
    let (content, rows) = tsv_writer::render_table(records, &options.format);

    debug!("{} events joined into {} rows", events.len(), rows);
    Ok(ConvertedTable {
        content,
        events: events.len(),
        rows,
    })
}

/// Convert transcript text to table text
pub fn convert_str(xml: &str, options: &ConversionOptions) -> Result<ConvertedTable, ConversionError> {
    let document = document::parse_document(xml)?;
    convert_document(&document, options)
}

/// Convert `input` and write the table to `output`
pub fn convert_file(input: &Path, output: &Path, options: &ConversionOptions) -> Result<ConvertedTable, ConversionError> {
    let document = document::load_document(input)?;
    let table = convert_document(&document, options)?;
    tsv_writer::write_table_file(output, table.content.as_bytes())?;
    Ok(table)
}
