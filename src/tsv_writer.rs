use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::app_config::{LanguageCodeStyle, OutputConfig};
use crate::errors::ConversionError;
use crate::joiner::FlattenedRecord;
use crate::language_utils;

// @module: Tab-separated table output

// @const: Header row, fixed order
pub const COLUMNS: [&str; 13] = [
    "Tier-ID",
    "Type",
    "Display-Name",
    "Category",
    "Speaker-ID",
    "Abbreviation",
    "L1",
    "L2",
    "Languages-Used",
    "Sex",
    "Start",
    "End",
    "String",
];

// @const: Characters that would split a record across fields or lines
static LINE_BREAKING: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t\r\n]+").unwrap());

/// Rendering options for cells
#[derive(Debug, Clone)]
pub struct CellFormat {
    pub list_separator: String,
    pub missing_value: String,
    pub language_codes: LanguageCodeStyle,
}

impl Default for CellFormat {
    fn default() -> Self {
        Self::from(&OutputConfig::default())
    }
}

impl From<&OutputConfig> for CellFormat {
    fn from(config: &OutputConfig) -> Self {
        Self {
            list_separator: config.list_separator.clone(),
            missing_value: config.missing_value.clone(),
            language_codes: config.language_codes,
        }
    }
}

impl CellFormat {
    fn metadata<'a>(&'a self, value: &'a str) -> Cow<'a, str> {
        if value.is_empty() {
            Cow::Borrowed(&self.missing_value)
        } else {
            sanitize_cell(value)
        }
    }

    fn languages(&self, codes: &[String]) -> String {
        if codes.is_empty() {
            return self.missing_value.clone();
        }
        let joined = codes
            .iter()
            .map(|code| language_utils::format_language_code(code, self.language_codes))
            .collect::<Vec<_>>()
            .join(&self.list_separator);
        sanitize_cell(&joined).into_owned()
    }

    fn time(&self, value: Option<u64>) -> String {
        value
            .map(|ms| ms.to_string())
            .unwrap_or_else(|| self.missing_value.clone())
    }

    /// All cells of one record, in column order
    pub fn render(&self, record: &FlattenedRecord) -> Vec<String> {
        vec![
            self.metadata(&record.tier_id).into_owned(),
            self.metadata(&record.tier_type).into_owned(),
            self.metadata(&record.display_name).into_owned(),
            self.metadata(&record.category).into_owned(),
            self.metadata(&record.speaker_id).into_owned(),
            self.metadata(&record.abbreviation).into_owned(),
            self.languages(&record.l1),
            self.languages(&record.l2),
            self.languages(&record.languages_used),
            self.metadata(&record.sex).into_owned(),
            self.time(record.start_ms),
            self.time(record.end_ms),
            sanitize_cell(&record.text).into_owned(),
        ]
    }
}

/// Replace each run of tabs and line breaks with one space
pub fn sanitize_cell(value: &str) -> Cow<'_, str> {
    LINE_BREAKING.replace_all(value, " ")
}

/// Write the header and one line per record; returns the number of records
pub fn write_records<W, I>(writer: &mut W, records: I, format: &CellFormat) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = FlattenedRecord>,
{
    writeln!(writer, "{}", COLUMNS.join("\t"))?;
    let mut count = 0;
    for record in records {
        writeln!(writer, "{}", format.render(&record).join("\t"))?;
        count += 1;
    }
    Ok(count)
}

/// Render the whole table into memory
pub fn render_table<I>(records: I, format: &CellFormat) -> (String, usize)
where
    I: IntoIterator<Item = FlattenedRecord>,
{
    let mut buffer = Vec::new();
    // Writing into a Vec cannot fail
    let count = write_records(&mut buffer, records, format).unwrap_or_default();
    (String::from_utf8_lossy(&buffer).into_owned(), count)
}

/// Write table bytes to `path` through a temporary file in the same directory
pub fn write_table_file(path: &Path, content: &[u8]) -> Result<(), ConversionError> {
    let to_write_error = |source: io::Error| ConversionError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir).map_err(to_write_error)?;
    temp.write_all(content).map_err(to_write_error)?;
    temp.flush().map_err(to_write_error)?;
    temp.persist(path).map_err(|e| to_write_error(e.error))?;
    Ok(())
}
