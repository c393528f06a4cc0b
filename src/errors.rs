/*!
 * Error types for the exbtsv converter.
 *
 * Every failure that can stop the conversion of a single document is a
 * `ConversionError`. The batch controller logs these per file and moves on,
 * so one broken transcript never aborts a whole corpus.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while converting one transcript
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The input file could not be read
    #[error("Failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The input is not well-formed XML
    #[error("Malformed XML at byte {position}: {message}")]
    Parse {
        /// Byte offset reported by the XML reader
        position: u64,
        message: String,
    },

    /// A section the converter needs is absent from the document
    #[error("Missing required section <{section}>")]
    Structure { section: String },

    /// An event belongs to a tier that is not declared in the tier table
    #[error("Event #{event_index} references unknown tier '{tier_id}'")]
    UnresolvedReference {
        tier_id: String,
        /// Zero-based position of the event in document order
        event_index: usize,
    },

    /// The output table could not be written
    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConversionError {
    pub(crate) fn parse(position: u64, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn structure(section: &str) -> Self {
        Self::Structure {
            section: section.to_string(),
        }
    }

    /// Short, stable name of the error kind for summaries and the issues log
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Read { .. } => "ReadError",
            Self::Parse { .. } => "ParseError",
            Self::Structure { .. } => "StructureError",
            Self::UnresolvedReference { .. } => "UnresolvedReferenceError",
            Self::Write { .. } => "WriteError",
        }
    }
}
