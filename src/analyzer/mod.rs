//! Parsing collaborators: turn build files into plain records.
//!
//! - [`maven`]: `pom.xml` via the quick-xml event reader.
//! - [`gradle`]: `build.gradle.kts` via line-oriented regex scraping.
//! - [`records`]: pre-extracted JSON record sets.

use std::path::Path;

use thiserror::Error;

pub mod gradle;
pub mod maven;
pub mod records;

/// Failure to turn one source into a record. Never fatal for a run: the file
/// is reported and left out of the comparison.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse XML in {path}: {message}")]
    Xml { path: String, message: String },

    #[error("Failed to decode records from {path}: {source}")]
    Records {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub trait Analyzer {
    type Record;

    /// Parse the build file at `path`, identified in the output as `file_id`.
    fn analyze(&self, file_id: &str, path: &Path) -> Result<Self::Record, ParseError>;
}

fn read_source(path: &Path) -> Result<String, ParseError> {
    std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.display().to_string(),
        source,
    })
}
