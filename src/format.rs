//! Output format types for the redscrape library.
//!
//! These types don't depend on the CLI framework, so library users can pick
//! a format without pulling in clap.
//!
//! # Example
//!
//! ```rust
//! use redscrape::format::OutputFormat;
//!
//! let format = OutputFormat::Jsonl;
//! assert_eq!(format.extension(), "jsonl");
//! assert!(format.is_flat());
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Export file format.
///
/// - [`Csv`](OutputFormat::Csv) - flat records, one row each
/// - [`Json`](OutputFormat::Json) - the full scrape skeleton (default)
/// - [`Jsonl`](OutputFormat::Jsonl) - one record per line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// Comma-delimited CSV with a header row
    Csv,

    /// Pretty-printed JSON document
    ///
    /// The only format that keeps scrape settings and nested data such as
    /// comment trees and redditor interactions.
    #[default]
    Json,

    /// JSON Lines - one JSON object per line
    Jsonl,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    ///
    /// ```rust
    /// use redscrape::format::OutputFormat;
    ///
    /// assert_eq!(OutputFormat::Csv.extension(), "csv");
    /// ```
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Jsonl => "jsonl",
        }
    }

    /// Whether the format can only hold a flat list of records.
    pub fn is_flat(&self) -> bool {
        matches!(self, OutputFormat::Csv | OutputFormat::Jsonl)
    }

    /// `dir/stem.<extension>`
    pub fn file_path(&self, dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{stem}.{}", self.extension()))
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Csv => write!(f, "CSV"),
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Jsonl => write!(f, "JSONL"),
        }
    }
}

/// Writes a list of records in the given format.
///
/// JSON wraps nothing around the records; scrapers that export a skeleton
/// call [`crate::core::output::write_json`] directly.
pub fn write_records<T: Serialize>(records: &[T], path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => crate::core::output::write_csv(records, path).map(|_| ()),
        OutputFormat::Json => crate::core::output::write_json(records, path),
        OutputFormat::Jsonl => crate::core::output::write_jsonl(records, path).map(|_| ()),
    }
}
