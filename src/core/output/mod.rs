//! Export writers.
//!
//! - [`write_csv`] / [`to_csv`] - one row per record, one column per field
//! - [`write_json`] / [`to_json`] - pretty-printed JSON document
//! - [`write_jsonl`] / [`JsonlWriter`] - one JSON object per line, flushed per record
//!
//! All writers take any [`serde::Serialize`] value, so the same functions
//! export submissions, comments or whole scrape skeletons.
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> redscrape::Result<()> {
//! use redscrape::core::models::SubmissionRecord;
//! use redscrape::core::output::{write_csv, write_json};
//!
//! let posts = vec![SubmissionRecord::default()];
//! write_csv(&posts, "posts.csv")?;
//! write_json(&posts, "posts.json")?;
//! # Ok(())
//! # }
//! ```

mod csv_writer;
mod json_writer;
mod jsonl_writer;

pub use csv_writer::{to_csv, write_csv};
pub use json_writer::{to_json, write_json};
pub use jsonl_writer::{JsonlWriter, write_jsonl};
