//! Core processing logic for redscrape.
//!
//! This module contains:
//! - [`models`] - Export records (submissions, comments, redditors, ...)
//! - [`objectify`] - Mapping raw API payloads into records
//! - [`forest`] - Comment reply trees
//! - [`naming`] - Export file names
//! - [`output`] - Format writers (CSV, JSON, JSONL)

pub mod forest;
pub mod models;
pub mod naming;
pub mod objectify;
pub mod output;

pub use forest::{CommentNode, CommentStyle, CommentsOutput, Forest, sort_comments};
pub use models::{CommentRecord, Edited, Interaction, RedditorInfo, SubmissionRecord};
pub use output::{JsonlWriter, to_csv, to_json, write_csv, write_json, write_jsonl};
