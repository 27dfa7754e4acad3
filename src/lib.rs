//! # redscrape
//!
//! A Rust library and CLI for exporting Reddit data: subreddit listings,
//! redditor profiles and submission comment threads to CSV or JSON, plus a
//! livestream of new comments or submissions.
//!
//! ## Overview
//!
//! - **Subreddits** - hot/new/controversial/top/rising listings or a search,
//!   optionally with the subreddit rules
//! - **Redditors** - account information and fourteen interaction lists
//! - **Comments** - a submission's full thread, as a flat list or as nested
//!   reply trees
//! - **Livestream** - new comments or submissions as they are posted
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use redscrape::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let client = HttpClient::new(Credentials::from_env()?, ClientConfig::default())?;
//!
//!     let job = CommentsJob::new("https://redd.it/abc123", 0).with_style(CommentStyle::Structured);
//!     let export = scrapers::comments::scrape(&client, &job)?;
//!     println!(
//!         "{}: {} comments",
//!         export.title(),
//!         export.data.comments.total_comments()
//!     );
//!
//!     write_json(&export, "thread.json")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Structure
//!
//! - [`client`] - the [`RedditApi`](client::RedditApi) trait and its OAuth
//!   implementation [`HttpClient`](client::HttpClient)
//! - [`config`] - credentials, client, export and livestream settings
//! - [`core`] - export records and their construction
//!   - [`core::objectify`] - raw API payloads to records
//!   - [`core::forest`] - comment tree reconstruction
//!   - [`core::naming`] - export file names
//!   - [`core::output`] - [`write_json`](core::output::write_json),
//!     [`write_csv`](core::output::write_csv), [`JsonlWriter`](core::output::JsonlWriter)
//! - [`scrapers`] - subreddit, redditor, comments and livestream scrapers
//! - [`validation`] - checking targets before scraping
//! - [`format`] - [`OutputFormat`](format::OutputFormat)
//! - [`cli`] - CLI types (feature `cli`)
//! - [`error`] - [`ScrapeError`] and [`Result`]
//! - [`prelude`] - convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod client;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod scrapers;
pub mod validation;

// Re-export the main types at the crate root for convenience
pub use error::{Result, ScrapeError};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use redscrape::prelude::*;
/// ```
pub mod prelude {
    // Error types
    pub use crate::error::{Result, ScrapeError};

    // Reddit access
    pub use crate::client::{Category, HttpClient, RedditApi, StreamKind, StreamTarget, TimeFilter};

    // Settings
    pub use crate::config::{ClientConfig, Credentials, ExportConfig, LivestreamConfig};

    // Records and comment trees
    pub use crate::core::models::{CommentRecord, Interaction, RedditorInfo, SubmissionRecord};
    pub use crate::core::{CommentNode, CommentStyle, CommentsOutput, sort_comments};

    // Output
    pub use crate::core::output::{JsonlWriter, write_csv, write_json, write_jsonl};
    pub use crate::format::OutputFormat;

    // Scrapers
    pub use crate::scrapers;
    pub use crate::scrapers::{CommentsJob, RedditorJob, SubredditJob};

    // Validation
    pub use crate::validation::{TargetKind, Validated, validate};
}
