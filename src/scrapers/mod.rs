//! Scrapers: one module per export type.
//!
//! Each static scraper follows the same three steps:
//!
//! 1. the job checks its own settings ([`SubredditJob::validate`] and friends),
//! 2. `scrape` fetches through a [`crate::client::RedditApi`] and builds the
//!    export skeleton,
//! 3. `run` writes the skeleton below `scrapes/<date>/` and returns the path.
//!
//! [`livestream`] is the exception: it polls until stopped and appends
//! items as they arrive.

pub mod comments;
pub mod livestream;
pub mod redditor;
pub mod subreddit;

use std::path::PathBuf;

pub use comments::{CommentsExport, CommentsJob};
pub use livestream::{LivestreamSummary, SeenSet, StopReason, StreamItem, display_item, livestream};
pub use redditor::{RedditorExport, RedditorJob};
pub use subreddit::{SubredditExport, SubredditJob};

/// Files written by a batch of scrape jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeReport {
    /// Export files, in job order
    pub written: Vec<PathBuf>,

    /// Targets dropped during validation
    pub skipped: Vec<String>,
}

impl ScrapeReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf) {
        self.written.push(path);
    }

    pub fn skip(&mut self, names: impl IntoIterator<Item = String>) {
        self.skipped.extend(names);
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }
}
