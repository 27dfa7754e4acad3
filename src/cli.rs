//! Command-line interface definition using clap.
//!
//! This module defines:
//! - [`Args`] - global options and the [`Command`] to run
//! - [`CategoryArg`], [`TimeFilterArg`], [`FormatArg`] - value enums with
//!   short aliases, convertible into the library types
//!
//! # Example
//!
//! ```rust
//! use clap::Parser;
//! use redscrape::cli::{Args, Command};
//!
//! let args = Args::parse_from(["redscrape", "subreddit", "rust", "top", "10", "week"]);
//! assert!(matches!(args.command, Command::Subreddit { .. }));
//! ```

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::client::{Category, StreamKind, StreamTarget, TimeFilter};
use crate::validation::normalize_name;

/// Scrape subreddits, redditors and submission comments from Reddit
/// into CSV or JSON, or livestream new activity.
#[derive(Parser, Debug, Clone)]
#[command(name = "redscrape")]
#[command(version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    redscrape subreddit rust top 25 week --rules
    redscrape r askreddit,pics hot 10 --format csv
    redscrape r rust search \"borrow checker\" year
    redscrape redditor spez 20
    redscrape c https://www.reddit.com/r/rust/comments/abc123/title/ 0
    redscrape c https://redd.it/abc123 50 --raw --format csv
    redscrape live --subreddit rust --submissions --duration 600

Credentials are read from REDDIT_CLIENT_ID, REDDIT_CLIENT_SECRET,
REDDIT_USERNAME and REDDIT_PASSWORD (a .env file works too).")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Export format
    #[arg(short, long, value_enum, default_value = "json", global = true)]
    pub format: FormatArg,

    /// Directory that holds `scrapes/`
    #[arg(short, long, value_name = "DIR", default_value = ".", global = true)]
    pub output_dir: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Export submissions from one or more subreddits
    #[command(visible_alias = "r")]
    Subreddit {
        /// Subreddit names, comma-separated
        subreddits: String,

        /// Listing category
        #[arg(value_enum)]
        category: CategoryArg,

        /// Number of results, or search keywords for the search category
        n_results_or_keywords: String,

        /// Time filter (controversial, top and search only)
        #[arg(value_enum)]
        time_filter: Option<TimeFilterArg>,

        /// Include the subreddit rules and post requirements
        #[arg(long)]
        rules: bool,
    },

    /// Export redditor profiles and interactions (JSON only)
    #[command(visible_alias = "u")]
    Redditor {
        /// Redditor names, comma-separated
        redditors: String,

        /// Results per interaction listing
        n_results: String,
    },

    /// Export the comments of one or more submissions
    #[command(visible_alias = "c")]
    Comments {
        /// Submission URLs, comma-separated
        urls: String,

        /// Top-level comments to keep (0 for all)
        n_results: usize,

        /// Flat list in fetch order instead of reply trees
        #[arg(long)]
        raw: bool,
    },

    /// Livestream new comments or submissions
    #[command(visible_alias = "l")]
    Live(LiveArgs),
}

#[derive(ClapArgs, Debug, Clone)]
#[command(group(clap::ArgGroup::new("target").required(true).args(["subreddit", "redditor"])))]
pub struct LiveArgs {
    /// Stream a subreddit
    #[arg(long, value_name = "NAME")]
    pub subreddit: Option<String>,

    /// Stream a redditor
    #[arg(long, value_name = "NAME")]
    pub redditor: Option<String>,

    /// Stream submissions instead of comments
    #[arg(long)]
    pub submissions: bool,

    /// Do not save the stream to a file
    #[arg(long)]
    pub nosave: bool,

    /// Stop after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<u64>,

    /// Stop after this many polls
    #[arg(long, value_name = "N")]
    pub max_polls: Option<u64>,
}

impl LiveArgs {
    /// The stream target, with any `r/` or `u/` prefix stripped.
    pub fn target(&self) -> Option<StreamTarget> {
        match (&self.subreddit, &self.redditor) {
            (Some(name), _) => Some(StreamTarget::Subreddit(normalize_name(name))),
            (None, Some(name)) => Some(StreamTarget::Redditor(normalize_name(name))),
            (None, None) => None,
        }
    }

    pub fn kind(&self) -> StreamKind {
        if self.submissions {
            StreamKind::Submissions
        } else {
            StreamKind::Comments
        }
    }
}

/// Splits a comma-separated target list, dropping empty entries.
///
/// ```rust
/// use redscrape::cli::split_targets;
///
/// assert_eq!(split_targets("rust, pics,,"), vec!["rust", "pics"]);
/// ```
pub fn split_targets(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Subreddit listing category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryArg {
    #[value(alias = "h")]
    Hot,
    #[value(alias = "n")]
    New,
    #[value(alias = "c")]
    Controversial,
    #[value(alias = "t")]
    Top,
    #[value(alias = "r")]
    Rising,
    #[value(alias = "s")]
    Search,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Category {
        match arg {
            CategoryArg::Hot => Category::Hot,
            CategoryArg::New => Category::New,
            CategoryArg::Controversial => Category::Controversial,
            CategoryArg::Top => Category::Top,
            CategoryArg::Rising => Category::Rising,
            CategoryArg::Search => Category::Search,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilterArg {
    Hour,
    Day,
    Week,
    Month,
    Year,
    All,
}

impl From<TimeFilterArg> for TimeFilter {
    fn from(arg: TimeFilterArg) -> TimeFilter {
        match arg {
            TimeFilterArg::Hour => TimeFilter::Hour,
            TimeFilterArg::Day => TimeFilter::Day,
            TimeFilterArg::Week => TimeFilter::Week,
            TimeFilterArg::Month => TimeFilter::Month,
            TimeFilterArg::Year => TimeFilter::Year,
            TimeFilterArg::All => TimeFilter::All,
        }
    }
}

/// Export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatArg {
    /// Comma-delimited, one row per record
    Csv,

    /// Full export document (default)
    #[default]
    Json,

    /// One JSON object per line
    #[value(alias = "ndjson")]
    Jsonl,
}

// Conversion to library format type
impl From<FormatArg> for crate::format::OutputFormat {
    fn from(format: FormatArg) -> crate::format::OutputFormat {
        match format {
            FormatArg::Csv => crate::format::OutputFormat::Csv,
            FormatArg::Json => crate::format::OutputFormat::Json,
            FormatArg::Jsonl => crate::format::OutputFormat::Jsonl,
        }
    }
}
