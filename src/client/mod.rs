//! Reddit API access.
//!
//! Everything the scrapers need from Reddit goes through the [`RedditApi`]
//! trait. [`HttpClient`] implements it over the real OAuth API; tests swap in
//! an in-memory fake.
//!
//! # Example
//!
//! ```rust,no_run
//! use redscrape::client::{Category, HttpClient, RedditApi};
//! use redscrape::config::{ClientConfig, Credentials};
//!
//! # fn main() -> redscrape::Result<()> {
//! let client = HttpClient::new(Credentials::from_env()?, ClientConfig::default())?;
//! let posts = client.subreddit_submissions("rust", Category::Top, None, Some(redscrape::client::TimeFilter::Week), 10)?;
//! println!("{} posts", posts.len());
//! # Ok(())
//! # }
//! ```

mod http;
mod types;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ScrapeError};

pub use http::HttpClient;
pub use types::{
    Listing, ListingData, RawComment, RawEdited, RawModerated, RawMore, RawMultiSubreddit,
    RawMultireddit, RawRedditor, RawRule, RawSubmission, RawSubreddit, RawThing, RawTrophy,
    Thing, strip_fullname_prefix,
};

/// Subreddit listing category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Hot,
    New,
    Controversial,
    Top,
    Rising,
    Search,
}

impl Category {
    /// Single-letter code used on the command line.
    pub fn short_code(&self) -> char {
        match self {
            Category::Hot => 'h',
            Category::New => 'n',
            Category::Controversial => 'c',
            Category::Top => 't',
            Category::Rising => 'r',
            Category::Search => 's',
        }
    }

    /// Lowercase name, also the listing path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Hot => "hot",
            Category::New => "new",
            Category::Controversial => "controversial",
            Category::Top => "top",
            Category::Rising => "rising",
            Category::Search => "search",
        }
    }

    /// Whether a time filter applies to this category.
    pub fn is_filterable(&self) -> bool {
        matches!(self, Category::Controversial | Category::Top | Category::Search)
    }

    pub fn all() -> &'static [Category] {
        &[
            Category::Hot,
            Category::New,
            Category::Controversial,
            Category::Top,
            Category::Rising,
            Category::Search,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Hot => "Hot",
            Category::New => "New",
            Category::Controversial => "Controversial",
            Category::Top => "Top",
            Category::Rising => "Rising",
            Category::Search => "Search",
        };
        f.write_str(name)
    }
}

impl FromStr for Category {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        Category::all()
            .iter()
            .copied()
            .find(|c| c.as_str() == lower || (lower.len() == 1 && lower.starts_with(c.short_code())))
            .ok_or_else(|| {
                ScrapeError::invalid_setting(
                    "category",
                    format!("'{s}' is not one of h, n, c, t, r, s"),
                )
            })
    }
}

/// Time window for controversial, top and search listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    Hour,
    Day,
    Week,
    Month,
    Year,
    #[default]
    All,
}

impl TimeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFilter::Hour => "hour",
            TimeFilter::Day => "day",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
            TimeFilter::Year => "year",
            TimeFilter::All => "all",
        }
    }
}

impl fmt::Display for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeFilter {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hour" => Ok(TimeFilter::Hour),
            "day" => Ok(TimeFilter::Day),
            "week" => Ok(TimeFilter::Week),
            "month" => Ok(TimeFilter::Month),
            "year" => Ok(TimeFilter::Year),
            "all" => Ok(TimeFilter::All),
            _ => Err(ScrapeError::invalid_setting(
                "time filter",
                format!("'{s}' is not one of hour, day, week, month, year, all"),
            )),
        }
    }
}

/// Sort order for the mixed `overview` listing of a redditor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverviewSort {
    Hot,
    New,
    Top,
    Controversial,
}

impl OverviewSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverviewSort::Hot => "hot",
            OverviewSort::New => "new",
            OverviewSort::Top => "top",
            OverviewSort::Controversial => "controversial",
        }
    }
}

/// Per-user listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserListing {
    Comments,
    Submissions,
    Overview(OverviewSort),
    Gilded,
    Gildings,
    Upvoted,
    Downvoted,
    Hidden,
    Saved,
}

impl UserListing {
    /// Path below `/user/{name}/` and the extra query the listing needs.
    pub fn path(&self) -> (&'static str, Option<(&'static str, &'static str)>) {
        match self {
            UserListing::Comments => ("comments", Some(("sort", "new"))),
            UserListing::Submissions => ("submitted", Some(("sort", "new"))),
            UserListing::Overview(sort) => ("overview", Some(("sort", sort.as_str()))),
            UserListing::Gilded => ("gilded", None),
            UserListing::Gildings => ("gilded/given", None),
            UserListing::Upvoted => ("upvoted", None),
            UserListing::Downvoted => ("downvoted", None),
            UserListing::Hidden => ("hidden", None),
            UserListing::Saved => ("saved", None),
        }
    }
}

/// What a livestream follows.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamTarget {
    Subreddit(String),
    Redditor(String),
}

impl StreamTarget {
    pub fn name(&self) -> &str {
        match self {
            StreamTarget::Subreddit(name) | StreamTarget::Redditor(name) => name,
        }
    }

    /// Directory under `livestream/` the output goes into.
    pub fn dir_name(&self) -> &'static str {
        match self {
            StreamTarget::Subreddit(_) => "subreddits",
            StreamTarget::Redditor(_) => "redditors",
        }
    }
}

impl fmt::Display for StreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamTarget::Subreddit(name) => write!(f, "r/{name}"),
            StreamTarget::Redditor(name) => write!(f, "u/{name}"),
        }
    }
}

/// Item kind a livestream emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    #[default]
    Comments,
    Submissions,
}

impl StreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StreamKind::Comments => "comments",
            StreamKind::Submissions => "submissions",
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The operations the scrapers need from Reddit.
///
/// Lookups of things that do not exist return [`ScrapeError::NotFound`];
/// listings the account cannot read return [`ScrapeError::Forbidden`].
pub trait RedditApi {
    /// Name of the logged-in account.
    fn me(&self) -> Result<String>;

    fn subreddit_about(&self, name: &str) -> Result<RawSubreddit>;

    /// Submissions from a subreddit listing. `query` is only used by
    /// [`Category::Search`], `time_filter` only by filterable categories.
    fn subreddit_submissions(
        &self,
        name: &str,
        category: Category,
        query: Option<&str>,
        time_filter: Option<TimeFilter>,
        limit: usize,
    ) -> Result<Vec<RawSubmission>>;

    fn subreddit_rules(&self, name: &str) -> Result<Vec<RawRule>>;

    fn post_requirements(&self, name: &str) -> Result<Value>;

    fn redditor_about(&self, name: &str) -> Result<RawRedditor>;

    fn redditor_trophies(&self, name: &str) -> Result<Vec<RawTrophy>>;

    /// A user listing; may mix comments and submissions.
    fn redditor_listing(&self, name: &str, listing: UserListing, limit: usize)
    -> Result<Vec<RawThing>>;

    fn redditor_moderated(&self, name: &str) -> Result<Vec<RawModerated>>;

    fn redditor_multireddits(&self, name: &str) -> Result<Vec<RawMultireddit>>;

    /// Submission metadata only, without comments.
    fn submission_by_id(&self, id: &str) -> Result<RawSubmission>;

    /// A submission and every comment in its thread, `more` stubs resolved.
    /// Comments come breadth-first from the initial tree, followed by
    /// resolved stubs in resolution order.
    fn submission(&self, id: &str) -> Result<(RawSubmission, Vec<RawComment>)>;

    /// The newest items of a stream, newest first.
    fn stream_batch(
        &self,
        target: &StreamTarget,
        kind: StreamKind,
        limit: usize,
    ) -> Result<Vec<RawThing>>;
}
