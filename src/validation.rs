//! Checking scrape targets against Reddit before any work starts.
//!
//! Every subreddit, redditor or submission named on the command line is
//! looked up once. Targets that do not exist (or that the account cannot
//! see) are reported and skipped; the scrape only fails when none are left.

use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::client::RedditApi;
use crate::error::{Result, ScrapeError};

static SUBMISSION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:/comments/|redd\.it/)([a-z0-9]+)").unwrap());

/// What kind of target a name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    Subreddit,
    Redditor,
    Submission,
}

impl TargetKind {
    pub fn label(&self) -> &'static str {
        match self {
            TargetKind::Subreddit => "subreddit",
            TargetKind::Redditor => "redditor",
            TargetKind::Submission => "submission",
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of [`validate`]; both lists keep the input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validated {
    pub valid: Vec<String>,
    pub invalid: Vec<String>,
}

/// Strips `r/`, `/r/`, `u/` and `/u/` prefixes and surrounding whitespace.
///
/// ```rust
/// use redscrape::validation::normalize_name;
///
/// assert_eq!(normalize_name(" r/rust "), "rust");
/// assert_eq!(normalize_name("/u/spez"), "spez");
/// assert_eq!(normalize_name("askreddit"), "askreddit");
/// ```
pub fn normalize_name(name: &str) -> String {
    let name = name.trim();
    let name = name.strip_prefix('/').unwrap_or(name);
    ["r/", "R/", "u/", "U/", "user/"]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
        .trim()
        .to_string()
}

/// Extracts the submission id from a submission URL.
///
/// Accepts `.../comments/<id>/...` and `redd.it/<id>` links.
///
/// ```rust
/// use redscrape::validation::parse_submission_id;
///
/// let id = parse_submission_id("https://www.reddit.com/r/rust/comments/abc123/some_title/").unwrap();
/// assert_eq!(id, "abc123");
/// assert!(parse_submission_id("https://example.com").is_err());
/// ```
pub fn parse_submission_id(url: &str) -> Result<String> {
    SUBMISSION_ID
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .ok_or_else(|| ScrapeError::invalid_url(url))
}

fn check_one(api: &dyn RedditApi, name: &str, kind: TargetKind) -> Result<()> {
    match kind {
        TargetKind::Subreddit => api.subreddit_about(name).map(|_| ()),
        TargetKind::Redditor => api.redditor_about(name).map(|_| ()),
        TargetKind::Submission => {
            let id = parse_submission_id(name)?;
            api.submission_by_id(&id).map(|_| ())
        }
    }
}

/// Looks up every target and splits them into valid and invalid.
///
/// Duplicates are checked once. Missing, private and unparseable targets are
/// invalid; any other error, a rejected login included, aborts validation.
pub fn validate(api: &dyn RedditApi, names: &[String], kind: TargetKind) -> Result<Validated> {
    let mut seen = HashSet::new();
    let mut result = Validated::default();

    for raw in names {
        let name = match kind {
            TargetKind::Submission => raw.trim().to_string(),
            _ => normalize_name(raw),
        };
        if name.is_empty() || !seen.insert(name.to_lowercase()) {
            continue;
        }

        match check_one(api, &name, kind) {
            Ok(()) => {
                debug!(target = %name, %kind, "valid");
                result.valid.push(name);
            }
            Err(
                e @ (ScrapeError::NotFound { .. }
                | ScrapeError::Forbidden { .. }
                | ScrapeError::InvalidUrl { .. }),
            ) => {
                warn!(target = %name, %kind, error = %e, "skipping invalid target");
                result.invalid.push(name);
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        %kind,
        valid = result.valid.len(),
        invalid = result.invalid.len(),
        "validation finished"
    );

    if result.valid.is_empty() {
        return Err(ScrapeError::NothingToScrape { kind: kind.label() });
    }
    Ok(result)
}
