//! Redditor profile exports.
//!
//! A redditor export holds the account information and fourteen
//! interaction lists. Listings Reddit refuses to show (other users'
//! upvoted, saved, hidden...) are kept as a single `"FORBIDDEN"` entry so
//! the export still has every key.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::client::{OverviewSort, RedditApi, UserListing};
use crate::config::{ExportConfig, ExportKind};
use crate::core::models::{Interaction, RedditorInfo};
use crate::core::naming::redditor_name;
use crate::core::objectify::{make_interaction, make_moderated, make_multireddit, make_redditor_info};
use crate::core::output::write_json;
use crate::error::{Result, ScrapeError};
use crate::format::OutputFormat;

/// Listing-backed interactions and the listing each one reads.
const LISTINGS: [(&str, UserListing); 12] = [
    ("comments", UserListing::Comments),
    ("controversial", UserListing::Overview(OverviewSort::Controversial)),
    ("downvoted", UserListing::Downvoted),
    ("gilded", UserListing::Gilded),
    ("gildings", UserListing::Gildings),
    ("hidden", UserListing::Hidden),
    ("hot", UserListing::Overview(OverviewSort::Hot)),
    ("new", UserListing::Overview(OverviewSort::New)),
    ("saved", UserListing::Saved),
    ("submissions", UserListing::Submissions),
    ("top", UserListing::Overview(OverviewSort::Top)),
    ("upvoted", UserListing::Upvoted),
];

/// Every interaction key of a redditor export.
pub const INTERACTIONS: [&str; 14] = [
    "comments",
    "controversial",
    "downvoted",
    "gilded",
    "gildings",
    "hidden",
    "hot",
    "moderated",
    "multireddits",
    "new",
    "saved",
    "submissions",
    "top",
    "upvoted",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedditorJob {
    pub redditor: String,
    /// Items per listing
    pub limit: usize,
}

impl RedditorJob {
    pub fn new(redditor: impl Into<String>, limit: usize) -> Self {
        Self {
            redditor: redditor.into(),
            limit,
        }
    }

    /// Parses a result count given as text.
    pub fn parse(redditor: impl Into<String>, n_results: &str) -> Result<Self> {
        let limit = n_results.trim().parse::<usize>().map_err(|_| {
            ScrapeError::invalid_setting(
                "number of results",
                format!("'{n_results}' is not a positive integer"),
            )
        })?;
        let job = Self::new(redditor, limit);
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(ScrapeError::invalid_setting(
                "number of results",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn file_stem(&self) -> String {
        redditor_name(&self.redditor, self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedditorSettings {
    pub redditor: String,
    pub n_results: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedditorData {
    pub information: RedditorInfo,
    pub interactions: BTreeMap<&'static str, Vec<Interaction>>,
}

/// The JSON document of a redditor export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RedditorExport {
    pub scrape_settings: RedditorSettings,
    pub data: RedditorData,
}

impl RedditorExport {
    pub fn interaction(&self, key: &str) -> Option<&[Interaction]> {
        self.data.interactions.get(key).map(Vec::as_slice)
    }
}

/// Turns a refused listing into the `FORBIDDEN` marker.
fn or_forbidden(key: &str, result: Result<Vec<Interaction>>) -> Result<Vec<Interaction>> {
    match result {
        Err(e) if e.is_access_denied() => {
            warn!(interaction = key, error = %e, "access to interaction forbidden, skipping");
            Ok(vec![Interaction::forbidden()])
        }
        other => other,
    }
}

fn listing(api: &dyn RedditApi, name: &str, listing: UserListing, limit: usize) -> Result<Vec<Interaction>> {
    let things = api.redditor_listing(name, listing, limit)?;
    Ok(things.iter().take(limit).filter_map(make_interaction).collect())
}

/// Fetches the profile and every interaction list.
pub fn scrape(api: &dyn RedditApi, job: &RedditorJob) -> Result<RedditorExport> {
    job.validate()?;
    info!(redditor = %job.redditor, limit = job.limit, "scraping redditor");

    let about = api.redditor_about(&job.redditor)?;
    let trophies = if about.is_suspended {
        Vec::new()
    } else {
        api.redditor_trophies(&job.redditor)?
    };
    let information = make_redditor_info(&about, &trophies);

    let mut interactions = BTreeMap::new();
    for key in INTERACTIONS {
        interactions.insert(key, Vec::new());
    }

    for (key, kind) in LISTINGS {
        let items = or_forbidden(key, listing(api, &job.redditor, kind, job.limit))?;
        interactions.insert(key, items);
    }

    let moderated = api
        .redditor_moderated(&job.redditor)
        .map(|subs| subs.iter().map(|s| Interaction::Moderated(make_moderated(s))).collect());
    interactions.insert("moderated", or_forbidden("moderated", moderated)?);

    let multireddits = api
        .redditor_multireddits(&job.redditor)
        .map(|multis| multis.iter().map(|m| Interaction::Multireddit(make_multireddit(m))).collect());
    interactions.insert("multireddits", or_forbidden("multireddits", multireddits)?);

    Ok(RedditorExport {
        scrape_settings: RedditorSettings {
            redditor: job.redditor.clone(),
            n_results: job.limit,
        },
        data: RedditorData {
            information,
            interactions,
        },
    })
}

/// Scrapes one redditor and writes the export file.
///
/// Redditor exports are nested and only go to JSON; other formats are
/// rejected before anything is fetched.
pub fn run(
    api: &dyn RedditApi,
    job: &RedditorJob,
    export: &ExportConfig,
    format: OutputFormat,
) -> Result<PathBuf> {
    check_format(format)?;
    let result = scrape(api, job)?;
    let dir = export.prepare_dir(ExportKind::Redditors)?;
    let path = OutputFormat::Json.file_path(&dir, &job.file_stem());
    write_json(&result, &path)?;
    info!(path = %path.display(), "redditor export written");
    Ok(path)
}

/// Redditor exports only support JSON.
pub fn check_format(format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        Ok(())
    } else {
        Err(ScrapeError::invalid_setting(
            "output format",
            format!("redditor exports are JSON only, got {format}"),
        ))
    }
}
