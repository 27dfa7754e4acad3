//! Subreddit submission exports.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::client::{Category, RedditApi, TimeFilter};
use crate::config::{ExportConfig, ExportKind};
use crate::core::models::{RuleRecord, SubmissionRecord};
use crate::core::naming::subreddit_name;
use crate::core::objectify::{make_rule, make_submission};
use crate::core::output::write_json;
use crate::error::{Result, ScrapeError};
use crate::format::{OutputFormat, write_records};

/// Search results are capped at this many submissions.
pub const SEARCH_LIMIT: usize = 100;

/// One subreddit to scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubredditJob {
    pub subreddit: String,
    pub category: Category,
    /// A result count, or the search keywords for [`Category::Search`]
    pub n_results_or_keywords: String,
    pub time_filter: Option<TimeFilter>,
    /// Also export the subreddit's rules and post requirements
    pub rules: bool,
}

impl SubredditJob {
    pub fn new(
        subreddit: impl Into<String>,
        category: Category,
        n_results_or_keywords: impl Into<String>,
    ) -> Self {
        Self {
            subreddit: subreddit.into(),
            category,
            n_results_or_keywords: n_results_or_keywords.into(),
            time_filter: None,
            rules: false,
        }
    }

    #[must_use]
    pub fn with_time_filter(mut self, time_filter: Option<TimeFilter>) -> Self {
        self.time_filter = time_filter;
        self
    }

    #[must_use]
    pub fn with_rules(mut self, rules: bool) -> Self {
        self.rules = rules;
        self
    }

    /// Checks the settings without touching the network.
    pub fn validate(&self) -> Result<()> {
        if self.time_filter.is_some() && !self.category.is_filterable() {
            return Err(ScrapeError::invalid_setting(
                "time filter",
                format!(
                    "the {} category does not take a time filter",
                    self.category
                ),
            ));
        }
        if self.category == Category::Search && self.n_results_or_keywords.trim().is_empty() {
            return Err(ScrapeError::invalid_setting(
                "keywords",
                "search needs at least one keyword",
            ));
        }
        self.limit().map(|_| ())
    }

    /// Number of submissions to fetch.
    pub fn limit(&self) -> Result<usize> {
        if self.category == Category::Search {
            return Ok(SEARCH_LIMIT);
        }
        match self.n_results_or_keywords.trim().parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(ScrapeError::invalid_setting(
                "number of results",
                format!(
                    "'{}' is not a positive integer",
                    self.n_results_or_keywords
                ),
            )),
        }
    }

    /// The time filter actually sent: `all` unless set, and nothing for
    /// categories that ignore it.
    pub fn effective_time_filter(&self) -> Option<TimeFilter> {
        if self.category.is_filterable() {
            Some(self.time_filter.unwrap_or_default())
        } else {
            None
        }
    }

    pub fn file_stem(&self) -> String {
        subreddit_name(
            &self.subreddit,
            self.category,
            &self.n_results_or_keywords,
            self.effective_time_filter(),
            self.rules,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubredditSettings {
    pub subreddit: String,
    pub category: String,
    pub n_results_or_keywords: String,
    pub time_filter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubredditRules {
    pub rules: Vec<RuleRecord>,
    pub post_requirements: Value,
}

/// The JSON document of a subreddit export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubredditExport {
    pub scrape_settings: SubredditSettings,
    pub data: Vec<SubmissionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subreddit_rules: Option<SubredditRules>,
}

/// Fetches the submissions (and rules, if asked) for one job.
pub fn scrape(api: &dyn RedditApi, job: &SubredditJob) -> Result<SubredditExport> {
    job.validate()?;
    let limit = job.limit()?;
    let time_filter = job.effective_time_filter();
    let query = (job.category == Category::Search).then_some(job.n_results_or_keywords.as_str());

    info!(
        subreddit = %job.subreddit,
        category = %job.category,
        limit,
        "scraping subreddit"
    );

    let submissions = api.subreddit_submissions(&job.subreddit, job.category, query, time_filter, limit)?;
    let data: Vec<SubmissionRecord> = submissions
        .iter()
        .take(limit)
        .map(|s| make_submission(s, false))
        .collect();

    let subreddit_rules = if job.rules {
        let rules = api.subreddit_rules(&job.subreddit)?;
        let post_requirements = api.post_requirements(&job.subreddit)?;
        Some(SubredditRules {
            rules: rules.iter().map(make_rule).collect(),
            post_requirements,
        })
    } else {
        None
    };

    Ok(SubredditExport {
        scrape_settings: SubredditSettings {
            subreddit: job.subreddit.clone(),
            category: job.category.as_str().to_string(),
            n_results_or_keywords: job.n_results_or_keywords.clone(),
            time_filter: time_filter.map(|f| f.as_str().to_string()),
        },
        data,
        subreddit_rules,
    })
}

/// Writes an export to `path` in `format`.
///
/// Flat formats get one row per submission; rules only fit in JSON and are
/// left out of the others.
pub fn write_export(export: &SubredditExport, path: &Path, format: OutputFormat) -> Result<()> {
    if format.is_flat() && export.subreddit_rules.is_some() {
        warn!(
            subreddit = %export.scrape_settings.subreddit,
            %format,
            "rules are only exported to JSON, skipping them"
        );
    }
    match format {
        OutputFormat::Json => write_json(export, path),
        _ => write_records(&export.data, path, format),
    }
}

/// Scrapes one subreddit and writes the export file.
pub fn run(
    api: &dyn RedditApi,
    job: &SubredditJob,
    export: &ExportConfig,
    format: OutputFormat,
) -> Result<PathBuf> {
    let result = scrape(api, job)?;
    let dir = export.prepare_dir(ExportKind::Subreddits)?;
    let path = format.file_path(&dir, &job.file_stem());
    write_export(&result, &path, format)?;
    info!(path = %path.display(), submissions = result.data.len(), "subreddit export written");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_time_filter_on_hot() {
        let job = SubredditJob::new("rust", Category::Hot, "10").with_time_filter(Some(TimeFilter::Week));
        let err = job.validate().unwrap_err();
        assert!(err.is_invalid_setting());
    }

    #[test]
    fn test_validate_result_count() {
        assert!(SubredditJob::new("rust", Category::Top, "0").validate().is_err());
        assert!(SubredditJob::new("rust", Category::Top, "ten").validate().is_err());
        assert_eq!(SubredditJob::new("rust", Category::Top, " 25 ").limit().unwrap(), 25);
    }

    #[test]
    fn test_search_limit_and_keywords() {
        let job = SubredditJob::new("rust", Category::Search, "borrow checker");
        assert_eq!(job.limit().unwrap(), SEARCH_LIMIT);
        assert!(job.validate().is_ok());
        assert!(SubredditJob::new("rust", Category::Search, "  ").validate().is_err());
    }

    #[test]
    fn test_effective_time_filter() {
        assert_eq!(
            SubredditJob::new("rust", Category::Top, "5").effective_time_filter(),
            Some(TimeFilter::All)
        );
        assert_eq!(
            SubredditJob::new("rust", Category::Controversial, "5")
                .with_time_filter(Some(TimeFilter::Day))
                .effective_time_filter(),
            Some(TimeFilter::Day)
        );
        assert_eq!(SubredditJob::new("rust", Category::New, "5").effective_time_filter(), None);
    }

    #[test]
    fn test_file_stem() {
        let job = SubredditJob::new("rust", Category::Top, "1")
            .with_time_filter(Some(TimeFilter::Year))
            .with_rules(true);
        assert_eq!(job.file_stem(), "rust-top-1-result-past-year-rules");
    }

    #[test]
    fn test_export_skeleton_order() {
        let export = SubredditExport {
            scrape_settings: SubredditSettings {
                subreddit: "rust".into(),
                category: "hot".into(),
                n_results_or_keywords: "1".into(),
                time_filter: None,
            },
            data: vec![],
            subreddit_rules: None,
        };
        let text = serde_json::to_string(&export).unwrap();
        assert!(text.starts_with(r#"{"scrape_settings":{"subreddit":"rust""#));
        assert!(text.contains(r#""time_filter":null"#));
        assert!(!text.contains("subreddit_rules"));
    }
}
