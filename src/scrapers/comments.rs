//! Submission comment exports.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::client::RedditApi;
use crate::config::{ExportConfig, ExportKind};
use crate::core::forest::{CommentStyle, CommentsOutput, sort_comments};
use crate::core::models::SubmissionMetadata;
use crate::core::naming::comments_name;
use crate::core::objectify::{make_comment, make_submission_metadata};
use crate::core::output::write_json;
use crate::error::{Result, ScrapeError};
use crate::format::{OutputFormat, write_records};

pub use crate::validation::parse_submission_id;

/// One submission to scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentsJob {
    pub url: String,
    /// Top-level entries to keep; `0` keeps everything
    pub limit: usize,
    pub style: CommentStyle,
}

impl CommentsJob {
    pub fn new(url: impl Into<String>, limit: usize) -> Self {
        Self {
            url: url.into(),
            limit,
            style: CommentStyle::default(),
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: CommentStyle) -> Self {
        self.style = style;
        self
    }

    pub fn submission_id(&self) -> Result<String> {
        parse_submission_id(&self.url)
    }

    /// Checks that the URL parses and the style fits `format`.
    pub fn validate(&self, format: OutputFormat) -> Result<()> {
        self.submission_id()?;
        check_format(self.style, format)
    }
}

/// Structured trees only fit in JSON.
pub fn check_format(style: CommentStyle, format: OutputFormat) -> Result<()> {
    if style == CommentStyle::Structured && format.is_flat() {
        return Err(ScrapeError::invalid_setting(
            "output format",
            format!("structured comments are JSON only, use raw style for {format}"),
        ));
    }
    Ok(())
}

/// `n_results` is a count, or `"all"` when nothing is cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultCount {
    Count(usize),
    All(&'static str),
}

impl ResultCount {
    pub fn from_limit(limit: usize) -> Self {
        if limit == 0 {
            ResultCount::All("all")
        } else {
            ResultCount::Count(limit)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentsSettings {
    pub n_results: ResultCount,
    pub style: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentsData {
    pub submission_metadata: SubmissionMetadata,
    pub comments: CommentsOutput,
}

/// The JSON document of a comments export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentsExport {
    pub scrape_settings: CommentsSettings,
    pub data: CommentsData,
}

impl CommentsExport {
    pub fn title(&self) -> &str {
        &self.data.submission_metadata.title
    }

    /// File name for this export, built from the submission title.
    pub fn file_stem(&self, limit: usize, style: CommentStyle) -> String {
        comments_name(self.title(), limit, style == CommentStyle::Raw)
    }
}

/// Fetches the submission and its whole comment thread.
pub fn scrape(api: &dyn RedditApi, job: &CommentsJob) -> Result<CommentsExport> {
    let id = job.submission_id()?;
    info!(submission = %id, limit = job.limit, style = %job.style, "scraping comments");

    let (submission, raw_comments) = api.submission(&id)?;
    let records = raw_comments.iter().map(|c| make_comment(c, false)).collect();
    let comments = sort_comments(records, &id, job.style, job.limit);

    info!(
        fetched = raw_comments.len(),
        exported = comments.total_comments(),
        "comments sorted"
    );

    Ok(CommentsExport {
        scrape_settings: CommentsSettings {
            n_results: ResultCount::from_limit(job.limit),
            style: job.style.to_string(),
            url: job.url.clone(),
        },
        data: CommentsData {
            submission_metadata: make_submission_metadata(&submission),
            comments,
        },
    })
}

/// Writes an export to `path`. Flat formats hold the raw comment list only.
pub fn write_export(export: &CommentsExport, path: &Path, format: OutputFormat) -> Result<()> {
    match (&export.data.comments, format) {
        (_, OutputFormat::Json) => write_json(export, path),
        (CommentsOutput::Raw(list), _) => write_records(list, path, format),
        (CommentsOutput::Structured(_), _) => check_format(CommentStyle::Structured, format),
    }
}

/// Scrapes one submission and writes the export file.
pub fn run(
    api: &dyn RedditApi,
    job: &CommentsJob,
    export: &ExportConfig,
    format: OutputFormat,
) -> Result<PathBuf> {
    job.validate(format)?;
    let result = scrape(api, job)?;
    let dir = export.prepare_dir(ExportKind::Comments)?;
    let path = format.file_path(&dir, &result.file_stem(job.limit, job.style));
    write_export(&result, &path, format)?;
    info!(
        path = %path.display(),
        comments = result.data.comments.total_comments(),
        "comments export written"
    );
    Ok(path)
}
