//! Scraper tests against the in-memory API.

mod common;

use common::*;
use redscrape::client::{Category, OverviewSort, RawThing, TimeFilter, UserListing};
use redscrape::config::ExportConfig;
use redscrape::core::CommentStyle;
use redscrape::core::models::Interaction;
use redscrape::format::OutputFormat;
use redscrape::scrapers::{CommentsJob, RedditorJob, SubredditJob, comments, redditor, subreddit};
use redscrape::validation::{TargetKind, validate};
use redscrape::ScrapeError;
use tempfile::tempdir;

fn export_config(dir: &std::path::Path) -> ExportConfig {
    ExportConfig::new().with_root(dir).with_date("2024-01-15")
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_validate_splits_valid_and_invalid() {
    let api = FakeApi::new()
        .with_subreddit("rust", vec![])
        .with_private_subreddit("secret");

    let checked = validate(
        &api,
        &names(&["r/rust", "doesnotexist", "secret", "Rust"]),
        TargetKind::Subreddit,
    )
    .unwrap();

    assert_eq!(checked.valid, vec!["rust"]);
    assert_eq!(checked.invalid, vec!["doesnotexist", "secret"]);
}

#[test]
fn test_validate_nothing_left() {
    let api = FakeApi::new();
    let err = validate(&api, &names(&["ghost"]), TargetKind::Redditor).unwrap_err();
    assert!(matches!(err, ScrapeError::NothingToScrape { kind: "redditor" }));
}

#[test]
fn test_validate_rejected_login_is_not_an_invalid_target() {
    let api = FakeApi::new()
        .with_subreddit("rust", vec![])
        .with_rejected_login("invalid_grant");

    let err = validate(&api, &names(&["rust", "pics"]), TargetKind::Subreddit).unwrap_err();
    assert!(matches!(err, ScrapeError::Auth { .. }), "{err:?}");
    assert!(err.to_string().contains("invalid_grant"));

    let err = validate(&api, &names(&["spez"]), TargetKind::Redditor).unwrap_err();
    assert!(matches!(err, ScrapeError::Auth { .. }), "{err:?}");
}

#[test]
fn test_validate_submissions() {
    let api = FakeApi::new().with_thread(submission("abc123", "Hello"), vec![]);
    let checked = validate(
        &api,
        &names(&[
            "https://www.reddit.com/r/rust/comments/abc123/hello/",
            "https://example.com/not-reddit",
            "https://redd.it/zzz999",
        ]),
        TargetKind::Submission,
    )
    .unwrap();

    assert_eq!(checked.valid.len(), 1);
    assert_eq!(checked.invalid.len(), 2);
}

// ============================================================================
// Subreddit
// ============================================================================

#[test]
fn test_subreddit_json_export() {
    let dir = tempdir().unwrap();
    let api = FakeApi::new().with_subreddit(
        "rust",
        vec![submission("a1", "First"), submission("a2", "Second"), submission("a3", "Third")],
    );
    let job = SubredditJob::new("rust", Category::Top, "2").with_time_filter(Some(TimeFilter::Week));

    let path = subreddit::run(&api, &job, &export_config(dir.path()), OutputFormat::Json).unwrap();

    assert_eq!(
        path,
        dir.path()
            .join("scrapes/2024-01-15/subreddits/rust-top-2-results-past-week.json")
    );
    let value = read_json(&path);
    assert_eq!(value["scrape_settings"]["category"], "top");
    assert_eq!(value["scrape_settings"]["time_filter"], "week");
    assert_eq!(value["scrape_settings"]["n_results_or_keywords"], "2");
    assert_eq!(value["data"].as_array().unwrap().len(), 2);
    assert_eq!(value["data"][0]["title"], "First");
    assert_eq!(value["data"][0]["author"], "u/poster");
    assert_eq!(value["data"][0]["created_utc"], "11-14-2023 22:13:20");
    assert!(value.get("subreddit_rules").is_none());

    let calls = api.submissions_calls.borrow();
    assert_eq!(calls[0].time_filter, Some(TimeFilter::Week));
    assert_eq!(calls[0].limit, 2);
}

#[test]
fn test_subreddit_rules_included() {
    let dir = tempdir().unwrap();
    let mut api = FakeApi::new().with_subreddit("rust", vec![submission("a1", "First")]);
    api.rules = vec![rule("Be nice", 0), rule("On topic", 1)];
    let job = SubredditJob::new("rust", Category::Hot, "1").with_rules(true);

    let path = subreddit::run(&api, &job, &export_config(dir.path()), OutputFormat::Json).unwrap();

    assert!(path.ends_with("rust-hot-1-result-rules.json"));
    let value = read_json(&path);
    let rules = &value["subreddit_rules"]["rules"];
    assert_eq!(rules.as_array().unwrap().len(), 2);
    assert_eq!(rules[0]["short_name"], "Be nice");
    assert_eq!(value["subreddit_rules"]["post_requirements"]["body_restriction_policy"], "none");
    assert!(value["scrape_settings"]["time_filter"].is_null());
}

#[test]
fn test_subreddit_search_uses_keywords() {
    let api = FakeApi::new().with_subreddit("rust", vec![submission("a1", "Borrowing")]);
    let job = SubredditJob::new("rust", Category::Search, "borrow checker");

    let export = subreddit::scrape(&api, &job).unwrap();

    assert_eq!(export.data.len(), 1);
    let calls = api.submissions_calls.borrow();
    assert_eq!(calls[0].query.as_deref(), Some("borrow checker"));
    assert_eq!(calls[0].limit, subreddit::SEARCH_LIMIT);
    assert_eq!(calls[0].time_filter, Some(TimeFilter::All));
    assert_eq!(job.file_stem(), "rust-search-'borrow checker'");
}

#[test]
fn test_subreddit_csv_export() {
    let dir = tempdir().unwrap();
    let api = FakeApi::new().with_subreddit("rust", vec![submission("a1", "First"), submission("a2", "Second")]);
    let job = SubredditJob::new("rust", Category::New, "5");

    let path = subreddit::run(&api, &job, &export_config(dir.path()), OutputFormat::Csv).unwrap();

    assert_eq!(path.extension().unwrap(), "csv");
    let content = std::fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("author,created_utc,"));
    assert!(header.contains("title"));
    assert_eq!(lines.count(), 2);
}

#[test]
fn test_subreddit_bad_settings_fail_before_fetch() {
    let api = FakeApi::new().with_subreddit("rust", vec![]);
    let job = SubredditJob::new("rust", Category::Rising, "5").with_time_filter(Some(TimeFilter::Day));

    let err = subreddit::scrape(&api, &job).unwrap_err();
    assert!(err.is_invalid_setting());
    assert!(api.submissions_calls.borrow().is_empty());
}

// ============================================================================
// Redditor
// ============================================================================

fn redditor_api() -> FakeApi {
    let mut api = FakeApi::new()
        .with_redditor(redditor("alice"))
        .with_listing(UserListing::Comments, vec![comment_thing("c1"), comment_thing("c2")])
        .with_listing(UserListing::Submissions, vec![submission_thing("s1")])
        .with_listing(
            UserListing::Overview(OverviewSort::Hot),
            vec![submission_thing("s1"), comment_thing("c1"), RawThing::Other("t4".into())],
        )
        .with_forbidden(UserListing::Saved)
        .with_forbidden(UserListing::Upvoted);
    api.moderated = vec![moderated("rust")];
    api.multireddits = vec![multireddit("langs", &["rust", "golang"])];
    api
}

#[test]
fn test_redditor_export() {
    let dir = tempdir().unwrap();
    let api = redditor_api();
    let job = RedditorJob::new("alice", 10);

    let path = redditor::run(&api, &job, &export_config(dir.path()), OutputFormat::Json).unwrap();

    assert!(path.ends_with("redditors/alice-10-results.json"));
    let value = read_json(&path);
    assert_eq!(value["scrape_settings"]["redditor"], "alice");
    assert_eq!(value["scrape_settings"]["n_results"], 10);
    assert_eq!(value["data"]["information"]["fullname"], "t2_idalice");
    assert!(value["data"]["information"]["trophies"].is_null());

    let interactions = value["data"]["interactions"].as_object().unwrap();
    assert_eq!(interactions.len(), 14);
    assert_eq!(interactions["comments"].as_array().unwrap().len(), 2);
    assert_eq!(interactions["comments"][0]["type"], "comment");
    assert_eq!(interactions["submissions"][0]["type"], "submission");
    assert_eq!(interactions["hot"].as_array().unwrap().len(), 2);
    assert_eq!(interactions["saved"], serde_json::json!(["FORBIDDEN"]));
    assert_eq!(interactions["upvoted"], serde_json::json!(["FORBIDDEN"]));
    assert_eq!(interactions["hidden"], serde_json::json!([]));
    assert_eq!(interactions["moderated"][0]["display_name"], "rust");
    assert_eq!(
        interactions["multireddits"][0]["subreddits"],
        serde_json::json!(["rust", "golang"])
    );
}

#[test]
fn test_redditor_suspended_skips_trophies() {
    let api = FakeApi::new().with_redditor(suspended("banned"));
    let export = redditor::scrape(&api, &RedditorJob::new("banned", 3)).unwrap();

    assert_eq!(*api.trophy_calls.borrow(), 0);
    let value = serde_json::to_value(&export).unwrap();
    assert_eq!(
        value["data"]["information"],
        serde_json::json!({"is_suspended": true, "name": "banned"})
    );
}

#[test]
fn test_redditor_limit_applies_per_listing() {
    let api = redditor_api();
    let export = redditor::scrape(&api, &RedditorJob::new("alice", 1)).unwrap();

    assert_eq!(export.interaction("comments").unwrap().len(), 1);
    assert_eq!(export.interaction("saved").unwrap(), &[Interaction::forbidden()]);
}

#[test]
fn test_redditor_rejects_csv() {
    let dir = tempdir().unwrap();
    let api = redditor_api();
    let err = redditor::run(&api, &RedditorJob::new("alice", 1), &export_config(dir.path()), OutputFormat::Csv)
        .unwrap_err();
    assert!(err.is_invalid_setting());
    assert!(!dir.path().join("scrapes").exists());
}

// ============================================================================
// Comments
// ============================================================================

fn thread_api() -> FakeApi {
    // c3 replies to c2 but arrives before it; c4's parent never arrives.
    FakeApi::new().with_thread(
        submission("s1", "Why is Rust fast?"),
        vec![
            comment("c1", "t3_s1", "s1"),
            comment("c3", "t1_c2", "s1"),
            comment("c2", "t1_c1", "s1"),
            comment("c5", "t3_s1", "s1"),
            comment("c4", "t1_gone", "s1"),
        ],
    )
}

#[test]
fn test_comments_structured_export() {
    let dir = tempdir().unwrap();
    let api = thread_api();
    let job = CommentsJob::new("https://www.reddit.com/r/rust/comments/s1/why/", 0);

    let path = comments::run(&api, &job, &export_config(dir.path()), OutputFormat::Json).unwrap();

    assert!(path.ends_with("comments/Why is Rust fast_-all.json"));
    let value = read_json(&path);
    assert_eq!(value["scrape_settings"]["n_results"], "all");
    assert_eq!(value["scrape_settings"]["style"], "structured");
    assert_eq!(value["data"]["submission_metadata"]["title"], "Why is Rust fast?");

    let trees = value["data"]["comments"].as_array().unwrap();
    let top: Vec<&str> = trees.iter().map(|t| t["id"].as_str().unwrap()).collect();
    assert_eq!(top, vec!["c1", "c5", "c4"]);
    assert_eq!(trees[0]["replies"][0]["id"], "c2");
    assert_eq!(trees[0]["replies"][0]["replies"][0]["id"], "c3");
}

#[test]
fn test_comments_structured_limit() {
    let api = thread_api();
    let job = CommentsJob::new("https://redd.it/s1", 1);
    let export = comments::scrape(&api, &job).unwrap();

    assert_eq!(export.data.comments.len(), 1);
    assert_eq!(export.data.comments.total_comments(), 3);
    assert_eq!(export.file_stem(1, CommentStyle::Structured), "Why is Rust fast_-1-result");
}

#[test]
fn test_comments_raw_csv() {
    let dir = tempdir().unwrap();
    let api = thread_api();
    let job = CommentsJob::new("https://redd.it/s1", 2).with_style(CommentStyle::Raw);

    let path = comments::run(&api, &job, &export_config(dir.path()), OutputFormat::Csv).unwrap();

    assert!(path.ends_with("Why is Rust fast_-2-results-raw.csv"));
    let content = std::fs::read_to_string(&path).unwrap();
    let rows: Vec<&str> = content.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("author,body,"));
    assert!(rows[1].contains("c1"));
    assert!(rows[2].contains("c3"));
}

#[test]
fn test_comments_structured_csv_rejected() {
    let dir = tempdir().unwrap();
    let api = thread_api();
    let job = CommentsJob::new("https://redd.it/s1", 0);

    let err = comments::run(&api, &job, &export_config(dir.path()), OutputFormat::Csv).unwrap_err();
    assert!(err.is_invalid_setting());
}

#[test]
fn test_comments_unknown_submission() {
    let api = thread_api();
    let job = CommentsJob::new("https://redd.it/nope", 0);
    let err = comments::scrape(&api, &job).unwrap_err();
    assert!(err.is_not_found());
}
