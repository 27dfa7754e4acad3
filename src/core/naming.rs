//! Export file names.
//!
//! Names are built from the scrape settings, then cleaned so they are safe on
//! every filesystem. Extensions are added by the caller.

use crate::client::{Category, TimeFilter};

/// Characters replaced with `_` in file names.
const ILLEGAL_CHARS: &str = "[@!#$%^&*()<>?/\"\\|}{~:+`=]";

/// Names longer than this are cut.
const MAX_NAME_LEN: usize = 50;

/// Replaces every illegal filename character with `_`.
///
/// ```rust
/// use redscrape::core::naming::sanitize;
///
/// assert_eq!(sanitize("what? no/way"), "what_ no_way");
/// ```
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if ILLEGAL_CHARS.contains(c) { '_' } else { c })
        .collect()
}

/// Cuts names longer than 50 characters to 48 characters plus `--`.
pub fn check_len(name: &str) -> String {
    if name.chars().count() > MAX_NAME_LEN {
        let head: String = name.chars().take(MAX_NAME_LEN - 2).collect();
        format!("{head}--")
    } else {
        name.to_string()
    }
}

fn plurality(n: usize) -> &'static str {
    if n < 2 { "result" } else { "results" }
}

/// Time filter suffix; `all` is the default and is left out.
fn filter_suffix(time_filter: Option<TimeFilter>) -> String {
    match time_filter {
        Some(filter) if filter != TimeFilter::All => format!("-past-{filter}"),
        _ => String::new(),
    }
}

/// Name of a subreddit export.
///
/// - `<sub>-<category>-<n>-<result|results>[-past-<filter>]`
/// - `<sub>-search-'<keywords>'[-past-<filter>]`
///
/// followed by `-rules` when rules are included.
pub fn subreddit_name(
    subreddit: &str,
    category: Category,
    n_results_or_keywords: &str,
    time_filter: Option<TimeFilter>,
    rules: bool,
) -> String {
    let base = if category == Category::Search {
        format!("{subreddit}-search-'{n_results_or_keywords}'")
    } else {
        let end = n_results_or_keywords
            .parse::<usize>()
            .map(plurality)
            .unwrap_or("results");
        format!("{subreddit}-{}-{n_results_or_keywords}-{end}", category.as_str())
    };

    let mut name = check_len(&format!("{base}{}", filter_suffix(time_filter)));
    if rules {
        name.push_str("-rules");
    }
    sanitize(&name)
}

/// Name of a redditor export: `<name>-<n>-<result|results>`.
pub fn redditor_name(redditor: &str, limit: usize) -> String {
    sanitize(&format!("{redditor}-{limit}-{}", plurality(limit)))
}

/// Name of a submission comments export.
///
/// `<title>-<n>-<result|results>`, or `<title>-all` when `limit` is 0,
/// followed by `-raw` for raw exports. Only the title is length-checked.
pub fn comments_name(title: &str, limit: usize, raw: bool) -> String {
    let title = check_len(title);
    let mut name = if limit == 0 {
        format!("{title}-all")
    } else {
        format!("{title}-{limit}-{}", plurality(limit))
    };
    if raw {
        name.push_str("-raw");
    }
    sanitize(&name)
}

/// Name of a livestream file: `<name>-<kind>-<HH-MM-SS>`.
pub fn livestream_name(target: &str, kind: &str, started: &str) -> String {
    sanitize(&format!("{target}-{kind}-{started}"))
}
