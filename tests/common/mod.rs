//! Shared fixtures: an in-memory [`RedditApi`] and raw payload builders.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};

use serde_json::{Value, json};

use redscrape::client::{
    Category, RawComment, RawEdited, RawModerated, RawMultiSubreddit, RawMultireddit, RawRedditor,
    RawRule, RawSubmission, RawSubreddit, RawThing, RawTrophy, RedditApi, StreamKind, StreamTarget,
    TimeFilter, UserListing,
};
use redscrape::{Result, ScrapeError};

/// One scripted answer of [`FakeApi::stream_batch`].
#[derive(Debug, Clone)]
pub enum Batch {
    Items(Vec<RawThing>),
    /// Fails with an API error of this status.
    Fail(u16),
}

/// Arguments of the last `subreddit_submissions` call.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionsCall {
    pub name: String,
    pub category: Category,
    pub query: Option<String>,
    pub time_filter: Option<TimeFilter>,
    pub limit: usize,
}

/// In-memory Reddit. Names are matched case-insensitively.
#[derive(Default)]
pub struct FakeApi {
    pub me: String,
    pub subreddits: HashMap<String, RawSubreddit>,
    pub private_subreddits: HashSet<String>,
    pub submissions: HashMap<String, Vec<RawSubmission>>,
    pub rules: Vec<RawRule>,
    pub post_requirements: Value,
    pub redditors: HashMap<String, RawRedditor>,
    pub trophies: Vec<RawTrophy>,
    pub listings: HashMap<String, Vec<RawThing>>,
    pub forbidden_listings: HashSet<String>,
    pub moderated: Vec<RawModerated>,
    pub multireddits: Vec<RawMultireddit>,
    pub threads: HashMap<String, (RawSubmission, Vec<RawComment>)>,
    pub stream: RefCell<VecDeque<Batch>>,
    pub stream_polls: RefCell<usize>,
    pub submissions_calls: RefCell<Vec<SubmissionsCall>>,
    pub trophy_calls: RefCell<usize>,
    /// When set, every lookup fails as if the token had been refused.
    pub rejected_login: Option<String>,
}

/// Key used by [`FakeApi::listings`].
pub fn listing_key(listing: UserListing) -> String {
    format!("{listing:?}")
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            me: "tester".into(),
            post_requirements: json!({"body_restriction_policy": "none"}),
            ..Self::default()
        }
    }

    pub fn with_subreddit(mut self, name: &str, posts: Vec<RawSubmission>) -> Self {
        let key = name.to_lowercase();
        self.subreddits.insert(key.clone(), subreddit(name));
        self.submissions.insert(key, posts);
        self
    }

    pub fn with_private_subreddit(mut self, name: &str) -> Self {
        self.private_subreddits.insert(name.to_lowercase());
        self
    }

    pub fn with_redditor(mut self, redditor: RawRedditor) -> Self {
        self.redditors.insert(redditor.name.to_lowercase(), redditor);
        self
    }

    pub fn with_listing(mut self, listing: UserListing, things: Vec<RawThing>) -> Self {
        self.listings.insert(listing_key(listing), things);
        self
    }

    pub fn with_forbidden(mut self, listing: UserListing) -> Self {
        self.forbidden_listings.insert(listing_key(listing));
        self
    }

    pub fn with_thread(mut self, submission: RawSubmission, comments: Vec<RawComment>) -> Self {
        self.threads.insert(submission.id.clone(), (submission, comments));
        self
    }

    pub fn with_rejected_login(mut self, message: &str) -> Self {
        self.rejected_login = Some(message.to_string());
        self
    }

    pub fn with_batches(self, batches: Vec<Batch>) -> Self {
        *self.stream.borrow_mut() = batches.into();
        self
    }

    fn known_subreddit(&self, name: &str) -> Result<()> {
        if let Some(message) = &self.rejected_login {
            return Err(ScrapeError::auth(message.clone()));
        }
        let key = name.to_lowercase();
        if self.private_subreddits.contains(&key) {
            return Err(ScrapeError::Forbidden {
                resource: format!("/r/{name}/about"),
            });
        }
        if !self.subreddits.contains_key(&key) {
            return Err(ScrapeError::not_found("Subreddit", name));
        }
        Ok(())
    }
}

impl RedditApi for FakeApi {
    fn me(&self) -> Result<String> {
        Ok(self.me.clone())
    }

    fn subreddit_about(&self, name: &str) -> Result<RawSubreddit> {
        self.known_subreddit(name)?;
        Ok(self.subreddits[&name.to_lowercase()].clone())
    }

    fn subreddit_submissions(
        &self,
        name: &str,
        category: Category,
        query: Option<&str>,
        time_filter: Option<TimeFilter>,
        limit: usize,
    ) -> Result<Vec<RawSubmission>> {
        self.known_subreddit(name)?;
        self.submissions_calls.borrow_mut().push(SubmissionsCall {
            name: name.to_string(),
            category,
            query: query.map(str::to_string),
            time_filter,
            limit,
        });
        let posts = self.submissions.get(&name.to_lowercase()).cloned().unwrap_or_default();
        Ok(posts.into_iter().take(limit).collect())
    }

    fn subreddit_rules(&self, name: &str) -> Result<Vec<RawRule>> {
        self.known_subreddit(name)?;
        Ok(self.rules.clone())
    }

    fn post_requirements(&self, name: &str) -> Result<Value> {
        self.known_subreddit(name)?;
        Ok(self.post_requirements.clone())
    }

    fn redditor_about(&self, name: &str) -> Result<RawRedditor> {
        if let Some(message) = &self.rejected_login {
            return Err(ScrapeError::auth(message.clone()));
        }
        self.redditors
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| ScrapeError::not_found("Redditor", name))
    }

    fn redditor_trophies(&self, _name: &str) -> Result<Vec<RawTrophy>> {
        *self.trophy_calls.borrow_mut() += 1;
        Ok(self.trophies.clone())
    }

    fn redditor_listing(
        &self,
        name: &str,
        listing: UserListing,
        limit: usize,
    ) -> Result<Vec<RawThing>> {
        let key = listing_key(listing);
        if self.forbidden_listings.contains(&key) {
            return Err(ScrapeError::Forbidden {
                resource: format!("/user/{name}/{}", listing.path().0),
            });
        }
        let things = self.listings.get(&key).cloned().unwrap_or_default();
        Ok(things.into_iter().take(limit).collect())
    }

    fn redditor_moderated(&self, _name: &str) -> Result<Vec<RawModerated>> {
        Ok(self.moderated.clone())
    }

    fn redditor_multireddits(&self, _name: &str) -> Result<Vec<RawMultireddit>> {
        Ok(self.multireddits.clone())
    }

    fn submission_by_id(&self, id: &str) -> Result<RawSubmission> {
        self.threads
            .get(id)
            .map(|(s, _)| s.clone())
            .ok_or_else(|| ScrapeError::not_found("Submission", id))
    }

    fn submission(&self, id: &str) -> Result<(RawSubmission, Vec<RawComment>)> {
        self.threads
            .get(id)
            .cloned()
            .ok_or_else(|| ScrapeError::not_found("Submission", id))
    }

    fn stream_batch(
        &self,
        _target: &StreamTarget,
        _kind: StreamKind,
        limit: usize,
    ) -> Result<Vec<RawThing>> {
        *self.stream_polls.borrow_mut() += 1;
        match self.stream.borrow_mut().pop_front() {
            Some(Batch::Items(items)) => Ok(items.into_iter().take(limit).collect()),
            Some(Batch::Fail(status)) => Err(ScrapeError::Api {
                status,
                message: "scripted failure".into(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

// ============================================================================
// Raw payload builders
// ============================================================================

pub fn subreddit(name: &str) -> RawSubreddit {
    RawSubreddit {
        display_name: name.to_string(),
        id: format!("id_{name}"),
        name: format!("t5_id_{name}"),
        subreddit_type: "public".into(),
        subscribers: Some(1000),
        ..RawSubreddit::default()
    }
}

pub fn submission(id: &str, title: &str) -> RawSubmission {
    RawSubmission {
        id: id.to_string(),
        name: format!("t3_{id}"),
        author: Some("poster".into()),
        created_utc: 1_700_000_000.0,
        is_self: true,
        num_comments: 3,
        permalink: format!("/r/rust/comments/{id}/"),
        score: 42,
        selftext: "body".into(),
        subreddit: Some("rust".into()),
        title: title.to_string(),
        upvote_ratio: 0.97,
        url: format!("https://www.reddit.com/r/rust/comments/{id}/"),
        ..RawSubmission::default()
    }
}

/// A comment on submission `link` replying to `parent` (a fullname).
pub fn comment(id: &str, parent: &str, link: &str) -> RawComment {
    RawComment {
        id: id.to_string(),
        name: format!("t1_{id}"),
        author: Some(format!("user_{id}")),
        body: format!("comment {id}"),
        created_utc: 1_700_000_100.0,
        edited: RawEdited::Flag(false),
        link_id: format!("t3_{link}"),
        link_title: Some("Thread".into()),
        parent_id: parent.to_string(),
        score: 1,
        subreddit: Some("rust".into()),
        subreddit_id: Some("t5_2qh1c".into()),
        ..RawComment::default()
    }
}

pub fn comment_thing(id: &str) -> RawThing {
    RawThing::Comment(comment(id, "t3_s1", "s1"))
}

pub fn submission_thing(id: &str) -> RawThing {
    RawThing::Submission(submission(id, &format!("Post {id}")))
}

pub fn redditor(name: &str) -> RawRedditor {
    RawRedditor {
        comment_karma: 10,
        created_utc: 1_500_000_000.0,
        id: format!("id{name}"),
        link_karma: 5,
        name: name.to_string(),
        ..RawRedditor::default()
    }
}

pub fn suspended(name: &str) -> RawRedditor {
    RawRedditor {
        name: name.to_string(),
        is_suspended: true,
        ..RawRedditor::default()
    }
}

pub fn rule(short_name: &str, priority: i64) -> RawRule {
    RawRule {
        created_utc: 1_600_000_000.0,
        description: format!("{short_name} description"),
        kind: "all".into(),
        priority,
        short_name: short_name.to_string(),
        violation_reason: short_name.to_string(),
    }
}

pub fn multireddit(name: &str, subs: &[&str]) -> RawMultireddit {
    RawMultireddit {
        display_name: name.to_string(),
        name: name.to_string(),
        subreddits: subs
            .iter()
            .map(|s| RawMultiSubreddit { name: s.to_string() })
            .collect(),
        visibility: "public".into(),
        ..RawMultireddit::default()
    }
}

pub fn moderated(name: &str) -> RawModerated {
    RawModerated {
        display_name: name.to_string(),
        name: format!("t5_{name}"),
        subreddit_type: "public".into(),
        subscribers: 12,
        title: format!("r/{name}"),
        ..RawModerated::default()
    }
}

/// Reads a JSON export back.
pub fn read_json(path: &std::path::Path) -> Value {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}

/// Reads a JSONL file into values, skipping empty lines.
pub fn read_jsonl(path: &std::path::Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}
