//! [`RedditApi`] over Reddit's OAuth HTTP API.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::types::{Listing, RawMore, Thing};
use super::{
    Category, RawComment, RawModerated, RawMultireddit, RawRedditor, RawRule, RawSubmission,
    RawSubreddit, RawThing, RawTrophy, RedditApi, StreamKind, StreamTarget, TimeFilter,
    UserListing, strip_fullname_prefix,
};
use crate::config::{ClientConfig, Credentials};
use crate::error::{Result, ScrapeError};

/// Comments requested with the initial submission fetch.
const COMMENT_FETCH_LIMIT: &str = "500";

/// Ids per `/api/morechildren` call.
const MORE_CHUNK: usize = 100;

/// Tokens are refreshed this long before Reddit expires them.
const TOKEN_MARGIN: Duration = Duration::from_secs(60);

/// Upper bound on how long a token is trusted, whatever the server claims.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct Token {
    value: String,
    refresh_at: Instant,
}

/// How long a token from a response with `expires_in` may be used.
///
/// The margin never takes more than half of a short lifetime, so a token
/// that lives under a minute is still reused.
fn usable_lifetime(expires_in: Option<u64>) -> Duration {
    let lifetime = Duration::from_secs(expires_in.unwrap_or(3600)).min(MAX_TOKEN_LIFETIME);
    lifetime - TOKEN_MARGIN.min(lifetime / 2)
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RulesResponse {
    rules: Vec<RawRule>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TrophyList {
    trophies: Vec<Thing>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MoreChildrenData {
    things: Vec<Thing>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MoreChildrenJson {
    errors: Vec<Value>,
    data: MoreChildrenData,
}

#[derive(Debug, Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenJson,
}

/// Blocking Reddit API client using the script-app password grant.
///
/// Not `Sync`: the access token is cached in a `RefCell`.
pub struct HttpClient {
    http: Client,
    credentials: Credentials,
    config: ClientConfig,
    token: RefCell<Option<Token>>,
}

impl HttpClient {
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(credentials.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            credentials,
            config,
            token: RefCell::new(None),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns a valid bearer token, logging in if needed.
    fn access_token(&self) -> Result<String> {
        if let Some(token) = self.token.borrow().as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let url = format!("{}/api/v1/access_token", self.config.auth_base);
        debug!(%url, username = %self.credentials.username, "requesting access token");

        let response = self
            .http
            .post(&url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[
                ("grant_type", "password"),
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => {
                return Err(ScrapeError::auth("client id or secret rejected"));
            }
            status => {
                let message = response.text().unwrap_or_default();
                return Err(ScrapeError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
        }

        let body: TokenResponse = response.json()?;
        if let Some(error) = body.error {
            return Err(ScrapeError::auth(error));
        }
        let value = body
            .access_token
            .ok_or_else(|| ScrapeError::auth("no access token in response"))?;

        let lifetime = usable_lifetime(body.expires_in);
        info!(expires_in = ?body.expires_in, "logged in to Reddit");
        let now = Instant::now();
        *self.token.borrow_mut() = Some(Token {
            value: value.clone(),
            refresh_at: now.checked_add(lifetime).unwrap_or(now),
        });
        Ok(value)
    }

    /// Sends an authorized request, logging in again once if the token was
    /// rejected.
    fn send<F>(&self, path: &str, build: F) -> Result<Response>
    where
        F: Fn(&Client, &str) -> RequestBuilder,
    {
        let url = format!("{}{}", self.config.api_base, path);
        for attempt in 0..2 {
            let token = self.access_token()?;
            let response = build(&self.http, &url)
                .bearer_auth(&token)
                .query(&[("raw_json", "1")])
                .send()?;

            if response.status() == StatusCode::UNAUTHORIZED && attempt == 0 {
                warn!(path, "access token rejected, logging in again");
                self.token.borrow_mut().take();
                continue;
            }
            return check_status(response, path);
        }
        Err(ScrapeError::auth(format!("token rejected for {path}")))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        debug!(path, ?query, "GET");
        let response = self.send(path, |http, url| http.get(url).query(query))?;
        let value: Value = response.json()?;
        serde_json::from_value(value).map_err(|e| ScrapeError::unexpected(path, e.to_string()))
    }

    /// Follows `after` until `limit` things are collected or the listing ends.
    fn listing(&self, path: &str, extra: &[(&str, String)], limit: usize) -> Result<Vec<Thing>> {
        let mut out: Vec<Thing> = Vec::new();
        let mut after: Option<String> = None;

        while out.len() < limit {
            let page = self.config.page_size.min(limit - out.len());
            let mut query: Vec<(&str, String)> = extra.to_vec();
            query.push(("limit", page.to_string()));
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
                query.push(("count", out.len().to_string()));
            }

            let listing: Listing = self.get_json(path, &query)?;
            let fetched = listing.data.children.len();
            out.extend(listing.data.children);
            after = listing.data.after;

            debug!(path, fetched, total = out.len(), "listing page");
            if fetched == 0 || after.is_none() {
                break;
            }
        }

        out.truncate(limit);
        Ok(out)
    }

    fn things(&self, path: &str, extra: &[(&str, String)], limit: usize) -> Result<Vec<RawThing>> {
        self.listing(path, extra, limit)?
            .into_iter()
            .map(RawThing::try_from)
            .collect()
    }

    fn submissions_from(things: Vec<RawThing>) -> Vec<RawSubmission> {
        things
            .into_iter()
            .filter_map(|t| match t {
                RawThing::Submission(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    /// Fetches one `/api/morechildren` chunk.
    fn more_children(&self, link_id: &str, ids: &[String]) -> Result<Vec<Thing>> {
        let path = "/api/morechildren";
        let query = vec![
            ("api_type", "json".to_string()),
            ("link_id", link_id.to_string()),
            ("children", ids.join(",")),
            ("sort", "confidence".to_string()),
        ];
        let response: MoreChildrenResponse = self.get_json(path, &query)?;
        if !response.json.errors.is_empty() {
            return Err(ScrapeError::unexpected(
                path,
                format!("{:?}", response.json.errors),
            ));
        }
        Ok(response.json.data.things)
    }
}

/// Maps HTTP status codes to errors.
fn check_status(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    match status {
        s if s.is_success() => Ok(response),
        // Reddit redirects unknown subreddits to a search page.
        s if s.is_redirection() || s == StatusCode::NOT_FOUND => {
            Err(ScrapeError::not_found("resource", path))
        }
        StatusCode::UNAUTHORIZED => Err(ScrapeError::auth(format!("token rejected for {path}"))),
        StatusCode::FORBIDDEN => Err(ScrapeError::Forbidden {
            resource: path.to_string(),
        }),
        _ => {
            let mut message = response.text().unwrap_or_default();
            message.truncate(200);
            warn!(path, status = status.as_u16(), "request failed");
            Err(ScrapeError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Splits a comment tree into comments (breadth-first) and `more` stubs.
struct CommentCollector {
    comments: Vec<RawComment>,
    seen: HashSet<String>,
    mores: VecDeque<RawMore>,
}

impl CommentCollector {
    fn new() -> Self {
        Self {
            comments: Vec::new(),
            seen: HashSet::new(),
            mores: VecDeque::new(),
        }
    }

    /// Walks `roots` and their nested `replies` level by level.
    fn collect(&mut self, roots: Vec<Thing>) -> Result<()> {
        let mut queue: VecDeque<Thing> = roots.into();
        while let Some(mut thing) = queue.pop_front() {
            match thing.kind.as_str() {
                "t1" => {
                    if let Some(replies) = thing.data.get_mut("replies").map(Value::take) {
                        if let Ok(listing) = serde_json::from_value::<Listing>(replies) {
                            queue.extend(listing.data.children);
                        }
                    }
                    let comment: RawComment = serde_json::from_value(thing.data)?;
                    if self.seen.insert(comment.id.clone()) {
                        self.comments.push(comment);
                    }
                }
                "more" => self.mores.push_back(serde_json::from_value(thing.data)?),
                other => debug!(kind = other, "skipping non-comment in thread"),
            }
        }
        Ok(())
    }
}

impl RedditApi for HttpClient {
    fn me(&self) -> Result<String> {
        #[derive(Deserialize)]
        struct Me {
            name: String,
        }
        let me: Me = self.get_json("/api/v1/me", &[])?;
        Ok(me.name)
    }

    fn subreddit_about(&self, name: &str) -> Result<RawSubreddit> {
        let path = format!("/r/{name}/about");
        let thing: Thing = self
            .get_json(&path, &[])
            .map_err(|e| e.relabel_not_found("Subreddit", name))?;
        if thing.kind != "t5" {
            return Err(ScrapeError::not_found("Subreddit", name));
        }
        Ok(serde_json::from_value(thing.data)?)
    }

    fn subreddit_submissions(
        &self,
        name: &str,
        category: Category,
        query: Option<&str>,
        time_filter: Option<TimeFilter>,
        limit: usize,
    ) -> Result<Vec<RawSubmission>> {
        let filter = time_filter.unwrap_or_default().as_str().to_string();
        let (path, extra) = match category {
            Category::Search => {
                let q = query.ok_or_else(|| {
                    ScrapeError::invalid_setting("keywords", "search needs keywords")
                })?;
                (
                    format!("/r/{name}/search"),
                    vec![
                        ("q", q.to_string()),
                        ("restrict_sr", "on".to_string()),
                        ("sort", "relevance".to_string()),
                        ("t", filter),
                    ],
                )
            }
            c if c.is_filterable() => (format!("/r/{name}/{}", c.as_str()), vec![("t", filter)]),
            c => (format!("/r/{name}/{}", c.as_str()), Vec::new()),
        };

        let things = self
            .things(&path, &extra, limit)
            .map_err(|e| e.relabel_not_found("Subreddit", name))?;
        Ok(Self::submissions_from(things))
    }

    fn subreddit_rules(&self, name: &str) -> Result<Vec<RawRule>> {
        let rules: RulesResponse = self.get_json(&format!("/r/{name}/about/rules"), &[])?;
        Ok(rules.rules)
    }

    fn post_requirements(&self, name: &str) -> Result<Value> {
        self.get_json(&format!("/api/v1/{name}/post_requirements"), &[])
    }

    fn redditor_about(&self, name: &str) -> Result<RawRedditor> {
        let thing: Thing = self
            .get_json(&format!("/user/{name}/about"), &[])
            .map_err(|e| e.relabel_not_found("Redditor", name))?;
        if thing.kind != "t2" {
            return Err(ScrapeError::not_found("Redditor", name));
        }
        Ok(serde_json::from_value(thing.data)?)
    }

    fn redditor_trophies(&self, name: &str) -> Result<Vec<RawTrophy>> {
        let list: Thing = self.get_json(&format!("/api/v1/user/{name}/trophies"), &[])?;
        let list: TrophyList = serde_json::from_value(list.data)?;
        list.trophies
            .into_iter()
            .map(|t| serde_json::from_value(t.data).map_err(ScrapeError::from))
            .collect()
    }

    fn redditor_listing(
        &self,
        name: &str,
        listing: UserListing,
        limit: usize,
    ) -> Result<Vec<RawThing>> {
        let (segment, extra) = listing.path();
        let extra: Vec<(&str, String)> = extra
            .into_iter()
            .map(|(k, v)| (k, v.to_string()))
            .collect();
        self.things(&format!("/user/{name}/{segment}"), &extra, limit)
    }

    fn redditor_moderated(&self, name: &str) -> Result<Vec<RawModerated>> {
        #[derive(Deserialize)]
        struct ModeratedList {
            #[serde(default)]
            data: Vec<RawModerated>,
        }
        let list: ModeratedList =
            self.get_json(&format!("/user/{name}/moderated_subreddits"), &[])?;
        Ok(list.data)
    }

    fn redditor_multireddits(&self, name: &str) -> Result<Vec<RawMultireddit>> {
        let multis: Vec<Thing> = self.get_json(&format!("/api/multi/user/{name}"), &[])?;
        multis
            .into_iter()
            .map(|t| serde_json::from_value(t.data).map_err(ScrapeError::from))
            .collect()
    }

    fn submission_by_id(&self, id: &str) -> Result<RawSubmission> {
        let listing: Listing = self
            .get_json(&format!("/by_id/t3_{id}"), &[])
            .map_err(|e| e.relabel_not_found("Submission", id))?;
        listing
            .data
            .children
            .into_iter()
            .find(|t| t.kind == "t3")
            .map(|t| serde_json::from_value(t.data).map_err(ScrapeError::from))
            .unwrap_or_else(|| Err(ScrapeError::not_found("Submission", id)))
    }

    fn submission(&self, id: &str) -> Result<(RawSubmission, Vec<RawComment>)> {
        let path = format!("/comments/{id}");
        let mut pages: Vec<Listing> = self
            .get_json(&path, &[("limit", COMMENT_FETCH_LIMIT.to_string())])
            .map_err(|e| e.relabel_not_found("Submission", id))?;
        if pages.len() < 2 {
            return Err(ScrapeError::unexpected(path, "expected submission and comment listings"));
        }

        let comment_page = pages.remove(1);
        let submission = pages
            .remove(0)
            .data
            .children
            .into_iter()
            .find(|t| t.kind == "t3")
            .ok_or_else(|| ScrapeError::not_found("Submission", id))?;
        let submission: RawSubmission = serde_json::from_value(submission.data)?;

        let mut collector = CommentCollector::new();
        collector.collect(comment_page.data.children)?;

        let link_id = format!("t3_{id}");
        let mut resolved: HashSet<String> = HashSet::new();
        while let Some(more) = collector.mores.pop_front() {
            if !resolved.insert(format!("{}:{}", more.parent_id, more.id)) {
                continue;
            }

            if more.children.is_empty() {
                // "Continue this thread": fetch the parent's sub-thread.
                let parent = strip_fullname_prefix(&more.parent_id).to_string();
                debug!(parent = %parent, "expanding continued thread");
                let mut thread: Vec<Listing> = self.get_json(
                    &path,
                    &[
                        ("comment", parent),
                        ("limit", COMMENT_FETCH_LIMIT.to_string()),
                    ],
                )?;
                if thread.len() > 1 {
                    collector.collect(thread.remove(1).data.children)?;
                }
                continue;
            }

            let pending: Vec<String> = more
                .children
                .iter()
                .filter(|c| !collector.seen.contains(*c))
                .cloned()
                .collect();
            for chunk in pending.chunks(MORE_CHUNK) {
                debug!(count = chunk.len(), "resolving more comments");
                let things = self.more_children(&link_id, chunk)?;
                collector.collect(things)?;
            }
        }

        info!(
            submission = id,
            comments = collector.comments.len(),
            "fetched comment thread"
        );
        Ok((submission, collector.comments))
    }

    fn stream_batch(
        &self,
        target: &StreamTarget,
        kind: StreamKind,
        limit: usize,
    ) -> Result<Vec<RawThing>> {
        let (path, extra) = match (target, kind) {
            (StreamTarget::Subreddit(name), StreamKind::Comments) => {
                (format!("/r/{name}/comments"), Vec::new())
            }
            (StreamTarget::Subreddit(name), StreamKind::Submissions) => {
                (format!("/r/{name}/new"), Vec::new())
            }
            (StreamTarget::Redditor(name), StreamKind::Comments) => (
                format!("/user/{name}/comments"),
                vec![("sort", "new".to_string())],
            ),
            (StreamTarget::Redditor(name), StreamKind::Submissions) => (
                format!("/user/{name}/submitted"),
                vec![("sort", "new".to_string())],
            ),
        };

        let mut query = extra;
        query.push(("limit", limit.min(100).to_string()));
        let listing: Listing = self.get_json(&path, &query)?;
        listing
            .data
            .children
            .into_iter()
            .map(RawThing::try_from)
            .collect()
    }
}
