//! Configuration types for the client, exports and livestreams.
//!
//! This module provides plain configuration structs for library usage,
//! without any CLI framework dependencies.
//!
//! - [`Credentials`] - Reddit script-app credentials, read from the environment
//! - [`ClientConfig`] - API endpoints and HTTP settings
//! - [`ExportConfig`] - where exports are written
//! - [`LivestreamConfig`] - polling and persistence for livestreams
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use redscrape::client::StreamKind;
//! use redscrape::config::LivestreamConfig;
//!
//! let config = LivestreamConfig::new()
//!     .with_kind(StreamKind::Submissions)
//!     .with_duration(Some(Duration::from_secs(60)))
//!     .with_save(false);
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::StreamKind;
use crate::error::{Result, ScrapeError};

pub const ENV_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "REDDIT_CLIENT_SECRET";
pub const ENV_USERNAME: &str = "REDDIT_USERNAME";
pub const ENV_PASSWORD: &str = "REDDIT_PASSWORD";
pub const ENV_USER_AGENT: &str = "REDDIT_USER_AGENT";

/// Credentials of a Reddit "script" app.
///
/// The secret and password are never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl Credentials {
    /// Reads credentials from the environment, loading a `.env` file first
    /// if one exists.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded .env"),
            Err(err) if err.not_found() => {}
            Err(err) => warn!(error = %err, "could not read .env"),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads credentials through `lookup`. Empty values count as missing.
    /// The user agent falls back to `redscrape/<version> by u/<username>`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ScrapeError::MissingCredential { name })
        };

        let client_id = required(ENV_CLIENT_ID)?;
        let client_secret = required(ENV_CLIENT_SECRET)?;
        let username = required(ENV_USERNAME)?;
        let password = required(ENV_PASSWORD)?;
        let user_agent = required(ENV_USER_AGENT).unwrap_or_else(|_| {
            format!("redscrape/{} by u/{}", env!("CARGO_PKG_VERSION"), username)
        });

        Ok(Self {
            client_id,
            client_secret,
            username,
            password,
            user_agent,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// HTTP settings for [`crate::client::HttpClient`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL for the token endpoint (default: `https://www.reddit.com`)
    pub auth_base: String,

    /// Base URL for API calls (default: `https://oauth.reddit.com`)
    pub api_base: String,

    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Items requested per listing page (default: 100, Reddit's maximum)
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            auth_base: "https://www.reddit.com".to_string(),
            api_base: "https://oauth.reddit.com".to_string(),
            timeout_secs: 30,
            page_size: 100,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points both the token endpoint and the API at one base URL. Used to
    /// run against a local mock server.
    #[must_use]
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.auth_base.clone_from(&base);
        self.api_base = base;
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Sets the listing page size, clamped to 1..=100.
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size.clamp(1, 100);
        self
    }
}

/// Export subdirectories below `scrapes/<date>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Subreddits,
    Redditors,
    Comments,
    /// `livestream/<subreddits|redditors>`
    Livestream(&'static str),
}

impl ExportKind {
    fn relative(&self) -> PathBuf {
        match self {
            ExportKind::Subreddits => PathBuf::from("subreddits"),
            ExportKind::Redditors => PathBuf::from("redditors"),
            ExportKind::Comments => PathBuf::from("comments"),
            ExportKind::Livestream(target) => Path::new("livestream").join(target),
        }
    }
}

/// Where exports go: `<root>/scrapes/<date>/<kind>/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory holding `scrapes/` (default: current directory)
    pub root: PathBuf,

    /// Date folder, `YYYY-MM-DD` (default: today, local time)
    pub date: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            date: Local::now().format("%Y-%m-%d").to_string(),
        }
    }
}

impl ExportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// `<root>/scrapes/<date>`
    pub fn scrape_dir(&self) -> PathBuf {
        self.root.join("scrapes").join(&self.date)
    }

    pub fn dir_for(&self, kind: ExportKind) -> PathBuf {
        self.scrape_dir().join(kind.relative())
    }

    /// Creates the directory for `kind` if needed and returns it.
    pub fn prepare_dir(&self, kind: ExportKind) -> Result<PathBuf> {
        let dir = self.dir_for(kind);
        fs::create_dir_all(&dir)?;
        debug!(dir = %dir.display(), "export directory ready");
        Ok(dir)
    }
}

/// Settings for [`crate::scrapers::livestream`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivestreamConfig {
    /// Stream comments or submissions (default: comments)
    pub kind: StreamKind,

    /// Items fetched per poll (default: 100)
    pub batch_limit: usize,

    /// Pause after a poll that found something new (default: 1s)
    pub min_pause: Duration,

    /// Upper bound for the growing pause between empty polls (default: 16s)
    pub max_pause: Duration,

    /// Stop after this many polls
    pub max_polls: Option<u64>,

    /// Stop after this much time
    pub duration: Option<Duration>,

    /// Write emitted items to a JSONL file (default: true)
    pub save: bool,
}

impl Default for LivestreamConfig {
    fn default() -> Self {
        Self {
            kind: StreamKind::Comments,
            batch_limit: 100,
            min_pause: Duration::from_secs(1),
            max_pause: Duration::from_secs(16),
            max_polls: None,
            duration: None,
            save: true,
        }
    }
}

impl LivestreamConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_kind(mut self, kind: StreamKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn with_batch_limit(mut self, limit: usize) -> Self {
        self.batch_limit = limit.clamp(1, 100);
        self
    }

    /// Sets the pause bounds. `max` is raised to `min` if smaller.
    #[must_use]
    pub fn with_pauses(mut self, min: Duration, max: Duration) -> Self {
        self.min_pause = min;
        self.max_pause = max.max(min);
        self
    }

    #[must_use]
    pub fn with_max_polls(mut self, polls: Option<u64>) -> Self {
        self.max_polls = polls;
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn with_save(mut self, save: bool) -> Self {
        self.save = save;
        self
    }
}
