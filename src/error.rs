//! Unified error types for redscrape.
//!
//! This module provides a single [`ScrapeError`] enum that covers every
//! failure in the library: talking to the Reddit API, validating what the
//! user asked for, and writing exports to disk.
//!
//! # Error Handling Philosophy
//!
//! - **Library users** get typed errors they can match on
//! - **Application users** get clear, actionable error messages
//! - **The livestream loop** asks [`ScrapeError::is_transient`] to decide
//!   whether to keep polling or give up

use std::io;

use thiserror::Error;

/// A specialized [`Result`] type for redscrape operations.
///
/// # Example
///
/// ```rust
/// use redscrape::error::Result;
///
/// fn my_function() -> Result<Vec<String>> {
///     // ... operations that may fail
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// The error type for all redscrape operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScrapeError {
    /// An I/O error occurred.
    ///
    /// This typically happens when the `scrapes/` directory cannot be
    /// created or an export file cannot be written.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The HTTP request itself failed (DNS, TLS, timeout, body decoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Reddit API answered with an unexpected status code.
    #[error("Reddit API returned {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body or reason phrase
        message: String,
    },

    /// Logging in failed or the access token was rejected.
    #[error("Authentication failed: {message}")]
    Auth {
        /// Description from Reddit, e.g. `invalid_grant`
        message: String,
    },

    /// The account is not allowed to read a resource.
    ///
    /// Reddit answers 403 for private subreddits and for another user's
    /// upvoted/saved/hidden listings.
    #[error("Access to {resource} is forbidden")]
    Forbidden {
        /// The path or name of the resource
        resource: String,
    },

    /// A subreddit, redditor or submission does not exist.
    #[error("{kind} '{name}' not found")]
    NotFound {
        /// What was looked up ("Subreddit", "Redditor", ...)
        kind: &'static str,
        /// The name or id that was looked up
        name: String,
    },

    /// A required credential is missing from the environment.
    #[error("Missing credential: environment variable {name} is not set")]
    MissingCredential {
        /// Name of the environment variable
        name: &'static str,
    },

    /// A submission URL could not be parsed.
    #[error("Invalid submission URL '{url}'")]
    InvalidUrl {
        /// The URL as provided
        url: String,
    },

    /// A scrape setting is not valid (bad result count, time filter on a
    /// category that does not support one, unsupported export format...).
    #[error("Invalid {setting}: {message}")]
    InvalidSetting {
        /// The setting that was rejected
        setting: &'static str,
        /// Description of what's wrong
        message: String,
    },

    /// Validation removed every requested target.
    #[error("No valid {kind}s left to scrape")]
    NothingToScrape {
        /// Target kind ("Subreddit", "Redditor", "submission")
        kind: &'static str,
    },

    /// The API returned JSON in a shape we did not expect.
    #[error("Unexpected response from {endpoint}: {message}")]
    UnexpectedResponse {
        /// The endpoint path that was called
        endpoint: String,
        /// What was wrong with it
        message: String,
    },

    /// CSV writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ScrapeError {
    /// Creates a not-found error.
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        ScrapeError::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Creates an invalid setting error.
    pub fn invalid_setting(setting: &'static str, message: impl Into<String>) -> Self {
        ScrapeError::InvalidSetting {
            setting,
            message: message.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        ScrapeError::InvalidUrl { url: url.into() }
    }

    /// Creates an authentication error.
    pub fn auth(message: impl Into<String>) -> Self {
        ScrapeError::Auth {
            message: message.into(),
        }
    }

    /// Creates an unexpected response error.
    pub fn unexpected(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        ScrapeError::UnexpectedResponse {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Re-labels a generic not-found error with the kind and name the caller
    /// was actually looking up. Other errors pass through unchanged.
    #[must_use]
    pub fn relabel_not_found(self, kind: &'static str, name: &str) -> Self {
        match self {
            ScrapeError::NotFound { .. } => ScrapeError::not_found(kind, name),
            other => other,
        }
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ScrapeError::Io(_))
    }

    /// Returns `true` if the target does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScrapeError::NotFound { .. })
    }

    /// Returns `true` if the server answered 403.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, ScrapeError::Forbidden { .. })
    }

    /// Returns `true` for a 403 or a rejected token.
    ///
    /// Redditor listings such as `upvoted` answer either way when they are
    /// hidden from the logged-in account.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, ScrapeError::Forbidden { .. } | ScrapeError::Auth { .. })
    }

    /// Returns `true` if this is an invalid setting error.
    pub fn is_invalid_setting(&self) -> bool {
        matches!(self, ScrapeError::InvalidSetting { .. })
    }

    /// Returns `true` if retrying the same request later may succeed.
    ///
    /// Server errors, rate limiting, timeouts and connection failures are
    /// transient; everything else is not.
    pub fn is_transient(&self) -> bool {
        match self {
            ScrapeError::Api { status, .. } => *status >= 500 || *status == 429,
            ScrapeError::Http(err) => err.is_timeout() || err.is_connect(),
            _ => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
