//! Raw Reddit API payloads.
//!
//! These mirror the JSON the API returns closely enough for serde to decode
//! them. Unknown fields are ignored and anything Reddit sometimes omits is
//! defaulted, so a sparse payload still decodes. Mapping into export records
//! happens in [`crate::core::objectify`].

use serde::Deserialize;
use serde_json::Value;

use crate::error::ScrapeError;

/// A `{kind, data}` envelope as returned by every Reddit endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Thing {
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

/// Paginated listing envelope.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<Thing>,
}

/// A listing wrapped in its `{kind: "Listing", data}` envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub data: ListingData,
}

/// `edited` is `false` for unedited items, otherwise a unix timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawEdited {
    Flag(bool),
    At(f64),
}

impl Default for RawEdited {
    fn default() -> Self {
        RawEdited::Flag(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawComment {
    pub id: String,
    pub name: String,
    pub author: Option<String>,
    pub body: String,
    pub body_html: String,
    pub created_utc: f64,
    pub distinguished: Option<String>,
    pub edited: RawEdited,
    pub is_submitter: bool,
    pub link_id: String,
    pub link_title: Option<String>,
    pub parent_id: String,
    pub score: i64,
    pub stickied: bool,
    pub subreddit: Option<String>,
    pub subreddit_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawSubmission {
    pub id: String,
    pub name: String,
    pub author: Option<String>,
    pub created_utc: f64,
    pub distinguished: Option<String>,
    pub edited: RawEdited,
    pub gallery_data: Option<Value>,
    pub is_original_content: bool,
    pub is_self: bool,
    pub link_flair_text: Option<String>,
    pub locked: bool,
    pub media_metadata: Option<Value>,
    pub over_18: bool,
    pub num_comments: u64,
    pub permalink: String,
    pub score: i64,
    pub selftext: String,
    pub spoiler: bool,
    pub stickied: bool,
    pub subreddit: Option<String>,
    pub title: String,
    pub upvote_ratio: f64,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawSubreddit {
    pub can_assign_link_flair: Option<bool>,
    pub can_assign_user_flair: Option<bool>,
    pub created_utc: f64,
    pub description: String,
    pub description_html: Option<String>,
    pub display_name: String,
    pub id: String,
    pub name: String,
    pub over18: bool,
    pub public_description: String,
    pub spoilers_enabled: Option<bool>,
    pub subreddit_type: String,
    pub subscribers: Option<u64>,
    pub user_is_banned: Option<bool>,
    pub user_is_moderator: Option<bool>,
    pub user_is_subscriber: Option<bool>,
}

/// Entry of `/user/{name}/moderated_subreddits`. Reddit returns a trimmed
/// subreddit shape here, not the full `about` payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawModerated {
    pub created_utc: f64,
    pub display_name: String,
    pub name: String,
    pub over_18: bool,
    pub subreddit_type: String,
    pub subscribers: u64,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRule {
    pub created_utc: f64,
    pub description: String,
    pub kind: String,
    pub priority: i64,
    pub short_name: String,
    pub violation_reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawTrophy {
    pub award_id: Option<String>,
    pub description: Option<String>,
    pub icon_40: Option<String>,
    pub icon_70: Option<String>,
    pub name: String,
    pub url: Option<String>,
}

/// Subreddit reference inside a multireddit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawMultiSubreddit {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawMultireddit {
    pub can_edit: bool,
    pub copied_from: Option<String>,
    pub created_utc: f64,
    pub description_html: String,
    pub description_md: String,
    pub display_name: String,
    pub name: String,
    pub over_18: bool,
    pub subreddits: Vec<RawMultiSubreddit>,
    pub visibility: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawRedditor {
    pub comment_karma: i64,
    pub created_utc: f64,
    pub has_verified_email: Option<bool>,
    pub icon_img: String,
    pub id: String,
    pub is_employee: bool,
    pub is_friend: bool,
    pub is_gold: bool,
    pub is_mod: bool,
    pub is_suspended: bool,
    pub link_karma: i64,
    pub name: String,
    pub subreddit: Option<Value>,
}

impl RawRedditor {
    /// Fullname (`t2_<id>`) of the account.
    pub fn fullname(&self) -> String {
        format!("t2_{}", self.id)
    }
}

/// A `more` stub standing in for replies that were not inlined.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawMore {
    pub id: String,
    pub parent_id: String,
    pub count: u64,
    pub children: Vec<String>,
}

/// A decoded [`Thing`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawThing {
    Comment(RawComment),
    Submission(RawSubmission),
    Subreddit(RawSubreddit),
    More(RawMore),
    /// Any kind we do not decode (awards, messages, ...).
    Other(String),
}

impl RawThing {
    /// Fullname of the item, used to deduplicate streams.
    pub fn fullname(&self) -> Option<&str> {
        match self {
            RawThing::Comment(c) => Some(&c.name),
            RawThing::Submission(s) => Some(&s.name),
            RawThing::Subreddit(s) => Some(&s.name),
            RawThing::More(_) | RawThing::Other(_) => None,
        }
    }
}

impl TryFrom<Thing> for RawThing {
    type Error = ScrapeError;

    fn try_from(thing: Thing) -> Result<Self, Self::Error> {
        let decoded = match thing.kind.as_str() {
            "t1" => RawThing::Comment(serde_json::from_value(thing.data)?),
            "t3" => RawThing::Submission(serde_json::from_value(thing.data)?),
            "t5" => RawThing::Subreddit(serde_json::from_value(thing.data)?),
            "more" => RawThing::More(serde_json::from_value(thing.data)?),
            _ => RawThing::Other(thing.kind),
        };
        Ok(decoded)
    }
}

/// Strips a `t1_`/`t3_`-style type prefix from a fullname.
///
/// ```rust
/// use redscrape::client::strip_fullname_prefix;
///
/// assert_eq!(strip_fullname_prefix("t1_abc"), "abc");
/// assert_eq!(strip_fullname_prefix("abc"), "abc");
/// ```
pub fn strip_fullname_prefix(fullname: &str) -> &str {
    match fullname.split_once('_') {
        Some((prefix, rest))
            if prefix.len() == 2
                && prefix.starts_with('t')
                && prefix.as_bytes()[1].is_ascii_digit() =>
        {
            rest
        }
        _ => fullname,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_comment_thing() {
        let thing: Thing = serde_json::from_value(json!({
            "kind": "t1",
            "data": {
                "id": "c1",
                "name": "t1_c1",
                "author": "alice",
                "body": "hi",
                "created_utc": 1_600_000_000.0,
                "edited": false,
                "parent_id": "t3_s1",
                "link_id": "t3_s1",
                "score": 3,
                "replies": ""
            }
        }))
        .unwrap();

        match RawThing::try_from(thing).unwrap() {
            RawThing::Comment(c) => {
                assert_eq!(c.id, "c1");
                assert_eq!(c.author.as_deref(), Some("alice"));
                assert_eq!(c.edited, RawEdited::Flag(false));
                assert_eq!(c.score, 3);
            }
            other => panic!("expected comment, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_edited_timestamp() {
        let c: RawComment = serde_json::from_value(json!({"edited": 1_600_000_100.0})).unwrap();
        assert_eq!(c.edited, RawEdited::At(1_600_000_100.0));
    }

    #[test]
    fn test_decode_unknown_kind() {
        let thing = Thing {
            kind: "t4".into(),
            data: json!({}),
        };
        assert_eq!(RawThing::try_from(thing).unwrap(), RawThing::Other("t4".into()));
    }

    #[test]
    fn test_null_author_decodes() {
        let s: RawSubmission = serde_json::from_value(json!({"author": null, "title": "x"})).unwrap();
        assert!(s.author.is_none());
        assert_eq!(s.title, "x");
    }

    #[test]
    fn test_strip_fullname_prefix() {
        assert_eq!(strip_fullname_prefix("t3_xyz"), "xyz");
        assert_eq!(strip_fullname_prefix("t1_a_b"), "a_b");
        assert_eq!(strip_fullname_prefix("plain"), "plain");
        assert_eq!(strip_fullname_prefix("tx_abc"), "tx_abc");
    }

    #[test]
    fn test_fullname() {
        let c = RawThing::Comment(RawComment {
            name: "t1_c1".into(),
            ..RawComment::default()
        });
        assert_eq!(c.fullname(), Some("t1_c1"));
        assert_eq!(RawThing::Other("t4".into()).fullname(), None);
    }
}
