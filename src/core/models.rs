//! Export records.
//!
//! Every struct here is what ends up in an export file. Fields are declared
//! in alphabetical order so serialized objects come out with sorted keys.
//! Fields that only appear in mixed listings are skipped when absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Edit state of a comment or submission: `false`, or when it was edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Edited {
    Flag(bool),
    At(String),
}

impl Default for Edited {
    fn default() -> Self {
        Edited::Flag(false)
    }
}

impl Edited {
    pub fn is_edited(&self) -> bool {
        !matches!(self, Edited::Flag(false))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub author: String,
    pub body: String,
    pub body_html: String,
    pub created_utc: String,
    pub distinguished: Option<String>,
    pub edited: Edited,
    pub id: String,
    pub is_submitter: bool,
    pub link_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_title: Option<String>,
    pub parent_id: String,
    pub score: i64,
    pub stickied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit_id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub author: String,
    pub created_utc: String,
    pub distinguished: Option<String>,
    pub edited: Edited,
    pub id: String,
    pub is_original_content: bool,
    pub is_self: bool,
    pub link_flair_text: Option<String>,
    pub locked: bool,
    pub name: String,
    pub nsfw: bool,
    pub num_comments: u64,
    pub permalink: String,
    pub score: i64,
    pub selftext: String,
    pub spoiler: bool,
    pub stickied: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subreddit: Option<String>,
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub upvote_ratio: f64,
    pub url: String,
}

/// Submission block of a comments export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    pub author: String,
    pub created_utc: String,
    pub distinguished: Option<String>,
    pub edited: Edited,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery_data: Option<Value>,
    pub id: String,
    pub is_original_content: bool,
    pub is_self: bool,
    pub link_flair_text: Option<String>,
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_metadata: Option<Value>,
    pub nsfw: bool,
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

/// A subreddit the redditor moderates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModeratedRecord {
    pub created_utc: String,
    pub display_name: String,
    pub name: String,
    pub nsfw: bool,
    pub subreddit_type: String,
    pub subscribers: u64,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiredditRecord {
    pub can_edit: bool,
    pub copied_from: Option<String>,
    pub created_utc: String,
    pub description_html: String,
    pub description_md: String,
    pub display_name: String,
    pub name: String,
    pub nsfw: bool,
    /// Display names of the member subreddits.
    pub subreddits: Vec<String>,
    pub visibility: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub created_utc: String,
    pub description: String,
    pub kind: String,
    pub priority: i64,
    pub short_name: String,
    pub violation_reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrophyRecord {
    pub award_id: Option<String>,
    pub description: Option<String>,
    pub icon_40: Option<String>,
    pub icon_70: Option<String>,
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedditorProfile {
    pub comment_karma: i64,
    pub created_utc: String,
    pub fullname: String,
    pub has_verified_email: Option<bool>,
    pub icon_img: String,
    pub id: String,
    pub is_employee: bool,
    pub is_friend: bool,
    pub is_gold: bool,
    pub is_mod: bool,
    pub link_karma: i64,
    pub name: String,
    /// The user's profile subreddit, passed through as returned.
    pub subreddit: Option<Value>,
    /// `None` when the user has no trophies.
    pub trophies: Option<Vec<TrophyRecord>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspendedRedditor {
    pub is_suspended: bool,
    pub name: String,
}

/// Account information block of a redditor export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RedditorInfo {
    Suspended(SuspendedRedditor),
    Active(Box<RedditorProfile>),
}

/// One entry of a redditor interaction list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Interaction {
    Comment(CommentRecord),
    Submission(SubmissionRecord),
    Moderated(ModeratedRecord),
    Multireddit(MultiredditRecord),
    /// Marker for a listing the account may not read.
    Forbidden(&'static str),
}

impl Interaction {
    pub const FORBIDDEN: &'static str = "FORBIDDEN";

    pub fn forbidden() -> Self {
        Interaction::Forbidden(Self::FORBIDDEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edited_serializes_false_or_time() {
        assert_eq!(serde_json::to_value(Edited::Flag(false)).unwrap(), json!(false));
        assert_eq!(
            serde_json::to_value(Edited::At("01-02-2024 03:04:05".into())).unwrap(),
            json!("01-02-2024 03:04:05")
        );
        assert!(!Edited::default().is_edited());
        assert!(Edited::At(String::new()).is_edited());
    }

    #[test]
    fn test_comment_optional_fields_skipped() {
        let value = serde_json::to_value(CommentRecord::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("type"));
        assert!(!obj.contains_key("subreddit_id"));
        assert!(obj.contains_key("distinguished"));
    }

    /// Asserts the top-level keys of a serialized object appear in sorted order.
    fn assert_keys_sorted(text: &str, keys: &[&str]) {
        let positions: Vec<usize> = keys
            .iter()
            .map(|k| text.find(&format!("\"{k}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
    }

    #[test]
    fn test_comment_keys_sorted() {
        let record = CommentRecord {
            kind: Some("comment".into()),
            subreddit: Some("rust".into()),
            subreddit_id: Some("t5_x".into()),
            link_title: Some("title".into()),
            ..CommentRecord::default()
        };
        let text = serde_json::to_string(&record).unwrap();
        assert_keys_sorted(
            &text,
            &[
                "author", "body", "body_html", "created_utc", "distinguished", "edited", "id",
                "is_submitter", "link_id", "link_title", "parent_id", "score", "stickied",
                "subreddit", "subreddit_id", "type",
            ],
        );
    }

    #[test]
    fn test_submission_keys_sorted() {
        let record = SubmissionRecord {
            kind: Some("submission".into()),
            subreddit: Some("rust".into()),
            ..SubmissionRecord::default()
        };
        let text = serde_json::to_string(&record).unwrap();
        assert_keys_sorted(
            &text,
            &[
                "author", "created_utc", "distinguished", "edited", "id", "is_original_content",
                "is_self", "link_flair_text", "locked", "name", "nsfw", "num_comments",
                "permalink", "score", "selftext", "spoiler", "stickied", "subreddit", "title",
                "type", "upvote_ratio", "url",
            ],
        );
    }

    #[test]
    fn test_redditor_info_untagged() {
        let suspended = RedditorInfo::Suspended(SuspendedRedditor {
            is_suspended: true,
            name: "gone".into(),
        });
        assert_eq!(
            serde_json::to_value(&suspended).unwrap(),
            json!({"is_suspended": true, "name": "gone"})
        );
    }

    #[test]
    fn test_forbidden_interaction() {
        assert_eq!(
            serde_json::to_value(Interaction::forbidden()).unwrap(),
            json!("FORBIDDEN")
        );
    }
}
