//! Mapping raw API payloads into export records.
//!
//! Every `make_*` function is pure: it only reshapes data that was already
//! fetched. Timestamps are rendered in UTC as `%m-%d-%Y %H:%M:%S`.

use chrono::DateTime;

use crate::client::{
    RawComment, RawEdited, RawModerated, RawMultireddit, RawRedditor, RawRule, RawSubmission,
    RawThing, RawTrophy,
};
use crate::core::models::{
    CommentRecord, Edited, Interaction, ModeratedRecord, MultiredditRecord, RedditorInfo,
    RedditorProfile, RuleRecord, SubmissionMetadata, SubmissionRecord, SuspendedRedditor,
    TrophyRecord,
};

/// Timestamp format used throughout the exports.
pub const TIME_FORMAT: &str = "%m-%d-%Y %H:%M:%S";

/// Author shown for deleted accounts.
pub const DELETED: &str = "[deleted]";

/// Formats a unix timestamp (seconds, possibly fractional).
///
/// ```rust
/// use redscrape::core::objectify::convert_time;
///
/// assert_eq!(convert_time(0.0), "01-01-1970 00:00:00");
/// ```
pub fn convert_time(unix: f64) -> String {
    DateTime::from_timestamp(unix.trunc() as i64, 0)
        .map(|dt| dt.format(TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// `u/<name>`, or `[deleted]` when the account is gone.
pub fn format_author(author: Option<&str>) -> String {
    match author {
        Some(name) if !name.is_empty() && name != DELETED => format!("u/{name}"),
        _ => DELETED.to_string(),
    }
}

pub fn convert_edited(edited: RawEdited) -> Edited {
    match edited {
        RawEdited::Flag(false) => Edited::Flag(false),
        // Very old items report `true` without a time.
        RawEdited::Flag(true) => Edited::Flag(true),
        RawEdited::At(ts) => Edited::At(convert_time(ts)),
    }
}

/// Builds a comment record. `include_all` adds the fields that let a comment
/// stand on its own in a mixed listing.
pub fn make_comment(raw: &RawComment, include_all: bool) -> CommentRecord {
    let mut record = CommentRecord {
        author: format_author(raw.author.as_deref()),
        body: raw.body.clone(),
        body_html: raw.body_html.clone(),
        created_utc: convert_time(raw.created_utc),
        distinguished: raw.distinguished.clone(),
        edited: convert_edited(raw.edited),
        id: raw.id.clone(),
        is_submitter: raw.is_submitter,
        link_id: raw.link_id.clone(),
        parent_id: raw.parent_id.clone(),
        score: raw.score,
        stickied: raw.stickied,
        ..CommentRecord::default()
    };

    if include_all {
        record.link_title = raw.link_title.clone();
        record.subreddit = raw.subreddit.clone();
        record.subreddit_id = raw.subreddit_id.clone();
        record.kind = Some("comment".to_string());
    }

    record
}

pub fn make_submission(raw: &RawSubmission, include_all: bool) -> SubmissionRecord {
    let mut record = SubmissionRecord {
        author: format_author(raw.author.as_deref()),
        created_utc: convert_time(raw.created_utc),
        distinguished: raw.distinguished.clone(),
        edited: convert_edited(raw.edited),
        id: raw.id.clone(),
        is_original_content: raw.is_original_content,
        is_self: raw.is_self,
        link_flair_text: raw.link_flair_text.clone(),
        locked: raw.locked,
        name: raw.name.clone(),
        nsfw: raw.over_18,
        num_comments: raw.num_comments,
        permalink: raw.permalink.clone(),
        score: raw.score,
        selftext: raw.selftext.clone(),
        spoiler: raw.spoiler,
        stickied: raw.stickied,
        title: raw.title.clone(),
        upvote_ratio: raw.upvote_ratio,
        url: raw.url.clone(),
        ..SubmissionRecord::default()
    };

    if include_all {
        record.subreddit = raw.subreddit.clone();
        record.kind = Some("submission".to_string());
    }

    record
}

/// Metadata block for a comments export, with gallery data when present.
pub fn make_submission_metadata(raw: &RawSubmission) -> SubmissionMetadata {
    SubmissionMetadata {
        author: format_author(raw.author.as_deref()),
        created_utc: convert_time(raw.created_utc),
        distinguished: raw.distinguished.clone(),
        edited: convert_edited(raw.edited),
        gallery_data: raw.gallery_data.clone(),
        id: raw.id.clone(),
        is_original_content: raw.is_original_content,
        is_self: raw.is_self,
        link_flair_text: raw.link_flair_text.clone(),
        locked: raw.locked,
        media_metadata: raw.media_metadata.clone(),
        nsfw: raw.over_18,
        num_comments: raw.num_comments,
        permalink: raw.permalink.clone(),
        score: raw.score,
        selftext: raw.selftext.clone(),
        spoiler: raw.spoiler,
        stickied: raw.stickied,
        subreddit: raw.subreddit.clone(),
        title: raw.title.clone(),
        upvote_ratio: raw.upvote_ratio,
        url: raw.url.clone(),
    }
}

pub fn make_moderated(raw: &RawModerated) -> ModeratedRecord {
    ModeratedRecord {
        created_utc: convert_time(raw.created_utc),
        display_name: raw.display_name.clone(),
        name: raw.name.clone(),
        nsfw: raw.over_18,
        subreddit_type: raw.subreddit_type.clone(),
        subscribers: raw.subscribers,
        title: raw.title.clone(),
    }
}

pub fn make_multireddit(raw: &RawMultireddit) -> MultiredditRecord {
    MultiredditRecord {
        can_edit: raw.can_edit,
        copied_from: raw.copied_from.clone(),
        created_utc: convert_time(raw.created_utc),
        description_html: raw.description_html.clone(),
        description_md: raw.description_md.clone(),
        display_name: raw.display_name.clone(),
        name: raw.name.clone(),
        nsfw: raw.over_18,
        subreddits: raw.subreddits.iter().map(|s| s.name.clone()).collect(),
        visibility: raw.visibility.clone(),
    }
}

pub fn make_rule(raw: &RawRule) -> RuleRecord {
    RuleRecord {
        created_utc: convert_time(raw.created_utc),
        description: raw.description.clone(),
        kind: raw.kind.clone(),
        priority: raw.priority,
        short_name: raw.short_name.clone(),
        violation_reason: raw.violation_reason.clone(),
    }
}

pub fn make_trophy(raw: &RawTrophy) -> TrophyRecord {
    TrophyRecord {
        award_id: raw.award_id.clone(),
        description: raw.description.clone(),
        icon_40: raw.icon_40.clone(),
        icon_70: raw.icon_70.clone(),
        name: raw.name.clone(),
        url: raw.url.clone(),
    }
}

/// Builds the information block of a redditor export. Suspended accounts
/// only expose their name.
pub fn make_redditor_info(raw: &RawRedditor, trophies: &[RawTrophy]) -> RedditorInfo {
    if raw.is_suspended {
        return RedditorInfo::Suspended(SuspendedRedditor {
            is_suspended: true,
            name: raw.name.clone(),
        });
    }

    let trophies = if trophies.is_empty() {
        None
    } else {
        Some(trophies.iter().map(make_trophy).collect())
    };

    RedditorInfo::Active(Box::new(RedditorProfile {
        comment_karma: raw.comment_karma,
        created_utc: convert_time(raw.created_utc),
        fullname: raw.fullname(),
        has_verified_email: raw.has_verified_email,
        icon_img: raw.icon_img.clone(),
        id: raw.id.clone(),
        is_employee: raw.is_employee,
        is_friend: raw.is_friend,
        is_gold: raw.is_gold,
        is_mod: raw.is_mod,
        link_karma: raw.link_karma,
        name: raw.name.clone(),
        subreddit: raw.subreddit.clone(),
        trophies,
    }))
}

/// Objectifies one entry of a mixed user listing. Kinds other than comments
/// and submissions are dropped.
pub fn make_interaction(thing: &RawThing) -> Option<Interaction> {
    match thing {
        RawThing::Comment(c) => Some(Interaction::Comment(make_comment(c, true))),
        RawThing::Submission(s) => Some(Interaction::Submission(make_submission(s, true))),
        RawThing::Subreddit(_) | RawThing::More(_) | RawThing::Other(_) => None,
    }
}
