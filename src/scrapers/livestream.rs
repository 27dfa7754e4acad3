//! Livestreaming new comments or submissions.
//!
//! The stream polls the newest items of a subreddit or redditor, drops the
//! ones it has already seen and hands the rest to a callback. Items that
//! already existed when the stream started are skipped: the first poll only
//! fills the seen set.
//!
//! Empty polls double the pause up to `max_pause`; a poll with anything new
//! resets it. Transient API errors are counted and waited out, everything
//! else ends the stream.

use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use chrono::Local;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::client::{RawThing, RedditApi, StreamKind, StreamTarget};
use crate::config::{ExportConfig, ExportKind, LivestreamConfig};
use crate::core::models::{CommentRecord, SubmissionRecord};
use crate::core::naming::livestream_name;
use crate::core::objectify::{make_comment, make_submission};
use crate::core::output::JsonlWriter;
use crate::error::Result;

/// Longest uninterrupted sleep, so a stop request is noticed quickly.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

// ============================================================================
// Seen set
// ============================================================================

/// Bounded set of fullnames; the oldest entry is evicted first.
#[derive(Debug, Clone)]
pub struct SeenSet {
    order: VecDeque<String>,
    members: HashSet<String>,
    capacity: usize,
}

impl SeenSet {
    pub const DEFAULT_CAPACITY: usize = 301;

    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Records `name`; returns `false` if it was already present.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.members.contains(name) {
            return false;
        }
        if self.order.len() == self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        self.order.push_back(name.to_string());
        self.members.insert(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for SeenSet {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

// ============================================================================
// Pause between polls
// ============================================================================

/// Doubling pause between polls, reset whenever something new shows up.
#[derive(Debug, Clone, Copy)]
struct PollPause {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl PollPause {
    fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
            current: min,
        }
    }

    fn reset(&mut self) {
        self.current = self.min;
    }

    fn grow(&mut self) {
        let doubled = if self.current.is_zero() {
            Duration::from_millis(1).min(self.max)
        } else {
            self.current.saturating_mul(2)
        };
        self.current = doubled.min(self.max);
    }

    fn current(&self) -> Duration {
        self.current
    }
}

/// Sleeps for `pause`, waking early on a stop request or the deadline.
fn sleep_interruptibly(pause: Duration, stop: &AtomicBool, deadline: Option<Instant>) {
    let mut wake = Instant::now() + pause;
    if let Some(deadline) = deadline {
        wake = wake.min(deadline);
    }
    while !stop.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= wake {
            break;
        }
        thread::sleep((wake - now).min(SLEEP_SLICE));
    }
}

// ============================================================================
// Items and summary
// ============================================================================

/// A streamed item as written to the livestream file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StreamItem {
    Comment(CommentRecord),
    Submission(SubmissionRecord),
}

impl StreamItem {
    pub fn from_thing(thing: &RawThing) -> Option<Self> {
        match thing {
            RawThing::Comment(c) => Some(StreamItem::Comment(make_comment(c, true))),
            RawThing::Submission(s) => Some(StreamItem::Submission(make_submission(s, true))),
            RawThing::Subreddit(_) | RawThing::More(_) | RawThing::Other(_) => None,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            StreamItem::Comment(c) => &c.id,
            StreamItem::Submission(s) => &s.id,
        }
    }
}

/// Why a livestream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Interrupted,
    MaxPolls,
    Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LivestreamSummary {
    pub polls: u64,
    pub emitted: u64,
    /// Transient errors that were waited out
    pub errors: u64,
    /// JSONL file, when saving
    pub output: Option<PathBuf>,
    pub stopped_by: StopReason,
}

/// Renders an item as a labelled block for the terminal.
pub fn display_item(item: &StreamItem) -> String {
    let none = || "None".to_string();
    match item {
        StreamItem::Submission(s) => {
            let selftext = if s.selftext.is_empty() {
                none()
            } else {
                s.selftext.clone()
            };
            format!(
                "created_utc: {}\ntype: submission\n\n\
                 author: {}\nid: {}\nis_original_content: {}\nis_self: {}\n\
                 link_flair_text: {}\nname: {}\nnsfw: {}\nnum_comments: {}\n\
                 permalink: {}\nscore: {}\nselftext: {}\nspoiler: {}\nstickied: {}\n\
                 title: {}\nupvote_ratio: {}\nurl: {}\n",
                s.created_utc,
                s.author,
                s.id,
                s.is_original_content,
                s.is_self,
                s.link_flair_text.clone().unwrap_or_else(none),
                s.name,
                s.nsfw,
                s.num_comments,
                s.permalink,
                s.score,
                selftext,
                s.spoiler,
                s.stickied,
                s.title,
                s.upvote_ratio,
                s.url,
            )
        }
        StreamItem::Comment(c) => format!(
            "created_utc: {}\ntype: comment\n\n\
             author: {}\nbody: {}\ndistinguished: {}\nedited: {}\nid: {}\n\
             is_submitter: {}\nlink_id: {}\nparent_id: {}\nscore: {}\nstickied: {}\n\
             submission_title: {}\nsubreddit: {}\n",
            c.created_utc,
            c.author,
            c.body,
            c.distinguished.clone().unwrap_or_else(none),
            serde_json::to_string(&c.edited).unwrap_or_else(|_| none()),
            c.id,
            c.is_submitter,
            c.link_id,
            c.parent_id,
            c.score,
            c.stickied,
            c.link_title.clone().unwrap_or_else(none),
            c.subreddit.clone().unwrap_or_else(none),
        ),
    }
}

// ============================================================================
// Stream loop
// ============================================================================

fn open_writer(target: &StreamTarget, kind: StreamKind, export: &ExportConfig) -> Result<JsonlWriter> {
    let dir = export.prepare_dir(ExportKind::Livestream(target.dir_name()))?;
    let started = Local::now().format("%H-%M-%S").to_string();
    let name = livestream_name(target.name(), kind.as_str(), &started);
    JsonlWriter::create(dir.join(format!("{name}.jsonl")))
}

/// Streams new items from `target` until `stop` is set or a configured
/// limit is reached.
///
/// `on_item` sees every emitted item, after it has been saved.
pub fn livestream<F>(
    api: &dyn RedditApi,
    target: &StreamTarget,
    config: &LivestreamConfig,
    export: &ExportConfig,
    stop: &AtomicBool,
    mut on_item: F,
) -> Result<LivestreamSummary>
where
    F: FnMut(&StreamItem),
{
    let mut writer = if config.save {
        Some(open_writer(target, config.kind, export)?)
    } else {
        None
    };
    let output = writer.as_ref().map(|w| w.path().to_path_buf());

    let deadline = config.duration.map(|d| Instant::now() + d);
    let mut seen = SeenSet::default();
    let mut pause = PollPause::new(config.min_pause, config.max_pause);
    let mut primed = false;
    let (mut polls, mut emitted, mut errors) = (0u64, 0u64, 0u64);

    info!(%target, kind = %config.kind, save = config.save, "livestream started");

    let stopped_by = loop {
        if stop.load(Ordering::SeqCst) {
            break StopReason::Interrupted;
        }
        if config.max_polls.is_some_and(|max| polls >= max) {
            break StopReason::MaxPolls;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break StopReason::Duration;
        }

        polls += 1;
        match api.stream_batch(target, config.kind, config.batch_limit) {
            Ok(batch) => {
                let mut fresh = 0usize;
                // Batches arrive newest first.
                for thing in batch.iter().rev() {
                    let Some(name) = thing.fullname() else {
                        continue;
                    };
                    if !seen.insert(name) || !primed {
                        continue;
                    }
                    let Some(item) = StreamItem::from_thing(thing) else {
                        continue;
                    };
                    if let Some(writer) = writer.as_mut() {
                        writer.write(&item)?;
                    }
                    on_item(&item);
                    fresh += 1;
                }

                if primed {
                    debug!(poll = polls, fresh, "poll finished");
                } else {
                    debug!(existing = seen.len(), "skipped existing items");
                    primed = true;
                }

                emitted += fresh as u64;
                if fresh > 0 {
                    pause.reset();
                } else {
                    pause.grow();
                }
            }
            Err(e) if e.is_transient() => {
                errors += 1;
                pause.grow();
                warn!(error = %e, retry_in = ?pause.current(), "livestream poll failed, retrying");
            }
            Err(e) => return Err(e),
        }

        if config.max_polls.is_some_and(|max| polls >= max) {
            break StopReason::MaxPolls;
        }
        sleep_interruptibly(pause.current(), stop, deadline);
    };

    info!(polls, emitted, errors, reason = ?stopped_by, "livestream ended");

    Ok(LivestreamSummary {
        polls,
        emitted,
        errors,
        output,
        stopped_by,
    })
}
