//! Comment reply forest.
//!
//! Reddit hands back the comments of a submission as a flat list where each
//! comment names its parent through `parent_id` (`t3_<submission>` for
//! top-level comments, `t1_<comment>` for replies). [`Forest`] turns that list
//! back into nested [`CommentNode`]s in a single pass.
//!
//! The build tolerates bad input: children that arrive before their parent
//! wait until it shows up, comments whose parent never arrives are promoted
//! to the top level, and self-references or cycles cannot make it loop.
//!
//! # Example
//!
//! ```rust
//! use redscrape::core::forest::{CommentStyle, CommentsOutput, sort_comments};
//! use redscrape::core::models::CommentRecord;
//!
//! let comment = |id: &str, parent: &str| CommentRecord {
//!     id: id.into(),
//!     parent_id: parent.into(),
//!     ..CommentRecord::default()
//! };
//! let comments = vec![comment("a", "t3_post"), comment("b", "t1_a")];
//!
//! let CommentsOutput::Structured(trees) =
//!     sort_comments(comments, "post", CommentStyle::Structured, 0)
//! else {
//!     unreachable!()
//! };
//! assert_eq!(trees.len(), 1);
//! assert_eq!(trees[0].replies[0].comment.id, "b");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::strip_fullname_prefix;
use crate::core::models::CommentRecord;
use crate::error::ScrapeError;

/// A comment with its replies nested below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: CommentRecord,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Number of comments in this subtree, including this one.
    pub fn count(&self) -> usize {
        let mut total = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            total += 1;
            stack.extend(node.replies.iter());
        }
        total
    }
}

/// How comments are laid out in an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStyle {
    /// Flat list in fetch order.
    Raw,
    /// Nested reply trees.
    #[default]
    Structured,
}

impl fmt::Display for CommentStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommentStyle::Raw => f.write_str("raw"),
            CommentStyle::Structured => f.write_str("structured"),
        }
    }
}

impl FromStr for CommentStyle {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "raw" => Ok(CommentStyle::Raw),
            "structured" => Ok(CommentStyle::Structured),
            _ => Err(ScrapeError::invalid_setting(
                "comment style",
                format!("'{s}' is not one of raw, structured"),
            )),
        }
    }
}

/// Comments ready for export, in either layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommentsOutput {
    Raw(Vec<CommentRecord>),
    Structured(Vec<CommentNode>),
}

impl CommentsOutput {
    /// Top-level entries (all comments for raw output, trees for structured).
    pub fn len(&self) -> usize {
        match self {
            CommentsOutput::Raw(list) => list.len(),
            CommentsOutput::Structured(trees) => trees.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of comments, counting nested replies.
    pub fn total_comments(&self) -> usize {
        match self {
            CommentsOutput::Raw(list) => list.len(),
            CommentsOutput::Structured(trees) => trees.iter().map(CommentNode::count).sum(),
        }
    }
}

#[derive(Debug)]
struct Slot {
    comment: CommentRecord,
    children: Vec<usize>,
    parent: Option<usize>,
}

/// Arena-backed reply forest for one submission.
#[derive(Debug)]
pub struct Forest {
    submission_id: String,
    slots: Vec<Slot>,
    index: HashMap<String, usize>,
    roots: Vec<usize>,
    /// Parent id -> children waiting for it, in arrival order.
    pending: HashMap<String, Vec<usize>>,
}

impl Forest {
    /// Creates an empty forest. `submission_id` may be given with or without
    /// its `t3_` prefix.
    pub fn new(submission_id: &str) -> Self {
        Self {
            submission_id: strip_fullname_prefix(submission_id).to_string(),
            slots: Vec::new(),
            index: HashMap::new(),
            roots: Vec::new(),
            pending: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of comments still waiting for their parent.
    pub fn orphan_count(&self) -> usize {
        self.pending.values().map(Vec::len).sum()
    }

    /// Adds a comment. Returns `false` if a comment with the same id was
    /// already seeded; the duplicate is dropped.
    pub fn seed(&mut self, comment: CommentRecord) -> bool {
        if self.index.contains_key(&comment.id) {
            debug!(id = %comment.id, "duplicate comment ignored");
            return false;
        }

        let idx = self.slots.len();
        let id = comment.id.clone();
        let parent_id = comment.parent_id.clone();
        self.slots.push(Slot {
            comment,
            children: Vec::new(),
            parent: None,
        });
        self.index.insert(id.clone(), idx);

        if let Some(waiting) = self.pending.remove(&id) {
            for child in waiting {
                self.slots[child].parent = Some(idx);
                self.slots[idx].children.push(child);
            }
        }

        self.place(idx, &id, &parent_id);
        true
    }

    fn place(&mut self, idx: usize, id: &str, parent_id: &str) {
        if parent_id.starts_with("t3_") {
            let submission = strip_fullname_prefix(parent_id);
            if submission != self.submission_id {
                debug!(id, parent_id, "top-level comment names another submission");
            }
            self.roots.push(idx);
            return;
        }

        let parent_key = strip_fullname_prefix(parent_id);
        match self.index.get(parent_key).copied() {
            Some(parent) if parent_key != id && !self.is_ancestor(idx, parent) => {
                self.slots[idx].parent = Some(parent);
                self.slots[parent].children.push(idx);
            }
            _ => {
                self.pending
                    .entry(parent_key.to_string())
                    .or_default()
                    .push(idx);
            }
        }
    }

    /// Whether `candidate` is `node` or one of `node`'s ancestors.
    fn is_ancestor(&self, candidate: usize, node: usize) -> bool {
        let mut current = Some(node);
        while let Some(c) = current {
            if c == candidate {
                return true;
            }
            current = self.slots[c].parent;
        }
        false
    }

    /// Finishes the build. Comments whose parent never arrived become
    /// top-level trees; top-level order is arrival order.
    pub fn into_trees(mut self) -> Vec<CommentNode> {
        for (parent, children) in self.pending.drain() {
            for child in children {
                warn!(
                    id = %self.slots[child].comment.id,
                    parent = %parent,
                    "parent comment missing, promoting to top level"
                );
                self.roots.push(child);
            }
        }
        self.roots.sort_unstable();

        // Post-order so every child is built before its parent.
        let mut order = Vec::with_capacity(self.slots.len());
        let mut stack: Vec<(usize, bool)> = self.roots.iter().rev().map(|&r| (r, false)).collect();
        while let Some((idx, expanded)) = stack.pop() {
            if expanded {
                order.push(idx);
            } else {
                stack.push((idx, true));
                stack.extend(self.slots[idx].children.iter().rev().map(|&c| (c, false)));
            }
        }

        let mut built: Vec<Option<CommentNode>> = Vec::new();
        built.resize_with(self.slots.len(), || None);
        let mut slots: Vec<Option<Slot>> = self.slots.into_iter().map(Some).collect();

        for idx in order {
            let Some(slot) = slots[idx].take() else {
                continue;
            };
            let replies = slot
                .children
                .iter()
                .filter_map(|&c| built[c].take())
                .collect();
            built[idx] = Some(CommentNode {
                comment: slot.comment,
                replies,
            });
        }

        self.roots
            .iter()
            .filter_map(|&r| built[r].take())
            .collect()
    }
}

/// Lays out the comments of a submission for export.
///
/// Raw output keeps the fetch order; structured output nests replies. In
/// both cases `limit` caps the number of top-level entries and `0` means
/// no cap.
pub fn sort_comments(
    comments: Vec<CommentRecord>,
    submission_id: &str,
    style: CommentStyle,
    limit: usize,
) -> CommentsOutput {
    match style {
        CommentStyle::Raw => {
            let mut comments = comments;
            if limit > 0 {
                comments.truncate(limit);
            }
            CommentsOutput::Raw(comments)
        }
        CommentStyle::Structured => {
            let mut forest = Forest::new(submission_id);
            for comment in comments {
                forest.seed(comment);
            }
            let mut trees = forest.into_trees();
            if limit > 0 {
                trees.truncate(limit);
            }
            CommentsOutput::Structured(trees)
        }
    }
}
