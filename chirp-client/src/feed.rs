//! Client-side view of the shared feed.
//!
//! Reconciliation is a full-list replace: whenever a fetched list differs
//! from what is shown, the whole list is swapped in. Concurrent edits by
//! other users are not merged; the last full read wins.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::models::Post;

/// Scroll offsets above this survive a refresh; anything at or below it
/// snaps back to the top.
pub const KEEP_SCROLL_THRESHOLD: u32 = 100;

/// How long a "new posts" notification stays visible.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What the view should do with its scroll position after a refresh.
pub enum ScrollAction {
    /// Leave the reader where they are.
    Keep,
    /// Jump back to the newest post.
    ResetToTop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Result of a reconcile that replaced the shown list.
pub struct FeedUpdate {
    /// Posts whose ids were not shown before.
    pub new_posts: usize,
    /// Scroll handling for the re-render.
    pub scroll: ScrollAction,
}

#[derive(Debug, Default)]
/// The list currently shown to the reader.
pub struct Feed {
    posts: Vec<Post>,
    newest_created_at: Option<DateTime<Utc>>,
    scroll_offset: u32,
    loaded: bool,
}

impl Feed {
    /// An empty feed that has not been loaded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shown posts, newest first.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Number of shown posts.
    pub fn len(&self) -> usize {
        self.posts.len()
    }

    /// Whether nothing is shown.
    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// `createdAt` of the newest shown post.
    pub fn newest_created_at(&self) -> Option<DateTime<Utc>> {
        self.newest_created_at
    }

    /// Current scroll offset of the list.
    pub fn scroll_offset(&self) -> u32 {
        self.scroll_offset
    }

    /// Records how far the reader has scrolled away from the top.
    pub fn set_scroll_offset(&mut self, offset: u32) {
        self.scroll_offset = offset;
    }

    /// Swaps in `fetched` if it differs from what is shown.
    ///
    /// Returns `None` when nothing changed. The first load never counts its
    /// posts as new.
    pub fn reconcile(&mut self, fetched: Vec<Post>) -> Option<FeedUpdate> {
        let newest = newest_created_at(&fetched);
        let unchanged = self.loaded
            && fetched.len() == self.posts.len()
            && newest == self.newest_created_at
            && fetched == self.posts;
        if unchanged {
            return None;
        }

        let new_posts = if self.loaded {
            let shown: HashSet<i64> = self.posts.iter().map(|post| post.id).collect();
            fetched
                .iter()
                .filter(|post| !shown.contains(&post.id))
                .count()
        } else {
            0
        };

        let scroll = if self.scroll_offset > KEEP_SCROLL_THRESHOLD {
            ScrollAction::Keep
        } else {
            self.scroll_offset = 0;
            ScrollAction::ResetToTop
        };

        self.posts = fetched;
        self.newest_created_at = newest;
        self.loaded = true;

        Some(FeedUpdate { new_posts, scroll })
    }

    /// Replaces one shown post after a local edit, so the next poll does not
    /// report it as a change.
    pub fn apply_local(&mut self, post: Post) {
        if let Some(slot) = self.posts.iter_mut().find(|shown| shown.id == post.id) {
            *slot = post;
        }
    }
}

fn newest_created_at(posts: &[Post]) -> Option<DateTime<Utc>> {
    posts.iter().map(|post| post.created_at).max()
}

#[derive(Debug, Clone)]
/// Transient, dismissible "N new posts" banner.
pub struct Notification {
    message: String,
    shown_at: Instant,
    dismissed: bool,
}

impl Notification {
    /// A banner for `update`, or `None` if nothing new arrived.
    pub fn for_update(update: &FeedUpdate, now: Instant) -> Option<Self> {
        if update.new_posts == 0 {
            return None;
        }
        let noun = if update.new_posts == 1 { "post" } else { "posts" };
        Some(Self {
            message: format!("{} new {noun}", update.new_posts),
            shown_at: now,
            dismissed: false,
        })
    }

    /// Banner text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the banner should still be on screen at `now`.
    pub fn is_visible(&self, now: Instant) -> bool {
        !self.dismissed && now.saturating_duration_since(self.shown_at) < NOTIFICATION_TTL
    }

    /// Hides the banner before it expires.
    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }
}
