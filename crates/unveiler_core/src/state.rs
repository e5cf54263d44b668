use std::collections::BTreeSet;

use crate::view_model::{AppViewModel, LoadMoreStatus};
use crate::{
    stats, CacheSnapshot, Comment, CommentPassResult, CommentSources, Cursor, Post, ProfileView,
    RecordKind, RecordSet, SortVariant, WalkResult,
};

/// Lifecycle of the session for the active username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Empty,
    /// Waiting for the cache lookup.
    Seeding,
    /// A fetch burst is in flight.
    Loading(LoadKind),
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    Seed,
    MorePosts,
    MoreComments,
}

/// Terminal result of seeding, reported once the session is ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Found,
    /// Both collections are empty after a full seeding pass.
    NoData,
}

/// Informational outcome of the last user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NothingToLoad(RecordKind),
}

/// Running record counts reported to a progress sink during a fetch burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadProgress {
    pub comments: usize,
    pub posts: usize,
}

/// Aggregate state for one username: collections, cursors and the comment
/// variants already walked. Created on view activation, dropped on navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSession {
    username: String,
    view: ProfileView,
    phase: SessionPhase,
    posts: RecordSet<Post>,
    posts_cursor: Option<Cursor>,
    posts_interrupted: bool,
    comments: CommentSources,
    comments_interrupted: bool,
    seed_outcome: Option<SeedOutcome>,
    notice: Option<Notice>,
}

impl ProfileSession {
    pub(crate) fn new(username: String, view: ProfileView) -> Self {
        Self {
            username,
            view,
            phase: SessionPhase::Seeding,
            posts: RecordSet::new(),
            posts_cursor: None,
            posts_interrupted: false,
            comments: CommentSources::default(),
            comments_interrupted: false,
            seed_outcome: None,
            notice: None,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn view(&self) -> ProfileView {
        self.view
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn posts(&self) -> &[Post] {
        self.posts.records()
    }

    pub fn comments(&self) -> &[Comment] {
        self.comments.comments.records()
    }

    pub fn posts_cursor(&self) -> Option<&Cursor> {
        self.posts_cursor.as_ref()
    }

    pub fn comments_cursor(&self) -> Option<&Cursor> {
        self.comments.cursor.as_ref()
    }

    pub fn exhausted_variants(&self) -> &BTreeSet<SortVariant> {
        &self.comments.exhausted
    }

    pub fn seed_outcome(&self) -> Option<SeedOutcome> {
        self.seed_outcome
    }

    pub(crate) fn is_for(&self, username: &str) -> bool {
        self.username == username
    }

    pub(crate) fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
    }

    pub(crate) fn set_notice(&mut self, notice: Option<Notice>) {
        self.notice = notice;
    }

    pub(crate) fn comment_sources(&self) -> &CommentSources {
        &self.comments
    }

    pub(crate) fn posts_set(&self) -> &RecordSet<Post> {
        &self.posts
    }

    /// Adopt a cached snapshot wholesale.
    pub(crate) fn adopt(&mut self, snapshot: CacheSnapshot) {
        self.posts = snapshot.posts;
        self.posts_cursor = snapshot.posts_cursor;
        self.comments = CommentSources {
            comments: snapshot.comments,
            cursor: snapshot.comments_cursor,
            exhausted: snapshot.exhausted,
        };
        self.posts_interrupted = snapshot.posts_interrupted;
        self.comments_interrupted = snapshot.comments_interrupted;
    }

    /// Forget posts so they can be seeded from scratch.
    pub(crate) fn reset_posts(&mut self) {
        self.posts = RecordSet::new();
        self.posts_cursor = None;
        self.posts_interrupted = false;
    }

    /// Forget comments, their cursor and the walked variants.
    pub(crate) fn reset_comments(&mut self) {
        self.comments = CommentSources::default();
        self.comments_interrupted = false;
    }

    pub(crate) fn apply_posts(&mut self, result: WalkResult<Post>) {
        self.posts = result.records;
        self.posts_cursor = result.next_cursor;
        self.posts_interrupted = result.interrupted;
    }

    pub(crate) fn apply_comments(&mut self, result: CommentPassResult) {
        self.comments = result.sources;
        self.comments_interrupted = result.interrupted;
    }

    pub(crate) fn finish_seed(&mut self) {
        self.seed_outcome = Some(if self.posts.is_empty() && self.comments.comments.is_empty() {
            SeedOutcome::NoData
        } else {
            SeedOutcome::Found
        });
        self.phase = SessionPhase::Ready;
    }

    pub(crate) fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            posts: self.posts.clone(),
            comments: self.comments.comments.clone(),
            posts_cursor: self.posts_cursor.clone(),
            comments_cursor: self.comments.cursor.clone(),
            exhausted: self.comments.exhausted.clone(),
            posts_interrupted: self.posts_interrupted,
            comments_interrupted: self.comments_interrupted,
        }
    }

    fn posts_status(&self) -> LoadMoreStatus {
        if self.phase == SessionPhase::Loading(LoadKind::MorePosts) {
            LoadMoreStatus::Loading
        } else if self.posts_cursor.is_none() {
            LoadMoreStatus::Exhausted
        } else if self.posts_interrupted {
            LoadMoreStatus::Retry
        } else {
            LoadMoreStatus::Available
        }
    }

    fn comments_status(&self) -> LoadMoreStatus {
        if self.phase == SessionPhase::Loading(LoadKind::MoreComments) {
            LoadMoreStatus::Loading
        } else if !self.comments.can_continue() {
            LoadMoreStatus::Exhausted
        } else if self.comments_interrupted {
            LoadMoreStatus::Retry
        } else {
            LoadMoreStatus::Available
        }
    }
}

/// Application state: at most one live profile session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: Option<ProfileSession>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&ProfileSession> {
        self.session.as_ref()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session
            .as_ref()
            .map_or(SessionPhase::Empty, ProfileSession::phase)
    }

    pub fn view(&self) -> AppViewModel {
        let Some(session) = self.session.as_ref() else {
            return AppViewModel {
                dirty: self.dirty,
                ..AppViewModel::default()
            };
        };
        AppViewModel {
            username: Some(session.username.clone()),
            view: session.view,
            phase: session.phase,
            seed_outcome: session.seed_outcome,
            stats: stats(session.posts(), session.comments()),
            posts_cursor: session.posts_cursor.clone(),
            comments_cursor: session.comments.cursor.clone(),
            posts_status: session.posts_status(),
            comments_status: session.comments_status(),
            notice: session.notice,
            dirty: self.dirty,
        }
    }

    /// Returns whether the state changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut ProfileSession> {
        self.session.as_mut()
    }

    /// Session for `username` if it is the active one.
    pub(crate) fn session_for(&mut self, username: &str) -> Option<&mut ProfileSession> {
        self.session
            .as_mut()
            .filter(|session| session.is_for(username))
    }

    pub(crate) fn replace_session(&mut self, session: Option<ProfileSession>) {
        self.session = session;
        self.dirty = true;
    }
}
