use crate::{Cursor, Notice, ProfileStats, ProfileView, SeedOutcome, SessionPhase};

/// State of a load-more control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadMoreStatus {
    Available,
    Loading,
    /// The last attempt stopped on a failed fetch; offer to try again.
    Retry,
    #[default]
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub username: Option<String>,
    pub view: ProfileView,
    pub phase: SessionPhase,
    pub seed_outcome: Option<SeedOutcome>,
    pub stats: ProfileStats,
    pub posts_cursor: Option<Cursor>,
    pub comments_cursor: Option<Cursor>,
    pub posts_status: LoadMoreStatus,
    pub comments_status: LoadMoreStatus,
    pub notice: Option<Notice>,
    pub dirty: bool,
}
