//! Unveiler core: record model, dedup collections and the pure session state machine.
mod effect;
mod feed;
mod msg;
mod query;
mod record;
mod record_set;
mod state;
mod stats;
mod update;
mod view_model;
mod walk;

pub use effect::Effect;
pub use feed::{build_feed, format_age, FeedItem, FeedOrder};
pub use msg::Msg;
pub use query::{search_url, Cursor, ProfileView, RecordKind, SortVariant};
pub use record::{comment_permalink, post_permalink, Comment, Post, Record, RecordId};
pub use record_set::RecordSet;
pub use state::{
    AppState, LoadKind, LoadProgress, Notice, ProfileSession, SeedOutcome, SessionPhase,
};
pub use stats::{stats, ProfileStats};
pub use update::update;
pub use view_model::{AppViewModel, LoadMoreStatus};
pub use walk::{CacheSnapshot, CommentPassResult, CommentSources, WalkResult};
