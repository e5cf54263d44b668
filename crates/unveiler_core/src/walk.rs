use std::collections::BTreeSet;

use crate::{Comment, Cursor, Post, RecordSet, SortVariant};

/// Output of one paginated walk over a single query variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkResult<T> {
    /// Caller-supplied records plus everything gathered during the walk.
    pub records: RecordSet<T>,
    /// Next page of the walked variant. `None` once the server reports no more pages.
    pub next_cursor: Option<Cursor>,
    pub pages_fetched: usize,
    /// A page fetch failed and ended the walk early.
    pub interrupted: bool,
}

/// Everything the comment merger needs to continue: the collection, the live
/// cursor and the sort variants that have already been walked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommentSources {
    pub comments: RecordSet<Comment>,
    pub cursor: Option<Cursor>,
    pub exhausted: BTreeSet<SortVariant>,
}

impl CommentSources {
    /// Variants not yet walked, in priority order.
    pub fn pending_variants(&self) -> impl Iterator<Item = SortVariant> + '_ {
        SortVariant::ALL
            .into_iter()
            .filter(|variant| !self.exhausted.contains(variant))
    }

    pub fn can_continue(&self) -> bool {
        self.cursor.is_some() || self.pending_variants().next().is_some()
    }
}

/// Output of one merger pass over the comment sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentPassResult {
    pub sources: CommentSources,
    pub pages_fetched: usize,
    /// At least one walk in the pass ended on a failed fetch.
    pub interrupted: bool,
}

/// Accumulated per-username state as persisted by the cache.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheSnapshot {
    pub posts: RecordSet<Post>,
    pub comments: RecordSet<Comment>,
    pub posts_cursor: Option<Cursor>,
    pub comments_cursor: Option<Cursor>,
    pub exhausted: BTreeSet<SortVariant>,
    /// The last post walk ended on a failed fetch.
    pub posts_interrupted: bool,
    pub comments_interrupted: bool,
}
