use crate::{CacheSnapshot, CommentSources, Cursor, Post, RecordSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    ReadCache {
        username: String,
    },
    /// Fresh initial fetch of the requested record types, run concurrently.
    SeedFetch {
        username: String,
        posts: bool,
        comments: bool,
    },
    FetchMorePosts {
        username: String,
        cursor: Cursor,
        posts: RecordSet<Post>,
    },
    FetchMoreComments {
        username: String,
        sources: CommentSources,
    },
    WriteCache {
        username: String,
        snapshot: CacheSnapshot,
    },
}
