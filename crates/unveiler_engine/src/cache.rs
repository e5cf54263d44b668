use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use serde::{Deserialize, Serialize};
use unveiler_core::{CacheSnapshot, Comment, Cursor, Post, RecordSet, SortVariant};

use crate::config::Clock;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedPost {
    id: String,
    title: String,
    score: i64,
    community: String,
    permalink: String,
    created_utc: i64,
    #[serde(default)]
    sensitive: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedComment {
    id: String,
    body: String,
    score: i64,
    community: String,
    #[serde(default)]
    post_title: String,
    permalink: String,
    created_utc: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    /// Write time, milliseconds since the epoch.
    timestamp: i64,
    #[serde(default)]
    posts: Vec<CachedPost>,
    #[serde(default)]
    comments: Vec<CachedComment>,
    #[serde(default)]
    posts_next_url: Option<String>,
    #[serde(default)]
    comments_next_url: Option<String>,
    #[serde(default)]
    posts_seen_ids: Vec<String>,
    #[serde(default)]
    comments_seen_ids: Vec<String>,
    /// Absent in entries from writers that only ever walked the `new` order.
    #[serde(default)]
    comment_sorts_tried: Option<Vec<String>>,
    #[serde(default)]
    posts_interrupted: bool,
    #[serde(default)]
    comments_interrupted: bool,
}

/// Time-boxed snapshot of a username's accumulated state.
///
/// Best effort throughout: storage or decoding failures read as a miss and
/// failed writes are dropped after logging.
pub struct CacheStore {
    store: Arc<dyn KeyValueStore>,
    validity: Duration,
    key_prefix: String,
    now: Clock,
}

impl CacheStore {
    pub fn new(store: Arc<dyn KeyValueStore>, validity: Duration, key_prefix: String, now: Clock) -> Self {
        Self {
            store,
            validity,
            key_prefix,
            now,
        }
    }

    pub fn key(&self, username: &str) -> String {
        format!("{}{}", self.key_prefix, username)
    }

    /// Fresh snapshot for `username`. Entries older than the validity window are purged.
    pub fn get(&self, username: &str) -> Option<CacheSnapshot> {
        let key = self.key(username);
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                engine_debug!("Cache miss for {}", username);
                return None;
            }
            Err(err) => {
                engine_warn!("Cache read for {} failed: {}", username, err);
                return None;
            }
        };
        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                engine_warn!("Discarding unreadable cache entry for {}: {}", username, err);
                return None;
            }
        };

        let age_ms = (self.now)().timestamp_millis() - entry.timestamp;
        let validity_ms = i64::try_from(self.validity.as_millis()).unwrap_or(i64::MAX);
        if age_ms > validity_ms {
            engine_info!("Cache entry for {} expired ({}s old)", username, age_ms / 1000);
            if let Err(err) = self.store.delete(&key) {
                engine_warn!("Failed to purge expired cache entry for {}: {}", username, err);
            }
            return None;
        }

        engine_info!("Using cached data for {} (age: {}s)", username, age_ms / 1000);
        Some(entry.into_snapshot())
    }

    /// Replace the whole entry for `username`, stamped with the current time.
    pub fn put(&self, username: &str, snapshot: &CacheSnapshot) {
        let entry = CacheEntry::from_snapshot(snapshot, (self.now)().timestamp_millis());
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(err) => {
                engine_warn!("Failed to serialize cache entry for {}: {}", username, err);
                return;
            }
        };
        match self.store.set(&self.key(username), &raw) {
            Ok(()) => engine_debug!(
                "Cached {} posts / {} comments for {}",
                entry.posts.len(),
                entry.comments.len(),
                username
            ),
            Err(err) => engine_warn!("Cache write for {} dropped: {}", username, err),
        }
    }
}

impl CacheEntry {
    fn from_snapshot(snapshot: &CacheSnapshot, timestamp: i64) -> Self {
        Self {
            timestamp,
            posts: snapshot.posts.records().iter().map(CachedPost::from).collect(),
            comments: snapshot
                .comments
                .records()
                .iter()
                .map(CachedComment::from)
                .collect(),
            posts_next_url: snapshot.posts_cursor.as_ref().map(|c| c.to_string()),
            comments_next_url: snapshot.comments_cursor.as_ref().map(|c| c.to_string()),
            posts_seen_ids: sorted(snapshot.posts.seen_ids().iter()),
            comments_seen_ids: sorted(snapshot.comments.seen_ids().iter()),
            comment_sorts_tried: Some(
                snapshot
                    .exhausted
                    .iter()
                    .map(|variant| variant.as_str().to_string())
                    .collect(),
            ),
            posts_interrupted: snapshot.posts_interrupted,
            comments_interrupted: snapshot.comments_interrupted,
        }
    }

    fn into_snapshot(self) -> CacheSnapshot {
        let exhausted: BTreeSet<SortVariant> = match &self.comment_sorts_tried {
            Some(tried) => tried.iter().filter_map(|raw| raw.parse().ok()).collect(),
            None if !self.comments.is_empty() => BTreeSet::from([SortVariant::New]),
            None => BTreeSet::new(),
        };
        CacheSnapshot {
            posts: RecordSet::from_parts(
                self.posts.into_iter().map(Post::from).collect(),
                self.posts_seen_ids,
            ),
            comments: RecordSet::from_parts(
                self.comments.into_iter().map(Comment::from).collect(),
                self.comments_seen_ids,
            ),
            posts_cursor: self.posts_next_url.map(Cursor::new),
            comments_cursor: self.comments_next_url.map(Cursor::new),
            exhausted,
            posts_interrupted: self.posts_interrupted,
            comments_interrupted: self.comments_interrupted,
        }
    }
}

fn sorted<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut ids: Vec<String> = ids.cloned().collect();
    ids.sort();
    ids
}

impl From<&Post> for CachedPost {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            score: post.score,
            community: post.community.clone(),
            permalink: post.permalink.clone(),
            created_utc: post.created_utc,
            sensitive: post.sensitive,
        }
    }
}

impl From<CachedPost> for Post {
    fn from(post: CachedPost) -> Self {
        Self {
            id: post.id,
            title: post.title,
            score: post.score,
            community: post.community,
            permalink: post.permalink,
            created_utc: post.created_utc,
            sensitive: post.sensitive,
        }
    }
}

impl From<&Comment> for CachedComment {
    fn from(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            body: comment.body.clone(),
            score: comment.score,
            community: comment.community.clone(),
            post_title: comment.post_title.clone(),
            permalink: comment.permalink.clone(),
            created_utc: comment.created_utc,
        }
    }
}

impl From<CachedComment> for Comment {
    fn from(comment: CachedComment) -> Self {
        Self {
            id: comment.id,
            body: comment.body,
            score: comment.score,
            community: comment.community,
            post_title: comment.post_title,
            permalink: comment.permalink,
            created_utc: comment.created_utc,
        }
    }
}
