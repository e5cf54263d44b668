/// Platform-assigned identity of a post or comment, used as the dedup key.
pub type RecordId = String;

/// A submission recovered from the search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: RecordId,
    pub title: String,
    pub score: i64,
    pub community: String,
    pub permalink: String,
    /// Seconds since the Unix epoch.
    pub created_utc: i64,
    pub sensitive: bool,
}

/// A comment recovered from the search index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: RecordId,
    pub body: String,
    pub score: i64,
    pub community: String,
    /// Title of the post the comment was left on; empty when unknown.
    pub post_title: String,
    pub permalink: String,
    /// Seconds since the Unix epoch.
    pub created_utc: i64,
}

/// Common accessors shared by every record type kept in a [`crate::RecordSet`].
pub trait Record: Clone {
    fn id(&self) -> &str;
    fn score(&self) -> i64;
    fn created_utc(&self) -> i64;
}

impl Record for Post {
    fn id(&self) -> &str {
        &self.id
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn created_utc(&self) -> i64 {
        self.created_utc
    }
}

impl Record for Comment {
    fn id(&self) -> &str {
        &self.id
    }

    fn score(&self) -> i64 {
        self.score
    }

    fn created_utc(&self) -> i64 {
        self.created_utc
    }
}

/// Permalink for a post, built from the community and the bare post id.
pub fn post_permalink(community: &str, post_id: &str) -> String {
    format!("/r/{community}/comments/{}/", strip_kind_prefix(post_id))
}

/// Permalink for a comment under its parent post.
pub fn comment_permalink(community: &str, post_id: &str, comment_id: &str) -> String {
    format!(
        "/r/{community}/comments/{}/comment/{}/",
        strip_kind_prefix(post_id),
        strip_kind_prefix(comment_id)
    )
}

fn strip_kind_prefix(id: &str) -> &str {
    id.strip_prefix("t3_")
        .or_else(|| id.strip_prefix("t1_"))
        .unwrap_or(id)
}
