use crate::{Comment, Post, Record};

/// Aggregate karma and counts shown above the recovered feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProfileStats {
    pub post_karma: i64,
    pub comment_karma: i64,
    pub post_count: usize,
    pub comment_count: usize,
}

pub fn stats(posts: &[Post], comments: &[Comment]) -> ProfileStats {
    ProfileStats {
        post_karma: total_score(posts),
        comment_karma: total_score(comments),
        post_count: posts.len(),
        comment_count: comments.len(),
    }
}

fn total_score<T: Record>(records: &[T]) -> i64 {
    records.iter().map(Record::score).sum()
}
