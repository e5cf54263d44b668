use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use crate::{Comment, Post, ProfileView, Record};

/// Display ordering of the merged feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedOrder {
    #[default]
    New,
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedItem<'a> {
    Post(&'a Post),
    Comment(&'a Comment),
}

impl FeedItem<'_> {
    pub fn score(&self) -> i64 {
        match self {
            FeedItem::Post(post) => post.score(),
            FeedItem::Comment(comment) => comment.score(),
        }
    }

    pub fn created_utc(&self) -> i64 {
        match self {
            FeedItem::Post(post) => post.created_utc(),
            FeedItem::Comment(comment) => comment.created_utc(),
        }
    }

    pub fn permalink(&self) -> &str {
        match self {
            FeedItem::Post(post) => &post.permalink,
            FeedItem::Comment(comment) => &comment.permalink,
        }
    }
}

/// Posts and comments visible in `view`, newest or highest-scored first.
/// Ties keep collection order, posts before comments.
pub fn build_feed<'a>(
    posts: &'a [Post],
    comments: &'a [Comment],
    view: ProfileView,
    order: FeedOrder,
) -> Vec<FeedItem<'a>> {
    let mut items: Vec<FeedItem<'a>> = Vec::new();
    if view.needs_posts() {
        items.extend(posts.iter().map(FeedItem::Post));
    }
    if view.needs_comments() {
        items.extend(comments.iter().map(FeedItem::Comment));
    }
    match order {
        FeedOrder::New => items.sort_by_key(|item| Reverse(item.created_utc())),
        FeedOrder::Top => items.sort_by_key(|item| Reverse(item.score())),
    }
    items
}

/// Relative age such as "3 hours ago" or "2 days ago - 2024/01/31".
pub fn format_age(created_utc: i64, now: DateTime<Utc>) -> String {
    let diff = now.timestamp() - created_utc;
    if diff < 60 {
        return "just now".to_string();
    }
    if diff < 3_600 {
        return plural(diff / 60, "minute");
    }
    if diff < 86_400 {
        return plural(diff / 3_600, "hour");
    }

    let date = DateTime::<Utc>::from_timestamp(created_utc, 0)
        .map(|d| d.format("%Y/%m/%d").to_string())
        .unwrap_or_default();
    let days = diff / 86_400;
    let age = if days < 30 {
        plural(days, "day")
    } else if days / 30 < 12 {
        plural(days / 30, "month")
    } else {
        plural(days / 365, "year")
    };
    format!("{age} - {date}")
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("{n} {unit} ago")
    } else {
        format!("{n} {unit}s ago")
    }
}
