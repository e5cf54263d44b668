use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use unveiler_core::{
    build_feed, format_age, AppState, Comment, FeedItem, FeedOrder, LoadMoreStatus, Post,
    ProfileView, SeedOutcome,
};
use url::Url;

const BODY_PREVIEW_CHARS: usize = 280;

#[derive(Debug, Serialize)]
struct JsonProfile<'a> {
    username: &'a str,
    view: &'static str,
    outcome: &'static str,
    post_karma: i64,
    comment_karma: i64,
    posts: Vec<JsonPost<'a>>,
    comments: Vec<JsonComment<'a>>,
    posts_cursor: Option<&'a str>,
    comments_cursor: Option<&'a str>,
    more_posts: &'static str,
    more_comments: &'static str,
}

#[derive(Debug, Serialize)]
struct JsonPost<'a> {
    id: &'a str,
    title: &'a str,
    score: i64,
    community: &'a str,
    url: String,
    created_utc: i64,
    sensitive: bool,
}

#[derive(Debug, Serialize)]
struct JsonComment<'a> {
    id: &'a str,
    body: &'a str,
    score: i64,
    community: &'a str,
    post_title: &'a str,
    url: String,
    created_utc: i64,
}

impl<'a> JsonPost<'a> {
    fn new(post: &'a Post, origin: &Url) -> Self {
        Self {
            id: &post.id,
            title: &post.title,
            score: post.score,
            community: &post.community,
            url: absolute(origin, &post.permalink),
            created_utc: post.created_utc,
            sensitive: post.sensitive,
        }
    }
}

impl<'a> JsonComment<'a> {
    fn new(comment: &'a Comment, origin: &Url) -> Self {
        Self {
            id: &comment.id,
            body: &comment.body,
            score: comment.score,
            community: &comment.community,
            post_title: &comment.post_title,
            url: absolute(origin, &comment.permalink),
            created_utc: comment.created_utc,
        }
    }
}

/// Machine-readable dump of the active session.
pub fn render_json(state: &AppState, origin: &Url) -> anyhow::Result<String> {
    let view = state.view();
    let Some(session) = state.session() else {
        return Ok("null".to_string());
    };
    let profile = JsonProfile {
        username: session.username(),
        view: view_name(session.view()),
        outcome: outcome_name(session.seed_outcome()),
        post_karma: view.stats.post_karma,
        comment_karma: view.stats.comment_karma,
        posts: session
            .posts()
            .iter()
            .map(|post| JsonPost::new(post, origin))
            .collect(),
        comments: session
            .comments()
            .iter()
            .map(|comment| JsonComment::new(comment, origin))
            .collect(),
        posts_cursor: session.posts_cursor().map(|c| c.as_str()),
        comments_cursor: session.comments_cursor().map(|c| c.as_str()),
        more_posts: status_name(view.posts_status),
        more_comments: status_name(view.comments_status),
    };
    Ok(serde_json::to_string_pretty(&profile)?)
}

/// Human-readable summary followed by the ordered feed.
pub fn render_text(state: &AppState, origin: &Url, order: FeedOrder, now: DateTime<Utc>) -> String {
    let view = state.view();
    let Some(session) = state.session() else {
        return "No profile loaded.\n".to_string();
    };

    let mut out = String::new();
    let _ = writeln!(out, "u/{} ({})", session.username(), view_name(session.view()));
    if session.seed_outcome() == Some(SeedOutcome::NoData) {
        let _ = writeln!(out, "No posts or comments found for this user.");
        return out;
    }

    let stats = view.stats;
    let _ = writeln!(
        out,
        "{} posts ({} karma), {} comments ({} karma)",
        stats.post_count, stats.post_karma, stats.comment_count, stats.comment_karma
    );
    if session.view().needs_posts() {
        let _ = writeln!(out, "More posts: {}", status_name(view.posts_status));
    }
    if session.view().needs_comments() {
        let _ = writeln!(out, "More comments: {}", status_name(view.comments_status));
    }
    out.push('\n');

    for item in build_feed(session.posts(), session.comments(), session.view(), order) {
        render_item(&mut out, item, origin, now);
    }
    out
}

fn render_item(out: &mut String, item: FeedItem<'_>, origin: &Url, now: DateTime<Utc>) {
    let age = format_age(item.created_utc(), now);
    match item {
        FeedItem::Post(post) => {
            let flag = if post.sensitive { " [nsfw]" } else { "" };
            let _ = writeln!(
                out,
                "[post] r/{} | {} points | {}{}",
                post.community, post.score, age, flag
            );
            let _ = writeln!(out, "  {}", post.title);
        }
        FeedItem::Comment(comment) => {
            let _ = writeln!(
                out,
                "[comment] r/{} | {} points | {}",
                comment.community, comment.score, age
            );
            if !comment.post_title.is_empty() {
                let _ = writeln!(out, "  on: {}", comment.post_title);
            }
            let _ = writeln!(out, "  {}", preview(&comment.body));
        }
    }
    let _ = writeln!(out, "  {}", absolute(origin, item.permalink()));
    out.push('\n');
}

fn preview(body: &str) -> String {
    let flat = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= BODY_PREVIEW_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(BODY_PREVIEW_CHARS).collect();
    format!("{cut}...")
}

fn absolute(origin: &Url, permalink: &str) -> String {
    origin
        .join(permalink)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| permalink.to_string())
}

fn view_name(view: ProfileView) -> &'static str {
    match view {
        ProfileView::Overview => "overview",
        ProfileView::Posts => "posts",
        ProfileView::Comments => "comments",
    }
}

fn outcome_name(outcome: Option<SeedOutcome>) -> &'static str {
    match outcome {
        Some(SeedOutcome::Found) => "found",
        Some(SeedOutcome::NoData) => "no_data",
        None => "pending",
    }
}

fn status_name(status: LoadMoreStatus) -> &'static str {
    match status {
        LoadMoreStatus::Available => "available",
        LoadMoreStatus::Loading => "loading",
        LoadMoreStatus::Retry => "interrupted, retry possible",
        LoadMoreStatus::Exhausted => "none",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use chrono::TimeZone;
    use unveiler_core::{update, CacheSnapshot, Msg, RecordSet, SortVariant};

    fn origin() -> Url {
        Url::parse("https://www.reddit.com").unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn ready_state(snapshot: CacheSnapshot) -> AppState {
        let (state, _) = update(
            AppState::new(),
            Msg::ViewActivated {
                username: "alice".to_string(),
                view: ProfileView::Overview,
            },
        );
        let (state, effects) = update(
            state,
            Msg::CacheChecked {
                username: "alice".to_string(),
                snapshot: Some(snapshot),
            },
        );
        assert!(effects.is_empty());
        state
    }

    fn sample() -> CacheSnapshot {
        let post = Post {
            id: "t3_p1".to_string(),
            title: "Lifetimes explained".to_string(),
            score: 40,
            community: "rust".to_string(),
            permalink: "/r/rust/comments/p1/".to_string(),
            created_utc: now().timestamp() - 3 * 3_600,
            sensitive: false,
        };
        let comment = Comment {
            id: "t1_c1".to_string(),
            body: "Nice   write\nup".to_string(),
            score: 3,
            community: "rust".to_string(),
            post_title: "Lifetimes explained".to_string(),
            permalink: "/r/rust/comments/p1/comment/c1/".to_string(),
            created_utc: now().timestamp() - 120,
        };
        CacheSnapshot {
            posts: RecordSet::from_parts(vec![post], Vec::new()),
            comments: RecordSet::from_parts(vec![comment], Vec::new()),
            exhausted: BTreeSet::from(SortVariant::ALL),
            ..CacheSnapshot::default()
        }
    }

    #[test]
    fn text_feed_lists_newest_first_with_absolute_links() {
        let text = render_text(&ready_state(sample()), &origin(), FeedOrder::New, now());

        assert!(text.starts_with("u/alice (overview)\n1 posts (40 karma), 1 comments (3 karma)\n"));
        let comment_at = text.find("[comment] r/rust | 3 points | 2 minutes ago").unwrap();
        let post_at = text.find("[post] r/rust | 40 points | 3 hours ago").unwrap();
        assert!(comment_at < post_at);
        assert!(text.contains("  Nice write up\n"));
        assert!(text.contains("https://www.reddit.com/r/rust/comments/p1/comment/c1/"));
    }

    #[test]
    fn top_order_puts_highest_score_first() {
        let text = render_text(&ready_state(sample()), &origin(), FeedOrder::Top, now());

        assert!(text.find("[post]").unwrap() < text.find("[comment]").unwrap());
    }

    #[test]
    fn json_carries_records_and_status() {
        let json = render_json(&ready_state(sample()), &origin()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["username"], "alice");
        assert_eq!(value["outcome"], "found");
        assert_eq!(value["posts"][0]["url"], "https://www.reddit.com/r/rust/comments/p1/");
        assert_eq!(value["comments"][0]["post_title"], "Lifetimes explained");
        assert_eq!(value["more_comments"], "none");
    }

    #[test]
    fn long_bodies_are_shortened() {
        let body = "word ".repeat(100);
        let shown = preview(&body);
        assert!(shown.ends_with("..."));
        assert_eq!(shown.chars().count(), BODY_PREVIEW_CHARS + 3);
    }
}
