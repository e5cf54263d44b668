use std::collections::HashSet;

use chrono::DateTime;
use engine_logging::{engine_debug, engine_trace};
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use unveiler_core::{comment_permalink, post_permalink, Comment, Cursor, Post, Record, RecordKind};
use url::Url;

use crate::config::Clock;
use crate::ExtractedPage;

const CONTEXT_ATTR: &str = "data-faceplate-tracking-context";
const NEXT_PAGE_PARTIAL: &str = r#"faceplate-partial[src*="cursor="]"#;

/// Turns one search result page into typed records plus the next-page cursor.
pub trait PageExtractor: Send + Sync {
    type Item: Record + Send;

    fn kind(&self) -> RecordKind;

    fn extract(&self, html: &str) -> ExtractedPage<Self::Item>;
}

/// Strategy for locating content units; strategies are tried in order and the
/// first one matching at least one element wins.
#[derive(Debug, Clone, Copy)]
enum UnitMatcher {
    /// The matched element is the unit. Its context sits on a descendant
    /// tracker, or on the element itself.
    Container(&'static str),
    /// The matched element is a tracker. The unit is the closest ancestor
    /// carrying `data-testid`, or else the tracker's grandparent.
    Tracker(&'static str),
}

impl UnitMatcher {
    fn css(self) -> &'static str {
        match self {
            UnitMatcher::Container(css) | UnitMatcher::Tracker(css) => css,
        }
    }
}

const POST_MATCHERS: &[UnitMatcher] = &[
    UnitMatcher::Container(r#"[data-testid="search-sdui-post-unit"]"#),
    UnitMatcher::Container("shreddit-post"),
    UnitMatcher::Container(r#"search-telemetry-tracker[view-events*="search/view/post"]"#),
    UnitMatcher::Tracker("[data-faceplate-tracking-context]"),
];
const POST_TRACKER: &str = "[data-faceplate-tracking-context]";

const COMMENT_MATCHERS: &[UnitMatcher] = &[UnitMatcher::Container(
    r#"[data-testid="search-sdui-comment-unit"]"#,
)];
const COMMENT_TRACKER: &str = "search-telemetry-tracker[data-faceplate-tracking-context]";

/// A located unit: its raw tracking context and the element holding its
/// secondary signals (score badge, timestamps).
struct Candidate<'a> {
    context: Option<&'a str>,
    container: Option<ElementRef<'a>>,
}

#[derive(Debug, Default, Deserialize)]
struct TrackingContext {
    post: Option<ContextPost>,
    comment: Option<ContextComment>,
    subreddit: Option<ContextCommunity>,
}

#[derive(Debug, Default, Deserialize)]
struct ContextPost {
    id: Option<String>,
    title: Option<String>,
    nsfw: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct ContextComment {
    id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ContextCommunity {
    name: Option<String>,
}

impl TrackingContext {
    fn community(&self) -> String {
        self.subreddit
            .as_ref()
            .and_then(|s| s.name.clone())
            .unwrap_or_default()
    }

    fn post_id(&self) -> Option<&str> {
        self.post.as_ref().and_then(|p| non_empty(p.id.as_deref()))
    }

    fn post_title(&self) -> Option<&str> {
        self.post.as_ref().and_then(|p| non_empty(p.title.as_deref()))
    }
}

pub struct PostExtractor {
    origin: Url,
    now: Clock,
}

impl PostExtractor {
    pub fn new(origin: Url, now: Clock) -> Self {
        Self { origin, now }
    }

    fn build_post(&self, context: &TrackingContext, container: Option<ElementRef>) -> Option<Post> {
        if context.comment.is_some() {
            return None;
        }
        let id = context.post_id()?;
        let title = context.post_title()?;
        let community = context.community();

        let score = container
            .and_then(|unit| first(unit, r#"[data-testid="search-counter-row"]"#))
            .and_then(|row| first(row, "faceplate-number[number]"))
            .and_then(|el| el.value().attr("number"))
            .and_then(parse_score)
            .unwrap_or(0);
        let created_utc = container
            .and_then(|unit| first(unit, "faceplate-timeago[ts]"))
            .and_then(|el| el.value().attr("ts"))
            .and_then(parse_timestamp)
            .unwrap_or_else(|| (self.now)().timestamp());

        Some(Post {
            id: id.to_string(),
            title: title.to_string(),
            score,
            permalink: post_permalink(&community, id),
            community,
            created_utc,
            sensitive: context.post.as_ref().and_then(|p| p.nsfw).unwrap_or(false),
        })
    }
}

impl PageExtractor for PostExtractor {
    type Item = Post;

    fn kind(&self) -> RecordKind {
        RecordKind::Posts
    }

    fn extract(&self, html: &str) -> ExtractedPage<Post> {
        let doc = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut records = Vec::new();

        for candidate in find_units(&doc, POST_MATCHERS, POST_TRACKER) {
            let Some(context) = parse_context(candidate.context) else {
                continue;
            };
            let Some(post) = self.build_post(&context, candidate.container) else {
                continue;
            };
            // Highlighted and thumbnail trackers can describe the same post.
            if seen.insert(post.id.clone()) {
                records.push(post);
            }
        }

        ExtractedPage {
            records,
            next_cursor: next_cursor(&doc, &self.origin),
        }
    }
}

pub struct CommentExtractor {
    origin: Url,
    now: Clock,
}

impl CommentExtractor {
    pub fn new(origin: Url, now: Clock) -> Self {
        Self { origin, now }
    }

    fn build_comment(&self, context: &TrackingContext, unit: ElementRef) -> Option<Comment> {
        let id = context
            .comment
            .as_ref()
            .and_then(|c| non_empty(c.id.as_deref()))?;

        let body = comment_body(unit, id)?;
        let score = first(unit, "p.text-neutral-content-weak")
            .and_then(|votes| first(votes, "faceplate-number[number]"))
            .and_then(|el| el.value().attr("number"))
            .and_then(parse_score)
            .unwrap_or(0);
        let created_utc = selector("faceplate-timeago[ts]")
            .and_then(|sel| unit.select(&sel).last())
            .and_then(|el| el.value().attr("ts"))
            .and_then(parse_timestamp)
            .unwrap_or_else(|| (self.now)().timestamp());

        let community = context.community();
        let post_id = context.post_id().unwrap_or_default();
        Some(Comment {
            id: id.to_string(),
            body,
            score,
            post_title: context.post_title().unwrap_or_default().to_string(),
            permalink: comment_permalink(&community, post_id, id),
            community,
            created_utc,
        })
    }
}

impl PageExtractor for CommentExtractor {
    type Item = Comment;

    fn kind(&self) -> RecordKind {
        RecordKind::Comments
    }

    fn extract(&self, html: &str) -> ExtractedPage<Comment> {
        let doc = Html::parse_document(html);
        let records = find_units(&doc, COMMENT_MATCHERS, COMMENT_TRACKER)
            .into_iter()
            .filter_map(|candidate| {
                let context = parse_context(candidate.context)?;
                self.build_comment(&context, candidate.container?)
            })
            .collect();

        ExtractedPage {
            records,
            next_cursor: next_cursor(&doc, &self.origin),
        }
    }
}

fn find_units<'a>(doc: &'a Html, matchers: &[UnitMatcher], tracker_css: &str) -> Vec<Candidate<'a>> {
    let Some(tracker) = selector(tracker_css) else {
        return Vec::new();
    };
    for matcher in matchers {
        let Some(sel) = selector(matcher.css()) else {
            continue;
        };
        let elements: Vec<ElementRef<'a>> = doc.select(&sel).collect();
        if elements.is_empty() {
            continue;
        }
        engine_trace!("{} units matched {}", elements.len(), matcher.css());
        return elements
            .into_iter()
            .map(|element| match matcher {
                UnitMatcher::Container(_) => {
                    let context = element
                        .select(&tracker)
                        .next()
                        .and_then(|t| t.value().attr(CONTEXT_ATTR))
                        .or_else(|| element.value().attr(CONTEXT_ATTR));
                    Candidate {
                        context,
                        container: Some(element),
                    }
                }
                UnitMatcher::Tracker(_) => Candidate {
                    context: element.value().attr(CONTEXT_ATTR),
                    container: tracker_container(element),
                },
            })
            .collect();
    }
    Vec::new()
}

fn tracker_container(tracker: ElementRef) -> Option<ElementRef> {
    std::iter::once(tracker)
        .chain(tracker.ancestors().filter_map(ElementRef::wrap))
        .find(|el| el.value().attr("data-testid").is_some())
        .or_else(|| {
            tracker
                .parent()
                .and_then(|parent| parent.parent())
                .and_then(ElementRef::wrap)
        })
}

/// The attribute value arrives entity-decoded from the parser. Markup that
/// encoded the context twice still reads `{&quot;...`, and only then is a
/// second decoding pass applied.
fn parse_context(raw: Option<&str>) -> Option<TrackingContext> {
    let raw = raw?.trim();
    let parsed = if raw.starts_with("{&quot;") {
        serde_json::from_str(&html_escape::decode_html_entities(raw))
    } else {
        serde_json::from_str(raw)
    };
    match parsed {
        Ok(context) => Some(context),
        Err(err) => {
            engine_debug!("Skipping unit with unreadable tracking context: {}", err);
            None
        }
    }
}

fn comment_body(unit: ElementRef, comment_id: &str) -> Option<String> {
    let by_id = comment_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
        .then(|| selector(&format!(r#"[id^="search-comment-{comment_id}"]"#)))
        .flatten()
        .and_then(|sel| unit.select(&sel).next());
    let element = by_id.or_else(|| first(unit, ".i18n-search-comment-content"))?;
    let body = element.text().collect::<String>().trim().to_string();
    (!body.is_empty()).then_some(body)
}

fn next_cursor(doc: &Html, origin: &Url) -> Option<Cursor> {
    let sel = selector(NEXT_PAGE_PARTIAL)?;
    let src = doc.select(&sel).next()?.value().attr("src")?.trim();
    if src.is_empty() {
        return None;
    }
    if src.starts_with("http") {
        return Some(Cursor::new(src));
    }
    origin.join(src).ok().map(Cursor::from)
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn first<'a>(scope: ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let sel = selector(css)?;
    scope.select(&sel).next()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Leading integer of a badge value; "1.5" reads as 1.
fn parse_score(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let digits_start = usize::from(raw.starts_with(|c: char| c == '-' || c == '+'));
    let end = raw[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw.len(), |i| i + digits_start);
    raw[..end].parse().ok()
}

/// Seconds since the epoch for RFC 3339 or `+0000`-style offsets.
fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|ts| ts.timestamp())
}
