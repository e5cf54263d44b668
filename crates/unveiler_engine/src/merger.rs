use engine_logging::engine_info;
use unveiler_core::{search_url, CommentPassResult, CommentSources, RecordKind, SortVariant};
use url::Url;

use crate::paginator::{Paginator, Target};
use crate::CommentExtractor;

/// Extends comments across sort variants, since a single sort order runs out
/// before the search backend's depth cap is reached.
pub struct CommentMerger<'a> {
    paginator: &'a Paginator<'a>,
    extractor: &'a CommentExtractor,
    origin: &'a Url,
}

impl<'a> CommentMerger<'a> {
    pub fn new(paginator: &'a Paginator<'a>, extractor: &'a CommentExtractor, origin: &'a Url) -> Self {
        Self {
            paginator,
            extractor,
            origin,
        }
    }

    /// One merge pass: continue the live cursor, then walk every variant not yet
    /// exhausted in priority order, marking each exhausted once walked.
    ///
    /// With a bounded target, variants are only started while the target is unmet.
    /// The next pass continues from the first live cursor found, in walk order.
    pub async fn pass(&self, username: &str, sources: CommentSources, target: Target) -> CommentPassResult {
        let CommentSources {
            mut comments,
            cursor,
            mut exhausted,
        } = sources;
        let mut next_cursor = None;
        let mut pages_fetched = 0;
        let mut interrupted = false;

        if let Some(cursor) = cursor {
            let walk = self
                .paginator
                .walk(self.extractor, cursor, target, comments)
                .await;
            comments = walk.records;
            next_cursor = walk.next_cursor;
            pages_fetched += walk.pages_fetched;
            interrupted |= walk.interrupted;
        }

        for variant in SortVariant::ALL {
            if exhausted.contains(&variant) {
                continue;
            }
            if !target.wants_more(comments.len()) {
                break;
            }

            let start = search_url(self.origin, username, RecordKind::Comments, variant);
            let before = comments.len();
            let walk = self
                .paginator
                .walk(self.extractor, start, target, comments)
                .await;
            comments = walk.records;
            exhausted.insert(variant);
            engine_info!(
                "Comment variant '{}' walked: {} new comments, {} pages",
                variant,
                comments.len() - before,
                walk.pages_fetched
            );
            next_cursor = next_cursor.or(walk.next_cursor);
            pages_fetched += walk.pages_fetched;
            interrupted |= walk.interrupted;
        }

        CommentPassResult {
            sources: CommentSources {
                comments,
                cursor: next_cursor,
                exhausted,
            },
            pages_fetched,
            interrupted,
        }
    }
}
