use std::time::Duration;

use engine_logging::{engine_debug, engine_info, engine_warn};
use unveiler_core::{Cursor, RecordSet, WalkResult};

use crate::progress::ProgressTracker;
use crate::{PageExtractor, PageSource};

/// Stop condition on the accumulated record count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Stop following cursors once at least this many records are held.
    Count(usize),
    /// Follow cursors until the server reports no further page.
    Unbounded,
}

impl Target {
    pub fn wants_more(self, count: usize) -> bool {
        match self {
            Target::Count(limit) => count < limit,
            Target::Unbounded => true,
        }
    }
}

/// Walks one cursor chain, merging every page into a growing record set.
pub struct Paginator<'a> {
    source: &'a dyn PageSource,
    progress: &'a ProgressTracker<'a>,
    delay: Duration,
}

impl<'a> Paginator<'a> {
    pub fn new(source: &'a dyn PageSource, progress: &'a ProgressTracker<'a>, delay: Duration) -> Self {
        Self {
            source,
            progress,
            delay,
        }
    }

    /// Fetch pages starting at `start` until the target is met, the chain ends
    /// or a fetch fails.
    ///
    /// The returned cursor is always the first page not successfully consumed:
    /// the server's continuation after the last page read, or the page whose
    /// fetch failed. Pages are fetched strictly in cursor order and never retried.
    pub async fn walk<E: PageExtractor>(
        &self,
        extractor: &E,
        start: Cursor,
        target: Target,
        existing: RecordSet<E::Item>,
    ) -> WalkResult<E::Item> {
        let kind = extractor.kind();
        let mut records = existing;
        let mut pending = Some(start);
        let mut pages_fetched = 0;
        let mut interrupted = false;

        while let Some(url) = pending.take() {
            if !target.wants_more(records.len()) {
                pending = Some(url);
                break;
            }

            let page = match self.source.fetch(url.as_str()).await {
                Ok(page) => page,
                Err(err) => {
                    engine_warn!("Fetch of {} failed, ending {:?} walk: {}", url, kind, err);
                    interrupted = true;
                    pending = Some(url);
                    break;
                }
            };
            pages_fetched += 1;

            let extracted = extractor.extract(&page.html);
            let found = extracted.records.len();
            let added = records.extend(extracted.records);
            self.progress.report(kind, records.len());
            engine_debug!(
                "{:?} page {}: {} found, {} new, {} total",
                kind,
                pages_fetched,
                found,
                added,
                records.len()
            );

            pending = match extracted.next_cursor {
                Some(next) if next == url => {
                    engine_warn!("Cursor {} points back at itself, treating as last page", url);
                    None
                }
                next => next,
            };
            if pending.is_some() && target.wants_more(records.len()) {
                tokio::time::sleep(self.delay).await;
            }
        }

        engine_info!(
            "{:?} walk done: {} records after {} pages, more available: {}",
            kind,
            records.len(),
            pages_fetched,
            pending.is_some()
        );
        WalkResult {
            records,
            next_cursor: pending,
            pages_fetched,
            interrupted,
        }
    }
}
