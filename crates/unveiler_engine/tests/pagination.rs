mod common;

use std::sync::Mutex;
use std::time::Duration;

use common::{cursor, page_url, post_unit, results_page, ManualClock, ScriptedSource};
use pretty_assertions::assert_eq;
use unveiler_core::{LoadProgress, Post, RecordSet};
use unveiler_engine::{Paginator, PostExtractor, ProgressSink, ProgressTracker, Target};

#[derive(Default)]
struct RecordingSink {
    updates: Mutex<Vec<LoadProgress>>,
}

impl ProgressSink for RecordingSink {
    fn emit(&self, progress: LoadProgress) {
        self.updates.lock().unwrap().push(progress);
    }
}

fn ids(records: &RecordSet<Post>) -> Vec<&str> {
    records.records().iter().map(|p| p.id.as_str()).collect()
}

fn extractor() -> PostExtractor {
    PostExtractor::new(common::origin(), ManualClock::new().clock())
}

#[tokio::test]
async fn walk_merges_pages_and_drops_duplicates() {
    common::init_logging();
    let source = ScriptedSource::new()
        .page(
            page_url("p1"),
            results_page(
                &[post_unit("t3_a", "A", 1), post_unit("t3_b", "B", 2)],
                Some(&page_url("p2")),
            ),
        )
        .page(
            page_url("p2"),
            results_page(&[post_unit("t3_c", "C", 3), post_unit("t3_a", "A", 1)], None),
        );
    let sink = RecordingSink::default();
    let tracker = ProgressTracker::new(&sink);
    let paginator = Paginator::new(&source, &tracker, Duration::ZERO);

    let result = paginator
        .walk(&extractor(), cursor(&page_url("p1")), Target::Count(10), RecordSet::new())
        .await;

    assert_eq!(ids(&result.records), vec!["t3_a", "t3_b", "t3_c"]);
    assert_eq!(result.next_cursor, None);
    assert_eq!(result.pages_fetched, 2);
    assert!(!result.interrupted);
    assert_eq!(source.fetch_count(), 2);

    let posts_seen: Vec<usize> = sink.updates.lock().unwrap().iter().map(|p| p.posts).collect();
    assert_eq!(posts_seen, vec![2, 3]);
}

#[tokio::test]
async fn failed_fetch_keeps_records_and_points_at_failed_page() {
    common::init_logging();
    let source = ScriptedSource::new()
        .page(
            page_url("p1"),
            results_page(&[post_unit("t3_a", "A", 1)], Some(&page_url("p2"))),
        )
        .failing(page_url("p2"), 503)
        .page(
            page_url("p3"),
            results_page(&[post_unit("t3_z", "Z", 1)], None),
        );
    let sink = RecordingSink::default();
    let tracker = ProgressTracker::new(&sink);
    let paginator = Paginator::new(&source, &tracker, Duration::ZERO);

    let result = paginator
        .walk(&extractor(), cursor(&page_url("p1")), Target::Unbounded, RecordSet::new())
        .await;

    assert_eq!(ids(&result.records), vec!["t3_a"]);
    assert_eq!(result.next_cursor, Some(cursor(&page_url("p2"))));
    assert_eq!(result.pages_fetched, 1);
    assert!(result.interrupted);
    assert_eq!(source.requests(), vec![page_url("p1"), page_url("p2")]);
}

#[tokio::test]
async fn failure_on_first_page_returns_the_start_cursor() {
    common::init_logging();
    let source = ScriptedSource::new().failing(page_url("p1"), 500);
    let sink = RecordingSink::default();
    let tracker = ProgressTracker::new(&sink);
    let paginator = Paginator::new(&source, &tracker, Duration::ZERO);

    let result = paginator
        .walk(&extractor(), cursor(&page_url("p1")), Target::Count(75), RecordSet::new())
        .await;

    assert!(result.records.is_empty());
    assert_eq!(result.next_cursor, Some(cursor(&page_url("p1"))));
    assert!(result.interrupted);
    assert!(sink.updates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn bounded_walk_stops_once_target_is_met() {
    common::init_logging();
    let source = ScriptedSource::new().page(
        page_url("p1"),
        results_page(
            &[post_unit("t3_a", "A", 1), post_unit("t3_b", "B", 1)],
            Some(&page_url("p2")),
        ),
    );
    let sink = RecordingSink::default();
    let tracker = ProgressTracker::new(&sink);
    let paginator = Paginator::new(&source, &tracker, Duration::ZERO);

    let result = paginator
        .walk(&extractor(), cursor(&page_url("p1")), Target::Count(2), RecordSet::new())
        .await;

    assert_eq!(result.records.len(), 2);
    assert_eq!(result.next_cursor, Some(cursor(&page_url("p2"))));
    assert_eq!(source.fetch_count(), 1);
}

#[tokio::test]
async fn unbounded_walk_follows_the_chain_to_its_end() {
    common::init_logging();
    let names = ["p1", "p2", "p3", "p4", "p5"];
    let mut source = ScriptedSource::new();
    for (i, name) in names.iter().enumerate() {
        let next = names.get(i + 1).map(|n| page_url(n));
        source = source.page(
            page_url(name),
            results_page(
                &[post_unit(&format!("t3_{name}"), name, i as i64)],
                next.as_deref(),
            ),
        );
    }
    let sink = RecordingSink::default();
    let tracker = ProgressTracker::new(&sink);
    let paginator = Paginator::new(&source, &tracker, Duration::ZERO);

    let result = paginator
        .walk(&extractor(), cursor(&page_url("p1")), Target::Unbounded, RecordSet::new())
        .await;

    assert_eq!(result.records.len(), names.len());
    assert_eq!(result.pages_fetched, names.len());
    assert_eq!(result.next_cursor, None);
}

#[tokio::test]
async fn cursor_pointing_at_its_own_page_ends_the_walk() {
    common::init_logging();
    let source = ScriptedSource::new().page(
        page_url("loop"),
        results_page(&[post_unit("t3_a", "A", 1)], Some(&page_url("loop"))),
    );
    let sink = RecordingSink::default();
    let tracker = ProgressTracker::new(&sink);
    let paginator = Paginator::new(&source, &tracker, Duration::ZERO);

    let result = paginator
        .walk(&extractor(), cursor(&page_url("loop")), Target::Unbounded, RecordSet::new())
        .await;

    assert_eq!(source.fetch_count(), 1);
    assert_eq!(result.next_cursor, None);
}

#[tokio::test]
async fn rewalking_known_pages_adds_nothing() {
    common::init_logging();
    let source = ScriptedSource::new().page(
        page_url("p1"),
        results_page(
            &[post_unit("t3_a", "A", 1), post_unit("t3_b", "B", 1)],
            None,
        ),
    );
    let sink = RecordingSink::default();
    let tracker = ProgressTracker::new(&sink);
    let paginator = Paginator::new(&source, &tracker, Duration::ZERO);
    let posts = extractor();

    let first = paginator
        .walk(&posts, cursor(&page_url("p1")), Target::Unbounded, RecordSet::new())
        .await;
    let again = paginator
        .walk(&posts, cursor(&page_url("p1")), Target::Unbounded, first.records.clone())
        .await;

    assert_eq!(again.records, first.records);
    assert_eq!(again.records.seen_ids().len(), again.records.len());
}

#[tokio::test(start_paused = true)]
async fn pages_are_spaced_by_the_configured_delay() {
    common::init_logging();
    let source = ScriptedSource::new()
        .page(
            page_url("p1"),
            results_page(&[post_unit("t3_a", "A", 1)], Some(&page_url("p2"))),
        )
        .page(page_url("p2"), results_page(&[post_unit("t3_b", "B", 1)], None));
    let sink = RecordingSink::default();
    let tracker = ProgressTracker::new(&sink);
    let paginator = Paginator::new(&source, &tracker, Duration::from_millis(200));

    let started = tokio::time::Instant::now();
    paginator
        .walk(&extractor(), cursor(&page_url("p1")), Target::Unbounded, RecordSet::new())
        .await;

    assert_eq!(started.elapsed(), Duration::from_millis(200));
}
