mod common;

use std::collections::BTreeSet;
use std::time::Duration;

use common::{comment_unit, cursor, page_url, results_page, start_url, ManualClock, ScriptedSource};
use pretty_assertions::assert_eq;
use unveiler_core::{CommentPassResult, CommentSources, RecordKind, SortVariant};
use unveiler_engine::{
    CommentExtractor, CommentMerger, NullProgressSink, Paginator, ProgressTracker, Target,
};

const USER: &str = "alice";

fn comments_start(sort: SortVariant) -> String {
    start_url(USER, RecordKind::Comments, sort)
}

fn ids(sources: &CommentSources) -> Vec<&str> {
    sources
        .comments
        .records()
        .iter()
        .map(|c| c.id.as_str())
        .collect()
}

async fn run_pass(
    source: &ScriptedSource,
    sources: CommentSources,
    target: Target,
) -> CommentPassResult {
    let sink = NullProgressSink;
    let tracker = ProgressTracker::new(&sink);
    let paginator = Paginator::new(source, &tracker, Duration::ZERO);
    let extractor = CommentExtractor::new(common::origin(), ManualClock::new().clock());
    let origin = common::origin();
    let merger = CommentMerger::new(&paginator, &extractor, &origin);
    merger.pass(USER, sources, target).await
}

#[tokio::test]
async fn unexhausted_variants_are_merged_and_marked() {
    common::init_logging();
    let source = ScriptedSource::new()
        .page(
            comments_start(SortVariant::Relevance),
            results_page(
                &[comment_unit("t1_r1", "one", 1), comment_unit("t1_r2", "two", 2)],
                None,
            ),
        )
        .page(
            comments_start(SortVariant::Top),
            results_page(
                &[comment_unit("t1_t1", "three", 3), comment_unit("t1_t2", "four", 4)],
                None,
            ),
        );
    let sources = CommentSources {
        exhausted: BTreeSet::from([SortVariant::New]),
        ..CommentSources::default()
    };

    let result = run_pass(&source, sources, Target::Unbounded).await;

    assert_eq!(ids(&result.sources), vec!["t1_r1", "t1_r2", "t1_t1", "t1_t2"]);
    assert_eq!(result.sources.exhausted, BTreeSet::from(SortVariant::ALL));
    assert_eq!(result.sources.cursor, None);
    assert!(!result.sources.can_continue());
    assert!(!source.requests().contains(&comments_start(SortVariant::New)));
}

#[tokio::test]
async fn live_cursor_is_continued_before_variants() {
    common::init_logging();
    let source = ScriptedSource::new()
        .page(
            page_url("c2"),
            results_page(&[comment_unit("t1_a", "a", 1)], None),
        )
        .page(
            comments_start(SortVariant::Top),
            results_page(&[comment_unit("t1_a", "a", 1), comment_unit("t1_b", "b", 1)], None),
        );
    let sources = CommentSources {
        cursor: Some(cursor(&page_url("c2"))),
        exhausted: BTreeSet::from([SortVariant::New, SortVariant::Relevance]),
        ..CommentSources::default()
    };

    let result = run_pass(&source, sources, Target::Unbounded).await;

    assert_eq!(source.requests(), vec![page_url("c2"), comments_start(SortVariant::Top)]);
    assert_eq!(ids(&result.sources), vec!["t1_a", "t1_b"]);
    assert_eq!(result.pages_fetched, 2);
}

#[tokio::test]
async fn first_variant_cursor_wins_and_exhaustion_only_grows() {
    common::init_logging();
    let source = ScriptedSource::new()
        .page(
            comments_start(SortVariant::New),
            results_page(&[comment_unit("t1_n", "n", 1)], Some(&page_url("new-2"))),
        )
        .failing(page_url("new-2"), 500)
        .page(
            comments_start(SortVariant::Relevance),
            results_page(&[comment_unit("t1_r", "r", 1)], Some(&page_url("rel-2"))),
        )
        .failing(page_url("rel-2"), 500)
        .page(
            comments_start(SortVariant::Top),
            results_page(&[comment_unit("t1_t", "t", 1)], None),
        );

    let first = run_pass(&source, CommentSources::default(), Target::Unbounded).await;

    assert!(first.interrupted);
    assert_eq!(first.sources.cursor, Some(cursor(&page_url("new-2"))));
    assert_eq!(first.sources.exhausted, BTreeSet::from(SortVariant::ALL));
    assert!(first.sources.can_continue());

    source.set_page(page_url("new-2"), results_page(&[comment_unit("t1_n2", "n2", 1)], None));
    let second = run_pass(&source, first.sources.clone(), Target::Unbounded).await;

    assert!(!second.interrupted);
    assert_eq!(second.sources.cursor, None);
    assert!(second.sources.exhausted.is_superset(&first.sources.exhausted));
    assert_eq!(ids(&second.sources), vec!["t1_n", "t1_r", "t1_t", "t1_n2"]);
}

#[tokio::test]
async fn bounded_pass_leaves_later_variants_for_next_time() {
    common::init_logging();
    let units: Vec<String> = (0..3)
        .map(|i| comment_unit(&format!("t1_n{i}"), "text", 1))
        .collect();
    let source = ScriptedSource::new().page(comments_start(SortVariant::New), results_page(&units, None));

    let result = run_pass(&source, CommentSources::default(), Target::Count(3)).await;

    assert_eq!(result.sources.comments.len(), 3);
    assert_eq!(result.sources.exhausted, BTreeSet::from([SortVariant::New]));
    assert_eq!(
        result.sources.pending_variants().collect::<Vec<_>>(),
        vec![SortVariant::Relevance, SortVariant::Top]
    );
    assert_eq!(source.fetch_count(), 1);
}
