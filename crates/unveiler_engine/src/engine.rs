use std::collections::VecDeque;
use std::sync::Arc;

use engine_logging::{engine_debug, engine_info};
use unveiler_core::{
    search_url, stats, update, AppState, Comment, CommentSources, Cursor, Effect, LoadMoreStatus,
    LoadProgress, Msg, Notice, Post, ProfileStats, ProfileView, RecordKind, RecordSet,
    SeedOutcome, SortVariant,
};

use crate::cache::CacheStore;
use crate::merger::CommentMerger;
use crate::paginator::{Paginator, Target};
use crate::progress::{ProgressSink, ProgressTracker};
use crate::store::KeyValueStore;
use crate::{
    CommentExtractor, EngineConfig, FetchError, PageSource, PostExtractor, ReqwestPageSource,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub posts: Vec<Post>,
    pub comments: Vec<Comment>,
    pub posts_cursor: Option<Cursor>,
    pub comments_cursor: Option<Cursor>,
    pub stats: ProfileStats,
    pub outcome: Option<SeedOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostsReport {
    pub posts: Vec<Post>,
    pub posts_cursor: Option<Cursor>,
    pub status: LoadMoreStatus,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentsReport {
    pub comments: Vec<Comment>,
    pub comments_cursor: Option<Cursor>,
    pub can_continue: bool,
    pub status: LoadMoreStatus,
    pub notice: Option<Notice>,
}

/// Drives the core state machine: feeds it messages and runs the effects it
/// returns (cache access, seeding and load-more fetch bursts) until it settles.
pub struct ProfileEngine {
    state: AppState,
    config: EngineConfig,
    source: Arc<dyn PageSource>,
    cache: CacheStore,
    progress: Arc<dyn ProgressSink>,
    posts: PostExtractor,
    comments: CommentExtractor,
}

impl ProfileEngine {
    pub fn new(
        config: EngineConfig,
        source: Arc<dyn PageSource>,
        store: Arc<dyn KeyValueStore>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        let cache = CacheStore::new(
            store,
            config.cache_validity,
            config.cache_key_prefix.clone(),
            config.now.clone(),
        );
        Self {
            state: AppState::new(),
            posts: PostExtractor::new(config.origin.clone(), config.now.clone()),
            comments: CommentExtractor::new(config.origin.clone(), config.now.clone()),
            config,
            source,
            cache,
            progress,
        }
    }

    /// Engine fetching over HTTP with the configured fetch settings.
    pub fn with_reqwest(
        config: EngineConfig,
        store: Arc<dyn KeyValueStore>,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<Self, FetchError> {
        let source = Arc::new(ReqwestPageSource::new(config.fetch.clone())?);
        Ok(Self::new(config, source, store, progress))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Activate `view` for `username`, from cache when fresh. Repeating the
    /// call for the active username and view does no work.
    pub async fn seed(&mut self, username: &str, view: ProfileView) -> SeedReport {
        self.dispatch(Msg::ViewActivated {
            username: username.to_string(),
            view,
        })
        .await;

        let session = self.state.session();
        let posts = session.map(|s| s.posts().to_vec()).unwrap_or_default();
        let comments = session.map(|s| s.comments().to_vec()).unwrap_or_default();
        SeedReport {
            stats: stats(&posts, &comments),
            posts_cursor: session.and_then(|s| s.posts_cursor().cloned()),
            comments_cursor: session.and_then(|s| s.comments_cursor().cloned()),
            outcome: session.and_then(|s| s.seed_outcome()),
            posts,
            comments,
        }
    }

    pub async fn load_more_posts(&mut self) -> PostsReport {
        self.dispatch(Msg::LoadMorePostsClicked).await;
        let view = self.state.view();
        let session = self.state.session();
        PostsReport {
            posts: session.map(|s| s.posts().to_vec()).unwrap_or_default(),
            posts_cursor: view.posts_cursor,
            status: view.posts_status,
            notice: view.notice,
        }
    }

    pub async fn load_more_comments(&mut self) -> CommentsReport {
        self.dispatch(Msg::LoadMoreCommentsClicked).await;
        let view = self.state.view();
        let session = self.state.session();
        CommentsReport {
            comments: session.map(|s| s.comments().to_vec()).unwrap_or_default(),
            comments_cursor: view.comments_cursor,
            can_continue: view.comments_status != LoadMoreStatus::Exhausted,
            status: view.comments_status,
            notice: view.notice,
        }
    }

    /// Drop the active session; its cache entry stays for a later visit.
    pub fn navigate_away(&mut self) {
        let state = std::mem::take(&mut self.state);
        let (state, _) = update(state, Msg::NavigatedAway);
        self.state = state;
    }

    async fn dispatch(&mut self, msg: Msg) {
        let mut inbox = VecDeque::from([msg]);
        while let Some(msg) = inbox.pop_front() {
            let before = self.state.phase();
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            if self.state.phase() != before {
                engine_debug!("Session phase {:?} -> {:?}", before, self.state.phase());
            }
            for effect in effects {
                if let Some(next) = self.run_effect(effect).await {
                    inbox.push_back(next);
                }
            }
        }
    }

    /// Counts held by the active session, the baseline for a load-more burst.
    fn current_counts(&self) -> LoadProgress {
        let session = self.state.session();
        LoadProgress {
            comments: session.map_or(0, |s| s.comments().len()),
            posts: session.map_or(0, |s| s.posts().len()),
        }
    }

    async fn run_effect(&self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::ReadCache { username } => {
                let snapshot = self.cache.get(&username);
                Some(Msg::CacheChecked { username, snapshot })
            }
            Effect::SeedFetch {
                username,
                posts,
                comments,
            } => {
                engine_info!(
                    "Seeding {} (posts: {}, comments: {})",
                    username,
                    posts,
                    comments
                );
                let tracker = ProgressTracker::new(self.progress.as_ref());
                let paginator =
                    Paginator::new(self.source.as_ref(), &tracker, self.config.initial_delay);
                let target = Target::Count(self.config.initial_limit);
                let merger = CommentMerger::new(&paginator, &self.comments, &self.config.origin);

                let posts_task = async {
                    if !posts {
                        return None;
                    }
                    let start = search_url(
                        &self.config.origin,
                        &username,
                        RecordKind::Posts,
                        SortVariant::New,
                    );
                    Some(paginator.walk(&self.posts, start, target, RecordSet::new()).await)
                };
                let comments_task = async {
                    if !comments {
                        return None;
                    }
                    Some(
                        merger
                            .pass(&username, CommentSources::default(), target)
                            .await,
                    )
                };
                let (posts, comments) = tokio::join!(posts_task, comments_task);
                Some(Msg::SeedFetched {
                    username,
                    posts,
                    comments,
                })
            }
            Effect::FetchMorePosts {
                username,
                cursor,
                posts,
            } => {
                let tracker =
                    ProgressTracker::starting_at(self.progress.as_ref(), self.current_counts());
                let paginator =
                    Paginator::new(self.source.as_ref(), &tracker, self.config.load_more_delay);
                let result = paginator
                    .walk(&self.posts, cursor, Target::Unbounded, posts)
                    .await;
                Some(Msg::PostsLoaded { username, result })
            }
            Effect::FetchMoreComments { username, sources } => {
                let tracker =
                    ProgressTracker::starting_at(self.progress.as_ref(), self.current_counts());
                let paginator =
                    Paginator::new(self.source.as_ref(), &tracker, self.config.load_more_delay);
                let merger = CommentMerger::new(&paginator, &self.comments, &self.config.origin);
                let result = merger.pass(&username, sources, Target::Unbounded).await;
                Some(Msg::CommentsLoaded { username, result })
            }
            Effect::WriteCache { username, snapshot } => {
                engine_debug!("Writing cache for {}", username);
                self.cache.put(&username, &snapshot);
                None
            }
        }
    }
}
