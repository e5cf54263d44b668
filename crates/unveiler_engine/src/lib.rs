//! Unveiler engine: page fetching, record extraction, pagination, comment
//! variant merging, the session cache and effect execution.
mod cache;
mod config;
mod engine;
mod extract;
mod merger;
mod page_source;
mod paginator;
mod progress;
mod store;
mod types;

pub use cache::CacheStore;
pub use config::{Clock, EngineConfig, DEFAULT_ORIGIN};
pub use engine::{CommentsReport, PostsReport, ProfileEngine, SeedReport};
pub use extract::{CommentExtractor, PageExtractor, PostExtractor};
pub use merger::CommentMerger;
pub use page_source::{FetchSettings, PageSource, ReqwestPageSource};
pub use paginator::{Paginator, Target};
pub use progress::{ChannelProgressSink, NullProgressSink, ProgressSink, ProgressTracker};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use types::{ExtractedPage, FailureKind, FetchError, FetchedPage};
