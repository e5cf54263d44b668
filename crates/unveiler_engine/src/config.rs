use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use url::Url;

use crate::page_source::FetchSettings;

pub const DEFAULT_ORIGIN: &str = "https://www.reddit.com";

/// Clock source for cache freshness and the record-time fallback.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    /// Platform origin that search URLs and relative cursors are resolved against.
    pub origin: Url,
    /// Record count at which the initial seeding walk stops.
    pub initial_limit: usize,
    pub initial_delay: Duration,
    pub load_more_delay: Duration,
    pub cache_validity: Duration,
    pub cache_key_prefix: String,
    pub fetch: FetchSettings,
    pub now: Clock,
}

impl EngineConfig {
    pub fn with_origin(origin: Url) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            origin: Url::parse(DEFAULT_ORIGIN).expect("default origin is a valid url"),
            initial_limit: 75,
            initial_delay: Duration::from_millis(100),
            load_more_delay: Duration::from_millis(200),
            cache_validity: Duration::from_secs(5 * 60),
            cache_key_prefix: "unveiler_cache_".to_string(),
            fetch: FetchSettings::default(),
            now: Arc::new(Utc::now),
        }
    }
}

impl fmt::Debug for EngineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineConfig")
            .field("origin", &self.origin.as_str())
            .field("initial_limit", &self.initial_limit)
            .field("initial_delay", &self.initial_delay)
            .field("load_more_delay", &self.load_more_delay)
            .field("cache_validity", &self.cache_validity)
            .field("cache_key_prefix", &self.cache_key_prefix)
            .field("fetch", &self.fetch)
            .finish_non_exhaustive()
    }
}
