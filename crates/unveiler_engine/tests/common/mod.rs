#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use unveiler_core::{search_url, Cursor, RecordKind, SortVariant};
use unveiler_engine::{
    Clock, EngineConfig, FailureKind, FetchError, FetchedPage, KeyValueStore, MemoryStore,
    PageSource, StoreError,
};
use url::Url;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(engine_logging::initialize_for_tests);
}

pub const ORIGIN: &str = "https://search.test";

pub fn origin() -> Url {
    Url::parse(ORIGIN).unwrap()
}

pub fn start_url(username: &str, kind: RecordKind, sort: SortVariant) -> String {
    search_url(&origin(), username, kind, sort).into_string()
}

pub fn page_url(name: &str) -> String {
    format!("{ORIGIN}/svc/search/{name}?cursor={name}")
}

pub fn cursor(url: &str) -> Cursor {
    Cursor::new(url)
}

/// Page source answering from a fixed script and recording every request.
#[derive(Default)]
pub struct ScriptedSource {
    pages: Mutex<HashMap<String, Result<String, u16>>>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.lock().unwrap().insert(url.into(), Ok(html.into()));
        self
    }

    pub fn failing(self, url: impl Into<String>, status: u16) -> Self {
        self.pages.lock().unwrap().insert(url.into(), Err(status));
        self
    }

    pub fn set_page(&self, url: impl Into<String>, html: impl Into<String>) {
        self.pages.lock().unwrap().insert(url.into(), Ok(html.into()));
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl PageSource for ScriptedSource {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.pages.lock().unwrap().get(url).cloned() {
            Some(Ok(html)) => Ok(FetchedPage {
                url: url.to_string(),
                html,
            }),
            Some(Err(status)) => Err(FetchError::new(
                FailureKind::HttpStatus(status),
                format!("scripted status {status}"),
            )),
            None => Err(FetchError::new(FailureKind::HttpStatus(404), "unscripted url")),
        }
    }
}

/// Store whose selected operations fail; the rest go to an in-memory map.
#[derive(Default)]
pub struct BrokenStore {
    inner: MemoryStore,
    fail_get: bool,
    fail_set: bool,
    fail_delete: bool,
}

impl BrokenStore {
    pub fn unavailable() -> Self {
        Self {
            fail_get: true,
            fail_set: true,
            fail_delete: true,
            ..Self::default()
        }
    }

    pub fn undeletable() -> Self {
        Self {
            fail_delete: true,
            ..Self::default()
        }
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.get(key).unwrap()
    }

    fn check(failing: bool, op: &str) -> Result<(), StoreError> {
        if failing {
            return Err(StoreError::Unavailable(format!("{op} refused")));
        }
        Ok(())
    }
}

impl KeyValueStore for BrokenStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Self::check(self.fail_get, "get")?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::check(self.fail_set, "set")?;
        self.inner.set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        Self::check(self.fail_delete, "delete")?;
        self.inner.delete(key)
    }
}

/// Clock that only moves when told to.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap())),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += chrono::Duration::from_std(by).unwrap();
    }

    pub fn clock(&self) -> Clock {
        let now = Arc::clone(&self.now);
        Arc::new(move || *now.lock().unwrap())
    }
}

pub fn test_config(clock: &ManualClock) -> EngineConfig {
    EngineConfig {
        initial_delay: Duration::ZERO,
        load_more_delay: Duration::ZERO,
        now: clock.clock(),
        ..EngineConfig::with_origin(origin())
    }
}

pub fn post_unit(id: &str, title: &str, score: i64) -> String {
    format!(
        r#"<div data-testid="search-sdui-post-unit">
  <search-telemetry-tracker data-faceplate-tracking-context='{{"post":{{"id":"{id}","title":"{title}","nsfw":false}},"subreddit":{{"name":"rust"}}}}'>
    <a href="/r/rust/comments/{id}/">{title}</a>
  </search-telemetry-tracker>
  <div data-testid="search-counter-row"><faceplate-number number="{score}">{score}</faceplate-number> votes</div>
  <faceplate-timeago ts="2025-02-01T10:00:00.000000+0000">1 mo. ago</faceplate-timeago>
</div>"#
    )
}

pub fn comment_unit(id: &str, body: &str, score: i64) -> String {
    format!(
        r#"<div data-testid="search-sdui-comment-unit">
  <search-telemetry-tracker data-faceplate-tracking-context='{{"comment":{{"id":"{id}"}},"post":{{"id":"t3_parent","title":"Parent thread"}},"subreddit":{{"name":"rust"}}}}'></search-telemetry-tracker>
  <faceplate-timeago ts="2025-01-01T00:00:00Z">post time</faceplate-timeago>
  <div id="search-comment-{id}-post-rtjson-content"><p>{body}</p></div>
  <p class="text-neutral-content-weak"><faceplate-number number="{score}">{score}</faceplate-number> votes</p>
  <faceplate-timeago ts="2025-02-15T08:30:00Z">2 wk. ago</faceplate-timeago>
</div>"#
    )
}

/// Search page wrapping `units`, with a continuation partial when `next` is set.
pub fn results_page(units: &[String], next: Option<&str>) -> String {
    let partial = next
        .map(|src| format!(r#"<faceplate-partial loading="lazy" src="{src}"></faceplate-partial>"#))
        .unwrap_or_default();
    format!(
        "<html><body><main>{}</main>{}</body></html>",
        units.join("\n"),
        partial
    )
}
