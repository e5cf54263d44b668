//! Optional RON settings file for the command-line driver.
//!
//! Every field may be omitted; missing fields keep the engine defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use engine_logging::engine_info;
use serde::{Deserialize, Serialize};
use unveiler_engine::EngineConfig;
use url::Url;

const DEFAULT_CACHE_DIR: &str = "./.unveiler_cache";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub origin: Option<String>,
    pub initial_limit: Option<usize>,
    pub initial_delay_ms: Option<u64>,
    pub load_more_delay_ms: Option<u64>,
    pub cache_validity_secs: Option<u64>,
    pub cache_dir: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub user_agent: Option<String>,
}

impl Settings {
    /// Read `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;
        let settings: Settings = ron::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;
        engine_info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = EngineConfig::default();
        if let Some(origin) = &self.origin {
            config.origin =
                Url::parse(origin).with_context(|| format!("Invalid origin: {origin}"))?;
        }
        if let Some(limit) = self.initial_limit {
            config.initial_limit = limit;
        }
        if let Some(ms) = self.initial_delay_ms {
            config.initial_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.load_more_delay_ms {
            config.load_more_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = self.cache_validity_secs {
            config.cache_validity = Duration::from_secs(secs);
        }
        if let Some(agent) = &self.user_agent {
            config.fetch.user_agent = agent.clone();
        }
        Ok(config)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR))
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(engine_logging::DEFAULT_LOG_FILE))
    }
}
