use crate::domain::topic::Topic;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub source: SourceSettings,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub server: ServerSettings,
    /// Extra entries appended to the built-in topic catalog
    #[serde(default)]
    pub topics: Vec<Topic>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub base_url: String,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_limit")]
    pub default_limit: NonZeroUsize,
    #[serde(default)]
    pub align_axes: bool,
    #[serde(default)]
    pub start_stopped: bool,
    #[serde(default)]
    pub initial_topics: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_fetch_timeout_ms() -> u64 {
    900
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_limit() -> NonZeroUsize {
    NonZeroUsize::MIN.saturating_add(99)
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            default_limit: default_limit(),
            align_axes: false,
            start_stopped: false,
            initial_topics: Vec::new(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("poll.interval_ms must be greater than zero")]
    ZeroInterval,

    #[error("source.fetch_timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("source.fetch_timeout_ms ({timeout_ms}) must be shorter than poll.interval_ms ({interval_ms})")]
    TimeoutNotBelowInterval { timeout_ms: u64, interval_ms: u64 },

    #[error("poll.initial_topics holds {0} entries, at most 3 are allowed")]
    TooManyTopics(usize),
}

impl DashboardConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.source.fetch_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.source.fetch_timeout_ms >= self.poll.interval_ms {
            return Err(ConfigError::TimeoutNotBelowInterval {
                timeout_ms: self.source.fetch_timeout_ms,
                interval_ms: self.poll.interval_ms,
            });
        }
        if self.poll.initial_topics.len() > 3 {
            return Err(ConfigError::TooManyTopics(self.poll.initial_topics.len()));
        }
        Ok(())
    }

    pub fn base_url(&self) -> String {
        self.source.base_url.trim_end_matches('/').to_string()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.source.fetch_timeout_ms)
    }
}

/// Load `config/dashboard.toml`, then apply `DASHBOARD__SECTION__KEY` overrides.
pub fn load_dashboard_config() -> anyhow::Result<DashboardConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("poll.initial_topics")
                .try_parsing(true),
        )
        .build()?;

    let dashboard: DashboardConfig = settings.try_deserialize()?;
    dashboard.validate()?;
    Ok(dashboard)
}
