use refreshsparse_common::ItemKind;
use serde::{Deserialize, Serialize};

use crate::sparse::policy::{EpisodePolicy, SeasonPolicy, SeriesPolicy};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub jellyfin: JellyfinConfig,

    #[serde(default)]
    pub schedule: ScheduleConfig,

    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JellyfinConfig {
    /// Server base URL, e.g. `http://localhost:8096`
    #[serde(default)]
    pub url: String,

    /// API key sent as `X-Emby-Token`
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How often to check whether a triggered refresh has finished
    #[serde(default = "default_poll_interval_secs")]
    pub refresh_poll_interval_secs: u64,

    /// Give up waiting for a refresh to finish after this many seconds
    #[serde(default = "default_refresh_timeout_secs")]
    pub refresh_timeout_secs: u64,

    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_refresh_timeout_secs() -> u64 {
    300
}

fn default_requests_per_second() -> u32 {
    4
}

impl Default for JellyfinConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            refresh_poll_interval_secs: default_poll_interval_secs(),
            refresh_timeout_secs: default_refresh_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    /// Minutes between daemon runs
    #[serde(default = "default_interval_minutes")]
    pub interval_minutes: u64,

    /// Item kinds the daemon refreshes
    #[serde(default = "default_kinds")]
    pub kinds: Vec<ItemKind>,
}

fn default_interval_minutes() -> u64 {
    24 * 60
}

fn default_kinds() -> Vec<ItemKind> {
    ItemKind::ALL.to_vec()
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_minutes: default_interval_minutes(),
            kinds: default_kinds(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// Only log what would be refreshed
    #[serde(default = "default_pretend")]
    pub pretend: bool,

    /// Pipe-delimited name prefixes that mark a placeholder name
    #[serde(default)]
    pub bad_names: String,

    /// Pipe-delimited series names that are never refreshed
    #[serde(default)]
    pub series_block_list: String,

    #[serde(default)]
    pub episode: EpisodePolicy,

    #[serde(default)]
    pub season: SeasonPolicy,

    #[serde(default)]
    pub series: SeriesPolicy,
}

fn default_pretend() -> bool {
    true
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            pretend: default_pretend(),
            bad_names: String::new(),
            series_block_list: String::new(),
            episode: EpisodePolicy::default(),
            season: SeasonPolicy::default(),
            series: SeriesPolicy::default(),
        }
    }
}
