//! Refresh policy: per-kind thresholds and toggles.
//!
//! The `*Policy` structs are deserialized straight from the `[policy.*]`
//! sections of the config file. [`Policy::prepare`] turns a
//! [`PolicyConfig`](crate::config::PolicyConfig) into the immutable value a
//! single run works with, splitting the pipe-delimited lists once.

use serde::{Deserialize, Serialize};

use crate::config::PolicyConfig;

/// Thresholds that use `-1` for "no limit" map to `None`.
///
/// Anything below `-1` is treated the same way.
pub fn limit(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

/// Split a pipe-delimited list into trimmed, non-empty tokens.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split('|')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EpisodePolicy {
    /// Only consider episodes added or aired within this many days (`-1`: all).
    pub max_days: i64,
    /// Minutes that must pass after a refresh before the next one.
    pub refresh_cooldown_minutes: i64,
    pub minimum_provider_ids: usize,
    pub missing_image: bool,
    pub missing_name: bool,
    pub missing_overview: bool,
    pub name_is_date: bool,
    /// Flag episodes whose overview mentions a bad-name token.
    pub overview_bad_name: bool,
    pub replace_all_images: bool,
    pub replace_all_metadata: bool,
}

impl Default for EpisodePolicy {
    fn default() -> Self {
        Self {
            max_days: 14,
            refresh_cooldown_minutes: 60,
            minimum_provider_ids: 0,
            missing_image: true,
            missing_name: true,
            missing_overview: true,
            name_is_date: false,
            overview_bad_name: false,
            replace_all_images: false,
            replace_all_metadata: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SeasonPolicy {
    pub cooldown_days: i64,
    pub minimum_provider_ids: usize,
    pub overview: bool,
    /// Missing or placeholder ("Season 1", "Specials") names.
    pub name: bool,
    pub primary: bool,
    pub banner: bool,
    pub thumb: bool,
    pub backdrop: bool,
    pub replace_all_images: bool,
    pub replace_all_metadata: bool,
}

impl Default for SeasonPolicy {
    fn default() -> Self {
        Self {
            cooldown_days: 30,
            minimum_provider_ids: 0,
            overview: true,
            name: false,
            primary: true,
            banner: false,
            thumb: false,
            backdrop: false,
            replace_all_images: false,
            replace_all_metadata: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SeriesPolicy {
    pub cooldown_days: i64,
    /// Days after which a series that is not marked ended is refreshed to
    /// pick up status changes (`-1`: never).
    pub status_days: i64,
    pub minimum_provider_ids: usize,
    pub overview: bool,
    pub primary: bool,
    pub art: bool,
    pub banner: bool,
    pub logo: bool,
    pub thumb: bool,
    pub backdrop: bool,
    pub replace_all_images: bool,
    pub replace_all_metadata: bool,
}

impl Default for SeriesPolicy {
    fn default() -> Self {
        Self {
            cooldown_days: 30,
            status_days: 180,
            minimum_provider_ids: 0,
            overview: true,
            primary: true,
            art: false,
            banner: false,
            logo: false,
            thumb: false,
            backdrop: true,
            replace_all_images: false,
            replace_all_metadata: false,
        }
    }
}

/// Policy prepared for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    /// Log what would be refreshed without refreshing anything.
    pub pretend: bool,
    /// Name prefixes that mark a placeholder name.
    pub bad_names: Vec<String>,
    /// Series exempt from refreshing, matched case-insensitively.
    pub series_block_list: Vec<String>,
    pub episode: EpisodePolicy,
    pub season: SeasonPolicy,
    pub series: SeriesPolicy,
}

impl Policy {
    pub fn prepare(config: &PolicyConfig) -> Self {
        Self {
            pretend: config.pretend,
            bad_names: split_list(&config.bad_names),
            series_block_list: split_list(&config.series_block_list),
            episode: config.episode.clone(),
            season: config.season.clone(),
            series: config.series.clone(),
        }
    }

    /// Same policy with dry-run forced on.
    pub fn pretending(mut self) -> Self {
        self.pretend = true;
        self
    }

    /// A policy with every check switched off and no limits.
    ///
    /// Handy as a starting point when only a single check matters.
    pub fn all_off() -> Self {
        Self {
            pretend: false,
            bad_names: Vec::new(),
            series_block_list: Vec::new(),
            episode: EpisodePolicy {
                max_days: -1,
                refresh_cooldown_minutes: -1,
                minimum_provider_ids: 0,
                missing_image: false,
                missing_name: false,
                missing_overview: false,
                name_is_date: false,
                overview_bad_name: false,
                replace_all_images: false,
                replace_all_metadata: false,
            },
            season: SeasonPolicy {
                cooldown_days: -1,
                minimum_provider_ids: 0,
                overview: false,
                name: false,
                primary: false,
                banner: false,
                thumb: false,
                backdrop: false,
                replace_all_images: false,
                replace_all_metadata: false,
            },
            series: SeriesPolicy {
                cooldown_days: -1,
                status_days: -1,
                minimum_provider_ids: 0,
                overview: false,
                primary: false,
                art: false,
                banner: false,
                logo: false,
                thumb: false,
                backdrop: false,
                replace_all_images: false,
                replace_all_metadata: false,
            },
        }
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::prepare(&PolicyConfig::default())
    }
}
