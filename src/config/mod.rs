mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

const DEFAULT_PATHS: [&str; 3] = [
    "./refreshsparse.toml",
    "~/.config/refreshsparse/config.toml",
    "/etc/refreshsparse/config.toml",
];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// First existing file among the default locations
pub fn find_default_config() -> Option<PathBuf> {
    DEFAULT_PATHS
        .iter()
        .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
        .find(|path| path.exists())
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    match find_default_config() {
        Some(path) => load_config(&path),
        None => Ok(Config::default()),
    }
}

fn warn_below_no_limit(section: &str, key: &str, value: i64) {
    if value < -1 {
        tracing::warn!(
            "policy.{}.{} is {}; values below -1 mean no limit",
            section,
            key,
            value
        );
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let url = &config.jellyfin.url;
    if url.trim().is_empty() {
        tracing::warn!("jellyfin.url is not configured; only `list --snapshot` will work");
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!("Jellyfin url must start with http:// or https://: {}", url);
    }

    if config.jellyfin.requests_per_second == 0 {
        anyhow::bail!("jellyfin.requests_per_second cannot be 0");
    }

    if config.jellyfin.refresh_poll_interval_secs == 0 {
        anyhow::bail!("jellyfin.refresh_poll_interval_secs cannot be 0");
    }

    if config.schedule.interval_minutes == 0 {
        anyhow::bail!("schedule.interval_minutes cannot be 0");
    }

    if config.schedule.kinds.is_empty() {
        tracing::warn!("schedule.kinds is empty; the daemon will not refresh anything");
    }

    let policy = &config.policy;
    warn_below_no_limit("episode", "max_days", policy.episode.max_days);
    warn_below_no_limit(
        "episode",
        "refresh_cooldown_minutes",
        policy.episode.refresh_cooldown_minutes,
    );
    warn_below_no_limit("season", "cooldown_days", policy.season.cooldown_days);
    warn_below_no_limit("series", "cooldown_days", policy.series.cooldown_days);
    warn_below_no_limit("series", "status_days", policy.series.status_days);

    Ok(())
}
