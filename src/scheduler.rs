//! Run hosting: one-shot runs and the daemon loop.
//!
//! Every run loads its policy fresh from the config it is handed; the
//! daemon re-reads the config file before each tick so edits apply to the
//! next run.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use refreshsparse_common::ItemKind;
use tokio_util::sync::CancellationToken;

use crate::catalog::{Catalog, Refresher};
use crate::config::{self, Config};
use crate::jellyfin::JellyfinClient;
use crate::sparse::{self, Policy, ProgressSender, RefreshTask, RunSummary};

/// Progress sink that logs each step at debug level.
pub fn logging_progress(kind: ItemKind) -> ProgressSender {
    ProgressSender::new(move |percent| {
        tracing::debug!(kind = %kind, percent, "Refresh progress");
    })
}

/// Run a single kind against the given backends.
pub async fn run_kind(
    kind: ItemKind,
    catalog: &dyn Catalog,
    refresher: &dyn Refresher,
    policy: &Policy,
    cancel: &CancellationToken,
) -> refreshsparse_common::Result<RunSummary> {
    let task = RefreshTask::for_kind(kind);
    tracing::info!(task = task.name, category = sparse::tasks::CATEGORY, "Starting task");
    sparse::run(
        task,
        catalog,
        refresher,
        policy,
        &logging_progress(kind),
        cancel,
    )
    .await
}

/// Run `kinds` one after another against Jellyfin.
pub async fn run_once(
    config: &Config,
    kinds: &[ItemKind],
    dry_run: bool,
    cancel: &CancellationToken,
) -> Result<Vec<RunSummary>> {
    let client = JellyfinClient::new(&config.jellyfin)?;
    let mut policy = Policy::prepare(&config.policy);
    if dry_run {
        policy = policy.pretending();
    }

    let mut summaries = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        summaries.push(run_kind(kind, &client, &client, &policy, cancel).await?);
    }
    Ok(summaries)
}

async fn run_if_scheduled(
    kind: ItemKind,
    config: &Config,
    client: &JellyfinClient,
    policy: &Policy,
    cancel: &CancellationToken,
) -> Option<refreshsparse_common::Result<RunSummary>> {
    if !config.schedule.kinds.contains(&kind) {
        return None;
    }
    Some(run_kind(kind, client, client, policy, cancel).await)
}

fn report(kind: ItemKind, result: Option<refreshsparse_common::Result<RunSummary>>) {
    match result {
        None => {}
        Some(Ok(summary)) => tracing::info!(
            kind = %kind,
            candidates = summary.candidates,
            refreshed = summary.refreshed,
            still_sparse = summary.still_sparse,
            pretend = summary.pretend,
            "Run finished"
        ),
        Some(Err(e)) if e.is_cancelled() => tracing::info!(kind = %kind, "Run cancelled"),
        Some(Err(e)) => tracing::error!(kind = %kind, "Run failed: {}", e),
    }
}

/// One daemon tick: all scheduled kinds, concurrently.
async fn tick(config: &Config, cancel: &CancellationToken) -> Result<()> {
    let client = JellyfinClient::new(&config.jellyfin)?;
    let policy = Policy::prepare(&config.policy);

    let (episodes, seasons, series) = tokio::join!(
        run_if_scheduled(ItemKind::Episode, config, &client, &policy, cancel),
        run_if_scheduled(ItemKind::Season, config, &client, &policy, cancel),
        run_if_scheduled(ItemKind::Series, config, &client, &policy, cancel),
    );

    report(ItemKind::Episode, episodes);
    report(ItemKind::Season, seasons);
    report(ItemKind::Series, series);
    Ok(())
}

/// Run scheduled refreshes until `cancel` fires.
pub async fn run_daemon(config_path: Option<PathBuf>, cancel: CancellationToken) -> Result<()> {
    tracing::info!("Starting refresh daemon");

    loop {
        let interval = match config::load_config_or_default(config_path.as_deref()) {
            Ok(config) => {
                if let Err(e) = tick(&config, &cancel).await {
                    tracing::error!("Scheduled run failed: {:#}", e);
                }
                Duration::from_secs(config.schedule.interval_minutes * 60)
            }
            Err(e) => {
                tracing::error!("Failed to load config, skipping run: {:#}", e);
                Duration::from_secs(config::ScheduleConfig::default().interval_minutes * 60)
            }
        };

        tracing::debug!(next_run_in_secs = interval.as_secs(), "Waiting for next run");
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => break,
        }
    }

    tracing::info!("Refresh daemon stopped");
    Ok(())
}

/// Resolve when SIGINT/SIGTERM arrives or `cancel` fires, then cancel.
pub async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
    cancel.cancel();
}

/// Path the daemon reloads from: the explicit one, else the first default
/// location that exists when the daemon starts.
pub fn daemon_config_path(custom: Option<&Path>) -> Option<PathBuf> {
    custom
        .map(Path::to_path_buf)
        .or_else(config::find_default_config)
}
