//! Refresh orchestrator.
//!
//! Drives one run of a [`RefreshTask`]: select candidates, then for each one
//! log why it is sparse, refresh it (unless pretending), re-check it once
//! and report progress. Cancellation is checked before every item.

use chrono::Utc;
use refreshsparse_common::{Error, ItemKind, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::classifier::Classification;
use super::policy::Policy;
use super::progress::ProgressSender;
use super::selector::select_candidates;
use super::tasks::RefreshTask;
use crate::catalog::{Catalog, Item, Refresher};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub kind: ItemKind,
    pub pretend: bool,
    /// Items selected for refresh.
    pub candidates: usize,
    /// Items actually refreshed.
    pub refreshed: usize,
    /// Refreshed items that are still sparse afterwards.
    pub still_sparse: usize,
}

fn log_reasons(classification: &Classification) {
    for reason in &classification.reasons {
        info!("    {}", reason);
    }
}

fn log_age(task: &RefreshTask, item: &Item) {
    let now = Utc::now();
    info!(
        "    hasn't been refreshed in {:.0} days",
        item.days_since_refresh(now)
    );
    if task.kind == ItemKind::Episode {
        debug!(
            minutes = item.minutes_since_refresh(now),
            "Minutes since last refresh"
        );
    }
}

/// Run `task` once against `catalog`, refreshing through `refresher`.
///
/// A refresh failure aborts the run; refreshes already done stay done.
pub async fn run(
    task: &RefreshTask,
    catalog: &dyn Catalog,
    refresher: &dyn Refresher,
    policy: &Policy,
    progress: &ProgressSender,
    cancel: &CancellationToken,
) -> Result<RunSummary> {
    let candidates = select_candidates(task, catalog, policy, Utc::now()).await?;
    let total = candidates.len();

    let mut summary = RunSummary {
        kind: task.kind,
        pretend: policy.pretend,
        candidates: total,
        refreshed: 0,
        still_sparse: 0,
    };

    if total == 0 {
        debug!(kind = %task.kind, "Nothing to refresh");
        progress.send(100.0);
        return Ok(summary);
    }

    info!(
        "{} refresh {} {}",
        if policy.pretend { "Pretending to" } else { "Will" },
        total,
        task.label
    );

    let request = task.refresh_request(policy);

    for (done, candidate) in candidates.into_iter().enumerate() {
        if cancel.is_cancelled() {
            info!(kind = %task.kind, done, total, "Refresh run cancelled");
            return Err(Error::Cancelled);
        }

        let mut item = candidate.item;
        let name = task.display_name(&item);

        info!(item_id = %item.id, "Refreshing {}", name);
        log_age(task, &item);
        log_reasons(&candidate.classification);

        if !policy.pretend {
            refresher.refresh_item(&mut item, &request, cancel).await?;
            summary.refreshed += 1;

            let after = task.classify(&item, policy, Utc::now());
            if after.needs_refresh() {
                summary.still_sparse += 1;
                info!("{} will need another refresh", name);
                log_reasons(&after);
            }
        }

        progress.send(100.0 * (done + 1) as f64 / total as f64);
    }

    progress.send(100.0);
    info!("Sparse {} refresh completed", task.label);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ItemQuery, RefreshRequest};
    use crate::sparse::tasks::{EPISODES, SERIES};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use chrono::Duration;
    use refreshsparse_common::ItemId;
    use std::sync::{Arc, Mutex};

    struct MemoryCatalog {
        items: Vec<Item>,
    }

    #[async_trait]
    impl Catalog for MemoryCatalog {
        async fn query_items(&self, query: &ItemQuery) -> Result<Vec<Item>> {
            Ok(self
                .items
                .iter()
                .filter(|item| item.item_kind == query.kind)
                .cloned()
                .collect())
        }

        async fn get_item(&self, id: ItemId) -> Result<Option<Item>> {
            Ok(self.items.iter().find(|item| item.id == id).cloned())
        }
    }

    /// Records refreshed ids; optionally fills in the overview or fails.
    #[derive(Default)]
    struct FakeRefresher {
        calls: Mutex<Vec<(ItemId, RefreshRequest)>>,
        fixes_overview: bool,
        fail_on_call: Option<usize>,
        cancel_after_first: Option<CancellationToken>,
    }

    #[async_trait]
    impl Refresher for FakeRefresher {
        async fn refresh_item(
            &self,
            item: &mut Item,
            request: &RefreshRequest,
            _cancel: &CancellationToken,
        ) -> Result<()> {
            let mut calls = self.calls.lock().unwrap();
            calls.push((item.id, *request));
            if self.fail_on_call == Some(calls.len()) {
                return Err(Error::refresh(item.name.clone(), "provider unavailable"));
            }
            if let Some(token) = &self.cancel_after_first {
                token.cancel();
            }
            item.date_last_refreshed = Utc::now();
            if self.fixes_overview {
                item.overview = Some("Now described.".to_string());
            }
            Ok(())
        }
    }

    fn sparse_series(names: &[&str]) -> MemoryCatalog {
        let now = Utc::now();
        let items = names
            .iter()
            .map(|name| {
                let mut item = Item::new(ItemKind::Series, *name, now);
                item.date_last_refreshed = now - Duration::days(90);
                item
            })
            .collect();
        MemoryCatalog { items }
    }

    fn overview_policy(pretend: bool) -> Policy {
        let mut policy = Policy::all_off();
        policy.pretend = pretend;
        policy.series.overview = true;
        policy
    }

    fn recording_progress() -> (ProgressSender, Arc<Mutex<Vec<f64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sender = ProgressSender::new(move |pct| sink.lock().unwrap().push(pct));
        (sender, seen)
    }

    #[tokio::test]
    async fn test_empty_run_reports_complete() {
        let catalog = MemoryCatalog { items: Vec::new() };
        let refresher = FakeRefresher::default();
        let (progress, seen) = recording_progress();

        let summary = run(
            &EPISODES,
            &catalog,
            &refresher,
            &overview_policy(false),
            &progress,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.candidates, 0);
        assert_eq!(*seen.lock().unwrap(), vec![100.0]);
    }

    #[tokio::test]
    async fn test_dry_run_never_refreshes() {
        let catalog = sparse_series(&["A", "B"]);
        let refresher = FakeRefresher::default();
        let (progress, seen) = recording_progress();

        let summary = run(
            &SERIES,
            &catalog,
            &refresher,
            &overview_policy(true),
            &progress,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert!(refresher.calls.lock().unwrap().is_empty());
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.refreshed, 0);
        assert_eq!(seen.lock().unwrap().last().copied(), Some(100.0));
    }

    #[tokio::test]
    async fn test_refreshes_and_rechecks() {
        let catalog = sparse_series(&["A", "B", "C", "D"]);
        let refresher = FakeRefresher {
            fixes_overview: true,
            ..Default::default()
        };
        let (progress, seen) = recording_progress();

        let summary = run(
            &SERIES,
            &catalog,
            &refresher,
            &overview_policy(false),
            &progress,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.refreshed, 4);
        assert_eq!(summary.still_sparse, 0);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![25.0, 50.0, 75.0, 100.0, 100.0]
        );

        let calls = refresher.calls.lock().unwrap();
        assert_eq!(calls.len(), 4);
        assert!(calls.iter().all(|(_, request)| request.force_save));
    }

    #[tokio::test]
    async fn test_counts_items_still_sparse() {
        let catalog = sparse_series(&["A"]);
        let refresher = FakeRefresher::default();

        let summary = run(
            &SERIES,
            &catalog,
            &refresher,
            &overview_policy(false),
            &ProgressSender::noop(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.refreshed, 1);
        assert_eq!(summary.still_sparse, 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_aborts_run() {
        let catalog = sparse_series(&["A", "B", "C"]);
        let refresher = FakeRefresher {
            fail_on_call: Some(2),
            ..Default::default()
        };

        let result = run(
            &SERIES,
            &catalog,
            &refresher,
            &overview_policy(false),
            &ProgressSender::noop(),
            &CancellationToken::new(),
        )
        .await;

        assert_matches!(result, Err(Error::Refresh { .. }));
        assert_eq!(refresher.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_between_items() {
        let catalog = sparse_series(&["A", "B", "C"]);
        let cancel = CancellationToken::new();
        let refresher = FakeRefresher {
            cancel_after_first: Some(cancel.clone()),
            ..Default::default()
        };

        let result = run(
            &SERIES,
            &catalog,
            &refresher,
            &overview_policy(false),
            &ProgressSender::noop(),
            &cancel,
        )
        .await;

        assert_matches!(result, Err(Error::Cancelled));
        assert_eq!(refresher.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_already_cancelled_refreshes_nothing() {
        let catalog = sparse_series(&["A"]);
        let refresher = FakeRefresher::default();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = run(
            &SERIES,
            &catalog,
            &refresher,
            &overview_policy(false),
            &ProgressSender::noop(),
            &cancel,
        )
        .await;

        assert_matches!(result, Err(Error::Cancelled));
        assert!(refresher.calls.lock().unwrap().is_empty());
    }
}
