//! Candidate selection.
//!
//! Lists the items of one kind from the catalog and narrows them down to
//! the ones that are due for a refresh: inside the date window, past the
//! cooldown, not blocklisted, and flagged by the classifier. Catalog order
//! is kept throughout.

use chrono::{DateTime, Utc};
use refreshsparse_common::Result;
use tracing::debug;

use super::classifier::Classification;
use super::policy::Policy;
use super::predicates::eq_ignore_case;
use super::tasks::RefreshTask;
use crate::catalog::{Catalog, Item};

/// An item selected for refresh, with the reasons it was picked.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub item: Item,
    pub classification: Classification,
}

fn is_blocked(task: &RefreshTask, item: &Item, policy: &Policy) -> bool {
    task.block_key(item).is_some_and(|key| {
        policy
            .series_block_list
            .iter()
            .any(|blocked| eq_ignore_case(key, blocked))
    })
}

/// Items of `task.kind` that need a refresh, in catalog order.
pub async fn select_candidates(
    task: &RefreshTask,
    catalog: &dyn Catalog,
    policy: &Policy,
    now: DateTime<Utc>,
) -> Result<Vec<Candidate>> {
    let query = task.query(policy, now);
    let items = catalog.query_items(&query).await?;
    let listed = items.len();

    let candidates: Vec<Candidate> = items
        .into_iter()
        .filter(|item| task.admit(item, policy, now))
        .filter(|item| !is_blocked(task, item, policy))
        .filter_map(|item| {
            let classification = task.classify(&item, policy, now);
            classification.needs_refresh().then_some(Candidate {
                item,
                classification,
            })
        })
        .collect();

    debug!(
        kind = %task.kind,
        listed,
        selected = candidates.len(),
        "Selected refresh candidates"
    );

    Ok(candidates)
}
