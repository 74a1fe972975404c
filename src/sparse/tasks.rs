//! Kind-specific task descriptors.
//!
//! A [`RefreshTask`] bundles the handful of functions that differ between
//! episodes, seasons and series; the selector and orchestrator are generic
//! over it.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use refreshsparse_common::ItemKind;

use super::classifier::{self, Classification};
use super::policy::{limit, Policy};
use super::predicates;
use crate::catalog::{Item, ItemQuery, RefreshRequest, SortField};

/// Category all tasks are grouped under.
pub const CATEGORY: &str = "Sparse Items";

pub struct RefreshTask {
    pub kind: ItemKind,
    pub name: &'static str,
    pub description: &'static str,
    /// Plural noun used in log lines ("episodes").
    pub label: &'static str,
    query: fn(&Policy, DateTime<Utc>) -> ItemQuery,
    admit: fn(&Item, &Policy, DateTime<Utc>) -> bool,
    block_key: fn(&Item) -> Option<&str>,
    classify: fn(&Item, &Policy, DateTime<Utc>) -> Classification,
    display_name: fn(&Item) -> String,
    refresh_request: fn(&Policy) -> RefreshRequest,
}

impl RefreshTask {
    /// Catalog query listing every potential candidate.
    pub fn query(&self, policy: &Policy, now: DateTime<Utc>) -> ItemQuery {
        (self.query)(policy, now)
    }

    /// Date-window and cooldown checks.
    pub fn admit(&self, item: &Item, policy: &Policy, now: DateTime<Utc>) -> bool {
        (self.admit)(item, policy, now)
    }

    /// Name compared against the series blocklist.
    pub fn block_key<'a>(&self, item: &'a Item) -> Option<&'a str> {
        (self.block_key)(item)
    }

    pub fn classify(&self, item: &Item, policy: &Policy, now: DateTime<Utc>) -> Classification {
        (self.classify)(item, policy, now)
    }

    pub fn display_name(&self, item: &Item) -> String {
        (self.display_name)(item)
    }

    pub fn refresh_request(&self, policy: &Policy) -> RefreshRequest {
        (self.refresh_request)(policy)
    }

    /// Task descriptor for `kind`.
    pub fn for_kind(kind: ItemKind) -> &'static RefreshTask {
        match kind {
            ItemKind::Episode => &EPISODES,
            ItemKind::Season => &SEASONS,
            ItemKind::Series => &SERIES,
        }
    }
}

impl std::fmt::Debug for RefreshTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshTask")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Start of the episode window: midnight UTC `max_days` days ago.
pub fn episode_min_date(policy: &Policy, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let max_days = limit(policy.episode.max_days)?;
    let midnight = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    // Windows reaching past the representable range cover everything.
    midnight.checked_sub_signed(Duration::try_days(i64::try_from(max_days).ok()?)?)
}

fn optional_number(value: Option<i32>, width: usize) -> String {
    value
        .map(|n| format!("{:0width$}", n, width = width))
        .unwrap_or_default()
}

fn series_name(item: &Item) -> &str {
    item.series_name.as_deref().unwrap_or_default()
}

pub static EPISODES: RefreshTask = RefreshTask {
    kind: ItemKind::Episode,
    name: "Refresh sparse episodes",
    description: "Refresh episodes with missing metadata based on requirements configured.",
    label: "episodes",
    query: |policy, now| {
        let query = ItemQuery::new(ItemKind::Episode)
            .sort_by(&[SortField::SeriesSortName, SortField::SortName]);
        match episode_min_date(policy, now) {
            Some(min) => query.min_date_created(min),
            None => query,
        }
    },
    admit: |item, policy, now| {
        let in_window = match episode_min_date(policy, now) {
            Some(min) => item.premiere_date.map_or(true, |aired| aired >= min),
            None => true,
        };
        in_window
            && predicates::cooled_down_minutes(item, policy.episode.refresh_cooldown_minutes, now)
    },
    block_key: |item| item.series_name.as_deref(),
    classify: classifier::classify_episode,
    display_name: |item| {
        format!(
            "{} {}x{}",
            series_name(item),
            optional_number(item.parent_index_number, 0),
            optional_number(item.index_number, 2)
        )
    },
    refresh_request: |policy| {
        RefreshRequest::full(
            policy.episode.replace_all_metadata,
            policy.episode.replace_all_images,
        )
    },
};

pub static SEASONS: RefreshTask = RefreshTask {
    kind: ItemKind::Season,
    name: "Refresh sparse seasons",
    description: "Refresh seasons with missing metadata based on requirements configured.",
    label: "season",
    query: |_, _| {
        ItemQuery::new(ItemKind::Season).sort_by(&[SortField::SeriesSortName, SortField::SortName])
    },
    admit: |item, policy, now| {
        predicates::cooled_down_days(item, policy.season.cooldown_days, now)
    },
    block_key: |item| item.series_name.as_deref(),
    classify: classifier::classify_season,
    display_name: |item| {
        format!(
            "{} - S{}. {}",
            series_name(item),
            optional_number(item.index_number, 2),
            item.name
        )
    },
    refresh_request: |policy| {
        RefreshRequest::full(
            policy.season.replace_all_metadata,
            policy.season.replace_all_images,
        )
    },
};

pub static SERIES: RefreshTask = RefreshTask {
    kind: ItemKind::Series,
    name: "Refresh sparse series",
    description: "Refresh series with missing metadata based on requirements configured.",
    label: "series",
    query: |_, _| ItemQuery::new(ItemKind::Series).sort_by(&[SortField::SortName]),
    admit: |item, policy, now| {
        predicates::cooled_down_days(item, policy.series.cooldown_days, now)
    },
    block_key: |item| Some(item.name.as_str()),
    classify: classifier::classify_series,
    display_name: |item| item.name.clone(),
    refresh_request: |policy| {
        RefreshRequest::full(
            policy.series.replace_all_metadata,
            policy.series.replace_all_images,
        )
    },
};
