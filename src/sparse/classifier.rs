//! Staleness classifier.
//!
//! Combines the predicates for one item kind into an ordered list of
//! [`Reason`]s. An empty list means the item is complete.

use std::fmt;

use chrono::{DateTime, Utc};
use refreshsparse_common::{ImageType, ItemKind};
use refreshsparse_db::models::Item;

use super::policy::{limit, Policy};
use super::predicates;

/// Why an item needs a refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    TooFewProviderIds {
        count: usize,
        /// Names of the providers the item does have.
        providers: Vec<String>,
    },
    MissingOverview,
    MissingName,
    NameIsDate,
    BadName,
    OverviewBadName,
    MissingImage(ImageType),
    SeriesMayHaveEnded {
        status_days: u64,
    },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewProviderIds { count, providers } => {
                write!(f, "only has {} provider IDs. {}", count, providers.join(","))
            }
            Self::MissingOverview => write!(f, "missing overview"),
            Self::MissingName => write!(f, "missing name"),
            Self::NameIsDate => write!(f, "name is a date"),
            Self::BadName => write!(f, "name starts with a bad name"),
            Self::OverviewBadName => write!(f, "overview contains a bad name"),
            Self::MissingImage(ImageType::Art) => write!(f, "missing clearart image"),
            Self::MissingImage(image_type) => write!(f, "missing {} image", image_type),
            Self::SeriesMayHaveEnded { status_days } => write!(
                f,
                "Continuing Series hasn't been refreshed in at least {} days",
                status_days
            ),
        }
    }
}

/// Result of classifying one item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub reasons: Vec<Reason>,
}

impl Classification {
    pub fn needs_refresh(&self) -> bool {
        !self.reasons.is_empty()
    }

    fn check(&mut self, triggered: bool, reason: impl FnOnce() -> Reason) {
        if triggered {
            self.reasons.push(reason());
        }
    }
}

fn provider_reason(item: &Item) -> Reason {
    Reason::TooFewProviderIds {
        count: item.provider_ids.len(),
        providers: item.provider_ids.keys().cloned().collect(),
    }
}

pub fn classify_episode(item: &Item, policy: &Policy, _now: DateTime<Utc>) -> Classification {
    let p = &policy.episode;
    let mut c = Classification::default();

    c.check(
        predicates::too_few_provider_ids(item, p.minimum_provider_ids),
        || provider_reason(item),
    );
    c.check(predicates::missing_overview(item, p.missing_overview), || {
        Reason::MissingOverview
    });
    c.check(predicates::missing_name(item, p.missing_name), || {
        Reason::MissingName
    });
    c.check(predicates::name_is_date(item, p.name_is_date), || {
        Reason::NameIsDate
    });
    c.check(predicates::bad_name(item, &policy.bad_names), || {
        Reason::BadName
    });
    c.check(
        predicates::overview_bad_name(item, &policy.bad_names, p.overview_bad_name),
        || Reason::OverviewBadName,
    );
    c.check(
        predicates::missing_image(item, ImageType::Primary, p.missing_image),
        || Reason::MissingImage(ImageType::Primary),
    );

    c
}

pub fn classify_season(item: &Item, policy: &Policy, _now: DateTime<Utc>) -> Classification {
    let p = &policy.season;
    let mut c = Classification::default();

    c.check(
        predicates::too_few_provider_ids(item, p.minimum_provider_ids),
        || provider_reason(item),
    );
    c.check(predicates::missing_overview(item, p.overview), || {
        Reason::MissingOverview
    });
    c.check(
        predicates::missing_name(item, p.name)
            || (p.name && predicates::is_placeholder_season_name(&item.name)),
        || Reason::MissingName,
    );
    for (image_type, enabled) in [
        (ImageType::Primary, p.primary),
        (ImageType::Banner, p.banner),
        (ImageType::Thumb, p.thumb),
        (ImageType::Backdrop, p.backdrop),
    ] {
        c.check(predicates::missing_image(item, image_type, enabled), || {
            Reason::MissingImage(image_type)
        });
    }

    c
}

pub fn classify_series(item: &Item, policy: &Policy, now: DateTime<Utc>) -> Classification {
    let p = &policy.series;
    let status_days = limit(p.status_days);
    let mut c = Classification::default();

    c.check(
        predicates::too_few_provider_ids(item, p.minimum_provider_ids),
        || provider_reason(item),
    );
    c.check(predicates::missing_overview(item, p.overview), || {
        Reason::MissingOverview
    });
    if let Some(days) = status_days {
        c.check(
            predicates::series_may_have_ended(item, status_days, now),
            || Reason::SeriesMayHaveEnded { status_days: days },
        );
    }
    for (image_type, enabled) in [
        (ImageType::Primary, p.primary),
        (ImageType::Art, p.art),
        (ImageType::Banner, p.banner),
        (ImageType::Logo, p.logo),
        (ImageType::Thumb, p.thumb),
        (ImageType::Backdrop, p.backdrop),
    ] {
        c.check(predicates::missing_image(item, image_type, enabled), || {
            Reason::MissingImage(image_type)
        });
    }

    c
}

/// Classify `item` with the rules for its own kind.
pub fn classify(item: &Item, policy: &Policy, now: DateTime<Utc>) -> Classification {
    match item.item_kind {
        ItemKind::Episode => classify_episode(item, policy, now),
        ItemKind::Season => classify_season(item, policy, now),
        ItemKind::Series => classify_series(item, policy, now),
    }
}
