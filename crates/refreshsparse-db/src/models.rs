//! Catalog item model.
//!
//! [`Item`] is the snapshot the refresh engine reads. Both the SQLite snapshot
//! store and the Jellyfin backend produce it; nothing in refreshsparse creates
//! items on its own.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use refreshsparse_common::{ImageType, ItemId, ItemKind, SeriesStatus};
use serde::{Deserialize, Serialize};

/// Catalog item model (series, season or episode).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub item_kind: ItemKind,
    /// Display name; empty when the catalog has none.
    pub name: String,
    pub sort_name: Option<String>,
    pub overview: Option<String>,
    /// External provider IDs keyed by provider name (e.g. `"Tvdb"`).
    pub provider_ids: BTreeMap<String, String>,
    /// Image types the item currently has.
    pub images: BTreeSet<ImageType>,
    /// Owning series for seasons and episodes.
    pub series_name: Option<String>,
    pub series_sort_name: Option<String>,
    /// Season number for seasons, episode number for episodes.
    pub index_number: Option<i32>,
    /// Season number for episodes.
    pub parent_index_number: Option<i32>,
    /// Air date (episodes) or first air date (series).
    pub premiere_date: Option<DateTime<Utc>>,
    /// Airing status, series only.
    pub status: Option<SeriesStatus>,
    pub is_virtual: bool,
    pub date_created: DateTime<Utc>,
    pub date_last_refreshed: DateTime<Utc>,
}

impl Item {
    /// Create a minimal, non-virtual item of the given kind.
    ///
    /// All optional metadata starts out empty; creation and last-refresh
    /// timestamps are set to `now`.
    pub fn new(item_kind: ItemKind, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: ItemId::new(),
            item_kind,
            name: name.into(),
            sort_name: None,
            overview: None,
            provider_ids: BTreeMap::new(),
            images: BTreeSet::new(),
            series_name: None,
            series_sort_name: None,
            index_number: None,
            parent_index_number: None,
            premiere_date: None,
            status: None,
            is_virtual: false,
            date_created: now,
            date_last_refreshed: now,
        }
    }

    /// Whether the item has an image of the given type.
    pub fn has_image(&self, image_type: ImageType) -> bool {
        self.images.contains(&image_type)
    }

    /// Fractional minutes elapsed between the last refresh and `now`.
    pub fn minutes_since_refresh(&self, now: DateTime<Utc>) -> f64 {
        (now - self.date_last_refreshed).num_milliseconds() as f64 / 60_000.0
    }

    /// Fractional days elapsed between the last refresh and `now`.
    pub fn days_since_refresh(&self, now: DateTime<Utc>) -> f64 {
        self.minutes_since_refresh(now) / (24.0 * 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_item_defaults() {
        let now = Utc::now();
        let item = Item::new(ItemKind::Episode, "Pilot", now);
        assert_eq!(item.name, "Pilot");
        assert!(!item.is_virtual);
        assert!(item.provider_ids.is_empty());
        assert!(item.images.is_empty());
        assert_eq!(item.date_last_refreshed, now);
    }

    #[test]
    fn test_has_image() {
        let mut item = Item::new(ItemKind::Series, "Show", Utc::now());
        assert!(!item.has_image(ImageType::Primary));
        item.images.insert(ImageType::Primary);
        assert!(item.has_image(ImageType::Primary));
        assert!(!item.has_image(ImageType::Logo));
    }

    #[test]
    fn test_elapsed_since_refresh() {
        let now = Utc::now();
        let mut item = Item::new(ItemKind::Season, "Season 1", now);
        item.date_last_refreshed = now - Duration::minutes(90);
        assert!((item.minutes_since_refresh(now) - 90.0).abs() < 1e-9);

        item.date_last_refreshed = now - Duration::days(3);
        assert!((item.days_since_refresh(now) - 3.0).abs() < 1e-9);
    }
}
