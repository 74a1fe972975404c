//! Jellyfin API response types.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use refreshsparse_common::{Error, ImageType, ItemId, ItemKind, Result, SeriesStatus};
use serde::{Deserialize, Deserializer};

use crate::catalog::Item;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct ItemsResponse {
    #[serde(default)]
    pub items: Vec<BaseItemDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct BaseItemDto {
    pub id: String,
    #[serde(rename = "Type")]
    pub item_type: Option<String>,
    pub name: Option<String>,
    pub sort_name: Option<String>,
    pub overview: Option<String>,
    pub provider_ids: Option<BTreeMap<String, Option<String>>>,
    pub image_tags: Option<BTreeMap<String, String>>,
    pub backdrop_image_tags: Option<Vec<String>>,
    pub series_name: Option<String>,
    pub index_number: Option<i32>,
    pub parent_index_number: Option<i32>,
    #[serde(default, deserialize_with = "jellyfin_date")]
    pub premiere_date: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub location_type: Option<String>,
    #[serde(default, deserialize_with = "jellyfin_date")]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "jellyfin_date")]
    pub date_last_refreshed: Option<DateTime<Utc>>,
}

/// Parse a Jellyfin timestamp. Offsets are optional; bare timestamps are UTC.
pub(crate) fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = raw.parse::<DateTime<Utc>>() {
        return Some(ts);
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|ts| ts.and_utc())
}

fn jellyfin_date<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

impl BaseItemDto {
    pub fn into_item(self) -> Result<Item> {
        let id: ItemId = self.id.parse()?;
        let item_kind: ItemKind = self
            .item_type
            .as_deref()
            .ok_or_else(|| Error::invalid_input(format!("Item {} has no type", self.id)))?
            .parse()
            .map_err(Error::invalid_input)?;

        let provider_ids = self
            .provider_ids
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(provider, value)| {
                value
                    .filter(|v| !v.trim().is_empty())
                    .map(|v| (provider, v))
            })
            .collect();

        let mut images: std::collections::BTreeSet<ImageType> = self
            .image_tags
            .unwrap_or_default()
            .keys()
            .filter_map(|key| key.parse().ok())
            .collect();
        if self.backdrop_image_tags.is_some_and(|tags| !tags.is_empty()) {
            images.insert(ImageType::Backdrop);
        }

        Ok(Item {
            id,
            item_kind,
            name: self.name.unwrap_or_default(),
            sort_name: self.sort_name,
            overview: self.overview,
            provider_ids,
            images,
            series_sort_name: None,
            series_name: self.series_name,
            index_number: self.index_number,
            parent_index_number: self.parent_index_number,
            premiere_date: self.premiere_date,
            status: self.status.and_then(|s| s.parse::<SeriesStatus>().ok()),
            is_virtual: self.location_type.as_deref() == Some("Virtual"),
            date_created: self.date_created.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            date_last_refreshed: self.date_last_refreshed.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        })
    }
}
