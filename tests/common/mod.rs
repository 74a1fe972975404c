//! Shared helpers for integration tests.
//!
//! Builds Jellyfin configs pointing at a wiremock server and JSON bodies in
//! the shape `GET /Items` returns.

#![allow(dead_code)]

use refreshsparse::config::JellyfinConfig;
use serde_json::{json, Value};

pub const API_KEY: &str = "test-key";

pub const SERIES_ID: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f90";

/// Config for a mock server with rate limiting out of the way.
pub fn jellyfin_config(uri: &str) -> JellyfinConfig {
    JellyfinConfig {
        url: uri.to_string(),
        api_key: API_KEY.to_string(),
        timeout_secs: 5,
        refresh_poll_interval_secs: 1,
        refresh_timeout_secs: 5,
        requests_per_second: 1000,
    }
}

/// A series lacking an overview, last refreshed on `refreshed`.
pub fn sparse_series(id: &str, name: &str, refreshed: &str) -> Value {
    json!({
        "Id": id,
        "Type": "Series",
        "Name": name,
        "SortName": name.to_lowercase(),
        "Status": "Continuing",
        "ProviderIds": { "Tvdb": "1" },
        "ImageTags": { "Primary": "p" },
        "BackdropImageTags": ["b"],
        "LocationType": "FileSystem",
        "DateCreated": "2023-01-01T00:00:00.0000000Z",
        "DateLastRefreshed": refreshed
    })
}

/// The same series after a refresh filled in its overview.
pub fn refreshed_series(id: &str, name: &str, refreshed: &str) -> Value {
    let mut item = sparse_series(id, name, refreshed);
    item["Overview"] = json!("A show about things.");
    item
}

pub fn items_body(items: Vec<Value>) -> Value {
    let count = items.len();
    json!({ "Items": items, "TotalRecordCount": count })
}
