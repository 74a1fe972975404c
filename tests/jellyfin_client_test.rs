//! Jellyfin backend tests against a wiremock server.

mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use common::*;
use refreshsparse::catalog::{Catalog, ItemQuery, RefreshRequest, Refresher, SortField};
use refreshsparse::jellyfin::JellyfinClient;
use refreshsparse_common::{Error, ItemKind};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> JellyfinClient {
    JellyfinClient::new(&jellyfin_config(&server.uri()))
        .unwrap()
        .with_refresh_timing(Duration::from_millis(10), Duration::from_secs(2))
}

async fn mount_get_item(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/Items"))
        .and(query_param("Ids", SERIES_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(items_body(vec![body])))
        .mount(server)
        .await;
}

async fn fetch_series(client: &JellyfinClient) -> refreshsparse::catalog::Item {
    client
        .get_item(SERIES_ID.parse().unwrap())
        .await
        .unwrap()
        .unwrap()
}

#[test]
fn test_new_requires_url() {
    let mut config = jellyfin_config("");
    config.url.clear();
    assert_matches!(JellyfinClient::new(&config), Err(Error::InvalidInput(_)));
}

#[test]
fn test_debug_omits_api_key() {
    let client = JellyfinClient::new(&jellyfin_config("http://localhost:8096/")).unwrap();
    let debug = format!("{:?}", client);
    assert!(debug.contains("http://localhost:8096"));
    assert!(!debug.contains(API_KEY));
}

#[tokio::test]
async fn test_query_items_sends_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Items"))
        .and(header("X-Emby-Token", API_KEY))
        .and(query_param("IncludeItemTypes", "Episode"))
        .and(query_param("Recursive", "true"))
        .and(query_param("ExcludeLocationTypes", "Virtual"))
        .and(query_param("SortBy", "SeriesSortName,SortName"))
        .and(query_param("SortOrder", "Ascending"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items_body(vec![
            serde_json::json!({
                "Id": "0f0e0d0c0b0a09080706050403020100",
                "Type": "Episode",
                "Name": "Pilot",
                "SeriesName": "Show",
                "ParentIndexNumber": 1,
                "IndexNumber": 1,
                "PremiereDate": "2024-05-01T00:00:00.0000000Z",
                "DateCreated": "2024-05-02T00:00:00.0000000Z",
                "DateLastRefreshed": "2024-05-02T00:00:00.0000000Z"
            }),
            serde_json::json!({
                "Id": "0f0e0d0c0b0a09080706050403020101",
                "Type": "Episode",
                "Name": "Upcoming",
                "LocationType": "Virtual"
            }),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let query = ItemQuery::new(ItemKind::Episode)
        .sort_by(&[SortField::SeriesSortName, SortField::SortName]);
    let items = client(&server).query_items(&query).await.unwrap();

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Pilot");
    assert_eq!(items[0].series_name.as_deref(), Some("Show"));
    assert!(items[0].premiere_date.is_some());
}

#[tokio::test]
async fn test_query_items_sends_min_date_created() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Items"))
        .and(query_param("MinDateCreated", "2024-06-01T00:00:00+00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items_body(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let min = "2024-06-01T00:00:00Z".parse().unwrap();
    let query = ItemQuery::new(ItemKind::Episode).min_date_created(min);
    assert!(client(&server).query_items(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_item_missing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items_body(vec![])))
        .mount(&server)
        .await;

    let found = client(&server)
        .get_item(SERIES_ID.parse().unwrap())
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_server_error_is_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Items"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client(&server)
        .query_items(&ItemQuery::new(ItemKind::Series))
        .await;
    assert_matches!(result, Err(Error::Http(msg)) if msg.contains("boom"));
}

#[tokio::test]
async fn test_retries_after_429() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/Items"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items_body(vec![
            sparse_series(SERIES_ID, "Show", "2024-01-01T00:00:00Z"),
        ])))
        .mount(&server)
        .await;

    let items = client(&server)
        .query_items(&ItemQuery::new(ItemKind::Series))
        .await
        .unwrap();
    assert_eq!(items.len(), 1);
}

#[tokio::test]
async fn test_refresh_waits_for_new_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/Items/{SERIES_ID}/Refresh")))
        .and(header("X-Emby-Token", API_KEY))
        .and(query_param("metadataRefreshMode", "FullRefresh"))
        .and(query_param("imageRefreshMode", "FullRefresh"))
        .and(query_param("replaceAllMetadata", "false"))
        .and(query_param("replaceAllImages", "true"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    // First poll still sees the old refresh time, the second the new one.
    Mock::given(method("GET"))
        .and(path("/Items"))
        .and(query_param("Ids", SERIES_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(items_body(vec![
            sparse_series(SERIES_ID, "Show", "2024-01-01T00:00:00Z"),
        ])))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_get_item(
        &server,
        refreshed_series(SERIES_ID, "Show", "2024-06-01T00:00:00Z"),
    )
    .await;

    let client = client(&server);
    let mut item = fetch_series(&client).await;
    assert!(item.overview.is_none());

    client
        .refresh_item(
            &mut item,
            &RefreshRequest::full(false, true),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(item.overview.as_deref(), Some("A show about things."));
    assert_eq!(
        item.date_last_refreshed,
        "2024-06-01T00:00:00Z".parse::<chrono::DateTime<chrono::Utc>>().unwrap()
    );
}

#[tokio::test]
async fn test_refresh_failure_names_item() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/Items/{SERIES_ID}/Refresh")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_get_item(
        &server,
        sparse_series(SERIES_ID, "Show", "2024-01-01T00:00:00Z"),
    )
    .await;

    let client = client(&server);
    let mut item = fetch_series(&client).await;
    let result = client
        .refresh_item(
            &mut item,
            &RefreshRequest::full(false, false),
            &CancellationToken::new(),
        )
        .await;

    assert_matches!(result, Err(Error::Refresh { item, .. }) if item == "Show");
}

#[tokio::test]
async fn test_refresh_timeout_keeps_latest_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/Items/{SERIES_ID}/Refresh")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    mount_get_item(
        &server,
        sparse_series(SERIES_ID, "Show", "2024-01-01T00:00:00Z"),
    )
    .await;

    let client = client(&server)
        .with_refresh_timing(Duration::from_millis(10), Duration::from_millis(50));
    let mut item = fetch_series(&client).await;
    let before = item.date_last_refreshed;

    client
        .refresh_item(
            &mut item,
            &RefreshRequest::full(false, false),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(item.date_last_refreshed, before);
}

#[tokio::test]
async fn test_refresh_cancelled_while_waiting() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/Items/{SERIES_ID}/Refresh")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    mount_get_item(
        &server,
        sparse_series(SERIES_ID, "Show", "2024-01-01T00:00:00Z"),
    )
    .await;

    let client = client(&server)
        .with_refresh_timing(Duration::from_millis(10), Duration::from_secs(30));
    let mut item = fetch_series(&client).await;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let result = client
        .refresh_item(&mut item, &RefreshRequest::full(false, false), &cancel)
        .await;
    assert_matches!(result, Err(Error::Cancelled));
}

#[tokio::test]
async fn test_refresh_skipped_when_already_cancelled() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    mount_get_item(
        &server,
        sparse_series(SERIES_ID, "Show", "2024-01-01T00:00:00Z"),
    )
    .await;

    let client = client(&server);
    let mut item = fetch_series(&client).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = client
        .refresh_item(&mut item, &RefreshRequest::full(false, false), &cancel)
        .await;
    assert_matches!(result, Err(Error::Cancelled));
}
