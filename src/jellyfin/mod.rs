//! Jellyfin HTTP backend.
//!
//! [`JellyfinClient`] lists items through `GET /Items` and triggers
//! refreshes through `POST /Items/{id}/Refresh`. Jellyfin queues refreshes
//! and answers immediately, so the client polls the item until its
//! last-refreshed timestamp moves before handing the new snapshot back.
//!
//! Requests are rate limited with [`governor`] and retried on HTTP 429.

mod dto;

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use refreshsparse_common::{Error, ItemId, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::catalog::{Catalog, Item, ItemQuery, RefreshRequest, Refresher, SortField};
use crate::config::JellyfinConfig;
use dto::ItemsResponse;

const MAX_RETRIES: u32 = 3;

/// Fields requested on top of Jellyfin's defaults.
const ITEM_FIELDS: &str = "Overview,ProviderIds,SortName,DateCreated,DateLastRefreshed";

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

pub struct JellyfinClient {
    client: Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    refresh_timeout: Duration,
    rate_limiter: DirectRateLimiter,
}

impl std::fmt::Debug for JellyfinClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JellyfinClient")
            .field("base_url", &self.base_url)
            .field("poll_interval", &self.poll_interval)
            .field("refresh_timeout", &self.refresh_timeout)
            .finish_non_exhaustive()
    }
}

fn sort_name(field: &SortField) -> &'static str {
    match field {
        SortField::SeriesSortName => "SeriesSortName",
        SortField::SortName => "SortName",
    }
}

impl JellyfinClient {
    pub fn new(config: &JellyfinConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(Error::invalid_input("jellyfin.url is not configured"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        let rate = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            poll_interval: Duration::from_secs(config.refresh_poll_interval_secs),
            refresh_timeout: Duration::from_secs(config.refresh_timeout_secs),
            rate_limiter: RateLimiter::direct(Quota::per_second(rate)),
        })
    }

    /// Override how refresh completion is awaited.
    pub fn with_refresh_timing(mut self, poll_interval: Duration, timeout: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.refresh_timeout = timeout;
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request with rate limiting and 429-retry logic.
    async fn send(&self, build: impl Fn() -> RequestBuilder) -> Result<Response> {
        let mut retries = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let resp = build()
                .header("X-Emby-Token", &self.api_key)
                .send()
                .await
                .map_err(|e| Error::http(e.to_string()))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    retry = retries,
                    wait_secs = wait,
                    "Jellyfin returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(Error::http(format!("{}: {}", status, body)));
            }

            return Ok(resp);
        }
    }

    async fn fetch_items(&self, params: &[(&str, String)]) -> Result<Vec<Item>> {
        let url = self.url("/Items");
        let resp = self.send(|| self.client.get(&url).query(params)).await?;
        let body: ItemsResponse = resp
            .json()
            .await
            .map_err(|e| Error::http(format!("Invalid /Items response: {}", e)))?;

        body.items.into_iter().map(|dto| dto.into_item()).collect()
    }

    /// Poll `item` until Jellyfin reports a newer refresh, then replace it.
    ///
    /// When the timeout passes first the latest snapshot is used as is.
    async fn wait_for_refresh(&self, item: &mut Item, cancel: &CancellationToken) -> Result<()> {
        let before = item.date_last_refreshed;
        let deadline = tokio::time::Instant::now() + self.refresh_timeout;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            let fresh = self.get_item(item.id).await?.ok_or_else(|| {
                Error::refresh(item.name.clone(), "item disappeared during refresh")
            })?;

            if fresh.date_last_refreshed > before {
                *item = fresh;
                return Ok(());
            }

            if tokio::time::Instant::now() >= deadline {
                warn!(
                    item_id = %item.id,
                    timeout_secs = self.refresh_timeout.as_secs(),
                    "Refresh did not finish in time; re-checking current metadata"
                );
                *item = fresh;
                return Ok(());
            }
        }
    }
}

#[async_trait]
impl Catalog for JellyfinClient {
    async fn query_items(&self, query: &ItemQuery) -> Result<Vec<Item>> {
        let mut params = vec![
            ("IncludeItemTypes", query.kind.jellyfin_name().to_string()),
            ("Recursive", "true".to_string()),
            ("Fields", ITEM_FIELDS.to_string()),
        ];
        if !query.include_virtual {
            params.push(("ExcludeLocationTypes", "Virtual".to_string()));
        }
        if let Some(min) = query.min_date_created {
            params.push(("MinDateCreated", min.to_rfc3339()));
        }
        if !query.sort.is_empty() {
            let sort_by: Vec<_> = query.sort.iter().map(sort_name).collect();
            params.push(("SortBy", sort_by.join(",")));
            params.push(("SortOrder", "Ascending".to_string()));
        }

        let items = self.fetch_items(&params).await?;
        debug!(kind = %query.kind, count = items.len(), "Listed Jellyfin items");

        Ok(items
            .into_iter()
            .filter(|item| query.include_virtual || !item.is_virtual)
            .collect())
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>> {
        let params = [
            ("Ids", id.simple()),
            ("Fields", ITEM_FIELDS.to_string()),
        ];
        Ok(self.fetch_items(&params).await?.into_iter().next())
    }
}

#[async_trait]
impl Refresher for JellyfinClient {
    async fn refresh_item(
        &self,
        item: &mut Item,
        request: &RefreshRequest,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        // Jellyfin forces a save for full refreshes.
        let url = self.url(&format!("/Items/{}/Refresh", item.id.simple()));
        let params = [
            ("metadataRefreshMode", "FullRefresh".to_string()),
            ("imageRefreshMode", "FullRefresh".to_string()),
            ("replaceAllMetadata", request.replace_all_metadata.to_string()),
            ("replaceAllImages", request.replace_all_images.to_string()),
        ];

        self.send(|| self.client.post(&url).query(&params))
            .await
            .map_err(|e| Error::refresh(item.name.clone(), e.to_string()))?;

        debug!(item_id = %item.id, "Refresh queued");

        self.wait_for_refresh(item, cancel).await
    }
}
