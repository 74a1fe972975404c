//! Catalog and refresh seams.
//!
//! The refresh engine reads items through [`Catalog`] and asks for
//! refreshes through [`Refresher`]. [`JellyfinClient`](crate::jellyfin::JellyfinClient)
//! implements both against a live server; [`SqliteCatalog`] reads a local
//! snapshot.

mod sqlite;

pub use sqlite::SqliteCatalog;

pub use refreshsparse_db::models::Item;
pub use refreshsparse_db::queries::items::{ItemQuery, SortField};

use async_trait::async_trait;
use refreshsparse_common::{ItemId, Result};
use tokio_util::sync::CancellationToken;

/// Read access to the media catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Items matching `query`, in the order the query asks for.
    async fn query_items(&self, query: &ItemQuery) -> Result<Vec<Item>>;

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>>;
}

/// What a refresh should do. Refreshes are always full metadata and image
/// refreshes that save even when nothing changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRequest {
    pub replace_all_metadata: bool,
    pub replace_all_images: bool,
    pub force_save: bool,
}

impl RefreshRequest {
    pub fn full(replace_all_metadata: bool, replace_all_images: bool) -> Self {
        Self {
            replace_all_metadata,
            replace_all_images,
            force_save: true,
        }
    }
}

/// Triggers a metadata refresh of a single item.
#[async_trait]
pub trait Refresher: Send + Sync {
    /// Refresh `item` and replace it with the refreshed snapshot.
    ///
    /// Fails with [`Error::Cancelled`](refreshsparse_common::Error::Cancelled)
    /// when `cancel` fires first.
    async fn refresh_item(
        &self,
        item: &mut Item,
        request: &RefreshRequest,
        cancel: &CancellationToken,
    ) -> Result<()>;
}
