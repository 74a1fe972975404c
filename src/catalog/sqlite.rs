//! Catalog backed by a SQLite snapshot.

use async_trait::async_trait;
use refreshsparse_common::{Error, ItemId, ItemKind, Result};
use refreshsparse_db::pool::{get_conn, DbPool};
use refreshsparse_db::queries::items;

use super::{Catalog, Item, ItemQuery, SortField};

/// Read-only [`Catalog`] over a snapshot database.
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: DbPool,
}

impl SqliteCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Open the snapshot at `path`.
    pub fn open(path: &str) -> Result<Self> {
        refreshsparse_db::pool::init_pool(path).map(Self::new)
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Replace the snapshot with every series, season and episode of
    /// `source`. Returns the number of items stored.
    pub async fn import_from(&self, source: &dyn Catalog) -> Result<usize> {
        let mut all = Vec::new();
        for kind in ItemKind::ALL {
            let listed = source
                .query_items(&ItemQuery::new(kind).sort_by(&[SortField::SortName]))
                .await?;
            tracing::debug!(kind = %kind, count = listed.len(), "Fetched items for snapshot");
            all.extend(listed);
        }

        self.blocking(move |pool| {
            let conn = get_conn(pool)?;
            items::replace_all(&conn, &all)
        })
        .await
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&DbPool) -> Result<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || f(&pool))
            .await
            .map_err(|e| Error::internal(format!("Snapshot query task failed: {}", e)))?
    }
}

#[async_trait]
impl Catalog for SqliteCatalog {
    async fn query_items(&self, query: &ItemQuery) -> Result<Vec<Item>> {
        let query = query.clone();
        self.blocking(move |pool| {
            let conn = get_conn(pool)?;
            items::query_items(&conn, &query)
        })
        .await
    }

    async fn get_item(&self, id: ItemId) -> Result<Option<Item>> {
        self.blocking(move |pool| {
            let conn = get_conn(pool)?;
            items::get_item(&conn, id)
        })
        .await
    }
}
