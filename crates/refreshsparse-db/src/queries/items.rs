//! Item snapshot queries.
//!
//! [`query_items`] mirrors the item query the refresh engine sends to the
//! media server: one item kind, virtual items excluded, an optional lower
//! bound on creation date and a series/sort-name ordering.

use chrono::{DateTime, SecondsFormat, Utc};
use refreshsparse_common::{Error, ItemId, ItemKind, Result};
use rusqlite::types::Type;
use rusqlite::Connection;

use crate::models::Item;

const ITEM_COLUMNS: &str = "id, item_kind, name, sort_name, overview, provider_ids, images,
        series_name, series_sort_name, index_number, parent_index_number,
        premiere_date, status, is_virtual, date_created, date_last_refreshed";

/// Sort key for item queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Sort name of the owning series (falls back to its name).
    SeriesSortName,
    /// Sort name of the item itself (falls back to its name).
    SortName,
}

impl SortField {
    fn order_expr(&self) -> &'static str {
        match self {
            Self::SeriesSortName => "COALESCE(series_sort_name, series_name, '') COLLATE NOCASE",
            Self::SortName => "COALESCE(sort_name, name) COLLATE NOCASE",
        }
    }
}

/// Item query options.
#[derive(Debug, Clone)]
pub struct ItemQuery {
    pub kind: ItemKind,
    pub include_virtual: bool,
    /// Only items created at or after this instant.
    pub min_date_created: Option<DateTime<Utc>>,
    /// Sort keys in priority order; insertion order breaks ties.
    pub sort: Vec<SortField>,
}

impl ItemQuery {
    /// Query for all non-virtual items of `kind`, unsorted.
    pub fn new(kind: ItemKind) -> Self {
        Self {
            kind,
            include_virtual: false,
            min_date_created: None,
            sort: Vec::new(),
        }
    }

    pub fn min_date_created(mut self, min: DateTime<Utc>) -> Self {
        self.min_date_created = Some(min);
        self
    }

    pub fn sort_by(mut self, fields: &[SortField]) -> Self {
        self.sort = fields.to_vec();
        self
    }
}

/// Timestamps are stored as fixed-width UTC RFC 3339 so they compare as text.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn conversion_error<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_enum<T: std::str::FromStr<Err = String>>(idx: usize, raw: &str) -> rusqlite::Result<T> {
    raw.parse::<T>()
        .map_err(|e| conversion_error(idx, Error::invalid_input(e)))
}

/// Parse an item from a database row selected with [`ITEM_COLUMNS`].
fn parse_item_row(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    let id: String = row.get(0)?;
    let kind: String = row.get(1)?;
    let provider_ids_json: String = row.get(5)?;
    let images_json: String = row.get(6)?;
    let premiere_date: Option<String> = row.get(11)?;
    let status: Option<String> = row.get(12)?;
    let date_created: String = row.get(14)?;
    let date_last_refreshed: String = row.get(15)?;

    Ok(Item {
        id: id.parse::<ItemId>().map_err(|e| conversion_error(0, e))?,
        item_kind: parse_enum(1, &kind)?,
        name: row.get(2)?,
        sort_name: row.get(3)?,
        overview: row.get(4)?,
        provider_ids: serde_json::from_str(&provider_ids_json)
            .map_err(|e| conversion_error(5, e))?,
        images: serde_json::from_str(&images_json).map_err(|e| conversion_error(6, e))?,
        series_name: row.get(7)?,
        series_sort_name: row.get(8)?,
        index_number: row.get(9)?,
        parent_index_number: row.get(10)?,
        premiere_date: premiere_date
            .map(|raw| parse_timestamp(11, &raw))
            .transpose()?,
        status: status.map(|raw| parse_enum(12, &raw)).transpose()?,
        is_virtual: row.get(13)?,
        date_created: parse_timestamp(14, &date_created)?,
        date_last_refreshed: parse_timestamp(15, &date_last_refreshed)?,
    })
}

/// Insert or update an item.
pub fn upsert_item(conn: &Connection, item: &Item) -> Result<()> {
    let provider_ids_json =
        serde_json::to_string(&item.provider_ids).map_err(|e| Error::internal(e.to_string()))?;
    let images_json =
        serde_json::to_string(&item.images).map_err(|e| Error::internal(e.to_string()))?;

    conn.execute(
        "INSERT INTO items (
            id, item_kind, name, sort_name, overview, provider_ids, images,
            series_name, series_sort_name, index_number, parent_index_number,
            premiere_date, status, is_virtual, date_created, date_last_refreshed
         ) VALUES (
            :id, :item_kind, :name, :sort_name, :overview, :provider_ids, :images,
            :series_name, :series_sort_name, :index_number, :parent_index_number,
            :premiere_date, :status, :is_virtual, :date_created, :date_last_refreshed
         )
         ON CONFLICT(id) DO UPDATE SET
            item_kind = :item_kind,
            name = :name,
            sort_name = :sort_name,
            overview = :overview,
            provider_ids = :provider_ids,
            images = :images,
            series_name = :series_name,
            series_sort_name = :series_sort_name,
            index_number = :index_number,
            parent_index_number = :parent_index_number,
            premiere_date = :premiere_date,
            status = :status,
            is_virtual = :is_virtual,
            date_created = :date_created,
            date_last_refreshed = :date_last_refreshed",
        rusqlite::named_params! {
            ":id": item.id.simple(),
            ":item_kind": item.item_kind.to_string(),
            ":name": &item.name,
            ":sort_name": &item.sort_name,
            ":overview": &item.overview,
            ":provider_ids": provider_ids_json,
            ":images": images_json,
            ":series_name": &item.series_name,
            ":series_sort_name": &item.series_sort_name,
            ":index_number": item.index_number,
            ":parent_index_number": item.parent_index_number,
            ":premiere_date": item.premiere_date.as_ref().map(format_timestamp),
            ":status": item.status.map(|s| s.to_string()),
            ":is_virtual": item.is_virtual,
            ":date_created": format_timestamp(&item.date_created),
            ":date_last_refreshed": format_timestamp(&item.date_last_refreshed),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Replace the whole snapshot with `items` in a single transaction.
///
/// Returns the number of items written.
pub fn replace_all(conn: &Connection, items: &[Item]) -> Result<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    tx.execute("DELETE FROM items", [])
        .map_err(|e| Error::database(e.to_string()))?;
    for item in items {
        upsert_item(&tx, item)?;
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))?;
    Ok(items.len())
}

/// Get an item by ID.
pub fn get_item(conn: &Connection, id: ItemId) -> Result<Option<Item>> {
    let result = conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = :id"),
        rusqlite::named_params! { ":id": id.simple() },
        parse_item_row,
    );

    match result {
        Ok(item) => Ok(Some(item)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

fn where_clause(query: &ItemQuery) -> String {
    let mut clause = String::from(" WHERE item_kind = :kind");
    if !query.include_virtual {
        clause.push_str(" AND is_virtual = 0");
    }
    if query.min_date_created.is_some() {
        clause.push_str(" AND date_created >= :min_date_created");
    }
    clause
}

/// List items matching `query`.
pub fn query_items(conn: &Connection, query: &ItemQuery) -> Result<Vec<Item>> {
    let mut sql = format!("SELECT {ITEM_COLUMNS} FROM items");
    sql.push_str(&where_clause(query));

    sql.push_str(" ORDER BY ");
    for field in &query.sort {
        sql.push_str(field.order_expr());
        sql.push_str(", ");
    }
    sql.push_str("rowid");

    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| Error::database(e.to_string()))?;

    let kind = query.kind.to_string();
    let min_date = query.min_date_created.as_ref().map(format_timestamp);

    let mut params: Vec<(&str, &dyn rusqlite::ToSql)> = vec![(":kind", &kind)];
    if let Some(ref min) = min_date {
        params.push((":min_date_created", min));
    }

    let items = stmt
        .query_map(&*params, parse_item_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(items)
}
