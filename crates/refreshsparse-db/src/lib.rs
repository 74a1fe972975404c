//! Refreshsparse-DB: SQLite catalog snapshots.
//!
//! A snapshot is a local copy of the series, seasons and episodes of a media
//! server, stored with exactly the fields the refresh engine evaluates. It
//! lets candidate selection run offline and gives tests a real query engine
//! for kind, virtual-item, date and sort handling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - The catalog item model
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use refreshsparse_common::ItemKind;
//! use refreshsparse_db::pool::{init_pool, get_conn};
//! use refreshsparse_db::queries::items::{self, ItemQuery};
//!
//! let pool = init_pool("/var/lib/refreshsparse/snapshot.db").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let episodes = items::query_items(&conn, &ItemQuery::new(ItemKind::Episode)).unwrap();
//! println!("{} episodes in snapshot", episodes.len());
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
