//! Database query modules.
//!
//! - items: Item upsert, lookup, and catalog-style queries

pub mod items;
