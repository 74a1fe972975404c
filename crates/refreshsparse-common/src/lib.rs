//! Refreshsparse-Common: Shared types, identifiers, and errors.
//!
//! This crate provides the vocabulary used across refreshsparse:
//!
//! - **Typed IDs**: [`ItemId`], a UUID wrapper that accepts Jellyfin's
//!   dash-less identifiers as well as the hyphenated form
//! - **Core Types**: [`ItemKind`], [`ImageType`] and [`SeriesStatus`]
//! - **Error Handling**: [`Error`] and the [`Result`] alias
//!
//! # Examples
//!
//! ```
//! use refreshsparse_common::{Error, ImageType, ItemId, ItemKind, Result};
//!
//! let id: ItemId = "0f0e0d0c0b0a09080706050403020100".parse().unwrap();
//! assert_eq!(id.simple(), "0f0e0d0c0b0a09080706050403020100");
//!
//! assert_eq!("episode".parse::<ItemKind>().unwrap(), ItemKind::Episode);
//! assert_eq!(ImageType::Primary.to_string(), "primary");
//!
//! fn example() -> Result<()> {
//!     Err(Error::invalid_input("item"))
//! }
//! assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
