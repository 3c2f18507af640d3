//! In-memory storage primitives for a lost & found catalog.
//!
//! Three independent containers share the [`Item`] record:
//!
//! - [`RecordStore`]: ordered singly linked list of items, looked up by id.
//! - [`KeywordIndex`]: fixed-size chained hash table keyed by case-insensitive text.
//! - [`ActionHistory`]: bounded LIFO stack of [`Action`]s.
//!
//! Containers are single-owner and synchronous. Sizing can be read from JSON
//! through [`CatalogConfig`].

mod config;
mod datastore;
mod error;

pub use config::CatalogConfig;
pub use datastore::*;
pub use error::{CatalogError, Result};
