//! Wayfinder Storage - Storage backends for the building graph
//!
//! This crate provides different storage backends for persisting nodes
//! and edges, and an adapter that feeds them to the router.

#![allow(clippy::result_large_err)]

pub mod error;
pub mod migration;
pub mod provider;
pub mod traits;

#[cfg(feature = "redb")]
pub mod redb;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod memory;

pub use error::{StorageError, StorageResult};
pub use migration::{Migratable, SchemaVersion, CURRENT_VERSION, MIGRATIONS};
pub use provider::StorageProvider;
pub use traits::StorageBackend;

#[cfg(feature = "redb")]
pub use self::redb::RedbStorage;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStorage;

pub use memory::MemoryStorage;
