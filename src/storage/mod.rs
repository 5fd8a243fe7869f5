//! Storage module for persisting relevant pages
//!
//! This module holds the content store backends the crawler writes to:
//! - A directory of one file per page
//! - A SQLite database with one row per page
//! - An in-process map
//!
//! Every backend is write-once per key, which is what keeps repeated runs
//! over the same site from storing a page twice.

mod directory;
mod memory;
mod schema;
mod sqlite;
mod traits;

pub use directory::DirectoryStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{ContentStore, StoreError, StoreKey, StoreOutcome, StoreResult};

use crate::config::{StoreBackend, StoreConfig};
use std::path::Path;
use std::sync::Arc;

/// Opens the content store described by the configuration
///
/// # Arguments
///
/// * `config` - The store section of the configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn ContentStore>)` - Store ready for writes
/// * `Err(StoreError)` - Failed to create the directory or open the database
pub fn open_store(config: &StoreConfig) -> StoreResult<Arc<dyn ContentStore>> {
    let location = Path::new(&config.location);
    let store: Arc<dyn ContentStore> = match config.backend {
        StoreBackend::Directory => Arc::new(DirectoryStore::new(location, &config.prefix)?),
        StoreBackend::Sqlite => Arc::new(SqliteStore::new(location, &config.prefix)?),
        StoreBackend::Memory => Arc::new(MemoryStore::new(&config.prefix)),
    };
    Ok(store)
}
