//! Metadata store abstraction and implementation for Lectern.
//!
//! This crate provides the control-plane data model:
//! - User accounts and admin flags
//! - The course -> stage -> video catalog hierarchy
//! - The enrollment ledger
//! - Per-video watch progress and the derived course percentage

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use store::{MetadataStore, SqliteStore};

use lectern_core::config::MetadataConfig;
use std::sync::Arc;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    match config {
        MetadataConfig::Sqlite { path } => {
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
    }
}
