//! Business snapshot storage.
//!
//! The [`BusinessStore`] trait is the whole contract the service relies on:
//! get and put by FEIN. Backends:
//! - [`InMemoryStore`] for tests and throwaway sessions
//! - [`JsonDirStore`] with one JSON file per business

mod json_dir;
mod memory;

pub use json_dir::JsonDirStore;
pub use memory::InMemoryStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::workflows::Business;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No Business in records with fein: {0}")]
    NotFound(String),

    #[error("FEIN cannot be used as a storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value storage for business snapshots, keyed by FEIN.
#[async_trait]
pub trait BusinessStore: Send + Sync {
    /// Fetch a snapshot, [`StoreError::NotFound`] when absent.
    async fn get(&self, fein: &str) -> Result<Business, StoreError>;

    /// Insert or overwrite a snapshot.
    async fn put(&self, fein: &str, business: &Business) -> Result<(), StoreError>;

    async fn contains(&self, fein: &str) -> Result<bool, StoreError> {
        match self.get(fein).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
