use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{BusinessStore, StoreError};
use crate::workflows::Business;

/// Process-local store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    businesses: RwLock<HashMap<String, Business>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.businesses.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.businesses.read().await.is_empty()
    }
}

#[async_trait]
impl BusinessStore for InMemoryStore {
    async fn get(&self, fein: &str) -> Result<Business, StoreError> {
        self.businesses
            .read()
            .await
            .get(fein)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(fein.to_string()))
    }

    async fn put(&self, fein: &str, business: &Business) -> Result<(), StoreError> {
        self.businesses
            .write()
            .await
            .insert(fein.to_string(), business.clone());
        Ok(())
    }

    async fn contains(&self, fein: &str) -> Result<bool, StoreError> {
        Ok(self.businesses.read().await.contains_key(fein))
    }
}
