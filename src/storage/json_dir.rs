use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::{BusinessStore, StoreError};
use crate::workflows::Business;

/// Stores each business as `<fein>.business.json` inside a directory.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    directory: PathBuf,
}

impl JsonDirStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn business_file_path(&self, fein: &str) -> Result<PathBuf, StoreError> {
        let usable = !fein.is_empty()
            && fein
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !usable {
            return Err(StoreError::InvalidKey(fein.to_string()));
        }
        Ok(self.directory.join(format!("{fein}.business.json")))
    }
}

#[async_trait]
impl BusinessStore for JsonDirStore {
    async fn get(&self, fein: &str) -> Result<Business, StoreError> {
        let path = self.business_file_path(fein)?;

        let contents = match fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(fein = %fein, file = ?path, "No business file found");
                return Err(StoreError::NotFound(fein.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&contents)?)
    }

    async fn put(&self, fein: &str, business: &Business) -> Result<(), StoreError> {
        let path = self.business_file_path(fein)?;
        fs::create_dir_all(&self.directory).await?;

        let serialized = serde_json::to_string_pretty(business)?;

        // Write to temporary file first, then rename
        let temp_file = path.with_extension("json.tmp");
        fs::write(&temp_file, serialized).await?;
        fs::rename(&temp_file, &path).await?;

        info!(
            fein = %fein,
            stage = %business.stage,
            file = ?path,
            "Business snapshot saved"
        );
        Ok(())
    }

    async fn contains(&self, fein: &str) -> Result<bool, StoreError> {
        let path = self.business_file_path(fein)?;
        Ok(fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::{Contact, Industry, Stage};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDirStore::new(temp_dir.path().join("businesses"));

        let mut business = Business::new("Joe's", "12345678901");
        business.industry = Some(Industry::Restaurants);
        business.contact = Contact::new("Joe", "98765432100");
        business.stage = Stage::SalesApproved;

        store.put("12345678901", &business).await.unwrap();
        assert!(store.contains("12345678901").await.unwrap());
        assert_eq!(store.get("12345678901").await.unwrap(), business);

        let file = temp_dir
            .path()
            .join("businesses")
            .join("12345678901.business.json");
        assert!(file.exists());
        assert!(!file.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_missing_business_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDirStore::new(temp_dir.path());

        assert!(matches!(
            store.get("999").await,
            Err(StoreError::NotFound(fein)) if fein == "999"
        ));
        assert!(!store.contains("999").await.unwrap());
    }

    #[tokio::test]
    async fn test_path_like_fein_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDirStore::new(temp_dir.path());
        let business = Business::new("Evil", "../escape");

        assert!(matches!(
            store.put("../escape", &business).await,
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get("").await, Err(StoreError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_unknown_stage_on_disk_is_a_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonDirStore::new(temp_dir.path());
        std::fs::write(
            temp_dir.path().join("7.business.json"),
            r#"{"name":"X","fein":"7","industry":null,
               "contact":{"name":null,"phone":null},"stage":"Paused"}"#,
        )
        .unwrap();

        assert!(matches!(
            store.get("7").await,
            Err(StoreError::Serialization(_))
        ));
    }
}
