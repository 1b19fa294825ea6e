use std::{collections::HashMap, io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::warn;

use super::KvStore;
use crate::errors::ServiceError;

/// String map persisted as one JSON object on disk.
///
/// Every mutation rewrites the file and only lands in memory once the write
/// succeeded. A missing or corrupt file starts the store empty; any other
/// read error fails `open`.
pub struct JsonFileStore {
    inner: RwLock<HashMap<String, String>>,
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Open the store at `path`, creating parent directories as needed.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
        }

        let map = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), error = %e, "session file is corrupt; starting empty");
                HashMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(ServiceError::Storage(format!("cannot read {}: {e}", file_path.display()))),
        };

        Ok(Self { inner: RwLock::new(map), file_path })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.file_path
    }

    async fn persist(&self, map: &HashMap<String, String>) -> Result<(), ServiceError> {
        let data = serde_json::to_vec(map)?;
        fs::write(&self.file_path, data).await.map_err(ServiceError::storage)
    }
}

#[async_trait]
impl KvStore for JsonFileStore {
    async fn get_item(&self, key: &str) -> Option<String> {
        self.inner.read().await.get(key).cloned()
    }

    async fn set_item(&self, key: &str, value: String) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        next.insert(key.to_string(), value);
        self.persist(&next).await?;
        *map = next;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), ServiceError> {
        let mut map = self.inner.write().await;
        if !map.contains_key(key) {
            return Ok(());
        }
        let mut next = map.clone();
        next.remove(key);
        self.persist(&next).await?;
        *map = next;
        Ok(())
    }
}
