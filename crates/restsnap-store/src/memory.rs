use async_trait::async_trait;
use restsnap_core::{Area, BlobPath, BlobStore, CoreError, CoreResult, WriteMode};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of BlobStore for testing
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    data: Arc<RwLock<BTreeMap<BlobPath, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a blob directly, bypassing the trait
    pub async fn insert(&self, path: BlobPath, data: impl Into<Vec<u8>>) {
        self.data.write().await.insert(path, data.into());
    }

    /// Snapshot of a blob, if present
    pub async fn get(&self, path: &BlobPath) -> Option<Vec<u8>> {
        self.data.read().await.get(path).cloned()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn exists(&self, path: &BlobPath) -> CoreResult<bool> {
        Ok(self.data.read().await.contains_key(path))
    }

    async fn read(&self, path: &BlobPath) -> CoreResult<Vec<u8>> {
        self.data
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(path.to_string()))
    }

    async fn write(&self, path: &BlobPath, data: &[u8], mode: WriteMode) -> CoreResult<()> {
        let mut map = self.data.write().await;
        match mode {
            WriteMode::Truncate => {
                map.insert(path.clone(), data.to_vec());
            }
            WriteMode::Append => map.entry(path.clone()).or_default().extend_from_slice(data),
        }
        Ok(())
    }

    async fn remove(&self, path: &BlobPath) -> CoreResult<bool> {
        Ok(self.data.write().await.remove(path).is_some())
    }

    async fn list(&self, area: Area) -> CoreResult<Vec<String>> {
        let map = self.data.read().await;
        Ok(map.keys().filter(|p| p.area == area).map(|p| p.file.clone()).collect())
    }
}
