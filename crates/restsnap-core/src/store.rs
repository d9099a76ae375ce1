use crate::error::CoreResult;
use crate::types::{Area, BlobPath};
use async_trait::async_trait;

/// How a write treats existing content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Truncate,
    Append,
}

/// Async trait over the four storage areas, addressed by area + file name.
///
/// Implementations hold raw bytes; text encoding is applied by callers.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Check whether a blob exists
    async fn exists(&self, path: &BlobPath) -> CoreResult<bool>;
    /// Read a blob, `CoreError::NotFound` if it is missing
    async fn read(&self, path: &BlobPath) -> CoreResult<Vec<u8>>;
    /// Create or overwrite a blob, or append to it
    async fn write(&self, path: &BlobPath, data: &[u8], mode: WriteMode) -> CoreResult<()>;
    /// Delete a blob, returns true if deleted
    async fn remove(&self, path: &BlobPath) -> CoreResult<bool>;
    /// File names present in an area, in no particular order
    async fn list(&self, area: Area) -> CoreResult<Vec<String>>;
}
