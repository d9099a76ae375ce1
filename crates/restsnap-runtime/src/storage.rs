//! Typed access to case blobs.
//!
//! Business logic names blobs by [`BlobKind`] and [`CaseName`]; this adapter
//! resolves them through the [`SuffixLayout`] and applies the run's text
//! encoding on the way in and out of the underlying [`BlobStore`].

use std::fmt;
use std::sync::Arc;

use restsnap_core::{
    BlobKey, BlobKind, BlobPath, BlobStore, CaseName, SuffixLayout, TextEncoding, WriteMode,
};

use crate::error::RuntimeResult;

#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn BlobStore>,
    layout: SuffixLayout,
    encoding: TextEncoding,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("layout", &self.layout)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl Storage {
    pub fn new(store: Arc<dyn BlobStore>, layout: SuffixLayout, encoding: TextEncoding) -> Self {
        Self { store, layout, encoding }
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn path(&self, kind: BlobKind, name: &CaseName) -> BlobPath {
        self.layout.resolve(&BlobKey::new(kind, name.clone()))
    }

    pub async fn exists(&self, kind: BlobKind, name: &CaseName) -> RuntimeResult<bool> {
        Ok(self.store.exists(&self.path(kind, name)).await?)
    }

    pub async fn read_bytes(&self, kind: BlobKind, name: &CaseName) -> RuntimeResult<Vec<u8>> {
        Ok(self.store.read(&self.path(kind, name)).await?)
    }

    pub async fn read_text(&self, kind: BlobKind, name: &CaseName) -> RuntimeResult<String> {
        let bytes = self.read_bytes(kind, name).await?;
        Ok(self.encoding.decode(&bytes)?)
    }

    /// Create or overwrite a blob with encoded text
    pub async fn write_text(&self, kind: BlobKind, name: &CaseName, text: &str) -> RuntimeResult<()> {
        let path = self.path(kind, name);
        let bytes = self.encoding.encode(text)?;
        self.store.write(&path, &bytes, WriteMode::Truncate).await?;
        tracing::debug!(blob = %path, bytes = bytes.len(), "blob stored");
        Ok(())
    }

    /// Case names of every blob of `kind`, in store order
    pub async fn list_names(&self, kind: BlobKind) -> RuntimeResult<Vec<CaseName>> {
        let files = self.store.list(kind.area()).await?;
        Ok(files
            .iter()
            .filter_map(|file| self.layout.case_name(kind, file))
            .collect())
    }

    pub async fn append_error_line(&self, line: &str) -> RuntimeResult<()> {
        let bytes = self.encoding.encode(line)?;
        self.store
            .write(&self.layout.error_log(), &bytes, WriteMode::Append)
            .await?;
        Ok(())
    }

    /// Remove the error log; returns false if there was none.
    pub async fn remove_error_log(&self) -> RuntimeResult<bool> {
        Ok(self.store.remove(&self.layout.error_log()).await?)
    }

    pub async fn read_error_log(&self) -> RuntimeResult<Option<String>> {
        let path = self.layout.error_log();
        if !self.store.exists(&path).await? {
            return Ok(None);
        }
        let bytes = self.store.read(&path).await?;
        Ok(Some(self.encoding.decode(&bytes)?))
    }
}
