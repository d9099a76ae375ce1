//! Directory-backed blob store.
//!
//! Each [`Area`] maps to one plain directory. Blobs are files directly inside
//! it; sub-directories are never created or listed.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use restsnap_core::{Area, BlobPath, BlobStore, CoreError, CoreResult, WriteMode};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::error::{StoreError, StoreResult};

/// The four directories a run works with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaDirs {
    pub requests: PathBuf,
    pub responses: PathBuf,
    pub samples: PathBuf,
    pub errors: PathBuf,
}

impl AreaDirs {
    pub fn new(
        requests: impl Into<PathBuf>,
        responses: impl Into<PathBuf>,
        samples: impl Into<PathBuf>,
        errors: impl Into<PathBuf>,
    ) -> Self {
        Self {
            requests: requests.into(),
            responses: responses.into(),
            samples: samples.into(),
            errors: errors.into(),
        }
    }

    /// Conventional layout under a single root: `<root>/requests`, ...
    pub fn under<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self::new(
            root.join(Area::Requests.as_str()),
            root.join(Area::Responses.as_str()),
            root.join(Area::Samples.as_str()),
            root.join(Area::Errors.as_str()),
        )
    }

    pub fn dir(&self, area: Area) -> &Path {
        match area {
            Area::Requests => &self.requests,
            Area::Responses => &self.responses,
            Area::Samples => &self.samples,
            Area::Errors => &self.errors,
        }
    }
}

/// Blob store over plain directories
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    dirs: AreaDirs,
}

impl FsBlobStore {
    /// Store over existing directories; nothing is created.
    pub fn new(dirs: AreaDirs) -> Self {
        Self { dirs }
    }

    /// Open the store, creating any missing area directory.
    pub async fn open(dirs: AreaDirs) -> StoreResult<Self> {
        for area in Area::ALL {
            let dir = dirs.dir(area);
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| StoreError::CreateDir {
                    path: dir.display().to_string(),
                    source,
                })?;
            tracing::debug!(area = %area, dir = %dir.display(), "area directory ready");
        }
        Ok(Self { dirs })
    }

    pub fn file_path(&self, path: &BlobPath) -> PathBuf {
        self.dirs.dir(path.area).join(&path.file)
    }
}

fn io_error(path: &Path, err: std::io::Error) -> CoreError {
    if err.kind() == ErrorKind::NotFound {
        CoreError::NotFound(path.display().to_string())
    } else {
        CoreError::Io(format!("{}: {}", path.display(), err))
    }
}

async fn append_file(file: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut handle = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .await?;
    handle.write_all(data).await?;
    handle.flush().await
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn exists(&self, path: &BlobPath) -> CoreResult<bool> {
        let file = self.file_path(path);
        match tokio::fs::metadata(&file).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&file, e)),
        }
    }

    async fn read(&self, path: &BlobPath) -> CoreResult<Vec<u8>> {
        let file = self.file_path(path);
        tokio::fs::read(&file).await.map_err(|e| io_error(&file, e))
    }

    async fn write(&self, path: &BlobPath, data: &[u8], mode: WriteMode) -> CoreResult<()> {
        let file = self.file_path(path);
        let result = match mode {
            WriteMode::Truncate => tokio::fs::write(&file, data).await,
            WriteMode::Append => append_file(&file, data).await,
        };
        result.map_err(|e| io_error(&file, e))?;
        tracing::debug!(file = %file.display(), bytes = data.len(), ?mode, "blob written");
        Ok(())
    }

    async fn remove(&self, path: &BlobPath) -> CoreResult<bool> {
        let file = self.file_path(path);
        match tokio::fs::remove_file(&file).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&file, e)),
        }
    }

    async fn list(&self, area: Area) -> CoreResult<Vec<String>> {
        let dir = self.dirs.dir(area);
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| io_error(dir, e))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(dir, e))? {
            let file_type = entry.file_type().await.map_err(|e| io_error(dir, e))?;
            if !file_type.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => {
                    tracing::warn!(dir = %dir.display(), name = ?raw, "skipping non UTF-8 file name");
                }
            }
        }
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_missing_dirs() {
        let tmp = tempdir().unwrap();
        let dirs = AreaDirs::under(tmp.path().join("nested"));
        let store = FsBlobStore::open(dirs.clone()).await.unwrap();
        for area in Area::ALL {
            assert!(dirs.dir(area).is_dir());
        }
        // Opening twice is fine
        FsBlobStore::open(dirs).await.unwrap();
        assert!(store.list(Area::Requests).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn open_fails_when_area_is_a_file() {
        let tmp = tempdir().unwrap();
        let dirs = AreaDirs::under(tmp.path());
        std::fs::write(tmp.path().join("samples"), b"not a dir").unwrap();
        let err = FsBlobStore::open(dirs).await.unwrap_err();
        assert!(matches!(err, StoreError::CreateDir { .. }));
    }

    #[tokio::test]
    async fn list_skips_directories() {
        let tmp = tempdir().unwrap();
        let store = FsBlobStore::open(AreaDirs::under(tmp.path())).await.unwrap();
        std::fs::create_dir(tmp.path().join("requests").join("nested.prm")).unwrap();
        std::fs::write(tmp.path().join("requests").join("a.prm"), b"{}").unwrap();
        assert_eq!(store.list(Area::Requests).await.unwrap(), vec!["a.prm".to_string()]);
    }
}
