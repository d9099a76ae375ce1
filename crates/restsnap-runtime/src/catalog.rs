use restsnap_core::{BlobKind, CaseName};

use crate::error::RuntimeResult;
use crate::storage::Storage;

/// Discovers test cases from the spec files in the requests area
#[derive(Debug, Clone)]
pub struct CaseCatalog {
    storage: Storage,
}

impl CaseCatalog {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Case names sorted ascending by byte order.
    ///
    /// Only files whose terminal extension is the spec suffix are cases, so
    /// `a.prm.bak` is ignored and `a.prm.b.prm` yields `a.prm.b`.
    pub async fn list_cases(&self) -> RuntimeResult<Vec<CaseName>> {
        let mut names = self.storage.list_names(BlobKind::Spec).await?;
        names.sort();
        names.dedup();
        tracing::debug!(count = names.len(), "discovered cases");
        Ok(names)
    }
}
