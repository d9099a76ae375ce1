//! List command for discovered cases

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{CliError, CliResult};
use restsnap_config::ConfigFile;
use restsnap_core::CaseName;
use restsnap_runtime::{CaseCatalog, Storage};
use restsnap_store::{AreaDirs, FsBlobStore};
use tracing::debug;

pub struct ListCommand;

impl ListCommand {
    pub async fn run(requests: Option<PathBuf>, config: Option<PathBuf>) -> CliResult<()> {
        for name in Self::cases(requests, config.as_deref()).await? {
            println!("{}", name);
        }
        Ok(())
    }

    /// Case names in the order `run` would execute them
    pub async fn cases(requests: Option<PathBuf>, config: Option<&Path>) -> CliResult<Vec<CaseName>> {
        let file = match config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        let requests = requests.or(file.dirs.requests).ok_or_else(|| {
            CliError::InvalidArgument("a requests directory is required (--requests)".to_string())
        })?;
        debug!("Listing cases in {}", requests.display());

        // Only the requests area is read, and nothing is created
        let dirs = AreaDirs::new(&requests, &requests, &requests, &requests);
        let storage = Storage::new(
            Arc::new(FsBlobStore::new(dirs)),
            file.layout,
            file.encoding.unwrap_or_default(),
        );
        Ok(CaseCatalog::new(storage).list_cases().await?)
    }
}
