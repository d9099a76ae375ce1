use crate::error::{ConfigError, ConfigResult};
use crate::loader::{ComparisonMode, ConfigFile};
use restsnap_core::{SuffixLayout, TextEncoding};
use restsnap_store::AreaDirs;
use std::path::PathBuf;
use std::time::Duration;

/// Values supplied on the command line; they win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub requests: Option<PathBuf>,
    pub responses: Option<PathBuf>,
    pub samples: Option<PathBuf>,
    pub errors: Option<PathBuf>,
    pub encoding: Option<TextEncoding>,
    pub timeout_secs: Option<u64>,
    pub body_only: bool,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub dirs: AreaDirs,
    pub layout: SuffixLayout,
    pub encoding: TextEncoding,
    /// Per-request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    pub mode: ComparisonMode,
}

impl RunConfig {
    /// Defaults for everything except the directories.
    pub fn new(dirs: AreaDirs) -> Self {
        Self {
            dirs,
            layout: SuffixLayout::default(),
            encoding: TextEncoding::default(),
            timeout: None,
            mode: ComparisonMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ComparisonMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Merge an optional config file with command-line overrides.
    pub fn resolve(file: Option<ConfigFile>, overrides: ConfigOverrides) -> ConfigResult<Self> {
        let file = file.unwrap_or_default();

        let pick = |cli: Option<PathBuf>, from_file: Option<PathBuf>, field: &str| {
            cli.or(from_file)
                .ok_or_else(|| ConfigError::MissingField(format!("{} directory", field)))
        };
        let dirs = AreaDirs {
            requests: pick(overrides.requests, file.dirs.requests, "requests")?,
            responses: pick(overrides.responses, file.dirs.responses, "responses")?,
            samples: pick(overrides.samples, file.dirs.samples, "samples")?,
            errors: pick(overrides.errors, file.dirs.errors, "errors")?,
        };

        let timeout_secs = overrides.timeout_secs.or(file.timeout_secs);
        if timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        let mode = if overrides.body_only {
            ComparisonMode::BodyOnly
        } else {
            file.mode.unwrap_or_default()
        };

        let config = Self {
            dirs,
            layout: file.layout,
            encoding: overrides.encoding.or(file.encoding).unwrap_or_default(),
            timeout: timeout_secs.map(Duration::from_secs),
            mode,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.layout.validate()?;
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Validation("timeout must be greater than zero".to_string()));
        }
        Ok(())
    }
}
