use crate::error::{ConfigError, ConfigResult};
use restsnap_core::{SuffixLayout, TextEncoding};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Supported file formats for configuration
#[derive(Debug, Clone, PartialEq)]
pub enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    /// Detect file format from extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Ok(FileFormat::Toml),
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }
}

/// How samples are compared against captures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonMode {
    /// Status/header subset check, then exact body check
    #[default]
    Full,
    /// Exact body check only; no status/header record is written or read
    BodyOnly,
}

/// Area directories as they appear in a config file; every entry is optional
/// so the command line can fill the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirsSection {
    pub requests: Option<PathBuf>,
    pub responses: Option<PathBuf>,
    pub samples: Option<PathBuf>,
    pub errors: Option<PathBuf>,
}

/// On-disk configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub dirs: DirsSection,
    pub layout: SuffixLayout,
    pub encoding: Option<TextEncoding>,
    pub timeout_secs: Option<u64>,
    pub mode: Option<ComparisonMode>,
}

impl ConfigFile {
    /// Load a config file. Relative directories are resolved against the
    /// directory containing the file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let format = FileFormat::from_path(path)?;
        let mut config = Self::parse_content(&content, format)?;

        if let Some(base) = path.parent() {
            config.dirs.rebase(base);
        }

        tracing::info!("Loaded configuration from: {:?}", path);
        Ok(config)
    }

    /// Parse configuration content directly
    pub fn parse_content(content: &str, format: FileFormat) -> ConfigResult<Self> {
        let config = match format {
            FileFormat::Toml => toml::from_str(content)?,
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        };
        Ok(config)
    }
}

impl DirsSection {
    fn rebase(&mut self, base: &Path) {
        for dir in [
            &mut self.requests,
            &mut self.responses,
            &mut self.samples,
            &mut self.errors,
        ]
        .into_iter()
        .flatten()
        {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(FileFormat::from_path("a.toml").unwrap(), FileFormat::Toml);
        assert_eq!(FileFormat::from_path("a.yml").unwrap(), FileFormat::Yaml);
        assert_eq!(FileFormat::from_path("a.json").unwrap(), FileFormat::Json);
        assert!(matches!(
            FileFormat::from_path("a.ini"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn parses_yaml_with_partial_layout() {
        let yaml = r#"
dirs:
  requests: /data/requests
encoding: latin-1
mode: body-only
layout:
  spec: json
"#;
        let config = ConfigFile::parse_content(yaml, FileFormat::Yaml).unwrap();
        assert_eq!(config.dirs.requests, Some(PathBuf::from("/data/requests")));
        assert_eq!(config.encoding, Some(TextEncoding::Latin1));
        assert_eq!(config.mode, Some(ComparisonMode::BodyOnly));
        assert_eq!(config.layout.spec, "json");
        assert_eq!(config.layout.sample_meta, "snh");
    }

    #[test]
    fn rejects_unknown_encoding() {
        let err = ConfigFile::parse_content(r#"{"encoding": "koi8-r"}"#, FileFormat::Json)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn load_resolves_relative_dirs_against_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[dirs]\nsamples = \"golden\"\nerrors = \"/abs/errors\"").unwrap();
        let config = ConfigFile::load(file.path()).unwrap();
        let base = file.path().parent().unwrap();
        assert_eq!(config.dirs.samples, Some(base.join("golden")));
        assert_eq!(config.dirs.errors, Some(PathBuf::from("/abs/errors")));
    }
}
