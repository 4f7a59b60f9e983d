//! Cache configuration — root directory and storage format.
//!
//! Configuration is an explicit object handed to [`crate::DataCache`] at
//! construction, so one process can run several independently configured
//! caches. A TOML file form is supported for persistent user settings.

use crate::error::DataError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Storage format shared by all datasets in one cache.
///
/// The format is a cache-wide setting, not chosen per dataset: an artifact
/// written as `csv` will not be found by a cache configured for `feather`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Delimited text. Dtypes are re-inferred on read; the index designation
    /// is restored from the metadata record.
    Csv,
    /// Row-oriented binary serialization (bincode). Preserves dtypes and the
    /// index designation natively.
    Pkl,
    /// Columnar Arrow IPC. The index designation is flattened on write and
    /// restored from the metadata record.
    Feather,
}

impl FileFormat {
    /// File extension used for artifact paths.
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Pkl => "pkl",
            FileFormat::Feather => "feather",
        }
    }

    /// Whether artifacts in this format need the index designation restored
    /// from the metadata record on load. `pkl` carries it in the artifact.
    pub fn restores_index(self) -> bool {
        matches!(self, FileFormat::Csv | FileFormat::Feather)
    }
}

impl FromStr for FileFormat {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(FileFormat::Csv),
            "pkl" => Ok(FileFormat::Pkl),
            "feather" => Ok(FileFormat::Feather),
            other => Err(DataError::Config(format!(
                "unsupported file format '{other}' (expected csv, pkl, or feather)"
            ))),
        }
    }
}

/// Configuration for one cache instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Root directory holding artifacts and `metadata.json`. Created on
    /// first use if absent.
    pub cache_dir: PathBuf,
    /// Storage format for every artifact in this cache.
    pub format: FileFormat,
}

impl CacheConfig {
    pub fn new(cache_dir: impl Into<PathBuf>, format: FileFormat) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            format,
        }
    }

    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DataError::Config(format!("read config file: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, DataError> {
        toml::from_str(content).map_err(|e| DataError::Config(format!("parse config TOML: {e}")))
    }

    /// Serialize the config to TOML.
    pub fn to_toml(&self) -> Result<String, DataError> {
        toml::to_string_pretty(self)
            .map_err(|e| DataError::Config(format!("serialize config: {e}")))
    }
}

impl Default for CacheConfig {
    /// `~/.datashed/data` with csv artifacts. Falls back to a relative
    /// `.datashed/data` when the home directory cannot be determined.
    fn default() -> Self {
        let base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            cache_dir: base.join(".datashed").join("data"),
            format: FileFormat::Csv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_mapping() {
        assert_eq!(FileFormat::Csv.extension(), "csv");
        assert_eq!(FileFormat::Pkl.extension(), "pkl");
        assert_eq!(FileFormat::Feather.extension(), "feather");
    }

    #[test]
    fn index_restoration_flags() {
        assert!(FileFormat::Csv.restores_index());
        assert!(FileFormat::Feather.restores_index());
        assert!(!FileFormat::Pkl.restores_index());
    }

    #[test]
    fn format_from_str() {
        assert_eq!("feather".parse::<FileFormat>().unwrap(), FileFormat::Feather);
        assert!("parquet".parse::<FileFormat>().is_err());
    }

    #[test]
    fn toml_roundtrip() {
        let config = CacheConfig::new("/tmp/datashed", FileFormat::Pkl);
        let toml_str = config.to_toml().unwrap();
        let parsed = CacheConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed.cache_dir, config.cache_dir);
        assert_eq!(parsed.format, FileFormat::Pkl);
    }

    #[test]
    fn unknown_format_in_toml_is_config_error() {
        let toml_str = "cache_dir = \"/tmp/x\"\nformat = \"xlsx\"\n";
        assert!(CacheConfig::from_toml(toml_str).is_err());
    }
}
