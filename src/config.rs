//! Runtime configuration.

use crate::metadata;
use failure::{format_err, Fallible};
use serde_derive::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings from the optional TOML configuration file.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub data_dir: PathBuf,
    pub catalog_file: String,
    pub lifecycle_file: String,
    pub lifecycle_url: String,
    pub descriptors_url: String,
    pub http_timeout_secs: u64,
    /// Extra identifier translations, on top of the built-in table.
    pub translations: HashMap<String, String>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            catalog_file: "os-release.json".to_string(),
            lifecycle_file: "eol.json".to_string(),
            lifecycle_url: metadata::LIFECYCLE_JSON.to_string(),
            descriptors_url: metadata::DESCRIPTORS_TARBALL.to_string(),
            http_timeout_secs: 30,
            translations: HashMap::new(),
        }
    }
}

impl FileConfig {
    /// Read configuration from `path`, or use defaults if none is given.
    pub fn read(path: Option<&Path>) -> Fallible<Self> {
        let path = match path {
            Some(p) => p,
            None => return Ok(Self::default()),
        };
        let content = fs::read_to_string(path)
            .map_err(|e| format_err!("failed to read {}: {}", path.display(), e))?;
        Self::parse(&content).map_err(|e| format_err!("failed to parse {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> Fallible<Self> {
        let cfg: Self = toml::from_str(content)?;
        if cfg.http_timeout_secs == 0 {
            return Err(format_err!("http_timeout_secs must be positive"));
        }
        Ok(cfg)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(&self.catalog_file)
    }

    pub fn lifecycle_path(&self) -> PathBuf {
        self.data_dir.join(&self.lifecycle_file)
    }
}
