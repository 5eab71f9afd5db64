use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::repository::{default_data_dir, FileStorage};

const CONFIG_FILE_NAME: &str = "config.json";

/// When mutations reach storage.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PersistMode {
    /// Rewrite the whole collection after every mutation.
    WriteThrough,
    /// Only mark the store dirty; the owner calls `flush`.
    WriteBehind,
}

impl Default for PersistMode {
    fn default() -> Self {
        PersistMode::WriteThrough
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: Option<PathBuf>,
    pub persist: PersistMode,
}

impl StoreConfig {
    /// Reads `<data_dir>/config.json`. A missing or malformed file yields defaults.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE_NAME);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str::<StoreConfig>(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                Self::default()
            }
        }
    }

    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    pub fn open_storage(&self) -> Result<FileStorage> {
        FileStorage::new(Some(self.resolve_data_dir()?))
    }
}
