use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use crate::repository::traits::KeyValueStorage;

pub const DEFAULT_DIR_NAME: &str = ".tasklist";

/// Stores each key as `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let dir = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        Ok(FileStorage { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(anyhow!("Invalid storage key: '{}'", key));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
    Ok(home_dir.join(DEFAULT_DIR_NAME))
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Write a sibling file first so a failed write never truncates the old value.
        let tmp_path = path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)
                .with_context(|| format!("Failed to create {}", tmp_path.display()))?;
            let mut writer = BufWriter::new(file);
            writer.write_all(value.as_bytes())?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        debug!(key, bytes = value.len(), "wrote storage key");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_key_is_none() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(storage.get("todos").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(Some(dir.path().to_path_buf())).unwrap();
        storage.set("todos", "[]").unwrap();
        storage.set("todos", "[1]").unwrap();
        assert_eq!(storage.get("todos").unwrap().as_deref(), Some("[1]"));
        assert!(dir.path().join("todos.json").exists());
        assert!(!dir.path().join("todos.json.tmp").exists());
    }

    #[test]
    fn test_creates_nested_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::new(Some(nested.clone())).unwrap();
        assert_eq!(storage.dir(), nested.as_path());
        assert!(nested.is_dir());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(Some(dir.path().to_path_buf())).unwrap();
        assert!(storage.set("../escape", "x").is_err());
        assert!(storage.get("").is_err());
        assert!(storage.get(".hidden").is_err());
    }
}
