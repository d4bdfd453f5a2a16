//! Хранилище файла настроек (без базы)
//!
//! Файл каждый раз перезаписывается целиком: сначала во временный файл,
//! затем rename поверх старого.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

/// Где лежит JSON с настройками
pub trait PreferenceStorage: Send + Sync {
    /// `Ok(None)` если файла ещё нет
    fn read(&self) -> io::Result<Option<String>>;
    fn write(&self, content: &str) -> io::Result<()>;
    /// Сохранить нечитаемое содержимое рядом, прежде чем его перезапишут
    fn back_up(&self, content: &str) -> io::Result<()>;
}

/// settings.json на диске
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PreferenceStorage for JsonFileStorage {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, content: &str) -> io::Result<()> {
        atomic_write(&self.path, content)
    }

    fn back_up(&self, content: &str) -> io::Result<()> {
        let backup = self.path.with_extension("json.bak");
        atomic_write(&backup, content)?;
        info!("Saved unreadable settings to {}", backup.display());
        Ok(())
    }
}

fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    fs::create_dir_all(dir)?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, content)?;
    // Windows: rename поверх существующего может падать, поэтому сначала удаляем старый.
    if cfg!(windows) && path.exists() {
        let _ = fs::remove_file(path);
    }
    fs::rename(tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("settings.json"));
        assert_eq!(storage.read().unwrap(), None);
    }

    #[test]
    fn test_write_creates_parent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let storage = JsonFileStorage::new(&path);

        storage.write(r#"{"blocked":[1]}"#).unwrap();
        storage.write(r#"{"blocked":[]}"#).unwrap();

        assert_eq!(storage.read().unwrap().as_deref(), Some(r#"{"blocked":[]}"#));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_back_up_keeps_original_next_to_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let storage = JsonFileStorage::new(&path);

        storage.write("{broken").unwrap();
        storage.back_up("{broken").unwrap();
        storage.write("{}").unwrap();

        let backup = std::fs::read_to_string(dir.path().join("settings.json.bak")).unwrap();
        assert_eq!(backup, "{broken");
        assert_eq!(storage.read().unwrap().as_deref(), Some("{}"));
    }
}
