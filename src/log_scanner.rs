//! Поиск логов LeagueClientUx и извлечение адреса LCU
//!
//! Лог-файлы клиент называет по времени запуска
//! (`2024-01-05T18-22-10_12345_LeagueClientUx.log`), поэтому самый свежий —
//! последний по алфавиту. Каталог логов только читаем.

use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, info, warn};

use crate::error::DiscoveryError;
use crate::log_parser::CredentialParser;
use crate::types::ConnectionDescriptor;

/// Подстрока имени нужных лог-файлов
pub const LOG_FILE_MARKER: &str = "LeagueClientUx.log";

/// Найти самый свежий лог LeagueClientUx в каталоге
pub fn find_latest_log(log_dir: &Path) -> Result<PathBuf, DiscoveryError> {
    let entries = fs::read_dir(log_dir).map_err(|source| DiscoveryError::LogDir {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let latest = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.contains(LOG_FILE_MARKER))
        .max();

    match latest {
        Some(name) => Ok(log_dir.join(name)),
        None => Err(DiscoveryError::NoLogFile(log_dir.to_path_buf())),
    }
}

/// Найти адрес и токен запущенного клиента по его логам
pub fn discover_endpoint(log_dir: &Path) -> Result<ConnectionDescriptor, DiscoveryError> {
    let path = find_latest_log(log_dir)?;
    info!("Scanning client log: {}", path.display());

    let bytes = fs::read(&path).map_err(|source| DiscoveryError::ReadLog {
        path: path.clone(),
        source,
    })?;
    // В логах встречается не-UTF8 мусор, он нам не мешает
    let text = String::from_utf8_lossy(&bytes);
    debug!("Read {} bytes from {}", bytes.len(), path.display());

    match CredentialParser::new().parse(&text) {
        Some(found) => {
            info!("Found League client API at {}", found);
            Ok(found)
        }
        None => {
            warn!("No LCU credentials in {}", path.display());
            Err(DiscoveryError::NoCredentials(path))
        }
    }
}
