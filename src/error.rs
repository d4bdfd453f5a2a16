//! Ошибки ядра компаньона.
//!
//! Ошибки локального клиента (LCU) всегда гасятся до `None` на границе команд,
//! ошибки Data Dragon пробрасываются наверх, чтобы вызывающий мог повторить запрос.

use std::path::PathBuf;
use thiserror::Error;

/// Не удалось найти запущенный клиент по логам.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("cannot read log directory {}: {}", .path.display(), .source)]
    LogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no LeagueClientUx log found in {}", .0.display())]
    NoLogFile(PathBuf),
    #[error("cannot read log file {}: {}", .path.display(), .source)]
    ReadLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no LCU credentials found in {}", .0.display())]
    NoCredentials(PathBuf),
}

/// Запрос к Data Dragon (версии/каталог) не удался.
#[derive(Debug, Error)]
pub enum RemoteFetchError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog service answered {status} for {url}")]
    Status { status: u16, url: String },
    #[error("malformed catalog response: {0}")]
    Malformed(String),
}

/// Ошибка обращения к локальному API клиента.
#[derive(Debug, Error)]
pub enum LocalServiceError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error("LCU request failed: {0}")]
    Transport(String),
    #[error("LCU answered {status} for {path}")]
    Status { status: u16, path: String },
    #[error("LCU error payload {code}: {message}")]
    ErrorPayload {
        code: String,
        message: String,
        http_status: Option<u16>,
    },
    #[error("cannot decode LCU response: {0}")]
    Decode(String),
}

impl LocalServiceError {
    /// Клиент пропал (или не был найден), а не просто ответил ошибкой.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Discovery(_) | Self::Transport(_))
    }
}

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid setting {key}: {reason}")]
    InvalidSetting { key: String, reason: &'static str },
    #[error("settings file could not be loaded, refusing to overwrite it")]
    Unreadable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failures_are_told_apart_from_payload_errors() {
        let lost = LocalServiceError::Transport("connection refused".into());
        assert!(lost.is_connection_failure());

        let missing = LocalServiceError::from(DiscoveryError::NoLogFile(PathBuf::from("logs")));
        assert!(missing.is_connection_failure());

        let payload = LocalServiceError::ErrorPayload {
            code: "RPC_ERROR".into(),
            message: "No active delegate".into(),
            http_status: Some(404),
        };
        assert!(!payload.is_connection_failure());
        assert!(!LocalServiceError::Decode("eof".into()).is_connection_failure());
    }
}
