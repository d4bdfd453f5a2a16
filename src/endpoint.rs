//! Адрес локального API клиента, найденный один раз за время жизни процесса.
//!
//! Если клиент перезапустится с новым токеном, сохранённый адрес устареет:
//! восстановиться можно только перезапуском компаньона.

use std::path::PathBuf;
use log::debug;
use tokio::sync::OnceCell;

use crate::error::DiscoveryError;
use crate::log_scanner;
use crate::types::ConnectionDescriptor;

pub struct EndpointResolver {
    log_dir: PathBuf,
    descriptor: OnceCell<ConnectionDescriptor>,
}

impl EndpointResolver {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            descriptor: OnceCell::new(),
        }
    }

    /// Резолвер с заранее известным адресом (без сканирования логов)
    pub fn with_descriptor(descriptor: ConnectionDescriptor) -> Self {
        Self {
            log_dir: PathBuf::new(),
            descriptor: OnceCell::new_with(Some(descriptor)),
        }
    }

    /// Сканирует логи при первом успешном вызове, дальше отдаёт сохранённое.
    /// Одновременные первые вызовы ждут одно и то же сканирование;
    /// неудачное сканирование не запоминается.
    pub async fn resolve(&self) -> Result<ConnectionDescriptor, DiscoveryError> {
        self.descriptor
            .get_or_try_init(|| async {
                debug!("Resolving LCU endpoint from {}", self.log_dir.display());
                log_scanner::discover_endpoint(&self.log_dir)
            })
            .await
            .cloned()
    }

    pub fn peek(&self) -> Option<&ConnectionDescriptor> {
        self.descriptor.get()
    }
}
