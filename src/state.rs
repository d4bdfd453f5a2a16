//! Глобальное состояние LCU Companion
//!
//! Держит резолвер адреса клиента, кэш Data Dragon, клиент LCU и настройки,
//! а также канал событий для UI.

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};
use tokio::sync::{broadcast, RwLock};

use crate::catalog::{CatalogSource, DataCache, DataDragon};
use crate::config::CompanionConfig;
use crate::defaults;
use crate::endpoint::EndpointResolver;
use crate::lcu::{LcuHttp, LocalTransport, SessionClient};
use crate::persistence::{JsonFileStorage, PreferenceStorage};
use crate::preferences::PreferenceStore;
use crate::types::CompanionEvent;

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Глобальное состояние приложения
pub struct AppState {
    /// Адрес LCU (ищется один раз)
    pub endpoint: Arc<EndpointResolver>,
    /// Версия и чемпионы Data Dragon
    pub data: DataCache,
    /// Запросы к клиенту
    pub lcu: SessionClient,
    /// blocked / liked и прочие настройки
    pub preferences: RwLock<PreferenceStore>,
    events: broadcast::Sender<CompanionEvent>,
}

impl AppState {
    pub fn new(
        endpoint: Arc<EndpointResolver>,
        catalog: Arc<dyn CatalogSource>,
        transport: Arc<dyn LocalTransport>,
        preferences: PreferenceStore,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            lcu: SessionClient::new(endpoint.clone(), transport),
            endpoint,
            data: DataCache::new(catalog),
            preferences: RwLock::new(preferences),
            events,
        }
    }

    /// Боевая сборка: логи с диска, Data Dragon, LCU по HTTPS, settings.json
    pub fn from_config(cfg: &CompanionConfig) -> reqwest::Result<Self> {
        let settings_path = cfg
            .settings_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(defaults::SETTINGS_FILE_NAME));
        info!("Settings file: {}", settings_path.display());
        info!("Client logs: {}", cfg.log_dir.display());

        let storage: Box<dyn PreferenceStorage> = Box::new(JsonFileStorage::new(settings_path));
        Ok(Self::new(
            Arc::new(EndpointResolver::new(cfg.log_dir.clone())),
            Arc::new(DataDragon::from_config(cfg)?),
            Arc::new(LcuHttp::new()?),
            PreferenceStore::load_or_default(storage),
        ))
    }

    /// Подписка на события (clientLost и т.п.)
    pub fn subscribe(&self) -> broadcast::Receiver<CompanionEvent> {
        self.events.subscribe()
    }

    pub fn emit(&self, event: CompanionEvent) {
        // Нет подписчиков — некому и сообщать
        if self.events.send(event.clone()).is_err() {
            debug!("No listeners for {:?}", event);
        }
    }
}
