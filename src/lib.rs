//! LCU Companion Library
//!
//! Ядро помощника для выбора чемпионов League of Legends: поиск клиента по
//! логам, запросы к его локальному API, кэш Data Dragon и настройки игрока.

pub mod types;
pub mod error;
pub mod config;
pub mod defaults;
pub mod log_parser;
pub mod log_scanner;
pub mod endpoint;
pub mod catalog;
pub mod lcu;
pub mod persistence;
pub mod preferences;
pub mod state;
pub mod commands;

pub use types::*;
pub use config::CompanionConfig;
pub use endpoint::EndpointResolver;
pub use catalog::DataCache;
pub use lcu::SessionClient;
pub use preferences::PreferenceStore;
pub use state::AppState;
