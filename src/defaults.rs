//! Значения по умолчанию для сборок без .env.
//!
//! NOTE: всё можно переопределить переменными окружения, см. `config.rs`.

/// Каталог логов клиента при стандартной установке
pub const LOG_DIR: &str = "C:/Riot Games/League of Legends/Logs/LeagueClient Logs";

pub const DDRAGON_BASE_URL: &str = "https://ddragon.leagueoflegends.com";
pub const DDRAGON_LOCALE: &str = "en_US";

/// Подкаталог в data_local_dir() для settings.json
pub const APP_DIR_NAME: &str = "lcu-companion";
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// Ник для участников без summonerId (боты)
pub const BOT_DISPLAY_NAME: &str = "Bot";
