//! Runtime configuration
//!
//! Env overrides (a `.env` next to the binary is honoured via dotenvy):
//! - LCU_LOG_DIR
//! - DDRAGON_BASE_URL
//! - DDRAGON_LOCALE
//! - LCU_SETTINGS_PATH

use std::path::PathBuf;

use crate::defaults;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionConfig {
    pub log_dir: PathBuf,
    pub ddragon_base_url: String,
    pub ddragon_locale: String,
    /// None when there is no per-user data directory on this platform
    pub settings_path: Option<PathBuf>,
}

impl CompanionConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_dir = non_empty("LCU_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(defaults::LOG_DIR));
        let ddragon_base_url = non_empty("DDRAGON_BASE_URL")
            .unwrap_or_else(|| defaults::DDRAGON_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let ddragon_locale =
            non_empty("DDRAGON_LOCALE").unwrap_or_else(|| defaults::DDRAGON_LOCALE.to_string());
        let settings_path = non_empty("LCU_SETTINGS_PATH")
            .map(PathBuf::from)
            .or_else(default_settings_path);

        Self {
            log_dir,
            ddragon_base_url,
            ddragon_locale,
            settings_path,
        }
    }
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(defaults::APP_DIR_NAME).join(defaults::SETTINGS_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_env() {
        let cfg = CompanionConfig::default();
        assert_eq!(cfg.log_dir, PathBuf::from(defaults::LOG_DIR));
        assert_eq!(cfg.ddragon_base_url, defaults::DDRAGON_BASE_URL);
        assert_eq!(cfg.ddragon_locale, "en_US");
        assert_eq!(cfg.settings_path, default_settings_path());
    }

    #[test]
    fn test_env_overrides_and_trailing_slash() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("LCU_LOG_DIR", "/tmp/lcu-logs"),
            ("DDRAGON_BASE_URL", "http://localhost:8080/"),
            ("DDRAGON_LOCALE", "fr_FR"),
            ("LCU_SETTINGS_PATH", "/tmp/prefs.json"),
        ]);
        let cfg = CompanionConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.log_dir, PathBuf::from("/tmp/lcu-logs"));
        assert_eq!(cfg.ddragon_base_url, "http://localhost:8080");
        assert_eq!(cfg.ddragon_locale, "fr_FR");
        assert_eq!(cfg.settings_path, Some(PathBuf::from("/tmp/prefs.json")));
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let cfg = CompanionConfig::from_lookup(|k| (k == "DDRAGON_LOCALE").then(|| "  ".to_string()));
        assert_eq!(cfg.ddragon_locale, "en_US");
    }
}
