//! Типы данных LCU Companion
//!
//! Структуры ответов LCU и Data Dragon, а также события для UI.
//! Ответы клиента мы не типизируем целиком: известные поля разбираются,
//! всё остальное сохраняется в `extra` и уходит в UI как есть.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Адрес и учётные данные локального API клиента
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    pub host: String,
    pub port: u16,
    /// remoting-auth-token из логов
    pub token: String,
}

impl ConnectionDescriptor {
    pub fn new(host: impl Into<String>, port: u16, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            token: token.into(),
        }
    }

    /// Форма, в которой клиент пишет адрес в лог: `riot:<token>@<host>:<port>`
    pub fn address(&self) -> String {
        format!("riot:{}@{}:{}", self.token, self.host, self.port)
    }

    pub fn base_url(&self) -> String {
        format!("https://{}:{}", self.host, self.port)
    }

    /// Логин всегда `riot`, пароль — токен
    pub fn basic_credentials(&self) -> String {
        format!("riot:{}", self.token)
    }
}

// Токен не должен попадать в логи целиком.
impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Чемпион из champion.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    pub id: String,
    /// Числовой ключ чемпиона (строкой, как в Data Dragon)
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Текущий призыватель (lol-summoner/v1/current-summoner, lol-summoner/v1/summoners/{id})
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summoner {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summoner_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// riotclient/region-locale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionLocale {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Участник своей команды в выборе чемпионов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    /// Заполняется нами при обогащении
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Поля клиента как есть, включая `summonerId`
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TeamMember {
    /// `summonerId`, если клиент прислал целое число (0 у ботов)
    pub fn summoner_id(&self) -> Option<u64> {
        self.extra.get("summonerId").and_then(Value::as_u64)
    }
}

/// lol-champ-select/v1/session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChampSelectSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_team: Option<Vec<TeamMember>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Результат запроса сессии выбора чемпионов.
///
/// `Unavailable` — клиент на месте, но сессии нет (ответ с errorCode).
/// `ConnectionLost` — клиент пропал посреди запроса.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Active(ChampSelectSession),
    Unavailable,
    ConnectionLost,
}

impl SessionOutcome {
    pub fn into_session(self) -> Option<ChampSelectSession> {
        match self {
            Self::Active(session) => Some(session),
            Self::Unavailable | Self::ConnectionLost => None,
        }
    }
}

/// События, которые отправляются в UI без запроса
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum CompanionEvent {
    /// Клиент League пропал во время запроса сессии
    ClientLost,
}
