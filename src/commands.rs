//! Команды для UI
//!
//! UI шлёт JSON-запрос `{"op": "...", ...}` и получает в ответ значение или
//! `null`. Каждая команда только делегирует в нужный компонент.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{PreferencesError, RemoteFetchError};
use crate::preferences::{PreferenceId, PreferencesSnapshot};
use crate::state::AppState;
use crate::types::{ChampSelectSession, Champion, CompanionEvent, RegionLocale, SessionOutcome, Summoner};

/// Запрос от UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Request {
    FetchEntityCatalog,
    FetchIdentity,
    FetchLocale,
    FetchLatestVersion,
    FetchSession,
    FetchPreferences,
    ToggleBlocked { id: PreferenceId },
    ToggleLiked { id: PreferenceId },
    UpdateSetting { key: String, value: Value },
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchEntityCatalog => "fetchEntityCatalog",
            Self::FetchIdentity => "fetchIdentity",
            Self::FetchLocale => "fetchLocale",
            Self::FetchLatestVersion => "fetchLatestVersion",
            Self::FetchSession => "fetchSession",
            Self::FetchPreferences => "fetchPreferences",
            Self::ToggleBlocked { .. } => "toggleBlocked",
            Self::ToggleLiked { .. } => "toggleLiked",
            Self::UpdateSetting { .. } => "updateSetting",
        }
    }
}

/// Ответ на один запрос
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub op: &'static str,
    pub result: Value,
}

/// Все чемпионы последней версии
pub async fn fetch_entity_catalog(state: &AppState) -> Result<Vec<Champion>, RemoteFetchError> {
    state.data.ensure_catalog().await
}

/// Текущий призыватель (None если клиент не запущен)
pub async fn fetch_identity(state: &AppState) -> Option<Summoner> {
    state.lcu.current_identity().await
}

pub async fn fetch_locale(state: &AppState) -> Option<RegionLocale> {
    state.lcu.current_locale().await
}

pub async fn fetch_latest_version(state: &AppState) -> Result<String, RemoteFetchError> {
    state.data.ensure_latest_version().await
}

/// Сессия выбора чемпионов. Если клиент пропал — `None` и событие `clientLost`.
pub async fn fetch_session(state: &AppState) -> Option<ChampSelectSession> {
    match state.lcu.current_session().await {
        SessionOutcome::Active(session) => Some(session),
        SessionOutcome::Unavailable => None,
        SessionOutcome::ConnectionLost => {
            info!("League client lost during session fetch");
            state.emit(CompanionEvent::ClientLost);
            None
        }
    }
}

pub async fn fetch_preferences(state: &AppState) -> PreferencesSnapshot {
    state.preferences.read().await.snapshot()
}

pub async fn toggle_blocked(state: &AppState, id: PreferenceId) -> Result<PreferencesSnapshot, PreferencesError> {
    let mut prefs = state.preferences.write().await;
    prefs.toggle_blocked(id)?;
    Ok(prefs.snapshot())
}

pub async fn toggle_liked(state: &AppState, id: PreferenceId) -> Result<PreferencesSnapshot, PreferencesError> {
    let mut prefs = state.preferences.write().await;
    prefs.toggle_liked(id)?;
    Ok(prefs.snapshot())
}

pub async fn update_setting(
    state: &AppState,
    key: &str,
    value: Value,
) -> Result<PreferencesSnapshot, PreferencesError> {
    let mut prefs = state.preferences.write().await;
    prefs.update(key, value)?;
    Ok(prefs.snapshot())
}

fn to_value<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or_else(|e| {
        warn!("Failed to serialize response: {}", e);
        Value::Null
    })
}

fn or_null<T: Serialize, E: std::fmt::Display>(op: &str, result: Result<T, E>) -> Value {
    match result {
        Ok(v) => to_value(v),
        Err(e) => {
            warn!("{} failed: {}", op, e);
            Value::Null
        }
    }
}

/// Выполнить запрос; любая неудача превращается в `null`
pub async fn dispatch(state: &AppState, request: Request) -> Response {
    let op = request.name();
    debug!("Handling {}", op);

    let result = match request {
        Request::FetchEntityCatalog => or_null(op, fetch_entity_catalog(state).await),
        Request::FetchIdentity => to_value(fetch_identity(state).await),
        Request::FetchLocale => to_value(fetch_locale(state).await),
        Request::FetchLatestVersion => or_null(op, fetch_latest_version(state).await),
        Request::FetchSession => to_value(fetch_session(state).await),
        Request::FetchPreferences => to_value(fetch_preferences(state).await),
        Request::ToggleBlocked { id } => or_null(op, toggle_blocked(state, id).await),
        Request::ToggleLiked { id } => or_null(op, toggle_liked(state, id).await),
        Request::UpdateSetting { key, value } => or_null(op, update_setting(state, &key, value).await),
    };
    Response { op, result }
}

/// Одна строка протокола: разобрать запрос и вернуть строку ответа.
/// Кривой запрос даёт `{"error": ...}`, а не падение.
pub async fn handle_line(state: &AppState, line: &str) -> Value {
    match serde_json::from_str::<Request>(line) {
        Ok(request) => to_value(dispatch(state, request).await),
        Err(e) => {
            warn!("Bad request {:?}: {}", line, e);
            json!({ "error": format!("invalid request: {}", e) })
        }
    }
}
