//! Настройки пользователя: заблокированные и отмеченные призыватели.
//!
//! В памяти это множества (порядок не важен, дублей нет), на диске и в
//! ответах UI — отсортированные массивы. Каждое изменение сразу пишется на диск.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::PreferencesError;
use crate::persistence::PreferenceStorage;

/// Id в списках blocked/liked: любое скалярное JSON-значение.
/// Обычно это число, но строки и дроби из файла сохраняются как есть.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct PreferenceId(Value);

impl TryFrom<Value> for PreferenceId {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(_) | Value::Object(_) => Err(format!("id must be a scalar, got {}", value)),
            scalar => Ok(Self(scalar)),
        }
    }
}

impl From<PreferenceId> for Value {
    fn from(id: PreferenceId) -> Self {
        id.0
    }
}

impl From<u64> for PreferenceId {
    fn from(id: u64) -> Self {
        Self(Value::from(id))
    }
}

impl From<&str> for PreferenceId {
    fn from(id: &str) -> Self {
        Self(Value::from(id))
    }
}

impl std::fmt::Display for PreferenceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// null < bool < число < строка; числа по значению, целое раньше равной дроби
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) | Value::Object(_) => 4,
    }
}

fn cmp_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x.cmp(&y);
    }
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x.cmp(&y);
    }
    let (x, y) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
    x.partial_cmp(&y)
        .unwrap_or_else(|| x.total_cmp(&y))
        .then_with(|| a.is_f64().cmp(&b.is_f64()))
}

impl Ord for PreferenceId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => cmp_numbers(a, b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (a, b) => type_rank(a).cmp(&type_rank(b)),
        }
    }
}

impl PartialOrd for PreferenceId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Множество id. Сериализуется массивом, дубли при чтении схлопываются.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdSet(BTreeSet<PreferenceId>);

impl IdSet {
    pub fn contains(&self, id: &PreferenceId) -> bool {
        self.0.contains(id)
    }

    /// Есть — убрать, нет — добавить. Возвращает новое членство.
    pub fn toggle(&mut self, id: PreferenceId) -> bool {
        if self.0.remove(&id) {
            false
        } else {
            self.0.insert(id);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<PreferenceId> {
        self.0.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceList {
    Blocked,
    Liked,
}

impl PreferenceList {
    pub fn key(self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::Liked => "liked",
        }
    }
}

/// Содержимое settings.json
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub blocked: IdSet,
    #[serde(default)]
    pub liked: IdSet,
    /// Прочие скалярные настройки UI
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl Preferences {
    fn list_mut(&mut self, list: PreferenceList) -> &mut IdSet {
        match list {
            PreferenceList::Blocked => &mut self.blocked,
            PreferenceList::Liked => &mut self.liked,
        }
    }
}

/// То, что уходит в UI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferencesSnapshot {
    pub blocked: Vec<PreferenceId>,
    pub liked: Vec<PreferenceId>,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

pub struct PreferenceStore {
    storage: Box<dyn PreferenceStorage>,
    prefs: Preferences,
    /// Файл не удалось прочитать и сохранить копию: не трогаем его
    read_only: bool,
}

impl PreferenceStore {
    /// Прочитать настройки; если файла нет — создать пустой и сразу записать.
    pub fn load(storage: Box<dyn PreferenceStorage>) -> Result<Self, PreferencesError> {
        let prefs = match storage.read()? {
            Some(data) => parse_preferences(&data)?,
            None => create_empty(storage.as_ref())?,
        };
        Ok(Self {
            storage,
            prefs,
            read_only: false,
        })
    }

    /// Как `load`, но плохой файл не мешает старту: работаем с пустыми
    /// настройками. Нечитаемое содержимое сначала копируется в резервный
    /// файл; если и это не вышло, файл больше не перезаписывается.
    pub fn load_or_default(storage: Box<dyn PreferenceStorage>) -> Self {
        let mut read_only = false;
        let prefs = match storage.read() {
            Ok(Some(data)) => parse_preferences(&data).unwrap_or_else(|e| {
                match storage.back_up(&data) {
                    Ok(()) => warn!("Settings file is invalid ({}), saved a backup and starting empty", e),
                    Err(backup_err) => {
                        warn!(
                            "Settings file is invalid ({}) and could not be backed up ({}); it will not be overwritten",
                            e, backup_err
                        );
                        read_only = true;
                    }
                }
                Preferences::default()
            }),
            Ok(None) => create_empty(storage.as_ref()).unwrap_or_else(|e| {
                warn!("Failed to create settings file: {}", e);
                Preferences::default()
            }),
            Err(e) => {
                warn!("Cannot read settings file ({}); it will not be overwritten", e);
                read_only = true;
                Preferences::default()
            }
        };
        Self {
            storage,
            prefs,
            read_only,
        }
    }

    fn persist(&self) -> Result<(), PreferencesError> {
        if self.read_only {
            return Err(PreferencesError::Unreadable);
        }
        let json = serde_json::to_string(&self.prefs)?;
        self.storage.write(&json)?;
        Ok(())
    }

    /// Переключить id в списке и сохранить. Если запись не удалась,
    /// изменение откатывается.
    pub fn toggle(&mut self, list: PreferenceList, id: PreferenceId) -> Result<bool, PreferencesError> {
        let now_member = self.prefs.list_mut(list).toggle(id.clone());
        if let Err(e) = self.persist() {
            self.prefs.list_mut(list).toggle(id);
            return Err(e);
        }
        debug!("{} {}: {}", list.key(), id, if now_member { "added" } else { "removed" });
        Ok(now_member)
    }

    pub fn toggle_blocked(&mut self, id: PreferenceId) -> Result<bool, PreferencesError> {
        self.toggle(PreferenceList::Blocked, id)
    }

    pub fn toggle_liked(&mut self, id: PreferenceId) -> Result<bool, PreferencesError> {
        self.toggle(PreferenceList::Liked, id)
    }

    /// Перезаписать скалярную настройку и сохранить
    pub fn update(&mut self, key: &str, value: Value) -> Result<(), PreferencesError> {
        if key == PreferenceList::Blocked.key() || key == PreferenceList::Liked.key() {
            return Err(PreferencesError::InvalidSetting {
                key: key.to_string(),
                reason: "use the toggle operations for id lists",
            });
        }
        if value.is_array() || value.is_object() {
            return Err(PreferencesError::InvalidSetting {
                key: key.to_string(),
                reason: "only scalar values are supported",
            });
        }

        let previous = self.prefs.settings.insert(key.to_string(), value);
        if let Err(e) = self.persist() {
            match previous {
                Some(old) => self.prefs.settings.insert(key.to_string(), old),
                None => self.prefs.settings.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn snapshot(&self) -> PreferencesSnapshot {
        PreferencesSnapshot {
            blocked: self.prefs.blocked.to_vec(),
            liked: self.prefs.liked.to_vec(),
            settings: self.prefs.settings.clone(),
        }
    }
}

fn parse_preferences(data: &str) -> Result<Preferences, PreferencesError> {
    let prefs: Preferences = serde_json::from_str(data)?;
    debug!(
        "Loaded preferences: {} blocked, {} liked",
        prefs.blocked.len(),
        prefs.liked.len()
    );
    Ok(prefs)
}

fn create_empty(storage: &dyn PreferenceStorage) -> Result<Preferences, PreferencesError> {
    info!("No settings file yet, creating an empty one");
    let prefs = Preferences::default();
    storage.write(&serde_json::to_string(&prefs)?)?;
    Ok(prefs)
}
