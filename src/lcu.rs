//! League Client (LCU) API
//!
//! Security model:
//! - The client serves HTTPS on 127.0.0.1 with a self-issued certificate.
//! - Only `LcuHttp` skips certificate validation, and it only ever talks to the
//!   discovered local address. Data Dragon uses its own validating client.
//! - Auth is HTTP Basic `riot:<token>` with the token from the client logs.
//!
//! The client may be closed at any moment; every read here degrades to
//! `None` (or `SessionOutcome::ConnectionLost`) instead of an error.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::defaults::BOT_DISPLAY_NAME;
use crate::endpoint::EndpointResolver;
use crate::error::LocalServiceError;
use crate::types::{ChampSelectSession, ConnectionDescriptor, RegionLocale, SessionOutcome, Summoner};

pub const CURRENT_SUMMONER_PATH: &str = "lol-summoner/v1/current-summoner";
pub const REGION_LOCALE_PATH: &str = "riotclient/region-locale";
pub const CHAMP_SELECT_SESSION_PATH: &str = "lol-champ-select/v1/session";

pub fn summoner_path(summoner_id: u64) -> String {
    format!("lol-summoner/v1/summoners/{}", summoner_id)
}

/// Raw GET against the local client. Returns the JSON body as is, error
/// payloads included; interpreting them is up to `SessionClient`.
#[async_trait]
pub trait LocalTransport: Send + Sync {
    async fn get(&self, endpoint: &ConnectionDescriptor, path: &str) -> Result<Value, LocalServiceError>;
}

/// reqwest transport that trusts the client's self-signed certificate
pub struct LcuHttp {
    http: reqwest::Client,
}

impl LcuHttp {
    pub fn new() -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .connect_timeout(Duration::from_secs(3))
            .build()?;
        Ok(Self { http })
    }
}

fn basic_auth_header(endpoint: &ConnectionDescriptor) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(endpoint.basic_credentials());
    format!("Basic {}", encoded)
}

#[async_trait]
impl LocalTransport for LcuHttp {
    async fn get(&self, endpoint: &ConnectionDescriptor, path: &str) -> Result<Value, LocalServiceError> {
        let url = format!("{}/{}", endpoint.base_url(), path.trim_start_matches('/'));

        let resp = self
            .http
            .get(url)
            .header("Authorization", basic_auth_header(endpoint))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| LocalServiceError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| LocalServiceError::Transport(e.to_string()))?;

        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Ok(value),
            // Ошибки LCU приходят JSON'ом; не-JSON с плохим статусом — просто статус
            Err(_) if !status.is_success() => Err(LocalServiceError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            }),
            Err(e) => Err(LocalServiceError::Decode(e.to_string())),
        }
    }
}

/// `{"errorCode": "...", "httpStatus": 404, "message": "..."}` → `ErrorPayload`
pub fn reject_error_payload(value: Value) -> Result<Value, LocalServiceError> {
    let Some(code) = value.get("errorCode") else {
        return Ok(value);
    };
    let code = match code {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let http_status = value
        .get("httpStatus")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok());
    Err(LocalServiceError::ErrorPayload {
        code,
        message,
        http_status,
    })
}

/// Reads live state from the local client
pub struct SessionClient {
    resolver: Arc<EndpointResolver>,
    transport: Arc<dyn LocalTransport>,
}

impl SessionClient {
    pub fn new(resolver: Arc<EndpointResolver>, transport: Arc<dyn LocalTransport>) -> Self {
        Self { resolver, transport }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, LocalServiceError> {
        let endpoint = self.resolver.resolve().await?;
        let value = reject_error_payload(self.transport.get(&endpoint, path).await?)?;
        serde_json::from_value(value).map_err(|e| LocalServiceError::Decode(e.to_string()))
    }

    fn log_soft_failure(what: &str, err: &LocalServiceError) {
        if err.is_connection_failure() {
            // Клиент не запущен — нормальная ситуация
            debug!("{}: League client unavailable: {}", what, err);
        } else {
            warn!("{}: {}", what, err);
        }
    }

    pub async fn current_identity(&self) -> Option<Summoner> {
        match self.get_json::<Summoner>(CURRENT_SUMMONER_PATH).await {
            Ok(summoner) => Some(summoner),
            Err(e) => {
                Self::log_soft_failure("current summoner", &e);
                None
            }
        }
    }

    pub async fn current_locale(&self) -> Option<RegionLocale> {
        match self.get_json::<RegionLocale>(REGION_LOCALE_PATH).await {
            Ok(locale) => Some(locale),
            Err(e) => {
                Self::log_soft_failure("region locale", &e);
                None
            }
        }
    }

    /// Display name for one roster entry; id 0 is a bot and is never looked up.
    /// No caching: every call asks the client again.
    pub async fn summoner_display_name(&self, summoner_id: u64) -> Result<Option<String>, LocalServiceError> {
        if summoner_id == 0 {
            return Ok(Some(BOT_DISPLAY_NAME.to_string()));
        }
        match self.get_json::<Summoner>(&summoner_path(summoner_id)).await {
            Ok(summoner) => Ok(summoner.display_name),
            Err(e @ (LocalServiceError::ErrorPayload { .. } | LocalServiceError::Decode(_))) => {
                debug!("No summoner {}: {}", summoner_id, e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_session(&self) -> Result<ChampSelectSession, LocalServiceError> {
        let mut session: ChampSelectSession = self.get_json(CHAMP_SELECT_SESSION_PATH).await?;
        if let Some(team) = session.my_team.as_mut() {
            for member in team.iter_mut() {
                let Some(summoner_id) = member.summoner_id() else {
                    debug!("Roster entry without summonerId, no displayName");
                    continue;
                };
                member.display_name = self.summoner_display_name(summoner_id).await?;
            }
        }
        Ok(session)
    }

    /// Champ select session with `displayName` filled for `myTeam`.
    pub async fn current_session(&self) -> SessionOutcome {
        match self.fetch_session().await {
            Ok(session) => SessionOutcome::Active(session),
            // Клиент ответил, просто не тем: сессии нет, но связь жива
            Err(e @ (LocalServiceError::ErrorPayload { .. } | LocalServiceError::Decode(_))) => {
                debug!("No champ select session: {}", e);
                SessionOutcome::Unavailable
            }
            Err(e) => {
                warn!("Session lost: {}", e);
                SessionOutcome::ConnectionLost
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub(crate) enum Reply {
        Json(Value),
        Down,
    }

    /// In-memory LCU: canned replies per path, records every request
    #[derive(Default)]
    pub(crate) struct FakeLcu {
        replies: Mutex<HashMap<String, Reply>>,
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl FakeLcu {
        pub(crate) fn reply(self, path: &str, body: Value) -> Self {
            self.replies.lock().unwrap().insert(path.to_string(), Reply::Json(body));
            self
        }

        pub(crate) fn down(self, path: &str) -> Self {
            self.replies.lock().unwrap().insert(path.to_string(), Reply::Down);
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LocalTransport for FakeLcu {
        async fn get(&self, _endpoint: &ConnectionDescriptor, path: &str) -> Result<Value, LocalServiceError> {
            self.calls.lock().unwrap().push(path.to_string());
            match self.replies.lock().unwrap().get(path) {
                Some(Reply::Json(v)) => Ok(v.clone()),
                Some(Reply::Down) | None => Err(LocalServiceError::Transport("connection refused".into())),
            }
        }
    }

    pub(crate) fn error_payload() -> Value {
        json!({ "errorCode": "RPC_ERROR", "httpStatus": 404, "implementationDetails": {}, "message": "No active delegate" })
    }

    fn client(fake: FakeLcu) -> (SessionClient, Arc<FakeLcu>) {
        let fake = Arc::new(fake);
        let resolver = Arc::new(EndpointResolver::with_descriptor(ConnectionDescriptor::new(
            "127.0.0.1",
            9002,
            "xyz789",
        )));
        (SessionClient::new(resolver, fake.clone()), fake)
    }

    #[test]
    fn test_basic_auth_header() {
        let d = ConnectionDescriptor::new("127.0.0.1", 9002, "xyz789");
        // base64("riot:xyz789")
        assert_eq!(basic_auth_header(&d), "Basic cmlvdDp4eXo3ODk=");
    }

    #[test]
    fn test_reject_error_payload() {
        match reject_error_payload(error_payload()) {
            Err(LocalServiceError::ErrorPayload { code, message, http_status }) => {
                assert_eq!(code, "RPC_ERROR");
                assert_eq!(message, "No active delegate");
                assert_eq!(http_status, Some(404));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert!(reject_error_payload(json!({ "locale": "en_US" })).is_ok());
        assert!(reject_error_payload(json!("plain string")).is_ok());
    }

    #[tokio::test]
    async fn test_identity() {
        let (c, _) = client(FakeLcu::default().reply(
            CURRENT_SUMMONER_PATH,
            json!({ "displayName": "Faker", "summonerId": 42, "puuid": "p-1" }),
        ));
        let me = c.current_identity().await.unwrap();
        assert_eq!(me.display_name.as_deref(), Some("Faker"));
        assert_eq!(me.summoner_id, Some(42));
        assert_eq!(me.extra["puuid"], "p-1");
    }

    #[tokio::test]
    async fn test_identity_is_none_when_client_is_gone() {
        let (c, _) = client(FakeLcu::default().down(CURRENT_SUMMONER_PATH));
        assert!(c.current_identity().await.is_none());
    }

    #[tokio::test]
    async fn test_identity_without_logs_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = Arc::new(EndpointResolver::new(dir.path()));
        let fake = Arc::new(FakeLcu::default());
        let c = SessionClient::new(resolver, fake.clone());

        assert!(c.current_identity().await.is_none());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_locale_error_payload_is_none() {
        let (c, _) = client(FakeLcu::default().reply(REGION_LOCALE_PATH, error_payload()));
        assert!(c.current_locale().await.is_none());

        let (c, _) = client(FakeLcu::default().reply(
            REGION_LOCALE_PATH,
            json!({ "locale": "fr_FR", "region": "EUW", "webLanguage": "fr" }),
        ));
        let locale = c.current_locale().await.unwrap();
        assert_eq!(locale.region.as_deref(), Some("EUW"));
        assert_eq!(locale.extra["webLanguage"], "fr");
    }

    #[tokio::test]
    async fn test_session_enriches_team_and_bots_skip_lookup() {
        let (c, fake) = client(
            FakeLcu::default()
                .reply(
                    CHAMP_SELECT_SESSION_PATH,
                    json!({
                        "myTeam": [
                            { "summonerId": 0, "cellId": 0 },
                            { "summonerId": 77, "cellId": 1 },
                            { "summonerId": 88, "cellId": 2 }
                        ],
                        "theirTeam": []
                    }),
                )
                .reply(&summoner_path(77), json!({ "displayName": "Alice", "summonerId": 77 }))
                .reply(&summoner_path(88), error_payload()),
        );

        let session = c.current_session().await.into_session().unwrap();
        let team = session.my_team.unwrap();
        assert_eq!(team[0].display_name.as_deref(), Some("Bot"));
        assert_eq!(team[1].display_name.as_deref(), Some("Alice"));
        assert_eq!(team[2].display_name, None);
        assert_eq!(team[1].extra["cellId"], 1);

        let calls = fake.calls();
        assert_eq!(
            calls,
            vec![
                CHAMP_SELECT_SESSION_PATH.to_string(),
                summoner_path(77),
                summoner_path(88),
            ]
        );
        assert!(!calls.contains(&summoner_path(0)));
    }

    #[tokio::test]
    async fn test_lookups_are_not_memoized() {
        let (c, fake) = client(
            FakeLcu::default()
                .reply(CHAMP_SELECT_SESSION_PATH, json!({ "myTeam": [{ "summonerId": 5 }] }))
                .reply(&summoner_path(5), json!({ "displayName": "Bob" })),
        );
        c.current_session().await;
        c.current_session().await;
        let lookups = fake.calls().iter().filter(|p| **p == summoner_path(5)).count();
        assert_eq!(lookups, 2);
    }

    #[tokio::test]
    async fn test_session_error_payload_is_unavailable() {
        let (c, fake) = client(FakeLcu::default().reply(CHAMP_SELECT_SESSION_PATH, error_payload()));
        assert_eq!(c.current_session().await, SessionOutcome::Unavailable);
        assert_eq!(fake.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_members_without_id_are_left_alone() {
        let (c, fake) = client(
            FakeLcu::default()
                .reply(
                    CHAMP_SELECT_SESSION_PATH,
                    json!({ "myTeam": [
                        { "cellId": 0, "puuid": "p" },
                        { "summonerId": null },
                        { "summonerId": 5 }
                    ] }),
                )
                .reply(&summoner_path(5), json!({ "displayName": "Eve" })),
        );

        let session = c.current_session().await.into_session().unwrap();
        let team = serde_json::to_value(session.my_team.unwrap()).unwrap();
        assert_eq!(team[0], json!({ "cellId": 0, "puuid": "p" }));
        assert_eq!(team[1], json!({ "summonerId": null }));
        assert_eq!(team[2]["displayName"], "Eve");
        assert_eq!(fake.calls(), vec![CHAMP_SELECT_SESSION_PATH.to_string(), summoner_path(5)]);
    }

    #[tokio::test]
    async fn test_session_of_unexpected_shape_is_unavailable() {
        let (c, _) = client(FakeLcu::default().reply(CHAMP_SELECT_SESSION_PATH, json!({ "myTeam": "nope" })));
        assert_eq!(c.current_session().await, SessionOutcome::Unavailable);
    }

    #[tokio::test]
    async fn test_session_lost_mid_enrichment() {
        let (c, _) = client(
            FakeLcu::default()
                .reply(CHAMP_SELECT_SESSION_PATH, json!({ "myTeam": [{ "summonerId": 9 }] }))
                .down(&summoner_path(9)),
        );
        assert_eq!(c.current_session().await, SessionOutcome::ConnectionLost);
    }

    #[tokio::test]
    async fn test_session_without_client_is_lost() {
        let (c, _) = client(FakeLcu::default().down(CHAMP_SELECT_SESSION_PATH));
        assert_eq!(c.current_session().await, SessionOutcome::ConnectionLost);
    }
}
