//! Data Dragon (versions + champion catalog)
//!
//! - `versions.json`: published versions, newest first
//! - `cdn/<version>/data/<locale>/champion.json`: champions keyed by id
//!
//! Both are fetched once per process and kept forever. A new patch released
//! while the companion runs is only picked up after a restart.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::info;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::OnceCell;

use crate::config::CompanionConfig;
use crate::error::RemoteFetchError;
use crate::types::Champion;

/// Source of versioned game data
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Published versions, newest first
    async fn fetch_versions(&self) -> Result<Vec<String>, RemoteFetchError>;
    async fn fetch_champions(&self, version: &str) -> Result<Vec<Champion>, RemoteFetchError>;
}

#[derive(Debug, Deserialize)]
struct ChampionFile {
    data: BTreeMap<String, Champion>,
}

/// Public Data Dragon over regular (validated) HTTPS
pub struct DataDragon {
    http: reqwest::Client,
    base_url: String,
    locale: String,
}

impl DataDragon {
    pub fn new(base_url: impl Into<String>, locale: impl Into<String>) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            locale: locale.into(),
        })
    }

    pub fn from_config(cfg: &CompanionConfig) -> reqwest::Result<Self> {
        Self::new(cfg.ddragon_base_url.clone(), cfg.ddragon_locale.clone())
    }

    pub fn versions_url(&self) -> String {
        format!("{}/api/versions.json", self.base_url)
    }

    pub fn champions_url(&self, version: &str) -> String {
        format!("{}/cdn/{}/data/{}/champion.json", self.base_url, version, self.locale)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, RemoteFetchError> {
        let resp = self.http.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(RemoteFetchError::Status {
                status: resp.status().as_u16(),
                url,
            });
        }

        let body = resp.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| RemoteFetchError::Malformed(format!("{url}: {e}")))
    }
}

#[async_trait]
impl CatalogSource for DataDragon {
    async fn fetch_versions(&self) -> Result<Vec<String>, RemoteFetchError> {
        self.get_json(self.versions_url()).await
    }

    async fn fetch_champions(&self, version: &str) -> Result<Vec<Champion>, RemoteFetchError> {
        let file: ChampionFile = self.get_json(self.champions_url(version)).await?;
        Ok(file.data.into_values().collect())
    }
}

/// Cached latest version + champion catalog.
///
/// Each slot is filled by at most one in-flight fetch; concurrent callers wait
/// for it. A failed fetch leaves the slot empty so the next call retries.
pub struct DataCache {
    source: Arc<dyn CatalogSource>,
    version: OnceCell<String>,
    champions: OnceCell<Vec<Champion>>,
}

impl DataCache {
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            version: OnceCell::new(),
            champions: OnceCell::new(),
        }
    }

    pub async fn ensure_latest_version(&self) -> Result<String, RemoteFetchError> {
        self.version
            .get_or_try_init(|| async {
                let versions = self.source.fetch_versions().await?;
                let latest = versions
                    .into_iter()
                    .next()
                    .ok_or_else(|| RemoteFetchError::Malformed("empty version list".to_string()))?;
                info!("Latest Data Dragon version: {}", latest);
                Ok(latest)
            })
            .await
            .cloned()
    }

    pub async fn ensure_catalog(&self) -> Result<Vec<Champion>, RemoteFetchError> {
        if let Some(champions) = self.champions.get() {
            return Ok(champions.clone());
        }

        let version = self.ensure_latest_version().await?;
        self.champions
            .get_or_try_init(|| async {
                let champions = self.source.fetch_champions(&version).await?;
                if champions.is_empty() {
                    return Err(RemoteFetchError::Malformed(format!(
                        "champion catalog for {version} is empty"
                    )));
                }
                info!("Loaded {} champions for {}", champions.len(), version);
                Ok(champions)
            })
            .await
            .cloned()
    }

    pub fn cached_version(&self) -> Option<&str> {
        self.version.get().map(String::as_str)
    }

    pub fn cached_catalog_len(&self) -> usize {
        self.champions.get().map(Vec::len).unwrap_or(0)
    }
}
