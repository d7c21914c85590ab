//! Settings persistence: HTTP client for the settings service.
//!
//! Failures (non-2xx, transport errors) are caught, logged, and collapse to
//! `None` — callers must tolerate an absent settings record and proceed with
//! whatever defaults they already have. No retries.

use crate::error::{DojoError, DojoResult};
use crate::host::{log_user, HostUser};
use crate::types::UserSettings;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Header carrying the shared function access key.
pub const FUNCTIONS_KEY_HEADER: &str = "x-functions-key";

/// Seam between the controllers and the settings backend. The HTTP client is
/// the production implementation; [`MemorySettings`] backs tests and offline
/// demo runs.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Loads the user's persisted settings. `None` on any failure.
    async fn load(&self, user: &HostUser) -> Option<UserSettings>;

    /// Persists the record, returning the server's (possibly mutated) copy.
    async fn save(&self, settings: &UserSettings) -> Option<UserSettings>;
}

/// Client for the companion settings service.
pub struct HttpSettingsClient {
    endpoint: String,
    key: String,
    client: reqwest::Client,
}

impl HttpSettingsClient {
    pub fn new(endpoint: &str, key: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key: key.to_string(),
            client,
        }
    }

    async fn api_call<B, T>(&self, path: &str, body: &B) -> DojoResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.endpoint, path);
        let res = self
            .client
            .post(&url)
            .header(FUNCTIONS_KEY_HEADER, &self.key)
            .json(body)
            .send()
            .await
            .map_err(|e| DojoError::Settings(format!("error calling {url}: {e}")))?;

        if !res.status().is_success() {
            return Err(DojoError::Settings(format!(
                "{url} returned {}",
                res.status()
            )));
        }

        res.json::<T>()
            .await
            .map_err(|e| DojoError::Settings(format!("parsing {url} response: {e}")))
    }
}

#[async_trait]
impl SettingsStore for HttpSettingsClient {
    async fn load(&self, user: &HostUser) -> Option<UserSettings> {
        log_user(user, &format!("loading settings from {}", self.endpoint));
        let body = serde_json::json!({ "id": user.id });
        match self
            .api_call::<_, UserSettings>("/api/getusersettings", &body)
            .await
        {
            Ok(mut settings) => {
                // The service may not know a display name yet; fall back to
                // the session's.
                if settings.name.is_none() {
                    settings.name = Some(user.name.clone());
                }
                log_user(user, &format!("settings loaded: level {}", settings.level));
                Some(settings)
            }
            Err(e) => {
                warn!(target: "dojo::settings", user_id = %user.id, error = %e, "settings load failed");
                None
            }
        }
    }

    async fn save(&self, settings: &UserSettings) -> Option<UserSettings> {
        info!(target: "dojo::settings", user_id = %settings.id, "saving user settings");
        match self
            .api_call::<_, UserSettings>("/api/setusersettings", settings)
            .await
        {
            Ok(saved) => Some(saved),
            Err(e) => {
                warn!(target: "dojo::settings", user_id = %settings.id, error = %e, "settings save failed");
                None
            }
        }
    }
}

/// In-memory settings backend for tests and offline demos.
#[derive(Default)]
pub struct MemorySettings {
    records: DashMap<Uuid, UserSettings>,
    fail_all: bool,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a persisted record, as if saved in an earlier session.
    pub fn with_record(self, settings: UserSettings) -> Self {
        self.records.insert(settings.id, settings);
        self
    }

    /// Every load and save fails, as with an unreachable service.
    pub fn unreachable() -> Self {
        Self {
            records: DashMap::new(),
            fail_all: true,
        }
    }

    /// The currently persisted record for a user.
    pub fn record(&self, id: Uuid) -> Option<UserSettings> {
        self.records.get(&id).map(|r| r.clone())
    }
}

#[async_trait]
impl SettingsStore for MemorySettings {
    async fn load(&self, user: &HostUser) -> Option<UserSettings> {
        if self.fail_all {
            return None;
        }
        let mut settings = self
            .records
            .get(&user.id)
            .map(|r| r.clone())
            .unwrap_or_else(|| UserSettings::for_user(user.id, &user.name));
        if settings.name.is_none() {
            settings.name = Some(user.name.clone());
        }
        // First fetch creates the record.
        self.records.insert(user.id, settings.clone());
        Some(settings)
    }

    async fn save(&self, settings: &UserSettings) -> Option<UserSettings> {
        if self.fail_all {
            return None;
        }
        self.records.insert(settings.id, settings.clone());
        Some(settings.clone())
    }
}
