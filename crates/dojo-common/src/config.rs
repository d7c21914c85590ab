//! App-side configuration from the environment.
//!
//! The binaries load `.env` first (dotenvy), then read these variables. Unset
//! values fall back to the local development endpoints.

/// Endpoints and access keys for the companion services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Settings service base URL. `X_SETTINGS_SVC_WEB`.
    pub settings_endpoint: String,
    /// Shared function access key for the settings service. `X_SETTINGS_SVC_CODE`.
    pub settings_key: String,
    /// Speech service base URL. `X_SPEECH_SVC_WEB`.
    pub speech_endpoint: String,
    /// Shared function access key for the speech service. `X_SPEECH_SVC_CODE`.
    pub speech_code: String,
}

impl AppConfig {
    /// Reads the configuration from environment variables, defaulting to the
    /// local settings endpoint used in debug runs.
    pub fn from_env() -> Self {
        Self {
            settings_endpoint: env_string("X_SETTINGS_SVC_WEB", "http://localhost:7071"),
            settings_key: env_string("X_SETTINGS_SVC_CODE", ""),
            speech_endpoint: env_string("X_SPEECH_SVC_WEB", "http://localhost:7072"),
            speech_code: env_string("X_SPEECH_SVC_CODE", ""),
        }
    }
}

fn env_string(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}
