//! Companion settings service.
//!
//! Serves per-user settings records over HTTP, backed by a sled table on
//! disk. Configuration comes from `config/settings-svc.toml` and the
//! `DOJO_SETTINGS_*` environment, in that order.

mod routes;
mod store;

use routes::AppState;
use serde::Deserialize;
use std::sync::Arc;
use store::SettingsTable;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct SvcConfig {
    port: u16,
    storage_path: String,
    function_key: String,
}

impl SvcConfig {
    fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("port", 7071)?
            .set_default("storage_path", "./data/dojo_settings")?
            .set_default("function_key", "")?
            .add_source(config::File::with_name("config/settings-svc").required(false))
            .add_source(config::Environment::with_prefix("DOJO_SETTINGS"))
            .build()?
            .try_deserialize()
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match SvcConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(target: "dojo::settings_svc", error = %e, "configuration error");
            std::process::exit(1);
        }
    };
    if config.function_key.is_empty() {
        warn!(target: "dojo::settings_svc", "no function key configured, auth disabled");
    }

    let table = match SettingsTable::open(&config.storage_path) {
        Ok(table) => table,
        Err(e) => {
            error!(
                target: "dojo::settings_svc",
                path = %config.storage_path,
                error = %e,
                "failed to open settings storage"
            );
            std::process::exit(1);
        }
    };
    info!(
        target: "dojo::settings_svc",
        path = %config.storage_path,
        records = table.len(),
        "settings table open"
    );

    let state = AppState {
        table: Arc::new(table),
        function_key: config.function_key,
    };
    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(target: "dojo::settings_svc", addr = %addr, error = %e, "bind failed");
            std::process::exit(1);
        }
    };
    info!(target: "dojo::settings_svc", addr = %addr, "settings service listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(target: "dojo::settings_svc", error = %e, "server error");
    }
}
