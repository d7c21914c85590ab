//! Speech service.
//!
//! Wraps Azure Cognitive Services text-to-speech behind a single HTTP route.
//! The Azure credentials keep their original `SPEECH_SERVICES_*` names; the
//! service's own settings come from `config/speech-svc.toml` and the
//! `DOJO_SPEECH_*` environment.

mod routes;
mod tts;

use routes::AppState;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use tts::SpeechSynthesizer;

#[derive(Debug, Deserialize)]
struct SvcConfig {
    port: u16,
    function_key: String,
}

impl SvcConfig {
    fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("port", 7072)?
            .set_default("function_key", "")?
            .add_source(config::File::with_name("config/speech-svc").required(false))
            .add_source(config::Environment::with_prefix("DOJO_SPEECH"))
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
            error!(target: "dojo::speech_svc", error = %e, "configuration error");
            std::process::exit(1);
        }
    };
    if config.function_key.is_empty() {
        warn!(target: "dojo::speech_svc", "no function key configured, auth disabled");
    }

    let speech_key = std::env::var("SPEECH_SERVICES_KEY").unwrap_or_default();
    let speech_region =
        std::env::var("SPEECH_SERVICES_REGION").unwrap_or_else(|_| "westus".to_string());
    if speech_key.is_empty() {
        warn!(
            target: "dojo::speech_svc",
            "SPEECH_SERVICES_KEY not set, synthesis requests will fail"
        );
    }

    let state = AppState {
        synth: Arc::new(SpeechSynthesizer::new(&speech_key, &speech_region)),
        function_key: config.function_key,
    };
    let app = routes::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(target: "dojo::speech_svc", addr = %addr, error = %e, "bind failed");
            std::process::exit(1);
        }
    };
    info!(
        target: "dojo::speech_svc",
        addr = %addr,
        region = %speech_region,
        "speech service listening"
    );

    if let Err(e) = axum::serve(listener, app).await {
        error!(target: "dojo::speech_svc", error = %e, "server error");
    }
}
