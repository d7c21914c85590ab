//! Coach avatar app.
//!
//! Scripted demo session: join, prompt, play a spoken greeting, leave.

mod app;

use app::CoachApp;
use dojo_common::{AppConfig, AppDriver, HostEvent, HostUser, HttpSettingsClient, SimHost};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    info!(
        target: "dojo::coach",
        speech_endpoint = %config.speech_endpoint,
        "starting dojo-coach"
    );

    let host = Arc::new(SimHost::new());
    let settings = Arc::new(HttpSettingsClient::new(
        &config.settings_endpoint,
        &config.settings_key,
    ));
    let app = CoachApp::new(&config.speech_endpoint, &config.speech_code);
    let driver = AppDriver::new(app, host.clone(), settings);

    let (tx, rx) = mpsc::channel(32);
    let running = tokio::spawn(driver.run(rx));

    let user = HostUser::new("Demo Student");
    for event in [
        HostEvent::Started,
        HostEvent::UserJoined(user.clone()),
        HostEvent::ButtonClicked {
            user: user.clone(),
            button: "promptUser".into(),
        },
        HostEvent::ButtonClicked {
            user: user.clone(),
            button: "playAudio".into(),
        },
        HostEvent::UserLeft(user.clone()),
    ] {
        let _ = tx.send(event).await;
    }
    drop(tx);

    let _ = running.await;
    info!(target: "dojo::coach", "demo session finished");
}
