//! Coach controller: interactive prompts and text-to-speech playback.
//!
//! `playAudio` builds a personalized greeting, turns it into a speech-service
//! URI, and asks the host to create and start the sound. The synthesis itself
//! is the speech service's job.

use async_trait::async_trait;
use chrono::Local;
use dojo_common::{log_user, AppContext, AssetLoader, HostUser, Menu, OutfitApp, Vec3};
use tracing::warn;

const MENU_ANCHOR_X: f32 = 4.0;
const MENU_ANCHOR_Y: f32 = 2.5;

pub struct CoachApp {
    speech_endpoint: String,
    speech_code: String,
}

impl CoachApp {
    pub fn new(speech_endpoint: &str, speech_code: &str) -> Self {
        Self {
            speech_endpoint: speech_endpoint.trim_end_matches('/').to_string(),
            speech_code: speech_code.to_string(),
        }
    }

    /// URI the host will stream the spoken message from.
    fn speech_uri(&self, text: &str) -> Option<String> {
        let base = format!("{}/api/ConvertTextToSpeech", self.speech_endpoint);
        match reqwest::Url::parse_with_params(
            &base,
            &[("code", self.speech_code.as_str()), ("text", text)],
        ) {
            Ok(url) => Some(url.into()),
            Err(e) => {
                warn!(target: "dojo::coach", error = %e, "speech URI build failed");
                None
            }
        }
    }

    async fn play_user_message(&self, cx: &AppContext, user: &HostUser, message: &str) {
        let Some(uri) = self.speech_uri(message) else {
            return;
        };
        log_user(user, &format!("playing sound from: {uri}"));
        match cx.host.play_sound(&uri).await {
            Ok(()) => log_user(user, "audio complete"),
            Err(e) => {
                warn!(target: "dojo::coach", user_id = %user.id, error = %e, "audio playback failed");
            }
        }
    }
}

#[async_trait]
impl OutfitApp for CoachApp {
    fn name(&self) -> &str {
        "dojo-coach"
    }

    async fn preload(&self, _assets: &AssetLoader) {
        // Nothing to preload; the coach only prompts and plays audio.
    }

    fn build_menu(&self) -> Menu {
        Menu::new("Coach")
            .button(
                "promptUser",
                "User Prompt",
                Vec3::new(MENU_ANCHOR_X, MENU_ANCHOR_Y - 0.5, 0.0),
            )
            .button(
                "playAudio",
                "Play Audio",
                Vec3::new(MENU_ANCHOR_X, MENU_ANCHOR_Y - 1.0, 0.0),
            )
    }

    async fn init_session(&self, _cx: &AppContext, user: &HostUser) {
        log_user(user, "coach session ready");
    }

    async fn close_session(&self, _cx: &AppContext, _user: &HostUser) {}

    async fn on_button(&self, cx: &AppContext, user: &HostUser, button: &str) {
        match button {
            "promptUser" => {
                log_user(user, "prompting user");
                let response = cx.host.prompt(user, "Question?", true).await;
                let acknowledgment = match response {
                    Some(text) => format!("We received: {text}"),
                    None => "No response submitted".to_string(),
                };
                cx.host.prompt(user, &acknowledgment, false).await;
            }
            "playAudio" => {
                let message = format!(
                    "Hello {} you have activated audio on {}",
                    user.name,
                    Local::now().format("%Y-%m-%d %H:%M:%S")
                );
                self.play_user_message(cx, user, &message).await;
            }
            other => {
                warn!(target: "dojo::coach", button = other, "unknown button");
            }
        }
    }
}
