//! Azure Cognitive Services text-to-speech client.
//!
//! One POST to the region's `cognitiveservices/v1` endpoint with an SSML body
//! returns the synthesized audio as MP3 bytes.

use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const OUTPUT_FORMAT: &str = "audio-16khz-128kbitrate-mono-mp3";
const VOICE_NAME: &str = "en-US-JennyNeural";

pub type TtsResult<T> = Result<T, TtsError>;

#[derive(Error, Debug)]
pub enum TtsError {
    #[error("speech request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("speech service returned {0}")]
    Status(reqwest::StatusCode),
}

pub struct SpeechSynthesizer {
    key: String,
    endpoint: String,
    client: reqwest::Client,
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&apos;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

pub fn ssml_for(text: &str) -> String {
    format!(
        concat!(
            "<speak version='1.0' xml:lang='en-US'>",
            "<voice xml:lang='en-US' name='{voice}'>{text}</voice>",
            "</speak>"
        ),
        voice = VOICE_NAME,
        text = escape_xml(text)
    )
}

impl SpeechSynthesizer {
    pub fn new(key: &str, region: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            key: key.to_string(),
            endpoint: format!("https://{region}.tts.speech.microsoft.com/cognitiveservices/v1"),
            client,
        }
    }

    /// Synthesizes `text` and returns the MP3 bytes.
    pub async fn synthesize(&self, text: &str) -> TtsResult<Vec<u8>> {
        debug!(target: "dojo::speech_svc", chars = text.len(), "synthesizing speech");
        let response = self
            .client
            .post(&self.endpoint)
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Content-Type", "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", OUTPUT_FORMAT)
            .body(ssml_for(text))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TtsError::Status(response.status()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
