//! HTTP surface of the speech service.
//!
//! A single function-style route turns text into audio. The text arrives as a
//! `text` query parameter or a JSON body; the query parameter wins when both
//! are present.

use crate::tts::SpeechSynthesizer;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use dojo_common::FUNCTIONS_KEY_HEADER;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub synth: Arc<SpeechSynthesizer>,
    pub function_key: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/ConvertTextToSpeech",
            get(convert_text_to_speech).post(convert_text_to_speech),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn authorized(
    expected: &str,
    headers: &HeaderMap,
    params: &HashMap<String, String>,
) -> bool {
    if expected.is_empty() {
        return true;
    }
    let header_key = headers
        .get(FUNCTIONS_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    header_key == Some(expected) || params.get("code").map(String::as_str) == Some(expected)
}

#[derive(Debug, Deserialize)]
pub struct SpeechRequest {
    pub text: Option<String>,
}

/// Query parameter first, JSON body second. Blank text counts as missing.
pub fn extract_text(
    params: &HashMap<String, String>,
    body: Option<&SpeechRequest>,
) -> Option<String> {
    params
        .get("text")
        .cloned()
        .or_else(|| body.and_then(|b| b.text.clone()))
        .filter(|t| !t.trim().is_empty())
}

async fn convert_text_to_speech(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Option<Json<SpeechRequest>>,
) -> Response {
    if !authorized(&state.function_key, &headers, &params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Some(text) = extract_text(&params, body.as_deref()) else {
        return (StatusCode::BAD_REQUEST, "missing text").into_response();
    };

    match state.synth.synthesize(&text).await {
        Ok(audio) => {
            info!(target: "dojo::speech_svc", bytes = audio.len(), "speech synthesized");
            let filename = format!("{}.mp3", Uuid::new_v4());
            (
                [
                    (header::CONTENT_TYPE, "audio/mpeg".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename={filename}"),
                    ),
                ],
                audio,
            )
                .into_response()
        }
        Err(e) => {
            warn!(target: "dojo::speech_svc", error = %e, "speech synthesis failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(function_key: &str) -> Router {
        let state = AppState {
            synth: Arc::new(SpeechSynthesizer::new("test-key", "westus")),
            function_key: function_key.to_string(),
        };
        router(state)
    }

    #[test]
    fn query_text_wins_over_the_body() {
        let params = HashMap::from([("text".to_string(), "from query".to_string())]);
        let body = SpeechRequest {
            text: Some("from body".to_string()),
        };
        assert_eq!(
            extract_text(&params, Some(&body)).as_deref(),
            Some("from query")
        );
    }

    #[test]
    fn body_text_is_used_when_the_query_has_none() {
        let body = SpeechRequest {
            text: Some("from body".to_string()),
        };
        assert_eq!(
            extract_text(&HashMap::new(), Some(&body)).as_deref(),
            Some("from body")
        );
    }

    #[test]
    fn blank_text_counts_as_missing() {
        let params = HashMap::from([("text".to_string(), "   ".to_string())]);
        assert_eq!(extract_text(&params, None), None);
    }

    #[tokio::test]
    async fn missing_text_is_a_bad_request() {
        let response = app("")
            .oneshot(
                Request::get("/api/ConvertTextToSpeech")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_function_key_is_unauthorized() {
        let response = app("secret")
            .oneshot(
                Request::get("/api/ConvertTextToSpeech?text=hello&code=wrong")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
