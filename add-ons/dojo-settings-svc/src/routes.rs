//! HTTP surface of the settings service.
//!
//! All routes live under `/api`. Callers authenticate with the shared function
//! key, either in the `x-functions-key` header or a `code` query parameter. An
//! empty configured key disables the check for local runs.

use crate::store::SettingsTable;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dojo_common::{UserSettings, FUNCTIONS_KEY_HEADER};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub table: Arc<SettingsTable>,
    pub function_key: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/echo", get(echo).post(echo))
        .route("/api/usersettings", post(echo))
        .route("/api/getusersettings", post(get_user_settings))
        .route("/api/setusersettings", post(set_user_settings))
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

/// Liveness probe that answers with a sample record, so a browser hit shows
/// the wire shape at a glance.
async fn echo(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&state.function_key, &headers, &params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let sample = UserSettings {
        id: Uuid::new_v4(),
        name: Some("sample".to_string()),
        shirt: Some("red".to_string()),
        level: 0,
    };
    Json(sample).into_response()
}

#[derive(Debug, Deserialize)]
struct GetSettingsRequest {
    id: Uuid,
}

async fn get_user_settings(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(request): Json<GetSettingsRequest>,
) -> Response {
    if !authorized(&state.function_key, &headers, &params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.table.get_or_create(request.id) {
        Ok(stored) => {
            info!(target: "dojo::settings_svc", user_id = %request.id, "settings fetched");
            Json(stored.settings).into_response()
        }
        Err(e) => {
            warn!(target: "dojo::settings_svc", user_id = %request.id, error = %e, "settings fetch failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn set_user_settings(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(settings): Json<UserSettings>,
) -> Response {
    if !authorized(&state.function_key, &headers, &params) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let id = settings.id;
    match state.table.upsert(settings) {
        Ok(stored) => {
            info!(target: "dojo::settings_svc", user_id = %id, "settings saved");
            Json(stored.settings).into_response()
        }
        Err(e) => {
            warn!(target: "dojo::settings_svc", user_id = %id, error = %e, "settings save failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(function_key: &str) -> (Router, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let table = SettingsTable::open(dir.path().to_str().unwrap()).unwrap();
        let state = AppState {
            table: Arc::new(table),
            function_key: function_key.to_string(),
        };
        (router(state), dir)
    }

    fn post_json(uri: &str, key: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::post(uri).header("content-type", "application/json");
        if let Some(key) = key {
            builder = builder.header(FUNCTIONS_KEY_HEADER, key);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn rejects_requests_without_the_function_key() {
        let (app, _dir) = app("secret");
        let id = Uuid::new_v4();
        let response = app
            .oneshot(post_json(
                "/api/getusersettings",
                None,
                &format!(r#"{{"id":"{id}"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn accepts_the_key_as_a_code_query_parameter() {
        let (app, _dir) = app("secret");
        let id = Uuid::new_v4();
        let response = app
            .oneshot(post_json(
                "/api/getusersettings?code=secret",
                None,
                &format!(r#"{{"id":"{id}"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_configured_key_disables_the_check() {
        let (app, _dir) = app("");
        let response = app
            .oneshot(Request::get("/api/echo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn first_fetch_returns_a_default_record() {
        let (app, _dir) = app("secret");
        let id = Uuid::new_v4();
        let response = app
            .oneshot(post_json(
                "/api/getusersettings",
                Some("secret"),
                &format!(r#"{{"id":"{id}"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["id"], id.to_string());
        assert_eq!(json["level"], -1);
        assert!(json["shirt"].is_null());
    }

    #[tokio::test]
    async fn saved_settings_come_back_on_the_next_fetch() {
        let (app, _dir) = app("secret");
        let id = Uuid::new_v4();

        let save = post_json(
            "/api/setusersettings",
            Some("secret"),
            &format!(r#"{{"id":"{id}","name":"Sensei","shirt":"blue","level":2}}"#),
        );
        let response = app.clone().oneshot(save).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let fetch = post_json(
            "/api/getusersettings",
            Some("secret"),
            &format!(r#"{{"id":"{id}"}}"#),
        );
        let json = body_json(app.oneshot(fetch).await.unwrap()).await;
        assert_eq!(json["shirt"], "blue");
        assert_eq!(json["level"], 2);
        assert_eq!(json["name"], "Sensei");
    }

    #[tokio::test]
    async fn echo_answers_with_the_wire_shape() {
        let (app, _dir) = app("");
        let json = body_json(
            app.oneshot(Request::get("/api/echo").body(Body::empty()).unwrap())
                .await
                .unwrap(),
        )
        .await;
        assert!(json["id"].is_string());
        assert_eq!(json["name"], "sample");
    }
}
