use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use crate::languages::LanguageRegistry;
use crate::settings;

use super::models::{ErrorResponse, TranslateRequest, TranslateResponse};
use super::state::ServerState;
use super::translate::translate_request;

pub async fn run_server(settings: settings::Settings, addr: String) -> Result<()> {
    let state = Arc::new(ServerState {
        settings,
        registry: LanguageRegistry::load()?,
    });
    let app = Router::new()
        .route("/health", get(health))
        .route("/settings", get(settings_info))
        .route("/translate", post(translate))
        .with_state(state)
        .layer(axum::middleware::from_fn(cors_middleware));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| "failed to bind server address")?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type,authorization"),
    );
}

async fn translate(
    State(state): State<Arc<ServerState>>,
    Json(payload): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, (StatusCode, Json<ErrorResponse>)> {
    match translate_request(state.as_ref(), payload).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => Err((err.status, Json(ErrorResponse { error: err.message }))),
    }
}

#[derive(serde::Serialize)]
struct SettingsInfo {
    languages: Vec<LanguageOption>,
    chunk_size: usize,
    project_id_version: String,
}

#[derive(serde::Serialize)]
struct LanguageOption {
    value: String,
    label: String,
}

async fn settings_info(State(state): State<Arc<ServerState>>) -> Json<SettingsInfo> {
    let languages = state
        .settings
        .system_languages
        .iter()
        .map(|code| LanguageOption {
            value: code.clone(),
            label: state.registry.display_name(code),
        })
        .collect();
    Json(SettingsInfo {
        languages,
        chunk_size: state.settings.chunk_size,
        project_id_version: state.settings.project_id_version.clone(),
    })
}
