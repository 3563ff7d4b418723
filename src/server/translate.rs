use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::archive::{self, ArchiveMember};
use crate::{current_timestamp, normalize_languages, pot, providers, validate_languages, Translator};

use super::models::{TranslateRequest, TranslateResponse, TranslatedFile};
use super::state::ServerState;

#[derive(Debug)]
pub(crate) struct ServerError {
    pub(crate) status: axum::http::StatusCode,
    pub(crate) message: String,
}

impl ServerError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: axum::http::StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: axum::http::StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::internal(err.to_string())
    }
}

pub(crate) async fn translate_request(
    state: &ServerState,
    request: TranslateRequest,
) -> Result<TranslateResponse, ServerError> {
    let Some(content) = request.content.as_deref() else {
        return Err(ServerError::bad_request("content is required"));
    };
    let requested = request.languages.unwrap_or_default();
    let languages = normalize_languages(&requested)
        .map_err(|err| ServerError::bad_request(err.to_string()))?;
    validate_languages(&languages, &state.registry)
        .map_err(|err| ServerError::bad_request(err.to_string()))?;

    let sources = pot::extract_source_strings(content);
    if sources.is_empty() {
        return Err(ServerError::bad_request(
            "no translatable strings found in template",
        ));
    }

    let mut settings = state.settings.clone();
    if let Some(size) = request.chunk_size {
        if size == 0 {
            return Err(ServerError::bad_request(
                "chunk_size must be greater than zero",
            ));
        }
        settings.chunk_size = size;
    }

    let selection =
        providers::resolve_provider_selection(request.model.as_deref(), request.key.as_deref())
            .map_err(|err| ServerError::bad_request(err.to_string()))?;
    let key = providers::resolve_key(selection.provider, request.key.as_deref())
        .map_err(|err| ServerError::bad_request(err.to_string()))?;
    let provider = providers::build_provider(selection.provider, key, selection.requested_model);

    let timestamp = current_timestamp().map_err(ServerError::from)?;
    let translator = Translator::new(provider, settings, state.registry.clone());
    let results = translator
        .translate_all(&sources, &languages, &timestamp)
        .await;

    let mut members = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result.result {
            Ok(catalog) => members.push(ArchiveMember::po(&result.language, catalog)),
            Err(err) => failures.push(format!("{}: {}", result.language, err)),
        }
    }
    if !failures.is_empty() {
        return Err(ServerError::bad_gateway(format!(
            "translation failed for {} of {} languages: {}",
            failures.len(),
            languages.len(),
            failures.join("; ")
        )));
    }

    let archive_bytes = archive::build_archive(&members).map_err(ServerError::from)?;
    let files = members
        .into_iter()
        .map(|member| TranslatedFile {
            language: member
                .name
                .strip_suffix(".po")
                .unwrap_or(&member.name)
                .to_string(),
            name: member.name.clone(),
            po: member.contents,
        })
        .collect();

    Ok(TranslateResponse {
        archive_base64: BASE64.encode(&archive_bytes),
        files,
    })
}
