use serde::Deserialize;
use serde_json::json;

use super::retry::{is_rate_limited, retry_after, Backoff, MAX_ATTEMPTS};
use super::{CompletionFuture, CompletionRequest, GatewayError, Provider};

const PROVIDER: &str = "Gemini";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub(crate) const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Clone)]
pub struct Gemini {
    key: String,
    model: String,
}

impl Gemini {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            if !model.trim().is_empty() {
                self.model = model;
            }
        }
        self
    }
}

impl Provider for Gemini {
    fn complete(&self, request: CompletionRequest) -> CompletionFuture {
        let provider = self.clone();
        Box::pin(async move {
            let client = reqwest::Client::new();
            let url = format!("{}/{}:generateContent", BASE_URL, provider.model);
            let body = json!({
                "contents": [
                    {"role": "user", "parts": [{"text": request.input}]}
                ],
                "systemInstruction": {"parts": [{"text": request.instructions}]},
                "generationConfig": {
                    "temperature": request.temperature,
                    "maxOutputTokens": request.max_tokens
                }
            });

            let mut attempt = 0usize;
            let mut backoff = Backoff::new();
            loop {
                attempt += 1;
                let response = client
                    .post(&url)
                    .header("x-goog-api-key", provider.key.clone())
                    .json(&body)
                    .send()
                    .await
                    .map_err(|source| GatewayError::Transport {
                        provider: PROVIDER,
                        source,
                    })?;

                let status = response.status();
                let hint = retry_after(response.headers());
                let text = response.text().await.unwrap_or_default();
                if status.is_success() {
                    return extract_completion(&text);
                }
                if is_rate_limited(status, &text) && attempt < MAX_ATTEMPTS {
                    backoff.wait(PROVIDER, attempt, hint).await;
                    continue;
                }
                return Err(GatewayError::Api {
                    provider: PROVIDER,
                    status: status.as_u16(),
                    message: extract_error(&text).unwrap_or(text),
                });
            }
        })
    }
}

fn extract_completion(text: &str) -> Result<String, GatewayError> {
    let payload: GeminiResponse =
        serde_json::from_str(text).map_err(|err| GatewayError::InvalidPayload {
            provider: PROVIDER,
            message: err.to_string(),
        })?;
    let generated = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if generated.trim().is_empty() {
        return Err(GatewayError::EmptyCompletion { provider: PROVIDER });
    }
    Ok(generated)
}

fn extract_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<ApiError>,
    }

    #[derive(Deserialize)]
    struct ApiError {
        message: Option<String>,
        status: Option<String>,
    }

    let error = serde_json::from_str::<ErrorBody>(body).ok()?.error?;
    let mut parts = Vec::new();
    if let Some(message) = error.message.filter(|value| !value.trim().is_empty()) {
        parts.push(message);
    }
    if let Some(status) = error.status.filter(|value| !value.trim().is_empty()) {
        parts.push(format!("status: {status}"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::extract_completion;

    #[test]
    fn completion_text_is_extracted() {
        let payload = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/gemini_completion.json"
        ));
        let completion = extract_completion(payload).unwrap();
        assert!(completion.contains("[0] Bonjour"));
        assert!(completion.contains("===CHUNK END 0==="));
    }

    #[test]
    fn candidate_without_content_is_rejected() {
        let payload = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        assert!(extract_completion(payload).is_err());
    }
}
