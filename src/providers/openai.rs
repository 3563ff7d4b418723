use serde::Deserialize;
use serde_json::json;

use super::retry::{is_rate_limited, retry_after, Backoff, MAX_ATTEMPTS};
use super::{CompletionFuture, CompletionRequest, GatewayError, Provider};

const PROVIDER: &str = "OpenAI";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub(crate) const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct OpenAI {
    key: String,
    model: String,
}

impl OpenAI {
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

impl Provider for OpenAI {
    fn complete(&self, request: CompletionRequest) -> CompletionFuture {
        let provider = self.clone();
        Box::pin(async move {
            let client = reqwest::Client::new();
            let url = format!("{}/chat/completions", base_url());
            let body = json!({
                "model": provider.model,
                "messages": [
                    {"role": "system", "content": request.instructions},
                    {"role": "user", "content": request.input}
                ],
                "temperature": request.temperature,
                "max_tokens": request.max_tokens
            });

            let mut attempt = 0usize;
            let mut backoff = Backoff::new();
            loop {
                attempt += 1;
                let response = client
                    .post(&url)
                    .bearer_auth(provider.key.clone())
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

fn base_url() -> String {
    std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

fn extract_completion(text: &str) -> Result<String, GatewayError> {
    let payload: ChatResponse =
        serde_json::from_str(text).map_err(|err| GatewayError::InvalidPayload {
            provider: PROVIDER,
            message: err.to_string(),
        })?;
    payload
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(GatewayError::EmptyCompletion { provider: PROVIDER })
}

fn extract_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<ApiError>,
    }

    #[derive(Deserialize)]
    struct ApiError {
        message: Option<String>,
        #[serde(rename = "type")]
        kind: Option<String>,
        code: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let error = parsed.error?;
    let mut parts = Vec::new();
    if let Some(message) = error.message.filter(|value| !value.trim().is_empty()) {
        parts.push(message);
    }
    if let Some(kind) = error.kind.filter(|value| !value.trim().is_empty()) {
        parts.push(format!("type: {kind}"));
    }
    if let Some(code) = error.code.filter(|value| !value.trim().is_empty()) {
        parts.push(format!("code: {code}"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{extract_completion, extract_error};

    #[test]
    fn completion_text_is_extracted() {
        let payload = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/openai_completion.json"
        ));
        let completion = extract_completion(payload).unwrap();
        assert!(completion.starts_with("===CHUNK START 0==="));
        assert!(completion.contains("[0] Bonjour"));
    }

    #[test]
    fn missing_content_is_an_empty_completion() {
        let payload = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        assert!(extract_completion(payload).is_err());
    }

    #[test]
    fn error_bodies_are_summarized() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}}"#;
        let message = extract_error(body).unwrap();
        assert!(message.contains("Incorrect API key provided"));
        assert!(message.contains("code: invalid_api_key"));
    }
}
