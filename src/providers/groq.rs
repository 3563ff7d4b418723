use serde::Deserialize;
use serde_json::json;

use super::retry::{is_rate_limited, retry_after, Backoff, MAX_ATTEMPTS};
use super::{CompletionFuture, CompletionRequest, GatewayError, Provider};

// Groq speaks the OpenAI chat-completions dialect on its own host.
const PROVIDER: &str = "Groq";
const BASE_URL: &str = "https://api.groq.com/openai/v1";
pub(crate) const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Clone)]
pub struct Groq {
    key: String,
    model: String,
}

impl Groq {
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

impl Provider for Groq {
    fn complete(&self, request: CompletionRequest) -> CompletionFuture {
        let provider = self.clone();
        Box::pin(async move {
            let client = reqwest::Client::new();
            let url = format!("{BASE_URL}/chat/completions");
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
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()?
        .error?
        .message
        .filter(|message| !message.trim().is_empty())
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
    use super::extract_completion;

    #[test]
    fn completion_text_is_extracted() {
        let payload = include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/fixtures/groq_completion.json"
        ));
        let completion = extract_completion(payload).unwrap();
        assert!(completion.contains("[0] Hola"));
    }

    #[test]
    fn empty_choice_list_is_rejected() {
        assert!(extract_completion(r#"{"choices": []}"#).is_err());
    }
}
