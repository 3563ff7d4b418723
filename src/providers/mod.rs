use anyhow::{anyhow, Result};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

mod gemini;
mod groq;
mod openai;
mod retry;

pub use gemini::Gemini;
pub use groq::Groq;
pub use openai::OpenAI;

/// Failures of the completion backend. The translation pipeline treats
/// every variant the same way ("no completion available"); the variants
/// exist so operators can tell transport trouble from vendor rejections.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{provider} API error ({status}): {message}")]
    Api {
        provider: &'static str,
        status: u16,
        message: String,
    },

    #[error("{provider} returned an unparseable response: {message}")]
    InvalidPayload {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} returned no completion content")]
    EmptyCompletion { provider: &'static str },
}

/// One prompt for the backend: instruction text plus the framed payload.
/// Chat-style vendors send them as system and user messages; others
/// concatenate them into a single prompt.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub instructions: String,
    pub input: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn as_single_prompt(&self) -> String {
        format!("{}\n\n{}", self.instructions, self.input)
    }
}

pub type CompletionFuture = Pin<Box<dyn Future<Output = Result<String, GatewayError>> + Send>>;

/// The single capability the translation core consumes: send a prompt,
/// receive the generated text or a failure.
pub trait Provider: Clone + Send + Sync {
    fn complete(&self, request: CompletionRequest) -> CompletionFuture;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAI,
    Groq,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAI => "openai",
            ProviderKind::Groq => "groq",
            ProviderKind::Gemini => "gemini",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderSelection {
    pub provider: ProviderKind,
    pub requested_model: Option<String>,
}

#[derive(Debug, Clone)]
pub enum ProviderImpl {
    OpenAI(OpenAI),
    Groq(Groq),
    Gemini(Gemini),
}

impl Provider for ProviderImpl {
    fn complete(&self, request: CompletionRequest) -> CompletionFuture {
        match self {
            ProviderImpl::OpenAI(provider) => provider.complete(request),
            ProviderImpl::Groq(provider) => provider.complete(request),
            ProviderImpl::Gemini(provider) => provider.complete(request),
        }
    }
}

pub fn build_provider(provider: ProviderKind, key: String, model: Option<String>) -> ProviderImpl {
    match provider {
        ProviderKind::OpenAI => ProviderImpl::OpenAI(OpenAI::new(key).with_model(model)),
        ProviderKind::Groq => ProviderImpl::Groq(Groq::new(key).with_model(model)),
        ProviderKind::Gemini => ProviderImpl::Gemini(Gemini::new(key).with_model(model)),
    }
}

pub fn resolve_provider_selection(
    model_arg: Option<&str>,
    override_key: Option<&str>,
) -> Result<ProviderSelection> {
    match model_arg {
        Some(model) => parse_model_arg(model),
        None => default_provider_selection(override_key),
    }
}

pub fn resolve_key(provider: ProviderKind, override_key: Option<&str>) -> Result<String> {
    if let Some(key) = override_key {
        return Ok(key.to_string());
    }

    match provider {
        ProviderKind::OpenAI => get_env("OPENAI_API_KEY"),
        ProviderKind::Groq => get_env("GROQ_API_KEY"),
        ProviderKind::Gemini => get_env("GEMINI_API_KEY").or_else(|| get_env("GOOGLE_API_KEY")),
    }
    .ok_or_else(|| anyhow!("API key not found for provider {}", provider.as_str()))
}

fn default_provider_selection(override_key: Option<&str>) -> Result<ProviderSelection> {
    for provider in [ProviderKind::OpenAI, ProviderKind::Groq, ProviderKind::Gemini] {
        if resolve_key(provider, None).is_ok() {
            return Ok(ProviderSelection {
                provider,
                requested_model: None,
            });
        }
    }

    if override_key.is_some() {
        return Ok(ProviderSelection {
            provider: ProviderKind::OpenAI,
            requested_model: None,
        });
    }

    Err(anyhow!(
        "no API keys found (checked OPENAI_API_KEY, GROQ_API_KEY, GEMINI_API_KEY/GOOGLE_API_KEY)"
    ))
}

fn parse_model_arg(model_arg: &str) -> Result<ProviderSelection> {
    let raw = model_arg.trim();
    if raw.is_empty() {
        return Err(anyhow!("model argument is empty"));
    }

    let lower = raw.to_lowercase();
    if let Some(provider) = provider_from_name(&lower) {
        return Ok(ProviderSelection {
            provider,
            requested_model: None,
        });
    }

    if let Some((provider, model)) = parse_provider_model_pair(raw) {
        return Ok(ProviderSelection {
            provider,
            requested_model: model,
        });
    }

    Err(anyhow!(
        "unable to infer provider from model '{}'. Use provider:model (openai:, groq:, gemini:)",
        raw
    ))
}

fn parse_provider_model_pair(input: &str) -> Option<(ProviderKind, Option<String>)> {
    let (provider_part, model_part) = input.split_once(':')?;
    let provider = provider_from_name(&provider_part.to_lowercase())?;
    let model = if model_part.trim().is_empty() {
        None
    } else {
        Some(model_part.trim().to_string())
    };
    Some((provider, model))
}

fn provider_from_name(name: &str) -> Option<ProviderKind> {
    match name {
        "openai" => Some(ProviderKind::OpenAI),
        "groq" => Some(ProviderKind::Groq),
        "gemini" | "google" => Some(ProviderKind::Gemini),
        _ => None,
    }
}

fn get_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{parse_model_arg, ProviderKind};

    #[test]
    fn provider_model_pairs_parse() {
        let selection = parse_model_arg("groq:llama-3.3-70b-versatile").unwrap();
        assert_eq!(selection.provider, ProviderKind::Groq);
        assert_eq!(
            selection.requested_model.as_deref(),
            Some("llama-3.3-70b-versatile")
        );
    }

    #[test]
    fn bare_provider_name_selects_default_model() {
        let selection = parse_model_arg("gemini").unwrap();
        assert_eq!(selection.provider, ProviderKind::Gemini);
        assert!(selection.requested_model.is_none());
    }

    #[test]
    fn empty_model_after_colon_means_default() {
        let selection = parse_model_arg("openai:").unwrap();
        assert_eq!(selection.provider, ProviderKind::OpenAI);
        assert!(selection.requested_model.is_none());
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(parse_model_arg("mistral:large").is_err());
        assert!(parse_model_arg("   ").is_err());
    }
}
