use futures_util::stream::{self, StreamExt};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::languages::LanguageRegistry;
use crate::po::{self, PoMetadata};
use crate::protocol::{
    self, Chunk, GlobalTranslationMap, LocalTranslationMap, ProtocolError,
};
use crate::providers::{CompletionRequest, GatewayError, Provider};
use crate::settings::Settings;

/// Anything that can abort one language's translation. Gateway and
/// protocol failures keep their own taxonomies so callers can tell a
/// flaky backend from a model that ignored the framing instructions.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("invalid translation configuration: {message}")]
    Config { message: String },

    #[error("failed to build prompt for chunk {chunk_index}: {message}")]
    Prompt { chunk_index: usize, message: String },
}

/// Outcome of one language's run. Languages are independent; a failure
/// here says nothing about the other members of the request.
#[derive(Debug)]
pub struct LanguageResult {
    pub language: String,
    pub result: Result<String, TranslateError>,
}

#[derive(Clone)]
pub struct Translator<P: Provider> {
    provider: P,
    settings: Settings,
    registry: LanguageRegistry,
}

impl<P: Provider> Translator<P> {
    pub fn new(provider: P, settings: Settings, registry: LanguageRegistry) -> Self {
        Self {
            provider,
            settings,
            registry,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Translates every source string to one language and serializes the
    /// resulting catalog. Chunks run strictly sequentially: a failure in
    /// any chunk aborts the whole language and no partial catalog is
    /// ever produced.
    pub async fn translate_language(
        &self,
        sources: &[String],
        language: &str,
        timestamp: &str,
    ) -> Result<String, TranslateError> {
        let chunks = protocol::split_into_chunks(sources, self.settings.chunk_size).map_err(
            |err| TranslateError::Config {
                message: err.to_string(),
            },
        )?;
        let total_chunks = chunks.len();
        let language_label = self.registry.display_name(language);

        let mut global = GlobalTranslationMap::new();
        for chunk in &chunks {
            let local = self
                .translate_chunk(chunk, total_chunks, &language_label)
                .await?;
            protocol::merge(&mut global, local, chunk.start_offset);
        }
        let global = protocol::finalize(global, sources.len())?;

        let metadata = PoMetadata {
            project_id_version: self.settings.project_id_version.clone(),
            language: language.to_string(),
            timestamp: timestamp.to_string(),
        };
        Ok(po::serialize(&metadata, sources, &global))
    }

    /// Translates all requested languages, a bounded number of them in
    /// flight at once. Results come back in request order; each language
    /// carries its own outcome.
    pub async fn translate_all(
        &self,
        sources: &[String],
        languages: &[String],
        timestamp: &str,
    ) -> Vec<LanguageResult> {
        let concurrency = self.settings.translation_threads.max(1);
        stream::iter(languages.iter().cloned())
            .map(|language| async move {
                let result = self
                    .translate_language(sources, &language, timestamp)
                    .await;
                if let Err(err) = &result {
                    warn!("translation to {} failed: {}", language, err);
                }
                LanguageResult { language, result }
            })
            .buffered(concurrency)
            .collect::<Vec<_>>()
            .await
    }

    async fn translate_chunk(
        &self,
        chunk: &Chunk<'_>,
        total_chunks: usize,
        language_label: &str,
    ) -> Result<LocalTranslationMap, TranslateError> {
        let prompt = protocol::build_prompt(chunk, total_chunks, language_label).map_err(|err| {
            TranslateError::Prompt {
                chunk_index: chunk.chunk_index,
                message: err.to_string(),
            }
        })?;
        let request = CompletionRequest {
            instructions: prompt.instructions,
            input: prompt.payload,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let mut attempt = 0usize;
        loop {
            let completion = self.complete_with_retry(request.clone()).await?;
            match protocol::parse_completion(&completion, chunk.chunk_index, chunk.len()) {
                Ok(local) => {
                    debug!(
                        "chunk {}/{} translated ({} entries)",
                        chunk.chunk_index + 1,
                        total_chunks,
                        local.len()
                    );
                    return Ok(local);
                }
                Err(err) if attempt < self.settings.protocol_retries => {
                    attempt += 1;
                    warn!(
                        "chunk {}: malformed model response ({}); retrying with the same prompt ({}/{})",
                        chunk.chunk_index, err, attempt, self.settings.protocol_retries
                    );
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Bounded retry around the gateway call. Gateway failures are the
    /// transient class; everything past the budget propagates.
    async fn complete_with_retry(
        &self,
        request: CompletionRequest,
    ) -> Result<String, GatewayError> {
        let mut attempt = 0usize;
        loop {
            match self.provider.complete(request.clone()).await {
                Ok(completion) => return Ok(completion),
                Err(err) if attempt < self.settings.gateway_retries => {
                    attempt += 1;
                    let delay = Duration::from_secs(1u64 << attempt.min(5));
                    warn!(
                        "gateway failure ({}); retrying in {}s ({}/{})",
                        err,
                        delay.as_secs(),
                        attempt,
                        self.settings.gateway_retries
                    );
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
