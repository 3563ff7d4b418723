use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashSet;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::info;

pub mod archive;
pub mod languages;
pub mod logging;
pub mod po;
pub mod pot;
pub mod protocol;
pub mod providers;
pub mod server;
pub mod settings;
#[cfg(test)]
mod test_util;
mod translator;

pub use providers::{
    build_provider, resolve_key, resolve_provider_selection, CompletionFuture, CompletionRequest,
    GatewayError, Provider, ProviderImpl, ProviderKind,
};
pub use translator::{LanguageResult, TranslateError, Translator};

#[derive(Debug, Clone)]
pub struct Config {
    pub input: Option<String>,
    pub languages: Vec<String>,
    pub output: String,
    pub model: Option<String>,
    pub key: Option<String>,
    pub chunk_size: Option<usize>,
    pub settings_path: Option<String>,
    pub show_enabled_languages: bool,
}

pub async fn run(config: Config) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let mut settings = settings::load_settings(settings_path)?;
    let registry = languages::LanguageRegistry::load()?;

    if config.show_enabled_languages {
        return Ok(format_enabled_languages(&settings, &registry));
    }

    let Some(input) = config.input.as_deref() else {
        bail!("no input template provided");
    };
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read template: {input}"))?;
    let sources = pot::extract_source_strings(&content);
    if sources.is_empty() {
        bail!("no translatable strings found in {input}");
    }

    let languages = normalize_languages(&config.languages)?;
    validate_languages(&languages, &registry)?;

    if let Some(size) = config.chunk_size {
        if size == 0 {
            bail!("chunk size must be greater than zero");
        }
        settings.chunk_size = size;
    }

    let selection =
        providers::resolve_provider_selection(config.model.as_deref(), config.key.as_deref())?;
    let key = providers::resolve_key(selection.provider, config.key.as_deref())
        .with_context(|| "no API key found for selected provider")?;
    let provider = providers::build_provider(selection.provider, key, selection.requested_model);

    let timestamp = current_timestamp()?;
    let translator = Translator::new(provider, settings, registry);

    info!(
        "translating {} strings to {} languages",
        sources.len(),
        languages.len()
    );
    let results = translator
        .translate_all(&sources, &languages, &timestamp)
        .await;

    let mut members = Vec::new();
    let mut failures = Vec::new();
    for result in results {
        match result.result {
            Ok(catalog) => members.push(archive::ArchiveMember::po(&result.language, catalog)),
            Err(err) => failures.push(format!("{}: {}", result.language, err)),
        }
    }
    if !failures.is_empty() {
        bail!(
            "translation failed for {} of {} languages:\n{}",
            failures.len(),
            languages.len(),
            failures.join("\n")
        );
    }

    let output_path = Path::new(&config.output);
    archive::write_archive(output_path, &members)?;
    Ok(format!(
        "wrote {} catalogs to {}",
        members.len(),
        output_path.display()
    ))
}

pub(crate) fn current_timestamp() -> Result<String> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .with_context(|| "failed to format timestamp")
}

/// Lowercases, trims, and deduplicates the requested codes, preserving
/// first-occurrence order.
pub(crate) fn normalize_languages(requested: &[String]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut languages = Vec::new();
    for code in requested {
        let code = code.trim().to_lowercase();
        if code.is_empty() {
            continue;
        }
        if seen.insert(code.clone()) {
            languages.push(code);
        }
    }
    if languages.is_empty() {
        bail!("no target languages selected");
    }
    Ok(languages)
}

pub(crate) fn validate_languages(
    languages: &[String],
    registry: &languages::LanguageRegistry,
) -> Result<()> {
    for code in languages {
        if !registry.is_valid_code(code) {
            return Err(anyhow!(
                "invalid target language code '{}' (expected ISO 639-1 code)",
                code
            ));
        }
    }
    Ok(())
}

fn format_enabled_languages(
    settings: &settings::Settings,
    registry: &languages::LanguageRegistry,
) -> String {
    settings
        .system_languages
        .iter()
        .map(|code| format!("{}\t{}", code, registry.display_name(code)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::{normalize_languages, validate_languages};
    use crate::languages::LanguageRegistry;

    #[test]
    fn languages_are_normalized_and_deduplicated() {
        let requested = vec![
            "FR".to_string(),
            " de ".to_string(),
            "fr".to_string(),
            "".to_string(),
        ];
        assert_eq!(normalize_languages(&requested).unwrap(), vec!["fr", "de"]);
    }

    #[test]
    fn empty_selection_is_rejected() {
        assert!(normalize_languages(&[]).is_err());
        assert!(normalize_languages(&["  ".to_string()]).is_err());
    }

    #[test]
    fn unknown_code_fails_validation() {
        let registry = LanguageRegistry::load().unwrap();
        let languages = vec!["fr".to_string(), "qq".to_string()];
        assert!(validate_languages(&languages, &registry).is_err());
    }
}
