use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// ISO 639-1 code → English-name registry, embedded at build time.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    codes: HashMap<String, String>,
}

impl LanguageRegistry {
    pub fn load() -> Result<Self> {
        let raw = include_str!("iso_639.json");
        let parsed: IsoData =
            serde_json::from_str(raw).with_context(|| "failed to parse ISO 639 language data")?;
        Ok(LanguageRegistry {
            codes: parsed.codes,
        })
    }

    pub fn is_valid_code(&self, code: &str) -> bool {
        self.codes.contains_key(&normalize_code(code))
    }

    pub fn iso_name(&self, code: &str) -> Option<String> {
        self.codes.get(&normalize_code(code)).cloned()
    }

    /// Display label used in prompts and listings. Falls back to the raw
    /// code for anything the registry does not know.
    pub fn display_name(&self, code: &str) -> String {
        self.iso_name(code).unwrap_or_else(|| normalize_code(code))
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

#[derive(Debug, Deserialize)]
struct IsoData {
    codes: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::LanguageRegistry;

    #[test]
    fn known_codes_resolve_to_names() {
        let registry = LanguageRegistry::load().unwrap();
        assert!(registry.is_valid_code("fr"));
        assert!(registry.is_valid_code(" FR "));
        assert_eq!(registry.iso_name("fr").as_deref(), Some("French"));
    }

    #[test]
    fn unknown_codes_fall_back_to_the_code() {
        let registry = LanguageRegistry::load().unwrap();
        assert!(!registry.is_valid_code("xx"));
        assert_eq!(registry.display_name("xx"), "xx");
    }
}
