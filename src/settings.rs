use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");

#[derive(Debug, Clone)]
pub struct Settings {
    pub chunk_size: usize,
    pub max_tokens: u32,
    pub temperature: f32,
    pub gateway_retries: usize,
    pub protocol_retries: usize,
    pub translation_threads: usize,
    pub project_id_version: String,
    pub system_languages: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chunk_size: 50,
            max_tokens: 15_000,
            temperature: 0.3,
            gateway_retries: 2,
            protocol_retries: 1,
            translation_threads: 2,
            project_id_version: "Plugin Translation".to_string(),
            system_languages: ["es", "fr", "de", "it", "pt", "nl", "pl", "ru", "ja", "zh"]
                .iter()
                .map(|code| code.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    translate: Option<TranslateSettings>,
    po: Option<PoSettings>,
    system: Option<SystemSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct TranslateSettings {
    chunk_size: Option<usize>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    gateway_retries: Option<usize>,
    protocol_retries: Option<usize>,
    threads: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct PoSettings {
    project_id_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SystemSettings {
    languages: Option<Vec<String>>,
}

/// Loads layered settings: project files first, then the home directory,
/// then an explicit extra path. Later files win per key.
pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::default();
    ensure_home_settings_file()?;

    let mut ordered_paths = Vec::new();
    ordered_paths.push(PathBuf::from("settings.toml"));
    ordered_paths.push(PathBuf::from("settings.local.toml"));

    if let Some(home) = home_dir() {
        ordered_paths.push(home.join("settings.toml"));
        ordered_paths.push(home.join("settings.local.toml"));
    }

    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            let parsed: SettingsFile = toml::from_str(&content)
                .with_context(|| format!("failed to parse settings: {}", path.display()))?;
            settings.merge(parsed);
        }
    }

    Ok(settings)
}

impl Settings {
    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(translate) = incoming.translate {
            if let Some(size) = translate.chunk_size {
                if size > 0 {
                    self.chunk_size = size;
                }
            }
            if let Some(tokens) = translate.max_tokens {
                if tokens > 0 {
                    self.max_tokens = tokens;
                }
            }
            if let Some(temperature) = translate.temperature {
                if (0.0..=2.0).contains(&temperature) {
                    self.temperature = temperature;
                }
            }
            if let Some(retries) = translate.gateway_retries {
                self.gateway_retries = retries;
            }
            if let Some(retries) = translate.protocol_retries {
                self.protocol_retries = retries;
            }
            if let Some(threads) = translate.threads {
                if threads > 0 {
                    self.translation_threads = threads;
                }
            }
        }
        if let Some(po) = incoming.po {
            if let Some(project) = po.project_id_version {
                if !project.trim().is_empty() {
                    self.project_id_version = project;
                }
            }
        }
        if let Some(system) = incoming.system {
            if let Some(languages) = system.languages {
                if !languages.is_empty() {
                    self.system_languages = languages;
                }
            }
        }
    }
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(home) = home_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&home)
        .with_context(|| format!("failed to create settings directory: {}", home.display()))?;
    let path = home.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(Path::new(home).join(".pot-translator-rust"))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::load_settings;
    use crate::test_util::with_temp_home;

    #[test]
    fn defaults_match_the_embedded_file() {
        with_temp_home(|_| {
            let settings = load_settings(None).unwrap();
            assert_eq!(settings.chunk_size, 50);
            assert_eq!(settings.max_tokens, 15_000);
            assert_eq!(settings.protocol_retries, 1);
            assert_eq!(settings.system_languages.len(), 10);
        });
    }

    #[test]
    fn home_settings_override_defaults() {
        with_temp_home(|home| {
            let dir = home.join(".pot-translator-rust");
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(
                dir.join("settings.toml"),
                "[translate]\nchunk_size = 10\n\n[po]\nproject_id_version = \"My Plugin\"\n",
            )
            .unwrap();
            let settings = load_settings(None).unwrap();
            assert_eq!(settings.chunk_size, 10);
            assert_eq!(settings.project_id_version, "My Plugin");
            // untouched keys keep their defaults
            assert_eq!(settings.gateway_retries, 2);
        });
    }

    #[test]
    fn zero_chunk_size_is_ignored() {
        with_temp_home(|home| {
            let dir = home.join(".pot-translator-rust");
            std::fs::create_dir_all(&dir).unwrap();
            std::fs::write(dir.join("settings.toml"), "[translate]\nchunk_size = 0\n").unwrap();
            let settings = load_settings(None).unwrap();
            assert_eq!(settings.chunk_size, 50);
        });
    }

    #[test]
    fn missing_extra_path_is_an_error() {
        with_temp_home(|_| {
            assert!(load_settings(Some(std::path::Path::new("/nonexistent/extra.toml"))).is_err());
        });
    }
}
