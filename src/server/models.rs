use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub(crate) struct TranslateRequest {
    pub(crate) content: Option<String>,
    pub(crate) languages: Option<Vec<String>>,
    pub(crate) model: Option<String>,
    pub(crate) key: Option<String>,
    pub(crate) chunk_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TranslateResponse {
    pub(crate) archive_base64: String,
    pub(crate) files: Vec<TranslatedFile>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TranslatedFile {
    pub(crate) language: String,
    pub(crate) name: String,
    pub(crate) po: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct ErrorResponse {
    pub(crate) error: String,
}
