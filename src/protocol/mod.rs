use thiserror::Error;

mod assemble;
mod chunk;
mod parse;
mod prompt;

pub use assemble::{finalize, merge, GlobalTranslationMap};
pub use chunk::{split_into_chunks, Chunk};
pub use parse::{parse_completion, LocalTranslationMap};
pub use prompt::{build_prompt, chunk_end_marker, chunk_start_marker, ChunkPrompt};

/// Failures of the chunked translation protocol. Every variant names the
/// chunk it belongs to so callers can report exactly which batch went bad.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("no translation received for chunk {chunk_index}")]
    MissingContent { chunk_index: usize },

    #[error("invalid chunk boundaries in response for chunk {chunk_index}")]
    MissingBoundary { chunk_index: usize },

    #[error("could not extract translations from chunk {chunk_index}")]
    ExtractionFailed { chunk_index: usize },

    #[error(
        "invalid local index {local_index} in chunk {chunk_index} (chunk holds {expected} entries)"
    )]
    IndexOutOfRange {
        chunk_index: usize,
        local_index: usize,
        expected: usize,
    },

    #[error("translation count mismatch in chunk {chunk_index}: expected {expected}, got {actual}")]
    CountMismatch {
        chunk_index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("missing translation for index {index} in final output ({total} strings expected)")]
    IncompleteTranslation { index: usize, total: usize },
}
