use anyhow::{Context, Result};
use tera::{Context as TeraContext, Tera};

use super::Chunk;

const INSTRUCTIONS_TEMPLATE: &str = include_str!("prompts/chunk_instructions.tera");

/// The two halves of one chunk request: the natural-language instructions
/// and the framed payload. Chat-style backends send them as system and
/// user messages; single-prompt backends concatenate them.
#[derive(Debug, Clone)]
pub struct ChunkPrompt {
    pub instructions: String,
    pub payload: String,
}

impl ChunkPrompt {
    pub fn as_single_text(&self) -> String {
        format!("{}\n\n{}", self.instructions, self.payload)
    }
}

pub fn chunk_start_marker(chunk_index: usize) -> String {
    format!("===CHUNK START {chunk_index}===")
}

pub fn chunk_end_marker(chunk_index: usize) -> String {
    format!("===CHUNK END {chunk_index}===")
}

/// Builds the prompt for one chunk. The payload framing is exact: start
/// marker, one `[N] text` line per entry in chunk order, end marker.
pub fn build_prompt(
    chunk: &Chunk<'_>,
    total_chunks: usize,
    target_language: &str,
) -> Result<ChunkPrompt> {
    let start_marker = chunk_start_marker(chunk.chunk_index);
    let end_marker = chunk_end_marker(chunk.chunk_index);

    let mut context = TeraContext::new();
    context.insert("chunk_number", &(chunk.chunk_index + 1));
    context.insert("total_chunks", &total_chunks);
    context.insert("target_language", target_language);
    context.insert("start_marker", &start_marker);
    context.insert("end_marker", &end_marker);
    let instructions = Tera::one_off(INSTRUCTIONS_TEMPLATE, &context, false)
        .with_context(|| "failed to render chunk instructions")?
        .trim_end()
        .to_string();

    let mut payload = String::new();
    payload.push_str(&start_marker);
    payload.push('\n');
    for (local_index, text) in chunk.entries.iter().enumerate() {
        payload.push_str(&format!("[{local_index}] {text}"));
        payload.push('\n');
    }
    payload.push_str(&end_marker);

    Ok(ChunkPrompt {
        instructions,
        payload,
    })
}
