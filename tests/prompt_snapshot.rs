use pot_translator_rust::protocol::{build_prompt, split_into_chunks};

#[test]
fn chunk_prompt_snapshot() {
    let sources = vec!["Hello".to_string(), "World".to_string()];
    let chunks = split_into_chunks(&sources, 50).unwrap();
    let prompt = build_prompt(&chunks[0], chunks.len(), "French").unwrap();

    insta::assert_snapshot!(prompt.as_single_text(), @r"
    You are translating chunk 1 of 1 to French.
    Translate only the texts between the CHUNK START and CHUNK END markers.
    Keep the same [N] numbering format.
    Start your response with ===CHUNK START 0=== and end with ===CHUNK END 0===.
    Only translate the text after each [N], keep the numbers as is.
    Do not add explanations or commentary outside the markers.

    ===CHUNK START 0===
    [0] Hello
    [1] World
    ===CHUNK END 0===
    ");
}
