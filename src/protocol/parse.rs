use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

use super::{chunk_end_marker, chunk_start_marker, ProtocolError};

/// Translations keyed by local index, exactly one entry per chunk element.
pub type LocalTranslationMap = BTreeMap<usize, String>;

// Unanchored on purpose: the model sometimes wraps a numbered line in
// leading whitespace or quoting, and those lines still count.
static NUMBERED_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(\d+)\]\s(.+)").expect("numbered line regex"));

/// Parses one raw completion back into a `LocalTranslationMap`.
///
/// The region strictly between the chunk's own start/end markers is
/// scanned line by line for `[N] text` entries. Lines that do not match
/// are skipped; stray commentary inside the region must not abort the
/// chunk as long as every expected index is still recovered. Duplicate
/// indices are last-write-wins. The map is returned only when it holds
/// exactly `expected_count` entries, every key in bounds.
pub fn parse_completion(
    raw: &str,
    chunk_index: usize,
    expected_count: usize,
) -> Result<LocalTranslationMap, ProtocolError> {
    if raw.trim().is_empty() {
        return Err(ProtocolError::MissingContent { chunk_index });
    }

    let start_marker = chunk_start_marker(chunk_index);
    let end_marker = chunk_end_marker(chunk_index);
    if !raw.contains(&start_marker) || !raw.contains(&end_marker) {
        return Err(ProtocolError::MissingBoundary { chunk_index });
    }

    let region = extract_region(raw, &start_marker, &end_marker)
        .ok_or(ProtocolError::ExtractionFailed { chunk_index })?;
    let region = region.trim();
    if region.is_empty() {
        return Err(ProtocolError::ExtractionFailed { chunk_index });
    }

    let mut translations = LocalTranslationMap::new();
    for line in region.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(captures) = NUMBERED_LINE_RE.captures(line) else {
            continue;
        };
        let Ok(local_index) = captures[1].parse::<usize>() else {
            continue;
        };
        if local_index >= expected_count {
            return Err(ProtocolError::IndexOutOfRange {
                chunk_index,
                local_index,
                expected: expected_count,
            });
        }
        translations.insert(local_index, captures[2].trim().to_string());
    }

    if translations.len() != expected_count {
        return Err(ProtocolError::CountMismatch {
            chunk_index,
            expected: expected_count,
            actual: translations.len(),
        });
    }

    Ok(translations)
}

/// Returns the smallest span between the first start marker (plus its
/// trailing newline) and the next end marker sitting on its own line.
fn extract_region<'a>(raw: &'a str, start_marker: &str, end_marker: &str) -> Option<&'a str> {
    let start_idx = raw.find(start_marker)?;
    let after_start = start_idx + start_marker.len();
    let rest = &raw[after_start..];
    let body = rest.strip_prefix('\n')?;

    // Non-greedy: take the first end marker that is preceded by a newline.
    let mut search_from = 0;
    while let Some(rel) = body[search_from..].find(end_marker) {
        let end_idx = search_from + rel;
        if end_idx > 0 && body.as_bytes()[end_idx - 1] == b'\n' {
            return Some(&body[..end_idx - 1]);
        }
        search_from = end_idx + end_marker.len();
    }
    None
}
