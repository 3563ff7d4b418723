use anyhow::{ensure, Result};

/// A contiguous batch of source strings sent in one model request.
///
/// Local indices run `0..entries.len()` and map to the global index
/// `start_offset + local`.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    pub chunk_index: usize,
    pub start_offset: usize,
    pub entries: &'a [String],
}

impl Chunk<'_> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Splits `strings` into order-preserving chunks of at most `size`
/// elements. The last chunk may be shorter; no element is dropped,
/// duplicated, or reordered.
pub fn split_into_chunks(strings: &[String], size: usize) -> Result<Vec<Chunk<'_>>> {
    ensure!(size > 0, "chunk size must be greater than zero");
    Ok(strings
        .chunks(size)
        .enumerate()
        .map(|(chunk_index, entries)| Chunk {
            chunk_index,
            start_offset: chunk_index * size,
            entries,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::split_into_chunks;

    fn sources(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("string {i}")).collect()
    }

    #[test]
    fn concatenated_chunks_reproduce_the_input() {
        for total in 0..8 {
            for size in 1..5 {
                let strings = sources(total);
                let chunks = split_into_chunks(&strings, size).unwrap();
                let rebuilt: Vec<String> = chunks
                    .iter()
                    .flat_map(|chunk| chunk.entries.iter().cloned())
                    .collect();
                assert_eq!(rebuilt, strings, "total={total} size={size}");
            }
        }
    }

    #[test]
    fn offsets_follow_chunk_boundaries() {
        let strings = sources(7);
        let chunks = split_into_chunks(&strings, 3).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[1].start_offset, 3);
        assert_eq!(chunks[2].start_offset, 6);
        assert_eq!(chunks[2].len(), 1);
        assert_eq!(chunks[2].chunk_index, 2);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunks = split_into_chunks(&[], 50).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn zero_size_is_rejected() {
        let strings = sources(2);
        assert!(split_into_chunks(&strings, 0).is_err());
    }
}
