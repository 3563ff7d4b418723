use std::collections::BTreeMap;

use super::{LocalTranslationMap, ProtocolError};

/// Translations keyed by global index, accumulated across chunks.
pub type GlobalTranslationMap = BTreeMap<usize, String>;

/// Folds a fully validated chunk result into the global map. Each chunk
/// owns the disjoint range `start_offset..start_offset + len`, so merges
/// never collide.
pub fn merge(global: &mut GlobalTranslationMap, local: LocalTranslationMap, start_offset: usize) {
    for (local_index, translation) in local {
        global.insert(start_offset + local_index, translation);
    }
}

/// Final total-coverage check: every global index in `0..total` must be
/// present. Guards against chunk-ordering bugs or skipped merges
/// upstream; partial results are never handed to the serializer.
pub fn finalize(
    global: GlobalTranslationMap,
    total: usize,
) -> Result<GlobalTranslationMap, ProtocolError> {
    for index in 0..total {
        if !global.contains_key(&index) {
            return Err(ProtocolError::IncompleteTranslation { index, total });
        }
    }
    Ok(global)
}

#[cfg(test)]
mod tests {
    use super::{finalize, merge, GlobalTranslationMap};
    use crate::protocol::{LocalTranslationMap, ProtocolError};

    fn local(entries: &[(usize, &str)]) -> LocalTranslationMap {
        entries
            .iter()
            .map(|(index, text)| (*index, text.to_string()))
            .collect()
    }

    #[test]
    fn merge_offsets_local_indices() {
        let mut global = GlobalTranslationMap::new();
        merge(&mut global, local(&[(0, "a"), (1, "b")]), 0);
        merge(&mut global, local(&[(0, "c"), (1, "d")]), 2);
        assert_eq!(global[&0], "a");
        assert_eq!(global[&2], "c");
        assert_eq!(global[&3], "d");
    }

    #[test]
    fn finalize_accepts_total_coverage() {
        let mut global = GlobalTranslationMap::new();
        merge(&mut global, local(&[(0, "a"), (1, "b")]), 0);
        merge(&mut global, local(&[(0, "c")]), 2);
        let finalized = finalize(global, 3).unwrap();
        assert_eq!(finalized.len(), 3);
        assert_eq!(
            finalized.keys().copied().collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn finalize_reports_first_missing_index() {
        let mut global = GlobalTranslationMap::new();
        merge(&mut global, local(&[(0, "a"), (1, "b")]), 0);
        // chunk at offset 2 never merged
        merge(&mut global, local(&[(0, "e")]), 4);
        assert_eq!(
            finalize(global, 5),
            Err(ProtocolError::IncompleteTranslation { index: 2, total: 5 })
        );
    }

    #[test]
    fn finalize_of_empty_set_is_empty() {
        let finalized = finalize(GlobalTranslationMap::new(), 0).unwrap();
        assert!(finalized.is_empty());
    }
}
