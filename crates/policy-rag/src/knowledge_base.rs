//! Matched index and mapping pair

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

use policy_core::{Chunk, ChunkId, Error, Result, VectorIndex};

use crate::flat_index::FlatL2Index;
use crate::mapping::ChunkMapping;

/// Difference between the id sets of an index and a mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConsistencyReport {
    /// Ids with a vector but no text
    pub missing_in_mapping: Vec<ChunkId>,
    /// Ids with text but no vector
    pub missing_in_index: Vec<ChunkId>,
}

impl ConsistencyReport {
    /// Compare the id sets of `index` and `mapping`
    pub fn check(index: &dyn VectorIndex, mapping: &ChunkMapping) -> Self {
        let index_ids: BTreeSet<ChunkId> = index.ids().iter().copied().collect();
        let mapping_ids: BTreeSet<ChunkId> = mapping.ids().collect();

        Self {
            missing_in_mapping: index_ids.difference(&mapping_ids).copied().collect(),
            missing_in_index: mapping_ids.difference(&index_ids).copied().collect(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.missing_in_mapping.is_empty() && self.missing_in_index.is_empty()
    }

    fn describe(&self) -> String {
        format!(
            "{} index ids have no text in the mapping {:?}, {} mapping ids have no vector {:?}",
            self.missing_in_mapping.len(),
            preview(&self.missing_in_mapping),
            self.missing_in_index.len(),
            preview(&self.missing_in_index),
        )
    }
}

fn preview(ids: &[ChunkId]) -> &[ChunkId] {
    &ids[..ids.len().min(5)]
}

/// The index and the chunk texts it points to, loaded together
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    index: FlatL2Index,
    mapping: ChunkMapping,
}

impl KnowledgeBase {
    /// Pair an index with its mapping, rejecting mismatched id sets
    pub fn new(index: FlatL2Index, mapping: ChunkMapping) -> Result<Self> {
        let report = ConsistencyReport::check(&index, &mapping);
        if !report.is_consistent() {
            return Err(Error::ConsistencyViolation(report.describe()));
        }
        Ok(Self { index, mapping })
    }

    /// Load the index file and mapping file as a matched pair
    pub fn load(index_path: impl AsRef<Path>, mapping_path: impl AsRef<Path>) -> Result<Self> {
        let index = FlatL2Index::load(index_path.as_ref())?;
        let mapping = ChunkMapping::load(mapping_path.as_ref())?;
        let kb = Self::new(index, mapping)?;

        info!(
            chunks = kb.len(),
            dimension = kb.dimension(),
            index = %index_path.as_ref().display(),
            "Knowledge base loaded"
        );
        Ok(kb)
    }

    /// Write both files
    pub fn save(&self, index_path: impl AsRef<Path>, mapping_path: impl AsRef<Path>) -> Result<()> {
        self.index.save(index_path)?;
        self.mapping.save(mapping_path)?;
        Ok(())
    }

    pub fn index(&self) -> &FlatL2Index {
        &self.index
    }

    pub fn chunk(&self, id: ChunkId) -> Option<&Chunk> {
        self.mapping.get(id)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn index_with(ids: &[ChunkId]) -> FlatL2Index {
        let mut index = FlatL2Index::new(1).unwrap();
        for (i, id) in ids.iter().enumerate() {
            index.add(*id, vec![i as f32]).unwrap();
        }
        index
    }

    fn mapping_with(ids: &[ChunkId]) -> ChunkMapping {
        ChunkMapping::from_chunks(
            ids.iter()
                .map(|id| Chunk::new(*id, format!("chunk {}", id)))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_matched_pair_accepted() {
        let kb = KnowledgeBase::new(index_with(&[1, 2, 3]), mapping_with(&[3, 1, 2])).unwrap();
        assert_eq!(kb.len(), 3);
        assert_eq!(kb.chunk(2).map(|c| c.text.as_str()), Some("chunk 2"));
    }

    #[test]
    fn test_mismatched_id_sets_flagged() {
        let report = ConsistencyReport::check(&index_with(&[1, 2, 3]), &mapping_with(&[2, 3, 4]));
        assert!(!report.is_consistent());
        assert_eq!(report.missing_in_mapping, vec![1]);
        assert_eq!(report.missing_in_index, vec![4]);

        let err = KnowledgeBase::new(index_with(&[1, 2, 3]), mapping_with(&[2, 3, 4])).unwrap_err();
        assert!(matches!(err, Error::ConsistencyViolation(_)));
    }

    #[test]
    fn test_mapping_subset_flagged() {
        let err = KnowledgeBase::new(index_with(&[1, 2]), mapping_with(&[1])).unwrap_err();
        assert!(matches!(err, Error::ConsistencyViolation(_)));
    }

    #[test]
    fn test_load_mismatched_files() {
        let dir = tempdir().unwrap();
        let index_path = dir.path().join("index.json");
        let mapping_path = dir.path().join("mapping.json");

        index_with(&[1, 2]).save(&index_path).unwrap();
        mapping_with(&[1, 2, 5]).save(&mapping_path).unwrap();

        let err = KnowledgeBase::load(&index_path, &mapping_path).unwrap_err();
        assert!(matches!(err, Error::ConsistencyViolation(_)));
    }

    #[test]
    fn test_save_and_load_pair() {
        let dir = tempdir().unwrap();
        let index_path = dir.path().join("index.json");
        let mapping_path = dir.path().join("mapping.json");

        let kb = KnowledgeBase::new(index_with(&[7, 8]), mapping_with(&[7, 8])).unwrap();
        kb.save(&index_path, &mapping_path).unwrap();

        let loaded = KnowledgeBase::load(&index_path, &mapping_path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.dimension(), 1);
    }
}
