//! Chunk mapping file: chunk id to chunk text

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use policy_core::{Chunk, ChunkId, Error, Result};

#[derive(Serialize, Deserialize)]
struct MappingFile {
    chunks: Vec<Chunk>,
}

/// In-memory association of chunk ids to chunks
#[derive(Debug, Clone, Default)]
pub struct ChunkMapping {
    chunks: BTreeMap<ChunkId, Chunk>,
}

impl ChunkMapping {
    /// Build a mapping, rejecting duplicate ids
    pub fn from_chunks(chunks: Vec<Chunk>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for chunk in chunks {
            let id = chunk.id;
            if map.insert(id, chunk).is_some() {
                return Err(Error::InvalidInput(format!("duplicate chunk id {}", id)));
            }
        }
        Ok(Self { chunks: map })
    }

    /// Load a mapping file written by [`ChunkMapping::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::IndexLoad(format!("cannot read mapping file {}: {}", path.display(), e))
        })?;

        let file: MappingFile = serde_json::from_str(&content).map_err(|e| {
            Error::IndexLoad(format!("corrupt mapping file {}: {}", path.display(), e))
        })?;

        Self::from_chunks(file.chunks)
            .map_err(|e| Error::IndexLoad(format!("invalid mapping file {}: {}", path.display(), e)))
    }

    /// Write the mapping as pretty JSON, ordered by id
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = MappingFile {
            chunks: self.chunks.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.get(&id)
    }

    /// Chunk ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = ChunkId> + '_ {
        self.chunks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
