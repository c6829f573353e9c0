//! Exact L2 nearest-neighbor index

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use policy_core::{ChunkId, Error, Neighbor, Result, VectorIndex};

const METRIC_L2: &str = "l2";

/// On-disk layout of the index file
#[derive(Serialize, Deserialize)]
struct IndexFile {
    metric: String,
    dimension: usize,
    ids: Vec<ChunkId>,
    vectors: Vec<Vec<f32>>,
}

/// Brute-force index ranking rows by squared euclidean distance
///
/// Every search scans all rows, so results are exact and deterministic: equal
/// distances keep row order.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimension: usize,
    ids: Vec<ChunkId>,
    vectors: Vec<Vec<f32>>,
}

impl FlatL2Index {
    /// Create an empty index for vectors of `dimension` components
    pub fn new(dimension: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::InvalidInput(
                "index dimension must be positive".to_string(),
            ));
        }

        Ok(Self {
            dimension,
            ids: Vec::new(),
            vectors: Vec::new(),
        })
    }

    /// Append a row
    pub fn add(&mut self, id: ChunkId, vector: Vec<f32>) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(Error::InvalidInput(format!(
                "vector for chunk {} has dimension {}, index expects {}",
                id,
                vector.len(),
                self.dimension
            )));
        }
        if self.ids.contains(&id) {
            return Err(Error::InvalidInput(format!("duplicate chunk id {}", id)));
        }

        self.ids.push(id);
        self.vectors.push(vector);
        Ok(())
    }

    /// Squared euclidean distance
    fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| {
                let d = x - y;
                d * d
            })
            .sum()
    }

    /// Load an index file written by [`FlatL2Index::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::IndexLoad(format!("cannot read index file {}: {}", path.display(), e))
        })?;

        let file: IndexFile = serde_json::from_str(&content).map_err(|e| {
            Error::IndexLoad(format!("corrupt index file {}: {}", path.display(), e))
        })?;

        Self::from_file(file)
            .map_err(|e| Error::IndexLoad(format!("invalid index file {}: {}", path.display(), e)))
    }

    fn from_file(file: IndexFile) -> std::result::Result<Self, String> {
        if file.metric != METRIC_L2 {
            return Err(format!("unsupported metric '{}'", file.metric));
        }
        if file.dimension == 0 {
            return Err("dimension must be positive".to_string());
        }
        if file.ids.len() != file.vectors.len() {
            return Err(format!(
                "{} ids but {} vectors",
                file.ids.len(),
                file.vectors.len()
            ));
        }
        if let Some(row) = file.vectors.iter().position(|v| v.len() != file.dimension) {
            return Err(format!(
                "row {} has dimension {}, expected {}",
                row,
                file.vectors[row].len(),
                file.dimension
            ));
        }

        let mut seen = HashSet::with_capacity(file.ids.len());
        if let Some(id) = file.ids.iter().find(|id| !seen.insert(**id)) {
            return Err(format!("duplicate chunk id {}", id));
        }

        Ok(Self {
            dimension: file.dimension,
            ids: file.ids,
            vectors: file.vectors,
        })
    }

    /// Write the index as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = IndexFile {
            metric: METRIC_L2.to_string(),
            dimension: self.dimension,
            ids: self.ids.clone(),
            vectors: self.vectors.clone(),
        };
        let json = serde_json::to_string(&file)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl VectorIndex for FlatL2Index {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn ids(&self) -> &[ChunkId] {
        &self.ids
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(Error::InvalidInput(format!(
                "query has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(row, vector)| (row, Self::squared_l2(query, vector)))
            .collect();

        scored.sort_by(|a, b| match a.1.total_cmp(&b.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(row, distance)| Neighbor {
                id: self.ids[row],
                distance,
            })
            .collect())
    }
}
