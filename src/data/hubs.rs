//! Hub-gene ranking from the upstream network analysis

use serde::{Deserialize, Serialize};

use crate::error::{NetdynError, Result};

/// Ranked hub genes for one module, highest connectivity first
///
/// Used to pre-select a tractable default gene subset for interactive
/// modelling; full modules can be too large to fit responsively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubRanking {
    gene_ids: Vec<String>,
    connectivity: Vec<f64>,
}

impl HubRanking {
    /// Create a ranking from parallel gene/connectivity vectors
    ///
    /// The input is re-sorted by descending connectivity so callers can pass
    /// the upstream table in any row order.
    pub fn new(gene_ids: Vec<String>, connectivity: Vec<f64>) -> Result<Self> {
        if connectivity.len() != gene_ids.len() {
            return Err(NetdynError::DimensionMismatch {
                expected: format!("{} connectivity values", gene_ids.len()),
                got: format!("{} connectivity values", connectivity.len()),
            });
        }
        if connectivity.iter().any(|c| c.is_nan()) {
            return Err(NetdynError::InvalidInput {
                reason: "connectivity values must not be NaN".to_string(),
            });
        }

        let mut pairs: Vec<(String, f64)> =
            gene_ids.into_iter().zip(connectivity).collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let (gene_ids, connectivity) = pairs.into_iter().unzip();
        Ok(Self {
            gene_ids,
            connectivity,
        })
    }

    /// Number of ranked genes
    pub fn len(&self) -> usize {
        self.gene_ids.len()
    }

    /// Whether the ranking is empty
    pub fn is_empty(&self) -> bool {
        self.gene_ids.is_empty()
    }

    /// All ranked gene IDs, highest connectivity first
    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    /// Connectivity scores aligned with `gene_ids`
    pub fn connectivity(&self) -> &[f64] {
        &self.connectivity
    }

    /// The top `n` hub genes (fewer if the ranking is shorter)
    pub fn top(&self, n: usize) -> Vec<String> {
        self.gene_ids.iter().take(n).cloned().collect()
    }
}
