//! Signed weighted gene-interaction matrix for one co-expression module

use ndarray::{Array2, ArrayView2, Axis};

use crate::error::{NetdynError, Result};

/// An N x N signed weighted adjacency matrix over a module's gene set
///
/// `A[[i, j]]` is the interaction weight of gene j's expression on gene i's
/// rate of change; 0 means no edge. The same ordered gene list keys both
/// axes. Not required to be symmetric; negative weights are allowed.
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct AdjacencyMatrix {
    weights: Array2<f64>,
    gene_ids: Vec<String>,
}

impl AdjacencyMatrix {
    /// Create a new adjacency matrix
    pub fn new(weights: Array2<f64>, gene_ids: Vec<String>) -> Result<Self> {
        let (n_rows, n_cols) = weights.dim();

        if n_rows != n_cols {
            return Err(NetdynError::InvalidAdjacency {
                reason: format!("matrix must be square, got {}x{}", n_rows, n_cols),
            });
        }

        if gene_ids.len() != n_rows {
            return Err(NetdynError::DimensionMismatch {
                expected: format!("{} gene IDs", n_rows),
                got: format!("{} gene IDs", gene_ids.len()),
            });
        }

        if weights.iter().any(|&w| w.is_nan() || w.is_infinite()) {
            return Err(NetdynError::InvalidAdjacency {
                reason: "interaction weights must be finite".to_string(),
            });
        }

        Ok(Self { weights, gene_ids })
    }

    /// Number of genes (matrix dimension)
    pub fn n_genes(&self) -> usize {
        self.gene_ids.len()
    }

    /// Interaction weights as a view
    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    /// Gene IDs keying both axes
    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    /// Get gene index by ID
    pub fn gene_index(&self, gene_id: &str) -> Option<usize> {
        self.gene_ids.iter().position(|id| id == gene_id)
    }

    /// Subset to a gene selection, reordering rows and columns consistently
    ///
    /// Fails on unknown gene IDs rather than silently dropping them.
    pub fn subset(&self, genes: &[String]) -> Result<Self> {
        if genes.is_empty() {
            return Err(NetdynError::EmptySelection);
        }

        let indices: Vec<usize> = genes
            .iter()
            .map(|g| {
                self.gene_index(g).ok_or_else(|| NetdynError::UnknownGene {
                    gene_id: g.clone(),
                    context: "adjacency matrix".to_string(),
                })
            })
            .collect::<Result<_>>()?;

        let rows = self.weights.select(Axis(0), &indices);
        let sub = rows.select(Axis(1), &indices);

        Self::new(sub, genes.to_vec())
    }
}
