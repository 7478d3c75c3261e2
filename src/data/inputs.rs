//! Explicit input bundle for a model run

use crate::data::{AdjacencyMatrix, HubRanking, MedianExpression};
use crate::error::{NetdynError, Result};

/// Everything a model run consumes, validated for mutual consistency
///
/// The upstream pipelines produce three artifacts: a module adjacency matrix,
/// a median-expression time course, and a hub-gene ranking. This bundle
/// replaces any ambient "is the data loaded" state with a constructor that
/// fails fast and lists every missing or misaligned piece at once.
#[derive(Debug, Clone)]
pub struct ModelInputs {
    adjacency: AdjacencyMatrix,
    medians: MedianExpression,
    hubs: HubRanking,
}

impl ModelInputs {
    /// Bundle already-loaded inputs, checking mutual consistency
    pub fn new(
        adjacency: AdjacencyMatrix,
        medians: MedianExpression,
        hubs: HubRanking,
    ) -> Result<Self> {
        let mut problems: Vec<String> = Vec::new();

        for gene in adjacency.gene_ids() {
            if medians.gene_index(gene).is_none() {
                problems.push(format!(
                    "module gene '{}' absent from the median expression table",
                    gene
                ));
            }
        }

        for gene in hubs.gene_ids() {
            if adjacency.gene_index(gene).is_none() {
                problems.push(format!(
                    "hub gene '{}' absent from the adjacency matrix",
                    gene
                ));
            }
        }

        if medians.n_groups() < 2 {
            problems.push(format!(
                "median expression table has {} time column(s); at least 2 are required for a fit",
                medians.n_groups()
            ));
        }

        if hubs.is_empty() {
            problems.push("hub ranking is empty".to_string());
        }

        if !problems.is_empty() {
            return Err(NetdynError::DataNotLoaded { missing: problems });
        }

        Ok(Self {
            adjacency,
            medians,
            hubs,
        })
    }

    /// Assemble from optionally-loaded parts, naming each absent input
    ///
    /// This is the entry point a presentation layer calls after its load
    /// step; it reports *all* missing inputs in one error instead of failing
    /// on the first.
    pub fn assemble(
        adjacency: Option<AdjacencyMatrix>,
        medians: Option<MedianExpression>,
        hubs: Option<HubRanking>,
    ) -> Result<Self> {
        match (adjacency, medians, hubs) {
            (Some(adjacency), Some(medians), Some(hubs)) => Self::new(adjacency, medians, hubs),
            (adjacency, medians, hubs) => {
                let mut missing: Vec<String> = Vec::new();
                if adjacency.is_none() {
                    missing.push("adjacency matrix not loaded".to_string());
                }
                if medians.is_none() {
                    missing.push("median expression table not loaded".to_string());
                }
                if hubs.is_none() {
                    missing.push("hub-gene ranking not loaded".to_string());
                }
                Err(NetdynError::DataNotLoaded { missing })
            }
        }
    }

    /// The module adjacency matrix
    pub fn adjacency(&self) -> &AdjacencyMatrix {
        &self.adjacency
    }

    /// The median expression time course
    pub fn medians(&self) -> &MedianExpression {
        &self.medians
    }

    /// The hub-gene ranking
    pub fn hubs(&self) -> &HubRanking {
        &self.hubs
    }

    /// Default interactive gene selection: the top `n` hub genes
    pub fn default_selection(&self, n: usize) -> Vec<String> {
        self.hubs.top(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{median_expression, ExpressionMatrix, SampleMetadata};
    use ndarray::array;

    fn medians() -> MedianExpression {
        let expr = ExpressionMatrix::new(
            array![[1.0, 2.0], [3.0, 4.0]],
            vec!["g1".into(), "g2".into()],
            vec!["s1".into(), "s2".into()],
        )
        .unwrap();
        let meta = SampleMetadata::new(
            vec!["s1".into(), "s2".into()],
            vec!["day_2".into(), "day_4".into()],
            vec!["treated".into(), "treated".into()],
        )
        .unwrap();
        median_expression(&expr, &meta).unwrap()
    }

    fn adjacency() -> AdjacencyMatrix {
        AdjacencyMatrix::new(
            array![[0.0, 0.1], [0.2, 0.0]],
            vec!["g1".into(), "g2".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_consistent_inputs_accepted() {
        let hubs = HubRanking::new(vec!["g1".into(), "g2".into()], vec![2.0, 1.0]).unwrap();
        let inputs = ModelInputs::new(adjacency(), medians(), hubs).unwrap();
        assert_eq!(inputs.default_selection(1), vec!["g1".to_string()]);
    }

    #[test]
    fn test_assemble_lists_all_missing_inputs() {
        let err = ModelInputs::assemble(None, None, None).unwrap_err();
        match err {
            NetdynError::DataNotLoaded { missing } => assert_eq!(missing.len(), 3),
            other => panic!("expected DataNotLoaded, got {:?}", other),
        }
    }

    #[test]
    fn test_misaligned_gene_sets_rejected() {
        let adj = AdjacencyMatrix::new(
            array![[0.0, 0.0], [0.0, 0.0]],
            vec!["g1".into(), "not_in_medians".into()],
        )
        .unwrap();
        let hubs = HubRanking::new(vec!["g1".into()], vec![1.0]).unwrap();
        let err = ModelInputs::new(adj, medians(), hubs).unwrap_err();
        assert!(matches!(err, NetdynError::DataNotLoaded { .. }));
    }
}
