//! Median-expression aggregation over (time, treatment) groups

use std::collections::BTreeMap;

use ndarray::{Array1, Array2, ArrayView2};

use crate::data::{ExpressionMatrix, SampleMetadata};
use crate::error::{NetdynError, Result};
use crate::stats::median;

/// Genes x (time, treatment) table of median expression values
///
/// Columns are canonically ordered by (time, treatment) sort key, not by
/// input appearance order, so identical inputs yield identical output no
/// matter how rows or columns were shuffled upstream. Groups with no samples
/// are simply absent.
#[derive(Debug, Clone)]
pub struct MedianExpression {
    values: Array2<f64>,
    gene_ids: Vec<String>,
    /// (time, treatment) label per column, in column order
    groups: Vec<(String, String)>,
}

impl MedianExpression {
    /// Number of genes
    pub fn n_genes(&self) -> usize {
        self.gene_ids.len()
    }

    /// Number of (time, treatment) groups
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Median values as a view (genes x groups)
    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Gene IDs in row order
    pub fn gene_ids(&self) -> &[String] {
        &self.gene_ids
    }

    /// (time, treatment) labels in column order
    pub fn groups(&self) -> &[(String, String)] {
        &self.groups
    }

    /// Get gene index by ID
    pub fn gene_index(&self, gene_id: &str) -> Option<usize> {
        self.gene_ids.iter().position(|id| id == gene_id)
    }

    /// Subset rows to a gene selection, preserving the given order
    ///
    /// Fails on unknown gene IDs rather than silently dropping them.
    pub fn subset_genes(&self, genes: &[String]) -> Result<Self> {
        if genes.is_empty() {
            return Err(NetdynError::EmptySelection);
        }

        let indices: Vec<usize> = genes
            .iter()
            .map(|g| {
                self.gene_index(g).ok_or_else(|| NetdynError::UnknownGene {
                    gene_id: g.clone(),
                    context: "median expression table".to_string(),
                })
            })
            .collect::<Result<_>>()?;

        let values = self.values.select(ndarray::Axis(0), &indices);
        Ok(Self {
            values,
            gene_ids: genes.to_vec(),
            groups: self.groups.clone(),
        })
    }

    /// One column as an owned vector (e.g. the first time point for initial
    /// conditions)
    pub fn column(&self, group_idx: usize) -> Result<Array1<f64>> {
        if group_idx >= self.n_groups() {
            return Err(NetdynError::InvalidInput {
                reason: format!(
                    "group index {} out of range ({} groups)",
                    group_idx,
                    self.n_groups()
                ),
            });
        }
        Ok(self.values.column(group_idx).to_owned())
    }
}

/// Aggregate per-sample expression to per-(time, treatment) medians
///
/// Every sample in the expression matrix must be annotated in the metadata
/// and vice versa; a partial overlap is an error, not a silent inner join.
pub fn median_expression(
    expression: &ExpressionMatrix,
    metadata: &SampleMetadata,
) -> Result<MedianExpression> {
    if expression.n_samples() == 0 {
        return Err(NetdynError::EmptyData {
            reason: "expression matrix has no samples".to_string(),
        });
    }

    // Exact sample-set agreement between the two tables
    let mut unmatched: Vec<String> = Vec::new();
    for id in expression.sample_ids() {
        if metadata.sample_index(id).is_none() {
            unmatched.push(format!("sample '{}' missing from metadata", id));
        }
    }
    for id in metadata.sample_ids() {
        if expression.sample_index(id).is_none() {
            unmatched.push(format!("sample '{}' missing from expression matrix", id));
        }
    }
    if !unmatched.is_empty() {
        return Err(NetdynError::InvalidMetadata {
            reason: unmatched.join("; "),
        });
    }

    // Group expression columns by (time, treatment); BTreeMap gives the
    // canonical sorted column order for free.
    let mut groups: BTreeMap<(String, String), Vec<usize>> = BTreeMap::new();
    for (col, id) in expression.sample_ids().iter().enumerate() {
        let meta_idx = metadata
            .sample_index(id)
            .ok_or_else(|| NetdynError::InvalidMetadata {
                reason: format!("sample '{}' missing from metadata", id),
            })?;
        let key = (
            metadata.time(meta_idx)?.to_string(),
            metadata.treatment(meta_idx)?.to_string(),
        );
        groups.entry(key).or_default().push(col);
    }

    let n_genes = expression.n_genes();
    let n_groups = groups.len();
    let mut values = Array2::zeros((n_genes, n_groups));
    let mut group_labels = Vec::with_capacity(n_groups);

    for (j, (key, cols)) in groups.iter().enumerate() {
        for i in 0..n_genes {
            let row = expression.gene_values(i);
            let group_values: Vec<f64> = cols.iter().map(|&c| row[c]).collect();
            values[[i, j]] = median(&group_values).ok_or_else(|| NetdynError::EmptyData {
                reason: format!(
                    "no expression values for gene '{}' in group ({}, {})",
                    expression.gene_ids()[i],
                    key.0,
                    key.1
                ),
            })?;
        }
        group_labels.push(key.clone());
    }

    Ok(MedianExpression {
        values,
        gene_ids: expression.gene_ids().to_vec(),
        groups: group_labels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn expression() -> ExpressionMatrix {
        ExpressionMatrix::new(
            array![[1.0, 3.0, 10.0, 20.0], [2.0, 4.0, 30.0, 40.0]],
            vec!["g1".into(), "g2".into()],
            vec!["s1".into(), "s2".into(), "s3".into(), "s4".into()],
        )
        .unwrap()
    }

    fn metadata() -> SampleMetadata {
        SampleMetadata::new(
            vec!["s1".into(), "s2".into(), "s3".into(), "s4".into()],
            vec!["day_2".into(), "day_2".into(), "day_4".into(), "day_4".into()],
            vec!["control".into(), "control".into(), "treated".into(), "treated".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_two_samples_median_is_mean() {
        let table = median_expression(&expression(), &metadata()).unwrap();
        assert_eq!(table.n_groups(), 2);
        // (day_2, control): g1 median of [1, 3] = 2; (day_4, treated): [10, 20] = 15
        assert_eq!(table.values()[[0, 0]], 2.0);
        assert_eq!(table.values()[[0, 1]], 15.0);
        assert_eq!(table.values()[[1, 0]], 3.0);
        assert_eq!(table.values()[[1, 1]], 35.0);
    }

    #[test]
    fn test_single_sample_group_passes_through() {
        let expr = ExpressionMatrix::new(
            array![[7.5]],
            vec!["g1".into()],
            vec!["s1".into()],
        )
        .unwrap();
        let meta = SampleMetadata::new(
            vec!["s1".into()],
            vec!["day_2".into()],
            vec!["control".into()],
        )
        .unwrap();

        let table = median_expression(&expr, &meta).unwrap();
        assert_eq!(table.values()[[0, 0]], 7.5);
    }

    #[test]
    fn test_column_order_independent_of_input_order() {
        // Same data as expression()/metadata() but samples shuffled
        let expr = ExpressionMatrix::new(
            array![[20.0, 1.0, 10.0, 3.0], [40.0, 2.0, 30.0, 4.0]],
            vec!["g1".into(), "g2".into()],
            vec!["s4".into(), "s1".into(), "s3".into(), "s2".into()],
        )
        .unwrap();

        let table = median_expression(&expr, &metadata()).unwrap();
        assert_eq!(
            table.groups(),
            &[
                ("day_2".to_string(), "control".to_string()),
                ("day_4".to_string(), "treated".to_string())
            ]
        );
        assert_eq!(table.values()[[0, 0]], 2.0);
        assert_eq!(table.values()[[0, 1]], 15.0);
    }

    #[test]
    fn test_partial_sample_overlap_rejected() {
        let meta = SampleMetadata::new(
            vec!["s1".into(), "s2".into(), "s3".into()],
            vec!["day_2".into(); 3],
            vec!["control".into(); 3],
        )
        .unwrap();
        assert!(median_expression(&expression(), &meta).is_err());
    }
}
