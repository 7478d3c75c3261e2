//! Sum-of-squared-errors objective for parameter fitting

use ndarray::{ArrayView1, ArrayView2};

use crate::error::{NetdynError, Result};
use crate::model::dynamics::{ModelParams, NetworkDynamics};
use crate::model::integrate::{integrate, IntegrationOptions};

/// Integrate the model at the observed time points and return the sum of
/// squared elementwise differences from the observed matrix
///
/// Shapes must match exactly: `observed` is genes x time points, aligned
/// with the adjacency's gene ordering and with `time_points`. Zero only for
/// a perfect fit. Every call integrates fresh; nothing is cached.
pub fn sum_squared_error(
    dynamics: &NetworkDynamics<'_>,
    params: &ModelParams,
    y0: ArrayView1<'_, f64>,
    time_points: &[f64],
    observed: ArrayView2<'_, f64>,
    opts: &IntegrationOptions,
) -> Result<f64> {
    let (n_genes, n_times) = observed.dim();
    if n_genes != dynamics.n_genes() {
        return Err(NetdynError::DimensionMismatch {
            expected: format!("observed data for {} genes", dynamics.n_genes()),
            got: format!("{} genes", n_genes),
        });
    }
    if n_times != time_points.len() {
        return Err(NetdynError::DimensionMismatch {
            expected: format!("observed data at {} time points", time_points.len()),
            got: format!("{} time points", n_times),
        });
    }

    let predicted = integrate(dynamics, params, y0, time_points, opts)?;

    let mut sse = 0.0;
    for i in 0..n_genes {
        for j in 0..n_times {
            let diff = predicted[[i, j]] - observed[[i, j]];
            sse += diff * diff;
        }
    }
    Ok(sse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AdjacencyMatrix;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_perfect_fit_gives_exactly_zero() {
        let adj = AdjacencyMatrix::new(ndarray::Array2::zeros((1, 1)), vec!["g1".into()]).unwrap();
        let dynamics = NetworkDynamics::new(&adj);
        let params = ModelParams::uniform(1, 0.5, 10.0).unwrap();
        let times = [0.0, 1.0, 2.0];
        let opts = IntegrationOptions::default();

        // Observed data generated by the model itself
        let observed = integrate(&dynamics, &params, array![1.0].view(), &times, &opts).unwrap();

        let loss = sum_squared_error(
            &dynamics,
            &params,
            array![1.0].view(),
            &times,
            observed.view(),
            &opts,
        )
        .unwrap();
        assert_eq!(loss, 0.0);
    }

    #[test]
    fn test_known_discrepancy() {
        // Single time point [0]: prediction is y0, so the loss is the squared
        // difference against the observed column.
        let adj = AdjacencyMatrix::new(ndarray::Array2::zeros((2, 2)), vec!["a".into(), "b".into()])
            .unwrap();
        let dynamics = NetworkDynamics::new(&adj);
        let params = ModelParams::uniform(2, 0.5, 10.0).unwrap();
        let observed = array![[3.0], [4.0]];

        let loss = sum_squared_error(
            &dynamics,
            &params,
            array![1.0, 1.0].view(),
            &[0.0],
            observed.view(),
            &IntegrationOptions::default(),
        )
        .unwrap();
        assert_abs_diff_eq!(loss, 4.0 + 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let adj = AdjacencyMatrix::new(ndarray::Array2::zeros((1, 1)), vec!["g1".into()]).unwrap();
        let dynamics = NetworkDynamics::new(&adj);
        let params = ModelParams::uniform(1, 0.5, 10.0).unwrap();
        let observed = array![[1.0, 2.0], [3.0, 4.0]]; // two genes, one modeled

        let result = sum_squared_error(
            &dynamics,
            &params,
            array![1.0].view(),
            &[0.0, 1.0],
            observed.view(),
            &IntegrationOptions::default(),
        );
        assert!(matches!(result, Err(NetdynError::DimensionMismatch { .. })));
    }
}
