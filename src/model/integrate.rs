//! Adaptive Dormand-Prince RK4(5) integration of the network dynamics

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{NetdynError, Result};
use crate::model::dynamics::{ModelParams, NetworkDynamics};

/// Step-size control options for the integrator
#[derive(Debug, Clone)]
pub struct IntegrationOptions {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Minimum step size; falling to it with a rejected step is divergence
    pub h_min: f64,
    /// Maximum number of steps across the whole requested time span
    pub max_steps: usize,
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-9,
            h_min: 1e-12,
            max_steps: 100_000,
        }
    }
}

impl IntegrationOptions {
    fn validate(&self) -> Result<()> {
        if !self.rtol.is_finite() || self.rtol <= 0.0 {
            return Err(NetdynError::InvalidInput {
                reason: "rtol must be finite and > 0".to_string(),
            });
        }
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return Err(NetdynError::InvalidInput {
                reason: "atol must be finite and > 0".to_string(),
            });
        }
        if self.max_steps == 0 {
            return Err(NetdynError::InvalidInput {
                reason: "max_steps must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Check that requested output times are finite and strictly ascending
fn validate_time_points(time_points: &[f64]) -> Result<()> {
    if time_points.is_empty() {
        return Err(NetdynError::EmptyData {
            reason: "at least one time point is required".to_string(),
        });
    }
    if time_points.iter().any(|t| !t.is_finite()) {
        return Err(NetdynError::NonAscendingTimePoints {
            reason: "time points must be finite".to_string(),
        });
    }
    for w in time_points.windows(2) {
        if w[1] <= w[0] {
            return Err(NetdynError::NonAscendingTimePoints {
                reason: format!("{} followed by {}", w[0], w[1]),
            });
        }
    }
    Ok(())
}

// Dormand-Prince 4(5) tableau
const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights (advancing solution, local extrapolation)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Embedded 4th-order weights
const BL1: f64 = 5179.0 / 57600.0;
const BL3: f64 = 7571.0 / 16695.0;
const BL4: f64 = 393.0 / 640.0;
const BL5: f64 = -92097.0 / 339200.0;
const BL6: f64 = 187.0 / 2100.0;
const BL7: f64 = 1.0 / 40.0;

// Error weights: y5 - y4
const E1: f64 = B1 - BL1;
const E3: f64 = B3 - BL3;
const E4: f64 = B4 - BL4;
const E5: f64 = B5 - BL5;
const E6: f64 = B6 - BL6;
const E7: f64 = -BL7;

/// Integrate the network dynamics, returning the state at each requested
/// time point as a genes x time matrix
///
/// `time_points` must be strictly ascending; the first entry is the initial
/// time and its column is `y0` unchanged. A single time point returns `y0`
/// alone. Divergence (step underflow, step budget exhaustion, or a
/// non-finite state) is reported as [`NetdynError::IntegrationDiverged`].
pub fn integrate(
    dynamics: &NetworkDynamics<'_>,
    params: &ModelParams,
    y0: ArrayView1<'_, f64>,
    time_points: &[f64],
    opts: &IntegrationOptions,
) -> Result<Array2<f64>> {
    opts.validate()?;
    validate_time_points(time_points)?;

    let n = dynamics.n_genes();
    if y0.len() != n {
        return Err(NetdynError::DimensionMismatch {
            expected: format!("initial state of length {}", n),
            got: format!("length {}", y0.len()),
        });
    }
    if params.n_genes() != n {
        return Err(NetdynError::DimensionMismatch {
            expected: format!("parameters for {} genes", n),
            got: format!("parameters for {} genes", params.n_genes()),
        });
    }
    if y0.iter().any(|v| !v.is_finite()) {
        return Err(NetdynError::InvalidInput {
            reason: "initial state must be finite".to_string(),
        });
    }

    let n_times = time_points.len();
    let mut trajectory = Array2::zeros((n, n_times));
    trajectory.column_mut(0).assign(&y0);

    let mut t = time_points[0];
    let mut y = y0.to_owned();
    let span = time_points[n_times - 1] - t;
    let mut h = if span > 0.0 { (span * 1e-3).max(opts.h_min) } else { 0.0 };
    let mut steps_taken = 0usize;

    let mut k1 = Array1::zeros(n);
    let mut k2 = Array1::zeros(n);
    let mut k3 = Array1::zeros(n);
    let mut k4 = Array1::zeros(n);
    let mut k5 = Array1::zeros(n);
    let mut k6 = Array1::zeros(n);
    let mut k7 = Array1::zeros(n);
    let mut y_tmp = Array1::zeros(n);
    let mut y_new = Array1::zeros(n);

    dynamics.rhs(y.view(), params, &mut k1);

    for (out_col, &t_target) in time_points.iter().enumerate().skip(1) {
        while t < t_target {
            if steps_taken >= opts.max_steps {
                return Err(NetdynError::IntegrationDiverged {
                    t,
                    reason: format!("exceeded {} steps", opts.max_steps),
                });
            }
            steps_taken += 1;
            h = h.min(t_target - t);

            for i in 0..n {
                y_tmp[i] = y[i] + h * A21 * k1[i];
            }
            dynamics.rhs(y_tmp.view(), params, &mut k2);

            for i in 0..n {
                y_tmp[i] = y[i] + h * (A31 * k1[i] + A32 * k2[i]);
            }
            dynamics.rhs(y_tmp.view(), params, &mut k3);

            for i in 0..n {
                y_tmp[i] = y[i] + h * (A41 * k1[i] + A42 * k2[i] + A43 * k3[i]);
            }
            dynamics.rhs(y_tmp.view(), params, &mut k4);

            for i in 0..n {
                y_tmp[i] = y[i] + h * (A51 * k1[i] + A52 * k2[i] + A53 * k3[i] + A54 * k4[i]);
            }
            dynamics.rhs(y_tmp.view(), params, &mut k5);

            for i in 0..n {
                y_tmp[i] = y[i]
                    + h * (A61 * k1[i] + A62 * k2[i] + A63 * k3[i] + A64 * k4[i] + A65 * k5[i]);
            }
            dynamics.rhs(y_tmp.view(), params, &mut k6);

            for i in 0..n {
                y_new[i] =
                    y[i] + h * (B1 * k1[i] + B3 * k3[i] + B4 * k4[i] + B5 * k5[i] + B6 * k6[i]);
            }

            // FSAL stage
            dynamics.rhs(y_new.view(), params, &mut k7);

            let mut err_norm = 0.0;
            for i in 0..n {
                let ei = h
                    * (E1 * k1[i] + E3 * k3[i] + E4 * k4[i] + E5 * k5[i] + E6 * k6[i] + E7 * k7[i]);
                let sc = opts.atol + opts.rtol * y[i].abs().max(y_new[i].abs());
                err_norm += (ei / sc) * (ei / sc);
            }
            err_norm = (err_norm / n as f64).sqrt();

            if !err_norm.is_finite() || y_new.iter().any(|v| !v.is_finite()) {
                return Err(NetdynError::IntegrationDiverged {
                    t,
                    reason: "state became non-finite".to_string(),
                });
            }

            if err_norm <= 1.0 {
                t += h;
                y.assign(&y_new);
                k1.assign(&k7);
            } else if h <= opts.h_min {
                return Err(NetdynError::IntegrationDiverged {
                    t,
                    reason: format!(
                        "step size underflow (h = {:e}) with error {:.3} above tolerance",
                        h, err_norm
                    ),
                });
            }

            let factor = if err_norm == 0.0 {
                5.0
            } else {
                (0.9 * err_norm.powf(-0.2)).clamp(0.2, 5.0)
            };
            h = (h * factor).max(opts.h_min);
        }

        trajectory.column_mut(out_col).assign(&y);
    }

    Ok(trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::AdjacencyMatrix;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn single_gene() -> AdjacencyMatrix {
        AdjacencyMatrix::new(ndarray::Array2::zeros((1, 1)), vec!["g1".into()]).unwrap()
    }

    #[test]
    fn test_single_time_point_returns_initial_state() {
        let adj = single_gene();
        let dynamics = NetworkDynamics::new(&adj);
        let params = ModelParams::uniform(1, 0.5, 10.0).unwrap();

        let traj = integrate(
            &dynamics,
            &params,
            array![3.0].view(),
            &[0.0],
            &IntegrationOptions::default(),
        )
        .unwrap();

        assert_eq!(traj.dim(), (1, 1));
        assert_eq!(traj[[0, 0]], 3.0);
    }

    #[test]
    fn test_logistic_matches_closed_form() {
        // y(t) = K / (1 + (K/y0 - 1) e^{-rt}) for the standalone logistic
        let adj = single_gene();
        let dynamics = NetworkDynamics::new(&adj);
        let (r, k, y0) = (0.8, 10.0, 1.0);
        let params = ModelParams::uniform(1, r, k).unwrap();
        let times = [0.0, 1.0, 2.0, 5.0];

        let traj = integrate(
            &dynamics,
            &params,
            array![y0].view(),
            &times,
            &IntegrationOptions::default(),
        )
        .unwrap();

        for (col, &t) in times.iter().enumerate() {
            let expected = k / (1.0 + (k / y0 - 1.0) * (-r * t).exp());
            assert_abs_diff_eq!(traj[[0, col]], expected, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_logistic_monotone_and_bounded_by_capacity() {
        let adj = single_gene();
        let dynamics = NetworkDynamics::new(&adj);
        let params = ModelParams::uniform(1, 0.5, 10.0).unwrap();
        let times: Vec<f64> = (0..36).map(|i| i as f64).collect();

        let traj = integrate(
            &dynamics,
            &params,
            array![1.0].view(),
            &times,
            &IntegrationOptions::default(),
        )
        .unwrap();

        for col in 1..times.len() {
            assert!(traj[[0, col]] > traj[[0, col - 1]], "trajectory must increase");
            assert!(traj[[0, col]] <= 10.0 + 1e-6, "trajectory must stay below K");
        }
        // approaches K for large t
        assert_abs_diff_eq!(traj[[0, times.len() - 1]], 10.0, epsilon = 1e-3);
    }

    #[test]
    fn test_non_ascending_time_points_rejected() {
        let adj = single_gene();
        let dynamics = NetworkDynamics::new(&adj);
        let params = ModelParams::uniform(1, 0.5, 10.0).unwrap();

        let result = integrate(
            &dynamics,
            &params,
            array![1.0].view(),
            &[0.0, 1.0, 1.0],
            &IntegrationOptions::default(),
        );
        assert!(matches!(
            result,
            Err(NetdynError::NonAscendingTimePoints { .. })
        ));
    }

    #[test]
    fn test_divergent_system_reported() {
        // Strong positive self-interaction blows the state up exponentially;
        // with a tiny step budget the solver must fail loudly, not emit NaN.
        let adj = AdjacencyMatrix::new(array![[50.0]], vec!["g1".into()]).unwrap();
        let dynamics = NetworkDynamics::new(&adj);
        let params = ModelParams::uniform(1, 0.0, 10.0).unwrap();
        let opts = IntegrationOptions {
            max_steps: 25,
            ..Default::default()
        };

        let result = integrate(&dynamics, &params, array![1.0].view(), &[0.0, 100.0], &opts);
        assert!(matches!(
            result,
            Err(NetdynError::IntegrationDiverged { .. })
        ));
    }

    #[test]
    fn test_deterministic() {
        let adj = AdjacencyMatrix::new(
            array![[0.0, 0.1], [0.2, 0.0]],
            vec!["g1".into(), "g2".into()],
        )
        .unwrap();
        let dynamics = NetworkDynamics::new(&adj);
        let params = ModelParams::uniform(2, 0.5, 10.0).unwrap();
        let times = [0.0, 1.0, 2.0, 3.0];

        let a = integrate(
            &dynamics,
            &params,
            array![1.0, 1.0].view(),
            &times,
            &IntegrationOptions::default(),
        )
        .unwrap();
        let b = integrate(
            &dynamics,
            &params,
            array![1.0, 1.0].view(),
            &times,
            &IntegrationOptions::default(),
        )
        .unwrap();
        assert_eq!(a, b);
    }
}
