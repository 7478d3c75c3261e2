//! One full model run: subset, fit, forecast

use ndarray::Array2;

use crate::data::ModelInputs;
use crate::error::{NetdynError, Result};
use crate::model::dynamics::{ModelParams, NetworkDynamics};
use crate::model::integrate::{integrate, IntegrationOptions};
use crate::model::optimize::{fit_parameters, FitOptions, FitOutcome};

/// User-facing controls for a model run
///
/// Mirrors the interactive form: a gene selection from the module, uniform
/// initial decay rate and carrying capacity across the selection, and a
/// forecast horizon in days.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Genes to model; must be non-empty and present in the module
    pub genes: Vec<String>,
    /// Initial per-gene rate, applied uniformly
    pub decay_rate: f64,
    /// Initial per-gene carrying capacity, applied uniformly
    pub carrying_capacity: f64,
    /// Number of days to predict beyond day 0
    pub forecast_days: usize,
    /// Optimizer options
    pub fit: FitOptions,
    /// Integrator options
    pub integration: IntegrationOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            genes: Vec::new(),
            decay_rate: 0.5,
            carrying_capacity: 10.0,
            forecast_days: 7,
            fit: FitOptions::default(),
            integration: IntegrationOptions::default(),
        }
    }
}

/// Everything a presentation layer needs to display one run
#[derive(Debug, Clone)]
pub struct ModelOutcome {
    /// Genes modeled, in matrix row order
    pub gene_ids: Vec<String>,
    /// Fitted parameters, loss, and convergence status
    pub fit: FitOutcome,
    /// Time grid the fit was performed on (observed column indices)
    pub observed_time_points: Vec<f64>,
    /// Observed median expression (genes x observed time points)
    pub observed: Array2<f64>,
    /// Forecast time grid (integer days 0..=forecast_days)
    pub forecast_time_points: Vec<f64>,
    /// Predicted expression at the forecast grid (genes x forecast points)
    pub predicted: Array2<f64>,
}

/// Run the full modelling pipeline for one gene selection
///
/// Subsets the adjacency matrix and median-expression table to the selected
/// genes (consistent ordering on both), takes the first observed column as
/// initial conditions, fits the `[r, K]` parameters to the observed time
/// course, then integrates once more over the forecast grid with the fitted
/// parameters. Optimizer non-convergence is reported through the outcome's
/// flag, not as an error; integration divergence of the final forecast is.
pub fn run_model(inputs: &ModelInputs, config: &RunConfig) -> Result<ModelOutcome> {
    if config.genes.is_empty() {
        return Err(NetdynError::EmptySelection);
    }

    let adjacency = inputs.adjacency().subset(&config.genes)?;
    let medians = inputs.medians().subset_genes(&config.genes)?;

    let observed = medians.values().to_owned();
    // Fit on the observed column-index grid, matching the upstream
    // aggregation's canonical column order
    let observed_time_points: Vec<f64> = (0..medians.n_groups()).map(|t| t as f64).collect();
    let y0 = medians.column(0)?;

    let initial = ModelParams::uniform(
        config.genes.len(),
        config.decay_rate,
        config.carrying_capacity,
    )?;

    let dynamics = NetworkDynamics::new(&adjacency);
    log::info!(
        "Fitting {} genes over {} observed time points",
        config.genes.len(),
        observed_time_points.len()
    );

    let fit = fit_parameters(
        &dynamics,
        &initial,
        y0.view(),
        &observed_time_points,
        observed.view(),
        &config.fit,
        &config.integration,
    )?;

    if !fit.converged {
        log::warn!(
            "Optimizer did not converge (loss {:.6e} after {} evaluations); showing best fit found",
            fit.loss,
            fit.n_evals
        );
    } else {
        log::info!(
            "Fit converged: loss {:.6e} in {} iterations / {} evaluations",
            fit.loss,
            fit.n_iter,
            fit.n_evals
        );
    }

    let forecast_time_points: Vec<f64> = (0..=config.forecast_days).map(|t| t as f64).collect();
    let predicted = integrate(
        &dynamics,
        &fit.params,
        y0.view(),
        &forecast_time_points,
        &config.integration,
    )?;

    Ok(ModelOutcome {
        gene_ids: config.genes.clone(),
        fit,
        observed_time_points,
        observed,
        forecast_time_points,
        predicted,
    })
}
