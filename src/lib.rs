//! netdyn: dynamic modelling of gene co-expression module expression
//!
//! This crate models the expression trajectories of a co-expression module's
//! genes with a coupled logistic growth/decay ODE system over the module's
//! signed weighted interaction graph, and fits the per-gene rate and
//! carrying-capacity parameters to observed median expression time courses
//! by nonlinear least squares.
//!
//! # Example
//!
//! ```ignore
//! use netdyn::prelude::*;
//!
//! // Load upstream artifacts
//! let expression = read_expression_matrix("tpm.csv")?;
//! let metadata = read_sample_metadata("metadata.csv")?;
//! let adjacency = read_adjacency_matrix("maroon_adjmat.csv")?;
//! let hubs = read_hub_ranking("top_hub_genes.csv")?;
//!
//! // Fit the top hub genes and forecast a week ahead
//! let outcome = fit_module(expression, metadata, adjacency, hubs, RunConfig::default())?;
//! println!("loss = {}", outcome.fit.loss);
//! ```

pub mod cli;
pub mod data;
pub mod error;
pub mod io;
pub mod model;
pub mod stats;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::data::{
        median_expression, AdjacencyMatrix, ExpressionMatrix, HubRanking, MedianExpression,
        ModelInputs, SampleMetadata,
    };
    pub use crate::error::{NetdynError, Result};
    pub use crate::io::{
        read_adjacency_matrix, read_expression_matrix, read_hub_ranking, read_sample_metadata,
        write_fit_results, write_fit_summary, write_trajectory,
    };
    pub use crate::model::{
        fit_parameters, integrate, run_model, sum_squared_error, FitOptions, FitOutcome,
        IntegrationOptions, ModelOutcome, ModelParams, NetworkDynamics, RunConfig,
    };
    pub use crate::fit_module;
}

pub use error::{NetdynError, Result};

use data::{median_expression, AdjacencyMatrix, ExpressionMatrix, HubRanking, ModelInputs,
    SampleMetadata};
use model::{run_model, ModelOutcome, RunConfig};

/// Number of hub genes modeled when the configuration leaves the gene
/// selection empty
const DEFAULT_TOP_HUBS: usize = 10;

/// Run the complete modelling pipeline from raw upstream artifacts
///
/// Aggregates per-sample expression to (time, treatment) medians, bundles
/// and validates the inputs, defaults an empty gene selection to the top
/// hub genes, fits the model, and forecasts. See [`model::run_model`] for
/// the run semantics.
pub fn fit_module(
    expression: ExpressionMatrix,
    metadata: SampleMetadata,
    adjacency: AdjacencyMatrix,
    hubs: HubRanking,
    mut config: RunConfig,
) -> Result<ModelOutcome> {
    let medians = median_expression(&expression, &metadata)?;
    let inputs = ModelInputs::new(adjacency, medians, hubs)?;

    if config.genes.is_empty() {
        config.genes = inputs.default_selection(DEFAULT_TOP_HUBS);
    }

    run_model(&inputs, &config)
}
