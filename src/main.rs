//! netdyn command-line interface

use clap::Parser;
use log::{error, info, LevelFilter};
use ndarray::Array1;

use netdyn::cli::{Cli, Commands};
use netdyn::data::{median_expression, ModelInputs};
use netdyn::io::{
    read_adjacency_matrix, read_expression_matrix, read_hub_ranking, read_parameter_table,
    read_sample_metadata, write_fit_results, write_fit_summary, write_median_expression,
    write_predictions, write_trajectory,
};
use netdyn::model::{
    integrate, run_model, FitOptions, IntegrationOptions, ModelParams, NetworkDynamics, RunConfig,
};
use netdyn::Result;

/// Default number of hub genes modeled when no explicit selection is given
const DEFAULT_TOP_HUBS: usize = 10;

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Fit {
            expression,
            metadata,
            adjacency,
            hubs,
            genes,
            decay_rate,
            carrying_capacity,
            forecast_days,
            max_iter,
            max_evals,
            output,
            trajectory,
            summary,
        } => run_fit(
            &expression,
            &metadata,
            &adjacency,
            &hubs,
            genes,
            decay_rate,
            carrying_capacity,
            forecast_days,
            max_iter,
            max_evals,
            &output,
            trajectory.as_deref(),
            summary.as_deref(),
        ),
        Commands::Median {
            expression,
            metadata,
            output,
        } => run_median(&expression, &metadata, &output),
        Commands::Simulate {
            adjacency,
            params,
            days,
            output,
        } => run_simulate(&adjacency, &params, days, &output),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn run_fit(
    expression_path: &str,
    metadata_path: &str,
    adjacency_path: &str,
    hubs_path: &str,
    genes: Vec<String>,
    decay_rate: f64,
    carrying_capacity: f64,
    forecast_days: usize,
    max_iter: Option<usize>,
    max_evals: Option<usize>,
    output_path: &str,
    trajectory_path: Option<&str>,
    summary_path: Option<&str>,
) -> Result<()> {
    let expression = read_expression_matrix(expression_path)?;
    let metadata = read_sample_metadata(metadata_path)?;
    let adjacency = read_adjacency_matrix(adjacency_path)?;
    let hubs = read_hub_ranking(hubs_path)?;

    let medians = median_expression(&expression, &metadata)?;
    let inputs = ModelInputs::new(adjacency, medians, hubs)?;

    let genes = if genes.is_empty() {
        let selection = inputs.default_selection(DEFAULT_TOP_HUBS);
        info!(
            "No gene selection given; using top {} hub genes",
            selection.len()
        );
        selection
    } else {
        genes
    };

    let config = RunConfig {
        genes,
        decay_rate,
        carrying_capacity,
        forecast_days,
        fit: FitOptions {
            max_iter,
            max_evals,
            ..Default::default()
        },
        integration: IntegrationOptions::default(),
    };

    let outcome = run_model(&inputs, &config)?;

    info!(
        "Optimised rates: {:?}",
        outcome.fit.params.rates().to_vec()
    );
    info!(
        "Optimised carrying capacities: {:?}",
        outcome.fit.params.capacities().to_vec()
    );

    write_fit_results(output_path, &outcome)?;
    info!("Fitted parameters written to {}", output_path);

    if let Some(path) = trajectory_path {
        write_trajectory(path, &outcome)?;
        info!("Trajectory written to {}", path);
    }
    if let Some(path) = summary_path {
        write_fit_summary(path, &outcome)?;
        info!("Fit summary written to {}", path);
    }

    Ok(())
}

fn run_median(expression_path: &str, metadata_path: &str, output_path: &str) -> Result<()> {
    let expression = read_expression_matrix(expression_path)?;
    let metadata = read_sample_metadata(metadata_path)?;

    let medians = median_expression(&expression, &metadata)?;
    write_median_expression(output_path, &medians)?;
    info!(
        "Median expression table ({} genes x {} groups) written to {}",
        medians.n_genes(),
        medians.n_groups(),
        output_path
    );

    Ok(())
}

fn run_simulate(adjacency_path: &str, params_path: &str, days: usize, output_path: &str) -> Result<()> {
    let adjacency = read_adjacency_matrix(adjacency_path)?;
    let table = read_parameter_table(params_path)?;

    // The parameter table defines the gene selection and its order
    let adjacency = adjacency.subset(&table.gene_ids)?;
    let params = ModelParams::new(
        Array1::from_vec(table.rates),
        Array1::from_vec(table.capacities),
    )?;
    let y0 = Array1::from_vec(table.initial);

    let time_points: Vec<f64> = (0..=days).map(|t| t as f64).collect();
    let dynamics = NetworkDynamics::new(&adjacency);
    let predicted = integrate(
        &dynamics,
        &params,
        y0.view(),
        &time_points,
        &IntegrationOptions::default(),
    )?;

    write_predictions(output_path, &table.gene_ids, &time_points, predicted.view())?;
    info!(
        "Simulated {} genes over {} days; trajectory written to {}",
        table.gene_ids.len(),
        days,
        output_path
    );

    Ok(())
}
