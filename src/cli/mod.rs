//! Command-line interface for netdyn

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "netdyn")]
#[command(version)]
#[command(about = "Coupled logistic ODE modelling of gene co-expression module dynamics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fit the network model to an observed expression time course
    #[command(
        about = "Fit the network model to an observed expression time course",
        long_about = "Fit the network model to an observed expression time course\n\n\
            Aggregates per-sample expression to (time, treatment) medians, fits the\n\
            per-gene rate and carrying-capacity parameters against the observed time\n\
            course by Nelder-Mead least squares, then forecasts forward from day 0.",
        after_long_help = "\
Examples:
  # Fit the top 10 hub genes with default initial parameters
  netdyn fit -e tpm.csv -m metadata.csv -a maroon_adjmat.csv \\
    --hubs top_hub_genes.csv -o fit.tsv

  # Fit a specific gene selection, forecast 14 days, write all outputs
  netdyn fit -e tpm.csv -m metadata.csv -a maroon_adjmat.csv --hubs hubs.csv \\
    -g Tcl1 -g Nanog --decay-rate 0.3 --carrying-capacity 20 \\
    --forecast-days 14 -o fit.tsv --trajectory traj.csv --summary fit.json"
    )]
    Fit {
        /// Path to the expression matrix CSV/TSV (genes x samples)
        #[arg(short, long,
            long_help = "Path to the expression matrix CSV/TSV file.\n\
                Format: first column = gene IDs, remaining columns = abundance per sample.\n\
                CSV (comma) and TSV (tab) delimiters are auto-detected.")]
        expression: String,

        /// Path to the sample metadata CSV/TSV
        #[arg(short, long,
            long_help = "Path to the sample metadata CSV/TSV file.\n\
                Required columns (any order): sample, time, treatment.")]
        metadata: String,

        /// Path to the module adjacency matrix CSV/TSV
        #[arg(short, long,
            long_help = "Path to the module adjacency matrix CSV/TSV file.\n\
                Square table with the module's gene IDs as both header and first column.")]
        adjacency: String,

        /// Path to the hub-gene ranking CSV/TSV
        #[arg(long,
            long_help = "Path to the hub-gene ranking CSV/TSV file.\n\
                Required columns: gene, connectivity. Used for the default gene\n\
                selection when --gene is not given.")]
        hubs: String,

        /// Gene to model (repeatable; default: top 10 hub genes)
        #[arg(short, long = "gene", value_name = "GENE")]
        genes: Vec<String>,

        /// Initial decay/growth rate applied uniformly across selected genes
        #[arg(long, default_value_t = 0.5)]
        decay_rate: f64,

        /// Initial carrying capacity applied uniformly across selected genes
        #[arg(long, default_value_t = 10.0)]
        carrying_capacity: f64,

        /// Number of days to predict
        #[arg(long, default_value_t = 7)]
        forecast_days: usize,

        /// Optimizer iteration budget (default: 200 per parameter)
        #[arg(long)]
        max_iter: Option<usize>,

        /// Optimizer evaluation budget (default: 400 per parameter)
        #[arg(long)]
        max_evals: Option<usize>,

        /// Output path for the fitted parameter table (TSV)
        #[arg(short, long, default_value = "fit_results.tsv")]
        output: String,

        /// Optional output path for the observed-vs-predicted trajectory (CSV)
        #[arg(long)]
        trajectory: Option<String>,

        /// Optional output path for the JSON fit summary
        #[arg(long)]
        summary: Option<String>,
    },

    /// Aggregate per-sample expression to (time, treatment) medians
    Median {
        /// Path to the expression matrix CSV/TSV (genes x samples)
        #[arg(short, long)]
        expression: String,

        /// Path to the sample metadata CSV/TSV
        #[arg(short, long)]
        metadata: String,

        /// Output path for the median expression table (CSV)
        #[arg(short, long, default_value = "median_expression.csv")]
        output: String,
    },

    /// Integrate the model forward with explicit parameters (no fitting)
    Simulate {
        /// Path to the module adjacency matrix CSV/TSV
        #[arg(short, long)]
        adjacency: String,

        /// Path to the parameter table CSV/TSV
        #[arg(short, long,
            long_help = "Path to the parameter table CSV/TSV file.\n\
                Required columns: gene, rate, carrying_capacity, initial.\n\
                Rows must cover exactly the genes to simulate.")]
        params: String,

        /// Number of days to simulate
        #[arg(long, default_value_t = 7)]
        days: usize,

        /// Output path for the predicted trajectory (CSV)
        #[arg(short, long, default_value = "trajectory.csv")]
        output: String,
    },
}
