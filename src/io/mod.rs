//! Input/Output for upstream artifacts and run results

mod csv;
mod results;

pub use self::csv::{
    read_adjacency_matrix, read_expression_matrix, read_hub_ranking, read_parameter_table,
    read_sample_metadata, ParameterTable,
};
pub use results::{
    write_fit_results, write_fit_summary, write_median_expression, write_predictions,
    write_trajectory, FitSummary,
};
