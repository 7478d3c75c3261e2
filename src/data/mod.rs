//! Data structures for module expression and network inputs

mod adjacency;
mod expression;
mod hubs;
mod inputs;
mod median;
mod metadata;

pub use adjacency::AdjacencyMatrix;
pub use expression::ExpressionMatrix;
pub use hubs::HubRanking;
pub use inputs::ModelInputs;
pub use median::{median_expression, MedianExpression};
pub use metadata::SampleMetadata;
