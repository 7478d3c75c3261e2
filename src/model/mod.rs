//! The dynamic-modelling core: dynamics, integration, objective, fitting

mod dynamics;
mod integrate;
mod objective;
mod optimize;
mod run;

pub use dynamics::{ModelParams, NetworkDynamics, K_FLOOR};
pub use integrate::{integrate, IntegrationOptions};
pub use objective::sum_squared_error;
pub use optimize::{fit_parameters, FitOptions, FitOutcome};
pub use run::{run_model, ModelOutcome, RunConfig};
