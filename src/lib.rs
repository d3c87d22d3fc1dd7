pub mod base;
pub mod config;
pub mod coverage;
pub mod distr;
pub mod dp;
pub mod error;
pub mod metrics;
pub mod panel;
pub mod prelude;
pub mod sim;
pub mod summary;
pub mod testing;
pub mod urn;

pub use coverage::{run_coverage_job, simulate_one_replicate, CoverageRecord};
pub use distr::{make_method, PredictiveMethod};
pub use error::{Result, UrnError};
pub use sim::{evaluate_stream, log_convergence, run_stream, EvaluationRecord};
