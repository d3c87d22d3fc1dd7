// Prequential (one-step-ahead) evaluation of a predictive method on a stream

use crate::config::StreamConfig;
use crate::distr::PredictiveMethod;
use crate::error::{Result, UrnError};
use crate::metrics::{d_infty, d_rmse, make_grid};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One row per step of a stream. `step` is zero based; the first step has no
/// predictive yet, so its PIT and distances are missing, and distances are
/// missing on steps skipped by the thinning schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub step: usize,
    pub method: String,
    pub observed_value: f64,
    pub pit: Option<f64>,
    pub d_infty: Option<f64>,
    pub d_rmse: Option<f64>,
    pub seed: u64,
    pub n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceRow {
    pub step: usize,
    pub d_infty: f64,
    pub d_rmse: f64,
}

/// `p_m` is the predictive P_m(t) after the first `m` observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRow {
    pub m: usize,
    pub t: f64,
    pub p_m: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceLog {
    pub distances: Vec<DistanceRow>,
    pub paths: Vec<PathRow>,
}

/// Scores `method` on `data`, evaluating before each update.
pub fn evaluate_stream<M: PredictiveMethod>(
    method: &M,
    data: &[f64],
    grid: &[f64],
    record_every: usize,
    seed: u64,
) -> Result<Vec<EvaluationRecord>> {
    if grid.is_empty() {
        return Err(UrnError::EmptyGrid);
    }
    if record_every == 0 {
        return Err(UrnError::InvalidRecordEvery);
    }
    let n = data.len();
    let c_true = method.truth().cdf_grid(grid);
    let mut state = method.init_state(n);
    let mut records = Vec::with_capacity(n);
    for (i, &x_i) in data.iter().enumerate() {
        let (pit, d_inf, d_rms) = if i == 0 {
            (None, None, None)
        } else {
            let pit = method.cdf_est(&state, x_i);
            if i % record_every == 0 || i == n - 1 {
                let c_est = method.cdf_est_grid(&state, grid);
                (
                    Some(pit),
                    Some(d_infty(&c_est, &c_true)),
                    Some(d_rmse(&c_est, &c_true)),
                )
            } else {
                (Some(pit), None, None)
            }
        };
        records.push(EvaluationRecord {
            step: i,
            method: method.name().to_string(),
            observed_value: x_i,
            pit,
            d_infty: d_inf,
            d_rmse: d_rms,
            seed,
            n,
        });
        state = method.update(state, x_i);
    }
    Ok(records)
}

/// Draws `n` iid values from the truth matched to the method's base and
/// scores the method on them.
pub fn run_stream(config: &StreamConfig) -> Result<Vec<EvaluationRecord>> {
    let method = config.build_method()?;
    let data = method.truth().sample(config.n, config.seed);
    let grid = make_grid(config.grid_size, config.tmin, config.tmax)?;
    debug!(
        method = method.name(),
        n = config.n,
        grid_size = config.grid_size,
        seed = config.seed,
        "running prequential stream"
    );
    evaluate_stream(&method, &data, &grid, config.record_every, config.seed)
}

/// Grid distances at every step after the first, and the predictive path
/// P_m(t) for each threshold, both evaluated before the update with x_m.
pub fn log_convergence(config: &StreamConfig, thresholds: &[f64]) -> Result<ConvergenceLog> {
    if thresholds.is_empty() {
        return Err(UrnError::EmptyThresholds);
    }
    let method = config.build_method()?;
    let data = method.truth().sample(config.n, config.seed);
    let grid = make_grid(config.grid_size, config.tmin, config.tmax)?;
    let c_true = method.truth().cdf_grid(&grid);
    let mut log = ConvergenceLog {
        distances: Vec::with_capacity(config.n.saturating_sub(1)),
        paths: Vec::with_capacity(config.n.saturating_sub(1) * thresholds.len()),
    };
    let mut state = method.init_state(config.n);
    for (i, &x_i) in data.iter().enumerate() {
        if i > 0 {
            let c_est = method.cdf_est_grid(&state, &grid);
            log.distances.push(DistanceRow {
                step: i,
                d_infty: d_infty(&c_est, &c_true),
                d_rmse: d_rmse(&c_est, &c_true),
            });
            for (&t, p_m) in thresholds
                .iter()
                .zip(method.cdf_est_grid(&state, thresholds))
            {
                log.paths.push(PathRow { m: i, t, p_m });
            }
        }
        state = method.update(state, x_i);
    }
    debug!(
        n = config.n,
        n_thresholds = thresholds.len(),
        "logged convergence path"
    );
    Ok(log)
}
