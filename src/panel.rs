// Continuation draws of the random probability P((-inf, t])

use crate::base::BaseDistribution;
use crate::config::PanelConfig;
use crate::error::{Result, UrnError};
use crate::prelude::*;
use crate::urn::{build_prefix, continue_urn, PolyaParameters};

use rand::SeedableRng;
use rand_pcg::Pcg64;
use statrs::distribution::Beta;
use tracing::debug;

/// Monte Carlo draws of the mass at each threshold for every
/// (threshold, alpha) cell, all conditioned on one observed prefix.
#[derive(Debug, Clone)]
pub struct PanelDraws {
    prefix: Vec<f64>,
    thresholds: Vec<f64>,
    alphas: Vec<f64>,
    n_draws: usize,
    draws: Vec<f64>,
}

impl PanelDraws {
    pub fn prefix(&self) -> &[f64] {
        &self.prefix[..]
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds[..]
    }

    pub fn alphas(&self) -> &[f64] {
        &self.alphas[..]
    }

    /// Draws for threshold row `i` and alpha column `j`.
    pub fn cell(&self, i: usize, j: usize) -> &[f64] {
        let start = (i * self.alphas.len() + j) * self.n_draws;
        &self.draws[start..start + self.n_draws]
    }

    /// K_n(t) over the observed prefix.
    pub fn count_leq(&self, t: f64) -> usize {
        self.prefix.iter().filter(|&&x| x <= t).count()
    }
}

/// Builds one prefix of length `n` from the urn with the first alpha, then
/// for every alpha simulates `draws` continuations of that same prefix to
/// total length `target_length`. Each continuation is reused across all
/// thresholds; the recorded mass is the fraction of the whole trajectory,
/// prefix included, at or below the threshold.
pub fn panel_draws(config: &PanelConfig) -> Result<PanelDraws> {
    config.validate()?;
    let base = BaseDistribution::standard(config.base);
    let rng = &mut Pcg64::seed_from_u64(config.seed);
    let first = PolyaParameters::new(Concentration::new(config.alphas[0])?, base);
    let prefix = build_prefix(config.n, &first, rng);

    let (n_rows, n_cols) = (config.thresholds.len(), config.alphas.len());
    let mut draws = vec![0.0; n_rows * n_cols * config.draws];
    let m = config.target_length as f64;
    for (j, &alpha) in config.alphas.iter().enumerate() {
        let parameters = first.with_alpha(Concentration::new(alpha)?);
        for r in 0..config.draws {
            let trajectory = continue_urn(&prefix, config.target_length, &parameters, rng)?;
            for (i, &t) in config.thresholds.iter().enumerate() {
                draws[(i * n_cols + j) * config.draws + r] = trajectory.count_leq(t) as f64 / m;
            }
        }
    }
    debug!(
        n = config.n,
        cells = n_rows * n_cols,
        draws = config.draws,
        "simulated continuation panels"
    );
    Ok(PanelDraws {
        prefix: prefix.into_atoms(),
        thresholds: config.thresholds.clone(),
        alphas: config.alphas.clone(),
        n_draws: config.draws,
        draws,
    })
}

/// Conjugate Beta(alpha G0(t) + k_n, alpha (1 - G0(t)) + n - k_n) law of the
/// limiting mass P((-inf, t]) given `k_n` of `n` observations at or below `t`.
pub fn beta_reference(
    base: &BaseDistribution,
    alpha: Concentration,
    t: f64,
    n: usize,
    k_n: usize,
) -> Result<Beta> {
    let g0 = base.cdf(t);
    let a = alpha * g0 + k_n as f64;
    let b = alpha * (1.0 - g0) + n.saturating_sub(k_n) as f64;
    Beta::new(a, b).map_err(|_| UrnError::DegenerateBeta { a, b })
}
