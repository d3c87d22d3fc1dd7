// Blackwell-MacQueen Polya urn

use crate::base::BaseDistribution;
use crate::error::{Result, UrnError};
use crate::prelude::*;

use rand::Rng;

/// The ordered atoms drawn so far. Grows by appending only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UrnState {
    xs: Vec<f64>,
}

impl UrnState {
    pub fn new() -> Self {
        Self { xs: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
        }
    }

    pub fn from_atoms(xs: Vec<f64>) -> Self {
        Self { xs }
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn atoms(&self) -> &[f64] {
        &self.xs[..]
    }

    pub fn into_atoms(self) -> Vec<f64> {
        self.xs
    }

    pub fn push(&mut self, x: f64) {
        self.xs.push(x)
    }

    /// K(t): the number of atoms less than or equal to `t`.
    pub fn count_leq(&self, t: f64) -> usize {
        self.xs.iter().filter(|&&x| x <= t).count()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PolyaParameters {
    alpha: Concentration,
    base: BaseDistribution,
}

impl PolyaParameters {
    pub fn new(alpha: Concentration, base: BaseDistribution) -> Self {
        Self { alpha, base }
    }

    /// Standard base by name, e.g. `PolyaParameters::from_raw(5.0, "uniform")`.
    pub fn from_raw(alpha: f64, base: &str) -> Result<Self> {
        Ok(Self::new(
            Concentration::new(alpha)?,
            BaseDistribution::from_name(base)?,
        ))
    }

    pub fn alpha(&self) -> Concentration {
        self.alpha
    }

    pub fn base(&self) -> &BaseDistribution {
        &self.base
    }

    pub fn with_alpha(&self, alpha: Concentration) -> Self {
        Self::new(alpha, self.base)
    }

    /// alpha / (alpha + m): chance that draw m+1 is a fresh atom from G0.
    pub fn probability_of_new(&self, m: usize) -> f64 {
        self.alpha / (self.alpha + m as f64)
    }

    /// (alpha G0(t) + k) / (alpha + m) for `k` of `m` atoms at or below `t`.
    /// With `m == 0` this is G0(t) exactly, without the alpha round trip.
    pub fn predictive_cdf_from_count(&self, m: usize, k: usize, t: f64) -> f64 {
        if m == 0 {
            return self.base.cdf(t);
        }
        (self.alpha * self.base.cdf(t) + k as f64) / (self.alpha + m as f64)
    }

    pub fn predictive_cdf(&self, urn: &UrnState, t: f64) -> f64 {
        self.predictive_cdf_from_count(urn.len(), urn.count_leq(t), t)
    }
}

pub fn draw_next<T: Rng + ?Sized>(urn: &UrnState, parameters: &PolyaParameters, rng: &mut T) -> f64 {
    let m = urn.len();
    // An empty urn forces a fresh draw since the probability is one.
    if rng.random::<f64>() < parameters.probability_of_new(m) {
        parameters.base.draw(rng)
    } else {
        urn.xs[rng.random_range(0..m)]
    }
}

/// Draws the next atom and appends it to the urn.
pub fn advance<T: Rng + ?Sized>(urn: &mut UrnState, parameters: &PolyaParameters, rng: &mut T) -> f64 {
    let x = draw_next(urn, parameters, rng);
    urn.push(x);
    x
}

/// Draws X_{n+1} given x_{1:n}, checking that `n` matches the history.
pub fn predictive_draw<T: Rng + ?Sized>(
    n: usize,
    history: &[f64],
    parameters: &PolyaParameters,
    rng: &mut T,
) -> Result<f64> {
    if n != history.len() {
        return Err(UrnError::HistoryLengthMismatch {
            n,
            len: history.len(),
        });
    }
    if rng.random::<f64>() < parameters.probability_of_new(n) {
        Ok(parameters.base.draw(rng))
    } else {
        Ok(history[rng.random_range(0..n)])
    }
}

pub fn build_prefix<T: Rng + ?Sized>(
    n_obs: usize,
    parameters: &PolyaParameters,
    rng: &mut T,
) -> UrnState {
    let mut urn = UrnState::with_capacity(n_obs);
    for _ in 0..n_obs {
        advance(&mut urn, parameters, rng);
    }
    urn
}

/// An unconditional draw of length `m`; the same path as `build_prefix`.
pub fn sample_prior<T: Rng + ?Sized>(m: usize, parameters: &PolyaParameters, rng: &mut T) -> UrnState {
    build_prefix(m, parameters, rng)
}

/// Treats `prefix` as fixed history and extends a copy of it to `target_length`.
pub fn continue_urn<T: Rng + ?Sized>(
    prefix: &UrnState,
    target_length: usize,
    parameters: &PolyaParameters,
    rng: &mut T,
) -> Result<UrnState> {
    if target_length < prefix.len() {
        return Err(UrnError::ContinuationTooShort {
            target: target_length,
            have: prefix.len(),
        });
    }
    let mut urn = UrnState::with_capacity(target_length);
    urn.xs.extend_from_slice(prefix.atoms());
    while urn.len() < target_length {
        advance(&mut urn, parameters, rng);
    }
    Ok(urn)
}
