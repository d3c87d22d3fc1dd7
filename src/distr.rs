use crate::base::BaseDistribution;
use crate::dp::{PolyaPredictive, PolyaState};
use crate::error::{Result, UrnError};
use crate::urn::PolyaParameters;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

//

/// An online one-step-ahead predictive estimator for exchangeable data.
///
/// The streaming driver calls `init_state` once, then alternates
/// `cdf_est` (before seeing x) and `update` (after). `update` must depend only
/// on `(state, x)` so that any ordering of the same multiset yields the same
/// final predictive.
pub trait PredictiveMethod {
    type State;

    fn name(&self) -> &'static str;

    /// The distribution the method's prior is centered on; streams are drawn
    /// from it so that calibration checks compare like with like.
    fn truth(&self) -> BaseDistribution;

    /// `capacity` is the expected number of observations (a sizing hint only).
    fn init_state(&self, capacity: usize) -> Self::State;

    fn update(&self, state: Self::State, x: f64) -> Self::State;

    fn cdf_est(&self, state: &Self::State, t: f64) -> f64;

    fn cdf_est_grid(&self, state: &Self::State, t: &[f64]) -> Vec<f64> {
        t.iter().map(|&t| self.cdf_est(state, t)).collect()
    }

    /// Not-a-number where the predictive has no density.
    fn pdf_est(&self, state: &Self::State, x: f64) -> f64;

    fn pdf_est_grid(&self, state: &Self::State, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&x| self.pdf_est(state, x)).collect()
    }
}

//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MethodName {
    #[serde(rename = "polya_dp")]
    PolyaDp,
}

impl FromStr for MethodName {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "polya_dp" => Ok(MethodName::PolyaDp),
            _ => Err(UrnError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodName::PolyaDp => write!(f, "polya_dp"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Method {
    PolyaDp(PolyaPredictive),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MethodState {
    PolyaDp(PolyaState),
}

impl PredictiveMethod for Method {
    type State = MethodState;

    fn name(&self) -> &'static str {
        match self {
            Method::PolyaDp(m) => m.name(),
        }
    }

    fn truth(&self) -> BaseDistribution {
        match self {
            Method::PolyaDp(m) => m.truth(),
        }
    }

    fn init_state(&self, capacity: usize) -> MethodState {
        match self {
            Method::PolyaDp(m) => MethodState::PolyaDp(m.init_state(capacity)),
        }
    }

    fn update(&self, state: MethodState, x: f64) -> MethodState {
        match (self, state) {
            (Method::PolyaDp(m), MethodState::PolyaDp(s)) => MethodState::PolyaDp(m.update(s, x)),
        }
    }

    fn cdf_est(&self, state: &MethodState, t: f64) -> f64 {
        match (self, state) {
            (Method::PolyaDp(m), MethodState::PolyaDp(s)) => m.cdf_est(s, t),
        }
    }

    fn cdf_est_grid(&self, state: &MethodState, t: &[f64]) -> Vec<f64> {
        match (self, state) {
            (Method::PolyaDp(m), MethodState::PolyaDp(s)) => m.cdf_est_grid(s, t),
        }
    }

    fn pdf_est(&self, state: &MethodState, x: f64) -> f64 {
        match (self, state) {
            (Method::PolyaDp(m), MethodState::PolyaDp(s)) => m.pdf_est(s, x),
        }
    }
}

pub fn make_method(name: &str, alpha: f64, base: &str) -> Result<Method> {
    match name.parse::<MethodName>()? {
        MethodName::PolyaDp => Ok(Method::PolyaDp(PolyaPredictive::new(
            PolyaParameters::from_raw(alpha, base)?,
        ))),
    }
}
