// Dirichlet process (Polya sequence) predictive

use crate::base::BaseDistribution;
use crate::distr::PredictiveMethod;
use crate::urn::{PolyaParameters, UrnState};

/// One-step predictive CDF of a Dirichlet process with concentration alpha
/// and base G0:
///
/// `P_n((-inf, t]) = (alpha G0(t) + K_n(t)) / (alpha + n)`, where `K_n(t)` is
/// the number of observations at or below `t`.
///
/// The predictive has atoms at the observations, so it has no density and
/// `pdf_est` is NaN.
#[derive(Debug, Clone)]
pub struct PolyaPredictive {
    parameters: PolyaParameters,
}

/// The observations seen so far; their order is irrelevant to the predictive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyaState {
    urn: UrnState,
}

impl PolyaState {
    pub fn n_observed(&self) -> usize {
        self.urn.len()
    }

    pub fn observations(&self) -> &[f64] {
        self.urn.atoms()
    }
}

impl PolyaPredictive {
    pub fn new(parameters: PolyaParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &PolyaParameters {
        &self.parameters
    }
}

impl PredictiveMethod for PolyaPredictive {
    type State = PolyaState;

    fn name(&self) -> &'static str {
        "polya_dp"
    }

    fn truth(&self) -> BaseDistribution {
        *self.parameters.base()
    }

    fn init_state(&self, capacity: usize) -> PolyaState {
        PolyaState {
            urn: UrnState::with_capacity(capacity),
        }
    }

    fn update(&self, mut state: PolyaState, x: f64) -> PolyaState {
        state.urn.push(x);
        state
    }

    fn cdf_est(&self, state: &PolyaState, t: f64) -> f64 {
        self.parameters.predictive_cdf(&state.urn, t)
    }

    fn cdf_est_grid(&self, state: &PolyaState, t: &[f64]) -> Vec<f64> {
        let n = state.urn.len();
        let mut counts = vec![0_usize; t.len()];
        for &x in state.urn.atoms() {
            for (count, &tt) in counts.iter_mut().zip(t.iter()) {
                if x <= tt {
                    *count += 1;
                }
            }
        }
        counts
            .into_iter()
            .zip(t.iter())
            .map(|(k, &tt)| self.parameters.predictive_cdf_from_count(n, k, tt))
            .collect()
    }

    fn pdf_est(&self, _state: &PolyaState, _x: f64) -> f64 {
        f64::NAN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::BaseName;
    use crate::metrics::make_grid;
    use crate::prelude::*;
    use proptest::prelude::*;

    fn polya(alpha: f64, base: BaseName) -> PolyaPredictive {
        PolyaPredictive::new(PolyaParameters::new(
            Concentration::new(alpha).unwrap(),
            BaseDistribution::standard(base),
        ))
    }

    fn fit(method: &PolyaPredictive, xs: &[f64]) -> PolyaState {
        xs.iter()
            .fold(method.init_state(xs.len()), |state, &x| method.update(state, x))
    }

    #[test]
    fn test_order_invariance() {
        let n = 200;
        let g0 = BaseDistribution::standard(BaseName::Uniform);
        let x = g0.sample(n, 42);
        let grid = make_grid(50, 0.0, 1.0).unwrap();
        let method = polya(5.0, BaseName::Uniform);
        let forward = fit(&method, &x);
        let reversed: Vec<f64> = x.iter().rev().copied().collect();
        let backward = fit(&method, &reversed);
        assert_eq!(
            method.cdf_est_grid(&forward, &grid),
            method.cdf_est_grid(&backward, &grid)
        );
    }

    #[test]
    fn test_no_observations_is_base() {
        for base in [BaseName::Uniform, BaseName::Normal] {
            let method = polya(5.0, base);
            let state = method.init_state(0);
            let g0 = BaseDistribution::standard(base);
            for t in [-1.5, 0.0, 0.1, 0.37, 2.0] {
                assert_eq!(method.cdf_est(&state, t), g0.cdf(t));
            }
        }
    }

    #[test]
    fn test_grid_matches_pointwise() {
        let method = polya(1.5, BaseName::Normal);
        let state = fit(&method, &[-0.3, 0.0, 0.0, 1.2, 2.5]);
        let grid = make_grid(41, -4.0, 4.0).unwrap();
        let pointwise: Vec<f64> = grid.iter().map(|&t| method.cdf_est(&state, t)).collect();
        assert_eq!(method.cdf_est_grid(&state, &grid), pointwise);
    }

    #[test]
    fn test_pdf_is_nan() {
        let method = polya(5.0, BaseName::Uniform);
        let state = fit(&method, &[0.5]);
        assert!(method.pdf_est(&state, 0.5).is_nan());
        assert_eq!(state.n_observed(), 1);
        assert_eq!(state.observations(), &[0.5]);
    }

    proptest! {
        #[test]
        fn prop_closed_form_identity(
            alpha in 0.01f64..50.0,
            xs in proptest::collection::vec(0.0f64..1.0, 1..60),
            t in -0.5f64..1.5,
        ) {
            let method = polya(alpha, BaseName::Uniform);
            let state = fit(&method, &xs);
            let k = xs.iter().filter(|&&x| x <= t).count() as f64;
            let g0 = BaseDistribution::standard(BaseName::Uniform).cdf(t);
            let expected = (alpha * g0 + k) / (alpha + xs.len() as f64);
            prop_assert_eq!(method.cdf_est(&state, t), expected);
        }

        #[test]
        fn prop_bounded_and_monotone(
            alpha in 0.01f64..50.0,
            xs in proptest::collection::vec(-3.0f64..3.0, 0..80),
        ) {
            let method = polya(alpha, BaseName::Normal);
            let state = fit(&method, &xs);
            let grid = make_grid(101, -5.0, 5.0).unwrap();
            let cdf = method.cdf_est_grid(&state, &grid);
            for value in &cdf {
                prop_assert!((0.0..=1.0 + 1e-12).contains(value));
            }
            for pair in cdf.windows(2) {
                prop_assert!(pair[1] >= pair[0] - 1e-12);
            }
        }

        #[test]
        fn prop_any_permutation_gives_same_predictive(
            xs in proptest::collection::vec(0.0f64..1.0, 1..60),
            rotate in 0usize..60,
        ) {
            let method = polya(3.0, BaseName::Uniform);
            let mut permuted = xs.clone();
            let shift = rotate % permuted.len();
            permuted.rotate_left(shift);
            permuted.reverse();
            let grid = make_grid(25, 0.0, 1.0).unwrap();
            prop_assert_eq!(
                method.cdf_est_grid(&fit(&method, &xs), &grid),
                method.cdf_est_grid(&fit(&method, &permuted), &grid)
            );
        }
    }
}
