use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Pearson chi-square test of `sample` against the distribution function
/// `cdf`, using the cells cut at `cut_points` (increasing). Adjacent cells are
/// pooled until each has an expected count of at least five. Returns a
/// message when the fit is rejected at level `alpha`.
pub fn assert_goodness_of_fit(
    n_samples: usize,
    mut sample: impl FnMut() -> f64,
    cut_points: &[f64],
    cdf: impl Fn(f64) -> f64,
    alpha: f64,
) -> Option<String> {
    let ns = n_samples as f64;
    let mut counts = vec![0_usize; cut_points.len() + 1];
    for _ in 0..n_samples {
        let x = sample();
        let cell = cut_points.partition_point(|&c| c < x);
        counts[cell] += 1;
    }
    let mut probs = Vec::with_capacity(counts.len());
    let mut previous = 0.0;
    for &c in cut_points {
        let current = cdf(c);
        probs.push(current - previous);
        previous = current;
    }
    probs.push(1.0 - previous);
    let threshold = 5.0;
    let mut chisq = 0.0;
    let mut df = 0;
    let mut observed = 0;
    let mut expected = 0.0;
    for (count, prob) in counts.iter().zip(probs.iter()) {
        observed += *count;
        expected += ns * prob;
        if expected >= threshold {
            let o = observed as f64;
            chisq += (o - expected) * (o - expected) / expected;
            df += 1;
            observed = 0;
            expected = 0.0;
        }
    }
    if df < 2 {
        return Some(format!("Too few cells with enough expected counts: {}", df));
    }
    let distr = ChiSquared::new((df - 1) as f64).unwrap();
    let p_value = 1.0 - distr.cdf(chisq);
    if p_value <= alpha {
        Some(format!(
            "Rejected goodness of fit test... p-value: {:.8}, chisq: {:.2}, df: {}",
            p_value, chisq, df
        ))
    } else {
        None
    }
}

/// Normal approximation check that `successes` out of `trials` is consistent
/// with probability `p`, rejecting when |z| exceeds `z_critical`.
pub fn assert_proportion(successes: usize, trials: usize, p: f64, z_critical: f64) -> Option<String> {
    let n = trials as f64;
    let observed = successes as f64 / n;
    let z_stat = (observed - p) / (p * (1.0 - p) / n).sqrt();
    if z_stat.abs() > z_critical {
        Some(format!(
            "Rejected proportion test... observed: {:.4}, expected: {:.4}, z: {:.2}",
            observed, p, z_stat
        ))
    } else {
        None
    }
}
