use crate::error::{Result, UrnError};

/// Sup-norm distance between two CDFs evaluated on the same grid.
pub fn d_infty(c_est: &[f64], c_true: &[f64]) -> f64 {
    debug_assert_eq!(c_est.len(), c_true.len());
    c_est
        .iter()
        .zip(c_true.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}

/// Root-mean-square distance between two CDFs evaluated on the same grid.
pub fn d_rmse(c_est: &[f64], c_true: &[f64]) -> f64 {
    debug_assert_eq!(c_est.len(), c_true.len());
    let sum_sq: f64 = c_est
        .iter()
        .zip(c_true.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum();
    (sum_sq / c_est.len() as f64).sqrt()
}

/// `j` evenly spaced points from `tmin` to `tmax`, both endpoints included.
pub fn make_grid(j: usize, tmin: f64, tmax: f64) -> Result<Vec<f64>> {
    match j {
        0 => Err(UrnError::EmptyGrid),
        1 => Ok(vec![tmin]),
        _ => {
            let step = (tmax - tmin) / (j - 1) as f64;
            let mut grid: Vec<f64> = (0..j).map(|i| tmin + step * i as f64).collect();
            grid[j - 1] = tmax;
            Ok(grid)
        }
    }
}
