// Base distribution G0 (also the oracle truth when matched)

use crate::error::{Result, UrnError};

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use statrs::function::erf::erf;
use std::f64::consts::{PI, SQRT_2};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseName {
    Uniform,
    Normal,
}

impl FromStr for BaseName {
    type Err = UrnError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "uniform" => Ok(BaseName::Uniform),
            "normal" => Ok(BaseName::Normal),
            _ => Err(UrnError::UnknownBase(s.to_string())),
        }
    }
}

impl fmt::Display for BaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseName::Uniform => write!(f, "uniform"),
            BaseName::Normal => write!(f, "normal"),
        }
    }
}

/// A continuous reference distribution: Uniform(a, b) or Normal(mean, sd).
///
/// The scale parameters are not validated; `b <= a` or `sd <= 0` give
/// meaningless values rather than errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BaseDistribution {
    Uniform { a: f64, b: f64 },
    Normal { mean: f64, sd: f64 },
}

impl BaseDistribution {
    pub fn uniform(a: f64, b: f64) -> Self {
        BaseDistribution::Uniform { a, b }
    }

    pub fn normal(mean: f64, sd: f64) -> Self {
        BaseDistribution::Normal { mean, sd }
    }

    /// Uniform(0, 1) or Normal(0, 1).
    pub fn standard(name: BaseName) -> Self {
        match name {
            BaseName::Uniform => Self::uniform(0.0, 1.0),
            BaseName::Normal => Self::normal(0.0, 1.0),
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::standard(name.parse()?))
    }

    pub fn name(&self) -> BaseName {
        match self {
            BaseDistribution::Uniform { .. } => BaseName::Uniform,
            BaseDistribution::Normal { .. } => BaseName::Normal,
        }
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            BaseDistribution::Uniform { a, b } => a + (b - a) * rng.random::<f64>(),
            BaseDistribution::Normal { mean, sd } => {
                let z: f64 = StandardNormal.sample(rng);
                mean + sd * z
            }
        }
    }

    pub fn sample_with<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.draw(rng)).collect()
    }

    /// Draws `n` iid values from a fresh generator seeded by `seed`.
    pub fn sample(&self, n: usize, seed: u64) -> Vec<f64> {
        let mut rng = Pcg64::seed_from_u64(seed);
        self.sample_with(n, &mut rng)
    }

    pub fn cdf(&self, t: f64) -> f64 {
        match *self {
            BaseDistribution::Uniform { a, b } => ((t - a) / (b - a)).clamp(0.0, 1.0),
            BaseDistribution::Normal { mean, sd } => {
                let z = (t - mean) / sd;
                0.5 * (1.0 + erf(z / SQRT_2))
            }
        }
    }

    pub fn pdf(&self, x: f64) -> f64 {
        match *self {
            BaseDistribution::Uniform { a, b } => {
                if a <= x && x <= b {
                    1.0 / (b - a)
                } else {
                    0.0
                }
            }
            BaseDistribution::Normal { mean, sd } => {
                let z = (x - mean) / sd;
                (-0.5 * z * z).exp() / (2.0 * PI).sqrt() / sd
            }
        }
    }

    pub fn cdf_grid(&self, t: &[f64]) -> Vec<f64> {
        t.iter().map(|&t| self.cdf(t)).collect()
    }

    pub fn pdf_grid(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&x| self.pdf(x)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("uniform".parse::<BaseName>().unwrap(), BaseName::Uniform);
        assert_eq!("normal".parse::<BaseName>().unwrap(), BaseName::Normal);
        assert!(matches!(
            BaseDistribution::from_name("cauchy"),
            Err(UrnError::UnknownBase(_))
        ));
        assert_eq!(BaseName::Normal.to_string(), "normal");
    }

    #[test]
    fn test_uniform_cdf_pdf() {
        let g0 = BaseDistribution::uniform(0.0, 1.0);
        assert_eq!(g0.cdf(-0.5), 0.0);
        assert_eq!(g0.cdf(0.25), 0.25);
        assert_eq!(g0.cdf(1.5), 1.0);
        assert_eq!(g0.pdf(0.5), 1.0);
        assert_eq!(g0.pdf(1.0), 1.0);
        assert_eq!(g0.pdf(1.01), 0.0);
        let g = BaseDistribution::uniform(2.0, 6.0);
        assert_eq!(g.cdf(3.0), 0.25);
        assert_eq!(g.pdf(3.0), 0.25);
        assert_eq!(g.cdf_grid(&[0.0, 4.0, 7.0]), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_normal_cdf_pdf() {
        let g0 = BaseDistribution::standard(BaseName::Normal);
        assert!((g0.cdf(0.0) - 0.5).abs() < 1e-12);
        assert!((g0.pdf(0.0) - 1.0 / (2.0 * PI).sqrt()).abs() < 1e-12);
        assert!((g0.cdf(1.959963984540054) - 0.975).abs() < 1e-9);
        let g = BaseDistribution::normal(1.0, 2.0);
        assert!((g.cdf(1.0) - 0.5).abs() < 1e-12);
        assert!((g.pdf(1.0) - 0.5 / (2.0 * PI).sqrt()).abs() < 1e-12);
        assert_eq!(g.pdf_grid(&[1.0, 3.0]).len(), 2);
    }

    #[test]
    fn test_sample_is_seeded() {
        let g0 = BaseDistribution::standard(BaseName::Normal);
        let x = g0.sample(5000, 123);
        assert_eq!(x.len(), 5000);
        assert_eq!(x, g0.sample(5000, 123));
        let mean = x.iter().sum::<f64>() / 5000.0;
        let var = x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / 5000.0;
        assert!(mean.abs() < 0.1);
        assert!(0.8 < var.sqrt() && var.sqrt() < 1.2);
        let u = BaseDistribution::standard(BaseName::Uniform).sample(1000, 7);
        assert!(u.iter().all(|&v| (0.0..1.0).contains(&v)));
    }
}
