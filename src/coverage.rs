// Martingale variance and continuation-based coverage of the predictive CDF
//
// For a Polya urn x_1, x_2, ... the predictive P_m(t) is a martingale that
// converges almost surely to a random limit F(t). After n draws the interval
// P_n(t) +/- z sqrt(V_n(t) / n), with
//
//     V_n(t) = (1/n) sum_{m=1}^{n} m^2 (P_m(t) - P_{m-1}(t))^2,
//
// is an asymptotic confidence interval for F(t). The limit is approximated by
// continuing the same urn L more steps and taking the fraction of the
// continuation at or below t.

use crate::base::{BaseDistribution, BaseName};
use crate::config::CoverageConfig;
use crate::error::{Result, UrnError};
use crate::prelude::*;
use crate::urn::{advance, PolyaParameters, UrnState};

use rand::SeedableRng;
use rand_pcg::Pcg64;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Two-sided 95% standard normal critical value.
pub const Z_95: f64 = 1.959963984540054;

/// Multipliers of the replicate index and of n in `replicate_seed`.
pub const REPLICATE_STRIDE: u64 = 7919;
pub const SAMPLE_SIZE_STRIDE: u64 = 104_729;

const VARIANCE_FLOOR: f64 = 1e-12;

/// `seed + 7919 * replicate + 104729 * n` in wrapping u64 arithmetic.
///
/// Reproducibility of every coverage table depends on this exact formula; the
/// seed of a task never depends on which worker runs it.
pub fn replicate_seed(seed: u64, replicate: usize, n: usize) -> u64 {
    seed.wrapping_add(REPLICATE_STRIDE.wrapping_mul(replicate as u64))
        .wrapping_add(SAMPLE_SIZE_STRIDE.wrapping_mul(n as u64))
}

/// Critical value for a two-sided interval at `level`.
///
/// Only 95% is supported: any other level logs a warning and still returns
/// the 95% value.
pub fn critical_value(level: Level) -> f64 {
    if (level.unwrap() - 0.95).abs() >= 1e-12 {
        warn!(
            level = level.unwrap(),
            z = Z_95,
            "confidence level is not 0.95; using the 95% critical value"
        );
    }
    Z_95
}

#[derive(Debug, Clone)]
pub struct CoverageSettings {
    parameters: PolyaParameters,
    thresholds: Vec<f64>,
    tail_length: usize,
    level: Level,
    z: f64,
    seed: u64,
}

impl CoverageSettings {
    pub fn new(
        parameters: PolyaParameters,
        thresholds: Vec<f64>,
        tail_length: usize,
        level: Level,
        seed: u64,
    ) -> Result<Self> {
        if thresholds.is_empty() {
            return Err(UrnError::EmptyThresholds);
        }
        if tail_length == 0 {
            return Err(UrnError::ZeroContinuation);
        }
        Ok(Self {
            parameters,
            thresholds,
            tail_length,
            level,
            z: critical_value(level),
            seed,
        })
    }

    pub fn from_config(config: &CoverageConfig) -> Result<Self> {
        config.validate()?;
        Self::new(
            PolyaParameters::new(
                Concentration::new(config.alpha)?,
                BaseDistribution::standard(config.base),
            ),
            config.thresholds.clone(),
            config.tail_length,
            Level::new(config.level)?,
            config.seed,
        )
    }

    pub fn parameters(&self) -> &PolyaParameters {
        &self.parameters
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds[..]
    }

    pub fn z(&self) -> f64 {
        self.z
    }
}

/// One row per (replicate, n, threshold).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRecord {
    pub replicate: usize,
    pub n: usize,
    pub alpha: f64,
    pub base: BaseName,
    pub threshold: f64,
    /// Predictive P_n(t) at the end of the prefix.
    pub p_n: f64,
    /// Normalized variance functional V_n(t).
    pub v_nt: f64,
    pub level: f64,
    pub z: f64,
    /// Continuation length L.
    pub tail_length: usize,
    /// Fraction of the continuation at or below the threshold.
    pub f_hat: f64,
    pub lo: f64,
    pub hi: f64,
    pub covered: bool,
    pub width: f64,
}

struct ThresholdTrack {
    t: f64,
    g0: f64,
    count: usize,
    previous: f64,
    variance: f64,
    tail: usize,
}

/// Runs one self-contained replicate: a prefix of `n` urn draws, the variance
/// functional along it, then `L` further draws of the same urn.
pub fn simulate_one_replicate(
    n: usize,
    replicate: usize,
    settings: &CoverageSettings,
) -> Result<Vec<CoverageRecord>> {
    if n == 0 {
        return Err(UrnError::ZeroSampleSize);
    }
    let parameters = &settings.parameters;
    let alpha = parameters.alpha();
    let rng = &mut Pcg64::seed_from_u64(replicate_seed(settings.seed, replicate, n));
    let mut urn = UrnState::with_capacity(n + settings.tail_length);
    let mut tracks: Vec<ThresholdTrack> = settings
        .thresholds
        .iter()
        .map(|&t| {
            let g0 = parameters.base().cdf(t);
            ThresholdTrack {
                t,
                g0,
                count: 0,
                previous: g0,
                variance: 0.0,
                tail: 0,
            }
        })
        .collect();

    for m in 1..=n {
        let x = advance(&mut urn, parameters, rng);
        let mf = m as f64;
        for track in tracks.iter_mut() {
            if x <= track.t {
                track.count += 1;
            }
            let p_m = (alpha * track.g0 + track.count as f64) / (alpha + mf);
            let increment = p_m - track.previous;
            track.variance += mf * mf * increment * increment;
            track.previous = p_m;
        }
    }
    for track in tracks.iter_mut() {
        track.variance /= n as f64;
    }

    for _ in 0..settings.tail_length {
        let x = advance(&mut urn, parameters, rng);
        for track in tracks.iter_mut() {
            if x <= track.t {
                track.tail += 1;
            }
        }
    }

    let z = settings.z;
    let records = tracks
        .iter()
        .map(|track| {
            let p_n = track.previous;
            let f_hat = track.tail as f64 / settings.tail_length as f64;
            let se = (track.variance.max(VARIANCE_FLOOR) / n as f64).sqrt();
            let lo = p_n - z * se;
            let hi = p_n + z * se;
            CoverageRecord {
                replicate,
                n,
                alpha: alpha.unwrap(),
                base: parameters.base().name(),
                threshold: track.t,
                p_n,
                v_nt: track.variance,
                level: settings.level.unwrap(),
                z,
                tail_length: settings.tail_length,
                f_hat,
                lo,
                hi,
                covered: lo <= f_hat && f_hat <= hi,
                width: hi - lo,
            }
        })
        .collect();
    debug!(replicate, n, "finished coverage replicate");
    Ok(records)
}

/// Runs every (n, replicate) task of `config` and returns all rows sorted by
/// (replicate, n, threshold). The output does not depend on `config.workers`.
pub fn run_coverage_job(config: &CoverageConfig) -> Result<Vec<CoverageRecord>> {
    let settings = CoverageSettings::from_config(config)?;
    let tasks: Vec<(usize, usize)> = config
        .n_values
        .iter()
        .flat_map(|&n| (0..config.replicates).map(move |replicate| (n, replicate)))
        .collect();
    info!(
        tasks = tasks.len(),
        workers = config.workers,
        tail_length = config.tail_length,
        "running coverage job"
    );
    let run = |&(n, replicate): &(usize, usize)| simulate_one_replicate(n, replicate, &settings);
    let batches: Vec<Vec<CoverageRecord>> = match config.workers {
        1 => tasks.iter().map(run).collect::<Result<_>>()?,
        0 => tasks.par_iter().map(run).collect::<Result<_>>()?,
        workers => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .build()?;
            pool.install(|| tasks.par_iter().map(run).collect::<Result<_>>())?
        }
    };
    let mut records: Vec<CoverageRecord> = batches.into_iter().flatten().collect();
    records.sort_by(|a, b| {
        a.replicate
            .cmp(&b.replicate)
            .then(a.n.cmp(&b.n))
            .then(a.threshold.total_cmp(&b.threshold))
    });
    info!(rows = records.len(), "coverage job complete");
    Ok(records)
}
