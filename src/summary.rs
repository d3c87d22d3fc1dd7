use crate::coverage::CoverageRecord;
use crate::sim::EvaluationRecord;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageSummary {
    pub n: usize,
    pub threshold: f64,
    pub coverage: f64,
    pub mean_width: f64,
    pub replicates: usize,
}

/// Mean coverage and interval width per (n, threshold), ordered by n then
/// threshold. `replicates` counts distinct replicate ids.
pub fn coverage_summary(records: &[CoverageRecord]) -> Vec<CoverageSummary> {
    let mut sorted: Vec<&CoverageRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        a.n.cmp(&b.n)
            .then(a.threshold.total_cmp(&b.threshold))
            .then(a.replicate.cmp(&b.replicate))
    });
    let mut summaries = Vec::new();
    for group in sorted.chunk_by(|a, b| a.n == b.n && a.threshold == b.threshold) {
        let count = group.len() as f64;
        let mut replicates: Vec<usize> = group.iter().map(|r| r.replicate).collect();
        replicates.dedup();
        summaries.push(CoverageSummary {
            n: group[0].n,
            threshold: group[0].threshold,
            coverage: group.iter().filter(|r| r.covered).count() as f64 / count,
            mean_width: group.iter().map(|r| r.width).sum::<f64>() / count,
            replicates: replicates.len(),
        });
    }
    summaries
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PooledZ {
    pub values: Vec<f64>,
    pub mean: f64,
    pub sd: f64,
    /// Rows whose statistic was not finite (zero variance functional).
    pub skipped: usize,
}

/// Z = (P_n - F_hat) / sqrt(V_n / n) pooled over all rows. Under the
/// asymptotic normality being checked, Z is close to standard normal.
pub fn pooled_z(records: &[CoverageRecord]) -> PooledZ {
    let mut values = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for r in records {
        let z = (r.p_n - r.f_hat) / (r.v_nt / r.n as f64).sqrt();
        if z.is_finite() {
            values.push(z);
        } else {
            skipped += 1;
        }
    }
    let count = values.len() as f64;
    let mean = if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / count
    };
    let sd = if values.len() > 1 {
        (values.iter().map(|z| (z - mean) * (z - mean)).sum::<f64>() / (count - 1.0)).sqrt()
    } else {
        0.0
    };
    PooledZ {
        values,
        mean,
        sd,
        skipped,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spread {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Spread {
    fn of(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self {
            mean: values.iter().sum::<f64>() / values.len() as f64,
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceSummary {
    pub d_infty: Spread,
    pub d_rmse: Spread,
}

/// Mean, min and max of the recorded distances; `None` when no step has them.
pub fn distance_summary(records: &[EvaluationRecord]) -> Option<DistanceSummary> {
    let d_inf: Vec<f64> = records.iter().filter_map(|r| r.d_infty).collect();
    let d_rms: Vec<f64> = records.iter().filter_map(|r| r.d_rmse).collect();
    Some(DistanceSummary {
        d_infty: Spread::of(&d_inf)?,
        d_rmse: Spread::of(&d_rms)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::BaseName;

    fn record(replicate: usize, n: usize, threshold: f64, covered: bool, width: f64) -> CoverageRecord {
        CoverageRecord {
            replicate,
            n,
            alpha: 5.0,
            base: BaseName::Uniform,
            threshold,
            p_n: 0.5,
            v_nt: 0.25,
            level: 0.95,
            z: 1.959963984540054,
            tail_length: 100,
            f_hat: 0.45,
            lo: 0.4,
            hi: 0.6,
            covered,
            width,
        }
    }

    #[test]
    fn test_coverage_summary_groups() {
        let records = vec![
            record(1, 100, 0.5, true, 0.2),
            record(0, 100, 0.5, false, 0.4),
            record(0, 50, 0.5, true, 0.3),
            record(0, 100, 0.25, true, 0.1),
        ];
        let summary = coverage_summary(&records);
        assert_eq!(summary.len(), 3);
        assert_eq!((summary[0].n, summary[0].threshold), (50, 0.5));
        assert_eq!((summary[1].n, summary[1].threshold), (100, 0.25));
        let s = &summary[2];
        assert_eq!((s.n, s.threshold), (100, 0.5));
        assert_eq!(s.coverage, 0.5);
        assert!((s.mean_width - 0.3).abs() < 1e-15);
        assert_eq!(s.replicates, 2);
    }

    #[test]
    fn test_pooled_z() {
        let mut records = vec![record(0, 100, 0.5, true, 0.2), record(1, 100, 0.5, true, 0.2)];
        records[1].f_hat = 0.55;
        records.push(CoverageRecord {
            v_nt: 0.0,
            ..record(2, 100, 0.5, true, 0.2)
        });
        let z = pooled_z(&records);
        assert_eq!(z.values.len(), 2);
        assert_eq!(z.skipped, 1);
        assert!((z.values[0] - 1.0).abs() < 1e-12);
        assert!((z.values[1] + 1.0).abs() < 1e-12);
        assert!(z.mean.abs() < 1e-12);
        assert!((z.sd - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_distance_summary() {
        let row = |d: Option<f64>| EvaluationRecord {
            step: 0,
            method: "polya_dp".to_string(),
            observed_value: 0.0,
            pit: None,
            d_infty: d,
            d_rmse: d.map(|v| v / 2.0),
            seed: 0,
            n: 3,
        };
        let summary = distance_summary(&[row(None), row(Some(0.2)), row(Some(0.4))]).unwrap();
        assert!((summary.d_infty.mean - 0.3).abs() < 1e-15);
        assert_eq!(summary.d_infty.min, 0.2);
        assert_eq!(summary.d_infty.max, 0.4);
        assert_eq!(summary.d_rmse.max, 0.2);
        assert!(distance_summary(&[row(None)]).is_none());
    }
}
