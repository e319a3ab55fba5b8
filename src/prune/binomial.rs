use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{AdsmithError, AdsmithResult};

/// Log-space tail terms this far below the running sum no longer change an `f64` result.
const TAIL_CUTOFF: f64 = 50.0;
/// Factorials below this are summed exactly; above it the Stirling series is used.
const STIRLING_MIN: u64 = 32;

/// Exact one-sided binomial p-value `P(X <= clicks)` for `X ~ Binomial(impressions, target_rate)`.
///
/// Summed in log space so large impression counts do not underflow. The sum starts at the
/// observed count and walks away from the mode until terms become negligible, so the cost
/// depends on the spread of the distribution rather than on `clicks`.
pub fn binomial_less_p_value(clicks: u64, impressions: u64, target_rate: f64) -> AdsmithResult<f64> {
    check_counts(clicks, impressions)?;
    if !(0.0..=1.0).contains(&target_rate) {
        return Err(AdsmithError::validation(format!(
            "target rate must be within [0, 1], got {target_rate}"
        )));
    }
    if clicks == impressions || target_rate == 0.0 {
        return Ok(1.0);
    }
    if target_rate == 1.0 {
        return Ok(0.0);
    }

    let n = impressions as f64;
    let ln_p = target_rate.ln();
    let ln_q = (-target_rate).ln_1p();
    let odds = ln_p - ln_q;
    let ln_pmf = |k: u64| ln_choose(impressions, k) + k as f64 * ln_p + (impressions - k) as f64 * ln_q;
    let mode = (((n + 1.0) * target_rate).floor() as u64).min(impressions);

    if clicks <= mode {
        // Terms shrink monotonically below the mode.
        let mut term = ln_pmf(clicks);
        let mut acc = term;
        let mut i = clicks;
        while i > 0 && term > acc - TAIL_CUTOFF {
            term += (i as f64 / (n - i as f64 + 1.0)).ln() - odds;
            acc = log_add_exp(acc, term);
            i -= 1;
        }
        Ok(acc.exp().min(1.0))
    } else {
        // Complement of the upper tail, whose terms shrink above the mode.
        let mut i = clicks + 1;
        let mut term = ln_pmf(i);
        let mut acc = term;
        while i < impressions && term > acc - TAIL_CUTOFF {
            term += ((n - i as f64) / (i as f64 + 1.0)).ln() + odds;
            acc = log_add_exp(acc, term);
            i += 1;
        }
        Ok((1.0 - acc.exp()).clamp(0.0, 1.0))
    }
}

fn ln_choose(n: u64, k: u64) -> f64 {
    ln_factorial(n) - ln_factorial(k) - ln_factorial(n - k)
}

fn ln_factorial(m: u64) -> f64 {
    if m < STIRLING_MIN {
        return (2..=m).map(|i| (i as f64).ln()).sum();
    }
    let x = m as f64;
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    x * x.ln() - x
        + 0.5 * (std::f64::consts::TAU * x).ln()
        + inv * (1.0 / 12.0 - inv2 * (1.0 / 360.0 - inv2 / 1260.0))
}

fn log_add_exp(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };
    if lo == f64::NEG_INFINITY {
        return hi;
    }
    hi + (lo - hi).exp().ln_1p()
}

fn check_counts(clicks: u64, impressions: u64) -> AdsmithResult<()> {
    if impressions == 0 {
        return Err(AdsmithError::validation("impressions must be greater than 0"));
    }
    if clicks > impressions {
        return Err(AdsmithError::validation(format!(
            "clicks ({clicks}) must be between 0 and impressions ({impressions})"
        )));
    }
    Ok(())
}

/// Observed delivery counts for one artifact.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerformanceRecord {
    /// Artifact identifier as written by the sink.
    pub id: String,
    pub clicks: u64,
    pub impressions: u64,
}

/// Parse records from a JSON array.
pub fn records_from_json_str(s: &str) -> AdsmithResult<Vec<PerformanceRecord>> {
    serde_json::from_str(s)
        .map_err(|e| AdsmithError::serde(format!("parse performance records: {e}")))
}

/// Load records from a JSON file.
pub fn load_records(path: impl AsRef<Path>) -> AdsmithResult<Vec<PerformanceRecord>> {
    let path = path.as_ref();
    let f = File::open(path).map_err(|e| {
        AdsmithError::validation(format!("open records '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(BufReader::new(f))
        .map_err(|e| AdsmithError::serde(format!("parse performance records: {e}")))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// No evidence the rate is below target.
    Keep,
    /// Rate is significantly below target.
    Prune,
    /// Too few impressions to decide.
    Insufficient,
}

/// Outcome of testing one record.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CtrTest {
    pub id: String,
    pub observed_ctr: f64,
    pub p_value: f64,
    pub verdict: Verdict,
}

/// Keep/prune policy for the one-sided "rate below target" test.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrunePolicy {
    pub target_rate: f64,
    /// Significance level; `p < alpha` prunes.
    pub alpha: f64,
    /// Records below this many impressions are reported as insufficient.
    pub min_impressions: u64,
}

impl Default for PrunePolicy {
    fn default() -> Self {
        Self {
            target_rate: 0.001,
            alpha: 0.05,
            min_impressions: 1000,
        }
    }
}

impl PrunePolicy {
    pub fn validate(&self) -> AdsmithResult<()> {
        if !(self.target_rate > 0.0 && self.target_rate < 1.0) {
            return Err(AdsmithError::validation("target_rate must be within (0, 1)"));
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(AdsmithError::validation("alpha must be within (0, 1)"));
        }
        Ok(())
    }

    /// Test one record.
    pub fn evaluate(&self, record: &PerformanceRecord) -> AdsmithResult<CtrTest> {
        self.validate()?;
        let p_value = binomial_less_p_value(record.clicks, record.impressions, self.target_rate)
            .map_err(|e| AdsmithError::validation(format!("record '{}': {e}", record.id)))?;
        let verdict = if record.impressions < self.min_impressions {
            Verdict::Insufficient
        } else if p_value < self.alpha {
            Verdict::Prune
        } else {
            Verdict::Keep
        };
        Ok(CtrTest {
            id: record.id.clone(),
            observed_ctr: record.clicks as f64 / record.impressions as f64,
            p_value,
            verdict,
        })
    }

    /// Test every record, in input order.
    pub fn evaluate_all(&self, records: &[PerformanceRecord]) -> AdsmithResult<Vec<CtrTest>> {
        let out = records
            .iter()
            .map(|r| self.evaluate(r))
            .collect::<AdsmithResult<Vec<_>>>()?;
        let pruned = out.iter().filter(|t| t.verdict == Verdict::Prune).count();
        tracing::info!(records = out.len(), pruned, "evaluated performance records");
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/prune/binomial.rs"]
mod tests;
