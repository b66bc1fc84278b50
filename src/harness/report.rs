//! Per-case reports and run summaries

use std::fmt;
use std::time::Duration;

/// Outcome of one case
#[derive(Clone, Debug, PartialEq)]
pub enum Verdict {
    /// The device path behaved as expected
    Pass,
    /// The device path diverged from the expectation
    Fail {
        /// Human-readable description of the divergence
        reason: String,
        /// Largest comparison error, when a numeric comparison failed
        delta: Option<f64>,
    },
}

impl Verdict {
    /// Whether this verdict is `Pass`
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    pub(crate) fn fail(reason: impl Into<String>) -> Self {
        Self::Fail {
            reason: reason.into(),
            delta: None,
        }
    }
}

/// Result of running one case
#[derive(Clone, Debug)]
pub struct CaseReport {
    /// Case name
    pub name: String,
    /// Outcome
    pub verdict: Verdict,
    /// Host time spent inside the operator call (validation + enqueue)
    pub interface_time: Duration,
    /// Time spent waiting for the queue after the call returned
    pub device_time: Duration,
    /// Theoretical operation count of the case
    pub theory_ops: u64,
}

impl CaseReport {
    /// Theoretical operations per second over interface plus device time
    pub fn ops_per_sec(&self) -> Option<f64> {
        let secs = (self.interface_time + self.device_time).as_secs_f64();
        (self.theory_ops > 0 && secs > 0.0).then(|| self.theory_ops as f64 / secs)
    }
}

impl fmt::Display for CaseReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.verdict {
            Verdict::Pass => write!(f, "PASS {}", self.name)?,
            Verdict::Fail {
                reason,
                delta: Some(delta),
            } => write!(f, "FAIL {}: {reason} (delta {delta:.3e})", self.name)?,
            Verdict::Fail { reason, delta: None } => write!(f, "FAIL {}: {reason}", self.name)?,
        }
        write!(
            f,
            " [interface {:?}, device {:?}",
            self.interface_time, self.device_time
        )?;
        if let Some(ops) = self.ops_per_sec() {
            write!(f, ", {ops:.3e} ops/s")?;
        }
        f.write_str("]")
    }
}

/// Reports of a whole run
#[derive(Clone, Debug, Default)]
pub struct Summary {
    /// Reports in execution order
    pub reports: Vec<CaseReport>,
}

impl Summary {
    /// Number of passing cases
    pub fn passed(&self) -> usize {
        self.reports.iter().filter(|r| r.verdict.is_pass()).count()
    }

    /// Number of failing cases
    pub fn failed(&self) -> usize {
        self.reports.len() - self.passed()
    }

    /// Whether every case passed
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Reports of failing cases
    pub fn failures(&self) -> impl Iterator<Item = &CaseReport> {
        self.reports.iter().filter(|r| !r.verdict.is_pass())
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for report in &self.reports {
            writeln!(f, "{report}")?;
        }
        write!(f, "{} passed, {} failed", self.passed(), self.failed())
    }
}
