//! Numeric comparison policy

use crate::dtype::DType;

/// How close a device result must be to the host reference.
///
/// References smaller in magnitude than `zero_threshold` are compared
/// absolutely (`|delta| <= atol`); all others relatively
/// (`|delta| / |reference| <= rtol`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tolerance {
    /// Absolute bound used near zero
    pub atol: f64,
    /// Relative bound used elsewhere
    pub rtol: f64,
    /// Magnitude below which the absolute bound applies
    pub zero_threshold: f64,
}

/// Result of comparing one element
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Comparison {
    /// Absolute or relative error, depending on which bound applied
    pub delta: f64,
    /// Whether the element is within tolerance
    pub passed: bool,
}

impl Tolerance {
    /// Create a tolerance
    pub const fn new(atol: f64, rtol: f64, zero_threshold: f64) -> Self {
        Self {
            atol,
            rtol,
            zero_threshold,
        }
    }

    /// Exact comparison
    pub const fn exact() -> Self {
        Self::new(0.0, 0.0, 0.5)
    }

    /// Default tolerance for results stored in `dtype`
    pub fn for_dtype(dtype: DType) -> Self {
        match dtype {
            DType::F64 => Self::new(1e-14, 1e-12, 1e-12),
            DType::F32 => Self::new(1e-6, 1e-5, 1e-5),
            DType::F16 | DType::BF16 => Self::new(0.1, 0.01, 0.1),
            DType::I32 | DType::I16 | DType::I8 | DType::U8 => Self::exact(),
        }
    }

    /// Replace the zero threshold
    pub fn with_zero_threshold(mut self, zero_threshold: f64) -> Self {
        self.zero_threshold = zero_threshold;
        self
    }

    /// Compare a device value against its reference
    pub fn compare(&self, actual: f64, reference: f64) -> Comparison {
        let diff = (actual - reference).abs();
        if reference.abs() < self.zero_threshold {
            Comparison {
                delta: diff,
                passed: diff <= self.atol,
            }
        } else {
            let delta = diff / reference.abs();
            Comparison {
                delta,
                passed: delta <= self.rtol,
            }
        }
    }
}
