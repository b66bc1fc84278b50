//! Error types for kernelgate

use crate::dtype::DType;
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

/// Result type alias using kernelgate's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Status code returned across the host API boundary.
///
/// Validation failures always surface as [`Status::BadParam`]; statuses
/// produced by a device kernel are passed through unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    /// Operation completed (or was skipped because there was nothing to do)
    Success = 0,
    /// The runtime or handle was not initialized
    NotInitialized = 1,
    /// Device memory allocation failed
    AllocFailed = 2,
    /// One of the parameters failed validation
    BadParam = 3,
    /// Unexpected internal failure
    InternalError = 4,
    /// The kernel is not built for this device architecture
    ArchMismatch = 5,
    /// The device failed while executing submitted work
    ExecutionFailed = 6,
    /// The combination of arguments is valid but not implemented
    NotSupported = 7,
    /// The result could not be represented in the output dtype
    NumericalOverflow = 8,
}

impl Status {
    /// Whether this status denotes success
    #[inline]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "SUCCESS",
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::AllocFailed => "ALLOC_FAILED",
            Self::BadParam => "BAD_PARAM",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ArchMismatch => "ARCH_MISMATCH",
            Self::ExecutionFailed => "EXECUTION_FAILED",
            Self::NotSupported => "NOT_SUPPORTED",
            Self::NumericalOverflow => "NUMERICAL_OVERFLOW",
        };
        f.write_str(name)
    }
}

/// Which validation check rejected a call.
///
/// Used by test drivers to assert that an invalid input was rejected for the
/// expected reason rather than some unrelated one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    /// A required handle, descriptor or data pointer was absent
    NullArgument,
    /// Participating tensors disagree on scalar type
    DTypeMismatch,
    /// Input tensors disagree on number of dimensions
    RankMismatch,
    /// Input tensors disagree on an extent
    ShapeMismatch,
}

/// Errors that can occur while validating, dispatching or testing an operator
#[derive(Error, Debug)]
pub enum Error {
    /// A required handle, descriptor or data pointer is absent
    #[error("Null argument: '{arg}' must not be null")]
    NullArgument {
        /// Name of the missing argument
        arg: Cow<'static, str>,
    },

    /// DType mismatch between operands
    #[error("DType mismatch: {lhs:?} vs {rhs:?}")]
    DTypeMismatch {
        /// DType of the first participating tensor
        lhs: DType,
        /// First dtype that disagrees with it
        rhs: DType,
    },

    /// Rank mismatch between inputs
    #[error("Rank mismatch: {lhs} vs {rhs} dimensions")]
    RankMismatch {
        /// Rank of the first input
        lhs: usize,
        /// First rank that disagrees with it
        rhs: usize,
    },

    /// Shape mismatch between inputs
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// The device kernel rejected the launch
    #[error("Kernel launch failed: {0}")]
    Kernel(Status),

    /// DType needs a cargo feature that is not enabled
    #[error("DType {dtype:?} requires the '{feature}' feature")]
    FeatureRequired {
        /// The dtype that was requested
        dtype: DType,
        /// The feature that would enable it
        feature: &'static str,
    },

    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Work submitted to a queue failed asynchronously
    #[error("Queue error: {0}")]
    Queue(String),
}

impl Error {
    /// Create a null argument error
    pub fn null(arg: impl Into<Cow<'static, str>>) -> Self {
        Self::NullArgument { arg: arg.into() }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: &[usize], got: &[usize]) -> Self {
        Self::ShapeMismatch {
            expected: expected.to_vec(),
            got: got.to_vec(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// The validation check this error corresponds to, if any
    pub fn reason(&self) -> Option<Reason> {
        match self {
            Self::NullArgument { .. } => Some(Reason::NullArgument),
            Self::DTypeMismatch { .. } => Some(Reason::DTypeMismatch),
            Self::RankMismatch { .. } => Some(Reason::RankMismatch),
            Self::ShapeMismatch { .. } => Some(Reason::ShapeMismatch),
            _ => None,
        }
    }

    /// Status code reported to callers of the C-shaped entry points
    pub fn status(&self) -> Status {
        match self {
            Self::Kernel(status) => *status,
            Self::OutOfMemory { .. } => Status::AllocFailed,
            Self::Queue(_) => Status::ExecutionFailed,
            Self::FeatureRequired { .. } => Status::NotSupported,
            Self::NullArgument { .. }
            | Self::DTypeMismatch { .. }
            | Self::RankMismatch { .. }
            | Self::ShapeMismatch { .. }
            | Self::InvalidArgument { .. } => Status::BadParam,
        }
    }
}
