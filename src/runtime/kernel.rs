//! Device kernel boundary
//!
//! Operators never compute on device data themselves. After validation and
//! planning they hand the launch to a [`DotKernel`], which enqueues work on
//! the handle's queue and reports a [`Status`] for the enqueue itself.

use super::{LaunchConfig, Queue};
use crate::dtype::DType;
use crate::error::Status;
use std::sync::Arc;

/// Opaque dot-product device routine.
///
/// `launch` must return promptly: any status it returns describes the launch,
/// while failures during execution surface at the next queue synchronization.
pub trait DotKernel: Send + Sync {
    /// Enqueue `out[0] = sum(x[i] * y[i])` over `element_count` elements
    #[allow(clippy::too_many_arguments)]
    fn launch(
        &self,
        config: &LaunchConfig,
        queue: &Queue,
        dtype: DType,
        x: u64,
        y: u64,
        out: u64,
        element_count: usize,
    ) -> Status;
}

impl<K: DotKernel + ?Sized> DotKernel for &K {
    fn launch(
        &self,
        config: &LaunchConfig,
        queue: &Queue,
        dtype: DType,
        x: u64,
        y: u64,
        out: u64,
        element_count: usize,
    ) -> Status {
        (**self).launch(config, queue, dtype, x, y, out, element_count)
    }
}

impl<K: DotKernel + ?Sized> DotKernel for Arc<K> {
    fn launch(
        &self,
        config: &LaunchConfig,
        queue: &Queue,
        dtype: DType,
        x: u64,
        y: u64,
        out: u64,
        element_count: usize,
    ) -> Status {
        (**self).launch(config, queue, dtype, x, y, out, element_count)
    }
}

impl<K: DotKernel + ?Sized> DotKernel for Box<K> {
    fn launch(
        &self,
        config: &LaunchConfig,
        queue: &Queue,
        dtype: DType,
        x: u64,
        y: u64,
        out: u64,
        element_count: usize,
    ) -> Status {
        (**self).launch(config, queue, dtype, x, y, out, element_count)
    }
}
