//! Tensor metadata types
//!
//! Operators in this crate never own tensor data. They see a tensor as a
//! [`TensorDescriptor`] (dtype + shape) plus a device pointer.

mod descriptor;
mod shape;

pub use descriptor::TensorDescriptor;
pub use shape::Shape;
