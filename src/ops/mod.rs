//! Device operators
//!
//! Operators validate caller-supplied descriptors, plan a launch from the
//! handle's capability and hand the work to a device kernel. They never own
//! or read tensor data on the host.
//!
//! ```text
//! DotProduct<K: DotKernel>
//!   └── implements Operator
//!         └── dispatch(): validate → fast path → plan → K::launch
//! ```

pub mod dispatch;
mod dot;
pub mod validate;

pub use dispatch::{Dispatched, Operator, dispatch};
pub use dot::DotProduct;
pub use validate::{Operand, Validated, validate};
