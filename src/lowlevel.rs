//! Low-level building blocks for custom alignment loops.
//!
//! These items expose the sampler, the kernel strategies and the
//! floating-point mode control used by [`Evaluator`](crate::Evaluator). Most
//! users should prefer the evaluator, which picks a kernel once and wraps
//! each call in tracing.

pub use crate::cpu::{simd_support, SimdSupport};
pub use crate::fpenv::{FpEnvGuard, FpMode, Rounding};
#[cfg(feature = "rayon")]
pub use crate::kernel::rayon::evaluate_par;
pub use crate::kernel::scalar::ScalarWarp;
#[cfg(feature = "simd")]
pub use crate::kernel::simd::SimdWarp;
pub use crate::kernel::WarpKernel;
pub use crate::sample::{anchor, bilinear, sample, Anchor};
