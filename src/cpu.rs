//! CPU capability detection for kernel dispatch.
//!
//! Detection runs once per process and is cached; the vectorized evaluator
//! needs packed single-precision arithmetic and a floating-point control
//! register it can switch to round-toward-zero with flush-to-zero.

use std::sync::OnceLock;

/// Capabilities relevant to the vectorized warp kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimdSupport {
    /// Four-lane packed f32 arithmetic (SSE2 on x86_64, NEON on aarch64).
    pub packed_f32x4: bool,
    /// Rounding and flush-to-zero control (MXCSR on x86_64, FPCR on aarch64).
    pub fp_control: bool,
}

impl SimdSupport {
    /// True when the vectorized kernel can run.
    pub fn is_complete(&self) -> bool {
        self.packed_f32x4 && self.fp_control
    }
}

static SUPPORT: OnceLock<SimdSupport> = OnceLock::new();

/// Returns the cached capabilities of the running CPU.
pub fn simd_support() -> SimdSupport {
    *SUPPORT.get_or_init(detect)
}

#[cfg(target_arch = "x86_64")]
fn detect() -> SimdSupport {
    let sse2 = is_x86_feature_detected!("sse2");
    SimdSupport {
        packed_f32x4: sse2,
        fp_control: sse2,
    }
}

#[cfg(target_arch = "aarch64")]
fn detect() -> SimdSupport {
    let neon = std::arch::is_aarch64_feature_detected!("neon");
    SimdSupport {
        packed_f32x4: neon,
        fp_control: true,
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn detect() -> SimdSupport {
    SimdSupport {
        packed_f32x4: false,
        fp_control: false,
    }
}
