//! Scoped floating-point environment for the vectorized hot loop.
//!
//! [`FpEnvGuard`] switches the calling thread to round-toward-zero with
//! flush-to-zero and restores the saved control word when dropped, including
//! during unwinding. The control register is per thread, so the guard is
//! neither `Send` nor `Sync`. Guards nest: each level saves and restores the
//! word it found.
//!
//! The compiler assumes the default environment and does not treat the
//! control-register write as ordering float arithmetic. Constants may be
//! folded at compile time, and float operations may be moved across the
//! acquire or the drop. Results are only guaranteed bit-exact for runtime
//! arithmetic that stays between acquire and drop; inputs that must not be
//! folded or hoisted should pass through `std::hint::black_box`.

use crate::cpu::simd_support;
use crate::util::{WarpError, WarpResult};
use std::marker::PhantomData;

/// Rounding mode reported by [`FpMode::current`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rounding {
    Nearest,
    Down,
    Up,
    TowardZero,
}

/// Snapshot of the thread's rounding and denormal handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FpMode {
    pub rounding: Rounding,
    pub flush_to_zero: bool,
}

impl FpMode {
    /// Reads the current thread's mode, or `None` on targets without a
    /// supported control register.
    pub fn current() -> Option<Self> {
        if !simd_support().fp_control {
            return None;
        }
        arch::read().map(arch::decode)
    }
}

/// RAII guard holding the thread in round-toward-zero, flush-to-zero mode.
pub struct FpEnvGuard {
    saved: arch::ControlWord,
    _thread_bound: PhantomData<*const ()>,
}

impl FpEnvGuard {
    /// Saves the current control word and enters the fast mode.
    pub fn acquire() -> WarpResult<Self> {
        if !simd_support().fp_control {
            return Err(WarpError::UnsupportedHardware {
                required: "floating-point control register",
            });
        }
        let saved = arch::read().ok_or(WarpError::UnsupportedHardware {
            required: "floating-point control register",
        })?;
        let fast = arch::fast_mode(saved);
        if fast != saved {
            arch::write(fast);
        }
        Ok(Self {
            saved,
            _thread_bound: PhantomData,
        })
    }
}

impl Drop for FpEnvGuard {
    fn drop(&mut self) {
        if arch::read() != Some(self.saved) {
            arch::write(self.saved);
        }
    }
}

#[cfg(target_arch = "x86_64")]
mod arch {
    use super::{FpMode, Rounding};
    use std::arch::asm;

    pub(super) type ControlWord = u32;

    const ROUNDING_MASK: u32 = 0x6000;
    const ROUND_NEAREST: u32 = 0x0000;
    const ROUND_DOWN: u32 = 0x2000;
    const ROUND_UP: u32 = 0x4000;
    const ROUND_TOWARD_ZERO: u32 = 0x6000;
    const FLUSH_TO_ZERO: u32 = 0x8000;

    pub(super) fn read() -> Option<u32> {
        let mut csr = 0u32;
        // SAFETY: stmxcsr stores the 32-bit MXCSR into `csr` and nothing else.
        unsafe {
            asm!(
                "stmxcsr [{ptr}]",
                ptr = in(reg) &mut csr as *mut u32,
                options(nostack, preserves_flags),
            );
        }
        Some(csr)
    }

    pub(super) fn write(csr: u32) {
        // SAFETY: `csr` was read from MXCSR and only its rounding and FTZ
        // bits differ, so no reserved bit is set.
        unsafe {
            asm!(
                "ldmxcsr [{ptr}]",
                ptr = in(reg) &csr as *const u32,
                options(nostack, readonly, preserves_flags),
            );
        }
    }

    pub(super) fn fast_mode(csr: u32) -> u32 {
        (csr & !ROUNDING_MASK) | ROUND_TOWARD_ZERO | FLUSH_TO_ZERO
    }

    pub(super) fn decode(csr: u32) -> FpMode {
        let rounding = match csr & ROUNDING_MASK {
            ROUND_NEAREST => Rounding::Nearest,
            ROUND_DOWN => Rounding::Down,
            ROUND_UP => Rounding::Up,
            _ => Rounding::TowardZero,
        };
        FpMode {
            rounding,
            flush_to_zero: csr & FLUSH_TO_ZERO != 0,
        }
    }
}

#[cfg(target_arch = "aarch64")]
mod arch {
    use super::{FpMode, Rounding};
    use std::arch::asm;

    pub(super) type ControlWord = u64;

    const RMODE_MASK: u64 = 0b11 << 22;
    const RMODE_NEAREST: u64 = 0b00 << 22;
    const RMODE_UP: u64 = 0b01 << 22;
    const RMODE_DOWN: u64 = 0b10 << 22;
    const RMODE_TOWARD_ZERO: u64 = 0b11 << 22;
    const FLUSH_TO_ZERO: u64 = 1 << 24;

    pub(super) fn read() -> Option<u64> {
        let fpcr: u64;
        // SAFETY: reading FPCR has no side effects.
        unsafe {
            asm!("mrs {}, fpcr", out(reg) fpcr, options(nomem, nostack, preserves_flags));
        }
        Some(fpcr)
    }

    pub(super) fn write(fpcr: u64) {
        // SAFETY: the value originates from FPCR with only RMode and FZ changed.
        unsafe {
            asm!("msr fpcr, {}", in(reg) fpcr, options(nomem, nostack, preserves_flags));
        }
    }

    pub(super) fn fast_mode(fpcr: u64) -> u64 {
        (fpcr & !RMODE_MASK) | RMODE_TOWARD_ZERO | FLUSH_TO_ZERO
    }

    pub(super) fn decode(fpcr: u64) -> FpMode {
        let rounding = match fpcr & RMODE_MASK {
            RMODE_NEAREST => Rounding::Nearest,
            RMODE_UP => Rounding::Up,
            RMODE_DOWN => Rounding::Down,
            _ => Rounding::TowardZero,
        };
        FpMode {
            rounding,
            flush_to_zero: fpcr & FLUSH_TO_ZERO != 0,
        }
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
mod arch {
    use super::FpMode;

    pub(super) type ControlWord = u32;

    pub(super) fn read() -> Option<u32> {
        None
    }

    pub(super) fn write(_: u32) {}

    pub(super) fn fast_mode(word: u32) -> u32 {
        word
    }

    pub(super) fn decode(_: u32) -> FpMode {
        FpMode {
            rounding: super::Rounding::Nearest,
            flush_to_zero: false,
        }
    }
}
