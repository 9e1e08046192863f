//! Kernel selection and the batch evaluation entry point.

use crate::batch::WarpBatch;
use crate::cpu::simd_support;
use crate::kernel::scalar::ScalarWarp;
#[cfg(feature = "simd")]
use crate::kernel::simd::SimdWarp;
use crate::kernel::WarpKernel;
use crate::model::Projector;
use crate::trace::{trace_event, trace_span};
use crate::util::{WarpError, WarpResult};
use crate::ImageView;

/// Requested kernel strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KernelChoice {
    /// Vectorized when the running CPU supports it, scalar otherwise.
    #[default]
    Auto,
    /// Always the scalar reference kernel.
    Scalar,
    /// Always the vectorized kernel; construction fails if unsupported.
    Simd,
}

/// Kernel resolved at evaluator construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelKind {
    Scalar,
    Simd,
}

impl KernelKind {
    /// Short name reported in traces and CLI output.
    pub fn name(self) -> &'static str {
        match self {
            KernelKind::Scalar => ScalarWarp::NAME,
            KernelKind::Simd => "simd",
        }
    }
}

/// Evaluator configuration.
#[derive(Clone, Debug)]
pub struct WarpConfig {
    /// Kernel strategy.
    pub kernel: KernelChoice,
    /// Split batches across the rayon pool (requires the `rayon` feature).
    pub parallel: bool,
    /// Points per parallel chunk; rounded up to a multiple of four.
    pub chunk_size: usize,
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            kernel: KernelChoice::Auto,
            parallel: false,
            chunk_size: 4096,
        }
    }
}

/// Batched warp-and-residual evaluator.
///
/// The kernel is chosen once, when the evaluator is built; evaluation itself
/// holds no state between calls and may run concurrently from several threads
/// on disjoint batches.
#[derive(Clone, Debug)]
pub struct Evaluator {
    kind: KernelKind,
    cfg: WarpConfig,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self {
            kind: auto_kind(),
            cfg: WarpConfig::default(),
        }
    }
}

impl Evaluator {
    /// Resolves the configured kernel against the running CPU.
    pub fn new(cfg: WarpConfig) -> WarpResult<Self> {
        if cfg.parallel && !cfg!(feature = "rayon") {
            return Err(WarpError::FeatureDisabled("rayon"));
        }
        let kind = resolve(cfg.kernel)?;
        Ok(Self { kind, cfg })
    }

    /// Returns the resolved kernel.
    pub fn kind(&self) -> KernelKind {
        self.kind
    }

    pub fn config(&self) -> &WarpConfig {
        &self.cfg
    }

    /// Projects, samples and writes residuals for every point in `batch`.
    ///
    /// Returns the number of valid points. Invalid points have their residual
    /// and warped intensity set to zero.
    pub fn evaluate<P: Projector>(
        &self,
        image: ImageView<'_, u8>,
        model: &P,
        batch: &mut WarpBatch<'_, P::Point>,
    ) -> WarpResult<usize> {
        let _span = trace_span!(
            "warp_batch",
            points = batch.len(),
            kernel = self.kind.name(),
            parallel = self.cfg.parallel
        )
        .entered();

        let num_valid = match self.kind {
            KernelKind::Scalar => self.run::<ScalarWarp, P>(image, model, batch)?,
            #[cfg(feature = "simd")]
            KernelKind::Simd => self.run::<SimdWarp, P>(image, model, batch)?,
            #[cfg(not(feature = "simd"))]
            KernelKind::Simd => return Err(WarpError::FeatureDisabled("simd")),
        };

        trace_event!("warp_valid", valid = num_valid, points = batch.len());
        Ok(num_valid)
    }

    fn run<K: WarpKernel, P: Projector>(
        &self,
        image: ImageView<'_, u8>,
        model: &P,
        batch: &mut WarpBatch<'_, P::Point>,
    ) -> WarpResult<usize> {
        #[cfg(feature = "rayon")]
        if self.cfg.parallel {
            return crate::kernel::rayon::evaluate_par::<K, P>(
                image,
                model,
                batch,
                self.cfg.chunk_size,
            );
        }
        K::evaluate(image, model, batch)
    }
}

fn auto_kind() -> KernelKind {
    if cfg!(feature = "simd") && simd_support().is_complete() {
        KernelKind::Simd
    } else {
        KernelKind::Scalar
    }
}

fn resolve(choice: KernelChoice) -> WarpResult<KernelKind> {
    match choice {
        KernelChoice::Auto => Ok(auto_kind()),
        KernelChoice::Scalar => Ok(KernelKind::Scalar),
        KernelChoice::Simd if !cfg!(feature = "simd") => Err(WarpError::FeatureDisabled("simd")),
        KernelChoice::Simd if !simd_support().is_complete() => {
            Err(WarpError::UnsupportedHardware {
                required: "packed f32x4 arithmetic with floating-point mode control",
            })
        }
        KernelChoice::Simd => Ok(KernelKind::Simd),
    }
}
