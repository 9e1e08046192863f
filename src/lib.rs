//! PhotoWarp is a CPU-first photometric residual evaluator for dense direct
//! image alignment.
//!
//! Given template points, a motion model and a grayscale frame, the crate
//! warps each point into the frame, samples the frame with nearest-anchored
//! bilinear interpolation and writes `reference - sampled` residuals together
//! with per-point validity flags. A scalar reference kernel is always
//! available; a packed `f32x4` kernel is enabled by the `simd` feature and
//! produces bit-identical results when both run in the same floating-point
//! mode. Batches can be split across threads via the `rayon` feature.

pub mod batch;
pub mod cpu;
mod evaluator;
pub mod fpenv;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod model;
pub mod sample;
pub mod template;
mod trace;
pub mod util;

pub use batch::WarpBatch;
pub use evaluator::{Evaluator, KernelChoice, KernelKind, WarpConfig};
pub use fpenv::FpEnvGuard;
#[cfg(feature = "image-io")]
pub use crate::image::io;
pub use crate::image::{ImageView, OwnedImage, Rect};
pub use model::{Affine, Homography, Point2h, Point3h, Projection, Projector, Translation};
pub use template::TemplatePoints;
pub use util::{ResidualStats, WarpError, WarpResult};
