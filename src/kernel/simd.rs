//! SIMD-accelerated kernel using the `wide` crate.
//!
//! Four points are processed per iteration with `f32x4`: packed projection
//! against broadcast model coefficients, packed perspective divide, packed
//! validity test and packed bilinear weights. The 2x2 neighbourhood gather
//! has no vector form for this access pattern, so anchors are extracted to
//! scalars and each lane issues four scalar loads before the samples are
//! repacked.
//!
//! Lanes that fail the validity test are anchored at `(0, 0)` so their loads
//! stay in bounds, and their outputs are masked to zero on store. The whole
//! call runs inside an [`FpEnvGuard`], remainder points included, so the
//! packed lanes and the scalar tail share one rounding mode.

use crate::batch::WarpBatch;
use crate::cpu::simd_support;
use crate::fpenv::FpEnvGuard;
use crate::kernel::scalar::warp_range;
use crate::kernel::WarpKernel;
use crate::model::Projector;
use crate::util::{WarpError, WarpResult};
use crate::ImageView;
use wide::*;

/// Points per packed iteration.
pub const LANES: usize = 4;

/// Load 4 f32 values into f32x4.
#[inline]
fn load_f32x4(slice: &[f32]) -> f32x4 {
    f32x4::from([slice[0], slice[1], slice[2], slice[3]])
}

/// Store f32x4 into the first 4 elements of `dst`.
#[inline]
fn store_f32x4(dst: &mut [f32], v: f32x4) {
    dst[..LANES].copy_from_slice(&v.to_array());
}

/// Vectorized kernel; requires packed f32 arithmetic and FP mode control.
pub struct SimdWarp;

impl WarpKernel for SimdWarp {
    const NAME: &'static str = "simd";

    fn evaluate<P: Projector>(
        image: ImageView<'_, u8>,
        model: &P,
        batch: &mut WarpBatch<'_, P::Point>,
    ) -> WarpResult<usize> {
        if !simd_support().packed_f32x4 {
            return Err(WarpError::UnsupportedHardware {
                required: "packed f32x4 arithmetic",
            });
        }
        let _fp = FpEnvGuard::acquire()?;

        let width = image.width();
        let height = image.height();
        // The masked default anchor needs a full 2x2 neighbourhood.
        if width < 2 || height < 2 {
            batch.reject_all();
            return Ok(0);
        }

        let n = batch.len();
        let head = n - n % LANES;
        let lanes = model.lanes();
        let stride = image.stride();
        let data = image.as_slice();

        let zero = f32x4::ZERO;
        let one = f32x4::splat(1.0);
        let half = f32x4::splat(0.5);
        let max_x = f32x4::splat((width - 1) as f32);
        let max_y = f32x4::splat((height - 1) as f32);

        let mut num_valid = 0usize;
        let mut i = 0;
        while i < head {
            let (xf, yf) = P::project_x4(&lanes, &batch.points[i..]);

            let sx = xf + half;
            let sy = yf + half;
            let inside =
                sx.simd_ge(zero) & sx.simd_lt(max_x) & sy.simd_ge(zero) & sy.simd_lt(max_y);
            let lane_ok = inside.to_array().map(|m| m.to_bits() != 0);

            let xi = inside.select(sx, zero).trunc_int().to_array();
            let yi = inside.select(sy, zero).trunc_int().to_array();

            let mut i00 = [0.0f32; LANES];
            let mut i01 = [0.0f32; LANES];
            let mut i10 = [0.0f32; LANES];
            let mut i11 = [0.0f32; LANES];
            for k in 0..LANES {
                let idx = yi[k] as usize * stride + xi[k] as usize;
                i00[k] = data[idx] as f32;
                i01[k] = data[idx + 1] as f32;
                i10[k] = data[idx + stride] as f32;
                i11[k] = data[idx + stride + 1] as f32;
            }

            let dx = xf - f32x4::from(xi.map(|v| v as f32));
            let dy = yf - f32x4::from(yi.map(|v| v as f32));
            let wx = one - dx;
            let wy = one - dy;
            let value = wy * (wx * f32x4::from(i00) + dx * f32x4::from(i01))
                + dy * (wx * f32x4::from(i10) + dx * f32x4::from(i11));
            let residual = load_f32x4(&batch.reference[i..]) - value;

            store_f32x4(&mut batch.residuals[i..], inside.select(residual, zero));
            if let Some(warped) = batch.warped.as_deref_mut() {
                store_f32x4(&mut warped[i..], inside.select(value, zero));
            }
            batch.valid[i..i + LANES].copy_from_slice(&lane_ok);
            num_valid += lane_ok.iter().filter(|&&ok| ok).count();

            i += LANES;
        }

        num_valid += warp_range(image, model, batch, head..n);
        Ok(num_valid)
    }
}

#[cfg(test)]
mod tests {
    use super::{SimdWarp, WarpKernel};
    use crate::batch::WarpBatch;
    use crate::fpenv::{FpEnvGuard, FpMode};
    use crate::kernel::scalar::ScalarWarp;
    use crate::model::Homography;
    use crate::ImageView;
    use std::hint::black_box;

    fn make_image(width: usize, height: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(((x * 13) ^ (y * 7) ^ (x * y)) as u8);
            }
        }
        data
    }

    #[test]
    fn lanes_and_tail_match_scalar_bits() {
        let (width, height) = (24, 18);
        let data = make_image(width, height);
        let image = ImageView::from_slice(&data, width, height).unwrap();
        let h = Homography::from_rows([[0.98, 0.04, 1.3], [-0.03, 1.01, 0.7], [0.001, -0.0005, 1.0]]);

        // 7 points: one packed group plus a 3-point tail, mixing valid and
        // out-of-frame points in both.
        let points = [
            [2.2f32, 3.1, 1.0],
            [30.0, 2.0, 1.0],
            [10.4, 9.9, 1.0],
            [-4.0, 5.0, 1.0],
            [20.1, 14.3, 1.0],
            [5.5, 40.0, 1.0],
            [0.3, 0.2, 1.0],
        ];
        let reference: Vec<f32> = (0..points.len()).map(|i| i as f32 * 11.0).collect();

        // Opaque inputs keep both paths evaluated at run time, inside the
        // same floating-point mode.
        let run = |simd: bool| {
            let h = black_box(h);
            let points = black_box(points);
            let mut residuals = vec![0.0f32; points.len()];
            let mut valid = vec![false; points.len()];
            let mut warped = vec![0.0f32; points.len()];
            let mut batch = WarpBatch::new(&points, &reference, &mut residuals, &mut valid)
                .unwrap()
                .with_warped(&mut warped)
                .unwrap();
            let count = if simd {
                SimdWarp::evaluate(image, &h, &mut batch).unwrap()
            } else {
                let _fp = FpEnvGuard::acquire().unwrap();
                ScalarWarp::evaluate(image, &h, &mut batch).unwrap()
            };
            (count, residuals, valid, warped)
        };

        let (count_s, res_s, valid_s, warped_s) = run(false);
        let (count_v, res_v, valid_v, warped_v) = run(true);
        assert_eq!(count_s, count_v);
        assert_eq!(valid_s, valid_v);
        assert_eq!(count_v, valid_v.iter().filter(|&&v| v).count());
        for i in 0..points.len() {
            assert_eq!(res_s[i].to_bits(), res_v[i].to_bits(), "residual {i}");
            assert_eq!(warped_s[i].to_bits(), warped_v[i].to_bits(), "warped {i}");
            if !valid_v[i] {
                assert_eq!(res_v[i], 0.0);
                assert_eq!(warped_v[i], 0.0);
            }
        }
        assert!(valid_v.iter().any(|&v| v));
        assert!(valid_v.iter().any(|&v| !v));
    }

    #[test]
    fn kernel_restores_fp_mode() {
        let data = make_image(8, 8);
        let image = ImageView::from_slice(&data, 8, 8).unwrap();
        let points = [[1.0f32, 1.0, 1.0]; 5];
        let reference = [0.0f32; 5];
        let mut residuals = [0.0f32; 5];
        let mut valid = [false; 5];
        let mut batch = WarpBatch::new(&points, &reference, &mut residuals, &mut valid).unwrap();

        let before = FpMode::current().unwrap();
        let count = SimdWarp::evaluate(image, &Homography::identity(), &mut batch).unwrap();
        assert_eq!(count, 5);
        assert_eq!(FpMode::current().unwrap(), before);
    }

    #[test]
    fn tiny_image_rejects_every_point() {
        let data = [7u8; 3];
        let image = ImageView::from_slice(&data, 3, 1).unwrap();
        let points = [[0.0f32, 0.0, 1.0]; 4];
        let reference = [1.0f32; 4];
        let mut residuals = [5.0f32; 4];
        let mut valid = [true; 4];
        let mut batch = WarpBatch::new(&points, &reference, &mut residuals, &mut valid).unwrap();

        let count = SimdWarp::evaluate(image, &Homography::identity(), &mut batch).unwrap();
        assert_eq!(count, 0);
        assert_eq!(batch.valid(), &[false; 4]);
        assert_eq!(batch.residuals(), &[0.0; 4]);
    }
}
