#![cfg(feature = "simd")]

use photowarp::lowlevel::{simd_support, FpEnvGuard, ScalarWarp, SimdWarp, WarpKernel};
use photowarp::{
    Affine, Evaluator, Homography, ImageView, KernelChoice, Projection, Projector, Translation,
    WarpBatch, WarpConfig,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

fn random_image(rng: &mut StdRng, width: usize, height: usize) -> Vec<u8> {
    (0..width * height).map(|_| rng.random::<u8>()).collect()
}

fn random_points(rng: &mut StdRng, n: usize, width: usize, height: usize) -> Vec<[f32; 3]> {
    // Spread slightly past the frame so every batch mixes valid and invalid points.
    (0..n)
        .map(|_| {
            let w = rng.random_range(0.5f32..2.0);
            let x = rng.random_range(-3.0f32..width as f32 + 3.0);
            let y = rng.random_range(-3.0f32..height as f32 + 3.0);
            [x * w, y * w, w]
        })
        .collect()
}

fn random_homography(rng: &mut StdRng) -> Homography {
    Homography::from_rows([
        [
            1.0 + rng.random_range(-0.05f32..0.05),
            rng.random_range(-0.05f32..0.05),
            rng.random_range(-2.0f32..2.0),
        ],
        [
            rng.random_range(-0.05f32..0.05),
            1.0 + rng.random_range(-0.05f32..0.05),
            rng.random_range(-2.0f32..2.0),
        ],
        [
            rng.random_range(-0.0005f32..0.0005),
            rng.random_range(-0.0005f32..0.0005),
            1.0,
        ],
    ])
}

struct Outputs {
    count: usize,
    residuals: Vec<f32>,
    valid: Vec<bool>,
    warped: Vec<f32>,
}

fn run_kernel<K: WarpKernel, P: Projector>(
    image: ImageView<'_, u8>,
    model: &P,
    points: &[P::Point],
    reference: &[f32],
) -> Outputs {
    let mut residuals = vec![f32::NAN; points.len()];
    let mut valid = vec![true; points.len()];
    let mut warped = vec![f32::NAN; points.len()];
    let mut batch = WarpBatch::new(points, reference, &mut residuals, &mut valid)
        .unwrap()
        .with_warped(&mut warped)
        .unwrap();
    let count = K::evaluate(image, model, &mut batch).unwrap();
    Outputs {
        count,
        residuals,
        valid,
        warped,
    }
}

fn assert_bit_identical(a: &Outputs, b: &Outputs) {
    assert_eq!(a.count, b.count);
    assert_eq!(a.valid, b.valid);
    for i in 0..a.valid.len() {
        assert_eq!(
            a.residuals[i].to_bits(),
            b.residuals[i].to_bits(),
            "residual {i}"
        );
        assert_eq!(a.warped[i].to_bits(), b.warped[i].to_bits(), "warped {i}");
    }
}

#[test]
fn simd_matches_scalar_bits_under_same_fp_mode() {
    if !simd_support().is_complete() {
        return;
    }
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let (width, height) = (64, 48);
    let data = random_image(&mut rng, width, height);
    let image = ImageView::from_slice(&data, width, height).unwrap();

    for n in [0usize, 1, 2, 3, 4, 5, 7, 8, 13, 64, 255, 1000] {
        let h = random_homography(&mut rng);
        let points = random_points(&mut rng, n, width, height);
        let reference: Vec<f32> = (0..n).map(|_| rng.random_range(0.0f32..255.0)).collect();

        let (h, points) = (black_box(h), black_box(points));
        let simd = run_kernel::<SimdWarp, _>(image, &h, &points, &reference);
        let scalar = {
            let _fp = FpEnvGuard::acquire().unwrap();
            run_kernel::<ScalarWarp, _>(image, &h, &points, &reference)
        };

        assert_bit_identical(&scalar, &simd);
        for i in 0..n {
            if !simd.valid[i] {
                assert_eq!(simd.residuals[i], 0.0);
                assert_eq!(simd.warped[i], 0.0);
            }
        }
    }
}

#[test]
fn simd_matches_scalar_bits_for_projective_points() {
    if !simd_support().is_complete() {
        return;
    }
    let mut rng = StdRng::seed_from_u64(17);
    let (width, height) = (40, 30);
    let data = random_image(&mut rng, width, height);
    let image = ImageView::from_slice(&data, width, height).unwrap();

    let projection = Projection::from_rows([
        [1.0, 0.02, 0.5, 0.3],
        [-0.01, 1.0, 0.4, -0.2],
        [0.0, 0.0, 1.0, 0.05],
    ]);
    let points: Vec<[f32; 4]> = (0..131)
        .map(|_| {
            let z = rng.random_range(0.8f32..1.5);
            [
                rng.random_range(-2.0f32..42.0) * z,
                rng.random_range(-2.0f32..32.0) * z,
                z,
                1.0,
            ]
        })
        .collect();
    let reference = vec![100.0f32; points.len()];

    let (projection, points) = (black_box(projection), black_box(points));
    let simd = run_kernel::<SimdWarp, _>(image, &projection, &points, &reference);
    let scalar = {
        let _fp = FpEnvGuard::acquire().unwrap();
        run_kernel::<ScalarWarp, _>(image, &projection, &points, &reference)
    };
    assert_bit_identical(&scalar, &simd);
}

#[test]
fn simd_matches_scalar_bits_for_translation_and_affine() {
    if !simd_support().is_complete() {
        return;
    }
    let mut rng = StdRng::seed_from_u64(0xaff1);
    let (width, height) = (56, 44);
    let data = random_image(&mut rng, width, height);
    let image = ImageView::from_slice(&data, width, height).unwrap();

    // Unit points: translation and affine ignore the third coordinate.
    let points: Vec<[f32; 3]> = (0..203)
        .map(|_| {
            [
                rng.random_range(-3.0f32..width as f32 + 3.0),
                rng.random_range(-3.0f32..height as f32 + 3.0),
                1.0,
            ]
        })
        .collect();
    let reference: Vec<f32> = (0..points.len())
        .map(|_| rng.random_range(0.0f32..255.0))
        .collect();

    let translation = Translation::new(
        rng.random_range(-2.5f32..2.5),
        rng.random_range(-2.5f32..2.5),
    );
    let affine = Affine::new([
        [
            1.0 + rng.random_range(-0.05f32..0.05),
            rng.random_range(-0.05f32..0.05),
            rng.random_range(-2.0f32..2.0),
        ],
        [
            rng.random_range(-0.05f32..0.05),
            1.0 + rng.random_range(-0.05f32..0.05),
            rng.random_range(-2.0f32..2.0),
        ],
    ]);

    let points = black_box(points);

    let translation = black_box(translation);
    let simd = run_kernel::<SimdWarp, _>(image, &translation, &points, &reference);
    let scalar = {
        let _fp = FpEnvGuard::acquire().unwrap();
        run_kernel::<ScalarWarp, _>(image, &translation, &points, &reference)
    };
    assert_bit_identical(&scalar, &simd);
    assert!(simd.count > 0 && simd.count < points.len());

    let affine = black_box(affine);
    let simd = run_kernel::<SimdWarp, _>(image, &affine, &points, &reference);
    let scalar = {
        let _fp = FpEnvGuard::acquire().unwrap();
        run_kernel::<ScalarWarp, _>(image, &affine, &points, &reference)
    };
    assert_bit_identical(&scalar, &simd);
    assert!(simd.count > 0 && simd.count < points.len());
}

#[test]
fn simd_stays_close_to_round_to_nearest_scalar() {
    if !simd_support().is_complete() {
        return;
    }
    let mut rng = StdRng::seed_from_u64(42);
    let (width, height) = (80, 60);
    let data = random_image(&mut rng, width, height);
    let image = ImageView::from_slice(&data, width, height).unwrap();
    let h = random_homography(&mut rng);
    let points = random_points(&mut rng, 4099, width, height);
    let reference: Vec<f32> = (0..points.len())
        .map(|_| rng.random_range(0.0f32..255.0))
        .collect();

    let scalar_eval = Evaluator::new(WarpConfig {
        kernel: KernelChoice::Scalar,
        ..WarpConfig::default()
    })
    .unwrap();
    let simd_eval = Evaluator::new(WarpConfig {
        kernel: KernelChoice::Simd,
        ..WarpConfig::default()
    })
    .unwrap();

    let eval = |e: &Evaluator| {
        let mut residuals = vec![0.0f32; points.len()];
        let mut valid = vec![false; points.len()];
        let mut batch = WarpBatch::new(&points, &reference, &mut residuals, &mut valid).unwrap();
        e.evaluate(image, &h, &mut batch).unwrap();
        (residuals, valid)
    };
    let (res_s, valid_s) = eval(&scalar_eval);
    let (res_v, valid_v) = eval(&simd_eval);

    // Rounding-mode differences can move a coordinate across an anchor or
    // bounds edge; skip points whose shifted coordinate sits near one.
    let near_edge = |v: f32| {
        let s = v + 0.5;
        (s - s.round()).abs() < 1e-3
    };
    let mut compared = 0usize;
    for (i, p) in points.iter().enumerate() {
        let (xf, yf) = h.project(p);
        if near_edge(xf) || near_edge(yf) {
            continue;
        }
        compared += 1;
        assert_eq!(valid_s[i], valid_v[i], "valid {i}");
        assert!(
            (res_s[i] - res_v[i]).abs() < 1e-2,
            "residual {i}: {} vs {}",
            res_s[i],
            res_v[i]
        );
    }
    assert!(compared > points.len() / 2);
}
