//! Summary statistics over evaluated residuals.

/// Aggregate of the residuals of the valid points in a batch.
///
/// Invalid points are excluded, so `mean_abs` and `rms` are zero when no
/// point is valid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ResidualStats {
    /// Number of points in the batch.
    pub num_points: usize,
    /// Number of valid points.
    pub num_valid: usize,
    /// Mean absolute residual over valid points.
    pub mean_abs: f32,
    /// Root mean square residual over valid points.
    pub rms: f32,
}

impl ResidualStats {
    /// Computes statistics from evaluated residuals and validity flags.
    ///
    /// Sums are accumulated in `f64`; the slices are zipped, so a longer
    /// slice is truncated to the shorter one.
    pub fn from_slices(residuals: &[f32], valid: &[bool]) -> Self {
        let num_points = residuals.len().min(valid.len());
        let mut num_valid = 0usize;
        let mut sum_abs = 0.0f64;
        let mut sum_sq = 0.0f64;
        for (&r, &v) in residuals.iter().zip(valid) {
            if !v {
                continue;
            }
            let r = r as f64;
            num_valid += 1;
            sum_abs += r.abs();
            sum_sq += r * r;
        }

        if num_valid == 0 {
            return Self {
                num_points,
                ..Self::default()
            };
        }

        let n = num_valid as f64;
        Self {
            num_points,
            num_valid,
            mean_abs: (sum_abs / n) as f32,
            rms: (sum_sq / n).sqrt() as f32,
        }
    }

    /// Fraction of valid points, or zero for an empty batch.
    pub fn valid_ratio(&self) -> f32 {
        if self.num_points == 0 {
            0.0
        } else {
            self.num_valid as f32 / self.num_points as f32
        }
    }
}
