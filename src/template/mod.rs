//! Template point sets for dense alignment.
//!
//! A template is sampled on a regular grid over a region of the reference
//! frame. Each grid pixel becomes a homogeneous point `(x, y, 1)` in the
//! reference frame's coordinates, paired with its intensity as the
//! reference value for the residual.

use crate::batch::WarpBatch;
use crate::image::{ImageView, Rect};
use crate::model::Point2h;
use crate::util::WarpResult;

/// Grid points and their reference intensities.
#[derive(Clone, Debug, Default)]
pub struct TemplatePoints {
    points: Vec<Point2h>,
    reference: Vec<f32>,
}

impl TemplatePoints {
    /// Samples every `step`-th pixel of `roi` in row-major order.
    ///
    /// A `step` of zero is treated as one.
    pub fn from_roi(image: ImageView<'_, u8>, roi: Rect, step: usize) -> WarpResult<Self> {
        let step = step.max(1);
        let view = image.roi(roi)?;
        let cols = view.width().div_ceil(step);
        let rows = view.height().div_ceil(step);
        let mut points = Vec::with_capacity(cols * rows);
        let mut reference = Vec::with_capacity(cols * rows);

        for y in (0..view.height()).step_by(step) {
            let Some(row) = view.row(y) else {
                continue;
            };
            for x in (0..view.width()).step_by(step) {
                points.push([(roi.x + x) as f32, (roi.y + y) as f32, 1.0]);
                reference.push(row[x] as f32);
            }
        }

        Ok(Self { points, reference })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point2h] {
        &self.points
    }

    pub fn reference(&self) -> &[f32] {
        &self.reference
    }

    /// Builds a batch over these points writing into the given outputs.
    pub fn batch<'a>(
        &'a self,
        residuals: &'a mut [f32],
        valid: &'a mut [bool],
    ) -> WarpResult<WarpBatch<'a, Point2h>> {
        WarpBatch::new(&self.points, &self.reference, residuals, valid)
    }
}
