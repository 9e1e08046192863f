//! Caller-owned batch buffers for one warp evaluation.

use crate::util::{ResidualStats, WarpError, WarpResult};

/// Index-aligned inputs and outputs of a warp-and-residual evaluation.
///
/// All slices are borrowed from the caller and written in place. Lengths are
/// validated on construction, so kernels can index them freely.
pub struct WarpBatch<'a, T> {
    pub(crate) points: &'a [T],
    pub(crate) reference: &'a [f32],
    pub(crate) residuals: &'a mut [f32],
    pub(crate) valid: &'a mut [bool],
    pub(crate) warped: Option<&'a mut [f32]>,
}

impl<'a, T> WarpBatch<'a, T> {
    /// Creates a batch without a warped-intensity output.
    pub fn new(
        points: &'a [T],
        reference: &'a [f32],
        residuals: &'a mut [f32],
        valid: &'a mut [bool],
    ) -> WarpResult<Self> {
        let n = points.len();
        check_len("reference", n, reference.len())?;
        check_len("residuals", n, residuals.len())?;
        check_len("valid", n, valid.len())?;
        Ok(Self {
            points,
            reference,
            residuals,
            valid,
            warped: None,
        })
    }

    /// Attaches an output buffer for the sampled intensities.
    pub fn with_warped(mut self, warped: &'a mut [f32]) -> WarpResult<Self> {
        check_len("warped", self.points.len(), warped.len())?;
        self.warped = Some(warped);
        Ok(self)
    }

    /// Number of points in the batch.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[T] {
        self.points
    }

    pub fn residuals(&self) -> &[f32] {
        self.residuals
    }

    pub fn valid(&self) -> &[bool] {
        self.valid
    }

    pub fn warped(&self) -> Option<&[f32]> {
        self.warped.as_deref()
    }

    /// Residual statistics over the currently stored outputs.
    pub fn stats(&self) -> ResidualStats {
        ResidualStats::from_slices(self.residuals, self.valid)
    }

    /// Marks every point invalid and zero-fills the outputs.
    pub(crate) fn reject_all(&mut self) {
        self.residuals.fill(0.0);
        self.valid.fill(false);
        if let Some(warped) = self.warped.as_deref_mut() {
            warped.fill(0.0);
        }
    }

    /// Records the outcome for point `i`; invalid points store zeros.
    #[inline]
    pub(crate) fn store(&mut self, i: usize, sample: Option<f32>) {
        let (residual, value) = match sample {
            Some(value) => (self.reference[i] - value, value),
            None => (0.0, 0.0),
        };
        self.residuals[i] = residual;
        self.valid[i] = sample.is_some();
        if let Some(warped) = self.warped.as_deref_mut() {
            warped[i] = value;
        }
    }

    /// Splits the batch into consecutive sub-batches of at most `chunk` points.
    #[cfg(feature = "rayon")]
    pub(crate) fn split(&mut self, chunk: usize) -> Vec<WarpBatch<'_, T>> {
        let chunk = chunk.max(1);
        let mut warped_chunks = self.warped.as_deref_mut().map(|w| w.chunks_mut(chunk));
        let mut parts = Vec::with_capacity(self.points.len().div_ceil(chunk));
        for (((points, reference), residuals), valid) in self
            .points
            .chunks(chunk)
            .zip(self.reference.chunks(chunk))
            .zip(self.residuals.chunks_mut(chunk))
            .zip(self.valid.chunks_mut(chunk))
        {
            let warped = warped_chunks.as_mut().and_then(|it| it.next());
            parts.push(WarpBatch {
                points,
                reference,
                residuals,
                valid,
                warped,
            });
        }
        parts
    }
}

fn check_len(what: &'static str, expected: usize, got: usize) -> WarpResult<()> {
    if expected != got {
        return Err(WarpError::LengthMismatch {
            what,
            expected,
            got,
        });
    }
    Ok(())
}
