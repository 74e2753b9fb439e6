//! Gaussian weighting of squared distances.
//!
//! `weight = scale * exp(-dist2 / (2 * sigma^2))`, applied elementwise.
//! Used downstream to turn neighbour distances into soft assignment
//! weights.

use crate::array::Array;
use crate::error::ArrayError;

/// A Gaussian kernel over squared distances.
///
/// `sigma == 0` yields NaN at `dist2 == 0` and zero elsewhere; callers
/// that need a hard cutoff should not use a zero bandwidth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GaussianKernel {
    /// Peak weight, reached at zero distance. Default: 1.0.
    pub scale: f32,
    /// Bandwidth. Default: 5.0.
    pub sigma: f32,
}

impl GaussianKernel {
    /// Default peak weight.
    pub const DEFAULT_SCALE: f32 = 1.0;

    /// Default bandwidth.
    pub const DEFAULT_SIGMA: f32 = 5.0;

    /// Create a kernel with the given peak weight and bandwidth.
    pub fn new(scale: f32, sigma: f32) -> Self {
        Self { scale, sigma }
    }

    /// Weight for one squared distance.
    #[inline]
    pub fn weight(&self, dist2: f32) -> f32 {
        self.scale * (-dist2 / (2.0 * self.sigma * self.sigma)).exp()
    }

    /// Weights for a slice of squared distances.
    pub fn apply(&self, dist2: &[f32]) -> Vec<f32> {
        dist2.iter().map(|&d| self.weight(d)).collect()
    }

    /// Weights for an `f32` array of squared distances, shape preserved.
    ///
    /// # Errors
    ///
    /// [`ArrayError::DTypeMismatch`] for an integer array.
    pub fn apply_array(&self, dist2: &Array) -> Result<Array, ArrayError> {
        let values = dist2.as_f32().ok_or(ArrayError::DTypeMismatch {
            expected: crate::DType::F32,
            found: dist2.dtype(),
        })?;
        Array::from_f32(dist2.shape(), self.apply(values))
    }
}

impl Default for GaussianKernel {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SCALE, Self::DEFAULT_SIGMA)
    }
}
