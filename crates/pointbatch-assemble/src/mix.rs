//! Mix3D boundary merging.
//!
//! Given `N` cumulative boundaries `[o0, o1, ..., o(N-1)]`, keep the
//! boundaries at odd positions strictly before the last one, then the
//! last one. Samples `2k` and `2k + 1` end up in one group, so `N`
//! boundaries become `ceil(N / 2)`. The point data is untouched; only the
//! grouping the model sees changes.

use pointbatch_core::{Array, DType};

use crate::error::AssembleError;

/// Merge adjacent sample boundaries pairwise.
///
/// An empty input stays empty.
pub fn mix3d_offsets(offsets: &[i64]) -> Vec<i64> {
    let Some((&last, head)) = offsets.split_last() else {
        return Vec::new();
    };
    let mut mixed: Vec<i64> = head.iter().skip(1).step_by(2).copied().collect();
    mixed.push(last);
    mixed
}

/// [`mix3d_offsets`] over a batch `offset` array.
///
/// # Errors
///
/// [`AssembleError::InvalidOffset`] unless the array is rank-1 `i64`.
pub fn mix_offset_array(offsets: &Array) -> Result<Array, AssembleError> {
    if offsets.rank() != 1 {
        return Err(AssembleError::InvalidOffset {
            reason: format!("expected a rank-1 array, found shape {:?}", offsets.shape()),
        });
    }
    let values = offsets.as_i64().ok_or_else(|| AssembleError::InvalidOffset {
        reason: format!("expected {} boundaries, found {}", DType::I64, offsets.dtype()),
    })?;
    Ok(Array::vector_i64(mix3d_offsets(values)))
}
