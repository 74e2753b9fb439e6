//! Dense row-major numeric arrays with a leading point axis.
//!
//! [`Array`] is the leaf payload of a sample [`Value`](crate::Value).
//! Axis 0 is always the point (or sample) axis: concatenation and
//! cumulative sums run along it, and every other axis is carried through
//! unchanged as the "trailing shape".

use std::fmt;

use smallvec::{smallvec, SmallVec};

use crate::error::ArrayError;
use crate::value::Scalar;

/// Array dimensions. Point clouds rarely exceed rank 4, so the common case
/// stays inline.
pub type Shape = SmallVec<[usize; 4]>;

/// Element type of an [`Array`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit float (coordinates, colors, normals, features).
    F32,
    /// 64-bit signed integer (labels, counts, offsets).
    I64,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32 => write!(f, "f32"),
            Self::I64 => write!(f, "i64"),
        }
    }
}

/// Flat element storage for an [`Array`].
#[derive(Clone, Debug, PartialEq)]
pub enum ArrayData {
    /// Float elements.
    F32(Vec<f32>),
    /// Integer elements.
    I64(Vec<i64>),
}

impl ArrayData {
    /// Element type of the storage.
    pub fn dtype(&self) -> DType {
        match self {
            Self::F32(_) => DType::F32,
            Self::I64(_) => DType::I64,
        }
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::I64(v) => v.len(),
        }
    }

    /// Returns `true` if no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A dense, row-major numeric array of rank ≥ 1.
///
/// The shape/data invariant (`shape.product() == data.len()`) is checked
/// at construction and preserved by every operation.
#[derive(Clone, Debug, PartialEq)]
pub struct Array {
    shape: Shape,
    data: ArrayData,
}

impl Array {
    /// Build an array from a shape and matching element storage.
    ///
    /// # Errors
    ///
    /// [`ArrayError::ZeroRank`] for an empty shape,
    /// [`ArrayError::ShapeDataMismatch`] when the element count does not
    /// equal the product of the shape.
    pub fn new(shape: &[usize], data: ArrayData) -> Result<Self, ArrayError> {
        if shape.is_empty() {
            return Err(ArrayError::ZeroRank);
        }
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(ArrayError::ShapeDataMismatch {
                shape: shape.to_vec(),
                len: data.len(),
            });
        }
        Ok(Self {
            shape: Shape::from_slice(shape),
            data,
        })
    }

    /// Build an `f32` array. See [`Array::new`].
    pub fn from_f32(shape: &[usize], data: Vec<f32>) -> Result<Self, ArrayError> {
        Self::new(shape, ArrayData::F32(data))
    }

    /// Build an `i64` array. See [`Array::new`].
    pub fn from_i64(shape: &[usize], data: Vec<i64>) -> Result<Self, ArrayError> {
        Self::new(shape, ArrayData::I64(data))
    }

    /// A rank-1 `f32` array.
    pub fn vector_f32(data: Vec<f32>) -> Self {
        Self {
            shape: smallvec![data.len()],
            data: ArrayData::F32(data),
        }
    }

    /// A rank-1 `i64` array.
    pub fn vector_i64(data: Vec<i64>) -> Self {
        Self {
            shape: smallvec![data.len()],
            data: ArrayData::I64(data),
        }
    }

    /// The array dimensions.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Dimensions after axis 0.
    pub fn trailing_shape(&self) -> &[usize] {
        &self.shape[1..]
    }

    /// Number of axes.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Extent of axis 0 (point count for a coordinate array).
    pub fn len(&self) -> usize {
        self.shape[0]
    }

    /// Returns `true` if axis 0 has extent zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements per row of axis 0.
    pub fn row_width(&self) -> usize {
        self.trailing_shape().iter().product()
    }

    /// Element type.
    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    /// Borrow the element storage.
    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// Consume the array, returning its element storage.
    pub fn into_data(self) -> ArrayData {
        self.data
    }

    /// Borrow the elements if this is an `f32` array.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.data {
            ArrayData::F32(v) => Some(v),
            ArrayData::I64(_) => None,
        }
    }

    /// Borrow the elements if this is an `i64` array.
    pub fn as_i64(&self) -> Option<&[i64]> {
        match &self.data {
            ArrayData::I64(v) => Some(v),
            ArrayData::F32(_) => None,
        }
    }

    /// Concatenate arrays along axis 0.
    ///
    /// All parts must share the element type and trailing shape of the
    /// first part.
    pub fn concat<'a, I>(parts: I) -> Result<Self, ArrayError>
    where
        I: IntoIterator<Item = &'a Array>,
    {
        let parts: Vec<&Array> = parts.into_iter().collect();
        let first = *parts.first().ok_or(ArrayError::Empty)?;

        let mut rows = 0;
        for part in &parts {
            if part.dtype() != first.dtype() {
                return Err(ArrayError::DTypeMismatch {
                    expected: first.dtype(),
                    found: part.dtype(),
                });
            }
            if part.trailing_shape() != first.trailing_shape() {
                return Err(ArrayError::TrailingShapeMismatch {
                    expected: first.trailing_shape().to_vec(),
                    found: part.trailing_shape().to_vec(),
                });
            }
            rows += part.len();
        }

        let total = rows * first.row_width();
        let data = match first.dtype() {
            DType::F32 => {
                let mut out = Vec::with_capacity(total);
                for part in &parts {
                    if let ArrayData::F32(v) = &part.data {
                        out.extend_from_slice(v);
                    }
                }
                ArrayData::F32(out)
            }
            DType::I64 => {
                let mut out = Vec::with_capacity(total);
                for part in &parts {
                    if let ArrayData::I64(v) = &part.data {
                        out.extend_from_slice(v);
                    }
                }
                ArrayData::I64(out)
            }
        };

        let mut shape = first.shape.clone();
        shape[0] = rows;
        Ok(Self { shape, data })
    }

    /// Inclusive cumulative sum along axis 0, column by column.
    ///
    /// The element type is preserved.
    ///
    /// # Errors
    ///
    /// [`ArrayError::Overflow`] if an `i64` running total leaves the
    /// representable range.
    pub fn cumsum(&self) -> Result<Self, ArrayError> {
        let width = self.row_width();
        let data = match &self.data {
            ArrayData::F32(v) => ArrayData::F32(cumsum_rows(v, width, |a, b| Some(a + b))?),
            ArrayData::I64(v) => ArrayData::I64(cumsum_rows(v, width, i64::checked_add)?),
        };
        Ok(Self {
            shape: self.shape.clone(),
            data,
        })
    }

    /// Stack scalars into a rank-1 array of the matching element type.
    ///
    /// # Errors
    ///
    /// [`ArrayError::Empty`] for no scalars, [`ArrayError::MixedScalars`]
    /// when integers and floats are mixed.
    pub fn stack_scalars<'a, I>(scalars: I) -> Result<Self, ArrayError>
    where
        I: IntoIterator<Item = &'a Scalar>,
    {
        let scalars: Vec<Scalar> = scalars.into_iter().copied().collect();
        match scalars.first() {
            None => Err(ArrayError::Empty),
            Some(Scalar::Int(_)) => scalars
                .iter()
                .map(|s| match s {
                    Scalar::Int(v) => Ok(*v),
                    Scalar::Float(_) => Err(ArrayError::MixedScalars),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::vector_i64),
            Some(Scalar::Float(_)) => scalars
                .iter()
                .map(|s| match s {
                    Scalar::Float(v) => Ok(*v),
                    Scalar::Int(_) => Err(ArrayError::MixedScalars),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::vector_f32),
        }
    }
}

fn cumsum_rows<T, F>(values: &[T], width: usize, add: F) -> Result<Vec<T>, ArrayError>
where
    T: Copy,
    F: Fn(T, T) -> Option<T>,
{
    let mut out = values.to_vec();
    if width == 0 {
        return Ok(out);
    }
    for i in width..out.len() {
        out[i] = add(out[i - width], out[i]).ok_or(ArrayError::Overflow)?;
    }
    Ok(out)
}
