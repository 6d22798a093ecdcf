//! Checks that a shape and a set of byte strides describe
//! a densely packed, row-major (C-order) buffer. There is
//! no strided copy path, so anything else is rejected.

use itertools::Itertools;

/// The strides of a buffer did not match the strides
/// a packed row-major buffer of the same shape would have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrideError {
    pub expected : Vec<isize>,
    pub actual : Vec<isize>,
}

impl std::error::Error for StrideError {}

impl std::fmt::Display for StrideError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f,
            "expects a packed row-major stored buffer (strides {:?}, packed strides {:?})",
            self.actual, self.expected
        )
    }
}

/// Returns the byte strides of a densely packed row-major
/// buffer with dimensions `shape` and elements of `itemsize` bytes.
/// The last dimension advances by `itemsize`, every other
/// dimension by the stride of the next one times its extent.
/// Strides too large for an `isize` saturate at `isize::MAX`;
/// no buffer that large can exist in memory, so they never
/// match the strides of a real one.
///
/// ## Arguments
///
/// * `shape` - Extent of each dimension, slowest first
///
/// * `itemsize` - Size of one element in bytes
///
/// ## Example
///
/// ```
/// use buffersource::packed_strides;
///
/// assert_eq!(packed_strides(&[4, 3, 2], 8), vec![48, 16, 8]);
/// ```
pub fn packed_strides(shape : &[usize], itemsize : usize) -> Vec<isize> {
    let mut strides = vec![0isize; shape.len()];
    let mut running = isize::try_from(itemsize).unwrap_or(isize::MAX);
    for (stride, &extent) in strides.iter_mut().zip(shape.iter()).rev() {
        *stride = running;
        running = running.saturating_mul(isize::try_from(extent).unwrap_or(isize::MAX));
    }
    strides
}

/// Compares `strides` element-wise against `packed_strides(shape, itemsize)`.
///
/// ## Errors
///
/// * `StrideError` - If any stride differs, or the number of
/// strides is not the number of dimensions.
pub fn validate_packed(
    shape : &[usize],
    itemsize : usize,
    strides : &[isize],
    ) -> Result<(), StrideError> {
    let expected = packed_strides(shape, itemsize);
    let matches = expected.len() == strides.len()
        && expected.iter().zip_eq(strides.iter()).all(|(e, a)| e == a);

    if matches {
        Ok(())
    } else {
        Err(StrideError {
            expected,
            actual : strides.to_vec(),
        })
    }
}
