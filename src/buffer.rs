//! # Buffers
//!
//! A `BufferDescriptor` is the one input to ingestion: a borrowed
//! region of raw memory together with the shape, element size,
//! byte strides and format tag describing how to read it. The
//! descriptor only borrows the memory for as long as a single
//! ingestion call needs it.

mod strides;

pub use strides::{packed_strides, validate_packed, StrideError};

use ndarray::{ArrayBase, Data, Dimension};

use crate::errors::IngestError;
use crate::format::ElementTag;

/// Numeric types that can be handed over as buffer elements,
/// with the tag describing their encoding.
pub trait Element : bytemuck::Pod {
    const TAG : ElementTag;
}

macro_rules! impl_element {
    ($($t : ty => $tag : ident),* $(,)?) => {
        $(
            impl Element for $t {
                const TAG : ElementTag = ElementTag::$tag;
            }
        )*
    };
}

impl_element!(
    i8 => I8, i16 => I16, i32 => I32, i64 => I64,
    u8 => U8, u16 => U16, u32 => U32, u64 => U64,
    f32 => F32, f64 => F64,
);

/// Describes an externally owned block of memory as a
/// multi-dimensional array.
///
/// * `shape` - extent of each dimension, slowest first (matrix order)
/// * `itemsize` - bytes per element (all components share the same width)
/// * `strides` - bytes to step along each dimension
/// * `format` - tag naming the element encoding (see `ElementTag::parse`)
/// * `data` - the memory, at least `itemsize * product(shape)` bytes long
#[derive(Debug, Clone)]
pub struct BufferDescriptor<'a> {
    shape : Vec<usize>,
    itemsize : usize,
    strides : Vec<isize>,
    format : String,
    data : &'a [u8],
}

impl<'a> BufferDescriptor<'a> {
    /// Creates a new descriptor, checking that it is self-consistent.
    /// Whether the layout is packed is NOT checked here -- that is
    /// the ingestor's job.
    ///
    /// ## Arguments
    ///
    /// * `shape` - Extent of each dimension, slowest first
    ///
    /// * `itemsize` - Size of one element in bytes
    ///
    /// * `strides` - Byte stride of each dimension
    ///
    /// * `format` - Format tag of the elements
    ///
    /// * `data` - The raw memory
    ///
    /// ## Errors
    ///
    /// * `IngestError::MalformedDescriptor` - if the number of strides
    /// differs from the number of dimensions, `itemsize` is zero, the
    /// byte size or any packed stride overflows an `isize` (even when
    /// another dimension is empty), or `data` is too short.
    ///
    /// ## Example
    ///
    /// ```
    /// use buffersource::BufferDescriptor;
    ///
    /// let bytes = [0u8; 4 * 3 * 4];
    /// let desc = BufferDescriptor::new(vec![4, 3], 4, vec![12, 4], "f", &bytes).unwrap();
    /// assert_eq!(desc.size(), 12);
    /// ```
    pub fn new(
        shape : Vec<usize>,
        itemsize : usize,
        strides : Vec<isize>,
        format : impl Into<String>,
        data : &'a [u8],
        ) -> Result<Self, IngestError> {
        if shape.len() != strides.len() {
            return Err(IngestError::MalformedDescriptor(format!(
                "{} dimensions but {} strides", shape.len(), strides.len()
            )));
        }
        if itemsize == 0 {
            return Err(IngestError::MalformedDescriptor("itemsize is zero".to_string()));
        }

        if itemsize.checked_mul(8).is_none() {
            return Err(IngestError::MalformedDescriptor(
                format!("itemsize {} is too large", itemsize)
            ));
        }

        // Every packed stride, and the byte size, must fit in an isize
        let required = isize::try_from(itemsize).ok()
            .and_then(|itemsize| shape.iter().rev().try_fold(itemsize, |acc, &extent| {
                acc.checked_mul(isize::try_from(extent).ok()?)
            }))
            .ok_or_else(|| IngestError::MalformedDescriptor(
                format!("byte size of shape {:?} with itemsize {} overflows", shape, itemsize)
            ))? as usize;

        if data.len() < required {
            return Err(IngestError::MalformedDescriptor(format!(
                "region holds {} bytes, shape {:?} with itemsize {} needs {}",
                data.len(), shape, itemsize, required
            )));
        }

        Ok(BufferDescriptor {
            shape,
            itemsize,
            strides,
            format : format.into(),
            data,
        })
    }

    /// Describes the memory backing an `ndarray` array or view,
    /// in the same terms a buffer-protocol export would use:
    /// byte strides, the element's format code, and its size.
    ///
    /// Views that are not in standard (row-major) order are
    /// still described faithfully, so ingesting them fails
    /// with `UnsupportedLayout`.
    ///
    /// ## Errors
    ///
    /// * `IngestError::UnsupportedLayout` - if the array's memory is
    /// not contiguous in any order, so no single region describes it
    ///
    /// ## Example
    ///
    /// ```
    /// use buffersource::BufferDescriptor;
    /// use ndarray::Array2;
    ///
    /// let array = Array2::<u16>::zeros((4, 3));
    /// let desc = BufferDescriptor::from_array(&array).unwrap();
    /// assert_eq!(desc.strides(), &[6, 2]);
    /// assert_eq!(desc.format(), "H");
    /// ```
    pub fn from_array<T, S, D>(array : &'a ArrayBase<S, D>) -> Result<Self, IngestError>
        where T : Element, S : Data<Elem = T>, D : Dimension {
        let itemsize = std::mem::size_of::<T>();
        let shape = array.shape().to_vec();
        let strides : Vec<isize> = array.strides().iter()
            .map(|&s| s * itemsize as isize)
            .collect();

        let elements = array.as_slice_memory_order().ok_or_else(|| {
            IngestError::UnsupportedLayout(StrideError {
                expected : packed_strides(&shape, itemsize),
                actual : strides.clone(),
            })
        })?;

        BufferDescriptor::new(
            shape,
            itemsize,
            strides,
            T::TAG.code(),
            bytemuck::cast_slice(elements),
        )
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn itemsize(&self) -> usize {
        self.itemsize
    }

    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Number of elements, the product of `shape`.
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Number of bytes the described array occupies, `itemsize * size()`.
    pub fn byte_len(&self) -> usize {
        self.itemsize * self.size()
    }

    /// The described bytes, i.e. the first `byte_len()` bytes of the region.
    pub fn bytes(&self) -> &'a [u8] {
        &self.data[..self.byte_len()]
    }
}
