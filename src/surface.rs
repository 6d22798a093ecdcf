//! # Surfaces
//!
//! A `Surface` is a newly allocated, exclusively owned block of
//! memory shaped as a 2-D layer or a 3-D volume and typed by an
//! `ElementFormat`. Surfaces come from a `SurfaceFactory`, which
//! the host normally provides; `HeapSurfaceFactory` allocates
//! them on the heap.

use ndarray::{ArrayViewD, IxDyn};

use crate::buffer::Element;
use crate::dimensions::Extent;
use crate::errors::IngestError;
use crate::format::ElementFormat;

/// Typed storage for one layer or volume.
///
/// Backed by 64-bit words so that a typed view of any
/// supported component width is always aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    extent : Extent,
    format : ElementFormat,
    storage : Vec<u64>,
    byte_len : usize,
}

impl Surface {
    /// Allocates a zeroed surface of `extent` elements of `format`.
    ///
    /// ## Errors
    ///
    /// * `IngestError::AllocationFailed` - if the size overflows or
    /// the allocator cannot provide the memory.
    pub fn allocate(extent : Extent, format : ElementFormat) -> Result<Self, IngestError> {
        let byte_len = extent.checked_len()
            .and_then(|len| len.checked_mul(format.bytes_per_element()))
            .ok_or(IngestError::AllocationFailed { bytes : usize::MAX })?;

        let words = byte_len / 8 + usize::from(byte_len % 8 != 0);
        let mut storage : Vec<u64> = Vec::new();
        storage.try_reserve_exact(words)
            .map_err(|_| IngestError::AllocationFailed { bytes : byte_len })?;
        storage.resize(words, 0);

        Ok(Surface {
            extent,
            format,
            storage,
            byte_len,
        })
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn format(&self) -> ElementFormat {
        self.format
    }

    /// Size of the surface's data in bytes.
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// The surface's data, element after element, row after row.
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.storage)[..self.byte_len]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let byte_len = self.byte_len;
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.storage)[..byte_len]
    }

    fn check_element<T : Element>(&self) -> Result<(), IngestError> {
        let tag = T::TAG;
        if tag.category() != self.format.category()
            || tag.byte_size() != self.format.bytes_per_component() {
            return Err(IngestError::ElementTypeMismatch(format!(
                "cannot view {} surface as {:?}", self.format, tag
            )));
        }
        Ok(())
    }

    /// The surface's components as a flat typed slice.
    ///
    /// ## Errors
    ///
    /// * `IngestError::ElementTypeMismatch` - if `T` does not have the
    /// category and width of the surface's components
    pub fn as_slice<T : Element>(&self) -> Result<&[T], IngestError> {
        self.check_element::<T>()?;
        Ok(bytemuck::try_cast_slice(self.as_bytes())?)
    }

    /// Views the surface as an array in matrix order:
    /// `(height, width, components)` for layers and
    /// `(height, width, depth, components)` for volumes.
    /// This is the order of the bytes as they were copied
    /// in, so `view[[r, c, ..]]` is the element that sat at
    /// row `r`, column `c` of the source buffer. Row 0 is
    /// the first row of the source; nothing is flipped.
    ///
    /// ## Example
    ///
    /// ```
    /// use buffersource::{ElementFormat, Extent, Surface};
    ///
    /// let surface = Surface::allocate(
    ///     Extent::Planar { width : 3, height : 4 },
    ///     ElementFormat::VEC3_UINT8
    /// ).unwrap();
    /// assert_eq!(surface.as_array::<u8>().unwrap().shape(), &[4, 3, 3]);
    /// ```
    pub fn as_array<T : Element>(&self) -> Result<ArrayViewD<'_, T>, IngestError> {
        let mut shape = self.extent.to_matrix_shape();
        shape.push(self.format.components());

        ArrayViewD::from_shape(IxDyn(&shape), self.as_slice::<T>()?)
            .map_err(|err| IngestError::ElementTypeMismatch(err.to_string()))
    }
}

/// Allocates surfaces for the ingestor. Implemented by the
/// host so that surfaces land in memory it knows how to
/// manage.
pub trait SurfaceFactory {
    /// Creates a 2-D surface of `width` x `height` elements.
    fn create_layer(&self, width : usize, height : usize, format : ElementFormat)
        -> Result<Surface, IngestError>;

    /// Creates a 3-D surface of `width` x `height` x `depth` elements.
    fn create_volume(&self, width : usize, height : usize, depth : usize, format : ElementFormat)
        -> Result<Surface, IngestError>;

    /// Dispatches to `create_layer` or `create_volume` depending on `extent`.
    fn create(&self, extent : Extent, format : ElementFormat) -> Result<Surface, IngestError> {
        match extent {
            Extent::Planar{width, height} => self.create_layer(width, height, format),
            Extent::Volumetric{width, height, depth} => {
                self.create_volume(width, height, depth, format)
            },
        }
    }
}

/// Allocates surfaces with the global allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapSurfaceFactory;

impl SurfaceFactory for HeapSurfaceFactory {
    fn create_layer(&self, width : usize, height : usize, format : ElementFormat)
        -> Result<Surface, IngestError> {
        Surface::allocate(Extent::Planar { width, height }, format)
    }

    fn create_volume(&self, width : usize, height : usize, depth : usize, format : ElementFormat)
        -> Result<Surface, IngestError> {
        Surface::allocate(Extent::Volumetric { width, height, depth }, format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::NumericCategory;

    #[test]
    fn test_allocate() {
        let surface = HeapSurfaceFactory.create_layer(3, 4, ElementFormat::VEC3_UINT8).unwrap();
        assert_eq!(surface.extent(), Extent::Planar { width : 3, height : 4 });
        assert_eq!(surface.byte_len(), 36);
        assert!(surface.as_bytes().iter().all(|&b| b == 0));

        let format = ElementFormat::resolve(NumericCategory::Float, 2, 64).unwrap();
        let surface = HeapSurfaceFactory.create_volume(3, 2, 4, format).unwrap();
        assert_eq!(surface.byte_len(), 3 * 2 * 4 * 16);
        assert_eq!(surface.as_array::<f64>().unwrap().shape(), &[2, 3, 4, 2]);
    }

    #[test]
    fn test_allocate_overflow() {
        let extent = Extent::Planar { width : usize::MAX, height : 2 };
        assert!(matches!(
            Surface::allocate(extent, ElementFormat::UINT8),
            Err(IngestError::AllocationFailed { .. })
        ));
    }

    #[test]
    fn test_typed_views() {
        let mut surface = Surface::allocate(
            Extent::Planar { width : 2, height : 1 }, ElementFormat::UINT16
        ).unwrap();
        surface.as_bytes_mut().copy_from_slice(bytemuck::cast_slice(&[7u16, 9u16][..]));

        assert_eq!(surface.as_slice::<u16>().unwrap(), &[7, 9]);
        // Right width, wrong category
        assert!(matches!(
            surface.as_slice::<i16>(),
            Err(IngestError::ElementTypeMismatch(_))
        ));
        // Right category, wrong width
        assert!(surface.as_slice::<u8>().is_err());
        assert!(surface.as_array::<f32>().is_err());
    }

    #[test]
    fn test_odd_byte_lengths() {
        // 5 bytes does not fill a whole word of storage
        let surface = Surface::allocate(
            Extent::Planar { width : 5, height : 1 }, ElementFormat::UINT8
        ).unwrap();
        assert_eq!(surface.as_bytes().len(), 5);
        assert_eq!(surface.as_slice::<u8>().unwrap().len(), 5);
    }
}
