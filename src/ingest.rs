//! # Ingestion
//!
//! Turns a `BufferDescriptor` into a `Surface`. Validation runs
//! to completion before anything is allocated, so a buffer that
//! is rejected never causes a surface to be requested.

use log::{debug, trace};

use crate::buffer::{validate_packed, BufferDescriptor};
use crate::dimensions::{DimensionClass, Extent};
use crate::errors::IngestError;
use crate::format::{classify, ElementFormat};
use crate::surface::{HeapSurfaceFactory, Surface, SurfaceFactory};

/// Everything ingestion decides about a buffer before it
/// allocates: the surface's extent and format and the
/// number of bytes that will be copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestPlan {
    pub class : DimensionClass,
    pub extent : Extent,
    pub format : ElementFormat,
    pub byte_len : usize,
}

impl IngestPlan {
    /// Validates `desc` as a buffer for a surface of `class`
    /// and works out what that surface will look like.
    /// Read-only: nothing is allocated or copied.
    ///
    /// ## Errors
    ///
    /// In the order they are checked:
    ///
    /// * `IngestError::InvalidDimensionality`
    /// * `IngestError::UnsupportedLayout`
    /// * `IngestError::UnsupportedElementType`
    /// * `IngestError::TooManyComponents`
    /// * `IngestError::UnsupportedFormat`
    ///
    /// ## Example
    ///
    /// ```
    /// use buffersource::{BufferDescriptor, DimensionClass, Extent, IngestPlan};
    ///
    /// let bytes = [0u8; 4 * 3 * 3];
    /// let desc = BufferDescriptor::new(vec![4, 3, 3], 1, vec![9, 3, 1], "B", &bytes).unwrap();
    /// let plan = IngestPlan::new(DimensionClass::Image, &desc).unwrap();
    /// assert_eq!(plan.extent, Extent::Planar { width : 3, height : 4 });
    /// assert_eq!(plan.format.components(), 3);
    /// ```
    pub fn new(class : DimensionClass, desc : &BufferDescriptor) -> Result<Self, IngestError> {
        class.check_ndim(desc.ndim())?;
        validate_packed(desc.shape(), desc.itemsize(), desc.strides())?;

        let category = classify(desc.format())?;
        let components = class.components(desc.shape())?;
        let format = ElementFormat::resolve(category, components, desc.itemsize() * 8)?;
        let extent = class.extent(desc.shape());

        trace!(
            "Resolved {} buffer {:?} ({:?}) to {} with extent {:?}",
            class, desc.shape(), desc.format(), format, extent
        );

        Ok(IngestPlan {
            class,
            extent,
            format,
            byte_len : desc.byte_len(),
        })
    }
}

/// Converts buffers into surfaces allocated by a `SurfaceFactory`.
///
/// Holds no state between calls other than the factory itself.
#[derive(Debug, Clone, Default)]
pub struct BufferIngestor<F = HeapSurfaceFactory> {
    factory : F,
}

impl BufferIngestor<HeapSurfaceFactory> {
    /// An ingestor that allocates surfaces on the heap.
    pub fn new() -> Self {
        BufferIngestor { factory : HeapSurfaceFactory }
    }
}

impl<F : SurfaceFactory> BufferIngestor<F> {
    pub fn with_factory(factory : F) -> Self {
        BufferIngestor { factory }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Ingests a (rows, columns) or (rows, columns, components)
    /// buffer into a 2-D surface of width `columns`, height `rows`.
    ///
    /// ## Example
    ///
    /// ```
    /// use buffersource::{BufferDescriptor, BufferIngestor, Extent};
    /// use ndarray::Array2;
    ///
    /// let array = Array2::<f32>::zeros((4, 3));
    /// let desc = BufferDescriptor::from_array(&array).unwrap();
    /// let surface = BufferIngestor::new().ingest_image(&desc).unwrap();
    /// assert_eq!(surface.extent(), Extent::Planar { width : 3, height : 4 });
    /// ```
    pub fn ingest_image(&self, desc : &BufferDescriptor) -> Result<Surface, IngestError> {
        self.ingest(DimensionClass::Image, desc)
    }

    /// Ingests a (rows, columns, slices) or (rows, columns, slices,
    /// components) buffer into a 3-D surface of width `columns`,
    /// height `rows`, depth `slices`.
    pub fn ingest_volume(&self, desc : &BufferDescriptor) -> Result<Surface, IngestError> {
        self.ingest(DimensionClass::Volume, desc)
    }

    /// Validates, allocates, then copies the buffer's bytes
    /// into the new surface as one linear block. The byte
    /// order is untouched: only the declared extent swaps
    /// rows and columns, and row 0 of the buffer stays row 0.
    pub fn ingest(&self, class : DimensionClass, desc : &BufferDescriptor)
        -> Result<Surface, IngestError> {
        let plan = IngestPlan::new(class, desc)?;

        let mut surface = self.factory.create(plan.extent, plan.format)?;
        if surface.extent() != plan.extent
            || surface.format() != plan.format
            || surface.byte_len() != plan.byte_len {
            return Err(IngestError::AllocationFailed { bytes : plan.byte_len });
        }

        surface.as_bytes_mut().copy_from_slice(desc.bytes());
        debug!(
            "Copied {} bytes into {} {} surface {:?}",
            plan.byte_len, plan.format, class, plan.extent
        );
        Ok(surface)
    }
}
