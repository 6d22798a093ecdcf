//! # buffersource
//!
//! Hands raw, externally owned memory buffers to an image or
//! volume pipeline. A buffer is described by its shape, element
//! size, byte strides and a format tag (`BufferDescriptor`); it is
//! checked to be packed row-major, its element format is resolved
//! from the tag, the element size and the trailing dimension,
//! and its bytes are copied into a freshly allocated `Surface`
//! whose extent is (columns, rows[, slices]). The surface is then
//! wrapped in an `Image` or `Volume` and delivered to a named
//! source in the host.
//!
//! ```
//! use buffersource::{set_volume, BufferDescriptor, SourceNetwork};
//! use ndarray::Array3;
//!
//! let mut network = SourceNetwork::new();
//! network.add_volume_source("VolumeSource");
//!
//! let array = Array3::<f64>::zeros((2, 3, 4));
//! set_volume(&mut network, "VolumeSource", &BufferDescriptor::from_array(&array).unwrap()).unwrap();
//!
//! let volume = network.volume_source("VolumeSource").unwrap().data().unwrap();
//! assert_eq!(volume.dimensions(), (3, 2, 4));
//! ```

use std::sync::Arc;

use log::debug;

mod buffer;
mod dimensions;
mod errors;
mod format;
mod host;
mod ingest;
mod surface;

pub use buffer::{packed_strides, validate_packed, BufferDescriptor, Element, StrideError};
pub use dimensions::{DimensionClass, Extent, MAX_COMPONENTS};
pub use errors::IngestError;
pub use format::{classify, ElementFormat, ElementTag, NumericCategory};
pub use host::{
    DataSource, Image, ImageSink, ImageSource, InvalidationLevel,
    SourceLookup, SourceNetwork, SourceNode, Volume, VolumeSink, VolumeSource,
};
pub use ingest::{BufferIngestor, IngestPlan};
pub use surface::{HeapSurfaceFactory, Surface, SurfaceFactory};

/// Version of this crate.
pub const VERSION : &str = env!("CARGO_PKG_VERSION");

/// `set_image(lookup, identifier, buffer)` ingests `buffer`
/// as a 2-D image and sets it as the data of the image source
/// registered as `identifier`, invalidating its output.
///
/// ## Arguments
///
/// * `lookup` - The host's registry of sources
///
/// * `identifier` - Identifier of an image source in `lookup`
///
/// * `buffer` - A packed row-major buffer of shape (rows, columns)
/// or (rows, columns, components)
///
/// ## Errors
///
/// Any `IngestError`. On error the source is left untouched.
///
/// ## Example
///
/// ```
/// use buffersource::{set_image, BufferDescriptor, SourceNetwork};
/// use ndarray::Array3;
///
/// let mut network = SourceNetwork::new();
/// network.add_image_source("ImageSource");
///
/// // An RGB image four rows tall and three columns wide
/// let rgb = Array3::<u8>::zeros((4, 3, 3));
/// set_image(&mut network, "ImageSource", &BufferDescriptor::from_array(&rgb).unwrap()).unwrap();
/// ```
pub fn set_image<L>(lookup : &mut L, identifier : &str, buffer : &BufferDescriptor)
    -> Result<(), IngestError> where L : SourceLookup + ?Sized {
    set_image_with(lookup, &BufferIngestor::new(), identifier, buffer)
}

/// `set_volume(lookup, identifier, buffer)` ingests `buffer`
/// as a 3-D volume and sets it as the data of the volume source
/// registered as `identifier`, invalidating its output.
///
/// ## Arguments
///
/// * `lookup` - The host's registry of sources
///
/// * `identifier` - Identifier of a volume source in `lookup`
///
/// * `buffer` - A packed row-major buffer of shape (rows, columns, slices)
/// or (rows, columns, slices, components)
///
/// ## Errors
///
/// Any `IngestError`. On error the source is left untouched.
pub fn set_volume<L>(lookup : &mut L, identifier : &str, buffer : &BufferDescriptor)
    -> Result<(), IngestError> where L : SourceLookup + ?Sized {
    set_volume_with(lookup, &BufferIngestor::new(), identifier, buffer)
}

/// As `set_image`, allocating through `ingestor`'s factory.
pub fn set_image_with<L, F>(
    lookup : &mut L,
    ingestor : &BufferIngestor<F>,
    identifier : &str,
    buffer : &BufferDescriptor,
    ) -> Result<(), IngestError> where L : SourceLookup + ?Sized, F : SurfaceFactory {
    let sink = lookup.image_sink(identifier)?;
    let surface = ingestor.ingest_image(buffer)?;
    sink.accept(Arc::new(Image::new(surface)));
    debug!("Set image on {}", identifier);
    Ok(())
}

/// As `set_volume`, allocating through `ingestor`'s factory.
pub fn set_volume_with<L, F>(
    lookup : &mut L,
    ingestor : &BufferIngestor<F>,
    identifier : &str,
    buffer : &BufferDescriptor,
    ) -> Result<(), IngestError> where L : SourceLookup + ?Sized, F : SurfaceFactory {
    let sink = lookup.volume_sink(identifier)?;
    let surface = ingestor.ingest_volume(buffer)?;
    sink.accept(Arc::new(Volume::new(surface)));
    debug!("Set volume on {}", identifier);
    Ok(())
}
