//! `Host`
//!
//! The seam between ingestion and the application that consumes
//! its surfaces. The host wraps surfaces in shared `Image` and
//! `Volume` containers, hands out sinks for named destinations
//! through `SourceLookup`, and those sinks republish whatever
//! they are given to the rest of the host's processing graph.

mod source;

pub use source::{DataSource, ImageSource, InvalidationLevel, SourceNetwork, SourceNode, VolumeSource};

use std::sync::Arc;

use crate::dimensions::Extent;
use crate::errors::IngestError;
use crate::format::ElementFormat;
use crate::surface::Surface;

/// A 2-D image made of a single colour layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    layer : Surface,
}

impl Image {
    pub fn new(layer : Surface) -> Self {
        Image { layer }
    }

    pub fn layer(&self) -> &Surface {
        &self.layer
    }

    /// (width, height) of the image.
    pub fn dimensions(&self) -> (usize, usize) {
        let extent = self.layer.extent();
        (extent.width(), extent.height())
    }

    pub fn format(&self) -> ElementFormat {
        self.layer.format()
    }
}

/// A 3-D volume made of a single surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data : Surface,
}

impl Volume {
    pub fn new(data : Surface) -> Self {
        Volume { data }
    }

    pub fn data(&self) -> &Surface {
        &self.data
    }

    /// (width, height, depth) of the volume.
    pub fn dimensions(&self) -> (usize, usize, usize) {
        let extent : Extent = self.data.extent();
        (extent.width(), extent.height(), extent.depth())
    }

    pub fn format(&self) -> ElementFormat {
        self.data.format()
    }
}

/// A destination that republishes images downstream.
pub trait ImageSink {
    fn accept(&mut self, image : Arc<Image>);
}

/// A destination that republishes volumes downstream.
pub trait VolumeSink {
    fn accept(&mut self, volume : Arc<Volume>);
}

/// Resolves the identifier of a destination in the host to a
/// sink of the requested kind. Implementations are not assumed
/// to be thread-safe; the `&mut self` receivers make callers
/// serialize their access.
pub trait SourceLookup {
    /// ## Errors
    ///
    /// * `IngestError::TargetNotFound` - nothing is registered as `identifier`
    ///
    /// * `IngestError::TargetTypeMismatch` - `identifier` is not an image source
    fn image_sink(&mut self, identifier : &str) -> Result<&mut dyn ImageSink, IngestError>;

    /// ## Errors
    ///
    /// * `IngestError::TargetNotFound` - nothing is registered as `identifier`
    ///
    /// * `IngestError::TargetTypeMismatch` - `identifier` is not a volume source
    fn volume_sink(&mut self, identifier : &str) -> Result<&mut dyn VolumeSink, IngestError>;
}
