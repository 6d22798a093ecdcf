//! A minimal in-memory host: a registry of named image and
//! volume sources. Each source keeps the last data it was
//! handed on its outport and flags its output as invalid
//! until a consumer picks the change up.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use crate::errors::IngestError;
use crate::host::{Image, ImageSink, SourceLookup, Volume, VolumeSink};

/// How stale a source's output is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InvalidationLevel {
    Valid,
    InvalidOutput,
}

/// A source node that publishes values of type `T`.
#[derive(Debug)]
pub struct DataSource<T> {
    outport : Option<Arc<T>>,
    invalidation : InvalidationLevel,
    updates : usize,
}

pub type ImageSource = DataSource<Image>;
pub type VolumeSource = DataSource<Volume>;

impl<T> Default for DataSource<T> {
    fn default() -> Self {
        DataSource {
            outport : None,
            invalidation : InvalidationLevel::Valid,
            updates : 0,
        }
    }
}

impl<T> DataSource<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The data currently on the outport, shared.
    pub fn data(&self) -> Option<Arc<T>> {
        self.outport.clone()
    }

    pub fn invalidation(&self) -> InvalidationLevel {
        self.invalidation
    }

    /// Number of times data has been set on this source.
    pub fn updates(&self) -> usize {
        self.updates
    }

    /// Returns the current invalidation level and marks the
    /// source valid again, as a downstream consumer does once
    /// it has recomputed.
    pub fn take_invalidation(&mut self) -> InvalidationLevel {
        std::mem::replace(&mut self.invalidation, InvalidationLevel::Valid)
    }

    fn set_data(&mut self, data : Arc<T>) {
        self.outport = Some(data);
        self.updates += 1;
        self.invalidation = self.invalidation.max(InvalidationLevel::InvalidOutput);
    }
}

impl ImageSink for DataSource<Image> {
    fn accept(&mut self, image : Arc<Image>) {
        self.set_data(image);
    }
}

impl VolumeSink for DataSource<Volume> {
    fn accept(&mut self, volume : Arc<Volume>) {
        self.set_data(volume);
    }
}

/// A node of a `SourceNetwork`.
#[derive(Debug)]
pub enum SourceNode {
    Image(ImageSource),
    Volume(VolumeSource),
}

impl SourceNode {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceNode::Image(_) => "image source",
            SourceNode::Volume(_) => "volume source",
        }
    }
}

/// Sources registered by identifier.
///
/// ## Example
///
/// ```
/// use buffersource::{set_image, BufferDescriptor, SourceNetwork};
/// use ndarray::Array2;
///
/// let mut network = SourceNetwork::new();
/// network.add_image_source("ImageSource1");
///
/// let array = Array2::<u8>::zeros((4, 3));
/// set_image(&mut network, "ImageSource1", &BufferDescriptor::from_array(&array).unwrap()).unwrap();
///
/// let image = network.image_source("ImageSource1").unwrap().data().unwrap();
/// assert_eq!(image.dimensions(), (3, 4));
/// ```
#[derive(Debug, Default)]
pub struct SourceNetwork {
    nodes : HashMap<String, SourceNode>,
}

impl SourceNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, identifier : String, node : SourceNode) {
        debug!("Adding {} {}", node.kind(), identifier);
        if let Some(previous) = self.nodes.insert(identifier.clone(), node) {
            warn!("Replaced existing {} {}", previous.kind(), identifier);
        }
    }

    /// Registers a new, empty image source as `identifier`,
    /// replacing any node already registered under that name.
    pub fn add_image_source(&mut self, identifier : impl Into<String>) {
        self.add(identifier.into(), SourceNode::Image(ImageSource::new()));
    }

    /// Registers a new, empty volume source as `identifier`,
    /// replacing any node already registered under that name.
    pub fn add_volume_source(&mut self, identifier : impl Into<String>) {
        self.add(identifier.into(), SourceNode::Volume(VolumeSource::new()));
    }

    pub fn remove(&mut self, identifier : &str) -> Option<SourceNode> {
        self.nodes.remove(identifier)
    }

    pub fn node(&self, identifier : &str) -> Option<&SourceNode> {
        self.nodes.get(identifier)
    }

    pub fn image_source(&self, identifier : &str) -> Option<&ImageSource> {
        match self.nodes.get(identifier) {
            Some(SourceNode::Image(source)) => Some(source),
            _ => None,
        }
    }

    pub fn image_source_mut(&mut self, identifier : &str) -> Option<&mut ImageSource> {
        match self.nodes.get_mut(identifier) {
            Some(SourceNode::Image(source)) => Some(source),
            _ => None,
        }
    }

    pub fn volume_source(&self, identifier : &str) -> Option<&VolumeSource> {
        match self.nodes.get(identifier) {
            Some(SourceNode::Volume(source)) => Some(source),
            _ => None,
        }
    }

    pub fn volume_source_mut(&mut self, identifier : &str) -> Option<&mut VolumeSource> {
        match self.nodes.get_mut(identifier) {
            Some(SourceNode::Volume(source)) => Some(source),
            _ => None,
        }
    }

    /// Identifiers of every registered node, in no particular order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }
}

impl SourceLookup for SourceNetwork {
    fn image_sink(&mut self, identifier : &str) -> Result<&mut dyn ImageSink, IngestError> {
        match self.nodes.get_mut(identifier) {
            Some(SourceNode::Image(source)) => Ok(source),
            Some(SourceNode::Volume(_)) => Err(IngestError::TargetTypeMismatch {
                identifier : identifier.to_string(),
                expected : "image source",
            }),
            None => Err(IngestError::TargetNotFound(identifier.to_string())),
        }
    }

    fn volume_sink(&mut self, identifier : &str) -> Result<&mut dyn VolumeSink, IngestError> {
        match self.nodes.get_mut(identifier) {
            Some(SourceNode::Volume(source)) => Ok(source),
            Some(SourceNode::Image(_)) => Err(IngestError::TargetTypeMismatch {
                identifier : identifier.to_string(),
                expected : "volume source",
            }),
            None => Err(IngestError::TargetNotFound(identifier.to_string())),
        }
    }
}
