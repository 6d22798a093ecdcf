//! Errors that can occur while turning a raw buffer into
//! an image or volume. Every variant is terminal: nothing
//! is retried, and nothing is delivered to the target once
//! one of these has been produced.

use crate::buffer::StrideError;
use crate::dimensions::DimensionClass;
use crate::format::NumericCategory;

/// Errors that can occur during ingestion, either while
/// resolving the destination (`TargetNotFound`, `TargetTypeMismatch`),
/// validating the buffer (dimensions, strides, element type, format),
/// or allocating the surface that receives the data.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestError {
    /// No destination is registered under this identifier.
    TargetNotFound(String),
    /// The destination exists but is not the expected kind of source.
    TargetTypeMismatch{ identifier : String, expected : &'static str },
    /// The number of dimensions is outside the range accepted
    /// for this kind of surface.
    InvalidDimensionality{ class : DimensionClass, ndim : usize },
    /// The trailing (component) dimension is larger than `MAX_COMPONENTS`.
    TooManyComponents(usize),
    /// The strides do not describe a densely packed row-major buffer.
    UnsupportedLayout(StrideError),
    /// The format tag is not in the recognized vocabulary.
    UnsupportedElementType(String),
    /// No catalog entry for this (category, components, bits) triple.
    UnsupportedFormat{ category : NumericCategory, components : usize, bits : usize },
    /// The surface factory could not provide storage for `bytes` bytes.
    AllocationFailed{ bytes : usize },
    /// The descriptor itself is inconsistent (e.g. the memory region
    /// is shorter than `itemsize * product(shape)`).
    MalformedDescriptor(String),
    /// A typed view of a surface was requested with the wrong element type.
    ElementTypeMismatch(String),
}

impl From<StrideError> for IngestError {
    fn from(err : StrideError) -> Self {
        IngestError::UnsupportedLayout(err)
    }
}

impl From<bytemuck::PodCastError> for IngestError {
    fn from(err : bytemuck::PodCastError) -> Self {
        IngestError::ElementTypeMismatch(format!("{:?}", err))
    }
}

impl std::error::Error for IngestError {}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            IngestError::TargetNotFound(identifier) => {
                write!(f, "Cannot find source {}", identifier)
            },
            IngestError::TargetTypeMismatch{identifier, expected} => {
                write!(f, "{} is not of the correct type (expected {})", identifier, expected)
            },
            IngestError::InvalidDimensionality{class, ndim} => {
                let (lo, hi) = class.accepted_ndim();
                write!(f,
                    "Incompatible buffer dimensions for {} (expected {} or {}, got {})",
                    class, lo, hi, ndim
                )
            },
            IngestError::TooManyComponents(components) => {
                write!(f,
                    "Too many components (expected maximum {}, got {})",
                    crate::dimensions::MAX_COMPONENTS, components
                )
            },
            IngestError::UnsupportedLayout(err) => {
                write!(f, "Data stride not supported: {}", err)
            },
            IngestError::UnsupportedElementType(tag) => {
                write!(f, "Data type not supported: {:?}", tag)
            },
            IngestError::UnsupportedFormat{category, components, bits} => {
                write!(f,
                    "Data format not supported ({:?}, {} components, {} bits)",
                    category, components, bits
                )
            },
            IngestError::AllocationFailed{bytes} => {
                write!(f, "Cannot allocate surface buffer of {} bytes", bytes)
            },
            IngestError::MalformedDescriptor(msg) => {
                write!(f, "Malformed buffer descriptor: {}", msg)
            },
            IngestError::ElementTypeMismatch(msg) => {
                write!(f, "Element type mismatch: {}", msg)
            },
        }
    }
}
