//! Code in this module deals strictly with the shape of
//! a buffer: how many dimensions it may have, how many
//! components its trailing dimension holds, and how its
//! matrix-order shape maps onto the spatial extent of a surface.

use crate::errors::IngestError;

/// Largest number of components (channels) an element may have.
pub const MAX_COMPONENTS : usize = 4;

/// Which kind of surface a buffer is destined for. Decides
/// how many dimensions the buffer may have, and whether the
/// trailing dimension is read as components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionClass {
    /// (rows, columns) or (rows, columns, components)
    Image,
    /// (rows, columns, slices) or (rows, columns, slices, components)
    Volume,
}

impl DimensionClass {
    /// Smallest and largest accepted number of dimensions.
    pub fn accepted_ndim(&self) -> (usize, usize) {
        match self {
            DimensionClass::Image => (2, 3),
            DimensionClass::Volume => (3, 4),
        }
    }

    /// Number of spatial (non-component) dimensions.
    pub fn spatial_ndim(&self) -> usize {
        self.accepted_ndim().0
    }

    /// Fails with `InvalidDimensionality` unless `ndim` is
    /// within `accepted_ndim()`.
    pub fn check_ndim(&self, ndim : usize) -> Result<(), IngestError> {
        let (lo, hi) = self.accepted_ndim();
        if ndim < lo || ndim > hi {
            return Err(IngestError::InvalidDimensionality { class : *self, ndim });
        }
        Ok(())
    }

    /// Returns the number of components each element has: 1 if the
    /// buffer only has spatial dimensions, otherwise the extent of
    /// the trailing dimension.
    ///
    /// ## Errors
    ///
    /// * `IngestError::InvalidDimensionality` - wrong number of dimensions
    ///
    /// * `IngestError::TooManyComponents` - more than `MAX_COMPONENTS`
    ///
    /// ## Example
    ///
    /// ```
    /// use buffersource::DimensionClass;
    ///
    /// assert_eq!(DimensionClass::Image.components(&[4, 3]).unwrap(), 1);
    /// assert_eq!(DimensionClass::Image.components(&[4, 3, 3]).unwrap(), 3);
    /// assert_eq!(DimensionClass::Volume.components(&[4, 3, 3]).unwrap(), 1);
    /// ```
    pub fn components(&self, shape : &[usize]) -> Result<usize, IngestError> {
        self.check_ndim(shape.len())?;

        let components = if shape.len() == self.spatial_ndim() {
            1
        } else {
            shape[self.spatial_ndim()]
        };

        if components > MAX_COMPONENTS {
            return Err(IngestError::TooManyComponents(components));
        }
        Ok(components)
    }

    /// The spatial extent of the surface for a buffer of this `shape`.
    /// Buffers are described in matrix order (rows, columns, slices)
    /// while surfaces are (width, height, depth), so the first two
    /// axes swap: width is the number of columns, height the number of rows.
    ///
    /// Presumes `shape` already passed `check_ndim`.
    pub fn extent(&self, shape : &[usize]) -> Extent {
        match self {
            DimensionClass::Image => Extent::Planar {
                width : shape[1],
                height : shape[0],
            },
            DimensionClass::Volume => Extent::Volumetric {
                width : shape[1],
                height : shape[0],
                depth : shape[2],
            },
        }
    }
}

impl std::fmt::Display for DimensionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DimensionClass::Image => write!(f, "image"),
            DimensionClass::Volume => write!(f, "volume"),
        }
    }
}

/// `Extent` holds the spatial size of a surface,
/// in image notation.
///
/// `width` is the number of columns
/// `height` is the number of rows
/// `depth` is the number of slices (volumes only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extent {
    Planar{ width : usize, height : usize },
    Volumetric{ width : usize, height : usize, depth : usize },
}

impl Extent {
    pub fn width(&self) -> usize {
        match self {
            Extent::Planar{width, ..} | Extent::Volumetric{width, ..} => *width,
        }
    }

    pub fn height(&self) -> usize {
        match self {
            Extent::Planar{height, ..} | Extent::Volumetric{height, ..} => *height,
        }
    }

    /// 1 for planar extents.
    pub fn depth(&self) -> usize {
        match self {
            Extent::Planar{..} => 1,
            Extent::Volumetric{depth, ..} => *depth,
        }
    }

    /// Total number of pixels or voxels, or `None` if that
    /// does not fit in a `usize`.
    pub fn checked_len(&self) -> Option<usize> {
        self.width().checked_mul(self.height())?.checked_mul(self.depth())
    }

    /// The extent in matrix order, (height, width) or
    /// (height, width, depth), i.e. the shape of the buffer
    /// it was computed from minus the component axis.
    pub fn to_matrix_shape(&self) -> Vec<usize> {
        match self {
            Extent::Planar{width, height} => vec![*height, *width],
            Extent::Volumetric{width, height, depth} => vec![*height, *width, *depth],
        }
    }
}
