//! # Element formats
//!
//! Everything to do with what a single pixel or voxel is made of:
//! the numeric category of its components, how many components
//! there are, and how wide each one is. `resolve` looks a
//! (category, components, bits) triple up in the fixed catalog
//! of formats a surface can be created with.

pub(crate) mod tags;

pub use tags::{classify, ElementTag};

use crate::dimensions::MAX_COMPONENTS;
use crate::errors::IngestError;

/// Numeric interpretation of the components of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericCategory {
    Float,
    SignedInteger,
    UnsignedInteger,
}

/// Component widths, in bits, supported for each category.
static FLOAT_BITS : [usize; 3] = [16, 32, 64];
static INTEGER_BITS : [usize; 4] = [8, 16, 32, 64];

/// A concrete pixel/voxel format from the supported catalog.
///
/// Only obtainable through `ElementFormat::resolve` (or the
/// `FLOAT32`-style constants), so every `ElementFormat` in
/// circulation is one a surface can actually be allocated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementFormat {
    category : NumericCategory,
    components : u8,
    bits : u8,
}

impl ElementFormat {
    pub const FLOAT32 : ElementFormat = ElementFormat::new_unchecked(NumericCategory::Float, 1, 32);
    pub const FLOAT64 : ElementFormat = ElementFormat::new_unchecked(NumericCategory::Float, 1, 64);
    pub const UINT8 : ElementFormat = ElementFormat::new_unchecked(NumericCategory::UnsignedInteger, 1, 8);
    pub const UINT16 : ElementFormat = ElementFormat::new_unchecked(NumericCategory::UnsignedInteger, 1, 16);
    pub const VEC3_UINT8 : ElementFormat = ElementFormat::new_unchecked(NumericCategory::UnsignedInteger, 3, 8);
    pub const VEC4_UINT8 : ElementFormat = ElementFormat::new_unchecked(NumericCategory::UnsignedInteger, 4, 8);

    const fn new_unchecked(category : NumericCategory, components : u8, bits : u8) -> Self {
        ElementFormat { category, components, bits }
    }

    /// Looks up the catalog entry for `category`, `components`
    /// and `bits` (the width of a single component).
    ///
    /// ## Arguments
    ///
    /// * `category` - Numeric category of every component
    ///
    /// * `components` - Number of components per element, 1 through 4
    ///
    /// * `bits` - Width of one component in bits
    ///
    /// ## Errors
    ///
    /// * `IngestError::UnsupportedFormat` - if there is no such entry
    ///
    /// ## Example
    ///
    /// ```
    /// use buffersource::{ElementFormat, NumericCategory};
    ///
    /// let rgb = ElementFormat::resolve(NumericCategory::UnsignedInteger, 3, 8).unwrap();
    /// assert_eq!(rgb.name(), "Vec3UInt8");
    /// assert!(ElementFormat::resolve(NumericCategory::Float, 1, 8).is_err());
    /// ```
    pub fn resolve(
        category : NumericCategory,
        components : usize,
        bits : usize,
        ) -> Result<Self, IngestError> {
        let supported_bits : &[usize] = match category {
            NumericCategory::Float => &FLOAT_BITS,
            NumericCategory::SignedInteger
            | NumericCategory::UnsignedInteger => &INTEGER_BITS,
        };

        if (1..=MAX_COMPONENTS).contains(&components) && supported_bits.contains(&bits) {
            Ok(ElementFormat::new_unchecked(category, components as u8, bits as u8))
        } else {
            Err(IngestError::UnsupportedFormat { category, components, bits })
        }
    }

    pub fn category(&self) -> NumericCategory {
        self.category
    }

    pub fn components(&self) -> usize {
        self.components as usize
    }

    /// Width of one component, in bits.
    pub fn bits_per_component(&self) -> usize {
        self.bits as usize
    }

    pub fn bytes_per_component(&self) -> usize {
        self.bits as usize / 8
    }

    /// Size of one whole element (all of its components), in bytes.
    pub fn bytes_per_element(&self) -> usize {
        self.bytes_per_component() * self.components()
    }

    /// The host's name for this format, e.g. `Float32` or `Vec4Int16`.
    pub fn name(&self) -> String {
        let scalar = match self.category {
            NumericCategory::Float => "Float",
            NumericCategory::SignedInteger => "Int",
            NumericCategory::UnsignedInteger => "UInt",
        };
        match self.components {
            1 => format!("{}{}", scalar, self.bits),
            n => format!("Vec{}{}{}", n, scalar, self.bits),
        }
    }

    /// Every format in the catalog, scalars first.
    pub fn catalog() -> impl Iterator<Item = ElementFormat> {
        let float = FLOAT_BITS.iter().map(|&b| (NumericCategory::Float, b));
        let signed = INTEGER_BITS.iter().map(|&b| (NumericCategory::SignedInteger, b));
        let unsigned = INTEGER_BITS.iter().map(|&b| (NumericCategory::UnsignedInteger, b));

        (1..=MAX_COMPONENTS as u8).flat_map(move |components| {
            float.clone().chain(signed.clone()).chain(unsigned.clone())
                .map(move |(category, bits)| {
                    ElementFormat::new_unchecked(category, components, bits as u8)
                })
        })
    }
}

impl std::fmt::Display for ElementFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
