//! The closed vocabulary of element encodings a buffer
//! can declare, and the map from those to a `NumericCategory`.

use crate::errors::IngestError;
use crate::format::NumericCategory;

/// A recognized element encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementTag {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

/// Byte-order prefixes meaning "the host's own byte order".
#[cfg(target_endian = "little")]
const NATIVE_ORDER : &[char] = &['@', '=', '<'];
#[cfg(target_endian = "big")]
const NATIVE_ORDER : &[char] = &['@', '=', '>', '!'];

impl ElementTag {
    /// Parses a format tag. Accepts the single-character
    /// buffer-protocol codes (`b h i l q B H I L Q f d`; `l` and `L`
    /// are 64 bits wide) as well as the names `int8` .. `float64`
    /// and their short forms `i8` .. `f64`. Codes may carry a
    /// byte-order prefix only if it names the host's byte order:
    /// `@` or `=`, plus `<` on little-endian targets and `>` or `!`
    /// on big-endian ones. Elements are copied as they are, so
    /// foreign byte orders are rejected.
    ///
    /// ## Errors
    ///
    /// * `IngestError::UnsupportedElementType` - for anything else
    ///
    /// ## Example
    ///
    /// ```
    /// use buffersource::ElementTag;
    ///
    /// assert_eq!(ElementTag::parse("=f").unwrap(), ElementTag::F32);
    /// assert_eq!(ElementTag::parse("uint16").unwrap(), ElementTag::U16);
    /// assert!(ElementTag::parse("e").is_err());
    /// ```
    pub fn parse(format : &str) -> Result<Self, IngestError> {
        let code = format.strip_prefix(NATIVE_ORDER).unwrap_or(format);

        match code {
            "b" | "i8" | "int8" => Ok(ElementTag::I8),
            "h" | "i16" | "int16" => Ok(ElementTag::I16),
            "i" | "i32" | "int32" => Ok(ElementTag::I32),
            "l" | "q" | "i64" | "int64" => Ok(ElementTag::I64),
            "B" | "u8" | "uint8" => Ok(ElementTag::U8),
            "H" | "u16" | "uint16" => Ok(ElementTag::U16),
            "I" | "u32" | "uint32" => Ok(ElementTag::U32),
            "L" | "Q" | "u64" | "uint64" => Ok(ElementTag::U64),
            "f" | "f32" | "float32" => Ok(ElementTag::F32),
            "d" | "f64" | "float64" => Ok(ElementTag::F64),
            _ => Err(IngestError::UnsupportedElementType(format.to_string())),
        }
    }

    /// The canonical buffer-protocol code for this encoding.
    pub fn code(self) -> &'static str {
        match self {
            ElementTag::I8 => "b",
            ElementTag::I16 => "h",
            ElementTag::I32 => "i",
            ElementTag::I64 => "q",
            ElementTag::U8 => "B",
            ElementTag::U16 => "H",
            ElementTag::U32 => "I",
            ElementTag::U64 => "Q",
            ElementTag::F32 => "f",
            ElementTag::F64 => "d",
        }
    }

    /// Width of one value of this encoding, in bytes.
    pub fn byte_size(self) -> usize {
        match self {
            ElementTag::I8 | ElementTag::U8 => 1,
            ElementTag::I16 | ElementTag::U16 => 2,
            ElementTag::I32 | ElementTag::U32 | ElementTag::F32 => 4,
            ElementTag::I64 | ElementTag::U64 | ElementTag::F64 => 8,
        }
    }

    pub fn category(self) -> NumericCategory {
        match self {
            ElementTag::F32 | ElementTag::F64 => NumericCategory::Float,
            ElementTag::I8 | ElementTag::I16
            | ElementTag::I32 | ElementTag::I64 => NumericCategory::SignedInteger,
            ElementTag::U8 | ElementTag::U16
            | ElementTag::U32 | ElementTag::U64 => NumericCategory::UnsignedInteger,
        }
    }
}

/// Maps a format tag straight to its `NumericCategory`.
///
/// ## Errors
///
/// * `IngestError::UnsupportedElementType` - if the tag is not recognized
pub fn classify(format : &str) -> Result<NumericCategory, IngestError> {
    ElementTag::parse(format).map(ElementTag::category)
}
