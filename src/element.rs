//! Fixed-width element encodings.
//!
//! Every array file stores elements of exactly one [`Encoding`]: an ASCII descriptor of at most
//! eight bytes plus the byte width of one element. Both are recorded in the header and checked on
//! every open, so a file written as `i` (little-endian `i32`) can never be read back as `d`.
//!
//! Built-in descriptors follow the usual single-letter struct codes:
//!
//! | type      | descriptor | size |
//! |-----------|------------|------|
//! | `i8`      | `b`        | 1    |
//! | `u8`      | `B`        | 1    |
//! | `bool`    | `?`        | 1    |
//! | `i16`     | `h`        | 2    |
//! | `u16`     | `H`        | 2    |
//! | `i32`     | `i`        | 4    |
//! | `u32`     | `I`        | 4    |
//! | `i64`     | `q`        | 8    |
//! | `u64`     | `Q`        | 8    |
//! | `f32`     | `f`        | 4    |
//! | `f64`     | `d`        | 8    |
//! | `[u8; N]` | `Ns`       | N    |

use std::borrow::Cow;
use std::fmt;

use crate::constants::ENCODING_SLOT_LEN;
use crate::error::{ArrayFileError, Result};

/// Descriptor and byte width of one element, as persisted in the header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Encoding {
    descriptor: String,
    element_size: u32,
}

impl Encoding {
    /// Validate and build an encoding. The descriptor must be non-empty ASCII that fits the
    /// eight-byte header slot; the element size must be non-zero and fit in a `u32`.
    pub fn new(descriptor: impl Into<String>, element_size: usize) -> Result<Self> {
        let descriptor = descriptor.into();
        let invalid = |reason: &'static str| ArrayFileError::InvalidEncoding {
            descriptor: descriptor.clone(),
            reason: reason.into(),
        };
        if descriptor.is_empty() {
            return Err(invalid("descriptor is empty"));
        }
        if !descriptor.is_ascii() {
            return Err(invalid("descriptor must be ASCII"));
        }
        if descriptor.len() > ENCODING_SLOT_LEN {
            return Err(invalid("descriptor longer than 8 bytes"));
        }
        if descriptor.bytes().any(|b| b == 0) {
            return Err(invalid("descriptor contains NUL"));
        }
        if element_size == 0 {
            return Err(invalid("element size must be non-zero"));
        }
        let element_size =
            u32::try_from(element_size).map_err(|_| invalid("element size exceeds u32"))?;
        Ok(Self {
            descriptor,
            element_size,
        })
    }

    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    #[must_use]
    pub fn element_size(&self) -> usize {
        self.element_size as usize
    }

    pub(crate) fn element_size_u32(&self) -> u32 {
        self.element_size
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor)
    }
}

/// A value with a fixed-width little-endian representation.
///
/// `encode` receives a buffer of exactly [`Element::SIZE`] bytes. An implementation that rejects
/// a value must return [`ArrayFileError::Encode`]; the array guarantees a rejected value leaves
/// the stored data untouched.
///
/// ```
/// use std::borrow::Cow;
/// use arrayfile::{Element, Result};
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// struct Point {
///     x: i32,
///     y: i32,
/// }
///
/// impl Element for Point {
///     const SIZE: usize = 8;
///
///     fn descriptor() -> Cow<'static, str> {
///         Cow::Borrowed("2i")
///     }
///
///     fn encode(&self, out: &mut [u8]) -> Result<()> {
///         out[..4].copy_from_slice(&self.x.to_le_bytes());
///         out[4..8].copy_from_slice(&self.y.to_le_bytes());
///         Ok(())
///     }
///
///     fn decode(bytes: &[u8]) -> Self {
///         Point {
///             x: i32::decode(&bytes[..4]),
///             y: i32::decode(&bytes[4..8]),
///         }
///     }
/// }
/// ```
pub trait Element: Sized + PartialEq {
    /// Byte width of one encoded element.
    const SIZE: usize;

    /// ASCII descriptor stored in the header, at most eight bytes.
    fn descriptor() -> Cow<'static, str>;

    fn encode(&self, out: &mut [u8]) -> Result<()>;

    fn decode(bytes: &[u8]) -> Self;

    fn encoding() -> Result<Encoding> {
        Encoding::new(Self::descriptor(), Self::SIZE)
    }
}

fn le_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes[..N]);
    buf
}

macro_rules! impl_le_element {
    ($($ty:ty => $code:literal),* $(,)?) => {
        $(
            impl Element for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn descriptor() -> Cow<'static, str> {
                    Cow::Borrowed($code)
                }

                fn encode(&self, out: &mut [u8]) -> Result<()> {
                    out[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                    Ok(())
                }

                fn decode(bytes: &[u8]) -> Self {
                    <$ty>::from_le_bytes(le_array(bytes))
                }
            }
        )*
    };
}

impl_le_element! {
    i8 => "b",
    u8 => "B",
    i16 => "h",
    u16 => "H",
    i32 => "i",
    u32 => "I",
    i64 => "q",
    u64 => "Q",
    f32 => "f",
    f64 => "d",
}

impl Element for bool {
    const SIZE: usize = 1;

    fn descriptor() -> Cow<'static, str> {
        Cow::Borrowed("?")
    }

    fn encode(&self, out: &mut [u8]) -> Result<()> {
        out[0] = u8::from(*self);
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}

/// Opaque fixed-size byte blocks, e.g. hashes or packed records.
impl<const N: usize> Element for [u8; N] {
    const SIZE: usize = N;

    fn descriptor() -> Cow<'static, str> {
        Cow::Owned(format!("{N}s"))
    }

    fn encode(&self, out: &mut [u8]) -> Result<()> {
        out[..N].copy_from_slice(self);
        Ok(())
    }

    fn decode(bytes: &[u8]) -> Self {
        le_array(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Element + std::fmt::Debug>(value: T) {
        let mut buf = vec![0u8; T::SIZE];
        value.encode(&mut buf).expect("encode");
        assert_eq!(T::decode(&buf), value);
    }

    #[test]
    fn builtin_descriptors_and_sizes() {
        assert_eq!(i32::encoding().unwrap().descriptor(), "i");
        assert_eq!(i32::encoding().unwrap().element_size(), 4);
        assert_eq!(f64::encoding().unwrap().descriptor(), "d");
        assert_eq!(u8::encoding().unwrap().element_size(), 1);
        assert_eq!(bool::encoding().unwrap().descriptor(), "?");
        assert_eq!(<[u8; 16]>::encoding().unwrap().descriptor(), "16s");
    }

    #[test]
    fn values_survive_encoding() {
        roundtrip(-7i8);
        roundtrip(250u8);
        roundtrip(true);
        roundtrip(i16::MIN);
        roundtrip(-123_456i32);
        roundtrip(u64::MAX);
        roundtrip(1.5f32);
        roundtrip(-2.25f64);
        roundtrip(*b"abcd");
    }

    #[test]
    fn encoding_is_little_endian() {
        let mut buf = [0u8; 4];
        0x0102_0304i32.encode(&mut buf).unwrap();
        assert_eq!(buf, [0x04, 0x03, 0x02, 0x01]);
    }

    #[test]
    fn rejects_bad_descriptors() {
        assert!(Encoding::new("", 4).is_err());
        assert!(Encoding::new("toolongxx", 4).is_err());
        assert!(Encoding::new("é", 4).is_err());
        assert!(Encoding::new("i", 0).is_err());
        assert!(<[u8; 0]>::encoding().is_err());
        assert!(Encoding::new("12345678", 4).is_ok());
    }
}
