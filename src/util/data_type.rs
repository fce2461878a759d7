//! ScalarType - on-disk width and byte order of scalar values.

use std::fmt;
use std::io::{self, Read, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};

/// Encoding of every value in a track scalar body.
///
/// Chosen once when the file is created and recorded in the header's
/// `datatype:` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// 32-bit IEEE 754, little-endian
    Float32LE,
    /// 32-bit IEEE 754, big-endian
    Float32BE,
    /// 64-bit IEEE 754, little-endian
    Float64LE,
    /// 64-bit IEEE 754, big-endian
    Float64BE,
}

impl ScalarType {
    /// 32-bit float in the host byte order.
    #[cfg(target_endian = "little")]
    pub const NATIVE_F32: Self = Self::Float32LE;
    #[cfg(target_endian = "big")]
    pub const NATIVE_F32: Self = Self::Float32BE;

    /// 64-bit float in the host byte order.
    #[cfg(target_endian = "little")]
    pub const NATIVE_F64: Self = Self::Float64LE;
    #[cfg(target_endian = "big")]
    pub const NATIVE_F64: Self = Self::Float64BE;

    /// Size in bytes of one encoded value.
    #[inline]
    pub const fn num_bytes(self) -> usize {
        match self {
            Self::Float32LE | Self::Float32BE => 4,
            Self::Float64LE | Self::Float64BE => 8,
        }
    }

    #[inline]
    pub const fn is_little_endian(self) -> bool {
        matches!(self, Self::Float32LE | Self::Float64LE)
    }

    /// Header name of this type.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Float32LE => "Float32LE",
            Self::Float32BE => "Float32BE",
            Self::Float64LE => "Float64LE",
            Self::Float64BE => "Float64BE",
        }
    }

    /// Parse a header `datatype:` value. Case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "float32le" => Some(Self::Float32LE),
            "float32be" => Some(Self::Float32BE),
            "float64le" => Some(Self::Float64LE),
            "float64be" => Some(Self::Float64BE),
            _ => None,
        }
    }

    /// Encode one value. Values are narrowed to `f32` for 32-bit types.
    pub fn write_value<W: Write>(self, out: &mut W, value: f64) -> io::Result<()> {
        match self {
            Self::Float32LE => out.write_f32::<LittleEndian>(value as f32),
            Self::Float32BE => out.write_f32::<BigEndian>(value as f32),
            Self::Float64LE => out.write_f64::<LittleEndian>(value),
            Self::Float64BE => out.write_f64::<BigEndian>(value),
        }
    }

    /// Encode one value into the first [`num_bytes`](Self::num_bytes) of `dst`.
    ///
    /// Panics if `dst` is shorter than one encoded value.
    #[inline]
    pub fn encode_into(self, dst: &mut [u8], value: f64) {
        match self {
            Self::Float32LE => LittleEndian::write_f32(dst, value as f32),
            Self::Float32BE => BigEndian::write_f32(dst, value as f32),
            Self::Float64LE => LittleEndian::write_f64(dst, value),
            Self::Float64BE => BigEndian::write_f64(dst, value),
        }
    }

    /// Decode one value.
    pub fn read_value<R: Read>(self, input: &mut R) -> io::Result<f64> {
        match self {
            Self::Float32LE => input.read_f32::<LittleEndian>().map(f64::from),
            Self::Float32BE => input.read_f32::<BigEndian>().map(f64::from),
            Self::Float64LE => input.read_f64::<LittleEndian>(),
            Self::Float64BE => input.read_f64::<BigEndian>(),
        }
    }
}

impl Default for ScalarType {
    fn default() -> Self {
        Self::NATIVE_F32
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// In-memory value type of a scalar stream.
///
/// Readers and writers work in `f32` or `f64` independently of the
/// width stored on disk.
pub trait ScalarValue: Copy + PartialEq + fmt::Debug + 'static {
    fn from_f64(v: f64) -> Self;
    fn to_f64(self) -> f64;
}

impl ScalarValue for f32 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }
    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl ScalarValue for f64 {
    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(ScalarType::Float32LE.num_bytes(), 4);
        assert_eq!(ScalarType::Float32BE.num_bytes(), 4);
        assert_eq!(ScalarType::Float64LE.num_bytes(), 8);
        assert_eq!(ScalarType::Float64BE.num_bytes(), 8);
    }

    #[test]
    fn test_names() {
        assert_eq!(ScalarType::from_name("Float64BE"), Some(ScalarType::Float64BE));
        assert_eq!(ScalarType::from_name("float32le"), Some(ScalarType::Float32LE));
        assert_eq!(ScalarType::from_name("Int32LE"), None);
        assert_eq!(ScalarType::Float32BE.to_string(), "Float32BE");
    }

    #[test]
    fn test_byte_order() {
        let mut le = Vec::new();
        ScalarType::Float32LE.write_value(&mut le, 1.0).unwrap();
        assert_eq!(le, 1.0f32.to_le_bytes());

        let mut be = Vec::new();
        ScalarType::Float64BE.write_value(&mut be, -2.5).unwrap();
        assert_eq!(be, (-2.5f64).to_be_bytes());

        let back = ScalarType::Float64BE.read_value(&mut be.as_slice()).unwrap();
        assert_eq!(back, -2.5);

        let mut slot = [0u8; 8];
        ScalarType::Float64BE.encode_into(&mut slot, -2.5);
        assert_eq!(slot.to_vec(), be);
    }

    #[test]
    fn test_sentinels_survive_narrowing() {
        let mut buf = Vec::new();
        ScalarType::Float32BE.write_value(&mut buf, f64::NAN).unwrap();
        ScalarType::Float32BE.write_value(&mut buf, f64::INFINITY).unwrap();
        let mut rd = buf.as_slice();
        assert!(ScalarType::Float32BE.read_value(&mut rd).unwrap().is_nan());
        assert_eq!(ScalarType::Float32BE.read_value(&mut rd).unwrap(), f64::INFINITY);
    }
}
