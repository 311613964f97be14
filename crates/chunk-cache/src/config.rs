//! Unit-width and cache configuration types.

use crate::CacheError;

/// Conventional width of one addressable unit.
pub const DEFAULT_BITS_PER_BYTE: u32 = 8;

/// Validated number of bits per addressable unit.
///
/// The unit-to-byte ratio is `bits / 8` with integer division, so widths that
/// are not a multiple of eight round down to the nearest whole raw byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct UnitWidth {
    bits: u32,
}

impl UnitWidth {
    /// Eight-bit addressable units (one raw byte per address).
    pub const OCTET: Self = Self {
        bits: DEFAULT_BITS_PER_BYTE,
    };

    /// Validates a bits-per-addressable-unit value.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidBitsPerByte`] when `bits < 8`, which would
    /// make the unit-to-byte ratio zero.
    pub const fn new(bits: u32) -> Result<Self, CacheError> {
        if bits < DEFAULT_BITS_PER_BYTE {
            return Err(CacheError::InvalidBitsPerByte { bits });
        }
        Ok(Self { bits })
    }

    /// Returns the configured bits per addressable unit.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Raw bytes per addressable unit.
    #[must_use]
    pub const fn bytes_per_unit(self) -> usize {
        (self.bits / 8) as usize
    }
}

impl Default for UnitWidth {
    fn default() -> Self {
        Self::OCTET
    }
}

impl TryFrom<u32> for UnitWidth {
    type Error = CacheError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<UnitWidth> for u32 {
    fn from(width: UnitWidth) -> Self {
        width.bits
    }
}

/// Top-level configuration for one cache instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct CacheConfig {
    /// Bits per addressable unit of the target device.
    pub bits_per_byte: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            bits_per_byte: DEFAULT_BITS_PER_BYTE,
        }
    }
}

impl CacheConfig {
    /// Returns the validated unit width described by this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidBitsPerByte`] for widths below 8 bits.
    pub const fn unit_width(&self) -> Result<UnitWidth, CacheError> {
        UnitWidth::new(self.bits_per_byte)
    }
}
