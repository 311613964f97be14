//! Fixed-length byte ranges anchored in device address space.

/// Overlap and index-translation helpers.
pub mod span;

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use crate::{CacheError, UnitWidth};

/// Value-type identity of a chunk: start address and raw byte length.
///
/// The derived ordering (address first, then length) is the canonical chunk
/// order used by [`crate::Cache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct ChunkKey {
    /// Start offset in addressable units.
    pub address: u64,
    /// Number of raw bytes held.
    pub length: usize,
}

impl ChunkKey {
    /// Creates a chunk identity.
    #[must_use]
    pub const fn new(address: u64, length: usize) -> Self {
        Self { address, length }
    }
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}; {} bytes]", self.address, self.length)
    }
}

impl From<&Chunk> for ChunkKey {
    fn from(chunk: &Chunk) -> Self {
        chunk.key()
    }
}

/// A fixed-length byte buffer anchored at an address.
///
/// Equality, ordering and hashing only consider [`Chunk::key`]; two chunks
/// with the same address and length are the same cache entry regardless of
/// their content.
#[derive(Debug, Clone)]
pub struct Chunk {
    address: u64,
    bytes: Box<[u8]>,
    width: UnitWidth,
}

impl Chunk {
    /// Creates a chunk with 8-bit addressable units.
    #[must_use]
    pub fn new(address: u64, bytes: impl Into<Box<[u8]>>) -> Self {
        Self::with_unit_width(address, bytes, UnitWidth::default())
    }

    /// Creates a chunk whose addresses count units of `width`.
    #[must_use]
    pub fn with_unit_width(address: u64, bytes: impl Into<Box<[u8]>>, width: UnitWidth) -> Self {
        Self {
            address,
            bytes: bytes.into(),
            width,
        }
    }

    /// Start offset in addressable units.
    #[must_use]
    pub const fn address(&self) -> u64 {
        self.address
    }

    /// Number of raw bytes held. Fixed for the lifetime of the chunk.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` for a zero-length chunk, which never overlaps anything.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Current buffer content.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the chunk and returns its buffer.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn into_bytes(self) -> Box<[u8]> {
        self.bytes
    }

    /// Unit width used to map this chunk's bytes onto address space.
    #[must_use]
    pub const fn unit_width(&self) -> UnitWidth {
        self.width
    }

    /// Identity used for ordering, equality and registry lookups.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn key(&self) -> ChunkKey {
        ChunkKey::new(self.address, self.bytes.len())
    }

    /// Half-open interval of addressable units covered by this chunk.
    ///
    /// A length that is not a whole number of units truncates the end bound.
    #[must_use]
    pub fn bounds(&self) -> Range<u64> {
        let end = span::unit_end(
            self.address,
            self.bytes.len(),
            self.width.bytes_per_unit(),
        );
        self.address..end
    }

    /// Replaces the buffer content without changing its length.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::LengthMismatch`] when `new_bytes` differs in
    /// length from the chunk; the buffer is left unchanged.
    pub fn set_bytes(&mut self, new_bytes: &[u8]) -> Result<(), CacheError> {
        if new_bytes.len() != self.bytes.len() {
            return Err(CacheError::LengthMismatch {
                expected: self.bytes.len(),
                actual: new_bytes.len(),
            });
        }
        self.bytes.copy_from_slice(new_bytes);
        Ok(())
    }

    /// Copies the bytes of `other` that overlap this chunk into place.
    ///
    /// Returns `true` when at least one unit overlapped and was copied. Bytes
    /// outside the overlap are untouched and nothing of `other` is retained.
    pub fn update(&mut self, other: &Self) -> bool {
        let Some(units) = span::overlap(&self.bounds(), &other.bounds()) else {
            return false;
        };

        let ratio = self.width.bytes_per_unit();
        let (Some(dst), Some(src)) = (
            span::buffer_span(&units, self.address, ratio),
            span::buffer_span(&units, other.address, ratio),
        ) else {
            return false;
        };
        // Only reachable out of range when the two chunks disagree on unit width.
        let (Some(dst), Some(src)) = (self.bytes.get_mut(dst), other.bytes.get(src)) else {
            return false;
        };

        dst.copy_from_slice(src);
        tracing::debug!(
            chunk = %self.key(),
            units = ?units,
            "chunk updated"
        );
        true
    }
}

impl PartialEq for Chunk {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Chunk {}

impl PartialOrd for Chunk {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Chunk {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl Hash for Chunk {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use rstest::rstest;

    use super::{Chunk, ChunkKey};
    use crate::{CacheError, UnitWidth};

    fn hash_of(chunk: &Chunk) -> u64 {
        let mut hasher = DefaultHasher::new();
        chunk.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn construction_copies_caller_buffer() {
        let mut source = vec![1, 2, 3];
        let chunk = Chunk::new(0x40, source.as_slice());
        source[0] = 0xFF;
        assert_eq!(chunk.bytes(), &[1, 2, 3]);
        assert_eq!(chunk.len(), 3);
        assert_eq!(chunk.address(), 0x40);
        assert_eq!(&*chunk.into_bytes(), &[1, 2, 3]);
    }

    #[rstest]
    #[case::octet(8, 10, 4, 10..14)]
    #[case::word(16, 10, 4, 10..12)]
    #[case::word_truncated(16, 10, 5, 10..12)]
    #[case::long(32, 0, 8, 0..2)]
    #[case::empty(8, 7, 0, 7..7)]
    fn bounds_follow_unit_ratio(
        #[case] bits: u32,
        #[case] address: u64,
        #[case] len: usize,
        #[case] expected: std::ops::Range<u64>,
    ) {
        let width = UnitWidth::new(bits).expect("valid width");
        let chunk = Chunk::with_unit_width(address, vec![0; len], width);
        assert_eq!(chunk.bounds(), expected);
    }

    #[rstest]
    #[case::lower_address((1, 8), (2, 1))]
    #[case::same_address_shorter((4, 2), (4, 3))]
    fn ordering_is_address_then_length(
        #[case] lesser: (u64, usize),
        #[case] greater: (u64, usize),
    ) {
        let a = Chunk::new(lesser.0, vec![0; lesser.1]);
        let b = Chunk::new(greater.0, vec![0; greater.1]);
        assert!(a < b);
        assert!(b > a);
        assert_ne!(a, b);
    }

    #[test]
    fn equality_and_hash_ignore_content() {
        let a = Chunk::new(0x100, [0x00, 0x11]);
        let b = Chunk::new(0x100, [0xAA, 0xBB]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(a.key(), ChunkKey::new(0x100, 2));
    }

    #[test]
    fn set_bytes_replaces_content_in_place() {
        let mut chunk = Chunk::new(0, [0, 0, 0]);
        chunk.set_bytes(&[7, 8, 9]).expect("same length");
        assert_eq!(chunk.bytes(), &[7, 8, 9]);
        assert_eq!(chunk.key(), ChunkKey::new(0, 3));
    }

    #[test]
    fn set_bytes_rejects_length_change_and_keeps_buffer() {
        let mut chunk = Chunk::new(0, [1, 2, 3]);
        let error = chunk.set_bytes(&[9, 9]).expect_err("shorter buffer");
        assert!(matches!(
            error,
            CacheError::LengthMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert!(chunk.set_bytes(&[9, 9, 9, 9]).is_err());
        assert_eq!(chunk.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn partial_overlap_copies_only_shared_units() {
        let mut resident = Chunk::new(10, [1, 2, 3, 4]);
        let incoming = Chunk::new(12, [0xA0, 0xA1, 0xA2, 0xA3]);

        assert!(resident.update(&incoming));
        assert_eq!(resident.bytes(), &[1, 2, 0xA0, 0xA1]);
        assert_eq!(incoming.bytes(), &[0xA0, 0xA1, 0xA2, 0xA3]);
    }

    #[test]
    fn leading_overlap_copies_tail_of_update() {
        let mut resident = Chunk::new(12, [1, 2, 3, 4]);
        let incoming = Chunk::new(10, [0xA0, 0xA1, 0xA2, 0xA3]);

        assert!(resident.update(&incoming));
        assert_eq!(resident.bytes(), &[0xA2, 0xA3, 3, 4]);
    }

    #[test]
    fn contained_chunk_takes_matching_slice_of_larger_update() {
        let mut resident = Chunk::new(4, [0; 2]);
        let incoming = Chunk::new(0, [0, 1, 2, 3, 4, 5, 6, 7]);

        assert!(resident.update(&incoming));
        assert_eq!(resident.bytes(), &[4, 5]);
    }

    #[test]
    fn smaller_update_inside_resident_leaves_surroundings() {
        let mut resident = Chunk::new(0, [0; 6]);
        let incoming = Chunk::new(2, [9, 9]);

        assert!(resident.update(&incoming));
        assert_eq!(resident.bytes(), &[0, 0, 9, 9, 0, 0]);
    }

    #[rstest]
    #[case::disjoint(0, 10)]
    #[case::adjacent_after(0, 4)]
    #[case::adjacent_before(4, 0)]
    fn non_overlapping_update_is_a_no_op(#[case] resident_at: u64, #[case] update_at: u64) {
        let mut resident = Chunk::new(resident_at, [1, 2, 3, 4]);
        let incoming = Chunk::new(update_at, [9, 9, 9, 9]);

        assert!(!resident.update(&incoming));
        assert_eq!(resident.bytes(), &[1, 2, 3, 4]);
    }

    #[test]
    fn wide_units_scale_buffer_offsets() {
        let width = UnitWidth::new(16).expect("valid width");
        // [10, 12) in units, two bytes per unit.
        let mut resident = Chunk::with_unit_width(10, [1, 2, 3, 4], width);
        // [11, 13)
        let incoming = Chunk::with_unit_width(11, [0xB0, 0xB1, 0xB2, 0xB3], width);

        assert!(resident.update(&incoming));
        assert_eq!(resident.bytes(), &[1, 2, 0xB0, 0xB1]);
    }

    #[test]
    fn truncated_tail_byte_is_never_merged() {
        let width = UnitWidth::new(16).expect("valid width");
        // Three bytes cover one whole unit: [0, 1).
        let mut resident = Chunk::with_unit_width(0, [1, 2, 3], width);
        let incoming = Chunk::with_unit_width(0, [7, 7, 7, 7], width);

        assert!(resident.update(&incoming));
        assert_eq!(resident.bytes(), &[7, 7, 3]);
    }

    #[test]
    fn mismatched_widths_never_index_out_of_range() {
        let wide = UnitWidth::new(32).expect("valid width");
        let mut resident = Chunk::with_unit_width(0, [0; 8], wide);
        let incoming = Chunk::new(0, [5; 2]);

        assert!(!resident.update(&incoming));
        assert_eq!(resident.bytes(), &[0; 8]);
    }

    #[test]
    fn empty_chunk_never_updates() {
        let mut resident = Chunk::new(3, Vec::new());
        assert!(resident.is_empty());
        assert!(!resident.update(&Chunk::new(0, [1; 8])));
    }
}
