//! Pure half-open interval arithmetic between address space and buffer indices.

use std::ops::Range;

/// Returns the end of the half-open unit interval covered by `byte_len` raw
/// bytes starting at `address`.
///
/// Integer division drops any trailing partial unit. The result saturates at
/// `u64::MAX` instead of wrapping.
#[must_use]
pub const fn unit_end(address: u64, byte_len: usize, bytes_per_unit: usize) -> u64 {
    address.saturating_add((byte_len / bytes_per_unit) as u64)
}

/// Intersects two half-open unit intervals.
///
/// Returns `None` when the intersection holds less than one unit.
#[must_use]
pub fn overlap(a: &Range<u64>, b: &Range<u64>) -> Option<Range<u64>> {
    let start = a.start.max(b.start);
    let end = a.end.min(b.end);
    (end > start).then_some(start..end)
}

/// Translates a unit interval into a raw-buffer index range for a buffer
/// anchored at `origin`.
///
/// Returns `None` if `units` starts before `origin` or the translated range
/// does not fit in `usize`.
#[must_use]
pub fn buffer_span(
    units: &Range<u64>,
    origin: u64,
    bytes_per_unit: usize,
) -> Option<Range<usize>> {
    let offset = usize::try_from(units.start.checked_sub(origin)?).ok()?;
    let len = usize::try_from(units.end - units.start).ok()?;
    let start = offset.checked_mul(bytes_per_unit)?;
    let end = start.checked_add(len.checked_mul(bytes_per_unit)?)?;
    Some(start..end)
}
