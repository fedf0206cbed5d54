/// Copy the 4 bytes at `offset`.
///
/// Caller must have checked that `i` holds at least `offset + 4` bytes.
#[inline]
pub(crate) fn array_ref4(i: &[u8], offset: usize) -> [u8; 4] {
    [i[offset], i[offset + 1], i[offset + 2], i[offset + 3]]
}
