use subtle::ConstantTimeEq;

/// Timing-safe equality over two byte buffers.
///
/// Buffers of different length are rejected before any content is inspected. Equal
/// length buffers are compared in time independent of the first differing byte.
pub fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    // ---
    if left.len() != right.len() {
        return false;
    }

    left.ct_eq(right).into()
}
