/// Shifts a raw byte address down to the block it falls in
///
/// This happens once per reference, before either level decodes the address
pub fn block_address(raw_address: u64, block_size: u64) -> u64 {
    raw_address / block_size
}

/// Converts a block address into a set index and a tag for a level with `num_sets` sets
///
/// Each level decodes with its own set count, so the same block usually lands in different
/// sets (with different tags) in L1 and L2
///
/// # Examples
///
/// ```
/// use cachehier::address::decode;
/// assert_eq!(decode(0x40, 32), (0, 2));
/// assert_eq!(decode(0x41, 32), (1, 2));
/// ```
#[inline]
pub fn decode(block_address: u64, num_sets: u64) -> (u64, u64) {
    (block_address % num_sets, block_address / num_sets)
}

/// Inverse of [`decode`]
#[inline]
pub fn encode(set_index: u64, tag: u64, num_sets: u64) -> u64 {
    tag * num_sets + set_index
}
