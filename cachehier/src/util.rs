use crate::trace::Reference;

/// Generates a deterministic pseudo random trace for tests and benchmarks
///
/// Addresses are drawn from a working set of `working_set` blocks of `block_size` bytes, with a
/// bias towards a small hot region so that every policy sees a mix of hits and misses. Roughly
/// one reference in three is a write
pub fn synthetic_trace(length: usize, working_set: u64, block_size: u64, seed: u64) -> Vec<Reference> {
    let working_set = working_set.max(1);
    let hot_set = (working_set / 8).max(1);
    let mut state = seed;
    let mut next = move || {
        // 64 bit LCG (Knuth's MMIX constants), upper bits are the usable ones
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        state >> 33
    };
    (0..length)
        .map(|_| {
            let block = if next() % 4 == 0 {
                next() % working_set
            } else {
                next() % hot_set
            };
            let offset = next() % block_size.max(1);
            let address = block * block_size + offset;
            if next() % 3 == 0 {
                Reference::write(address)
            } else {
                Reference::read(address)
            }
        })
        .collect()
}
