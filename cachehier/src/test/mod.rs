mod io;
mod simulator;

use crate::cache::Cache;
use crate::config::LevelGeometry;
use crate::replacement_policies::ReplacementPolicy;

/// A level with one byte blocks, so block addresses are the raw addresses
fn level<R: ReplacementPolicy>(num_sets: u64, associativity: u64, policy: R) -> Cache<R> {
    let geometry = LevelGeometry {
        size: num_sets * associativity,
        block_size: 1,
        associativity,
        num_sets,
    };
    Cache::new(geometry, policy)
}
