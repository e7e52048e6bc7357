//! # CacheHier
//!
//! CacheHier is a library for trace driven simulation of a two level cache hierarchy
//!
//! It provides set associative cache levels parameterised by a replacement policy (LRU, FIFO, or
//! Belady's optimal algorithm), a coordinator keeping an L1 and an optional L2 consistent under a
//! non-inclusive, inclusive, or exclusive policy, and a simulator to run a trace through them
//!
//! It is built for architecture analysis, so it counts reads, writes, misses and writebacks, and
//! does not model timing

/// Splitting block addresses into set indices and tags
pub mod address;

/// Contains the implementation of a cache level, and a utility enum for the existing level types
pub mod cache;

/// Contains definitions for the configuration, and its validation
pub mod config;

pub mod error;

/// Keeps L1 and L2 consistent under an inclusion policy
pub mod hierarchy;

/// Reading and parsing trace files
pub mod io;

/// Contains the provided replacement policies, with a trait for implementing custom replacement
/// policies
pub mod replacement_policies;

/// Text output for results
pub mod report;

/// Lines and sets
pub mod set;

/// Contains the simulator used to run a trace against a given hierarchy configuration
pub mod simulator;

/// Operations, references and the lookahead stream
pub mod trace;

#[cfg(test)]
mod test;

/// Contains utilities for running tests and benchmarks.
pub mod util;
