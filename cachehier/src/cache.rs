use serde::{Deserialize, Serialize};
use crate::address::decode;
use crate::config::LevelGeometry;
use crate::replacement_policies::{FirstInFirstOut, LeastRecentlyUsed, Optimal, ReplacementPolicy};
use crate::set::{Line, Set};
use crate::trace::Operation;

/// Access counters for a single cache level
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
pub struct CacheStats {
    pub reads: u64,
    pub writes: u64,
    pub read_misses: u64,
    pub write_misses: u64,
    pub writebacks: u64,
}

impl CacheStats {
    pub fn accesses(&self) -> u64 {
        self.reads + self.writes
    }

    pub fn misses(&self) -> u64 {
        self.read_misses + self.write_misses
    }

    /// Misses over accesses, 0 for a level that was never accessed
    pub fn miss_ratio(&self) -> f64 {
        match self.accesses() {
            0 => 0.0,
            accesses => self.misses() as f64 / accesses as f64,
        }
    }

    fn record(&mut self, op: Operation, hit: bool) {
        match (op, hit) {
            (Operation::Read, true) => self.reads += 1,
            (Operation::Read, false) => {
                self.reads += 1;
                self.read_misses += 1;
            }
            (Operation::Write, true) => self.writes += 1,
            (Operation::Write, false) => {
                self.writes += 1;
                self.write_misses += 1;
            }
        }
    }
}

/// A generic trait for a single cache level
///
/// Technically not required as we're using static dispatch through [`GenericCache`] instead of
/// dyn Cache, but it keeps the coordinator independent of the policy in use
///
/// All addresses taken here are block addresses, i.e. already divided by the block size
pub trait CacheTrait {
    /// Converts a block address into this level's (set, tag)
    fn address_to_set_and_tag(&self, block_address: u64) -> (u64, u64);

    /// True iff the block is held by a valid line
    fn contains(&self, block_address: u64) -> bool;

    /// Executes one read or write end to end: hit test, counters, recency, fill and eviction
    ///
    /// returns: the line pushed out of the set to make room, if any. It may be a dead entry, in
    /// which case its `valid` flag is clear
    fn perform_operation(&mut self, op: Operation, block_address: u64) -> Option<Line>;

    /// Absorbs a line evicted from the level above
    ///
    /// Counted as a write. The line keeps the dirty state it was evicted with; a copy already
    /// held here only ever gains the dirty bit
    fn write_back(&mut self, line: Line) -> Option<Line>;

    /// Counts an access without filling on a miss
    ///
    /// returns: true on a hit
    fn probe(&mut self, op: Operation, block_address: u64) -> bool;

    /// Clears the valid flag of the block, leaving a dead entry behind
    ///
    /// returns: the line as it was before invalidation, if the block was held
    fn invalidate(&mut self, block_address: u64) -> Option<Line>;

    /// Takes the block out of this level for another one to hold
    ///
    /// Leaves a clean dead entry behind, the returned line carries the dirty bit
    fn extract(&mut self, block_address: u64) -> Option<Line>;

    /// Sets the dirty bit of a held block, returns false if the block is not held
    fn mark_dirty(&mut self, block_address: u64) -> bool;

    /// Undoes the read counted for the current reference
    fn revert_read(&mut self);

    /// Moves the lookahead position on to the next reference
    fn advance(&mut self);

    /// Index of the reference currently being processed
    fn position(&self) -> usize;

    fn stats(&self) -> &CacheStats;

    fn sets(&self) -> &[Set];

    fn geometry(&self) -> &LevelGeometry;

    /// Every valid line of the level, set by set, front to back
    fn resident_lines(&self) -> Vec<Line> {
        self.sets()
            .iter()
            .flat_map(|set| set.lines().filter(|line| line.valid).copied().collect::<Vec<_>>())
            .collect()
    }
}

/// A generic cache level, parameterised by a replacement policy
///
/// The policy is monomorphised into the level, so the hit path has no dynamic dispatch. Sets
/// start empty and grow up to the associativity; only a fill into a full set evicts
pub struct Cache<R: ReplacementPolicy> {
    geometry: LevelGeometry,
    sets: Vec<Set>,
    stats: CacheStats,
    replacement_policy: R,
    position: usize,
}

impl<R: ReplacementPolicy> Cache<R> {
    pub fn new(geometry: LevelGeometry, policy: R) -> Self {
        let sets = (0..geometry.num_sets)
            .map(|_| Set::new(geometry.associativity as usize))
            .collect();
        Self {
            geometry,
            sets,
            stats: CacheStats::default(),
            replacement_policy: policy,
            position: 0,
        }
    }

    fn set_index_and_tag(&self, block_address: u64) -> (usize, u64) {
        let (set, tag) = decode(block_address, self.geometry.num_sets);
        (set as usize, tag)
    }

    /// Places a new line in its set, evicting if the set is full
    ///
    /// The policy chooses among every slot, dead entries included. A dead victim that is still
    /// dirty is written back like any other
    fn fill(&mut self, set_index: usize, line: Line) -> Option<Line> {
        let placement = self.replacement_policy.placement();
        let set = &mut self.sets[set_index];
        if !set.is_full() {
            set.push_front(line);
            return None;
        }
        let way = self.replacement_policy.select_victim(set, self.position);
        let victim = set.replace(way, line, placement);
        if victim.dirty {
            self.stats.writebacks += 1;
        }
        log::trace!(
            "set {set_index}: evicted block {:#x} (valid: {}, dirty: {}) for block {:#x}",
            victim.address,
            victim.valid,
            victim.dirty,
            line.address
        );
        Some(victim)
    }
}

impl<R: ReplacementPolicy> CacheTrait for Cache<R> {
    fn address_to_set_and_tag(&self, block_address: u64) -> (u64, u64) {
        decode(block_address, self.geometry.num_sets)
    }

    fn contains(&self, block_address: u64) -> bool {
        let (set, tag) = self.set_index_and_tag(block_address);
        self.sets[set].contains(tag)
    }

    fn perform_operation(&mut self, op: Operation, block_address: u64) -> Option<Line> {
        let (set_index, tag) = self.set_index_and_tag(block_address);
        let set = &mut self.sets[set_index];
        match set.find(tag) {
            Some(way) => {
                self.stats.record(op, true);
                if op == Operation::Write {
                    set.line_mut(way).dirty = true;
                }
                self.replacement_policy.update_on_hit(set, way, op);
                None
            }
            None => {
                self.stats.record(op, false);
                let line = Line::new(tag, block_address, op == Operation::Write);
                self.fill(set_index, line)
            }
        }
    }

    fn write_back(&mut self, line: Line) -> Option<Line> {
        let (set_index, tag) = self.set_index_and_tag(line.address);
        let set = &mut self.sets[set_index];
        match set.find(tag) {
            Some(way) => {
                self.stats.record(Operation::Write, true);
                set.line_mut(way).dirty |= line.dirty;
                self.replacement_policy.update_on_hit(set, way, Operation::Write);
                None
            }
            None => {
                self.stats.record(Operation::Write, false);
                self.fill(set_index, Line::new(tag, line.address, line.dirty))
            }
        }
    }

    fn probe(&mut self, op: Operation, block_address: u64) -> bool {
        let hit = self.contains(block_address);
        self.stats.record(op, hit);
        hit
    }

    fn invalidate(&mut self, block_address: u64) -> Option<Line> {
        let (set, tag) = self.set_index_and_tag(block_address);
        self.sets[set].invalidate(tag)
    }

    fn extract(&mut self, block_address: u64) -> Option<Line> {
        let (set, tag) = self.set_index_and_tag(block_address);
        self.sets[set].extract(tag)
    }

    fn mark_dirty(&mut self, block_address: u64) -> bool {
        let (set_index, tag) = self.set_index_and_tag(block_address);
        let set = &mut self.sets[set_index];
        match set.find(tag) {
            Some(way) => {
                set.line_mut(way).dirty = true;
                true
            }
            None => false,
        }
    }

    fn revert_read(&mut self) {
        self.stats.reads = self.stats.reads.saturating_sub(1);
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn position(&self) -> usize {
        self.position
    }

    fn stats(&self) -> &CacheStats {
        &self.stats
    }

    fn sets(&self) -> &[Set] {
        &self.sets
    }

    fn geometry(&self) -> &LevelGeometry {
        &self.geometry
    }
}

/// Enum for the three kinds of cache level provided by the library
///
/// Using trait objects in Rust reduces boilerplate, but it is surprisingly slow, as this is
/// completely opaque to the compiler. For our use case we would be de-referencing several times
/// per reference, so we explicitly branch on all implementations instead
pub enum GenericCache {
    LeastRecentlyUsed(Cache<LeastRecentlyUsed>),
    FirstInFirstOut(Cache<FirstInFirstOut>),
    Optimal(Cache<Optimal>),
}

impl From<Cache<LeastRecentlyUsed>> for GenericCache {
    fn from(value: Cache<LeastRecentlyUsed>) -> Self {
        Self::LeastRecentlyUsed(value)
    }
}

impl From<Cache<FirstInFirstOut>> for GenericCache {
    fn from(value: Cache<FirstInFirstOut>) -> Self {
        Self::FirstInFirstOut(value)
    }
}

impl From<Cache<Optimal>> for GenericCache {
    fn from(value: Cache<Optimal>) -> Self {
        Self::Optimal(value)
    }
}

macro_rules! dispatch {
    ($self:ident, $c:ident => $call:expr) => {
        match $self {
            GenericCache::LeastRecentlyUsed($c) => $call,
            GenericCache::FirstInFirstOut($c) => $call,
            GenericCache::Optimal($c) => $call,
        }
    };
}

impl CacheTrait for GenericCache {
    fn address_to_set_and_tag(&self, block_address: u64) -> (u64, u64) {
        dispatch!(self, c => c.address_to_set_and_tag(block_address))
    }

    fn contains(&self, block_address: u64) -> bool {
        dispatch!(self, c => c.contains(block_address))
    }

    fn perform_operation(&mut self, op: Operation, block_address: u64) -> Option<Line> {
        dispatch!(self, c => c.perform_operation(op, block_address))
    }

    fn write_back(&mut self, line: Line) -> Option<Line> {
        dispatch!(self, c => c.write_back(line))
    }

    fn probe(&mut self, op: Operation, block_address: u64) -> bool {
        dispatch!(self, c => c.probe(op, block_address))
    }

    fn invalidate(&mut self, block_address: u64) -> Option<Line> {
        dispatch!(self, c => c.invalidate(block_address))
    }

    fn extract(&mut self, block_address: u64) -> Option<Line> {
        dispatch!(self, c => c.extract(block_address))
    }

    fn mark_dirty(&mut self, block_address: u64) -> bool {
        dispatch!(self, c => c.mark_dirty(block_address))
    }

    fn revert_read(&mut self) {
        dispatch!(self, c => c.revert_read())
    }

    fn advance(&mut self) {
        dispatch!(self, c => c.advance())
    }

    fn position(&self) -> usize {
        dispatch!(self, c => c.position())
    }

    fn stats(&self) -> &CacheStats {
        dispatch!(self, c => c.stats())
    }

    fn sets(&self) -> &[Set] {
        dispatch!(self, c => c.sets())
    }

    fn geometry(&self) -> &LevelGeometry {
        dispatch!(self, c => c.geometry())
    }
}
