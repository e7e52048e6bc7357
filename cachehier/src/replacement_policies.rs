use std::rc::Rc;
use crate::set::{Placement, Set};
use crate::trace::{Operation, ReferenceStream};

/// A generic trait for implementing new replacement policies. Can be used to parameterise a Cache.
///
/// Policies carry no per-line state of their own, the order of a set lives in the set itself.
/// A policy only decides how hits reorder a set, which line leaves a full set, and where the
/// incoming line is placed
pub trait ReplacementPolicy {
    /// Updates the set order when a line is hit
    ///
    /// Not applicable for some policies, a default which does nothing is provided
    ///
    /// # Arguments
    ///
    /// * `set`: The set containing the hit line
    /// * `way`: The slot of the hit line
    /// * `op`: Whether the hit was a read or a write
    fn update_on_hit(&mut self, _set: &mut Set, _way: usize, _op: Operation) {}

    /// Chooses the slot to evict from a full set
    ///
    /// # Arguments
    ///
    /// * `set`: The full set, which is guaranteed to be non-empty
    /// * `position`: Index of the reference currently being processed
    ///
    /// returns: usize, the slot of the victim
    fn select_victim(&self, set: &Set, position: usize) -> usize;

    /// Where the incoming line goes once the victim is removed
    fn placement(&self) -> Placement {
        Placement::Front
    }
}

/// Least Recently Used replacement policy
///
/// Every hit, read or write, moves the line to the front; the victim is the back of the set
#[derive(Debug, Default)]
pub struct LeastRecentlyUsed;

impl ReplacementPolicy for LeastRecentlyUsed {
    fn update_on_hit(&mut self, set: &mut Set, way: usize, _op: Operation) {
        set.promote(way);
    }

    fn select_victim(&self, set: &Set, _position: usize) -> usize {
        set.back().unwrap_or(0)
    }
}

/// First In First Out replacement policy. Hits never reorder the set
#[derive(Debug, Default)]
pub struct FirstInFirstOut;

impl ReplacementPolicy for FirstInFirstOut {
    fn select_victim(&self, set: &Set, _position: usize) -> usize {
        set.back().unwrap_or(0)
    }
}

/// Belady's optimal (MIN) replacement policy
///
/// Evicts the line whose block is next referenced furthest in the future. A block that is never
/// referenced again beats everything, and the first such line found walking the set from the
/// front wins. Among lines that are referenced again, the first one found with the strictly
/// furthest next use wins
///
/// The new line takes the victim's slot, so the set order is otherwise only changed by read
/// hits, which move the line to the front. Write hits leave the order alone. The order matters
/// only for tie breaking, but it must be kept exactly to reproduce reference results
#[derive(Debug, Clone)]
pub struct Optimal {
    stream: Rc<ReferenceStream>,
}

impl Optimal {
    pub fn new(stream: Rc<ReferenceStream>) -> Self {
        Self { stream }
    }
}

impl ReplacementPolicy for Optimal {
    fn update_on_hit(&mut self, set: &mut Set, way: usize, op: Operation) {
        if op == Operation::Read {
            set.promote(way);
        }
    }

    fn select_victim(&self, set: &Set, position: usize) -> usize {
        // "First found walking from the front" is the highest rank, so one pass over the slots in
        // storage order is enough
        let mut never_again: Option<(usize, u64)> = None;
        let mut furthest: Option<(usize, usize, u64)> = None;
        for way in 0..set.len() {
            let rank = set.rank(way);
            match self.stream.next_occurrence(set.line(way).address, position) {
                None => {
                    if never_again.map_or(true, |(_, best)| rank > best) {
                        never_again = Some((way, rank));
                    }
                }
                Some(next) => {
                    let better = furthest.map_or(true, |(_, best_next, best_rank)| {
                        next > best_next || (next == best_next && rank > best_rank)
                    });
                    if better {
                        furthest = Some((way, next, rank));
                    }
                }
            }
        }
        never_again
            .map(|(way, _)| way)
            .or(furthest.map(|(way, _, _)| way))
            .or_else(|| set.back())
            .unwrap_or(0)
    }

    fn placement(&self) -> Placement {
        Placement::InPlace
    }
}
