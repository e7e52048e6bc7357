use crate::cache::{CacheTrait, GenericCache};
use crate::config::InclusionPolicy;
use crate::set::Line;
use crate::trace::Operation;

/// Where a block lives before a reference is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Residency {
    InBoth,
    OnlyL1,
    OnlyL2,
    InNeither,
}

impl Residency {
    fn classify(in_l1: bool, in_l2: bool) -> Self {
        match (in_l1, in_l2) {
            (true, true) => Residency::InBoth,
            (true, false) => Residency::OnlyL1,
            (false, true) => Residency::OnlyL2,
            (false, false) => Residency::InNeither,
        }
    }
}

/// An L1 with an optional L2 behind it, kept consistent with an inclusion policy
///
/// Every reference is applied to both levels completely (including back-invalidation) before
/// the next one starts, and both levels' lookahead positions move on exactly once per reference
pub struct OverallCache {
    l1: GenericCache,
    l2: Option<GenericCache>,
    inclusion: InclusionPolicy,
}

impl OverallCache {
    pub fn new(l1: GenericCache, l2: Option<GenericCache>, inclusion: InclusionPolicy) -> Self {
        Self { l1, l2, inclusion }
    }

    pub fn l1(&self) -> &GenericCache {
        &self.l1
    }

    pub fn l2(&self) -> Option<&GenericCache> {
        self.l2.as_ref()
    }

    pub fn inclusion(&self) -> InclusionPolicy {
        self.inclusion
    }

    /// Where the block currently lives. Without an L2 a block is never in L2
    pub fn residency(&self, block_address: u64) -> Residency {
        let in_l2 = self
            .l2
            .as_ref()
            .map_or(false, |l2| l2.contains(block_address));
        Residency::classify(self.l1.contains(block_address), in_l2)
    }

    /// Applies one reference to the hierarchy
    ///
    /// # Arguments
    ///
    /// * `op`: Read or write
    /// * `block_address`: The address already divided by the block size
    pub fn process(&mut self, op: Operation, block_address: u64) {
        match self.l2.as_mut() {
            None => {
                self.l1.perform_operation(op, block_address);
            }
            Some(l2) => {
                let in_l1 = self.l1.contains(block_address);
                let residency = Residency::classify(in_l1, l2.contains(block_address));
                log::trace!(
                    "{op} {block_address:#x}: {residency:?} ({:?})",
                    self.inclusion
                );
                match self.inclusion {
                    InclusionPolicy::NonInclusive => {
                        execute_non_inclusive(&mut self.l1, l2, op, block_address, residency)
                    }
                    InclusionPolicy::Inclusive => {
                        execute_inclusive(&mut self.l1, l2, op, block_address, residency)
                    }
                    InclusionPolicy::Exclusive => {
                        execute_exclusive(&mut self.l1, l2, op, block_address, residency)
                    }
                }
                l2.advance();
            }
        }
        self.l1.advance();
    }

    /// Checks that every valid L1 block is also valid in L2
    pub fn is_inclusive(&self) -> bool {
        match &self.l2 {
            None => true,
            Some(l2) => self
                .l1
                .resident_lines()
                .iter()
                .all(|line| l2.contains(line.address)),
        }
    }

    /// Checks that no block is valid in both levels
    pub fn is_exclusive(&self) -> bool {
        match &self.l2 {
            None => true,
            Some(l2) => self
                .l1
                .resident_lines()
                .iter()
                .all(|line| !l2.contains(line.address)),
        }
    }
}

/// A valid block leaving L1 always lands in L2, whatever its dirty state
fn fold_into_l2(l2: &mut GenericCache, evicted: Option<Line>) {
    if let Some(line) = evicted.filter(|line| line.valid) {
        log::trace!("L1 victim {:#x} (dirty: {}) written to L2", line.address, line.dirty);
        l2.write_back(line);
    }
}

fn execute_non_inclusive(
    l1: &mut GenericCache,
    l2: &mut GenericCache,
    op: Operation,
    block_address: u64,
    residency: Residency,
) {
    match residency {
        Residency::InBoth => {
            l1.perform_operation(op, block_address);
            l2.perform_operation(op, block_address);
        }
        Residency::OnlyL1 => {
            let evicted = l1.perform_operation(op, block_address);
            fold_into_l2(l2, evicted);
        }
        Residency::OnlyL2 => {
            l2.perform_operation(op, block_address);
            let evicted = l1.perform_operation(op, block_address);
            fold_into_l2(l2, evicted);
        }
        Residency::InNeither => {
            let evicted = l1.perform_operation(op, block_address);
            l2.perform_operation(op, block_address);
            fold_into_l2(l2, evicted);
        }
    }
}

fn execute_inclusive(
    l1: &mut GenericCache,
    l2: &mut GenericCache,
    op: Operation,
    block_address: u64,
    residency: Residency,
) {
    let l2_victim = match residency {
        // OnlyL1 cannot happen while the hierarchy is inclusive, filling L2 restores it
        Residency::InBoth | Residency::InNeither | Residency::OnlyL1 => {
            l1.perform_operation(op, block_address);
            l2.perform_operation(op, block_address)
        }
        Residency::OnlyL2 => {
            let l2_victim = l2.perform_operation(op, block_address);
            l1.perform_operation(op, block_address);
            // Serviced from L2, not from memory
            if op == Operation::Read {
                l1.revert_read();
            }
            l2_victim
        }
    };

    // Back-invalidate whatever L2 no longer holds
    if let Some(victim) = l2_victim.filter(|line| line.valid) {
        if l1.invalidate(victim.address).is_some() {
            log::trace!("back-invalidated L2 victim {:#x} in L1", victim.address);
        }
    }
    if l1.contains(block_address) && !l2.contains(block_address) {
        l1.invalidate(block_address);
        log::trace!("back-invalidated {block_address:#x} in L1");
    }
}

fn execute_exclusive(
    l1: &mut GenericCache,
    l2: &mut GenericCache,
    op: Operation,
    block_address: u64,
    residency: Residency,
) {
    match residency {
        Residency::OnlyL1 => {
            l1.perform_operation(op, block_address);
        }
        Residency::OnlyL2 => {
            l2.probe(op, block_address);
            let moved = l2.extract(block_address);
            let evicted = l1.perform_operation(op, block_address);
            if moved.map_or(false, |line| line.dirty) {
                l1.mark_dirty(block_address);
            }
            fold_into_l2(l2, evicted);
        }
        Residency::InNeither => {
            l2.probe(op, block_address);
            let evicted = l1.perform_operation(op, block_address);
            fold_into_l2(l2, evicted);
        }
        Residency::InBoth => {
            l1.perform_operation(op, block_address);
            if let Some(line) = l2.extract(block_address) {
                if line.dirty {
                    l1.mark_dirty(block_address);
                }
            }
        }
    }
}
