/// A single cache line
///
/// `address` is the full block address the line was filled from. It is never compared during a
/// hit test, it is only kept so the optimal policy can look the block up in the trace, and so an
/// evicted line can be re-decoded for another level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub tag: u64,
    pub valid: bool,
    pub dirty: bool,
    pub address: u64,
}

impl Line {
    pub fn new(tag: u64, address: u64, dirty: bool) -> Self {
        Self {
            tag,
            valid: true,
            dirty,
            address,
        }
    }
}

/// Where a freshly filled line goes when it replaces a victim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The most recent position of the set
    Front,
    /// The position the victim held
    InPlace,
}

#[derive(Debug, Clone)]
struct Slot {
    line: Line,
    rank: u64,
}

/// A fixed capacity set of lines
///
/// Lines never move once they have a slot. Their order (front = most recently used or inserted,
/// back = next victim for LRU/FIFO) is kept as a logical rank per slot, taken from a clock that
/// ticks every time a line is placed at the front. This avoids shuffling lines around on every
/// hit, finding the back of the set is a scan over at most `associativity` ranks
///
/// Dead entries keep their slot and their place in the order until a policy picks them as a
/// victim
#[derive(Debug, Clone)]
pub struct Set {
    slots: Vec<Slot>,
    capacity: usize,
    clock: u64,
}

impl Set {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
            clock: 0,
        }
    }

    /// True iff a valid line in this set has the tag. Dead entries never match
    pub fn contains(&self, tag: u64) -> bool {
        self.find(tag).is_some()
    }

    /// Slot index of the valid line holding `tag`
    pub fn find(&self, tag: u64) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.line.valid && slot.line.tag == tag)
    }

    /// Number of occupied slots, dead entries included
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    pub fn valid_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.line.valid).count()
    }

    pub fn line(&self, way: usize) -> &Line {
        &self.slots[way].line
    }

    pub fn line_mut(&mut self, way: usize) -> &mut Line {
        &mut self.slots[way].line
    }

    /// Moves a line to the front of the set
    pub fn promote(&mut self, way: usize) {
        self.slots[way].rank = self.tick();
    }

    /// Position of a slot in the set order, higher is nearer the front. Ranks are unique
    pub fn rank(&self, way: usize) -> u64 {
        self.slots[way].rank
    }

    /// Lines ordered from the front of the set to the back, dead entries included
    ///
    /// Sorts a copy of the slot order, only meant for dumps and checks
    pub fn lines(&self) -> impl Iterator<Item = &Line> + '_ {
        let mut ways: Vec<usize> = (0..self.slots.len()).collect();
        ways.sort_unstable_by(|a, b| self.slots[*b].rank.cmp(&self.slots[*a].rank));
        ways.into_iter().map(move |way| &self.slots[way].line)
    }

    /// The slot at the back of the set, i.e. the oldest rank
    pub fn back(&self) -> Option<usize> {
        let mut index = 0;
        let mut min_rank = u64::MAX;
        let mut min_index = None;
        // Manual scan, this runs for every LRU/FIFO eviction
        while index < self.slots.len() {
            if self.slots[index].rank < min_rank {
                min_rank = self.slots[index].rank;
                min_index = Some(index);
            }
            index += 1;
        }
        min_index
    }

    /// Inserts a line at the front. The set must not be full
    pub fn push_front(&mut self, line: Line) {
        debug_assert!(!self.is_full());
        let rank = self.tick();
        self.slots.push(Slot { line, rank });
    }

    /// Replaces the line in `way`, returning the old line
    pub fn replace(&mut self, way: usize, line: Line, placement: Placement) -> Line {
        let rank = match placement {
            Placement::Front => self.tick(),
            Placement::InPlace => self.slots[way].rank,
        };
        std::mem::replace(&mut self.slots[way], Slot { line, rank }).line
    }

    /// Clears the valid flag of the line holding `tag`, leaving a dead entry in its slot
    ///
    /// Returns a copy of the line as it was before invalidation
    pub fn invalidate(&mut self, tag: u64) -> Option<Line> {
        let way = self.find(tag)?;
        let line = self.slots[way].line;
        self.slots[way].line.valid = false;
        Some(line)
    }

    /// Like [`Set::invalidate`], but the dead entry also gives up its dirty bit, as its data now
    /// lives elsewhere
    pub fn extract(&mut self, tag: u64) -> Option<Line> {
        let way = self.find(tag)?;
        let line = self.slots[way].line;
        self.slots[way].line.valid = false;
        self.slots[way].line.dirty = false;
        Some(line)
    }

    fn tick(&mut self) -> u64 {
        let rank = self.clock;
        self.clock += 1;
        rank
    }
}
