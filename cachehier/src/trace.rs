use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};

/// A memory operation from the trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(alias = "r")]
    Read,
    #[serde(alias = "w")]
    Write,
}

impl Operation {
    /// Maps the one character trace code (`r`/`w`, either case) to an operation
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'r' | 'R' => Some(Operation::Read),
            'w' | 'W' => Some(Operation::Write),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Operation::Read => 'r',
            Operation::Write => 'w',
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One entry of the trace, with the raw (byte) address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub op: Operation,
    pub address: u64,
}

impl Reference {
    pub fn read(address: u64) -> Self {
        Self { op: Operation::Read, address }
    }

    pub fn write(address: u64) -> Self {
        Self { op: Operation::Write, address }
    }
}

/// The full sequence of block addresses a simulation will reference, used for lookahead
///
/// Finding the next use of a block by scanning the rest of the trace costs O(remaining length)
/// per resident line, which is far too slow for real traces. Instead the occurrences of every
/// block are recorded in one forward pass, in increasing order, so the next use at or after any
/// position is a binary search away
#[derive(Debug, Clone, Default)]
pub struct ReferenceStream {
    blocks: Vec<u64>,
    occurrences: HashMap<u64, Vec<usize>>,
}

impl ReferenceStream {
    pub fn new<I: IntoIterator<Item = u64>>(block_addresses: I) -> Self {
        let blocks: Vec<u64> = block_addresses.into_iter().collect();
        let mut occurrences: HashMap<u64, Vec<usize>> = HashMap::new();
        for (index, block) in blocks.iter().enumerate() {
            occurrences.entry(*block).or_default().push(index);
        }
        Self { blocks, occurrences }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The first index at or after `from` that references `block`, or None if the block is never
    /// referenced again
    pub fn next_occurrence(&self, block: u64, from: usize) -> Option<usize> {
        let indices = self.occurrences.get(&block)?;
        let first = indices.partition_point(|index| *index < from);
        indices.get(first).copied()
    }
}
