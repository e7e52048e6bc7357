use std::rc::Rc;
use std::time::{Duration, Instant};
use serde::{Deserialize, Serialize};
use crate::address::block_address;
use crate::cache::{Cache, CacheStats, CacheTrait, GenericCache};
use crate::config::{HierarchyConfig, LevelGeometry, ReplacementPolicyConfig};
use crate::error::ConfigError;
use crate::hierarchy::OverallCache;
use crate::replacement_policies::{FirstInFirstOut, LeastRecentlyUsed, Optimal};
use crate::trace::{Reference, ReferenceStream};

/// The simulator owns a trace and a hierarchy, and feeds the former through the latter
///
/// The trace has to be known up front, as the optimal policy looks ahead into it
pub struct Simulator {
    config: HierarchyConfig,
    hierarchy: OverallCache,
    references: Vec<Reference>,
    processed: usize,
    simulation_time: Duration,
}

/// The result of a simulation. Can be serialised to JSON
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HierarchyResult {
    pub config: HierarchyConfig,
    pub levels: Vec<LevelResult>,
}

/// The result for an individual level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelResult {
    pub name: String,
    pub geometry: LevelGeometry,
    pub miss_ratio: f64,
    #[serde(flatten)]
    pub stats: CacheStats,
    pub contents: Vec<SetContents>,
}

/// Valid lines of one set, front to back
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetContents {
    pub set: u64,
    pub lines: Vec<ResidentLine>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResidentLine {
    pub tag: u64,
    pub dirty: bool,
}

impl LevelResult {
    fn from_cache(name: &str, cache: &GenericCache) -> Self {
        let stats = *cache.stats();
        let contents = cache
            .sets()
            .iter()
            .enumerate()
            .map(|(index, set)| SetContents {
                set: index as u64,
                lines: set
                    .lines()
                    .filter(|line| line.valid)
                    .map(|line| ResidentLine {
                        tag: line.tag,
                        dirty: line.dirty,
                    })
                    .collect(),
            })
            .collect();
        Self {
            name: name.to_string(),
            geometry: *cache.geometry(),
            miss_ratio: stats.miss_ratio(),
            stats,
            contents,
        }
    }
}

impl Simulator {
    /// Creates a new simulator for a given configuration and trace
    ///
    /// # Arguments
    ///
    /// * `config`: A hierarchy configuration, validated here
    /// * `references`: The complete trace, in order
    ///
    /// returns: Result<Simulator, ConfigError>, failing before any reference is processed
    pub fn new(config: &HierarchyConfig, references: Vec<Reference>) -> Result<Self, ConfigError> {
        let geometry = config.validate()?;
        // Only the optimal policy reads the stream, don't index it otherwise
        let stream = match config.replacement_policy {
            ReplacementPolicyConfig::Optimal => Rc::new(ReferenceStream::new(
                references
                    .iter()
                    .map(|reference| block_address(reference.address, config.block_size)),
            )),
            _ => Rc::new(ReferenceStream::default()),
        };
        let l1 = Self::config_to_cache(geometry.l1, config.replacement_policy, &stream);
        let l2 = geometry
            .l2
            .map(|l2| Self::config_to_cache(l2, config.replacement_policy, &stream));
        log::debug!(
            "{} replacement, {} hierarchy, {} references",
            config.replacement_policy,
            config.inclusion_property,
            references.len()
        );
        Ok(Self {
            config: config.clone(),
            hierarchy: OverallCache::new(l1, l2, config.inclusion_property),
            references,
            processed: 0,
            simulation_time: Duration::new(0, 0),
        })
    }

    /// Processes the next reference, if there is one
    pub fn step(&mut self) -> Option<Reference> {
        let reference = *self.references.get(self.processed)?;
        self.hierarchy
            .process(reference.op, block_address(reference.address, self.config.block_size));
        self.processed += 1;
        Some(reference)
    }

    /// Processes every remaining reference and returns the result
    pub fn simulate(&mut self) -> HierarchyResult {
        let start = Instant::now();
        while self.step().is_some() {}
        let end = Instant::now();
        self.simulation_time += end - start;
        self.result()
    }

    /// The result so far
    pub fn result(&self) -> HierarchyResult {
        let mut levels = vec![LevelResult::from_cache("L1", self.hierarchy.l1())];
        if let Some(l2) = self.hierarchy.l2() {
            levels.push(LevelResult::from_cache("L2", l2));
        }
        HierarchyResult {
            config: self.config.clone(),
            levels,
        }
    }

    pub fn hierarchy(&self) -> &OverallCache {
        &self.hierarchy
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Gets the wall-clock execution time for processing
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Creates a cache level from its validated geometry
    fn config_to_cache(
        geometry: LevelGeometry,
        policy: ReplacementPolicyConfig,
        stream: &Rc<ReferenceStream>,
    ) -> GenericCache {
        log::debug!(
            "level of {} bytes: {} sets x {} ways x {} byte blocks",
            geometry.size,
            geometry.num_sets,
            geometry.associativity,
            geometry.block_size
        );
        match policy {
            ReplacementPolicyConfig::LeastRecentlyUsed => {
                GenericCache::from(Cache::new(geometry, LeastRecentlyUsed))
            }
            ReplacementPolicyConfig::FirstInFirstOut => {
                GenericCache::from(Cache::new(geometry, FirstInFirstOut))
            }
            ReplacementPolicyConfig::Optimal => {
                GenericCache::from(Cache::new(geometry, Optimal::new(Rc::clone(stream))))
            }
        }
    }
}
