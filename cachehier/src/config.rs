use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::ConfigError;

/// A two level cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    pub block_size: u64,
    pub l1: LevelConfig,
    /// An L2 of size 0 is the same as no L2
    #[serde(default)]
    pub l2: Option<LevelConfig>,
    #[serde(default = "ReplacementPolicyConfig::default")]
    pub replacement_policy: ReplacementPolicyConfig,
    #[serde(default = "InclusionPolicy::default")]
    pub inclusion_property: InclusionPolicy,
}

/// Size and associativity of a single level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub size: u64,
    pub associativity: u64,
}

/// Validated shape of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelGeometry {
    pub size: u64,
    pub block_size: u64,
    pub associativity: u64,
    pub num_sets: u64,
}

/// Validated shape of the whole hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyGeometry {
    pub l1: LevelGeometry,
    pub l2: Option<LevelGeometry>,
}

/// The replacement policy used by every level - lru, fifo, or optimal. Defaults to lru.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacementPolicyConfig {
    #[serde(rename = "LRU", alias = "lru")]
    LeastRecentlyUsed,
    #[serde(rename = "FIFO", alias = "fifo")]
    FirstInFirstOut,
    #[serde(rename = "OPTIMAL", alias = "optimal")]
    Optimal,
}

impl Default for ReplacementPolicyConfig {
    fn default() -> Self {
        ReplacementPolicyConfig::LeastRecentlyUsed
    }
}

/// How blocks in L1 relate to blocks in L2. Defaults to non-inclusive.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InclusionPolicy {
    #[serde(rename = "non-inclusive", alias = "non_inclusive")]
    NonInclusive,
    #[serde(rename = "inclusive")]
    Inclusive,
    #[serde(rename = "exclusive")]
    Exclusive,
}

impl Default for InclusionPolicy {
    fn default() -> Self {
        InclusionPolicy::NonInclusive
    }
}

fn normalise(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace('_', "-")
}

impl FromStr for ReplacementPolicyConfig {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalise(value).as_str() {
            "lru" => Ok(Self::LeastRecentlyUsed),
            "fifo" => Ok(Self::FirstInFirstOut),
            "optimal" | "opt" => Ok(Self::Optimal),
            _ => Err(ConfigError::UnknownPolicy {
                kind: "replacement policy",
                value: value.to_string(),
            }),
        }
    }
}

impl FromStr for InclusionPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalise(value).as_str() {
            "non-inclusive" | "noninclusive" => Ok(Self::NonInclusive),
            "inclusive" => Ok(Self::Inclusive),
            "exclusive" => Ok(Self::Exclusive),
            _ => Err(ConfigError::UnknownPolicy {
                kind: "inclusion property",
                value: value.to_string(),
            }),
        }
    }
}

impl fmt::Display for ReplacementPolicyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementPolicyConfig::LeastRecentlyUsed => write!(f, "LRU"),
            ReplacementPolicyConfig::FirstInFirstOut => write!(f, "FIFO"),
            ReplacementPolicyConfig::Optimal => write!(f, "Optimal"),
        }
    }
}

impl fmt::Display for InclusionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InclusionPolicy::NonInclusive => write!(f, "Non-inclusive"),
            InclusionPolicy::Inclusive => write!(f, "Inclusive"),
            InclusionPolicy::Exclusive => write!(f, "Exclusive"),
        }
    }
}

impl LevelConfig {
    pub fn new(size: u64, associativity: u64) -> Self {
        Self { size, associativity }
    }

    /// Checks the level against the block size and derives its set count
    ///
    /// The size must be exactly `num_sets * associativity * block_size`
    pub fn geometry(&self, name: &str, block_size: u64) -> Result<LevelGeometry, ConfigError> {
        if self.size == 0 {
            return Err(ConfigError::InvalidConfiguration(format!("{name} size must be positive")));
        }
        if self.associativity == 0 {
            return Err(ConfigError::InvalidConfiguration(format!(
                "{name} associativity must be positive"
            )));
        }
        let set_bytes = self.associativity.checked_mul(block_size).ok_or_else(|| {
            ConfigError::InvalidConfiguration(format!("{name} associativity * block size overflows"))
        })?;
        if self.size % set_bytes != 0 {
            return Err(ConfigError::InvalidConfiguration(format!(
                "{name} size {} is not a multiple of associativity ({}) * block size ({block_size})",
                self.size, self.associativity
            )));
        }
        let num_sets = self.size / set_bytes;
        if num_sets == 0 {
            return Err(ConfigError::InvalidConfiguration(format!(
                "{name} size {} holds no complete set",
                self.size
            )));
        }
        Ok(LevelGeometry {
            size: self.size,
            block_size,
            associativity: self.associativity,
            num_sets,
        })
    }
}

impl HierarchyConfig {
    pub fn new(
        block_size: u64,
        l1: LevelConfig,
        l2: Option<LevelConfig>,
        replacement_policy: ReplacementPolicyConfig,
        inclusion_property: InclusionPolicy,
    ) -> Self {
        Self {
            block_size,
            l1,
            l2: l2.filter(|l2| l2.size > 0),
            replacement_policy,
            inclusion_property,
        }
    }

    /// The L2 configuration, if the hierarchy has a second level
    pub fn l2(&self) -> Option<&LevelConfig> {
        self.l2.as_ref().filter(|l2| l2.size > 0)
    }

    /// Validates every parameter, failing on the first bad one
    pub fn validate(&self) -> Result<HierarchyGeometry, ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::InvalidConfiguration("block size must be positive".to_string()));
        }
        let l1 = self.l1.geometry("L1", self.block_size)?;
        let l2 = self
            .l2()
            .map(|l2| l2.geometry("L2", self.block_size))
            .transpose()?;
        Ok(HierarchyGeometry { l1, l2 })
    }
}
