use std::fmt;
use crate::config::HierarchyConfig;
use crate::simulator::{HierarchyResult, LevelResult};

/// Banner describing the simulated configuration
pub struct ConfigurationReport<'a> {
    pub config: &'a HierarchyConfig,
    pub trace_file: &'a str,
}

impl fmt::Display for ConfigurationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (l2_size, l2_associativity) = self
            .config
            .l2()
            .map_or((0, 0), |l2| (l2.size, l2.associativity));
        writeln!(f, "===== Simulator configuration =====")?;
        writeln!(f, "BLOCKSIZE:\t\t{}", self.config.block_size)?;
        writeln!(f, "L1_SIZE:\t\t{}", self.config.l1.size)?;
        writeln!(f, "L1_ASSOC:\t\t{}", self.config.l1.associativity)?;
        writeln!(f, "L2_SIZE:\t\t{l2_size}")?;
        writeln!(f, "L2_ASSOC:\t\t{l2_associativity}")?;
        writeln!(f, "REPLACEMENT POLICY:\t{}", self.config.replacement_policy)?;
        writeln!(f, "INCLUSION PROPERTY:\t{}", self.config.inclusion_property)?;
        writeln!(f, "trace_file:\t\t{}", self.trace_file)?;
        writeln!(f, "----------------------------------------")
    }
}

impl fmt::Display for LevelResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.name)?;
        writeln!(f, "Miss Ratio: {:.6}", self.miss_ratio)?;
        writeln!(f, "Writes: {}", self.stats.writes)?;
        writeln!(f, "Reads: {}", self.stats.reads)?;
        writeln!(f, "Write Misses: {}", self.stats.write_misses)?;
        writeln!(f, "Read Misses: {}", self.stats.read_misses)?;
        writeln!(f, "Writebacks: {}", self.stats.writebacks)?;
        writeln!(f, "======== Contents =======")?;
        for set in &self.contents {
            write!(f, "Set {}    ", set.set)?;
            for line in &set.lines {
                write!(f, "{:x} {}", line.tag, if line.dirty { "D  " } else { "   " })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for HierarchyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, level) in self.levels.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{level}")?;
        }
        Ok(())
    }
}
