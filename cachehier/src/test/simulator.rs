use std::error::Error;
use crate::cache::{CacheStats, CacheTrait};
use crate::config::{HierarchyConfig, InclusionPolicy, LevelConfig, ReplacementPolicyConfig};
use crate::error::ConfigError;
use crate::simulator::{HierarchyResult, Simulator};
use crate::trace::{Operation, Reference};
use crate::util::synthetic_trace;

const POLICIES: [ReplacementPolicyConfig; 3] = [
    ReplacementPolicyConfig::LeastRecentlyUsed,
    ReplacementPolicyConfig::FirstInFirstOut,
    ReplacementPolicyConfig::Optimal,
];

fn single_level(size: u64, associativity: u64, policy: ReplacementPolicyConfig) -> HierarchyConfig {
    HierarchyConfig::new(16, LevelConfig::new(size, associativity), None, policy, InclusionPolicy::NonInclusive)
}

/// Small levels so the synthetic traces keep both of them under pressure
fn two_level(policy: ReplacementPolicyConfig, inclusion: InclusionPolicy) -> HierarchyConfig {
    HierarchyConfig::new(
        16,
        LevelConfig::new(256, 2),
        Some(LevelConfig::new(512, 4)),
        policy,
        inclusion,
    )
}

#[test]
fn direct_mapped_conflict_writes_back() -> Result<(), Box<dyn Error>> {
    // 64 sets: 0x0 and 0x400 share set 0
    let trace = vec![Reference::write(0x0), Reference::write(0x10), Reference::write(0x400)];
    let mut simulator = Simulator::new(&single_level(1024, 1, ReplacementPolicyConfig::LeastRecentlyUsed), trace)?;
    let result = simulator.simulate();
    assert_eq!(result.levels.len(), 1);
    assert_eq!(
        result.levels[0].stats,
        CacheStats {
            reads: 0,
            writes: 3,
            read_misses: 0,
            write_misses: 3,
            writebacks: 1,
        }
    );
    assert_eq!(result.levels[0].miss_ratio, 1.0);
    Ok(())
}

#[test]
fn two_way_set_holds_both_conflicting_blocks() -> Result<(), Box<dyn Error>> {
    // 32 sets: 0x0, 0x400 and 0x800 all map to set 0
    let trace = vec![Reference::write(0x0), Reference::write(0x10), Reference::write(0x400)];
    let config = single_level(1024, 2, ReplacementPolicyConfig::LeastRecentlyUsed);
    let result = Simulator::new(&config, trace.clone())?.simulate();
    assert_eq!(result.levels[0].stats.write_misses, 3);
    assert_eq!(result.levels[0].stats.writebacks, 0);

    let mut longer = trace;
    longer.push(Reference::write(0x800));
    let result = Simulator::new(&config, longer)?.simulate();
    assert_eq!(result.levels[0].stats.writes, 4);
    assert_eq!(result.levels[0].stats.writebacks, 1);
    // 0x800 and 0x400 are left in set 0, most recent first
    let tags: Vec<u64> = result.levels[0].contents[0].lines.iter().map(|line| line.tag).collect();
    assert_eq!(tags, vec![4, 2]);
    Ok(())
}

#[test]
fn invalid_configuration_fails_before_simulating() {
    let config = single_level(1000, 2, ReplacementPolicyConfig::Optimal);
    assert!(matches!(
        Simulator::new(&config, vec![Reference::read(0)]),
        Err(ConfigError::InvalidConfiguration(_))
    ));
}

#[test]
fn inclusion_holds_after_every_reference() -> Result<(), Box<dyn Error>> {
    let trace = synthetic_trace(3000, 256, 16, 7);
    for policy in POLICIES {
        let mut simulator = Simulator::new(&two_level(policy, InclusionPolicy::Inclusive), trace.clone())?;
        while simulator.step().is_some() {
            assert!(
                simulator.hierarchy().is_inclusive(),
                "{policy} broke inclusion at reference {}",
                simulator.processed()
            );
        }
        assert_eq!(simulator.processed(), trace.len());
    }
    Ok(())
}

#[test]
fn exclusion_holds_after_every_reference() -> Result<(), Box<dyn Error>> {
    let trace = synthetic_trace(3000, 256, 16, 11);
    for policy in POLICIES {
        let mut simulator = Simulator::new(&two_level(policy, InclusionPolicy::Exclusive), trace.clone())?;
        while simulator.step().is_some() {
            assert!(
                simulator.hierarchy().is_exclusive(),
                "{policy} broke exclusion at reference {}",
                simulator.processed()
            );
        }
    }
    Ok(())
}

#[test]
fn every_reference_reaches_l1() -> Result<(), Box<dyn Error>> {
    let trace = synthetic_trace(2000, 128, 16, 3);
    let writes = trace.iter().filter(|reference| reference.op == Operation::Write).count() as u64;
    for policy in POLICIES {
        for inclusion in [InclusionPolicy::NonInclusive, InclusionPolicy::Exclusive] {
            let result = Simulator::new(&two_level(policy, inclusion), trace.clone())?.simulate();
            let l1 = &result.levels[0].stats;
            assert_eq!(l1.accesses(), trace.len() as u64);
            assert_eq!(l1.writes, writes);
        }
    }
    Ok(())
}

#[test]
fn identical_runs_give_identical_results() -> Result<(), Box<dyn Error>> {
    let trace = synthetic_trace(2000, 512, 16, 5);
    for policy in POLICIES {
        for inclusion in [InclusionPolicy::NonInclusive, InclusionPolicy::Inclusive, InclusionPolicy::Exclusive] {
            let config = two_level(policy, inclusion);
            let first = Simulator::new(&config, trace.clone())?.simulate();
            let second = Simulator::new(&config, trace.clone())?.simulate();
            assert_eq!(first, second);
        }
    }
    Ok(())
}

#[test]
fn optimal_never_misses_more_than_lru_or_fifo() -> Result<(), Box<dyn Error>> {
    let trace = synthetic_trace(4000, 300, 16, 13);
    let misses = |policy| -> Result<u64, ConfigError> {
        let result = Simulator::new(&single_level(512, 4, policy), trace.clone())?.simulate();
        Ok(result.levels[0].stats.misses())
    };
    let optimal = misses(ReplacementPolicyConfig::Optimal)?;
    assert!(optimal <= misses(ReplacementPolicyConfig::LeastRecentlyUsed)?);
    assert!(optimal <= misses(ReplacementPolicyConfig::FirstInFirstOut)?);
    Ok(())
}

/// Straightforward optimal replacement: ordered lists per set, scanning the rest of the trace for
/// every resident line on every eviction
fn reference_optimal(blocks: &[(Operation, u64)], num_sets: u64, associativity: usize) -> CacheStats {
    // (tag, dirty, block), front first
    let mut sets: Vec<Vec<(u64, bool, u64)>> = vec![Vec::new(); num_sets as usize];
    let mut stats = CacheStats::default();
    for (position, (op, block)) in blocks.iter().enumerate() {
        let set = &mut sets[(block % num_sets) as usize];
        let tag = block / num_sets;
        let write = *op == Operation::Write;
        if write {
            stats.writes += 1;
        } else {
            stats.reads += 1;
        }
        if let Some(index) = set.iter().position(|(t, _, _)| *t == tag) {
            if write {
                set[index].1 = true;
            } else {
                let line = set.remove(index);
                set.insert(0, line);
            }
            continue;
        }
        if write {
            stats.write_misses += 1;
        } else {
            stats.read_misses += 1;
        }
        if set.len() < associativity {
            set.insert(0, (tag, write, *block));
            continue;
        }
        let rest: Vec<u64> = blocks[position..].iter().map(|(_, block)| *block).collect();
        let mut victim = 0;
        let mut furthest = None;
        for (index, (_, _, resident)) in set.iter().enumerate() {
            match rest.iter().position(|b| b == resident) {
                None => {
                    victim = index;
                    break;
                }
                Some(next) => {
                    if furthest.map_or(true, |f| next > f) {
                        furthest = Some(next);
                        victim = index;
                    }
                }
            }
        }
        if set[victim].1 {
            stats.writebacks += 1;
        }
        set[victim] = (tag, write, *block);
    }
    stats
}

#[test]
fn optimal_matches_a_full_suffix_scan() -> Result<(), Box<dyn Error>> {
    for (seed, associativity) in [(17, 2), (19, 4), (23, 8)] {
        let trace = synthetic_trace(1500, 200, 16, seed);
        let config = single_level(16 * 8 * associativity, associativity, ReplacementPolicyConfig::Optimal);
        let result: HierarchyResult = Simulator::new(&config, trace.clone())?.simulate();
        let blocks: Vec<(Operation, u64)> = trace
            .iter()
            .map(|reference| (reference.op, reference.address / 16))
            .collect();
        assert_eq!(result.levels[0].stats, reference_optimal(&blocks, 8, associativity as usize));
    }
    Ok(())
}

#[test]
fn result_serialises_to_json() -> Result<(), Box<dyn Error>> {
    let trace = synthetic_trace(200, 64, 16, 29);
    let mut simulator = Simulator::new(
        &two_level(ReplacementPolicyConfig::FirstInFirstOut, InclusionPolicy::Inclusive),
        trace,
    )?;
    let result = simulator.simulate();
    let json = serde_json::to_string_pretty(&result)?;
    assert!(json.contains("\"read_misses\""));
    assert!(json.contains("\"inclusion_property\": \"inclusive\""));
    let parsed: HierarchyResult = serde_json::from_str(&json)?;
    assert_eq!(parsed.levels[1].stats, *simulator.hierarchy().l2().expect("two levels").stats());
    Ok(())
}

#[test]
fn text_report_lists_counters_and_contents() -> Result<(), Box<dyn Error>> {
    let trace = vec![Reference::write(0x0), Reference::read(0x10)];
    let result = Simulator::new(&single_level(1024, 2, ReplacementPolicyConfig::LeastRecentlyUsed), trace)?.simulate();
    let report = result.to_string();
    assert!(report.starts_with("L1:\nMiss Ratio: 1.000000\n"));
    assert!(report.contains("Writes: 1\nReads: 1\nWrite Misses: 1\nRead Misses: 1\nWritebacks: 0\n"));
    assert!(report.contains("Set 0    0 D  \n"));
    assert!(report.contains("Set 1    0    \n"));
    assert!(report.contains("Set 31    \n"));
    Ok(())
}
