use std::path::PathBuf;
use std::time::Instant;
use clap::Parser;
use color_eyre::eyre::{self, WrapErr};
use cachehier::config::{HierarchyConfig, InclusionPolicy, LevelConfig, ReplacementPolicyConfig};
use cachehier::io::read_trace_file;
use cachehier::report::ConfigurationReport;
use cachehier::simulator::Simulator;

#[derive(Parser, Debug)]
#[command(about = String::from("Two level cache hierarchy simulator"))]
struct Args {
    /// Block size in bytes
    block_size: u64,
    /// L1 size in bytes
    l1_size: u64,
    /// L1 associativity
    l1_assoc: u64,
    /// L2 size in bytes, 0 for no L2
    l2_size: u64,
    /// L2 associativity
    l2_assoc: u64,
    /// LRU, FIFO, or OPTIMAL
    replacement_policy: String,
    /// non-inclusive, inclusive, or exclusive
    inclusion_property: String,
    trace: PathBuf,

    /// Print the result as JSON
    #[arg(short, long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long)]
    debug: bool,
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let start = Instant::now();
    let args = Args::parse();
    let default_filter = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let replacement_policy: ReplacementPolicyConfig = args.replacement_policy.parse()?;
    let inclusion_property: InclusionPolicy = args.inclusion_property.parse()?;
    let config = HierarchyConfig::new(
        args.block_size,
        LevelConfig::new(args.l1_size, args.l1_assoc),
        Some(LevelConfig::new(args.l2_size, args.l2_assoc)),
        replacement_policy,
        inclusion_property,
    );
    let references = read_trace_file(&args.trace)
        .wrap_err_with(|| format!("Couldn't read the trace file at path {}", args.trace.display()))?;
    log::info!("read {} references from {}", references.len(), args.trace.display());

    let mut simulator = Simulator::new(&config, references)?;
    let result = simulator.simulate();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&result).wrap_err("Couldn't serialise the output")?);
    } else {
        let trace_file = args.trace.display().to_string();
        print!("{}", ConfigurationReport { config: &config, trace_file: &trace_file });
        print!("{result}");
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes trace parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        println!("Parsed input configuration: {config:?}");
        println!("References processed: {}", simulator.processed());
    }
    Ok(())
}
