use std::fs::File;
use std::io::BufReader;
use std::time::Instant;
use clap::Parser;
use env_logger::Env;
use log::debug;
use cachelib::config::{AllocationPolicy, CacheConfigBuilder, CacheParameter, ConfigFile, WritePolicy};
use cachelib::io::load_trace;

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Trace driven cache simulator"))]
struct Args {
    /// Trace file, one `<label> <hex address>` record per line
    trace: String,

    /// JSON configuration file, applied before the flags below
    #[arg(short, long)]
    config: Option<String>,

    /// Block size in bytes
    #[arg(long)]
    block_size: Option<u64>,

    /// Size of a unified cache in bytes
    #[arg(long)]
    unified_size: Option<u64>,

    /// Size of the instruction cache in bytes, selects split caches
    #[arg(long)]
    instruction_size: Option<u64>,

    /// Size of the data cache in bytes, selects split caches
    #[arg(long)]
    data_size: Option<u64>,

    /// Lines per set
    #[arg(short, long)]
    associativity: Option<u64>,

    #[arg(long, value_enum)]
    write_policy: Option<WritePolicy>,

    #[arg(long, value_enum)]
    allocation_policy: Option<AllocationPolicy>,

    /// Print the configuration and statistics as JSON
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

impl Args {
    fn parameters(&self) -> Vec<CacheParameter> {
        // Same order as the configuration file, so a later size still decides unified or split
        ConfigFile {
            block_size: self.block_size,
            unified_size: self.unified_size,
            instruction_size: self.instruction_size,
            data_size: self.data_size,
            associativity: self.associativity,
            write_policy: self.write_policy,
            allocation_policy: self.allocation_policy,
        }
        .parameters()
    }
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    env_logger::init_from_env(Env::default().filter_or("CACHESIM_LOG", "warn"));
    let args = Args::parse();

    let mut builder = CacheConfigBuilder::new();
    if let Some(path) = &args.config {
        let config_file = File::open(path).map_err(|e| format!("Couldn't open the config file at path {path}: {e}"))?;
        let config: ConfigFile = serde_json::from_reader(BufReader::new(config_file)).map_err(|e| format!("Couldn't parse the config file: {e}"))?;
        builder.set_parameters(config.parameters());
    }
    builder.set_parameters(args.parameters());
    let mut simulator = builder.initialize().map_err(|e| format!("Invalid cache configuration: {e}"))?;
    debug!("Parsed input configuration: {:?}", simulator.describe_configuration());

    let trace_file = File::open(&args.trace).map_err(|e| format!("Couldn't open the trace file at path {}: {e}", args.trace))?;
    let trace = load_trace(trace_file)?;
    simulator.simulate(&trace).map_err(|e| format!("Couldn't simulate the trace {}: {e}", args.trace))?;

    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        let occupancy = simulator.get_occupancy_counts();
        let formatted = simulator.caches()
            .iter()
            .zip(occupancy.iter())
            .map(|((name, cache), count)| format!("{name}: {count}/{} lines, {} dirty", cache.geometry().num_sets * cache.geometry().associativity, cache.dirty_lines()))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Resident lines before flush: ({formatted})");
    }
    simulator.flush();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&simulator.report()).map_err(|e| format!("Couldn't serialise the output {e}"))?);
    } else {
        println!("{}", simulator.describe_configuration());
        println!();
        println!("{}", simulator.get_statistics());
    }
    if args.performance {
        let end = Instant::now();
        let simulation_time = simulator.get_execution_time();
        let total_time = end - start;
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    Ok(())
}
