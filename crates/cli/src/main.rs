//! Memory latency model CLI.
//!
//! This binary provides a single entry point for every simulation mode. It performs:
//! 1. **Run:** Extract addresses from a trace and drive them through the full hierarchy.
//! 2. **DRAM:** Send addresses straight to the DRAM device and print the access table.
//! 3. **Compare:** Run both mapping policies over the same trace side by side.
//!
//! Logging goes to stderr and is controlled with `RUST_LOG` (e.g. `RUST_LOG=memlat_core=debug`).

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use memlat_core::common::{Address, SimResult};
use memlat_core::config::{Config, MappingPolicy, SchedulePolicy};
use memlat_core::memory::DramDevice;
use memlat_core::sim::trace::{self, RegisterInit, TraceExtractor};
use memlat_core::sim::Simulator;
use memlat_core::stats::SimStats;

#[derive(Parser, Debug)]
#[command(
    name = "memlat",
    author,
    version,
    about = "Cache hierarchy and DRAM latency model",
    long_about = "Estimate the latency of a memory address trace through a three-level \
direct-mapped cache hierarchy backed by a banked DRAM.\n\nExamples:\n  \
memlat run trace.txt --dump-caches\n  \
memlat run addrs.hex --hex --mapping block --scheduler row\n  \
memlat run trace.txt --fixed-registers 0x10000 --show-registers\n  \
memlat dram addrs.hex --hex\n  memlat compare trace.txt --seed 42"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a trace through the full cache hierarchy.
    Run {
        #[command(flatten)]
        input: TraceArgs,

        /// Print one line per access.
        #[arg(long)]
        show_accesses: bool,

        /// Print the valid lines of every cache level after the run.
        #[arg(long)]
        dump_caches: bool,

        /// Statistics sections to print (summary, cache, dram); all when omitted.
        #[arg(long, value_delimiter = ',')]
        sections: Vec<String>,
    },

    /// Send addresses straight to DRAM, bypassing the caches.
    Dram {
        #[command(flatten)]
        input: TraceArgs,
    },

    /// Run the trace under both mapping policies and compare.
    Compare {
        #[command(flatten)]
        input: TraceArgs,
    },
}

#[derive(Args, Debug)]
struct TraceArgs {
    /// Trace file: instruction lines, or hex addresses with --hex.
    trace: PathBuf,

    /// Treat the trace as whitespace-separated hex addresses.
    #[arg(long)]
    hex: bool,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address mapping policy (overrides the configuration).
    #[arg(long, value_enum)]
    mapping: Option<MappingArg>,

    /// Request scheduling policy (overrides the configuration).
    #[arg(long, value_enum)]
    scheduler: Option<SchedulerArg>,

    /// Seed for random initial register values; registers start at zero when omitted.
    #[arg(long, conflicts_with = "fixed_registers")]
    seed: Option<u64>,

    /// Start every register at this hex value instead of zero.
    #[arg(long, value_name = "HEX", value_parser = parse_register_value)]
    fixed_registers: Option<u32>,

    /// Print the initial register file before extracting an instruction trace.
    #[arg(long)]
    show_registers: bool,
}

fn parse_register_value(text: &str) -> Result<u32, String> {
    trace::parse_hex(text).ok_or_else(|| format!("'{text}' is not a 32-bit hex value"))
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum MappingArg {
    /// Row interleaving.
    Row,
    /// Cache block interleaving.
    Block,
}

impl From<MappingArg> for MappingPolicy {
    fn from(arg: MappingArg) -> Self {
        match arg {
            MappingArg::Row => Self::RowInterleaved,
            MappingArg::Block => Self::CacheBlockInterleaved,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SchedulerArg {
    /// First come, first served.
    Fcfs,
    /// Group requests by DRAM row.
    Row,
}

impl From<SchedulerArg> for SchedulePolicy {
    fn from(arg: SchedulerArg) -> Self {
        match arg {
            SchedulerArg::Fcfs => Self::Fcfs,
            SchedulerArg::Row => Self::RowConflictMinimizing,
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            input,
            show_accesses,
            dump_caches,
            sections,
        } => cmd_run(&input, show_accesses, dump_caches, &sections),
        Commands::Dram { input } => cmd_dram(&input),
        Commands::Compare { input } => cmd_compare(&input),
    };

    if let Err(e) = result {
        eprintln!("\n[!] FATAL: {e}");
        process::exit(1);
    }
}

/// Loads the configuration file (or defaults) and applies command-line overrides.
fn load_config(input: &TraceArgs) -> SimResult<Config> {
    let mut config = match &input.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(mapping) = input.mapping {
        config.dram.mapping = mapping.into();
    }
    if let Some(policy) = input.scheduler {
        config.scheduler.policy = policy.into();
    }
    config.validate()?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

/// Reads the trace file in the requested format.
fn load_addresses(input: &TraceArgs) -> SimResult<Vec<Address>> {
    if input.hex {
        return Ok(trace::read_hex_trace(&input.trace)?);
    }
    let init = match (input.fixed_registers, input.seed) {
        (Some(value), _) => RegisterInit::Fixed(value),
        (None, Some(seed)) => RegisterInit::Random { seed },
        (None, None) => RegisterInit::Zero,
    };
    let mut extractor = TraceExtractor::new(init);
    if input.show_registers {
        println!("INITIAL REGISTERS");
        print!("{}", extractor.registers());
        println!();
    }
    let addresses = extractor.read_file(&input.trace)?;
    if extractor.skipped() > 0 {
        eprintln!(
            "[!] Skipped {} malformed load/store lines in {}",
            extractor.skipped(),
            input.trace.display()
        );
    }
    Ok(addresses)
}

fn print_header(trace_path: &Path, config: &Config, count: usize) {
    println!("[*] Trace: {} ({} addresses)", trace_path.display(), count);
    println!(
        "    L1 {} KiB / L2 {} KiB / L3 {} KiB, line {} B",
        config.cache.l1.size_bytes / 1024,
        config.cache.l2.size_bytes / 1024,
        config.cache.l3.size_bytes / 1024,
        config.cache.l1.line_bytes
    );
    println!(
        "    DRAM {} banks x {} rows x {} columns, mapping {:?}, scheduler {:?}",
        config.dram.banks,
        config.dram.rows,
        config.dram.columns,
        config.dram.mapping,
        config.scheduler.policy
    );
    println!();
}

fn cmd_run(
    input: &TraceArgs,
    show_accesses: bool,
    dump_caches: bool,
    sections: &[String],
) -> SimResult<()> {
    let config = load_config(input)?;
    let addresses = load_addresses(input)?;
    print_header(&input.trace, &config, addresses.len());

    let mut sim = Simulator::new(&config)?;
    let outcomes = sim.run(&addresses)?;

    if show_accesses {
        println!("Bank | Row    | Column | Address    | Row Open  | Latency        | Level");
        println!("-------------------------------------------------------------------------");
        for outcome in &outcomes {
            println!("{outcome}");
        }
    }
    if dump_caches {
        for (i, level) in sim.hierarchy().levels().iter().enumerate() {
            println!();
            level.print_contents(&format!("L{}", i + 1));
        }
    }
    sim.stats().print_sections(sections);
    Ok(())
}

fn cmd_dram(input: &TraceArgs) -> SimResult<()> {
    let config = load_config(input)?;
    let addresses = load_addresses(input)?;
    print_header(&input.trace, &config, addresses.len());

    let mut dram = DramDevice::new(&config.dram)?;
    let mut total = 0;
    println!("Bank | Row    | Column | Address    | Row Open  | Latency");
    println!("-------------------------------------------------------------");
    for &addr in &addresses {
        let access = dram.access(addr);
        total += access.latency;
        println!("{access}");
    }
    println!("-------------------------------------------------------------");
    dram.print_state();
    println!("Total access time: {total} cycles");
    Ok(())
}

fn cmd_compare(input: &TraceArgs) -> SimResult<()> {
    let mut config = load_config(input)?;
    let addresses = load_addresses(input)?;
    print_header(&input.trace, &config, addresses.len());

    let mut results: Vec<(MappingPolicy, SimStats)> = Vec::new();
    for mapping in [MappingPolicy::RowInterleaved, MappingPolicy::CacheBlockInterleaved] {
        config.dram.mapping = mapping;
        let mut sim = Simulator::new(&config)?;
        let _ = sim.run(&addresses)?;
        results.push((mapping, sim.stats().clone()));
    }

    println!(
        "{:<24} | {:>12} | {:>10} | {:>10} | {:>10} | {:>10}",
        "mapping", "total_cycles", "avg", "row_hits", "row_empty", "conflicts"
    );
    println!("{}", "-".repeat(90));
    for (mapping, stats) in &results {
        println!(
            "{:<24} | {:>12} | {:>10.2} | {:>10} | {:>10} | {:>10}",
            format!("{mapping:?}"),
            stats.total_cycles,
            stats.average_latency(),
            stats.row_hits,
            stats.row_empty,
            stats.row_conflicts
        );
    }
    Ok(())
}
