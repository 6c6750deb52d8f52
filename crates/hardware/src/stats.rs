//! Simulation statistics collection and reporting.
//!
//! This module tracks the aggregate cost of a trace. It provides:
//! 1. **Summary:** Hits, misses, commands, total cycles, and derived rates.
//! 2. **Cache hierarchy:** Hit counts per level.
//! 3. **DRAM:** Fetches, writebacks, and row-buffer outcomes.

use crate::core::hierarchy::{AccessOutcome, HitLevel};
use crate::memory::{DramAccess, RowBufferOutcome};

/// Aggregate counters for one simulation.
///
/// Updated once per hierarchy access and cleared only by an explicit reset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Accesses satisfied by any cache level.
    pub hits: u64,
    /// Accesses that missed every level.
    pub misses: u64,
    /// Accesses processed.
    pub total_commands: u64,
    /// Cycles charged, including writebacks.
    pub total_cycles: u64,

    /// L1 hit count.
    pub l1_hits: u64,
    /// L2 hit count.
    pub l2_hits: u64,
    /// L3 hit count.
    pub l3_hits: u64,

    /// DRAM fetches caused by misses.
    pub dram_reads: u64,
    /// DRAM writebacks of blocks pushed out of L3.
    pub dram_writebacks: u64,
    /// DRAM accesses that found their row open.
    pub row_hits: u64,
    /// DRAM accesses to a closed bank.
    pub row_empty: u64,
    /// DRAM accesses that had to close another row first.
    pub row_conflicts: u64,
    /// DRAM accesses moved away from a full row.
    pub row_remaps: u64,
}

/// Section names for selective stats output.
///
/// Valid section identifiers: `"summary"`, `"cache"`, `"dram"`.
/// Pass an empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "cache", "dram"];

impl SimStats {
    /// Folds one access into the counters.
    pub fn record(&mut self, outcome: &AccessOutcome) {
        self.total_commands += 1;
        self.total_cycles += outcome.total_latency();
        match outcome.level {
            HitLevel::L1 => self.l1_hits += 1,
            HitLevel::L2 => self.l2_hits += 1,
            HitLevel::L3 => self.l3_hits += 1,
            HitLevel::Dram => self.misses += 1,
        }
        if outcome.level.is_hit() {
            self.hits += 1;
        }
        if let Some(fetch) = &outcome.dram {
            self.dram_reads += 1;
            self.record_dram(fetch);
        }
        if let Some(writeback) = &outcome.writeback {
            self.dram_writebacks += 1;
            self.record_dram(writeback);
        }
    }

    /// Counts the row-buffer outcome of a DRAM access.
    pub fn record_dram(&mut self, access: &DramAccess) {
        match access.outcome {
            RowBufferOutcome::Hit => self.row_hits += 1,
            RowBufferOutcome::Empty => self.row_empty += 1,
            RowBufferOutcome::Conflict => self.row_conflicts += 1,
        }
        if access.relocated {
            self.row_remaps += 1;
        }
    }

    /// Fraction of accesses satisfied by a cache, 0.0 when nothing ran.
    pub fn hit_rate(&self) -> f64 {
        if self.total_commands == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_commands as f64
        }
    }

    /// Mean cycles per access, 0.0 when nothing ran.
    pub fn average_latency(&self) -> f64 {
        if self.total_commands == 0 {
            0.0
        } else {
            self.total_cycles as f64 / self.total_commands as f64
        }
    }

    /// Accesses that were not L1 hits.
    pub const fn l1_misses(&self) -> u64 {
        self.total_commands - self.l1_hits
    }

    /// DRAM accesses that paid a row activation.
    pub const fn row_activations(&self) -> u64 {
        self.row_empty + self.row_conflicts
    }

    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of `"summary"`, `"cache"`, or
    /// `"dram"`. Pass an empty slice to print all sections (same as `print()`).
    ///
    /// # Arguments
    ///
    /// * `sections` - Slice of section names to print, or empty for all.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let cmds = self.total_commands.max(1) as f64;

        if want("summary") {
            println!("\n==========================================================");
            println!("MEMORY LATENCY SIMULATION STATISTICS");
            println!("==========================================================");
            println!("total_commands           {}", self.total_commands);
            println!("total_cycles             {}", self.total_cycles);
            println!("hits                     {}", self.hits);
            println!("misses                   {}", self.misses);
            println!("hit_rate                 {:.2}%", self.hit_rate() * 100.0);
            println!("avg_latency              {:.2} cycles", self.average_latency());
            println!("----------------------------------------------------------");
        }
        if want("cache") {
            println!("CACHE HIERARCHY");
            for (name, hits) in [("L1", self.l1_hits), ("L2", self.l2_hits), ("L3", self.l3_hits)] {
                println!(
                    "  {:<6} hits: {:<10} ({:.2}% of accesses)",
                    name,
                    hits,
                    (hits as f64 / cmds) * 100.0
                );
            }
            println!("----------------------------------------------------------");
        }
        if want("dram") {
            let dram_total = (self.dram_reads + self.dram_writebacks).max(1) as f64;
            println!("DRAM");
            println!("  dram.reads             {}", self.dram_reads);
            println!("  dram.writebacks        {}", self.dram_writebacks);
            println!(
                "  row.hits               {} ({:.2}%)",
                self.row_hits,
                (self.row_hits as f64 / dram_total) * 100.0
            );
            println!(
                "  row.empty              {} ({:.2}%)",
                self.row_empty,
                (self.row_empty as f64 / dram_total) * 100.0
            );
            println!(
                "  row.conflicts          {} ({:.2}%)",
                self.row_conflicts,
                (self.row_conflicts as f64 / dram_total) * 100.0
            );
            if self.row_remaps > 0 {
                println!("  row.remaps             {}", self.row_remaps);
            }
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    ///
    /// Equivalent to `print_sections(&[])`.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
