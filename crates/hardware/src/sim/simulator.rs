//! Trace-driven simulation.
//!
//! A [`Simulator`] owns one hierarchy and one scheduler. Addresses enter the
//! scheduler stamped with a monotonically increasing arrival time; whenever the
//! queue fills up, the pending batch is dispatched and the rejected address is
//! queued again, so every address in the trace is accessed exactly once.

use tracing::{debug, info};

use super::scheduler::RequestScheduler;
use crate::common::{Address, SchedulerError, SimResult};
use crate::config::Config;
use crate::core::hierarchy::{AccessOutcome, MemoryHierarchy};
use crate::stats::SimStats;

/// Drives address traces through a scheduler and a memory hierarchy.
#[derive(Debug, Clone)]
pub struct Simulator {
    hierarchy: MemoryHierarchy,
    scheduler: RequestScheduler,
    clock: u64,
}

impl Simulator {
    /// Builds the hierarchy and scheduler described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`](crate::common::SimError::Config) when the
    /// configuration is invalid.
    pub fn new(config: &Config) -> SimResult<Self> {
        Ok(Self {
            hierarchy: MemoryHierarchy::new(config)?,
            scheduler: RequestScheduler::new(&config.scheduler)?,
            clock: 0,
        })
    }

    /// Runs every address and returns the outcomes in dispatch order.
    ///
    /// Requests still pending when the trace ends are dispatched before
    /// returning.
    pub fn run(&mut self, addresses: &[Address]) -> SimResult<Vec<AccessOutcome>> {
        let mut outcomes = Vec::with_capacity(addresses.len());
        for &address in addresses {
            self.submit(address, &mut outcomes)?;
        }
        outcomes.extend(self.flush());
        info!(
            accesses = outcomes.len(),
            cycles = self.hierarchy.stats().total_cycles,
            "trace complete"
        );
        Ok(outcomes)
    }

    /// Queues one address, dispatching the pending batch first if the queue is full.
    fn submit(&mut self, address: Address, outcomes: &mut Vec<AccessOutcome>) -> SimResult<()> {
        let arrival = self.clock;
        self.clock += 1;
        match self.scheduler.enqueue(address, arrival) {
            Ok(()) => Ok(()),
            Err(SchedulerError::QueueFull { capacity, .. }) => {
                debug!(capacity, %address, "queue full, dispatching pending batch");
                outcomes.extend(self.flush());
                self.scheduler.enqueue(address, arrival)?;
                Ok(())
            }
        }
    }

    /// Dispatches whatever is pending.
    pub fn flush(&mut self) -> Vec<AccessOutcome> {
        self.scheduler.drain(&mut self.hierarchy)
    }

    /// Aggregate statistics of everything dispatched so far.
    pub const fn stats(&self) -> &SimStats {
        self.hierarchy.stats()
    }

    /// The hierarchy being driven.
    pub const fn hierarchy(&self) -> &MemoryHierarchy {
        &self.hierarchy
    }

    /// The request scheduler.
    pub const fn scheduler(&self) -> &RequestScheduler {
        &self.scheduler
    }

    /// Returns the simulator to its freshly constructed state.
    pub fn reset(&mut self) {
        self.hierarchy.reset();
        self.scheduler.clear();
        self.clock = 0;
    }
}
