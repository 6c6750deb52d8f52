//! Trace-driven simulation.
//!
//! 1. **Trace:** Extracts addresses from instruction or hex traces.
//! 2. **Scheduler:** Orders pending requests before dispatch.
//! 3. **Simulator:** Feeds a trace through the scheduler into the hierarchy.

/// Request queue and dispatch policies.
pub mod scheduler;

/// Simulation driver.
pub mod simulator;

/// Address trace parsing.
pub mod trace;

pub use scheduler::{PendingRequest, RequestScheduler};
pub use simulator::Simulator;
pub use trace::{RegisterFile, RegisterInit, TraceExtractor};
