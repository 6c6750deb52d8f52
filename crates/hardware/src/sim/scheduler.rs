//! Pending request queue and dispatch policies.
//!
//! The scheduler owns only the queue. It decides the order in which pending
//! requests reach the hierarchy and leaves all cache and DRAM state to
//! [`MemoryHierarchy`].
//!
//! 1. **FCFS:** Oldest arrival first; equal arrival times keep queue order.
//! 2. **Row-conflict minimizing:** Stable sort of the whole batch by DRAM row,
//!    so requests to the same row run back to back and reuse the open row.

use std::collections::VecDeque;

use tracing::debug;

use crate::common::{Address, ConfigError, SchedulerError};
use crate::config::{SchedulePolicy, SchedulerConfig};
use crate::core::hierarchy::{AccessOutcome, MemoryHierarchy};
use crate::memory::AddressMapper;

/// A request waiting to be dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    /// Address to access.
    pub address: Address,
    /// Time the request entered the queue.
    pub arrival_time: u64,
}

/// Bounded queue of pending requests with a fixed dispatch policy.
#[derive(Debug, Clone)]
pub struct RequestScheduler {
    queue: VecDeque<PendingRequest>,
    capacity: usize,
    policy: SchedulePolicy,
}

impl RequestScheduler {
    /// Creates an empty scheduler.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Zero`] for a zero queue capacity.
    pub fn new(config: &SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            queue: VecDeque::with_capacity(config.queue_capacity),
            capacity: config.queue_capacity,
            policy: config.policy,
        })
    }

    /// Appends a request.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::QueueFull`] when the queue already holds
    /// `capacity` requests; the queue is left unchanged.
    pub fn enqueue(&mut self, address: Address, arrival_time: u64) -> Result<(), SchedulerError> {
        if self.queue.len() >= self.capacity {
            return Err(SchedulerError::QueueFull {
                capacity: self.capacity,
                address,
            });
        }
        self.queue.push_back(PendingRequest {
            address,
            arrival_time,
        });
        Ok(())
    }

    /// The order in which the pending batch would be dispatched.
    ///
    /// Does not modify the queue.
    pub fn dispatch_order(&self, mapper: &AddressMapper) -> Vec<PendingRequest> {
        let mut order: Vec<PendingRequest> = self.queue.iter().copied().collect();
        match self.policy {
            // Repeatedly taking the earliest arrival with ties in queue order is
            // a stable sort on arrival time.
            SchedulePolicy::Fcfs => order.sort_by_key(|r| r.arrival_time),
            SchedulePolicy::RowConflictMinimizing => {
                order.sort_by_cached_key(|r| mapper.row_of(r.address));
            }
        }
        order
    }

    /// Dispatches every pending request into `hierarchy` and empties the queue.
    ///
    /// # Returns
    ///
    /// One outcome per request, in dispatch order.
    pub fn drain(&mut self, hierarchy: &mut MemoryHierarchy) -> Vec<AccessOutcome> {
        let order = self.dispatch_order(hierarchy.mapper());
        self.queue.clear();
        debug!(count = order.len(), policy = ?self.policy, "dispatching batch");
        order
            .into_iter()
            .map(|request| hierarchy.access(request.address))
            .collect()
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Maximum number of pending requests.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Dispatch policy.
    pub const fn policy(&self) -> SchedulePolicy {
        self.policy
    }

    /// Drops every pending request without dispatching it.
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
