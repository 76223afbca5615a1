#![forbid(unsafe_code)]

//! Recompute scheduling for twindiff.
//!
//! Diff computation must never stall typing, so it is debounced and runs
//! off the input thread:
//! - [`scheduler`] - a pure, clock-parameterized state machine deciding
//!   *when* the next computation starts
//! - [`service`] - a background worker that sleeps until the scheduler's
//!   deadline, computes on the latest text snapshot, and publishes results
//!   in order
//!
//! The split keeps the policy deterministic and testable without threads
//! or sleeps; only the service touches real time.

pub mod scheduler;
pub mod service;

pub use scheduler::{ChangeKind, RecomputeScheduler, SchedulerConfig};
pub use service::DiffService;
