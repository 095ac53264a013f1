//! Admission control primitives for background work.
//!
//! Worker pools across the platform (reconciliation sweeps, replication
//! catch-up, retried transfers) pull their work through an
//! [`AdmissionScheduler`]: a capacity-bounded FIFO window in front of a
//! priority backlog. Key concepts:
//!
//! - **Backlog**: priority-ordered holding area for work not yet admitted.
//! - **Active window**: FIFO set of items eligible for immediate dispatch.
//! - **Decay**: bulk re-ranking applied to the whole backlog each time the
//!   window refills, so long-waiting items drift toward the front instead
//!   of starving.
//! - **Continuation**: direct re-admission of a dispatched item to the
//!   window tail, bypassing the backlog and its decay.
//!
//! # Invariants
//!
//! - A tracked item is in exactly one of backlog or active window; an item
//!   returned by `poll` belongs to the caller until resubmitted.
//! - `len()` equals backlog length plus window length at all times.
//! - No operation blocks or waits; `poll` on an empty scheduler returns
//!   `None` immediately.
//!
//! The scheduler owns no threads and performs no I/O. Retry and backoff
//! policy belong to the worker loop driving it.

mod error;
mod queue;
mod scheduler;
mod task;

pub use error::AdmissionError;
pub use queue::{CompareFn, DecayQueue};
pub use scheduler::{AdmissionScheduler, AdmissionSchedulerBuilder, DecayFn, MatchFn};
pub use task::{halve_rank, rank_order, same_task, ReconcileTask};
