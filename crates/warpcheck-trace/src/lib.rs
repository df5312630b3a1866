//! # warpcheck-trace: Reading simulator logs
//!
//! Everything between a log file on disk and the pure validator kernel:
//!
//! - [`classify`]: raw line to typed [`LogLine`](warpcheck_kernel::LogLine)
//! - [`replay`]: streams a log through the kernel and locates the first
//!   violation
//! - [`stats`]: processed/cancellation counts and the queue-depth histogram

pub mod classify;
pub mod replay;
pub mod stats;

pub use classify::{ClassifyError, Record, classify};
pub use replay::{ReplaySummary, TraceError, Violation, replay, replay_file};
pub use stats::{DEFAULT_QUEUE_SLOTS, TraceStats, collect_stats, stats_file};
