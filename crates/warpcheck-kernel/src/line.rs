//! Typed log lines.
//!
//! The trace reader turns each raw simulator log line into exactly one
//! [`LogLine`]; the kernel only ever sees these typed values.

use serde::{Deserialize, Serialize};
use warpcheck_types::{CoreId, Event, Timestamp};

/// Per-batch counters the simulator prints when a core finishes servicing an
/// LP for the current cycle. Its presence on a line marks end of batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchStats {
    pub stall: u64,
    pub mem_rq: u64,
    pub memld: u64,
    pub memst: u64,
    pub total: u64,
}

/// One classified line of the simulator log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLine {
    /// The dispatcher issued `event` to a core, reporting the current GVT.
    Send { event: Event, gvt: Timestamp },

    /// A core started executing `event`.
    Exec { event: Event },

    /// A core produced `event` back into the pending queue.
    Recv {
        event: Event,
        end_of_batch: Option<BatchStats>,
        /// `Q:<n>` annotation, used by the statistics pass only.
        queue_depth: Option<u64>,
    },

    /// A core finished a cycle without producing an event.
    Null {
        core: CoreId,
        end_of_batch: Option<BatchStats>,
    },

    /// Anything outside the modeled grammar.
    Unrecognized,
}

impl LogLine {
    /// Short name of the line kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            LogLine::Send { .. } => "send",
            LogLine::Exec { .. } => "exec",
            LogLine::Recv { .. } => "recv",
            LogLine::Null { .. } => "null",
            LogLine::Unrecognized => "unrecognized",
        }
    }

    /// Returns true if this line closes the current batch of its core.
    pub fn closes_batch(&self) -> bool {
        matches!(
            self,
            LogLine::Recv {
                end_of_batch: Some(_),
                ..
            } | LogLine::Null {
                end_of_batch: Some(_),
                ..
            }
        )
    }

    // ========================================================================
    // Builders
    // ========================================================================

    /// Creates a `Send` line.
    pub fn send(event: Event, gvt: Timestamp) -> Self {
        LogLine::Send { event, gvt }
    }

    /// Creates an `Exec` line.
    pub fn exec(event: Event) -> Self {
        LogLine::Exec { event }
    }

    /// Creates a mid-batch `Recv` line.
    pub fn recv(event: Event) -> Self {
        LogLine::Recv {
            event,
            end_of_batch: None,
            queue_depth: None,
        }
    }

    /// Creates a `Recv` line that closes its core's batch.
    pub fn recv_closing(event: Event, stats: BatchStats) -> Self {
        LogLine::Recv {
            event,
            end_of_batch: Some(stats),
            queue_depth: None,
        }
    }

    /// Creates a `Null` line that closes its core's batch.
    pub fn null_closing(core: CoreId, stats: BatchStats) -> Self {
        LogLine::Null {
            core,
            end_of_batch: Some(stats),
        }
    }
}
