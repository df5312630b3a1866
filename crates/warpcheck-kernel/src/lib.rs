//! # warpcheck-kernel: Validator core of `warpcheck`
//!
//! The kernel is the deterministic heart of the trace checker. It receives
//! classified simulator log lines one at a time and either advances its
//! state or reports the protocol violation the line exposes.
//!
//! ## Key Principles
//!
//! - **No IO**: the kernel never reads the log itself
//! - **Single pass**: every line is seen once, in order, with no lookahead
//! - **Fail fast**: the first violation ends the replay
//! - **Pure transitions**: `apply_line(state, line) -> Result<state, ProtocolError>`
//!
//! ## Architecture
//!
//! - [`queue`]: max-heap predicting which timestamp is dispatched next
//! - [`cores`]: which core runs which LP at which timestamp
//! - [`ledger`]: per-LP executed history and parked cancellations
//! - [`rollback`]: timestamps each core must re-send after a straggler
//! - [`gvt`]: global virtual time and its bound
//! - [`kernel`]: the `apply_line` function that ties it all together
//!
//! Rollback bookkeeping is keyed by execution core and is cancellation
//! aware.

pub mod bag;
pub mod cores;
pub mod gvt;
pub mod kernel;
pub mod ledger;
pub mod line;
pub mod queue;
pub mod rollback;
pub mod state;


// Re-export commonly used items
pub use bag::TimestampBag;
pub use cores::{CoreState, CoreTable, CoreTimes, DEFAULT_CORE_COUNT};
pub use kernel::{ProtocolError, apply_line, apply_lines};
pub use ledger::LpLedger;
pub use line::{BatchStats, LogLine};
pub use queue::{EmptyQueue, PriorityQueue};
pub use state::ValidatorState;
