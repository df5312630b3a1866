//! Validator state.
//!
//! All state of one replay lives in a single [`ValidatorState`]: the dispatch
//! predictor, the core table, the per-LP ledgers, the rollback tracker and
//! the GVT monitor. It is created once per replay and threaded through
//! [`apply_line`](crate::kernel::apply_line) by value.

use std::collections::BTreeMap;

use warpcheck_types::{CoreId, LpId, Timestamp};

use crate::bag::TimestampBag;
use crate::cores::{CoreState, CoreTable, DEFAULT_CORE_COUNT};
use crate::gvt::GvtMonitor;
use crate::ledger::LpLedger;
use crate::queue::PriorityQueue;
use crate::rollback::RollbackTracker;

/// The validator's complete in-memory state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorState {
    pub(crate) queue: PriorityQueue,
    pub(crate) cores: CoreTable,
    pub(crate) ledgers: BTreeMap<LpId, LpLedger>,
    pub(crate) rollbacks: RollbackTracker,
    pub(crate) gvt: GvtMonitor,
    pub(crate) lines_applied: u64,
}

impl ValidatorState {
    /// Creates a fresh state: empty queue, all cores idle, GVT = 0.
    pub fn new() -> Self {
        Self::with_core_count(DEFAULT_CORE_COUNT)
    }

    /// Creates a fresh state whose core table starts `cores` wide.
    pub fn with_core_count(cores: usize) -> Self {
        Self {
            queue: PriorityQueue::new(),
            cores: CoreTable::new(cores),
            ledgers: BTreeMap::new(),
            rollbacks: RollbackTracker::new(),
            gvt: GvtMonitor::new(),
            lines_applied: 0,
        }
    }

    /// Seeds the predictor with events already pending when the log starts.
    pub fn with_pending(mut self, pending: impl IntoIterator<Item = Timestamp>) -> Self {
        self.queue.extend(pending);
        self
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn queue(&self) -> &PriorityQueue {
        &self.queue
    }

    pub fn cores(&self) -> &CoreTable {
        &self.cores
    }

    pub fn core(&self, core: CoreId) -> CoreState {
        self.cores.get(core)
    }

    pub fn gvt(&self) -> Timestamp {
        self.gvt.gvt()
    }

    /// Ledger of `lp`, if any event for it has been executed or cancelled.
    pub fn ledger(&self, lp: LpId) -> Option<&LpLedger> {
        self.ledgers.get(&lp)
    }

    /// Timestamps flagged for re-send on `core`.
    pub fn rollback(&self, core: CoreId) -> Option<&TimestampBag> {
        self.rollbacks.pending(core)
    }

    pub fn rollbacks(&self) -> &RollbackTracker {
        &self.rollbacks
    }

    /// Number of lines applied so far, unrecognized ones included.
    pub fn lines_applied(&self) -> u64 {
        self.lines_applied
    }

    pub(crate) fn ledger_mut(&mut self, lp: LpId) -> &mut LpLedger {
        self.ledgers.entry(lp).or_default()
    }
}

impl Default for ValidatorState {
    fn default() -> Self {
        Self::new()
    }
}
