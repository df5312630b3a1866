//! Rollback tracker.
//!
//! When a straggler forces an LP to roll back, the timestamps it had already
//! executed past the straggler are flagged against the core that observed
//! the straggler. The simulator must re-send each of them to that core before
//! the core's batch closes. A later straggler on the same core supersedes the
//! earlier flags.

use std::collections::BTreeMap;

use warpcheck_types::{CoreId, Timestamp};

use crate::bag::TimestampBag;

/// Outstanding re-sends, keyed by execution core.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackTracker {
    per_core: BTreeMap<CoreId, TimestampBag>,
}

impl RollbackTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags `stragglers` as needing re-execution on `core`, replacing
    /// whatever was still outstanding there.
    pub fn flag(&mut self, core: CoreId, stragglers: TimestampBag) {
        if stragglers.is_empty() {
            return;
        }
        self.per_core.insert(core, stragglers);
    }

    /// Acknowledges one re-sent `ts` on `core`. Returns false if it was not
    /// flagged.
    pub fn acknowledge(&mut self, core: CoreId, ts: Timestamp) -> bool {
        let Some(pending) = self.per_core.get_mut(&core) else {
            return false;
        };
        let removed = pending.remove_one(ts);
        if pending.is_empty() {
            self.per_core.remove(&core);
        }
        removed
    }

    /// Timestamps still awaiting re-send on `core`.
    pub fn pending(&self, core: CoreId) -> Option<&TimestampBag> {
        self.per_core.get(&core)
    }

    /// Returns true if nothing is outstanding on `core`.
    pub fn is_clear(&self, core: CoreId) -> bool {
        self.per_core.get(&core).is_none_or(TimestampBag::is_empty)
    }

    /// Total outstanding re-sends over all cores.
    pub fn outstanding(&self) -> usize {
        self.per_core.values().map(TimestampBag::len).sum()
    }
}
