//! Per-LP event ledger.
//!
//! For each logical process the ledger keeps the timestamps it has executed
//! (still revocable, i.e. at or above GVT) and the cancellations that arrived
//! before the event they cancel was seen executing.

use warpcheck_types::Timestamp;

use crate::bag::TimestampBag;

/// What a cancellation resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cancellation {
    /// The event had already executed; its record was removed.
    Executed,
    /// The event has not executed yet; the cancellation is parked.
    Pending,
}

/// Result of recording a non-cancellation execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    /// Previously executed timestamps later than this one. Non-empty means
    /// the event was a straggler and these must be rolled back.
    pub stragglers: TimestampBag,
    /// The event met a parked cancellation and was not recorded.
    pub cancelled: bool,
}

/// Executed history and parked cancellations of one LP.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LpLedger {
    executed: TimestampBag,
    pending_cancellations: TimestampBag,
}

impl LpLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets executed timestamps below `gvt`; they can never roll back.
    pub fn prune_below(&mut self, gvt: Timestamp) {
        self.executed.retain_at_least(gvt);
    }

    /// Applies a cancellation for `ts`.
    ///
    /// Consumes exactly one record: the executed entry if there is one,
    /// otherwise a new parked cancellation is added.
    pub fn cancel(&mut self, ts: Timestamp) -> Cancellation {
        if self.executed.remove_one(ts) {
            Cancellation::Executed
        } else {
            self.pending_cancellations.insert(ts);
            Cancellation::Pending
        }
    }

    /// Records the execution of `ts`.
    ///
    /// Anything executed later than `ts` is split off and returned as
    /// stragglers. A parked cancellation for `ts` is consumed instead of
    /// recording the execution.
    pub fn execute(&mut self, ts: Timestamp) -> Execution {
        let stragglers = match self.executed.max() {
            Some(max) if max > ts => self.executed.split_above(ts),
            _ => TimestampBag::new(),
        };

        let cancelled = self.pending_cancellations.remove_one(ts);
        if !cancelled {
            self.executed.insert(ts);
        }

        debug_assert!(
            self.executed.max().is_none_or(|max| max <= ts),
            "executed history must not run past the latest execution"
        );

        Execution {
            stragglers,
            cancelled,
        }
    }

    pub fn executed(&self) -> &TimestampBag {
        &self.executed
    }

    pub fn pending_cancellations(&self) -> &TimestampBag {
        &self.pending_cancellations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(v: u64) -> Timestamp {
        Timestamp::new(v)
    }

    #[test]
    fn in_order_executions_accumulate() {
        let mut ledger = LpLedger::new();
        for v in [1, 4, 9] {
            let exec = ledger.execute(ts(v));
            assert!(exec.stragglers.is_empty());
            assert!(!exec.cancelled);
        }
        assert_eq!(ledger.executed().len(), 3);
    }

    #[test]
    fn straggler_splits_off_later_history() {
        let mut ledger = LpLedger::new();
        ledger.execute(ts(5));
        ledger.execute(ts(12));
        ledger.execute(ts(15));

        let exec = ledger.execute(ts(7));
        assert_eq!(exec.stragglers.iter().collect::<Vec<_>>(), vec![ts(12), ts(15)]);
        assert_eq!(ledger.executed().iter().collect::<Vec<_>>(), vec![ts(5), ts(7)]);
    }

    #[test]
    fn cancellation_before_execution_is_parked_then_consumed() {
        let mut ledger = LpLedger::new();
        assert_eq!(ledger.cancel(ts(8)), Cancellation::Pending);
        assert!(ledger.pending_cancellations().contains(ts(8)));

        let exec = ledger.execute(ts(8));
        assert!(exec.cancelled);
        assert!(!ledger.executed().contains(ts(8)));
        assert!(ledger.pending_cancellations().is_empty());
    }

    #[test]
    fn cancellation_after_execution_removes_record() {
        let mut ledger = LpLedger::new();
        ledger.execute(ts(8));
        assert_eq!(ledger.cancel(ts(8)), Cancellation::Executed);
        assert!(ledger.executed().is_empty());
        assert!(ledger.pending_cancellations().is_empty());
    }

    #[test]
    fn prune_drops_history_below_gvt() {
        let mut ledger = LpLedger::new();
        ledger.execute(ts(2));
        ledger.execute(ts(6));
        ledger.prune_below(ts(5));
        assert_eq!(ledger.executed().iter().collect::<Vec<_>>(), vec![ts(6)]);
    }
}
