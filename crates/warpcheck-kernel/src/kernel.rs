//! The kernel - transition function of the validator.
//!
//! Each classified log line moves the validator from one state to the next
//! or is rejected with a [`ProtocolError`]. There is no other control path:
//! no IO, no clocks, no process exit. The caller decides what a violation
//! means for the run.
//!
//! # Example
//!
//! ```ignore
//! let state = ValidatorState::new().with_pending([Timestamp::new(10)]);
//! let line = LogLine::send(Event::new(lp, Timestamp::new(10), core), Timestamp::ZERO);
//!
//! let state = apply_line(state, &line)?;
//! ```

use tracing::{debug, trace};
use warpcheck_types::{CoreId, Event, LpId, Timestamp};

use crate::bag::TimestampBag;
use crate::cores::{CoreState, CoreTimes};
use crate::line::{BatchStats, LogLine};
use crate::queue::EmptyQueue;
use crate::state::ValidatorState;

/// Applies one log line to the state, producing the next state.
///
/// Takes ownership of state and hands it back on success; a violation
/// consumes it, since the replay ends there.
pub fn apply_line(
    mut state: ValidatorState,
    line: &LogLine,
) -> Result<ValidatorState, ProtocolError> {
    trace!(kind = line.kind(), index = state.lines_applied, "applying line");

    match line {
        LogLine::Send { event, gvt } => send(&mut state, event, *gvt)?,
        LogLine::Exec { event } => exec(&mut state, event),
        LogLine::Recv {
            event,
            end_of_batch,
            ..
        } => recv(&mut state, event, end_of_batch.as_ref())?,
        LogLine::Null { core, end_of_batch } => {
            if end_of_batch.is_some() {
                close_batch(&mut state, *core, "null");
            }
        }
        LogLine::Unrecognized => {}
    }

    state.lines_applied += 1;
    Ok(state)
}

/// Applies a sequence of lines, stopping at the first violation.
///
/// On failure returns the zero-based index of the offending line with the
/// error.
pub fn apply_lines<'a>(
    state: ValidatorState,
    lines: impl IntoIterator<Item = &'a LogLine>,
) -> Result<ValidatorState, (usize, ProtocolError)> {
    lines
        .into_iter()
        .enumerate()
        .try_fold(state, |state, (index, line)| {
            apply_line(state, line).map_err(|e| (index, e))
        })
}

// ============================================================================
// Handlers
// ============================================================================

/// `Idle core -> Busy core`.
fn send(state: &mut ValidatorState, event: &Event, gvt: Timestamp) -> Result<(), ProtocolError> {
    // Precondition: the predictor has something to dispatch
    let expected = state
        .queue
        .pop_max()
        .map_err(|EmptyQueue| ProtocolError::EmptyQueue { event: *event })?;

    // Precondition: the simulator dispatched the predicted event
    if expected != event.timestamp {
        return Err(ProtocolError::OrderMismatch {
            expected,
            actual: event.timestamp,
            event: *event,
        });
    }

    // Precondition: target core is free
    if let CoreState::Busy { time, lp } = state.cores.get(event.core) {
        return Err(ProtocolError::CoreConflict {
            core: event.core,
            running_lp: lp,
            running_time: time,
            lp: event.target_lp,
            time: event.timestamp,
        });
    }

    if state.cores.is_beyond_width(event.core) {
        debug!(core = %event.core, width = state.cores.width(), "core beyond expected width");
    }
    state
        .cores
        .occupy(event.core, event.timestamp, event.target_lp);

    // Postcondition: the dispatched core now takes part in the GVT bound
    debug_assert_eq!(state.cores.get(event.core).time(), Some(event.timestamp));

    trace!(%event, %gvt, queued = state.queue.len(), "dispatched");

    state.gvt.observe(gvt, &state.cores)
}

/// Causality check for an executing event.
fn exec(state: &mut ValidatorState, event: &Event) {
    let gvt = state.gvt.gvt();
    let ledger = state.ledger_mut(event.target_lp);
    ledger.prune_below(gvt);

    if event.is_cancellation {
        let outcome = ledger.cancel(event.timestamp);
        trace!(%event, ?outcome, "cancellation");
        return;
    }

    let execution = ledger.execute(event.timestamp);

    // Postcondition: nothing is both executed and awaiting rollback
    debug_assert!(execution.stragglers.is_disjoint(ledger.executed()));

    if !execution.stragglers.is_empty() {
        debug!(
            lp = %event.target_lp,
            core = %event.core,
            straggler = %event.timestamp,
            rolled_back = %execution.stragglers,
            "straggler forces rollback"
        );
        state.rollbacks.flag(event.core, execution.stragglers);
    }
}

/// Resolves a flagged re-send and requeues the received event.
fn recv(
    state: &mut ValidatorState,
    event: &Event,
    end_of_batch: Option<&BatchStats>,
) -> Result<(), ProtocolError> {
    let running = state.cores.get(event.core);
    if running.lp() == Some(event.target_lp)
        && state.rollbacks.acknowledge(event.core, event.timestamp)
    {
        trace!(%event, "rolled-back event re-sent");
    }

    state.queue.push(event.timestamp);

    if end_of_batch.is_some() {
        if let Some(pending) = state.rollbacks.pending(event.core) {
            return Err(ProtocolError::UnresolvedRollback {
                core: event.core,
                running,
                pending: pending.clone(),
            });
        }
        close_batch(state, event.core, "recv");
    }

    Ok(())
}

fn close_batch(state: &mut ValidatorState, core: CoreId, via: &'static str) {
    state.cores.release(core);
    debug!(%core, via, busy = state.cores.busy_count(), "batch closed");
}

// ============================================================================
// Errors
// ============================================================================

/// A protocol violation found in the trace. Every variant is fatal to the
/// replay.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("deque from empty queue: {event} was dispatched with nothing pending")]
    EmptyQueue { event: Event },

    #[error("wrong event issued: expected timestamp {expected}, actual {actual} ({event})")]
    OrderMismatch {
        expected: Timestamp,
        actual: Timestamp,
        event: Event,
    },

    #[error(
        "sending to occupied core {core}: running {running_lp}->{running_time}, received {lp}->{time}"
    )]
    CoreConflict {
        core: CoreId,
        running_lp: LpId,
        running_time: Timestamp,
        lp: LpId,
        time: Timestamp,
    },

    #[error("invalid GVT {gvt}: earliest busy core is at {min_busy} (core times: {core_times})")]
    GvtViolation {
        gvt: Timestamp,
        min_busy: Timestamp,
        core_times: CoreTimes,
    },

    #[error("rollback events remain unsent on core {core} ({running}): {pending}")]
    UnresolvedRollback {
        core: CoreId,
        running: CoreState,
        pending: TimestampBag,
    },
}

impl ProtocolError {
    /// Stable name of the violated invariant, for reports.
    pub fn invariant(&self) -> &'static str {
        match self {
            ProtocolError::EmptyQueue { .. } => "dispatch_from_empty_queue",
            ProtocolError::OrderMismatch { .. } => "dispatch_order",
            ProtocolError::CoreConflict { .. } => "core_occupancy",
            ProtocolError::GvtViolation { .. } => "gvt_bound",
            ProtocolError::UnresolvedRollback { .. } => "rollback_resent",
        }
    }
}
