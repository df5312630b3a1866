//! Core-occupancy table.
//!
//! Tracks, per execution core, whether it is running an event and for which
//! LP and timestamp. Only busy cores are stored, so a log that names a core
//! beyond the configured width costs no more than any other core.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use warpcheck_types::{CoreId, LpId, Timestamp};

/// Default width of the core table (cores on the reference hardware).
pub const DEFAULT_CORE_COUNT: usize = 16;

/// Occupancy of a single core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoreState {
    /// No event dispatched since the last batch closed.
    #[default]
    Idle,
    /// Running the event `lp -> time`.
    Busy { time: Timestamp, lp: LpId },
}

impl CoreState {
    pub fn is_busy(&self) -> bool {
        matches!(self, CoreState::Busy { .. })
    }

    /// Timestamp in flight, if busy.
    pub fn time(&self) -> Option<Timestamp> {
        match self {
            CoreState::Idle => None,
            CoreState::Busy { time, .. } => Some(*time),
        }
    }

    /// LP being serviced, if busy.
    pub fn lp(&self) -> Option<LpId> {
        match self {
            CoreState::Idle => None,
            CoreState::Busy { lp, .. } => Some(*lp),
        }
    }
}

impl Display for CoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreState::Idle => write!(f, "idle"),
            CoreState::Busy { time, lp } => write!(f, "{lp}->{time}"),
        }
    }
}

/// Per-core occupancy, keyed by [`CoreId`].
///
/// Idle cores have no entry. `width` is the core count the hardware is
/// expected to have; it is advisory and never limits which cores may be
/// occupied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreTable {
    busy: BTreeMap<CoreId, (Timestamp, LpId)>,
    width: usize,
}

impl CoreTable {
    /// Creates an all-idle table for hardware with `width` cores.
    pub fn new(width: usize) -> Self {
        Self {
            busy: BTreeMap::new(),
            width,
        }
    }

    /// Returns the state of `core`; cores never seen are idle.
    pub fn get(&self, core: CoreId) -> CoreState {
        self.busy
            .get(&core)
            .map_or(CoreState::Idle, |&(time, lp)| CoreState::Busy { time, lp })
    }

    /// Marks `core` busy with `lp -> time`.
    pub fn occupy(&mut self, core: CoreId, time: Timestamp, lp: LpId) {
        self.busy.insert(core, (time, lp));
    }

    /// Marks `core` idle.
    pub fn release(&mut self, core: CoreId) {
        self.busy.remove(&core);
    }

    /// Smallest in-flight timestamp over busy cores.
    pub fn min_busy_time(&self) -> Option<Timestamp> {
        self.busy.values().map(|&(time, _)| time).min()
    }

    /// Number of busy cores.
    pub fn busy_count(&self) -> usize {
        self.busy.len()
    }

    /// Expected core count of the hardware.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether `core` lies outside the expected core count.
    pub fn is_beyond_width(&self, core: CoreId) -> bool {
        core.as_usize() >= self.width
    }

    /// Copies the in-flight time of every busy core for diagnostics.
    pub fn snapshot(&self) -> CoreTimes {
        CoreTimes(self.busy.iter().map(|(&core, &(time, _))| (core, time)).collect())
    }
}

impl Default for CoreTable {
    fn default() -> Self {
        Self::new(DEFAULT_CORE_COUNT)
    }
}

/// Snapshot of the in-flight time of every busy core, in core order.
///
/// Displays as `core:time` pairs, or `none` when every core is idle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreTimes(pub Vec<(CoreId, Timestamp)>);

impl Display for CoreTimes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "none");
        }
        for (i, (core, time)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{core}:{time}")?;
        }
        Ok(())
    }
}
