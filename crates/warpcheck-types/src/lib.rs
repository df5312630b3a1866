//! # warpcheck-types: Core types for `warpcheck`
//!
//! Shared identifiers used across the validator, the trace reader and the
//! testbench generator:
//! - Entity IDs ([`LpId`], [`CoreId`])
//! - Temporal types ([`Timestamp`], [`Cycle`])
//! - The simulator's unit of work ([`Event`])

use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

// ============================================================================
// Entity IDs - All Copy (cheap 4-byte values)
// ============================================================================

/// Identifier of a logical process in the simulated model.
///
/// Causality is enforced per LP: two events for different LPs never
/// constrain each other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct LpId(u32);

impl LpId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Display for LpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for LpId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<LpId> for u32 {
    fn from(id: LpId) -> Self {
        id.0
    }
}

/// Identifier of an execution core of the hardware simulator.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct CoreId(u32);

impl CoreId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns the core ID as a `usize` for indexing the core table.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Display for CoreId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CoreId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<CoreId> for u32 {
    fn from(id: CoreId) -> Self {
        id.0
    }
}

// ============================================================================
// Temporal Types
// ============================================================================

/// Virtual time of an event.
///
/// Timestamps are totally ordered by their integer value. Ties are legal and
/// carry no further ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

/// Hardware clock cycle reported by the simulator's cycle markers.
///
/// Advisory only: it is carried into diagnostics and never takes part in a
/// check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Cycle(u64);

impl Cycle {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Cycle {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// ============================================================================
// Events
// ============================================================================

/// An event as it appears in a log line: which LP it targets, its virtual
/// time, the core that handled it, and whether it is a cancellation
/// (anti-message) rather than a regular event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub target_lp: LpId,
    pub timestamp: Timestamp,
    pub core: CoreId,
    pub is_cancellation: bool,
}

impl Event {
    /// Creates a regular (non-cancellation) event.
    pub fn new(target_lp: LpId, timestamp: Timestamp, core: CoreId) -> Self {
        Self {
            target_lp,
            timestamp,
            core,
            is_cancellation: false,
        }
    }

    /// Creates a cancellation for the given event coordinates.
    pub fn cancellation(target_lp: LpId, timestamp: Timestamp, core: CoreId) -> Self {
        Self {
            target_lp,
            timestamp,
            core,
            is_cancellation: true,
        }
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}->{} @ core {}", self.target_lp, self.timestamp, self.core)?;
        if self.is_cancellation {
            write!(f, " (C)")?;
        }
        Ok(())
    }
}
