//! Global virtual time monitor.

use warpcheck_types::Timestamp;

use crate::cores::CoreTable;
use crate::kernel::ProtocolError;

/// Tracks the GVT reported by the simulator and checks it against the
/// events in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GvtMonitor {
    gvt: Timestamp,
}

impl GvtMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gvt(&self) -> Timestamp {
        self.gvt
    }

    /// Records a reported GVT.
    ///
    /// GVT is a lower bound on everything still revocable, so it may never
    /// exceed the earliest timestamp running on any core.
    pub fn observe(&mut self, reported: Timestamp, cores: &CoreTable) -> Result<(), ProtocolError> {
        self.gvt = reported;

        match cores.min_busy_time() {
            Some(min_busy) if reported > min_busy => Err(ProtocolError::GvtViolation {
                gvt: reported,
                min_busy,
                core_times: cores.snapshot(),
            }),
            _ => Ok(()),
        }
    }
}
