//! Trace replay.
//!
//! Streams a simulator log through the kernel one line at a time. The
//! driver owns everything the kernel deliberately does not: reading,
//! line numbering, the current cycle marker and the summary of what was
//! seen. The first protocol violation stops the replay and is returned
//! with enough context to locate it in the log.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};
use warpcheck_kernel::{LogLine, ProtocolError, ValidatorState, apply_line};
use warpcheck_types::{Cycle, Timestamp};

use crate::classify::{ClassifyError, classify};

// ============================================================================
// Errors
// ============================================================================

/// The first protocol violation of a replay, located in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// One-based line number.
    pub line_number: u64,
    /// Most recent cycle marker at or before the line.
    pub cycle: Option<Cycle>,
    /// The raw line text.
    pub line: String,
    pub error: ProtocolError,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}", self.line_number)?;
        if let Some(cycle) = self.cycle {
            write!(f, " (cycle {cycle})")?;
        }
        write!(f, ": {}", self.error)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum TraceError {
    #[error("cannot open trace {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read trace")]
    Io(#[from] io::Error),

    #[error("line {line_number}: {source}")]
    Parse {
        line_number: u64,
        #[source]
        source: ClassifyError,
    },

    #[error("{0}")]
    Violation(Box<Violation>),
}

impl TraceError {
    /// The protocol violation, if that is what ended the replay.
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            TraceError::Violation(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// Summary
// ============================================================================

/// What a clean replay saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub lines: u64,
    pub sends: u64,
    pub execs: u64,
    pub recvs: u64,
    pub nulls: u64,
    pub cancellations: u64,
    pub batches_closed: u64,
    pub unrecognized: u64,
    pub last_cycle: Option<Cycle>,
    pub final_gvt: Timestamp,
    pub queued: usize,
    pub busy_cores: usize,
    pub outstanding_rollbacks: usize,
}

impl ReplaySummary {
    fn count(&mut self, line: &LogLine) {
        let event = match line {
            LogLine::Send { event, .. } => {
                self.sends += 1;
                Some(event)
            }
            LogLine::Exec { event } => {
                self.execs += 1;
                Some(event)
            }
            LogLine::Recv { event, .. } => {
                self.recvs += 1;
                Some(event)
            }
            LogLine::Null { .. } => {
                self.nulls += 1;
                None
            }
            LogLine::Unrecognized => {
                self.unrecognized += 1;
                None
            }
        };
        if event.is_some_and(|e| e.is_cancellation) {
            self.cancellations += 1;
        }
        if line.closes_batch() {
            self.batches_closed += 1;
        }
    }

    fn finish(mut self, state: &ValidatorState) -> Self {
        self.final_gvt = state.gvt();
        self.queued = state.queue().len();
        self.busy_cores = state.cores().busy_count();
        self.outstanding_rollbacks = state.rollbacks().outstanding();
        self
    }

    /// Formats the summary for display.
    pub fn display(&self) -> String {
        let cycle = self
            .last_cycle
            .map_or_else(|| "-".to_string(), |c| c.to_string());
        format!(
            "Replay Summary:\n\
             Lines: {}\n\
             Sends: {}\n\
             Execs: {}\n\
             Recvs: {}\n\
             Nulls: {}\n\
             Cancellations: {}\n\
             Batches closed: {}\n\
             Unrecognized: {}\n\
             Last cycle: {}\n\
             Final GVT: {}\n\
             Queued: {}\n\
             Busy cores: {}\n\
             Outstanding rollbacks: {}",
            self.lines,
            self.sends,
            self.execs,
            self.recvs,
            self.nulls,
            self.cancellations,
            self.batches_closed,
            self.unrecognized,
            cycle,
            self.final_gvt,
            self.queued,
            self.busy_cores,
            self.outstanding_rollbacks
        )
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Iterates over the lines of a log, lossily decoding non-UTF-8 bytes and
/// dropping a trailing carriage return.
pub(crate) fn lines<R: BufRead>(reader: R) -> impl Iterator<Item = io::Result<String>> {
    reader.split(b'\n').map(|chunk| {
        chunk.map(|mut bytes| {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            String::from_utf8_lossy(&bytes).into_owned()
        })
    })
}

/// Replays a log from any buffered reader, starting from `state`.
pub fn replay<R: BufRead>(reader: R, state: ValidatorState) -> Result<ReplaySummary, TraceError> {
    let mut state = state;
    let mut summary = ReplaySummary::default();
    let mut cycle = None;

    for (index, raw) in lines(reader).enumerate() {
        let raw = raw?;
        let line_number = index as u64 + 1;

        let record = classify(&raw).map_err(|source| TraceError::Parse {
            line_number,
            source,
        })?;
        if record.cycle.is_some() {
            cycle = record.cycle;
        }

        state = apply_line(state, &record.line).map_err(|error| {
            TraceError::Violation(Box::new(Violation {
                line_number,
                cycle,
                line: raw.clone(),
                error,
            }))
        })?;

        summary.lines = line_number;
        summary.count(&record.line);
    }

    summary.last_cycle = cycle;
    let summary = summary.finish(&state);
    debug!(?summary, "replay state at end of input");
    Ok(summary)
}

/// Opens `path` and replays it.
pub fn replay_file(path: &Path, state: ValidatorState) -> Result<ReplaySummary, TraceError> {
    let file = File::open(path).map_err(|source| TraceError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), "replaying trace");
    let summary = replay(BufReader::new(file), state)?;
    info!(
        lines = summary.lines,
        sends = summary.sends,
        gvt = %summary.final_gvt,
        "trace is consistent"
    );
    Ok(summary)
}
