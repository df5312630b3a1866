//! Trace statistics.
//!
//! A second, independent pass over a log that checks nothing and only
//! counts: executed events, cancellation messages received and how deep the
//! event queue was on each receive.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Serialize;
use tracing::info;
use warpcheck_kernel::LogLine;

use crate::classify::classify;
use crate::replay::{TraceError, lines};

/// Queue capacity of the simulated hardware, in entries.
pub const DEFAULT_QUEUE_SLOTS: usize = 62;

/// Counts gathered from one log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStats {
    /// Exec lines, cancellations included.
    pub total_processed: u64,
    /// Recv lines carrying the cancellation flag.
    pub cancellations: u64,
    /// `histogram[d]` counts receives that reported queue depth `d`.
    pub histogram: Vec<u64>,
    /// Receives whose depth exceeded the histogram range.
    pub overflow: u64,
    /// Receives with no depth annotation.
    pub missing_depth: u64,
}

impl TraceStats {
    /// Empty statistics with a histogram covering depths `0..=queue_slots`.
    pub fn new(queue_slots: usize) -> Self {
        Self {
            total_processed: 0,
            cancellations: 0,
            histogram: vec![0; queue_slots + 1],
            overflow: 0,
            missing_depth: 0,
        }
    }

    /// Cancellations as a percentage of processed events. `None` when
    /// nothing was processed.
    pub fn cancellation_percent(&self) -> Option<f64> {
        if self.total_processed == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        Some(self.cancellations as f64 * 100.0 / self.total_processed as f64)
    }

    fn record(&mut self, line: &LogLine) {
        match line {
            LogLine::Exec { .. } => self.total_processed += 1,
            LogLine::Recv {
                event, queue_depth, ..
            } => {
                if event.is_cancellation {
                    self.cancellations += 1;
                }
                match queue_depth.and_then(|d| usize::try_from(d).ok()) {
                    Some(depth) if depth < self.histogram.len() => self.histogram[depth] += 1,
                    Some(_) => self.overflow += 1,
                    None if queue_depth.is_some() => self.overflow += 1,
                    None => self.missing_depth += 1,
                }
            }
            _ => {}
        }
    }
}

/// Collects statistics from any buffered reader.
pub fn collect_stats<R: BufRead>(reader: R, queue_slots: usize) -> Result<TraceStats, TraceError> {
    let mut stats = TraceStats::new(queue_slots);
    for (index, raw) in lines(reader).enumerate() {
        let raw = raw?;
        let record = classify(&raw).map_err(|source| TraceError::Parse {
            line_number: index as u64 + 1,
            source,
        })?;
        stats.record(&record.line);
    }
    Ok(stats)
}

/// Opens `path` and collects its statistics.
pub fn stats_file(path: &Path, queue_slots: usize) -> Result<TraceStats, TraceError> {
    let file = File::open(path).map_err(|source| TraceError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let stats = collect_stats(BufReader::new(file), queue_slots)?;
    info!(
        path = %path.display(),
        processed = stats.total_processed,
        cancellations = stats.cancellations,
        "collected trace statistics"
    );
    Ok(stats)
}
