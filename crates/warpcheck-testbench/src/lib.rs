//! # warpcheck-testbench: Event queue test vectors
//!
//! Generates stimulus for the hardware priority queue testbench. Each line
//! of the output drives one clock of the queue's enqueue/dequeue ports and,
//! for dequeues, carries the value a correct queue must produce. Expected
//! values come from the same [`PriorityQueue`] the trace validator uses to
//! predict dispatch order.
//!
//! ```text
//! 1, 0, 117    enqueue 117
//! 0, 1, 117    dequeue, expect 117
//! 0, 0, 0      idle
//! ```

use std::fmt::{self, Display};
use std::io::{self, Write};
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info};
use warpcheck_kernel::PriorityQueue;
use warpcheck_types::Timestamp;

#[cfg(test)]
mod tests;

/// Entries the hardware queue can hold.
pub const DEFAULT_CAPACITY: usize = 63;

/// Enqueued values are drawn from `0..DEFAULT_MAX_VALUE`.
pub const DEFAULT_MAX_VALUE: u64 = 255;

/// Random operations drawn when no pattern is given.
pub const DEFAULT_ITERATIONS: u64 = 1_000_000;

// ============================================================================
// Operations
// ============================================================================

/// One requested queue operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Op {
    Nop,
    Enqueue,
    Dequeue,
}

impl Op {
    /// Pattern digit: `0` no-op, `1` enqueue, `2` dequeue.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(Op::Nop),
            1 => Some(Op::Enqueue),
            2 => Some(Op::Dequeue),
            _ => None,
        }
    }
}

/// A fixed sequence of operations, written as a string of digits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pattern(Vec<Op>);

impl Pattern {
    pub fn ops(&self) -> &[Op] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .enumerate()
            .filter(|(_, c)| !c.is_whitespace())
            .map(|(position, c)| {
                c.to_digit(10)
                    .and_then(|d| u8::try_from(d).ok())
                    .and_then(Op::from_digit)
                    .ok_or(PatternError { position, found: c })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Pattern)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid pattern character {found:?} at position {position}: expected 0, 1 or 2")]
pub struct PatternError {
    pub position: usize,
    pub found: char,
}

/// One emitted testbench line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Vector {
    Enqueue(Timestamp),
    /// Dequeue, with the value the queue must return.
    Dequeue(Timestamp),
    Nop,
}

impl Display for Vector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vector::Enqueue(value) => write!(f, "1, 0, {value}"),
            Vector::Dequeue(expected) => write!(f, "0, 1, {expected}"),
            Vector::Nop => write!(f, "0, 0, 0"),
        }
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Generator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorConfig {
    /// Random operations to draw; ignored when a pattern is set.
    pub iterations: u64,
    pub capacity: usize,
    pub max_value: u64,
    pub seed: u64,
    pub pattern: Option<Pattern>,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            capacity: DEFAULT_CAPACITY,
            max_value: DEFAULT_MAX_VALUE,
            seed: 0,
            pattern: None,
        }
    }
}

/// Counts for one generated run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VectorSummary {
    pub operations: u64,
    pub enqueued: u64,
    pub dequeued: u64,
    pub nops: u64,
    /// Enqueues into a full model or dequeues from an empty one. These emit
    /// no line.
    pub skipped: u64,
}

#[derive(thiserror::Error, Debug)]
pub enum TestbenchError {
    #[error("max_value must be greater than zero")]
    ZeroMaxValue,

    #[error("capacity must be greater than zero")]
    ZeroCapacity,

    #[error("failed to write vectors")]
    Io(#[from] io::Error),
}

enum Ops {
    Pattern(std::vec::IntoIter<Op>),
    Random { remaining: u64 },
}

/// Yields test vectors while keeping a software model of the queue.
pub struct Generator {
    model: PriorityQueue,
    rng: StdRng,
    ops: Ops,
    capacity: usize,
    max_value: u64,
    summary: VectorSummary,
}

impl Generator {
    pub fn new(config: VectorConfig) -> Result<Self, TestbenchError> {
        if config.max_value == 0 {
            return Err(TestbenchError::ZeroMaxValue);
        }
        if config.capacity == 0 {
            return Err(TestbenchError::ZeroCapacity);
        }

        let ops = match config.pattern {
            Some(pattern) => Ops::Pattern(pattern.0.into_iter()),
            None => Ops::Random {
                remaining: config.iterations,
            },
        };

        Ok(Self {
            model: PriorityQueue::with_capacity(config.capacity),
            rng: StdRng::seed_from_u64(config.seed),
            ops,
            capacity: config.capacity,
            max_value: config.max_value,
            summary: VectorSummary::default(),
        })
    }

    /// Counts so far.
    pub fn summary(&self) -> VectorSummary {
        self.summary
    }

    /// Entries currently held by the model.
    pub fn depth(&self) -> usize {
        self.model.len()
    }

    fn next_op(&mut self) -> Option<Op> {
        match &mut self.ops {
            Ops::Pattern(ops) => ops.next(),
            Ops::Random { remaining } => {
                if *remaining == 0 {
                    return None;
                }
                *remaining -= 1;
                Op::from_digit(self.rng.gen_range(0..3))
            }
        }
    }

    /// Applies `op` to the model. `None` when the op is skipped.
    fn apply(&mut self, op: Op) -> Option<Vector> {
        match op {
            Op::Nop => {
                self.summary.nops += 1;
                Some(Vector::Nop)
            }
            Op::Enqueue if self.model.len() < self.capacity => {
                let value = Timestamp::new(self.rng.gen_range(0..self.max_value));
                self.model.push(value);
                self.summary.enqueued += 1;
                Some(Vector::Enqueue(value))
            }
            Op::Dequeue => match self.model.pop_max() {
                Ok(expected) => {
                    self.summary.dequeued += 1;
                    Some(Vector::Dequeue(expected))
                }
                Err(_) => {
                    self.summary.skipped += 1;
                    None
                }
            },
            Op::Enqueue => {
                self.summary.skipped += 1;
                None
            }
        }
    }
}

impl Iterator for Generator {
    type Item = Vector;

    fn next(&mut self) -> Option<Vector> {
        loop {
            let op = self.next_op()?;
            self.summary.operations += 1;
            if let Some(vector) = self.apply(op) {
                return Some(vector);
            }
        }
    }
}

/// Generates vectors for `config` and writes one per line to `out`.
pub fn write_vectors<W: Write>(
    config: VectorConfig,
    out: W,
) -> Result<VectorSummary, TestbenchError> {
    let mut out = io::BufWriter::new(out);
    let seed = config.seed;
    let mut generator = Generator::new(config)?;
    debug!(seed, "generating test vectors");

    for vector in generator.by_ref() {
        writeln!(out, "{vector}")?;
    }
    out.flush()?;

    let summary = generator.summary();
    info!(
        operations = summary.operations,
        enqueued = summary.enqueued,
        dequeued = summary.dequeued,
        skipped = summary.skipped,
        "test vectors written"
    );
    Ok(summary)
}
