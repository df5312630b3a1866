//! Line classifier.
//!
//! Turns one raw simulator log line into a typed [`Record`]. The grammar is a
//! short ordered list of matchers; the first one whose pattern matches
//! builds the [`LogLine`], and a line no matcher accepts is
//! [`LogLine::Unrecognized`].
//!
//! Numeric fields in the simulator output are right-aligned, so every
//! numeric capture is `[\s\d]+` and is trimmed before parsing.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use warpcheck_kernel::{BatchStats, LogLine};
use warpcheck_types::{CoreId, Cycle, Event, LpId, Timestamp};

static CYCLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s+(\d+):").expect("cycle pattern is valid"));

static SEND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\d]+: (\w+?): ([\s\d]+)->([\s\d]+) to core ([\s\d]+)( \(C\)|) GVT: ([\s\d]+)")
        .expect("send pattern is valid")
});

static EXEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\d]+: exec: ([\s\d]+)->([\s\d]+) at core ([\s\d]+)(\(C\)|)")
        .expect("exec pattern is valid")
});

static RECV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s\d]+: (\w+?): ([\s\d]+)->([\s\d]+) from core ([\s\d]+)(\(C\)|)")
        .expect("recv pattern is valid")
});

static NULL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"null from core ([\s\d]+)").expect("null pattern is valid"));

static BATCH_STATS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"stall: ([\s\d]+), mem_rq: ([\s\d]+), memld: ([\s\d]+), memst: ([\s\d]+), total: ([\s\d]+)",
    )
    .expect("batch stats pattern is valid")
});

static QUEUE_DEPTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Q:(\d+)").expect("queue depth pattern is valid"));

/// A classified line: the event it carries and the cycle marker, if the
/// line had one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub cycle: Option<Cycle>,
    pub line: LogLine,
}

/// A line matched a shape but one of its fields is not a valid number.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} line has invalid {field} {text:?}")]
pub struct ClassifyError {
    pub kind: &'static str,
    pub field: &'static str,
    pub text: String,
}

type Build = fn(&Captures<'_>, &str) -> Result<LogLine, ClassifyError>;

struct Matcher {
    pattern: &'static LazyLock<Regex>,
    build: Build,
}

/// Tried in order; the first match wins.
static MATCHERS: [Matcher; 4] = [
    Matcher {
        pattern: &SEND,
        build: build_send,
    },
    Matcher {
        pattern: &EXEC,
        build: build_exec,
    },
    Matcher {
        pattern: &RECV,
        build: build_recv,
    },
    Matcher {
        pattern: &NULL,
        build: build_null,
    },
];

/// Classifies one raw log line.
pub fn classify(raw: &str) -> Result<Record, ClassifyError> {
    // A cycle marker too large to count is dropped; the line itself still
    // classifies.
    let cycle = CYCLE
        .captures(raw)
        .and_then(|caps| caps[1].parse().ok())
        .map(Cycle::new);

    for matcher in &MATCHERS {
        if let Some(caps) = matcher.pattern.captures(raw) {
            let line = (matcher.build)(&caps, raw)?;
            return Ok(Record { cycle, line });
        }
    }

    Ok(Record {
        cycle,
        line: LogLine::Unrecognized,
    })
}

// ============================================================================
// Builders
// ============================================================================

fn build_send(caps: &Captures<'_>, _raw: &str) -> Result<LogLine, ClassifyError> {
    let event = event(caps, "send", [2, 3, 4, 5])?;
    let gvt = Timestamp::new(field(caps, 6, "send", "gvt")?);
    Ok(LogLine::Send { event, gvt })
}

fn build_exec(caps: &Captures<'_>, _raw: &str) -> Result<LogLine, ClassifyError> {
    let event = event(caps, "exec", [1, 2, 3, 4])?;
    Ok(LogLine::Exec { event })
}

fn build_recv(caps: &Captures<'_>, raw: &str) -> Result<LogLine, ClassifyError> {
    let event = event(caps, "recv", [2, 3, 4, 5])?;
    let end_of_batch = batch_stats(raw, "recv")?;
    let queue_depth = match QUEUE_DEPTH.captures(raw) {
        Some(q) => Some(field(&q, 1, "recv", "queue depth")?),
        None => None,
    };
    Ok(LogLine::Recv {
        event,
        end_of_batch,
        queue_depth,
    })
}

fn build_null(caps: &Captures<'_>, raw: &str) -> Result<LogLine, ClassifyError> {
    let core = CoreId::new(field(caps, 1, "null", "core")?);
    let end_of_batch = batch_stats(raw, "null")?;
    Ok(LogLine::Null { core, end_of_batch })
}

/// Builds an event from the capture groups `[lp, timestamp, core, flag]`.
fn event(
    caps: &Captures<'_>,
    kind: &'static str,
    groups: [usize; 4],
) -> Result<Event, ClassifyError> {
    let [lp, time, core, flag] = groups;
    Ok(Event {
        target_lp: LpId::new(field(caps, lp, kind, "lp")?),
        timestamp: Timestamp::new(field(caps, time, kind, "timestamp")?),
        core: CoreId::new(field(caps, core, kind, "core")?),
        is_cancellation: caps.get(flag).is_some_and(|m| m.as_str().contains('C')),
    })
}

fn batch_stats(raw: &str, kind: &'static str) -> Result<Option<BatchStats>, ClassifyError> {
    let Some(caps) = BATCH_STATS.captures(raw) else {
        return Ok(None);
    };
    Ok(Some(BatchStats {
        stall: field(&caps, 1, kind, "stall")?,
        mem_rq: field(&caps, 2, kind, "mem_rq")?,
        memld: field(&caps, 3, kind, "memld")?,
        memst: field(&caps, 4, kind, "memst")?,
        total: field(&caps, 5, kind, "total")?,
    }))
}

fn field<T: FromStr>(
    caps: &Captures<'_>,
    group: usize,
    kind: &'static str,
    name: &'static str,
) -> Result<T, ClassifyError> {
    let text = caps.get(group).map_or("", |m| m.as_str());
    text.trim().parse().map_err(|_| ClassifyError {
        kind,
        field: name,
        text: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn line(raw: &str) -> LogLine {
        classify(raw).expect("classifies").line
    }

    #[test_case("  120: send:  3->  45 to core  2 GVT:  40", 3, 45, 2, false, 40; "padded")]
    #[test_case("7: send: 1->10 to core 0 (C) GVT: 0", 1, 10, 0, true, 0; "cancellation")]
    #[test_case(
        "# 99: 12: dispatch: 4->8 to core 15 GVT: 8", 4, 8, 15, false, 8;
        "with cycle marker"
    )]
    fn send_lines(raw: &str, lp: u32, time: u64, core: u32, cancelled: bool, gvt: u64) {
        let expected = Event {
            target_lp: LpId::new(lp),
            timestamp: Timestamp::new(time),
            core: CoreId::new(core),
            is_cancellation: cancelled,
        };
        assert_eq!(
            line(raw),
            LogLine::Send {
                event: expected,
                gvt: Timestamp::new(gvt)
            }
        );
    }

    #[test_case("  33: exec:  5->  17 at core  4", false; "regular")]
    #[test_case("33: exec: 5->17 at core 4(C)", true; "cancellation")]
    fn exec_lines(raw: &str, cancelled: bool) {
        let LogLine::Exec { event } = line(raw) else {
            panic!("expected exec");
        };
        assert_eq!(event.target_lp, LpId::new(5));
        assert_eq!(event.timestamp, Timestamp::new(17));
        assert_eq!(event.core, CoreId::new(4));
        assert_eq!(event.is_cancellation, cancelled);
    }

    #[test]
    fn recv_without_stats_is_mid_batch() {
        let LogLine::Recv {
            event,
            end_of_batch,
            queue_depth,
        } = line("  40: recv: 2->12 from core 1 Q:7")
        else {
            panic!("expected recv");
        };
        assert_eq!(event.timestamp, Timestamp::new(12));
        assert!(!event.is_cancellation);
        assert_eq!(end_of_batch, None);
        assert_eq!(queue_depth, Some(7));
    }

    #[test]
    fn recv_with_stats_closes_batch() {
        let raw = concat!(
            "41: recv: 2->13 from core 1(C) ",
            "stall:  3, mem_rq: 4, memld: 5, memst: 6, total: 18"
        );
        let LogLine::Recv {
            event,
            end_of_batch,
            queue_depth,
        } = line(raw)
        else {
            panic!("expected recv");
        };
        assert!(event.is_cancellation);
        assert_eq!(queue_depth, None);
        assert_eq!(
            end_of_batch,
            Some(BatchStats {
                stall: 3,
                mem_rq: 4,
                memld: 5,
                memst: 6,
                total: 18
            })
        );
    }

    #[test_case("null from core 6", false; "bare")]
    #[test_case(
        "  50: null from core  6 stall: 0, mem_rq: 0, memld: 0, memst: 0, total: 2", true;
        "closing"
    )]
    fn null_lines(raw: &str, closes: bool) {
        let LogLine::Null { core, end_of_batch } = line(raw) else {
            panic!("expected null");
        };
        assert_eq!(core, CoreId::new(6));
        assert_eq!(end_of_batch.is_some(), closes);
    }

    #[test_case(""; "empty")]
    #[test_case("Simulation started"; "banner")]
    #[test_case("GVT advanced to 40"; "gvt note")]
    fn unrecognized_lines(raw: &str) {
        assert_eq!(line(raw), LogLine::Unrecognized);
    }

    #[test]
    fn cycle_marker_alone_is_recorded() {
        let record = classify("#   1024:").expect("classifies");
        assert_eq!(record.cycle, Some(Cycle::new(1024)));
        assert_eq!(record.line, LogLine::Unrecognized);
    }

    #[test]
    fn overflowing_cycle_marker_is_dropped() {
        let record = classify("# 99999999999999999999999: 3: exec: 1->10 at core 0")
            .expect("cycle overflow is not fatal");
        assert_eq!(record.cycle, None);
        let LogLine::Exec { event } = record.line else {
            panic!("expected exec");
        };
        assert_eq!(event.timestamp, Timestamp::new(10));
    }

    #[test]
    fn oversized_field_is_an_error() {
        let err = classify("1: exec: 99999999999->1 at core 0").expect_err("lp overflows u32");
        assert_eq!(err.kind, "exec");
        assert_eq!(err.field, "lp");
    }
}
