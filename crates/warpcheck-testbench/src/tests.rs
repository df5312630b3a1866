use super::*;
use test_case::test_case;

fn vectors(config: VectorConfig) -> Vec<Vector> {
    Generator::new(config).expect("valid config").collect()
}

fn patterned(pattern: &str) -> VectorConfig {
    VectorConfig {
        pattern: Some(pattern.parse().expect("valid pattern")),
        seed: 7,
        ..VectorConfig::default()
    }
}

#[test_case("", 0; "empty")]
#[test_case("120", 3; "one of each")]
#[test_case("11 22\n00", 6; "whitespace ignored")]
fn pattern_parses(text: &str, len: usize) {
    let pattern: Pattern = text.parse().expect("valid");
    assert_eq!(pattern.len(), len);
}

#[test_case("13", 1, '3'; "digit out of range")]
#[test_case("1x", 1, 'x'; "letter")]
fn pattern_rejects(text: &str, position: usize, found: char) {
    let err = text.parse::<Pattern>().expect_err("invalid");
    assert_eq!(err, PatternError { position, found });
}

#[test]
fn vector_line_format() {
    assert_eq!(Vector::Enqueue(Timestamp::new(117)).to_string(), "1, 0, 117");
    assert_eq!(Vector::Dequeue(Timestamp::new(4)).to_string(), "0, 1, 4");
    assert_eq!(Vector::Nop.to_string(), "0, 0, 0");
}

#[test]
fn dequeue_from_empty_is_skipped() {
    let mut generator = Generator::new(patterned("2201")).expect("valid");
    let out: Vec<_> = generator.by_ref().collect();
    assert_eq!(out.len(), 2);
    assert_eq!(out[0], Vector::Nop);
    assert!(matches!(out[1], Vector::Enqueue(_)));

    let summary = generator.summary();
    assert_eq!(summary.operations, 4);
    assert_eq!(summary.skipped, 2);
    assert_eq!(generator.depth(), 1);
}

#[test]
fn enqueue_past_capacity_is_skipped() {
    let config = VectorConfig {
        capacity: 3,
        ..patterned("11111")
    };
    let mut generator = Generator::new(config).expect("valid");
    assert_eq!(generator.by_ref().count(), 3);
    assert_eq!(generator.depth(), 3);
    assert_eq!(generator.summary().skipped, 2);
}

#[test]
fn dequeues_drain_in_descending_order() {
    let out = vectors(patterned("111112222"));
    let mut enqueued: Vec<Timestamp> = out
        .iter()
        .filter_map(|v| match v {
            Vector::Enqueue(value) => Some(*value),
            _ => None,
        })
        .collect();
    let dequeued: Vec<Timestamp> = out
        .iter()
        .filter_map(|v| match v {
            Vector::Dequeue(value) => Some(*value),
            _ => None,
        })
        .collect();

    enqueued.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(dequeued, enqueued[..4]);
}

#[test]
fn same_seed_same_vectors() {
    let config = VectorConfig {
        iterations: 500,
        seed: 42,
        ..VectorConfig::default()
    };
    assert_eq!(vectors(config.clone()), vectors(config));
}

#[test]
fn zero_max_value_rejected() {
    let config = VectorConfig {
        max_value: 0,
        ..VectorConfig::default()
    };
    assert!(matches!(
        Generator::new(config),
        Err(TestbenchError::ZeroMaxValue)
    ));
}

#[test]
fn writes_one_line_per_vector() {
    let mut buf = Vec::new();
    let summary = write_vectors(patterned("1020"), &mut buf).expect("written");
    let text = String::from_utf8(buf).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("1, 0, "));
    assert_eq!(lines[1], "0, 0, 0");
    assert_eq!(lines[2], lines[0].replacen("1, 0, ", "0, 1, ", 1));
    assert_eq!(lines[3], "0, 0, 0");
    assert_eq!(summary.operations, 4);
}

#[test]
fn writes_to_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("prio_q_test_data.dat");
    let file = std::fs::File::create(&path).expect("create");
    let config = VectorConfig {
        iterations: 1000,
        seed: 3,
        ..VectorConfig::default()
    };

    let summary = write_vectors(config, file).expect("written");
    let written = std::fs::read_to_string(&path).expect("read");
    let lines = written.lines().count() as u64;

    assert_eq!(summary.operations, 1000);
    assert_eq!(lines, summary.enqueued + summary.dequeued + summary.nops);
    assert_eq!(lines + summary.skipped, 1000);
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn expected_dequeue_is_model_max(seed in any::<u64>(), iterations in 0u64..2000) {
            let config = VectorConfig {
                iterations,
                capacity: 8,
                max_value: 16,
                seed,
                pattern: None,
            };
            let mut shadow: Vec<Timestamp> = Vec::new();

            for vector in Generator::new(config).expect("valid") {
                match vector {
                    Vector::Enqueue(value) => {
                        prop_assert!(value.as_u64() < 16);
                        shadow.push(value);
                        prop_assert!(shadow.len() <= 8);
                    }
                    Vector::Dequeue(expected) => {
                        let max = shadow.iter().copied().max().expect("model not empty");
                        prop_assert_eq!(expected, max);
                        let at = shadow.iter().position(|v| *v == max).expect("present");
                        shadow.swap_remove(at);
                    }
                    Vector::Nop => {}
                }
            }
        }
    }
}
