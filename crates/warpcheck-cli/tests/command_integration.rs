//! Integration tests for CLI commands.
//!
//! Each test runs the binary against files in a temporary project directory
//! (`-C`), so no warpcheck.toml from the working tree leaks in.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CONSISTENT_LOG: &str = "\
#      1:
    1: recv:   1->  10 from core  0 Q:1
    2: send:   1->  10 to core  0 GVT:   0
#      2:
    3: exec:   1->  10 at core  0
    4: recv:   1->  20 from core  0(C) Q:1 stall:  0, mem_rq:  0, memld:  0, memst:  0, total:  3
";

const EMPTY_QUEUE_LOG: &str = "\
#      7:
    1: send:   1->  10 to core  0 GVT:   0
";

const FAR_CORE_LOG: &str = "\
    1: recv:   1->  10 from core  0 Q:1
    2: send:   1->  10 to core 4000000000 GVT:   0
";

fn warpcheck(project: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("warpcheck").unwrap();
    cmd.arg("--no-color").arg("-C").arg(project.path());
    cmd
}

fn project_with_log(contents: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("sim.log"), contents).unwrap();
    temp
}

// ============================================================================
// check
// ============================================================================

#[test]
fn check_consistent_log_is_silent() {
    let temp = project_with_log(CONSISTENT_LOG);

    warpcheck(&temp)
        .arg("check")
        .arg(temp.path().join("sim.log"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn check_verbose_prints_summary() {
    let temp = project_with_log(CONSISTENT_LOG);

    warpcheck(&temp)
        .args(["--verbose", "check"])
        .arg(temp.path().join("sim.log"))
        .assert()
        .success()
        .stdout(predicate::str::contains("6 lines consistent"))
        .stdout(predicate::str::contains("Batches closed"));
}

#[test]
fn check_verbose_logs_replay_to_stderr() {
    let temp = project_with_log(CONSISTENT_LOG);

    warpcheck(&temp)
        .env_remove("RUST_LOG")
        .args(["--verbose", "check", "--cores", "4"])
        .arg(temp.path().join("sim.log"))
        .assert()
        .success()
        .stderr(predicate::str::contains("checking trace"))
        .stderr(predicate::str::contains("trace consistent"));
}

#[test]
fn check_accepts_core_far_beyond_width() {
    let temp = project_with_log(FAR_CORE_LOG);

    warpcheck(&temp)
        .args(["check", "--cores", "2"])
        .arg(temp.path().join("sim.log"))
        .assert()
        .success();
}

#[test]
fn check_reports_violation() {
    let temp = project_with_log(EMPTY_QUEUE_LOG);

    warpcheck(&temp)
        .arg("check")
        .arg(temp.path().join("sim.log"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("dispatch_from_empty_queue"))
        .stderr(predicate::str::contains("Line: 2"))
        .stderr(predicate::str::contains("Cycle: 7"))
        .stderr(predicate::str::contains("send:   1->  10"));
}

#[test]
fn check_uses_configured_log_path() {
    let temp = project_with_log(EMPTY_QUEUE_LOG);
    fs::write(
        temp.path().join("warpcheck.toml"),
        "[trace]\nlog_path = \"sim.log\"\n",
    )
    .unwrap();

    warpcheck(&temp)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("dispatch_from_empty_queue"));
}

#[test]
fn check_missing_log_fails() {
    let temp = TempDir::new().unwrap();

    warpcheck(&temp)
        .arg("check")
        .arg(temp.path().join("absent.log"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot open trace"));
}

// ============================================================================
// stats
// ============================================================================

#[test]
fn stats_prints_counts_and_histogram() {
    let temp = project_with_log(CONSISTENT_LOG);

    warpcheck(&temp)
        .arg("stats")
        .arg(temp.path().join("sim.log"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Total processed = 1"))
        .stdout(predicate::str::contains("Cancellation messages = 1 (100.00%)"))
        .stdout(predicate::str::contains("1: 2"))
        .stdout(predicate::str::contains("62: 0"));
}

#[test]
fn stats_json_output() {
    let temp = project_with_log(CONSISTENT_LOG);

    warpcheck(&temp)
        .args(["stats", "--format", "json", "--queue-slots", "4"])
        .arg(temp.path().join("sim.log"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"total_processed\": 1"))
        .stdout(predicate::str::contains("\"overflow\": 0"));
}

#[test]
fn stats_rejects_unknown_format() {
    let temp = project_with_log(CONSISTENT_LOG);

    warpcheck(&temp)
        .args(["stats", "--format", "yaml"])
        .arg(temp.path().join("sim.log"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

// ============================================================================
// vectors
// ============================================================================

#[test]
fn vectors_follow_pattern() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("prio_q_test_data.dat");

    warpcheck(&temp)
        .args(["vectors", "--pattern", "1120", "--seed", "9", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 4 vectors"));

    let written = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("1, 0, "));
    assert!(lines[1].starts_with("1, 0, "));
    assert!(lines[2].starts_with("0, 1, "));
    assert_eq!(lines[3], "0, 0, 0");

    let value = |line: &str| line.rsplit(", ").next().unwrap().parse::<u64>().unwrap();
    assert_eq!(value(lines[2]), value(lines[0]).max(value(lines[1])));
}

#[test]
fn vectors_reject_bad_pattern() {
    let temp = TempDir::new().unwrap();

    warpcheck(&temp)
        .args(["vectors", "--pattern", "1a", "--output"])
        .arg(temp.path().join("out.dat"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid pattern character"));
}

#[test]
fn vectors_default_output_from_config() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("warpcheck.toml"),
        "[testbench]\noutput = \"vectors.dat\"\niterations = 50\n",
    )
    .unwrap();

    warpcheck(&temp)
        .args(["vectors", "--seed", "1"])
        .assert()
        .success();

    assert!(temp.path().join("vectors.dat").exists());
}

// ============================================================================
// config
// ============================================================================

#[test]
fn config_show_toml() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("warpcheck.toml"), "[validator]\ncores = 8\n").unwrap();

    warpcheck(&temp)
        .args(["config", "show", "--format", "toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[validator]"))
        .stdout(predicate::str::contains("cores = 8"));
}

#[test]
fn config_show_text_lists_source_files() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("warpcheck.local.toml"), "[stats]\nqueue_slots = 9\n").unwrap();

    warpcheck(&temp)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("local"))
        .stdout(predicate::str::contains("warpcheck.local.toml"))
        .stdout(predicate::str::contains("Queue slots: 9"));
}

#[test]
fn config_show_json() {
    let temp = TempDir::new().unwrap();

    warpcheck(&temp)
        .args(["config", "show", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"queue_slots\": 62"));
}

#[test]
fn config_show_rejects_invalid_values() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("warpcheck.toml"), "[stats]\nqueue_slots = 0\n").unwrap();

    warpcheck(&temp)
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be greater than zero"));
}
