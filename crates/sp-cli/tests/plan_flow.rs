//! End-to-end integration tests for the planning flow.
//!
//! Drives the compiled binary through init → goal add → record → split →
//! deviations → health against a plan file in a temp directory.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn sp_binary() -> String {
    env!("CARGO_BIN_EXE_sp").to_string()
}

fn sp(temp: &Path, args: &[&str]) -> Output {
    Command::new(sp_binary())
        .env("HOME", temp)
        .env("SP_PLAN_PATH", temp.join("plan.json"))
        .args(args)
        .output()
        .expect("failed to run sp")
}

fn assert_ok(output: &Output) {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Full flow: a goal, a missed month, and the health readout.
#[test]
fn test_plan_flow_end_to_end() {
    let temp = TempDir::new().unwrap();
    assert_ok(&sp(temp.path(), &["init"]));

    // 120000 over 12 installments starting January.
    assert_ok(&sp(
        temp.path(),
        &[
            "goal",
            "add",
            "--name",
            "House deposit",
            "--target",
            "120000",
            "--deadline",
            "2025-12-27",
            "--start",
            "2025-01-01",
            "--priority",
            "8",
            "--monthly",
            "10000",
        ],
    ));

    // January contribution falls short: 4000 of 10000.
    assert_ok(&sp(
        temp.path(),
        &[
            "record",
            "--amount",
            "4000",
            "--kind",
            "allocation",
            "--goal",
            "House deposit",
            "--date",
            "2025-01-15",
        ],
    ));

    let deviations = sp(
        temp.path(),
        &[
            "deviations",
            "--year",
            "2025",
            "--month",
            "1",
            "--json",
        ],
    );
    assert_ok(&deviations);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&deviations)).unwrap();
    assert_eq!(parsed[0]["kind"], "under_contribution");
    assert_eq!(parsed[0]["shortfall"], 6000.0);

    let health = sp(
        temp.path(),
        &["health", "--today", "2025-01-20", "--json"],
    );
    assert_ok(&health);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&health)).unwrap();
    assert_eq!(parsed["deviation_count"], 1);
    // The only started goal is behind this month.
    assert_eq!(parsed["status"], "critical");
}

/// The worked split example: scenario tax and fixed expenses, then
/// proportional shares recomputed against the remaining pool.
#[test]
fn test_split_with_scenario() {
    let temp = TempDir::new().unwrap();
    assert_ok(&sp(temp.path(), &["init"]));

    assert_ok(&sp(
        temp.path(),
        &[
            "scenario",
            "--name",
            "expected",
            "--income",
            "100000",
            "--tax-rate",
            "10",
            "--fixed-expenses",
            "20000",
        ],
    ));

    for (name, priority) in [("Goal A", "8"), ("Goal B", "2")] {
        assert_ok(&sp(
            temp.path(),
            &[
                "goal",
                "add",
                "--name",
                name,
                "--target",
                "50000",
                "--deadline",
                "2026-06-01",
                "--start",
                "2025-01-01",
                "--priority",
                priority,
            ],
        ));
    }

    let split = sp(
        temp.path(),
        &[
            "split",
            "--income",
            "100000",
            "--scenario",
            "expected",
            "--today",
            "2025-06-01",
            "--json",
        ],
    );
    assert_ok(&split);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&split)).unwrap();

    // 100000 * 0.9 - 20000
    assert_eq!(parsed["net_income"], 70000.0);
    // 70000 * (8/10) * 0.5, then 42000 * (2/2) * 0.5
    assert_eq!(parsed["allocations"][0]["amount"], 28000.0);
    assert_eq!(parsed["allocations"][1]["amount"], 21000.0);
    let total = parsed["total_allocated"].as_f64().unwrap();
    let free = parsed["free_spend"].as_f64().unwrap();
    assert!((total + free - 70000.0).abs() < 1e-9);
}

/// Commands that need a plan refuse to run before `sp init`.
#[test]
fn test_missing_plan_is_a_clear_error() {
    let temp = TempDir::new().unwrap();
    let output = sp(temp.path(), &["goal", "list"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("sp init"));
}

/// A paused goal drops out of the split while its flex event is active.
#[test]
fn test_flex_event_pauses_goal_in_split() {
    let temp = TempDir::new().unwrap();
    assert_ok(&sp(temp.path(), &["init"]));

    for name in ["Goal A", "Goal B"] {
        assert_ok(&sp(
            temp.path(),
            &[
                "goal",
                "add",
                "--name",
                name,
                "--target",
                "50000",
                "--deadline",
                "2026-06-01",
                "--start",
                "2025-01-01",
                "--monthly",
                "2000",
            ],
        ));
    }

    assert_ok(&sp(
        temp.path(),
        &[
            "flex",
            "--date",
            "2025-03-01",
            "--reason",
            "car repair",
            "--amount",
            "900",
            "--affects",
            "Goal B",
            "--pause",
            "Goal B",
            "--resume",
            "2025-05-01",
        ],
    ));

    let active = sp(
        temp.path(),
        &[
            "split", "--income", "10000", "--today", "2025-03-15", "--json",
        ],
    );
    assert_ok(&active);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&active)).unwrap();
    let names: Vec<&str> = parsed["allocations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["goal_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Goal A"]);

    // After the resume date the pause no longer applies.
    let resumed = sp(
        temp.path(),
        &[
            "split", "--income", "10000", "--today", "2025-05-02", "--json",
        ],
    );
    assert_ok(&resumed);
    let parsed: serde_json::Value = serde_json::from_str(&stdout(&resumed)).unwrap();
    assert_eq!(parsed["allocations"].as_array().unwrap().len(), 2);
}
