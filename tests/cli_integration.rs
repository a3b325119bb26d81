//! CLI integration tests for wbs
//!
//! These tests drive the binary end to end in temporary projects. Every run
//! pins `--today` through `WBS_TODAY` so derived statuses are reproducible.

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A Wednesday
const TODAY: &str = "2024-01-10";

/// Get a command instance for the wbs binary, isolated from user config
fn wbs_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("wbs"));
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join(".config"))
        .env("WBS_TODAY", TODAY)
        .env_remove("WBS_PROJECT")
        .env_remove("RUST_LOG");
    cmd
}

/// Create a temporary directory and initialize a wbs project
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    wbs_cmd(dir.path()).arg("init").assert().success();
    dir
}

/// Runs a command with `--format json` and parses stdout
fn json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = wbs_cmd(dir)
        .args(args)
        .args(["--format", "json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    serde_json::from_str(stdout.trim()).unwrap()
}

/// Adds a task and returns its ID
fn add(dir: &Path, args: &[&str]) -> String {
    let mut full = vec!["add"];
    full.extend_from_slice(args);
    json(dir, &full)["id"].as_str().unwrap().to_string()
}

fn show(dir: &Path, id: &str) -> serde_json::Value {
    json(dir, &["show", id])
}

/// Phase (parent) with Design (01-01..01-12, 50%) and Build (01-15..01-26)
fn setup_phase(dir: &Path) -> (String, String, String) {
    let phase = add(dir, &["Phase", "--start", "2024-01-01", "--end", "2024-01-01"]);
    let design = add(
        dir,
        &[
            "Design", "--parent", &phase, "--start", "2024-01-01", "--end", "2024-01-12",
            "--progress", "50", "--assignee", "kim",
        ],
    );
    let build = add(
        dir,
        &[
            "Build", "--parent", &phase, "--start", "2024-01-15", "--end", "2024-01-26",
            "--assignee", "kim",
        ],
    );
    (phase, design, build)
}

// =============================================================================
// Initialization Tests
// =============================================================================

#[test]
fn test_init_creates_structure() {
    let dir = TempDir::new().unwrap();

    wbs_cmd(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized wbs project"));

    assert!(dir.path().join(".wbs").is_dir());
    assert!(dir.path().join(".wbs/config.toml").is_file());
    assert!(dir.path().join(".wbs/.gitignore").is_file());
}

#[test]
fn test_init_is_idempotent() {
    let dir = TempDir::new().unwrap();

    wbs_cmd(dir.path()).arg("init").assert().success();
    wbs_cmd(dir.path()).arg("init").assert().success();
}

#[test]
fn test_commands_outside_project_fail() {
    let dir = TempDir::new().unwrap();

    wbs_cmd(dir.path())
        .arg("tree")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not in a wbs project"));
}

// =============================================================================
// Task Tests
// =============================================================================

#[test]
fn test_add_computes_working_days() {
    let dir = setup_project();

    let id = add(dir.path(), &["Two weeks", "--start", "2024-01-01", "--end", "2024-01-14"]);
    let task = &show(dir.path(), &id)["task"];

    assert!(id.starts_with("t-"));
    assert_eq!(task["working_days"], 10);
    assert_eq!(task["project_id"], "default");
    assert_eq!(task["status"], "Start Delayed");
}

#[test]
fn test_add_rejects_reversed_dates() {
    let dir = setup_project();

    wbs_cmd(dir.path())
        .args(["add", "Backwards", "--start", "2024-01-10", "--end", "2024-01-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("after end date"));
}

#[test]
fn test_add_rejects_unknown_parent() {
    let dir = setup_project();

    wbs_cmd(dir.path())
        .args(["add", "Orphan", "--parent", "t-missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found"));
}

#[test]
fn test_parent_rolls_up_children() {
    let dir = setup_project();
    let (phase, design, build) = setup_phase(dir.path());

    let parent = &show(dir.path(), &phase)["task"];
    assert_eq!(parent["start_date"], "2024-01-01");
    assert_eq!(parent["end_date"], "2024-01-26");
    assert_eq!(parent["working_days"], 20);
    assert_eq!(parent["progress"], 25);
    assert_eq!(parent["status"], "In Progress");

    assert_eq!(show(dir.path(), &design)["task"]["status"], "Start Delayed");
    assert_eq!(show(dir.path(), &build)["task"]["status"], "To Do");
}

#[test]
fn test_tree_indents_children() {
    let dir = setup_project();
    setup_phase(dir.path());

    wbs_cmd(dir.path())
        .arg("tree")
        .assert()
        .success()
        .stdout(predicate::str::contains("  Design"))
        .stdout(predicate::str::contains("  Build"));

    let rows = json(dir.path(), &["tree"]);
    let depths: Vec<u64> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["depth"].as_u64().unwrap())
        .collect();
    assert_eq!(depths, vec![0, 1, 1]);
}

#[test]
fn test_start_and_finish_drive_status() {
    let dir = setup_project();
    let (phase, design, build) = setup_phase(dir.path());

    let started = json(dir.path(), &["start", &design]);
    assert_eq!(started["status"], "In Progress");
    assert_eq!(started["actual_start_date"], TODAY);
    assert_eq!(started["progress"], 50);

    json(dir.path(), &["finish", &design]);
    json(dir.path(), &["finish", &build]);

    let parent = &show(dir.path(), &phase)["task"];
    assert_eq!(parent["status"], "Done");
    assert_eq!(parent["progress"], 100);

    let reset = json(dir.path(), &["reset", &build]);
    assert_eq!(reset["status"], "To Do");
    assert_eq!(reset["progress"], 0);
    assert_eq!(show(dir.path(), &phase)["task"]["progress"], 50);
}

#[test]
fn test_parent_schedule_cannot_be_edited() {
    let dir = setup_project();
    let (phase, _, _) = setup_phase(dir.path());

    wbs_cmd(dir.path())
        .args(["edit", &phase, "--end", "2024-03-01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has subtasks"));

    wbs_cmd(dir.path())
        .args(["start", &phase])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has subtasks"));
}

#[test]
fn test_edit_leaf_reaggregates_parent() {
    let dir = setup_project();
    let (phase, _, build) = setup_phase(dir.path());

    let edited = json(dir.path(), &["edit", &build, "--end", "2024-02-02", "--title", "Build v2"]);
    assert_eq!(edited["title"], "Build v2");
    assert_eq!(edited["working_days"], 15);

    assert_eq!(show(dir.path(), &phase)["task"]["end_date"], "2024-02-02");
}

#[test]
fn test_edit_actual_dates_drives_status() {
    let dir = setup_project();
    let (phase, design, build) = setup_phase(dir.path());

    // 16 working days since 2023-12-20 against a 10-day plan
    let late = json(dir.path(), &["edit", &build, "--actual-start", "2023-12-20"]);
    assert_eq!(late["actual_start_date"], "2023-12-20");
    assert_eq!(late["status"], "End Delayed");

    let done = json(dir.path(), &["edit", &build, "--actual-end", "2024-01-09"]);
    assert_eq!(done["status"], "Done");

    wbs_cmd(dir.path())
        .args(["edit", &build, "--actual-end", "2023-12-19"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("before actual start"));

    wbs_cmd(dir.path())
        .args(["edit", &design, "--actual-end", "2024-01-09"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs an actual start"));

    wbs_cmd(dir.path())
        .args(["edit", &phase, "--actual-start", "2024-01-02"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has subtasks"));

    let cleared = json(
        dir.path(),
        &["edit", &build, "--actual-start", "none", "--actual-end", "none"],
    );
    assert!(cleared.get("actual_start_date").is_none());
    assert_eq!(cleared["status"], "To Do");
}

#[test]
fn test_hold_and_release() {
    let dir = setup_project();
    let (phase, design, _) = setup_phase(dir.path());

    let held = json(dir.path(), &["hold", &design, "blocked"]);
    assert_eq!(held["status"], "Blocked");
    assert_eq!(held["hold"], "Blocked");

    // Held status survives a full recalculation
    wbs_cmd(dir.path()).arg("recalc").assert().success();
    assert_eq!(show(dir.path(), &design)["task"]["status"], "Blocked");
    assert_eq!(show(dir.path(), &phase)["task"]["status"], "In Progress");

    let released = json(dir.path(), &["release", &design]);
    assert_eq!(released["status"], "Start Delayed");
}

#[test]
fn test_delete_removes_subtree() {
    let dir = setup_project();
    let (phase, design, _) = setup_phase(dir.path());
    let other = add(dir.path(), &["Other"]);

    let result = json(dir.path(), &["delete", &phase]);
    assert_eq!(result["removed"].as_array().unwrap().len(), 3);

    wbs_cmd(dir.path())
        .args(["show", &design])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Task not found"));
    assert_eq!(show(dir.path(), &other)["task"]["title"], "Other");
}

// =============================================================================
// Move Tests
// =============================================================================

#[test]
fn test_move_outdents_to_root() {
    let dir = setup_project();
    let (phase, design, build) = setup_phase(dir.path());

    let moved = json(dir.path(), &["move", &build, "--after", &design, "--levels", "-1"]);
    assert_eq!(moved["moved"], true);
    assert!(moved["parent"].is_null());

    let shown = show(dir.path(), &build);
    assert_eq!(shown["depth"], 0);
    assert_eq!(show(dir.path(), &phase)["task"]["end_date"], "2024-01-12");
}

#[test]
fn test_move_indents_under_previous_row() {
    let dir = setup_project();
    let (_, design, build) = setup_phase(dir.path());

    let moved = json(dir.path(), &["move", &build, "--after", &design, "--dx", "30"]);
    assert_eq!(moved["parent"], design.as_str());

    let shown = show(dir.path(), &build);
    assert_eq!(shown["depth"], 2);
    assert_eq!(show(dir.path(), &design)["task"]["end_date"], "2024-01-26");
}

#[test]
fn test_move_below_own_subtree_is_ignored() {
    let dir = setup_project();
    let (phase, design, _) = setup_phase(dir.path());
    let before = fs::read_to_string(dir.path().join(".wbs/tasks.jsonl")).unwrap();

    wbs_cmd(dir.path())
        .args(["move", &phase, "--after", &design])
        .assert()
        .success()
        .stderr(predicate::str::contains("Move ignored"));

    let after = fs::read_to_string(dir.path().join(".wbs/tasks.jsonl")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_move_to_top() {
    let dir = setup_project();
    let (_, _, build) = setup_phase(dir.path());

    json(dir.path(), &["move", &build, "--top"]);

    let rows = json(dir.path(), &["tree"]);
    assert_eq!(rows[0]["id"], build.as_str());
    assert_eq!(rows[0]["depth"], 0);
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_stats_and_load() {
    let dir = setup_project();
    setup_phase(dir.path());

    let stats = json(dir.path(), &["stats"]);
    assert_eq!(stats["stats"]["total_tasks"], 3);
    assert_eq!(stats["stats"]["at_risk_tasks"], 1);
    assert_eq!(stats["stats"]["overall_progress"], 25);

    let load = json(dir.path(), &["load"]);
    assert_eq!(load[0]["assignee"], "kim");
    assert_eq!(load[0]["active_tasks"], 2);
    assert_eq!(load[0]["remaining_days"], 20);
}

#[test]
fn test_gantt_draws_bars() {
    let dir = setup_project();
    setup_phase(dir.path());

    wbs_cmd(dir.path())
        .arg("gantt")
        .assert()
        .success()
        .stdout(predicate::str::contains("2023-12-29 .. 2024-02-05"))
        .stdout(predicate::str::contains("="));
}

#[test]
fn test_check_passes_then_flags_stale_file() {
    let dir = setup_project();
    let (phase, _, _) = setup_phase(dir.path());

    wbs_cmd(dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("is consistent"));

    // Corrupt a derived field by hand
    let path = dir.path().join(".wbs/tasks.jsonl");
    let content = fs::read_to_string(&path).unwrap();
    let tampered: Vec<String> = content
        .lines()
        .map(|line| {
            let mut task: serde_json::Value = serde_json::from_str(line).unwrap();
            if task["id"] == phase.as_str() {
                task["progress"] = serde_json::json!(99);
            }
            task.to_string()
        })
        .collect();
    fs::write(&path, tampered.join("\n")).unwrap();

    wbs_cmd(dir.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("wbs recalc"));

    wbs_cmd(dir.path()).arg("recalc").assert().success();
    wbs_cmd(dir.path()).arg("check").assert().success();
}

#[test]
fn test_projects_are_separate() {
    let dir = setup_project();
    add(dir.path(), &["Default task"]);
    add(dir.path(), &["Apollo task", "--project", "apollo"]);

    let default_rows = json(dir.path(), &["tree"]);
    let apollo_rows = json(dir.path(), &["tree", "--project", "apollo"]);

    assert_eq!(default_rows.as_array().unwrap().len(), 1);
    assert_eq!(apollo_rows[0]["title"], "Apollo task");
}

// =============================================================================
// Work Log Tests
// =============================================================================

#[test]
fn test_work_logs_require_started_task() {
    let dir = setup_project();
    let id = add(dir.path(), &["Write docs"]);

    wbs_cmd(dir.path())
        .args(["log", "add", &id, "Outlined chapters"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("has not started"));

    json(dir.path(), &["start", &id]);
    let log = json(dir.path(), &["log", "add", &id, "Outlined chapters"]);
    assert_eq!(log["date"], TODAY);

    wbs_cmd(dir.path())
        .args(["log", "add", &id, "Again"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    json(dir.path(), &["log", "add", &id, "Earlier work", "--date", "2024-01-09"]);
    let logs = json(dir.path(), &["log", "list", &id]);
    assert_eq!(logs[0]["date"], TODAY);
    assert_eq!(logs[1]["content"], "Earlier work");

    let log_id = log["id"].as_str().unwrap();
    wbs_cmd(dir.path()).args(["log", "rm", &id, log_id]).assert().success();
    assert_eq!(json(dir.path(), &["log", "list", &id]).as_array().unwrap().len(), 1);
}

// =============================================================================
// Backup Tests
// =============================================================================

#[test]
fn test_export_then_import_into_fresh_project() {
    let source = setup_project();
    let (phase, _, _) = setup_phase(source.path());
    let backup = source.path().join("backup.json");

    wbs_cmd(source.path())
        .args(["export"])
        .arg(&backup)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 3 task(s)"));

    let target = setup_project();
    wbs_cmd(target.path())
        .arg("import")
        .arg(&backup)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 3 task(s)"));

    assert_eq!(show(target.path(), &phase)["task"]["progress"], 25);
}

#[test]
fn test_import_rejects_cycles() {
    let dir = setup_project();
    let backup = dir.path().join("cyclic.json");
    fs::write(
        &backup,
        r#"{"tasks": [
  {"id": "a", "projectId": "default", "parentId": "b", "title": "A",
   "startDate": "2024-01-01", "endDate": "2024-01-02"},
  {"id": "b", "projectId": "default", "parentId": "a", "title": "B",
   "startDate": "2024-01-01", "endDate": "2024-01-02"}
]}"#,
    )
    .unwrap();

    wbs_cmd(dir.path())
        .arg("import")
        .arg(&backup)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid task hierarchy"));
}
