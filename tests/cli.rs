use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn workspace() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.yml"), "").unwrap();
    dir
}

fn flowtask(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("flowtask").unwrap();
    cmd.arg("--data")
        .arg(dir.path().join("tasks.json"))
        .arg("--config")
        .arg(dir.path().join("config.yml"));
    cmd
}

fn add(dir: &TempDir, args: &[&str]) -> String {
    let output = flowtask(dir).arg("add").args(args).output().unwrap();
    assert!(output.status.success(), "add {args:?} failed");
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

#[test]
fn test_add_and_list() {
    let dir = workspace();
    let trip = add(&dir, &["Plan trip", "-d", "summer"]);
    assert_eq!(trip.len(), 36);
    add(&dir, &["Book flights", "--under", &trip[..8]]);
    add(&dir, &["Pack", "--after", &trip]);

    flowtask(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan trip"))
        .stdout(predicate::str::contains("└── Book flights"))
        .stdout(predicate::str::contains("Pack"));
}

#[test]
fn test_empty_store_message() {
    let dir = workspace();
    flowtask(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No tasks yet"));
}

#[test]
fn test_done_moves_to_completed_view() {
    let dir = workspace();
    let id = add(&dir, &["Write report"]);

    flowtask(&dir)
        .args(["done", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("done"));
    flowtask(&dir)
        .args(["list", "--view", "completed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Write report"));
    flowtask(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Write report").not());
}

#[test]
fn test_delete_cascades() {
    let dir = workspace();
    let a = add(&dir, &["A"]);
    let b = add(&dir, &["B", "--under", &a]);
    add(&dir, &["C", "--after", &b]);
    let other = add(&dir, &["Other"]);

    flowtask(&dir)
        .args(["delete", &a])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted 3 task(s)"));
    flowtask(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains(&other[..8]))
        .stdout(predicate::str::contains("B").not());
}

#[test]
fn test_stash_then_unstash() {
    let dir = workspace();
    let a = add(&dir, &["Someday"]);
    add(&dir, &["Later step", "--under", &a]);

    flowtask(&dir).args(["stash", &a]).assert().success();
    flowtask(&dir)
        .args(["list", "--view", "stashed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("└── ⏸ Later step"));

    flowtask(&dir)
        .args(["stash", &a])
        .assert()
        .success()
        .stdout(predicate::str::contains("unstashed"));
}

#[test]
fn test_priority_moves() {
    let dir = workspace();
    let x = add(&dir, &["X"]);
    let y = add(&dir, &["Y"]);
    flowtask(&dir)
        .args(["edit", &x, "--priority", "5"])
        .assert()
        .success();
    flowtask(&dir)
        .args(["edit", &y, "--priority", "2"])
        .assert()
        .success();

    flowtask(&dir)
        .args(["up", &x])
        .assert()
        .success()
        .stdout(predicate::str::contains("now P2"));
    flowtask(&dir)
        .args(["up", &x])
        .assert()
        .success()
        .stdout(predicate::str::contains("already at the edge"));
}

#[test]
fn test_swap_rejects_subtask() {
    let dir = workspace();
    let a = add(&dir, &["A"]);
    let b = add(&dir, &["B", "--under", &a]);

    flowtask(&dir)
        .args(["swap", &a, &b])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a root task"));
}

#[test]
fn test_empty_title_is_rejected() {
    let dir = workspace();
    flowtask(&dir)
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title must not be empty"));
    assert!(!dir.path().join("tasks.json").exists());
}

#[test]
fn test_unknown_id_fails() {
    let dir = workspace();
    add(&dir, &["Only task"]);
    flowtask(&dir)
        .args(["done", "not-an-id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_layout_prints_json() {
    let dir = workspace();
    let a = add(&dir, &["A"]);
    add(&dir, &["B", "--under", &a]);

    let output = flowtask(&dir)
        .args(["layout", &a, "--zoom", "2", "--convention", "a"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let placements = value["placements"].as_array().unwrap();
    assert_eq!(placements.len(), 2);
    // Convention A puts the subtask below its parent
    assert_eq!(placements[0]["rect"]["width"], 480.0);
    assert!(placements[1]["rect"]["y"].as_f64().unwrap() > 240.0);
    assert_eq!(value["connectors"][0]["marker"], "joint");
}

#[test]
fn test_corrupt_file_is_left_untouched() {
    let dir = workspace();
    let path = dir.path().join("tasks.json");
    std::fs::write(&path, "{ broken").unwrap();

    flowtask(&dir)
        .args(["add", "New"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading tasks"));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ broken");
}
