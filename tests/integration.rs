use std::fs;
use std::path::Path;
use std::process::Command;

const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

fn cargo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_review-sight"))
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .status()
        .expect("failed to run git");
    assert!(status.success(), "git {args:?} failed");
}

fn commit_as(dir: &Path, name: &str, email: &str, message: &str) {
    git(dir, &["add", "-A"]);
    let status = Command::new("git")
        .arg("-c")
        .arg(format!("user.name={name}"))
        .arg("-c")
        .arg(format!("user.email={email}"))
        .args(["-c", "commit.gpgsign=false", "commit", "-q", "-m", message])
        .current_dir(dir)
        .status()
        .expect("failed to run git commit");
    assert!(status.success(), "git commit as {name} failed");
}

/// A repo with the canonical two-file history:
/// a.txt — 5 commits by Alice, then 2 by Bob; b.txt — 3 commits by Bob.
/// Both files carry uncommitted modifications so `git diff HEAD` lists them.
fn scenario_repo() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path();

    git(path, &["init", "-q"]);
    git(path, &["config", "user.name", "Test Runner"]);
    git(path, &["config", "user.email", "runner@example.com"]);
    git(path, &["config", "commit.gpgsign", "false"]);

    for i in 0..5 {
        fs::write(path.join("a.txt"), format!("alice revision {i}\n")).unwrap();
        commit_as(path, "Alice", "alice@example.com", &format!("a.txt rev {i}"));
    }
    for i in 0..2 {
        fs::write(path.join("a.txt"), format!("bob touch {i}\n")).unwrap();
        commit_as(path, "Bob", "bob@example.com", &format!("a.txt touch {i}"));
    }
    for i in 0..3 {
        fs::write(path.join("b.txt"), format!("bob revision {i}\n")).unwrap();
        commit_as(path, "Bob", "bob@example.com", &format!("b.txt rev {i}"));
    }

    fs::write(path.join("a.txt"), "uncommitted a\n").unwrap();
    fs::write(path.join("b.txt"), "uncommitted b\n").unwrap();

    dir
}

fn suggest_json(repo: &Path, extra_args: &[&str]) -> serde_json::Value {
    let output = cargo_bin()
        .args(["suggest", "--dir", repo.to_str().unwrap()])
        .args(extra_args)
        .output()
        .expect("failed to run");
    assert!(
        output.status.success(),
        "suggest failed: {}",
        String::from_utf8_lossy(&output.stdout)
    );
    serde_json::from_slice(&output.stdout).expect("invalid JSON")
}

#[test]
fn suggest_picks_the_covering_reviewer() {
    let repo = scenario_repo();
    let json = suggest_json(repo.path(), &[]);

    assert_eq!(json["files_analyzed"], 2);
    let reviewers = json["reviewers"].as_array().unwrap();
    assert_eq!(reviewers.len(), 1);
    assert_eq!(reviewers[0]["reviewer"], "Bob <bob@example.com>");

    let files = reviewers[0]["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);

    // Empty uncovered list is omitted from the envelope
    assert!(json.get("uncovered").is_none());
}

#[test]
fn explicit_paths_narrow_the_universe() {
    let repo = scenario_repo();
    let json = suggest_json(repo.path(), &["--paths", "a.txt"]);

    assert_eq!(json["files_analyzed"], 1);
    let reviewers = json["reviewers"].as_array().unwrap();
    assert_eq!(reviewers.len(), 1);
    assert_eq!(reviewers[0]["reviewer"], "Alice <alice@example.com>");
}

#[test]
fn file_without_history_is_reported_uncovered() {
    let repo = scenario_repo();
    let json = suggest_json(repo.path(), &["--paths", "a.txt,nohistory.txt"]);

    assert_eq!(json["files_analyzed"], 2);
    let uncovered = json["uncovered"].as_array().unwrap();
    assert_eq!(uncovered.len(), 1);
    assert_eq!(uncovered[0], "nohistory.txt");
}

#[test]
fn detail_carries_normalized_scores() {
    let repo = scenario_repo();
    let json = suggest_json(repo.path(), &["--paths", "a.txt", "--detail"]);

    let candidates = json["detail"][0]["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 2);
    assert_eq!(candidates[0]["author"], "Alice <alice@example.com>");
    assert_eq!(candidates[0]["commits"], 5);
    assert_eq!(candidates[0]["score"], 1.0);
    assert_eq!(candidates[1]["author"], "Bob <bob@example.com>");
    assert_eq!(candidates[1]["score"], 0.4);
}

#[test]
fn detail_is_omitted_unless_requested() {
    let repo = scenario_repo();
    let json = suggest_json(repo.path(), &["--paths", "a.txt"]);
    assert!(json.get("detail").is_none());
}

#[test]
fn excluded_author_is_never_suggested() {
    let repo = scenario_repo();
    let json = suggest_json(
        repo.path(),
        &["--paths", "a.txt", "--exclude", "Alice <alice@example.com>"],
    );

    let reviewers = json["reviewers"].as_array().unwrap();
    assert_eq!(reviewers.len(), 1);
    assert_eq!(reviewers[0]["reviewer"], "Bob <bob@example.com>");
}

#[test]
fn own_identity_is_excluded_by_default() {
    let repo = scenario_repo();
    let path = repo.path();

    // Only the runner's own identity has touched c.txt.
    fs::write(path.join("c.txt"), "mine\n").unwrap();
    commit_as(path, "Test Runner", "runner@example.com", "add c.txt");

    let json = suggest_json(path, &["--paths", "c.txt"]);
    assert_eq!(json["uncovered"].as_array().unwrap().len(), 1);

    let json = suggest_json(path, &["--paths", "c.txt", "--include-self"]);
    let reviewers = json["reviewers"].as_array().unwrap();
    assert_eq!(reviewers[0]["reviewer"], "Test Runner <runner@example.com>");
}

#[test]
fn depth_bounds_the_history_window() {
    let repo = scenario_repo();
    // The two most recent commits on a.txt are Bob's.
    let json = suggest_json(repo.path(), &["--paths", "a.txt", "--depth", "2"]);

    let reviewers = json["reviewers"].as_array().unwrap();
    assert_eq!(reviewers[0]["reviewer"], "Bob <bob@example.com>");
}

#[test]
fn limit_caps_candidates_per_file() {
    let repo = scenario_repo();
    let json = suggest_json(
        repo.path(),
        &["--paths", "a.txt", "--limit", "1", "--detail"],
    );

    let candidates = json["detail"][0]["candidates"].as_array().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0]["author"], "Alice <alice@example.com>");
}

#[test]
fn names_only_prints_plain_lines() {
    let repo = scenario_repo();
    let output = cargo_bin()
        .args([
            "suggest",
            "--dir",
            repo.path().to_str().unwrap(),
            "--names-only",
        ])
        .output()
        .expect("failed to run");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim(), "Bob <bob@example.com>");
}

#[test]
fn clean_tree_is_a_usage_error() {
    let repo = scenario_repo();
    git(repo.path(), &["checkout", "-q", "--", "."]);

    let output = cargo_bin()
        .args(["suggest", "--dir", repo.path().to_str().unwrap()])
        .output()
        .expect("failed to run");
    assert!(!output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("error should be JSON");
    assert_eq!(json["error"]["code"], "INVALID_REQUEST");
}

#[test]
fn missing_dir_yields_error_envelope() {
    let output = cargo_bin()
        .args(["suggest", "--dir", "/nonexistent/review-sight-test"])
        .output()
        .expect("failed to run");
    assert!(!output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("error should be JSON");
    assert_eq!(json["error"]["code"], "FILE_NOT_FOUND");
}

#[test]
fn non_repo_dir_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let output = cargo_bin()
        .args(["suggest", "--dir", dir.path().to_str().unwrap()])
        .output()
        .expect("failed to run");
    assert!(!output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("error should be JSON");
    assert_eq!(json["error"]["code"], "NOT_A_REPOSITORY");
}

#[test]
fn doctor_reports_git_availability() {
    let output = cargo_bin().arg("doctor").output().expect("failed to run");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("invalid JSON");
    assert_eq!(json["version"], PKG_VERSION);
    assert_eq!(json["git"]["available"], true);
    assert!(json["git"]["version"].as_str().is_some());
}

#[test]
fn session_ndjson() {
    use std::io::Write;
    use std::process::Stdio;

    let repo = scenario_repo();

    let mut child = cargo_bin()
        .arg("session")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn session");

    let stdin = child.stdin.as_mut().unwrap();
    writeln!(
        stdin,
        r#"{{"command":"suggest","dir":{},"paths":["a.txt"]}}"#,
        serde_json::to_string(repo.path().to_str().unwrap()).unwrap()
    )
    .unwrap();
    writeln!(stdin, r#"{{"command":"doctor"}}"#).unwrap();
    writeln!(stdin, "not json at all").unwrap();
    drop(child.stdin.take());

    let output = child.wait_with_output().expect("failed to wait");
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.trim().lines().collect();
    assert_eq!(lines.len(), 3, "Should have 3 NDJSON lines");

    let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(
        first["reviewers"][0]["reviewer"],
        "Alice <alice@example.com>"
    );

    let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(second["git"]["available"], true);

    let third: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
    assert_eq!(third["error"]["code"], "INVALID_REQUEST");
}
