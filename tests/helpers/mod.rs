#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Run a git command in a repository, asserting success
pub fn git(repo_path: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Helper to create a test git repository
pub fn create_test_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init", "-b", "main"]);
    git(&repo_path, &["config", "user.name", "Test User"]);
    git(&repo_path, &["config", "user.email", "test@example.com"]);

    (temp_dir, repo_path)
}

/// Helper to create a commit with a fixed author/committer date, so
/// author-date ordering is deterministic across fast test runs
pub fn create_commit_at(repo_path: &Path, file: &str, content: &str, message: &str, epoch: i64) {
    fs::write(repo_path.join(file), content).expect("Failed to write file");
    git(repo_path, &["add", file]);

    let date = format!("{epoch} +0000");
    let output = Command::new("git")
        .args(["commit", "-m", message])
        .env("GIT_AUTHOR_DATE", &date)
        .env("GIT_COMMITTER_DATE", &date)
        .current_dir(repo_path)
        .output()
        .expect("Failed to commit");
    assert!(
        output.status.success(),
        "commit failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Resolve a revision to its hash
pub fn rev_parse(repo_path: &Path, rev: &str) -> String {
    let output = Command::new("git")
        .args(["rev-parse", rev])
        .current_dir(repo_path)
        .output()
        .expect("Failed to run git rev-parse");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
