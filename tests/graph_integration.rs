mod helpers;

use gitgraph::config::CommitOrdering;
use gitgraph::git::graph::UNCOMMITTED;
use gitgraph::git::layout::assign_columns;
use gitgraph::git::Repository;
use helpers::{create_commit_at, create_test_repo, git, rev_parse};
use std::fs;

/// Full pipeline on a repository with a merged feature branch and a tag:
/// repo info, commit window, ref annotation, and column layout.
#[tokio::test]
async fn test_branchy_repository_pipeline() {
    let (_temp, repo_path) = create_test_repo();
    create_commit_at(&repo_path, "a.txt", "one", "main 1", 1700000100);
    git(&repo_path, &["checkout", "-b", "feature"]);
    create_commit_at(&repo_path, "f.txt", "feature", "feature 1", 1700000200);
    git(&repo_path, &["checkout", "main"]);
    create_commit_at(&repo_path, "a.txt", "two", "main 2", 1700000300);
    git(&repo_path, &["merge", "--no-ff", "-m", "merge feature", "feature"]);
    git(&repo_path, &["tag", "v1.0"]);

    let repo = Repository::new(&repo_path);
    let info = repo.repo_info(&[]).await.unwrap();
    assert_eq!(info.head.as_deref(), Some("main"));
    assert_eq!(info.branches, vec!["main", "feature"]);

    let data = repo
        .commits(None, 300, CommitOrdering::AuthorDate, &info.remotes, &[], &info.stashes)
        .await
        .unwrap();

    let messages: Vec<&str> = data.commits.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, vec!["merge feature", "main 2", "feature 1", "main 1"]);
    assert_eq!(data.head.as_deref(), Some(rev_parse(&repo_path, "HEAD").as_str()));
    assert_eq!(data.tags, vec!["v1.0"]);
    assert_eq!(data.commits[0].heads, vec!["main"]);
    assert_eq!(data.commits[0].tags.len(), 1);
    assert_eq!(data.commits[2].heads, vec!["feature"]);

    // The mainline chain keeps one lane; the feature commit gets its own
    let layout = assign_columns(&data.commits);
    assert_eq!(layout.column_count, 2);
    assert_eq!(layout.columns[0], 0); // merge feature
    assert_eq!(layout.columns[1], 0); // main 2
    assert_eq!(layout.columns[2], 1); // feature 1
    assert_eq!(layout.columns[3], 0); // main 1
}

/// A stash and a dirty working tree both appear as synthetic nodes, and
/// stripping them reproduces the raw log order.
#[tokio::test]
async fn test_stash_and_uncommitted_pipeline() {
    let (_temp, repo_path) = create_test_repo();
    create_commit_at(&repo_path, "a.txt", "one", "first", 1700000100);
    create_commit_at(&repo_path, "a.txt", "two", "second", 1700000200);

    fs::write(repo_path.join("a.txt"), "stashed").unwrap();
    git(&repo_path, &["stash", "push", "-m", "wip"]);
    fs::write(repo_path.join("b.txt"), "untracked").unwrap();

    let repo = Repository::new(&repo_path);
    let info = repo.repo_info(&[]).await.unwrap();
    assert_eq!(info.stashes.len(), 1);

    let data = repo
        .commits(None, 300, CommitOrdering::AuthorDate, &info.remotes, &[], &info.stashes)
        .await
        .unwrap();

    // Uncommitted-changes node precedes the checked-out commit; the stash is
    // spliced in directly after its base
    assert_eq!(data.commits[0].hash, UNCOMMITTED);
    let head = rev_parse(&repo_path, "HEAD");
    let head_index = data
        .commits
        .iter()
        .position(|c| c.hash == head)
        .expect("head commit missing");
    assert_eq!(head_index, 1);
    let stash_index = data
        .commits
        .iter()
        .position(|c| c.stash.is_some())
        .expect("stash node missing");
    assert_eq!(stash_index, head_index + 1);
    assert_eq!(
        data.commits[stash_index]
            .stash
            .as_ref()
            .unwrap()
            .base_hash,
        head
    );

    // Stable order: removing synthetic nodes reproduces the log order
    let real: Vec<&str> = data
        .commits
        .iter()
        .filter(|c| c.hash != UNCOMMITTED && c.stash.is_none())
        .map(|c| c.message.as_str())
        .collect();
    assert_eq!(real, vec!["second", "first"]);

    // Layout holds the no-overlap invariant regardless of synthetic nodes
    let layout = assign_columns(&data.commits);
    assert_eq!(layout.columns.len(), data.commits.len());
    assert!(layout.column_count >= 1);
}

/// Stash details merge the base diff with the untracked-files commit diff
#[tokio::test]
async fn test_stash_details_with_untracked_files() {
    let (_temp, repo_path) = create_test_repo();
    create_commit_at(&repo_path, "a.txt", "one", "first", 1700000100);
    fs::write(repo_path.join("a.txt"), "modified").unwrap();
    fs::write(repo_path.join("u.txt"), "untracked").unwrap();
    git(&repo_path, &["stash", "push", "-u", "-m", "wip"]);

    let repo = Repository::new(&repo_path);
    let info = repo.repo_info(&[]).await.unwrap();
    assert_eq!(info.stashes.len(), 1);
    let stash = &info.stashes[0];
    assert!(stash.untracked_files_hash.is_some());

    let data = repo
        .commits(None, 300, CommitOrdering::AuthorDate, &info.remotes, &[], &info.stashes)
        .await
        .unwrap();
    let stash_node = data
        .commits
        .iter()
        .find(|c| c.stash.is_some())
        .expect("stash node missing");

    let details = repo
        .stash_details(&stash_node.hash, stash_node.stash.as_ref().unwrap())
        .await
        .unwrap();

    let paths: Vec<&str> = details
        .file_changes
        .iter()
        .map(|change| change.new_path.as_str())
        .collect();
    assert!(paths.contains(&"a.txt"));
    assert!(paths.contains(&"u.txt"));
    let untracked = details
        .file_changes
        .iter()
        .find(|change| change.new_path == "u.txt")
        .unwrap();
    assert_eq!(untracked.status, gitgraph::git::FileStatus::Untracked);
}

/// The assembled graph serializes to the camelCase JSON contract the
/// rendering layer consumes
#[tokio::test]
async fn test_json_output_contract() {
    let (_temp, repo_path) = create_test_repo();
    create_commit_at(&repo_path, "a.txt", "one", "first", 1700000100);

    let repo = Repository::new(&repo_path);
    let data = repo
        .commits(None, 300, CommitOrdering::AuthorDate, &[], &[], &[])
        .await
        .unwrap();
    let layout = assign_columns(&data.commits);

    let json = serde_json::json!({ "commits": data, "layout": layout });
    let value = &json["commits"];
    assert!(value["moreCommitsAvailable"].is_boolean());
    assert!(value["commits"][0]["hash"].is_string());
    assert!(value["commits"][0]["heads"].is_array());
    assert!(json["layout"]["columnCount"].is_number());
    assert_eq!(json["layout"]["columns"][0], 0);
}
