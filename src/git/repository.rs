use crate::config::CommitOrdering;
use crate::error::{GitError, GitResult};
use crate::git::changes::{generate_file_changes, FileChange, FileStatus};
use crate::git::executor::GitExecutor;
use crate::git::graph::{assemble, CommitData, CommitStash, UNCOMMITTED};
use crate::git::parser::{
    self, BranchData, CommitDetailsRecord, DiffNameStatusRecord, DiffNumStatRecord, RefData,
    StashEntry, StatusFiles, TagDetailsRecord, GIT_LOG_SEPARATOR,
};
use serde::Serialize;
use std::env;
use std::path::{Path, PathBuf};

const DIFF_FILTER: &str = "AMDR";

fn log_format() -> String {
    ["%H", "%P", "%an", "%ae", "%ct", "%s"].join(GIT_LOG_SEPARATOR)
}

fn details_format() -> String {
    ["%H", "%P", "%an", "%ae", "%at", "%cn", "%ce", "%ct", "%B"].join(GIT_LOG_SEPARATOR)
}

fn stash_format() -> String {
    ["%H", "%P", "%gD", "%an", "%ae", "%ct", "%s"].join(GIT_LOG_SEPARATOR)
}

fn tag_format() -> String {
    [
        "%(objectname)",
        "%(taggername)",
        "%(taggeremail)",
        "%(taggerdate:unix)",
        "%(contents)",
    ]
    .join(GIT_LOG_SEPARATOR)
}

/// Branch, remote, and stash inventory of a repository
#[derive(Debug, Clone, Default)]
pub struct RepoInfo {
    pub branches: Vec<String>,
    pub head: Option<String>,
    pub remotes: Vec<String>,
    pub stashes: Vec<StashEntry>,
}

/// Full commit information for the detail view, including file changes
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitDetails {
    pub hash: String,
    pub parents: Vec<String>,
    pub author: String,
    pub author_email: String,
    pub author_date: i64,
    pub committer: String,
    pub committer_email: String,
    pub committer_date: i64,
    pub body: String,
    pub file_changes: Vec<FileChange>,
}

impl CommitDetails {
    fn from_record(record: CommitDetailsRecord, file_changes: Vec<FileChange>) -> Self {
        Self {
            hash: record.hash,
            parents: record.parents,
            author: record.author,
            author_email: record.author_email,
            author_date: record.author_date,
            committer: record.committer,
            committer_email: record.committer_email,
            committer_date: record.committer_date,
            body: record.body,
            file_changes,
        }
    }
}

/// Tagger information for the tag detail view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagDetails {
    pub hash: String,
    pub tagger: String,
    pub tagger_email: String,
    pub date: i64,
    pub message: String,
}

impl From<TagDetailsRecord> for TagDetails {
    fn from(record: TagDetailsRecord) -> Self {
        Self {
            hash: record.hash,
            tagger: record.tagger,
            tagger_email: record.tagger_email,
            date: record.date,
            message: record.message,
        }
    }
}

/// Represents a git repository and provides the graph data queries.
///
/// All reads are independent git invocations; related queries are issued
/// concurrently and awaited jointly, then merged by the pure assembly stages.
#[derive(Debug)]
pub struct Repository {
    path: PathBuf,
    executor: GitExecutor,
}

impl Repository {
    /// Detect git repository from current working directory
    pub fn discover() -> GitResult<Self> {
        let current_dir = env::current_dir().map_err(GitError::IoError)?;
        Self::discover_from(&current_dir)
    }

    /// Detect git repository starting from a specific directory
    pub fn discover_from<P: AsRef<Path>>(start_path: P) -> GitResult<Self> {
        let mut current = start_path.as_ref().to_path_buf();

        loop {
            if current.join(".git").exists() {
                return Ok(Self::new(current));
            }
            if !current.pop() {
                return Err(GitError::NotARepository);
            }
        }
    }

    /// Create a Repository for a known git directory
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let executor = GitExecutor::new(&path);
        Self { path, executor }
    }

    /// Get the repository path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the git executor for this repository
    pub fn executor(&self) -> &GitExecutor {
        &self.executor
    }

    /// Query the branch, remote, and stash inventory
    pub async fn repo_info(&self, hide_remotes: &[String]) -> GitResult<RepoInfo> {
        let (branch_data, remotes, stashes) = tokio::join!(
            self.branches(hide_remotes),
            self.remote_list(),
            self.stash_list(),
        );
        let BranchData { branches, head } = branch_data?;

        Ok(RepoInfo {
            branches,
            head,
            remotes: remotes?,
            stashes,
        })
    }

    /// Query the commit window and assemble the graph node list.
    ///
    /// `branches` restricts the traversal to the given heads; `None` shows
    /// everything (branches, tags, visible remotes, stash bases, HEAD). One
    /// commit beyond `max_commits` is requested so the assembler can detect
    /// whether more history exists.
    ///
    /// A ref-listing failure is fatal only when commits exist; an empty
    /// repository legitimately fails both the log and ref queries and yields
    /// an empty graph instead of an error.
    pub async fn commits(
        &self,
        branches: Option<&[String]>,
        max_commits: usize,
        ordering: CommitOrdering,
        remotes: &[String],
        hide_remotes: &[String],
        stashes: &[StashEntry],
    ) -> GitResult<CommitData> {
        let (log_result, refs_result, current_branch) = tokio::join!(
            self.log(branches, max_commits + 1, ordering, remotes, hide_remotes, stashes),
            self.refs(),
            self.current_branch(),
        );

        let (commits, ref_data) = match (log_result, refs_result) {
            (Ok(commits), Ok(ref_data)) => (commits, ref_data),
            (Ok(commits), Err(error)) => {
                if commits.is_empty() {
                    (commits, RefData::default())
                } else {
                    return Err(error);
                }
            }
            // Both queries fail on a repository with no commits
            (Err(_), Err(_)) => (Vec::new(), RefData::default()),
            (Err(error), Ok(_)) => return Err(error),
        };

        let uncommitted_changes = match &ref_data.head {
            Some(head) if commits.iter().any(|commit| &commit.hash == head) => {
                self.uncommitted_change_count().await?
            }
            _ => 0,
        };

        Ok(assemble(
            commits,
            max_commits,
            ref_data,
            stashes,
            remotes,
            current_branch.as_deref(),
            uncommitted_changes,
        ))
    }

    /// Get the detail view of a commit, including its file changes
    pub async fn commit_details(&self, hash: &str, has_parents: bool) -> GitResult<CommitDetails> {
        let from = if has_parents {
            format!("{hash}^")
        } else {
            hash.to_string()
        };
        let (record, name_status, num_stat) = tokio::join!(
            self.commit_details_base(hash),
            self.diff_name_status(&from, hash),
            self.diff_num_stat(&from, hash),
        );

        let file_changes = generate_file_changes(&name_status?, &num_stat?, None);
        Ok(CommitDetails::from_record(record?, file_changes))
    }

    /// Get the detail view of a stash.
    ///
    /// When the stash recorded untracked files in a third parent, the diff of
    /// that commit is appended with its additions reclassified as untracked.
    pub async fn stash_details(
        &self,
        hash: &str,
        stash: &CommitStash,
    ) -> GitResult<CommitDetails> {
        let (record, name_status, num_stat) = tokio::join!(
            self.commit_details_base(hash),
            self.diff_name_status(&stash.base_hash, hash),
            self.diff_num_stat(&stash.base_hash, hash),
        );
        let mut details = CommitDetails::from_record(
            record?,
            generate_file_changes(&name_status?, &num_stat?, None),
        );

        if let Some(untracked_hash) = &stash.untracked_files_hash {
            let (name_status, num_stat) = tokio::join!(
                self.diff_name_status(untracked_hash, untracked_hash),
                self.diff_num_stat(untracked_hash, untracked_hash),
            );
            for mut change in generate_file_changes(&name_status?, &num_stat?, None) {
                if change.status == FileStatus::Added {
                    change.status = FileStatus::Untracked;
                    details.file_changes.push(change);
                }
            }
        }

        Ok(details)
    }

    /// Get the detail view of the working tree relative to HEAD
    pub async fn uncommitted_details(&self) -> GitResult<CommitDetails> {
        let (name_status, num_stat, status) = tokio::join!(
            self.diff_name_status("HEAD", ""),
            self.diff_num_stat("HEAD", ""),
            self.status(),
        );

        Ok(CommitDetails {
            hash: UNCOMMITTED.to_string(),
            parents: Vec::new(),
            author: String::new(),
            author_email: String::new(),
            author_date: 0,
            committer: String::new(),
            committer_email: String::new(),
            committer_date: 0,
            body: String::new(),
            file_changes: generate_file_changes(&name_status?, &num_stat?, Some(&status?)),
        })
    }

    /// Get the file changes between two revisions. `to` may be the
    /// uncommitted sentinel to compare against the working tree.
    pub async fn commit_comparison(&self, from: &str, to: &str) -> GitResult<Vec<FileChange>> {
        let to_rev = if to == UNCOMMITTED { "" } else { to };
        let (name_status, num_stat) = tokio::join!(
            self.diff_name_status(from, to_rev),
            self.diff_num_stat(from, to_rev),
        );
        let status = if to == UNCOMMITTED {
            Some(self.status().await?)
        } else {
            None
        };

        Ok(generate_file_changes(
            &name_status?,
            &num_stat?,
            status.as_ref(),
        ))
    }

    /// Get the detail view of an annotated tag. Lightweight tags carry no
    /// tagger metadata and resolve to a parse error.
    pub async fn tag_details(&self, name: &str) -> GitResult<TagDetails> {
        let output = self
            .executor
            .execute(&[
                "for-each-ref",
                &format!("refs/tags/{name}"),
                &format!("--format={}", tag_format()),
            ])
            .await?;
        Ok(parser::parse_tag_details(&output.stdout)?.into())
    }

    /// Get the contents of a file at a specific revision
    pub async fn commit_file(&self, hash: &str, file_path: &str) -> GitResult<String> {
        let output = self
            .executor
            .execute(&["show", &format!("{hash}:{file_path}")])
            .await?;
        Ok(output.stdout)
    }

    /// Get the subject line of a commit, or `None` if it cannot be resolved
    pub async fn commit_subject(&self, hash: &str) -> Option<String> {
        let result = self
            .executor
            .execute(&[
                "-c",
                "log.showSignature=false",
                "log",
                "--format=%s",
                "-n",
                "1",
                hash,
                "--",
            ])
            .await;
        match result {
            Ok(output) => Some(
                output
                    .stdout
                    .trim()
                    .split_whitespace()
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
            Err(_) => None,
        }
    }

    /* Private data providers */

    async fn log(
        &self,
        branches: Option<&[String]>,
        num: usize,
        ordering: CommitOrdering,
        remotes: &[String],
        hide_remotes: &[String],
        stashes: &[StashEntry],
    ) -> GitResult<Vec<parser::CommitRecord>> {
        let mut args: Vec<String> = vec![
            "-c".to_string(),
            "log.showSignature=false".to_string(),
            "log".to_string(),
            format!("--max-count={num}"),
            format!("--format={}", log_format()),
            ordering.log_arg().to_string(),
        ];

        match branches {
            Some(branches) => args.extend(branches.iter().cloned()),
            None => {
                args.push("--branches".to_string());
                args.push("--tags".to_string());
                if hide_remotes.is_empty() {
                    args.push("--remotes".to_string());
                } else {
                    for remote in remotes.iter().filter(|remote| !hide_remotes.contains(*remote)) {
                        args.push(format!("--glob=refs/remotes/{remote}"));
                    }
                }

                // Stash base commits are added explicitly so commits only
                // referenced by stashes are still traversed
                let mut seen: Vec<&str> = Vec::new();
                for stash in stashes {
                    if !seen.contains(&stash.base_hash.as_str()) {
                        seen.push(&stash.base_hash);
                        args.push(stash.base_hash.clone());
                    }
                }
                args.push("HEAD".to_string());
            }
        }
        args.push("--".to_string());

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.executor.execute(&arg_refs).await?;
        parser::parse_log(&output.stdout)
    }

    async fn refs(&self) -> GitResult<RefData> {
        let output = self.executor.execute(&["show-ref", "-d", "--head"]).await?;
        parser::parse_ref_data(&output.stdout)
    }

    async fn stash_list(&self) -> Vec<StashEntry> {
        // An error here means no stashes exist (refs/stash is absent)
        let result = self
            .executor
            .execute(&[
                "reflog",
                &format!("--format={}", stash_format()),
                "refs/stash",
                "--",
            ])
            .await;
        match result {
            Ok(output) => parser::parse_stash_list(&output.stdout).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    async fn branches(&self, hide_remotes: &[String]) -> GitResult<BranchData> {
        let output = self
            .executor
            .execute(&["branch", "-a", "--no-color"])
            .await?;
        parser::parse_branch_list(&output.stdout, hide_remotes)
    }

    async fn remote_list(&self) -> GitResult<Vec<String>> {
        let output = self.executor.execute(&["remote"]).await?;
        Ok(parser::parse_remote_list(&output.stdout))
    }

    async fn current_branch(&self) -> Option<String> {
        match self.executor.execute(&["branch", "--show-current"]).await {
            Ok(output) => {
                let branch = output.stdout.trim();
                if branch.is_empty() {
                    // Detached HEAD state
                    None
                } else {
                    Some(branch.to_string())
                }
            }
            Err(_) => None,
        }
    }

    async fn uncommitted_change_count(&self) -> GitResult<usize> {
        let output = self
            .executor
            .execute(&["status", "--untracked-files=all", "--porcelain"])
            .await?;
        Ok(parser::count_status_lines(&output.stdout))
    }

    async fn status(&self) -> GitResult<StatusFiles> {
        let output = self
            .executor
            .execute(&["status", "-s", "--untracked-files=all", "--porcelain", "-z"])
            .await?;
        let entries: Vec<String> = output.stdout.split('\0').map(str::to_string).collect();
        Ok(parser::parse_status_files(&entries))
    }

    async fn commit_details_base(&self, hash: &str) -> GitResult<CommitDetailsRecord> {
        let output = self
            .executor
            .execute(&[
                "-c",
                "log.showSignature=false",
                "show",
                "--quiet",
                hash,
                &format!("--format={}", details_format()),
            ])
            .await?;
        parser::parse_commit_details(&output.stdout)
    }

    async fn diff_name_status(
        &self,
        from: &str,
        to: &str,
    ) -> GitResult<Vec<DiffNameStatusRecord>> {
        let entries = self.exec_diff(from, to, "--name-status").await?;
        Ok(parser::parse_diff_name_status(&entries))
    }

    async fn diff_num_stat(&self, from: &str, to: &str) -> GitResult<Vec<DiffNumStatRecord>> {
        let entries = self.exec_diff(from, to, "--numstat").await?;
        Ok(parser::parse_diff_num_stat(&entries))
    }

    async fn exec_diff(&self, from: &str, to: &str, arg: &str) -> GitResult<Vec<String>> {
        let filter = format!("--diff-filter={DIFF_FILTER}");
        let output = if from == to {
            // A single-commit diff (e.g. a stash's untracked-files commit)
            self.executor
                .execute(&[
                    "diff-tree",
                    arg,
                    "-r",
                    "--root",
                    "--find-renames",
                    &filter,
                    "-z",
                    from,
                ])
                .await?
        } else {
            let mut args = vec!["diff", arg, "--find-renames", filter.as_str(), "-z", from];
            if !to.is_empty() {
                args.push(to);
            }
            self.executor.execute(&args).await?
        };

        let mut entries: Vec<String> = output.stdout.split('\0').map(str::to_string).collect();
        if from == to && !entries.is_empty() {
            // diff-tree echoes the commit hash as the first record
            entries.remove(0);
        }
        Ok(entries)
    }
}
