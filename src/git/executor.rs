use crate::error::{GitError, GitResult};
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

/// Result of executing a git command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    pub success: bool,
}

/// Executes git commands within a repository.
///
/// Commands are spawned asynchronously so independent queries can run
/// concurrently and be awaited jointly.
#[derive(Debug)]
pub struct GitExecutor {
    repo_path: PathBuf,
}

impl GitExecutor {
    /// Create a new GitExecutor for the given repository path
    pub fn new<P: AsRef<Path>>(repo_path: P) -> Self {
        Self {
            repo_path: repo_path.as_ref().to_path_buf(),
        }
    }

    /// Execute a git command and return the output.
    ///
    /// Arguments are passed through verbatim, never via a shell, so format
    /// strings and paths need no quoting.
    /// Example: `executor.execute(&["status", "--porcelain"]).await`
    pub async fn execute(&self, args: &[&str]) -> GitResult<CommandOutput> {
        if args.is_empty() {
            return Err(GitError::CommandFailed("Empty command".to_string()));
        }

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_path)
            .output()
            .await
            .map_err(|e| GitError::CommandFailed(format!("Failed to execute git: {}", e)))?;

        self.process_output(output, args)
    }

    /// Process command output into CommandOutput struct
    fn process_output(&self, output: Output, args: &[&str]) -> GitResult<CommandOutput> {
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        let exit_code = output.status.code().unwrap_or(-1);
        let success = output.status.success();

        if !success {
            return Err(GitError::CommandFailed(format!(
                "Command 'git {}' failed with exit code {}: {}",
                args.join(" "),
                exit_code,
                stderr.trim()
            )));
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
            success,
        })
    }

    /// Get the repository path
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let repo_path = temp_dir.path().to_path_buf();

        StdCommand::new("git")
            .args(["init"])
            .current_dir(&repo_path)
            .output()
            .unwrap();

        StdCommand::new("git")
            .args(["config", "user.name", "Test User"])
            .current_dir(&repo_path)
            .output()
            .unwrap();

        StdCommand::new("git")
            .args(["config", "user.email", "test@example.com"])
            .current_dir(&repo_path)
            .output()
            .unwrap();

        (temp_dir, repo_path)
    }

    #[tokio::test]
    async fn test_execute_status() {
        let (_temp, repo_path) = create_test_repo();
        let executor = GitExecutor::new(&repo_path);

        let output = executor.execute(&["status", "--porcelain"]).await.unwrap();
        assert!(output.success);
        assert_eq!(output.exit_code, 0);
    }

    #[tokio::test]
    async fn test_execute_log_empty_repo() {
        let (_temp, repo_path) = create_test_repo();
        let executor = GitExecutor::new(&repo_path);

        // Log command fails in an empty repo
        let result = executor.execute(&["log", "--oneline"]).await;
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), GitError::CommandFailed(_)));
    }

    #[tokio::test]
    async fn test_empty_command() {
        let (_temp, repo_path) = create_test_repo();
        let executor = GitExecutor::new(&repo_path);

        let result = executor.execute(&[]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_repo_path() {
        let (_temp, repo_path) = create_test_repo();
        let executor = GitExecutor::new(&repo_path);

        assert_eq!(executor.repo_path(), repo_path.as_path());
    }
}
