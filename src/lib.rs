pub mod config;
pub mod error;
pub mod git;

// Re-export commonly used types for convenience
pub use config::{CommitOrdering, Config};
pub use error::{GitError, GitResult};
pub use git::{
    assign_columns, CommitData, CommitNode, FileChange, FileStatus, GraphLayout, Repository,
};
