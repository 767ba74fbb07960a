pub mod changes;
pub mod executor;
pub mod graph;
pub mod layout;
pub mod parser;
pub mod repository;

// Re-export commonly used types
pub use changes::{generate_file_changes, FileChange, FileStatus};
pub use executor::{CommandOutput, GitExecutor};
pub use graph::{assemble, CommitData, CommitNode, CommitRemote, CommitStash, CommitTag, UNCOMMITTED};
pub use layout::{assign_columns, GraphLayout, GraphNode};
pub use parser::{
    parse_log, parse_ref_data, parse_stash_list, CommitRecord, RefData, StashEntry,
};
pub use repository::{CommitDetails, RepoInfo, Repository, TagDetails};
