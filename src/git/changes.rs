use crate::git::parser::{normalize_path, DiffNameStatusRecord, DiffNumStatRecord, StatusFiles};
use serde::Serialize;
use std::collections::HashMap;

/// How a file changed between the two revisions being compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
    Untracked,
}

// The rendering contract encodes change kinds as single letters
impl Serialize for FileStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            FileStatus::Added => "A",
            FileStatus::Modified => "M",
            FileStatus::Deleted => "D",
            FileStatus::Renamed => "R",
            FileStatus::Untracked => "U",
        })
    }
}

/// One file change, merged from the name-status, numstat, and (for the
/// working tree) status queries.
///
/// `additions`/`deletions` are `None` when no line counts exist for the
/// change: untracked files, pure deletes reported only by status, and binary
/// content. The two are always both `None` or both present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileChange {
    pub old_path: String,
    pub new_path: String,
    #[serde(rename = "type")]
    pub status: FileStatus,
    pub additions: Option<u32>,
    pub deletions: Option<u32>,
}

/// Merge the diff record streams into a single file change list.
///
/// Name-status records seed the list since they carry authoritative rename
/// detection. Working-tree status (when given) contributes deletes that
/// produced no content diff and untracked files, which the diff queries never
/// report. Numstat line counts are overlaid last, by new-path match.
pub fn generate_file_changes(
    name_status_records: &[DiffNameStatusRecord],
    num_stat_records: &[DiffNumStatRecord],
    status: Option<&StatusFiles>,
) -> Vec<FileChange> {
    let mut file_changes: Vec<FileChange> = Vec::with_capacity(name_status_records.len());
    let mut file_lookup: HashMap<String, usize> = HashMap::new();

    for record in name_status_records {
        file_lookup.insert(record.new_path.clone(), file_changes.len());
        file_changes.push(FileChange {
            old_path: record.old_path.clone(),
            new_path: record.new_path.clone(),
            status: record.status,
            additions: None,
            deletions: None,
        });
    }

    if let Some(status) = status {
        for path in &status.deleted {
            let path = normalize_path(path);
            if let Some(&index) = file_lookup.get(&path) {
                file_changes[index].status = FileStatus::Deleted;
            } else {
                file_changes.push(FileChange {
                    old_path: path.clone(),
                    new_path: path,
                    status: FileStatus::Deleted,
                    additions: None,
                    deletions: None,
                });
            }
        }
        // Untracked files are never deduplicated: the diff queries cannot
        // have reported them
        for path in &status.untracked {
            let path = normalize_path(path);
            file_changes.push(FileChange {
                old_path: path.clone(),
                new_path: path,
                status: FileStatus::Untracked,
                additions: None,
                deletions: None,
            });
        }
    }

    for record in num_stat_records {
        if let Some(&index) = file_lookup.get(&record.path) {
            file_changes[index].additions = record.additions;
            file_changes[index].deletions = record.deletions;
        }
    }

    file_changes
}
