use crate::error::GitResult;
use crate::git::changes::FileStatus;

/// Field separator used in `--format` strings for log/stash/detail queries.
///
/// Commit subjects and bodies are free text, so the separator is a token that
/// is vanishingly unlikely to occur in them.
pub const GIT_LOG_SEPARATOR: &str = "XX7Nal-YARtTpjCikii9nJxER19D6diSyk-AWkPb";

/// One commit decoded from the log query (6 separator-joined fields)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub hash: String,
    pub parents: Vec<String>,
    pub author: String,
    pub email: String,
    pub date: i64,
    pub message: String,
}

/// One commit decoded from the detail query (9 separator-joined fields)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDetailsRecord {
    pub hash: String,
    pub parents: Vec<String>,
    pub author: String,
    pub author_email: String,
    pub author_date: i64,
    pub committer: String,
    pub committer_email: String,
    pub committer_date: i64,
    pub body: String,
}

/// An annotated tag decoded from the tag detail query (5 separator-joined
/// fields); the email has its angle brackets stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDetailsRecord {
    pub hash: String,
    pub tagger: String,
    pub tagger_email: String,
    pub date: i64,
    pub message: String,
}

/// One stash decoded from the stash reflog (7 separator-joined fields)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StashEntry {
    pub hash: String,
    pub base_hash: String,
    pub untracked_files_hash: Option<String>,
    pub selector: String,
    pub author: String,
    pub email: String,
    pub date: i64,
    pub message: String,
}

/// A branch head or remote-tracking ref
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefEntry {
    pub hash: String,
    pub name: String,
}

/// A tag ref; `annotated` is set when the ref carried a `^{}` dereference suffix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRefEntry {
    pub hash: String,
    pub name: String,
    pub annotated: bool,
}

/// All refs in a repository, classified from `git show-ref -d --head` output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefData {
    pub head: Option<String>,
    pub heads: Vec<RefEntry>,
    pub tags: Vec<TagRefEntry>,
    pub remotes: Vec<RefEntry>,
}

/// One record from `git diff --name-status -z`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffNameStatusRecord {
    pub status: FileStatus,
    pub old_path: String,
    pub new_path: String,
}

/// One record from `git diff --numstat -z`.
///
/// Counts are `None` when git could not compute them (binary files report `-`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffNumStatRecord {
    pub path: String,
    pub additions: Option<u32>,
    pub deletions: Option<u32>,
}

/// Deleted and untracked working-tree paths from `git status --porcelain -z`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFiles {
    pub deleted: Vec<String>,
    pub untracked: Vec<String>,
}

/// Local branch names plus the checked-out branch from `git branch -a` output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchData {
    pub branches: Vec<String>,
    pub head: Option<String>,
}

/// Git path output may use backslashes on Windows; graph consumers expect `/`
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
}

/// Parse `git log --format=<6 fields>` output.
///
/// A line with the wrong field count stops parsing; whatever was decoded so
/// far is returned. The underlying format is versioned by git itself, so the
/// parsers favour robustness over strictness.
pub fn parse_log(output: &str) -> GitResult<Vec<CommitRecord>> {
    let mut commits = Vec::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split(GIT_LOG_SEPARATOR).collect();
        if fields.len() != 6 {
            break;
        }
        let date = match fields[4].parse::<i64>() {
            Ok(date) => date,
            Err(_) => break,
        };
        commits.push(CommitRecord {
            hash: fields[0].to_string(),
            parents: split_hash_list(fields[1]),
            author: fields[2].to_string(),
            email: fields[3].to_string(),
            date,
            message: fields[5].to_string(),
        });
    }

    Ok(commits)
}

/// Parse `git show --quiet --format=<9 fields>` output for the detail view
pub fn parse_commit_details(output: &str) -> GitResult<CommitDetailsRecord> {
    use crate::error::GitError;

    let fields: Vec<&str> = output.splitn(9, GIT_LOG_SEPARATOR).collect();
    if fields.len() != 9 {
        return Err(GitError::ParseError(format!(
            "Expected 9 commit detail fields, found {}",
            fields.len()
        )));
    }

    let parse_date = |field: &str, name: &str| {
        field
            .parse::<i64>()
            .map_err(|_| GitError::ParseError(format!("Invalid {name} timestamp: {field}")))
    };

    Ok(CommitDetailsRecord {
        hash: fields[0].to_string(),
        parents: split_hash_list(fields[1]),
        author: fields[2].to_string(),
        author_email: fields[3].to_string(),
        author_date: parse_date(fields[4], "author")?,
        committer: fields[5].to_string(),
        committer_email: fields[6].to_string(),
        committer_date: parse_date(fields[7], "committer")?,
        body: remove_trailing_blank_lines(fields[8]),
    })
}

/// Parse `git for-each-ref --format=<5 fields>` output for an annotated tag
pub fn parse_tag_details(output: &str) -> GitResult<TagDetailsRecord> {
    use crate::error::GitError;

    let fields: Vec<&str> = output.splitn(5, GIT_LOG_SEPARATOR).collect();
    if fields.len() != 5 {
        return Err(GitError::ParseError(format!(
            "Expected 5 tag detail fields, found {}",
            fields.len()
        )));
    }
    let date = fields[3].parse::<i64>().map_err(|_| {
        GitError::ParseError(format!("Invalid tagger timestamp: {}", fields[3]))
    })?;

    Ok(TagDetailsRecord {
        hash: fields[0].to_string(),
        tagger: fields[1].to_string(),
        tagger_email: fields[2]
            .trim_start_matches('<')
            .trim_end_matches('>')
            .to_string(),
        date,
        message: remove_trailing_blank_lines(fields[4]),
    })
}

/// Parse `git reflog --format=<7 fields> refs/stash` output.
///
/// Records with the wrong field count or no parents are skipped; a stash
/// commit always has at least its base commit as a parent.
pub fn parse_stash_list(output: &str) -> GitResult<Vec<StashEntry>> {
    let mut stashes = Vec::new();

    for line in output.lines() {
        let fields: Vec<&str> = line.split(GIT_LOG_SEPARATOR).collect();
        if fields.len() != 7 || fields[1].is_empty() {
            continue;
        }
        let date = match fields[5].parse::<i64>() {
            Ok(date) => date,
            Err(_) => continue,
        };
        let parents = split_hash_list(fields[1]);
        stashes.push(StashEntry {
            hash: fields[0].to_string(),
            base_hash: parents[0].clone(),
            untracked_files_hash: if parents.len() == 3 {
                Some(parents[2].clone())
            } else {
                None
            },
            selector: fields[2].to_string(),
            author: fields[3].to_string(),
            email: fields[4].to_string(),
            date,
            message: fields[6].to_string(),
        });
    }

    Ok(stashes)
}

/// Parse `git show-ref -d --head` output.
///
/// Refs are classified by prefix; anything unrecognized is ignored. A remote
/// ref ending in `/HEAD` is a pointer to a pointer, not a real branch, and is
/// always excluded.
pub fn parse_ref_data(output: &str) -> GitResult<RefData> {
    let mut ref_data = RefData::default();

    for line in output.lines() {
        let Some((hash, ref_name)) = line.split_once(' ') else {
            continue;
        };

        if let Some(name) = ref_name.strip_prefix("refs/heads/") {
            ref_data.heads.push(RefEntry {
                hash: hash.to_string(),
                name: name.to_string(),
            });
        } else if let Some(name) = ref_name.strip_prefix("refs/tags/") {
            let annotated = name.ends_with("^{}");
            ref_data.tags.push(TagRefEntry {
                hash: hash.to_string(),
                name: name.strip_suffix("^{}").unwrap_or(name).to_string(),
                annotated,
            });
        } else if let Some(name) = ref_name.strip_prefix("refs/remotes/") {
            if !name.ends_with("/HEAD") {
                ref_data.remotes.push(RefEntry {
                    hash: hash.to_string(),
                    name: name.to_string(),
                });
            }
        } else if ref_name == "HEAD" {
            ref_data.head = Some(hash.to_string());
        }
    }

    Ok(ref_data)
}

/// Parse the null-separated records of `git diff --name-status -z`.
///
/// Add/modify/delete records span 2 entries (status, path); renames span 3
/// (status, old path, new path). An unrecognized status letter stops parsing.
pub fn parse_diff_name_status(entries: &[String]) -> Vec<DiffNameStatusRecord> {
    let mut records = Vec::new();
    let mut i = 0;

    while i < entries.len() && !entries[i].is_empty() {
        let status = match entries[i].chars().next() {
            Some('A') => FileStatus::Added,
            Some('M') => FileStatus::Modified,
            Some('D') => FileStatus::Deleted,
            Some('R') => {
                let (Some(old_path), Some(new_path)) = (entries.get(i + 1), entries.get(i + 2))
                else {
                    break;
                };
                records.push(DiffNameStatusRecord {
                    status: FileStatus::Renamed,
                    old_path: normalize_path(old_path),
                    new_path: normalize_path(new_path),
                });
                i += 3;
                continue;
            }
            _ => break,
        };
        let Some(path) = entries.get(i + 1) else {
            break;
        };
        let path = normalize_path(path);
        records.push(DiffNameStatusRecord {
            status,
            old_path: path.clone(),
            new_path: path,
        });
        i += 2;
    }

    records
}

/// Parse the null-separated records of `git diff --numstat -z`.
///
/// Each record is `additions<TAB>deletions<TAB>path`. For renames the path
/// field is empty and the new path is recovered from the trailing
/// name-status-style encoding two entries further on.
pub fn parse_diff_num_stat(entries: &[String]) -> Vec<DiffNumStatRecord> {
    let mut records = Vec::new();
    let mut i = 0;

    while i < entries.len() && !entries[i].is_empty() {
        let fields: Vec<&str> = entries[i].split('\t').collect();
        if fields.len() != 3 {
            break;
        }
        let additions = fields[0].parse::<u32>().ok();
        let deletions = fields[1].parse::<u32>().ok();

        if !fields[2].is_empty() {
            records.push(DiffNumStatRecord {
                path: normalize_path(fields[2]),
                additions,
                deletions,
            });
            i += 1;
        } else {
            // Rename: the path travels separately as "<meta>\0<old>\0<new>"
            let Some(new_path) = entries.get(i + 2) else {
                break;
            };
            records.push(DiffNumStatRecord {
                path: normalize_path(new_path),
                additions,
                deletions,
            });
            i += 3;
        }
    }

    records
}

/// Parse the null-separated records of `git status --porcelain -z`.
///
/// Either status column may carry the meaningful letter. Rename/copy records
/// are followed by the origin path in its own entry, which is skipped: only
/// the destination path matters here.
pub fn parse_status_files(entries: &[String]) -> StatusFiles {
    let mut status = StatusFiles::default();
    let mut i = 0;

    while i < entries.len() && !entries[i].is_empty() {
        let record = entries[i].as_bytes();
        if record.len() < 4 {
            break;
        }
        let path = String::from_utf8_lossy(&record[3..]).into_owned();
        let (c1, c2) = (record[0], record[1]);

        if c1 == b'D' || c2 == b'D' {
            status.deleted.push(path);
        } else if c1 == b'?' || c2 == b'?' {
            status.untracked.push(path);
        }

        if c1 == b'R' || c2 == b'R' || c1 == b'C' || c2 == b'C' {
            i += 2;
        } else {
            i += 1;
        }
    }

    status
}

/// Parse `git branch -a --no-color` output.
///
/// The checked-out branch (leading `*`) becomes `head` and is listed first.
/// Detached-HEAD placeholders like `(HEAD detached at 1a2b3c)` and synthetic
/// `remotes/<remote>/HEAD` entries are skipped, as are branches under any
/// hidden remote.
pub fn parse_branch_list(output: &str, hide_remotes: &[String]) -> GitResult<BranchData> {
    let mut data = BranchData::default();
    let hide_patterns: Vec<String> = hide_remotes
        .iter()
        .map(|remote| format!("remotes/{remote}/"))
        .collect();

    for line in output.lines() {
        // The two-column marker prefix is ASCII in well-formed output; skip
        // any line where byte offset 2 is not a char boundary
        let Some(rest) = line.get(2..) else {
            continue;
        };
        let name = match rest.split(" -> ").next() {
            Some(name) if !name.is_empty() => name,
            _ => continue,
        };
        if is_invalid_branch_name(name)
            || hide_patterns.iter().any(|pattern| name.starts_with(pattern))
            || (name.starts_with("remotes/") && name.ends_with("/HEAD"))
        {
            continue;
        }

        if line.starts_with('*') {
            data.head = Some(name.to_string());
            data.branches.insert(0, name.to_string());
        } else {
            data.branches.push(name.to_string());
        }
    }

    Ok(data)
}

/// Parse `git remote` output into remote names
pub fn parse_remote_list(output: &str) -> Vec<String> {
    output.lines().map(str::to_string).collect()
}

/// Count the entries of a `git status --porcelain` listing
pub fn count_status_lines(output: &str) -> usize {
    output.lines().count()
}

// `git branch` renders non-branch states as "(...)", e.g. a detached HEAD
fn is_invalid_branch_name(name: &str) -> bool {
    name.starts_with('(') && name.ends_with(')') && name.contains(' ')
}

fn split_hash_list(field: &str) -> Vec<String> {
    if field.is_empty() {
        Vec::new()
    } else {
        field.split(' ').map(str::to_string).collect()
    }
}

fn remove_trailing_blank_lines(body: &str) -> String {
    body.trim_end_matches(['\r', '\n']).to_string()
}
