use crate::git::layout::GraphNode;
use crate::git::parser::{CommitRecord, RefData, StashEntry};
use serde::Serialize;
use std::collections::HashMap;

/// Sentinel hash of the synthetic uncommitted-changes node. Never collides
/// with a real commit hash.
pub const UNCOMMITTED: &str = "*";

/// A tag pointing at a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitTag {
    pub name: String,
    pub annotated: bool,
}

/// A remote-tracking branch pointing at a commit.
///
/// `remote` is the configured remote the ref was resolved to, or `None` when
/// no known remote matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRemote {
    pub name: String,
    pub remote: Option<String>,
}

/// Stash metadata attached to a commit node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStash {
    pub selector: String,
    pub base_hash: String,
    pub untracked_files_hash: Option<String>,
}

/// One render-ready node of the commit graph: a commit, a stash, or the
/// synthetic uncommitted-changes entry, annotated with the refs pointing at it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitNode {
    pub hash: String,
    pub parents: Vec<String>,
    pub author: String,
    pub email: String,
    pub date: i64,
    pub message: String,
    pub heads: Vec<String>,
    pub tags: Vec<CommitTag>,
    pub remotes: Vec<CommitRemote>,
    pub stash: Option<CommitStash>,
}

impl GraphNode for CommitNode {
    fn hash(&self) -> &str {
        &self.hash
    }

    fn parents(&self) -> &[String] {
        &self.parents
    }
}

/// The assembled graph, ready for the rendering layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitData {
    pub commits: Vec<CommitNode>,
    pub head: Option<String>,
    pub tags: Vec<String>,
    pub more_commits_available: bool,
}

/// Merge the log, ref, and stash query results into one ordered node list.
///
/// `commits` is expected to have been fetched with `max_commits + 1` entries
/// requested; receiving all of them means more history exists beyond the
/// window, and the extra entry is dropped. `uncommitted_changes` is the
/// working-tree change count from the status-count query (0 = clean).
///
/// Refs and stashes whose hashes fall outside the fetched commit window are
/// silently dropped; the caller chose the window depth.
pub fn assemble(
    mut commits: Vec<CommitRecord>,
    max_commits: usize,
    ref_data: RefData,
    stashes: &[StashEntry],
    remotes: &[String],
    current_branch: Option<&str>,
    uncommitted_changes: usize,
) -> CommitData {
    let more_commits_available = commits.len() == max_commits + 1;
    if more_commits_available {
        commits.pop();
    }

    let mut nodes: Vec<CommitNode> = Vec::with_capacity(commits.len());
    for commit in commits {
        nodes.push(CommitNode {
            hash: commit.hash,
            parents: commit.parents,
            author: commit.author,
            email: commit.email,
            date: commit.date,
            message: commit.message,
            heads: Vec::new(),
            tags: Vec::new(),
            remotes: Vec::new(),
            stash: None,
        });
    }
    let mut lookup: HashMap<String, usize> = nodes
        .iter()
        .enumerate()
        .map(|(index, node)| (node.hash.clone(), index))
        .collect();

    if let Some(head) = &ref_data.head {
        if uncommitted_changes > 0 {
            if let Some(&head_index) = lookup.get(head) {
                nodes.insert(
                    head_index,
                    CommitNode {
                        hash: UNCOMMITTED.to_string(),
                        parents: vec![head.clone()],
                        author: "*".to_string(),
                        email: String::new(),
                        date: chrono::Utc::now().timestamp(),
                        message: format!("Uncommitted Changes ({uncommitted_changes})"),
                        heads: Vec::new(),
                        tags: Vec::new(),
                        remotes: Vec::new(),
                        stash: None,
                    },
                );
                rebuild_lookup(&nodes, &mut lookup);
            }
        }
    }

    // Stashes whose commit is already in the log keep that node; the rest are
    // spliced in directly after their base commit
    let mut to_add: Vec<(usize, &StashEntry)> = Vec::new();
    for stash in stashes {
        if let Some(&index) = lookup.get(&stash.hash) {
            nodes[index].stash = Some(CommitStash {
                selector: stash.selector.clone(),
                base_hash: stash.base_hash.clone(),
                untracked_files_hash: stash.untracked_files_hash.clone(),
            });
        } else if let Some(&base_index) = lookup.get(&stash.base_hash) {
            to_add.push((base_index, stash));
        }
    }
    to_add.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.date.cmp(&a.1.date)));
    // Insert from the highest target index downward so earlier insertions do
    // not shift the target of later ones
    for (base_index, stash) in to_add.into_iter().rev() {
        nodes.insert(
            base_index + 1,
            CommitNode {
                hash: stash.hash.clone(),
                parents: vec![stash.base_hash.clone()],
                author: stash.author.clone(),
                email: stash.email.clone(),
                date: stash.date,
                message: stash.message.clone(),
                heads: Vec::new(),
                tags: Vec::new(),
                remotes: Vec::new(),
                stash: Some(CommitStash {
                    selector: stash.selector.clone(),
                    base_hash: stash.base_hash.clone(),
                    untracked_files_hash: stash.untracked_files_hash.clone(),
                }),
            },
        );
    }
    rebuild_lookup(&nodes, &mut lookup);

    for head_ref in &ref_data.heads {
        if let Some(&index) = lookup.get(&head_ref.hash) {
            // The checked-out branch is listed ahead of any other branch
            // pointing at the same commit
            if current_branch == Some(head_ref.name.as_str()) {
                nodes[index].heads.insert(0, head_ref.name.clone());
            } else {
                nodes[index].heads.push(head_ref.name.clone());
            }
        }
    }

    let mut tags: Vec<String> = Vec::new();
    for tag_ref in &ref_data.tags {
        if let Some(&index) = lookup.get(&tag_ref.hash) {
            nodes[index].tags.push(CommitTag {
                name: tag_ref.name.clone(),
                annotated: tag_ref.annotated,
            });
            if !tags.contains(&tag_ref.name) {
                tags.push(tag_ref.name.clone());
            }
        }
    }

    for remote_ref in &ref_data.remotes {
        if let Some(&index) = lookup.get(&remote_ref.hash) {
            let remote = remotes
                .iter()
                .find(|remote| remote_ref.name.starts_with(&format!("{remote}/")))
                .cloned();
            nodes[index].remotes.push(CommitRemote {
                name: remote_ref.name.clone(),
                remote,
            });
        }
    }

    CommitData {
        commits: nodes,
        head: ref_data.head,
        tags,
        more_commits_available,
    }
}

fn rebuild_lookup(nodes: &[CommitNode], lookup: &mut HashMap<String, usize>) {
    lookup.clear();
    for (index, node) in nodes.iter().enumerate() {
        lookup.insert(node.hash.clone(), index);
    }
}
