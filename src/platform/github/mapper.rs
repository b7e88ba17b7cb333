use serde::Deserialize;

use crate::platform::types::{self, EntryKind};

/// `GET /repos/{owner}/{repo}/git/commits/{sha}` (only the fields we read).
#[derive(Debug, Deserialize)]
pub struct CommitPayload {
    pub tree: TreeRef,
}

#[derive(Debug, Deserialize)]
pub struct TreeRef {
    pub sha: String,
}

/// `GET /repos/{owner}/{repo}/git/trees/{sha}[?recursive=true]`
#[derive(Debug, Deserialize)]
pub struct TreePayload {
    #[serde(default)]
    pub truncated: bool,
    pub tree: Vec<TreeEntryPayload>,
}

#[derive(Debug, Deserialize)]
pub struct TreeEntryPayload {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub sha: String,
}

pub fn map_tree(tree: TreePayload) -> types::GitTree {
    types::GitTree {
        truncated: tree.truncated,
        entries: tree
            .tree
            .into_iter()
            .map(|e| types::TreeEntry {
                path: e.path,
                kind: e.kind,
                sha: e.sha,
            })
            .collect(),
    }
}

/// Map octocrab Comment to our platform IssueComment type.
pub fn map_comment(comment: octocrab::models::issues::Comment) -> types::IssueComment {
    types::IssueComment {
        id: comment.id.into_inner(),
        body: comment.body.unwrap_or_default(),
        url: comment.url.to_string(),
        html_url: comment.html_url.to_string(),
    }
}
