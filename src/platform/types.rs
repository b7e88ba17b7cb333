use serde::Deserialize;

/// One page of a git tree listing.
#[derive(Debug, Clone)]
pub struct GitTree {
    /// Set when a recursive expansion was too large to return in one response.
    pub truncated: bool,
    pub entries: Vec<TreeEntry>,
}

#[derive(Debug, Clone)]
pub struct TreeEntry {
    /// Path relative to the tree that was requested.
    pub path: String,
    pub kind: EntryKind,
    pub sha: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodule reference.
    Commit,
    #[serde(other)]
    Unknown,
}

/// A comment on an issue or pull request conversation.
#[derive(Debug, Clone)]
pub struct IssueComment {
    pub id: u64,
    pub body: String,
    pub url: String,
    pub html_url: String,
}
