pub mod github;
pub mod types;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use types::*;

/// REST operations the step needs, scoped to a single repository.
#[async_trait]
pub trait Platform: Send + Sync {
    /// Resolve a commit to the sha of its root tree.
    async fn get_commit_tree(&self, commit_sha: &str) -> Result<String>;

    /// Fetch a git tree, optionally expanding every subtree in the same response.
    async fn get_tree(&self, tree_sha: &str, recursive: bool) -> Result<GitTree>;

    /// Fetch one page (1-based) of comments on an issue or PR.
    async fn list_comments(
        &self,
        issue_number: u64,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<IssueComment>>;

    /// Post a comment on an issue or PR.
    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<IssueComment>;

    /// Replace the body of an existing comment.
    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<IssueComment>;

    async fn delete_comment(&self, comment_id: u64) -> Result<()>;
}
