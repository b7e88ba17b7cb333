//! In-memory `Platform` used by unit tests. Records every call it receives.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetCommit(String),
    GetTree { sha: String, recursive: bool },
    ListComments { issue: u64, page: u32 },
    CreateComment { issue: u64 },
    UpdateComment(u64),
    DeleteComment(u64),
}

#[derive(Default)]
struct MemoryState {
    commits: HashMap<String, String>,
    trees: HashMap<(String, bool), GitTree>,
    comments: Vec<(u64, IssueComment)>,
    next_comment_id: u64,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct MemoryPlatform {
    state: Mutex<MemoryState>,
}

pub fn blob(path: &str) -> TreeEntry {
    TreeEntry {
        path: path.to_string(),
        kind: EntryKind::Blob,
        sha: format!("blob-{path}"),
    }
}

pub fn tree(path: &str, sha: &str) -> TreeEntry {
    TreeEntry {
        path: path.to_string(),
        kind: EntryKind::Tree,
        sha: sha.to_string(),
    }
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_commit(self, commit_sha: &str, tree_sha: &str) -> Self {
        self.lock()
            .commits
            .insert(commit_sha.to_string(), tree_sha.to_string());
        self
    }

    /// Register the response for `get_tree(sha, recursive)`.
    pub fn with_tree(
        self,
        sha: &str,
        recursive: bool,
        truncated: bool,
        entries: Vec<TreeEntry>,
    ) -> Self {
        self.lock()
            .trees
            .insert((sha.to_string(), recursive), GitTree { truncated, entries });
        self
    }

    /// Seed an existing comment, returning its id.
    pub fn seed_comment(&self, issue_number: u64, body: &str) -> u64 {
        let mut state = self.lock();
        Self::insert_comment(&mut state, issue_number, body).id
    }

    pub fn comments(&self, issue_number: u64) -> Vec<IssueComment> {
        self.lock()
            .comments
            .iter()
            .filter(|(issue, _)| *issue == issue_number)
            .map(|(_, c)| c.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    fn insert_comment(state: &mut MemoryState, issue_number: u64, body: &str) -> IssueComment {
        state.next_comment_id += 1;
        let id = state.next_comment_id;
        let comment = IssueComment {
            id,
            body: body.to_string(),
            url: format!("https://api.example.test/issues/comments/{id}"),
            html_url: format!("https://example.test/pull/{issue_number}#issuecomment-{id}"),
        };
        state.comments.push((issue_number, comment.clone()));
        comment
    }

    fn not_found(what: &str) -> AppError {
        AppError::GitHubApi(format!("Not Found: {what}"))
    }
}

#[async_trait]
impl Platform for MemoryPlatform {
    async fn get_commit_tree(&self, commit_sha: &str) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(Call::GetCommit(commit_sha.to_string()));
        state
            .commits
            .get(commit_sha)
            .cloned()
            .ok_or_else(|| Self::not_found(&format!("commit {commit_sha}")))
    }

    async fn get_tree(&self, tree_sha: &str, recursive: bool) -> Result<GitTree> {
        let mut state = self.lock();
        state.calls.push(Call::GetTree {
            sha: tree_sha.to_string(),
            recursive,
        });
        state
            .trees
            .get(&(tree_sha.to_string(), recursive))
            .cloned()
            .ok_or_else(|| Self::not_found(&format!("tree {tree_sha}")))
    }

    async fn list_comments(
        &self,
        issue_number: u64,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<IssueComment>> {
        let mut state = self.lock();
        state.calls.push(Call::ListComments {
            issue: issue_number,
            page,
        });
        let skip = (page.saturating_sub(1) as usize) * per_page as usize;
        Ok(state
            .comments
            .iter()
            .filter(|(issue, _)| *issue == issue_number)
            .skip(skip)
            .take(per_page as usize)
            .map(|(_, c)| c.clone())
            .collect())
    }

    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<IssueComment> {
        let mut state = self.lock();
        state.calls.push(Call::CreateComment {
            issue: issue_number,
        });
        Ok(Self::insert_comment(&mut state, issue_number, body))
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<IssueComment> {
        let mut state = self.lock();
        state.calls.push(Call::UpdateComment(comment_id));
        let (_, comment) = state
            .comments
            .iter_mut()
            .find(|(_, c)| c.id == comment_id)
            .ok_or_else(|| Self::not_found(&format!("comment {comment_id}")))?;
        comment.body = body.to_string();
        Ok(comment.clone())
    }

    async fn delete_comment(&self, comment_id: u64) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::DeleteComment(comment_id));
        let before = state.comments.len();
        state.comments.retain(|(_, c)| c.id != comment_id);
        if state.comments.len() == before {
            return Err(Self::not_found(&format!("comment {comment_id}")));
        }
        Ok(())
    }
}
