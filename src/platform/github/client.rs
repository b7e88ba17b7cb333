use async_trait::async_trait;
use octocrab::models::CommentId;
use octocrab::Octocrab;

use crate::error::{AppError, Result};
use crate::platform::types::*;
use crate::platform::Platform;

use super::mapper::{self, CommitPayload, TreePayload};

/// `owner/repo` coordinates of a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
}

impl RepoRef {
    pub fn parse(repo_full_name: &str) -> Result<Self> {
        match repo_full_name.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() => Ok(Self {
                owner: owner.to_string(),
                repo: repo.to_string(),
            }),
            _ => Err(AppError::Config(format!(
                "Invalid repo name: {repo_full_name}"
            ))),
        }
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

pub struct GitHubPlatform {
    client: Octocrab,
    repo: RepoRef,
}

impl GitHubPlatform {
    pub fn new(api_url: &str, token: &str, repo: RepoRef) -> Result<Self> {
        let client = Octocrab::builder()
            .base_uri(api_url)
            .map_err(|e| AppError::Config(format!("Invalid API URL {api_url}: {e}")))?
            .personal_token(token.to_string())
            .build()
            .map_err(|e| AppError::GitHubApi(format!("Failed to build octocrab client: {e}")))?;

        Ok(Self { client, repo })
    }

    pub fn repo(&self) -> &RepoRef {
        &self.repo
    }
}

#[async_trait]
impl Platform for GitHubPlatform {
    async fn get_commit_tree(&self, commit_sha: &str) -> Result<String> {
        let RepoRef { owner, repo } = &self.repo;
        let url = format!("/repos/{owner}/{repo}/git/commits/{commit_sha}");
        let commit: CommitPayload = self.client.get(&url, None::<&()>).await?;
        Ok(commit.tree.sha)
    }

    async fn get_tree(&self, tree_sha: &str, recursive: bool) -> Result<GitTree> {
        let RepoRef { owner, repo } = &self.repo;
        let mut url = format!("/repos/{owner}/{repo}/git/trees/{tree_sha}");
        if recursive {
            url.push_str("?recursive=true");
        }
        let tree: TreePayload = self.client.get(&url, None::<&()>).await?;
        Ok(mapper::map_tree(tree))
    }

    async fn list_comments(
        &self,
        issue_number: u64,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<IssueComment>> {
        let page = self
            .client
            .issues(&self.repo.owner, &self.repo.repo)
            .list_comments(issue_number)
            .page(page)
            .per_page(per_page)
            .send()
            .await?;

        Ok(page.items.into_iter().map(mapper::map_comment).collect())
    }

    async fn create_comment(&self, issue_number: u64, body: &str) -> Result<IssueComment> {
        let comment = self
            .client
            .issues(&self.repo.owner, &self.repo.repo)
            .create_comment(issue_number, body)
            .await?;

        Ok(mapper::map_comment(comment))
    }

    async fn update_comment(&self, comment_id: u64, body: &str) -> Result<IssueComment> {
        let comment = self
            .client
            .issues(&self.repo.owner, &self.repo.repo)
            .update_comment(CommentId::from(comment_id), body)
            .await?;

        Ok(mapper::map_comment(comment))
    }

    async fn delete_comment(&self, comment_id: u64) -> Result<()> {
        self.client
            .issues(&self.repo.owner, &self.repo.repo)
            .delete_comment(CommentId::from(comment_id))
            .await?;

        Ok(())
    }
}
