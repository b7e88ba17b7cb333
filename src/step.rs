use std::path::Path;

use crate::artifact::ArtifactFetcher;
use crate::comment;
use crate::config::{AppConfig, RunnerEnv};
use crate::context::{self, events::TriggerEvent, TriggerContext};
use crate::error::{AppError, Result};
use crate::platform::github::{GitHubPlatform, RepoRef};
use crate::platform::types::IssueComment;
use crate::platform::Platform;
use crate::tree;

/// Everything a pipeline step invocation needs: runner coordinates, the parsed
/// triggering event and a REST client scoped to the current repository.
pub struct StepContext<P: Platform = GitHubPlatform> {
    pub runner: RunnerEnv,
    pub event: TriggerEvent,
    pub repo: RepoRef,
    api_url: String,
    token: Option<String>,
    platform: Option<P>,
}

impl StepContext<GitHubPlatform> {
    /// Build from the runner environment. `token` takes precedence over the configured one;
    /// without any token only trigger resolution is available.
    pub fn new(config: AppConfig, runner: RunnerEnv, token: Option<String>) -> Result<Self> {
        let event = context::load_event(&runner)?;
        let repo = RepoRef::parse(&runner.repository)?;
        let api_url = config.api_url(&runner);
        let token = token.or_else(|| config.github.token.clone());

        let platform = token
            .as_deref()
            .map(|t| GitHubPlatform::new(&api_url, t, repo.clone()))
            .transpose()?;

        tracing::debug!(
            repo = %repo,
            event_name = %runner.event_name,
            api_url = %api_url,
            "Loaded step context"
        );

        Ok(Self {
            runner,
            event,
            repo,
            api_url,
            token,
            platform,
        })
    }
}

impl<P: Platform> StepContext<P> {
    pub fn resolve_trigger_context(&self) -> Result<TriggerContext> {
        context::resolve_trigger_context(&self.runner, &self.event)
    }

    /// Download an artifact of the current repository to `file_name`.
    pub async fn download_artifact(
        &self,
        artifact_id: u64,
        file_name: &Path,
        token: &str,
    ) -> Result<u64> {
        ArtifactFetcher::new(&self.api_url, self.repo.clone())?
            .download(artifact_id, file_name, token)
            .await
    }

    pub async fn list_files(&self, sha: &str) -> Result<Vec<String>> {
        tree::list_files(self.platform()?, sha).await
    }

    /// Create or refresh the status comment `name` on the triggering pull request.
    pub async fn upsert_comment(&self, name: &str, message: &str) -> Result<Option<IssueComment>> {
        let pull_request = self.event.pull_request();
        if pull_request.is_none() {
            return Ok(None);
        }
        comment::upsert_comment(self.platform()?, pull_request, name, message).await
    }

    pub fn token(&self) -> Result<&str> {
        self.token.as_deref().ok_or_else(missing_token)
    }

    fn platform(&self) -> Result<&P> {
        self.platform.as_ref().ok_or_else(missing_token)
    }
}

fn missing_token() -> AppError {
    AppError::Config("No GitHub token configured (use --token or GITHUB_TOKEN)".to_string())
}

#[cfg(test)]
impl<P: Platform> StepContext<P> {
    fn with_platform(runner: RunnerEnv, event: TriggerEvent, platform: P) -> Self {
        let repo = RepoRef::parse(&runner.repository).unwrap();
        Self {
            runner,
            event,
            repo,
            api_url: "http://127.0.0.1:9".to_string(),
            token: None,
            platform: Some(platform),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::memory::{blob, MemoryPlatform};

    fn runner() -> RunnerEnv {
        RunnerEnv {
            repository: "octo/widgets".to_string(),
            run_id: 9,
            sha: "runner-sha".to_string(),
            event_name: "push".to_string(),
            event_path: None,
            api_url: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_without_pull_request_skips_api() {
        let step = StepContext::with_platform(
            runner(),
            TriggerEvent::Other("push".to_string()),
            MemoryPlatform::new(),
        );

        let result = step.upsert_comment("coverage", "report").await.unwrap();
        assert!(result.is_none());
        assert!(step.platform().unwrap().calls().is_empty());
    }

    #[tokio::test]
    async fn test_list_files_for_resolved_sha() {
        let platform = MemoryPlatform::new()
            .with_commit("runner-sha", "root")
            .with_tree("root", true, false, vec![blob("Cargo.toml"), blob("src/lib.rs")]);
        let step = StepContext::with_platform(
            runner(),
            TriggerEvent::Other("push".to_string()),
            platform,
        );

        let ctx = step.resolve_trigger_context().unwrap();
        let files = step.list_files(&ctx.commit_sha).await.unwrap();
        assert_eq!(files, vec!["Cargo.toml", "src/lib.rs"]);
    }

    #[test]
    fn test_new_without_token_still_resolves_context() {
        let step = StepContext::new(AppConfig::default(), runner(), None).unwrap();
        assert!(step.token().is_err());
        assert_eq!(step.resolve_trigger_context().unwrap().commit_sha, "runner-sha");
    }

    #[tokio::test]
    async fn test_configured_token_used_when_none_given() {
        let mut config = AppConfig::default();
        config.github.token = Some("from-config".to_string());

        let step = StepContext::new(config.clone(), runner(), None).unwrap();
        assert_eq!(step.token().unwrap(), "from-config");

        let step = StepContext::new(config, runner(), Some("from-cli".to_string())).unwrap();
        assert_eq!(step.token().unwrap(), "from-cli");
    }

    #[tokio::test]
    async fn test_list_files_without_token_is_config_error() {
        let step = StepContext::new(AppConfig::default(), runner(), None).unwrap();
        let err = step.list_files("abc").await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
