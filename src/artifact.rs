use std::path::Path;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, LOCATION};
use reqwest::{redirect, Client, StatusCode, Url};
use tokio::io::AsyncWriteExt;
use tracing::Instrument;

use crate::error::{AppError, Result};
use crate::platform::github::RepoRef;

const GITHUB_JSON: &str = "application/vnd.github+json";
const CLIENT_USER_AGENT: &str = "ghstep";
const PROGRESS_INTERVAL: u64 = 1024 * 1024;

/// Downloads workflow artifacts as zip archives.
///
/// The artifact endpoint never serves bytes itself: it answers `302 Found` with a
/// short-lived blob URL, which is then streamed to disk.
pub struct ArtifactFetcher {
    api_url: String,
    repo: RepoRef,
    /// Redirects disabled, so the blob URL can be read from the first response.
    api_client: Client,
    download_client: Client,
}

impl ArtifactFetcher {
    pub fn new(api_url: &str, repo: RepoRef) -> Result<Self> {
        let api_client = Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(CLIENT_USER_AGENT)
            .build()?;
        let download_client = Client::builder().user_agent(CLIENT_USER_AGENT).build()?;

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            repo,
            api_client,
            download_client,
        })
    }

    /// Download artifact `artifact_id` to `destination`, returning the number of bytes written.
    ///
    /// The destination is only created once the blob URL is known. A failure while
    /// streaming can leave a partial file behind.
    pub async fn download(&self, artifact_id: u64, destination: &Path, token: &str) -> Result<u64> {
        let span = tracing::info_span!(
            "download_artifact",
            artifact_id,
            file = %destination.display()
        );
        async move {
            tracing::info!(artifact_id, "Downloading artifact");
            let url = self.resolve_download_url(artifact_id, token).await?;
            self.stream_to_file(url, destination, token).await
        }
        .instrument(span)
        .await
    }

    fn metadata_url(&self, artifact_id: u64) -> String {
        let RepoRef { owner, repo } = &self.repo;
        format!(
            "{}/repos/{owner}/{repo}/actions/artifacts/{artifact_id}/zip",
            self.api_url
        )
    }

    async fn resolve_download_url(&self, artifact_id: u64, token: &str) -> Result<Url> {
        let response = self
            .api_client
            .get(self.metadata_url(artifact_id))
            .bearer_auth(token)
            .header(ACCEPT, GITHUB_JSON)
            .send()
            .await
            .map_err(|e| AppError::ArtifactFetch(format!("request failed: {e}")))?;

        let status = response.status();
        tracing::info!(status = %status, "Fetch artifact URL");
        if status != StatusCode::FOUND {
            return Err(AppError::ArtifactFetch(format!(
                "received unexpected status code {status}"
            )));
        }

        let Some(location) = response.headers().get(LOCATION) else {
            let received: Vec<&str> = response.headers().keys().map(|k| k.as_str()).collect();
            tracing::info!(headers = %received.join(", "), "Received headers");
            return Err(AppError::ArtifactFetch(
                "Location header was not found in API response".to_string(),
            ));
        };

        let location = location.to_str().map_err(|_| {
            AppError::ArtifactFetch(format!(
                "Location header has unexpected value: {location:?}"
            ))
        })?;

        // Resolve against the request URL in case the platform answers with a relative path.
        response.url().join(location).map_err(|e| {
            AppError::ArtifactFetch(format!("Location header is not a valid URL: {e}"))
        })
    }

    async fn stream_to_file(&self, url: Url, destination: &Path, token: &str) -> Result<u64> {
        tracing::info!(url = %url, "Downloading");
        let response = self
            .download_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Transfer(e.to_string()))?;

        let mut file = tokio::fs::File::create(destination).await.map_err(|e| {
            AppError::Transfer(format!("Failed to create {}: {e}", destination.display()))
        })?;

        let mut stream = response.bytes_stream();
        let mut transferred: u64 = 0;
        let mut next_report = PROGRESS_INTERVAL;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AppError::Transfer(e.to_string()))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::Transfer(e.to_string()))?;
            transferred += chunk.len() as u64;
            if transferred >= next_report {
                tracing::info!(bytes = transferred, "Progress");
                next_report = transferred + PROGRESS_INTERVAL;
            }
        }
        file.flush()
            .await
            .map_err(|e| AppError::Transfer(e.to_string()))?;

        tracing::info!(bytes = transferred, "Artifact downloaded");
        Ok(transferred)
    }
}
