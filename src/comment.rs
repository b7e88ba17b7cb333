use chrono::{DateTime, Utc};
use tracing::Instrument;

use crate::context::events::PullRequestPayload;
use crate::error::{AppError, Result};
use crate::platform::types::IssueComment;
use crate::platform::Platform;

const COMMENTS_PER_PAGE: u8 = 20;
const NAME_PLACEHOLDER: &str = "data-name";

/// Identity marker placed at the top of every comment this step owns.
pub fn comment_header(pr_id: u64, name: &str) -> String {
    let data_name = if name.is_empty() { NAME_PLACEHOLDER } else { name };
    format!("\n<p data-id='{pr_id}' data-name='{data_name}'>{name}</p>\n\n")
}

pub fn comment_footer(updated_at: DateTime<Utc>) -> String {
    format!(
        "\n<p>Last Update @ {}</p>\n",
        updated_at.format("%a, %d %b %Y %H:%M:%S GMT")
    )
}

/// Keep exactly one comment named `name` on the pull request, with `message` as its content.
///
/// The first comment carrying the identity marker is updated in place, or a new one is
/// created when none exists. Any further marked comments (left behind by runs that
/// raced each other) are deleted afterwards. Without a pull request this does nothing.
pub async fn upsert_comment<P: Platform + ?Sized>(
    platform: &P,
    pull_request: Option<&PullRequestPayload>,
    name: &str,
    message: &str,
) -> Result<Option<IssueComment>> {
    let Some(pr) = pull_request else {
        tracing::debug!(name = %name, "No pull request for this event, skipping comment");
        return Ok(None);
    };

    let pr_id = pr.id.ok_or_else(|| {
        AppError::MalformedEvent(
            "Pull request in event payload is missing 'pull_request.id' field".to_string(),
        )
    })?;

    let span = tracing::info_span!("upsert_comment", pr = pr.number, name = %name);
    async move {
        let header = comment_header(pr_id, name);
        let previous = list_previous_comments(platform, pr.number, &header).await?;

        let body = format!("{header}{message}{}", comment_footer(Utc::now()));
        let comment = match previous.first() {
            None => {
                tracing::debug!("No previous comments found, creating a new one...");
                platform.create_comment(pr.number, &body).await?
            }
            Some(existing) => {
                tracing::debug!(comment_id = existing.id, "Previous comment found, updating...");
                platform.update_comment(existing.id, &body).await?
            }
        };

        let surplus = previous.get(1..).unwrap_or_default();
        if !surplus.is_empty() {
            tracing::debug!(count = surplus.len(), "Removing surplus comments");
        }
        for stale in surplus {
            platform.delete_comment(stale.id).await?;
        }

        tracing::debug!(url = %comment.url, html_url = %comment.html_url, "Posted comment");
        Ok(Some(comment))
    }
    .instrument(span)
    .await
}

/// Page through all comments on the PR and keep those bearing `header`, in listing order.
async fn list_previous_comments<P: Platform + ?Sized>(
    platform: &P,
    issue_number: u64,
    header: &str,
) -> Result<Vec<IssueComment>> {
    let mut results = Vec::new();
    let mut page = 1;
    loop {
        let batch = platform
            .list_comments(issue_number, page, COMMENTS_PER_PAGE)
            .await?;
        let full_page = batch.len() == COMMENTS_PER_PAGE as usize;
        results.extend(batch.into_iter().filter(|c| c.body.contains(header)));
        if !full_page {
            break;
        }
        page += 1;
    }
    Ok(results)
}
