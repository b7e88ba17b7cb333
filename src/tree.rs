use tracing::Instrument;

use crate::error::Result;
use crate::platform::types::EntryKind;
use crate::platform::Platform;

/// List every file tracked at `commit_sha`, as repository-relative paths.
///
/// Each tree is requested with recursive expansion. When the platform reports the
/// expansion as truncated, that tree is fetched again without it and its subtrees
/// are expanded one by one; otherwise subtrees are already inlined and skipped.
/// Truncation is checked for every tree fetched, at any depth.
///
/// Paths come back in API order: files of an explicitly expanded subtree appear at
/// that subtree's position among its parent's entries.
pub async fn list_files<P: Platform + ?Sized>(
    platform: &P,
    commit_sha: &str,
) -> Result<Vec<String>> {
    let span = tracing::info_span!("list_files", commit = %commit_sha);
    async move {
        tracing::info!("Fetching list of tracked files from GitHub");
        let root = platform.get_commit_tree(commit_sha).await?;
        let files = list_git_tree(platform, root).await?;
        tracing::info!(count = files.len(), "Listed tracked files");
        Ok(files)
    }
    .instrument(span)
    .await
}

/// Worklist item: a path ready to emit, or a tree still to expand under a prefix.
enum Pending {
    File(String),
    Tree { sha: String, prefix: String },
}

async fn list_git_tree<P: Platform + ?Sized>(
    platform: &P,
    root_sha: String,
) -> Result<Vec<String>> {
    let mut result = Vec::new();
    // Popped from the back, so entries are pushed in reverse
    let mut pending = vec![Pending::Tree {
        sha: root_sha,
        prefix: String::new(),
    }];

    while let Some(item) = pending.pop() {
        let (sha, prefix) = match item {
            Pending::File(path) => {
                result.push(path);
                continue;
            }
            Pending::Tree { sha, prefix } => (sha, prefix),
        };

        if prefix.is_empty() {
            tracing::info!(tree = %sha, "Fetching tree");
        } else {
            tracing::info!(tree = %sha, path = %prefix, "Fetching tree");
        }

        let mut tree = platform.get_tree(&sha, true).await?;
        let truncated = tree.truncated;
        if truncated {
            tracing::info!(tree = %sha, "Recursive listing truncated, expanding subtrees one by one");
            tree = platform.get_tree(&sha, false).await?;
        }

        for entry in tree.entries.into_iter().rev() {
            let file = format!("{prefix}{}", entry.path);
            match entry.kind {
                EntryKind::Blob => pending.push(Pending::File(file)),
                EntryKind::Tree if truncated => pending.push(Pending::Tree {
                    sha: entry.sha,
                    prefix: format!("{file}/"),
                }),
                EntryKind::Tree | EntryKind::Commit | EntryKind::Unknown => {}
            }
        }
    }

    Ok(result)
}
