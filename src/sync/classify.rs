//! Status classification against the blog's posts directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::Result;
use crate::model::RenderedPost;
use crate::sync::types::SyncStatus;

/// Target path for a post: `<posts_dir>/<filename>.md`.
#[must_use]
pub fn target_path(posts_dir: &Path, post: &RenderedPost) -> PathBuf {
    posts_dir.join(format!("{}.md", post.filename))
}

/// Classify one rendered post against the on-disk target.
///
/// First match wins:
/// 1. the post's tags intersect `exclude_tags` — `Skip`, decided before any
///    filesystem access, so excluded notes never touch the target directory;
/// 2. no file exists at the target path — `New`;
/// 3. the existing file's bytes equal `post_text` — `Stable`, else `Update`.
///
/// # Errors
///
/// A read error on an existing file (permissions, mid-write truncation)
/// propagates and aborts classification for this note only, never for the
/// batch.
pub async fn classify(
    post: &RenderedPost,
    post_text: &str,
    posts_dir: &Path,
    exclude_tags: &BTreeSet<String>,
) -> Result<SyncStatus> {
    if post.tags.iter().any(|tag| exclude_tags.contains(tag)) {
        return Ok(SyncStatus::Skip);
    }

    let target = target_path(posts_dir, post);
    let existing = match fs::read(&target).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(SyncStatus::New),
        Err(e) => return Err(e.into()),
    };

    if existing == post_text.as_bytes() {
        Ok(SyncStatus::Stable)
    } else {
        Ok(SyncStatus::Update)
    }
}
