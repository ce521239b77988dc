//! Atomic post writes.
//!
//! Posts are written via a hidden temp file in the target directory, synced
//! to disk, then renamed into place. A reader (including the classifier on
//! a subsequent run) never observes a partially written post, and the site
//! generator never picks up the temp file.

use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::error::Result;

/// Write `bytes` to `path` atomically, creating parent directories.
///
/// # Errors
///
/// Returns an error if any file operation fails; the previous file content
/// (if any) is left untouched in that case.
pub async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = temp_path(path);
    {
        let mut file = File::create(&temp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
    }
    fs::rename(&temp_path, path).await?;

    Ok(())
}

/// Hidden sibling used during the write: `.<file name>.tmp`.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}
