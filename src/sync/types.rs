//! Types produced by sync planning and application.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::Error;
use crate::model::RenderedPost;

/// Classification of one note against the blog, for one run.
///
/// The four values are exhaustive and mutually exclusive by construction:
/// the classifier returns from each branch before falling through. A status
/// is consumed immediately for display and write selection, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// The note carries an exclusion tag; it never touches the blog.
    Skip,
    /// No post exists at the target path yet.
    New,
    /// A post exists but its bytes differ from the current render.
    Update,
    /// The on-disk post is byte-identical to the current render.
    Stable,
}

impl SyncStatus {
    /// Uppercase form used for report lines.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Skip => "SKIP",
            Self::New => "NEW",
            Self::Update => "UPDATE",
            Self::Stable => "STABLE",
        }
    }

    /// Whether this status selects the note for writing.
    #[must_use]
    pub const fn is_actionable(self) -> bool {
        matches!(self, Self::New | Self::Update)
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified, ready-to-write note.
#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub post: RenderedPost,
    /// The canonical serialized text; exactly these bytes are written.
    pub text: String,
    pub status: SyncStatus,
    /// Full target path, `<posts dir>/<filename>.md`.
    pub target: PathBuf,
}

/// The per-note outcome of planning, in collection enumeration order.
///
/// A failing note is reported distinctly from classified notes — it never
/// receives a [`SyncStatus`].
#[derive(Debug)]
pub struct NoteReport {
    /// The note directory this report originates from.
    pub source: PathBuf,
    pub outcome: std::result::Result<PlanEntry, Error>,
}

/// Two or more distinct notes rendered to the same target filename.
///
/// Planning disambiguates the colliding filenames with a per-note suffix
/// instead of letting the last write win silently.
#[derive(Debug, Clone, Serialize)]
pub struct CollisionWarning {
    /// The filename the notes originally shared.
    pub filename: String,
    /// Source note directories involved in the collision.
    pub sources: Vec<PathBuf>,
}

/// The aggregate result of one planning pass. No writes have happened yet.
#[derive(Debug)]
pub struct SyncPlan {
    pub notes: Vec<NoteReport>,
    pub warnings: Vec<CollisionWarning>,
}

impl SyncPlan {
    /// Clone out the entries selected for writing (`New` and `Update`).
    #[must_use]
    pub fn actionable(&self) -> Vec<PlanEntry> {
        self.notes
            .iter()
            .filter_map(|report| report.outcome.as_ref().ok())
            .filter(|entry| entry.status.is_actionable())
            .cloned()
            .collect()
    }

    /// Number of notes that failed to load or render.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.notes
            .iter()
            .filter(|report| report.outcome.is_err())
            .count()
    }
}

/// The outcome of writing one post in the apply phase.
#[derive(Debug)]
pub struct WriteReport {
    pub filename: String,
    pub target: PathBuf,
    pub result: crate::error::Result<()>,
}
