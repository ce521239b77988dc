//! Error types for quillsync.
//!
//! Provides structured error handling with:
//! - Machine-readable error codes (SCREAMING_SNAKE strings)
//! - Category-based exit codes (3=not_found, 4=validation, 7=config, 8=io)
//! - Context-aware recovery hints
//! - Structured JSON output for piped / non-TTY consumers
//!
//! Per-note errors (a missing companion file, an unparseable payload, an
//! empty title) are carried as values inside the sync plan and never abort
//! the batch; only configuration-level errors surface before per-note work.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for quillsync operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Which of a note's two companion files an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteFileKind {
    /// `meta.json` — title, tags, creation time.
    Meta,
    /// `content.json` — the ordered content cells.
    Content,
}

impl std::fmt::Display for NoteFileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Meta => write!(f, "meta"),
            Self::Content => write!(f, "content"),
        }
    }
}

/// Errors that can occur in quillsync operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file is not found: {}", path.display())]
    ConfigMissing { path: PathBuf },

    #[error("Collection is not found in the library: {}", path.display())]
    CollectionNotFound { path: PathBuf },

    #[error("Note {kind} file is not found [{}]", path.display())]
    NoteFileMissing { kind: NoteFileKind, path: PathBuf },

    #[error("Note {kind} file is malformed [{}]: {source}", path.display())]
    MalformedNote {
        kind: NoteFileKind,
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid note: {0}")]
    InvalidNote(String),

    #[error("Site config error: {0}")]
    SiteConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Machine-readable SCREAMING_SNAKE code string.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::ConfigMissing { .. } => "CONFIG_NOT_FOUND",
            Self::CollectionNotFound { .. } => "COLLECTION_NOT_FOUND",
            Self::NoteFileMissing { .. } => "NOTE_FILE_NOT_FOUND",
            Self::MalformedNote { .. } => "MALFORMED_NOTE",
            Self::InvalidNote(_) => "INVALID_NOTE",
            Self::SiteConfig(_) => "SITE_CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Yaml(_) => "YAML_ERROR",
        }
    }

    /// Category-based exit code.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::CollectionNotFound { .. } | Self::NoteFileMissing { .. } => 3,
            Self::MalformedNote { .. } | Self::InvalidNote(_) => 4,
            Self::Config(_) | Self::ConfigMissing { .. } | Self::SiteConfig(_) => 7,
            Self::Io(_) | Self::Json(_) | Self::Yaml(_) => 8,
        }
    }

    /// Context-aware recovery hint for humans.
    ///
    /// Returns `None` if no actionable suggestion exists.
    #[must_use]
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ConfigMissing { .. } => {
                Some("Run `quillsync init` to create a configuration".to_string())
            }
            Self::Config(_) => {
                Some("Run `quillsync init` to re-create the configuration".to_string())
            }
            Self::CollectionNotFound { .. } => Some(
                "The configured collection no longer exists. Run `quillsync init` to pick another."
                    .to_string(),
            ),
            _ => None,
        }
    }

    /// Structured JSON representation for machine consumption.
    #[must_use]
    pub fn to_structured_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
                "exit_code": self.exit_code(),
            }
        });

        if let Some(hint) = self.hint() {
            obj["error"]["hint"] = serde_json::Value::String(hint);
        }

        obj
    }
}
