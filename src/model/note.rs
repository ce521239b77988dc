//! Source note records as they exist in the library on disk.
//!
//! A note is a directory holding two companion JSON files: `meta.json`
//! (title, tags, creation time) and `content.json` (the ordered cells).
//! Both are read-only snapshots loaded fresh on every sync invocation,
//! never mutated, and discarded after rendering.

use serde::Deserialize;

/// The `meta.json` payload of a note.
///
/// Every field tolerates absence: an empty title is only rejected later,
/// at render time, where filename derivation would become ambiguous.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation time in epoch seconds.
    #[serde(default)]
    pub created_at: i64,
}

/// The `content.json` payload of a note.
#[derive(Debug, Clone, Deserialize)]
pub struct NoteContent {
    #[serde(default)]
    pub cells: Vec<ContentCell>,
}

/// One content cell, discriminated by its `type` field.
///
/// Cell order is significant: rendering concatenates cells in this order.
/// Cell types other than `markdown` and `code` deserialize to
/// [`ContentCell::Unsupported`] and contribute nothing to the rendered body.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentCell {
    Markdown {
        #[serde(default)]
        data: String,
    },
    Code {
        #[serde(default)]
        language: String,
        #[serde(default)]
        data: String,
    },
    #[serde(other)]
    Unsupported,
}

/// A fully loaded source note, merged from its two companion files.
#[derive(Debug, Clone)]
pub struct RawNote {
    pub title: String,
    /// Insertion order is irrelevant for exclusion matching but preserved
    /// for output.
    pub tags: Vec<String>,
    pub created_at: i64,
    pub cells: Vec<ContentCell>,
}

impl RawNote {
    /// Merge the two companion records into one note.
    #[must_use]
    pub fn from_records(meta: NoteMeta, content: NoteContent) -> Self {
        Self {
            title: meta.title,
            tags: meta.tags,
            created_at: meta.created_at,
            cells: content.cells,
        }
    }
}
