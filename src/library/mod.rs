//! Note library access (Quiver file layout).
//!
//! A library is a directory of `*.qvnotebook` collections, each holding
//! `*.qvnote` note directories. Every note directory carries two companion
//! files, `meta.json` and `content.json`, which must both be present for the
//! note to load. Loading is independent per note; no note's result depends
//! on another's.
//!
//! Note enumeration and loading are async (they sit on the hot path of the
//! sync engine's bounded fan-out). Collection enumeration and the library
//! marker check are synchronous: they only serve the init wizard and the
//! `collections` command.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::error::{Error, NoteFileKind, Result};
use crate::model::{NoteContent, NoteMeta, RawNote};

/// Extension marking a collection directory.
const COLLECTION_EXT: &str = "qvnotebook";

/// Extension marking a note directory. Everything else under a collection
/// is silently excluded during enumeration.
const NOTE_EXT: &str = "qvnote";

const META_FILE: &str = "meta.json";
const CONTENT_FILE: &str = "content.json";

/// Built-in notebooks that never take part in syncing.
const RESERVED_COLLECTIONS: [&str; 2] = ["Trash", "Inbox"];

/// A collection's identity, as stored in its own `meta.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    /// Opaque identifier; the collection's directory is `<uuid>.qvnotebook`.
    pub uuid: String,
}

/// Read access to one note library on disk.
#[derive(Debug, Clone)]
pub struct NoteLibrary {
    root: PathBuf,
}

impl NoteLibrary {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `path` looks like a note library.
    ///
    /// The built-in trash notebook always exists in a real library, so its
    /// presence is the recognition marker.
    #[must_use]
    pub fn is_library(path: &Path) -> bool {
        path.is_dir() && path.join(format!("Trash.{COLLECTION_EXT}")).is_dir()
    }

    /// List the user's collections, sorted by name.
    ///
    /// Entries that are not `*.qvnotebook` directories, that carry no
    /// parseable `meta.json`, or that belong to the reserved built-ins are
    /// filtered silently.
    ///
    /// # Errors
    ///
    /// Returns an error only if the library root itself cannot be read.
    pub fn collections(&self) -> Result<Vec<Collection>> {
        let mut collections = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_dir() || path.extension().is_none_or(|e| e != COLLECTION_EXT) {
                continue;
            }
            let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            if RESERVED_COLLECTIONS.contains(&stem) {
                continue;
            }
            let Ok(bytes) = std::fs::read(path.join(META_FILE)) else {
                continue;
            };
            if let Ok(collection) = serde_json::from_slice::<Collection>(&bytes) {
                collections.push(collection);
            }
        }
        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }

    /// Enumerate the note directories of one collection, sorted by path.
    ///
    /// Only entries carrying the `.qvnote` suffix are returned; all other
    /// entries are excluded without error. The sorted order is what the
    /// final sync report preserves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CollectionNotFound`] if the collection directory
    /// does not exist, or an I/O error if it cannot be read.
    pub async fn note_paths(&self, collection_uuid: &str) -> Result<Vec<PathBuf>> {
        let dir = self.collection_dir(collection_uuid);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::CollectionNotFound { path: dir });
            }
            Err(e) => return Err(e.into()),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == NOTE_EXT) {
                paths.push(path);
            }
        }
        paths.sort();
        debug!(collection = collection_uuid, notes = paths.len(), "enumerated collection");
        Ok(paths)
    }

    /// Load one note from its directory.
    ///
    /// Both companion files must be present; the meta record is checked
    /// first, then the content record, and the error names the missing one.
    ///
    /// # Errors
    ///
    /// [`Error::NoteFileMissing`] if a companion file is absent,
    /// [`Error::MalformedNote`] if a payload does not deserialize, or an
    /// I/O error for an unreadable file.
    pub async fn load_note(&self, note_path: &Path) -> Result<RawNote> {
        let meta_path = note_path.join(META_FILE);
        let content_path = note_path.join(CONTENT_FILE);

        if !fs::try_exists(&meta_path).await? {
            return Err(Error::NoteFileMissing {
                kind: NoteFileKind::Meta,
                path: meta_path,
            });
        }
        if !fs::try_exists(&content_path).await? {
            return Err(Error::NoteFileMissing {
                kind: NoteFileKind::Content,
                path: content_path,
            });
        }

        let meta_bytes = fs::read(&meta_path).await?;
        let meta: NoteMeta =
            serde_json::from_slice(&meta_bytes).map_err(|source| Error::MalformedNote {
                kind: NoteFileKind::Meta,
                path: meta_path,
                source,
            })?;

        let content_bytes = fs::read(&content_path).await?;
        let content: NoteContent =
            serde_json::from_slice(&content_bytes).map_err(|source| Error::MalformedNote {
                kind: NoteFileKind::Content,
                path: content_path,
                source,
            })?;

        Ok(RawNote::from_records(meta, content))
    }

    fn collection_dir(&self, collection_uuid: &str) -> PathBuf {
        self.root.join(format!("{collection_uuid}.{COLLECTION_EXT}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use tempfile::TempDir;

    fn make_library(dir: &Path) -> NoteLibrary {
        stdfs::create_dir_all(dir.join("Trash.qvnotebook")).unwrap();
        NoteLibrary::new(dir)
    }

    fn make_collection(dir: &Path, name: &str, uuid: &str) -> PathBuf {
        let path = dir.join(format!("{uuid}.qvnotebook"));
        stdfs::create_dir_all(&path).unwrap();
        stdfs::write(
            path.join("meta.json"),
            format!(r#"{{"name":"{name}","uuid":"{uuid}"}}"#),
        )
        .unwrap();
        path
    }

    fn make_note(collection: &Path, dir_name: &str, meta: &str, content: &str) -> PathBuf {
        let path = collection.join(dir_name);
        stdfs::create_dir_all(&path).unwrap();
        stdfs::write(path.join("meta.json"), meta).unwrap();
        stdfs::write(path.join("content.json"), content).unwrap();
        path
    }

    #[test]
    fn test_is_library_requires_trash_notebook() {
        let tmp = TempDir::new().unwrap();
        assert!(!NoteLibrary::is_library(tmp.path()));
        stdfs::create_dir_all(tmp.path().join("Trash.qvnotebook")).unwrap();
        assert!(NoteLibrary::is_library(tmp.path()));
    }

    #[test]
    fn test_collections_skips_reserved_and_unparseable() {
        let tmp = TempDir::new().unwrap();
        let library = make_library(tmp.path());
        make_collection(tmp.path(), "Blog", "b1");
        make_collection(tmp.path(), "Articles", "a1");
        // Inbox is reserved even with a valid meta file.
        let inbox = tmp.path().join("Inbox.qvnotebook");
        stdfs::create_dir_all(&inbox).unwrap();
        stdfs::write(inbox.join("meta.json"), r#"{"name":"Inbox","uuid":"i1"}"#).unwrap();
        // A notebook without meta.json is filtered, not an error.
        stdfs::create_dir_all(tmp.path().join("broken.qvnotebook")).unwrap();

        let names: Vec<_> = library
            .collections()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Articles", "Blog"]);
    }

    #[tokio::test]
    async fn test_note_paths_filters_by_suffix_and_sorts() {
        let tmp = TempDir::new().unwrap();
        let library = make_library(tmp.path());
        let collection = make_collection(tmp.path(), "Blog", "b1");
        make_note(&collection, "b.qvnote", "{}", "{}");
        make_note(&collection, "a.qvnote", "{}", "{}");
        stdfs::write(collection.join("stray.txt"), "x").unwrap();

        let paths = library.note_paths("b1").await.unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.qvnote", "b.qvnote"]);
    }

    #[tokio::test]
    async fn test_note_paths_for_missing_collection() {
        let tmp = TempDir::new().unwrap();
        let library = make_library(tmp.path());
        let err = library.note_paths("nope").await.unwrap_err();
        assert!(matches!(err, Error::CollectionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_load_note_reports_which_file_is_missing() {
        let tmp = TempDir::new().unwrap();
        let library = make_library(tmp.path());
        let collection = make_collection(tmp.path(), "Blog", "b1");

        let note = collection.join("n.qvnote");
        stdfs::create_dir_all(&note).unwrap();
        let err = library.load_note(&note).await.unwrap_err();
        assert!(matches!(
            err,
            Error::NoteFileMissing {
                kind: NoteFileKind::Meta,
                ..
            }
        ));

        stdfs::write(note.join("meta.json"), r#"{"title":"T"}"#).unwrap();
        let err = library.load_note(&note).await.unwrap_err();
        assert!(matches!(
            err,
            Error::NoteFileMissing {
                kind: NoteFileKind::Content,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_load_note_rejects_malformed_payload() {
        let tmp = TempDir::new().unwrap();
        let library = make_library(tmp.path());
        let collection = make_collection(tmp.path(), "Blog", "b1");
        let note = make_note(&collection, "n.qvnote", "not json", "{}");

        let err = library.load_note(&note).await.unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedNote {
                kind: NoteFileKind::Meta,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_load_note_merges_meta_and_content() {
        let tmp = TempDir::new().unwrap();
        let library = make_library(tmp.path());
        let collection = make_collection(tmp.path(), "Blog", "b1");
        let note = make_note(
            &collection,
            "n.qvnote",
            r#"{"title":"Hello","tags":["post"],"created_at":1451606400}"#,
            r#"{"cells":[{"type":"markdown","data":"body"}]}"#,
        );

        let raw = library.load_note(&note).await.unwrap();
        assert_eq!(raw.title, "Hello");
        assert_eq!(raw.tags, vec!["post"]);
        assert_eq!(raw.created_at, 1_451_606_400);
        assert_eq!(raw.cells.len(), 1);
    }
}
