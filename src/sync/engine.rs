//! Sync planning and application.
//!
//! Planning is read-only: every note in the configured collection is
//! loaded, rendered, and classified, and the aggregate plan is returned in
//! collection enumeration order. Application is strictly sequenced after
//! planning and writes only the entries the caller selected, so an
//! interruption before apply leaves the blog untouched, and a later run
//! reclassifies from current disk state.
//!
//! Per-note work is independent, so both phases fan out on the runtime,
//! bounded by a semaphore to keep the number of open files in check on
//! large collections. Results are correlated back to their source index;
//! completion order never leaks into the report.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::library::NoteLibrary;
use crate::model::{render, RenderedPost};
use crate::site;
use crate::sync::classify::{classify, target_path};
use crate::sync::file::atomic_write;
use crate::sync::types::{CollisionWarning, NoteReport, PlanEntry, SyncPlan, WriteReport};

/// Upper bound on concurrently processed notes.
const NOTE_IO_CONCURRENCY: usize = 64;

/// The synchronization engine for one validated configuration.
#[derive(Debug)]
pub struct SyncEngine {
    config: Config,
    posts_dir: PathBuf,
}

impl SyncEngine {
    /// Validate the configuration and resolve the posts directory once.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a partially populated config, or a
    /// site config error if the blog's own configuration cannot be read.
    pub async fn open(config: Config) -> Result<Self> {
        config.validate()?;
        let site_config = site::load_config(&config.blog).await?;
        let posts_dir = site_config.posts_dir(&config.blog);
        Ok(Self { config, posts_dir })
    }

    /// Directory rendered posts are classified against and written to.
    #[must_use]
    pub fn posts_dir(&self) -> &Path {
        &self.posts_dir
    }

    /// Plan the sync: load, render, and classify every note.
    ///
    /// Returns one report per note, in collection enumeration order.
    /// Per-note failures are carried inside the plan; this performs no
    /// writes.
    ///
    /// # Errors
    ///
    /// Only enumeration-level failures (missing collection, unreadable
    /// collection directory) abort planning.
    pub async fn plan(&self) -> Result<SyncPlan> {
        let library = NoteLibrary::new(&self.config.library);
        let paths = library.note_paths(&self.config.collection.uuid).await?;
        debug!(notes = paths.len(), "planning sync");

        // Load and render concurrently; slot results back by index.
        let semaphore = Arc::new(Semaphore::new(NOTE_IO_CONCURRENCY));
        let mut tasks = JoinSet::new();
        for (idx, path) in paths.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let library = library.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore is never closed");
                let outcome = match library.load_note(&path).await {
                    Ok(note) => render(&note).map(|post| {
                        let text = post.to_post_text();
                        (post, text)
                    }),
                    Err(e) => Err(e),
                };
                (idx, outcome)
            });
        }

        let mut rendered: Vec<Option<Result<(RenderedPost, String)>>> = Vec::new();
        rendered.resize_with(paths.len(), || None);
        while let Some(joined) = tasks.join_next().await {
            let (idx, outcome) = joined.expect("note task panicked");
            rendered[idx] = Some(outcome);
        }

        // Colliding filenames would silently overwrite one another at
        // apply time; disambiguate them before classification.
        let warnings = resolve_collisions(&paths, &mut rendered);

        // Classify concurrently, same bound, same index correlation.
        let exclude_tags = Arc::new(self.config.exclude_tags.clone());
        let mut tasks = JoinSet::new();
        let mut outcomes: Vec<Option<std::result::Result<PlanEntry, crate::error::Error>>> =
            Vec::new();
        outcomes.resize_with(paths.len(), || None);
        for (idx, slot) in rendered.into_iter().enumerate() {
            match slot.expect("every note task reports a result") {
                Err(e) => outcomes[idx] = Some(Err(e)),
                Ok((post, text)) => {
                    let semaphore = Arc::clone(&semaphore);
                    let exclude_tags = Arc::clone(&exclude_tags);
                    let posts_dir = self.posts_dir.clone();
                    tasks.spawn(async move {
                        let _permit = semaphore
                            .acquire_owned()
                            .await
                            .expect("semaphore is never closed");
                        let outcome = classify(&post, &text, &posts_dir, &exclude_tags)
                            .await
                            .map(|status| {
                                let target = target_path(&posts_dir, &post);
                                PlanEntry {
                                    post,
                                    text,
                                    status,
                                    target,
                                }
                            });
                        (idx, outcome)
                    });
                }
            }
        }
        while let Some(joined) = tasks.join_next().await {
            let (idx, outcome) = joined.expect("classify task panicked");
            outcomes[idx] = Some(outcome);
        }

        let notes = paths
            .into_iter()
            .zip(outcomes)
            .map(|(source, outcome)| NoteReport {
                source,
                outcome: outcome.expect("every note receives an outcome"),
            })
            .collect();

        Ok(SyncPlan { notes, warnings })
    }

    /// Write each entry's serialized text to its target path.
    ///
    /// Writes are independent: one failure neither blocks the others nor
    /// aborts the batch, and every outcome is collected into the returned
    /// reports (ordered like `entries`).
    pub async fn apply(&self, entries: &[PlanEntry]) -> Vec<WriteReport> {
        let semaphore = Arc::new(Semaphore::new(NOTE_IO_CONCURRENCY));
        let mut tasks = JoinSet::new();
        for (idx, entry) in entries.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let filename = entry.post.filename.clone();
            let target = entry.target.clone();
            let text = entry.text.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore is never closed");
                let result = atomic_write(&target, text.as_bytes()).await;
                (
                    idx,
                    WriteReport {
                        filename,
                        target,
                        result,
                    },
                )
            });
        }

        let mut reports: Vec<Option<WriteReport>> = Vec::new();
        reports.resize_with(entries.len(), || None);
        while let Some(joined) = tasks.join_next().await {
            let (idx, report) = joined.expect("write task panicked");
            reports[idx] = Some(report);
        }
        reports
            .into_iter()
            .map(|report| report.expect("every write receives a report"))
            .collect()
    }
}

/// Disambiguate rendered notes that target the same filename.
///
/// Each member of a collision group gets the stem of its own note directory
/// (a stable identifier) appended to its filename, so distinct notes never
/// write to one path. One warning is recorded per colliding filename.
fn resolve_collisions(
    paths: &[PathBuf],
    rendered: &mut [Option<Result<(RenderedPost, String)>>],
) -> Vec<CollisionWarning> {
    let mut by_filename: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, slot) in rendered.iter().enumerate() {
        if let Some(Ok((post, _))) = slot {
            by_filename.entry(post.filename.clone()).or_default().push(idx);
        }
    }

    let mut warnings = Vec::new();
    for (filename, indices) in by_filename {
        if indices.len() < 2 {
            continue;
        }
        warn!(
            %filename,
            notes = indices.len(),
            "distinct notes target the same post file"
        );
        for &idx in &indices {
            if let Some(Ok((post, _))) = rendered[idx].as_mut() {
                let stem = paths[idx]
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| idx.to_string());
                post.filename = format!("{}-{stem}", post.filename);
            }
        }
        warnings.push(CollisionWarning {
            filename,
            sources: indices.iter().map(|&idx| paths[idx].clone()).collect(),
        });
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::Collection;
    use crate::sync::types::SyncStatus;
    use std::fs;
    use tempfile::TempDir;

    const COLLECTION_UUID: &str = "c0ffee";

    /// Lay out a minimal library (one collection) and blog in `root`.
    fn fixture(root: &Path) -> Config {
        let library = root.join("Library.qvlibrary");
        fs::create_dir_all(library.join("Trash.qvnotebook")).unwrap();
        let collection = library.join(format!("{COLLECTION_UUID}.qvnotebook"));
        fs::create_dir_all(&collection).unwrap();
        fs::write(
            collection.join("meta.json"),
            format!(r#"{{"name":"Blog","uuid":"{COLLECTION_UUID}"}}"#),
        )
        .unwrap();

        let blog = root.join("blog");
        fs::create_dir_all(&blog).unwrap();
        fs::write(blog.join("_config.yml"), "source_dir: source\n").unwrap();

        Config {
            library,
            blog,
            collection: Collection {
                name: "Blog".to_string(),
                uuid: COLLECTION_UUID.to_string(),
            },
            exclude_tags: ["draft".to_string()].into(),
        }
    }

    fn write_note(config: &Config, dir_name: &str, title: &str, tags: &[&str]) {
        let note = config
            .library
            .join(format!("{COLLECTION_UUID}.qvnotebook"))
            .join(dir_name);
        fs::create_dir_all(&note).unwrap();
        let tags_json = serde_json::to_string(tags).unwrap();
        fs::write(
            note.join("meta.json"),
            format!(r#"{{"title":"{title}","tags":{tags_json},"created_at":1451606400}}"#),
        )
        .unwrap();
        fs::write(
            note.join("content.json"),
            r#"{"cells":[{"type":"markdown","data":"body"}]}"#,
        )
        .unwrap();
    }

    fn statuses(plan: &SyncPlan) -> Vec<SyncStatus> {
        plan.notes
            .iter()
            .map(|r| r.outcome.as_ref().unwrap().status)
            .collect()
    }

    #[tokio::test]
    async fn test_new_note_plans_as_new_with_derived_filename() {
        let tmp = TempDir::new().unwrap();
        let config = fixture(tmp.path());
        write_note(&config, "n1.qvnote", "Hello World", &["post"]);

        let engine = SyncEngine::open(config).await.unwrap();
        let plan = engine.plan().await.unwrap();

        assert_eq!(plan.notes.len(), 1);
        let entry = plan.notes[0].outcome.as_ref().unwrap();
        assert_eq!(entry.status, SyncStatus::New);
        assert_eq!(entry.post.filename, "Hello-World");
        assert!(entry.target.ends_with("source/_posts/Hello-World.md"));
    }

    #[tokio::test]
    async fn test_plan_apply_plan_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let config = fixture(tmp.path());
        write_note(&config, "n1.qvnote", "Hello World", &["post"]);

        let engine = SyncEngine::open(config).await.unwrap();
        let plan = engine.plan().await.unwrap();
        let actionable = plan.actionable();
        assert_eq!(actionable.len(), 1);

        let results = engine.apply(&actionable).await;
        assert!(results.iter().all(|r| r.result.is_ok()));

        let target = &actionable[0].target;
        let written = fs::read(target).unwrap();
        assert_eq!(written, actionable[0].text.as_bytes());

        // Unchanged source: everything previously actionable is Stable now,
        // and a second apply of the (empty) actionable set changes nothing.
        let second = engine.plan().await.unwrap();
        assert_eq!(statuses(&second), vec![SyncStatus::Stable]);
        assert!(second.actionable().is_empty());
        assert_eq!(fs::read(target).unwrap(), written);
    }

    #[tokio::test]
    async fn test_excluded_note_is_skipped_and_never_written() {
        let tmp = TempDir::new().unwrap();
        let config = fixture(tmp.path());
        write_note(&config, "n1.qvnote", "Secret Plans", &["draft"]);

        let engine = SyncEngine::open(config).await.unwrap();
        let plan = engine.plan().await.unwrap();

        assert_eq!(statuses(&plan), vec![SyncStatus::Skip]);
        assert!(plan.actionable().is_empty());
        assert!(!engine.posts_dir().join("Secret-Plans.md").exists());
    }

    #[tokio::test]
    async fn test_changed_target_plans_as_update() {
        let tmp = TempDir::new().unwrap();
        let config = fixture(tmp.path());
        write_note(&config, "n1.qvnote", "Hello World", &["post"]);

        let engine = SyncEngine::open(config).await.unwrap();
        fs::create_dir_all(engine.posts_dir()).unwrap();
        fs::write(engine.posts_dir().join("Hello-World.md"), "stale body").unwrap();

        let plan = engine.plan().await.unwrap();
        assert_eq!(statuses(&plan), vec![SyncStatus::Update]);
    }

    #[tokio::test]
    async fn test_per_note_failures_do_not_abort_the_batch() {
        let tmp = TempDir::new().unwrap();
        let config = fixture(tmp.path());
        write_note(&config, "a.qvnote", "Good Note", &["post"]);
        // A note directory without its content record.
        let broken = config
            .library
            .join(format!("{COLLECTION_UUID}.qvnotebook"))
            .join("b.qvnote");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join("meta.json"), r#"{"title":"Broken"}"#).unwrap();
        // A note whose title is empty renders as invalid.
        let untitled = config
            .library
            .join(format!("{COLLECTION_UUID}.qvnotebook"))
            .join("c.qvnote");
        fs::create_dir_all(&untitled).unwrap();
        fs::write(untitled.join("meta.json"), "{}").unwrap();
        fs::write(untitled.join("content.json"), "{}").unwrap();

        let engine = SyncEngine::open(config).await.unwrap();
        let plan = engine.plan().await.unwrap();

        // Report order follows enumeration order, failures in place.
        assert_eq!(plan.notes.len(), 3);
        assert!(plan.notes[0].source.ends_with("a.qvnote"));
        assert!(plan.notes[0].outcome.is_ok());
        assert!(plan.notes[1].outcome.is_err());
        assert!(plan.notes[2].outcome.is_err());
        assert_eq!(plan.failure_count(), 2);
        assert_eq!(plan.actionable().len(), 1);
    }

    #[tokio::test]
    async fn test_title_collisions_are_disambiguated_with_warning() {
        let tmp = TempDir::new().unwrap();
        let config = fixture(tmp.path());
        write_note(&config, "n1.qvnote", "Dup Title", &["post"]);
        write_note(&config, "n2.qvnote", "Dup Title", &["post"]);

        let engine = SyncEngine::open(config).await.unwrap();
        let plan = engine.plan().await.unwrap();

        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.warnings[0].filename, "Dup-Title");
        assert_eq!(plan.warnings[0].sources.len(), 2);

        let filenames: Vec<_> = plan
            .notes
            .iter()
            .map(|r| r.outcome.as_ref().unwrap().post.filename.clone())
            .collect();
        assert_eq!(filenames, vec!["Dup-Title-n1", "Dup-Title-n2"]);

        // Both write to distinct paths.
        let results = engine.apply(&plan.actionable()).await;
        assert!(results.iter().all(|r| r.result.is_ok()));
        assert!(engine.posts_dir().join("Dup-Title-n1.md").exists());
        assert!(engine.posts_dir().join("Dup-Title-n2.md").exists());
    }

    #[tokio::test]
    async fn test_open_rejects_partial_config() {
        let tmp = TempDir::new().unwrap();
        let mut config = fixture(tmp.path());
        config.collection.uuid = String::new();

        let err = SyncEngine::open(config).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }

    #[tokio::test]
    async fn test_missing_collection_is_fatal_to_planning() {
        let tmp = TempDir::new().unwrap();
        let mut config = fixture(tmp.path());
        config.collection.uuid = "missing".to_string();

        let engine = SyncEngine::open(config).await.unwrap();
        let err = engine.plan().await.unwrap_err();
        assert!(matches!(err, crate::error::Error::CollectionNotFound { .. }));
    }
}
