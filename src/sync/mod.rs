//! The synchronization engine.
//!
//! [`engine::SyncEngine`] orchestrates three collaborators over every note
//! in the configured collection: the library loads raw notes, the renderer
//! turns each into its canonical post text, and [`classify::classify`]
//! compares that text against whatever already exists in the blog's posts
//! directory. Planning is read-only; [`engine::SyncEngine::apply`] is the
//! only code path that writes.

pub mod classify;
pub mod engine;
pub mod file;
pub mod types;

pub use classify::{classify, target_path};
pub use engine::SyncEngine;
pub use types::{CollisionWarning, NoteReport, PlanEntry, SyncPlan, SyncStatus, WriteReport};
