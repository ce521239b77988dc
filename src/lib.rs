//! quillsync - publish notes from a Quiver library to a Hexo blog.
//!
//! Every run loads the configured collection fresh from disk, renders each
//! note to its canonical post text, and classifies it as `SKIP`, `NEW`,
//! `UPDATE`, or `STABLE` against what already exists in the blog's posts
//! directory. Planning never writes; writing is a separate, confirmed step.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`config`] - The `~/.quillsyncrc` sync configuration
//! - [`library`] - Note library access (Quiver file layout)
//! - [`model`] - Data types (RawNote, ContentCell, RenderedPost)
//! - [`site`] - Target site configuration reader (Hexo `_config.yml`)
//! - [`sync`] - Classification and the sync engine
//! - [`error`] - Error types and handling

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod library;
pub mod model;
pub mod site;
pub mod sync;

pub use error::{Error, Result};
