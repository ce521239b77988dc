//! Interactive init wizard.
//!
//! Walks the user through picking the note library, the blog root, the
//! collection to sync, and the exclusion tags, then writes the resulting
//! JSON config file. Path answers are validated against the actual disk
//! layout before they are accepted.

use std::collections::BTreeSet;

use colored::Colorize;
use dialoguer::{Confirm, Input, Select};

use super::prompt_error;
use crate::config::{self, Config, DEFAULT_EXCLUDE_TAGS};
use crate::error::{Error, Result};
use crate::library::NoteLibrary;
use crate::site;

/// Run the wizard and write the config file.
pub fn execute() -> Result<()> {
    let config_path = config::config_file_path()?;
    let existing = config::try_load();

    if config_path.exists() {
        println!(
            "{}: a config file already exists at {}; answers are prefilled from it.",
            "Warning".yellow().bold(),
            config_path.display()
        );
        let reconfigure = Confirm::new()
            .with_prompt("Reconfigure?")
            .default(true)
            .interact()
            .map_err(prompt_error)?;
        if !reconfigure {
            println!("Canceled. Existing config was not modified.");
            return Ok(());
        }
    }

    // 1. Library path, recognized by its Trash notebook.
    let mut library_input = Input::new().with_prompt(
        "Quiver library path (e.g. ~/Library/Quiver.qvlibrary)",
    );
    if let Some(cfg) = &existing {
        library_input = library_input.default(cfg.library.display().to_string());
    }
    let library_answer: String = library_input
        .validate_with(|answer: &String| -> std::result::Result<(), String> {
            if NoteLibrary::is_library(&config::expand_tilde(answer.trim())) {
                Ok(())
            } else {
                Err(format!(
                    "not a Quiver library (needs Trash.qvnotebook): {answer}"
                ))
            }
        })
        .interact_text()
        .map_err(prompt_error)?;
    let library = config::expand_tilde(library_answer.trim());

    // 2. Blog root, recognized by its own config file.
    let mut blog_input = Input::new().with_prompt("Hexo root path (e.g. ~/hexo-blog)");
    if let Some(cfg) = &existing {
        blog_input = blog_input.default(cfg.blog.display().to_string());
    }
    let blog_answer: String = blog_input
        .validate_with(|answer: &String| -> std::result::Result<(), String> {
            if site::is_blog_root(&config::expand_tilde(answer.trim())) {
                Ok(())
            } else {
                Err(format!(
                    "not a Hexo root (needs {}): {answer}",
                    site::SITE_CONFIG_FILE
                ))
            }
        })
        .interact_text()
        .map_err(prompt_error)?;
    let blog = config::expand_tilde(blog_answer.trim());

    // 3. Collection to sync.
    let collections = NoteLibrary::new(&library).collections()?;
    if collections.is_empty() {
        return Err(Error::Config(
            "the library has no collections; create one in Quiver first".to_string(),
        ));
    }
    let names: Vec<&str> = collections.iter().map(|c| c.name.as_str()).collect();
    let default_index = existing
        .as_ref()
        .and_then(|cfg| collections.iter().position(|c| c.uuid == cfg.collection.uuid))
        .unwrap_or(0);
    let index = Select::new()
        .with_prompt("Collection to sync")
        .items(&names)
        .default(default_index)
        .interact()
        .map_err(prompt_error)?;
    let collection = collections[index].clone();

    // 4. Exclusion tags.
    let default_tags = existing
        .as_ref()
        .map_or_else(
            || DEFAULT_EXCLUDE_TAGS.join(","),
            |cfg| {
                cfg.exclude_tags
                    .iter()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(",")
            },
        );
    let tags_answer: String = Input::new()
        .with_prompt("Tags excluded from sync (comma separated)")
        .default(default_tags)
        .interact_text()
        .map_err(prompt_error)?;
    let exclude_tags: BTreeSet<String> = tags_answer
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToString::to_string)
        .collect();

    let config = Config {
        library,
        blog,
        collection,
        exclude_tags,
    };
    config.validate()?;
    config::store(&config)?;

    println!();
    println!("{} config written to {}", "Finished:".green().bold(), config_path.display());
    Ok(())
}
