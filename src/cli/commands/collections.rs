//! Collections listing command.

use colored::Colorize;

use crate::config;
use crate::error::Result;
use crate::library::NoteLibrary;

/// List the collections of the configured library, marking the synced one.
pub fn execute(json: bool) -> Result<()> {
    let config = config::load()?;
    let library = NoteLibrary::new(&config.library);
    let collections = library.collections()?;

    if json {
        println!("{}", serde_json::to_string(&collections)?);
        return Ok(());
    }

    if collections.is_empty() {
        println!(
            "No collections found in {}",
            config.library.display()
        );
        return Ok(());
    }

    for collection in &collections {
        if collection.uuid == config.collection.uuid {
            println!("{} {}", "*".green().bold(), collection.name.bold());
        } else {
            println!("  {}", collection.name);
        }
    }
    Ok(())
}
