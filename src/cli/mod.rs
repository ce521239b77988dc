//! CLI definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};

pub mod commands;

/// Supported completion shells.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Publish notes from a Quiver library to a Hexo blog
#[derive(Parser, Debug)]
#[command(name = "quillsync", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactively configure library, blog, collection, and exclusion tags
    Init,

    /// List the collections in the configured library
    Collections,

    /// Classify every note against the blog and write changed posts
    Sync {
        /// Also list skipped and up-to-date notes
        #[arg(long)]
        all: bool,

        /// Write without asking for confirmation
        #[arg(short = 'y', long)]
        yes: bool,

        /// Plan only; never write
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
