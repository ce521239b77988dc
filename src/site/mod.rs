//! Target site configuration (Hexo `_config.yml`).
//!
//! The blog owns its own configuration file; this module is the narrow
//! reader the sync engine consults once per run to resolve the directory
//! rendered posts live in: `<blog root>/<source_dir>/_posts`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::fs;
use tracing::debug;

use crate::error::{Error, Result};

/// The site's own configuration file, at the blog root.
pub const SITE_CONFIG_FILE: &str = "_config.yml";

/// Post storage subdirectory under the site's source dir.
const POSTS_DIR: &str = "_posts";

/// The subset of the site's configuration the engine cares about.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Directory holding the site's source files, relative to the root.
    #[serde(default = "default_source_dir")]
    pub source_dir: String,
}

fn default_source_dir() -> String {
    "source".to_string()
}

impl SiteConfig {
    /// Resolve the posts directory under `blog_root`.
    #[must_use]
    pub fn posts_dir(&self, blog_root: &Path) -> PathBuf {
        blog_root.join(&self.source_dir).join(POSTS_DIR)
    }
}

/// Whether `path` looks like a blog root (carries a site config file).
#[must_use]
pub fn is_blog_root(path: &Path) -> bool {
    path.join(SITE_CONFIG_FILE).is_file()
}

/// Read the site configuration from `blog_root`.
///
/// # Errors
///
/// Returns [`Error::SiteConfig`] if the file is absent, a YAML error if it
/// does not parse, or an I/O error for an unreadable file.
pub async fn load_config(blog_root: &Path) -> Result<SiteConfig> {
    let path = blog_root.join(SITE_CONFIG_FILE);
    let bytes = match fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::SiteConfig(format!(
                "site config file is not found [{}]",
                path.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };
    let config: SiteConfig = serde_yaml::from_slice(&bytes)?;
    debug!(source_dir = %config.source_dir, "loaded site config");
    Ok(config)
}
