//! Rendered blog posts and their canonical text form.
//!
//! [`render`] is a pure, deterministic function of a [`RawNote`]: the same
//! note always produces the same post, and [`RenderedPost::to_post_text`]
//! always produces byte-identical output for equal posts. The classifier's
//! `Stable`/`Update` distinction depends on exactly this property.

use chrono::{Local, TimeZone};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::note::{ContentCell, RawNote};

/// Version of the serialized post layout.
///
/// The five-part line layout below (delimiter, title, date, tags, delimiter,
/// blank line, body) is a format contract: files written under one version
/// are compared byte-for-byte against freshly rendered text on the next run.
/// Any change to field order, spacing, or delimiter must bump this constant
/// instead of silently changing the layout.
pub const POST_TEXT_LAYOUT_VERSION: u32 = 1;

/// Front matter delimiter line, above and below the header fields.
const FRONT_MATTER_DELIMITER: &str = "----";

/// The canonical target-post representation of a note.
///
/// Derived once per sync pass per note; never persisted itself — only its
/// serialized text is written to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedPost {
    /// Target file name without the `.md` extension, derived from the title
    /// by replacing each space with a hyphen. Same title, same filename —
    /// collisions between distinct titles are resolved during planning, not
    /// here.
    pub filename: String,
    pub title: String,
    pub tags: Vec<String>,
    /// Creation time formatted `YYYY-MM-DD HH:MM:SS` in the local timezone.
    pub published_at: String,
    pub body: String,
}

/// Convert a raw note into its canonical post representation.
///
/// # Errors
///
/// Returns [`Error::InvalidNote`] if the title is empty (filename derivation
/// would be ambiguous) or the creation timestamp is out of range. All other
/// fields tolerate absence.
pub fn render(note: &RawNote) -> Result<RenderedPost> {
    if note.title.is_empty() {
        return Err(Error::InvalidNote("note title is missing or empty".to_string()));
    }

    Ok(RenderedPost {
        filename: note.title.replace(' ', "-"),
        title: note.title.clone(),
        tags: note.tags.clone(),
        published_at: format_published_at(note.created_at)?,
        body: render_body(&note.cells),
    })
}

impl RenderedPost {
    /// Serialize to the canonical post text.
    ///
    /// Layout (versioned by [`POST_TEXT_LAYOUT_VERSION`]): opening delimiter
    /// line, `title:`, `date:`, a `tags:` line followed by one `- <tag>`
    /// line per tag, closing delimiter line, blank line, then the body.
    #[must_use]
    pub fn to_post_text(&self) -> String {
        let mut lines = Vec::with_capacity(7 + self.tags.len());
        lines.push(FRONT_MATTER_DELIMITER.to_string());
        lines.push(format!("title: {}", self.title));
        lines.push(format!("date: {}", self.published_at));
        lines.push("tags:".to_string());
        for tag in &self.tags {
            lines.push(format!("- {tag}"));
        }
        lines.push(FRONT_MATTER_DELIMITER.to_string());
        lines.push(String::new());
        lines.push(self.body.clone());
        lines.join("\n")
    }
}

/// Format an epoch-seconds timestamp in the process-local timezone.
fn format_published_at(epoch_seconds: i64) -> Result<String> {
    Local
        .timestamp_opt(epoch_seconds, 0)
        .earliest()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .ok_or_else(|| {
            Error::InvalidNote(format!("creation timestamp {epoch_seconds} is out of range"))
        })
}

/// Concatenate cells into the post body.
///
/// Markdown cells are emitted as their raw text, code cells as fenced blocks
/// tagged with their language. Unsupported cells are filtered before
/// joining, so they do not leave an empty slot between their neighbors.
fn render_body(cells: &[ContentCell]) -> String {
    cells
        .iter()
        .filter_map(|cell| match cell {
            ContentCell::Markdown { data } => Some(data.clone()),
            ContentCell::Code { language, data } => {
                Some(format!("```{language}\n{data}\n```"))
            }
            ContentCell::Unsupported => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(title: &str, tags: &[&str], cells: Vec<ContentCell>) -> RawNote {
        RawNote {
            title: title.to_string(),
            tags: tags.iter().map(ToString::to_string).collect(),
            created_at: 1_451_606_400,
            cells,
        }
    }

    #[test]
    fn test_filename_replaces_every_space() {
        let post = render(&note("Hello Brave New World", &[], vec![])).unwrap();
        assert_eq!(post.filename, "Hello-Brave-New-World");
    }

    #[test]
    fn test_empty_title_is_invalid() {
        let err = render(&note("", &[], vec![])).unwrap_err();
        assert!(matches!(err, Error::InvalidNote(_)));
    }

    #[test]
    fn test_body_round_trip_markdown_then_code() {
        let post = render(&note(
            "T",
            &[],
            vec![
                ContentCell::Markdown {
                    data: "A".to_string(),
                },
                ContentCell::Code {
                    language: "go".to_string(),
                    data: "B".to_string(),
                },
            ],
        ))
        .unwrap();
        assert_eq!(post.body, "A\n\n```go\nB\n```");
    }

    #[test]
    fn test_unsupported_cells_leave_no_delimiter_behind() {
        let post = render(&note(
            "T",
            &[],
            vec![
                ContentCell::Markdown {
                    data: "A".to_string(),
                },
                ContentCell::Unsupported,
                ContentCell::Markdown {
                    data: "B".to_string(),
                },
            ],
        ))
        .unwrap();
        assert_eq!(post.body, "A\n\nB");
    }

    #[test]
    fn test_post_text_layout() {
        let post = RenderedPost {
            filename: "Hello-World".to_string(),
            title: "Hello World".to_string(),
            tags: vec!["post".to_string(), "notes".to_string()],
            published_at: "2016-01-02 03:04:05".to_string(),
            body: "content".to_string(),
        };
        assert_eq!(
            post.to_post_text(),
            "----\n\
             title: Hello World\n\
             date: 2016-01-02 03:04:05\n\
             tags:\n\
             - post\n\
             - notes\n\
             ----\n\
             \n\
             content"
        );
    }

    #[test]
    fn test_post_text_with_no_tags_has_bare_tags_line() {
        let post = RenderedPost {
            filename: "T".to_string(),
            title: "T".to_string(),
            tags: vec![],
            published_at: "2016-01-02 03:04:05".to_string(),
            body: "b".to_string(),
        };
        let text = post.to_post_text();
        assert!(text.contains("tags:\n----\n"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let n = note(
            "Same Note",
            &["post"],
            vec![ContentCell::Markdown {
                data: "body".to_string(),
            }],
        );
        let first = render(&n).unwrap().to_post_text();
        let second = render(&n).unwrap().to_post_text();
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_out_of_range_timestamp_is_invalid() {
        let mut n = note("T", &[], vec![]);
        n.created_at = i64::MAX;
        assert!(matches!(render(&n).unwrap_err(), Error::InvalidNote(_)));
    }
}
