//! Markdown index maintenance.
//!
//! The index is a hand-edited markdown file with two top-level section
//! headings. Each processed document owns one three-line entry inside its
//! section:
//!
//! ```text
//! # Python
//! ## Foo Bar
//! [foo_bar.ipynb](Python/foo_bar.ipynb)
//! ![Foo Bar](screenshots/foo_bar.png)
//!
//! # R
//! ```
//!
//! The file is edited textually rather than parsed, so prose, badges, and
//! anything else around the entries survives untouched:
//!
//! - An entry is found by a line-anchored pattern: `## <title>`, then a link
//!   whose target is exactly the document's relative path, then any image
//!   embed. Every match is rewritten in place with the fresh entry.
//! - Otherwise the entry plus a blank line is inserted directly below the
//!   first line reading exactly `# <section>` (trailing spaces allowed).
//! - If that heading does not exist, nothing is inserted and the file is left
//!   as it was ([`IndexUpdate::SectionMissing`]).
//!
//! Paths in entries are relative to the index file's directory and always use
//! forward slashes so the index renders the same on every platform.

use regex::{NoExpand, Regex};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Index file not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid index pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// What an update did to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexUpdate {
    /// A new entry was inserted under the section heading.
    Inserted,
    /// An existing entry was rewritten in place.
    Replaced,
    /// No existing entry and no section heading; the file is unchanged.
    SectionMissing,
}

/// One document's entry in the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub title: String,
    /// Link text, the document's file name.
    pub link_text: String,
    /// Document path relative to the index directory.
    pub source: String,
    /// Screenshot path relative to the index directory.
    pub screenshot: String,
}

impl IndexEntry {
    /// Build an entry with both paths made relative to the index file's directory.
    pub fn new(index_path: &Path, title: &str, source: &Path, screenshot: &Path) -> Self {
        let base = index_path.parent().unwrap_or(Path::new(""));
        Self {
            title: title.to_string(),
            link_text: source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            source: relative_path(source, base),
            screenshot: relative_path(screenshot, base),
        }
    }

    /// The three entry lines, without a trailing newline.
    pub fn to_markdown(&self) -> String {
        format!(
            "## {}\n[{}]({})\n![{}]({})",
            self.title, self.link_text, self.source, self.title, self.screenshot
        )
    }
}

/// Update the index file at `index_path` with an entry for one document.
pub fn update_index(
    index_path: &Path,
    section_heading: &str,
    entry: &IndexEntry,
) -> Result<IndexUpdate, IndexError> {
    if !index_path.is_file() {
        return Err(IndexError::NotFound(index_path.to_path_buf()));
    }
    let content = fs::read_to_string(index_path)?;
    let (updated, outcome) = apply_entry(&content, section_heading, entry)?;
    if updated != content {
        fs::write(index_path, updated)?;
    }
    tracing::debug!(index = %index_path.display(), title = %entry.title, ?outcome, "index updated");
    Ok(outcome)
}

/// Apply an entry to index text. Pure; used by [`update_index`].
///
/// CRLF files are matched with `\n` line endings and written back with
/// `\r\n`.
pub fn apply_entry(
    content: &str,
    section_heading: &str,
    entry: &IndexEntry,
) -> Result<(String, IndexUpdate), IndexError> {
    let crlf = content.contains("\r\n");
    let normalized = content.replace("\r\n", "\n");
    let (updated, outcome) = apply_entry_lf(&normalized, section_heading, entry)?;
    let updated = match outcome {
        IndexUpdate::SectionMissing => content.to_string(),
        _ if crlf => updated.replace('\n', "\r\n"),
        _ => updated,
    };
    Ok((updated, outcome))
}

fn apply_entry_lf(
    content: &str,
    section_heading: &str,
    entry: &IndexEntry,
) -> Result<(String, IndexUpdate), IndexError> {
    let block = entry.to_markdown();

    let existing = Regex::new(&format!(
        r"(?m)^## {}[ \t]*\n\[.*\]\({}\)[ \t]*\n!\[.*\]\(.*\)[ \t]*$",
        regex::escape(&entry.title),
        regex::escape(&entry.source)
    ))?;
    if existing.is_match(content) {
        let replaced = existing.replace_all(content, NoExpand(&block));
        return Ok((replaced.into_owned(), IndexUpdate::Replaced));
    }

    let heading = section_heading_regex(section_heading)?;
    let Some(m) = heading.find(content) else {
        return Ok((content.to_string(), IndexUpdate::SectionMissing));
    };

    let mut updated = String::with_capacity(content.len() + block.len() + 3);
    updated.push_str(&content[..m.end()]);
    if !m.as_str().ends_with('\n') {
        // Heading is the last line and has no newline of its own.
        updated.push('\n');
    }
    updated.push_str(&block);
    updated.push_str("\n\n");
    updated.push_str(&content[m.end()..]);
    Ok((updated, IndexUpdate::Inserted))
}

/// Headings from `headings` that have no `# <heading>` line in `content`.
pub fn missing_sections<'a>(
    content: &str,
    headings: &[&'a str],
) -> Result<Vec<&'a str>, IndexError> {
    let content = content.replace("\r\n", "\n");
    let mut missing = Vec::new();
    for heading in headings {
        if !section_heading_regex(heading)?.is_match(&content) {
            missing.push(*heading);
        }
    }
    Ok(missing)
}

fn section_heading_regex(heading: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"(?m)^# {}[ \t]*(?:\n|\z)", regex::escape(heading)))
}

/// Path of `target` relative to directory `base`, with `/` separators.
///
/// Both paths are made absolute against the working directory and normalized
/// lexically; symlinks are not resolved.
pub fn relative_path(target: &Path, base: &Path) -> String {
    let target = normalize(&absolute(target));
    let base = normalize(&absolute(base));

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..base.len() {
        parts.push("..".to_string());
    }
    for part in &target[common..] {
        parts.push(part.clone());
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

fn absolute(path: &Path) -> PathBuf {
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Lexically normalize to a list of segments (roots and prefixes included).
fn normalize(path: &Path) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last().map(String::as_str) {
                Some("/") => {}
                None | Some("..") => parts.push("..".to_string()),
                Some(_) => {
                    parts.pop();
                }
            },
            Component::RootDir => parts.push("/".to_string()),
            Component::Prefix(p) => parts.push(p.as_os_str().to_string_lossy().into_owned()),
            Component::Normal(s) => parts.push(s.to_string_lossy().into_owned()),
        }
    }
    parts
}
