//! Shared types passed between the scan, render, and index stages.

use std::fmt;
use std::path::{Path, PathBuf};

/// Source format of a document, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Jupyter notebook (`.ipynb`), rendered in-process.
    Notebook,
    /// Quarto document (`.qmd`), rendered by the `quarto` CLI.
    Quarto,
}

impl DocumentFormat {
    /// Classify a path by its extension. Matching is case-sensitive, the way
    /// both toolchains treat their own extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ipynb" => Some(Self::Notebook),
            "qmd" => Some(Self::Quarto),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notebook => f.write_str("notebook"),
            Self::Quarto => f.write_str("quarto"),
        }
    }
}

/// Which of the two index sections a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// The document's directory path contains the configured marker.
    Matched,
    /// Everything else.
    Default,
}

/// A document discovered during the directory walk.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Path as discovered (root joined with the relative path).
    pub path: PathBuf,
    pub format: DocumentFormat,
    pub section: Section,
}

impl Document {
    /// File name including extension, e.g. `foo_bar.ipynb`.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File name without its extension, e.g. `foo_bar`.
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Screenshot file name: the stem with a `.png` extension.
    pub fn screenshot_name(&self) -> String {
        format!("{}.png", self.stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/b.ipynb")),
            Some(DocumentFormat::Notebook)
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/b.qmd")),
            Some(DocumentFormat::Quarto)
        );
        assert_eq!(DocumentFormat::from_path(Path::new("a/b.md")), None);
        assert_eq!(DocumentFormat::from_path(Path::new("a/ipynb")), None);
    }

    #[test]
    fn format_extension_is_case_sensitive() {
        assert_eq!(DocumentFormat::from_path(Path::new("b.IPYNB")), None);
    }

    #[test]
    fn screenshot_name_replaces_extension() {
        let doc = Document {
            path: PathBuf::from("notebooks/Python/foo_bar.ipynb"),
            format: DocumentFormat::Notebook,
            section: Section::Matched,
        };
        assert_eq!(doc.file_name(), "foo_bar.ipynb");
        assert_eq!(doc.stem(), "foo_bar");
        assert_eq!(doc.screenshot_name(), "foo_bar.png");
    }
}
