//! Document discovery.
//!
//! Walks the root directory recursively and turns every `.ipynb` and `.qmd`
//! file into a [`Document`] tagged with its index section.
//!
//! ## Section Classification
//!
//! A document belongs to the *matched* section when the path of its
//! containing directory, relative to the root, contains the configured marker
//! substring (case-sensitive). Everything else falls into the *default*
//! section:
//!
//! ```text
//! notebooks/
//! ├── Python/
//! │   ├── foo_bar.ipynb          # matched  ("Python" in "Python")
//! │   └── advanced/
//! │       └── pandas.qmd         # matched  ("Python" in "Python/advanced")
//! ├── R/
//! │   └── analysis.qmd           # default
//! ├── PythonR/misc.ipynb         # matched  (substring, not segment match)
//! ├── scratch.ipynb              # default  (root itself has an empty path)
//! ├── screenshots/               # skipped
//! └── .ipynb_checkpoints/        # skipped (hidden)
//! ```
//!
//! Substring matching is deliberately simple and can misclassify documents
//! whose path happens to contain the marker; it is kept for compatibility
//! with existing directory layouts.
//!
//! ## Ordering
//!
//! Entries are visited depth-first with siblings sorted by file name, so the
//! processing order is stable across filesystems.

use crate::config::RunConfig;
use crate::types::{Document, DocumentFormat, Section};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Root directory not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Discover all documents under `root`, in processing order.
pub fn discover(root: &Path, config: &RunConfig) -> Result<Vec<Document>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }

    let screenshots = config.screenshots_path(root);
    let mut documents = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !(is_hidden(e.path()) || e.path() == screenshots));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(format) = DocumentFormat::from_path(entry.path()) else {
            continue;
        };
        let section = classify(entry.path(), root, &config.sections.marker);
        tracing::debug!(path = %entry.path().display(), ?format, ?section, "discovered document");
        documents.push(Document {
            path: entry.path().to_path_buf(),
            format,
            section,
        });
    }

    Ok(documents)
}

/// Decide the section for a document path.
///
/// Only the containing directory is inspected, relative to `root`, so a root
/// such as `~/Python-work/notebooks` does not pull every document into the
/// matched section.
pub fn classify(path: &Path, root: &Path, marker: &str) -> Section {
    let dir = path.parent().unwrap_or(Path::new(""));
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    if rel.to_string_lossy().contains(marker) {
        Section::Matched
    } else {
        Section::Default
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn discovers_both_formats() {
        let tmp = setup_fixtures();
        let docs = discover(tmp.path(), &RunConfig::default()).unwrap();

        let names = document_names(&docs);
        assert!(names.contains(&"foo_bar.ipynb".to_string()));
        assert!(names.contains(&"analysis.qmd".to_string()));
    }

    #[test]
    fn fixture_sections() {
        let tmp = setup_fixtures();
        let docs = discover(tmp.path(), &RunConfig::default()).unwrap();

        assert_eq!(find_document(&docs, "foo_bar.ipynb").section, Section::Matched);
        assert_eq!(find_document(&docs, "analysis.qmd").section, Section::Default);
    }

    #[test]
    fn ignores_other_extensions() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("README.md"), "# Python\n").unwrap();
        fs::write(tmp.path().join("data.csv"), "a,b\n").unwrap();
        fs::write(tmp.path().join("page.html"), "<p></p>").unwrap();

        let docs = discover(tmp.path(), &RunConfig::default()).unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn skips_hidden_and_screenshot_directories() {
        let tmp = TempDir::new().unwrap();
        let checkpoints = tmp.path().join("Python/.ipynb_checkpoints");
        fs::create_dir_all(&checkpoints).unwrap();
        fs::write(checkpoints.join("nb-checkpoint.ipynb"), "{}").unwrap();
        let shots = tmp.path().join("screenshots");
        fs::create_dir_all(&shots).unwrap();
        fs::write(shots.join("stray.qmd"), "").unwrap();
        fs::write(tmp.path().join("Python/nb.ipynb"), "{}").unwrap();

        let docs = discover(tmp.path(), &RunConfig::default()).unwrap();
        assert_eq!(document_names(&docs), vec!["nb.ipynb"]);
    }

    #[test]
    fn order_is_sorted_by_file_name() {
        let tmp = TempDir::new().unwrap();
        for name in ["c.qmd", "a.qmd", "b.ipynb"] {
            fs::write(tmp.path().join(name), "").unwrap();
        }

        let docs = discover(tmp.path(), &RunConfig::default()).unwrap();
        assert_eq!(document_names(&docs), vec!["a.qmd", "b.ipynb", "c.qmd"]);
    }

    #[test]
    fn missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = discover(&tmp.path().join("nope"), &RunConfig::default());
        assert!(matches!(result, Err(ScanError::RootNotFound(_))));
    }

    #[test]
    fn classify_matches_nested_directories() {
        let root = Path::new("notebooks");
        assert_eq!(
            classify(Path::new("notebooks/Python/deep/x.ipynb"), root, "Python"),
            Section::Matched
        );
        assert_eq!(
            classify(Path::new("notebooks/MorePython/x.qmd"), root, "Python"),
            Section::Matched
        );
    }

    #[test]
    fn classify_without_marker_is_default() {
        let root = Path::new("notebooks");
        assert_eq!(
            classify(Path::new("notebooks/R/x.qmd"), root, "Python"),
            Section::Default
        );
        assert_eq!(
            classify(Path::new("notebooks/x.ipynb"), root, "Python"),
            Section::Default
        );
    }

    #[test]
    fn classify_is_case_sensitive() {
        let root = Path::new("notebooks");
        assert_eq!(
            classify(Path::new("notebooks/python/x.ipynb"), root, "Python"),
            Section::Default
        );
    }

    #[test]
    fn classify_ignores_marker_in_root() {
        let root = Path::new("Python-work/notebooks");
        assert_eq!(
            classify(Path::new("Python-work/notebooks/R/x.qmd"), root, "Python"),
            Section::Default
        );
    }

    #[test]
    fn custom_marker_from_config() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("julia")).unwrap();
        fs::write(tmp.path().join("julia/a.ipynb"), "").unwrap();

        let mut config = RunConfig::default();
        config.sections.marker = "julia".into();
        let docs = discover(tmp.path(), &config).unwrap();
        assert_eq!(docs[0].section, Section::Matched);
    }
}
