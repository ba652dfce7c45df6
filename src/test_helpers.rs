//! Shared test utilities for the nbshots test suite.
//!
//! Provides fixture setup, document lookups, and small builders for the
//! notebook JSON and index markdown that most tests need.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let docs = discover(tmp.path(), &RunConfig::default()).unwrap();
//! let doc = find_document(&docs, "foo_bar.ipynb");
//! assert_eq!(doc.section, Section::Matched);
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::types::{Document, DocumentFormat, Section};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/notebooks/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/notebooks");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Document lookups, panicking with a clear message on miss
// =========================================================================

/// Find a document by file name. Panics if not found.
pub fn find_document<'a>(docs: &'a [Document], file_name: &str) -> &'a Document {
    docs.iter()
        .find(|d| d.file_name() == file_name)
        .unwrap_or_else(|| {
            let names = document_names(docs);
            panic!("document '{file_name}' not found. Available: {names:?}")
        })
}

/// All document file names in processing order.
pub fn document_names(docs: &[Document]) -> Vec<String> {
    docs.iter().map(|d| d.file_name()).collect()
}

/// Build a notebook document value without touching the filesystem.
pub fn notebook_doc(path: impl Into<PathBuf>, section: Section) -> Document {
    Document {
        path: path.into(),
        format: DocumentFormat::Notebook,
        section,
    }
}

// =========================================================================
// Content builders
// =========================================================================

/// A minimal nbformat 4 notebook with the given cells (JSON array body).
pub fn notebook_json(cells: &str) -> String {
    format!(
        r#"{{
  "cells": [{cells}],
  "metadata": {{
    "kernelspec": {{"display_name": "Python 3", "language": "python", "name": "python3"}},
    "language_info": {{"name": "python"}}
  }},
  "nbformat": 4,
  "nbformat_minor": 5
}}"#
    )
}

/// Write a notebook file built by [`notebook_json`], creating parent dirs.
pub fn write_notebook(path: &Path, cells: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, notebook_json(cells)).unwrap();
}

/// Index markdown with both default section headings and nothing else.
pub fn empty_index() -> &'static str {
    "# Notebook Gallery\n\n# Python\n\n# R\n"
}
