//! Document → HTML rendering.
//!
//! | Format | How |
//! |---|---|
//! | **`.ipynb`** | parsed as nbformat 4 JSON, rendered in-process with maud + pulldown-cmark |
//! | **`.qmd`** | `quarto render <file> --no-execute`, adjacent `.html` read back then removed |
//!
//! The module is split into:
//! - **Renderer trait**: [`DocumentRenderer`] + the production [`NativeRenderer`]
//! - **Notebook**: nbformat data model and HTML templates
//! - **Quarto**: subprocess invocation and intermediate file cleanup

pub mod notebook;
pub mod quarto;

use crate::config::QuartoConfig;
use crate::types::{Document, DocumentFormat};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed notebook {}: {source}", path.display())]
    Notebook {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Unsupported nbformat version {version} in {} (expected 4)", path.display())]
    UnsupportedVersion { path: PathBuf, version: u64 },
    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("quarto render failed for {} (exit code {code:?}): {stderr}", path.display())]
    QuartoFailed {
        path: PathBuf,
        code: Option<i32>,
        stderr: String,
    },
    #[error("quarto produced no output file: {}", .0.display())]
    MissingOutput(PathBuf),
}

/// Converts a document into a self-contained HTML string.
///
/// The pipeline only talks to this trait so tests can substitute a renderer
/// that needs neither Quarto nor real notebooks.
pub trait DocumentRenderer {
    fn render(&self, doc: &Document) -> Result<String, RenderError>;
}

/// Production renderer: notebooks in-process, Quarto documents via the CLI.
#[derive(Debug, Clone, Default)]
pub struct NativeRenderer {
    quarto: QuartoConfig,
}

impl NativeRenderer {
    pub fn new(quarto: QuartoConfig) -> Self {
        Self { quarto }
    }
}

impl DocumentRenderer for NativeRenderer {
    fn render(&self, doc: &Document) -> Result<String, RenderError> {
        match doc.format {
            DocumentFormat::Notebook => notebook::render_file(&doc.path),
            DocumentFormat::Quarto => quarto::render_file(&doc.path, &self.quarto),
        }
    }
}
