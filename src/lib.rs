//! # nbshots
//!
//! Keeps a markdown gallery of notebooks current. Every Jupyter (`.ipynb`)
//! and Quarto (`.qmd`) document under a root directory is rendered to static
//! HTML, captured as a PNG with headless Chrome, and linked from an index
//! file under one of two section headings.
//!
//! # Architecture: Per-Document Pipeline
//!
//! Discovery produces an ordered list of documents; each document then flows
//! through three stages before the next one starts:
//!
//! ```text
//! 0. Scan        notebooks/      →  Vec<Document>          (walk + classify)
//! 1. Render      Document        →  HTML string            (maud / quarto CLI)
//! 2. Screenshot  HTML            →  screenshots/<stem>.png (headless Chrome)
//! 3. Index       title + paths   →  README.md              (insert or replace)
//! ```
//!
//! Processing is sequential and the first error aborts the run. Outputs
//! already produced for earlier documents are kept; re-running is safe
//! because index updates replace existing entries instead of duplicating
//! them.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Walks the root directory and classifies documents into sections |
//! | [`render`] | `DocumentRenderer` trait; native notebook renderer and Quarto CLI wrapper |
//! | [`screenshot`] | `Screenshotter` trait; headless Chrome capture with RAII cleanup |
//! | [`index`] | Regex-based insert/replace of entries in the markdown index |
//! | [`pipeline`] | Drives the stages per document and reports progress events |
//! | [`config`] | `nbshots.toml` loading, merging over stock defaults, validation |
//! | [`types`] | `Document`, `DocumentFormat`, `Section` |
//! | [`naming`] | File stem → display title (`foo_bar` → `Foo Bar`) |
//! | [`output`] | CLI output formatting for each command |
//!
//! # Design Decisions
//!
//! ## Native Notebook Rendering
//!
//! Notebooks are rendered in-process from their stored outputs with
//! [Maud](https://maud.lambda.xyz/) and `pulldown-cmark`, instead of shelling
//! out to `nbconvert`. No Python installation is needed and no cell is ever
//! executed. Quarto documents still go through the `quarto` CLI, always with
//! `--no-execute`.
//!
//! ## Textual Index Editing
//!
//! The index is patched with line-anchored regular expressions rather than a
//! markdown AST, so everything outside the touched entry keeps its exact
//! formatting. An entry is identified by its `## Title` heading together with
//! its source link.

pub mod config;
pub mod index;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod render;
pub mod scan;
pub mod screenshot;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
