//! CLI output formatting.
//!
//! Each command has a `format_*` function returning `Vec<String>` for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Python
//! 001 Foo Bar
//!     Source: Python/foo_bar.ipynb
//!
//! R
//! 001 Analysis
//!     Source: R/analysis.qmd
//!
//! Found 2 documents (1 notebook, 1 quarto)
//! ```
//!
//! ## Run
//!
//! ```text
//! Processing 2 documents
//! [001/002] Foo Bar (notebook → Python)
//!     Source: Python/foo_bar.ipynb
//!     Screenshot: screenshots/foo_bar.png
//!     Index: inserted
//! ```

use crate::config::RunConfig;
use crate::index::IndexUpdate;
use crate::naming::display_title;
use crate::pipeline::{PipelineEvent, RunSummary};
use crate::types::{Document, DocumentFormat, Section};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Display a path with forward slashes regardless of platform.
fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ============================================================================
// scan
// ============================================================================

/// Format discovered documents grouped by section.
pub fn format_scan_output(docs: &[Document], root: &Path, config: &RunConfig) -> Vec<String> {
    let mut lines = Vec::new();

    for section in [Section::Matched, Section::Default] {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(config.sections.heading(section).to_string());
        let in_section: Vec<&Document> = docs.iter().filter(|d| d.section == section).collect();
        if in_section.is_empty() {
            lines.push("    (none)".to_string());
        }
        for (i, doc) in in_section.iter().enumerate() {
            let rel = doc.path.strip_prefix(root).unwrap_or(&doc.path);
            lines.push(format!(
                "{} {}",
                format_index(i + 1),
                display_title(&doc.path)
            ));
            lines.push(format!("    Source: {}", slash_path(rel)));
        }
    }

    let notebooks = docs
        .iter()
        .filter(|d| d.format == DocumentFormat::Notebook)
        .count();
    lines.push(String::new());
    lines.push(format!(
        "Found {} ({} notebook, {} quarto)",
        plural(docs.len(), "document"),
        notebooks,
        docs.len() - notebooks
    ));
    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(docs: &[Document], root: &Path, config: &RunConfig) {
    for line in format_scan_output(docs, root, config) {
        println!("{}", line);
    }
}

// ============================================================================
// run
// ============================================================================

/// Format a single pipeline progress event as display lines.
pub fn format_pipeline_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::Started { total } => {
            vec![format!("Processing {}", plural(*total, "document"))]
        }
        PipelineEvent::DocumentStarted {
            index,
            total,
            title,
            source,
            format,
            section,
        } => vec![
            format!(
                "[{}/{}] {} ({} \u{2192} {})",
                format_index(*index),
                format_index(*total),
                title,
                format,
                section
            ),
            format!("    Source: {}", slash_path(source)),
        ],
        PipelineEvent::DocumentFinished {
            screenshot,
            section,
            outcome,
        } => {
            let status = match outcome {
                IndexUpdate::Inserted => "inserted".to_string(),
                IndexUpdate::Replaced => "updated".to_string(),
                IndexUpdate::SectionMissing => {
                    format!("skipped, no \"# {}\" heading in index", section)
                }
            };
            vec![
                format!("    Screenshot: {}", slash_path(screenshot)),
                format!("    Index: {}", status),
            ]
        }
    }
}

/// Format the end-of-run summary.
pub fn format_summary(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "Processed {}: {} inserted, {} updated",
        plural(summary.processed, "document"),
        summary.inserted,
        summary.replaced
    )];
    if !summary.section_missing.is_empty() {
        lines.push(format!(
            "Warning: {} not indexed (section heading missing):",
            plural(summary.section_missing.len(), "document")
        ));
        for title in &summary.section_missing {
            lines.push(format!("    {}", title));
        }
    }
    lines
}

/// Print the end-of-run summary to stdout.
pub fn print_summary(summary: &RunSummary) {
    for line in format_summary(summary) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

/// Format the index check result.
pub fn format_check_output(index_path: &Path, headings: &[&str], missing: &[&str]) -> Vec<String> {
    let mut lines = vec![format!("Index: {}", slash_path(index_path))];
    for heading in headings {
        let mark = if missing.contains(heading) {
            "missing"
        } else {
            "ok"
        };
        lines.push(format!("    # {}: {}", heading, mark));
    }
    lines
}
