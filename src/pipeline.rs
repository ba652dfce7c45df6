//! The render → screenshot → index pipeline.
//!
//! Documents are processed strictly one at a time, in discovery order. The
//! first failure of any stage aborts the run; screenshots and index edits
//! already made for earlier documents stay on disk.
//!
//! Progress is reported through an optional channel of [`PipelineEvent`]s so
//! the CLI can print while the library stays free of I/O to stdout.

use crate::config::{ConfigError, RunConfig};
use crate::index::{IndexEntry, IndexError, IndexUpdate, update_index};
use crate::naming::display_title;
use crate::render::{DocumentRenderer, NativeRenderer, RenderError};
use crate::scan::{self, ScanError};
use crate::screenshot::{ChromeScreenshotter, ScreenshotError, Screenshotter};
use crate::types::DocumentFormat;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("Render error: {0}")]
    Render(#[from] RenderError),
    #[error("Screenshot error: {0}")]
    Screenshot(#[from] ScreenshotError),
    #[error("Index update error: {0}")]
    Index(#[from] IndexError),
}

/// Progress notifications emitted while the pipeline runs.
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Started {
        total: usize,
    },
    DocumentStarted {
        /// 1-based position in processing order.
        index: usize,
        total: usize,
        title: String,
        /// Document path relative to the root.
        source: PathBuf,
        format: DocumentFormat,
        section: String,
    },
    DocumentFinished {
        /// Screenshot path relative to the root.
        screenshot: PathBuf,
        section: String,
        outcome: IndexUpdate,
    },
}

/// Totals for a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub inserted: usize,
    pub replaced: usize,
    /// Titles of documents whose section heading was absent from the index.
    pub section_missing: Vec<String>,
}

impl RunSummary {
    fn record(&mut self, title: &str, outcome: IndexUpdate) {
        self.processed += 1;
        match outcome {
            IndexUpdate::Inserted => self.inserted += 1,
            IndexUpdate::Replaced => self.replaced += 1,
            IndexUpdate::SectionMissing => self.section_missing.push(title.to_string()),
        }
    }
}

/// Run the full pipeline with the production renderer and headless Chrome.
pub fn run(
    root: &Path,
    config: &RunConfig,
    temp_dir: &Path,
    events: Option<Sender<PipelineEvent>>,
) -> Result<RunSummary, PipelineError> {
    let renderer = NativeRenderer::new(config.quarto.clone());
    let shooter = ChromeScreenshotter::new(config.browser.clone(), temp_dir);
    run_with(&renderer, &shooter, root, config, events)
}

/// Run the pipeline with specific stage implementations (allows testing with mocks).
pub fn run_with(
    renderer: &impl DocumentRenderer,
    shooter: &impl Screenshotter,
    root: &Path,
    config: &RunConfig,
    events: Option<Sender<PipelineEvent>>,
) -> Result<RunSummary, PipelineError> {
    let emit = |event: PipelineEvent| {
        if let Some(tx) = &events {
            // A closed receiver only means nobody is listening.
            let _ = tx.send(event);
        }
    };

    let index_path = config.index_path(root);
    if !index_path.is_file() {
        return Err(IndexError::NotFound(index_path).into());
    }

    let documents = scan::discover(root, config)?;
    let screenshots_dir = config.screenshots_path(root);
    fs::create_dir_all(&screenshots_dir)?;

    emit(PipelineEvent::Started {
        total: documents.len(),
    });

    let mut summary = RunSummary::default();
    for (i, doc) in documents.iter().enumerate() {
        let title = display_title(&doc.path);
        let section = config.sections.heading(doc.section).to_string();
        emit(PipelineEvent::DocumentStarted {
            index: i + 1,
            total: documents.len(),
            title: title.clone(),
            source: relative_to(&doc.path, root),
            format: doc.format,
            section: section.clone(),
        });

        let html = renderer.render(doc)?;

        let screenshot = screenshots_dir.join(doc.screenshot_name());
        shooter.capture(&html, &screenshot)?;

        let entry = IndexEntry::new(&index_path, &title, &doc.path, &screenshot);
        let outcome = update_index(&index_path, &section, &entry)?;
        if outcome == IndexUpdate::SectionMissing {
            tracing::warn!(%title, %section, "section heading missing from index, entry not added");
        }
        summary.record(&title, outcome);

        emit(PipelineEvent::DocumentFinished {
            screenshot: relative_to(&screenshot, root),
            section,
            outcome,
        });
    }

    Ok(summary)
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
