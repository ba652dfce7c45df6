//! Jupyter notebook rendering.
//!
//! Notebooks are read as nbformat 4 JSON into the typed model below and
//! rendered from their stored outputs; no kernel is ever started. The result
//! is a single HTML document with inline CSS and inline images, so it can be
//! opened from any directory.
//!
//! ## Rendered Structure
//!
//! ```text
//! <main class="notebook">
//!   <div class="cell markdown-cell">  ← pulldown-cmark output
//!   <div class="cell code-cell">
//!     <div class="input">   In [1]:  <pre><code class="language-python">
//!     <div class="outputs"> Out[1]:  richest MIME type per output
//!   <div class="cell raw-cell">       ← verbatim <pre>
//! ```
//!
//! ## Output MIME Priority
//!
//! `execute_result` and `display_data` outputs carry a bundle of
//! representations; the first available of these is shown:
//! `text/html`, `image/svg+xml`, `image/png`, `image/jpeg`, `text/markdown`,
//! `text/latex`, `application/json`, `text/plain`.
//!
//! Rendering is deterministic: the same notebook always yields the same bytes.

use super::RenderError;
use crate::naming::display_title;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Options, Parser, html as md_html};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

const CSS: &str = include_str!("../../static/notebook.css");

const MIME_PRIORITY: &[&str] = &[
    "text/html",
    "image/svg+xml",
    "image/png",
    "image/jpeg",
    "text/markdown",
    "text/latex",
    "application/json",
    "text/plain",
];

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("valid ANSI pattern"));

// =============================================================================
// nbformat 4 model
// =============================================================================

/// A notebook document. Only the fields needed for rendering are modelled;
/// everything else in the JSON is ignored.
#[derive(Debug, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
    #[serde(default)]
    pub metadata: NotebookMetadata,
    pub nbformat: u64,
    #[serde(default)]
    pub nbformat_minor: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotebookMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub kernelspec: Option<KernelSpec>,
    #[serde(default)]
    pub language_info: Option<LanguageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct KernelSpec {
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LanguageInfo {
    pub name: String,
}

/// nbformat stores text either as one string or as a list of lines.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MultilineString {
    One(String),
    Lines(Vec<String>),
}

impl MultilineString {
    pub fn text(&self) -> String {
        match self {
            Self::One(s) => s.clone(),
            Self::Lines(lines) => lines.concat(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "cell_type", rename_all = "lowercase")]
pub enum Cell {
    Markdown {
        source: MultilineString,
    },
    Code {
        source: MultilineString,
        #[serde(default)]
        execution_count: Option<u64>,
        #[serde(default)]
        outputs: Vec<Output>,
    },
    Raw {
        source: MultilineString,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "output_type", rename_all = "snake_case")]
pub enum Output {
    Stream {
        name: String,
        text: MultilineString,
    },
    ExecuteResult {
        #[serde(default)]
        data: BTreeMap<String, serde_json::Value>,
        #[serde(default)]
        execution_count: Option<u64>,
    },
    DisplayData {
        #[serde(default)]
        data: BTreeMap<String, serde_json::Value>,
    },
    Error {
        ename: String,
        evalue: String,
        #[serde(default)]
        traceback: Vec<String>,
    },
}

impl Notebook {
    /// Parse notebook JSON, rejecting anything that is not nbformat 4.
    pub fn from_json(path: &Path, json: &str) -> Result<Self, RenderError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|source| RenderError::Notebook {
                path: path.to_path_buf(),
                source,
            })?;
        if let Some(version) = value.get("nbformat").and_then(|v| v.as_u64())
            && version != 4
        {
            return Err(RenderError::UnsupportedVersion {
                path: path.to_path_buf(),
                version,
            });
        }
        serde_json::from_value(value).map_err(|source| RenderError::Notebook {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Language used for code cell classes.
    pub fn language(&self) -> &str {
        self.metadata
            .language_info
            .as_ref()
            .map(|l| l.name.as_str())
            .or_else(|| {
                self.metadata
                    .kernelspec
                    .as_ref()
                    .and_then(|k| k.language.as_deref())
            })
            .unwrap_or("python")
    }

    /// Explicit metadata title, else the first `# heading` of a markdown cell.
    pub fn title(&self) -> Option<String> {
        if let Some(title) = &self.metadata.title {
            return Some(title.clone());
        }
        self.cells.iter().find_map(|cell| match cell {
            Cell::Markdown { source } => source
                .text()
                .lines()
                .find(|line| line.starts_with("# "))
                .map(|line| line.trim_start_matches("# ").trim().to_string()),
            _ => None,
        })
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Read and render a notebook file to an HTML string.
pub fn render_file(path: &Path) -> Result<String, RenderError> {
    let json = fs::read_to_string(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let notebook = Notebook::from_json(path, &json)?;
    let fallback = display_title(path);
    Ok(render_notebook(&notebook, &fallback).into_string())
}

/// Render a parsed notebook as a full HTML document.
pub fn render_notebook(notebook: &Notebook, fallback_title: &str) -> Markup {
    let title = notebook.title().unwrap_or_else(|| fallback_title.to_string());
    let language = notebook.language();
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                main.notebook {
                    @for cell in &notebook.cells {
                        (render_cell(cell, language))
                    }
                }
            }
        }
    }
}

fn render_cell(cell: &Cell, language: &str) -> Markup {
    match cell {
        Cell::Markdown { source } => html! {
            div.cell.markdown-cell {
                (markdown(&source.text()))
            }
        },
        Cell::Code {
            source,
            execution_count,
            outputs,
        } => html! {
            div.cell.code-cell {
                div.input {
                    div.prompt { "In [" (count_label(*execution_count)) "]:" }
                    pre { code class=(format!("language-{language}")) { (source.text()) } }
                }
                @if !outputs.is_empty() {
                    div.outputs {
                        @for output in outputs {
                            (render_output(output))
                        }
                    }
                }
            }
        },
        Cell::Raw { source } => html! {
            div.cell.raw-cell {
                pre { (source.text()) }
            }
        },
    }
}

fn render_output(output: &Output) -> Markup {
    match output {
        Output::Stream { name, text } => html! {
            div class=(format!("output stream {name}")) {
                pre { (text.text()) }
            }
        },
        Output::ExecuteResult {
            data,
            execution_count,
        } => html! {
            div.output.execute-result {
                div.prompt { "Out[" (count_label(*execution_count)) "]:" }
                (render_mime_bundle(data))
            }
        },
        Output::DisplayData { data } => html! {
            div.output.display-data {
                (render_mime_bundle(data))
            }
        },
        Output::Error {
            ename,
            evalue,
            traceback,
        } => {
            let text = if traceback.is_empty() {
                format!("{ename}: {evalue}")
            } else {
                strip_ansi(&traceback.join("\n"))
            };
            html! {
                div.output.error {
                    pre { (text) }
                }
            }
        }
    }
}

fn render_mime_bundle(data: &BTreeMap<String, serde_json::Value>) -> Markup {
    let Some((mime, value)) = MIME_PRIORITY
        .iter()
        .find_map(|mime| data.get(*mime).map(|v| (*mime, v)))
    else {
        return html! {};
    };
    match mime {
        "text/html" | "image/svg+xml" => html! {
            div.rich { (PreEscaped(mime_text(value))) }
        },
        "image/png" | "image/jpeg" => {
            let payload: String = mime_text(value)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            html! {
                img src=(format!("data:{mime};base64,{payload}")) alt="output";
            }
        }
        "text/markdown" => html! {
            div.rich { (markdown(&mime_text(value))) }
        },
        "application/json" => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_default();
            html! { pre { (pretty) } }
        }
        _ => html! { pre { (mime_text(value)) } },
    }
}

/// Text payload of a MIME bundle entry: a string, or a list of lines.
fn mime_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(lines) => lines.iter().filter_map(|l| l.as_str()).collect(),
        other => other.to_string(),
    }
}

fn markdown(text: &str) -> Markup {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    let parser = Parser::new_ext(text, options);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    PreEscaped(out)
}

fn count_label(count: Option<u64>) -> String {
    count.map(|n| n.to_string()).unwrap_or_else(|| " ".to_string())
}

fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}
