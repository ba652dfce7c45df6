//! Run configuration.
//!
//! Handles loading, validating, and merging `nbshots.toml`. Stock defaults
//! reproduce the conventional layout, so the file is optional: a `notebooks/`
//! root with a `README.md` index, screenshots under `notebooks/screenshots/`,
//! and two sections named `Python` and `R`.
//!
//! ## Config File Location
//!
//! Place `nbshots.toml` in the root directory that is walked for documents:
//!
//! ```text
//! notebooks/
//! ├── nbshots.toml             # Optional, overrides stock defaults
//! ├── README.md                # Index file
//! ├── screenshots/             # Generated PNGs
//! ├── Python/
//! │   └── foo_bar.ipynb        # → "# Python" section
//! └── R/
//!     └── analysis.qmd         # → "# R" section
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! index = "README.md"              # Index file, relative to the root
//! screenshots_dir = "screenshots"  # Screenshot directory, relative to the root
//!
//! [sections]
//! marker = "Python"   # Substring searched in each document's directory path
//! matched = "Python"  # Section heading for documents whose path contains marker
//! default = "R"       # Section heading for all other documents
//!
//! [browser]
//! width = 1200        # Viewport width in CSS pixels
//! height = 2000       # Viewport height in CSS pixels
//! settle_ms = 2000    # Delay after navigation before capturing
//! # chrome_path = "/usr/bin/chromium"
//!
//! [quarto]
//! command = "quarto"
//! args = ["--no-execute"]
//! ```
//!
//! Config files are sparse: override just the values you want. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the optional config file inside the root directory.
pub const CONFIG_FILE: &str = "nbshots.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `nbshots.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Index markdown file, relative to the root directory.
    pub index: PathBuf,
    /// Screenshot output directory, relative to the root directory.
    pub screenshots_dir: PathBuf,
    /// Section classification and headings.
    pub sections: SectionsConfig,
    /// Headless browser settings.
    pub browser: BrowserConfig,
    /// Quarto CLI invocation.
    pub quarto: QuartoConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            index: PathBuf::from("README.md"),
            screenshots_dir: PathBuf::from("screenshots"),
            sections: SectionsConfig::default(),
            browser: BrowserConfig::default(),
            quarto: QuartoConfig::default(),
        }
    }
}

impl RunConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.sections;
        if s.marker.is_empty() {
            return Err(ConfigError::Validation(
                "sections.marker must not be empty".into(),
            ));
        }
        if s.matched.trim().is_empty() || s.default.trim().is_empty() {
            return Err(ConfigError::Validation(
                "sections.matched and sections.default must not be empty".into(),
            ));
        }
        if s.matched == s.default {
            return Err(ConfigError::Validation(
                "sections.matched and sections.default must differ".into(),
            ));
        }
        if s.matched.contains('\n') || s.default.contains('\n') {
            return Err(ConfigError::Validation(
                "section headings must be a single line".into(),
            ));
        }
        if self.browser.width == 0 || self.browser.height == 0 {
            return Err(ConfigError::Validation(
                "browser.width and browser.height must be non-zero".into(),
            ));
        }
        if self.quarto.command.is_empty() {
            return Err(ConfigError::Validation(
                "quarto.command must not be empty".into(),
            ));
        }
        if !self.quarto.args.iter().any(|a| a == "--no-execute") {
            return Err(ConfigError::Validation(
                "quarto.args must include --no-execute".into(),
            ));
        }
        Ok(())
    }

    /// Absolute-or-relative path of the index file under `root`.
    pub fn index_path(&self, root: &Path) -> PathBuf {
        root.join(&self.index)
    }

    /// Screenshot directory under `root`.
    pub fn screenshots_path(&self, root: &Path) -> PathBuf {
        root.join(&self.screenshots_dir)
    }
}

/// How documents are split between the two index sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SectionsConfig {
    /// Case-sensitive substring looked up in the document's directory path.
    pub marker: String,
    /// Heading text (without `# `) for documents whose path contains `marker`.
    pub matched: String,
    /// Heading text for all other documents.
    pub default: String,
}

impl Default for SectionsConfig {
    fn default() -> Self {
        Self {
            marker: "Python".to_string(),
            matched: "Python".to_string(),
            default: "R".to_string(),
        }
    }
}

impl SectionsConfig {
    /// Heading text for a section.
    pub fn heading(&self, section: crate::types::Section) -> &str {
        match section {
            crate::types::Section::Matched => &self.matched,
            crate::types::Section::Default => &self.default,
        }
    }
}

/// Headless browser settings for the screenshot stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    /// Viewport width in CSS pixels.
    pub width: u32,
    /// Viewport height in CSS pixels.
    pub height: u32,
    /// Milliseconds to wait after navigation so fonts and layout settle.
    pub settle_ms: u64,
    /// Explicit Chrome/Chromium binary. Auto-detected when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 2000,
            settle_ms: 2000,
            chrome_path: None,
        }
    }
}

/// Quarto CLI invocation for `.qmd` documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuartoConfig {
    /// Executable name or path.
    pub command: String,
    /// Extra arguments appended after `render <file>`.
    pub args: Vec<String>,
}

impl Default for QuartoConfig {
    fn default() -> Self {
        Self {
            command: "quarto".to_string(),
            args: vec!["--no-execute".to_string()],
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(RunConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `nbshots.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(root: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<RunConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: RunConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config for a root directory: stock defaults overlaid by `nbshots.toml`.
pub fn load_config(root: &Path) -> Result<RunConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `nbshots.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# nbshots Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Place this file in the root directory
# that nbshots walks (notebooks/ by default).
#
# Unknown keys will cause an error.

# Index markdown file, relative to the root directory.
index = "README.md"

# Where screenshots are written, relative to the root directory.
# Each document produces <stem>.png; later runs overwrite it.
screenshots_dir = "screenshots"

# ---------------------------------------------------------------------------
# Sections
# ---------------------------------------------------------------------------
[sections]
# Case-sensitive substring looked up in each document's directory path
# (relative to the root). Documents whose path contains it go under the
# `matched` heading, all others under `default`.
marker = "Python"

# Section headings in the index, written as "# <heading>".
# Entries are only added when the heading already exists in the index.
matched = "Python"
default = "R"

# ---------------------------------------------------------------------------
# Headless browser
# ---------------------------------------------------------------------------
[browser]
# Viewport size used for the screenshot.
width = 1200
height = 2000

# Milliseconds to wait after the page loads so fonts and layout settle.
settle_ms = 2000

# Chrome/Chromium binary. Auto-detected when omitted.
# chrome_path = "/usr/bin/chromium"

# ---------------------------------------------------------------------------
# Quarto
# ---------------------------------------------------------------------------
[quarto]
# Executable used to render .qmd documents.
command = "quarto"

# Arguments appended after `render <file>`. Must include --no-execute.
args = ["--no-execute"]
"##
}
