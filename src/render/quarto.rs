//! Quarto document rendering via the `quarto` CLI.
//!
//! `quarto render <file> --no-execute` writes `<stem>.html` (and, for
//! non-self-contained output, a `<stem>_files/` directory) next to the
//! source. Both are intermediate: the HTML is read into memory and then
//! everything the render created is removed, whether it succeeded or not, so
//! the source tree never accumulates stray artifacts.

use super::RenderError;
use crate::config::QuartoConfig;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Render a `.qmd` file and return the produced HTML.
pub fn render_file(path: &Path, config: &QuartoConfig) -> Result<String, RenderError> {
    let html_path = path.with_extension("html");
    let files_dir = support_dir(path);
    let files_dir_existed = files_dir.exists();

    tracing::debug!(
        command = %config.command,
        path = %path.display(),
        args = ?config.args,
        "running quarto render"
    );
    let output = Command::new(&config.command)
        .arg("render")
        .arg(path)
        .args(&config.args)
        .stdin(Stdio::null())
        .output()
        .map_err(|source| RenderError::Spawn {
            command: config.command.clone(),
            source,
        })?;

    // Quarto ran, so anything at these paths now belongs to this render.
    let mut cleanup = Cleanup::default();
    cleanup.file(html_path.clone());
    if !files_dir_existed {
        cleanup.dir(files_dir);
    }

    if !output.status.success() {
        return Err(RenderError::QuartoFailed {
            path: path.to_path_buf(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    if !html_path.is_file() {
        return Err(RenderError::MissingOutput(html_path));
    }
    fs::read_to_string(&html_path).map_err(|source| RenderError::Io {
        path: html_path.clone(),
        source,
    })
}

/// `<stem>_files`, the directory Quarto uses for page dependencies.
fn support_dir(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}_files"))
}

/// Removes intermediate render outputs when dropped.
#[derive(Default)]
struct Cleanup {
    files: Vec<PathBuf>,
    dirs: Vec<PathBuf>,
}

impl Cleanup {
    fn file(&mut self, path: PathBuf) {
        self.files.push(path);
    }

    fn dir(&mut self, path: PathBuf) {
        self.dirs.push(path);
    }
}

impl Drop for Cleanup {
    fn drop(&mut self) {
        for file in &self.files {
            if file.exists()
                && let Err(e) = fs::remove_file(file)
            {
                tracing::warn!(path = %file.display(), error = %e, "failed to remove intermediate file");
            }
        }
        for dir in &self.dirs {
            if dir.is_dir()
                && let Err(e) = fs::remove_dir_all(dir)
            {
                tracing::warn!(path = %dir.display(), error = %e, "failed to remove intermediate directory");
            }
        }
    }
}
