//! Headless browser screenshots of rendered HTML.
//!
//! Each capture owns two resources, a temporary HTML file and a Chrome
//! process, and both are released by `Drop` on every exit path: a failed
//! launch, navigation, resize, or capture leaves no browser running and no
//! temporary file behind.
//!
//! ## Capture Sequence
//!
//! ```text
//! 1. write HTML   → <temp_dir>/nbshots-XXXXXX.html   (unique per capture)
//! 2. launch       → headless, no sandbox, --disable-dev-shm-usage
//! 3. navigate     → file://<absolute temp path>
//! 4. settle       → sleep settle_ms (fonts, layout, async scripts)
//! 5. resize       → width × height
//! 6. capture      → PNG written to the output path
//! 7./8. drop      → browser killed, temp file deleted
//! ```
//!
//! The settle delay is a heuristic; there is no reliable "render complete"
//! signal for arbitrary notebook HTML.

use crate::config::BrowserConfig;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::types::Bounds;
use headless_chrome::{Browser, LaunchOptions};
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ScreenshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Browser failed to launch: {0}")]
    Launch(String),
    #[error("Navigation to {url} failed: {reason}")]
    Navigate { url: String, reason: String },
    #[error("Viewport resize failed: {0}")]
    Resize(String),
    #[error("Screenshot capture failed: {0}")]
    Capture(String),
    #[error("Cannot build a file URL for {}", .0.display())]
    InvalidPath(PathBuf),
}

/// Captures a screenshot of an HTML string into an image file.
pub trait Screenshotter {
    fn capture(&self, html: &str, output: &Path) -> Result<(), ScreenshotError>;
}

/// Production screenshotter driving headless Chrome.
#[derive(Debug, Clone)]
pub struct ChromeScreenshotter {
    config: BrowserConfig,
    temp_dir: PathBuf,
}

impl ChromeScreenshotter {
    pub fn new(config: BrowserConfig, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            temp_dir: temp_dir.into(),
        }
    }

    fn launch(&self) -> Result<Browser, ScreenshotError> {
        let options = LaunchOptions {
            headless: true,
            sandbox: false,
            window_size: Some((self.config.width, self.config.height)),
            path: self.config.chrome_path.clone(),
            args: vec![OsStr::new("--disable-dev-shm-usage")],
            ..Default::default()
        };
        tracing::debug!(chrome_path = ?self.config.chrome_path, "launching headless browser");
        Browser::new(options).map_err(|e| ScreenshotError::Launch(e.to_string()))
    }
}

impl Screenshotter for ChromeScreenshotter {
    fn capture(&self, html: &str, output: &Path) -> Result<(), ScreenshotError> {
        fs::create_dir_all(&self.temp_dir)?;
        // Declared before the browser so it is dropped after it.
        let mut page = tempfile::Builder::new()
            .prefix("nbshots-")
            .suffix(".html")
            .tempfile_in(&self.temp_dir)?;
        page.write_all(html.as_bytes())?;
        page.flush()?;
        let url = file_url(page.path())?;
        tracing::debug!(%url, output = %output.display(), "capturing screenshot");

        let browser = self.launch()?;
        let tab = browser
            .new_tab()
            .map_err(|e| ScreenshotError::Launch(e.to_string()))?;

        tab.navigate_to(&url)
            .and_then(|t| t.wait_until_navigated())
            .map_err(|e| ScreenshotError::Navigate {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        std::thread::sleep(Duration::from_millis(self.config.settle_ms));

        tab.set_bounds(Bounds::Normal {
            left: Some(0),
            top: Some(0),
            width: Some(f64::from(self.config.width)),
            height: Some(f64::from(self.config.height)),
        })
        .map_err(|e| ScreenshotError::Resize(e.to_string()))?;

        let png = tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| ScreenshotError::Capture(e.to_string()))?;

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output, png)?;
        Ok(())
    }
}

/// `file://` URL for a local path, made absolute against the working directory.
pub fn file_url(path: &Path) -> Result<String, ScreenshotError> {
    let abs = std::path::absolute(path)?;
    Url::from_file_path(&abs)
        .map(String::from)
        .map_err(|()| ScreenshotError::InvalidPath(abs))
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Mock screenshotter that records captures and writes a placeholder file.
    #[derive(Default)]
    pub struct MockScreenshotter {
        pub captures: RefCell<Vec<(String, PathBuf)>>,
    }

    impl MockScreenshotter {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn outputs(&self) -> Vec<PathBuf> {
            self.captures.borrow().iter().map(|(_, p)| p.clone()).collect()
        }
    }

    impl Screenshotter for MockScreenshotter {
        fn capture(&self, html: &str, output: &Path) -> Result<(), ScreenshotError> {
            fs::write(output, b"mock png")?;
            self.captures
                .borrow_mut()
                .push((html.to_string(), output.to_path_buf()));
            Ok(())
        }
    }

    #[test]
    fn file_url_is_absolute() {
        let url = file_url(Path::new("/tmp/page.html")).unwrap();
        assert_eq!(url, "file:///tmp/page.html");
    }

    #[test]
    fn file_url_escapes_reserved_characters() {
        let url = file_url(Path::new("/tmp/my notes #1?.html")).unwrap();
        assert_eq!(url, "file:///tmp/my%20notes%20%231%3F.html");
    }

    #[test]
    fn file_url_encodes_non_ascii() {
        let url = file_url(Path::new("/tmp/données/page.html")).unwrap();
        assert_eq!(url, "file:///tmp/donn%C3%A9es/page.html");
        let parsed = Url::parse(&url).unwrap();
        assert_eq!(
            parsed.to_file_path().unwrap(),
            PathBuf::from("/tmp/données/page.html")
        );
    }

    #[test]
    fn relative_paths_are_resolved() {
        let url = file_url(Path::new("page.html")).unwrap();
        assert!(url.starts_with("file:///"));
        assert!(url.ends_with("/page.html"));
    }

    #[test]
    fn launch_failure_removes_temp_file() {
        let tmp = TempDir::new().unwrap();
        let temp_dir = tmp.path().join("work");
        let config = BrowserConfig {
            chrome_path: Some(tmp.path().join("no-such-chrome")),
            settle_ms: 0,
            ..Default::default()
        };
        let shooter = ChromeScreenshotter::new(config, &temp_dir);

        let result = shooter.capture("<html></html>", &tmp.path().join("out.png"));

        assert!(matches!(result, Err(ScreenshotError::Launch(_))));
        assert_eq!(fs::read_dir(&temp_dir).unwrap().count(), 0);
        assert!(!tmp.path().join("out.png").exists());
    }
}
