//! PDF export collaborator.
//!
//! The core pipeline only knows the [`PdfExporter`] trait: hand it HTML (as
//! text or as a file on disk) and a destination, and it either produces an A4
//! PDF there or fails with `ExternalServiceError`. The call is blocking; async
//! callers should wrap it in `spawn_blocking` or `block_in_place`.
//!
//! With the `chrome` feature, [`ChromePdfExporter`] drives a local
//! Chrome/Chromium over the DevTools protocol.

use crate::config::OutputPolicy;
use crate::error::ResumeError;
use crate::pipeline::writer;
use std::path::{Path, PathBuf};
use tracing::info;

/// What to print.
#[derive(Debug, Clone, Copy)]
pub enum PdfSource<'a> {
    /// Inline HTML markup.
    Html(&'a str),
    /// An HTML file on disk; relative references resolve against its folder.
    File(&'a Path),
}

/// Converts HTML to PDF. Implementations block until the file is written.
pub trait PdfExporter: Send + Sync {
    /// Print `source` to `destination` (A4, backgrounds on, after web fonts
    /// have loaded). The destination's parent directory already exists.
    fn export(&self, source: PdfSource<'_>, destination: &Path) -> Result<(), ResumeError>;
}

/// `cv.html` → `cv.pdf`.
pub fn default_pdf_path(html: &Path) -> PathBuf {
    html.with_extension("pdf")
}

/// Print an existing HTML file.
///
/// `output` defaults to the HTML path with a `.pdf` extension. The policy's
/// collision and timestamp rules apply to the PDF path.
///
/// # Errors
/// - `NotFound` if `html` does not exist
/// - `AlreadyExists` if the PDF exists and `policy.force` is false
/// - `ExternalServiceError` if the exporter fails
pub fn render_pdf_from_html_file(
    exporter: &dyn PdfExporter,
    html: &Path,
    output: Option<&Path>,
    policy: &OutputPolicy,
) -> Result<PathBuf, ResumeError> {
    if !html.is_file() {
        return Err(ResumeError::NotFound {
            what: "HTML file",
            path: html.to_path_buf(),
        });
    }
    let requested = output.map_or_else(|| default_pdf_path(html), Path::to_path_buf);
    let target = writer::prepare_output_path(&requested, policy)?;
    exporter.export(PdfSource::File(html), &target)?;
    info!("PDF generated: {}", target.display());
    Ok(target)
}

/// `file://` URL for a local path.
pub fn file_url(path: &Path) -> Result<String, ResumeError> {
    let absolute = std::fs::canonicalize(path).map_err(|_| ResumeError::NotFound {
        what: "HTML file",
        path: path.to_path_buf(),
    })?;
    let raw = absolute.to_string_lossy().replace('\\', "/");
    let encoded = raw
        .replace('%', "%25")
        .replace(' ', "%20")
        .replace('#', "%23")
        .replace('?', "%3F");
    if encoded.starts_with('/') {
        Ok(format!("file://{encoded}"))
    } else {
        Ok(format!("file:///{encoded}"))
    }
}

#[cfg(feature = "chrome")]
pub use chrome::ChromePdfExporter;

#[cfg(feature = "chrome")]
mod chrome {
    use super::{file_url, PdfExporter, PdfSource};
    use crate::error::ResumeError;
    use headless_chrome::types::PrintToPdfOptions;
    use headless_chrome::{Browser, LaunchOptions};
    use std::io::Write;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tracing::debug;

    /// A4 in inches.
    const A4_WIDTH_IN: f64 = 8.27;
    const A4_HEIGHT_IN: f64 = 11.69;

    fn service_error(detail: impl std::fmt::Display) -> ResumeError {
        ResumeError::ExternalServiceError {
            service: "PDF export",
            detail: detail.to_string(),
        }
    }

    /// Headless Chrome exporter. A browser is launched per export and closed
    /// when the call returns.
    #[derive(Debug, Clone)]
    pub struct ChromePdfExporter {
        chrome_path: Option<PathBuf>,
        timeout: Duration,
    }

    impl Default for ChromePdfExporter {
        fn default() -> Self {
            Self {
                chrome_path: None,
                timeout: Duration::from_secs(60),
            }
        }
    }

    impl ChromePdfExporter {
        pub fn new() -> Self {
            Self::default()
        }

        /// Use a specific browser binary instead of auto-detection.
        pub fn with_chrome_path(mut self, path: impl Into<PathBuf>) -> Self {
            self.chrome_path = Some(path.into());
            self
        }

        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        fn launch(&self) -> Result<Browser, ResumeError> {
            let options = LaunchOptions::default_builder()
                .headless(true)
                .path(self.chrome_path.clone())
                .idle_browser_timeout(self.timeout)
                .build()
                .map_err(service_error)?;
            Browser::new(options).map_err(service_error)
        }

        fn print(&self, url: &str, destination: &Path) -> Result<(), ResumeError> {
            let browser = self.launch()?;
            let tab = browser.new_tab().map_err(service_error)?;
            tab.set_default_timeout(self.timeout);
            debug!("Navigating headless Chrome to {}", url);
            tab.navigate_to(url)
                .and_then(|t| t.wait_until_navigated())
                .map_err(service_error)?;
            tab.evaluate("document.fonts.ready.then(() => true)", true)
                .map_err(service_error)?;

            let options = PrintToPdfOptions {
                print_background: Some(true),
                paper_width: Some(A4_WIDTH_IN),
                paper_height: Some(A4_HEIGHT_IN),
                ..Default::default()
            };
            let bytes = tab.print_to_pdf(Some(options)).map_err(service_error)?;
            std::fs::write(destination, &bytes).map_err(|e| ResumeError::OutputWriteFailed {
                path: destination.to_path_buf(),
                source: e,
            })?;
            debug!("Wrote {} PDF bytes", bytes.len());
            Ok(())
        }
    }

    impl PdfExporter for ChromePdfExporter {
        fn export(&self, source: PdfSource<'_>, destination: &Path) -> Result<(), ResumeError> {
            match source {
                PdfSource::File(path) => self.print(&file_url(path)?, destination),
                PdfSource::Html(html) => {
                    // Chrome needs a URL; park the markup in a temp file.
                    let mut tmp = tempfile::Builder::new()
                        .prefix("resume-")
                        .suffix(".html")
                        .tempfile()
                        .map_err(|e| ResumeError::Internal(format!("tempfile: {e}")))?;
                    tmp.write_all(html.as_bytes())
                        .map_err(|e| ResumeError::Internal(format!("tempfile write: {e}")))?;
                    self.print(&file_url(tmp.path())?, destination)
                }
            }
        }
    }
}
