//! # resume-generator
//!
//! Render JSON or YAML resumes to a single self-contained HTML file, and
//! optionally to PDF.
//!
//! The output embeds its stylesheet, icons and profile picture, so the HTML
//! can be mailed, archived or printed without the files it was built from.
//!
//! ## Pipeline Overview
//!
//! ```text
//! resume.yaml / resume.json
//!  │
//!  ├─ 1. Load     parse JSON or YAML, validate against the schema
//!  ├─ 2. Assets   resolve the picture (override → conventional → document
//!  │              → placeholder), inline icons and CSS
//!  ├─ 3. Render   bind into the tera template, compute durations
//!  ├─ 4. Write    collision policy, optional timestamp suffix, atomic write
//!  └─ 5. PDF      (optional) headless Chrome, A4, backgrounds printed
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume_generator::{generate_html_file, OutputPolicy, RenderConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RenderConfig::default();
//!     let written = generate_html_file(
//!         Path::new("resume.yaml"),
//!         Path::new("output/resume.html"),
//!         &config,
//!         &OutputPolicy::new(false),
//!     )?;
//!     println!("{}", written.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `cli`    | on      | Enables the `resume-generator` binary (clap + anyhow + tracing-subscriber + indicatif) |
//! | `chrome` | on      | [`ChromePdfExporter`], PDF export through a local Chrome/Chromium |
//!
//! Library-only use without a browser dependency:
//! ```toml
//! resume-generator = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod agent;
pub mod config;
pub mod error;
pub mod generate;
pub mod model;
pub mod pdf;
pub mod pipeline;
pub mod progress;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use agent::{AccessibilityReport, AgentAction, AgentBackend, AgentService, LlmBackend};
pub use config::{
    AgentConfig, AgentConfigBuilder, OutputPolicy, RenderConfig, RenderConfigBuilder,
    DEFAULT_CV_FOOTER,
};
pub use error::ResumeError;
pub use generate::{convert_pdf, generate_full, generate_html, generate_html_file, FullOutput};
pub use model::ResumeDocument;
#[cfg(feature = "chrome")]
pub use pdf::ChromePdfExporter;
pub use pdf::{render_pdf_from_html_file, PdfExporter, PdfSource};
pub use pipeline::batch::{process_directory, BatchEntry, BatchProcessor, BatchReport};
pub use pipeline::loader::{load_resume, load_resume_data};
pub use progress::{BatchProgressCallback, NoopProgressCallback};
