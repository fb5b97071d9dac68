//! Error types for the resume-generator library.
//!
//! Every failure of the core pipeline (load → validate → render → write) is a
//! [`ResumeError`]. The variants mirror the stages: input errors come from the
//! loader, `RenderError` from template binding, `AlreadyExists` and
//! `OutputWriteFailed` from the output writer, and `ExternalServiceError` from
//! the PDF-export and AI collaborators, whose internals stay opaque here.
//!
//! Only two failures are degraded instead of surfaced: an unparsable date
//! suppresses that entry's duration, and an AI accessibility response that is
//! not JSON is kept under `raw`. Neither produces a `ResumeError`.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the resume-generator library.
#[derive(Debug, Error)]
pub enum ResumeError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file or directory was not found at the given path.
    #[error("{what} not found: '{path}'\nCheck the path exists and is readable.")]
    NotFound { what: &'static str, path: PathBuf },

    /// A directory was expected but the path is something else.
    #[error("Input directory is not a directory: '{path}'")]
    NotADirectory { path: PathBuf },

    /// Content matched neither JSON nor YAML.
    #[error("Could not parse resume data from '{path}' as {format}: {detail}")]
    ParseError {
        path: PathBuf,
        format: &'static str,
        detail: String,
    },

    /// The parsed document does not satisfy the resume schema.
    #[error("Resume '{path}' failed validation: {detail}")]
    ValidationError { path: PathBuf, detail: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Target exists and overwriting was not requested.
    #[error("Output already exists: '{path}'. Use --force to overwrite.")]
    AlreadyExists { path: PathBuf },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Rendering errors ──────────────────────────────────────────────────
    /// Template loading or binding failed.
    #[error("Failed to render template '{template}': {detail}")]
    RenderError { template: String, detail: String },

    // ── Collaborator errors ───────────────────────────────────────────────
    /// The PDF exporter or the AI backend failed.
    #[error("{service} failed: {detail}")]
    ExternalServiceError {
        service: &'static str,
        detail: String,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation or caller-supplied options were rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResumeError {
    /// Shorthand for a template failure, flattening tera's error chain so the
    /// root cause (e.g. the undefined variable) reaches the user.
    pub(crate) fn render(template: impl Into<String>, err: &tera::Error) -> Self {
        let mut detail = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(inner) = source {
            detail.push_str(": ");
            detail.push_str(&inner.to_string());
            source = inner.source();
        }
        ResumeError::RenderError {
            template: template.into(),
            detail,
        }
    }

    /// The path this error is about, when it has one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            ResumeError::NotFound { path, .. }
            | ResumeError::NotADirectory { path }
            | ResumeError::ParseError { path, .. }
            | ResumeError::ValidationError { path, .. }
            | ResumeError::AlreadyExists { path }
            | ResumeError::OutputWriteFailed { path, .. } => Some(path),
            _ => None,
        }
    }
}
