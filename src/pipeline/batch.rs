//! Batch orchestration: run the single-document pipeline over a directory.
//!
//! ```text
//! <output_dir>/
//!   <source stem>/
//!     <YYYYMMDD_HHMMSS>[_N]/
//!       First_Last_CV.html
//!       First_Last_CV.pdf      (with an exporter)
//! ```
//!
//! Entries are processed strictly one after another. The first failure
//! (parse, validation, render, write or export) stops the run and is returned
//! as-is; entries already written stay on disk.

use crate::config::{OutputPolicy, RenderConfig};
use crate::error::ResumeError;
use crate::pdf::{PdfExporter, PdfSource};
use crate::pipeline::assets::AssetResolver;
use crate::pipeline::render::Renderer;
use crate::pipeline::{loader, writer};
use crate::progress::BatchProgressCallback;
use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Extensions picked up by discovery, in processing order.
pub const RESUME_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

static RE_NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Resume files in `dir`: `*.json`, then `*.yaml`, then `*.yml`, each group
/// sorted by name, with entries resolving to the same file kept once.
///
/// # Errors
/// - `NotFound` if `dir` does not exist or holds no matching files
/// - `NotADirectory` if `dir` is a file
pub fn discover_resumes(dir: &Path) -> Result<Vec<PathBuf>, ResumeError> {
    if !dir.exists() {
        return Err(ResumeError::NotFound {
            what: "Input directory",
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(ResumeError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .map_err(|e| ResumeError::Internal(format!("Failed to list '{}': {e}", dir.display())))?
    {
        let path = entry
            .map_err(|e| ResumeError::Internal(format!("Failed to list '{}': {e}", dir.display())))?
            .path();
        if path.is_file() {
            files.push(path);
        }
    }

    let mut seen = HashSet::new();
    let mut found = Vec::new();
    for ext in RESUME_EXTENSIONS {
        let mut group: Vec<&PathBuf> = files
            .iter()
            .filter(|p| p.extension().is_some_and(|e| e == ext))
            .collect();
        group.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        for path in group {
            let key = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
            if seen.insert(key) {
                found.push(path.clone());
            } else {
                debug!("Skipping {}: same file as an earlier entry", path.display());
            }
        }
    }

    if found.is_empty() {
        return Err(ResumeError::NotFound {
            what: "Resume files (*.json, *.yaml, *.yml)",
            path: dir.to_path_buf(),
        });
    }
    Ok(found)
}

/// ASCII-only form of one name token: diacritics dropped, every other run of
/// non-alphanumerics collapsed to `_`, outer underscores trimmed.
pub fn sanitize_name_token(token: &str) -> String {
    let folded: String = token.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    RE_NON_ALNUM
        .replace_all(&folded, "_")
        .trim_matches('_')
        .to_string()
}

/// Output base name for one batch entry.
///
/// `"Ada Lovelace"` → `Ada_Lovelace_CV`; a one-word name → `Name_CV`; no name,
/// or nothing left after sanitising → `<stem>_CV`.
pub fn output_base_name(display_name: Option<&str>, stem: &str) -> String {
    let tokens: Vec<&str> = display_name
        .map(|n| n.split_whitespace().collect())
        .unwrap_or_default();
    let picked: Vec<String> = match tokens.as_slice() {
        [] => Vec::new(),
        [only] => vec![sanitize_name_token(only)],
        [first, .., last] => vec![sanitize_name_token(first), sanitize_name_token(last)],
    };
    let parts: Vec<&str> = picked
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        format!("{stem}_CV")
    } else {
        format!("{}_CV", parts.join("_"))
    }
}

/// `parent/token`, or `parent/token_2`, `_3`, … if taken.
fn unique_dir(parent: &Path, token: &str) -> PathBuf {
    let first = parent.join(token);
    if !first.exists() {
        return first;
    }
    (2u32..)
        .map(|n| parent.join(format!("{token}_{n}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// One processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub source: PathBuf,
    pub html: PathBuf,
    pub pdf: Option<PathBuf>,
}

/// Result of a completed batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Runs load → render → write (→ export) for every resume in a directory.
pub struct BatchProcessor<'a> {
    renderer: Renderer,
    resolver: AssetResolver,
    policy: OutputPolicy,
    exporter: Option<&'a dyn PdfExporter>,
    progress: Option<&'a dyn BatchProgressCallback>,
    folder_namer: Box<dyn FnMut() -> String + 'a>,
}

impl<'a> BatchProcessor<'a> {
    /// Build a processor. The template is parsed once here and reused for
    /// every entry.
    pub fn new(config: &RenderConfig, policy: OutputPolicy) -> Result<Self, ResumeError> {
        Ok(Self {
            renderer: Renderer::new(config)?,
            resolver: AssetResolver::from_config(config),
            policy,
            exporter: None,
            progress: None,
            folder_namer: Box::new(|| writer::timestamp_token(Local::now().naive_local())),
        })
    }

    /// Also print each HTML file to PDF.
    pub fn with_exporter(mut self, exporter: &'a dyn PdfExporter) -> Self {
        self.exporter = Some(exporter);
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn BatchProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Replace the dated-folder token source (defaults to local time).
    pub fn with_folder_namer(mut self, namer: impl FnMut() -> String + 'a) -> Self {
        self.folder_namer = Box::new(namer);
        self
    }

    /// Process every resume in `input_dir`, writing under `output_dir`.
    ///
    /// # Errors
    /// Discovery errors, or the first per-entry error; later entries are not
    /// attempted.
    pub fn run(&mut self, input_dir: &Path, output_dir: &Path) -> Result<BatchReport, ResumeError> {
        let sources = discover_resumes(input_dir)?;
        let total = sources.len();
        info!("Processing {} resume file(s) from {}", total, input_dir.display());
        if let Some(cb) = self.progress {
            cb.on_batch_start(total);
        }

        let mut report = BatchReport::default();
        for (i, source) in sources.into_iter().enumerate() {
            let index = i + 1;
            if let Some(cb) = self.progress {
                cb.on_entry_start(index, total, &source);
            }
            let entry = self.process_one(&source, output_dir)?;
            if let Some(cb) = self.progress {
                cb.on_entry_complete(index, total, &entry.html, entry.pdf.as_deref());
            }
            report.entries.push(entry);
        }

        if let Some(cb) = self.progress {
            cb.on_batch_complete(total);
        }
        Ok(report)
    }

    fn process_one(&mut self, source: &Path, output_dir: &Path) -> Result<BatchEntry, ResumeError> {
        let doc = loader::load_resume(source)?;
        let picture = self.resolver.resolve_picture(&doc);
        let html = self.renderer.render(&doc, &picture.uri)?;

        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        let token = (self.folder_namer)();
        let entry_dir = unique_dir(&output_dir.join(&stem), &token);
        let base = output_base_name(Some(&doc.basics.name), &stem);
        debug!("{} → {}/{}", source.display(), entry_dir.display(), base);

        let html_path =
            writer::write_output(&entry_dir.join(format!("{base}.html")), html.as_bytes(), &self.policy)?;

        let pdf_path = match self.exporter {
            Some(exporter) => {
                let target = writer::prepare_output_path(
                    &html_path.with_extension("pdf"),
                    &self.policy.without_timestamp(),
                )?;
                exporter.export(PdfSource::File(&html_path), &target)?;
                info!("PDF generated: {}", target.display());
                Some(target)
            }
            None => None,
        };

        Ok(BatchEntry {
            source: source.to_path_buf(),
            html: html_path,
            pdf: pdf_path,
        })
    }
}

/// [`BatchProcessor`] with default settings and no PDF export.
pub fn process_directory(
    input_dir: &Path,
    output_dir: &Path,
    config: &RenderConfig,
    policy: OutputPolicy,
) -> Result<BatchReport, ResumeError> {
    BatchProcessor::new(config, policy)?.run(input_dir, output_dir)
}
