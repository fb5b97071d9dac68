//! Single-document entry points: HTML, PDF, or both.
//!
//! These mirror the `generate`, `pdf` and `full` CLI commands. Each checks its
//! input first, then applies the [`OutputPolicy`] to every file it writes.

use crate::config::{OutputPolicy, RenderConfig};
use crate::error::ResumeError;
use crate::model::ResumeDocument;
use crate::pdf::{self, PdfExporter, PdfSource};
use crate::pipeline::assets::AssetResolver;
use crate::pipeline::render::Renderer;
use crate::pipeline::{loader, writer};
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths written by [`generate_full`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullOutput {
    pub html: PathBuf,
    pub pdf: PathBuf,
}

/// Render a loaded document to an HTML string.
pub fn generate_html(doc: &ResumeDocument, config: &RenderConfig) -> Result<String, ResumeError> {
    let renderer = Renderer::new(config)?;
    let picture = AssetResolver::from_config(config).resolve_picture(doc);
    renderer.render(doc, &picture.uri)
}

/// Load `input`, render it and write the HTML to `output`.
///
/// Returns the path actually written, which carries the timestamp suffix when
/// the policy has one.
///
/// # Errors
/// - `NotFound` if `input` does not exist
/// - `ParseError` / `ValidationError` from the loader
/// - `RenderError` from the template
/// - `AlreadyExists` if the output exists and `policy.force` is false
pub fn generate_html_file(
    input: &Path,
    output: &Path,
    config: &RenderConfig,
    policy: &OutputPolicy,
) -> Result<PathBuf, ResumeError> {
    let doc = loader::load_resume(input)?;
    let html = generate_html(&doc, config)?;
    let written = writer::write_output(output, html.as_bytes(), policy)?;
    info!("Resume generated: {}", written.display());
    Ok(written)
}

/// Print an existing HTML resume to PDF.
///
/// `output` defaults to the HTML path with a `.pdf` extension; the policy
/// (force, timestamp) applies to whichever path is used.
pub fn convert_pdf(
    exporter: &dyn PdfExporter,
    html: &Path,
    output: Option<&Path>,
    policy: &OutputPolicy,
) -> Result<PathBuf, ResumeError> {
    pdf::render_pdf_from_html_file(exporter, html, output, policy)
}

/// Generate the HTML, then print it to PDF.
///
/// Without `pdf_output` the PDF sits next to the HTML with the same stem
/// (timestamp included). An explicit `pdf_output` gets the policy's timestamp
/// token applied to it as well.
pub fn generate_full(
    exporter: &dyn PdfExporter,
    input: &Path,
    html_output: &Path,
    pdf_output: Option<&Path>,
    config: &RenderConfig,
    policy: &OutputPolicy,
) -> Result<FullOutput, ResumeError> {
    let html = generate_html_file(input, html_output, config, policy)?;

    let pdf_target = match pdf_output {
        Some(explicit) => writer::prepare_output_path(explicit, policy)?,
        None => writer::prepare_output_path(
            &pdf::default_pdf_path(&html),
            &policy.without_timestamp(),
        )?,
    };
    exporter.export(PdfSource::File(&html), &pdf_target)?;
    info!("PDF generated: {}", pdf_target.display());

    Ok(FullOutput {
        html,
        pdf: pdf_target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::tests::FakeExporter;
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, RenderConfig) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("cv.yaml");
        fs::write(
            &input,
            "basics:\n  name: Sample Person\n  label: Engineer\nwork:\n  - name: Acme\n    startDate: 2020-01-01\n    endDate: 2022-07-01\n",
        )
        .unwrap();
        let config = RenderConfig::builder()
            .working_dir(dir.path())
            .build()
            .unwrap();
        (dir, input, config)
    }

    #[test]
    fn html_file_is_written() {
        let (dir, input, config) = setup();
        let out = dir.path().join("out/resume.html");
        let written = generate_html_file(&input, &out, &config, &OutputPolicy::default()).unwrap();
        assert_eq!(written, out);
        let html = fs::read_to_string(out).unwrap();
        assert!(html.contains("Sample Person"));
        assert!(html.contains("2.5 years"));
    }

    #[test]
    fn missing_input_is_not_found() {
        let (dir, _input, config) = setup();
        let err = generate_html_file(
            &dir.path().join("nope.json"),
            &dir.path().join("resume.html"),
            &config,
            &OutputPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ResumeError::NotFound { .. }));
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn second_run_without_force_fails() {
        let (dir, input, config) = setup();
        let out = dir.path().join("resume.html");
        generate_html_file(&input, &out, &config, &OutputPolicy::default()).unwrap();
        let err = generate_html_file(&input, &out, &config, &OutputPolicy::default()).unwrap_err();
        assert!(matches!(err, ResumeError::AlreadyExists { .. }));
    }

    #[test]
    fn full_puts_pdf_beside_timestamped_html() {
        let (dir, input, config) = setup();
        let exporter = FakeExporter::default();
        let policy = OutputPolicy::new(false).with_timestamp("20250101_120000");

        let out = generate_full(
            &exporter,
            &input,
            &dir.path().join("resume.html"),
            None,
            &config,
            &policy,
        )
        .unwrap();
        assert_eq!(out.html, dir.path().join("resume_20250101_120000.html"));
        assert_eq!(out.pdf, dir.path().join("resume_20250101_120000.pdf"));
        assert!(out.pdf.is_file());
    }

    #[test]
    fn full_explicit_pdf_gets_timestamp() {
        let (dir, input, config) = setup();
        let exporter = FakeExporter::default();
        let policy = OutputPolicy::new(false).with_timestamp("20250101_120000");

        let out = generate_full(
            &exporter,
            &input,
            &dir.path().join("resume.html"),
            Some(&dir.path().join("pdf/cv.pdf")),
            &config,
            &policy,
        )
        .unwrap();
        assert_eq!(out.pdf, dir.path().join("pdf/cv_20250101_120000.pdf"));
    }

    #[test]
    fn convert_pdf_uses_sibling_path() {
        let (dir, _input, _config) = setup();
        let html = dir.path().join("cv.html");
        fs::write(&html, "<html></html>").unwrap();
        let out = convert_pdf(&FakeExporter::default(), &html, None, &OutputPolicy::default()).unwrap();
        assert_eq!(out, dir.path().join("cv.pdf"));
    }
}
