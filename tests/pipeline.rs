//! Integration tests for the load → render → write pipeline.
//!
//! Everything here runs offline against the sample documents in
//! `tests/data/`; PDF export uses a stub exporter.

use chrono::NaiveDate;
use resume_generator::pipeline::render::calculate_years;
use resume_generator::{
    generate_full, generate_html_file, load_resume, load_resume_data, BatchProcessor,
    OutputPolicy, PdfExporter, PdfSource, RenderConfig, ResumeError, DEFAULT_CV_FOOTER,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("resume_generator=debug")
        .with_test_writer()
        .try_init();
}

fn config(dir: &TempDir) -> RenderConfig {
    init_tracing();
    let now = NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    RenderConfig::builder()
        .working_dir(dir.path())
        .now(now)
        .build()
        .unwrap()
}

struct StubExporter;

impl PdfExporter for StubExporter {
    fn export(&self, _source: PdfSource<'_>, destination: &Path) -> Result<(), ResumeError> {
        fs::write(destination, b"%PDF-1.4\n").map_err(|e| ResumeError::OutputWriteFailed {
            path: destination.to_path_buf(),
            source: e,
        })
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

#[test]
fn sample_json_and_yaml_load() {
    let json = load_resume(data("resume.json")).unwrap();
    assert_eq!(json.basics.name, "Sample Person");
    assert_eq!(json.work.len(), 2);
    assert_eq!(json.basics.profiles[0].network.as_deref(), Some("GitHub"));

    let yaml = load_resume(data("resume.yaml")).unwrap();
    assert_eq!(yaml.basics.name, "Zoë Müller");
    assert_eq!(
        yaml.cv_footer.as_deref(),
        Some("Consent granted for recruitment purposes only.\nSecond footer line.")
    );
}

#[test]
fn raw_data_keeps_freeform_sections() {
    let value = load_resume_data(data("resume.json")).unwrap();
    assert_eq!(value["awards"][0]["details"]["place"], 1);
}

// ── Rendering ────────────────────────────────────────────────────────────────

#[test]
fn rendered_html_is_self_contained() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("resume.html");
    generate_html_file(&data("resume.json"), &out, &config(&dir), &OutputPolicy::default())
        .unwrap();
    let html = fs::read_to_string(&out).unwrap();

    assert!(html.contains("<style>"));
    assert!(!html.contains("<link rel=\"stylesheet\""));
    assert!(html.contains("<svg"));
    assert!(html.contains("data:image/svg+xml;base64,"), "placeholder picture is inlined");
    assert!(html.contains("2.5 years"));
    assert!(html.contains("<strong>reliable</strong>"));
    assert!(html.contains("Hackathon winner"));
    assert!(html.contains(DEFAULT_CV_FOOTER.lines().next().unwrap()));

    let first = html.find("Northwind Analytics").unwrap();
    let second = html.find("Contoso Labs").unwrap();
    assert!(first < second, "work order is preserved");
}

#[test]
fn custom_footer_lines_are_rendered() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("zoe.html");
    generate_html_file(&data("resume.yaml"), &out, &config(&dir), &OutputPolicy::default())
        .unwrap();
    let html = fs::read_to_string(&out).unwrap();

    assert!(html.contains("Consent granted for recruitment purposes only."));
    assert!(html.contains("Second footer line."));
    assert!(!html.contains(DEFAULT_CV_FOOTER.lines().next().unwrap()));
    assert!(html.contains("Forecasting with sparse signals"));
}

#[test]
fn open_ended_job_uses_reference_date() {
    let now = NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    // 2021-06-01 → 2025-01-01 = 1310 days ≈ 3.59 years → 3.5
    assert_eq!(calculate_years(Some("2021-06"), None, now).as_deref(), Some("3.5"));

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("zoe.html");
    generate_html_file(&data("resume.yaml"), &out, &config(&dir), &OutputPolicy::default())
        .unwrap();
    assert!(fs::read_to_string(&out).unwrap().contains("3.5 years"));
}

// ── Output policy ────────────────────────────────────────────────────────────

#[test]
fn collision_policy_end_to_end() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("resume.html");
    let cfg = config(&dir);

    generate_html_file(&data("resume.json"), &out, &cfg, &OutputPolicy::new(false)).unwrap();
    let err = generate_html_file(&data("resume.json"), &out, &cfg, &OutputPolicy::new(false))
        .unwrap_err();
    assert!(matches!(err, ResumeError::AlreadyExists { .. }));
    assert!(err.to_string().contains("--force"));

    generate_html_file(&data("resume.yaml"), &out, &cfg, &OutputPolicy::new(true)).unwrap();
    assert!(fs::read_to_string(&out).unwrap().contains("Zoë Müller"));
}

#[test]
fn full_writes_matching_pdf() {
    let dir = TempDir::new().unwrap();
    let out = generate_full(
        &StubExporter,
        &data("resume.json"),
        &dir.path().join("out/resume.html"),
        None,
        &config(&dir),
        &OutputPolicy::new(false).with_timestamp("20250101_090000"),
    )
    .unwrap();
    assert_eq!(out.html, dir.path().join("out/resume_20250101_090000.html"));
    assert_eq!(out.pdf, dir.path().join("out/resume_20250101_090000.pdf"));
    assert!(out.pdf.is_file());
}

// ── Batch ────────────────────────────────────────────────────────────────────

#[test]
fn batch_over_sample_directory() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::copy(data("resume.json"), input.path().join("sample.json")).unwrap();
    fs::copy(data("resume.yaml"), input.path().join("zoe.yaml")).unwrap();

    let report = BatchProcessor::new(&config(&input), OutputPolicy::default())
        .unwrap()
        .with_exporter(&StubExporter)
        .with_folder_namer(|| "20250101_000000".to_string())
        .run(input.path(), output.path())
        .unwrap();

    let htmls: Vec<PathBuf> = report.entries.iter().map(|e| e.html.clone()).collect();
    assert_eq!(
        htmls,
        [
            output.path().join("sample/20250101_000000/Sample_Person_CV.html"),
            output.path().join("zoe/20250101_000000/Zoe_Muller_CV.html"),
        ]
    );
    for entry in &report.entries {
        assert!(entry.pdf.as_ref().unwrap().is_file());
    }
}
