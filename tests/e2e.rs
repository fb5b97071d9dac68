//! End-to-end tests against a real headless Chrome.
//!
//! Gated behind `E2E_ENABLED` because they need a local Chrome/Chromium.
//!
//! Run with:
//!   E2E_ENABLED=1 cargo test --test e2e -- --nocapture

#![cfg(feature = "chrome")]

use resume_generator::{
    generate_full, ChromePdfExporter, OutputPolicy, PdfExporter, PdfSource, RenderConfig,
};
use std::path::PathBuf;
use tempfile::TempDir;

macro_rules! e2e_skip_unless_enabled {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
    }};
}

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn assert_pdf(path: &std::path::Path) {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(b"%PDF"), "{} is not a PDF", path.display());
    assert!(bytes.len() > 1000, "{} is suspiciously small", path.display());
}

#[test]
fn full_renders_a_real_pdf() {
    e2e_skip_unless_enabled!();
    let dir = TempDir::new().unwrap();
    let config = RenderConfig::builder()
        .working_dir(dir.path())
        .build()
        .unwrap();

    let out = generate_full(
        &ChromePdfExporter::new(),
        &sample("resume.json"),
        &dir.path().join("resume.html"),
        None,
        &config,
        &OutputPolicy::default(),
    )
    .unwrap();
    assert_pdf(&out.pdf);
}

#[test]
fn inline_html_export() {
    e2e_skip_unless_enabled!();
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("inline.pdf");
    ChromePdfExporter::new()
        .export(
            PdfSource::Html("<html><body><h1>Inline</h1></body></html>"),
            &dest,
        )
        .unwrap();
    assert_pdf(&dest);
}
