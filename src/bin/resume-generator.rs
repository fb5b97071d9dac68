//! CLI binary for resume-generator.
//!
//! A thin shim over the library crate that maps subcommands and flags onto
//! `RenderConfig` / `OutputPolicy` / `AgentConfig` and prints results.

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use resume_generator::pipeline::writer::timestamp_token;
use resume_generator::{
    agent, convert_pdf, generate_full, generate_html_file, AgentAction, AgentConfig, AgentService,
    BatchProcessor, BatchProgressCallback, OutputPolicy, PdfExporter, RenderConfig,
};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Progress bar for `full-many`, one tick per resume.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} resumes  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Generating");
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Processing {total} resume(s)…"))
        ));
    }

    fn on_entry_start(&self, _index: usize, _total: usize, source: &Path) {
        self.bar.set_message(file_name(source));
    }

    fn on_entry_complete(&self, index: usize, total: usize, html: &Path, pdf: Option<&Path>) {
        let pdf_name = pdf.map(file_name).unwrap_or_else(|| "-".to_string());
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {} | {}",
            green("✓"),
            index,
            total,
            file_name(html),
            dim(&pdf_name),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total: usize) {
        self.bar.finish_and_clear();
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # HTML only
  resume-generator generate resume.yaml -o output/resume.html

  # HTML + PDF with a timestamped file name
  resume-generator full resume.json -o output/resume.html --file-date

  # Convert an existing HTML file
  resume-generator pdf output/resume.html --force

  # Every resume in a directory
  resume-generator full-many resumes/ --output-dir output/

  # AI helpers
  resume-generator agent translate resume.yaml --target-language German
  resume-generator agent proofread resume.yaml
  resume-generator agent pdf-access output/resume.pdf

ENVIRONMENT VARIABLES:
  AI_API_KEY              API key for the agent (copied to OPENAI_API_KEY if unset)
  AI_MODEL                Agent model, `model` or `provider:model`
  AI_PROVIDER             Agent provider (openai, anthropic, gemini, ollama)
  RUST_LOG                Log filter override

  A `.env` file in the working directory is loaded first.

PDF export needs a local Chrome or Chromium install.
"#;

/// Generate resumes as HTML and PDF.
#[derive(Parser, Debug)]
#[command(
    name = "resume-generator",
    version,
    about = "Generate resumes as HTML and PDF",
    long_about = "Render JSON or YAML resumes into a single self-contained HTML file (inline CSS, \
icons and picture), print them to A4 PDF with headless Chrome, and run AI helpers for \
translation, proofreading and PDF accessibility checks.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "RESUME_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "RESUME_QUIET")]
    quiet: bool,

    /// Disable the batch progress bar.
    #[arg(long, global = true, env = "RESUME_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an HTML resume.
    Generate(GenerateArgs),

    /// Convert an existing HTML resume to PDF.
    Pdf(PdfArgs),

    /// Generate both HTML and PDF outputs with matching names by default.
    Full(FullArgs),

    /// Process every JSON/YAML resume in a directory to HTML and PDF outputs.
    #[command(name = "full-many")]
    FullMany(FullManyArgs),

    /// Run AI-powered helper actions on explicit files.
    Agent(AgentArgs),
}

/// Options shared by every command that renders HTML.
#[derive(Args, Debug)]
struct RenderArgs {
    /// Directory containing a custom `resume.html` template.
    #[arg(long, env = "RESUME_TEMPLATE_DIR")]
    template_dir: Option<PathBuf>,

    /// Profile picture; takes precedence over `public/profile.jpg` and `basics.picture`.
    #[arg(long, env = "RESUME_PROFILE_PHOTO")]
    profile_photo: Option<PathBuf>,
}

/// Collision policy flags.
#[derive(Args, Debug)]
struct WriteArgs {
    /// Overwrite existing output files.
    #[arg(long)]
    force: bool,

    /// Append a `_YYYYMMDD_HHMMSS` timestamp to output file names.
    #[arg(long)]
    file_date: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Resume file (.json, .yaml or .yml).
    input: PathBuf,

    /// Output HTML file.
    #[arg(short, long, default_value = "resume.html")]
    output: PathBuf,

    #[command(flatten)]
    render: RenderArgs,

    #[command(flatten)]
    write: WriteArgs,
}

#[derive(Args, Debug)]
struct PdfArgs {
    /// Existing HTML resume.
    html: PathBuf,

    /// Output PDF file. Default: the HTML path with a `.pdf` extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    write: WriteArgs,
}

#[derive(Args, Debug)]
struct FullArgs {
    /// Resume file (.json, .yaml or .yml).
    input: PathBuf,

    /// Output HTML file.
    #[arg(short, long, default_value = "resume.html")]
    output: PathBuf,

    /// Output PDF file. Default: next to the HTML with the same name.
    #[arg(long)]
    pdf_file: Option<PathBuf>,

    #[command(flatten)]
    render: RenderArgs,

    #[command(flatten)]
    write: WriteArgs,
}

#[derive(Args, Debug)]
struct FullManyArgs {
    /// Directory of resume files.
    input_dir: PathBuf,

    /// Root of the dated output folders.
    #[arg(long, env = "RESUME_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Only write HTML.
    #[arg(long)]
    no_pdf: bool,

    #[command(flatten)]
    render: RenderArgs,

    #[command(flatten)]
    write: WriteArgs,
}

#[derive(Args, Debug)]
struct AgentArgs {
    /// translate, proofread or pdf-access.
    #[arg(value_parser = parse_action)]
    action: AgentAction,

    /// Files to process (resumes, or PDFs for pdf-access).
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Language to translate into (translate only).
    #[arg(long)]
    target_language: Option<String>,

    /// Language of the source resume. Default: auto.
    #[arg(long)]
    source_language: Option<String>,

    /// Where translated resumes and proofreading notes are written.
    #[arg(long, default_value = "output/agent")]
    output_dir: PathBuf,

    /// Model ID, optionally as `provider:model` (e.g. anthropic:claude-3-5-haiku-latest).
    #[arg(long, env = "AI_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama.
    #[arg(long, env = "AI_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, default_value_t = 0.2)]
    temperature: f32,

    /// Retries on LLM failure.
    #[arg(long, default_value_t = 2)]
    max_retries: u32,
}

fn parse_action(s: &str) -> std::result::Result<AgentAction, String> {
    s.parse().map_err(|e: resume_generator::ResumeError| e.to_string())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    // Environment writes happen here, before any runtime thread exists.
    if let Some(key) = api_key_alias(
        std::env::var_os("OPENAI_API_KEY"),
        std::env::var_os("AI_API_KEY"),
    ) {
        std::env::set_var("OPENAI_API_KEY", key);
    }
    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?
        .block_on(run(cli))
}

/// `AI_API_KEY` stands in for `OPENAI_API_KEY` when the latter is unset.
fn api_key_alias(openai: Option<OsString>, ai: Option<OsString>) -> Option<OsString> {
    match openai {
        Some(_) => None,
        None => ai,
    }
}

async fn run(cli: Cli) -> Result<()> {

    // ── Logging setup ────────────────────────────────────────────────────
    // The batch progress bar replaces INFO logs; `--verbose` brings them back.
    let show_progress =
        !cli.quiet && !cli.no_progress && matches!(cli.command, Command::FullMany(_));
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Generate(args) => {
            let config = render_config(&args.render)?;
            let policy = output_policy(&args.write);
            let written = generate_html_file(&args.input, &args.output, &config, &policy)
                .context("HTML generation failed")?;
            if !cli.quiet {
                println!("{} Resume generated successfully: {}", green("✓"), written.display());
            }
        }

        Command::Pdf(args) => {
            let policy = output_policy(&args.write);
            let exporter = pdf_exporter()?;
            let written = tokio::task::block_in_place(|| {
                convert_pdf(exporter.as_ref(), &args.html, args.output.as_deref(), &policy)
            })
            .context("PDF conversion failed")?;
            if !cli.quiet {
                println!("{} PDF created successfully: {}", green("✓"), written.display());
            }
        }

        Command::Full(args) => {
            let config = render_config(&args.render)?;
            let policy = output_policy(&args.write);
            let exporter = pdf_exporter()?;
            let out = tokio::task::block_in_place(|| {
                generate_full(
                    exporter.as_ref(),
                    &args.input,
                    &args.output,
                    args.pdf_file.as_deref(),
                    &config,
                    &policy,
                )
            })
            .context("Resume generation failed")?;
            if !cli.quiet {
                println!("{} Resume generated: {}", green("✓"), out.html.display());
                println!("{} PDF generated: {}", green("✓"), out.pdf.display());
            }
        }

        Command::FullMany(args) => {
            let config = render_config(&args.render)?;
            let policy = output_policy(&args.write);
            let exporter = if args.no_pdf { None } else { Some(pdf_exporter()?) };
            let progress = show_progress.then(CliProgressCallback::new);

            let report = tokio::task::block_in_place(|| {
                let mut processor = BatchProcessor::new(&config, policy)?;
                if let Some(ref e) = exporter {
                    processor = processor.with_exporter(e.as_ref());
                }
                if let Some(ref p) = progress {
                    processor = processor.with_progress(p);
                }
                processor.run(&args.input_dir, &args.output_dir)
            })
            .context("Batch processing failed")?;

            if !cli.quiet {
                println!(
                    "{} Processed {} resume(s) into {}:",
                    green("✓"),
                    report.len(),
                    args.output_dir.display()
                );
                for entry in &report.entries {
                    let pdf = entry.pdf.as_deref().map(file_name).unwrap_or_default();
                    println!("  - {} | {}", entry.html.display(), pdf);
                }
            }
        }

        Command::Agent(args) => run_agent(args, cli.quiet).await?,
    }

    Ok(())
}

async fn run_agent(args: AgentArgs, quiet: bool) -> Result<()> {
    for file in &args.files {
        if !file.exists() {
            bail!("Input file not found: '{}'", file.display());
        }
    }

    let mut builder = AgentConfig::builder()
        .temperature(args.temperature)
        .max_retries(args.max_retries);
    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }
    let config = builder.build().context("Invalid agent configuration")?;
    let service = AgentService::new(config).context("Failed to set up the AI agent")?;

    match args.action {
        AgentAction::Translate => {
            let Some(ref language) = args.target_language else {
                bail!("--target-language is required for translation.");
            };
            for path in &args.files {
                let written = agent::translate_resume_file(
                    &service,
                    path,
                    language,
                    args.source_language.as_deref(),
                    &args.output_dir,
                )
                .await
                .with_context(|| format!("Translation of '{}' failed", path.display()))?;
                if !quiet {
                    println!("{} Translated {} → {}", green("✓"), file_name(path), written.display());
                }
            }
        }
        AgentAction::Proofread => {
            for path in &args.files {
                let (feedback, written) =
                    agent::proofread_resume_file(&service, path, &args.output_dir)
                        .await
                        .with_context(|| format!("Proofreading of '{}' failed", path.display()))?;
                println!(
                    "Feedback for {}:\n{}\nSaved to: {}",
                    bold(&file_name(path)),
                    feedback,
                    written.display()
                );
            }
        }
        AgentAction::PdfAccess => {
            for path in &args.files {
                let report = agent::assess_pdf_file(&service, path)
                    .await
                    .with_context(|| format!("Accessibility check of '{}' failed", path.display()))?;
                let score = report
                    .score
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "n/a".to_string());
                println!("{}: score={} verdict={}", file_name(path), score, report.verdict);
                if !report.issues.is_empty() {
                    println!("Issues:");
                    for issue in &report.issues {
                        println!("  - {issue}");
                    }
                }
                if !report.suggestions.is_empty() {
                    println!("Suggestions:");
                    for suggestion in &report.suggestions {
                        println!("  - {suggestion}");
                    }
                }
                if let Some(ref raw) = report.raw {
                    println!("Raw response:\n{raw}");
                }
            }
        }
    }
    Ok(())
}

/// Map render flags to `RenderConfig`.
fn render_config(args: &RenderArgs) -> Result<RenderConfig> {
    let mut builder = RenderConfig::builder();
    if let Some(ref dir) = args.template_dir {
        builder = builder.template_dir(dir);
    }
    if let Some(ref photo) = args.profile_photo {
        builder = builder.profile_photo(photo);
    }
    builder.build().context("Invalid configuration")
}

fn output_policy(args: &WriteArgs) -> OutputPolicy {
    let policy = OutputPolicy::new(args.force);
    if args.file_date {
        policy.with_timestamp(timestamp_token(Local::now().naive_local()))
    } else {
        policy
    }
}

#[cfg(feature = "chrome")]
fn pdf_exporter() -> Result<Box<dyn PdfExporter>> {
    Ok(Box::new(resume_generator::ChromePdfExporter::new()))
}

#[cfg(not(feature = "chrome"))]
fn pdf_exporter() -> Result<Box<dyn PdfExporter>> {
    bail!("PDF export is not available: rebuild with the `chrome` feature")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_api_key_fills_missing_openai_key() {
        assert_eq!(
            api_key_alias(None, Some("sk-ai".into())),
            Some(OsString::from("sk-ai"))
        );
    }

    #[test]
    fn existing_openai_key_wins() {
        assert_eq!(api_key_alias(Some("sk-openai".into()), Some("sk-ai".into())), None);
        assert_eq!(api_key_alias(None, None), None);
    }
}
