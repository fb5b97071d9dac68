//! AI agent collaborator: translate, proofread, and PDF accessibility checks.
//!
//! The service talks to a model through the [`AgentBackend`] trait. The
//! production backend, [`LlmBackend`], wraps an `edgequake_llm` provider
//! built from an explicit [`AgentConfig`]; tests substitute a canned backend.
//! Nothing here reads environment variables.
//!
//! ## Retry Strategy
//!
//! Provider errors (rate limits, 5xx) are retried with exponential backoff,
//! `retry_backoff_ms * 2^(attempt-1)`: with the defaults that is 500 ms then
//! 1 s before giving up with `ExternalServiceError`.

use crate::config::{AgentConfig, OutputPolicy};
use crate::error::ResumeError;
use crate::pipeline::loader::SourceFormat;
use crate::pipeline::writer;
use crate::prompts;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, info, warn};

/// Supported agent workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentAction {
    Translate,
    Proofread,
    PdfAccess,
}

impl AgentAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentAction::Translate => "translate",
            AgentAction::Proofread => "proofread",
            AgentAction::PdfAccess => "pdf-access",
        }
    }
}

impl fmt::Display for AgentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentAction {
    type Err = ResumeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "translate" => Ok(AgentAction::Translate),
            "proofread" => Ok(AgentAction::Proofread),
            "pdf-access" => Ok(AgentAction::PdfAccess),
            other => Err(ResumeError::InvalidConfig(format!(
                "Unsupported agent action: '{other}' (expected translate, proofread or pdf-access)"
            ))),
        }
    }
}

// ── Backends ─────────────────────────────────────────────────────────────

/// Sends one prompt, returns the model's text.
#[async_trait]
pub trait AgentBackend: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ResumeError>;
}

/// Backend over an `edgequake_llm` provider.
pub struct LlmBackend {
    provider: Arc<dyn LLMProvider>,
    config: AgentConfig,
}

impl LlmBackend {
    /// Use `config.provider` if set, otherwise build one from
    /// `config.provider_name` and `config.model`.
    pub fn new(config: AgentConfig) -> Result<Self, ResumeError> {
        let provider = match config.provider {
            Some(ref provider) => Arc::clone(provider),
            None => ProviderFactory::create_llm_provider(&config.provider_name, &config.model)
                .map_err(|e| {
                    ResumeError::InvalidConfig(format!(
                        "Could not create '{}' provider for model '{}': {e}",
                        config.provider_name, config.model
                    ))
                })?,
        };
        Ok(Self { provider, config })
    }

    fn options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_tokens),
            ..Default::default()
        }
    }
}

#[async_trait]
impl AgentBackend for LlmBackend {
    async fn complete(&self, prompt: &str) -> Result<String, ResumeError> {
        let system = self
            .config
            .system_prompt
            .as_deref()
            .unwrap_or(prompts::DEFAULT_SYSTEM_PROMPT);
        let messages = vec![ChatMessage::system(system), ChatMessage::user(prompt)];
        let options = self.options();

        let response = with_retries(self.config.max_retries, self.config.retry_backoff_ms, || {
            let messages = &messages;
            let options = &options;
            async move {
                self.provider
                    .chat(messages, Some(options))
                    .await
                    .map_err(|e| e.to_string())
            }
        })
        .await
        .map_err(|detail| ResumeError::ExternalServiceError {
            service: "AI agent",
            detail,
        })?;

        debug!(
            "Agent call: {} prompt tokens, {} completion tokens",
            response.prompt_tokens, response.completion_tokens
        );
        Ok(response.content)
    }
}

/// Run `call` up to `max_retries + 1` times with exponential backoff.
async fn with_retries<T, F, Fut>(max_retries: u32, backoff_ms: u64, mut call: F) -> Result<T, String>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let mut last_err: Option<String> = None;
    for attempt in 0..=max_retries {
        if attempt > 0 {
            let backoff = backoff_ms * 2u64.pow(attempt - 1);
            warn!("Agent call: retry {}/{} after {}ms", attempt, max_retries, backoff);
            sleep(Duration::from_millis(backoff)).await;
        }
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!("Agent call: attempt {} failed: {}", attempt + 1, e);
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| "Unknown error".to_string()))
}

// ── Service ──────────────────────────────────────────────────────────────

/// The agent's three request shapes over one backend.
pub struct AgentService {
    backend: Arc<dyn AgentBackend>,
}

impl AgentService {
    /// Service over an [`LlmBackend`] built from `config`.
    pub fn new(config: AgentConfig) -> Result<Self, ResumeError> {
        Ok(Self::with_backend(Arc::new(LlmBackend::new(config)?)))
    }

    pub fn with_backend(backend: Arc<dyn AgentBackend>) -> Self {
        Self { backend }
    }

    async fn run(&self, prompt: String) -> Result<String, ResumeError> {
        let text = self.backend.complete(&prompt).await?;
        Ok(strip_code_fence(&text).to_string())
    }

    /// Translated resume text in the same format.
    pub async fn translate_resume(
        &self,
        resume_text: &str,
        format: SourceFormat,
        target_language: &str,
        source_language: Option<&str>,
    ) -> Result<String, ResumeError> {
        self.run(prompts::translate_prompt(
            resume_text,
            format.as_str(),
            target_language,
            source_language,
        ))
        .await
    }

    /// Short markdown feedback list.
    pub async fn proofread_resume(
        &self,
        resume_text: &str,
        format: SourceFormat,
    ) -> Result<String, ResumeError> {
        self.run(prompts::proofread_prompt(resume_text, format.as_str()))
            .await
    }

    /// Raw model answer to the accessibility prompt (expected to be JSON).
    pub async fn assess_pdf_accessibility(
        &self,
        pdf_b64: &str,
        file_name: &str,
    ) -> Result<String, ResumeError> {
        self.run(prompts::accessibility_prompt(pdf_b64, file_name))
            .await
    }
}

/// Remove one surrounding Markdown code fence, if present.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let Some(newline) = trimmed.find('\n') else {
        return trimmed;
    };
    let body = &trimmed[newline + 1..];
    body.strip_suffix("```").unwrap_or(body).trim()
}

// ── File workflows ───────────────────────────────────────────────────────

/// Resume format for AI tasks: `.json`, `.yaml` or `.yml` only.
pub fn detect_resume_format(path: &Path) -> Result<SourceFormat, ResumeError> {
    SourceFormat::from_path(path).ok_or_else(|| {
        ResumeError::InvalidConfig(format!(
            "Unsupported resume format for AI tasks: '{}'",
            path.display()
        ))
    })
}

fn read_text(path: &Path) -> Result<String, ResumeError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ResumeError::NotFound {
            what: "Input file",
            path: path.to_path_buf(),
        },
        _ => ResumeError::Internal(format!("Failed to read '{}': {e}", path.display())),
    })
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Translate a resume file into `output_dir`.
///
/// Writes `<stem>_translated_<language><ext>` (language lower-cased, spaces
/// as `_`), adding `_1`, `_2`, … rather than overwriting.
pub async fn translate_resume_file(
    service: &AgentService,
    path: &Path,
    target_language: &str,
    source_language: Option<&str>,
    output_dir: &Path,
) -> Result<PathBuf, ResumeError> {
    let format = detect_resume_format(path)?;
    let text = read_text(path)?;
    let translated = service
        .translate_resume(&text, format, target_language, source_language)
        .await?;

    let language = target_language.to_lowercase().replace(' ', "_");
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let base = output_dir.join(format!("{}_translated_{language}{ext}", file_stem(path)));
    let destination = writer::unique_path(&base);
    let written = writer::write_output(&destination, translated.as_bytes(), &OutputPolicy::default())?;
    info!("Translated {} → {}", path.display(), written.display());
    Ok(written)
}

#[derive(Serialize)]
struct ProofreadRecord<'a> {
    source_file: String,
    format: &'a str,
    feedback: &'a str,
}

/// Proofread a resume file; returns the feedback and the YAML record written
/// to `output_dir` as `<stem>_proofread.yaml` (never overwriting).
pub async fn proofread_resume_file(
    service: &AgentService,
    path: &Path,
    output_dir: &Path,
) -> Result<(String, PathBuf), ResumeError> {
    let format = detect_resume_format(path)?;
    let text = read_text(path)?;
    let feedback = service.proofread_resume(&text, format).await?;

    let record = ProofreadRecord {
        source_file: path.display().to_string(),
        format: format.as_str(),
        feedback: &feedback,
    };
    let yaml = serde_yaml::to_string(&record)
        .map_err(|e| ResumeError::Internal(format!("proofread record: {e}")))?;

    let base = output_dir.join(format!("{}_proofread.yaml", file_stem(path)));
    let destination = writer::unique_path(&base);
    let written = writer::write_output(&destination, yaml.as_bytes(), &OutputPolicy::default())?;
    Ok((feedback, written))
}

/// Structured answer of the accessibility check.
///
/// When the model does not answer with a JSON object, every field is empty
/// and `raw` holds the answer verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityReport {
    pub score: Option<f64>,
    pub verdict: String,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl AccessibilityReport {
    /// Interpret a model answer. Never fails.
    pub fn from_response(response: &str) -> Self {
        match serde_json::from_str::<Value>(response) {
            Ok(Value::Object(map)) => Self {
                score: map.get("score").and_then(Value::as_f64),
                verdict: map
                    .get("verdict")
                    .map(value_text)
                    .unwrap_or_default(),
                issues: string_list(map.get("issues")),
                suggestions: string_list(map.get("suggestions")),
                raw: None,
            },
            _ => {
                debug!("Accessibility response is not a JSON object; keeping raw text");
                Self {
                    raw: Some(response.to_string()),
                    ..Self::default()
                }
            }
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().map(value_text).collect(),
        Some(Value::Null) | None => Vec::new(),
        Some(other) => vec![value_text(other)],
    }
}

/// Ask the model how machine-readable a PDF is.
pub async fn assess_pdf_file(
    service: &AgentService,
    path: &Path,
) -> Result<AccessibilityReport, ResumeError> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(ResumeError::InvalidConfig(format!(
            "PDF access check expects a .pdf file: '{}'",
            path.display()
        )));
    }
    let bytes = std::fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => ResumeError::NotFound {
            what: "PDF file",
            path: path.to_path_buf(),
        },
        _ => ResumeError::Internal(format!("Failed to read '{}': {e}", path.display())),
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let response = service
        .assess_pdf_accessibility(&STANDARD.encode(&bytes), &name)
        .await?;
    Ok(AccessibilityReport::from_response(&response))
}
