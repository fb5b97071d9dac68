//! Configuration types for rendering, writing and the AI agent.
//!
//! Each collaborator takes one explicit value: [`RenderConfig`] for the
//! renderer and asset resolver, [`OutputPolicy`] for the output writer, and
//! [`AgentConfig`] for the agent service. Nothing in the library reads process
//! environment; the CLI maps its flags and env vars onto these structs.

use crate::error::ResumeError;
use chrono::{Local, NaiveDateTime};
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Footer used when a document has no `cvFooter`.
pub const DEFAULT_CV_FOOTER: &str = "I hereby give consent for my personal data included in my application to be processed\n\
for the purposes of the recruitment process in accordance with the applicable data protection regulations.";

/// Conventional picture location, relative to the working directory.
pub const DEFAULT_PICTURE_PATH: &str = "public/profile.jpg";

/// Configuration for rendering a resume to HTML.
///
/// # Example
/// ```rust
/// use resume_generator::RenderConfig;
///
/// let config = RenderConfig::builder()
///     .template_dir("my-templates")
///     .profile_photo("me.png")
///     .build()
///     .unwrap();
/// assert!(config.template_dir.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Directory holding a `resume.html` template. `None` uses the built-in one.
    pub template_dir: Option<PathBuf>,

    /// Explicit profile picture; wins over every other candidate when readable.
    pub profile_photo: Option<PathBuf>,

    /// Conventional picture locations tried after `profile_photo`.
    ///
    /// Relative entries are joined onto `working_dir`.
    pub conventional_pictures: Vec<PathBuf>,

    /// Base for relative conventional locations and relative `basics.picture`
    /// paths. Defaults to the process working directory.
    pub working_dir: PathBuf,

    /// Footer substituted when the document has none.
    pub default_footer: String,

    /// Effective "now" for open-ended durations. `None` reads the local clock
    /// at render time.
    pub now: Option<NaiveDateTime>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            profile_photo: None,
            conventional_pictures: vec![PathBuf::from(DEFAULT_PICTURE_PATH)],
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            default_footer: DEFAULT_CV_FOOTER.to_string(),
            now: None,
        }
    }
}

impl RenderConfig {
    pub fn builder() -> RenderConfigBuilder {
        RenderConfigBuilder {
            config: Self::default(),
        }
    }

    /// The reference instant for durations.
    pub fn effective_now(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }
}

/// Builder for [`RenderConfig`].
#[derive(Debug)]
pub struct RenderConfigBuilder {
    config: RenderConfig,
}

impl RenderConfigBuilder {
    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.template_dir = Some(dir.into());
        self
    }

    pub fn profile_photo(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.profile_photo = Some(path.into());
        self
    }

    pub fn conventional_pictures(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.conventional_pictures = paths;
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.working_dir = dir.into();
        self
    }

    pub fn default_footer(mut self, footer: impl Into<String>) -> Self {
        self.config.default_footer = footer.into();
        self
    }

    pub fn now(mut self, now: NaiveDateTime) -> Self {
        self.config.now = Some(now);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<RenderConfig, ResumeError> {
        if let Some(ref dir) = self.config.template_dir {
            if dir.as_os_str().is_empty() {
                return Err(ResumeError::InvalidConfig(
                    "template_dir must not be empty".into(),
                ));
            }
        }
        if self.config.default_footer.trim().is_empty() {
            return Err(ResumeError::InvalidConfig(
                "default_footer must not be blank".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Output policy ────────────────────────────────────────────────────────

/// How the output writer treats an existing target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputPolicy {
    /// Overwrite an existing file instead of failing with `AlreadyExists`.
    pub force: bool,

    /// `YYYYMMDD_HHMMSS` token appended to the file stem before the
    /// existence check.
    pub timestamp: Option<String>,
}

impl OutputPolicy {
    pub fn new(force: bool) -> Self {
        Self {
            force,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, token: impl Into<String>) -> Self {
        self.timestamp = Some(token.into());
        self
    }

    /// The same policy without a timestamp token.
    pub fn without_timestamp(&self) -> Self {
        Self {
            force: self.force,
            timestamp: None,
        }
    }
}

// ── Agent ────────────────────────────────────────────────────────────────

/// Configuration for the AI agent collaborator.
///
/// The provider is either handed in pre-built or created from
/// `provider_name` + `model` when the service is constructed.
#[derive(Clone)]
pub struct AgentConfig {
    /// Provider name understood by `edgequake_llm::ProviderFactory`
    /// (e.g. "openai", "anthropic", "ollama"). Default: "openai".
    pub provider_name: String,

    /// Model identifier. Default: "gpt-4o-mini".
    pub model: String,

    /// Pre-constructed provider. Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// System prompt shared by every action.
    pub system_prompt: Option<String>,

    /// Sampling temperature. Default: 0.2.
    pub temperature: f32,

    /// Maximum tokens per response. Default: 4096.
    pub max_tokens: usize,

    /// Retries on a failed call. Default: 2.
    pub max_retries: u32,

    /// Initial retry delay in milliseconds, doubled per attempt. Default: 500.
    pub retry_backoff_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            provider_name: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            provider: None,
            system_prompt: None,
            temperature: 0.2,
            max_tokens: 4096,
            max_retries: 2,
            retry_backoff_ms: 500,
        }
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("provider_name", &self.provider_name)
            .field("model", &self.model)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_ms", &self.retry_backoff_ms)
            .finish()
    }
}

impl AgentConfig {
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`AgentConfig`].
#[derive(Debug)]
pub struct AgentConfigBuilder {
    config: AgentConfig,
}

impl AgentConfigBuilder {
    /// Accepts either `model` or `provider:model`.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        match model.split_once(':') {
            Some((provider, name)) if !provider.is_empty() && !name.is_empty() => {
                self.config.provider_name = provider.to_string();
                self.config.model = name.to_string();
            }
            _ => self.config.model = model,
        }
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> Self {
        self.config.retry_backoff_ms = ms;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<AgentConfig, ResumeError> {
        let c = &self.config;
        if c.provider.is_none() && c.provider_name.trim().is_empty() {
            return Err(ResumeError::InvalidConfig(
                "An agent provider name is required".into(),
            ));
        }
        if c.model.trim().is_empty() {
            return Err(ResumeError::InvalidConfig("An agent model is required".into()));
        }
        if c.max_tokens == 0 {
            return Err(ResumeError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}
