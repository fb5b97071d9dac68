//! Rendering: bind a [`ResumeDocument`] and its assets into the HTML template.
//!
//! The template sees these context keys:
//!
//! | key               | value                                           |
//! |-------------------|-------------------------------------------------|
//! | `resume`          | the document, field names as in the source file |
//! | `css_content`     | paper + theme stylesheet text                   |
//! | `icons`           | map of icon name → inline `<svg>` markup        |
//! | `picture_url`     | resolved picture (data URI or passthrough URI)  |
//! | `cv_footer`       | `cvFooter`, or the configured default           |
//! | `cv_footer_lines` | `cv_footer` split into lines                    |
//!
//! plus a `calc_years(start=…, end=…)` function and a `markdown` filter.
//! Nothing time-dependent is written into the markup except the durations,
//! which use the configured reference instant.

use crate::config::RenderConfig;
use crate::error::ResumeError;
use crate::model::ResumeDocument;
use crate::pipeline::assets;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use pulldown_cmark::{html, Options, Parser};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use tera::{Context, Tera, Value};
use tracing::{debug, info, warn};

/// Template name looked up in a template directory override.
pub const TEMPLATE_NAME: &str = "resume.html";

const BUILTIN_TEMPLATE: &str = include_str!("../../templates/resume.html");

/// Parse a free-form date, trying `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, then ISO
/// date-time forms. Returns `None` for anything else.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let text = value.trim();
    if text.is_empty() {
        return None;
    }
    let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0);

    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return midnight(d);
    }
    if is_digits(text, &[4..=4, 1..=2]) {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d") {
            return midnight(d);
        }
    }
    if is_digits(text, &[4..=4]) {
        if let Ok(d) = NaiveDate::parse_from_str(&format!("{text}-01-01"), "%Y-%m-%d") {
            return midnight(d);
        }
    }

    // ISO fallback
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y%m%d") {
        return midnight(d);
    }
    None
}

/// `"2024"` / `"2024-05"` / `"2024-5"` shape check: dash-separated all-digit
/// groups with the given widths.
fn is_digits(text: &str, widths: &[RangeInclusive<usize>]) -> bool {
    let parts: Vec<&str> = text.split('-').collect();
    parts.len() == widths.len()
        && parts
            .iter()
            .zip(widths)
            .all(|(p, w)| w.contains(&p.len()) && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Years between two free-form dates, rounded to the nearest half year and
/// formatted with one decimal (`"2.5"`).
///
/// A missing or unparsable `start` gives `None`. A missing or unparsable
/// `end` means `now`. Days are whole elapsed days (floored), divided by 365;
/// halves round to even.
pub fn calculate_years(
    start: Option<&str>,
    end: Option<&str>,
    now: NaiveDateTime,
) -> Option<String> {
    let start_text = start?;
    let Some(start) = parse_date(start_text) else {
        warn!("Unparsable start date '{}'; duration omitted", start_text);
        return None;
    };
    let end = match end {
        None => now,
        Some(text) => parse_date(text).unwrap_or_else(|| {
            debug!("End date '{}' not a date; counting to now", text);
            now
        }),
    };
    let days = (end - start).num_seconds().div_euclid(86_400);
    let years = days as f64 / 365.0;
    let rounded = (years * 2.0).round_ties_even() / 2.0;
    Some(format!("{rounded:.1}"))
}

/// Render markdown to HTML.
pub fn markdown_to_html(text: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(text, opts));
    out
}

/// Binds documents into the resume template.
///
/// Holds one parsed template environment; rendering borrows it immutably, so
/// a failed render leaves it usable for the next document.
pub struct Renderer {
    tera: Tera,
    config: RenderConfig,
    css: String,
}

impl Renderer {
    /// Build a renderer from the built-in template or `config.template_dir`.
    ///
    /// # Errors
    /// `RenderError` if the override directory has no readable
    /// `resume.html` or the template does not parse.
    pub fn new(config: &RenderConfig) -> Result<Self, ResumeError> {
        let mut tera = Tera::default();
        match config.template_dir {
            Some(ref dir) => {
                let path = dir.join(TEMPLATE_NAME);
                if !path.is_file() {
                    return Err(ResumeError::RenderError {
                        template: path.display().to_string(),
                        detail: "template file not found".into(),
                    });
                }
                tera.add_template_file(&path, Some(TEMPLATE_NAME))
                    .map_err(|e| ResumeError::render(path.display().to_string(), &e))?;
                debug!("Using template {}", path.display());
            }
            None => {
                tera.add_raw_template(TEMPLATE_NAME, BUILTIN_TEMPLATE)
                    .map_err(|e| ResumeError::render(TEMPLATE_NAME, &e))?;
            }
        }

        tera.set_escape_fn(escape_markup);
        tera.register_filter("markdown", markdown_filter);
        let now = config.effective_now();
        tera.register_function("calc_years", move |args: &HashMap<String, Value>| {
            let start = args.get("start").and_then(Value::as_str);
            let end = args.get("end").and_then(Value::as_str);
            Ok(calculate_years(start, end, now).map_or(Value::Null, Value::String))
        });

        Ok(Self {
            tera,
            config: config.clone(),
            css: assets::stylesheet(),
        })
    }

    /// Render a document with an already-resolved picture reference.
    pub fn render(&self, doc: &ResumeDocument, picture_url: &str) -> Result<String, ResumeError> {
        let mut ctx = Context::new();
        ctx.insert("resume", doc);
        ctx.insert("css_content", &self.css);
        ctx.insert("icons", assets::svg_icons());
        ctx.insert("picture_url", picture_url);
        let footer = self.footer_for(doc);
        ctx.insert("cv_footer", footer);
        ctx.insert("cv_footer_lines", &footer.lines().collect::<Vec<_>>());

        let html = self
            .tera
            .render(TEMPLATE_NAME, &ctx)
            .map_err(|e| ResumeError::render(TEMPLATE_NAME, &e))?;
        info!("Rendered resume for '{}' ({} bytes)", doc.basics.name, html.len());
        Ok(html)
    }

    fn footer_for<'a>(&'a self, doc: &'a ResumeDocument) -> &'a str {
        match doc.cv_footer.as_deref() {
            Some(custom) if !custom.trim().is_empty() => custom,
            _ => &self.config.default_footer,
        }
    }
}

/// HTML-escape `& < > " '` and nothing else, so URLs keep their slashes.
pub fn escape_markup(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn markdown_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    match value {
        Value::Null => Ok(Value::String(String::new())),
        Value::String(s) => Ok(Value::String(markdown_to_html(s))),
        other => Err(tera::Error::msg(format!(
            "markdown filter expects a string, got {other}"
        ))),
    }
}
