//! Prompt text for the AI agent actions.
//!
//! Every prompt lives here so tests can inspect it without a backend, and so
//! wording changes never touch the retry or file-handling code in
//! [`crate::agent`].

/// Default system prompt shared by all agent actions.
///
/// Used when [`crate::config::AgentConfig::system_prompt`] is `None`.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You help with resume authoring tasks. Keep responses concise and structured.";

/// Translate a resume, keeping its format.
///
/// `source_language` defaults to "the original language".
pub fn translate_prompt(
    resume_text: &str,
    format: &str,
    target_language: &str,
    source_language: Option<&str>,
) -> String {
    let from = source_language.unwrap_or("the original language");
    format!(
        "Translate the following resume from {from} into {target_language}.\n\
         Keep it valid {upper} and do not add commentary.\n\
         Return only the translated resume content.\n\n\
         Resume ({format}):\n{resume_text}",
        upper = format.to_uppercase(),
    )
}

/// Ask for short editorial feedback, not a rewrite.
pub fn proofread_prompt(resume_text: &str, format: &str) -> String {
    format!(
        "You are a resume editor. Review the following resume content and provide concise \
         actionable hints to improve clarity, grammar, and impact. Group feedback by sections \
         when possible. Return a short markdown list, do not rewrite the resume.\n\n\
         Resume ({format}):\n{resume_text}"
    )
}

/// Ask for a machine-readability score of a base64-encoded PDF, as JSON.
pub fn accessibility_prompt(pdf_b64: &str, file_name: &str) -> String {
    format!(
        "You are verifying whether a resume PDF is machine-readable for AI parsing tools.\n\
         Evaluate the provided base64 encoded PDF named {file_name}.\n\
         Score accessibility from 0-100 and list concrete issues impacting automated \
         processing. Respond with JSON containing keys: score (number), verdict (string), \
         issues (list of strings), suggestions (list of strings).\n\n\
         PDF name: {file_name}\n\
         PDF (base64): {pdf_b64}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translate_defaults_source_language() {
        let p = translate_prompt("basics: {}", "yaml", "German", None);
        assert!(p.contains("from the original language into German"));
        assert!(p.contains("valid YAML"));
        assert!(p.ends_with("Resume (yaml):\nbasics: {}"));
    }

    #[test]
    fn translate_uses_source_language() {
        let p = translate_prompt("{}", "json", "French", Some("Polish"));
        assert!(p.contains("from Polish into French"));
    }

    #[test]
    fn accessibility_prompt_names_json_keys() {
        let p = accessibility_prompt("JVBERi0=", "cv.pdf");
        for key in ["score", "verdict", "issues", "suggestions"] {
            assert!(p.contains(key), "missing {key}");
        }
        assert!(p.contains("PDF (base64): JVBERi0="));
    }
}
