//! Loading: read a resume file into a validated [`ResumeDocument`].
//!
//! The format is chosen by extension (`.json`, `.yaml`/`.yml`). Any other
//! extension is sniffed: JSON first, then YAML. Parsing goes through a generic
//! `serde_json::Value` so both formats share one validation pass and one set
//! of error messages.

use crate::error::ResumeError;
use crate::model::ResumeDocument;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Source format of a resume file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Yaml,
}

impl SourceFormat {
    /// Format implied by the file extension, if it is a known one.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(SourceFormat::Json),
            "yaml" | "yml" => Some(SourceFormat::Yaml),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceFormat::Json => "json",
            SourceFormat::Yaml => "yaml",
        }
    }
}

/// Load and validate a resume document.
///
/// # Errors
/// - `NotFound` if `path` does not exist
/// - `ParseError` if the content is not valid JSON/YAML
/// - `ValidationError` if it does not match the schema
pub fn load_resume(path: impl AsRef<Path>) -> Result<ResumeDocument, ResumeError> {
    let path = path.as_ref();
    let data = load_resume_data(path)?;
    let doc: ResumeDocument =
        serde_json::from_value(data).map_err(|e| ResumeError::ValidationError {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
    doc.validate()
        .map_err(|detail| ResumeError::ValidationError {
            path: path.to_path_buf(),
            detail,
        })?;
    debug!("Loaded resume for '{}' from {}", doc.basics.name, path.display());
    Ok(doc)
}

/// Load the raw key/value structure without schema validation.
pub fn load_resume_data(path: impl AsRef<Path>) -> Result<Value, ResumeError> {
    let path = path.as_ref();
    let text = read_source(path)?;

    match SourceFormat::from_path(path) {
        Some(SourceFormat::Json) => parse_json(&text).map_err(|e| parse_error(path, "JSON", e)),
        Some(SourceFormat::Yaml) => parse_yaml(&text).map_err(|e| parse_error(path, "YAML", e)),
        None => {
            // Unknown extension: JSON first, then YAML.
            if let Ok(value) = parse_json(&text) {
                return Ok(value);
            }
            parse_yaml(&text).map_err(|e| parse_error(path, "JSON or YAML", e))
        }
    }
}

fn read_source(path: &Path) -> Result<String, ResumeError> {
    if !path.exists() {
        return Err(ResumeError::NotFound {
            what: "Resume file",
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::InvalidData => ResumeError::ParseError {
            path: path.to_path_buf(),
            format: "UTF-8 text",
            detail: e.to_string(),
        },
        _ => ResumeError::Internal(format!("Failed to read '{}': {e}", path.display())),
    })
}

fn parse_json(text: &str) -> Result<Value, String> {
    serde_json::from_str(text).map_err(|e| e.to_string())
}

fn parse_yaml(text: &str) -> Result<Value, String> {
    serde_yaml::from_str(text).map_err(|e| e.to_string())
}

fn parse_error(path: &Path, format: &'static str, detail: String) -> ResumeError {
    ResumeError::ParseError {
        path: path.to_path_buf(),
        format,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let p = dir.path().join(name);
        fs::write(&p, body).unwrap();
        p
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(SourceFormat::from_path(Path::new("a.JSON")), Some(SourceFormat::Json));
        assert_eq!(SourceFormat::from_path(Path::new("a.yml")), Some(SourceFormat::Yaml));
        assert_eq!(SourceFormat::from_path(Path::new("a.yaml")), Some(SourceFormat::Yaml));
        assert_eq!(SourceFormat::from_path(Path::new("a.txt")), None);
        assert_eq!(SourceFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn loads_json() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "cv.json", r#"{"basics": {"name": "Ada Lovelace"}}"#);
        assert_eq!(load_resume(&p).unwrap().basics.name, "Ada Lovelace");
    }

    #[test]
    fn loads_yaml() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "cv.yml", "basics:\n  name: Zoë Müller\nwork: []\n");
        assert_eq!(load_resume(&p).unwrap().basics.name, "Zoë Müller");
    }

    #[test]
    fn unknown_extension_sniffs_json_then_yaml() {
        let dir = TempDir::new().unwrap();
        let json = write(&dir, "cv.txt", r#"{"basics": {"name": "J"}}"#);
        let yaml = write(&dir, "cv.data", "basics:\n  name: Y\n");
        assert_eq!(load_resume(&json).unwrap().basics.name, "J");
        assert_eq!(load_resume(&yaml).unwrap().basics.name, "Y");
    }

    #[test]
    fn unknown_extension_garbage_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "cv.txt", "basics: [unclosed\n  - : :");
        let err = load_resume(&p).unwrap_err();
        assert!(matches!(err, ResumeError::ParseError { .. }), "got: {err:?}");
        assert!(err.to_string().contains("cv.txt"));
    }

    #[test]
    fn json_extension_does_not_fall_back_to_yaml() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "cv.json", "basics:\n  name: Y\n");
        assert!(matches!(
            load_resume(&p).unwrap_err(),
            ResumeError::ParseError { format: "JSON", .. }
        ));
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_resume("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ResumeError::NotFound { .. }));
    }

    #[test]
    fn missing_name_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "cv.yaml", "basics:\n  label: Engineer\n");
        let err = load_resume(&p).unwrap_err();
        assert!(matches!(err, ResumeError::ValidationError { .. }), "got: {err:?}");
    }

    #[test]
    fn empty_name_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let p = write(&dir, "cv.json", r#"{"basics": {"name": ""}}"#);
        assert!(matches!(
            load_resume(&p).unwrap_err(),
            ResumeError::ValidationError { .. }
        ));
    }

    #[test]
    fn string_rating_is_validation_error() {
        let dir = TempDir::new().unwrap();
        let p = write(
            &dir,
            "cv.yaml",
            "basics:\n  name: A\nlanguages:\n  - language: English\n    rating: fluent\n",
        );
        assert!(matches!(
            load_resume(&p).unwrap_err(),
            ResumeError::ValidationError { .. }
        ));
    }

    #[test]
    fn list_order_is_preserved() {
        let dir = TempDir::new().unwrap();
        let p = write(
            &dir,
            "cv.yaml",
            "basics:\n  name: A\nwork:\n  - name: Third\n  - name: First\n  - name: Second\n",
        );
        let names: Vec<_> = load_resume(&p)
            .unwrap()
            .work
            .into_iter()
            .map(|w| w.name.unwrap())
            .collect();
        assert_eq!(names, ["Third", "First", "Second"]);
    }
}
