//! The resume document schema.
//!
//! Field names follow the JSON Resume convention verbatim (`startDate`,
//! `countryCode`, `cvFooter`, …) so existing documents load unchanged. The
//! structs serialise back with the same names, which is what templates see.
//!
//! Only `basics.name` is required. List fields accept an explicit `null` and
//! treat it as empty, and `awards`, `publications` and `references` carry
//! arbitrary key/value records through to the template untouched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// An opaque record from one of the schema-free sections.
pub type FreeformRecord = Map<String, Value>;

/// The validated in-memory representation of a resume source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ResumeDocument {
    pub basics: Basics,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub work: Vec<Work>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub volunteer: Vec<Volunteer>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub education: Vec<Education>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: Vec<Skill>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub languages: Vec<Language>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interests: Vec<Interest>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub awards: Vec<FreeformRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub publications: Vec<FreeformRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub references: Vec<FreeformRecord>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub portfolio: Vec<PortfolioItem>,
    #[serde(default)]
    pub cv_footer: Option<String>,
}

impl ResumeDocument {
    /// A document carrying only the required name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            basics: Basics {
                name: name.into(),
                ..Basics::default()
            },
            work: Vec::new(),
            volunteer: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            languages: Vec::new(),
            interests: Vec::new(),
            awards: Vec::new(),
            publications: Vec::new(),
            references: Vec::new(),
            portfolio: Vec::new(),
            cv_footer: None,
        }
    }

    /// Checks the constraints serde cannot express.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.basics.name.trim().is_empty() {
            return Err("basics.name must be a non-empty string".into());
        }
        for (i, skill) in self.skills.iter().enumerate() {
            if skill.name.trim().is_empty() {
                return Err(format!("skills[{i}].name must be a non-empty string"));
            }
        }
        for (i, lang) in self.languages.iter().enumerate() {
            if lang.language.trim().is_empty() {
                return Err(format!("languages[{i}].language must be a non-empty string"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Basics {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    /// Path or URI of the profile picture.
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub profiles: Vec<Profile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub highlights: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub additional: Vec<AdditionalItem>,
}

/// A titled group of technologies attached to a work entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalItem {
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tech: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub study_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub gpa: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub courses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(default)]
    pub category: Option<String>,
    pub name: String,
    #[serde(default)]
    pub rating: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Language {
    pub language: String,
    #[serde(default)]
    pub rating: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,
}

/// Portfolio entry; `description` is markdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Treats an explicit `null` list as an empty one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
