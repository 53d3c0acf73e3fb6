use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::llm_client::StructuredOutput;
use crate::models::deserializers::{null_as_default, string_list};

// ────────────────────────────────────────────────────────────────────────────
// Language
// ────────────────────────────────────────────────────────────────────────────

/// Output language of a resume. Always serialized as `zh` or `en`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    #[serde(alias = "zh-CN", alias = "zh-cn", alias = "zh_CN", alias = "cn", alias = "ZH")]
    Zh,
    #[serde(alias = "en-US", alias = "en-us", alias = "en_US", alias = "en-GB", alias = "EN")]
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Zh => "zh",
            Language::En => "en",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Record types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Contact {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub linkedin: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub github: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub website: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExperienceItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub company: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end: String,
    #[serde(default, deserialize_with = "string_list")]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end: String,
    #[serde(default, deserialize_with = "string_list")]
    pub bullets: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EducationItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub school: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub degree: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub major: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end: String,
}

/// The canonical resume record exchanged with the generation service and the renderer.
///
/// Absent information is represented by empty strings and empty lists, never by
/// placeholder text. A document is never mutated after creation; regeneration
/// builds a new one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ResumeDocument {
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: Language,
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact: Contact,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headline: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "string_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<ExperienceItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<ProjectItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<EducationItem>,
    #[serde(default, deserialize_with = "string_list")]
    pub certifications: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub additional: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Validation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SchemaValidationError {
    #[error("response contained no JSON object")]
    NoJsonObject,

    #[error("expected a JSON object at the top level, found {0}")]
    NotAnObject(&'static str),

    #[error("response does not match the resume schema: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ResumeDocument {
    /// Parses and validates a raw JSON payload into a normalized document.
    ///
    /// Never panics. Rejects anything that is not a JSON object matching the
    /// resume shape; accepted records are trimmed and stripped of blank entries.
    pub fn from_json_str(raw: &str) -> Result<Self, SchemaValidationError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_json_value(value)
    }

    pub fn from_json_value(value: Value) -> Result<Self, SchemaValidationError> {
        let kind = match &value {
            Value::Object(_) => None,
            Value::Null => Some("null"),
            Value::Bool(_) => Some("a boolean"),
            Value::Number(_) => Some("a number"),
            Value::String(_) => Some("a string"),
            Value::Array(_) => Some("an array"),
        };
        if let Some(kind) = kind {
            return Err(SchemaValidationError::NotAnObject(kind));
        }

        let document: ResumeDocument = serde_json::from_value(value)?;
        Ok(document.normalized())
    }

    /// Returns a copy with every string trimmed and blank list entries removed.
    pub fn normalized(mut self) -> Self {
        trim_in_place(&mut self.headline);
        trim_in_place(&mut self.summary);

        let c = &mut self.contact;
        for field in [
            &mut c.name,
            &mut c.email,
            &mut c.phone,
            &mut c.location,
            &mut c.linkedin,
            &mut c.github,
            &mut c.website,
        ] {
            trim_in_place(field);
        }

        normalize_list(&mut self.skills);
        normalize_list(&mut self.certifications);
        normalize_list(&mut self.additional);

        for item in &mut self.experience {
            for field in [
                &mut item.company,
                &mut item.role,
                &mut item.location,
                &mut item.start,
                &mut item.end,
            ] {
                trim_in_place(field);
            }
            normalize_list(&mut item.bullets);
        }
        self.experience.retain(|e| {
            !(e.company.is_empty() && e.role.is_empty() && e.bullets.is_empty())
        });

        for item in &mut self.projects {
            for field in [
                &mut item.name,
                &mut item.role,
                &mut item.start,
                &mut item.end,
                &mut item.link,
            ] {
                trim_in_place(field);
            }
            normalize_list(&mut item.bullets);
        }
        self.projects
            .retain(|p| !(p.name.is_empty() && p.role.is_empty() && p.bullets.is_empty()));

        for item in &mut self.education {
            for field in [
                &mut item.school,
                &mut item.degree,
                &mut item.major,
                &mut item.start,
                &mut item.end,
            ] {
                trim_in_place(field);
            }
        }
        self.education
            .retain(|e| !(e.school.is_empty() && e.degree.is_empty() && e.major.is_empty()));

        self
    }
}

impl StructuredOutput for ResumeDocument {
    const SCHEMA_NAME: &'static str = "resume_document";

    fn json_schema() -> Value {
        schemars::schema_for!(ResumeDocument).to_value()
    }

    fn from_json_str(raw: &str) -> Result<Self, SchemaValidationError> {
        ResumeDocument::from_json_str(raw)
    }
}

fn trim_in_place(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_string();
    }
}

fn normalize_list(items: &mut Vec<String>) {
    for item in items.iter_mut() {
        trim_in_place(item);
    }
    items.retain(|s| !s.is_empty());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_document() -> ResumeDocument {
        ResumeDocument {
            language: Language::En,
            contact: Contact {
                name: "Jane Doe".to_string(),
                email: "jane@x.com".to_string(),
                phone: "555-0100".to_string(),
                location: "Berlin".to_string(),
                linkedin: "linkedin.com/in/jane".to_string(),
                github: "github.com/jane".to_string(),
                website: String::new(),
            },
            headline: "Backend engineer".to_string(),
            summary: "Builds payment systems.".to_string(),
            skills: vec!["Rust".to_string(), "PostgreSQL".to_string()],
            experience: vec![ExperienceItem {
                company: "Acme".to_string(),
                role: "Engineer".to_string(),
                location: "Remote".to_string(),
                start: "2020".to_string(),
                end: "2023".to_string(),
                bullets: vec!["Cut settlement time from 3 days to 1".to_string()],
            }],
            projects: vec![ProjectItem {
                name: "ledger".to_string(),
                role: "Author".to_string(),
                start: "2022".to_string(),
                end: String::new(),
                bullets: vec!["Double-entry ledger in Rust".to_string()],
                link: "github.com/jane/ledger".to_string(),
            }],
            education: vec![EducationItem {
                school: "TU Berlin".to_string(),
                degree: "BSc".to_string(),
                major: "Computer Science".to_string(),
                start: "2014".to_string(),
                end: "2018".to_string(),
            }],
            certifications: vec!["CKA".to_string()],
            additional: vec!["German (native)".to_string()],
        }
    }

    #[test]
    fn test_document_round_trip_is_field_for_field() {
        let document = sample_document();
        let json = serde_json::to_string(&document).unwrap();
        let recovered = ResumeDocument::from_json_str(&json).unwrap();
        assert_eq!(recovered, document);
    }

    #[test]
    fn test_serialized_shape_uses_canonical_field_names() {
        let value = serde_json::to_value(sample_document()).unwrap();
        assert_eq!(value["language"], "en");
        assert_eq!(value["contact"]["name"], "Jane Doe");
        assert!(value["experience"][0]["bullets"].is_array());
        assert_eq!(value["projects"][0]["link"], "github.com/jane/ledger");
        assert_eq!(value["education"][0]["major"], "Computer Science");
    }

    #[test]
    fn test_empty_object_yields_empty_lists() {
        let document = ResumeDocument::from_json_str("{}").unwrap();
        assert_eq!(document.language, Language::Zh);
        assert!(document.skills.is_empty());
        assert!(document.experience.is_empty());
        assert!(document.projects.is_empty());
        assert!(document.education.is_empty());
        assert!(document.certifications.is_empty());
        assert!(document.additional.is_empty());
        assert_eq!(document.summary, "");
    }

    #[test]
    fn test_null_lists_become_empty() {
        let raw = r#"{"skills": null, "experience": null, "contact": null, "summary": null}"#;
        let document = ResumeDocument::from_json_str(raw).unwrap();
        assert!(document.skills.is_empty());
        assert!(document.experience.is_empty());
        assert_eq!(document.contact, Contact::default());
    }

    #[test]
    fn test_language_aliases() {
        let document = ResumeDocument::from_json_str(r#"{"language": "zh-CN"}"#).unwrap();
        assert_eq!(document.language, Language::Zh);
        let document = ResumeDocument::from_json_str(r#"{"language": "en-US"}"#).unwrap();
        assert_eq!(document.language, Language::En);
    }

    #[test]
    fn test_unknown_language_is_rejected() {
        let result = ResumeDocument::from_json_str(r#"{"language": "fr"}"#);
        assert!(matches!(result, Err(SchemaValidationError::Malformed(_))));
    }

    #[test]
    fn test_non_object_is_rejected() {
        let result = ResumeDocument::from_json_str("[1, 2]");
        assert!(matches!(
            result,
            Err(SchemaValidationError::NotAnObject("an array"))
        ));
    }

    #[test]
    fn test_wrong_field_type_is_rejected() {
        let result = ResumeDocument::from_json_str(r#"{"skills": "Rust, Go"}"#);
        assert!(matches!(result, Err(SchemaValidationError::Malformed(_))));
    }

    #[test]
    fn test_normalization_trims_and_drops_blank_entries() {
        let raw = r#"{
            "summary": "  Hello  ",
            "skills": ["Rust", "  ", ""],
            "experience": [
                {"company": "", "role": "", "bullets": ["  "]},
                {"company": " Acme ", "bullets": ["Shipped ", ""]}
            ],
            "education": [{"school": " ", "degree": ""}]
        }"#;
        let document = ResumeDocument::from_json_str(raw).unwrap();
        assert_eq!(document.summary, "Hello");
        assert_eq!(document.skills, vec!["Rust"]);
        assert_eq!(document.experience.len(), 1);
        assert_eq!(document.experience[0].company, "Acme");
        assert_eq!(document.experience[0].bullets, vec!["Shipped"]);
        assert!(document.education.is_empty());
    }

    #[test]
    fn test_json_schema_describes_contact_and_lists() {
        let schema = <ResumeDocument as StructuredOutput>::json_schema();
        let text = schema.to_string();
        assert!(text.contains("contact"));
        assert!(text.contains("experience"));
        assert!(text.contains("certifications"));
    }
}
