use serde::{Deserialize, Serialize};

use crate::models::deserializers::null_as_default;
use crate::models::resume::Language;

/// Career input for one generation request: structured contact fields, raw
/// free-form text blocks and the target job description.
///
/// Every text field defaults to empty; nothing here is persisted by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileInput {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub location: String,
    #[serde(deserialize_with = "null_as_default")]
    pub linkedin: String,
    #[serde(deserialize_with = "null_as_default")]
    pub github: String,
    #[serde(deserialize_with = "null_as_default")]
    pub website: String,
    #[serde(deserialize_with = "null_as_default")]
    pub headline: String,
    /// Raw skills text as typed by the user (comma or line separated).
    #[serde(deserialize_with = "null_as_default")]
    pub skills: String,
    #[serde(deserialize_with = "null_as_default")]
    pub experience_text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub education_text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub free_text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub job_description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub language: Language,
}

impl ProfileInput {
    /// True when the user supplied any career material beyond contact details.
    pub fn has_career_material(&self) -> bool {
        [
            &self.headline,
            &self.skills,
            &self.experience_text,
            &self.education_text,
            &self.free_text,
        ]
        .iter()
        .any(|s| !s.trim().is_empty())
    }

    /// Every user-supplied text, used to check whether generated values are traceable.
    pub fn source_texts(&self) -> [&str; 13] {
        [
            self.name.as_str(),
            self.email.as_str(),
            self.phone.as_str(),
            self.location.as_str(),
            self.linkedin.as_str(),
            self.github.as_str(),
            self.website.as_str(),
            self.headline.as_str(),
            self.skills.as_str(),
            self.experience_text.as_str(),
            self.education_text.as_str(),
            self.free_text.as_str(),
            self.job_description.as_str(),
        ]
    }
}
