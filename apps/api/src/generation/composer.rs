//! Prompt composition: turns a `ProfileInput` into the system/user message pair.
//!
//! Pure and deterministic. Empty fields and empty sections are left out of the
//! user message entirely so the model never sees a placeholder it could echo.

use crate::generation::prompts::{
    BASIC_INFO_LABEL, EDUCATION_LABEL, EXPERIENCE_LABEL, FREE_TEXT_LABEL, JOB_DESCRIPTION_LABEL,
    LANGUAGE_LABEL, RESUME_SYSTEM, SKILLS_LABEL,
};
use crate::models::profile::ProfileInput;
use crate::models::resume::Language;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

pub fn compose_prompt(profile: &ProfileInput) -> ComposedPrompt {
    let mut sections: Vec<String> = Vec::with_capacity(7);

    sections.push(format!(
        "{LANGUAGE_LABEL}\n{}",
        language_instruction(profile.language)
    ));

    let basic_info: Vec<String> = [
        ("Name", &profile.name),
        ("Email", &profile.email),
        ("Phone", &profile.phone),
        ("Location", &profile.location),
        ("LinkedIn", &profile.linkedin),
        ("GitHub", &profile.github),
        ("Website", &profile.website),
        ("Headline", &profile.headline),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        let value = value.trim();
        (!value.is_empty()).then(|| format!("{label}: {value}"))
    })
    .collect();
    if !basic_info.is_empty() {
        sections.push(format!("{BASIC_INFO_LABEL}\n{}", basic_info.join("\n")));
    }

    for (label, text) in [
        (SKILLS_LABEL, &profile.skills),
        (EXPERIENCE_LABEL, &profile.experience_text),
        (EDUCATION_LABEL, &profile.education_text),
        (FREE_TEXT_LABEL, &profile.free_text),
        (JOB_DESCRIPTION_LABEL, &profile.job_description),
    ] {
        let text = text.trim();
        if !text.is_empty() {
            sections.push(format!("{label}\n{text}"));
        }
    }

    ComposedPrompt {
        system: RESUME_SYSTEM.to_string(),
        user: sections.join("\n\n"),
    }
}

fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::Zh => "zh: write every resume field in Simplified Chinese.",
        Language::En => "en: write every resume field in English.",
    }
}
