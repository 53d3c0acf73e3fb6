//! Traceability guard for parsed documents.
//!
//! The prompt forbids fabrication; this module enforces the parts of that rule
//! that can be checked mechanically. Contact details must come from the user,
//! and a section can only be non-empty if the user supplied some text it could
//! have been drawn from.

use serde::Serialize;
use tracing::warn;

use crate::models::profile::ProfileInput;
use crate::models::resume::{Contact, ResumeDocument};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroundingViolation {
    /// A contact value the model produced that appears nowhere in the input.
    UntraceableContact { field: &'static str, value: String },
    /// A section the model filled although every possible source was empty.
    UnsourcedSection { section: &'static str, items: usize },
}

/// Applies the guard and returns the corrected document with what was removed.
pub fn enforce_traceability(
    mut document: ResumeDocument,
    profile: &ProfileInput,
) -> (ResumeDocument, Vec<GroundingViolation>) {
    let mut violations = Vec::new();

    document.language = profile.language;
    ground_contact(&mut document.contact, profile, &mut violations);

    let has_any = profile.has_career_material();
    let skills_sourced = any_present(&[
        &profile.skills,
        &profile.experience_text,
        &profile.free_text,
        &profile.headline,
    ]);
    let history_sourced = any_present(&[&profile.experience_text, &profile.free_text]);
    let education_sourced = any_present(&[&profile.education_text, &profile.free_text]);

    clear_text(&mut document.headline, "headline", has_any, &mut violations);
    clear_text(&mut document.summary, "summary", has_any, &mut violations);
    clear_list(&mut document.skills, "skills", skills_sourced, &mut violations);
    clear_list(&mut document.experience, "experience", history_sourced, &mut violations);
    clear_list(&mut document.projects, "projects", history_sourced, &mut violations);
    clear_list(&mut document.education, "education", education_sourced, &mut violations);
    clear_list(&mut document.certifications, "certifications", has_any, &mut violations);
    clear_list(&mut document.additional, "additional", has_any, &mut violations);

    for violation in &violations {
        warn!("Grounding violation removed from generated resume: {:?}", violation);
    }

    (document, violations)
}

fn ground_contact(contact: &mut Contact, profile: &ProfileInput, violations: &mut Vec<GroundingViolation>) {
    let sources = profile.source_texts();
    let fields: [(&'static str, &mut String, &str); 7] = [
        ("name", &mut contact.name, profile.name.as_str()),
        ("email", &mut contact.email, profile.email.as_str()),
        ("phone", &mut contact.phone, profile.phone.as_str()),
        ("location", &mut contact.location, profile.location.as_str()),
        ("linkedin", &mut contact.linkedin, profile.linkedin.as_str()),
        ("github", &mut contact.github, profile.github.as_str()),
        ("website", &mut contact.website, profile.website.as_str()),
    ];

    for (field, generated, supplied) in fields {
        let supplied = supplied.trim();
        if !supplied.is_empty() {
            // Structured input always wins.
            if generated.as_str() != supplied {
                *generated = supplied.to_string();
            }
            continue;
        }
        if generated.is_empty() || is_traceable(field, generated, &sources) {
            continue;
        }
        violations.push(GroundingViolation::UntraceableContact {
            field,
            value: std::mem::take(generated),
        });
    }
}

/// Whether `value` occurs in any source text, ignoring case and cosmetic differences.
fn is_traceable(field: &str, value: &str, sources: &[&str]) -> bool {
    if field == "phone" {
        let digits = digits_only(value);
        return !digits.is_empty() && sources.iter().any(|s| digits_only(s).contains(&digits));
    }

    let needle = canonical(value);
    if needle.is_empty() {
        return true;
    }
    sources.iter().any(|s| canonical(s).contains(&needle))
}

fn canonical(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let stripped = lowered
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
        .trim_end_matches('/');
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn digits_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

fn any_present(texts: &[&String]) -> bool {
    texts.iter().any(|t| !t.trim().is_empty())
}

fn clear_text(
    text: &mut String,
    section: &'static str,
    sourced: bool,
    violations: &mut Vec<GroundingViolation>,
) {
    if !sourced && !text.is_empty() {
        text.clear();
        violations.push(GroundingViolation::UnsourcedSection { section, items: 1 });
    }
}

fn clear_list<T>(
    items: &mut Vec<T>,
    section: &'static str,
    sourced: bool,
    violations: &mut Vec<GroundingViolation>,
) {
    if !sourced && !items.is_empty() {
        violations.push(GroundingViolation::UnsourcedSection {
            section,
            items: items.len(),
        });
        items.clear();
    }
}
