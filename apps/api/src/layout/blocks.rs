//! Turns a `ResumeDocument` into the ordered block list the flow engine places.
//!
//! Section order is fixed. A section whose content is empty produces no blocks
//! at all, header included.

use serde::Serialize;

use crate::layout::page_config::PageConfig;
use crate::models::resume::{Contact, Language, ResumeDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Title,
    ContactLine,
    Headline,
    SectionHeader,
    EntryHeader,
    EntryMeta,
    Paragraph,
    Bullet,
    Spacer,
}

impl BlockKind {
    /// Headers travel with the first body block after them, so they never end a
    /// page while that body is on the next one.
    pub fn keeps_with_next(&self) -> bool {
        matches!(self, BlockKind::SectionHeader | BlockKind::EntryHeader)
    }

    pub fn is_bold(&self) -> bool {
        matches!(
            self,
            BlockKind::Title | BlockKind::SectionHeader | BlockKind::EntryHeader
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub kind: BlockKind,
    pub text: String,
    /// Vertical space of a `Spacer`; zero for text blocks.
    pub gap_pt: f32,
}

impl Block {
    fn text(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            gap_pt: 0.0,
        }
    }

    fn spacer(gap_pt: f32) -> Self {
        Self {
            kind: BlockKind::Spacer,
            text: String::new(),
            gap_pt,
        }
    }
}

// Section headers are identical in both output languages.
pub const SUMMARY_HEADER: &str = "Summary";
pub const SKILLS_HEADER: &str = "Skills";
pub const EXPERIENCE_HEADER: &str = "Experience";
pub const PROJECTS_HEADER: &str = "Projects";
pub const EDUCATION_HEADER: &str = "Education";
pub const CERTIFICATIONS_HEADER: &str = "Certifications";
pub const ADDITIONAL_HEADER: &str = "Additional";

const UNTITLED_RESUME: &str = "Resume";
const UNTITLED_PROJECT: &str = "Project";

pub fn skills_separator(language: Language) -> &'static str {
    match language {
        Language::Zh => "、",
        Language::En => ", ",
    }
}

pub fn build_blocks(document: &ResumeDocument, config: &PageConfig) -> Vec<Block> {
    let mut blocks = Vec::new();

    let name = document.contact.name.trim();
    blocks.push(Block::text(
        BlockKind::Title,
        if name.is_empty() { UNTITLED_RESUME } else { name },
    ));
    if let Some(line) = contact_line(&document.contact) {
        blocks.push(Block::text(BlockKind::ContactLine, line));
    }
    if !document.headline.trim().is_empty() {
        blocks.push(Block::text(BlockKind::Headline, document.headline.trim()));
    }
    blocks.push(Block::spacer(config.header_gap_pt));

    if !document.summary.trim().is_empty() {
        blocks.push(Block::text(BlockKind::SectionHeader, SUMMARY_HEADER));
        blocks.push(Block::text(BlockKind::Paragraph, document.summary.trim()));
    }

    let skills = non_blank(&document.skills);
    if !skills.is_empty() {
        blocks.push(Block::text(BlockKind::SectionHeader, SKILLS_HEADER));
        blocks.push(Block::text(
            BlockKind::Paragraph,
            skills.join(skills_separator(document.language)),
        ));
    }

    if !document.experience.is_empty() {
        blocks.push(Block::text(BlockKind::SectionHeader, EXPERIENCE_HEADER));
        for item in &document.experience {
            let header = join_present(&[&item.company, &item.role], " — ");
            let dates = join_present(&[&item.start, &item.end], " - ");
            let meta = join_present(&[&item.location, &dates], " | ");

            if !header.is_empty() {
                blocks.push(Block::text(BlockKind::EntryHeader, header));
            }
            if !meta.is_empty() {
                blocks.push(Block::text(BlockKind::EntryMeta, meta));
            }
            push_bullets(&mut blocks, &item.bullets);
            blocks.push(Block::spacer(config.entry_gap_pt));
        }
    }

    if !document.projects.is_empty() {
        blocks.push(Block::text(BlockKind::SectionHeader, PROJECTS_HEADER));
        for item in &document.projects {
            let name = item.name.trim();
            let dates = join_present(&[&item.start, &item.end], " - ");
            let meta = join_present(&[&item.role, &dates, &item.link], " | ");

            blocks.push(Block::text(
                BlockKind::EntryHeader,
                if name.is_empty() { UNTITLED_PROJECT } else { name },
            ));
            if !meta.is_empty() {
                blocks.push(Block::text(BlockKind::EntryMeta, meta));
            }
            push_bullets(&mut blocks, &item.bullets);
            blocks.push(Block::spacer(config.entry_gap_pt));
        }
    }

    if !document.education.is_empty() {
        blocks.push(Block::text(BlockKind::SectionHeader, EDUCATION_HEADER));
        for item in &document.education {
            let header = join_present(&[&item.school, &item.degree, &item.major], " — ");
            let dates = join_present(&[&item.start, &item.end], " - ");

            if !header.is_empty() {
                blocks.push(Block::text(BlockKind::EntryHeader, header));
            }
            if !dates.is_empty() {
                blocks.push(Block::text(BlockKind::EntryMeta, dates));
            }
            blocks.push(Block::spacer(config.education_gap_pt));
        }
    }

    for (header, items) in [
        (CERTIFICATIONS_HEADER, &document.certifications),
        (ADDITIONAL_HEADER, &document.additional),
    ] {
        if non_blank(items).is_empty() {
            continue;
        }
        blocks.push(Block::text(BlockKind::SectionHeader, header));
        push_bullets(&mut blocks, items);
    }

    blocks
}

/// Email, phone, location and profile links joined with ` | `.
fn contact_line(contact: &Contact) -> Option<String> {
    let line = join_present(
        &[
            &contact.email,
            &contact.phone,
            &contact.location,
            &contact.linkedin,
            &contact.github,
            &contact.website,
        ],
        " | ",
    );
    (!line.is_empty()).then_some(line)
}

fn push_bullets(blocks: &mut Vec<Block>, bullets: &[String]) {
    for bullet in non_blank(bullets) {
        blocks.push(Block::text(BlockKind::Bullet, bullet));
    }
}

fn non_blank(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn join_present(parts: &[&String], separator: &str) -> String {
    parts
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}
