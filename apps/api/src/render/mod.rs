// Document rendering: lays a ResumeDocument onto pages and writes the PDF.
// Synchronous and CPU-bound; async handlers call it through spawn_blocking.

pub mod fonts;
pub mod pdf;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub use fonts::{FontChoice, FontError, FontRegistry};

use crate::layout::{build_blocks, paginate, Layout, PageConfig};
use crate::models::resume::ResumeDocument;

/// Failure while finalizing the PDF. Unlike font problems, these are fatal.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF serialization failed: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedResume {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub font_name: String,
    pub layout: Layout,
}

/// Renders `document` to PDF bytes.
///
/// The font is selected once; a missing or unknown CJK font degrades to
/// Helvetica for the whole document instead of failing.
pub fn render_resume(
    document: &ResumeDocument,
    fonts: &FontRegistry,
    config: &PageConfig,
) -> Result<RenderedResume, RenderError> {
    let font = fonts.select();
    let blocks = build_blocks(document, config);
    let layout = paginate(&blocks, font.family(), config);
    debug!(
        "Laid out {} blocks on {} page(s) with {} (fill {:.2?})",
        blocks.len(),
        layout.page_count(),
        font.name(),
        layout.fill_fractions()
    );

    let bytes = pdf::write_pdf(&layout, &font, config)?;
    Ok(RenderedResume {
        bytes,
        page_count: layout.page_count(),
        font_name: font.name().to_string(),
        layout,
    })
}

#[cfg(test)]
mod tests {
    use lopdf::Document;

    use super::*;
    use crate::layout::{default_page_config, BlockKind};
    use crate::models::resume::{Contact, ExperienceItem, Language};

    fn jane_doe() -> ResumeDocument {
        ResumeDocument {
            contact: Contact {
                name: "Jane Doe".to_string(),
                email: "jane@x.com".to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn many_bullets(count: usize) -> ResumeDocument {
        ResumeDocument {
            language: Language::Zh,
            experience: vec![ExperienceItem {
                company: "某科技公司".to_string(),
                role: "后端工程师".to_string(),
                bullets: (0..count)
                    .map(|i| format!("第{i}条：负责支付结算系统的设计与开发，保障跨地区交易对账的稳定运行"))
                    .collect(),
                ..Default::default()
            }],
            ..jane_doe()
        }
    }

    fn render(document: &ResumeDocument, fonts: &FontRegistry) -> RenderedResume {
        render_resume(document, fonts, &default_page_config()).unwrap()
    }

    #[test]
    fn test_contact_only_renders_single_page() {
        let rendered = render(&jane_doe(), &FontRegistry::default());
        assert_eq!(rendered.page_count, 1);

        let texts: Vec<&str> = rendered.layout.pages[0]
            .lines
            .iter()
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(texts, vec!["Jane Doe", "jane@x.com"]);

        let parsed = Document::load_mem(&rendered.bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), 1);
    }

    #[test]
    fn test_empty_skills_has_no_skills_header() {
        let document = ResumeDocument {
            summary: "Engineer".to_string(),
            skills: vec![],
            ..jane_doe()
        };
        let rendered = render(&document, &FontRegistry::default());
        let headers: Vec<&str> = rendered
            .layout
            .pages
            .iter()
            .flat_map(|p| &p.lines)
            .filter(|l| l.kind == BlockKind::SectionHeader)
            .map(|l| l.text.as_str())
            .collect();
        assert_eq!(headers, vec!["Summary"]);
    }

    #[test]
    fn test_long_bullet_list_paginates_without_splitting() {
        let rendered = render(&many_bullets(150), &FontRegistry::default());
        assert!(rendered.page_count >= 2);

        let parsed = Document::load_mem(&rendered.bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), rendered.page_count);

        let bullet_blocks: std::collections::BTreeSet<usize> = rendered
            .layout
            .pages
            .iter()
            .flat_map(|p| &p.lines)
            .filter(|l| l.kind == BlockKind::Bullet)
            .map(|l| l.block_index)
            .collect();
        assert_eq!(bullet_blocks.len(), 150);
        for index in bullet_blocks {
            assert_eq!(rendered.layout.pages_of_block(index).len(), 1);
        }
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let document = many_bullets(80);
        let fonts = FontRegistry::default();
        let first = render(&document, &fonts);
        let second = render(&document, &fonts);
        assert_eq!(first.layout, second.layout);
        assert_eq!(first.bytes, second.bytes);
    }

    #[test]
    fn test_unknown_font_falls_back_for_whole_document() {
        let fonts = FontRegistry::new(Some("NoSuchFont".to_string()));
        let rendered = render(&many_bullets(3), &fonts);
        assert_eq!(rendered.font_name, "Helvetica");

        let parsed = Document::load_mem(&rendered.bytes).unwrap();
        assert_eq!(parsed.get_pages().len(), rendered.page_count);
    }

    #[test]
    fn test_pdf_metadata_and_cid_font() {
        let rendered = render(&jane_doe(), &FontRegistry::default());
        assert_eq!(rendered.font_name, "STSong-Light");

        let parsed = Document::load_mem(&rendered.bytes).unwrap();
        let info_id = parsed.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = parsed.get_dictionary(info_id).unwrap();
        assert_eq!(info.get(b"Title").unwrap().as_str().unwrap(), b"Resume");
        assert_eq!(info.get(b"Author").unwrap().as_str().unwrap(), b"Resume Builder");
        assert!(info.get(b"CreationDate").is_err());

        let has_cid_font = parsed.objects.values().any(|object| {
            object
                .as_dict()
                .ok()
                .and_then(|d| d.get(b"BaseFont").ok())
                .and_then(|b| b.as_name().ok())
                == Some(b"STSong-Light-UniGB-UCS2-H".as_slice())
        });
        assert!(has_cid_font);
    }
}
