//! Flowing layout: measures blocks and places them onto fixed-size pages.
//!
//! # Placement rules
//! - A block is placed whole. If it does not fit in the remaining height, a new
//!   page starts.
//! - Section and entry headers keep with the first body block after them. An
//!   entry with no body is just its header line and may end a page.
//! - A block taller than an empty page starts on a fresh page and then flows
//!   line by line across as many pages as it needs.
//! - Space before a block and spacers are dropped at the top of a page.
//!
//! Pure and deterministic: the same blocks and config always produce the same
//! layout, down to the last coordinate.

use serde::Serialize;
use tracing::warn;

use crate::layout::blocks::{Block, BlockKind};
use crate::layout::font_metrics::{width_pt, wrap_lines, FontFamily};
use crate::layout::page_config::{PageConfig, TextStyle};

/// Marker drawn in front of the first line of each bullet.
pub const BULLET_MARKER: &str = "•";

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// One line of text at its final position. Coordinates are PDF user space:
/// origin bottom-left, `y_pt` is the baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub block_index: usize,
    pub kind: BlockKind,
    pub x_pt: f32,
    pub y_pt: f32,
    pub size_pt: f32,
    pub bold: bool,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LaidOutPage {
    pub lines: Vec<PlacedLine>,
    /// Height consumed from the top of the text area, in points.
    pub used_height_pt: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub pages: Vec<LaidOutPage>,
    pub text_height_pt: f32,
}

impl Layout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Fraction of the text area used on each page (0.0..=1.0).
    pub fn fill_fractions(&self) -> Vec<f32> {
        self.pages
            .iter()
            .map(|p| (p.used_height_pt / self.text_height_pt).clamp(0.0, 1.0))
            .collect()
    }

    /// Indices of the pages holding lines of `block_index`.
    #[cfg(test)]
    pub fn pages_of_block(&self, block_index: usize) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, p)| p.lines.iter().any(|l| l.block_index == block_index))
            .map(|(i, _)| i)
            .collect()
    }
}

/// A block after wrapping, ready to place.
struct Measured<'a> {
    block: &'a Block,
    lines: Vec<String>,
    style: TextStyle,
    x_pt: f32,
}

impl Measured<'_> {
    fn body_height(&self) -> f32 {
        if self.block.kind == BlockKind::Spacer {
            return self.block.gap_pt;
        }
        self.lines.len() as f32 * self.style.leading_pt
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Measurement
// ────────────────────────────────────────────────────────────────────────────

fn style_for(kind: BlockKind, config: &PageConfig) -> TextStyle {
    match kind {
        BlockKind::Title => config.title,
        BlockKind::SectionHeader => config.heading,
        _ => config.body,
    }
}

fn measure<'a>(block: &'a Block, family: FontFamily, config: &PageConfig) -> Measured<'a> {
    let style = style_for(block.kind, config);
    let indent = if block.kind == BlockKind::Bullet {
        config.bullet_text_indent_pt
    } else {
        0.0
    };
    let lines = if block.kind == BlockKind::Spacer {
        Vec::new()
    } else {
        wrap_lines(
            &block.text,
            family.face(block.kind.is_bold()),
            style.size_pt,
            config.text_width_pt() - indent,
        )
    };
    Measured {
        block,
        lines,
        style,
        x_pt: config.margin_left_pt + indent,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

struct Cursor<'c> {
    config: &'c PageConfig,
    family: FontFamily,
    finished: Vec<LaidOutPage>,
    current: LaidOutPage,
    /// Height used on the current page.
    used: f32,
}

impl<'c> Cursor<'c> {
    fn new(config: &'c PageConfig, family: FontFamily) -> Self {
        Self {
            config,
            family,
            finished: Vec::new(),
            current: LaidOutPage::default(),
            used: 0.0,
        }
    }

    fn available(&self) -> f32 {
        self.config.text_height_pt()
    }

    fn at_page_top(&self) -> bool {
        self.used <= f32::EPSILON
    }

    fn remaining(&self) -> f32 {
        self.available() - self.used
    }

    fn new_page(&mut self) {
        self.current.used_height_pt = self.used.min(self.available());
        self.finished.push(std::mem::take(&mut self.current));
        self.used = 0.0;
    }

    fn finish(mut self) -> Vec<LaidOutPage> {
        self.current.used_height_pt = self.used.min(self.available());
        self.finished.push(self.current);
        self.finished
    }

    fn place_line(&mut self, block_index: usize, measured: &Measured<'_>, line_index: usize) {
        let style = measured.style;
        let text = &measured.lines[line_index];
        let kind = measured.block.kind;
        let bold = kind.is_bold();

        // Baseline sits at the font's ascent within the line box, padded by half the extra leading.
        let baseline_from_top =
            self.used + (style.leading_pt - style.size_pt) / 2.0 + style.size_pt * 0.86;
        let y_pt = self.config.page_height_pt - self.config.margin_top_pt - baseline_from_top;

        let x_pt = if kind == BlockKind::Title {
            let w = width_pt(self.family.face(bold), text, style.size_pt);
            self.config.margin_left_pt + ((self.config.text_width_pt() - w) / 2.0).max(0.0)
        } else {
            measured.x_pt
        };

        if kind == BlockKind::Bullet && line_index == 0 {
            self.current.lines.push(PlacedLine {
                block_index,
                kind,
                x_pt: self.config.margin_left_pt + self.config.bullet_marker_indent_pt,
                y_pt,
                size_pt: style.size_pt,
                bold: false,
                text: BULLET_MARKER.to_string(),
            });
        }
        self.current.lines.push(PlacedLine {
            block_index,
            kind,
            x_pt,
            y_pt,
            size_pt: style.size_pt,
            bold,
            text: text.clone(),
        });
        self.used += style.leading_pt;
    }
}

/// Height `measured[index]` needs on the current page, including the blocks a
/// header must share the page with.
///
/// A header reserves itself plus the first body block after it. A section
/// header directly above an entry header reserves that entry's header and first
/// body block too. The chain ends at an entry boundary: a spacer, or another
/// entry header with no body in between. Bullet-less entries therefore stay
/// independent blocks.
fn required_height(measured: &[Measured<'_>], index: usize, at_top: bool) -> f32 {
    let block = &measured[index];
    let before = if at_top { 0.0 } else { block.style.space_before_pt };
    let own = before + block.body_height();
    if !block.block.kind.keeps_with_next() {
        return own;
    }

    let mut total = own + block.style.space_after_pt;
    let mut holder = block.block.kind;
    for following in &measured[index + 1..] {
        let kind = following.block.kind;
        if kind == BlockKind::Spacer {
            break;
        }
        if kind.keeps_with_next() {
            if !(holder == BlockKind::SectionHeader && kind == BlockKind::EntryHeader) {
                break;
            }
            total += following.style.space_before_pt
                + following.body_height()
                + following.style.space_after_pt;
            holder = kind;
            continue;
        }
        // Blocks are never split, so reserving the first line means reserving all of it.
        total += following.style.space_before_pt + following.body_height();
        break;
    }
    total
}

/// Lays out `blocks` in `family` according to `config`.
pub fn paginate(blocks: &[Block], family: FontFamily, config: &PageConfig) -> Layout {
    let measured: Vec<Measured<'_>> = blocks.iter().map(|b| measure(b, family, config)).collect();
    let mut cursor = Cursor::new(config, family);
    let mut after_header = false;

    for (index, item) in measured.iter().enumerate() {
        if item.block.kind == BlockKind::Spacer {
            after_header = false;
            if cursor.at_page_top() {
                continue;
            }
            if item.block.gap_pt > cursor.remaining() {
                cursor.new_page();
            } else {
                cursor.used += item.block.gap_pt;
            }
            continue;
        }
        if item.lines.is_empty() {
            continue;
        }

        let oversized = item.body_height() > cursor.available();
        let required = required_height(&measured, index, cursor.at_page_top());
        // An oversized block directly under a header already forced the header onto a fresh page.
        let held_by_header = oversized && after_header;
        if !cursor.at_page_top() && required > cursor.remaining() && !held_by_header {
            cursor.new_page();
        }

        if !cursor.at_page_top() {
            cursor.used += item.style.space_before_pt;
        }

        if oversized {
            warn!(
                "Block {} ({:?}) is taller than a page ({} lines); flowing it across pages",
                index,
                item.block.kind,
                item.lines.len()
            );
            for line_index in 0..item.lines.len() {
                if !cursor.at_page_top() && item.style.leading_pt > cursor.remaining() {
                    cursor.new_page();
                }
                cursor.place_line(index, item, line_index);
            }
        } else {
            for line_index in 0..item.lines.len() {
                cursor.place_line(index, item, line_index);
            }
        }

        cursor.used += item.style.space_after_pt;
        after_header = item.block.kind.keeps_with_next();
    }

    Layout {
        pages: cursor.finish(),
        text_height_pt: config.text_height_pt(),
    }
}
