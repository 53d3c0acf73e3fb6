use serde::{Deserialize, Serialize};

/// Points per millimetre.
pub const MM: f32 = 72.0 / 25.4;

/// A4 in points.
pub const A4_WIDTH_PT: f32 = 595.2756;
pub const A4_HEIGHT_PT: f32 = 841.8898;

/// Size and vertical rhythm of one kind of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size_pt: f32,
    pub leading_pt: f32,
    pub space_before_pt: f32,
    pub space_after_pt: f32,
}

impl TextStyle {
    pub const fn new(size_pt: f32, leading_pt: f32) -> Self {
        Self {
            size_pt,
            leading_pt,
            space_before_pt: 0.0,
            space_after_pt: 0.0,
        }
    }
}

/// Geometry and typography for a rendered resume page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_left_pt: f32,
    pub margin_right_pt: f32,
    pub margin_top_pt: f32,
    pub margin_bottom_pt: f32,
    /// Name at the top of the first page, centered.
    pub title: TextStyle,
    pub body: TextStyle,
    /// Section headers ("Experience", "Skills", ...).
    pub heading: TextStyle,
    /// Offset of the bullet marker from the left margin.
    pub bullet_marker_indent_pt: f32,
    /// Offset of bullet text (and its continuation lines) from the left margin.
    pub bullet_text_indent_pt: f32,
    /// Gap after the contact header block.
    pub header_gap_pt: f32,
    /// Gap after each experience or project entry.
    pub entry_gap_pt: f32,
    /// Gap after each education entry.
    pub education_gap_pt: f32,
}

impl PageConfig {
    pub fn text_width_pt(&self) -> f32 {
        self.page_width_pt - self.margin_left_pt - self.margin_right_pt
    }

    pub fn text_height_pt(&self) -> f32 {
        self.page_height_pt - self.margin_top_pt - self.margin_bottom_pt
    }
}

/// A4 with 18 mm side margins and 16 mm top/bottom margins; 10.5/14 pt body text.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        page_width_pt: A4_WIDTH_PT,
        page_height_pt: A4_HEIGHT_PT,
        margin_left_pt: 18.0 * MM,
        margin_right_pt: 18.0 * MM,
        margin_top_pt: 16.0 * MM,
        margin_bottom_pt: 16.0 * MM,
        title: TextStyle::new(18.0, 22.0),
        body: TextStyle::new(10.5, 14.0),
        heading: TextStyle {
            space_before_pt: 8.0,
            space_after_pt: 4.0,
            ..TextStyle::new(12.5, 16.0)
        },
        bullet_marker_indent_pt: 8.0,
        bullet_text_indent_pt: 20.0,
        header_gap_pt: 8.0,
        entry_gap_pt: 4.0,
        education_gap_pt: 3.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_a4_with_expected_text_box() {
        let config = default_page_config();
        // 210 mm - 36 mm = 174 mm; 297 mm - 32 mm = 265 mm.
        assert!((config.text_width_pt() - 174.0 * MM).abs() < 0.01);
        assert!((config.text_height_pt() - 265.0 * MM).abs() < 0.01);
        assert_eq!(config.heading.space_before_pt, 8.0);
        assert_eq!(config.body.leading_pt, 14.0);
    }
}
