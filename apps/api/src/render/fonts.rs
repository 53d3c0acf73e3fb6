//! Font selection and text encoding for PDF output.
//!
//! Only fonts every conforming PDF viewer can supply are used: the predefined
//! Adobe CID fonts for CJK text and the standard-14 Helvetica faces otherwise.
//! Nothing is embedded, which keeps output small and byte-for-byte stable.

use thiserror::Error;
use tracing::{debug, warn};

use crate::layout::font_metrics::win_ansi_code;
use crate::layout::FontFamily;

pub const DEFAULT_CJK_FONT: &str = "STSong-Light";
pub const HELVETICA: &str = "Helvetica";
pub const HELVETICA_BOLD: &str = "Helvetica-Bold";

/// A predefined CID-keyed font and the data needed to reference it.
#[derive(Debug, PartialEq, Eq)]
pub struct CidFontSpec {
    pub name: &'static str,
    /// Character collection, e.g. `GB1` for simplified Chinese.
    pub ordering: &'static str,
    pub supplement: i64,
    /// Predefined CMap mapping UCS-2 code units onto the collection.
    pub cmap: &'static str,
    pub ascent: i64,
    pub descent: i64,
    pub cap_height: i64,
    pub stem_v: i64,
    pub bbox: [i64; 4],
}

pub static KNOWN_CID_FONTS: [CidFontSpec; 4] = [
    CidFontSpec {
        name: "STSong-Light",
        ordering: "GB1",
        supplement: 2,
        cmap: "UniGB-UCS2-H",
        ascent: 880,
        descent: -120,
        cap_height: 880,
        stem_v: 93,
        bbox: [-25, -254, 1000, 880],
    },
    CidFontSpec {
        name: "MSung-Light",
        ordering: "CNS1",
        supplement: 1,
        cmap: "UniCNS-UCS2-H",
        ascent: 880,
        descent: -120,
        cap_height: 880,
        stem_v: 93,
        bbox: [-160, -249, 1015, 888],
    },
    CidFontSpec {
        name: "HeiseiMin-W3",
        ordering: "Japan1",
        supplement: 2,
        cmap: "UniJIS-UCS2-H",
        ascent: 723,
        descent: -241,
        cap_height: 709,
        stem_v: 69,
        bbox: [-123, -257, 1001, 910],
    },
    CidFontSpec {
        name: "HYSMyeongJo-Medium",
        ordering: "Korea1",
        supplement: 1,
        cmap: "UniKS-UCS2-H",
        ascent: 880,
        descent: -120,
        cap_height: 880,
        stem_v: 93,
        bbox: [0, -148, 1001, 880],
    },
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FontError {
    #[error("CJK font rendering is disabled")]
    Disabled,

    #[error("unknown CID font '{0}'")]
    Unknown(String),
}

/// The font a document is rendered with, chosen once per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontChoice {
    Cid(&'static CidFontSpec),
    Helvetica,
}

impl FontChoice {
    pub fn family(&self) -> FontFamily {
        match self {
            FontChoice::Cid(_) => FontFamily::Cid,
            FontChoice::Helvetica => FontFamily::Helvetica,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FontChoice::Cid(spec) => spec.name,
            FontChoice::Helvetica => HELVETICA,
        }
    }

    /// Encodes `text` into the byte string this font's encoding expects.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            FontChoice::Cid(_) => encode_ucs2_be(text),
            FontChoice::Helvetica => encode_win_ansi(text),
        }
    }
}

/// Holds the preferred CJK font name. Constructed once at startup and shared
/// read-only across requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRegistry {
    preferred: Option<String>,
}

impl Default for FontRegistry {
    fn default() -> Self {
        Self::new(Some(DEFAULT_CJK_FONT.to_string()))
    }
}

impl FontRegistry {
    /// `None` disables CID fonts; every document is then set in Helvetica.
    pub fn new(preferred: Option<String>) -> Self {
        Self { preferred }
    }

    /// Resolves a CID font by name (case-insensitive).
    pub fn register(name: &str) -> Result<&'static CidFontSpec, FontError> {
        KNOWN_CID_FONTS
            .iter()
            .find(|spec| spec.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| FontError::Unknown(name.to_string()))
    }

    /// Picks the font for one render. Never fails: any font error falls back to Helvetica.
    pub fn select(&self) -> FontChoice {
        let resolved = match self.preferred.as_deref() {
            Some(name) => Self::register(name),
            None => Err(FontError::Disabled),
        };
        match resolved {
            Ok(spec) => FontChoice::Cid(spec),
            Err(FontError::Disabled) => {
                debug!("CJK font disabled; rendering with {}", HELVETICA);
                FontChoice::Helvetica
            }
            Err(e) => {
                warn!("Font registration failed ({}); falling back to {}", e, HELVETICA);
                FontChoice::Helvetica
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Encoders
// ────────────────────────────────────────────────────────────────────────────

/// UTF-16BE code units for a UCS-2 CMap. Characters outside the BMP become `?`.
pub fn encode_ucs2_be(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for c in text.chars() {
        let unit = u16::try_from(c as u32).unwrap_or(u16::from(b'?'));
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

/// WinAnsiEncoding bytes. Characters the encoding lacks become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text
        .chars()
        .map(|c| win_ansi_code(c).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_selects_stsong() {
        let choice = FontRegistry::default().select();
        assert_eq!(choice.name(), "STSong-Light");
        assert_eq!(choice.family(), FontFamily::Cid);
    }

    #[test]
    fn test_known_fonts_resolve_case_insensitively() {
        for name in ["stsong-light", "MSung-Light", "HeiseiMin-W3", "HYSMyeongJo-Medium"] {
            assert!(FontRegistry::register(name).is_ok(), "{name}");
        }
        assert_eq!(FontRegistry::register("STSong-Light").unwrap().cmap, "UniGB-UCS2-H");
    }

    #[test]
    fn test_unknown_font_falls_back_to_helvetica() {
        assert_eq!(
            FontRegistry::register("Comic Sans"),
            Err(FontError::Unknown("Comic Sans".to_string()))
        );
        let choice = FontRegistry::new(Some("Comic Sans".to_string())).select();
        assert_eq!(choice, FontChoice::Helvetica);
        assert_eq!(choice.family(), FontFamily::Helvetica);
    }

    #[test]
    fn test_disabled_registry_uses_helvetica() {
        assert_eq!(FontRegistry::new(None).select(), FontChoice::Helvetica);
    }

    #[test]
    fn test_ucs2_encoding() {
        assert_eq!(encode_ucs2_be("A张"), vec![0x00, 0x41, 0x5F, 0x20]);
        // Outside the BMP.
        assert_eq!(encode_ucs2_be("😀"), vec![0x00, 0x3F]);
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Café"), vec![b'C', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("a—b•"), vec![b'a', 0x97, b'b', 0x95]);
        assert_eq!(encode_win_ansi("张伟"), b"??".to_vec());
    }
}
