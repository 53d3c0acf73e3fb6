//! Static font-metric tables for the faces the renderer can emit.
//!
//! Character widths are in em units (relative to font size). Helvetica and
//! Helvetica-Bold widths come from the standard Adobe AFM files and cover every
//! byte WinAnsiEncoding defines. The CID faces are measured with a
//! two-width model that matches the `/W` array written into the PDF: half-width
//! for ASCII, full-width for everything else.
//!
//! Measurement and wrapping must agree with what the PDF viewer draws, so every
//! width here has a counterpart in `render::pdf`.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthChar;

// ────────────────────────────────────────────────────────────────────────────
// Font faces
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    Helvetica,
    HelveticaBold,
    /// Any registered CID font. Bold is synthesized at draw time, so it shares metrics.
    Cid,
}

/// The family a whole document is set in. Chosen once per render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    Helvetica,
    Cid,
}

impl FontFamily {
    pub fn face(&self, bold: bool) -> FontFace {
        match (self, bold) {
            (FontFamily::Helvetica, false) => FontFace::Helvetica,
            (FontFamily::Helvetica, true) => FontFace::HelveticaBold,
            (FontFamily::Cid, _) => FontFace::Cid,
        }
    }
}

/// Advance of ASCII glyphs in a CID face, in em.
pub const CID_HALF_WIDTH: f32 = 0.5;
/// Advance of every non-ASCII glyph in a CID face, in em.
pub const CID_FULL_WIDTH: f32 = 1.0;

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Width-array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
/// `upper` holds WinAnsi 0x80..=0xFF, index = byte - 0x80. Slots the encoding
/// leaves undefined carry the `?` width, since `?` is what gets drawn.
pub struct FontMetricTable {
    widths: [f32; 95],
    upper: [f32; 128],
    /// Width of `?`, drawn for characters WinAnsi cannot encode.
    pub replacement_width: f32,
}

impl FontMetricTable {
    /// Width of one character in em units, as drawn through WinAnsiEncoding.
    pub fn char_width(&self, c: char) -> f32 {
        match win_ansi_code(c) {
            Some(byte @ 0x20..=0x7E) => self.widths[usize::from(byte) - 0x20],
            Some(byte @ 0x80..=0xFF) => self.upper[usize::from(byte) - 0x80],
            _ => self.replacement_width,
        }
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }
}

/// WinAnsiEncoding byte for `c`, if the encoding has it.
pub fn win_ansi_code(c: char) -> Option<u8> {
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) || (0xA0..=0xFF).contains(&code) {
        return Some(code as u8);
    }
    let byte = match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Width of one character in em units for any face.
pub fn char_width(face: FontFace, c: char) -> f32 {
    match face {
        FontFace::Helvetica => HELVETICA_TABLE.char_width(c),
        FontFace::HelveticaBold => HELVETICA_BOLD_TABLE.char_width(c),
        FontFace::Cid => {
            if c.is_ascii() {
                CID_HALF_WIDTH
            } else {
                CID_FULL_WIDTH
            }
        }
    }
}

/// Width of `s` in points at `size_pt`.
pub fn width_pt(face: FontFace, s: &str, size_pt: f32) -> f32 {
    let em = match get_metrics(face) {
        Some(table) => table.measure_str(s),
        None => s.chars().map(|c| char_width(face, c)).sum(),
    };
    em * size_pt
}

/// AFM table for a WinAnsi face; CID faces use the two-width model instead.
pub fn get_metrics(face: FontFace) -> Option<&'static FontMetricTable> {
    match face {
        FontFace::Helvetica => Some(&HELVETICA_TABLE),
        FontFace::HelveticaBold => Some(&HELVETICA_BOLD_TABLE),
        FontFace::Cid => None,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Line wrapping
// ────────────────────────────────────────────────────────────────────────────

/// An unbreakable unit of text: a word, or a single wide (CJK) character.
struct Atom<'a> {
    text: &'a str,
    /// Whether a space separated this atom from the previous one in the source.
    glue: bool,
}

/// Splits one paragraph line into atoms. Wide characters may break anywhere,
/// so each becomes its own atom without glue.
fn atoms(line: &str) -> Vec<Atom<'_>> {
    let mut out = Vec::new();
    let mut word_start: Option<usize> = None;
    let mut pending_glue = false;

    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if let Some(start) = word_start.take() {
                out.push(Atom {
                    text: &line[start..i],
                    glue: pending_glue,
                });
            }
            pending_glue = true;
            continue;
        }
        if c.width() == Some(2) {
            if let Some(start) = word_start.take() {
                out.push(Atom {
                    text: &line[start..i],
                    glue: pending_glue,
                });
                pending_glue = false;
            }
            out.push(Atom {
                text: &line[i..i + c.len_utf8()],
                glue: pending_glue,
            });
            pending_glue = false;
            continue;
        }
        if word_start.is_none() {
            word_start = Some(i);
        }
    }
    if let Some(start) = word_start {
        out.push(Atom {
            text: &line[start..],
            glue: pending_glue,
        });
    }

    // Glue before the first atom of a line is never drawn.
    if let Some(first) = out.first_mut() {
        first.glue = false;
    }
    out
}

/// Greedy word wrap of `text` into lines no wider than `max_width_pt`.
///
/// Explicit newlines start a new line; blank lines are dropped. A single atom
/// wider than the line is broken between characters.
pub fn wrap_lines(text: &str, face: FontFace, size_pt: f32, max_width_pt: f32) -> Vec<String> {
    let space_w = width_pt(face, " ", size_pt);
    let mut lines = Vec::new();

    for source_line in text.split('\n') {
        let mut current = String::new();
        let mut current_w = 0.0_f32;

        for atom in atoms(source_line) {
            let atom_w = width_pt(face, atom.text, size_pt);
            let glue_w = if atom.glue && !current.is_empty() { space_w } else { 0.0 };

            if !current.is_empty() && current_w + glue_w + atom_w > max_width_pt {
                lines.push(std::mem::take(&mut current));
                current_w = 0.0;
            } else if !current.is_empty() && atom.glue {
                current.push(' ');
                current_w += space_w;
            }

            if atom_w <= max_width_pt {
                current.push_str(atom.text);
                current_w += atom_w;
                continue;
            }

            // Overlong atom: fill character by character.
            for c in atom.text.chars() {
                let c_w = char_width(face, c) * size_pt;
                if !current.is_empty() && current_w + c_w > max_width_pt {
                    lines.push(std::mem::take(&mut current));
                    current_w = 0.0;
                }
                current.push(c);
                current_w += c_w;
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable + 128 WinAnsi upper each)
// ────────────────────────────────────────────────────────────────────────────

/// Helvetica (standard 14), WinAnsi code points.
static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    #[rustfmt::skip]
    upper: [
        // €      -      ‚      ƒ      „      …      †      ‡      ˆ      ‰      Š      ‹      Œ      -      Ž      -
        0.556, 0.556, 0.222, 0.556, 0.333, 1.000, 0.556, 0.556, 0.333, 1.000, 0.667, 0.333, 1.000, 0.556, 0.611, 0.556,
        // -      ‘      ’      “      ”      •      –      —      ˜      ™      š      ›      œ      -      ž      Ÿ
        0.556, 0.222, 0.222, 0.333, 0.333, 0.350, 0.556, 1.000, 0.333, 1.000, 0.500, 0.333, 0.944, 0.556, 0.500, 0.667,
        // nbsp   ¡      ¢      £      ¤      ¥      ¦      §      ¨      ©      ª      «      ¬      shy    ®      ¯
        0.278, 0.333, 0.556, 0.556, 0.556, 0.556, 0.260, 0.556, 0.333, 0.737, 0.370, 0.556, 0.584, 0.333, 0.737, 0.333,
        // °      ±      ²      ³      ´      µ      ¶      ·      ¸      ¹      º      »      ¼      ½      ¾      ¿
        0.400, 0.584, 0.333, 0.333, 0.333, 0.556, 0.537, 0.278, 0.333, 0.333, 0.365, 0.556, 0.834, 0.834, 0.834, 0.611,
        // À      Á      Â      Ã      Ä      Å      Æ      Ç      È      É      Ê      Ë      Ì      Í      Î      Ï
        0.667, 0.667, 0.667, 0.667, 0.667, 0.667, 1.000, 0.722, 0.667, 0.667, 0.667, 0.667, 0.278, 0.278, 0.278, 0.278,
        // Ð      Ñ      Ò      Ó      Ô      Õ      Ö      ×      Ø      Ù      Ú      Û      Ü      Ý      Þ      ß
        0.722, 0.722, 0.778, 0.778, 0.778, 0.778, 0.778, 0.584, 0.778, 0.722, 0.722, 0.722, 0.722, 0.667, 0.667, 0.611,
        // à      á      â      ã      ä      å      æ      ç      è      é      ê      ë      ì      í      î      ï
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.889, 0.500, 0.556, 0.556, 0.556, 0.556, 0.278, 0.278, 0.278, 0.278,
        // ð      ñ      ò      ó      ô      õ      ö      ÷      ø      ù      ú      û      ü      ý      þ      ÿ
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.584, 0.611, 0.556, 0.556, 0.556, 0.556, 0.500, 0.556, 0.500,
    ],
    replacement_width: 0.556,
};

/// Helvetica-Bold (standard 14), WinAnsi code points.
static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    #[rustfmt::skip]
    upper: [
        // €      -      ‚      ƒ      „      …      †      ‡      ˆ      ‰      Š      ‹      Œ      -      Ž      -
        0.556, 0.611, 0.278, 0.556, 0.500, 1.000, 0.556, 0.556, 0.333, 1.000, 0.667, 0.333, 1.000, 0.611, 0.611, 0.611,
        // -      ‘      ’      “      ”      •      –      —      ˜      ™      š      ›      œ      -      ž      Ÿ
        0.611, 0.278, 0.278, 0.500, 0.500, 0.350, 0.556, 1.000, 0.333, 1.000, 0.556, 0.333, 0.944, 0.611, 0.500, 0.667,
        // nbsp   ¡      ¢      £      ¤      ¥      ¦      §      ¨      ©      ª      «      ¬      shy    ®      ¯
        0.278, 0.333, 0.556, 0.556, 0.556, 0.556, 0.280, 0.556, 0.333, 0.737, 0.370, 0.556, 0.584, 0.333, 0.737, 0.333,
        // °      ±      ²      ³      ´      µ      ¶      ·      ¸      ¹      º      »      ¼      ½      ¾      ¿
        0.400, 0.584, 0.333, 0.333, 0.333, 0.611, 0.556, 0.278, 0.333, 0.333, 0.365, 0.556, 0.834, 0.834, 0.834, 0.611,
        // À      Á      Â      Ã      Ä      Å      Æ      Ç      È      É      Ê      Ë      Ì      Í      Î      Ï
        0.722, 0.722, 0.722, 0.722, 0.722, 0.722, 1.000, 0.722, 0.667, 0.667, 0.667, 0.667, 0.278, 0.278, 0.278, 0.278,
        // Ð      Ñ      Ò      Ó      Ô      Õ      Ö      ×      Ø      Ù      Ú      Û      Ü      Ý      Þ      ß
        0.722, 0.722, 0.778, 0.778, 0.778, 0.778, 0.778, 0.584, 0.778, 0.722, 0.722, 0.722, 0.722, 0.667, 0.667, 0.611,
        // à      á      â      ã      ä      å      æ      ç      è      é      ê      ë      ì      í      î      ï
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.889, 0.556, 0.556, 0.556, 0.556, 0.556, 0.278, 0.278, 0.278, 0.278,
        // ð      ñ      ò      ó      ô      õ      ö      ÷      ø      ù      ú      û      ü      ý      þ      ÿ
        0.611, 0.611, 0.611, 0.611, 0.611, 0.611, 0.611, 0.584, 0.611, 0.611, 0.611, 0.611, 0.611, 0.556, 0.611, 0.556,
    ],
    replacement_width: 0.611,
};
