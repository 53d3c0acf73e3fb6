//! PDF emission with lopdf.
//!
//! Output is a pure function of the layout and font choice: no creation dates,
//! no document IDs, objects numbered in a fixed order. Two renders of the same
//! document are byte-identical.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::layout::{Layout, PageConfig, PlacedLine};
use crate::render::fonts::{CidFontSpec, FontChoice, HELVETICA, HELVETICA_BOLD};
use crate::render::RenderError;

const PDF_VERSION: &str = "1.5";
pub const INFO_TITLE: &str = "Resume";
pub const INFO_AUTHOR: &str = "Resume Builder";

/// Resource name of the regular face; also the only face for CID fonts.
const REGULAR_FONT_KEY: &str = "F1";
const BOLD_FONT_KEY: &str = "F2";

/// Stroke width used to embolden CID text, which has no bold face.
const SYNTHETIC_BOLD_STROKE: f32 = 0.35;

fn name(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}

fn real(value: f32) -> Object {
    Object::Real(value)
}

pub fn write_pdf(layout: &Layout, font: &FontChoice, config: &PageConfig) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version(PDF_VERSION);
    let pages_id = doc.new_object_id();

    let fonts = add_fonts(&mut doc, font);
    let resources_id = doc.add_object(Object::Dictionary({
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));
        resources
    }));

    let mut kids = Vec::with_capacity(layout.pages.len());
    for page in &layout.pages {
        let content = page_content(&page.lines, font);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

        let mut page_dict = Dictionary::new();
        page_dict.set("Type", name("Page"));
        page_dict.set("Parent", Object::Reference(pages_id));
        page_dict.set("Contents", Object::Reference(content_id));
        page_dict.set("Resources", Object::Reference(resources_id));
        kids.push(Object::Reference(doc.add_object(page_dict)));
    }

    let mut pages = Dictionary::new();
    pages.set("Type", name("Pages"));
    pages.set("Count", Object::Integer(kids.len() as i64));
    pages.set("Kids", Object::Array(kids));
    pages.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            real(config.page_width_pt),
            real(config.page_height_pt),
        ]),
    );
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", name("Catalog"));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);

    let mut info = Dictionary::new();
    info.set("Title", Object::string_literal(INFO_TITLE));
    info.set("Author", Object::string_literal(INFO_AUTHOR));
    let info_id = doc.add_object(info);

    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.trailer.set("Info", Object::Reference(info_id));
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn add_fonts(doc: &mut Document, font: &FontChoice) -> Dictionary {
    let mut fonts = Dictionary::new();
    match font {
        FontChoice::Helvetica => {
            fonts.set(REGULAR_FONT_KEY, Object::Reference(add_standard_font(doc, HELVETICA)));
            fonts.set(BOLD_FONT_KEY, Object::Reference(add_standard_font(doc, HELVETICA_BOLD)));
        }
        FontChoice::Cid(spec) => {
            fonts.set(REGULAR_FONT_KEY, Object::Reference(add_cid_font(doc, spec)));
        }
    }
    fonts
}

fn add_standard_font(doc: &mut Document, base_font: &str) -> ObjectId {
    let mut dict = Dictionary::new();
    dict.set("Type", name("Font"));
    dict.set("Subtype", name("Type1"));
    dict.set("BaseFont", name(base_font));
    dict.set("Encoding", name("WinAnsiEncoding"));
    doc.add_object(dict)
}

/// References a predefined CID font through a Type0 font with a UCS-2 CMap.
fn add_cid_font(doc: &mut Document, spec: &CidFontSpec) -> ObjectId {
    let mut descriptor = Dictionary::new();
    descriptor.set("Type", name("FontDescriptor"));
    descriptor.set("FontName", name(spec.name));
    descriptor.set("Flags", Object::Integer(6));
    descriptor.set(
        "FontBBox",
        Object::Array(spec.bbox.iter().map(|&v| Object::Integer(v)).collect()),
    );
    descriptor.set("ItalicAngle", Object::Integer(0));
    descriptor.set("Ascent", Object::Integer(spec.ascent));
    descriptor.set("Descent", Object::Integer(spec.descent));
    descriptor.set("CapHeight", Object::Integer(spec.cap_height));
    descriptor.set("StemV", Object::Integer(spec.stem_v));
    let descriptor_id = doc.add_object(descriptor);

    let mut system_info = Dictionary::new();
    system_info.set("Registry", Object::string_literal("Adobe"));
    system_info.set("Ordering", Object::string_literal(spec.ordering));
    system_info.set("Supplement", Object::Integer(spec.supplement));

    // CIDs 1..=95 are the ASCII glyphs; they are set half-width to match layout metrics.
    let mut descendant = Dictionary::new();
    descendant.set("Type", name("Font"));
    descendant.set("Subtype", name("CIDFontType0"));
    descendant.set("BaseFont", name(spec.name));
    descendant.set("CIDSystemInfo", Object::Dictionary(system_info));
    descendant.set("FontDescriptor", Object::Reference(descriptor_id));
    descendant.set("DW", Object::Integer(1000));
    descendant.set(
        "W",
        Object::Array(vec![Object::Integer(1), Object::Integer(95), Object::Integer(500)]),
    );
    let descendant_id = doc.add_object(descendant);

    let mut type0 = Dictionary::new();
    type0.set("Type", name("Font"));
    type0.set("Subtype", name("Type0"));
    type0.set("BaseFont", name(&format!("{}-{}", spec.name, spec.cmap)));
    type0.set("Encoding", name(spec.cmap));
    type0.set("DescendantFonts", Object::Array(vec![Object::Reference(descendant_id)]));
    doc.add_object(type0)
}

fn page_content(lines: &[PlacedLine], font: &FontChoice) -> Content {
    let mut operations = Vec::with_capacity(lines.len() * 5 + 1);
    operations.push(Operation::new("g", vec![real(0.0)]));

    for line in lines {
        let (key, synthetic_bold) = match font {
            FontChoice::Helvetica if line.bold => (BOLD_FONT_KEY, false),
            FontChoice::Helvetica => (REGULAR_FONT_KEY, false),
            FontChoice::Cid(_) => (REGULAR_FONT_KEY, line.bold),
        };
        let format = match font {
            FontChoice::Cid(_) => StringFormat::Hexadecimal,
            FontChoice::Helvetica => StringFormat::Literal,
        };

        operations.push(Operation::new("BT", vec![]));
        if synthetic_bold {
            operations.push(Operation::new("Tr", vec![Object::Integer(2)]));
            operations.push(Operation::new("w", vec![real(SYNTHETIC_BOLD_STROKE)]));
        }
        operations.push(Operation::new("Tf", vec![name(key), real(line.size_pt)]));
        operations.push(Operation::new("Td", vec![real(line.x_pt), real(line.y_pt)]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(font.encode(&line.text), format)],
        ));
        if synthetic_bold {
            operations.push(Operation::new("Tr", vec![Object::Integer(0)]));
        }
        operations.push(Operation::new("ET", vec![]));
    }

    Content { operations }
}
