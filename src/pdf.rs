//! PDF Serialization
//!
//! Writes laid-out pages with pdf-writer. Object numbers are handed out in
//! order: catalog, page tree, info, then per-page and per-font objects.
//!
//! Base-14 fonts take WinAnsi bytes. Embedded fonts are written as
//! Type0/Identity-H: glyph ids are remapped while the content streams are
//! encoded, and the font is subset once every page is done.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Local, Timelike};
use pdf_writer::types::{
    ActionType, AnnotationType, CidFontType, FontFlags, SystemInfo, UnicodeCmap,
};
use pdf_writer::{Content, Date, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use subsetter::GlyphRemapper;
use thiserror::Error;
use tracing::debug;

use crate::fonts::{winansi_byte, FaceData, FontRole, FontSet, ReportFont};
use crate::hashing::sha256_hex;
use crate::layout::{DrawOp, Page, PageGeometry};
use crate::palette::Rgb;

const ROLES: [FontRole; 2] = [FontRole::Regular, FontRole::Bold];

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Font subsetting failed for {font}: {reason}")]
    Subset { font: String, reason: String },

    #[error("Embedded font {0} could not be parsed")]
    FontParse(String),
}

/// Document information dictionary entries
#[derive(Debug, Clone)]
pub struct DocInfo {
    pub title: String,
    pub creator: String,
    pub created: DateTime<Local>,
}

fn resource_name(role: FontRole) -> Name<'static> {
    match role {
        FontRole::Regular => Name(b"F1"),
        FontRole::Bold => Name(b"F2"),
    }
}

struct RefAlloc(i32);

impl RefAlloc {
    fn bump(&mut self) -> Ref {
        let r = Ref::new(self.0);
        self.0 += 1;
        r
    }
}

/// Glyph bookkeeping for one embedded face while pages are encoded
struct EmbeddedGlyphs<'f> {
    data: &'f FaceData,
    face: ttf_parser::Face<'f>,
    remapper: GlyphRemapper,
    /// New glyph id -> (character, advance in 1/1000 em)
    used: BTreeMap<u16, (char, f32)>,
}

impl<'f> EmbeddedGlyphs<'f> {
    fn new(data: &'f FaceData) -> Result<Self, PdfError> {
        let face = data.face().ok_or_else(|| PdfError::FontParse(data.name.clone()))?;
        let mut remapper = GlyphRemapper::new();
        remapper.remap(0);
        Ok(Self { data, face, remapper, used: BTreeMap::new() })
    }

    fn encode(&mut self, text: &str) -> Vec<u8> {
        let scale = 1000.0 / self.face.units_per_em() as f32;
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let old = self.face.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0));
            let new = self.remapper.remap(old.0);
            let advance = self.face.glyph_hor_advance(old).unwrap_or(0) as f32 * scale;
            self.used.entry(new).or_insert((ch, advance));
            bytes.extend_from_slice(&new.to_be_bytes());
        }
        bytes
    }
}

enum FontSlot<'f> {
    Base14(&'static str),
    Embedded(Box<EmbeddedGlyphs<'f>>),
}

impl FontSlot<'_> {
    fn encode(&mut self, text: &str) -> Vec<u8> {
        match self {
            FontSlot::Base14(_) => text.chars().map(winansi_byte).collect(),
            FontSlot::Embedded(glyphs) => glyphs.encode(text),
        }
    }
}

fn slot_for(font: &ReportFont) -> Result<FontSlot<'_>, PdfError> {
    Ok(match font {
        ReportFont::Base14(b) => FontSlot::Base14(b.base_font()),
        ReportFont::Embedded(data) => FontSlot::Embedded(Box::new(EmbeddedGlyphs::new(data)?)),
    })
}

/// Serialize `pages` into a complete PDF file
pub fn write_pdf(
    pages: &[Page],
    fonts: &FontSet,
    geometry: PageGeometry,
    info: &DocInfo,
) -> Result<Vec<u8>, PdfError> {
    let mut alloc = RefAlloc(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let info_id = alloc.bump();
    let font_ids = [alloc.bump(), alloc.bump()];

    let mut slots = [slot_for(fonts.get(FontRole::Regular))?, slot_for(fonts.get(FontRole::Bold))?];

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);

    let mut page_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = alloc.bump();
        let content_id = alloc.bump();
        page_ids.push(page_id);

        let (content, links) = encode_page(page, &mut slots);
        pdf.stream(content_id, &content);

        let mut annotation_ids = Vec::with_capacity(links.len());
        for (rect, uri) in links {
            let annot_id = alloc.bump();
            annotation_ids.push(annot_id);
            let mut annot = pdf.annotation(annot_id);
            annot.subtype(AnnotationType::Link);
            annot.rect(Rect::new(rect[0], rect[1], rect[2], rect[3]));
            annot.border(0.0, 0.0, 0.0, None);
            annot.action().action_type(ActionType::Uri).uri(Str(uri.as_bytes()));
            annot.finish();
        }

        let mut pdf_page = pdf.page(page_id);
        pdf_page.media_box(Rect::new(0.0, 0.0, geometry.width, geometry.height));
        pdf_page.parent(tree_id);
        pdf_page.contents(content_id);
        {
            let mut resources = pdf_page.resources();
            let mut font_dict = resources.fonts();
            for (role, id) in ROLES.iter().zip(font_ids) {
                font_dict.pair(resource_name(*role), id);
            }
        }
        if !annotation_ids.is_empty() {
            pdf_page.annotations(annotation_ids);
        }
        pdf_page.finish();
    }

    pdf.pages(tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    for (slot, font_id) in slots.into_iter().zip(font_ids) {
        match slot {
            FontSlot::Base14(base) => {
                pdf.type1_font(font_id)
                    .base_font(Name(base.as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
            }
            FontSlot::Embedded(glyphs) => write_embedded(&mut pdf, &mut alloc, font_id, *glyphs)?,
        }
    }

    write_info(&mut pdf, info_id, info);
    debug!(pages = pages.len(), "PDF serialized");
    Ok(pdf.finish())
}

fn encode_page(page: &Page, slots: &mut [FontSlot<'_>; 2]) -> (Vec<u8>, Vec<([f32; 4], String)>) {
    let mut content = Content::new();
    let mut links = Vec::new();

    for op in &page.ops {
        match op {
            DrawOp::FillRect { x, y, width, height, color } => {
                let (r, g, b) = color.to_unit();
                content.set_fill_rgb(r, g, b);
                content.rect(*x, *y, *width, *height);
                content.fill_nonzero();
            }
            DrawOp::StrokeRect { x, y, width, height, line_width, color } => {
                set_stroke(&mut content, *color, *line_width);
                content.rect(*x, *y, *width, *height);
                content.stroke();
            }
            DrawOp::Line { from, to, line_width, color } => {
                set_stroke(&mut content, *color, *line_width);
                content.move_to(from.0, from.1);
                content.line_to(to.0, to.1);
                content.stroke();
            }
            DrawOp::Text { x, y, text, font, size, color } => {
                let slot = match font {
                    FontRole::Regular => &mut slots[0],
                    FontRole::Bold => &mut slots[1],
                };
                let bytes = slot.encode(text);
                let (r, g, b) = color.to_unit();
                content.begin_text();
                content.set_fill_rgb(r, g, b);
                content.set_font(resource_name(*font), *size);
                content.next_line(*x, *y);
                content.show(Str(&bytes));
                content.end_text();
            }
            DrawOp::Link { rect, uri } => links.push((*rect, uri.clone())),
        }
    }

    (content.finish().to_vec(), links)
}

fn set_stroke(content: &mut Content, color: Rgb, width: f32) {
    let (r, g, b) = color.to_unit();
    content.set_stroke_rgb(r, g, b);
    content.set_line_width(width);
}

fn identity_info() -> SystemInfo<'static> {
    SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    }
}

/// Six-letter subset prefix derived from the glyphs in use
fn subset_tag(used: &BTreeMap<u16, (char, f32)>) -> String {
    let key: Vec<u8> = used.keys().flat_map(|g| g.to_be_bytes()).collect();
    sha256_hex(&key)
        .bytes()
        .take(6)
        .map(|h| {
            let nibble = (h as char).to_digit(16).unwrap_or(0) as u8;
            (b'A' + nibble) as char
        })
        .collect()
}

fn write_embedded(
    pdf: &mut Pdf,
    alloc: &mut RefAlloc,
    type0_id: Ref,
    glyphs: EmbeddedGlyphs<'_>,
) -> Result<(), PdfError> {
    let cid_id = alloc.bump();
    let descriptor_id = alloc.bump();
    let file_id = alloc.bump();
    let cmap_id = alloc.bump();

    let subset = subsetter::subset(&glyphs.data.data, glyphs.data.index, &glyphs.remapper)
        .map_err(|e| PdfError::Subset {
            font: glyphs.data.name.clone(),
            reason: format!("{:?}", e),
        })?;
    let is_cff = subset.starts_with(b"OTTO");
    let base_name = format!("{}+{}", subset_tag(&glyphs.used), glyphs.data.name);
    let base = Name(base_name.as_bytes());

    pdf.type0_font(type0_id)
        .base_font(base)
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_id)
        .to_unicode(cmap_id);

    let mut cid = pdf.cid_font(cid_id);
    cid.subtype(if is_cff { CidFontType::Type0 } else { CidFontType::Type2 });
    cid.base_font(base);
    cid.system_info(identity_info());
    cid.font_descriptor(descriptor_id);
    cid.default_width(0.0);
    if !is_cff {
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
    }
    {
        let mut widths = cid.widths();
        for (gid, (_, advance)) in &glyphs.used {
            widths.consecutive(*gid, [*advance]);
        }
    }
    cid.finish();

    let face = &glyphs.face;
    let scale = 1000.0 / face.units_per_em() as f32;
    let bbox = face.global_bounding_box();
    let mut descriptor = pdf.font_descriptor(descriptor_id);
    descriptor
        .name(base)
        .flags(FontFlags::SYMBOLIC)
        .bbox(Rect::new(
            bbox.x_min as f32 * scale,
            bbox.y_min as f32 * scale,
            bbox.x_max as f32 * scale,
            bbox.y_max as f32 * scale,
        ))
        .italic_angle(0.0)
        .ascent(face.ascender() as f32 * scale)
        .descent(face.descender() as f32 * scale)
        .cap_height(face.capital_height().unwrap_or(face.ascender()) as f32 * scale)
        .stem_v(80.0);
    if is_cff {
        descriptor.font_file3(file_id);
    } else {
        descriptor.font_file2(file_id);
    }
    descriptor.finish();

    let mut file = pdf.stream(file_id, &subset);
    if is_cff {
        file.pair(Name(b"Subtype"), Name(b"OpenType"));
    }
    file.finish();

    let mut cmap = UnicodeCmap::new(Name(b"Custom"), identity_info());
    for (gid, (ch, _)) in &glyphs.used {
        cmap.pair(*gid, *ch);
    }
    pdf.cmap(cmap_id, &cmap.finish());

    debug!(font = %glyphs.data.name, glyphs = glyphs.used.len(), cff = is_cff, "Embedded subset font");
    Ok(())
}

fn write_info(pdf: &mut Pdf, id: Ref, info: &DocInfo) {
    let created = info.created;
    let date = Date::new(created.year().clamp(0, u16::MAX as i32) as u16)
        .month(created.month() as u8)
        .day(created.day() as u8)
        .hour(created.hour() as u8)
        .minute(created.minute() as u8)
        .second(created.second() as u8);

    pdf.document_info(id)
        .title(TextStr(&info.title))
        .creator(TextStr(&info.creator))
        .producer(TextStr(concat!("inkforge-core ", env!("CARGO_PKG_VERSION"))))
        .creation_date(date);
}
