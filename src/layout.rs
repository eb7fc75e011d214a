//! Story Layout - Flow Blocks Onto Pages
//!
//! A story is an ordered list of blocks. The engine pours them into one
//! frame per page, top to bottom, and emits positioned draw operations in
//! PDF user space (origin bottom-left, y up).
//!
//! Paragraphs split between lines; tables never split.

use tracing::debug;

use crate::fonts::{FontRole, FontSet, ReportFont};
use crate::palette::Rgb;
use crate::styles::{Align, CellStyle, ParagraphStyle, INCH};

/// Leading of table cell text relative to its font size
const CELL_LEADING: f32 = 1.2;
/// Share of the font size below the baseline
const DESCENT: f32 = 0.22;
const UNDERLINE_WIDTH: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct Paragraph {
    pub text: String,
    pub style: ParagraphStyle,
    /// Target URI when the whole paragraph is a link
    pub link: Option<String>,
}

/// Single-cell table, centred in the frame
#[derive(Debug, Clone)]
pub struct Table {
    pub text: String,
    pub width: f32,
    pub style: CellStyle,
}

#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(Paragraph),
    Spacer(f32),
    Table(Table),
}

/// Ordered blocks awaiting layout
#[derive(Debug, Clone, Default)]
pub struct Story {
    blocks: Vec<Block>,
}

impl Story {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn paragraph(&mut self, text: impl Into<String>, style: &ParagraphStyle) {
        self.blocks.push(Block::Paragraph(Paragraph {
            text: text.into(),
            style: style.clone(),
            link: None,
        }));
    }

    pub fn link(&mut self, text: impl Into<String>, uri: impl Into<String>, style: &ParagraphStyle) {
        self.blocks.push(Block::Paragraph(Paragraph {
            text: text.into(),
            style: style.clone(),
            link: Some(uri.into()),
        }));
    }

    pub fn spacer(&mut self, height: f32) {
        self.blocks.push(Block::Spacer(height));
    }

    pub fn table(&mut self, text: impl Into<String>, width: f32, style: &CellStyle) {
        self.blocks.push(Block::Table(Table {
            text: text.into(),
            width,
            style: style.clone(),
        }));
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Page size and margins in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    pub const A4: PageGeometry = PageGeometry {
        width: 595.2756,
        height: 841.8898,
        margin: 0.75 * INCH,
    };

    pub fn frame_left(&self) -> f32 {
        self.margin
    }

    pub fn frame_top(&self) -> f32 {
        self.height - self.margin
    }

    pub fn frame_bottom(&self) -> f32 {
        self.margin
    }

    pub fn frame_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// Positioned drawing operation; `y` of text is the baseline
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        x: f32,
        y: f32,
        text: String,
        font: FontRole,
        size: f32,
        color: Rgb,
    },
    FillRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        line_width: f32,
        color: Rgb,
    },
    Line {
        from: (f32, f32),
        to: (f32, f32),
        line_width: f32,
        color: Rgb,
    },
    Link {
        rect: [f32; 4],
        uri: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Link { uri, .. } => Some(uri.as_str()),
            _ => None,
        })
    }
}

/// Greedy word wrap. Words wider than the line are broken per character,
/// which is also how unspaced CJK text ends up wrapping.
pub fn wrap_text(text: &str, font: &ReportFont, size: f32, max_width: f32) -> Vec<String> {
    let space = font.text_width(" ", size);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0.0f32;

    for word in text.split_whitespace() {
        let word_width = font.text_width(word, size);
        if !line.is_empty() {
            if line_width + space + word_width <= max_width {
                line.push(' ');
                line.push_str(word);
                line_width += space + word_width;
                continue;
            }
            lines.push(std::mem::take(&mut line));
            line_width = 0.0;
        }

        if word_width <= max_width {
            line.push_str(word);
            line_width = word_width;
            continue;
        }

        for ch in word.chars() {
            let ch_width = font.text_width(ch.encode_utf8(&mut [0; 4]), size);
            if !line.is_empty() && line_width + ch_width > max_width {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }
            line.push(ch);
            line_width += ch_width;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn baseline_offset(size: f32, leading: f32) -> f32 {
    leading - (leading - size) / 2.0 - size * DESCENT
}

pub struct LayoutEngine<'a> {
    fonts: &'a FontSet,
    geometry: PageGeometry,
}

struct Cursor {
    pages: Vec<Page>,
    current: Page,
    y: f32,
    at_top: bool,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(fonts: &'a FontSet) -> Self {
        Self { fonts, geometry: PageGeometry::A4 }
    }

    /// Lay out the whole story; always yields at least one page
    pub fn layout(&self, story: &Story) -> Vec<Page> {
        let mut cursor = Cursor {
            pages: Vec::new(),
            current: Page::default(),
            y: self.geometry.frame_top(),
            at_top: true,
        };

        for block in story.blocks() {
            match block {
                Block::Paragraph(p) => self.place_paragraph(&mut cursor, p),
                Block::Spacer(h) => self.place_spacer(&mut cursor, *h),
                Block::Table(t) => self.place_table(&mut cursor, t),
            }
        }

        cursor.pages.push(cursor.current);
        debug!(pages = cursor.pages.len(), blocks = story.len(), "Story laid out");
        cursor.pages
    }

    fn new_page(&self, cursor: &mut Cursor) {
        let finished = std::mem::take(&mut cursor.current);
        cursor.pages.push(finished);
        cursor.y = self.geometry.frame_top();
        cursor.at_top = true;
    }

    fn fits(&self, cursor: &Cursor, height: f32) -> bool {
        cursor.y - height >= self.geometry.frame_bottom()
    }

    fn place_spacer(&self, cursor: &mut Cursor, height: f32) {
        if !self.fits(cursor, height) {
            self.new_page(cursor);
            return;
        }
        cursor.y -= height;
        cursor.at_top = false;
    }

    fn place_paragraph(&self, cursor: &mut Cursor, para: &Paragraph) {
        let style = &para.style;
        let font = self.fonts.get(style.font);
        let left = self.geometry.frame_left() + style.left_indent;
        let avail = self.geometry.frame_width() - style.left_indent;
        let lines = wrap_text(&para.text, font, style.font_size, avail);

        if !cursor.at_top {
            cursor.y -= style.space_before;
        }

        for line in lines {
            if !self.fits(cursor, style.leading) && !cursor.at_top {
                self.new_page(cursor);
            }

            let width = font.text_width(&line, style.font_size);
            let x = match style.align {
                Align::Left => left,
                Align::Center => left + (avail - width) / 2.0,
            };
            let baseline = cursor.y - baseline_offset(style.font_size, style.leading);

            if style.underline {
                let under = baseline - style.font_size * 0.1;
                cursor.current.ops.push(DrawOp::Line {
                    from: (x, under),
                    to: (x + width, under),
                    line_width: UNDERLINE_WIDTH,
                    color: style.color,
                });
            }
            if let Some(uri) = &para.link {
                cursor.current.ops.push(DrawOp::Link {
                    rect: [x, cursor.y - style.leading, x + width, cursor.y],
                    uri: uri.clone(),
                });
            }
            cursor.current.ops.push(DrawOp::Text {
                x,
                y: baseline,
                text: line,
                font: style.font,
                size: style.font_size,
                color: style.color,
            });

            cursor.y -= style.leading;
            cursor.at_top = false;
        }

        cursor.y -= style.space_after;
    }

    fn place_table(&self, cursor: &mut Cursor, table: &Table) {
        let style = &table.style;
        let pad = style.padding;
        let font = self.fonts.get(style.font);
        let leading = style.font_size * CELL_LEADING;
        let inner = table.width - pad.left - pad.right;

        let mut lines = wrap_text(&table.text, font, style.font_size, inner);
        if lines.is_empty() {
            // An empty cell still occupies one line
            lines.push(String::new());
        }
        let height = pad.top + leading * lines.len() as f32 + pad.bottom;

        if !self.fits(cursor, height) && !cursor.at_top {
            self.new_page(cursor);
        }

        let x = self.geometry.frame_left() + (self.geometry.frame_width() - table.width) / 2.0;
        let top = cursor.y;
        let bottom = top - height;
        let ops = &mut cursor.current.ops;

        if let Some(bg) = style.background {
            ops.push(DrawOp::FillRect { x, y: bottom, width: table.width, height, color: bg });
        }
        if let Some((line_width, color)) = style.line_above {
            ops.push(DrawOp::Line { from: (x, top), to: (x + table.width, top), line_width, color });
        }
        if let Some((line_width, color)) = style.box_border {
            ops.push(DrawOp::StrokeRect {
                x,
                y: bottom,
                width: table.width,
                height,
                line_width,
                color,
            });
        }

        let mut line_top = top - pad.top;
        for line in lines {
            if !line.is_empty() {
                let width = font.text_width(&line, style.font_size);
                let tx = match style.align {
                    Align::Left => x + pad.left,
                    Align::Center => x + pad.left + (inner - width) / 2.0,
                };
                ops.push(DrawOp::Text {
                    x: tx,
                    y: line_top - baseline_offset(style.font_size, leading),
                    text: line,
                    font: style.font,
                    size: style.font_size,
                    color: style.text_color,
                });
            }
            line_top -= leading;
        }

        cursor.y = bottom;
        cursor.at_top = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{Base14, FontSet};
    use crate::styles::Stylesheet;

    fn helvetica() -> ReportFont {
        ReportFont::Base14(Base14::Helvetica)
    }

    #[test]
    fn test_wrap_fits_on_one_line() {
        let lines = wrap_text("hello   world", &helvetica(), 10.0, 500.0);
        assert_eq!(lines, vec!["hello world".to_string()]);
    }

    #[test]
    fn test_wrap_breaks_between_words() {
        // "aaaa" is 4 * 5.56 = 22.24 pt at size 10
        let lines = wrap_text("aaaa aaaa aaaa", &helvetica(), 10.0, 50.0);
        assert_eq!(lines, vec!["aaaa aaaa", "aaaa"]);
    }

    #[test]
    fn test_wrap_breaks_long_word_per_char() {
        let lines = wrap_text("aaaaaaaaaa", &helvetica(), 10.0, 20.0);
        assert_eq!(lines, vec!["aaa", "aaa", "aaa", "a"]);
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap_text("   \n ", &helvetica(), 10.0, 100.0).is_empty());
    }

    #[test]
    fn test_table_centered_in_frame() {
        let fonts = FontSet::base14();
        let sheet = Stylesheet::new();
        let mut story = Story::new();
        story.table("#1", 36.0, &sheet.badge);
        let pages = LayoutEngine::new(&fonts).layout(&story);

        let geometry = PageGeometry::A4;
        let expected_x = geometry.frame_left() + (geometry.frame_width() - 36.0) / 2.0;
        let rect = pages[0].ops.iter().find_map(|op| match op {
            DrawOp::FillRect { x, height, .. } => Some((*x, *height)),
            _ => None,
        });
        let (x, height) = rect.unwrap();
        assert!((x - expected_x).abs() < 1e-3);
        // 5 + 12 * 1.2 + 5
        assert!((height - 24.4).abs() < 1e-3);
    }

    #[test]
    fn test_long_story_spills_onto_more_pages() {
        let fonts = FontSet::base14();
        let sheet = Stylesheet::new();
        let mut story = Story::new();
        for i in 0..120 {
            story.paragraph(format!("Paragraph number {}", i), &sheet.body);
        }
        let pages = LayoutEngine::new(&fonts).layout(&story);
        assert!(pages.len() > 1);

        let total: usize = pages.iter().map(|p| p.texts().count()).sum();
        assert_eq!(total, 120);

        let bottom = PageGeometry::A4.frame_bottom();
        for page in &pages {
            for op in &page.ops {
                if let DrawOp::Text { y, .. } = op {
                    assert!(*y >= bottom);
                }
            }
        }
    }

    #[test]
    fn test_link_paragraph_emits_annotation_and_underline() {
        let fonts = FontSet::base14();
        let sheet = Stylesheet::new();
        let mut story = Story::new();
        story.link("https://example.com", "https://example.com", &sheet.link);
        let pages = LayoutEngine::new(&fonts).layout(&story);

        assert_eq!(pages[0].links().collect::<Vec<_>>(), vec!["https://example.com"]);
        assert!(pages[0].ops.iter().any(|op| matches!(op, DrawOp::Line { .. })));
    }

    #[test]
    fn test_space_before_dropped_at_top() {
        let fonts = FontSet::base14();
        let sheet = Stylesheet::new();
        let mut story = Story::new();
        story.paragraph("Title", &sheet.question_title);
        let pages = LayoutEngine::new(&fonts).layout(&story);

        let top = PageGeometry::A4.frame_top();
        let y = match &pages[0].ops[0] {
            DrawOp::Text { y, .. } => *y,
            other => panic!("unexpected op {:?}", other),
        };
        assert!((top - y - baseline_offset(24.0, 30.0)).abs() < 1e-3);
    }

    #[test]
    fn test_empty_story_has_one_page() {
        let fonts = FontSet::base14();
        let pages = LayoutEngine::new(&fonts).layout(&Story::new());
        assert_eq!(pages.len(), 1);
        assert!(pages[0].ops.is_empty());
    }

    fn frame_height() -> f32 {
        PageGeometry::A4.frame_top() - PageGeometry::A4.frame_bottom()
    }

    fn text_baselines(page: &Page) -> Vec<f32> {
        page.ops.iter().filter_map(|op| match op {
            DrawOp::Text { y, .. } => Some(*y),
            _ => None,
        }).collect()
    }

    #[test]
    fn test_table_that_does_not_fit_moves_to_next_page() {
        let fonts = FontSet::base14();
        let sheet = Stylesheet::new();
        let mut story = Story::new();
        story.spacer(frame_height() - 10.0);
        story.table("Conclusion", 7.0 * INCH, &sheet.banner);
        let pages = LayoutEngine::new(&fonts).layout(&story);

        assert_eq!(pages.len(), 2);
        assert!(pages[0].ops.is_empty());
        let (y, height) = pages[1].ops.iter().find_map(|op| match op {
            DrawOp::FillRect { y, height, .. } => Some((*y, *height)),
            _ => None,
        }).unwrap();
        assert!((y + height - PageGeometry::A4.frame_top()).abs() < 1e-3);
    }

    #[test]
    fn test_spacer_that_does_not_fit_ends_page() {
        let fonts = FontSet::base14();
        let sheet = Stylesheet::new();
        let mut story = Story::new();
        story.spacer(frame_height() - 10.0);
        story.spacer(20.0);
        story.paragraph("Next page", &sheet.body);
        let pages = LayoutEngine::new(&fonts).layout(&story);

        assert_eq!(pages.len(), 2);
        assert!(pages[0].ops.is_empty());
        let expected = PageGeometry::A4.frame_top() - baseline_offset(11.0, 16.0);
        assert_eq!(text_baselines(&pages[1]), vec![expected]);
    }

    #[test]
    fn test_paragraph_splits_between_lines() {
        let fonts = FontSet::base14();
        let sheet = Stylesheet::new();
        let body = &sheet.body;
        let mut story = Story::new();
        // Leaves room for exactly two body lines after space_before
        story.spacer(frame_height() - body.space_before - 2.5 * body.leading);
        story.paragraph(vec!["purring"; 200].join(" "), body);
        let pages = LayoutEngine::new(&fonts).layout(&story);

        assert_eq!(pages.len(), 2);
        assert_eq!(text_baselines(&pages[0]).len(), 2);

        let second = text_baselines(&pages[1]);
        assert!(!second.is_empty());
        let expected = PageGeometry::A4.frame_top() - baseline_offset(body.font_size, body.leading);
        assert_eq!(second[0], expected);
        assert!((second[0] - second[1] - body.leading).abs() < 1e-3);
    }
}
