//! Report Styles
//!
//! Light background, blue accents. Styles name a font role; the concrete
//! face comes from the `FontSet` registered at startup.

use crate::fonts::FontRole;
use crate::palette::Rgb;

pub const INCH: f32 = 72.0;

pub const COLOR_PRIMARY: Rgb = Rgb(0x1E, 0x40, 0xAF);
pub const COLOR_SECONDARY: Rgb = Rgb(0x3B, 0x82, 0xF6);
pub const COLOR_ACCENT: Rgb = Rgb(0x60, 0xA5, 0xFA);
pub const COLOR_BG_LIGHT: Rgb = Rgb(0xF8, 0xFA, 0xFC);
pub const COLOR_TEXT_PRIMARY: Rgb = Rgb(0x1E, 0x29, 0x3B);
pub const COLOR_TEXT_SECONDARY: Rgb = Rgb(0x47, 0x55, 0x69);
pub const COLOR_BORDER: Rgb = Rgb(0xE2, 0xE8, 0xF0);
pub const COLOR_WHITE: Rgb = Rgb(0xFF, 0xFF, 0xFF);
pub const COLOR_BLACK: Rgb = Rgb(0x00, 0x00, 0x00);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// Paragraph style
#[derive(Debug, Clone)]
pub struct ParagraphStyle {
    pub name: &'static str,
    pub font: FontRole,
    pub font_size: f32,
    pub leading: f32,
    pub color: Rgb,
    pub space_before: f32,
    pub space_after: f32,
    pub left_indent: f32,
    pub align: Align,
    pub underline: bool,
}

impl ParagraphStyle {
    /// Body defaults: regular 10/12, black, no spacing
    fn normal(name: &'static str) -> Self {
        Self {
            name,
            font: FontRole::Regular,
            font_size: 10.0,
            leading: 12.0,
            color: COLOR_BLACK,
            space_before: 0.0,
            space_after: 0.0,
            left_indent: 0.0,
            align: Align::Left,
            underline: false,
        }
    }
}

/// Styling of a single-cell table
#[derive(Debug, Clone)]
pub struct CellStyle {
    pub font: FontRole,
    pub font_size: f32,
    pub text_color: Rgb,
    pub background: Option<Rgb>,
    pub padding: Padding,
    pub align: Align,
    pub box_border: Option<(f32, Rgb)>,
    pub line_above: Option<(f32, Rgb)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Padding {
    /// Table defaults of the layout engine
    pub const DEFAULT: Padding = Padding { left: 6.0, right: 6.0, top: 3.0, bottom: 3.0 };
}

/// All styles used by the report
#[derive(Debug, Clone)]
pub struct Stylesheet {
    pub question_title: ParagraphStyle,
    pub body: ParagraphStyle,
    pub body_bold: ParagraphStyle,
    pub link: ParagraphStyle,
    pub source_desc: ParagraphStyle,
    pub metadata: ParagraphStyle,
    pub banner: CellStyle,
    pub badge: CellStyle,
    pub divider: CellStyle,
}

impl Stylesheet {
    pub fn new() -> Self {
        let question_title = ParagraphStyle {
            font: FontRole::Bold,
            font_size: 24.0,
            leading: 30.0,
            color: COLOR_PRIMARY,
            space_before: 10.0,
            space_after: 30.0,
            ..ParagraphStyle::normal("QuestionTitle")
        };

        let body = ParagraphStyle {
            font_size: 11.0,
            leading: 16.0,
            color: COLOR_TEXT_PRIMARY,
            space_after: 12.0,
            ..ParagraphStyle::normal("ReportBody")
        };

        let body_bold = ParagraphStyle {
            font: FontRole::Bold,
            ..body.clone()
        };

        let link = ParagraphStyle {
            font_size: 10.0,
            leading: 14.0,
            color: COLOR_SECONDARY,
            space_after: 8.0,
            underline: true,
            ..ParagraphStyle::normal("ReportLink")
        };

        let source_desc = ParagraphStyle {
            font_size: 10.0,
            leading: 14.0,
            color: COLOR_TEXT_SECONDARY,
            space_after: 15.0,
            left_indent: 20.0,
            ..ParagraphStyle::normal("ReportSourceDesc")
        };

        let metadata = ParagraphStyle {
            font_size: 9.0,
            color: COLOR_TEXT_SECONDARY,
            space_after: 20.0,
            ..ParagraphStyle::normal("ReportMetadata")
        };

        let banner = CellStyle {
            font: FontRole::Bold,
            font_size: 16.0,
            text_color: COLOR_PRIMARY,
            background: Some(COLOR_BG_LIGHT),
            padding: Padding { left: 12.0, right: 12.0, top: 10.0, bottom: 10.0 },
            align: Align::Left,
            box_border: Some((1.0, COLOR_BORDER)),
            line_above: None,
        };

        let badge = CellStyle {
            font: FontRole::Bold,
            font_size: 12.0,
            text_color: COLOR_WHITE,
            background: Some(COLOR_ACCENT),
            padding: Padding { top: 5.0, bottom: 5.0, ..Padding::DEFAULT },
            align: Align::Center,
            box_border: None,
            line_above: None,
        };

        let divider = CellStyle {
            font: FontRole::Regular,
            font_size: 10.0,
            text_color: COLOR_BLACK,
            background: Some(COLOR_BG_LIGHT),
            padding: Padding::DEFAULT,
            align: Align::Left,
            box_border: None,
            line_above: Some((2.0, COLOR_ACCENT)),
        };

        Self {
            question_title,
            body,
            body_bold,
            link,
            source_desc,
            metadata,
            banner,
            badge,
            divider,
        }
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colors_match_scheme() {
        assert_eq!(COLOR_PRIMARY, Rgb(0x1E, 0x40, 0xAF));
        assert_eq!(COLOR_ACCENT, Rgb(0x60, 0xA5, 0xFA));
        assert_eq!(COLOR_TEXT_SECONDARY, Rgb(0x47, 0x55, 0x69));
    }

    #[test]
    fn test_sheet_values() {
        let sheet = Stylesheet::new();
        assert_eq!(sheet.question_title.font_size, 24.0);
        assert_eq!(sheet.question_title.leading, 30.0);
        assert_eq!(sheet.body.space_after, 12.0);
        assert_eq!(sheet.source_desc.left_indent, 20.0);
        assert!(sheet.link.underline);
        assert_eq!(sheet.metadata.leading, 12.0);
        assert_eq!(sheet.badge.align, Align::Center);
        assert_eq!(sheet.body_bold.font, FontRole::Bold);
    }
}
