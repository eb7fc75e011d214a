//! Font Discovery and Metrics
//!
//! Poster text and report text resolve fonts differently:
//! - the poster wants any decent sans face and quietly settles for the
//!   built-in bitmap face (see `glyphs`)
//! - the report wants a CJK-capable face to embed, and says so on stdout
//!   when it has to settle for base-14 Helvetica

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

pub const CJK_FALLBACK_WARNING: &str =
    "Warning: Could not load Chinese fonts. Chinese characters may not display correctly.";

/// Probe character a report face must cover to count as CJK-capable
const CJK_PROBE: char = '中';

#[derive(Debug, Error)]
pub enum FontError {
    #[error("Failed to read font {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unusable font face {path} (index {index})")]
    Parse { path: PathBuf, index: u32 },
}

/// Raw bytes of one face inside a font file or collection
#[derive(Debug, Clone)]
pub struct FaceData {
    pub data: Arc<Vec<u8>>,
    pub index: u32,
    pub name: String,
}

impl FaceData {
    pub fn from_file(path: &Path, index: u32) -> Result<Self, FontError> {
        let data = fs::read(path).map_err(|source| FontError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let face = ttf_parser::Face::parse(&data, index).map_err(|_| FontError::Parse {
            path: path.to_path_buf(),
            index,
        })?;
        let name = postscript_name(&face).unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().replace(' ', ""))
                .unwrap_or_else(|| "EmbeddedFont".to_string())
        });
        Ok(Self { data: Arc::new(data), index, name })
    }

    /// Parse on demand; faces borrow the bytes so they are not stored
    pub fn face(&self) -> Option<ttf_parser::Face<'_>> {
        ttf_parser::Face::parse(&self.data, self.index).ok()
    }
}

fn postscript_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    face.names()
        .into_iter()
        .find(|n| n.name_id == ttf_parser::name_id::POST_SCRIPT_NAME)
        .and_then(|n| n.to_string())
        .filter(|s| !s.is_empty())
}

/// Sans families tried in order before the generic sans-serif mapping
pub const SANS_FAMILIES: &[&str] = &[
    "Helvetica",
    "Arial",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
];

fn system_database() -> fontdb::Database {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    db
}

/// Look up an installed face: Helvetica first, then the common sans
/// families, then whatever the system maps the generic family to.
pub fn find_system_sans() -> Option<FaceData> {
    sans_from(&system_database())
}

fn sans_from(db: &fontdb::Database) -> Option<FaceData> {
    let mut families: Vec<fontdb::Family<'_>> =
        SANS_FAMILIES.iter().map(|name| fontdb::Family::Name(*name)).collect();
    families.push(fontdb::Family::SansSerif);

    let query = fontdb::Query {
        families: &families,
        ..fontdb::Query::default()
    };
    let id = db.query(&query)?;
    let name = db.face(id).map(|f| f.post_script_name.clone()).unwrap_or_default();

    let face = db.with_face_data(id, |data, index| FaceData {
        data: Arc::new(data.to_vec()),
        index,
        name,
    })?;

    // Guard against faces fontdb indexed but ttf-parser rejects
    face.face()?;
    debug!(font = %face.name, "Using system sans face");
    Some(face)
}

// --- Report fonts ---

/// Built-in PDF fonts that need no embedding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base14 {
    Helvetica,
    HelveticaBold,
}

impl Base14 {
    pub fn base_font(self) -> &'static str {
        match self {
            Base14::Helvetica => "Helvetica",
            Base14::HelveticaBold => "Helvetica-Bold",
        }
    }

    fn widths(self) -> &'static [u16; 95] {
        match self {
            Base14::Helvetica => &HELVETICA_WIDTHS,
            Base14::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    /// Advance in 1/1000 em for a character after WinAnsi mapping
    pub fn advance(self, ch: char) -> u16 {
        match winansi_byte(ch) {
            b @ 0x20..=0x7E => self.widths()[(b - 0x20) as usize],
            // Latin-1 upper half and unmappable characters
            _ => 556,
        }
    }
}

/// WinAnsi byte for a character; anything outside Latin-1 becomes `?`
pub fn winansi_byte(ch: char) -> u8 {
    match ch as u32 {
        0x20..=0x7E | 0xA0..=0xFF => ch as u32 as u8,
        _ => b'?',
    }
}

#[derive(Debug, Clone)]
pub enum ReportFont {
    Base14(Base14),
    Embedded(FaceData),
}

impl ReportFont {
    /// Width of `text` in points at `size`
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        match self {
            ReportFont::Base14(b) => {
                let units: u32 = text.chars().map(|c| b.advance(c) as u32).sum();
                units as f32 * size / 1000.0
            }
            ReportFont::Embedded(data) => match data.face() {
                Some(face) => {
                    let per_unit = size / face.units_per_em() as f32;
                    text.chars()
                        .map(|c| {
                            let gid = face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
                            face.glyph_hor_advance(gid).unwrap_or(0) as f32 * per_unit
                        })
                        .sum()
                }
                None => 0.0,
            },
        }
    }

    pub fn is_embedded(&self) -> bool {
        matches!(self, ReportFont::Embedded(_))
    }
}

/// Which face of the set a style asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontRole {
    Regular,
    Bold,
}

/// Font pair the report lays out and writes with
#[derive(Debug, Clone)]
pub struct FontSet {
    pub normal: ReportFont,
    pub bold: ReportFont,
}

struct CjkCandidate {
    normal: (&'static str, u32),
    bold: (&'static str, u32),
}

const CJK_CANDIDATES: &[CjkCandidate] = &[
    CjkCandidate {
        normal: ("/System/Library/Fonts/STHeiti Medium.ttc", 0),
        bold: ("/System/Library/Fonts/STHeiti Medium.ttc", 1),
    },
    CjkCandidate {
        normal: ("/System/Library/Fonts/Supplemental/Songti.ttc", 0),
        bold: ("/System/Library/Fonts/Supplemental/Songti.ttc", 0),
    },
    CjkCandidate {
        normal: ("/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc", 2),
        bold: ("/usr/share/fonts/opentype/noto/NotoSansCJK-Bold.ttc", 2),
    },
    CjkCandidate {
        normal: ("/usr/share/fonts/truetype/wqy/wqy-microhei.ttc", 0),
        bold: ("/usr/share/fonts/truetype/wqy/wqy-microhei.ttc", 0),
    },
    CjkCandidate {
        normal: ("/usr/share/fonts/truetype/arphic/uming.ttc", 0),
        bold: ("/usr/share/fonts/truetype/arphic/uming.ttc", 0),
    },
];

impl FontSet {
    pub fn get(&self, role: FontRole) -> &ReportFont {
        match role {
            FontRole::Regular => &self.normal,
            FontRole::Bold => &self.bold,
        }
    }

    pub fn base14() -> Self {
        Self {
            normal: ReportFont::Base14(Base14::Helvetica),
            bold: ReportFont::Base14(Base14::HelveticaBold),
        }
    }

    /// Register the first CJK pair that loads; otherwise warn and use base-14
    pub fn register() -> Self {
        for candidate in CJK_CANDIDATES {
            match Self::load_pair(candidate) {
                Ok(set) => return set,
                Err(e) => debug!(error = %e, "CJK font candidate skipped"),
            }
        }
        println!("{}", CJK_FALLBACK_WARNING);
        warn!("No CJK font available, falling back to Helvetica");
        Self::base14()
    }

    fn load_pair(candidate: &CjkCandidate) -> Result<Self, FontError> {
        let normal = load_cjk(candidate.normal)?;
        let bold = load_cjk(candidate.bold)?;
        debug!(normal = %normal.name, bold = %bold.name, "Registered CJK fonts");
        Ok(Self {
            normal: ReportFont::Embedded(normal),
            bold: ReportFont::Embedded(bold),
        })
    }
}

fn load_cjk((path, index): (&str, u32)) -> Result<FaceData, FontError> {
    let path = Path::new(path);
    let data = FaceData::from_file(path, index)?;
    let covers_cjk = data
        .face()
        .map(|f| f.glyph_index(CJK_PROBE).is_some())
        .unwrap_or(false);
    if !covers_cjk {
        return Err(FontError::Parse { path: path.to_path_buf(), index });
    }
    Ok(data)
}

// Advance widths for WinAnsi 0x20..=0x7E, from the standard AFM metrics
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helvetica_widths() {
        let font = ReportFont::Base14(Base14::Helvetica);
        // "Hi" = 722 + 222
        assert!((font.text_width("Hi", 10.0) - 9.44).abs() < 1e-4);
        assert_eq!(Base14::Helvetica.advance(' '), 278);
        assert_eq!(Base14::HelveticaBold.advance('m'), 889);
        assert_eq!(Base14::Helvetica.advance('~'), 584);
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = ReportFont::Base14(Base14::Helvetica);
        let bold = ReportFont::Base14(Base14::HelveticaBold);
        assert!(bold.text_width("Research", 12.0) > regular.text_width("Research", 12.0));
    }

    #[test]
    fn test_winansi_mapping() {
        assert_eq!(winansi_byte('A'), b'A');
        assert_eq!(winansi_byte('é'), 0xE9);
        assert_eq!(winansi_byte('中'), b'?');
    }

    #[test]
    fn test_missing_font_file() {
        let err = FaceData::from_file(Path::new("/nonexistent/font.ttf"), 0).unwrap_err();
        assert!(matches!(err, FontError::Read { .. }));
    }

    #[test]
    fn test_base14_set() {
        let set = FontSet::base14();
        assert!(!set.normal.is_embedded());
        assert!(!set.bold.is_embedded());
    }

    /// Whether any face in `db` belongs to one of [`SANS_FAMILIES`]
    fn has_sans_family(db: &fontdb::Database) -> bool {
        db.faces().any(|face| {
            face.families
                .iter()
                .any(|(family, _)| SANS_FAMILIES.contains(&family.as_str()))
        })
    }

    #[test]
    fn test_installed_sans_family_is_found() {
        let db = system_database();
        if !has_sans_family(&db) {
            return;
        }
        let face = sans_from(&db).unwrap();
        assert!(face.face().is_some());
    }

    #[test]
    fn test_empty_database_has_no_sans() {
        let db = fontdb::Database::new();
        assert!(!has_sans_family(&db));
        assert!(sans_from(&db).is_none());
    }
}
