//! InkForge Core - One-Shot Print Generators
//!
//! Two independent generators share this crate:
//! 1. Poster: procedurally drawn festival poster, written as PNG
//! 2. Report: research report laid out from JSON, written as PDF
//!
//! Both run straight through: configure, draw, write one file, exit.

pub mod palette;
pub mod geometry;
pub mod canvas;
pub mod glyphs;
pub mod fonts;
pub mod poster;
pub mod styles;
pub mod report;
pub mod layout;
pub mod pdf;
pub mod validation;
pub mod hashing;
pub mod print;
pub mod pipeline;
pub mod logging;

pub use palette::{Rgb, Rgba};
pub use geometry::{star_points, lerp_rgb, arc_points};
pub use poster::{PosterConfig, FontSource};
pub use report::{ReportData, SearchResult, MAX_SEARCH_RESULTS};
pub use fonts::FontSet;
pub use print::{PrintAuthority, PrintSpec};
pub use validation::{ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity};
pub use hashing::sha256_hex;
pub use pipeline::{render_poster, render_report, load_report_data, GeneratedFile, PipelineError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
