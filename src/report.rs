//! Research Report Content
//!
//! Turns the JSON record (question, answer, search results, conclusion)
//! into a story of styled blocks: header, analysis, sources, conclusion.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::layout::Story;
use crate::styles::{Stylesheet, INCH};

pub const DEFAULT_OUTPUT: &str = "research_report.pdf";
/// Only this many search results make it into the report
pub const MAX_SEARCH_RESULTS: usize = 10;

pub const ANSWER_HEADING: &str = "Claude AI Analysis";
pub const RESULTS_HEADING: &str = "Top Search Results";
pub const CONCLUSION_HEADING: &str = "Conclusion";

const SECTION_WIDTH: f32 = 7.0 * INCH;
const BADGE_WIDTH: f32 = 0.5 * INCH;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_description")]
    pub description: String,
}

fn default_title() -> String { "No title".to_string() }
fn default_url() -> String { "#".to_string() }
fn default_description() -> String { "No description available".to_string() }

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub question: String,
    pub claude_answer: String,
    pub search_results: Vec<SearchResult>,
    pub conclusion: String,
    #[serde(default)]
    pub output_path: Option<String>,
}

impl ReportData {
    pub fn output_path(&self) -> &str {
        self.output_path.as_deref().unwrap_or(DEFAULT_OUTPUT)
    }

    /// Example record shown in the CLI usage text
    pub fn example() -> Self {
        Self {
            question: "Your research question".to_string(),
            claude_answer: "Claude's detailed answer".to_string(),
            search_results: vec![SearchResult {
                title: "Result title".to_string(),
                url: "https://...".to_string(),
                description: "Brief description".to_string(),
            }],
            conclusion: "Final summary and conclusion".to_string(),
            output_path: Some("path/to/output.pdf".to_string()),
        }
    }
}

/// Non-blank chunks separated by blank lines, trimmed
pub fn split_paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split("\n\n").map(str::trim).filter(|p| !p.is_empty())
}

pub fn generated_on(now: DateTime<Local>) -> String {
    format!("Generated on {}", now.format("%B %d, %Y at %H:%M"))
}

/// Assembles the report story section by section
pub struct ReportBuilder<'a> {
    styles: &'a Stylesheet,
    story: Story,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(styles: &'a Stylesheet) -> Self {
        Self { styles, story: Story::new() }
    }

    pub fn build(data: &ReportData, styles: &'a Stylesheet, now: DateTime<Local>) -> Story {
        let mut builder = Self::new(styles);
        builder.add_header(&data.question, now);
        builder.add_answer(&data.claude_answer);
        builder.add_search_results(&data.search_results);
        builder.add_conclusion(&data.conclusion);
        builder.finish()
    }

    pub fn add_header(&mut self, question: &str, now: DateTime<Local>) {
        self.story.paragraph(generated_on(now), &self.styles.metadata);
        self.story.spacer(0.1 * INCH);
        self.story.paragraph(question, &self.styles.question_title);
        self.story.table("", SECTION_WIDTH, &self.styles.divider);
        self.story.spacer(0.2 * INCH);
    }

    pub fn add_answer(&mut self, answer: &str) {
        self.section_banner(ANSWER_HEADING);
        self.add_paragraphs(answer);
        self.story.spacer(0.3 * INCH);
    }

    /// Numbered source cards for the first [`MAX_SEARCH_RESULTS`] results
    pub fn add_search_results(&mut self, results: &[SearchResult]) {
        self.section_banner(RESULTS_HEADING);

        for (i, result) in results.iter().take(MAX_SEARCH_RESULTS).enumerate() {
            self.story.table(format!("#{}", i + 1), BADGE_WIDTH, &self.styles.badge);
            self.story.spacer(0.05 * INCH);
            self.story.paragraph(&result.title, &self.styles.body_bold);
            self.story.link(&result.url, &result.url, &self.styles.link);
            self.story.paragraph(&result.description, &self.styles.source_desc);
            self.story.spacer(0.15 * INCH);
        }
    }

    pub fn add_conclusion(&mut self, conclusion: &str) {
        self.section_banner(CONCLUSION_HEADING);
        self.add_paragraphs(conclusion);
    }

    pub fn finish(self) -> Story {
        self.story
    }

    fn section_banner(&mut self, heading: &str) {
        self.story.table(heading, SECTION_WIDTH, &self.styles.banner);
        self.story.spacer(0.15 * INCH);
    }

    fn add_paragraphs(&mut self, text: &str) {
        for para in split_paragraphs(text) {
            self.story.paragraph(para, &self.styles.body);
        }
    }
}
