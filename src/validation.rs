//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! Policy: any error blocks rendering, warnings only get logged.

use serde::{Deserialize, Serialize};

use crate::poster::PosterConfig;

/// Aspect ratio the poster is labelled with
pub const POSTER_ASPECT: [u32; 2] = [4, 3];
pub const ASPECT_TOLERANCE: f64 = 0.01;
pub const MIN_POSTER_WIDTH: u32 = 400;
pub const MIN_POSTER_HEIGHT: u32 = 300;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn has_errors(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationViolation> {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Warning)
    }

    /// `rule: message` for every error, joined for an error report
    pub fn error_summary(&self) -> String {
        self.violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
            .map(|v| format!("{}: {}", v.rule, v.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, config: &PosterConfig) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct AspectRatioRule;

impl ValidationRule for AspectRatioRule {
    fn name(&self) -> &'static str { "aspect_ratio" }

    fn validate(&self, config: &PosterConfig) -> Vec<ValidationViolation> {
        let expected = POSTER_ASPECT[0] as f64 / POSTER_ASPECT[1] as f64;
        let actual = config.width as f64 / config.height.max(1) as f64;

        if (expected - actual).abs() > ASPECT_TOLERANCE {
            vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Warning,
                message: "Canvas does not match the 4:3 poster label".to_string(),
                expected: Some(format!("{}:{}", POSTER_ASPECT[0], POSTER_ASPECT[1])),
                actual: Some(format!("{:.3}", actual)),
                remediation: vec!["Use a 4:3 canvas such as 1600x1200".to_string()],
            }]
        } else {
            vec![]
        }
    }
}

pub struct ResolutionRule;

impl ValidationRule for ResolutionRule {
    fn name(&self) -> &'static str { "resolution" }

    fn validate(&self, config: &PosterConfig) -> Vec<ValidationViolation> {
        if config.width < MIN_POSTER_WIDTH || config.height < MIN_POSTER_HEIGHT {
            vec![ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: "Canvas too small for the poster layout".to_string(),
                expected: Some(format!("{}x{} minimum", MIN_POSTER_WIDTH, MIN_POSTER_HEIGHT)),
                actual: Some(format!("{}x{}", config.width, config.height)),
                remediation: vec!["Increase the canvas size".to_string()],
            }]
        } else {
            vec![]
        }
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![Box::new(AspectRatioRule), Box::new(ResolutionRule)],
        }
    }

    pub fn validate(&self, config: &PosterConfig) -> ValidationResult {
        let violations: Vec<_> = self
            .rules
            .iter()
            .flat_map(|rule| rule.validate(config))
            .collect();

        let valid = !violations.iter().any(|v| v.severity == ViolationSeverity::Error);
        ValidationResult { valid, violations }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
