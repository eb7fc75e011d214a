//! Print Authority System
//!
//! Records where the output resolution came from, so the poster pipeline
//! never has to guess whether a DPI value was vetted.

use serde::{Deserialize, Serialize};

pub const DEFAULT_DPI: u32 = 300;
pub const MIN_DPI: u32 = 72;
pub const MAX_DPI: u32 = 1200;

/// PrintAuthority determines where print specifications come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PrintAuthority {
    /// Built-in defaults
    #[default]
    System,
    /// User-provided overrides (with validation)
    User,
}

/// Resolution metadata written into the output image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSpec {
    pub authority: PrintAuthority,
    pub dpi: u32,
}

impl Default for PrintSpec {
    fn default() -> Self {
        Self {
            authority: PrintAuthority::System,
            dpi: DEFAULT_DPI,
        }
    }
}

impl PrintSpec {
    /// Create from user with validation
    pub fn from_user(dpi: u32) -> Result<Self, String> {
        if !(MIN_DPI..=MAX_DPI).contains(&dpi) {
            return Err(format!("DPI must be between {} and {}", MIN_DPI, MAX_DPI));
        }
        Ok(Self {
            authority: PrintAuthority::User,
            dpi,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_system_300() {
        let spec = PrintSpec::default();
        assert_eq!(spec.authority, PrintAuthority::System);
        assert_eq!(spec.dpi, 300);
    }

    #[test]
    fn test_user_bounds() {
        assert!(PrintSpec::from_user(71).is_err());
        assert!(PrintSpec::from_user(1201).is_err());
        let spec = PrintSpec::from_user(600).unwrap();
        assert_eq!(spec.authority, PrintAuthority::User);
        assert_eq!(spec.dpi, 600);
    }
}
