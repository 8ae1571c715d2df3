//! Generator configuration file
//!
//! An optional TOML file overrides the grid, layout and text constants.
//! Every key has a default, so an empty file is a valid configuration.
//!
//! ```toml
//! [grid]
//! pitch_mm = 2.54
//!
//! [layout]
//! max_side_anchors = 200
//!
//! [text]
//! gap_big = 3.0
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::layout::LayoutConfig;
use crate::renderer::KicadConfig;

/// Errors that can occur when loading or parsing a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse configuration TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSection {
    pub pitch_mm: f64,
}

impl Default for GridSection {
    fn default() -> Self {
        Self { pitch_mm: 2.54 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutSection {
    pub max_side_anchors: usize,
}

impl Default for LayoutSection {
    fn default() -> Self {
        Self {
            max_side_anchors: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BodySection {
    pub line_width_mil: f64,
}

impl Default for BodySection {
    fn default() -> Self {
        Self {
            line_width_mil: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TextSection {
    pub hidden_gap: f64,
    pub gap: f64,
    pub gap_big: f64,
    pub gap_very_big: f64,
    pub big_pin_count: usize,
    pub very_big_pin_count: usize,
}

impl Default for TextSection {
    fn default() -> Self {
        Self {
            hidden_gap: 1.0,
            gap: 0.5,
            gap_big: 2.5,
            gap_very_big: 5.5,
            big_pin_count: 5,
            very_big_pin_count: 15,
        }
    }
}

/// Contents of a configuration file
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    pub grid: GridSection,
    pub layout: LayoutSection,
    pub body: BodySection,
    pub text: TextSection,
}

impl GeneratorConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig::new().with_max_side_anchors(self.layout.max_side_anchors)
    }

    pub fn kicad_config(&self) -> KicadConfig {
        KicadConfig::new()
            .with_grid(self.grid.pitch_mm)
            .with_body_line_width(self.body.line_width_mil)
            .with_hidden_text_gap(self.text.hidden_gap)
            .with_text_gaps(self.text.gap, self.text.gap_big, self.text.gap_very_big)
            .with_pin_count_thresholds(self.text.big_pin_count, self.text.very_big_pin_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = GeneratorConfig::from_str("").expect("Should parse");
        assert_eq!(config, GeneratorConfig::default());
        let kicad = config.kicad_config();
        assert_eq!(kicad.grid_mm, 2.54);
        assert_eq!(kicad.text_gap_for(16), 5.5);
        assert_eq!(config.layout_config().max_side_anchors, 200);
    }

    #[test]
    fn test_partial_sections() {
        let toml_str = r#"
[grid]
pitch_mm = 1.27

[text]
gap_big = 3.0
big_pin_count = 8
"#;
        let config = GeneratorConfig::from_str(toml_str).expect("Should parse");
        assert_eq!(config.grid.pitch_mm, 1.27);
        assert_eq!(config.text.gap_big, 3.0);
        assert_eq!(config.text.gap, 0.5);
        let kicad = config.kicad_config();
        assert_eq!(kicad.text_gap_for(8), 0.5);
        assert_eq!(kicad.text_gap_for(9), 3.0);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result = GeneratorConfig::from_str("[grid]\npitch = 2.0\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_invalid_toml_error() {
        let invalid = "this is not valid toml {{{{";
        assert!(GeneratorConfig::from_str(invalid).is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = GeneratorConfig::from_file(Path::new("/nonexistent/symgen.toml"));
        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
