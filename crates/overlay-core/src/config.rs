//! TOML configuration for the overlay engine
//!
//! ```toml
//! [placement]
//! convention = "absolute_bottom_origin"
//! min_width = 50.0
//! min_height = 20.0
//!
//! [display]
//! categories = ["dimension", "annotation"]
//! initial_mode = "visible"
//! ```

use crate::coords::CoordinateConvention;
use crate::error::OverlayError;
use crate::render::OverlayDisplayMode;
use crate::selector::CategorySet;
use crate::transform::{MinimumSize, Transformer, MIN_VISIBLE_HEIGHT, MIN_VISIBLE_WIDTH};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default)]
    pub placement: PlacementConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// How boxes in the payload are expressed
    #[serde(default)]
    pub convention: CoordinateConvention,

    /// Minimum overlay width in pixels
    #[serde(default = "default_min_width")]
    pub min_width: f64,

    /// Minimum overlay height in pixels
    #[serde(default = "default_min_height")]
    pub min_height: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Categories drawn on the page
    #[serde(default)]
    pub categories: CategorySet,

    #[serde(default)]
    pub initial_mode: OverlayDisplayMode,
}

fn default_min_width() -> f64 {
    MIN_VISIBLE_WIDTH
}

fn default_min_height() -> f64 {
    MIN_VISIBLE_HEIGHT
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            convention: CoordinateConvention::default(),
            min_width: default_min_width(),
            min_height: default_min_height(),
        }
    }
}

impl OverlayConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: OverlayConfig =
            toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), OverlayError> {
        let PlacementConfig {
            min_width,
            min_height,
            ..
        } = self.placement;
        if !(min_width.is_finite() && min_width > 0.0) {
            return Err(OverlayError::Config(format!(
                "min_width must be positive, got {}",
                min_width
            )));
        }
        if !(min_height.is_finite() && min_height > 0.0) {
            return Err(OverlayError::Config(format!(
                "min_height must be positive, got {}",
                min_height
            )));
        }
        Ok(())
    }

    pub fn minimum_size(&self) -> MinimumSize {
        MinimumSize {
            width: self.placement.min_width,
            height: self.placement.min_height,
        }
    }

    /// Transformer for this configuration, reporting to `tracing`
    pub fn transformer(&self) -> Transformer {
        Transformer::new(self.placement.convention).with_minimum_size(self.minimum_size())
    }

    pub fn with_convention(mut self, convention: CoordinateConvention) -> Self {
        self.placement.convention = convention;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementCategory;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = OverlayConfig::from_toml_str("").unwrap();
        assert_eq!(config, OverlayConfig::default());
        assert_eq!(config.placement.convention, CoordinateConvention::Normalized);
        assert_eq!(config.minimum_size(), MinimumSize::default());
        assert_eq!(config.display.categories, CategorySet::all());
        assert_eq!(config.display.initial_mode, OverlayDisplayMode::Visible);
    }

    #[test]
    fn test_full_config() {
        let config = OverlayConfig::from_toml_str(
            r#"
            [placement]
            convention = "absolute_bottom_origin"
            min_width = 40.0
            min_height = 16.0

            [display]
            categories = ["dimension", "title_block"]
            initial_mode = "hidden"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.placement.convention,
            CoordinateConvention::AbsoluteBottomOrigin
        );
        assert_eq!(
            config.minimum_size(),
            MinimumSize {
                width: 40.0,
                height: 16.0
            }
        );
        assert!(config.display.categories.contains(ElementCategory::TitleBlock));
        assert!(!config.display.categories.contains(ElementCategory::Annotation));
        assert_eq!(config.display.initial_mode, OverlayDisplayMode::Hidden);

        let transformer = config.transformer();
        assert_eq!(
            transformer.convention(),
            CoordinateConvention::AbsoluteBottomOrigin
        );
        assert_eq!(transformer.minimum_size().width, 40.0);
    }

    #[test]
    fn test_partial_placement_keeps_other_defaults() {
        let config = OverlayConfig::from_toml_str("[placement]\nmin_width = 64.0\n").unwrap();
        assert_eq!(config.placement.min_width, 64.0);
        assert_eq!(config.placement.min_height, MIN_VISIBLE_HEIGHT);
    }

    #[test]
    fn test_rejects_non_positive_minimum() {
        let err = OverlayConfig::from_toml_str("[placement]\nmin_width = 0.0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("min_width"));

        let err = OverlayConfig::from_toml_str("[placement]\nmin_height = -5.0\n").unwrap_err();
        assert!(format!("{:#}", err).contains("min_height"));
    }

    #[test]
    fn test_rejects_unknown_convention() {
        assert!(OverlayConfig::from_toml_str("[placement]\nconvention = \"polar\"\n").is_err());
    }

    #[test]
    fn test_from_file_missing() {
        let err = OverlayConfig::from_file(Path::new("/nonexistent/overlay.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_from_file_roundtrip() {
        let path = std::env::temp_dir().join(format!("overlay-config-{}.toml", std::process::id()));
        let config = OverlayConfig::default()
            .with_convention(CoordinateConvention::AbsoluteBottomOrigin);
        std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

        let loaded = OverlayConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
