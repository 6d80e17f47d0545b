//! Size filter and preprocessing configuration.
//!
//! All size limits are percentages. They are turned into pixel values once per
//! scan by [`FilterThresholds::for_image`]: area limits scale with the image
//! area, side limits with the image height.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ExtractError, Result};

/// Default binarization intensity
pub const DEFAULT_THRESHOLD: u8 = 200;

/// Which side of the threshold counts as photo material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Photos darker than the scanner lid (the usual flatbed case)
    #[default]
    DarkForeground,
    /// Photos lighter than a dark background
    LightForeground,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Regions below this share of the image area are dropped as noise
    pub tiny_area_percent: f64,
    /// Regions with a short side below this share of the image height are dropped as noise
    pub tiny_min_side_percent: f64,
    /// Regions below this share of the image area are flagged and not extracted
    pub small_area_percent: f64,
    /// Regions with a short side below this share of the image height are flagged and not extracted
    pub small_min_side_percent: f64,
    /// Outline thickness on the debug canvas, as a share of the image height
    pub highlight_thickness_percent: f64,
    /// Gaussian kernel width in pixels (odd)
    pub blur_kernel: u32,
    pub polarity: Polarity,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            tiny_area_percent: 1.0,
            tiny_min_side_percent: 1.0,
            small_area_percent: 5.0,
            small_min_side_percent: 5.0,
            highlight_thickness_percent: 1.0,
            blur_kernel: 25,
            polarity: Polarity::DarkForeground,
        }
    }
}

impl ThresholdConfig {
    /// Load a configuration from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExtractError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            ExtractError::config(format!("cannot parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let percents = [
            ("tiny_area_percent", self.tiny_area_percent),
            ("tiny_min_side_percent", self.tiny_min_side_percent),
            ("small_area_percent", self.small_area_percent),
            ("small_min_side_percent", self.small_min_side_percent),
            ("highlight_thickness_percent", self.highlight_thickness_percent),
        ];
        for (name, value) in percents {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(ExtractError::config(format!(
                    "{} must be within 0..=100, got {}",
                    name, value
                )));
            }
        }

        // The tiny filter must be a strict subset of the small filter
        if self.tiny_area_percent > self.small_area_percent {
            return Err(ExtractError::config(format!(
                "tiny_area_percent ({}) exceeds small_area_percent ({})",
                self.tiny_area_percent, self.small_area_percent
            )));
        }
        if self.tiny_min_side_percent > self.small_min_side_percent {
            return Err(ExtractError::config(format!(
                "tiny_min_side_percent ({}) exceeds small_min_side_percent ({})",
                self.tiny_min_side_percent, self.small_min_side_percent
            )));
        }

        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(ExtractError::config(format!(
                "blur_kernel must be a positive odd number, got {}",
                self.blur_kernel
            )));
        }

        Ok(())
    }

    /// Gaussian sigma matching a kernel width when no sigma is given explicitly
    pub fn blur_sigma(&self) -> f32 {
        0.3 * ((self.blur_kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }
}

/// Pixel-space filter limits for one scan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterThresholds {
    pub tiny_area: f64,
    pub tiny_min_side: f64,
    pub small_area: f64,
    pub small_min_side: f64,
    /// Outline thickness in pixels; zero disables outlines
    pub highlight_thickness: u32,
}

impl FilterThresholds {
    pub fn for_image(config: &ThresholdConfig, width: u32, height: u32) -> Self {
        let area = width as f64 * height as f64;
        let height = height as f64;

        Self {
            tiny_area: area * config.tiny_area_percent / 100.0,
            tiny_min_side: height * config.tiny_min_side_percent / 100.0,
            small_area: area * config.small_area_percent / 100.0,
            small_min_side: height * config.small_min_side_percent / 100.0,
            highlight_thickness: (height * config.highlight_thickness_percent / 100.0).round()
                as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_scale_with_image() {
        let t = FilterThresholds::for_image(&ThresholdConfig::default(), 200, 100);
        assert_eq!(t.tiny_area, 200.0);
        assert_eq!(t.small_area, 1000.0);
        assert_eq!(t.tiny_min_side, 1.0);
        assert_eq!(t.small_min_side, 5.0);
        assert_eq!(t.highlight_thickness, 1);
    }

    #[test]
    fn tiny_above_small_is_rejected() {
        let config = ThresholdConfig {
            tiny_area_percent: 6.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ExtractError::Config { .. })));
    }

    #[test]
    fn even_kernel_is_rejected() {
        let config = ThresholdConfig {
            blur_kernel: 24,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_kernel_sigma() {
        let sigma = ThresholdConfig::default().blur_sigma();
        assert!((sigma - 4.1).abs() < 1e-4);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let config: ThresholdConfig =
            serde_json::from_str(r#"{ "small_area_percent": 3.0, "polarity": "light_foreground" }"#)
                .unwrap();
        assert_eq!(config.small_area_percent, 3.0);
        assert_eq!(config.tiny_area_percent, 1.0);
        assert_eq!(config.polarity, Polarity::LightForeground);
        assert!(config.validate().is_ok());
    }
}
