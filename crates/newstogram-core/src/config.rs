//! Engine configuration.

use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunables of the transform engine.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Floor for both axes while resizing, in pixels.
    pub min_size: f64,
    /// Gap between an element's edge and its handles.
    pub handle_margin: f64,
    pub handle_size: Size,
    /// Width given to new elements.
    pub default_width: f64,
    /// Height of the auto-inserted title caption.
    pub caption_height: f64,
    /// Height of new text elements.
    pub text_height: f64,
    /// Height of new images whose natural size is unknown.
    pub image_height: f64,
    /// Upscale factor handed to the rasterizer.
    pub export_scale: f64,
    /// Base URL of the scraping backend.
    pub endpoint: String,
    /// Target language for scraped content.
    pub language: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_size: 30.0,
            handle_margin: 5.0,
            handle_size: Size::new(20.0, 20.0),
            default_width: 400.0,
            caption_height: 150.0,
            text_height: 120.0,
            image_height: 300.0,
            export_scale: 2.0,
            endpoint: "http://localhost:3000".to_string(),
            language: "id".to_string(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("min_size", self.min_size),
            ("default_width", self.default_width),
            ("caption_height", self.caption_height),
            ("text_height", self.text_height),
            ("image_height", self.image_height),
            ("export_scale", self.export_scale),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a positive number, got {value}"),
                });
            }
        }
        let sizes = [
            ("default_width", self.default_width),
            ("caption_height", self.caption_height),
            ("text_height", self.text_height),
            ("image_height", self.image_height),
        ];
        for (field, value) in sizes {
            if value < self.min_size {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("{value} is below min_size {}", self.min_size),
                });
            }
        }
        let handle = self.handle_size;
        if !(handle.width.is_finite() && handle.height.is_finite() && handle.width > 0.0 && handle.height > 0.0) {
            return Err(ConfigError::Invalid {
                field: "handle_size",
                reason: format!("expected a positive size, got {}x{}", handle.width, handle.height),
            });
        }
        if !(self.handle_margin.is_finite() && self.handle_margin >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "handle_margin",
                reason: format!("expected a non-negative number, got {}", self.handle_margin),
            });
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "endpoint",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
