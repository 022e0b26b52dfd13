//! Host configuration loaded from JSON.

use crate::error::AppResult;
use peniko::Color;
use plotview_core::PointerConfig;
use plotview_core::svg::parse_css_color;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Application configuration. Every field is optional in the JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Keep the plot's aspect ratio when fitting it into a container.
    pub preserve_aspect_ratio: bool,
    /// Pixels per logical unit in exported images.
    pub export_scale: f64,
    /// CSS color overriding the plot's own background.
    pub background: Option<String>,
    pub pointer: PointerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            preserve_aspect_ratio: true,
            export_scale: 1.0,
            background: None,
            pointer: PointerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read a config file, or the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parsed background override. Unparsable colors are ignored.
    pub fn background_color(&self) -> Option<Color> {
        let css = self.background.as_deref()?;
        let color = parse_css_color(css);
        if color.is_none() {
            log::warn!("Ignoring invalid background color `{}`", css);
        }
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = AppConfig::from_json(r#"{ "export_scale": 2.0 }"#).unwrap();
        assert!(config.preserve_aspect_ratio);
        assert!((config.export_scale - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.pointer.double_click_interval_ms, 300);
        assert!(config.background.is_none());
    }

    #[test]
    fn test_pointer_section() {
        let config =
            AppConfig::from_json(r#"{ "pointer": { "double_click_interval_ms": 500 } }"#).unwrap();
        assert_eq!(config.pointer.double_click_interval_ms, 500);
    }

    #[test]
    fn test_background_color() {
        let mut config = AppConfig::default();
        assert!(config.background_color().is_none());
        config.background = Some("#00ff00".to_string());
        assert_eq!(
            config.background_color().unwrap().to_rgba8(),
            Color::from_rgba8(0, 255, 0, 255).to_rgba8()
        );
        config.background = Some("not a color".to_string());
        assert!(config.background_color().is_none());
    }

    #[test]
    fn test_load_without_path() {
        assert_eq!(AppConfig::load(None).unwrap(), AppConfig::default());
    }
}
