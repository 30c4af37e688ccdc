#![forbid(unsafe_code)]

//! Page configuration as data.
//!
//! [`PageConfig`] groups every tunable of the page layer into one struct that
//! can be loaded from TOML or JSON. Every field has a default matching the
//! behavior of the published site, so `PageConfig::default()` needs no file.
//!
//! ```toml
//! [viewport]
//! mobile_threshold = 768.0
//!
//! [countdown]
//! target = "2025-10-25T12:00:00+08:00"
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::countdown::{CountdownConfig, parse_target};
use crate::fade_in::FadeInConfig;
use crate::gallery::GalleryConfig;
use crate::gesture::GestureConfig;
use crate::scroll_effects::ScrollConfig;

/// Viewport width at or below which scroll-driven effects fall back to
/// static layout.
pub const DEFAULT_MOBILE_THRESHOLD: f64 = 768.0;

/// Top-level configuration for the page layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub viewport: ViewportConfig,
    pub scroll: ScrollConfig,
    pub gesture: GestureConfig,
    pub gallery: GalleryConfig,
    pub countdown: CountdownConfig,
    pub fade_in: FadeInConfig,
}

/// Responsive cutoff shared by the scroll track and the parallax effects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub mobile_threshold: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            mobile_threshold: DEFAULT_MOBILE_THRESHOLD,
        }
    }
}

/// Configuration loading or validation failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {}", errors.join("; "))]
    Invalid { errors: Vec<String> },
}

impl PageConfig {
    /// Load from a TOML string and validate.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validated()
    }

    /// Load from a JSON string and validate.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validated()
    }

    /// Return `self` if [`validate`](Self::validate) reports nothing.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid { errors })
        }
    }

    /// Check every parameter against its acceptable range.
    ///
    /// An empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !(self.viewport.mobile_threshold.is_finite() && self.viewport.mobile_threshold > 0.0) {
            errors.push(format!(
                "viewport.mobile_threshold must be > 0, got {}",
                self.viewport.mobile_threshold
            ));
        }

        if !(self.scroll.navbar_threshold.is_finite() && self.scroll.navbar_threshold >= 0.0) {
            errors.push(format!(
                "scroll.navbar_threshold must be >= 0, got {}",
                self.scroll.navbar_threshold
            ));
        }
        for (name, factor) in [
            ("scroll.hero_parallax", self.scroll.hero_parallax),
            ("scroll.decoration_parallax", self.scroll.decoration_parallax),
        ] {
            if !factor.is_finite() {
                errors.push(format!("{name} must be finite, got {factor}"));
            }
        }

        if !(self.gesture.tap_threshold.is_finite() && self.gesture.tap_threshold > 0.0) {
            errors.push(format!(
                "gesture.tap_threshold must be > 0, got {}",
                self.gesture.tap_threshold
            ));
        }

        let gallery = &self.gallery;
        if gallery.horizontal_pool == 0 {
            errors.push("gallery.horizontal_pool must be > 0".into());
        }
        if gallery.vertical_pool == 0 {
            errors.push("gallery.vertical_pool must be > 0".into());
        }
        if gallery.picks_per_pool > gallery.horizontal_pool.min(gallery.vertical_pool) {
            errors.push(format!(
                "gallery.picks_per_pool ({}) exceeds the smaller pool ({})",
                gallery.picks_per_pool,
                gallery.horizontal_pool.min(gallery.vertical_pool)
            ));
        }

        if self.countdown.interval_ms == 0 {
            errors.push("countdown.interval_ms must be > 0".into());
        }
        if let Err(err) = parse_target(&self.countdown.target) {
            errors.push(format!("countdown.target: {err}"));
        }

        if !(0.0..=1.0).contains(&self.fade_in.threshold) {
            errors.push(format!(
                "fade_in.threshold must be in [0, 1], got {}",
                self.fade_in.threshold
            ));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validates_clean() {
        let errors = PageConfig::default().validate();
        assert!(errors.is_empty(), "default should validate: {errors:?}");
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = PageConfig::from_toml_str("").expect("empty toml");
        assert_eq!(config, PageConfig::default());
    }

    #[test]
    fn empty_json_yields_defaults() {
        let config = PageConfig::from_json_str("{}").expect("empty json");
        assert_eq!(config, PageConfig::default());
    }

    #[test]
    fn partial_toml_overrides_one_field() {
        let config = PageConfig::from_toml_str(
            r#"
            [viewport]
            mobile_threshold = 900.0

            [scroll]
            hero_parallax = 0.25
            "#,
        )
        .expect("partial toml");
        assert_eq!(config.viewport.mobile_threshold, 900.0);
        assert_eq!(config.scroll.hero_parallax, 0.25);
        assert_eq!(config.scroll.navbar_threshold, 50.0);
        assert_eq!(config.gallery, GalleryConfig::default());
    }

    #[test]
    fn validate_catches_zero_mobile_threshold() {
        let mut config = PageConfig::default();
        config.viewport.mobile_threshold = 0.0;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("viewport.mobile_threshold")));
    }

    #[test]
    fn validate_catches_zero_interval() {
        let mut config = PageConfig::default();
        config.countdown.interval_ms = 0;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("countdown.interval_ms")));
    }

    #[test]
    fn validate_catches_oversized_picks() {
        let mut config = PageConfig::default();
        config.gallery.picks_per_pool = 10;
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("gallery.picks_per_pool")));
    }

    #[test]
    fn validate_catches_bad_target() {
        let mut config = PageConfig::default();
        config.countdown.target = "next saturday".into();
        let errors = config.validate();
        assert!(errors.iter().any(|e| e.contains("countdown.target")));
    }

    #[test]
    fn invalid_json_reports_every_error() {
        let err = PageConfig::from_json_str(
            r#"{"viewport":{"mobile_threshold":-1},"gesture":{"tap_threshold":0}}"#,
        )
        .expect_err("should reject");
        match err {
            ConfigError::Invalid { errors } => assert_eq!(errors.len(), 2, "{errors:?}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = PageConfig::from_toml_str("[viewport\nmobile_threshold = ").expect_err("parse");
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
