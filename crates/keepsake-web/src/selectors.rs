#![forbid(unsafe_code)]

//! Role → CSS selector table and the shell's configuration file.
//!
//! The core names elements by [`ElementRole`]; this table is the only place
//! that knows how those roles are spelled in the site's markup. Every
//! selector can be overridden from the `[selectors]` section of the
//! configuration.

use keepsake_core::{ConfigError, ElementRole, PageConfig};
use serde::{Deserialize, Serialize};

/// CSS selectors for every collaborating element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorMap {
    pub body: String,
    pub navbar: String,
    pub hero: String,
    pub parallax_decoration: String,
    pub countdown: String,
    pub countdown_days: String,
    pub countdown_hours: String,
    pub countdown_minutes: String,
    pub countdown_seconds: String,
    pub gallery_container: String,
    pub track_section: String,
    pub track_container: String,
    pub track_strip: String,
    pub lightbox: String,
    pub lightbox_image: String,
    pub lightbox_prev: String,
    pub lightbox_next: String,
    pub lightbox_close: String,
    /// Top-level sections revealed by the fade-in observer (all matches).
    pub sections: String,
    /// In-page anchor links (all matches).
    pub anchor_links: String,
}

impl Default for SelectorMap {
    fn default() -> Self {
        Self {
            body: "body".into(),
            navbar: ".navbar".into(),
            hero: ".hero".into(),
            parallax_decoration: ".hero-decoration".into(),
            countdown: "#countdown".into(),
            countdown_days: "#days".into(),
            countdown_hours: "#hours".into(),
            countdown_minutes: "#minutes".into(),
            countdown_seconds: "#seconds".into(),
            gallery_container: "#gallery-track".into(),
            track_section: ".horizontal-gallery".into(),
            track_container: ".horizontal-gallery-container".into(),
            track_strip: "#gallery-track".into(),
            lightbox: "#lightbox".into(),
            lightbox_image: "#lightbox-img".into(),
            lightbox_prev: ".lightbox-prev".into(),
            lightbox_next: ".lightbox-next".into(),
            lightbox_close: ".lightbox-close".into(),
            sections: "body > section, main > section".into(),
            anchor_links: "a[href^=\"#\"]".into(),
        }
    }
}

impl SelectorMap {
    /// Selector for a single-element role.
    ///
    /// Sections are addressed by index into the `sections` match list, so
    /// they have no selector of their own.
    #[must_use]
    pub fn selector(&self, role: ElementRole) -> Option<&str> {
        let selector = match role {
            ElementRole::Body => &self.body,
            ElementRole::Navbar => &self.navbar,
            ElementRole::Hero => &self.hero,
            ElementRole::ParallaxDecoration => &self.parallax_decoration,
            ElementRole::CountdownRoot => &self.countdown,
            ElementRole::CountdownDays => &self.countdown_days,
            ElementRole::CountdownHours => &self.countdown_hours,
            ElementRole::CountdownMinutes => &self.countdown_minutes,
            ElementRole::CountdownSeconds => &self.countdown_seconds,
            ElementRole::GalleryContainer => &self.gallery_container,
            ElementRole::TrackSection => &self.track_section,
            ElementRole::TrackContainer => &self.track_container,
            ElementRole::TrackStrip => &self.track_strip,
            ElementRole::Lightbox => &self.lightbox,
            ElementRole::LightboxImage => &self.lightbox_image,
            ElementRole::LightboxPrev => &self.lightbox_prev,
            ElementRole::LightboxNext => &self.lightbox_next,
            ElementRole::LightboxClose => &self.lightbox_close,
            ElementRole::Section(_) => return None,
        };
        Some(selector.as_str())
    }

    /// Selector matching the rendered gallery images.
    #[must_use]
    pub fn gallery_images(&self) -> String {
        format!("{} img[data-index]", self.gallery_container)
    }

    fn entries(&self) -> [(&'static str, &str); 20] {
        [
            ("body", &self.body),
            ("navbar", &self.navbar),
            ("hero", &self.hero),
            ("parallax_decoration", &self.parallax_decoration),
            ("countdown", &self.countdown),
            ("countdown_days", &self.countdown_days),
            ("countdown_hours", &self.countdown_hours),
            ("countdown_minutes", &self.countdown_minutes),
            ("countdown_seconds", &self.countdown_seconds),
            ("gallery_container", &self.gallery_container),
            ("track_section", &self.track_section),
            ("track_container", &self.track_container),
            ("track_strip", &self.track_strip),
            ("lightbox", &self.lightbox),
            ("lightbox_image", &self.lightbox_image),
            ("lightbox_prev", &self.lightbox_prev),
            ("lightbox_next", &self.lightbox_next),
            ("lightbox_close", &self.lightbox_close),
            ("sections", &self.sections),
            ("anchor_links", &self.anchor_links),
        ]
    }

    /// Every selector must be non-blank.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(_, selector)| selector.trim().is_empty())
            .map(|(name, _)| format!("selectors.{name} must not be empty"))
            .collect()
    }
}

/// Page configuration plus the selector table.
///
/// ```json
/// { "countdown": { "target": "2025-10-25T12:00:00+08:00" },
///   "selectors": { "navbar": "#top-nav" } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    #[serde(flatten)]
    pub page: PageConfig,
    pub selectors: SelectorMap,
}

impl WebConfig {
    /// Load from a JSON string and validate both halves.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        let mut errors = config.page.validate();
        errors.extend(config.selectors.validate());
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid { errors })
        }
    }
}
