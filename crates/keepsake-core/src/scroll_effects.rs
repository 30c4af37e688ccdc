#![forbid(unsafe_code)]

//! Frame-coalesced scroll effects.
//!
//! Browsers can deliver many scroll events per frame. [`ScrollEffects`] keeps
//! a single "ticking" guard ([`FrameGate`]): the first scroll event of a
//! frame requests an animation frame, later ones are dropped, and the frame
//! callback runs the navbar, parallax, and track updates exactly once before
//! clearing the guard.

use serde::{Deserialize, Serialize};

use crate::command::{CLASS_SCROLLED, CommandQueue, ElementRole, PageCommand, StyleProperty, px};
use crate::metrics::{LayoutMetricsProvider, ViewportSample};
use crate::track::HorizontalScrollTrack;

const LOG_TARGET: &str = "keepsake.scroll";

/// Neutral background position for the decoration on narrow viewports.
const CENTERED: &str = "center center";

/// Thresholds and parallax factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Scroll offset beyond which the navbar gets the `scrolled` class
    /// (default: 50).
    pub navbar_threshold: f64,
    /// Hero background offset per scrolled pixel (default: 0.5).
    pub hero_parallax: f64,
    /// Decoration background offset per scrolled pixel, above the mobile
    /// threshold only (default: 0.3).
    pub decoration_parallax: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            navbar_threshold: 50.0,
            hero_parallax: 0.5,
            decoration_parallax: 0.3,
        }
    }
}

/// One-frame scheduling guard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameGate {
    ticking: bool,
}

impl FrameGate {
    /// Returns `true` if the caller should schedule a frame now.
    pub fn request(&mut self) -> bool {
        if self.ticking {
            return false;
        }
        self.ticking = true;
        true
    }

    /// Clear the guard once the scheduled update has run.
    pub fn complete(&mut self) {
        self.ticking = false;
    }

    #[must_use]
    pub const fn is_ticking(&self) -> bool {
        self.ticking
    }
}

/// Scroll-effects dispatcher.
#[derive(Debug, Clone)]
pub struct ScrollEffects {
    config: ScrollConfig,
    mobile_threshold: f64,
    gate: FrameGate,
    navbar_scrolled: Option<bool>,
    frames: u64,
}

impl ScrollEffects {
    #[must_use]
    pub fn new(config: ScrollConfig, mobile_threshold: f64) -> Self {
        Self {
            config,
            mobile_threshold,
            gate: FrameGate::default(),
            navbar_scrolled: None,
            frames: 0,
        }
    }

    /// Raw scroll event: schedule at most one frame.
    pub fn on_scroll(&mut self, out: &mut CommandQueue) {
        if self.gate.request() {
            out.push(PageCommand::RequestAnimationFrame);
        }
    }

    /// Scheduled frame: run every effect once, then clear the guard.
    pub fn on_animation_frame(
        &mut self,
        host: &dyn LayoutMetricsProvider,
        track: &mut HorizontalScrollTrack,
        out: &mut CommandQueue,
    ) {
        self.apply(host, track, out);
        self.gate.complete();
    }

    /// Apply every effect for the current scroll position.
    pub fn apply(
        &mut self,
        host: &dyn LayoutMetricsProvider,
        track: &mut HorizontalScrollTrack,
        out: &mut CommandQueue,
    ) {
        let viewport = ViewportSample::read(host);
        let scroll_y = viewport.scroll_y;
        self.frames += 1;

        if host.element_exists(ElementRole::Navbar) {
            let scrolled = scroll_y > self.config.navbar_threshold;
            if self.navbar_scrolled != Some(scrolled) {
                self.navbar_scrolled = Some(scrolled);
                out.set_class(ElementRole::Navbar, CLASS_SCROLLED, scrolled);
                tracing::trace!(target: LOG_TARGET, scrolled, "navbar state changed");
            }
        }

        if host.element_exists(ElementRole::Hero) {
            out.set_style(
                ElementRole::Hero,
                StyleProperty::BackgroundPosition,
                format!("center {}", px(scroll_y * self.config.hero_parallax)),
            );
        }

        if host.element_exists(ElementRole::ParallaxDecoration) {
            let position = if viewport.is_mobile(self.mobile_threshold) {
                CENTERED.to_string()
            } else {
                format!("center {}", px(scroll_y * self.config.decoration_parallax))
            };
            out.set_style(
                ElementRole::ParallaxDecoration,
                StyleProperty::BackgroundPosition,
                position,
            );
        }

        track.update(scroll_y, host, out);
    }

    #[must_use]
    pub const fn gate(&self) -> FrameGate {
        self.gate
    }

    /// Effect passes run so far.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}
