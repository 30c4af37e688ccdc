#![forbid(unsafe_code)]

//! Viewport and layout sampling.
//!
//! The core reads layout through [`LayoutMetricsProvider`] instead of a live
//! document, so every component can be driven by scripted metrics in tests
//! and by `web-sys` reads in the browser.

use std::collections::{HashMap, HashSet};

use crate::command::ElementRole;

/// Read-only access to the host's layout and viewport state.
///
/// All lengths are CSS pixels. Implementations should return `0.0` for
/// elements that do not exist.
pub trait LayoutMetricsProvider {
    /// Current viewport (window inner) width.
    fn viewport_width(&self) -> f64;

    /// Current vertical scroll offset of the document.
    fn scroll_y(&self) -> f64;

    /// Whether an element with this role is present in the document.
    fn element_exists(&self, role: ElementRole) -> bool;

    /// Intrinsic content width (`scrollWidth`).
    fn scroll_width(&self, role: ElementRole) -> f64;

    /// Visible width (`clientWidth`).
    fn client_width(&self, role: ElementRole) -> f64;

    /// Distance from the document top (`offsetTop`).
    fn offset_top(&self, role: ElementRole) -> f64;

    /// Number of top-level page sections.
    fn section_count(&self) -> usize;

    /// Whether an element with this id exists (anchor navigation targets).
    fn has_anchor_target(&self, id: &str) -> bool;
}

/// One on-demand reading of the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSample {
    pub width: f64,
    pub scroll_y: f64,
}

impl ViewportSample {
    /// Sample the host now. Non-finite readings collapse to zero.
    #[must_use]
    pub fn read(host: &dyn LayoutMetricsProvider) -> Self {
        Self {
            width: finite_or_zero(host.viewport_width()),
            scroll_y: finite_or_zero(host.scroll_y()),
        }
    }

    /// Whether the viewport is at or below the mobile threshold.
    #[must_use]
    pub fn is_mobile(&self, mobile_threshold: f64) -> bool {
        self.width <= mobile_threshold
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Fixed-metrics provider for headless hosts and tests.
///
/// Every reading is whatever was last set; nothing reflows.
#[derive(Debug, Clone, Default)]
pub struct StaticLayout {
    viewport_width: f64,
    scroll_y: f64,
    present: HashSet<ElementRole>,
    widths: HashMap<ElementRole, (f64, f64)>,
    offsets: HashMap<ElementRole, f64>,
    sections: usize,
    anchors: HashSet<String>,
}

impl StaticLayout {
    #[must_use]
    pub fn new(viewport_width: f64) -> Self {
        Self {
            viewport_width,
            ..Self::default()
        }
    }

    /// A desktop-width page with every collaborating element present.
    #[must_use]
    pub fn full_page(viewport_width: f64) -> Self {
        let mut layout = Self::new(viewport_width);
        for role in [
            ElementRole::Body,
            ElementRole::Navbar,
            ElementRole::Hero,
            ElementRole::ParallaxDecoration,
            ElementRole::CountdownRoot,
            ElementRole::CountdownDays,
            ElementRole::CountdownHours,
            ElementRole::CountdownMinutes,
            ElementRole::CountdownSeconds,
            ElementRole::GalleryContainer,
            ElementRole::TrackSection,
            ElementRole::TrackContainer,
            ElementRole::TrackStrip,
            ElementRole::Lightbox,
            ElementRole::LightboxImage,
            ElementRole::LightboxPrev,
            ElementRole::LightboxNext,
            ElementRole::LightboxClose,
        ] {
            layout.present.insert(role);
        }
        layout
    }

    #[must_use]
    pub fn with_element(mut self, role: ElementRole) -> Self {
        self.present.insert(role);
        self
    }

    #[must_use]
    pub fn without_element(mut self, role: ElementRole) -> Self {
        self.present.remove(&role);
        self
    }

    #[must_use]
    pub fn with_sections(mut self, count: usize) -> Self {
        self.sections = count;
        self
    }

    #[must_use]
    pub fn with_anchor(mut self, id: impl Into<String>) -> Self {
        self.anchors.insert(id.into());
        self
    }

    /// Set `(scrollWidth, clientWidth)` for a role.
    #[must_use]
    pub fn with_widths(mut self, role: ElementRole, scroll_width: f64, client_width: f64) -> Self {
        self.set_widths(role, scroll_width, client_width);
        self
    }

    #[must_use]
    pub fn with_offset_top(mut self, role: ElementRole, offset: f64) -> Self {
        self.offsets.insert(role, offset);
        self
    }

    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    pub fn set_scroll_y(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
    }

    pub fn set_widths(&mut self, role: ElementRole, scroll_width: f64, client_width: f64) {
        self.widths.insert(role, (scroll_width, client_width));
    }
}

impl LayoutMetricsProvider for StaticLayout {
    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn element_exists(&self, role: ElementRole) -> bool {
        match role {
            ElementRole::Section(index) => index < self.sections,
            other => self.present.contains(&other),
        }
    }

    fn scroll_width(&self, role: ElementRole) -> f64 {
        self.widths.get(&role).map_or(0.0, |&(scroll, _)| scroll)
    }

    fn client_width(&self, role: ElementRole) -> f64 {
        self.widths.get(&role).map_or(0.0, |&(_, client)| client)
    }

    fn offset_top(&self, role: ElementRole) -> f64 {
        self.offsets.get(&role).copied().unwrap_or(0.0)
    }

    fn section_count(&self) -> usize {
        self.sections
    }

    fn has_anchor_target(&self, id: &str) -> bool {
        self.anchors.contains(id)
    }
}
