#![forbid(unsafe_code)]

//! Scroll-driven horizontal gallery track.
//!
//! Vertical page scroll drives horizontal translation of an image strip.
//! The outer section is stretched to `100vh + overflow` and its container is
//! pinned to the viewport top, so each pixel scrolled inside the section
//! moves the strip one pixel left.
//!
//! # Invariants
//!
//! 1. Translation magnitude is always within `[0, overflow_distance]`,
//!    regardless of scroll velocity.
//! 2. At or below the mobile threshold the layout is static and `update`
//!    writes nothing.
//! 3. `recompute` re-derives metrics from scratch; running it twice with
//!    unchanged metrics yields the same layout and the same commands.
//!
//! # Failure Modes
//!
//! - Any of the three collaborating elements missing: the track logs a
//!   warning during `setup` and stays disabled for the page lifetime.

use crate::command::{CommandQueue, ElementRole, StyleProperty, px};
use crate::error::{PageError, Result};
use crate::metrics::{LayoutMetricsProvider, ViewportSample, finite_or_zero};

const LOG_TARGET: &str = "keepsake.track";

const TRACK_ROLES: [ElementRole; 3] = [
    ElementRole::TrackSection,
    ElementRole::TrackContainer,
    ElementRole::TrackStrip,
];

/// Cached measurement of the strip against its container.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackMetrics {
    pub scroll_width: f64,
    pub container_width: f64,
    /// `max(scroll_width - container_width, 0)`; zero means inactive.
    pub overflow_distance: f64,
}

impl TrackMetrics {
    #[must_use]
    pub fn measure(scroll_width: f64, container_width: f64) -> Self {
        let scroll_width = finite_or_zero(scroll_width);
        let container_width = finite_or_zero(container_width);
        Self {
            scroll_width,
            container_width,
            overflow_distance: (scroll_width - container_width).max(0.0),
        }
    }
}

/// Lifecycle of the track controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackStatus {
    /// `setup` has not run yet.
    #[default]
    Uninitialized,
    /// A collaborating element is missing; permanently inert.
    Disabled,
    /// Normal-flow strip (mobile, or content fits).
    Static,
    /// Container pinned, strip translating with scroll.
    Pinned,
}

/// Height applied to the outer section.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SectionHeight {
    #[default]
    Auto,
    /// One viewport height plus the overflow distance.
    Extended { overflow: f64 },
}

impl SectionHeight {
    #[must_use]
    pub fn css_value(self) -> String {
        match self {
            Self::Auto => "auto".to_string(),
            Self::Extended { overflow } => format!("calc(100vh + {})", px(overflow)),
        }
    }
}

/// Layout state the controller last wrote to the document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackLayout {
    pub section_height: SectionHeight,
    pub pinned: bool,
    /// Current strip translation (non-positive).
    pub translation: f64,
}

/// Strip translation for a scroll position: zero before the section,
/// `-offset` inside it, `-overflow` past it.
#[must_use]
pub fn translation_for(scroll_y: f64, section_top: f64, overflow: f64) -> f64 {
    let overflow = finite_or_zero(overflow).max(0.0);
    let offset = scroll_y - section_top;
    if !offset.is_finite() || offset <= 0.0 {
        return 0.0;
    }
    -offset.min(overflow)
}

/// Horizontal scroll track controller.
#[derive(Debug, Clone)]
pub struct HorizontalScrollTrack {
    mobile_threshold: f64,
    status: TrackStatus,
    metrics: TrackMetrics,
    layout: TrackLayout,
}

impl HorizontalScrollTrack {
    #[must_use]
    pub fn new(mobile_threshold: f64) -> Self {
        Self {
            mobile_threshold,
            status: TrackStatus::Uninitialized,
            metrics: TrackMetrics::default(),
            layout: TrackLayout::default(),
        }
    }

    /// Locate the collaborating elements and run the first recompute.
    pub fn setup(&mut self, host: &dyn LayoutMetricsProvider, out: &mut CommandQueue) -> Result<()> {
        if let Some(role) = TRACK_ROLES
            .into_iter()
            .find(|&role| !host.element_exists(role))
        {
            tracing::warn!(
                target: LOG_TARGET,
                missing = %role,
                "horizontal scroll track disabled: element not found"
            );
            self.status = TrackStatus::Disabled;
            return Err(PageError::MissingElement { role });
        }
        self.status = TrackStatus::Static;
        self.recompute(host, out);
        Ok(())
    }

    /// Re-derive metrics and rewrite the section/container layout.
    pub fn recompute(&mut self, host: &dyn LayoutMetricsProvider, out: &mut CommandQueue) {
        if matches!(self.status, TrackStatus::Uninitialized | TrackStatus::Disabled) {
            return;
        }

        let viewport = ViewportSample::read(host);
        if viewport.is_mobile(self.mobile_threshold) {
            self.metrics = TrackMetrics::default();
            self.reset_static(out);
            tracing::debug!(target: LOG_TARGET, width = viewport.width, "track static (mobile)");
            return;
        }

        self.metrics = TrackMetrics::measure(
            host.scroll_width(ElementRole::TrackStrip),
            host.client_width(ElementRole::TrackContainer),
        );
        if self.metrics.overflow_distance > 0.0 {
            self.pin(self.metrics.overflow_distance, out);
            self.clamp_translation(out);
        } else {
            self.reset_static(out);
        }
        tracing::debug!(
            target: LOG_TARGET,
            scroll_width = self.metrics.scroll_width,
            container_width = self.metrics.container_width,
            overflow = self.metrics.overflow_distance,
            "track recomputed"
        );
    }

    /// Translate the strip for the current scroll position.
    pub fn update(&mut self, scroll_y: f64, host: &dyn LayoutMetricsProvider, out: &mut CommandQueue) {
        if self.status != TrackStatus::Pinned || self.metrics.overflow_distance <= 0.0 {
            return;
        }
        if ViewportSample::read(host).is_mobile(self.mobile_threshold) {
            return;
        }

        let section_top = finite_or_zero(host.offset_top(ElementRole::TrackSection));
        let translation = translation_for(scroll_y, section_top, self.metrics.overflow_distance);
        if translation == self.layout.translation {
            return;
        }
        self.layout.translation = translation;
        out.set_style(ElementRole::TrackStrip, StyleProperty::Transform, translate_x(translation));
    }

    #[must_use]
    pub const fn status(&self) -> TrackStatus {
        self.status
    }

    #[must_use]
    pub const fn metrics(&self) -> TrackMetrics {
        self.metrics
    }

    #[must_use]
    pub const fn layout(&self) -> TrackLayout {
        self.layout
    }

    #[must_use]
    pub fn overflow_distance(&self) -> f64 {
        self.metrics.overflow_distance
    }

    fn pin(&mut self, overflow: f64, out: &mut CommandQueue) {
        let height = SectionHeight::Extended { overflow };
        out.set_style(ElementRole::TrackSection, StyleProperty::Height, height.css_value());
        out.set_style(ElementRole::TrackContainer, StyleProperty::Position, "sticky");
        out.set_style(ElementRole::TrackContainer, StyleProperty::Top, "0");
        self.layout.section_height = height;
        self.layout.pinned = true;
        self.status = TrackStatus::Pinned;
    }

    /// Pull the strip back inside a shrunken overflow.
    fn clamp_translation(&mut self, out: &mut CommandQueue) {
        let bound = -self.metrics.overflow_distance;
        if self.layout.translation < bound {
            self.layout.translation = bound;
            out.set_style(ElementRole::TrackStrip, StyleProperty::Transform, translate_x(bound));
        }
    }

    fn reset_static(&mut self, out: &mut CommandQueue) {
        out.set_style(
            ElementRole::TrackSection,
            StyleProperty::Height,
            SectionHeight::Auto.css_value(),
        );
        out.set_style(ElementRole::TrackContainer, StyleProperty::Position, "static");
        out.clear_style(ElementRole::TrackContainer, StyleProperty::Top);
        out.set_style(ElementRole::TrackStrip, StyleProperty::Transform, translate_x(0.0));
        self.layout = TrackLayout::default();
        self.status = TrackStatus::Static;
    }
}

fn translate_x(offset: f64) -> String {
    format!("translateX({})", px(offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::PageCommand;
    use crate::metrics::StaticLayout;
    use pretty_assertions::assert_eq;

    fn desktop(scroll_width: f64, client_width: f64) -> StaticLayout {
        StaticLayout::full_page(1280.0)
            .with_widths(ElementRole::TrackStrip, scroll_width, 0.0)
            .with_widths(ElementRole::TrackContainer, 0.0, client_width)
            .with_offset_top(ElementRole::TrackSection, 1000.0)
    }

    fn ready_track(host: &StaticLayout) -> (HorizontalScrollTrack, CommandQueue) {
        let mut track = HorizontalScrollTrack::new(768.0);
        let mut out = CommandQueue::new();
        track.setup(host, &mut out).expect("all elements present");
        (track, out)
    }

    #[test]
    fn overflow_pins_and_extends_section() {
        let host = desktop(2000.0, 800.0);
        let (track, mut out) = ready_track(&host);

        assert_eq!(track.overflow_distance(), 1200.0);
        assert_eq!(track.status(), TrackStatus::Pinned);
        assert_eq!(
            out.drain(),
            vec![
                PageCommand::SetStyle {
                    role: ElementRole::TrackSection,
                    property: StyleProperty::Height,
                    value: "calc(100vh + 1200px)".into(),
                },
                PageCommand::SetStyle {
                    role: ElementRole::TrackContainer,
                    property: StyleProperty::Position,
                    value: "sticky".into(),
                },
                PageCommand::SetStyle {
                    role: ElementRole::TrackContainer,
                    property: StyleProperty::Top,
                    value: "0".into(),
                },
            ]
        );
    }

    #[test]
    fn content_that_fits_stays_static() {
        let host = desktop(700.0, 800.0);
        let (track, mut out) = ready_track(&host);
        assert_eq!(track.overflow_distance(), 0.0);
        assert_eq!(track.status(), TrackStatus::Static);
        assert_eq!(track.layout(), TrackLayout::default());
        assert!(out.drain().contains(&PageCommand::SetStyle {
            role: ElementRole::TrackSection,
            property: StyleProperty::Height,
            value: "auto".into(),
        }));
    }

    #[test]
    fn missing_strip_disables_track() {
        let host = desktop(2000.0, 800.0).without_element(ElementRole::TrackStrip);
        let mut track = HorizontalScrollTrack::new(768.0);
        let mut out = CommandQueue::new();
        let err = track.setup(&host, &mut out).expect_err("strip missing");
        assert!(matches!(
            err,
            PageError::MissingElement {
                role: ElementRole::TrackStrip
            }
        ));
        assert_eq!(track.status(), TrackStatus::Disabled);

        track.recompute(&host, &mut out);
        track.update(5000.0, &host, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn update_before_setup_is_a_no_op() {
        let host = desktop(2000.0, 800.0);
        let mut track = HorizontalScrollTrack::new(768.0);
        let mut out = CommandQueue::new();
        track.recompute(&host, &mut out);
        track.update(1500.0, &host, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn update_maps_scroll_linearly_inside_track() {
        let host = desktop(2000.0, 800.0);
        let (mut track, mut out) = ready_track(&host);
        out.drain();

        track.update(1300.0, &host, &mut out);
        assert_eq!(track.layout().translation, -300.0);
        assert_eq!(
            out.drain(),
            vec![PageCommand::SetStyle {
                role: ElementRole::TrackStrip,
                property: StyleProperty::Transform,
                value: "translateX(-300px)".into(),
            }]
        );
    }

    #[test]
    fn update_pins_to_start_and_end() {
        let host = desktop(2000.0, 800.0);
        let (mut track, mut out) = ready_track(&host);

        track.update(400.0, &host, &mut out);
        assert_eq!(track.layout().translation, 0.0);

        track.update(9000.0, &host, &mut out);
        assert_eq!(track.layout().translation, -1200.0);
    }

    #[test]
    fn unchanged_translation_writes_nothing() {
        let host = desktop(2000.0, 800.0);
        let (mut track, mut out) = ready_track(&host);
        track.update(1500.0, &host, &mut out);
        out.drain();
        track.update(1500.0, &host, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn mobile_resets_layout_regardless_of_prior_state() {
        let mut host = desktop(2000.0, 800.0);
        let (mut track, mut out) = ready_track(&host);
        track.update(1600.0, &host, &mut out);
        assert_eq!(track.status(), TrackStatus::Pinned);
        out.drain();

        host.set_viewport_width(768.0);
        track.recompute(&host, &mut out);
        assert_eq!(track.status(), TrackStatus::Static);
        assert_eq!(track.overflow_distance(), 0.0);
        assert_eq!(track.layout(), TrackLayout::default());
        assert_eq!(
            out.drain(),
            vec![
                PageCommand::SetStyle {
                    role: ElementRole::TrackSection,
                    property: StyleProperty::Height,
                    value: "auto".into(),
                },
                PageCommand::SetStyle {
                    role: ElementRole::TrackContainer,
                    property: StyleProperty::Position,
                    value: "static".into(),
                },
                PageCommand::ClearStyle {
                    role: ElementRole::TrackContainer,
                    property: StyleProperty::Top,
                },
                PageCommand::SetStyle {
                    role: ElementRole::TrackStrip,
                    property: StyleProperty::Transform,
                    value: "translateX(0px)".into(),
                },
            ]
        );

        track.update(1700.0, &host, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn update_is_inert_when_viewport_shrinks_before_recompute() {
        let mut host = desktop(2000.0, 800.0);
        let (mut track, mut out) = ready_track(&host);
        out.drain();
        host.set_viewport_width(600.0);
        track.update(1500.0, &host, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn recompute_is_idempotent() {
        let host = desktop(2000.0, 800.0);
        let (mut track, mut out) = ready_track(&host);
        out.drain();

        track.recompute(&host, &mut out);
        let first_layout = track.layout();
        let first_commands = out.drain();

        track.recompute(&host, &mut out);
        assert_eq!(track.layout(), first_layout);
        assert_eq!(out.drain(), first_commands);
    }

    #[test]
    fn resize_rederives_overflow() {
        let mut host = desktop(2000.0, 800.0);
        let (mut track, mut out) = ready_track(&host);
        host.set_widths(ElementRole::TrackContainer, 0.0, 1100.0);
        track.recompute(&host, &mut out);
        assert_eq!(track.overflow_distance(), 900.0);

        track.update(5000.0, &host, &mut out);
        assert_eq!(track.layout().translation, -900.0);
    }

    #[test]
    fn shrinking_overflow_pulls_strip_back_without_scroll() {
        let mut host = desktop(2000.0, 800.0);
        let (mut track, mut out) = ready_track(&host);
        track.update(9000.0, &host, &mut out);
        assert_eq!(track.layout().translation, -1200.0);
        out.drain();

        host.set_widths(ElementRole::TrackContainer, 0.0, 1100.0);
        track.recompute(&host, &mut out);
        assert_eq!(track.overflow_distance(), 900.0);
        assert_eq!(track.layout().translation, -900.0);
        assert!(track.layout().translation.abs() <= track.overflow_distance());
        assert!(out.drain().contains(&PageCommand::SetStyle {
            role: ElementRole::TrackStrip,
            property: StyleProperty::Transform,
            value: "translateX(-900px)".into(),
        }));

        track.recompute(&host, &mut out);
        assert!(!out.drain().iter().any(|command| matches!(
            command,
            PageCommand::SetStyle {
                property: StyleProperty::Transform,
                ..
            }
        )));
    }

    #[test]
    fn translation_clamps() {
        assert_eq!(translation_for(0.0, 100.0, 500.0), 0.0);
        assert_eq!(translation_for(100.0, 100.0, 500.0), 0.0);
        assert_eq!(translation_for(350.0, 100.0, 500.0), -250.0);
        assert_eq!(translation_for(600.0, 100.0, 500.0), -500.0);
        assert_eq!(translation_for(1e9, 100.0, 500.0), -500.0);
        assert_eq!(translation_for(f64::NAN, 100.0, 500.0), 0.0);
        assert_eq!(translation_for(300.0, 100.0, -5.0), 0.0);
    }

    #[test]
    fn metrics_clamp_negative_overflow() {
        let metrics = TrackMetrics::measure(500.0, 800.0);
        assert_eq!(metrics.overflow_distance, 0.0);
        let metrics = TrackMetrics::measure(f64::NAN, 800.0);
        assert_eq!(metrics.scroll_width, 0.0);
    }
}
