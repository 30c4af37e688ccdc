#![forbid(unsafe_code)]

//! Tap classification for gallery images.
//!
//! Two [`PointerGesture`] implementations share one interface:
//!
//! - [`TouchGesture`]: tracks touch-start → touch-end and classifies the
//!   gesture as a tap (movement under the threshold on both axes) or a drag
//!   (anything else). A tap asks the host to suppress the synthetic click.
//! - [`ClickGesture`]: plain pointer clicks; touch input is ignored.
//!
//! # Invariants
//!
//! 1. Tap and Drag never both resolve from the same touch-start → touch-end.
//! 2. After touch-end or touch-cancel no gesture is being tracked.
//! 3. A touch-end without a preceding touch-start is ignored.
//!
//! # Failure Modes
//!
//! Multi-touch is not disambiguated: a second touch-start replaces the one
//! being tracked. Cancellation races beyond `TouchCancel` are best-effort.

use serde::{Deserialize, Serialize};

/// Movement tolerance for tap classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Maximum movement (px) on each axis for a touch to count as a tap
    /// (default: 10). Movement equal to the threshold is a drag.
    pub tap_threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_threshold: 10.0,
        }
    }
}

/// Raw pointer input over a gallery image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureInput {
    TouchStart { index: usize, x: f64, y: f64 },
    TouchMove { x: f64, y: f64 },
    TouchEnd { x: f64, y: f64 },
    TouchCancel,
    Click { index: usize },
}

/// What a gesture resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Open the image at `index`.
    Tap { index: usize, suppress_click: bool },
    /// The finger moved too far; leave the page to scroll.
    Drag,
    /// Still tracking a touch.
    Tracking,
    Ignored,
}

/// Capability interface for tap detection.
pub trait PointerGesture {
    /// Feed one input, returning what (if anything) it resolved to.
    fn process(&mut self, input: GestureInput) -> GestureOutcome;

    /// Whether a touch is currently being tracked.
    fn is_tracking(&self) -> bool;

    /// Drop any in-flight gesture.
    fn reset(&mut self);
}

/// Pick the implementation for the host's input capability.
#[must_use]
pub fn gesture_for(touch_capable: bool, config: GestureConfig) -> Box<dyn PointerGesture> {
    if touch_capable {
        Box::new(TouchGesture::new(config))
    } else {
        Box::new(ClickGesture)
    }
}

#[derive(Debug, Clone, Copy)]
struct TouchTrack {
    index: usize,
    start_x: f64,
    start_y: f64,
    last_x: f64,
    last_y: f64,
}

/// Touch-classified tap detection.
#[derive(Debug, Clone)]
pub struct TouchGesture {
    config: GestureConfig,
    active: Option<TouchTrack>,
}

impl TouchGesture {
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    fn is_within_threshold(&self, track: &TouchTrack, x: f64, y: f64) -> bool {
        let dx = (x - track.start_x).abs();
        let dy = (y - track.start_y).abs();
        dx < self.config.tap_threshold && dy < self.config.tap_threshold
    }
}

impl PointerGesture for TouchGesture {
    fn process(&mut self, input: GestureInput) -> GestureOutcome {
        match input {
            GestureInput::TouchStart { index, x, y } => {
                self.active = Some(TouchTrack {
                    index,
                    start_x: x,
                    start_y: y,
                    last_x: x,
                    last_y: y,
                });
                GestureOutcome::Tracking
            }
            GestureInput::TouchMove { x, y } => match self.active.as_mut() {
                Some(track) => {
                    track.last_x = x;
                    track.last_y = y;
                    GestureOutcome::Tracking
                }
                None => GestureOutcome::Ignored,
            },
            GestureInput::TouchEnd { x, y } => {
                let Some(track) = self.active.take() else {
                    return GestureOutcome::Ignored;
                };
                // Some hosts report no end coordinates; fall back to the last move.
                let (x, y) = if x.is_finite() && y.is_finite() {
                    (x, y)
                } else {
                    (track.last_x, track.last_y)
                };
                if self.is_within_threshold(&track, x, y) {
                    GestureOutcome::Tap {
                        index: track.index,
                        suppress_click: true,
                    }
                } else {
                    GestureOutcome::Drag
                }
            }
            GestureInput::TouchCancel => {
                self.active = None;
                GestureOutcome::Ignored
            }
            GestureInput::Click { index } => GestureOutcome::Tap {
                index,
                suppress_click: false,
            },
        }
    }

    fn is_tracking(&self) -> bool {
        self.active.is_some()
    }

    fn reset(&mut self) {
        self.active = None;
    }
}

/// Pointer-classified tap detection: every click is a tap.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClickGesture;

impl PointerGesture for ClickGesture {
    fn process(&mut self, input: GestureInput) -> GestureOutcome {
        match input {
            GestureInput::Click { index } => GestureOutcome::Tap {
                index,
                suppress_click: false,
            },
            _ => GestureOutcome::Ignored,
        }
    }

    fn is_tracking(&self) -> bool {
        false
    }

    fn reset(&mut self) {}
}
