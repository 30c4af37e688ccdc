#![forbid(unsafe_code)]

//! Lightbox viewer state machine.
//!
//! # State Machine
//!
//! ```text
//!            open(i)                 next / prev
//!  Closed ───────────▶ Open(i) ◀──────────────┐
//!    ▲                  │  │                   │
//!    └──── close ───────┘  └───────────────────┘
//! ```
//!
//! - `open(i)` is accepted from either state when `i < N`; otherwise it is
//!   rejected and logged, and the state is unchanged.
//! - `next` / `prev` wrap modulo `N` and only apply while open.
//! - Keyboard input (Right, Left, Escape) is only honored while open.
//!
//! The controller is bound to the rendered image list after gallery
//! initialization; input before that is ignored.

use crate::command::{CLASS_ACTIVE, CommandQueue, ElementRole, PageCommand, StyleProperty};
use crate::error::{PageError, Result};

const LOG_TARGET: &str = "keepsake.lightbox";

/// Current viewer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightboxState {
    #[default]
    Closed,
    Open {
        index: usize,
    },
}

impl LightboxState {
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Open { .. })
    }

    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Open { index } => Some(index),
            Self::Closed => None,
        }
    }
}

/// Keys the lightbox reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxKey {
    ArrowRight,
    ArrowLeft,
    Escape,
    Other,
}

impl LightboxKey {
    /// Map a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowRight" | "Right" => Self::ArrowRight,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "Escape" | "Esc" => Self::Escape,
            _ => Self::Other,
        }
    }
}

/// Dedicated on-screen controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxControl {
    Prev,
    Next,
    Close,
}

/// Which part of the lightbox a click landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxHit {
    /// The lightbox root itself (the dimmed area around the image).
    Backdrop,
    /// The image or any control inside the lightbox.
    Content,
}

/// Lightbox controller bound to the gallery's rendered images.
#[derive(Debug, Clone, Default)]
pub struct Lightbox {
    state: LightboxState,
    images: Vec<String>,
    bound: bool,
}

impl Lightbox {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the rendered image sources, in display order.
    ///
    /// Rebinding closes the viewer first so the index invariant holds for
    /// the new list.
    pub fn bind(&mut self, images: Vec<String>, out: &mut CommandQueue) {
        if self.state.is_open() {
            self.close(out);
        }
        tracing::debug!(target: LOG_TARGET, images = images.len(), "lightbox bound");
        self.images = images;
        self.bound = true;
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        self.bound
    }

    #[must_use]
    pub const fn state(&self) -> LightboxState {
        self.state
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Show image `index`. Out-of-range indices leave the state unchanged.
    pub fn open(&mut self, index: usize, out: &mut CommandQueue) -> Result<()> {
        let len = self.images.len();
        if index >= len {
            tracing::warn!(target: LOG_TARGET, index, len, "lightbox index out of range");
            return Err(PageError::IndexOutOfRange { index, len });
        }
        let was_open = self.state.is_open();
        self.state = LightboxState::Open { index };
        self.show(index, out);
        if !was_open {
            out.set_class(ElementRole::Lightbox, CLASS_ACTIVE, true);
            out.set_style(ElementRole::Body, StyleProperty::Overflow, "hidden");
        }
        tracing::debug!(target: LOG_TARGET, index, "lightbox open");
        Ok(())
    }

    /// Advance to the next image, wrapping to the first.
    pub fn next(&mut self, out: &mut CommandQueue) {
        if let LightboxState::Open { index } = self.state {
            let next = (index + 1) % self.images.len();
            self.state = LightboxState::Open { index: next };
            self.show(next, out);
        }
    }

    /// Step back to the previous image, wrapping to the last.
    pub fn prev(&mut self, out: &mut CommandQueue) {
        if let LightboxState::Open { index } = self.state {
            let len = self.images.len();
            let prev = (index + len - 1) % len;
            self.state = LightboxState::Open { index: prev };
            self.show(prev, out);
        }
    }

    pub fn close(&mut self, out: &mut CommandQueue) {
        if !self.state.is_open() {
            return;
        }
        self.state = LightboxState::Closed;
        out.set_class(ElementRole::Lightbox, CLASS_ACTIVE, false);
        out.clear_style(ElementRole::Body, StyleProperty::Overflow);
        tracing::debug!(target: LOG_TARGET, "lightbox closed");
    }

    /// Keyboard navigation. Returns whether the key was consumed.
    pub fn on_key(&mut self, key: LightboxKey, out: &mut CommandQueue) -> bool {
        if !self.state.is_open() {
            return false;
        }
        match key {
            LightboxKey::ArrowRight => self.next(out),
            LightboxKey::ArrowLeft => self.prev(out),
            LightboxKey::Escape => self.close(out),
            LightboxKey::Other => return false,
        }
        true
    }

    pub fn on_control(&mut self, control: LightboxControl, out: &mut CommandQueue) {
        match control {
            LightboxControl::Prev => self.prev(out),
            LightboxControl::Next => self.next(out),
            LightboxControl::Close => self.close(out),
        }
    }

    /// Clicks on the backdrop close the viewer; clicks on content do not.
    pub fn on_click(&mut self, hit: LightboxHit, out: &mut CommandQueue) {
        if hit == LightboxHit::Backdrop {
            self.close(out);
        }
    }

    fn show(&self, index: usize, out: &mut CommandQueue) {
        out.push(PageCommand::SetImageSource {
            role: ElementRole::LightboxImage,
            src: self.images[index].clone(),
        });
    }
}
