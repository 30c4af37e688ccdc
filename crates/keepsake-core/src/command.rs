#![forbid(unsafe_code)]

//! Host-facing vocabulary: element roles, DOM mutation commands, and event
//! dispositions.
//!
//! The core never touches the document. Components push [`PageCommand`]s
//! into a [`CommandQueue`]; the host drains the queue after each dispatch and
//! applies the commands in emission order.

use std::fmt;

/// Class toggled on the navbar once the page has scrolled past the threshold.
pub const CLASS_SCROLLED: &str = "scrolled";
/// Class marking the lightbox as shown.
pub const CLASS_ACTIVE: &str = "active";
/// Class added to a section the first time it becomes visible.
pub const CLASS_VISIBLE: &str = "visible";

/// Stable role of a collaborating element in the page markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementRole {
    Body,
    Navbar,
    Hero,
    /// Secondary decorative element with its own (weaker) parallax.
    ParallaxDecoration,
    CountdownRoot,
    CountdownDays,
    CountdownHours,
    CountdownMinutes,
    CountdownSeconds,
    GalleryContainer,
    /// Outer section whose height becomes the scroll track.
    TrackSection,
    /// Sticky viewport container pinned while the track scrolls.
    TrackContainer,
    /// Inner strip translated horizontally.
    TrackStrip,
    Lightbox,
    LightboxImage,
    LightboxPrev,
    LightboxNext,
    LightboxClose,
    /// Top-level page section, in document order.
    Section(usize),
}

impl fmt::Display for ElementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body => f.write_str("body"),
            Self::Navbar => f.write_str("navbar"),
            Self::Hero => f.write_str("hero"),
            Self::ParallaxDecoration => f.write_str("parallax_decoration"),
            Self::CountdownRoot => f.write_str("countdown"),
            Self::CountdownDays => f.write_str("countdown_days"),
            Self::CountdownHours => f.write_str("countdown_hours"),
            Self::CountdownMinutes => f.write_str("countdown_minutes"),
            Self::CountdownSeconds => f.write_str("countdown_seconds"),
            Self::GalleryContainer => f.write_str("gallery_container"),
            Self::TrackSection => f.write_str("track_section"),
            Self::TrackContainer => f.write_str("track_container"),
            Self::TrackStrip => f.write_str("track_strip"),
            Self::Lightbox => f.write_str("lightbox"),
            Self::LightboxImage => f.write_str("lightbox_image"),
            Self::LightboxPrev => f.write_str("lightbox_prev"),
            Self::LightboxNext => f.write_str("lightbox_next"),
            Self::LightboxClose => f.write_str("lightbox_close"),
            Self::Section(index) => write!(f, "section[{index}]"),
        }
    }
}

/// Inline style property the core may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleProperty {
    Height,
    Position,
    Top,
    Transform,
    BackgroundPosition,
    Overflow,
}

impl StyleProperty {
    /// CSS property name, as accepted by `CSSStyleDeclaration.setProperty`.
    #[must_use]
    pub const fn css_name(self) -> &'static str {
        match self {
            Self::Height => "height",
            Self::Position => "position",
            Self::Top => "top",
            Self::Transform => "transform",
            Self::BackgroundPosition => "background-position",
            Self::Overflow => "overflow",
        }
    }
}

/// One DOM mutation or host instruction emitted by the core.
#[derive(Debug, Clone, PartialEq)]
pub enum PageCommand {
    SetStyle {
        role: ElementRole,
        property: StyleProperty,
        value: String,
    },
    /// Remove an inline style property, falling back to the stylesheet.
    ClearStyle {
        role: ElementRole,
        property: StyleProperty,
    },
    SetClass {
        role: ElementRole,
        class: &'static str,
        enabled: bool,
    },
    SetText {
        role: ElementRole,
        text: String,
    },
    SetInnerHtml {
        role: ElementRole,
        html: String,
    },
    SetImageSource {
        role: ElementRole,
        src: String,
    },
    /// Schedule one scroll-effects update on the next animation frame.
    RequestAnimationFrame,
    /// Cancel the repeating countdown timer. Emitted at most once.
    StopCountdown,
    /// Stop watching the element for visibility changes.
    Unobserve { role: ElementRole },
    /// Smooth-scroll the element with this id to the top of the viewport.
    ScrollToAnchor { id: String },
}

/// Ordered outbox of [`PageCommand`]s.
#[derive(Debug, Default, Clone)]
pub struct CommandQueue {
    commands: Vec<PageCommand>,
}

impl CommandQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: PageCommand) {
        self.commands.push(command);
    }

    pub fn set_style(&mut self, role: ElementRole, property: StyleProperty, value: impl Into<String>) {
        self.push(PageCommand::SetStyle {
            role,
            property,
            value: value.into(),
        });
    }

    pub fn clear_style(&mut self, role: ElementRole, property: StyleProperty) {
        self.push(PageCommand::ClearStyle { role, property });
    }

    pub fn set_class(&mut self, role: ElementRole, class: &'static str, enabled: bool) {
        self.push(PageCommand::SetClass {
            role,
            class,
            enabled,
        });
    }

    pub fn set_text(&mut self, role: ElementRole, text: impl Into<String>) {
        self.push(PageCommand::SetText {
            role,
            text: text.into(),
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Borrow pending commands without draining them.
    #[must_use]
    pub fn as_slice(&self) -> &[PageCommand] {
        &self.commands
    }

    /// Drain all pending commands in emission order.
    pub fn drain(&mut self) -> Vec<PageCommand> {
        std::mem::take(&mut self.commands)
    }
}

/// What the host should do with the browser event that was just dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventDisposition {
    /// Call `preventDefault()` on the originating event.
    pub prevent_default: bool,
}

impl EventDisposition {
    /// Let the browser run its default action.
    pub const PASS: Self = Self {
        prevent_default: false,
    };
    /// Suppress the browser default action.
    pub const PREVENT: Self = Self {
        prevent_default: true,
    };
}

/// Format a CSS pixel length, folding negative zero into `0px`.
#[must_use]
pub fn px(value: f64) -> String {
    let value = if value == 0.0 || !value.is_finite() {
        0.0
    } else {
        value
    };
    format!("{value}px")
}
