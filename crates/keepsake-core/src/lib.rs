#![forbid(unsafe_code)]

//! Core: page behavior for the Keepsake event site.
//!
//! # Role in Keepsake
//! `keepsake-core` holds every behavior of the page (gallery, lightbox,
//! horizontal scroll track, scroll effects, countdown, fade-in, anchor
//! navigation) as deterministic state machines. It never touches a document:
//! hosts feed [`runtime::PageEvent`]s in, answer layout queries through
//! [`metrics::LayoutMetricsProvider`], and apply the
//! [`command::PageCommand`]s that come out.
//!
//! # Primary responsibilities
//! - **PageRuntime**: composition root and the gated initialization chain.
//! - **GalleryPopulator**: randomized selection, markup, and the load latch.
//! - **Lightbox** + **PointerGesture**: viewer state and tap classification.
//! - **HorizontalScrollTrack** + **ScrollEffects**: frame-coalesced scroll
//!   work.
//! - **Countdown** and **FadeInObserver**: timer and visibility effects.
//!
//! # How it fits in the system
//! `keepsake-web` binds browser events, timers, and observers to the runtime
//! and applies commands to the DOM. Tests drive the same runtime natively with
//! [`metrics::StaticLayout`].

pub mod command;
pub mod config;
pub mod countdown;
pub mod error;
pub mod fade_in;
pub mod gallery;
pub mod gesture;
pub mod lightbox;
pub mod metrics;
pub mod navigation;
pub mod runtime;
pub mod scroll_effects;
pub mod track;

pub use command::{CommandQueue, ElementRole, EventDisposition, PageCommand, StyleProperty};
pub use config::{ConfigError, PageConfig};
pub use error::{PageError, Result};
pub use gallery::{GalleryReady, ImageLoadOutcome};
pub use metrics::LayoutMetricsProvider;
pub use runtime::{InitPhase, PageEvent, PageRuntime};

/// Log targets used by the page components, for subscriber filters.
pub const LOG_TARGETS: [&str; 8] = [
    "keepsake.gallery",
    "keepsake.lightbox",
    "keepsake.track",
    "keepsake.scroll",
    "keepsake.countdown",
    "keepsake.fade_in",
    "keepsake.nav",
    "keepsake.runtime",
];
