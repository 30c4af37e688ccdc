#![forbid(unsafe_code)]

//! Composition root for the page layer.
//!
//! [`PageRuntime`] owns one instance of every component, routes host events
//! to them, and accumulates the resulting [`PageCommand`]s until the host
//! drains them with [`take_commands`](PageRuntime::take_commands).
//!
//! # Lifecycle
//!
//! ```text
//!  new ──▶ start ──▶ (await GalleryReady) ──▶ finish_initialization
//!           │                                   │
//!           │ scroll effects, countdown,        │ lightbox bind,
//!           │ fade-in, anchors: live now        │ track setup
//! ```
//!
//! # Invariants
//!
//! 1. Lightbox binding and track setup happen only in
//!    `finish_initialization`, which the async chain runs after the gallery
//!    latch resolves.
//! 2. `finish_initialization` runs at most once.
//! 3. Gallery input before the lightbox is bound is ignored.
//!
//! # Failure Modes
//!
//! Feature setup failures (missing elements) are logged by the component
//! and only disable that component. `start` never fails.

use std::cell::RefCell;

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::command::{CommandQueue, ElementRole, EventDisposition, PageCommand};
use crate::config::PageConfig;
use crate::countdown::Countdown;
use crate::error::{PageError, Result};
use crate::fade_in::FadeInObserver;
use crate::gallery::{GalleryPopulator, GalleryReady, ImageLoadOutcome};
use crate::gesture::{GestureInput, GestureOutcome, PointerGesture, gesture_for};
use crate::lightbox::{Lightbox, LightboxControl, LightboxHit, LightboxKey};
use crate::metrics::LayoutMetricsProvider;
use crate::navigation::AnchorNavigator;
use crate::scroll_effects::ScrollEffects;
use crate::track::HorizontalScrollTrack;

const LOG_TARGET: &str = "keepsake.runtime";

/// Discrete host event routed by [`PageRuntime::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    /// Raw window scroll.
    Scroll,
    /// The animation frame requested by `RequestAnimationFrame` fired.
    AnimationFrame,
    /// The track container changed size.
    ContainerResized,
    /// Gallery image `index` finished loading or failed.
    ImageSettled {
        index: usize,
        outcome: ImageLoadOutcome,
    },
    /// Pointer or touch input over a gallery image.
    Gesture(GestureInput),
    /// Context menu requested over a gallery image.
    ContextMenu,
    Key(LightboxKey),
    LightboxClick(LightboxHit),
    LightboxControl(LightboxControl),
    CountdownTick { now: DateTime<Utc> },
    Intersection { section: usize, intersecting: bool },
    AnchorClick { href: String },
}

/// Progress of the gated initialization chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitPhase {
    #[default]
    Created,
    /// Independent components are live; the gallery is still loading.
    AwaitingGallery,
    /// Lightbox and track are set up.
    Ready,
}

/// Owns and drives every page component.
pub struct PageRuntime {
    config: PageConfig,
    gallery: GalleryPopulator,
    lightbox: Lightbox,
    gesture: Box<dyn PointerGesture>,
    track: HorizontalScrollTrack,
    scroll: ScrollEffects,
    countdown: Countdown,
    fade_in: FadeInObserver,
    navigator: AnchorNavigator,
    observed: Vec<ElementRole>,
    phase: InitPhase,
    commands: CommandQueue,
}

impl std::fmt::Debug for PageRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRuntime")
            .field("phase", &self.phase)
            .field("lightbox", &self.lightbox.state())
            .field("track", &self.track.status())
            .field("countdown_active", &self.countdown.is_active())
            .field("pending_commands", &self.commands.len())
            .finish_non_exhaustive()
    }
}

impl PageRuntime {
    /// Build every component from a validated configuration.
    ///
    /// Gesture input defaults to pointer clicks; see
    /// [`with_touch_input`](Self::with_touch_input).
    pub fn new(config: PageConfig) -> Result<Self> {
        let config = config.validated()?;
        let mobile_threshold = config.viewport.mobile_threshold;
        Ok(Self {
            gallery: GalleryPopulator::new(config.gallery.clone()),
            lightbox: Lightbox::new(),
            gesture: gesture_for(false, config.gesture),
            track: HorizontalScrollTrack::new(mobile_threshold),
            scroll: ScrollEffects::new(config.scroll, mobile_threshold),
            countdown: Countdown::from_config(&config.countdown)?,
            fade_in: FadeInObserver::new(config.fade_in.clone()),
            navigator: AnchorNavigator,
            observed: Vec::new(),
            phase: InitPhase::Created,
            commands: CommandQueue::new(),
            config,
        })
    }

    /// Select touch-classified tap detection when the host supports touch.
    #[must_use]
    pub fn with_touch_input(mut self, touch_capable: bool) -> Self {
        self.gesture = gesture_for(touch_capable, self.config.gesture);
        self
    }

    /// Start the independent components and populate the gallery.
    ///
    /// The returned future resolves once every gallery image has settled;
    /// pass it to [`initialize`](Self::initialize).
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        host: &dyn LayoutMetricsProvider,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> GalleryReady {
        let out = &mut self.commands;

        self.scroll.apply(host, &mut self.track, out);
        if let Err(err) = self.countdown.start(host, now, out) {
            tracing::debug!(target: LOG_TARGET, %err, "countdown not started");
        }
        self.observed = self.fade_in.start(host);

        let ready = self.gallery.populate(host, rng, out);
        self.phase = InitPhase::AwaitingGallery;
        tracing::debug!(
            target: LOG_TARGET,
            sections = self.observed.len(),
            pending = out.len(),
            "page started"
        );
        ready
    }

    /// Bind the lightbox to the rendered images and set up the track.
    ///
    /// A second call returns [`PageError::AlreadyInitialized`] and emits
    /// nothing. A missing track element is returned after the lightbox has
    /// been bound.
    pub fn finish_initialization(&mut self, host: &dyn LayoutMetricsProvider) -> Result<()> {
        if self.phase == InitPhase::Ready {
            return Err(PageError::AlreadyInitialized);
        }
        self.phase = InitPhase::Ready;

        let images = self
            .gallery
            .selection()
            .map(|selection| selection.paths())
            .unwrap_or_default();
        self.lightbox.bind(images, &mut self.commands);
        self.track.setup(host, &mut self.commands)?;
        // Reflect a restored scroll position without waiting for a scroll event.
        self.track.update(host.scroll_y(), host, &mut self.commands);
        tracing::debug!(target: LOG_TARGET, "page initialized");
        Ok(())
    }

    /// Await gallery readiness, then finish initialization.
    ///
    /// Takes the runtime behind a `RefCell` so event handlers (image load
    /// notifications in particular) can borrow it while this future is
    /// suspended. The borrow is only held after `ready` resolves.
    pub async fn initialize(
        runtime: &RefCell<Self>,
        ready: GalleryReady,
        host: &dyn LayoutMetricsProvider,
    ) -> Result<()> {
        ready.await;
        runtime.borrow_mut().finish_initialization(host)
    }

    /// Route one host event.
    pub fn handle(&mut self, event: PageEvent, host: &dyn LayoutMetricsProvider) -> EventDisposition {
        let out = &mut self.commands;
        match event {
            PageEvent::Scroll => self.scroll.on_scroll(out),
            PageEvent::AnimationFrame => {
                self.scroll.on_animation_frame(host, &mut self.track, out);
            }
            PageEvent::ContainerResized => self.track.recompute(host, out),
            PageEvent::ImageSettled { index, outcome } => {
                self.gallery.settle(index, outcome);
            }
            PageEvent::Gesture(input) => {
                if !self.lightbox.is_bound() {
                    return EventDisposition::PASS;
                }
                if let GestureOutcome::Tap {
                    index,
                    suppress_click,
                } = self.gesture.process(input)
                {
                    if let Err(err) = self.lightbox.open(index, out) {
                        tracing::debug!(target: LOG_TARGET, %err, "tap ignored");
                    }
                    if suppress_click {
                        return EventDisposition::PREVENT;
                    }
                }
            }
            PageEvent::ContextMenu => return EventDisposition::PREVENT,
            PageEvent::Key(key) => {
                self.lightbox.on_key(key, out);
            }
            PageEvent::LightboxClick(hit) => self.lightbox.on_click(hit, out),
            PageEvent::LightboxControl(control) => self.lightbox.on_control(control, out),
            PageEvent::CountdownTick { now } => {
                self.countdown.tick(now, out);
            }
            PageEvent::Intersection {
                section,
                intersecting,
            } => {
                self.fade_in.on_intersection(section, intersecting, out);
            }
            PageEvent::AnchorClick { href } => {
                return self.navigator.on_anchor_click(&href, host, out);
            }
        }
        EventDisposition::PASS
    }

    /// Drain pending commands in emission order.
    pub fn take_commands(&mut self) -> Vec<PageCommand> {
        self.commands.drain()
    }

    #[must_use]
    pub fn pending_commands(&self) -> &[PageCommand] {
        self.commands.as_slice()
    }

    /// Sections the host should watch for visibility.
    #[must_use]
    pub fn observed_sections(&self) -> &[ElementRole] {
        &self.observed
    }

    /// Whether a touch gesture is in flight (the host keeps its
    /// move/end/cancel listeners attached only while this holds).
    #[must_use]
    pub fn is_tracking_gesture(&self) -> bool {
        self.gesture.is_tracking()
    }

    #[must_use]
    pub const fn phase(&self) -> InitPhase {
        self.phase
    }

    #[must_use]
    pub fn config(&self) -> &PageConfig {
        &self.config
    }

    #[must_use]
    pub fn gallery(&self) -> &GalleryPopulator {
        &self.gallery
    }

    #[must_use]
    pub fn lightbox(&self) -> &Lightbox {
        &self.lightbox
    }

    #[must_use]
    pub fn track(&self) -> &HorizontalScrollTrack {
        &self.track
    }

    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    #[must_use]
    pub fn scroll_effects(&self) -> &ScrollEffects {
        &self.scroll
    }

    #[must_use]
    pub fn fade_in(&self) -> &FadeInObserver {
        &self.fade_in
    }
}
