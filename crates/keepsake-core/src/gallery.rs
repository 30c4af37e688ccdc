#![forbid(unsafe_code)]

//! Randomized gallery population and the image-load latch.
//!
//! [`GalleryPopulator`] draws an interleaved selection from two fixed image
//! pools, renders it into the gallery container, and hands back a
//! [`GalleryReady`] future that resolves once every rendered image has
//! settled (loaded or failed).
//!
//! # Invariants
//!
//! 1. A selection alternates orientation, starting with horizontal.
//! 2. No path repeats within the horizontal subset or within the vertical
//!    subset of one draw.
//! 3. Each latch slot settles at most once; duplicate load/error signals for
//!    the same image are ignored.
//! 4. A latch over zero images is complete on creation.
//!
//! # Failure Modes
//!
//! - A missing gallery container is not an error: populate renders nothing
//!   and the returned future is already complete.
//! - Image load failures count as settled. The broken image stays broken.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::command::{CommandQueue, ElementRole, PageCommand};
use crate::metrics::LayoutMetricsProvider;

const LOG_TARGET: &str = "keepsake.gallery";

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Pool sizes and asset naming for the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Number of horizontal images (`1..=n`) under `horizontal_prefix`.
    pub horizontal_pool: usize,
    /// Number of vertical images (`1..=n`) under `vertical_prefix`.
    pub vertical_pool: usize,
    /// Images taken from each shuffled pool.
    pub picks_per_pool: usize,
    pub horizontal_prefix: String,
    pub vertical_prefix: String,
    pub extension: String,
    /// Alt text stem; the 1-based position is appended.
    pub alt_text: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            horizontal_pool: 9,
            vertical_pool: 20,
            picks_per_pool: 5,
            horizontal_prefix: "images/horizontal/".into(),
            vertical_prefix: "images/vertical/".into(),
            extension: "jpg".into(),
            alt_text: "Gallery photo".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Image references and pools
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    #[must_use]
    pub const fn as_class(self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// Path to an image asset tagged with its orientation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    path: String,
    orientation: Orientation,
}

impl ImageRef {
    #[must_use]
    pub fn new(path: impl Into<String>, orientation: Orientation) -> Self {
        Self {
            path: path.into(),
            orientation,
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }
}

/// The two fixed, sequentially numbered image pools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePools {
    pub horizontal: Vec<ImageRef>,
    pub vertical: Vec<ImageRef>,
}

impl ImagePools {
    #[must_use]
    pub fn from_config(config: &GalleryConfig) -> Self {
        let pool = |count: usize, prefix: &str, orientation: Orientation| -> Vec<ImageRef> {
            (1..=count)
                .map(|n| ImageRef::new(format!("{prefix}{n}.{}", config.extension), orientation))
                .collect()
        };
        Self {
            horizontal: pool(
                config.horizontal_pool,
                &config.horizontal_prefix,
                Orientation::Horizontal,
            ),
            vertical: pool(
                config.vertical_pool,
                &config.vertical_prefix,
                Orientation::Vertical,
            ),
        }
    }
}

/// Unbiased in-place Fisher-Yates shuffle.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Ordered, interleaved draw from both pools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GallerySelection {
    images: Vec<ImageRef>,
}

impl GallerySelection {
    /// Shuffle each pool independently, keep `picks` of each, interleave.
    pub fn draw<R: Rng + ?Sized>(pools: &ImagePools, picks: usize, rng: &mut R) -> Self {
        let mut horizontal = pools.horizontal.clone();
        shuffle(&mut horizontal, rng);
        horizontal.truncate(picks);

        let mut vertical = pools.vertical.clone();
        shuffle(&mut vertical, rng);
        vertical.truncate(picks);

        Self::interleave(horizontal, vertical)
    }

    /// Alternate `horizontal[0], vertical[0], horizontal[1], ...`.
    ///
    /// When one side runs out first its slots are skipped.
    #[must_use]
    pub fn interleave(horizontal: Vec<ImageRef>, vertical: Vec<ImageRef>) -> Self {
        let rounds = horizontal.len().max(vertical.len());
        let mut images = Vec::with_capacity(horizontal.len() + vertical.len());
        let mut horizontal = horizontal.into_iter();
        let mut vertical = vertical.into_iter();
        for _ in 0..rounds {
            images.extend(horizontal.next());
            images.extend(vertical.next());
        }
        Self { images }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    #[must_use]
    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    /// Image paths in display order, as the lightbox consumes them.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        self.images.iter().map(|image| image.path.clone()).collect()
    }

    /// One `<img>` element per entry, tagged with its display index.
    #[must_use]
    pub fn render_markup(&self, alt_text: &str) -> String {
        let mut html = String::with_capacity(self.images.len() * 128);
        for (index, image) in self.images.iter().enumerate() {
            html.push_str(&format!(
                r#"<img src="{src}" alt="{alt} {n}" class="gallery-image {class}" data-index="{index}" loading="eager" draggable="false">"#,
                src = escape_attr(&image.path),
                alt = escape_attr(alt_text),
                n = index + 1,
                class = image.orientation.as_class(),
            ));
        }
        html
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Load latch
// ---------------------------------------------------------------------------

/// How one rendered image finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLoadOutcome {
    Loaded,
    Errored,
    /// The image was already `complete` when the host first looked at it.
    AlreadyComplete,
}

/// Result of settling one latch slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatchProgress {
    Pending { remaining: usize },
    /// This signal settled the last outstanding slot.
    Complete,
    Duplicate,
    UnknownSlot,
}

#[derive(Debug)]
struct LatchInner {
    settled: Vec<bool>,
    remaining: usize,
    waker: Option<Waker>,
}

/// Join over a known number of completion signals.
#[derive(Debug, Clone)]
pub struct LoadLatch {
    inner: Rc<RefCell<LatchInner>>,
}

impl LoadLatch {
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LatchInner {
                settled: vec![false; count],
                remaining: count,
                waker: None,
            })),
        }
    }

    /// Mark slot `index` as settled.
    pub fn settle(&self, index: usize) -> LatchProgress {
        let mut inner = self.inner.borrow_mut();
        let Some(slot) = inner.settled.get_mut(index) else {
            return LatchProgress::UnknownSlot;
        };
        if *slot {
            return LatchProgress::Duplicate;
        }
        *slot = true;
        inner.remaining -= 1;
        if inner.remaining > 0 {
            return LatchProgress::Pending {
                remaining: inner.remaining,
            };
        }
        if let Some(waker) = inner.waker.take() {
            waker.wake();
        }
        LatchProgress::Complete
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.inner.borrow().remaining
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    /// Future resolving once every slot has settled.
    #[must_use]
    pub fn wait(&self) -> GalleryReady {
        GalleryReady {
            inner: Rc::clone(&self.inner),
        }
    }
}

/// Completion future returned by [`GalleryPopulator::populate`].
#[derive(Debug)]
#[must_use = "the gallery chain only continues once this future is awaited"]
pub struct GalleryReady {
    inner: Rc<RefCell<LatchInner>>,
}

impl Future for GalleryReady {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.remaining == 0 {
            return Poll::Ready(());
        }
        match &inner.waker {
            Some(waker) if waker.will_wake(cx.waker()) => {}
            _ => inner.waker = Some(cx.waker().clone()),
        }
        Poll::Pending
    }
}

// ---------------------------------------------------------------------------
// Populator
// ---------------------------------------------------------------------------

/// Draws, renders, and tracks loading of the gallery images.
#[derive(Debug)]
pub struct GalleryPopulator {
    config: GalleryConfig,
    pools: ImagePools,
    selection: Option<GallerySelection>,
    latch: LoadLatch,
}

impl GalleryPopulator {
    #[must_use]
    pub fn new(config: GalleryConfig) -> Self {
        let pools = ImagePools::from_config(&config);
        Self {
            config,
            pools,
            selection: None,
            latch: LoadLatch::new(0),
        }
    }

    /// Replace the gallery content with a fresh random selection.
    ///
    /// The returned future resolves once the host has reported every
    /// rendered image through [`settle`](Self::settle).
    pub fn populate<R: Rng + ?Sized>(
        &mut self,
        host: &dyn LayoutMetricsProvider,
        rng: &mut R,
        out: &mut CommandQueue,
    ) -> GalleryReady {
        if !host.element_exists(ElementRole::GalleryContainer) {
            tracing::debug!(target: LOG_TARGET, "gallery container absent; nothing to populate");
            self.selection = None;
            self.latch = LoadLatch::new(0);
            return self.latch.wait();
        }

        let selection =
            GallerySelection::draw(&self.pools, self.config.picks_per_pool, rng);
        out.push(PageCommand::SetInnerHtml {
            role: ElementRole::GalleryContainer,
            html: selection.render_markup(&self.config.alt_text),
        });
        tracing::debug!(
            target: LOG_TARGET,
            images = selection.len(),
            "gallery populated"
        );

        self.latch = LoadLatch::new(selection.len());
        self.selection = Some(selection);
        self.latch.wait()
    }

    /// Record that rendered image `index` finished loading or failed.
    pub fn settle(&mut self, index: usize, outcome: ImageLoadOutcome) -> LatchProgress {
        if outcome == ImageLoadOutcome::Errored {
            let path = self
                .selection
                .as_ref()
                .and_then(|selection| selection.images.get(index))
                .map(ImageRef::path);
            tracing::warn!(target: LOG_TARGET, index, path, "gallery image failed to load");
        }
        let progress = self.latch.settle(index);
        if progress == LatchProgress::Complete {
            tracing::debug!(target: LOG_TARGET, "all gallery images settled");
        }
        progress
    }

    /// The current selection, if the container was present at populate time.
    #[must_use]
    pub fn selection(&self) -> Option<&GallerySelection> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.latch.is_complete()
    }

    #[must_use]
    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
