//! Property-based invariant tests for the page components.
//!
//! 1. Gallery selection: at most 10 images, orientation alternates starting
//!    horizontal, no duplicate within a subset, every image from its pool.
//! 2. Lightbox index stays in range under arbitrary input; out-of-range
//!    `open` leaves the state unchanged.
//! 3. Lightbox navigation wraps at both ends.
//! 4. Track translation magnitude stays within `[0, overflow]`.

use std::collections::HashSet;

use keepsake_core::command::CommandQueue;
use keepsake_core::gallery::{GalleryConfig, GallerySelection, ImagePools, Orientation};
use keepsake_core::lightbox::{Lightbox, LightboxControl, LightboxHit, LightboxKey, LightboxState};
use keepsake_core::metrics::StaticLayout;
use keepsake_core::track::{HorizontalScrollTrack, translation_for};
use keepsake_core::ElementRole;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

// ── Strategies ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum LightboxOp {
    Open(usize),
    Next,
    Prev,
    Close,
    Key(LightboxKey),
    Backdrop,
    Control(LightboxControl),
}

fn lightbox_op() -> impl Strategy<Value = LightboxOp> {
    prop_oneof![
        (0usize..24).prop_map(LightboxOp::Open),
        Just(LightboxOp::Next),
        Just(LightboxOp::Prev),
        Just(LightboxOp::Close),
        prop_oneof![
            Just(LightboxKey::ArrowLeft),
            Just(LightboxKey::ArrowRight),
            Just(LightboxKey::Escape),
            Just(LightboxKey::Other),
        ]
        .prop_map(LightboxOp::Key),
        Just(LightboxOp::Backdrop),
        prop_oneof![
            Just(LightboxControl::Prev),
            Just(LightboxControl::Next),
            Just(LightboxControl::Close),
        ]
        .prop_map(LightboxOp::Control),
    ]
}

fn bound_lightbox(len: usize) -> Lightbox {
    let mut lightbox = Lightbox::new();
    let mut out = CommandQueue::new();
    lightbox.bind((0..len).map(|i| format!("images/{i}.jpg")).collect(), &mut out);
    lightbox
}

fn apply(lightbox: &mut Lightbox, op: &LightboxOp, out: &mut CommandQueue) {
    match op {
        LightboxOp::Open(index) => {
            let _ = lightbox.open(*index, out);
        }
        LightboxOp::Next => lightbox.next(out),
        LightboxOp::Prev => lightbox.prev(out),
        LightboxOp::Close => lightbox.close(out),
        LightboxOp::Key(key) => {
            lightbox.on_key(*key, out);
        }
        LightboxOp::Backdrop => lightbox.on_click(LightboxHit::Backdrop, out),
        LightboxOp::Control(control) => lightbox.on_control(*control, out),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 1. Gallery selection shape
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn selection_alternates_and_stays_in_pool(seed in any::<u64>()) {
        let pools = ImagePools::from_config(&GalleryConfig::default());
        let mut rng = SmallRng::seed_from_u64(seed);
        let selection = GallerySelection::draw(&pools, 5, &mut rng);

        prop_assert!(selection.len() <= 10);
        prop_assert_eq!(selection.len(), 10);

        let horizontal_pool: HashSet<&str> = pools.horizontal.iter().map(|i| i.path()).collect();
        let vertical_pool: HashSet<&str> = pools.vertical.iter().map(|i| i.path()).collect();
        let mut seen_h = HashSet::new();
        let mut seen_v = HashSet::new();

        for (position, image) in selection.images().iter().enumerate() {
            let expected = if position % 2 == 0 {
                Orientation::Horizontal
            } else {
                Orientation::Vertical
            };
            prop_assert_eq!(image.orientation(), expected);
            match image.orientation() {
                Orientation::Horizontal => {
                    prop_assert!(horizontal_pool.contains(image.path()));
                    prop_assert!(seen_h.insert(image.path()), "duplicate {}", image.path());
                }
                Orientation::Vertical => {
                    prop_assert!(vertical_pool.contains(image.path()));
                    prop_assert!(seen_v.insert(image.path()), "duplicate {}", image.path());
                }
            }
        }
    }

    #[test]
    fn uneven_pools_still_start_horizontal(
        seed in any::<u64>(),
        horizontal in 1usize..6,
        vertical in 1usize..6,
    ) {
        let config = GalleryConfig {
            horizontal_pool: horizontal,
            vertical_pool: vertical,
            ..GalleryConfig::default()
        };
        let pools = ImagePools::from_config(&config);
        let mut rng = SmallRng::seed_from_u64(seed);
        let selection = GallerySelection::draw(&pools, 5, &mut rng);

        prop_assert_eq!(selection.len(), horizontal.min(5) + vertical.min(5));
        prop_assert_eq!(selection.images()[0].orientation(), Orientation::Horizontal);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 2. Lightbox index bounds
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn lightbox_index_always_in_range(
        len in 1usize..16,
        ops in proptest::collection::vec(lightbox_op(), 0..64),
    ) {
        let mut lightbox = bound_lightbox(len);
        let mut out = CommandQueue::new();
        for op in &ops {
            apply(&mut lightbox, op, &mut out);
            if let LightboxState::Open { index } = lightbox.state() {
                prop_assert!(index < len, "index {} with {} images", index, len);
            }
        }
    }

    #[test]
    fn out_of_range_open_leaves_state_unchanged(
        len in 1usize..16,
        ops in proptest::collection::vec(lightbox_op(), 0..16),
        overshoot in 0usize..100,
    ) {
        let mut lightbox = bound_lightbox(len);
        let mut out = CommandQueue::new();
        for op in &ops {
            apply(&mut lightbox, op, &mut out);
        }
        let before = lightbox.state();
        out.drain();

        prop_assert!(lightbox.open(len + overshoot, &mut out).is_err());
        prop_assert_eq!(lightbox.state(), before);
        prop_assert!(out.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 3. Navigation wraps
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn next_from_last_wraps_to_first(len in 1usize..32) {
        let mut lightbox = bound_lightbox(len);
        let mut out = CommandQueue::new();
        lightbox.open(len - 1, &mut out).expect("in range");
        lightbox.next(&mut out);
        prop_assert_eq!(lightbox.state(), LightboxState::Open { index: 0 });
    }

    #[test]
    fn prev_from_first_wraps_to_last(len in 1usize..32) {
        let mut lightbox = bound_lightbox(len);
        let mut out = CommandQueue::new();
        lightbox.open(0, &mut out).expect("in range");
        lightbox.prev(&mut out);
        prop_assert_eq!(lightbox.state(), LightboxState::Open { index: len - 1 });
    }

    #[test]
    fn full_cycle_returns_home(len in 1usize..32, start in 0usize..32) {
        let start = start % len;
        let mut lightbox = bound_lightbox(len);
        let mut out = CommandQueue::new();
        lightbox.open(start, &mut out).expect("in range");
        for _ in 0..len {
            lightbox.next(&mut out);
        }
        prop_assert_eq!(lightbox.state().index(), Some(start));
    }
}

// ═══════════════════════════════════════════════════════════════════════
// 4. Track clamp
// ═══════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn translation_is_clamped(
        scroll_y in -1.0e6f64..1.0e6,
        section_top in -1.0e4f64..1.0e5,
        overflow in 0.0f64..1.0e5,
    ) {
        let translation = translation_for(scroll_y, section_top, overflow);
        prop_assert!(translation <= 0.0);
        prop_assert!(-translation <= overflow);
    }

    #[test]
    fn track_update_never_exceeds_overflow(
        scroll_width in 801.0f64..10_000.0,
        positions in proptest::collection::vec(-5_000.0f64..50_000.0, 1..40),
    ) {
        let mut host = StaticLayout::full_page(1280.0)
            .with_widths(ElementRole::TrackStrip, scroll_width, 0.0)
            .with_widths(ElementRole::TrackContainer, 0.0, 800.0)
            .with_offset_top(ElementRole::TrackSection, 1_000.0);
        let mut track = HorizontalScrollTrack::new(768.0);
        let mut out = CommandQueue::new();
        track.setup(&host, &mut out).expect("track present");

        for scroll_y in positions {
            host.set_scroll_y(scroll_y);
            track.update(scroll_y, &host, &mut out);
            let translation = track.layout().translation;
            prop_assert!(translation <= 0.0);
            prop_assert!(-translation <= track.overflow_distance());
        }
    }
}
