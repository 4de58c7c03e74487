// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property-based invariants for the placement resolver.
//!
//! 1. Determinism: identical inputs give identical results.
//! 2. The resolved placement keeps its alignment and stays on the requested axis.
//! 3. With auto-fit, a panel no larger than its boundary (the viewport, or the
//!    container clipped to it) ends up inside that boundary.
//! 4. Arrows stay at least half their own size away from the panel's start edge.
//! 5. Hiding happens exactly when the anchor leaves its container.

use kurbo::{Rect, Size, Vec2};
use proptest::prelude::*;
use understory_placement::{FitFlags, Placement, ResolveInput, resolve};

const VIEW_W: f64 = 800.0;
const VIEW_H: f64 = 600.0;

fn placement() -> impl Strategy<Value = Placement> {
    proptest::sample::select(Placement::ALL.to_vec())
}

/// Integer-valued geometry keeps the comparisons exact.
fn input() -> impl Strategy<Value = ResolveInput> {
    (
        placement(),
        (-200i32..1000, -200i32..800, 0i32..200, 0i32..200),
        (1i32..=800, 1i32..=600),
        (-100i32..100, -100i32..100),
        0i32..24,
    )
        .prop_map(|(placement, (ax, ay, aw, ah), (pw, ph), (cx, cy), margin)| {
            let anchor = Rect::from_origin_size(
                (f64::from(ax), f64::from(ay)),
                (f64::from(aw), f64::from(ah)),
            );
            ResolveInput {
                placement,
                anchor,
                panel: Size::new(f64::from(pw), f64::from(ph)),
                container: Rect::from_origin_size(
                    (f64::from(cx), f64::from(cy)),
                    (VIEW_W, VIEW_H),
                ),
                viewport: Size::new(VIEW_W, VIEW_H),
                translate: Vec2::ZERO,
                margin: f64::from(margin),
                flags: FitFlags::AUTO_FIT,
                arrow: Some(Size::new(12.0, 12.0)),
                ..ResolveInput::default()
            }
        })
}

proptest! {
    #[test]
    fn deterministic(i in input()) {
        prop_assert_eq!(resolve(&i), resolve(&i));
    }
}

proptest! {
    #[test]
    fn flip_keeps_axis_and_alignment(i in input()) {
        let r = resolve(&i);
        let requested = i.placement;
        prop_assert!(
            r.placement == requested || r.placement == requested.flipped(),
            "{requested} resolved to {}",
            r.placement
        );
        prop_assert_eq!(r.placement.align(), requested.align());
    }
}

proptest! {
    #[test]
    fn fitting_panel_stays_in_viewport(i in input()) {
        let r = resolve(&i);
        let offset = r.offset.expect("hide flag not set");
        let origin = i.container.origin().to_vec2();
        let panel = Rect::from_origin_size(offset + origin, i.panel);
        let inside = panel.x0 >= 0.0 && panel.y0 >= 0.0 && panel.x1 <= VIEW_W && panel.y1 <= VIEW_H;
        prop_assert!(
            inside,
            "panel {panel:?} escaped viewport for {:?}",
            i.placement
        );
    }
}

/// Any fit flag mix, a nudge, and a container of any size that still overlaps the viewport.
fn fitted_input() -> impl Strategy<Value = ResolveInput> {
    (
        input(),
        (any::<bool>(), any::<bool>()),
        (-20i32..=20, -20i32..=20),
        (-100i32..=200, -100i32..=200, 300i32..=700, 300i32..=700),
    )
        .prop_map(|(mut i, (clip, cover), (tx, ty), (cx, cy, cw, ch))| {
            i.flags.set(FitFlags::CLIP_TO_CONTAINER, clip);
            i.flags.set(FitFlags::COVER_ANCHOR, cover);
            i.translate = Vec2::new(f64::from(tx), f64::from(ty));
            i.container = Rect::from_origin_size(
                (f64::from(cx), f64::from(cy)),
                (f64::from(cw), f64::from(ch)),
            );
            i
        })
}

proptest! {
    #[test]
    fn fitting_panel_stays_in_boundary(i in fitted_input()) {
        let viewport = i.viewport.to_rect();
        let bounds = if i.flags.contains(FitFlags::CLIP_TO_CONTAINER) {
            i.container.intersect(viewport)
        } else {
            viewport
        };
        prop_assume!(i.panel.width <= bounds.width() && i.panel.height <= bounds.height());

        let r = resolve(&i);
        let offset = r.offset.expect("hide flag not set");
        let panel = Rect::from_origin_size(offset + i.container.origin().to_vec2(), i.panel);
        let eps = 1e-9;
        let inside = panel.x0 >= bounds.x0 - eps
            && panel.y0 >= bounds.y0 - eps
            && panel.x1 <= bounds.x1 + eps
            && panel.y1 <= bounds.y1 + eps;
        prop_assert!(
            inside,
            "panel {panel:?} escaped {bounds:?} for {:?} with {:?}",
            i.placement,
            i.flags
        );
    }
}

proptest! {
    #[test]
    fn arrow_respects_corner_inset(i in input()) {
        let r = resolve(&i);
        if let Some(arrow) = r.arrow {
            let inset = 6.0;
            if r.placement.side().is_vertical() {
                prop_assert!(arrow.x >= inset, "arrow x {} below inset", arrow.x);
            } else {
                prop_assert!(arrow.y >= inset, "arrow y {} below inset", arrow.y);
            }
        }
    }
}

proptest! {
    #[test]
    fn hidden_iff_anchor_outside_container(mut i in input()) {
        i.flags |= FitFlags::HIDE_ON_INVISIBLE;
        let r = resolve(&i);
        let a = i.anchor;
        let outside = a.x0 >= VIEW_W || a.y0 >= VIEW_H || a.x1 <= 0.0 || a.y1 <= 0.0;
        prop_assert_eq!(r.is_hidden(), outside);
        if outside {
            prop_assert!(r.arrow.is_none());
        }
    }
}
