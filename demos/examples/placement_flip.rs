// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement resolution near the viewport edges.
//!
//! Resolves the same panel against anchors in each corner of an 800x600
//! viewport and prints where auto-fit flipped or clamped it.
//!
//! Run:
//! - `cargo run -p understory_demos --example placement_flip`

use kurbo::{Point, Rect, Size};
use understory_placement::{Placement, ResolveInput, resolve};

fn main() {
    let viewport = Size::new(800.0, 600.0);
    let panel = Size::new(160.0, 60.0);
    let anchors = [
        ("top-left", Rect::new(10.0, 10.0, 60.0, 30.0)),
        ("top-right", Rect::new(740.0, 10.0, 790.0, 30.0)),
        ("bottom-left", Rect::new(10.0, 570.0, 60.0, 590.0)),
        ("center", Rect::new(375.0, 290.0, 425.0, 310.0)),
    ];

    for (name, anchor) in anchors {
        let result = resolve(&ResolveInput {
            placement: Placement::TopStart,
            anchor,
            panel,
            container: viewport.to_rect(),
            viewport,
            arrow: Some(Size::new(12.0, 12.0)),
            ..ResolveInput::default()
        });
        println!(
            "{name:>12}: {} at {:?}, arrow {:?}",
            result.placement, result.offset, result.arrow
        );
    }

    // No room above the top-left anchor: the panel flips below it.
    let result = resolve(&ResolveInput {
        placement: Placement::TopStart,
        anchor: anchors[0].1,
        panel,
        container: viewport.to_rect(),
        viewport,
        ..ResolveInput::default()
    });
    assert_eq!(result.placement, Placement::BottomStart);
    assert_eq!(result.offset, Some(Point::new(10.0, 38.0)));
}
