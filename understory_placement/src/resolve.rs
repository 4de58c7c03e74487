// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement resolver: base offsets, auto-fit flipping and clamping, arrow alignment.
//!
//! ## Steps
//!
//! 1. If the anchor is fully outside the container and [`FitFlags::HIDE_ON_INVISIBLE`]
//!    is set, return without an offset.
//! 2. Compute the base offset for the requested placement from anchor geometry,
//!    with the margin and translate applied (and the anchor size folded into the
//!    translate for [`FitFlags::COVER_ANCHOR`]).
//! 3. With [`FitFlags::AUTO_FIT`], flip to the opposite side when the near edge
//!    overflows and the other side has room, otherwise clamp; the cross axis is
//!    only ever clamped.
//! 4. Align the arrow with the anchor centre along the final placement's edge.
//!
//! The resolver is a pure function of its [`ResolveInput`].

use kurbo::{Point, Rect, Size, Vec2};

use crate::types::{Align, ArrowPolicy, FitFlags, Placement, PositionResult, Side};

/// Default main-axis gap between anchor and panel, in pixels.
pub const DEFAULT_MARGIN: f64 = 8.0;

/// Everything [`resolve`] needs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResolveInput {
    /// Requested placement.
    pub placement: Placement,
    /// Anchor rect in container space.
    pub anchor: Rect,
    /// Panel size.
    pub panel: Size,
    /// Container rect in viewport space.
    pub container: Rect,
    /// Viewport size.
    pub viewport: Size,
    /// Manual nudge applied after placement.
    pub translate: Vec2,
    /// Main-axis gap between anchor and panel.
    pub margin: f64,
    /// Fit modifiers.
    pub flags: FitFlags,
    /// Arrow size, if the panel shows one.
    pub arrow: Option<Size>,
    /// Arrow behavior when the anchor centre is out of the arrow's range.
    pub arrow_policy: ArrowPolicy,
}

impl Default for ResolveInput {
    fn default() -> Self {
        Self {
            placement: Placement::Top,
            anchor: Rect::ZERO,
            panel: Size::ZERO,
            container: Rect::ZERO,
            viewport: Size::ZERO,
            translate: Vec2::ZERO,
            margin: DEFAULT_MARGIN,
            flags: FitFlags::default(),
            arrow: None,
            arrow_policy: ArrowPolicy::Clamp,
        }
    }
}

/// Resolve the panel position for `input`.
pub fn resolve(input: &ResolveInput) -> PositionResult {
    let out_of_view = anchor_out_of_view(input.anchor, input.container.size());
    if out_of_view && input.flags.contains(FitFlags::HIDE_ON_INVISIBLE) {
        return PositionResult {
            placement: input.placement,
            offset: None,
            arrow: None,
        };
    }

    let translate = effective_translate(input);
    let mut placement = input.placement;
    let mut offset = base_offset(placement, input.anchor, input.panel, translate);
    if input.flags.contains(FitFlags::AUTO_FIT) {
        (placement, offset) = fit(input, offset, translate);
    }

    let arrow = match input.arrow {
        Some(arrow) if !out_of_view => arrow_offset(
            placement.side(),
            input.anchor,
            input.panel,
            offset,
            arrow,
            input.arrow_policy,
        ),
        _ => None,
    };

    PositionResult {
        placement,
        offset: Some(offset),
        arrow,
    }
}

/// Raw panel offset for `placement`, before any fitting.
///
/// The panel sits flush against the anchor edge on the main axis and is
/// centered, start-aligned, or end-aligned on the cross axis; `translate` is
/// added last.
pub fn base_offset(placement: Placement, anchor: Rect, panel: Size, translate: Vec2) -> Point {
    let cross = |start: f64, len: f64, size: f64| match placement.align() {
        Align::Center => start + len / 2.0 - size / 2.0,
        Align::Start => start,
        Align::End => start + len - size,
    };
    let (x, y) = match placement.side() {
        Side::Top => (
            cross(anchor.x0, anchor.width(), panel.width),
            anchor.y0 - panel.height,
        ),
        Side::Bottom => (cross(anchor.x0, anchor.width(), panel.width), anchor.y1),
        Side::Left => (
            anchor.x0 - panel.width,
            cross(anchor.y0, anchor.height(), panel.height),
        ),
        Side::Right => (anchor.x1, cross(anchor.y0, anchor.height(), panel.height)),
    };
    Point::new(x + translate.x, y + translate.y)
}

/// True when `anchor` (container space) lies entirely outside a container of `size`.
fn anchor_out_of_view(anchor: Rect, size: Size) -> bool {
    anchor.x0 >= size.width || anchor.y0 >= size.height || anchor.x1 <= 0.0 || anchor.y1 <= 0.0
}

/// Translate with the margin pushed away from the anchor and, when covering,
/// the anchor size pulled back over it.
fn effective_translate(input: &ResolveInput) -> Vec2 {
    let mut t = input.translate;
    let cover = input.flags.contains(FitFlags::COVER_ANCHOR);
    let (w, h) = (input.anchor.width(), input.anchor.height());
    match input.placement.side() {
        Side::Top => {
            t.y -= input.margin;
            if cover {
                t.y += h;
            }
        }
        Side::Bottom => {
            t.y += input.margin;
            if cover {
                t.y -= h;
            }
        }
        Side::Left => {
            t.x -= input.margin;
            if cover {
                t.x += w;
            }
        }
        Side::Right => {
            t.x += input.margin;
            if cover {
                t.x -= w;
            }
        }
    }
    t
}

#[derive(Copy, Clone, Debug)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn main(side: Side) -> Self {
        if side.is_vertical() { Self::Y } else { Self::X }
    }

    fn cross(side: Side) -> Self {
        if side.is_vertical() { Self::X } else { Self::Y }
    }

    fn span(self, r: Rect) -> (f64, f64) {
        match self {
            Self::X => (r.x0, r.x1),
            Self::Y => (r.y0, r.y1),
        }
    }

    fn of_point(self, p: Point) -> f64 {
        match self {
            Self::X => p.x,
            Self::Y => p.y,
        }
    }

    fn of_vec(self, v: Vec2) -> f64 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
        }
    }

    fn of_size(self, s: Size) -> f64 {
        match self {
            Self::X => s.width,
            Self::Y => s.height,
        }
    }

    fn set(self, p: &mut Point, value: f64) {
        match self {
            Self::X => p.x = value,
            Self::Y => p.y = value,
        }
    }

    fn negate(self, v: Vec2) -> Vec2 {
        match self {
            Self::X => Vec2::new(-v.x, v.y),
            Self::Y => Vec2::new(v.x, -v.y),
        }
    }
}

/// Boundary box in viewport space.
fn boundary(input: &ResolveInput) -> Rect {
    let viewport = input.viewport.to_rect();
    if input.flags.contains(FitFlags::CLIP_TO_CONTAINER) {
        input.container.intersect(viewport)
    } else {
        viewport
    }
}

/// Keep `[pos, pos + size]` inside `[start, end]`, flush to `start` when it cannot fit.
fn clamp_span(pos: f64, size: f64, start: f64, end: f64) -> f64 {
    if pos < start {
        start
    } else if pos + size > end {
        (end - size).max(start)
    } else {
        pos
    }
}

/// Flip or clamp `offset` (container space) against the boundary box.
fn fit(input: &ResolveInput, offset: Point, translate: Vec2) -> (Placement, Point) {
    let side = input.placement.side();
    let origin = input.container.origin().to_vec2();
    let bounds = boundary(input);
    let anchor = input.anchor + origin;
    let viewport_offset = offset + origin;

    let mut placement = input.placement;
    let mut out = offset;

    // Main axis: flip when the near edge overflows and the far side has room.
    let main = Axis::main(side);
    let (b_start, b_end) = main.span(bounds);
    let (a_start, a_end) = main.span(anchor);
    let size = main.of_size(input.panel);
    let t = main.of_vec(translate);
    let o = main.of_vec(origin);
    let pos = main.of_point(viewport_offset);

    let (overflows_near, room_opposite) = if side.is_leading() {
        (
            pos < b_start,
            b_end - a_end + t >= size && a_end - t >= b_start,
        )
    } else {
        (
            pos + size > b_end,
            a_start - b_start - t >= size && a_start - t <= b_end,
        )
    };

    if overflows_near && room_opposite {
        placement = input.placement.flipped();
        let flipped = base_offset(
            placement,
            input.anchor,
            input.panel,
            main.negate(translate),
        );
        main.set(&mut out, main.of_point(flipped));
    } else {
        main.set(&mut out, clamp_span(pos, size, b_start, b_end) - o);
    }

    // Cross axis: clamp only.
    let cross = Axis::cross(side);
    let (c_start, c_end) = cross.span(bounds);
    let c_pos = cross.of_point(viewport_offset);
    let c_size = cross.of_size(input.panel);
    cross.set(
        &mut out,
        clamp_span(c_pos, c_size, c_start, c_end) - cross.of_vec(origin),
    );

    (placement, out)
}

/// Arrow top-left relative to the panel for a panel placed on `side`.
fn arrow_offset(
    side: Side,
    anchor: Rect,
    panel: Size,
    offset: Point,
    arrow: Size,
    policy: ArrowPolicy,
) -> Option<Point> {
    let half = Size::new(arrow.width / 2.0, arrow.height / 2.0);
    let center = anchor.center();
    let (pos, clamped) = if side.is_vertical() {
        let naive = center.x - offset.x - half.width;
        let x = naive
            .min(panel.width - arrow.width - half.width)
            .max(half.width);
        let y = if side == Side::Top {
            panel.height - half.height
        } else {
            -half.height
        };
        (Point::new(x, y), x != naive)
    } else {
        let naive = center.y - offset.y - half.height;
        let y = naive
            .min(panel.height - arrow.height - half.height)
            .max(half.height);
        let x = if side == Side::Left {
            panel.width - half.width
        } else {
            -half.width
        };
        (Point::new(x, y), y != naive)
    };
    match policy {
        ArrowPolicy::HideWhenClamped if clamped => None,
        _ => Some(pos),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(left: f64, top: f64, width: f64, height: f64) -> Rect {
        Rect::from_origin_size((left, top), (width, height))
    }

    fn input() -> ResolveInput {
        ResolveInput {
            placement: Placement::Top,
            anchor: rect(100.0, 100.0, 50.0, 20.0),
            panel: Size::new(120.0, 40.0),
            container: rect(0.0, 0.0, 800.0, 600.0),
            viewport: Size::new(800.0, 600.0),
            ..Default::default()
        }
    }

    #[test]
    fn centered_top_with_margin() {
        let r = resolve(&input());
        assert_eq!(r.placement, Placement::Top);
        assert_eq!(r.offset, Some(Point::new(65.0, 52.0)));
        assert_eq!(r.arrow, None);
    }

    #[test]
    fn start_and_end_alignment() {
        let mut i = input();
        i.flags = FitFlags::empty();
        i.placement = Placement::BottomStart;
        assert_eq!(resolve(&i).offset, Some(Point::new(100.0, 128.0)));
        i.placement = Placement::BottomEnd;
        assert_eq!(resolve(&i).offset, Some(Point::new(30.0, 128.0)));
        i.placement = Placement::RightEnd;
        assert_eq!(resolve(&i).offset, Some(Point::new(158.0, 80.0)));
        i.placement = Placement::LeftStart;
        assert_eq!(resolve(&i).offset, Some(Point::new(-28.0, 100.0)));
    }

    #[test]
    fn translate_is_added() {
        let mut i = input();
        i.translate = Vec2::new(5.0, -3.0);
        assert_eq!(resolve(&i).offset, Some(Point::new(70.0, 49.0)));
    }

    #[test]
    fn flips_to_bottom_near_top_edge() {
        let mut i = input();
        i.anchor = rect(100.0, 10.0, 50.0, 20.0);
        let r = resolve(&i);
        assert_eq!(r.placement, Placement::Bottom);
        assert_eq!(r.offset, Some(Point::new(65.0, 38.0)));
    }

    #[test]
    fn flip_preserves_alignment() {
        let mut i = input();
        i.placement = Placement::TopEnd;
        i.anchor = rect(300.0, 10.0, 50.0, 20.0);
        let r = resolve(&i);
        assert_eq!(r.placement, Placement::BottomEnd);
        assert_eq!(r.offset, Some(Point::new(230.0, 38.0)));
    }

    #[test]
    fn clamps_to_top_without_room_below() {
        let mut i = input();
        i.container = rect(0.0, 0.0, 800.0, 60.0);
        i.viewport = Size::new(800.0, 60.0);
        i.anchor = rect(100.0, 10.0, 50.0, 20.0);
        let r = resolve(&i);
        assert_eq!(r.placement, Placement::Top);
        assert_eq!(r.offset, Some(Point::new(65.0, 0.0)));
    }

    #[test]
    fn bottom_flips_up_at_bottom_edge() {
        let mut i = input();
        i.placement = Placement::Bottom;
        i.anchor = rect(100.0, 570.0, 50.0, 20.0);
        let r = resolve(&i);
        assert_eq!(r.placement, Placement::Top);
        assert_eq!(r.offset, Some(Point::new(65.0, 522.0)));
    }

    #[test]
    fn right_flips_left_at_right_edge() {
        let mut i = input();
        i.placement = Placement::Right;
        i.anchor = rect(700.0, 100.0, 50.0, 20.0);
        let r = resolve(&i);
        assert_eq!(r.placement, Placement::Left);
        assert_eq!(r.offset, Some(Point::new(572.0, 90.0)));
    }

    #[test]
    fn cross_axis_is_clamped_not_flipped() {
        let mut i = input();
        i.anchor = rect(5.0, 300.0, 20.0, 20.0);
        let r = resolve(&i);
        assert_eq!(r.placement, Placement::Top);
        assert_eq!(r.offset, Some(Point::new(0.0, 252.0)));

        i.anchor = rect(780.0, 300.0, 20.0, 20.0);
        assert_eq!(resolve(&i).offset, Some(Point::new(680.0, 252.0)));
    }

    #[test]
    fn clamp_uses_container_offset_when_clipping_to_viewport() {
        // Container scrolled 100px above the viewport; the viewport top is container y = 100.
        let mut i = input();
        i.container = rect(0.0, -100.0, 800.0, 1000.0);
        i.anchor = rect(100.0, 110.0, 50.0, 20.0);
        i.panel = Size::new(120.0, 600.0);
        let r = resolve(&i);
        assert_eq!(r.placement, Placement::Top);
        assert_eq!(r.offset, Some(Point::new(65.0, 100.0)));
    }

    #[test]
    fn clip_to_container_bounds() {
        let mut i = input();
        i.container = rect(100.0, 100.0, 300.0, 300.0);
        i.flags = FitFlags::AUTO_FIT | FitFlags::CLIP_TO_CONTAINER;
        i.placement = Placement::Right;
        i.anchor = rect(200.0, 10.0, 50.0, 20.0);
        let r = resolve(&i);
        // Overflows the container's right edge (viewport x 400), so flips left.
        assert_eq!(r.placement, Placement::Left);
        assert_eq!(r.offset, Some(Point::new(72.0, 0.0)));

        // Against the viewport alone there is room on the right.
        i.flags = FitFlags::AUTO_FIT;
        let r = resolve(&i);
        assert_eq!(r.placement, Placement::Right);
        assert_eq!(r.offset, Some(Point::new(258.0, 0.0)));
    }

    #[test]
    fn oversized_panel_is_flush_to_start() {
        let mut i = input();
        i.panel = Size::new(1000.0, 40.0);
        let r = resolve(&i);
        assert_eq!(r.offset.map(|p| p.x), Some(0.0));
    }

    #[test]
    fn cover_anchor_overlaps() {
        let mut i = input();
        i.flags |= FitFlags::COVER_ANCHOR;
        i.margin = 0.0;
        let r = resolve(&i);
        // Panel bottom edge sits on the anchor bottom edge.
        assert_eq!(r.offset, Some(Point::new(65.0, 80.0)));

        i.placement = Placement::Right;
        let r = resolve(&i);
        assert_eq!(r.offset, Some(Point::new(100.0, 90.0)));
    }

    #[test]
    fn no_auto_fit_leaves_overflow() {
        let mut i = input();
        i.flags = FitFlags::empty();
        i.anchor = rect(100.0, 10.0, 50.0, 20.0);
        let r = resolve(&i);
        assert_eq!(r.placement, Placement::Top);
        assert_eq!(r.offset, Some(Point::new(65.0, -38.0)));
    }

    #[test]
    fn hides_when_anchor_scrolled_above() {
        let mut i = input();
        i.flags |= FitFlags::HIDE_ON_INVISIBLE;
        i.anchor = rect(100.0, -40.0, 50.0, 20.0);
        i.arrow = Some(Size::new(16.0, 16.0));
        let r = resolve(&i);
        assert!(r.is_hidden());
        assert_eq!(r.arrow, None);
        assert_eq!(r.placement, Placement::Top);
    }

    #[test]
    fn out_of_view_without_hide_still_positions_but_drops_arrow() {
        let mut i = input();
        i.anchor = rect(100.0, -40.0, 50.0, 20.0);
        i.arrow = Some(Size::new(16.0, 16.0));
        let r = resolve(&i);
        assert!(r.offset.is_some());
        assert_eq!(r.arrow, None);
    }

    #[test]
    fn arrow_centered_on_anchor() {
        let mut i = input();
        i.arrow = Some(Size::new(16.0, 16.0));
        let r = resolve(&i);
        // Anchor centre x = 125, panel x = 65 → 60 - 8.
        assert_eq!(r.arrow, Some(Point::new(52.0, 32.0)));

        i.placement = Placement::Bottom;
        assert_eq!(resolve(&i).arrow, Some(Point::new(52.0, -8.0)));
    }

    #[test]
    fn arrow_clamped_to_half_width() {
        let mut i = input();
        i.panel = Size::new(300.0, 40.0);
        i.arrow = Some(Size::new(16.0, 16.0));
        i.placement = Placement::TopStart;
        // Anchor centre 13px right of the panel start → naive arrow x = 5.
        i.anchor = rect(100.0, 100.0, 26.0, 20.0);
        let r = resolve(&i);
        assert_eq!(r.offset.map(|p| p.x), Some(100.0));
        assert_eq!(r.arrow.map(|p| p.x), Some(8.0));

        i.arrow_policy = ArrowPolicy::HideWhenClamped;
        assert_eq!(resolve(&i).arrow, None);
    }

    #[test]
    fn arrow_on_side_placements() {
        let mut i = input();
        i.placement = Placement::Left;
        i.anchor = rect(400.0, 100.0, 50.0, 20.0);
        i.arrow = Some(Size::new(10.0, 10.0));
        let r = resolve(&i);
        assert_eq!(r.offset, Some(Point::new(272.0, 90.0)));
        assert_eq!(r.arrow, Some(Point::new(115.0, 15.0)));
    }

    #[test]
    fn degenerate_rects_do_not_produce_nan() {
        let i = ResolveInput {
            arrow: Some(Size::ZERO),
            ..Default::default()
        };
        let r = resolve(&i);
        let p = r.offset.unwrap();
        assert!(p.x.is_finite() && p.y.is_finite());
        let a = r.arrow;
        assert!(a.is_none() || a.is_some_and(|a| a.x.is_finite() && a.y.is_finite()));
    }

    #[test]
    fn deterministic() {
        let mut i = input();
        i.anchor = rect(790.0, 5.0, 10.0, 10.0);
        i.arrow = Some(Size::new(12.0, 6.0));
        assert_eq!(resolve(&i), resolve(&i));
    }
}
