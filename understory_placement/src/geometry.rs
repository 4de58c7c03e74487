// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry provider: element rectangles in viewport, page, or container space.
//!
//! ## Coordinate spaces
//!
//! - [`CoordinateSpace::Viewport`]: the element's client rect, as reported by the host.
//! - [`CoordinateSpace::Page`]: the client rect shifted by the viewport scroll offset.
//! - [`CoordinateSpace::Container`]: the client rect relative to a container's client-rect origin.
//!
//! A single [`resolve`](crate::resolve()) call never mixes spaces: the anchor is
//! measured in container space and the container in viewport space.
//!
//! ## Missing elements
//!
//! Elements that are absent or not yet attached report `None` from
//! [`GeometryProvider::client_rect`]; [`GeometryProvider::rect_of`] maps that to
//! [`Rect::ZERO`] so callers can keep going with a degenerate rectangle.

use kurbo::{Rect, Size, Vec2};

use crate::types::Side;

/// Viewport size and document scroll offset.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Viewport {
    /// Visible area size.
    pub size: Size,
    /// Document scroll offset (page coordinates of the viewport origin).
    pub scroll: Vec2,
}

impl Viewport {
    /// Viewport of the given size with no scroll.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            scroll: Vec2::ZERO,
        }
    }

    /// The viewport as a rectangle in viewport space.
    pub fn rect(&self) -> Rect {
        self.size.to_rect()
    }
}

/// Reference frame for [`GeometryProvider::rect_of`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CoordinateSpace<'a, E> {
    /// Relative to the viewport origin.
    Viewport,
    /// Relative to the document origin.
    Page,
    /// Relative to the given container's client-rect origin.
    Container(&'a E),
}

/// Source of element rectangles.
///
/// Implementors only report client (viewport-relative) rects; the other spaces
/// are derived by [`rect_of`](Self::rect_of).
pub trait GeometryProvider<E> {
    /// Client rect of `element`, or `None` when it is absent or detached.
    fn client_rect(&self, element: &E) -> Option<Rect>;

    /// Current viewport metrics.
    fn viewport(&self) -> Viewport;

    /// Rect of `element` in the requested space; [`Rect::ZERO`] when it has no geometry.
    fn rect_of(&self, element: &E, space: CoordinateSpace<'_, E>) -> Rect {
        let Some(rect) = self.client_rect(element) else {
            return Rect::ZERO;
        };
        match space {
            CoordinateSpace::Viewport => rect,
            CoordinateSpace::Page => rect + self.viewport().scroll,
            CoordinateSpace::Container(container) => {
                let origin = self
                    .client_rect(container)
                    .map(|c| c.origin().to_vec2())
                    .unwrap_or(Vec2::ZERO);
                rect - origin
            }
        }
    }
}

/// The panel rect extended toward the anchor by `margin`.
///
/// A pointer inside this zone is treated as being over the panel, so that
/// crossing the gap between anchor and panel does not count as leaving.
pub fn enterable_bounds(panel: Rect, side: Side, margin: f64) -> Rect {
    let mut zone = panel;
    match side {
        Side::Top => zone.y1 += margin,
        Side::Bottom => zone.y0 -= margin,
        Side::Left => zone.x1 += margin,
        Side::Right => zone.x0 -= margin,
    }
    zone
}
