// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_placement --heading-base-level=0

//! Understory Placement: Kurbo-native anchor-relative positioning for popovers and tooltips.
//!
//! Given an anchor rectangle, a panel size, and the container and viewport the panel
//! lives in, [`resolve()`] computes where the panel goes:
//!
//! - One of twelve [`Placement`]s: a main [`Side`] plus a cross-axis [`Align`].
//! - A margin gap and manual translate, optionally covering the anchor instead of abutting it.
//! - Auto-fit: flip to the opposite side when the panel would overflow and the other side
//!   has room, otherwise clamp into the boundary box.
//! - Arrow alignment with the anchor centre, kept away from the panel corners.
//! - Hiding the panel entirely when the anchor scrolls out of its container.
//!
//! The resolver is a pure, allocation-free function. Measuring elements is the job of
//! a [`GeometryProvider`], which reports client rects and derives page and container
//! space from them.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Point, Rect, Size};
//! use understory_placement::{resolve, Placement, ResolveInput};
//!
//! let input = ResolveInput {
//!     placement: Placement::Top,
//!     anchor: Rect::new(100.0, 100.0, 150.0, 120.0),
//!     panel: Size::new(120.0, 40.0),
//!     container: Rect::new(0.0, 0.0, 800.0, 600.0),
//!     viewport: Size::new(800.0, 600.0),
//!     ..ResolveInput::default()
//! };
//! let result = resolve(&input);
//! assert_eq!(result.placement, Placement::Top);
//! assert_eq!(result.offset, Some(Point::new(65.0, 52.0)));
//! ```
//!
//! Near the top edge there is no room above, so the panel flips below:
//!
//! ```rust
//! use kurbo::{Rect, Size};
//! use understory_placement::{resolve, Placement, ResolveInput};
//!
//! let input = ResolveInput {
//!     placement: Placement::TopStart,
//!     anchor: Rect::new(100.0, 10.0, 150.0, 30.0),
//!     panel: Size::new(120.0, 40.0),
//!     container: Rect::new(0.0, 0.0, 800.0, 600.0),
//!     viewport: Size::new(800.0, 600.0),
//!     ..ResolveInput::default()
//! };
//! assert_eq!(resolve(&input).placement, Placement::BottomStart);
//! ```
//!
//! Placements parse from their CSS-style names:
//!
//! ```rust
//! use understory_placement::{Align, Placement, Side};
//!
//! let p: Placement = "left-end".parse().unwrap();
//! assert_eq!((p.side(), p.align()), (Side::Left, Align::End));
//! assert_eq!(p.flipped().to_string(), "right-end");
//! ```
//!
//! ## Coordinate spaces
//!
//! The anchor and the returned offset are in container space; the container rect is in
//! viewport space. Fitting happens in viewport space against either the viewport or,
//! with [`FitFlags::CLIP_TO_CONTAINER`], the container clipped to the viewport.

#![no_std]

pub mod geometry;
pub mod resolve;
pub mod types;

pub use geometry::{CoordinateSpace, GeometryProvider, Viewport, enterable_bounds};
pub use resolve::{DEFAULT_MARGIN, ResolveInput, base_offset, resolve};
pub use types::{Align, ArrowPolicy, FitFlags, ParsePlacementError, Placement, PositionResult, Side};
