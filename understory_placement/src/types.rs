// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for placement: sides, alignments, placements, fit flags, and results.

use core::fmt;
use core::str::FromStr;

use kurbo::Point;

/// Main side of the anchor the panel is placed against.
///
/// Also serves as the *boundary direction* of a placement: the three
/// placements sharing a side clip against the same edge set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Side {
    /// Panel above the anchor.
    Top,
    /// Panel below the anchor.
    Bottom,
    /// Panel left of the anchor.
    Left,
    /// Panel right of the anchor.
    Right,
}

impl Side {
    /// The side across the anchor.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Whether the main axis of this side is vertical (`Top`/`Bottom`).
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// Whether the panel extends toward the start of the main axis
    /// (up for `Top`, left for `Left`).
    pub const fn is_leading(self) -> bool {
        matches!(self, Self::Top | Self::Left)
    }

    /// Lowercase CSS-style name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

/// Cross-axis alignment of the panel against the anchor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Align {
    /// Centers aligned.
    #[default]
    Center,
    /// Start edges aligned (left or top).
    Start,
    /// Far edges aligned (right or bottom).
    End,
}

/// Requested or resolved position of the panel relative to its anchor.
///
/// Every placement decomposes into a [`Side`] and an [`Align`]; see
/// [`Placement::side`] and [`Placement::align`].
/// The text form is the CSS-style name used by class names, e.g. `top-start`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum Placement {
    /// Above, centered.
    #[default]
    Top,
    /// Above, left edges aligned.
    TopStart,
    /// Above, right edges aligned.
    TopEnd,
    /// Below, centered.
    Bottom,
    /// Below, left edges aligned.
    BottomStart,
    /// Below, right edges aligned.
    BottomEnd,
    /// Left, centered.
    Left,
    /// Left, top edges aligned.
    LeftStart,
    /// Left, bottom edges aligned.
    LeftEnd,
    /// Right, centered.
    Right,
    /// Right, top edges aligned.
    RightStart,
    /// Right, bottom edges aligned.
    RightEnd,
}

impl Placement {
    /// All twelve placements.
    pub const ALL: [Self; 12] = [
        Self::Top,
        Self::TopStart,
        Self::TopEnd,
        Self::Bottom,
        Self::BottomStart,
        Self::BottomEnd,
        Self::Left,
        Self::LeftStart,
        Self::LeftEnd,
        Self::Right,
        Self::RightStart,
        Self::RightEnd,
    ];

    /// Compose a placement from its side and alignment.
    pub const fn new(side: Side, align: Align) -> Self {
        match (side, align) {
            (Side::Top, Align::Center) => Self::Top,
            (Side::Top, Align::Start) => Self::TopStart,
            (Side::Top, Align::End) => Self::TopEnd,
            (Side::Bottom, Align::Center) => Self::Bottom,
            (Side::Bottom, Align::Start) => Self::BottomStart,
            (Side::Bottom, Align::End) => Self::BottomEnd,
            (Side::Left, Align::Center) => Self::Left,
            (Side::Left, Align::Start) => Self::LeftStart,
            (Side::Left, Align::End) => Self::LeftEnd,
            (Side::Right, Align::Center) => Self::Right,
            (Side::Right, Align::Start) => Self::RightStart,
            (Side::Right, Align::End) => Self::RightEnd,
        }
    }

    /// Main side (also the boundary direction).
    pub const fn side(self) -> Side {
        match self {
            Self::Top | Self::TopStart | Self::TopEnd => Side::Top,
            Self::Bottom | Self::BottomStart | Self::BottomEnd => Side::Bottom,
            Self::Left | Self::LeftStart | Self::LeftEnd => Side::Left,
            Self::Right | Self::RightStart | Self::RightEnd => Side::Right,
        }
    }

    /// Cross-axis alignment.
    pub const fn align(self) -> Align {
        match self {
            Self::Top | Self::Bottom | Self::Left | Self::Right => Align::Center,
            Self::TopStart | Self::BottomStart | Self::LeftStart | Self::RightStart => Align::Start,
            Self::TopEnd | Self::BottomEnd | Self::LeftEnd | Self::RightEnd => Align::End,
        }
    }

    /// Same alignment on the opposite side.
    pub const fn flipped(self) -> Self {
        Self::new(self.side().opposite(), self.align())
    }

    /// CSS-style name, e.g. `"bottom-end"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::TopStart => "top-start",
            Self::TopEnd => "top-end",
            Self::Bottom => "bottom",
            Self::BottomStart => "bottom-start",
            Self::BottomEnd => "bottom-end",
            Self::Left => "left",
            Self::LeftStart => "left-start",
            Self::LeftEnd => "left-end",
            Self::Right => "right",
            Self::RightStart => "right-start",
            Self::RightEnd => "right-end",
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown placement name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown placement; expected `top`, `bottom`, `left` or `right`, optionally suffixed with `-start` or `-end`")]
pub struct ParsePlacementError;

impl FromStr for Placement {
    type Err = ParsePlacementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (side, align) = match s.split_once('-') {
            Some((side, "start")) => (side, Align::Start),
            Some((side, "end")) => (side, Align::End),
            Some(_) => return Err(ParsePlacementError),
            None => (s, Align::Center),
        };
        let side = match side {
            "top" => Side::Top,
            "bottom" => Side::Bottom,
            "left" => Side::Left,
            "right" => Side::Right,
            _ => return Err(ParsePlacementError),
        };
        Ok(Self::new(side, align))
    }
}

bitflags::bitflags! {
    /// Modifiers for [`resolve`](crate::resolve()).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct FitFlags: u8 {
        /// Flip or clamp the panel so it stays inside the boundary box.
        const AUTO_FIT          = 0b0000_0001;
        /// Overlap the anchor instead of abutting it.
        const COVER_ANCHOR      = 0b0000_0010;
        /// Boundary is the container intersected with the viewport (instead of the viewport alone).
        const CLIP_TO_CONTAINER = 0b0000_0100;
        /// Return no offset when the anchor is fully outside the container.
        const HIDE_ON_INVISIBLE = 0b0000_1000;
    }
}

impl Default for FitFlags {
    fn default() -> Self {
        Self::AUTO_FIT
    }
}

/// What to do with the arrow when the anchor centre falls outside the range
/// the arrow can occupy along the panel edge.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum ArrowPolicy {
    /// Always clamp the arrow into range; never hide it.
    #[default]
    Clamp,
    /// Hide the arrow whenever clamping was needed.
    HideWhenClamped,
}

/// Output of [`resolve`](crate::resolve()).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PositionResult {
    /// Placement after auto-fit; differs from the request only when flipped.
    pub placement: Placement,
    /// Panel top-left in container space.
    ///
    /// `None` when the anchor is out of view and [`FitFlags::HIDE_ON_INVISIBLE`] is set.
    pub offset: Option<Point>,
    /// Arrow top-left relative to the panel, when an arrow size was given and the anchor is visible.
    pub arrow: Option<Point>,
}

impl PositionResult {
    /// Whether the panel should be hidden instead of positioned.
    pub fn is_hidden(&self) -> bool {
        self.offset.is_none()
    }
}
