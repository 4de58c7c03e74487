// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host interface: the toolkit-side primitives the popover controller drives.
//!
//! A [`Host`] owns the element tree, styling, scheduling, and listener
//! registration. It never calls back into the controller; instead the embedder
//! turns whatever fires (frames, timers, DOM-style events) into
//! [`PopoverEvent`](crate::PopoverEvent)s and feeds them to
//! [`Popover::handle`](crate::Popover::handle).
//!
//! Frame and timer handles are minted by the host with [`FrameId::new`] and
//! [`TimerId::new`]; the controller only compares them.

use core::fmt::Debug;

use kurbo::Point;
use understory_placement::GeometryProvider;

use crate::transition::ComputedTiming;

/// Handle of a requested animation frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

impl FrameId {
    /// Wrap a host-assigned frame number.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The host-assigned frame number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Handle of a pending timeout.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Wrap a host-assigned timer number.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The host-assigned timer number.
    pub const fn get(self) -> u64 {
        self.0
    }
}

bitflags::bitflags! {
    /// Event kinds a listener can be registered for.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Listen: u8 {
        /// Click (bubbles).
        const CLICK          = 0b0000_0001;
        /// Pointer entered the element (does not bubble).
        const POINTER_ENTER  = 0b0000_0010;
        /// Pointer left the element (does not bubble).
        const POINTER_LEAVE  = 0b0000_0100;
        /// Pointer moved.
        const POINTER_MOVE   = 0b0000_1000;
        /// Element scrolled.
        const SCROLL         = 0b0001_0000;
        /// A transition finished (bubbles).
        const TRANSITION_END = 0b0010_0000;
        /// An animation finished (bubbles).
        const ANIMATION_END  = 0b0100_0000;
    }
}

/// Where a listener is attached.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListenTarget<E> {
    /// The document as a whole.
    Document,
    /// A specific element.
    Element(E),
}

/// Toolkit primitives used by [`Popover`](crate::Popover).
///
/// Element handles are cheap to clone and compare. Operations on elements that
/// no longer exist are no-ops.
pub trait Host {
    /// Element handle.
    type Element: Clone + PartialEq + Debug;
    /// Geometry source for element rectangles.
    type Geometry: GeometryProvider<Self::Element>;

    /// Element geometry.
    fn geometry(&self) -> &Self::Geometry;

    // --- tree ---

    /// Default mount container (the document body).
    fn body(&self) -> Self::Element;
    /// Create a detached element.
    fn create_element(&mut self) -> Self::Element;
    /// Append `child` to `parent`, detaching it from any previous parent.
    fn append_child(&mut self, parent: &Self::Element, child: &Self::Element);
    /// Remove `child` from `parent`; `false` when it was not a child.
    fn remove_child(&mut self, parent: &Self::Element, child: &Self::Element) -> bool;
    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: &Self::Element, node: &Self::Element) -> bool;
    /// Parent of `element`.
    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;
    /// Whether `element` has scrollable overflow.
    fn is_scrollable(&self, element: &Self::Element) -> bool;
    /// Replace the text content of `element`.
    fn set_text(&mut self, element: &Self::Element, text: &str);

    // --- style ---

    /// Add a class name.
    fn add_class(&mut self, element: &Self::Element, class: &str);
    /// Remove a class name.
    fn remove_class(&mut self, element: &Self::Element, class: &str);
    /// Translate `element` relative to its containing block; `None` clears it.
    fn set_transform(&mut self, element: &Self::Element, offset: Option<Point>);
    /// Toggle visibility without affecting layout.
    fn set_shown(&mut self, element: &Self::Element, shown: bool);
    /// Current computed transition/animation timing.
    fn computed_timing(&self, element: &Self::Element) -> ComputedTiming;

    // --- scheduling ---

    /// Request a callback on the next frame.
    fn request_frame(&mut self) -> FrameId;
    /// Cancel a frame request; unknown ids are ignored.
    fn cancel_frame(&mut self, frame: FrameId);
    /// Schedule a timeout after `delay_ms` milliseconds.
    fn set_timeout(&mut self, delay_ms: f64) -> TimerId;
    /// Cancel a timeout; unknown ids are ignored.
    fn clear_timeout(&mut self, timer: TimerId);

    // --- listeners ---

    /// Start delivering events of `kinds` at `target`.
    fn listen(&mut self, target: &ListenTarget<Self::Element>, kinds: Listen);
    /// Stop delivering events of `kinds` at `target`.
    fn unlisten(&mut self, target: &ListenTarget<Self::Element>, kinds: Listen);

    // --- resize observation ---

    /// Report size changes of `element`.
    fn observe_resize(&mut self, element: &Self::Element);
    /// Stop reporting size changes of `element`.
    fn unobserve_resize(&mut self, element: &Self::Element);
}
