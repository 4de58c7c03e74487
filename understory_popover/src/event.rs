// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events delivered by the host to [`Popover::handle`](crate::Popover::handle).

use kurbo::Point;

use crate::host::{FrameId, TimerId};
use crate::transition::EndEvent;

/// Something happened that the popover may react to.
///
/// Hosts only deliver element events for targets the popover is listening on
/// (see [`Host::listen`](crate::Host::listen)); anything else is ignored.
#[derive(Clone, Debug, PartialEq)]
pub enum PopoverEvent<E> {
    /// A requested frame arrived.
    Frame(FrameId),
    /// A timeout fired.
    Timer(TimerId),
    /// The anchor was clicked; `target` is the element holding the listener.
    Click {
        /// Listening element.
        target: E,
    },
    /// A click reached the document.
    DocumentClick {
        /// Innermost clicked element, if any.
        target: Option<E>,
    },
    /// The pointer entered the anchor or the panel.
    PointerEnter {
        /// Entered element.
        target: E,
    },
    /// The pointer left the anchor or the panel.
    PointerLeave {
        /// Left element.
        target: E,
        /// Pointer position in viewport space, when known.
        position: Option<Point>,
    },
    /// The pointer moved anywhere in the document.
    PointerMove {
        /// Pointer position in viewport space.
        position: Point,
    },
    /// A scrollable ancestor of the anchor scrolled.
    Scroll {
        /// Scrolled element.
        target: E,
    },
    /// An observed element changed size.
    Resize {
        /// Resized element.
        target: E,
    },
    /// A transition or animation finished.
    End {
        /// Element whose transition finished.
        target: E,
        /// Which end event fired.
        event: EndEvent,
    },
}
