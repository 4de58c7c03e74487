// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_popover --heading-base-level=0

//! Understory Popover: the open/close lifecycle of popovers and tooltips.
//!
//! A [`Popover`] owns a panel (root, wrapper, content, optional arrow) and keeps it
//! positioned against an anchor using [`understory_placement`]. It handles:
//!
//! - Click and hover triggering, open/close delays, and click-outside dismissal.
//! - Enter/exit class sequencing (`{name}-enter-from`, `-enter-active`, `-enter-to`,
//!   and the exit mirror) that waits for the host's transition or animation end.
//! - Races such as closing during the enter sequence or reopening during the exit.
//! - Hover tolerance for the gap between anchor and panel.
//! - Repositioning on resize and scroll, or closing on scroll.
//!
//! Effects go through a [`Host`]: element tree edits, classes, transforms,
//! frames, timers, and listener registration. The host reports what fires back as
//! [`PopoverEvent`]s via [`Popover::handle`]. Nothing is shared between instances.
//!
//! [`Scene`] is a complete in-memory host with a virtual clock, useful for tests,
//! demos, and headless embedding.
//!
//! # Example
//!
//! ```rust
//! use kurbo::{Point, Rect, Size};
//! use understory_popover::{Anchor, Content, Placement, Popover, PopoverConfig, Scene};
//!
//! let mut scene = Scene::new(Size::new(800.0, 600.0));
//! let body = scene.body_id();
//! let button = scene.add_box(body, Rect::new(100.0, 100.0, 150.0, 120.0));
//!
//! let mut config = PopoverConfig::new(Anchor::Element(button), Content::Text("Saved".into()));
//! config.options.show_arrow = false;
//! let mut popover = Popover::new(scene, config).unwrap();
//! let content = *popover.content();
//! popover.host_mut().set_size(content, Size::new(120.0, 40.0));
//!
//! popover.click(button);
//! assert!(popover.is_opened());
//! assert_eq!(popover.placement(), Some(Placement::Top));
//! assert_eq!(popover.host().transform(*popover.panel()), Some(Point::new(65.0, 52.0)));
//! assert!(popover.host().has_class(*popover.wrapper(), "fade-enter-from"));
//!
//! popover.next_frame();
//! assert!(popover.host().has_class(*popover.wrapper(), "fade-enter-active"));
//! popover.next_frame();
//! assert!(!popover.is_animating());
//!
//! // A click outside closes; the panel detaches after the exit sequence.
//! popover.click(body);
//! assert!(!popover.is_opened());
//! popover.run_until_idle();
//! assert!(!popover.host().is_attached(*popover.panel()));
//! ```

#![no_std]

extern crate alloc;

pub mod classes;
pub mod config;
pub mod controller;
pub mod event;
pub mod host;
pub mod listeners;
pub mod scene;
pub mod transition;

pub use classes::{ARROW_CLASS, AnimationClasses, CONTENT_CLASS, ROOT_CLASS, WRAPPER_CLASS};
pub use config::{
    Anchor, Callbacks, ConfigChanges, ConfigError, ConfigPatch, Content, Emit, PopoverConfig,
    PopoverOptions,
};
pub use controller::Popover;
pub use event::PopoverEvent;
pub use host::{FrameId, Host, Listen, ListenTarget, TimerId};
pub use listeners::ListenerSet;
pub use scene::{ElementId, FRAME_MS, Scene};
pub use transition::{ComputedTiming, EndEvent, TransitionInfo, parse_time_ms, transition_info};

pub use understory_placement::{ArrowPolicy, Placement};
