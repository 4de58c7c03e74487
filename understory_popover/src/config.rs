// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction configuration, runtime patches, and lifecycle callbacks.
//!
//! [`PopoverOptions`] is plain data with defaults for every field; the element
//! handles and callbacks live next to it in [`PopoverConfig`]. Later changes go
//! through a [`ConfigPatch`], whose set fields are diffed against the current
//! configuration and reported as [`ConfigChanges`].

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use kurbo::{Rect, Vec2};
use understory_placement::{ArrowPolicy, DEFAULT_MARGIN, FitFlags, Placement, PositionResult};

/// Interaction that opens and closes the popover.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Emit {
    /// Toggle on anchor click.
    #[default]
    Click,
    /// Open on pointer enter, close on leave.
    Hover,
}

/// Reference the popover is positioned against.
pub enum Anchor<E> {
    /// A host element; interaction listeners are installed on it.
    Element(E),
    /// A rectangle provider in viewport space (e.g. a text selection or cursor).
    ///
    /// No listeners are installed; drive the popover with
    /// [`Popover::open`](crate::Popover::open) and friends.
    Virtual(Box<dyn Fn() -> Rect>),
}

impl<E> Anchor<E> {
    /// The element, when this anchor is one.
    pub fn element(&self) -> Option<&E> {
        match self {
            Self::Element(e) => Some(e),
            Self::Virtual(_) => None,
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for Anchor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(e) => f.debug_tuple("Element").field(e).finish(),
            Self::Virtual(_) => f.write_str("Virtual(..)"),
        }
    }
}

/// Panel content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content<E> {
    /// An existing host element, moved into the panel.
    Element(E),
    /// Text placed in a newly created element.
    Text(String),
}

/// Plain-data options; every field has a default.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PopoverOptions {
    /// Requested placement.
    pub placement: Placement,
    /// Create and position an arrow element.
    pub show_arrow: bool,
    /// Anchor interaction.
    pub emit: Emit,
    /// Delay before opening, in milliseconds.
    pub open_delay: f64,
    /// Delay before closing, in milliseconds.
    pub close_delay: f64,
    /// Open on the first frame after construction.
    pub open: bool,
    /// Ignore open requests.
    pub disabled: bool,
    /// For hover popovers, keep open while the pointer is over the panel.
    pub enterable: bool,
    /// Reposition when observed elements resize.
    pub auto_update: bool,
    /// Reposition when a scrollable ancestor of the anchor scrolls.
    pub auto_scroll: bool,
    /// Base of the enter/exit class names; empty disables animation.
    pub animation_class: String,
    /// Run the exit sequence on close.
    pub close_animation: bool,
    /// Close on a click outside the anchor and panel.
    pub click_outside_close: bool,
    /// Close instead of repositioning on scroll.
    pub close_on_scroll: bool,
    /// Manual nudge after placement.
    pub translate: Vec2,
    /// Gap between anchor and panel.
    pub margin: f64,
    /// Flip or clamp to stay in view.
    pub auto_fit: bool,
    /// Overlap the anchor instead of abutting it.
    pub cover_trigger: bool,
    /// Hide the panel when the anchor leaves its container.
    pub hide_on_invisible: bool,
    /// Fit against the container clipped to the viewport instead of the viewport alone.
    pub clip_to_container: bool,
    /// Arrow behavior when out of range.
    pub arrow_policy: ArrowPolicy,
    /// Extra class on the wrapper element.
    pub wrapper_class: Option<String>,
    /// Class added to the anchor element while open.
    pub trigger_open_class: Option<String>,
}

impl Default for PopoverOptions {
    fn default() -> Self {
        Self {
            placement: Placement::Top,
            show_arrow: true,
            emit: Emit::Click,
            open_delay: 0.0,
            close_delay: 0.0,
            open: false,
            disabled: false,
            enterable: true,
            auto_update: true,
            auto_scroll: true,
            animation_class: String::from("fade"),
            close_animation: true,
            click_outside_close: true,
            close_on_scroll: false,
            translate: Vec2::ZERO,
            margin: DEFAULT_MARGIN,
            auto_fit: true,
            cover_trigger: false,
            hide_on_invisible: false,
            clip_to_container: false,
            arrow_policy: ArrowPolicy::Clamp,
            wrapper_class: None,
            trigger_open_class: None,
        }
    }
}

impl PopoverOptions {
    /// Resolver flags for these options.
    pub fn fit_flags(&self) -> FitFlags {
        let mut flags = FitFlags::empty();
        flags.set(FitFlags::AUTO_FIT, self.auto_fit);
        flags.set(FitFlags::COVER_ANCHOR, self.cover_trigger);
        flags.set(FitFlags::CLIP_TO_CONTAINER, self.clip_to_container);
        flags.set(FitFlags::HIDE_ON_INVISIBLE, self.hide_on_invisible);
        flags
    }

    /// Whether hover interactions may enter the panel.
    pub fn hover_enterable(&self) -> bool {
        self.emit == Emit::Hover && self.enterable
    }
}

/// Lifecycle hooks. Unset hooks are skipped.
#[derive(Default)]
pub struct Callbacks {
    /// A fresh open happened.
    pub on_open: Option<Box<dyn FnMut()>>,
    /// A close happened (before any exit sequence finishes).
    pub on_close: Option<Box<dyn FnMut()>>,
    /// The enter sequence is about to start.
    pub on_before_enter: Option<Box<dyn FnMut()>>,
    /// The enter sequence finished.
    pub on_entered: Option<Box<dyn FnMut()>>,
    /// The exit sequence is about to start.
    pub on_before_exit: Option<Box<dyn FnMut()>>,
    /// The exit sequence finished and the panel was detached.
    pub on_exited: Option<Box<dyn FnMut()>>,
    /// A click landed outside the anchor and panel.
    pub on_click_outside: Option<Box<dyn FnMut()>>,
    /// A position was resolved and is about to be applied.
    pub on_before_position: Option<Box<dyn FnMut(&PositionResult)>>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_open", &self.on_open.is_some())
            .field("on_close", &self.on_close.is_some())
            .field("on_before_enter", &self.on_before_enter.is_some())
            .field("on_entered", &self.on_entered.is_some())
            .field("on_before_exit", &self.on_before_exit.is_some())
            .field("on_exited", &self.on_exited.is_some())
            .field("on_click_outside", &self.on_click_outside.is_some())
            .field("on_before_position", &self.on_before_position.is_some())
            .finish()
    }
}

/// Everything needed to build a [`Popover`](crate::Popover).
#[derive(Debug)]
pub struct PopoverConfig<E> {
    /// Anchor; required.
    pub trigger: Option<Anchor<E>>,
    /// Panel content; required.
    pub content: Option<Content<E>>,
    /// Element the panel is attached to; defaults to the host body.
    pub mount_container: Option<E>,
    /// Plain-data options.
    pub options: PopoverOptions,
    /// Lifecycle hooks.
    pub callbacks: Callbacks,
}

impl<E> Default for PopoverConfig<E> {
    fn default() -> Self {
        Self {
            trigger: None,
            content: None,
            mount_container: None,
            options: PopoverOptions::default(),
            callbacks: Callbacks::default(),
        }
    }
}

impl<E> PopoverConfig<E> {
    /// Configuration with the two required parts set and default options.
    pub fn new(trigger: Anchor<E>, content: Content<E>) -> Self {
        Self {
            trigger: Some(trigger),
            content: Some(content),
            ..Self::default()
        }
    }
}

/// Reasons a [`Popover`](crate::Popover) cannot be built.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// No anchor was given.
    #[error("popover configuration is missing a trigger")]
    MissingTrigger,
    /// No content was given.
    #[error("popover configuration is missing content")]
    MissingContent,
}

bitflags::bitflags! {
    /// Fields changed by a [`ConfigPatch`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ConfigChanges: u32 {
        /// `trigger`
        const TRIGGER             = 1 << 0;
        /// `content`
        const CONTENT             = 1 << 1;
        /// `mount_container`
        const MOUNT_CONTAINER     = 1 << 2;
        /// `placement`
        const PLACEMENT           = 1 << 3;
        /// `show_arrow`
        const SHOW_ARROW          = 1 << 4;
        /// `emit`
        const EMIT                = 1 << 5;
        /// `open_delay` or `close_delay`
        const DELAYS              = 1 << 6;
        /// `disabled`
        const DISABLED            = 1 << 7;
        /// `enterable`
        const ENTERABLE           = 1 << 8;
        /// `auto_update`
        const AUTO_UPDATE         = 1 << 9;
        /// `auto_scroll`
        const AUTO_SCROLL         = 1 << 10;
        /// `animation_class`
        const ANIMATION_CLASS     = 1 << 11;
        /// `close_animation`
        const CLOSE_ANIMATION     = 1 << 12;
        /// `click_outside_close`
        const CLICK_OUTSIDE_CLOSE = 1 << 13;
        /// `close_on_scroll`
        const CLOSE_ON_SCROLL     = 1 << 14;
        /// `translate` or `margin`
        const OFFSET              = 1 << 15;
        /// `auto_fit`, `cover_trigger`, `hide_on_invisible` or `clip_to_container`
        const FIT                 = 1 << 16;
        /// `arrow_policy`
        const ARROW_POLICY        = 1 << 17;
        /// `wrapper_class`
        const WRAPPER_CLASS       = 1 << 18;
        /// `trigger_open_class`
        const TRIGGER_OPEN_CLASS  = 1 << 19;
    }
}

/// Partial configuration for [`Popover::update_config`](crate::Popover::update_config).
///
/// Only `Some` fields are considered; a field equal to its current value is
/// not a change.
#[derive(Debug)]
pub struct ConfigPatch<E> {
    /// New anchor. Virtual anchors always count as changed.
    pub trigger: Option<Anchor<E>>,
    /// New content.
    pub content: Option<Content<E>>,
    /// New mount container; `Some(None)` means the host body.
    pub mount_container: Option<Option<E>>,
    /// See [`PopoverOptions::placement`].
    pub placement: Option<Placement>,
    /// See [`PopoverOptions::show_arrow`].
    pub show_arrow: Option<bool>,
    /// See [`PopoverOptions::emit`].
    pub emit: Option<Emit>,
    /// See [`PopoverOptions::open_delay`].
    pub open_delay: Option<f64>,
    /// See [`PopoverOptions::close_delay`].
    pub close_delay: Option<f64>,
    /// See [`PopoverOptions::disabled`].
    pub disabled: Option<bool>,
    /// See [`PopoverOptions::enterable`].
    pub enterable: Option<bool>,
    /// See [`PopoverOptions::auto_update`].
    pub auto_update: Option<bool>,
    /// See [`PopoverOptions::auto_scroll`].
    pub auto_scroll: Option<bool>,
    /// See [`PopoverOptions::animation_class`].
    pub animation_class: Option<String>,
    /// See [`PopoverOptions::close_animation`].
    pub close_animation: Option<bool>,
    /// See [`PopoverOptions::click_outside_close`].
    pub click_outside_close: Option<bool>,
    /// See [`PopoverOptions::close_on_scroll`].
    pub close_on_scroll: Option<bool>,
    /// See [`PopoverOptions::translate`].
    pub translate: Option<Vec2>,
    /// See [`PopoverOptions::margin`].
    pub margin: Option<f64>,
    /// See [`PopoverOptions::auto_fit`].
    pub auto_fit: Option<bool>,
    /// See [`PopoverOptions::cover_trigger`].
    pub cover_trigger: Option<bool>,
    /// See [`PopoverOptions::hide_on_invisible`].
    pub hide_on_invisible: Option<bool>,
    /// See [`PopoverOptions::clip_to_container`].
    pub clip_to_container: Option<bool>,
    /// See [`PopoverOptions::arrow_policy`].
    pub arrow_policy: Option<ArrowPolicy>,
    /// See [`PopoverOptions::wrapper_class`].
    pub wrapper_class: Option<Option<String>>,
    /// See [`PopoverOptions::trigger_open_class`].
    pub trigger_open_class: Option<Option<String>>,
}

impl<E> Default for ConfigPatch<E> {
    fn default() -> Self {
        Self {
            trigger: None,
            content: None,
            mount_container: None,
            placement: None,
            show_arrow: None,
            emit: None,
            open_delay: None,
            close_delay: None,
            disabled: None,
            enterable: None,
            auto_update: None,
            auto_scroll: None,
            animation_class: None,
            close_animation: None,
            click_outside_close: None,
            close_on_scroll: None,
            translate: None,
            margin: None,
            auto_fit: None,
            cover_trigger: None,
            hide_on_invisible: None,
            clip_to_container: None,
            arrow_policy: None,
            wrapper_class: None,
            trigger_open_class: None,
        }
    }
}

impl<E> ConfigPatch<E> {
    /// Write the option fields of this patch into `options`, reporting which changed.
    ///
    /// `trigger`, `content` and `mount_container` are left for the caller, which
    /// needs the old values to undo their side effects.
    pub fn apply_options(&mut self, options: &mut PopoverOptions) -> ConfigChanges {
        let mut changes = ConfigChanges::empty();
        let patch = self;

        macro_rules! diff {
            ($($field:ident => $flag:ident),* $(,)?) => {$(
                if let Some(value) = patch.$field.take() {
                    if options.$field != value {
                        options.$field = value;
                        changes |= ConfigChanges::$flag;
                    }
                }
            )*};
        }

        diff! {
            placement => PLACEMENT,
            show_arrow => SHOW_ARROW,
            emit => EMIT,
            open_delay => DELAYS,
            close_delay => DELAYS,
            disabled => DISABLED,
            enterable => ENTERABLE,
            auto_update => AUTO_UPDATE,
            auto_scroll => AUTO_SCROLL,
            animation_class => ANIMATION_CLASS,
            close_animation => CLOSE_ANIMATION,
            click_outside_close => CLICK_OUTSIDE_CLOSE,
            close_on_scroll => CLOSE_ON_SCROLL,
            translate => OFFSET,
            margin => OFFSET,
            auto_fit => FIT,
            cover_trigger => FIT,
            hide_on_invisible => FIT,
            clip_to_container => FIT,
            arrow_policy => ARROW_POLICY,
            wrapper_class => WRAPPER_CLASS,
            trigger_open_class => TRIGGER_OPEN_CLASS,
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = PopoverOptions::default();
        assert_eq!(o.placement, Placement::Top);
        assert!(o.show_arrow && o.enterable && o.auto_update && o.auto_scroll);
        assert!(o.close_animation && o.click_outside_close && o.auto_fit);
        assert!(!o.open && !o.disabled && !o.close_on_scroll);
        assert!(!o.cover_trigger && !o.hide_on_invisible && !o.clip_to_container);
        assert_eq!(o.emit, Emit::Click);
        assert_eq!(o.animation_class, "fade");
        assert_eq!(o.margin, 8.0);
        assert_eq!(o.open_delay, 0.0);
        assert_eq!(o.close_delay, 0.0);
        assert_eq!(o.fit_flags(), FitFlags::AUTO_FIT);
    }

    #[test]
    fn fit_flags_follow_options() {
        let o = PopoverOptions {
            auto_fit: false,
            cover_trigger: true,
            hide_on_invisible: true,
            ..PopoverOptions::default()
        };
        assert_eq!(
            o.fit_flags(),
            FitFlags::COVER_ANCHOR | FitFlags::HIDE_ON_INVISIBLE
        );
    }

    #[test]
    fn patch_reports_only_real_changes() {
        let mut options = PopoverOptions::default();
        let mut patch = ConfigPatch::<u32> {
            placement: Some(Placement::Top),
            margin: Some(4.0),
            animation_class: Some(String::from("zoom")),
            wrapper_class: Some(Some(String::from("dark"))),
            ..ConfigPatch::default()
        };
        let changes = patch.apply_options(&mut options);
        assert_eq!(
            changes,
            ConfigChanges::OFFSET | ConfigChanges::ANIMATION_CLASS | ConfigChanges::WRAPPER_CLASS
        );
        assert_eq!(options.margin, 4.0);
        assert_eq!(options.animation_class, "zoom");
        assert_eq!(options.wrapper_class.as_deref(), Some("dark"));
    }

    #[test]
    fn missing_parts_have_messages() {
        use alloc::string::ToString;
        assert_eq!(
            ConfigError::MissingTrigger.to_string(),
            "popover configuration is missing a trigger"
        );
        assert_eq!(
            ConfigError::MissingContent.to_string(),
            "popover configuration is missing content"
        );
    }

    #[test]
    fn virtual_anchor_debug_is_opaque() {
        let a: Anchor<u32> = Anchor::Virtual(Box::new(|| Rect::ZERO));
        assert_eq!(alloc::format!("{a:?}"), "Virtual(..)");
        assert!(a.element().is_none());
    }
}
