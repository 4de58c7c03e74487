// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Class names applied to the popover structure and during enter/exit sequences.
//!
//! The names are a stylesheet contract and are produced bit-exact.

use alloc::format;
use alloc::string::String;

use understory_placement::Placement;

/// Class on the positioned root element.
pub const ROOT_CLASS: &str = "next-popover";
/// Class on the wrapper inside the root; animation classes go here too.
pub const WRAPPER_CLASS: &str = "popover-wrapper";
/// Class on the content element.
pub const CONTENT_CLASS: &str = "popover-content";
/// Class on the arrow element.
pub const ARROW_CLASS: &str = "popover-arrow";

/// The six enter/exit class names derived from one base name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimationClasses {
    base: String,
    /// `{base}-enter-from`
    pub enter_from: String,
    /// `{base}-enter-active`
    pub enter_active: String,
    /// `{base}-enter-to`
    pub enter_to: String,
    /// `{base}-exit-from`
    pub exit_from: String,
    /// `{base}-exit-active`
    pub exit_active: String,
    /// `{base}-exit-to`
    pub exit_to: String,
}

impl AnimationClasses {
    /// Derive the class set; `None` for an empty base, which disables animation.
    pub fn new(base: &str) -> Option<Self> {
        if base.is_empty() {
            return None;
        }
        Some(Self {
            base: base.into(),
            enter_from: format!("{base}-enter-from"),
            enter_active: format!("{base}-enter-active"),
            enter_to: format!("{base}-enter-to"),
            exit_from: format!("{base}-exit-from"),
            exit_active: format!("{base}-exit-active"),
            exit_to: format!("{base}-exit-to"),
        })
    }

    /// The base name.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Per-placement class, e.g. `fade-bottom-start`.
    pub fn placement(&self, placement: Placement) -> String {
        format!("{}-{}", self.base, placement)
    }
}
