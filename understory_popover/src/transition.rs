// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition watcher: CSS timing lookup and a race-safe wait for the end of an enter/exit sequence.
//!
//! ## Timing
//!
//! [`transition_info`] reads the four computed timing lists of an element and
//! reports which end event to wait for and how long the longest running
//! transition or animation takes.
//!
//! ```
//! use understory_popover::transition::{transition_info, ComputedTiming, EndEvent};
//!
//! let timing = ComputedTiming {
//!     transition_delay: "0s".into(),
//!     transition_duration: "0.3s, 150ms".into(),
//!     ..ComputedTiming::default()
//! };
//! let info = transition_info(&timing);
//! assert_eq!(info.event, Some(EndEvent::TransitionEnd));
//! assert_eq!(info.timeout_ms, 300.0);
//! ```
//!
//! ## Waiting
//!
//! A [`TransitionWait`] registers two completions: the end event on the element
//! plus a fallback timer at `timeout + 2` ms, or just the next frame when there
//! is nothing to wait for. The first completion to arrive settles the wait and
//! releases the other. Both completions resolve to the wait's [`WaitToken`], and
//! the owner settles only the wait whose token it still holds, so completions of
//! a cancelled or replaced wait are ignored.

use alloc::string::String;

use crate::host::{FrameId, Host, Listen, ListenTarget, TimerId};
use crate::listeners::ListenerSet;

/// Slack added to the fallback timer so the end event wins a tie.
pub const FALLBACK_SLACK_MS: f64 = 2.0;

/// Computed CSS timing lists of an element, as comma-separated time strings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComputedTiming {
    /// `transition-delay`.
    pub transition_delay: String,
    /// `transition-duration`.
    pub transition_duration: String,
    /// `animation-delay`.
    pub animation_delay: String,
    /// `animation-duration`.
    pub animation_duration: String,
}

/// End event fired by the element when its transition or animation finishes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EndEvent {
    /// `transitionend`.
    TransitionEnd,
    /// `animationend`.
    AnimationEnd,
}

impl EndEvent {
    /// Listener kind for this event.
    pub const fn listen(self) -> Listen {
        match self {
            Self::TransitionEnd => Listen::TRANSITION_END,
            Self::AnimationEnd => Listen::ANIMATION_END,
        }
    }
}

/// What to wait for after applying the active classes.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TransitionInfo {
    /// Event to listen for; `None` when nothing runs.
    pub event: Option<EndEvent>,
    /// Longest delay + duration, in milliseconds.
    pub timeout_ms: f64,
}

/// Parse one CSS time (`"0.3s"`, `"150ms"`) into milliseconds; malformed input is `0`.
pub fn parse_time_ms(s: &str) -> f64 {
    let s = s.trim();
    let (number, scale) = if let Some(n) = s.strip_suffix("ms") {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1000.0)
    } else {
        return 0.0;
    };
    match number.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v * scale,
        _ => 0.0,
    }
}

/// Longest `delay[i] + duration[i]`, repeating the delay list cyclically.
fn longest(delays: &str, durations: &str) -> f64 {
    // `split` always yields at least one item, so the cycle never runs dry.
    let delays = delays.split(',').map(parse_time_ms).cycle();
    durations
        .split(',')
        .map(parse_time_ms)
        .zip(delays)
        .map(|(duration, delay)| duration + delay)
        .fold(0.0, f64::max)
}

/// Decide the end event and timeout from computed timing.
pub fn transition_info(timing: &ComputedTiming) -> TransitionInfo {
    let transition = longest(&timing.transition_delay, &timing.transition_duration);
    let animation = longest(&timing.animation_delay, &timing.animation_duration);
    let timeout_ms = transition.max(animation);
    let event = if timeout_ms > 0.0 {
        if transition > animation {
            Some(EndEvent::TransitionEnd)
        } else {
            Some(EndEvent::AnimationEnd)
        }
    } else {
        None
    };
    TransitionInfo { event, timeout_ms }
}

/// Identity of one wait; each new wait gets a fresh token.
///
/// Both completions of a wait resolve to its token, and the owner only acts on
/// the token of the wait it currently holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct WaitToken(u64);

impl WaitToken {
    /// Token after this one.
    pub(crate) const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub(crate) const fn first() -> Self {
        Self(0)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Completion<E> {
    Frame(FrameId),
    Event {
        target: E,
        event: EndEvent,
        timer: TimerId,
    },
}

/// Something that may settle a [`TransitionWait`].
#[derive(Clone, Debug, PartialEq)]
pub enum WaitSignal<'a, E> {
    /// A frame callback fired.
    Frame(FrameId),
    /// A timer fired.
    Timer(TimerId),
    /// An end event reached `target`.
    End(&'a E, EndEvent),
}

/// An in-flight wait for the end of a transition.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionWait<E> {
    token: WaitToken,
    completion: Completion<E>,
}

impl<E: Clone + PartialEq + core::fmt::Debug> TransitionWait<E> {
    /// Start waiting on `target` according to its current computed timing.
    pub fn start<H: Host<Element = E>>(
        host: &mut H,
        listeners: &mut ListenerSet<E>,
        target: &E,
        token: WaitToken,
    ) -> Self {
        let info = transition_info(&host.computed_timing(target));
        let completion = match info.event {
            Some(event) => {
                listeners.add(host, ListenTarget::Element(target.clone()), event.listen());
                let timer = host.set_timeout(info.timeout_ms + FALLBACK_SLACK_MS);
                Completion::Event {
                    target: target.clone(),
                    event,
                    timer,
                }
            }
            None => Completion::Frame(host.request_frame()),
        };
        Self { token, completion }
    }

    /// Token of this wait.
    pub fn token(&self) -> WaitToken {
        self.token
    }

    /// The token `signal` resolves to, if it is one of this wait's completions.
    pub fn completed_by(&self, signal: &WaitSignal<'_, E>) -> Option<WaitToken> {
        let hit = match (&self.completion, signal) {
            (Completion::Frame(f), WaitSignal::Frame(g)) => f == g,
            (Completion::Event { timer, .. }, WaitSignal::Timer(t)) => timer == t,
            (Completion::Event { target, event, .. }, WaitSignal::End(t, e)) => {
                target == *t && event == e
            }
            _ => false,
        };
        hit.then_some(self.token)
    }

    /// Release whatever completions are still registered.
    ///
    /// Used both after settling (the losing completion) and on cancellation.
    pub fn release<H: Host<Element = E>>(self, host: &mut H, listeners: &mut ListenerSet<E>) {
        match self.completion {
            Completion::Frame(frame) => host.cancel_frame(frame),
            Completion::Event {
                target,
                event,
                timer,
            } => {
                host.clear_timeout(timer);
                listeners.remove(host, &ListenTarget::Element(target), event.listen());
            }
        }
    }
}
