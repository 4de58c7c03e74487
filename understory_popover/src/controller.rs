// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lifecycle controller: the open/close state machine of one popover.
//!
//! ## States
//!
//! | State       | `opened` | `closed` | `animating` |
//! |-------------|----------|----------|-------------|
//! | Closed idle | false    | true     | false       |
//! | Opening     | true     | either   | true        |
//! | Open idle   | true     | false    | false       |
//! | Closing     | false    | either   | true        |
//!
//! `opened` and `closed` are not complements: `closed` records the most recent
//! *intent*, so a close requested while the enter sequence runs is honored when
//! it ends, and an open requested while the exit sequence runs re-opens after it.
//!
//! ## Sequencing
//!
//! Opening attaches the panel, adds `X-enter-from`, and on the next frame swaps
//! it for `X-enter-active X-enter-to` and waits for the transition to end.
//! Closing mirrors this with the exit classes and detaches at the end. Without
//! an animation class the panel is attached or detached immediately.
//!
//! Position is recomputed synchronously on every open and update.

use alloc::vec::Vec;
use core::fmt;
use core::mem;

use kurbo::{Point, Rect, Size};
use log::{debug, trace};
use understory_placement::{
    GeometryProvider, Placement, PositionResult, ResolveInput, enterable_bounds, resolve,
};

use crate::classes::{ARROW_CLASS, AnimationClasses, CONTENT_CLASS, ROOT_CLASS, WRAPPER_CLASS};
use crate::config::{
    Anchor, Callbacks, ConfigChanges, ConfigError, ConfigPatch, Content, Emit, PopoverConfig,
    PopoverOptions,
};
use crate::event::PopoverEvent;
use crate::host::{FrameId, Host, Listen, ListenTarget, TimerId};
use crate::listeners::ListenerSet;
use crate::transition::{TransitionWait, WaitSignal, WaitToken};

const TRIGGER_KINDS: Listen = Listen::CLICK
    .union(Listen::POINTER_ENTER)
    .union(Listen::POINTER_LEAVE);
const HOVER_KINDS: Listen = Listen::POINTER_ENTER.union(Listen::POINTER_LEAVE);
const DOCUMENT_KINDS: Listen = Listen::CLICK.union(Listen::POINTER_MOVE);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Enter,
    Exit,
}

#[derive(Debug)]
struct ActiveWait<E> {
    phase: Phase,
    classes: AnimationClasses,
    wait: TransitionWait<E>,
}

#[derive(Copy, Clone, Debug, Default)]
struct Frames {
    enter: Option<FrameId>,
    exit: Option<FrameId>,
    idle: Option<FrameId>,
    initial: Option<FrameId>,
    scroll: Option<FrameId>,
}

impl Frames {
    fn drain(&mut self) -> impl Iterator<Item = FrameId> + use<> {
        let taken = mem::take(self);
        [
            taken.enter,
            taken.exit,
            taken.idle,
            taken.initial,
            taken.scroll,
        ]
        .into_iter()
        .flatten()
    }
}

fn fire(callback: &mut Option<alloc::boxed::Box<dyn FnMut()>>) {
    if let Some(cb) = callback {
        cb();
    }
}

/// Inclusive on all edges, so the shared edge of anchor and zone counts as inside.
fn contains_inclusive(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x <= r.x1 && p.y >= r.y0 && p.y <= r.y1
}

/// One popover: a panel positioned against an anchor, with its open/close lifecycle.
///
/// All effects go through the owned [`Host`]. Host events are fed back through
/// [`handle`](Self::handle).
pub struct Popover<H: Host> {
    host: H,
    trigger: Anchor<H::Element>,
    content: Content<H::Element>,
    content_el: H::Element,
    mount: H::Element,
    root: H::Element,
    wrapper: H::Element,
    arrow: Option<H::Element>,
    options: PopoverOptions,
    callbacks: Callbacks,
    animation: Option<AnimationClasses>,

    opened: bool,
    closed: bool,
    animating: bool,
    destroyed: bool,

    prev_placement: Option<Placement>,
    last: Option<PositionResult>,
    open_timer: Option<TimerId>,
    close_timer: Option<TimerId>,
    frames: Frames,
    scroll_trailing: bool,
    wait: Option<ActiveWait<H::Element>>,
    next_token: WaitToken,
    scroll_elements: Option<Vec<H::Element>>,
    observed: Vec<H::Element>,
    listeners: ListenerSet<H::Element>,
}

impl<H: Host> fmt::Debug for Popover<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Popover")
            .field("trigger", &self.trigger)
            .field("root", &self.root)
            .field("placement", &self.last.map(|p| p.placement))
            .field("opened", &self.opened)
            .field("closed", &self.closed)
            .field("animating", &self.animating)
            .field("destroyed", &self.destroyed)
            .field("listeners", &self.listeners)
            .finish_non_exhaustive()
    }
}

impl<H: Host> Popover<H> {
    /// Build the panel structure and install anchor listeners.
    ///
    /// The panel is created detached; it is attached to the mount container on open.
    pub fn new(mut host: H, config: PopoverConfig<H::Element>) -> Result<Self, ConfigError> {
        let PopoverConfig {
            trigger,
            content,
            mount_container,
            options,
            callbacks,
        } = config;
        let trigger = trigger.ok_or(ConfigError::MissingTrigger)?;
        let content = content.ok_or(ConfigError::MissingContent)?;
        let mount = mount_container.unwrap_or_else(|| host.body());

        let root = host.create_element();
        host.add_class(&root, ROOT_CLASS);
        let wrapper = host.create_element();
        host.add_class(&wrapper, WRAPPER_CLASS);
        if let Some(class) = &options.wrapper_class {
            host.add_class(&wrapper, class);
        }
        host.append_child(&root, &wrapper);
        let content_el = install_content(&mut host, &wrapper, &content);
        let arrow = options
            .show_arrow
            .then(|| create_arrow(&mut host, &wrapper));
        let animation = AnimationClasses::new(&options.animation_class);

        let mut popover = Self {
            host,
            trigger,
            content,
            content_el,
            mount,
            root,
            wrapper,
            arrow,
            options,
            callbacks,
            animation,
            opened: false,
            closed: true,
            animating: false,
            destroyed: false,
            prev_placement: None,
            last: None,
            open_timer: None,
            close_timer: None,
            frames: Frames::default(),
            scroll_trailing: false,
            wait: None,
            next_token: WaitToken::first(),
            scroll_elements: None,
            observed: Vec::new(),
            listeners: ListenerSet::new(),
        };

        if popover.options.auto_update {
            popover.observe();
        }
        if popover.needs_scroll() {
            popover.scroll_elements = Some(popover.collect_scroll_elements());
        }
        popover.bind_trigger();
        popover.bind_panel();
        if popover.options.open {
            popover.frames.initial = Some(popover.host.request_frame());
        }
        debug!("popover created: {:?}", popover.root);
        Ok(popover)
    }

    // --- accessors ---

    /// The host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Consume the popover and return its host. Does not destroy.
    pub fn into_host(self) -> H {
        self.host
    }

    /// Whether the panel is (being) shown.
    pub fn is_opened(&self) -> bool {
        self.opened
    }

    /// Whether the latest intent was to close.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether an enter/exit sequence or an idle frame is pending.
    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Whether [`destroy`](Self::destroy) has run.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Placement resolved by the most recent positioning.
    pub fn placement(&self) -> Option<Placement> {
        self.last.map(|p| p.placement)
    }

    /// Most recent positioning result.
    pub fn last_position(&self) -> Option<PositionResult> {
        self.last
    }

    /// The positioned root element.
    pub fn panel(&self) -> &H::Element {
        &self.root
    }

    /// The wrapper element carrying the animation classes.
    pub fn wrapper(&self) -> &H::Element {
        &self.wrapper
    }

    /// The content element.
    pub fn content(&self) -> &H::Element {
        &self.content_el
    }

    /// The arrow element, when shown.
    pub fn arrow(&self) -> Option<&H::Element> {
        self.arrow.as_ref()
    }

    /// The anchor.
    pub fn trigger(&self) -> &Anchor<H::Element> {
        &self.trigger
    }

    /// The mount container.
    pub fn mount_container(&self) -> &H::Element {
        &self.mount
    }

    /// Current options.
    pub fn config(&self) -> &PopoverOptions {
        &self.options
    }

    // --- operations ---

    /// Show the panel (or reposition it when already open).
    pub fn open(&mut self) {
        if self.destroyed || self.options.disabled {
            return;
        }
        self.closed = false;

        let fresh = !self.opened;
        if fresh {
            if self.animating {
                trace!("open deferred until the exit sequence ends");
                return;
            }
            self.host.append_child(&self.mount, &self.root);
            self.listen_scroll();
            self.listen_document();
        }
        self.opened = true;
        self.add_trigger_open_class();

        match &self.animation {
            Some(anim) if fresh => {
                self.animating = true;
                fire(&mut self.callbacks.on_before_enter);
                self.host.add_class(&self.wrapper, &anim.enter_from);
                self.frames.enter = Some(self.host.request_frame());
            }
            _ if !self.animating => {
                self.animating = true;
                self.frames.idle = Some(self.host.request_frame());
            }
            _ => {}
        }

        self.reposition();

        if fresh {
            debug!("popover opened: {:?}", self.placement());
            fire(&mut self.callbacks.on_open);
        }
    }

    /// Hide the panel, running the exit sequence when configured.
    pub fn close(&mut self) {
        if self.destroyed {
            return;
        }
        self.closed = true;
        if self.animating || !self.opened {
            return;
        }
        self.opened = false;

        let exit = self
            .animation
            .as_ref()
            .filter(|_| self.options.close_animation);
        if let Some(anim) = exit {
            fire(&mut self.callbacks.on_before_exit);
            self.host.add_class(&self.wrapper, &anim.exit_from);
            self.animating = true;
            self.frames.exit = Some(self.host.request_frame());
        } else {
            self.detach();
        }

        self.remove_trigger_open_class();
        self.unlisten_scroll();
        self.unlisten_document();
        debug!("popover closed");
        fire(&mut self.callbacks.on_close);
    }

    /// Open after the configured open delay, cancelling pending delayed actions.
    pub fn open_with_delay(&mut self) {
        if self.destroyed {
            return;
        }
        self.clear_timers();
        if self.options.open_delay > 0.0 {
            self.open_timer = Some(self.host.set_timeout(self.options.open_delay));
        } else {
            self.open();
        }
    }

    /// Close after the configured close delay, cancelling pending delayed actions.
    pub fn close_with_delay(&mut self) {
        if self.destroyed {
            return;
        }
        self.clear_timers();
        if self.options.close_delay > 0.0 {
            self.close_timer = Some(self.host.set_timeout(self.options.close_delay));
        } else {
            self.close();
        }
    }

    /// Open when closed, close when open.
    pub fn toggle(&mut self) {
        if self.opened {
            self.close();
        } else {
            self.open();
        }
    }

    /// Reposition when open and idle.
    pub fn update(&mut self) {
        if !self.destroyed && self.opened && !self.animating {
            self.open();
        }
    }

    /// Allow opening again.
    pub fn enable(&mut self) {
        self.options.disabled = false;
    }

    /// Refuse to open, and close.
    pub fn disable(&mut self) {
        self.options.disabled = true;
        self.close();
    }

    /// React to a scroll of the anchor's scroll container.
    ///
    /// The first call of a burst runs immediately; later calls before the next
    /// frame coalesce into one run on that frame. Call this directly for virtual
    /// anchors, which have no scroll listeners of their own.
    pub fn on_scroll(&mut self) {
        if self.destroyed {
            return;
        }
        if self.frames.scroll.is_some() {
            self.scroll_trailing = true;
            return;
        }
        self.frames.scroll = Some(self.host.request_frame());
        self.scroll_reaction();
    }

    /// Release everything: frames, timers, waits, listeners, resize observation, the panel.
    ///
    /// Later calls and events are ignored.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.unobserve_all();
        if self.host.remove_child(&self.mount, &self.root) {
            self.host.set_transform(&self.root, None);
        }
        for frame in self.frames.drain() {
            self.host.cancel_frame(frame);
        }
        self.clear_timers();
        if let Some(active) = self.wait.take() {
            active.wait.release(&mut self.host, &mut self.listeners);
        }
        self.remove_trigger_open_class();
        self.listeners.clear(&mut self.host);
        self.scroll_elements = None;
        self.opened = false;
        self.closed = true;
        self.animating = false;
        self.destroyed = true;
        debug!("popover destroyed: {:?}", self.root);
    }

    /// Apply a configuration patch, run each changed field's side effect, then [`update`](Self::update).
    pub fn update_config(&mut self, mut patch: ConfigPatch<H::Element>) -> ConfigChanges {
        if self.destroyed {
            return ConfigChanges::empty();
        }
        let old = self.options.clone();
        let mut changes = patch.apply_options(&mut self.options);

        if let Some(content) = patch.content.take()
            && content != self.content
        {
            if !self.host.remove_child(&self.wrapper, &self.content_el) {
                trace!("old content was already detached");
            }
            self.content_el = install_content(&mut self.host, &self.wrapper, &content);
            self.content = content;
            changes |= ConfigChanges::CONTENT;
        }

        if let Some(mount) = patch.mount_container.take() {
            let mount = mount.unwrap_or_else(|| self.host.body());
            if mount != self.mount {
                let old_mount = mem::replace(&mut self.mount, mount);
                if self.host.remove_child(&old_mount, &self.root) {
                    self.host.append_child(&self.mount, &self.root);
                }
                changes |= ConfigChanges::MOUNT_CONTAINER;
            }
        }

        if let Some(trigger) = patch.trigger.take() {
            let same = matches!(
                (&trigger, &self.trigger),
                (Anchor::Element(a), Anchor::Element(b)) if a == b
            );
            if !same {
                let old_trigger = mem::replace(&mut self.trigger, trigger);
                if let Some(el) = old_trigger.element() {
                    self.listeners.remove(
                        &mut self.host,
                        &ListenTarget::Element(el.clone()),
                        TRIGGER_KINDS,
                    );
                    if let Some(class) = &old.trigger_open_class {
                        self.host.remove_class(el, class);
                    }
                }
                self.bind_trigger();
                if self.opened {
                    self.add_trigger_open_class();
                }
                changes |= ConfigChanges::TRIGGER;
            }
        }

        if changes.contains(ConfigChanges::EMIT) {
            if let Some(el) = self.trigger.element() {
                self.listeners.remove(
                    &mut self.host,
                    &ListenTarget::Element(el.clone()),
                    TRIGGER_KINDS,
                );
            }
            self.bind_trigger();
        }

        if changes.intersects(ConfigChanges::EMIT | ConfigChanges::ENTERABLE) {
            self.listeners.remove(
                &mut self.host,
                &ListenTarget::Element(self.root.clone()),
                HOVER_KINDS,
            );
            self.bind_panel();
            if self.opened {
                self.unlisten_document();
                self.listen_document();
            }
        }

        if changes.contains(ConfigChanges::TRIGGER_OPEN_CLASS)
            && self.opened
            && let Some(el) = self.trigger.element()
        {
            if let Some(class) = &old.trigger_open_class {
                self.host.remove_class(el, class);
            }
            if let Some(class) = &self.options.trigger_open_class {
                self.host.add_class(el, class);
            }
        }

        if changes.contains(ConfigChanges::WRAPPER_CLASS) {
            if let Some(class) = &old.wrapper_class {
                self.host.remove_class(&self.wrapper, class);
            }
            if let Some(class) = &self.options.wrapper_class {
                self.host.add_class(&self.wrapper, class);
            }
        }

        if changes.contains(ConfigChanges::SHOW_ARROW) {
            if self.options.show_arrow {
                if self.arrow.is_none() {
                    self.arrow = Some(create_arrow(&mut self.host, &self.wrapper));
                }
            } else if let Some(arrow) = self.arrow.take() {
                self.host.remove_child(&self.wrapper, &arrow);
            }
        }

        if changes.contains(ConfigChanges::ANIMATION_CLASS) {
            if let (Some(anim), Some(prev)) = (&self.animation, self.prev_placement) {
                self.host.remove_class(&self.wrapper, &anim.placement(prev));
            }
            self.prev_placement = None;
            self.animation = AnimationClasses::new(&self.options.animation_class);
        }

        if changes.intersects(
            ConfigChanges::AUTO_UPDATE | ConfigChanges::TRIGGER | ConfigChanges::MOUNT_CONTAINER,
        ) {
            self.unobserve_all();
            if self.options.auto_update {
                self.observe();
            }
        }

        if changes.intersects(
            ConfigChanges::TRIGGER
                | ConfigChanges::MOUNT_CONTAINER
                | ConfigChanges::AUTO_SCROLL
                | ConfigChanges::CLOSE_ON_SCROLL,
        ) {
            self.refresh_scroll_elements();
        }

        if changes.contains(ConfigChanges::DISABLED) && self.options.disabled {
            self.close();
        }

        if !changes.is_empty() {
            debug!("popover config changed: {changes:?}");
            self.update();
        }
        changes
    }

    /// Feed a host event into the state machine.
    pub fn handle(&mut self, event: PopoverEvent<H::Element>) {
        if self.destroyed {
            return;
        }
        match event {
            PopoverEvent::Frame(frame) => self.on_frame(frame),
            PopoverEvent::Timer(timer) => self.on_timer(timer),
            PopoverEvent::Click { target } => {
                if self.is_trigger(&target) {
                    if self.opened {
                        self.close_with_delay();
                    } else {
                        self.open_with_delay();
                    }
                }
            }
            PopoverEvent::DocumentClick { target } => self.on_document_click(target.as_ref()),
            PopoverEvent::PointerEnter { target } => {
                if self.is_trigger(&target) || target == self.root {
                    self.on_pointer_enter();
                }
            }
            PopoverEvent::PointerLeave { target, position } => {
                if self.is_trigger(&target) || target == self.root {
                    self.on_pointer_leave(position);
                }
            }
            PopoverEvent::PointerMove { position } => self.on_pointer_move(position),
            PopoverEvent::Scroll { target } => {
                let ours = self
                    .scroll_elements
                    .as_ref()
                    .is_some_and(|els| els.contains(&target));
                if ours {
                    self.on_scroll();
                }
            }
            PopoverEvent::Resize { target } => {
                if self.observed.contains(&target) {
                    self.update();
                }
            }
            PopoverEvent::End { target, event } => {
                self.settle(&WaitSignal::End(&target, event));
            }
        }
    }

    // --- event reactions ---

    fn on_frame(&mut self, frame: FrameId) {
        let f = Some(frame);
        if self.frames.enter == f {
            self.frames.enter = None;
            self.start_wait(Phase::Enter);
        } else if self.frames.exit == f {
            self.frames.exit = None;
            self.start_wait(Phase::Exit);
        } else if self.frames.idle == f {
            self.frames.idle = None;
            self.finish_idle();
        } else if self.frames.initial == f {
            self.frames.initial = None;
            self.open();
        } else if self.frames.scroll == f {
            self.frames.scroll = None;
            if mem::take(&mut self.scroll_trailing) {
                // The leading reaction's idle frame is due in this same batch.
                if let Some(idle) = self.frames.idle.take() {
                    self.host.cancel_frame(idle);
                    self.finish_idle();
                }
                self.scroll_reaction();
            }
        } else if !self.settle(&WaitSignal::Frame(frame)) {
            trace!("ignoring stale frame {frame:?}");
        }
    }

    fn finish_idle(&mut self) {
        self.animating = false;
        // A close requested before the idle frame was deferred until now.
        if self.closed && self.opened {
            self.close();
        }
    }

    fn on_timer(&mut self, timer: TimerId) {
        let t = Some(timer);
        if self.open_timer == t {
            self.open_timer = None;
            self.open();
        } else if self.close_timer == t {
            self.close_timer = None;
            self.close();
        } else if !self.settle(&WaitSignal::Timer(timer)) {
            trace!("ignoring stale timer {timer:?}");
        }
    }

    fn on_document_click(&mut self, target: Option<&H::Element>) {
        if !self.options.click_outside_close && self.callbacks.on_click_outside.is_none() {
            return;
        }
        if let Some(t) = target {
            let inside_trigger = self
                .trigger
                .element()
                .is_some_and(|el| self.host.contains(el, t));
            if inside_trigger || self.host.contains(&self.root, t) {
                return;
            }
        }
        fire(&mut self.callbacks.on_click_outside);
        if self.options.click_outside_close {
            self.close_with_delay();
        }
    }

    fn on_pointer_enter(&mut self) {
        self.clear_timers();
        // Any pending close was just cancelled.
        if self.animating || self.opened {
            self.closed = false;
        }
        if self.opened {
            return;
        }
        self.open_with_delay();
    }

    fn on_pointer_leave(&mut self, position: Option<Point>) {
        if self.options.hover_enterable() && position.is_some_and(|p| self.is_over(p)) {
            return;
        }
        self.clear_timers();
        if self.animating {
            self.closed = true;
        }
        if !self.opened {
            return;
        }
        self.close_with_delay();
    }

    fn on_pointer_move(&mut self, position: Point) {
        if self.opened
            && self.options.hover_enterable()
            && self.close_timer.is_none()
            && !self.is_over(position)
        {
            self.close_with_delay();
        }
    }

    fn scroll_reaction(&mut self) {
        if self.options.close_on_scroll {
            self.close();
        } else if self.options.auto_scroll {
            self.update();
        }
    }

    // --- enter/exit sequencing ---

    fn start_wait(&mut self, phase: Phase) {
        let Some(classes) = self.animation.clone() else {
            // Animation was switched off mid-sequence.
            self.animating = false;
            if phase == Phase::Exit {
                self.detach();
            }
            return;
        };
        let (from, active, to) = match phase {
            Phase::Enter => (
                &classes.enter_from,
                &classes.enter_active,
                &classes.enter_to,
            ),
            Phase::Exit => (&classes.exit_from, &classes.exit_active, &classes.exit_to),
        };
        self.host.remove_class(&self.wrapper, from);
        self.host.add_class(&self.wrapper, active);
        self.host.add_class(&self.wrapper, to);

        let token = self.next_token;
        self.next_token = token.next();
        let wait = TransitionWait::start(&mut self.host, &mut self.listeners, &self.wrapper, token);
        trace!("{phase:?} wait started: {token:?}");
        self.wait = Some(ActiveWait {
            phase,
            classes,
            wait,
        });
    }

    /// Settle the live wait if `signal` completes it.
    fn settle(&mut self, signal: &WaitSignal<'_, H::Element>) -> bool {
        let token = self
            .wait
            .as_ref()
            .and_then(|active| active.wait.completed_by(signal));
        token.is_some_and(|token| self.finish_wait(token))
    }

    /// Shared resolution of both completions; only the live token settles.
    fn finish_wait(&mut self, token: WaitToken) -> bool {
        if self.wait.as_ref().map(|active| active.wait.token()) != Some(token) {
            trace!("ignoring stale wait {token:?}");
            return false;
        }
        let Some(ActiveWait {
            phase,
            classes,
            wait,
        }) = self.wait.take()
        else {
            return false;
        };
        trace!("{phase:?} wait settled: {:?}", wait.token());
        wait.release(&mut self.host, &mut self.listeners);
        match phase {
            Phase::Enter => {
                self.host.remove_class(&self.wrapper, &classes.enter_active);
                self.host.remove_class(&self.wrapper, &classes.enter_to);
                self.animating = false;
                debug!("popover entered");
                fire(&mut self.callbacks.on_entered);
                if self.closed {
                    self.close_with_delay();
                }
            }
            Phase::Exit => {
                self.detach();
                self.host.remove_class(&self.wrapper, &classes.exit_active);
                self.host.remove_class(&self.wrapper, &classes.exit_to);
                self.animating = false;
                debug!("popover exited");
                fire(&mut self.callbacks.on_exited);
                if !self.closed {
                    self.open_with_delay();
                }
            }
        }
        true
    }

    // --- positioning ---

    fn anchor_client_rect(&self) -> Rect {
        match &self.trigger {
            Anchor::Element(el) => self.host.geometry().client_rect(el).unwrap_or(Rect::ZERO),
            Anchor::Virtual(rect) => rect(),
        }
    }

    fn reposition(&mut self) {
        let geometry = self.host.geometry();
        let container = geometry.client_rect(&self.mount).unwrap_or(Rect::ZERO);
        let anchor = self.anchor_client_rect() - container.origin().to_vec2();
        let panel = geometry
            .client_rect(&self.root)
            .map(|r| r.size())
            .unwrap_or(Size::ZERO);
        let arrow = self
            .arrow
            .as_ref()
            .filter(|_| self.options.show_arrow)
            .and_then(|el| geometry.client_rect(el))
            .map(|r| r.size());

        let result = resolve(&ResolveInput {
            placement: self.options.placement,
            anchor,
            panel,
            container,
            viewport: geometry.viewport().size,
            translate: self.options.translate,
            margin: self.options.margin,
            flags: self.options.fit_flags(),
            arrow,
            arrow_policy: self.options.arrow_policy,
        });
        trace!("popover positioned: {result:?}");

        if let Some(cb) = &mut self.callbacks.on_before_position {
            cb(&result);
        }

        if let Some(anim) = &self.animation
            && self.prev_placement != Some(result.placement)
        {
            if let Some(prev) = self.prev_placement {
                self.host.remove_class(&self.wrapper, &anim.placement(prev));
            }
            self.host
                .add_class(&self.wrapper, &anim.placement(result.placement));
            self.prev_placement = Some(result.placement);
        }

        match result.offset {
            Some(offset) => {
                self.host.set_transform(&self.root, Some(offset));
                self.host.set_shown(&self.root, true);
            }
            None => self.host.set_shown(&self.root, false),
        }
        if let Some(el) = &self.arrow {
            match result.arrow {
                Some(offset) => {
                    self.host.set_transform(el, Some(offset));
                    self.host.set_shown(el, true);
                }
                None => self.host.set_shown(el, false),
            }
        }
        self.last = Some(result);
    }

    /// Whether `p` (viewport space) is over the anchor or the panel's enterable zone.
    fn is_over(&self, p: Point) -> bool {
        if contains_inclusive(self.anchor_client_rect(), p) {
            return true;
        }
        let (Some(last), Some(panel)) = (self.last, self.host.geometry().client_rect(&self.root))
        else {
            return false;
        };
        let zone = enterable_bounds(panel, last.placement.side(), self.options.margin);
        contains_inclusive(zone, p)
    }

    // --- attachment, classes, timers ---

    fn detach(&mut self) {
        if !self.host.remove_child(&self.mount, &self.root) {
            trace!("panel was already detached");
        }
        self.host.set_transform(&self.root, None);
    }

    fn add_trigger_open_class(&mut self) {
        if let (Some(class), Some(el)) = (&self.options.trigger_open_class, self.trigger.element()) {
            self.host.add_class(el, class);
        }
    }

    fn remove_trigger_open_class(&mut self) {
        if let (Some(class), Some(el)) = (&self.options.trigger_open_class, self.trigger.element()) {
            self.host.remove_class(el, class);
        }
    }

    fn clear_timers(&mut self) {
        if let Some(t) = self.open_timer.take() {
            self.host.clear_timeout(t);
        }
        if let Some(t) = self.close_timer.take() {
            self.host.clear_timeout(t);
        }
    }

    fn is_trigger(&self, el: &H::Element) -> bool {
        self.trigger.element() == Some(el)
    }

    // --- listeners and observation ---

    fn bind_trigger(&mut self) {
        if let Some(el) = self.trigger.element() {
            let kinds = match self.options.emit {
                Emit::Click => Listen::CLICK,
                Emit::Hover => HOVER_KINDS,
            };
            self.listeners
                .add(&mut self.host, ListenTarget::Element(el.clone()), kinds);
        }
    }

    fn bind_panel(&mut self) {
        if self.options.hover_enterable() {
            self.listeners.add(
                &mut self.host,
                ListenTarget::Element(self.root.clone()),
                HOVER_KINDS,
            );
        }
    }

    fn listen_document(&mut self) {
        let mut kinds = Listen::CLICK;
        if self.options.hover_enterable() {
            kinds |= Listen::POINTER_MOVE;
        }
        self.listeners
            .add(&mut self.host, ListenTarget::Document, kinds);
    }

    fn unlisten_document(&mut self) {
        self.listeners
            .remove(&mut self.host, &ListenTarget::Document, DOCUMENT_KINDS);
    }

    fn listen_scroll(&mut self) {
        for el in self.scroll_elements.iter().flatten() {
            self.listeners
                .add(&mut self.host, ListenTarget::Element(el.clone()), Listen::SCROLL);
        }
    }

    fn unlisten_scroll(&mut self) {
        for el in self.scroll_elements.iter().flatten() {
            self.listeners
                .remove(&mut self.host, &ListenTarget::Element(el.clone()), Listen::SCROLL);
        }
    }

    fn needs_scroll(&self) -> bool {
        self.trigger.element().is_some() && (self.options.auto_scroll || self.options.close_on_scroll)
    }

    /// Scrollable ancestors of the anchor (inclusive), up to the mount container.
    fn collect_scroll_elements(&self) -> Vec<H::Element> {
        let mut out = Vec::new();
        let mut cursor = self.trigger.element().cloned();
        while let Some(el) = cursor {
            if el == self.mount {
                break;
            }
            if self.host.is_scrollable(&el) {
                out.push(el.clone());
            }
            cursor = self.host.parent(&el);
        }
        out
    }

    fn refresh_scroll_elements(&mut self) {
        self.unlisten_scroll();
        self.scroll_elements = self
            .needs_scroll()
            .then(|| self.collect_scroll_elements());
        if self.opened {
            self.listen_scroll();
        }
    }

    fn observe(&mut self) {
        let mut targets = Vec::from([self.wrapper.clone(), self.mount.clone()]);
        if let Some(el) = self.trigger.element() {
            targets.push(el.clone());
        }
        for el in &targets {
            self.host.observe_resize(el);
        }
        self.observed = targets;
    }

    fn unobserve_all(&mut self) {
        for el in mem::take(&mut self.observed) {
            self.host.unobserve_resize(&el);
        }
    }
}

fn install_content<H: Host>(
    host: &mut H,
    wrapper: &H::Element,
    content: &Content<H::Element>,
) -> H::Element {
    let el = match content {
        Content::Element(el) => el.clone(),
        Content::Text(text) => {
            let el = host.create_element();
            host.set_text(&el, text);
            el
        }
    };
    host.add_class(&el, CONTENT_CLASS);
    host.append_child(wrapper, &el);
    el
}

fn create_arrow<H: Host>(host: &mut H, wrapper: &H::Element) -> H::Element {
    let arrow = host.create_element();
    host.add_class(&arrow, ARROW_CLASS);
    host.append_child(wrapper, &arrow);
    arrow
}
