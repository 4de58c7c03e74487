// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! In-memory [`Host`] with an element tree, a virtual clock, and a frame queue.
//!
//! `Scene` stands in for a document: elements have explicit client positions
//! and sizes, classes, and listener registrations. It never fires anything on
//! its own; the driver methods on `Popover<Scene>` (such as
//! [`Popover::next_frame`] and [`Popover::click`]) turn simulated input and
//! elapsed time into [`PopoverEvent`]s, delivering element events only where a
//! listener is registered.
//!
//! ## Geometry
//!
//! - An element with a transform sits at its parent's client origin plus the transform.
//! - Otherwise an element with an explicit origin sits there; anything else
//!   stacks at its parent's origin.
//! - An element without an explicit size is as large as its largest child.
//!
//! ## Time
//!
//! Each frame advances the clock by [`FRAME_MS`]. Frames requested while a
//! frame runs are deferred to the next one. Timers fire in deadline order,
//! ties in creation order.
//!
//! ```
//! use kurbo::{Rect, Size};
//! use understory_popover::{Anchor, Content, Popover, PopoverConfig, Scene};
//!
//! let mut scene = Scene::new(Size::new(800.0, 600.0));
//! let body = scene.body_id();
//! let button = scene.add_box(body, Rect::new(100.0, 100.0, 150.0, 120.0));
//! let tip = scene.add_box(body, Rect::new(0.0, 0.0, 120.0, 40.0));
//!
//! let config = PopoverConfig::new(Anchor::Element(button), Content::Element(tip));
//! let mut popover = Popover::new(scene, config).unwrap();
//! popover.click(button);
//! popover.run_until_idle();
//! assert!(popover.is_opened());
//! assert!(!popover.is_animating());
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size, Vec2};
use understory_placement::{GeometryProvider, Viewport};

use crate::controller::Popover;
use crate::event::PopoverEvent;
use crate::host::{FrameId, Host, Listen, ListenTarget, TimerId};
use crate::transition::{ComputedTiming, EndEvent};

/// Virtual duration of one frame, in milliseconds.
pub const FRAME_MS: f64 = 16.0;

/// Handle of a scene element.
///
/// A slot index plus a generation; ids of removed elements never alias
/// elements created later in the same slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(u32, u32);

impl ElementId {
    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, Default)]
struct Node {
    generation: u32,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    classes: Vec<String>,
    text: String,
    origin: Option<Point>,
    size: Size,
    transform: Option<Point>,
    hidden: bool,
    scrollable: bool,
}

/// In-memory document implementing [`Host`].
#[derive(Clone, Debug)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    body: ElementId,
    viewport: Viewport,
    now: f64,
    next_handle: u64,
    frames: Vec<FrameId>,
    running: Vec<FrameId>,
    timers: Vec<(TimerId, f64)>,
    listeners: Vec<(ListenTarget<ElementId>, Listen)>,
    listen_calls: usize,
    observed: Vec<ElementId>,
    class_timing: Vec<(String, ComputedTiming)>,
}

impl Scene {
    /// A scene whose body fills a viewport of `size`.
    pub fn new(size: Size) -> Self {
        let mut scene = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            body: ElementId(0, 0),
            viewport: Viewport::new(size),
            now: 0.0,
            next_handle: 1,
            frames: Vec::new(),
            running: Vec::new(),
            timers: Vec::new(),
            listeners: Vec::new(),
            listen_calls: 0,
            observed: Vec::new(),
            class_timing: Vec::new(),
        };
        let body = scene.alloc();
        if let Some(node) = scene.node_mut(body) {
            node.origin = Some(Point::ZERO);
            node.size = size;
        }
        scene.body = body;
        scene
    }

    fn alloc(&mut self) -> ElementId {
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let generation = self.generations[idx].saturating_add(1);
            self.generations[idx] = generation;
            self.nodes[idx] = Some(Node {
                generation,
                ..Node::default()
            });
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices."
            )]
            (idx as u32, generation)
        } else {
            let generation = 1_u32;
            self.nodes.push(Some(Node {
                generation,
                ..Node::default()
            }));
            self.generations.push(generation);
            #[allow(
                clippy::cast_possible_truncation,
                reason = "ElementId uses 32-bit indices."
            )]
            ((self.nodes.len() - 1) as u32, generation)
        };
        ElementId(idx, generation)
    }

    fn node(&self, id: ElementId) -> Option<&Node> {
        self.nodes
            .get(id.idx())?
            .as_ref()
            .filter(|n| n.generation == id.1)
    }

    fn node_mut(&mut self, id: ElementId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())?
            .as_mut()
            .filter(|n| n.generation == id.1)
    }

    fn handle(&mut self) -> u64 {
        let h = self.next_handle;
        self.next_handle += 1;
        h
    }

    // --- building ---

    /// The body element.
    pub fn body_id(&self) -> ElementId {
        self.body
    }

    /// Create an element and append it to `parent` with the given client rect.
    pub fn add_box(&mut self, parent: ElementId, rect: Rect) -> ElementId {
        let id = self.create_element();
        self.append_child(&parent, &id);
        self.set_rect(id, rect);
        id
    }

    /// Create an empty element attached to the body.
    pub fn create_element_in_body(&mut self) -> ElementId {
        let id = self.create_element();
        let body = self.body;
        self.append_child(&body, &id);
        id
    }

    /// Set an element's client position and size.
    pub fn set_rect(&mut self, id: ElementId, rect: Rect) {
        if let Some(node) = self.node_mut(id) {
            node.origin = Some(rect.origin());
            node.size = rect.size();
        }
    }

    /// Set an element's size, leaving its position rules unchanged.
    pub fn set_size(&mut self, id: ElementId, size: Size) {
        if let Some(node) = self.node_mut(id) {
            node.size = size;
        }
    }

    /// Mark an element as having scrollable overflow.
    pub fn set_scrollable(&mut self, id: ElementId, scrollable: bool) {
        if let Some(node) = self.node_mut(id) {
            node.scrollable = scrollable;
        }
    }

    /// Computed timing reported for elements carrying `class`.
    pub fn set_class_timing(&mut self, class: &str, timing: ComputedTiming) {
        self.class_timing.retain(|(c, _)| c != class);
        self.class_timing.push((class.into(), timing));
    }

    /// Change the viewport size and document scroll.
    pub fn set_viewport(&mut self, size: Size, scroll: Vec2) {
        self.viewport = Viewport { size, scroll };
    }

    /// Remove an element and its subtree; their ids become stale.
    pub fn remove_element(&mut self, id: ElementId) {
        let Some(parent) = self.node(id).map(|n| n.parent) else {
            return;
        };
        if let Some(parent) = parent {
            self.remove_child(&parent, &id);
        }
        let mut stack = Vec::from([id]);
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(id.idx()).and_then(Option::take) {
                stack.extend(node.children);
                self.free_list.push(id.idx());
            }
        }
    }

    // --- inspection ---

    /// Whether `id` refers to a live element.
    pub fn is_alive(&self, id: ElementId) -> bool {
        self.node(id).is_some()
    }

    /// Whether `id` is connected to the body.
    pub fn is_attached(&self, id: ElementId) -> bool {
        self.contains(&self.body, &id)
    }

    /// Whether `id` carries `class`.
    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.node(id)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    /// Classes of `id`, in insertion order.
    pub fn classes(&self, id: ElementId) -> &[String] {
        self.node(id).map(|n| n.classes.as_slice()).unwrap_or(&[])
    }

    /// Text content of `id`.
    pub fn text(&self, id: ElementId) -> Option<&str> {
        self.node(id).map(|n| n.text.as_str())
    }

    /// Children of `id`.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Transform of `id`, if set.
    pub fn transform(&self, id: ElementId) -> Option<Point> {
        self.node(id).and_then(|n| n.transform)
    }

    /// Whether `id` is visible.
    pub fn is_shown(&self, id: ElementId) -> bool {
        self.node(id).is_some_and(|n| !n.hidden)
    }

    /// Listener kinds registered at `target`.
    pub fn listening(&self, target: &ListenTarget<ElementId>) -> Listen {
        self.listeners
            .iter()
            .find(|(t, _)| t == target)
            .map(|(_, k)| *k)
            .unwrap_or_default()
    }

    /// Whether any listener is registered anywhere.
    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Number of `listen` calls received.
    pub fn listen_calls(&self) -> usize {
        self.listen_calls
    }

    /// Whether resize observation is active for `id`.
    pub fn is_observing(&self, id: ElementId) -> bool {
        self.observed.contains(&id)
    }

    /// Number of elements under resize observation.
    pub fn observed_count(&self) -> usize {
        self.observed.len()
    }

    /// Frames requested and not yet run.
    pub fn pending_frames(&self) -> usize {
        self.frames.len() + self.running.len()
    }

    /// Timers set and not yet fired.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Virtual time in milliseconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    // --- clock ---

    /// Earliest timer due at or before `until`; moves the clock to its deadline.
    fn pop_due_timer(&mut self, until: f64) -> Option<TimerId> {
        let (pos, &(id, deadline)) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, (_, d))| *d <= until)
            .min_by(|(_, a), (_, b)| a.1.total_cmp(&b.1))?;
        self.timers.remove(pos);
        self.now = self.now.max(deadline);
        Some(id)
    }

    fn next_deadline(&self) -> Option<f64> {
        self.timers.iter().map(|(_, d)| *d).min_by(f64::total_cmp)
    }

    fn begin_frame(&mut self) {
        self.running = core::mem::take(&mut self.frames);
        self.running.reverse();
    }

    fn next_running_frame(&mut self) -> Option<FrameId> {
        self.running.pop()
    }

    fn origin_of(&self, id: ElementId) -> Point {
        let Some(node) = self.node(id) else {
            return Point::ZERO;
        };
        let parent_origin = || node.parent.map(|p| self.origin_of(p)).unwrap_or(Point::ZERO);
        match (node.transform, node.origin) {
            (Some(t), _) => parent_origin() + t.to_vec2(),
            (None, Some(o)) => o,
            (None, None) => parent_origin(),
        }
    }

    fn size_of(&self, id: ElementId) -> Size {
        let Some(node) = self.node(id) else {
            return Size::ZERO;
        };
        if node.size != Size::ZERO {
            return node.size;
        }
        node.children.iter().fold(Size::ZERO, |acc, &c| {
            let s = self.size_of(c);
            Size::new(acc.width.max(s.width), acc.height.max(s.height))
        })
    }

    fn timing_of(&self, id: ElementId) -> ComputedTiming {
        let Some(node) = self.node(id) else {
            return ComputedTiming::default();
        };
        node.classes
            .iter()
            .find_map(|class| {
                self.class_timing
                    .iter()
                    .find(|(c, _)| c == class)
                    .map(|(_, t)| t.clone())
            })
            .unwrap_or_default()
    }
}

impl GeometryProvider<ElementId> for Scene {
    fn client_rect(&self, element: &ElementId) -> Option<Rect> {
        self.node(*element)?;
        Some(Rect::from_origin_size(
            self.origin_of(*element),
            self.size_of(*element),
        ))
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

impl Host for Scene {
    type Element = ElementId;
    type Geometry = Self;

    fn geometry(&self) -> &Self {
        self
    }

    fn body(&self) -> ElementId {
        self.body
    }

    fn create_element(&mut self) -> ElementId {
        self.alloc()
    }

    fn append_child(&mut self, parent: &ElementId, child: &ElementId) {
        if self.node(*parent).is_none() || self.node(*child).is_none() || parent == child {
            return;
        }
        if let Some(old) = self.node(*child).and_then(|n| n.parent) {
            self.remove_child(&old, child);
        }
        if let Some(p) = self.node_mut(*parent) {
            p.children.push(*child);
        }
        if let Some(c) = self.node_mut(*child) {
            c.parent = Some(*parent);
        }
    }

    fn remove_child(&mut self, parent: &ElementId, child: &ElementId) -> bool {
        if self.node(*child).and_then(|n| n.parent) != Some(*parent) {
            return false;
        }
        if let Some(p) = self.node_mut(*parent) {
            p.children.retain(|c| c != child);
        }
        if let Some(c) = self.node_mut(*child) {
            c.parent = None;
        }
        true
    }

    fn contains(&self, ancestor: &ElementId, node: &ElementId) -> bool {
        let mut cursor = self.node(*node).map(|_| *node);
        while let Some(id) = cursor {
            if id == *ancestor {
                return true;
            }
            cursor = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn parent(&self, element: &ElementId) -> Option<ElementId> {
        self.node(*element)?.parent
    }

    fn is_scrollable(&self, element: &ElementId) -> bool {
        self.node(*element).is_some_and(|n| n.scrollable)
    }

    fn set_text(&mut self, element: &ElementId, text: &str) {
        if let Some(node) = self.node_mut(*element) {
            node.text = text.into();
        }
    }

    fn add_class(&mut self, element: &ElementId, class: &str) {
        if let Some(node) = self.node_mut(*element)
            && !node.classes.iter().any(|c| c == class)
        {
            node.classes.push(class.into());
        }
    }

    fn remove_class(&mut self, element: &ElementId, class: &str) {
        if let Some(node) = self.node_mut(*element) {
            node.classes.retain(|c| c != class);
        }
    }

    fn set_transform(&mut self, element: &ElementId, offset: Option<Point>) {
        if let Some(node) = self.node_mut(*element) {
            node.transform = offset;
        }
    }

    fn set_shown(&mut self, element: &ElementId, shown: bool) {
        if let Some(node) = self.node_mut(*element) {
            node.hidden = !shown;
        }
    }

    fn computed_timing(&self, element: &ElementId) -> ComputedTiming {
        self.timing_of(*element)
    }

    fn request_frame(&mut self) -> FrameId {
        let id = FrameId::new(self.handle());
        self.frames.push(id);
        id
    }

    fn cancel_frame(&mut self, frame: FrameId) {
        self.frames.retain(|f| *f != frame);
        self.running.retain(|f| *f != frame);
    }

    fn set_timeout(&mut self, delay_ms: f64) -> TimerId {
        let id = TimerId::new(self.handle());
        self.timers.push((id, self.now + delay_ms.max(0.0)));
        id
    }

    fn clear_timeout(&mut self, timer: TimerId) {
        self.timers.retain(|(t, _)| *t != timer);
    }

    fn listen(&mut self, target: &ListenTarget<ElementId>, kinds: Listen) {
        self.listen_calls += 1;
        match self.listeners.iter_mut().find(|(t, _)| t == target) {
            Some((_, k)) => *k |= kinds,
            None => self.listeners.push((target.clone(), kinds)),
        }
    }

    fn unlisten(&mut self, target: &ListenTarget<ElementId>, kinds: Listen) {
        if let Some(pos) = self.listeners.iter().position(|(t, _)| t == target) {
            self.listeners[pos].1 -= kinds;
            if self.listeners[pos].1.is_empty() {
                self.listeners.remove(pos);
            }
        }
    }

    fn observe_resize(&mut self, element: &ElementId) {
        if !self.observed.contains(element) {
            self.observed.push(*element);
        }
    }

    fn unobserve_resize(&mut self, element: &ElementId) {
        self.observed.retain(|e| e != element);
    }
}

/// Simulated input and time for a popover living in a [`Scene`].
impl Popover<Scene> {
    /// Advance the clock by `ms`, firing due timers in order. Frames do not run.
    pub fn advance(&mut self, ms: f64) {
        let until = self.host().now() + ms;
        while let Some(timer) = self.host_mut().pop_due_timer(until) {
            self.handle(PopoverEvent::Timer(timer));
        }
        self.host_mut().now = until;
    }

    /// Run one frame: advance by [`FRAME_MS`], then run the frames requested before it.
    pub fn next_frame(&mut self) {
        self.advance(FRAME_MS);
        self.host_mut().begin_frame();
        while let Some(frame) = self.host_mut().next_running_frame() {
            self.handle(PopoverEvent::Frame(frame));
        }
    }

    /// Run frames and timers until nothing is pending (bounded).
    pub fn run_until_idle(&mut self) {
        for _ in 0..1024 {
            let scene = self.host();
            if scene.pending_frames() > 0 {
                self.next_frame();
            } else if let Some(deadline) = scene.next_deadline() {
                let wait = (deadline - scene.now()).max(0.0);
                self.advance(wait);
            } else {
                return;
            }
        }
    }

    /// Click `target`: anchor listeners on it or an ancestor, then the document.
    pub fn click(&mut self, target: ElementId) {
        let mut cursor = Some(target);
        while let Some(el) = cursor {
            if self
                .host()
                .listening(&ListenTarget::Element(el))
                .contains(Listen::CLICK)
            {
                self.handle(PopoverEvent::Click { target: el });
            }
            cursor = self.host().parent(&el);
        }
        if self
            .host()
            .listening(&ListenTarget::Document)
            .contains(Listen::CLICK)
        {
            self.handle(PopoverEvent::DocumentClick {
                target: Some(target),
            });
        }
    }

    /// Move the pointer onto `target`.
    pub fn pointer_enter(&mut self, target: ElementId) {
        if self
            .host()
            .listening(&ListenTarget::Element(target))
            .contains(Listen::POINTER_ENTER)
        {
            self.handle(PopoverEvent::PointerEnter { target });
        }
    }

    /// Move the pointer off `target`, to `position`.
    pub fn pointer_leave(&mut self, target: ElementId, position: Point) {
        if self
            .host()
            .listening(&ListenTarget::Element(target))
            .contains(Listen::POINTER_LEAVE)
        {
            self.handle(PopoverEvent::PointerLeave {
                target,
                position: Some(position),
            });
        }
    }

    /// Move the pointer within the document.
    pub fn pointer_move(&mut self, position: Point) {
        if self
            .host()
            .listening(&ListenTarget::Document)
            .contains(Listen::POINTER_MOVE)
        {
            self.handle(PopoverEvent::PointerMove { position });
        }
    }

    /// Scroll `target`.
    pub fn scroll(&mut self, target: ElementId) {
        if self
            .host()
            .listening(&ListenTarget::Element(target))
            .contains(Listen::SCROLL)
        {
            self.handle(PopoverEvent::Scroll { target });
        }
    }

    /// Report a size change of `target`.
    pub fn resize(&mut self, target: ElementId) {
        if self.host().is_observing(target) {
            self.handle(PopoverEvent::Resize { target });
        }
    }

    /// Fire an end event on `target`; it bubbles to listening ancestors.
    pub fn end_transition(&mut self, target: ElementId, event: EndEvent) {
        let mut cursor = Some(target);
        while let Some(el) = cursor {
            if self
                .host()
                .listening(&ListenTarget::Element(el))
                .contains(event.listen())
            {
                self.handle(PopoverEvent::End { target, event });
                return;
            }
            cursor = self.host().parent(&el);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_ids_do_not_alias() {
        let mut scene = Scene::new(Size::new(100.0, 100.0));
        let a = scene.create_element_in_body();
        scene.remove_element(a);
        let b = scene.create_element_in_body();
        assert_ne!(a, b);
        assert!(!scene.is_alive(a));
        assert!(scene.is_alive(b));
        assert_eq!(scene.client_rect(&a), None);
    }

    #[test]
    fn transformed_child_sits_at_parent_origin_plus_offset() {
        let mut scene = Scene::new(Size::new(800.0, 600.0));
        let body = scene.body_id();
        let container = scene.add_box(body, Rect::new(50.0, 40.0, 450.0, 340.0));
        let panel = scene.create_element();
        let inner = scene.create_element();
        scene.set_size(inner, Size::new(120.0, 40.0));
        scene.append_child(&panel, &inner);
        scene.append_child(&container, &panel);
        scene.set_transform(&panel, Some(Point::new(10.0, 20.0)));
        assert_eq!(
            scene.client_rect(&panel),
            Some(Rect::new(60.0, 60.0, 180.0, 100.0))
        );
        assert!(scene.contains(&container, &inner));
        assert!(!scene.contains(&inner, &container));
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut scene = Scene::new(Size::new(10.0, 10.0));
        let late = scene.set_timeout(30.0);
        let early = scene.set_timeout(10.0);
        let tie = scene.set_timeout(10.0);
        assert_eq!(scene.pop_due_timer(100.0), Some(early));
        assert_eq!(scene.pop_due_timer(100.0), Some(tie));
        assert_eq!(scene.pop_due_timer(20.0), None);
        assert_eq!(scene.pop_due_timer(100.0), Some(late));
        assert_eq!(scene.now(), 30.0);
    }

    #[test]
    fn timing_follows_classes() {
        let mut scene = Scene::new(Size::new(10.0, 10.0));
        let el = scene.create_element_in_body();
        scene.set_class_timing(
            "fade-enter-active",
            ComputedTiming {
                transition_duration: "0.2s".into(),
                ..ComputedTiming::default()
            },
        );
        assert_eq!(scene.computed_timing(&el), ComputedTiming::default());
        scene.add_class(&el, "fade-enter-active");
        assert_eq!(scene.computed_timing(&el).transition_duration, "0.2s");
    }
}
