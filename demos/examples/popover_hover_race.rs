// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Hover races against the enter and exit sequences.
//!
//! The pointer leaves while the panel is still fading in, then comes back
//! while it is fading out. The controller records the latest intent and acts
//! on it when each sequence ends.
//!
//! Run:
//! - `cargo run -p understory_demos --example popover_hover_race`

use kurbo::{Point, Rect, Size};
use understory_popover::{
    Anchor, ComputedTiming, Content, Emit, Popover, PopoverConfig, PopoverOptions, Scene,
};

fn report(label: &str, popover: &Popover<Scene>) {
    println!(
        "{label:<28} t={:>5} opened={:<5} closed={:<5} animating={:<5} attached={}",
        popover.host().now(),
        popover.is_opened(),
        popover.is_closed(),
        popover.is_animating(),
        popover.host().is_attached(*popover.panel()),
    );
}

fn main() {
    let mut scene = Scene::new(Size::new(800.0, 600.0));
    let body = scene.body_id();
    let link = scene.add_box(body, Rect::new(300.0, 300.0, 380.0, 316.0));
    let fade = ComputedTiming {
        transition_duration: "120ms".into(),
        ..ComputedTiming::default()
    };
    scene.set_class_timing("fade-enter-active", fade.clone());
    scene.set_class_timing("fade-exit-active", fade);

    let config = PopoverConfig {
        options: PopoverOptions {
            emit: Emit::Hover,
            placement: "bottom".parse().unwrap(),
            ..PopoverOptions::default()
        },
        ..PopoverConfig::new(Anchor::Element(link), Content::Text("Preview".into()))
    };
    let mut popover = Popover::new(scene, config).unwrap();
    let content = *popover.content();
    popover.host_mut().set_size(content, Size::new(200.0, 80.0));

    popover.pointer_enter(link);
    report("enter anchor", &popover);
    popover.next_frame();
    popover.pointer_leave(link, Point::new(10.0, 10.0));
    report("leave during enter", &popover);
    popover.run_until_idle();
    report("after both sequences", &popover);
    assert!(!popover.is_opened());

    popover.pointer_enter(link);
    popover.run_until_idle();
    report("open again", &popover);
    popover.pointer_leave(link, Point::new(10.0, 10.0));
    popover.next_frame();
    popover.pointer_enter(link);
    report("re-enter during exit", &popover);
    popover.run_until_idle();
    report("reopened", &popover);
    assert!(popover.is_opened());
}
