// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A click popover driven through the in-memory scene.
//!
//! Opens on an anchor click, walks the enter sequence frame by frame while
//! printing the wrapper classes, then closes with an outside click.
//!
//! Run:
//! - `cargo run -p understory_demos --example popover_click`

use kurbo::{Rect, Size};
use understory_popover::{Anchor, Content, Popover, PopoverConfig, Scene};

fn classes(popover: &Popover<Scene>) -> String {
    popover.host().classes(*popover.wrapper()).join(" ")
}

fn main() {
    let mut scene = Scene::new(Size::new(800.0, 600.0));
    let body = scene.body_id();
    let button = scene.add_box(body, Rect::new(100.0, 100.0, 150.0, 120.0));

    let mut config = PopoverConfig::new(
        Anchor::Element(button),
        Content::Text("Copied to clipboard".into()),
    );
    config.options.trigger_open_class = Some("is-open".into());
    config.callbacks.on_entered = Some(Box::new(|| println!("  -> entered")));
    config.callbacks.on_exited = Some(Box::new(|| println!("  -> exited")));

    let mut popover = Popover::new(scene, config).unwrap();
    let content = *popover.content();
    popover.host_mut().set_size(content, Size::new(120.0, 40.0));
    let arrow = *popover.arrow().unwrap();
    popover.host_mut().set_size(arrow, Size::new(12.0, 12.0));

    println!("== Click anchor ==");
    popover.click(button);
    println!(
        "  placement {:?}, panel at {:?}, arrow at {:?}",
        popover.placement(),
        popover.host().transform(*popover.panel()),
        popover.host().transform(arrow)
    );
    println!("  wrapper: {}", classes(&popover));
    popover.next_frame();
    println!("  wrapper: {}", classes(&popover));
    popover.next_frame();
    println!("  wrapper: {}", classes(&popover));
    assert!(popover.host().has_class(button, "is-open"));

    println!("== Click outside ==");
    popover.click(body);
    println!("  wrapper: {}", classes(&popover));
    popover.run_until_idle();
    assert!(!popover.host().is_attached(*popover.panel()));
    assert!(!popover.host().has_class(button, "is-open"));
    println!("  detached after {} ms", popover.host().now());
}
