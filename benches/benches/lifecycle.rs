// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use kurbo::{Rect, Size};
use understory_popover::{
    Anchor, Content, ElementId, Popover, PopoverConfig, PopoverOptions, Scene,
};

fn build(options: PopoverOptions) -> (Popover<Scene>, ElementId) {
    let mut scene = Scene::new(Size::new(800.0, 600.0));
    let body = scene.body_id();
    let button = scene.add_box(body, Rect::new(100.0, 100.0, 150.0, 120.0));
    let mut config = PopoverConfig::new(Anchor::Element(button), Content::Text("tip".into()));
    config.options = options;
    let mut popover = Popover::new(scene, config).unwrap();
    let content = *popover.content();
    popover.host_mut().set_size(content, Size::new(120.0, 40.0));
    (popover, button)
}

fn bench_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("lifecycle");

    group.bench_function("open_close_animated", |b| {
        b.iter_batched(
            || build(PopoverOptions::default()),
            |(mut popover, button)| {
                popover.click(button);
                popover.run_until_idle();
                popover.click(button);
                popover.run_until_idle();
                popover
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("open_close_plain", |b| {
        b.iter_batched(
            || {
                build(PopoverOptions {
                    animation_class: String::new(),
                    ..PopoverOptions::default()
                })
            },
            |(mut popover, button)| {
                popover.click(button);
                popover.next_frame();
                popover.click(button);
                popover
            },
            BatchSize::SmallInput,
        );
    });

    group.bench_function("update_open", |b| {
        let (mut popover, button) = build(PopoverOptions::default());
        popover.click(button);
        popover.run_until_idle();
        b.iter(|| {
            popover.update();
            popover.next_frame();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_lifecycle);
criterion_main!(benches);
