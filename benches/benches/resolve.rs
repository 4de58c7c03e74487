// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::{Rect, Size};
use understory_placement::{ArrowPolicy, FitFlags, Placement, ResolveInput, resolve};

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Anchors scattered over (and slightly past) an 800x600 viewport.
fn gen_inputs(count: usize, flags: FitFlags) -> Vec<ResolveInput> {
    let mut rng = Rng::new(0x5eed_cafe);
    (0..count)
        .map(|i| {
            let x = rng.next_f64() * 900.0 - 50.0;
            let y = rng.next_f64() * 700.0 - 50.0;
            let w = 10.0 + rng.next_f64() * 90.0;
            let h = 10.0 + rng.next_f64() * 30.0;
            ResolveInput {
                placement: Placement::ALL[i % Placement::ALL.len()],
                anchor: Rect::new(x, y, x + w, y + h),
                panel: Size::new(80.0 + rng.next_f64() * 160.0, 30.0 + rng.next_f64() * 90.0),
                container: Rect::new(0.0, 0.0, 800.0, 600.0),
                viewport: Size::new(800.0, 600.0),
                flags,
                arrow: Some(Size::new(12.0, 12.0)),
                arrow_policy: ArrowPolicy::Clamp,
                ..ResolveInput::default()
            }
        })
        .collect()
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let cases = [
        ("plain", FitFlags::empty()),
        ("auto_fit", FitFlags::AUTO_FIT),
        ("clip_to_container", FitFlags::AUTO_FIT | FitFlags::CLIP_TO_CONTAINER),
        ("hide_on_invisible", FitFlags::AUTO_FIT | FitFlags::HIDE_ON_INVISIBLE),
    ];
    for (name, flags) in cases {
        let inputs = gen_inputs(1024, flags);
        group.throughput(Throughput::Elements(inputs.len() as u64));
        group.bench_function(name, |b| {
            b.iter(|| {
                for input in &inputs {
                    black_box(resolve(black_box(input)));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_resolve);
criterion_main!(benches);
