//! Benchmarks for the CPU-side simulation and rasterizer.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use snowfall::prelude::*;

struct NullSurface;

impl SnowSurface for NullSurface {
    fn size(&self) -> (u32, u32) {
        (1, 1)
    }

    fn clear(&mut self) {}

    fn draw_particles(&mut self, _layer: Layer, particles: &[ParticleInstance], _style: &LayerStyle) {
        black_box(particles);
    }
}

/// An effect that already has a few seconds of snow on the ground.
fn warmed_up(particles: usize) -> SnowEffect<NullSurface> {
    let config = SnowConfig::new().with_max_particles(particles).with_seed(42);
    let mut effect = SnowEffect::new(config, 1280.0, 720.0);
    effect.attach_surface(NullSurface);
    effect.start();
    for i in 0..300 {
        effect.on_tick(i as f64 * 16.0);
    }
    effect
}

fn bench_on_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("on_tick");

    for &count in &[350usize, 1_000, 3_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut effect = warmed_up(count);
            let mut now = 300.0 * 16.0;
            b.iter(|| {
                now += 1000.0 / 60.0;
                black_box(effect.on_tick(now))
            })
        });
    }

    group.finish();
}

fn bench_image_surface(c: &mut Criterion) {
    let mut group = c.benchmark_group("image_surface");

    let particles: Vec<ParticleInstance> = (0..1_000)
        .map(|i| ParticleInstance::new((i * 37 % 640) as f32, (i * 91 % 360) as f32, 2.0))
        .collect();
    let style = SnowStyle::default().layer(Layer::Falling);

    group.bench_function("draw_1000", |b| {
        let mut surface = ImageSurface::new(640, 360);
        b.iter(|| {
            surface.clear();
            surface.draw_particles(Layer::Falling, black_box(&particles), &style);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_on_tick, bench_image_surface);
criterion_main!(benches);
