//! Property tests over random seeds, viewports and callback timings.

use proptest::prelude::*;
use snowfall::store::{MAX_RADIUS, MIN_RADIUS};
use snowfall::{Layer, LayerStyle, ParticleInstance, SnowConfig, SnowEffect, SnowSurface};

/// Surface that draws nothing.
struct NullSurface;

impl SnowSurface for NullSurface {
    fn size(&self) -> (u32, u32) {
        (1, 1)
    }

    fn clear(&mut self) {}

    fn draw_particles(&mut self, _layer: Layer, _particles: &[ParticleInstance], _style: &LayerStyle) {}
}

fn effect(seed: u64, particles: usize, w: f32, h: f32) -> SnowEffect<NullSurface> {
    let config = SnowConfig::default()
        .with_max_particles(particles)
        .with_seed(seed)
        .with_freeze_after_ms(300.0);
    let mut effect = SnowEffect::new(config, w, h);
    effect.attach_surface(NullSurface);
    effect.start();
    effect
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn active_population_never_changes(
        seed in any::<u64>(),
        particles in 1usize..120,
        gaps in prop::collection::vec(0.0f64..80.0, 1..200),
    ) {
        let mut effect = effect(seed, particles, 200.0, 120.0);
        let mut now = 0.0;
        for gap in gaps {
            now += gap;
            effect.on_tick(now);
            prop_assert_eq!(effect.active_count(), particles);
        }
    }

    #[test]
    fn piles_only_grow(
        seed in any::<u64>(),
        particles in 20usize..120,
        wind in -1.0f32..1.0,
    ) {
        let mut effect = effect(seed, particles, 160.0, 100.0);
        effect.pointer_wind(wind);
        let mut last_total = 0;
        let mut last_frozen = 0;
        for i in 0..300 {
            effect.on_tick(i as f64 * 16.0);
            let total = effect.settled_count() + effect.inactive_count();
            prop_assert!(total >= last_total);
            prop_assert!(effect.inactive_count() >= last_frozen);
            last_total = total;
            last_frozen = effect.inactive_count();
        }
    }

    #[test]
    fn frozen_snow_never_moves(seed in any::<u64>(), particles in 20usize..100) {
        let mut effect = effect(seed, particles, 160.0, 100.0);
        let mut seen: Vec<(f32, f32, f32)> = Vec::new();
        for i in 0..400 {
            effect.on_tick(i as f64 * 16.0);
            let frozen = effect.store().frozen();
            prop_assert!(frozen.len() >= seen.len());
            for (flake, &(x, y, r)) in frozen.iter().zip(&seen) {
                prop_assert_eq!((flake.position().x, flake.position().y, flake.radius()), (x, y, r));
            }
            seen = frozen
                .iter()
                .map(|f| (f.position().x, f.position().y, f.radius()))
                .collect();
        }
    }

    #[test]
    fn radii_stay_in_range(seed in any::<u64>(), particles in 1usize..80) {
        let mut effect = effect(seed, particles, 120.0, 80.0);
        for i in 0..200 {
            effect.on_tick(i as f64 * 16.0);
        }
        let store = effect.store();
        let radii = store
            .active()
            .iter()
            .map(|a| a.radius())
            .chain(store.settled().iter().map(|s| s.radius()))
            .chain(store.frozen().iter().map(|f| f.radius()));
        for r in radii {
            prop_assert!((MIN_RADIUS..MAX_RADIUS).contains(&r));
        }
    }

    #[test]
    fn long_gaps_are_clamped(seed in any::<u64>(), gap in 0.0f64..20_000.0) {
        let mut effect = effect(seed, 10, 100.0, 100.0);
        effect.on_tick(1_000.0);
        let stats = effect.on_tick(1_000.0 + gap);
        prop_assert!(stats.elapsed_ms <= 1000.0);
        prop_assert!(stats.steps <= 5);
    }

    #[test]
    fn resize_bounds_actives(
        seed in any::<u64>(),
        w in 1.0f32..600.0,
        h in 1.0f32..400.0,
    ) {
        let mut effect = effect(seed, 50, 300.0, 200.0);
        for i in 0..120 {
            effect.on_tick(i as f64 * 16.0);
        }
        effect.resize(w, h);
        prop_assert_eq!(effect.settled_count(), 0);
        prop_assert_eq!(effect.inactive_count(), 0);
        for flake in effect.store().active() {
            prop_assert!(flake.position.x >= 0.0 && flake.position.x < w);
            prop_assert!(flake.position.y >= 0.0 && flake.position.y < h);
        }
    }
}
