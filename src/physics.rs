//! Fixed-tick snow physics.
//!
//! One call to [`PhysicsStep::step`] advances the simulation by exactly one
//! tick:
//!
//! 1. ease the wind toward its target
//! 2. move every active flake (sway, wind, gravity, horizontal wrap)
//! 3. run the collision relaxation passes against the spatial grid
//! 4. settle flakes with at least two support contacts
//! 5. sweep settled flakes and freeze the ones that stayed still long enough
//!
//! Flakes only go Active → Settled → Frozen. A settled flake's active slot is
//! refilled immediately, so the active population never changes size.

use glam::Vec2;

use crate::input::Wind;
use crate::spatial::SpatialGrid;
use crate::store::{ParticleRef, ParticleStore, Population};

/// Downward acceleration per nominal tick.
pub const GRAVITY: f32 = 0.015;
/// Extra gravity per pixel of radius (bigger flakes fall faster).
pub const RADIUS_GRAVITY: f32 = 0.12;
/// Vertical velocity ceiling.
pub const TERMINAL_VELOCITY: f32 = 1.6;
/// Vertical displacement multiplier.
pub const FALL_MULTIPLIER: f32 = 1.35;
/// Horizontal speed contributed by full wind.
pub const WIND_FORCE: f32 = 1.8;
/// How fast horizontal velocity follows sway and wind.
pub const HORIZONTAL_EASE: f32 = 0.08;
/// Flakes may drift this far past a side edge before wrapping.
pub const WRAP_MARGIN: f32 = 6.0;

/// Extra gap kept between touching flakes.
pub const COLLISION_EPSILON: f32 = 0.01;
/// Share of the overlap each active flake takes when two collide.
pub const MUTUAL_COMPRESSION: f32 = 0.5;
/// Share of the overlap resolved against settled or frozen snow.
pub const STATIC_COMPRESSION: f32 = 0.9;
/// Velocity change per pixel of push between two active flakes.
pub const VELOCITY_NUDGE: f32 = 0.1;
/// Minimum upward component of the contact normal that counts as support.
pub const SUPPORT_NORMAL: f32 = 0.5;
/// Support contacts needed to settle.
pub const SETTLE_CONTACTS: u8 = 2;

/// A settled flake that moves more than this restarts its stillness timer.
pub const FREEZE_MOVE_EPSILON: f32 = 0.05;

/// Per-tick inputs derived from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepParams {
    /// Tick length relative to the nominal 60 Hz tick.
    pub delta_ratio: f32,
    /// Tick length in milliseconds.
    pub step_ms: f32,
    pub relaxation_passes: u32,
    pub freeze_after_ms: f32,
}

/// What a tick changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub settled: usize,
    pub frozen: usize,
}

/// Physics state that survives between ticks: only reusable scratch space.
#[derive(Debug, Default)]
pub struct PhysicsStep {
    support: Vec<u8>,
}

impl PhysicsStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the simulation by one fixed tick.
    pub fn step(
        &mut self,
        store: &mut ParticleStore,
        grid: &mut SpatialGrid,
        wind: &mut Wind,
        params: &StepParams,
    ) -> StepReport {
        let dr = params.delta_ratio;
        wind.ease(dr);
        integrate(store, wind.current(), dr);

        self.support.clear();
        self.support.resize(store.active().len(), 0);
        for pass in 0..params.relaxation_passes.max(1) {
            self.relax_pass(store, grid, pass);
        }

        let settled = self.settle_supported(store);
        let frozen = freeze_sweep(store, params.step_ms, params.freeze_after_ms);
        StepReport { settled, frozen }
    }

    /// Settle every flake whose best support over this tick's passes
    /// reached [`SETTLE_CONTACTS`]. Returns how many settled.
    pub(crate) fn settle_supported(&self, store: &mut ParticleStore) -> usize {
        let mut settled = 0;
        for (i, &contacts) in self.support.iter().enumerate() {
            if contacts >= SETTLE_CONTACTS {
                store.settle(i);
                settled += 1;
            }
        }
        settled
    }

    /// One relaxation sweep over every active flake.
    ///
    /// Even passes go forward, odd passes in reverse, so no flake always
    /// wins its collisions.
    pub(crate) fn relax_pass(&mut self, store: &mut ParticleStore, grid: &mut SpatialGrid, pass: u32) {
        grid.rebuild(store, true);
        let n = store.active().len();
        if self.support.len() != n {
            self.support.resize(n, 0);
        }
        for k in 0..n {
            let i = if pass % 2 == 0 { k } else { n - 1 - k };
            let contacts = resolve_flake(store, grid, i);
            self.support[i] = self.support[i].max(contacts);
        }
    }
}

/// Sway, wind, gravity and wrap for every active flake.
fn integrate(store: &mut ParticleStore, wind: f32, dr: f32) {
    let width = store.width();
    for flake in store.active_mut() {
        flake.angle += flake.angle_speed * dr;
        let target_vx = flake.angle.sin() * flake.sway + wind * WIND_FORCE;
        flake.velocity.x += (target_vx - flake.velocity.x) * (HORIZONTAL_EASE * dr).min(1.0);

        let gravity = GRAVITY * (1.0 + flake.radius() * RADIUS_GRAVITY);
        flake.velocity.y = (flake.velocity.y + gravity * dr).min(TERMINAL_VELOCITY);

        flake.position.x += flake.velocity.x * dr;
        flake.position.y += flake.velocity.y * dr * FALL_MULTIPLIER;
        flake.position.x = wrap_x(flake.position.x, width);
    }
}

/// Wrap a horizontal coordinate around the viewport with a small margin.
#[inline]
pub fn wrap_x(x: f32, width: f32) -> f32 {
    if x < -WRAP_MARGIN {
        width + WRAP_MARGIN
    } else if x > width + WRAP_MARGIN {
        -WRAP_MARGIN
    } else {
        x
    }
}

/// Push active flake `i` out of everything it overlaps.
///
/// Returns its support contacts for this pass.
fn resolve_flake(store: &mut ParticleStore, grid: &SpatialGrid, i: usize) -> u8 {
    let (width, height) = (store.width(), store.height());
    let flake = store.active()[i];
    let ra = flake.radius();
    let mut position = flake.position;
    let mut velocity = flake.velocity;
    let mut contacts: u8 = 0;

    for r in grid.neighbors(flake.position, ra) {
        if r.population == Population::Active && r.index as usize == i {
            continue;
        }
        let (other, rb) = store.body(r);
        let delta = position - other;
        let min_dist = ra + rb + COLLISION_EPSILON;
        let dist_sq = delta.length_squared();
        if dist_sq >= min_dist * min_dist {
            continue;
        }

        let dist = dist_sq.sqrt();
        // Coincident centers: push straight up.
        let normal = if dist > 1e-4 { delta / dist } else { Vec2::NEG_Y };
        let overlap = min_dist - dist;

        match r.population {
            Population::Active => {
                let push = overlap * MUTUAL_COMPRESSION;
                position += normal * push;
                velocity += normal * push * VELOCITY_NUDGE;
                push_active(store, r, -normal * push, -normal * push * VELOCITY_NUDGE);
            }
            Population::Settled | Population::Frozen => {
                position += normal * overlap * STATIC_COMPRESSION;
                let into = velocity.dot(normal);
                if into < 0.0 {
                    velocity -= normal * into;
                }
                // y grows downward: support comes from below.
                if -normal.y > SUPPORT_NORMAL {
                    contacts = contacts.saturating_add(1);
                }
            }
        }
    }

    if position.y + ra >= height - 1.0 {
        contacts = contacts.saturating_add(2);
    }
    position.x = wrap_x(position.x, width);

    let flake = &mut store.active_mut()[i];
    flake.position = position;
    flake.velocity = velocity;
    contacts
}

fn push_active(store: &mut ParticleStore, r: ParticleRef, offset: Vec2, nudge: Vec2) {
    let other = &mut store.active_mut()[r.index as usize];
    other.position += offset;
    other.velocity += nudge;
}

/// Track stillness of settled flakes and freeze the ones past the threshold.
///
/// Walks in reverse so removals do not skip entries. Returns how many froze.
fn freeze_sweep(store: &mut ParticleStore, step_ms: f32, freeze_after_ms: f32) -> usize {
    let mut frozen = 0;
    for i in (0..store.settled().len()).rev() {
        let flake = &mut store.settled_mut()[i];
        let position = flake.position();
        if position.distance(flake.last_position) > FREEZE_MOVE_EPSILON {
            flake.still_ms = 0.0;
            flake.last_position = position;
            continue;
        }
        flake.still_ms += step_ms;
        if flake.still_ms >= freeze_after_ms && store.freeze(i).is_some() {
            frozen += 1;
        }
    }
    frozen
}
