//! Particle storage for the three snow populations.
//!
//! Active flakes live in a fixed-size arena whose slots are recycled in place,
//! settled flakes in a FIFO queue (so an optional cap evicts the oldest), and
//! frozen flakes in an append-only list. Cross-references elsewhere in the
//! crate are `(Population, index)` pairs, see [`ParticleRef`].

use std::collections::VecDeque;
use std::f32::consts::TAU;

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Smallest flake radius in pixels.
pub const MIN_RADIUS: f32 = 1.0;
/// Largest flake radius in pixels (exclusive).
pub const MAX_RADIUS: f32 = 3.0;

const INITIAL_FALL_SPEED: (f32, f32) = (0.3, 1.0);
const SWAY_AMPLITUDE: (f32, f32) = (0.2, 0.8);
const ANGLE_SPEED: (f32, f32) = (0.01, 0.04);
/// Recycled flakes re-enter this far (plus their radius) above the viewport.
const RECYCLE_SPAWN_BAND: f32 = 40.0;

/// Which population a particle reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Population {
    Active,
    Settled,
    Frozen,
}

/// Index-based reference into a [`ParticleStore`] population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleRef {
    pub population: Population,
    pub index: u32,
}

impl ParticleRef {
    pub fn new(population: Population, index: usize) -> Self {
        Self {
            population,
            index: index as u32,
        }
    }
}

/// A falling flake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveFlake {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Sway phase in radians.
    pub angle: f32,
    /// Sway phase advance per nominal tick.
    pub angle_speed: f32,
    /// Horizontal sway amplitude in pixels per tick.
    pub sway: f32,
    radius: f32,
}

impl ActiveFlake {
    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// A flake resting on the floor or on the pile, tracked for stillness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettledFlake {
    position: Vec2,
    radius: f32,
    pub(crate) still_ms: f32,
    pub(crate) last_position: Vec2,
}

impl SettledFlake {
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Simulated milliseconds this flake has been still.
    #[inline]
    pub fn still_ms(&self) -> f32 {
        self.still_ms
    }
}

/// Permanent terrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrozenFlake {
    position: Vec2,
    radius: f32,
}

impl FrozenFlake {
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }
}

/// Flat state of all snow particles plus the RNG that creates them.
#[derive(Debug)]
pub struct ParticleStore {
    active: Vec<ActiveFlake>,
    settled: VecDeque<SettledFlake>,
    frozen: Vec<FrozenFlake>,
    max_active: usize,
    max_settled: Option<usize>,
    width: f32,
    height: f32,
    rng: SmallRng,
}

impl ParticleStore {
    /// Create an empty store. Call [`populate`](Self::populate) or
    /// [`reset`](Self::reset) to spawn the active population.
    pub fn new(
        max_active: usize,
        max_settled: Option<usize>,
        width: f32,
        height: f32,
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        Self {
            active: Vec::with_capacity(max_active),
            settled: VecDeque::new(),
            frozen: Vec::new(),
            max_active,
            max_settled,
            width: width.max(1.0),
            height: height.max(1.0),
            rng,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn max_active(&self) -> usize {
        self.max_active
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    pub fn active(&self) -> &[ActiveFlake] {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut [ActiveFlake] {
        &mut self.active
    }

    pub fn settled(&self) -> &VecDeque<SettledFlake> {
        &self.settled
    }

    pub(crate) fn settled_mut(&mut self) -> &mut VecDeque<SettledFlake> {
        &mut self.settled
    }

    pub fn frozen(&self) -> &[FrozenFlake] {
        &self.frozen
    }

    /// Position and radius of any referenced particle.
    #[inline]
    pub fn body(&self, r: ParticleRef) -> (Vec2, f32) {
        let i = r.index as usize;
        match r.population {
            Population::Active => (self.active[i].position, self.active[i].radius),
            Population::Settled => (self.settled[i].position, self.settled[i].radius),
            Population::Frozen => (self.frozen[i].position, self.frozen[i].radius),
        }
    }

    /// Draw a new flake.
    ///
    /// With `spawn_y` the flake starts at that height, otherwise anywhere in
    /// the viewport.
    pub fn create_active(&mut self, spawn_y: Option<f32>) -> ActiveFlake {
        let rng = &mut self.rng;
        let radius = rng.gen_range(MIN_RADIUS..MAX_RADIUS);
        let x = rng.gen_range(0.0..self.width);
        let y = match spawn_y {
            Some(y) => y,
            None => rng.gen_range(0.0..self.height),
        };
        ActiveFlake {
            position: Vec2::new(x, y),
            velocity: Vec2::new(0.0, rng.gen_range(INITIAL_FALL_SPEED.0..INITIAL_FALL_SPEED.1)),
            angle: rng.gen_range(0.0..TAU),
            angle_speed: rng.gen_range(ANGLE_SPEED.0..ANGLE_SPEED.1),
            sway: rng.gen_range(SWAY_AMPLITUDE.0..SWAY_AMPLITUDE.1),
            radius,
        }
    }

    /// Fill the active population up to its configured size.
    pub fn populate(&mut self) {
        while self.active.len() < self.max_active {
            let flake = self.create_active(None);
            self.active.push(flake);
        }
    }

    /// Replace the flake in `index` with a fresh one.
    ///
    /// `keep_momentum` carries the sway phase across so the replacement does
    /// not visibly restart its oscillation.
    pub fn recycle(&mut self, index: usize, spawn_y: Option<f32>, keep_momentum: bool) {
        let mut fresh = self.create_active(spawn_y);
        let old = &mut self.active[index];
        if keep_momentum {
            fresh.angle = old.angle;
            fresh.angle_speed = old.angle_speed;
        }
        *old = fresh;
    }

    /// Turn the active flake in `index` into a settled one.
    ///
    /// The slot is immediately recycled above the viewport.
    pub fn settle(&mut self, index: usize) -> SettledFlake {
        let flake = self.active[index];
        let r = flake.radius;
        let x = flake.position.x.clamp(r, (self.width - r).max(r));
        let y = flake.position.y.min(self.height - r);
        let position = Vec2::new(x, y);

        let settled = SettledFlake {
            position,
            radius: r,
            still_ms: 0.0,
            last_position: position,
        };
        self.settled.push_back(settled);
        if let Some(cap) = self.max_settled {
            while self.settled.len() > cap {
                self.settled.pop_front();
            }
        }

        let spawn_y = -MAX_RADIUS - self.rng.gen_range(0.0..RECYCLE_SPAWN_BAND);
        self.recycle(index, Some(spawn_y), true);
        settled
    }

    /// Promote the settled flake at `index` to frozen terrain.
    pub fn freeze(&mut self, index: usize) -> Option<FrozenFlake> {
        let settled = self.settled.remove(index)?;
        let frozen = FrozenFlake {
            position: settled.position,
            radius: settled.radius,
        };
        self.frozen.push(frozen);
        Some(frozen)
    }

    /// Drop settled and frozen snow and respawn the active population.
    pub fn reset(&mut self) {
        self.settled.clear();
        self.frozen.clear();
        self.active.clear();
        self.populate();
    }

    /// Drop every particle.
    pub fn clear(&mut self) {
        self.active.clear();
        self.settled.clear();
        self.frozen.clear();
    }

    /// Drop settled and frozen snow only.
    pub fn clear_piles(&mut self) {
        self.settled.clear();
        self.frozen.clear();
    }

    /// Move every active flake to a random spot inside the viewport.
    pub fn scatter_active(&mut self) {
        let (w, h) = (self.width, self.height);
        for flake in &mut self.active {
            flake.position = Vec2::new(self.rng.gen_range(0.0..w), self.rng.gen_range(0.0..h));
        }
    }

    /// Height of the pile in each of `bins` equal-width columns.
    ///
    /// Measured from the floor to the top of the highest settled or frozen
    /// flake whose center falls in the column.
    pub fn pile_profile(&self, bins: usize) -> Vec<f32> {
        let mut heights = vec![0.0f32; bins];
        if bins == 0 {
            return heights;
        }
        let bin_width = self.width / bins as f32;
        let bodies = self
            .settled
            .iter()
            .map(|s| (s.position, s.radius))
            .chain(self.frozen.iter().map(|f| (f.position, f.radius)));
        for (position, radius) in bodies {
            let bin = ((position.x / bin_width).floor().max(0.0) as usize).min(bins - 1);
            let top = (self.height - (position.y - radius)).max(0.0);
            if top > heights[bin] {
                heights[bin] = top;
            }
        }
        heights
    }

    #[cfg(test)]
    pub(crate) fn push_settled_at(&mut self, position: Vec2, radius: f32) {
        self.settled.push_back(SettledFlake {
            position,
            radius,
            still_ms: 0.0,
            last_position: position,
        });
    }

    #[cfg(test)]
    pub(crate) fn set_settled_position(&mut self, index: usize, position: Vec2) {
        self.settled[index].position = position;
    }

    #[cfg(test)]
    pub(crate) fn place_active(&mut self, index: usize, position: Vec2, velocity: Vec2) {
        let flake = &mut self.active[index];
        flake.position = position;
        flake.velocity = velocity;
    }

    #[cfg(test)]
    pub(crate) fn set_active_radius(&mut self, index: usize, radius: f32) {
        self.active[index].radius = radius;
    }
}
