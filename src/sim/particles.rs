//! Transient visual-effect particles
//!
//! Particles never affect gameplay. They shrink every frame and are removed
//! once their size reaches zero; the pool drops the oldest particles when it
//! grows past its cap.

use std::ops::Range;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::GROUND_Y;
use crate::direction;

/// Default pool cap (overridden by the quality preset)
pub const DEFAULT_MAX_PARTICLES: usize = 300;
/// Size lost per frame
pub const SIZE_DECAY: f32 = 0.1;
/// Extra size lost per frame by particles that sink into the ground
pub const GROUND_DECAY: f32 = 0.4;
/// Downward pull per frame
pub const PARTICLE_GRAVITY: f32 = 0.1;
/// Vertical speed kept after a ground bounce
pub const BOUNCE_DAMPING: f32 = 0.5;

const EMIT_SPEED: Range<f32> = 1.0..5.0;
const EMIT_SIZE: Range<f32> = 2.0..6.0;

/// A single effect particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// 0xRRGGBB
    pub color: u32,
}

/// Capped particle pool (oldest first)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    cap: usize,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PARTICLES)
    }
}

impl ParticlePool {
    pub fn new(cap: usize) -> Self {
        Self {
            particles: Vec::with_capacity(cap.min(1024)),
            cap,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn set_cap(&mut self, cap: usize) {
        self.cap = cap;
        self.enforce_cap();
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Emit `count` particles at `pos` in random directions
    pub fn emit(&mut self, rng: &mut impl Rng, pos: Vec2, count: usize, color: u32) {
        self.emit_with(rng, pos, count, color, EMIT_SPEED, EMIT_SIZE);
    }

    /// Emit with explicit speed and size ranges
    pub fn emit_with(
        &mut self,
        rng: &mut impl Rng,
        pos: Vec2,
        count: usize,
        color: u32,
        speed: Range<f32>,
        size: Range<f32>,
    ) {
        if self.cap == 0 {
            return;
        }
        for _ in 0..count {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let speed = rng.random_range(speed.clone());
            self.particles.push(Particle {
                pos,
                vel: direction(angle) * speed,
                size: rng.random_range(size.clone()),
                color,
            });
        }
        self.enforce_cap();
    }

    /// Advance all particles by `dt` frames
    pub fn advance(&mut self, rng: &mut impl Rng, dt: f32) {
        for p in &mut self.particles {
            p.vel.y += PARTICLE_GRAVITY * dt;
            p.pos += p.vel * dt;
            p.size -= SIZE_DECAY * dt;

            // Below the ground line: bounce back up or burn out quickly
            if p.pos.y > GROUND_Y && p.vel.y > 0.0 {
                if rng.random_bool(0.5) {
                    p.pos.y = GROUND_Y;
                    p.vel.y = -p.vel.y * BOUNCE_DAMPING;
                } else {
                    p.size -= GROUND_DECAY * dt;
                }
            }
        }
        self.particles.retain(|p| p.size > 0.0);
        self.enforce_cap();
    }

    fn enforce_cap(&mut self) {
        if self.particles.len() > self.cap {
            let excess = self.particles.len() - self.cap;
            self.particles.drain(..excess);
        }
    }
}
