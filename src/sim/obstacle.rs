//! Obstacles: props, smashable boxes and explosive vehicles
//!
//! State machine:
//! - Box: `Intact -> Cracking { hits: 1 } -> Destroyed` (exactly two hits,
//!   whatever the damage)
//! - Car / Cybertruck: `Intact -> Exploding -> Destroyed` once the hit
//!   counter reaches the type's threshold. Conventional damage never hurts
//!   a vehicle.
//! - Generic: always `Intact`
//!
//! Each explosion instance remembers which enemies it already damaged so an
//! enemy is hurt at most once per explosion.

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Bounded, Rect};
use super::powerup::PowerUpKind;
use crate::consts::GROUND_Y;
use crate::direction;

/// Frames a box stays squashed after a hit
pub const SQUASH_FRAMES: f32 = 12.0;
/// Frames an explosion lasts
pub const EXPLOSION_DURATION: f32 = 60.0;
/// Fraction of the duration the blast radius takes to reach full size
const EXPLOSION_GROWTH: f32 = 0.5;
/// Delays (frames) of the follow-up particle bursts
const SECONDARY_BURST_DELAYS: [f32; 2] = [8.0, 18.0];
const MAX_EXPLOSION_PARTICLES: usize = 160;
const DEBRIS_GRAVITY: f32 = 0.35;
/// How far off the left edge an obstacle drifts before removal
const OFFSCREEN_MARGIN: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Generic,
    Box,
    Car,
    Cybertruck,
}

/// Per-kind constants, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleSpec {
    pub size: Vec2,
    pub points: u64,
    /// `None` means conventional damage never destroys it
    pub health: Option<u8>,
    /// Hits before a vehicle explodes
    pub explosion_threshold: Option<u32>,
    pub explosion_radius: f32,
    pub explosion_damage: f32,
    pub color: u32,
}

impl ObstacleKind {
    pub fn spec(&self) -> ObstacleSpec {
        match self {
            ObstacleKind::Generic => ObstacleSpec {
                size: Vec2::new(40.0, 50.0),
                points: 0,
                health: None,
                explosion_threshold: None,
                explosion_radius: 0.0,
                explosion_damage: 0.0,
                color: 0x777777,
            },
            ObstacleKind::Box => ObstacleSpec {
                size: Vec2::new(40.0, 40.0),
                points: 50,
                health: Some(2),
                explosion_threshold: None,
                explosion_radius: 0.0,
                explosion_damage: 0.0,
                color: 0xb5651d,
            },
            ObstacleKind::Car => ObstacleSpec {
                size: Vec2::new(80.0, 40.0),
                points: 300,
                health: None,
                explosion_threshold: Some(3),
                explosion_radius: 120.0,
                explosion_damage: 40.0,
                color: 0x3366cc,
            },
            ObstacleKind::Cybertruck => ObstacleSpec {
                size: Vec2::new(110.0, 50.0),
                points: 500,
                health: None,
                explosion_threshold: Some(5),
                explosion_radius: 170.0,
                explosion_damage: 60.0,
                color: 0xc0c0c0,
            },
        }
    }

    pub fn is_vehicle(&self) -> bool {
        matches!(self, ObstacleKind::Car | ObstacleKind::Cybertruck)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "generic" => Some(ObstacleKind::Generic),
            "box" => Some(ObstacleKind::Box),
            "car" => Some(ObstacleKind::Car),
            "cybertruck" => Some(ObstacleKind::Cybertruck),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionParticleKind {
    Fire,
    /// Arcs under gravity
    Debris,
    /// Rises and fades
    Smoke,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionParticle {
    pub kind: ExplosionParticleKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Frames left
    pub life: f32,
    pub max_life: f32,
}

impl ExplosionParticle {
    /// Remaining life in 0..=1 (for fading)
    pub fn alpha(&self) -> f32 {
        if self.max_life > 0.0 {
            (self.life / self.max_life).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// One activation of a vehicle's area damage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub timer: f32,
    pub duration: f32,
    pub max_radius: f32,
    pub radius: f32,
    pub damage: f32,
    /// Enemy ids this instance already damaged
    pub hit_enemies: HashSet<u32>,
    pub player_hit: bool,
    pub particles: Vec<ExplosionParticle>,
    /// Countdown (frames) to each pending follow-up burst
    pub pending_bursts: Vec<f32>,
}

impl Explosion {
    fn new(max_radius: f32, damage: f32) -> Self {
        Self {
            timer: 0.0,
            duration: EXPLOSION_DURATION,
            max_radius,
            radius: max_radius * (1.0 - EXPLOSION_GROWTH),
            damage,
            hit_enemies: HashSet::new(),
            player_hit: false,
            particles: Vec::new(),
            pending_bursts: SECONDARY_BURST_DELAYS.to_vec(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.timer >= self.duration
    }

    pub fn has_hit(&self, enemy_id: u32) -> bool {
        self.hit_enemies.contains(&enemy_id)
    }

    /// Remember that `enemy_id` took damage from this instance
    pub fn record_hit(&mut self, enemy_id: u32) {
        self.hit_enemies.insert(enemy_id);
    }

    fn seed(&mut self, rng: &mut impl Rng, center: Vec2, scale: f32) {
        let fire = (30.0 * scale) as usize;
        let debris = (16.0 * scale) as usize;
        let smoke = (12.0 * scale) as usize;

        for _ in 0..fire {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let life = rng.random_range(20.0..40.0);
            self.push(ExplosionParticle {
                kind: ExplosionParticleKind::Fire,
                pos: center,
                vel: direction(angle) * rng.random_range(2.0..7.0),
                size: rng.random_range(6.0..14.0),
                life,
                max_life: life,
            });
        }
        for _ in 0..debris {
            // Mostly upward so the pieces arc
            let angle = rng.random_range(-2.8..-0.35);
            let life = rng.random_range(40.0..70.0);
            self.push(ExplosionParticle {
                kind: ExplosionParticleKind::Debris,
                pos: center,
                vel: direction(angle) * rng.random_range(4.0..10.0),
                size: rng.random_range(3.0..7.0),
                life,
                max_life: life,
            });
        }
        for _ in 0..smoke {
            let life = rng.random_range(50.0..90.0);
            self.push(ExplosionParticle {
                kind: ExplosionParticleKind::Smoke,
                pos: center
                    + Vec2::new(rng.random_range(-20.0..20.0), rng.random_range(-10.0..10.0)),
                vel: Vec2::new(rng.random_range(-0.6..0.6), rng.random_range(-1.6..-0.4)),
                size: rng.random_range(12.0..24.0),
                life,
                max_life: life,
            });
        }
    }

    fn push(&mut self, particle: ExplosionParticle) {
        if self.particles.len() >= MAX_EXPLOSION_PARTICLES {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    fn advance(&mut self, rng: &mut impl Rng, center: Vec2, scroll_dx: f32, dt: f32) {
        self.timer += dt;
        let growth = (self.timer / (self.duration * EXPLOSION_GROWTH)).min(1.0);
        self.radius = self.max_radius * (1.0 - EXPLOSION_GROWTH + EXPLOSION_GROWTH * growth);

        let mut due = 0;
        for countdown in &mut self.pending_bursts {
            *countdown -= dt;
            if *countdown <= 0.0 {
                due += 1;
            }
        }
        self.pending_bursts.retain(|c| *c > 0.0);
        for _ in 0..due {
            let offset = direction(rng.random_range(0.0..std::f32::consts::TAU))
                * rng.random_range(0.0..self.max_radius * 0.4);
            self.seed(rng, center + offset, 0.4);
        }

        for p in &mut self.particles {
            p.pos.x -= scroll_dx;
            p.pos += p.vel * dt;
            p.life -= dt;
            match p.kind {
                ExplosionParticleKind::Fire => {
                    p.vel *= 0.94;
                    p.size *= 0.97;
                }
                ExplosionParticleKind::Debris => {
                    p.vel.y += DEBRIS_GRAVITY * dt;
                    if p.pos.y > GROUND_Y {
                        p.pos.y = GROUND_Y;
                        p.vel.y = -p.vel.y * 0.4;
                        p.vel.x *= 0.7;
                    }
                }
                ExplosionParticleKind::Smoke => {
                    p.size += 0.3 * dt;
                }
            }
        }
        self.particles.retain(|p| p.life > 0.0 && p.size > 0.1);

        if self.is_finished() {
            self.radius = 0.0;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ObstacleState {
    Intact,
    Cracking { hits: u8 },
    Exploding(Explosion),
    Destroyed,
}

/// Result of hitting an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already exploding or destroyed
    Ignored,
    /// Took the hit without visible effect (props, vehicles below threshold)
    Absorbed,
    /// Box cracked but still standing
    Cracked,
    /// Box smashed; the caller removes it and awards points
    Destroyed,
    /// Vehicle started exploding
    Detonated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub points: u64,
    pub health: Option<u8>,
    /// Boxes: landings/hits taken. Vehicles: hits toward the explosion threshold.
    pub hit_count: u32,
    pub state: ObstacleState,
    /// Remaining squash animation frames (boxes)
    pub squash: f32,
    /// Pickup released when a box is smashed
    pub contains: Option<PowerUpKind>,
}

impl Obstacle {
    pub fn new(id: u32, kind: ObstacleKind, pos: Vec2) -> Self {
        let spec = kind.spec();
        Self {
            id,
            kind,
            pos,
            size: spec.size,
            points: spec.points,
            health: spec.health,
            hit_count: 0,
            state: ObstacleState::Intact,
            squash: 0.0,
            contains: None,
        }
    }

    /// Create an obstacle standing on the ground at `x`
    pub fn on_ground(id: u32, kind: ObstacleKind, x: f32) -> Self {
        let size = kind.spec().size;
        Self::new(id, kind, Vec2::new(x, GROUND_Y - size.y))
    }

    pub fn with_contents(mut self, contents: PowerUpKind) -> Self {
        if self.kind == ObstacleKind::Box {
            self.contains = Some(contents);
        }
        self
    }

    pub fn spec(&self) -> ObstacleSpec {
        self.kind.spec()
    }

    /// Solid obstacles block the player; exploding ones don't
    pub fn is_solid(&self) -> bool {
        matches!(self.state, ObstacleState::Intact | ObstacleState::Cracking { .. })
    }

    pub fn is_exploding(&self) -> bool {
        matches!(self.state, ObstacleState::Exploding(_))
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self.state, ObstacleState::Destroyed)
    }

    pub fn explosion(&self) -> Option<&Explosion> {
        match &self.state {
            ObstacleState::Exploding(explosion) => Some(explosion),
            _ => None,
        }
    }

    pub fn explosion_mut(&mut self) -> Option<&mut Explosion> {
        match &mut self.state {
            ObstacleState::Exploding(explosion) => Some(explosion),
            _ => None,
        }
    }

    /// Current blast radius (0 when not exploding)
    pub fn explosion_radius(&self) -> f32 {
        self.explosion().map_or(0.0, |e| e.radius)
    }

    /// True iff exploding and `other`'s center lies within the blast radius
    pub fn is_in_explosion_radius(&self, other: &impl Bounded) -> bool {
        match self.explosion() {
            Some(explosion) if explosion.radius > 0.0 => {
                self.center().distance(other.center()) <= explosion.radius
            }
            _ => false,
        }
    }

    /// Register a hit. Boxes lose exactly one health per hit regardless of
    /// `amount`; vehicles only count hits toward their explosion threshold.
    pub fn take_damage(&mut self, amount: f32, rng: &mut impl Rng) -> DamageOutcome {
        if !self.is_solid() || amount <= 0.0 {
            return DamageOutcome::Ignored;
        }

        if let Some(health) = self.health {
            let health = health.saturating_sub(1);
            self.health = Some(health);
            self.hit_count += 1;
            self.squash = SQUASH_FRAMES;
            if health == 0 {
                self.state = ObstacleState::Destroyed;
                return DamageOutcome::Destroyed;
            }
            self.state = ObstacleState::Cracking {
                hits: self.hit_count.min(u8::MAX as u32) as u8,
            };
            return DamageOutcome::Cracked;
        }

        match self.spec().explosion_threshold {
            Some(threshold) => {
                self.hit_count += 1;
                if self.hit_count >= threshold {
                    self.explode(rng);
                    DamageOutcome::Detonated
                } else {
                    DamageOutcome::Absorbed
                }
            }
            None => DamageOutcome::Absorbed,
        }
    }

    /// Start the explosion. Only vehicles explode, and only once.
    pub fn explode(&mut self, rng: &mut impl Rng) -> bool {
        let spec = self.spec();
        if !self.kind.is_vehicle() || !self.is_solid() {
            return false;
        }
        let mut explosion = Explosion::new(spec.explosion_radius, spec.explosion_damage);
        explosion.seed(rng, self.center(), 1.0);
        self.state = ObstacleState::Exploding(explosion);
        log::debug!("Obstacle {} ({:?}) exploded", self.id, self.kind);
        true
    }

    /// Scroll left by `scroll_dx` and run animations.
    /// Returns true once an explosion has completed this frame.
    pub fn update(&mut self, scroll_dx: f32, dt: f32, rng: &mut impl Rng) -> bool {
        self.pos.x -= scroll_dx;
        self.squash = (self.squash - dt).max(0.0);

        let center = self.center();
        if let ObstacleState::Exploding(explosion) = &mut self.state {
            explosion.advance(rng, center, scroll_dx, dt);
            if explosion.is_finished() {
                self.state = ObstacleState::Destroyed;
                return true;
            }
        }
        false
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.x + self.size.x < -OFFSCREEN_MARGIN
    }

    /// Squash factor for rendering (1.0 = normal height)
    pub fn squash_scale(&self) -> f32 {
        1.0 - 0.3 * (self.squash / SQUASH_FRAMES)
    }
}

impl Bounded for Obstacle {
    fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(42)
    }

    #[test]
    fn test_box_breaks_on_second_hit() {
        let mut rng = rng();
        let mut b = Obstacle::on_ground(1, ObstacleKind::Box, 300.0);
        assert_eq!(b.take_damage(1000.0, &mut rng), DamageOutcome::Cracked);
        assert!(matches!(b.state, ObstacleState::Cracking { hits: 1 }));
        assert!(b.squash > 0.0);
        assert_eq!(b.take_damage(0.5, &mut rng), DamageOutcome::Destroyed);
        assert!(b.is_destroyed());
        assert_eq!(b.take_damage(10.0, &mut rng), DamageOutcome::Ignored);
    }

    #[test]
    fn test_vehicle_threshold() {
        let mut rng = rng();
        let mut truck = Obstacle::on_ground(2, ObstacleKind::Cybertruck, 400.0);
        for _ in 0..4 {
            assert_eq!(truck.take_damage(25.0, &mut rng), DamageOutcome::Absorbed);
            assert!(truck.is_solid());
        }
        assert_eq!(truck.health, None);
        assert_eq!(truck.take_damage(25.0, &mut rng), DamageOutcome::Detonated);
        let explosion = truck.explosion().expect("exploding");
        assert_eq!(explosion.timer, 0.0);
        assert!(explosion.radius > 0.0);
        assert!(!explosion.particles.is_empty());
        assert!(!truck.is_solid());
    }

    #[test]
    fn test_generic_is_indestructible() {
        let mut rng = rng();
        let mut prop = Obstacle::on_ground(3, ObstacleKind::Generic, 100.0);
        for _ in 0..50 {
            assert_eq!(prop.take_damage(99.0, &mut rng), DamageOutcome::Absorbed);
        }
        assert!(prop.is_solid());
        assert!(!prop.explode(&mut rng));
    }

    #[test]
    fn test_explosion_radius_check() {
        let mut rng = rng();
        let mut car = Obstacle::on_ground(4, ObstacleKind::Car, 400.0);
        let near = Rect::new(car.pos.x + 100.0, car.pos.y, 20.0, 20.0);
        assert!(!car.is_in_explosion_radius(&near));
        car.explode(&mut rng);
        let radius = car.explosion_radius();
        assert!(radius > 0.0);
        let far = Rect::new(car.center().x + radius + 50.0, car.pos.y, 10.0, 10.0);
        assert!(!car.is_in_explosion_radius(&far));
        let inside = Rect::new(
            car.center().x + radius * 0.5 - 5.0,
            car.center().y - 5.0,
            10.0,
            10.0,
        );
        assert!(car.is_in_explosion_radius(&inside));
    }

    #[test]
    fn test_explosion_completes() {
        let mut rng = rng();
        let mut car = Obstacle::on_ground(5, ObstacleKind::Car, 400.0);
        car.explode(&mut rng);
        let mut finished = false;
        let mut last_radius = car.explosion_radius();
        for _ in 0..(EXPLOSION_DURATION as usize) {
            finished = car.update(0.0, 1.0, &mut rng);
            if finished {
                break;
            }
            assert!(car.explosion_radius() >= last_radius);
            last_radius = car.explosion_radius();
        }
        assert!(finished);
        assert!(car.is_destroyed());
        assert_eq!(car.explosion_radius(), 0.0);
    }

    #[test]
    fn test_hit_set_per_instance() {
        let mut rng = rng();
        let mut car = Obstacle::on_ground(6, ObstacleKind::Car, 400.0);
        car.explode(&mut rng);
        let explosion = car.explosion_mut().expect("exploding");
        assert!(!explosion.has_hit(9));
        explosion.record_hit(9);
        assert!(explosion.has_hit(9));
    }

    #[test]
    fn test_secondary_bursts_fire_once() {
        let mut rng = rng();
        let mut car = Obstacle::on_ground(7, ObstacleKind::Car, 400.0);
        car.explode(&mut rng);
        for _ in 0..20 {
            car.update(0.0, 1.0, &mut rng);
        }
        assert!(car.explosion().expect("still exploding").pending_bursts.is_empty());
    }

    #[test]
    fn test_scrolls_with_level() {
        let mut rng = rng();
        let mut prop = Obstacle::on_ground(8, ObstacleKind::Generic, 10.0);
        prop.update(3.0, 1.0, &mut rng);
        assert_eq!(prop.pos.x, 7.0);
        prop.pos.x = -200.0;
        assert!(prop.is_off_screen());
    }

    #[test]
    fn test_only_boxes_hold_pickups() {
        let b = Obstacle::on_ground(9, ObstacleKind::Box, 0.0).with_contents(PowerUpKind::Mushroom);
        assert_eq!(b.contains, Some(PowerUpKind::Mushroom));
        let car = Obstacle::on_ground(10, ObstacleKind::Car, 0.0).with_contents(PowerUpKind::Coin);
        assert_eq!(car.contains, None);
    }
}
