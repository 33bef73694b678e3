//! Enemy vehicles and their pursuit/orbit AI
//!
//! Each enemy alternates between two behaviors, re-evaluated on a fixed
//! interval: `Curious` circles a point near the player, `Aggressive` drives
//! straight at them. Steering is only recomputed every few frames; between
//! recalculations the last velocity is reapplied.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::{Bounded, Rect};
use super::projectile::{Owner, Projectile};
use crate::consts::{CANVAS_WIDTH, GROUND_Y};
use crate::direction;

/// Frames between behavior re-evaluations
pub const DECISION_INTERVAL: f32 = 60.0;
/// Frames between steering recalculations
pub const MOVE_RECALC_INTERVAL: f32 = 5.0;
/// Inside this distance the enemy may turn aggressive
pub const CURIOSITY_RADIUS: f32 = 250.0;
/// Chance of turning aggressive when within the curiosity radius
pub const AGGRESSIVE_CHANCE: f64 = 0.3;
/// Maximum distance to the player for opening fire
pub const FIRE_RANGE: f32 = 450.0;
/// Velocity kept when bouncing off a playfield edge
pub const WALL_DAMPING: f32 = 0.8;
/// Fraction of an enemy's height allowed below the ground line
pub const FLOOR_MARGIN: f32 = 0.5;
/// Off-screen distance after which an enemy is dropped
pub const DESPAWN_MARGIN: f32 = 200.0;

const ENEMY_PROJECTILE_SPEED: f32 = 5.0;
const ENEMY_PROJECTILE_COLOR: u32 = 0xff3333;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Scout,
    Brute,
    Gunner,
}

/// Per-kind stats applied at spawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyTemplate {
    pub size: Vec2,
    pub max_health: f32,
    pub speed: f32,
    pub points: u64,
    pub contact_damage: f32,
    pub projectile_damage: f32,
    /// Chance per frame of firing when able
    pub fire_chance: f64,
    /// Minimum frames between shots
    pub fire_cooldown: f32,
    pub color: u32,
}

impl EnemyKind {
    pub fn template(&self) -> EnemyTemplate {
        match self {
            EnemyKind::Scout => EnemyTemplate {
                size: Vec2::new(30.0, 30.0),
                max_health: 30.0,
                speed: 2.5,
                points: 100,
                contact_damage: 10.0,
                projectile_damage: 10.0,
                fire_chance: 0.01,
                fire_cooldown: 90.0,
                color: 0xff4444,
            },
            EnemyKind::Brute => EnemyTemplate {
                size: Vec2::new(45.0, 45.0),
                max_health: 80.0,
                speed: 1.6,
                points: 250,
                contact_damage: 25.0,
                projectile_damage: 15.0,
                fire_chance: 0.005,
                fire_cooldown: 150.0,
                color: 0xaa33ff,
            },
            EnemyKind::Gunner => EnemyTemplate {
                size: Vec2::new(35.0, 30.0),
                max_health: 40.0,
                speed: 2.0,
                points: 150,
                contact_damage: 10.0,
                projectile_damage: 15.0,
                fire_chance: 0.04,
                fire_cooldown: 45.0,
                color: 0xffaa00,
            },
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "scout" => Some(EnemyKind::Scout),
            "brute" => Some(EnemyKind::Brute),
            "gunner" => Some(EnemyKind::Gunner),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    Curious,
    Aggressive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub points: u64,
    pub contact_damage: f32,
    pub behavior: Behavior,
    // Randomized once at spawn for variety
    pub orbit_angle: f32,
    pub orbit_radius: f32,
    /// Radians per frame
    pub orbit_speed: f32,
    /// Speed multiplier when aggressive
    pub aggression: f32,
    // Game-clock timestamps (scaled frames)
    last_decision: Option<f32>,
    last_steer: Option<f32>,
    last_shot: Option<f32>,
    /// Set once the enemy is fully on screen; edges only bounce after that
    pub entered: bool,
    pub hit_flash: f32,
}

impl Enemy {
    pub fn spawn(id: u32, kind: EnemyKind, pos: Vec2, rng: &mut impl Rng) -> Self {
        let t = kind.template();
        let orbit_dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        Self {
            id,
            kind,
            pos,
            vel: Vec2::new(-t.speed, 0.0),
            size: t.size,
            health: t.max_health,
            max_health: t.max_health,
            speed: t.speed,
            points: t.points,
            contact_damage: t.contact_damage,
            behavior: Behavior::Curious,
            orbit_angle: rng.random_range(0.0..std::f32::consts::TAU),
            orbit_radius: rng.random_range(80.0..CURIOSITY_RADIUS * 1.5),
            orbit_speed: orbit_dir * rng.random_range(0.01..0.04),
            aggression: rng.random_range(1.4..2.0),
            last_decision: None,
            last_steer: None,
            last_shot: None,
            entered: false,
            hit_flash: 0.0,
        }
    }

    pub fn template(&self) -> EnemyTemplate {
        self.kind.template()
    }

    /// Advance AI and movement. `now` is the scaled game clock, so decision,
    /// steering and fire cadence follow game time rather than host frames.
    /// May return a projectile aimed at the player.
    pub fn update(
        &mut self,
        target: Vec2,
        now: f32,
        dt: f32,
        rng: &mut impl Rng,
    ) -> Option<Projectile> {
        let center = self.center();
        let distance = center.distance(target);

        if self
            .last_decision
            .is_none_or(|last| now - last >= DECISION_INTERVAL)
        {
            self.last_decision = Some(now);
            self.behavior = if distance > CURIOSITY_RADIUS {
                Behavior::Curious
            } else if rng.random_bool(AGGRESSIVE_CHANCE) {
                Behavior::Aggressive
            } else {
                Behavior::Curious
            };
        }

        let since_steer = self.last_steer.map(|last| now - last);
        if since_steer.is_none_or(|frames| frames >= MOVE_RECALC_INTERVAL) {
            // Keep the recalculation phase when dt doesn't divide the interval
            self.last_steer = Some(match since_steer {
                Some(since) if since < MOVE_RECALC_INTERVAL * 2.0 => {
                    now - (since - MOVE_RECALC_INTERVAL)
                }
                _ => now,
            });
            self.steer(center, target, since_steer.unwrap_or(MOVE_RECALC_INTERVAL));
        }

        self.pos += self.vel * dt;
        if !self.entered && self.pos.x + self.size.x <= CANVAS_WIDTH && self.pos.x >= 0.0 {
            self.entered = true;
        }
        if self.entered {
            self.bounce_off_edges();
        }
        self.hit_flash = (self.hit_flash - dt).max(0.0);

        self.try_fire(target, distance, now, dt, rng)
    }

    fn steer(&mut self, center: Vec2, target: Vec2, elapsed: f32) {
        match self.behavior {
            Behavior::Curious => {
                self.orbit_angle =
                    (self.orbit_angle + self.orbit_speed * elapsed) % std::f32::consts::TAU;
                let radius = self.orbit_radius.min(CURIOSITY_RADIUS);
                let anchor = target + direction(self.orbit_angle) * radius;
                self.vel = (anchor - center).clamp_length_max(self.speed);
            }
            Behavior::Aggressive => {
                self.vel = (target - center).normalize_or_zero() * self.speed * self.aggression;
            }
        }
    }

    fn bounce_off_edges(&mut self) {
        if self.pos.x < 0.0 {
            self.pos.x = 0.0;
            self.vel.x = self.vel.x.abs() * WALL_DAMPING;
        } else if self.pos.x + self.size.x > CANVAS_WIDTH {
            self.pos.x = CANVAS_WIDTH - self.size.x;
            self.vel.x = -self.vel.x.abs() * WALL_DAMPING;
        }

        let max_y = GROUND_Y - self.size.y * (1.0 - FLOOR_MARGIN);
        if self.pos.y < 0.0 {
            self.pos.y = 0.0;
            self.vel.y = self.vel.y.abs() * WALL_DAMPING;
        } else if self.pos.y > max_y {
            self.pos.y = max_y;
            self.vel.y = -self.vel.y.abs() * WALL_DAMPING;
        }
    }

    fn try_fire(
        &mut self,
        target: Vec2,
        distance: f32,
        now: f32,
        dt: f32,
        rng: &mut impl Rng,
    ) -> Option<Projectile> {
        let t = self.template();
        if !self.entered || distance > FIRE_RANGE {
            return None;
        }
        if self
            .last_shot
            .is_some_and(|last| now - last < t.fire_cooldown)
        {
            return None;
        }
        if !rng.random_bool((t.fire_chance * dt as f64).clamp(0.0, 1.0)) {
            return None;
        }
        self.last_shot = Some(now);

        let center = self.center();
        let aim = (target - center).normalize_or_zero();
        let size = Vec2::new(8.0, 8.0);
        Some(Projectile::new(
            center - size * 0.5,
            aim * ENEMY_PROJECTILE_SPEED,
            size,
            t.projectile_damage,
            ENEMY_PROJECTILE_COLOR,
            Owner::Enemy,
        ))
    }

    /// Subtract health; returns true if the enemy died
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.health -= amount;
        self.hit_flash = 6.0;
        self.health <= 0.0
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// True once the enemy has wandered far enough off the playfield to drop
    pub fn is_out_of_play(&self) -> bool {
        self.pos.x + self.size.x < -DESPAWN_MARGIN
            || self.pos.x > CANVAS_WIDTH + DESPAWN_MARGIN * 4.0
    }
}

impl Bounded for Enemy {
    fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}
