//! Projectiles: plain data records owned by the game state

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Bounded, Rect};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, GROUND_Y};

/// Distance past the playfield edge before a projectile is dropped
const OUT_OF_BOUNDS_MARGIN: f32 = 50.0;
/// Vertical speed kept after bouncing off the ground
const FLOOR_BOUNCE_DAMPING: f32 = 0.6;

/// Who fired the projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// Sinusoidal vertical offset (cannon shells)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Oscillation {
    pub amplitude: f32,
    /// Radians per frame
    pub frequency: f32,
    /// Unoffset vertical position
    pub base_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub damage: f32,
    /// 0xRRGGBB
    pub color: u32,
    pub owner: Owner,
    pub oscillation: Option<Oscillation>,
    /// Ground bounces left before the projectile is removed on floor contact
    #[serde(default)]
    pub bounces: u8,
    /// Frames alive
    #[serde(default)]
    pub age: f32,
}

/// What happened to a projectile this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileFate {
    Alive,
    Bounced,
    HitFloor,
    OutOfBounds,
}

impl Projectile {
    pub fn new(pos: Vec2, vel: Vec2, size: Vec2, damage: f32, color: u32, owner: Owner) -> Self {
        Self {
            pos,
            vel,
            size,
            damage,
            color,
            owner,
            oscillation: None,
            bounces: 0,
            age: 0.0,
        }
    }

    pub fn with_oscillation(mut self, amplitude: f32, frequency: f32) -> Self {
        self.oscillation = Some(Oscillation {
            amplitude,
            frequency,
            base_y: self.pos.y,
        });
        self
    }

    pub fn with_bounces(mut self, bounces: u8) -> Self {
        self.bounces = bounces;
        self
    }

    pub fn is_player_owned(&self) -> bool {
        self.owner == Owner::Player
    }

    /// Move by `dt` frames and report whether it should be kept
    pub fn advance(&mut self, dt: f32) -> ProjectileFate {
        self.age += dt;
        self.pos.x += self.vel.x * dt;
        match &mut self.oscillation {
            Some(osc) => {
                osc.base_y += self.vel.y * dt;
                self.pos.y = osc.base_y + osc.amplitude * (self.age * osc.frequency).sin();
            }
            None => self.pos.y += self.vel.y * dt,
        }

        if self.pos.y + self.size.y >= GROUND_Y && self.vel.y >= 0.0 && self.oscillation.is_none()
        {
            if self.bounces > 0 && self.vel.y > 0.0 {
                self.bounces -= 1;
                self.pos.y = GROUND_Y - self.size.y;
                self.vel.y = -self.vel.y * FLOOR_BOUNCE_DAMPING;
                return ProjectileFate::Bounced;
            }
            return ProjectileFate::HitFloor;
        }

        let right = self.pos.x + self.size.x;
        let bottom = self.pos.y + self.size.y;
        if right < -OUT_OF_BOUNDS_MARGIN
            || self.pos.x > CANVAS_WIDTH + OUT_OF_BOUNDS_MARGIN
            || bottom < -OUT_OF_BOUNDS_MARGIN
            || self.pos.y > CANVAS_HEIGHT + OUT_OF_BOUNDS_MARGIN
        {
            return ProjectileFate::OutOfBounds;
        }
        ProjectileFate::Alive
    }
}

impl Bounded for Projectile {
    fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}
