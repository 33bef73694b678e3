//! Pickups: power-ups and score tokens
//!
//! Pickups float in place (bobbing) and scroll with the level until the
//! player drives through them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Bounded, Rect};

pub const POWER_UP_SIZE: Vec2 = Vec2::new(24.0, 24.0);
/// Vertical bob distance (pixels)
pub const BOB_AMPLITUDE: f32 = 6.0;
/// Bob phase advance (radians per frame)
pub const BOB_SPEED: f32 = 0.1;
/// Health restored by a health pickup
pub const HEALTH_PICKUP_AMOUNT: f32 = 25.0;
/// Points granted by a coin token
pub const COIN_POINTS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerUpKind {
    /// Grow to double size with double damage
    Mushroom,
    Health,
    /// One special-ability charge
    Charge,
    Coin,
}

impl PowerUpKind {
    pub fn color(&self) -> u32 {
        match self {
            PowerUpKind::Mushroom => 0xff2222,
            PowerUpKind::Health => 0x22ff66,
            PowerUpKind::Charge => 0x33aaff,
            PowerUpKind::Coin => 0xffd700,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "mushroom" => Some(PowerUpKind::Mushroom),
            "health" => Some(PowerUpKind::Health),
            "charge" => Some(PowerUpKind::Charge),
            "coin" => Some(PowerUpKind::Coin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub size: Vec2,
    /// Resting height the bob oscillates around
    pub base_y: f32,
    pub phase: f32,
}

impl PowerUp {
    /// Create a pickup centered on `center`
    pub fn new(kind: PowerUpKind, center: Vec2) -> Self {
        let pos = center - POWER_UP_SIZE * 0.5;
        Self {
            kind,
            pos,
            size: POWER_UP_SIZE,
            base_y: pos.y,
            phase: 0.0,
        }
    }

    /// Scroll left by `scroll_dx` and bob
    pub fn update(&mut self, scroll_dx: f32, dt: f32) {
        self.pos.x -= scroll_dx;
        self.phase = (self.phase + BOB_SPEED * dt) % std::f32::consts::TAU;
        self.pos.y = self.base_y + self.phase.sin() * BOB_AMPLITUDE;
    }

    pub fn is_off_screen(&self) -> bool {
        self.pos.x + self.size.x < 0.0
    }
}

impl Bounded for PowerUp {
    fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}
