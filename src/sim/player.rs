//! The player's vehicle
//!
//! Movement, weapons, the "stampede" special ability and the mushroom
//! grow/shrink power-up all live here. Health is clamped to
//! `[0, max_health]` after every mutation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Bounded, Rect};
use super::projectile::{Owner, Projectile};
use crate::consts::*;
use crate::{direction, lerp};

/// Frames a grow or shrink animation takes (~0.5 s)
pub const POWER_ANIM_FRAMES: f32 = 30.0;
/// Frames the powered-up state lasts before shrinking back
pub const POWER_DURATION_FRAMES: f32 = 600.0;
/// Width and height scale when fully powered up
pub const POWER_WIDTH_SCALE: f32 = 2.0;
pub const POWER_HEIGHT_SCALE: f32 = 2.5;
/// Damage multiplier while the power-up is active
pub const POWER_DAMAGE_MULTIPLIER: f32 = 2.0;

/// Frames of contact-damage immunity after being rammed
pub const CONTACT_COOLDOWN_FRAMES: f32 = 45.0;

/// Frames one special charge keeps the stampede going
pub const SPECIAL_DURATION_FRAMES: f32 = 180.0;
/// Frames between stampede volleys
pub const SPECIAL_BURST_INTERVAL: f32 = 12.0;
/// Fan angles (degrees, positive is downward)
const SPECIAL_FAN_DEGREES: [f32; 5] = [-30.0, -15.0, 0.0, 15.0, 30.0];
const SPECIAL_PROJECTILE_SPEED: f32 = 9.0;
const SPECIAL_PROJECTILE_DAMAGE: f32 = 15.0;
const SPECIAL_PROJECTILE_COLOR: u32 = 0xffd700;

/// A weapon definition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weapon {
    pub name: &'static str,
    pub damage: f32,
    /// A shot needs more than this many frames since the previous one
    pub fire_rate: f32,
    pub speed: f32,
    pub size: Vec2,
    pub color: u32,
    /// Vertical wobble (amplitude, radians per frame)
    pub oscillation: Option<(f32, f32)>,
}

/// Fixed weapon table, cycled by `switch_weapon`
pub const WEAPONS: [Weapon; 3] = [
    Weapon {
        name: "Blaster",
        damage: 10.0,
        fire_rate: 8.0,
        speed: 10.0,
        size: Vec2::new(10.0, 4.0),
        color: 0x00ffff,
        oscillation: None,
    },
    Weapon {
        name: "Laser",
        damage: 18.0,
        fire_rate: 16.0,
        speed: 16.0,
        size: Vec2::new(24.0, 3.0),
        color: 0xff00ff,
        oscillation: None,
    },
    Weapon {
        name: "Cannon",
        damage: 35.0,
        fire_rate: 30.0,
        speed: 7.0,
        size: Vec2::new(12.0, 12.0),
        color: 0xff6600,
        oscillation: Some((15.0, 0.15)),
    },
];

/// Movement input for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

/// Mushroom power-up animation state (the variants are mutually exclusive)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PowerState {
    Normal,
    /// Growing, `progress` counts frames toward `POWER_ANIM_FRAMES`
    Growing { progress: f32 },
    /// Fully grown, `remaining` frames until it wears off
    Powered { remaining: f32 },
    Shrinking { progress: f32 },
}

impl PowerState {
    /// (width, height) scale for this state
    pub fn scale(&self) -> (f32, f32) {
        match *self {
            PowerState::Normal => (1.0, 1.0),
            PowerState::Growing { progress } => {
                let t = (progress / POWER_ANIM_FRAMES).clamp(0.0, 1.0);
                (lerp(1.0, POWER_WIDTH_SCALE, t), lerp(1.0, POWER_HEIGHT_SCALE, t))
            }
            PowerState::Powered { .. } => (POWER_WIDTH_SCALE, POWER_HEIGHT_SCALE),
            PowerState::Shrinking { progress } => {
                let t = (progress / POWER_ANIM_FRAMES).clamp(0.0, 1.0);
                (lerp(POWER_WIDTH_SCALE, 1.0, t), lerp(POWER_HEIGHT_SCALE, 1.0, t))
            }
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self, PowerState::Growing { .. } | PowerState::Shrinking { .. })
    }
}

/// Stampede special ability bookkeeping, in scaled frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialState {
    pub active: bool,
    /// Frames until the current charge runs out
    pub remaining: f32,
    /// Frames until the next volley
    pub burst_cooldown: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub base_size: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub weapon_index: usize,
    pub special_charges: u32,
    pub max_special_charges: u32,
    pub special: SpecialState,
    pub jumping: bool,
    /// Standing on the ground, a platform or an obstacle as of the last landing check
    pub grounded: bool,
    pub power: PowerState,
    /// Set when the mushroom is eaten, cleared when it wears off
    pub damage_boost: bool,
    /// Frames until the weapon may fire again
    fire_cooldown: f32,
    /// Frames left of contact-damage immunity
    pub contact_cooldown: f32,
    /// Wheel spin for rendering (radians)
    pub wheel_angle: f32,
    /// Red flash after taking damage (frames)
    pub hit_flash: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        let size = Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT);
        Self {
            pos: Vec2::new(PLAYER_START_X, GROUND_Y - size.y),
            vel: Vec2::ZERO,
            size,
            base_size: size,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            weapon_index: 0,
            special_charges: MAX_SPECIAL_CHARGES,
            max_special_charges: MAX_SPECIAL_CHARGES,
            special: SpecialState::default(),
            jumping: false,
            grounded: true,
            power: PowerState::Normal,
            damage_boost: false,
            fire_cooldown: 0.0,
            contact_cooldown: 0.0,
            wheel_angle: 0.0,
            hit_flash: 0.0,
        }
    }

    /// Advance movement, gravity and animations by `dt` frames
    pub fn update(&mut self, input: MoveInput, dt: f32) {
        let mut dir = 0.0;
        if input.left {
            dir -= 1.0;
        }
        if input.right {
            dir += 1.0;
        }
        self.vel.x = dir * PLAYER_SPEED;
        self.pos.x += self.vel.x * dt;

        if input.jump && self.grounded {
            self.vel.y = JUMP_IMPULSE;
            self.jumping = true;
        }
        // Re-established below or by the caller's platform/obstacle checks
        self.grounded = false;

        self.vel.y += GRAVITY * dt;
        self.pos.y += self.vel.y * dt;

        if self.pos.y + self.size.y >= GROUND_Y {
            self.land_on(GROUND_Y);
        }

        self.clamp_to_playfield();
        self.advance_power(dt);

        self.contact_cooldown = (self.contact_cooldown - dt).max(0.0);
        // Overshoot below zero carries into the next shot's cooldown
        if self.fire_cooldown > 0.0 {
            self.fire_cooldown -= dt;
        }
        self.hit_flash = (self.hit_flash - dt).max(0.0);
        self.wheel_angle = (self.wheel_angle + (self.vel.x + BASE_SCROLL_SPEED) * 0.08 * dt)
            % std::f32::consts::TAU;

        self.clamp_health();
    }

    /// Rest the player's feet on a surface at `top`
    pub fn land_on(&mut self, top: f32) {
        self.pos.y = top - self.size.y;
        self.vel.y = 0.0;
        self.jumping = false;
        self.grounded = true;
    }

    /// Kick the player upward (after smashing a box)
    pub fn bounce(&mut self, impulse: f32) {
        self.vel.y = impulse;
        self.jumping = true;
        self.grounded = false;
    }

    pub fn is_falling(&self) -> bool {
        self.vel.y > 0.0
    }

    fn clamp_to_playfield(&mut self) {
        self.pos.x = self.pos.x.clamp(0.0, (CANVAS_WIDTH - self.size.x).max(0.0));
        if self.pos.y + self.size.y > GROUND_Y {
            self.pos.y = GROUND_Y - self.size.y;
        }
    }

    // === Health ===

    pub fn clamp_health(&mut self) {
        if self.health.is_nan() {
            self.health = 0.0;
        }
        self.health = self.health.clamp(0.0, self.max_health);
    }

    /// Subtract health; returns the remaining health
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        self.health -= amount.max(0.0);
        self.hit_flash = 10.0;
        self.clamp_health();
        self.health
    }

    /// Contact damage respects a short immunity window.
    /// Returns false if the hit was ignored.
    pub fn take_contact_damage(&mut self, amount: f32) -> bool {
        if self.contact_cooldown > 0.0 {
            return false;
        }
        self.take_damage(amount);
        self.contact_cooldown = CONTACT_COOLDOWN_FRAMES;
        true
    }

    pub fn heal(&mut self, amount: f32) {
        self.health += amount.max(0.0);
        self.clamp_health();
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.health / self.max_health
        } else {
            0.0
        }
    }

    // === Weapons ===

    pub fn weapon(&self) -> &'static Weapon {
        &WEAPONS[self.weapon_index % WEAPONS.len()]
    }

    /// Cycle to the next weapon, returning its name
    pub fn switch_weapon(&mut self) -> &'static str {
        self.weapon_index = (self.weapon_index + 1) % WEAPONS.len();
        self.weapon().name
    }

    pub fn damage_multiplier(&self) -> f32 {
        if self.damage_boost {
            POWER_DAMAGE_MULTIPLIER
        } else {
            1.0
        }
    }

    /// Fire the active weapon if it has cooled down. The cooldown runs on
    /// the scaled frames passed to `update`.
    pub fn shoot(&mut self, damage_multiplier: f32) -> Option<Projectile> {
        let weapon = self.weapon();
        if self.fire_cooldown > 0.0 {
            return None;
        }
        self.fire_cooldown += weapon.fire_rate + 1.0;

        let muzzle = Vec2::new(
            self.pos.x + self.size.x,
            self.pos.y + self.size.y * 0.4 - weapon.size.y * 0.5,
        );
        let projectile = Projectile::new(
            muzzle,
            Vec2::new(weapon.speed, 0.0),
            weapon.size,
            weapon.damage * damage_multiplier,
            weapon.color,
            Owner::Player,
        );
        Some(match weapon.oscillation {
            Some((amplitude, frequency)) => projectile.with_oscillation(amplitude, frequency),
            None => projectile,
        })
    }

    // === Special ability ===

    pub fn add_special_charge(&mut self) {
        self.special_charges = (self.special_charges + 1).min(self.max_special_charges);
    }

    /// Drive the stampede ability for this frame.
    ///
    /// Activates by spending a charge, then fires a fan of projectiles into
    /// `out` every `SPECIAL_BURST_INTERVAL` frames. When a charge runs out
    /// another is spent automatically; the ability stops once none remain.
    /// `dt` is the scaled time since the previous call (ignored on activation).
    /// Returns true while the ability is producing an effect.
    pub fn special_ability(&mut self, dt: f32, out: &mut Vec<Projectile>) -> bool {
        if !self.special.active {
            if self.special_charges == 0 {
                return false;
            }
            self.special_charges -= 1;
            self.special = SpecialState {
                active: true,
                remaining: SPECIAL_DURATION_FRAMES,
                burst_cooldown: 0.0,
            };
            log::debug!("Stampede activated ({} charges left)", self.special_charges);
        } else {
            self.special.remaining -= dt;
            self.special.burst_cooldown -= dt;
            if self.special.remaining <= 0.0 {
                if self.special_charges == 0 {
                    self.special.active = false;
                    return false;
                }
                self.special_charges -= 1;
                self.special.remaining += SPECIAL_DURATION_FRAMES;
            }
        }

        if self.special.burst_cooldown <= 0.0 {
            // A long stall fires one volley, not a backlog
            self.special.burst_cooldown =
                (self.special.burst_cooldown + SPECIAL_BURST_INTERVAL).max(0.0);
            self.emit_fan(out);
        }
        true
    }

    fn emit_fan(&self, out: &mut Vec<Projectile>) {
        let origin = Vec2::new(self.pos.x + self.size.x, self.pos.y + self.size.y * 0.5);
        let damage = SPECIAL_PROJECTILE_DAMAGE * self.damage_multiplier();
        for degrees in SPECIAL_FAN_DEGREES {
            let vel = direction(degrees.to_radians()) * SPECIAL_PROJECTILE_SPEED;
            out.push(
                Projectile::new(
                    origin,
                    vel,
                    Vec2::new(8.0, 8.0),
                    damage,
                    SPECIAL_PROJECTILE_COLOR,
                    Owner::Player,
                )
                .with_bounces(1),
            );
        }
    }

    // === Mushroom power ===

    /// Start growing. No-op while already grown or animating.
    pub fn activate_mushroom_power(&mut self) -> bool {
        if self.power != PowerState::Normal {
            return false;
        }
        self.power = PowerState::Growing { progress: 0.0 };
        self.damage_boost = true;
        true
    }

    /// Start shrinking. Only a fully grown player can shrink.
    pub fn deactivate_power(&mut self) -> bool {
        if !matches!(self.power, PowerState::Powered { .. }) {
            return false;
        }
        self.power = PowerState::Shrinking { progress: 0.0 };
        self.damage_boost = false;
        true
    }

    pub fn is_powered_up(&self) -> bool {
        matches!(self.power, PowerState::Powered { .. })
    }

    fn advance_power(&mut self, dt: f32) {
        self.power = match self.power {
            PowerState::Normal => PowerState::Normal,
            PowerState::Growing { progress } => {
                let progress = progress + dt;
                if progress >= POWER_ANIM_FRAMES {
                    PowerState::Powered {
                        remaining: POWER_DURATION_FRAMES,
                    }
                } else {
                    PowerState::Growing { progress }
                }
            }
            PowerState::Powered { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.damage_boost = false;
                    PowerState::Shrinking { progress: 0.0 }
                } else {
                    PowerState::Powered { remaining }
                }
            }
            PowerState::Shrinking { progress } => {
                let progress = progress + dt;
                if progress >= POWER_ANIM_FRAMES {
                    PowerState::Normal
                } else {
                    PowerState::Shrinking { progress }
                }
            }
        };
        self.apply_scale();
    }

    /// Resize for the current power state, keeping the feet planted
    fn apply_scale(&mut self) {
        let (sw, sh) = self.power.scale();
        let new_size = Vec2::new(self.base_size.x * sw, self.base_size.y * sh);
        if new_size == self.size {
            return;
        }
        let bottom = self.pos.y + self.size.y;
        self.size = new_size;
        self.pos.y = bottom - self.size.y;
        // Never clip through the floor or off the top mid-growth
        if self.pos.y + self.size.y > GROUND_Y {
            self.pos.y = GROUND_Y - self.size.y;
        }
        self.pos.y = self.pos.y.max(0.0);
        self.pos.x = self.pos.x.clamp(0.0, (CANVAS_WIDTH - self.size.x).max(0.0));
    }
}

impl Bounded for Player {
    fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(player: &mut Player, frames: usize) {
        for _ in 0..frames {
            player.update(MoveInput::default(), 1.0);
        }
    }

    #[test]
    fn test_starts_on_ground() {
        let mut player = Player::new();
        settle(&mut player, 5);
        assert!((player.pos.y + player.size.y - GROUND_Y).abs() < 1e-3);
        assert!(!player.jumping);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let mut player = Player::new();
        let jump = MoveInput {
            jump: true,
            ..Default::default()
        };
        player.update(jump, 1.0);
        assert!(player.jumping);
        let vy = player.vel.y;
        assert!(vy < 0.0);

        // Holding jump mid-air doesn't re-apply the impulse
        player.update(jump, 1.0);
        assert!((player.vel.y - (vy + GRAVITY)).abs() < 1e-4);

        settle(&mut player, 120);
        assert!(!player.jumping);
    }

    #[test]
    fn test_no_jump_after_driving_off_a_ledge() {
        let mut player = Player::new();
        // Standing on something above the ground
        player.land_on(GROUND_Y - 100.0);
        assert!(player.grounded);

        // Nothing re-lands the player, so it falls
        player.update(MoveInput::default(), 1.0);
        assert!(!player.grounded);
        let jump = MoveInput {
            jump: true,
            ..Default::default()
        };
        player.update(jump, 1.0);
        assert!(player.vel.y > 0.0);
        assert!(!player.jumping);
    }

    #[test]
    fn test_horizontal_clamp() {
        let mut player = Player::new();
        let left = MoveInput {
            left: true,
            ..Default::default()
        };
        for _ in 0..100 {
            player.update(left, 1.0);
        }
        assert_eq!(player.pos.x, 0.0);
    }

    #[test]
    fn test_health_clamped() {
        let mut player = Player::new();
        player.take_damage(30.0);
        assert_eq!(player.health, 70.0);
        player.heal(500.0);
        assert_eq!(player.health, player.max_health);
        player.take_damage(1000.0);
        assert_eq!(player.health, 0.0);
        assert!(player.is_dead());

        player.health = f32::NAN;
        player.update(MoveInput::default(), 1.0);
        assert_eq!(player.health, 0.0);
    }

    #[test]
    fn test_contact_cooldown() {
        let mut player = Player::new();
        assert!(player.take_contact_damage(10.0));
        assert!(!player.take_contact_damage(10.0));
        assert_eq!(player.health, 90.0);
        settle(&mut player, CONTACT_COOLDOWN_FRAMES as usize + 1);
        assert!(player.take_contact_damage(10.0));
    }

    #[test]
    fn test_shoot_rate_limited() {
        let mut player = Player::new();
        let rate = player.weapon().fire_rate;
        assert!(player.shoot(1.0).is_some());
        assert!(player.shoot(1.0).is_none());
        settle(&mut player, rate as usize);
        assert!(player.shoot(1.0).is_none());
        settle(&mut player, 1);
        let p = player.shoot(2.0).expect("cooled down");
        assert_eq!(p.damage, WEAPONS[0].damage * 2.0);
        assert_eq!(p.owner, Owner::Player);
        assert!(p.vel.x > 0.0);
    }

    #[test]
    fn test_cannon_oscillates() {
        let mut player = Player::new();
        assert_eq!(player.switch_weapon(), "Laser");
        assert_eq!(player.switch_weapon(), "Cannon");
        let shell = player.shoot(1.0).expect("first shot");
        assert!(shell.oscillation.is_some());
        assert_eq!(player.switch_weapon(), "Blaster");
    }

    #[test]
    fn test_special_ability_consumes_charges() {
        let mut player = Player::new();
        let mut out = Vec::new();
        assert!(player.special_ability(1.0, &mut out));
        assert_eq!(player.special_charges, MAX_SPECIAL_CHARGES - 1);
        assert_eq!(out.len(), SPECIAL_FAN_DEGREES.len());

        // Not due for another volley yet
        assert!(player.special_ability(1.0, &mut out));
        assert_eq!(out.len(), SPECIAL_FAN_DEGREES.len());

        assert!(player.special_ability(SPECIAL_BURST_INTERVAL - 1.0, &mut out));
        assert_eq!(out.len(), SPECIAL_FAN_DEGREES.len() * 2);

        // Charge expiry extends with the next charge
        let left = player.special.remaining;
        assert!(player.special_ability(left, &mut out));
        assert_eq!(player.special_charges, MAX_SPECIAL_CHARGES - 2);
        assert!(player.special.remaining > 0.0);
    }

    #[test]
    fn test_special_ability_without_charges_is_noop() {
        let mut player = Player::new();
        player.special_charges = 0;
        let mut out = Vec::new();
        assert!(!player.special_ability(1.0, &mut out));
        assert!(out.is_empty());
        assert!(!player.special.active);
    }

    #[test]
    fn test_special_ability_expires() {
        let mut player = Player::new();
        player.special_charges = 1;
        let mut out = Vec::new();
        assert!(player.special_ability(1.0, &mut out));
        assert!(!player.special_ability(SPECIAL_DURATION_FRAMES, &mut out));
        assert!(!player.special.active);
    }

    #[test]
    fn test_special_volleys_follow_scaled_time() {
        let volleys = |dt: f32| {
            let mut player = Player::new();
            player.special_charges = 1;
            let mut out = Vec::new();
            player.special_ability(dt, &mut out);
            let calls = (SPECIAL_DURATION_FRAMES / dt) as usize;
            for _ in 0..calls {
                player.special_ability(dt, &mut out);
            }
            assert!(!player.special.active);
            out.len() / SPECIAL_FAN_DEGREES.len()
        };
        assert_eq!(volleys(1.0), volleys(2.0));
        assert_eq!(volleys(1.0), 15);
    }

    #[test]
    fn test_mushroom_grow_and_shrink() {
        let mut player = Player::new();
        settle(&mut player, 2);
        assert!(player.activate_mushroom_power());
        assert!(!player.activate_mushroom_power());
        assert_eq!(player.damage_multiplier(), POWER_DAMAGE_MULTIPLIER);

        settle(&mut player, 15);
        assert!(player.size.x > PLAYER_WIDTH && player.size.x < PLAYER_WIDTH * 2.0);
        assert!(player.pos.y + player.size.y <= GROUND_Y + 1e-3);

        settle(&mut player, 20);
        assert!(player.is_powered_up());
        assert_eq!(player.size, Vec2::new(PLAYER_WIDTH * 2.0, PLAYER_HEIGHT * 2.5));
        assert!((player.pos.y + player.size.y - GROUND_Y).abs() < 1e-3);

        assert!(player.deactivate_power());
        assert!(!player.deactivate_power());
        assert_eq!(player.damage_multiplier(), 1.0);
        settle(&mut player, 31);
        assert_eq!(player.power, PowerState::Normal);
        assert_eq!(player.size, player.base_size);
    }

    #[test]
    fn test_power_wears_off() {
        let mut player = Player::new();
        player.activate_mushroom_power();
        settle(&mut player, (POWER_ANIM_FRAMES + POWER_DURATION_FRAMES) as usize + 2);
        assert!(matches!(player.power, PowerState::Shrinking { .. }));
        assert!(!player.damage_boost);
    }
}
