//! Demo-mode driver
//!
//! Fills in a `TickInput` from the current state so the game can play
//! itself (attract screen, headless runs).

use super::geometry::Bounded;
use super::projectile::Owner;
use super::state::GameState;
use super::tick::TickInput;
use crate::consts::CANVAS_WIDTH;

/// Where the autopilot parks when there's nothing to chase
const CRUISE_X: f32 = 160.0;
const STEER_DEADZONE: f32 = 6.0;
/// Distance ahead of the bumper at which an obstacle triggers a jump
const JUMP_LOOKAHEAD: f32 = 40.0;
const DODGE_RADIUS: f32 = 70.0;
/// Pickups further right than this aren't worth chasing
const CHASE_LIMIT: f32 = CANVAS_WIDTH * 0.6;
const WEAPON_SWITCH_INTERVAL: u64 = 30;
const CANNON_INDEX: usize = 2;
const SPECIAL_CROWD: usize = 3;

/// Overwrite `input` with the autopilot's choices for this frame
pub fn drive(state: &GameState, input: &mut TickInput) {
    let player = &state.player;
    let front = player.pos.x + player.size.x;
    let center = player.center();

    input.shoot = true;

    let obstacle_ahead = state
        .obstacles
        .iter()
        .filter(|o| o.is_solid())
        .any(|o| (0.0..JUMP_LOOKAHEAD).contains(&(o.pos.x - front)));
    let incoming = state
        .projectiles
        .iter()
        .filter(|p| p.owner == Owner::Enemy)
        .any(|p| p.center().distance(center) < DODGE_RADIUS);
    input.jump = obstacle_ahead || incoming;

    let target_x = state
        .power_ups
        .iter()
        .filter(|p| p.pos.x + p.size.x > player.pos.x && p.pos.x < CHASE_LIMIT)
        .map(|p| p.center().x)
        .next()
        .unwrap_or(CRUISE_X);
    let dx = target_x - center.x;
    input.right = dx > STEER_DEADZONE;
    input.left = dx < -STEER_DEADZONE;

    // Cannon for vehicles on screen, blaster otherwise
    let vehicle_on_screen = state
        .obstacles
        .iter()
        .any(|o| o.kind.is_vehicle() && o.is_solid() && o.pos.x < CANVAS_WIDTH);
    let wanted = if vehicle_on_screen { CANNON_INDEX } else { 0 };
    input.switch_weapon =
        player.weapon_index != wanted && state.frame % WEAPON_SWITCH_INTERVAL == 0;

    input.special = !player.special.active
        && player.special_charges > 0
        && state.enemies.len() >= SPECIAL_CROWD;
}
