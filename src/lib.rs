//! Road Rampage - a side-scrolling vehicle brawler
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, level scheduling)
//! - `game`: Frame driver (time scale, pause/restart, side effects)
//! - `renderer`: Backend-neutral draw pass
//! - `audio`, `hud`, `highscores`: Collaborator contracts
//! - `settings`: User configuration

pub mod audio;
pub mod game;
pub mod highscores;
pub mod hud;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use game::Game;
pub use highscores::{Leaderboard, ScoreEntry, ScoreError, ScoreService};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
///
/// Time is measured in frames at 60 Hz. A time scale of 1.0 advances the
/// simulation by exactly one frame; velocities are pixels per frame.
pub mod consts {
    /// Nominal frame duration in milliseconds (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Elapsed time is capped so a backgrounded tab doesn't cause a huge jump
    pub const MAX_FRAME_ELAPSED_MS: f64 = 50.0;

    /// Playfield dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 400.0;
    /// Top edge of the ground strip
    pub const GROUND_Y: f32 = 350.0;

    /// Player physics
    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 30.0;
    pub const PLAYER_START_X: f32 = 100.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const JUMP_IMPULSE: f32 = -13.0;
    pub const GRAVITY: f32 = 0.6;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const MAX_SPECIAL_CHARGES: u32 = 3;
    /// Bounce impulse after smashing a box from above
    pub const BOX_BOUNCE_IMPULSE: f32 = -8.0;

    /// Level scrolling
    pub const BASE_SCROLL_SPEED: f32 = 3.0;
    pub const SPAWN_LOOKAHEAD: f32 = 200.0;
    pub const GAME_SPEED_RAMP: f32 = 0.0001;
    pub const MAX_GAME_SPEED: f32 = 2.0;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Unit vector for an angle in radians
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
