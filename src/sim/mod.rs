//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time advances only through the `dt` passed to `tick`
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or storage dependencies

pub mod autopilot;
pub mod enemy;
pub mod geometry;
pub mod level;
pub mod obstacle;
pub mod particles;
pub mod platform;
pub mod player;
pub mod powerup;
pub mod projectile;
pub mod state;
pub mod tick;

pub use enemy::{Enemy, EnemyKind};
pub use geometry::{Bounded, Rect, overlaps};
pub use level::{LevelError, LevelPack, LevelScheduler};
pub use obstacle::{DamageOutcome, Obstacle, ObstacleKind, ObstacleState};
pub use particles::ParticlePool;
pub use player::{Player, PowerState, WEAPONS};
pub use powerup::{PowerUp, PowerUpKind};
pub use projectile::{Owner, Projectile};
pub use state::{GameEvent, GamePhase, GameState};
pub use tick::{TickInput, tick};
