//! Game state and core simulation types
//!
//! Everything the tick mutates lives in `GameState`. Collaborators (audio,
//! HUD, score storage) only see it through `GameEvent`s drained after each
//! tick and through read-only accessors.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::enemy::{Enemy, EnemyKind};
use super::level::{LevelPack, LevelScheduler};
use super::obstacle::{Obstacle, ObstacleKind};
use super::particles::ParticlePool;
use super::platform::PlatformSet;
use super::player::Player;
use super::powerup::{PowerUp, PowerUpKind};
use super::projectile::Projectile;
use crate::audio::SoundEffect;
use crate::consts::BASE_SCROLL_SPEED;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Playing,
    /// Updates frozen, drawing continues
    Paused,
    /// Player health reached zero
    GameOver,
    /// Final level finished
    MissionComplete,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::MissionComplete)
    }
}

/// Things that happened during a tick, for the audio/HUD layers
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Shot { weapon: &'static str },
    SpecialFired,
    WeaponSwitched { name: &'static str },
    Jumped,
    PlayerHit { damage: f32 },
    EnemyHit,
    EnemyDestroyed { kind: EnemyKind, points: u64 },
    BoxCracked,
    ObstacleDestroyed { kind: ObstacleKind, points: u64 },
    VehicleExploded { kind: ObstacleKind },
    PowerUpCollected { kind: PowerUpKind },
    PowerWoreOff,
    LevelAdvanced { index: usize, name: String },
    Paused,
    Resumed,
    GameOver { score: u64 },
    MissionComplete { score: u64 },
}

impl GameEvent {
    /// Sound cue for this event, if it has one
    pub fn sound(&self) -> Option<SoundEffect> {
        Some(match self {
            GameEvent::Shot { weapon } => match *weapon {
                "Laser" => SoundEffect::Laser,
                "Cannon" => SoundEffect::Cannon,
                _ => SoundEffect::Shoot,
            },
            GameEvent::SpecialFired => SoundEffect::Special,
            GameEvent::WeaponSwitched { .. } => SoundEffect::WeaponSwitch,
            GameEvent::Jumped => SoundEffect::Jump,
            GameEvent::PlayerHit { .. } => SoundEffect::PlayerHit,
            GameEvent::EnemyHit => SoundEffect::EnemyHit,
            GameEvent::EnemyDestroyed { .. } => SoundEffect::EnemyDestroyed,
            GameEvent::BoxCracked => SoundEffect::BoxCrack,
            GameEvent::ObstacleDestroyed { .. } => SoundEffect::BoxSmash,
            GameEvent::VehicleExploded { .. } => SoundEffect::Explosion,
            GameEvent::PowerUpCollected { kind } => match kind {
                PowerUpKind::Coin => SoundEffect::Coin,
                _ => SoundEffect::PowerUp,
            },
            GameEvent::PowerWoreOff => SoundEffect::PowerDown,
            GameEvent::LevelAdvanced { .. } => SoundEffect::LevelUp,
            GameEvent::GameOver { .. } => SoundEffect::GameOver,
            GameEvent::MissionComplete { .. } => SoundEffect::MissionComplete,
            GameEvent::Paused | GameEvent::Resumed => return None,
        })
    }
}

/// Monotonic entity id allocator
#[derive(Debug, Clone, Default)]
pub struct EntityIds {
    last: u32,
}

impl EntityIds {
    pub fn next(&mut self) -> u32 {
        self.last += 1;
        self.last
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Ticks simulated (not counting paused ticks)
    pub frame: u64,
    /// Scaled frames simulated
    pub elapsed: f32,
    pub phase: GamePhase,
    pub score: u64,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub obstacles: Vec<Obstacle>,
    pub projectiles: Vec<Projectile>,
    pub power_ups: Vec<PowerUp>,
    pub particles: ParticlePool,
    pub platforms: PlatformSet,
    pub scheduler: LevelScheduler,
    pub ids: EntityIds,
    /// Camera shake intensity (0-1), decays every tick
    pub screen_shake: f32,
    /// Events produced since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new run with the given seed and levels
    pub fn new(seed: u64, levels: LevelPack) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            frame: 0,
            elapsed: 0.0,
            phase: GamePhase::Playing,
            score: 0,
            player: Player::new(),
            enemies: Vec::new(),
            obstacles: Vec::new(),
            projectiles: Vec::new(),
            power_ups: Vec::new(),
            particles: ParticlePool::default(),
            platforms: PlatformSet::new(),
            scheduler: LevelScheduler::new(levels, BASE_SCROLL_SPEED),
            ids: EntityIds::default(),
            screen_shake: 0.0,
            events: Vec::new(),
        }
    }

    pub fn with_particle_cap(mut self, cap: usize) -> Self {
        self.particles.set_cap(cap);
        self
    }

    pub fn with_scroll_speed(mut self, speed: f32) -> Self {
        self.scheduler.set_scroll_speed(speed);
        self
    }

    /// Reinitialize every owned collection and restart from level 0.
    /// The RNG is reseeded so a restarted run replays identically.
    pub fn restart(&mut self) {
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.frame = 0;
        self.elapsed = 0.0;
        self.phase = GamePhase::Playing;
        self.score = 0;
        self.player = Player::new();
        self.enemies.clear();
        self.obstacles.clear();
        self.projectiles.clear();
        self.power_ups.clear();
        self.particles.clear();
        self.platforms = PlatformSet::new();
        self.scheduler.restart();
        self.ids = EntityIds::default();
        self.screen_shake = 0.0;
        self.events.clear();
        log::info!("Run restarted (seed {})", self.seed);
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn add_shake(&mut self, amount: f32) {
        self.screen_shake = (self.screen_shake + amount).min(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack() -> LevelPack {
        LevelPack::builtin().expect("builtin levels")
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids = EntityIds::default();
        let a = ids.next();
        let b = ids.next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut state = GameState::new(5, pack());
        state.score = 900;
        state.frame = 77;
        state.phase = GamePhase::GameOver;
        state.player.take_damage(60.0);
        state.enemies.push(Enemy::spawn(
            1,
            EnemyKind::Scout,
            glam::Vec2::ZERO,
            &mut state.rng.clone(),
        ));
        state.scheduler.load_level(2);

        state.restart();
        assert_eq!(state.score, 0);
        assert_eq!(state.frame, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.player.health, state.player.max_health);
        assert!(state.enemies.is_empty());
        assert_eq!(state.scheduler.level_index(), 0);
        assert_eq!(state.scheduler.scroll_position(), 0.0);
    }

    #[test]
    fn test_event_sounds() {
        assert_eq!(
            GameEvent::Shot { weapon: "Cannon" }.sound(),
            Some(SoundEffect::Cannon)
        );
        assert_eq!(GameEvent::Paused.sound(), None);
        assert_eq!(
            GameEvent::PowerUpCollected {
                kind: PowerUpKind::Coin
            }
            .sound(),
            Some(SoundEffect::Coin)
        );
    }
}
