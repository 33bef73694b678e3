//! Sound effect catalog and mixing
//!
//! The simulation only names sound effects. Playback goes through an
//! `AudioSink` supplied by the host; a sink that fails never affects the
//! game, the error is logged and dropped.

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Blaster shot
    Shoot,
    Laser,
    Cannon,
    /// Stampede activated
    Special,
    WeaponSwitch,
    Jump,
    PlayerHit,
    EnemyHit,
    EnemyDestroyed,
    BoxCrack,
    BoxSmash,
    /// Vehicle detonated
    Explosion,
    Coin,
    PowerUp,
    /// Mushroom power wore off
    PowerDown,
    LevelUp,
    GameOver,
    MissionComplete,
}

impl SoundEffect {
    /// Asset key the host resolves to a sound
    pub fn key(&self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot",
            SoundEffect::Laser => "laser",
            SoundEffect::Cannon => "cannon",
            SoundEffect::Special => "special",
            SoundEffect::WeaponSwitch => "weapon_switch",
            SoundEffect::Jump => "jump",
            SoundEffect::PlayerHit => "player_hit",
            SoundEffect::EnemyHit => "enemy_hit",
            SoundEffect::EnemyDestroyed => "enemy_destroyed",
            SoundEffect::BoxCrack => "box_crack",
            SoundEffect::BoxSmash => "box_smash",
            SoundEffect::Explosion => "explosion",
            SoundEffect::Coin => "coin",
            SoundEffect::PowerUp => "power_up",
            SoundEffect::PowerDown => "power_down",
            SoundEffect::LevelUp => "level_up",
            SoundEffect::GameOver => "game_over",
            SoundEffect::MissionComplete => "mission_complete",
        }
    }

    /// Per-effect loudness before the user's volume settings
    pub fn base_volume(&self) -> f32 {
        match self {
            SoundEffect::Shoot | SoundEffect::Laser | SoundEffect::EnemyHit => 0.4,
            SoundEffect::WeaponSwitch | SoundEffect::Jump | SoundEffect::BoxCrack => 0.5,
            SoundEffect::Explosion | SoundEffect::GameOver | SoundEffect::MissionComplete => 1.0,
            _ => 0.7,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no sound registered for '{0}'")]
    UnknownSound(String),
    #[error("audio backend failure: {0}")]
    Backend(String),
}

/// Host-side playback. Fire-and-forget: the game never waits on it.
pub trait AudioSink {
    fn play_sound(&mut self, key: &str, volume: f32) -> Result<(), AudioError>;
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play_sound(&mut self, _key: &str, _volume: f32) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Writes each cue to the log (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAudio;

impl AudioSink for LogAudio {
    fn play_sound(&mut self, key: &str, volume: f32) -> Result<(), AudioError> {
        log::trace!("sound {key} @ {volume:.2}");
        Ok(())
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new(Box::new(NullAudio))
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect. Sink failures are logged, never propagated.
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume() * effect.base_volume();
        if vol <= 0.0 {
            return;
        }
        if let Err(err) = self.sink.play_sound(effect.key(), vol) {
            log::warn!("Failed to play {}: {err}", effect.key());
        }
    }
}
