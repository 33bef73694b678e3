//! HUD values pushed to the host UI
//!
//! The game only writes to the UI; it never reads presentation state back.
//! Values are sanitised here, at display time, so a corrupt health value
//! can never reach the screen.

use crate::sim::{GamePhase, GameState};

/// Host-side UI. Only changed values are pushed.
pub trait UiSink {
    fn set_score(&mut self, score: u64);
    /// Health as a percentage in 0..=100
    fn set_health(&mut self, percent: f32);
    fn set_weapon(&mut self, name: &str);
    fn set_special_charges(&mut self, charges: u32);
    fn set_level_name(&mut self, name: &str);
    fn set_paused(&mut self, _paused: bool) {}
    fn show_game_over(&mut self, _score: u64) {}
    fn show_mission_complete(&mut self, _score: u64) {}
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullUi;

impl UiSink for NullUi {
    fn set_score(&mut self, _score: u64) {}
    fn set_health(&mut self, _percent: f32) {}
    fn set_weapon(&mut self, _name: &str) {}
    fn set_special_charges(&mut self, _charges: u32) {}
    fn set_level_name(&mut self, _name: &str) {}
}

/// Logs HUD changes (headless runs)
#[derive(Debug, Default, Clone, Copy)]
pub struct LogUi;

impl UiSink for LogUi {
    fn set_score(&mut self, score: u64) {
        log::debug!("HUD score {score}");
    }

    fn set_health(&mut self, percent: f32) {
        log::debug!("HUD health {percent:.0}%");
    }

    fn set_weapon(&mut self, name: &str) {
        log::debug!("HUD weapon {name}");
    }

    fn set_special_charges(&mut self, charges: u32) {
        log::debug!("HUD charges {charges}");
    }

    fn set_level_name(&mut self, name: &str) {
        log::info!("Now entering {name}");
    }

    fn set_paused(&mut self, paused: bool) {
        log::info!("{}", if paused { "Paused" } else { "Resumed" });
    }

    fn show_game_over(&mut self, score: u64) {
        log::info!("GAME OVER - final score {score}");
    }

    fn show_mission_complete(&mut self, score: u64) {
        log::info!("MISSION COMPLETE - final score {score}");
    }
}

/// Health as a whole percentage. NaN and infinities read as 0.
pub fn health_percent(health: f32, max_health: f32) -> f32 {
    if !health.is_finite() || !max_health.is_finite() || max_health <= 0.0 {
        return 0.0;
    }
    (health / max_health * 100.0).clamp(0.0, 100.0).round()
}

/// Everything the HUD shows, captured after a tick
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub score: u64,
    pub health_percent: f32,
    pub weapon: &'static str,
    pub special_charges: u32,
    pub level_name: String,
    pub paused: bool,
}

impl HudSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            score: state.score,
            health_percent: health_percent(state.player.health, state.player.max_health),
            weapon: state.player.weapon().name,
            special_charges: state.player.special_charges,
            level_name: state.scheduler.level_name().to_string(),
            paused: state.phase == GamePhase::Paused,
        }
    }
}

/// Pushes snapshot differences to a `UiSink`
#[derive(Debug, Default)]
pub struct HudPublisher {
    last: Option<HudSnapshot>,
}

impl HudPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget what was shown so the next publish sends every value
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn publish(&mut self, snapshot: HudSnapshot, ui: &mut dyn UiSink) {
        let last = self.last.as_ref();
        if last.is_none_or(|l| l.score != snapshot.score) {
            ui.set_score(snapshot.score);
        }
        if last.is_none_or(|l| l.health_percent != snapshot.health_percent) {
            ui.set_health(snapshot.health_percent);
        }
        if last.is_none_or(|l| l.weapon != snapshot.weapon) {
            ui.set_weapon(snapshot.weapon);
        }
        if last.is_none_or(|l| l.special_charges != snapshot.special_charges) {
            ui.set_special_charges(snapshot.special_charges);
        }
        if last.is_none_or(|l| l.level_name != snapshot.level_name) {
            ui.set_level_name(&snapshot.level_name);
        }
        if last.is_some_and(|l| l.paused != snapshot.paused) {
            ui.set_paused(snapshot.paused);
        }
        self.last = Some(snapshot);
    }
}
