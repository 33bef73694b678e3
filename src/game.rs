//! Frame driver
//!
//! Owns the simulation plus the injected collaborators. Each host frame it
//! converts wall-clock time into a time scale, runs one tick, forwards the
//! tick's events to audio and UI, and returns the frame's display list.

use crate::audio::{AudioManager, AudioSink};
use crate::consts::{FRAME_MS, MAX_FRAME_ELAPSED_MS};
use crate::highscores::{ScoreError, ScoreService};
use crate::hud::{HudPublisher, HudSnapshot, UiSink};
use crate::renderer::{DrawList, build_frame};
use crate::settings::Settings;
use crate::sim::level::LevelPack;
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

/// Converts host timestamps into a time scale (1.0 = one 60 Hz frame)
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the previous timestamp (after a restart or long pause)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    /// Time scale for the frame at `now_ms`. Elapsed time is capped so a
    /// stalled host never produces a huge jump; the first frame is nominal.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let elapsed = match self.last_ms {
            Some(last) if (now_ms - last).is_finite() => {
                (now_ms - last).clamp(0.0, MAX_FRAME_ELAPSED_MS)
            }
            _ => FRAME_MS,
        };
        if now_ms.is_finite() {
            self.last_ms = Some(now_ms);
        }
        (elapsed / FRAME_MS) as f32
    }
}

/// Game instance holding all state
pub struct Game {
    state: GameState,
    settings: Settings,
    audio: AudioManager,
    ui: Box<dyn UiSink>,
    hud: HudPublisher,
    clock: FrameClock,
}

impl Game {
    pub fn new(
        settings: Settings,
        levels: LevelPack,
        seed: u64,
        audio: Box<dyn AudioSink>,
        ui: Box<dyn UiSink>,
    ) -> Self {
        let state = GameState::new(seed, levels)
            .with_particle_cap(settings.max_particles())
            .with_scroll_speed(settings.scroll_speed());

        let mut audio = AudioManager::new(audio);
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);

        log::info!(
            "New game: seed {seed}, {} levels, quality {}",
            state.scheduler.level_count(),
            settings.quality.as_str()
        );
        Self {
            state,
            settings,
            audio,
            ui,
            hud: HudPublisher::new(),
            clock: FrameClock::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for hosts and tests (debug tools, scripted setups)
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn is_over(&self) -> bool {
        self.state.phase.is_terminal()
    }

    /// Run one host frame at timestamp `now_ms`
    pub fn frame(&mut self, now_ms: f64, input: &TickInput) -> DrawList {
        let dt = self.clock.advance(now_ms);
        self.step(input, dt)
    }

    /// Run one tick with an explicit time scale, then side effects and draw
    pub fn step(&mut self, input: &TickInput, dt: f32) -> DrawList {
        if input.restart {
            self.clock.reset();
            self.hud.invalidate();
        }
        tick(&mut self.state, input, dt);
        self.dispatch_events();
        self.hud
            .publish(HudSnapshot::capture(&self.state), self.ui.as_mut());
        build_frame(&self.state)
    }

    /// Start over from level 0
    pub fn restart(&mut self) {
        self.state.restart();
        self.clock.reset();
        self.hud.invalidate();
    }

    /// Report the finished run. Only allowed once the run is over.
    pub fn submit_score(
        &self,
        name: &str,
        service: &mut dyn ScoreService,
    ) -> Result<(), ScoreError> {
        if !self.is_over() {
            return Err(ScoreError::Rejected("run still in progress".into()));
        }
        service
            .submit_score(name, self.state.score)
            .inspect_err(|err| log::warn!("Score submission failed: {err}"))
    }

    fn dispatch_events(&mut self) {
        for event in self.state.drain_events() {
            if let Some(effect) = event.sound() {
                self.audio.play(effect);
            }
            match event {
                GameEvent::GameOver { score } => self.ui.show_game_over(score),
                GameEvent::MissionComplete { score } => self.ui.show_mission_complete(score),
                _ => {}
            }
        }
    }
}
