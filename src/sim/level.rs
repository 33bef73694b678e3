//! Level data and the scroll-driven spawn scheduler
//!
//! A level is an ordered list of elements, each triggered by a scroll
//! position. The scheduler advances the scroll position every frame and
//! spawns each element exactly once per level load, as soon as its trigger
//! enters the window just past the right edge of the screen.

use std::collections::HashSet;

use glam::Vec2;
use rand::Rng;
use serde::Deserialize;

use super::enemy::{Enemy, EnemyKind};
use super::geometry::{Bounded, Rect, overlaps};
use super::obstacle::{Obstacle, ObstacleKind};
use super::powerup::PowerUpKind;
use super::state::EntityIds;
use crate::consts::*;

/// Level pack format version this build understands
pub const LEVEL_PACK_VERSION: u32 = 1;
/// Distance an overlapping obstacle is pushed right per attempt
pub const PLACEMENT_NUDGE: f32 = 60.0;
/// Attempts before an overlapping obstacle is placed anyway
pub const MAX_PLACEMENT_ATTEMPTS: usize = 10;
/// Vertical band for enemies without an explicit height
const ENEMY_SPAWN_Y_MIN: f32 = 40.0;
const ENEMY_SPAWN_Y_MAX: f32 = GROUND_Y - 150.0;

const BUILTIN_LEVELS: &str = include_str!("../../assets/levels.json");

#[derive(Debug, thiserror::Error)]
pub enum LevelError {
    #[error("Level data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unsupported level pack version {0}")]
    UnsupportedVersion(u32),
    #[error("Level pack contains no levels")]
    Empty,
    #[error("Level '{0}' must have a positive length")]
    InvalidLength(String),
    #[error("Level '{level}' uses element id {id} more than once")]
    DuplicateElementId { level: String, id: u32 },
    #[error("Unknown {element_type} subtype '{subtype}'")]
    UnknownElement {
        element_type: String,
        subtype: String,
    },
}

/// What a level element spawns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Obstacle(ObstacleKind),
    Enemy(EnemyKind),
}

#[derive(Debug, Clone, Deserialize)]
struct RawElement {
    id: u32,
    #[serde(rename = "type")]
    element_type: String,
    subtype: String,
    position: f32,
    #[serde(default)]
    y: Option<f32>,
    #[serde(default)]
    contains: Option<String>,
}

/// A scheduled element of a level
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawElement")]
pub struct LevelElement {
    pub id: u32,
    pub kind: ElementKind,
    /// Scroll position that triggers the spawn
    pub position: f32,
    /// Explicit top edge; defaults to the ground (obstacles) or a random height (enemies)
    pub y: Option<f32>,
    /// Pickup hidden in a box
    pub contains: Option<PowerUpKind>,
}

impl TryFrom<RawElement> for LevelElement {
    type Error = LevelError;

    fn try_from(raw: RawElement) -> Result<Self, Self::Error> {
        let unknown = |subtype: &str| LevelError::UnknownElement {
            element_type: raw.element_type.clone(),
            subtype: subtype.to_string(),
        };
        let kind = match raw.element_type.as_str() {
            "obstacle" => ObstacleKind::from_name(&raw.subtype)
                .map(ElementKind::Obstacle)
                .ok_or_else(|| unknown(&raw.subtype))?,
            "enemy" => EnemyKind::from_name(&raw.subtype)
                .map(ElementKind::Enemy)
                .ok_or_else(|| unknown(&raw.subtype))?,
            _ => return Err(unknown(&raw.subtype)),
        };
        let contains = match raw.contains.as_deref() {
            Some(name) => Some(PowerUpKind::from_name(name).ok_or_else(|| {
                LevelError::UnknownElement {
                    element_type: "powerup".to_string(),
                    subtype: name.to_string(),
                }
            })?),
            None => None,
        };
        Ok(Self {
            id: raw.id,
            kind,
            position: raw.position,
            y: raw.y,
            contains,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Level {
    pub name: String,
    /// Scroll distance to finish the level
    pub length: f32,
    pub elements: Vec<LevelElement>,
}

/// The versioned set of levels, read-only input to the scheduler.
/// Only constructed through validation, so it always holds at least one level.
#[derive(Debug, Clone, Deserialize)]
pub struct LevelPack {
    version: u32,
    levels: Vec<Level>,
}

impl LevelPack {
    /// Parse and validate a level pack. Elements are sorted by trigger position.
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let pack: LevelPack = serde_json::from_str(json)?;
        pack.validated()
    }

    /// Build a pack of the current version from levels assembled in code
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelError> {
        Self {
            version: LEVEL_PACK_VERSION,
            levels,
        }
        .validated()
    }

    /// The levels shipped with the game
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_json(BUILTIN_LEVELS)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    fn validated(mut self) -> Result<Self, LevelError> {
        self.validate()?;
        for level in &mut self.levels {
            level
                .elements
                .sort_by(|a, b| a.position.total_cmp(&b.position).then(a.id.cmp(&b.id)));
        }
        Ok(self)
    }

    fn validate(&self) -> Result<(), LevelError> {
        if self.version != LEVEL_PACK_VERSION {
            return Err(LevelError::UnsupportedVersion(self.version));
        }
        if self.levels.is_empty() {
            return Err(LevelError::Empty);
        }
        for level in &self.levels {
            if !(level.length > 0.0) {
                return Err(LevelError::InvalidLength(level.name.clone()));
            }
            let mut seen = HashSet::new();
            for element in &level.elements {
                if !seen.insert(element.id) {
                    return Err(LevelError::DuplicateElementId {
                        level: level.name.clone(),
                        id: element.id,
                    });
                }
            }
        }
        Ok(())
    }
}

/// An entity produced by the scheduler
#[derive(Debug, Clone)]
pub enum Spawn {
    Obstacle(Obstacle),
    Enemy(Enemy),
}

/// Level transitions reported by `LevelScheduler::update`
#[derive(Debug, Clone, PartialEq)]
pub enum LevelEvent {
    Advanced { index: usize, name: String },
    MissionComplete,
}

#[derive(Debug, Clone)]
pub struct LevelScheduler {
    pack: LevelPack,
    level_index: usize,
    scroll_position: f32,
    scroll_speed: f32,
    game_speed: f32,
    /// Frames of scrolling since the run started
    elapsed: f32,
    /// Element ids spawned since the current level was loaded
    spawned: HashSet<u32>,
    complete: bool,
}

impl LevelScheduler {
    pub fn new(pack: LevelPack, scroll_speed: f32) -> Self {
        let mut scheduler = Self {
            pack,
            level_index: 0,
            scroll_position: 0.0,
            scroll_speed,
            game_speed: 1.0,
            elapsed: 0.0,
            spawned: HashSet::new(),
            complete: false,
        };
        scheduler.load_level(0);
        scheduler
    }

    /// Load (or reload) a level, resetting the scroll position and spawn tracking
    pub fn load_level(&mut self, index: usize) {
        self.level_index = index.min(self.pack.levels.len().saturating_sub(1));
        self.scroll_position = 0.0;
        self.spawned.clear();
        self.complete = false;
        log::info!(
            "Loaded level {} '{}'",
            self.level_index + 1,
            self.current_level().name
        );
    }

    /// Back to level 0 with the game speed ramp reset
    pub fn restart(&mut self) {
        self.elapsed = 0.0;
        self.game_speed = 1.0;
        self.load_level(0);
    }

    pub fn current_level(&self) -> &Level {
        &self.pack.levels[self.level_index]
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_count(&self) -> usize {
        self.pack.levels.len()
    }

    pub fn level_name(&self) -> &str {
        &self.current_level().name
    }

    pub fn scroll_position(&self) -> f32 {
        self.scroll_position
    }

    pub fn scroll_speed(&self) -> f32 {
        self.scroll_speed
    }

    pub fn set_scroll_speed(&mut self, speed: f32) {
        self.scroll_speed = speed.max(0.0);
    }

    pub fn game_speed(&self) -> f32 {
        self.game_speed
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Distance the world scrolls over `dt` frames at the current speed
    pub fn scroll_step(&self, dt: f32) -> f32 {
        if self.complete {
            0.0
        } else {
            self.scroll_speed * self.game_speed * dt
        }
    }

    /// Fraction of the current level covered, in 0..=1
    pub fn progress(&self) -> f32 {
        (self.scroll_position / self.current_level().length).clamp(0.0, 1.0)
    }

    pub fn has_spawned(&self, element_id: u32) -> bool {
        self.spawned.contains(&element_id)
    }

    /// Advance the scroll position. Returns a level transition if one happened.
    pub fn update(&mut self, dt: f32) -> Option<LevelEvent> {
        if self.complete {
            return None;
        }
        self.elapsed += dt;
        self.game_speed = (1.0 + self.elapsed * GAME_SPEED_RAMP).min(MAX_GAME_SPEED);
        self.scroll_position += self.scroll_speed * self.game_speed * dt;

        if self.progress() < 1.0 {
            return None;
        }
        let next = self.level_index + 1;
        if next < self.pack.levels.len() {
            self.load_level(next);
            Some(LevelEvent::Advanced {
                index: next,
                name: self.level_name().to_string(),
            })
        } else {
            self.scroll_position = self.current_level().length;
            self.complete = true;
            log::info!("Mission complete");
            Some(LevelEvent::MissionComplete)
        }
    }

    /// Spawn every not-yet-spawned element whose trigger lies in
    /// `[scroll, scroll + viewport + lookahead)`.
    ///
    /// New obstacles are nudged right until they no longer overlap the
    /// obstacles already on the field.
    pub fn update_level_elements(
        &mut self,
        placed: &[Obstacle],
        ids: &mut EntityIds,
        rng: &mut impl Rng,
    ) -> Vec<Spawn> {
        let window_start = self.scroll_position;
        let window_end = self.scroll_position + CANVAS_WIDTH + SPAWN_LOOKAHEAD;

        let due: Vec<LevelElement> = self
            .current_level()
            .elements
            .iter()
            .filter(|e| e.position >= window_start && e.position < window_end)
            .filter(|e| !self.spawned.contains(&e.id))
            .cloned()
            .collect();

        let mut occupied: Vec<Rect> = placed.iter().map(|o| o.bounds()).collect();
        let mut spawns = Vec::with_capacity(due.len());
        for element in due {
            self.spawned.insert(element.id);
            let x = element.position - self.scroll_position;
            match element.kind {
                ElementKind::Obstacle(kind) => {
                    let mut obstacle = match element.y {
                        Some(y) => Obstacle::new(ids.next(), kind, Vec2::new(x, y)),
                        None => Obstacle::on_ground(ids.next(), kind, x),
                    };
                    if let Some(contents) = element.contains {
                        obstacle = obstacle.with_contents(contents);
                    }
                    if !place_without_overlap(&mut obstacle, &occupied) {
                        log::warn!(
                            "Element {} ({:?}) still overlaps after {} nudges, placing anyway",
                            element.id,
                            kind,
                            MAX_PLACEMENT_ATTEMPTS
                        );
                    }
                    occupied.push(obstacle.bounds());
                    spawns.push(Spawn::Obstacle(obstacle));
                }
                ElementKind::Enemy(kind) => {
                    let y = element
                        .y
                        .unwrap_or_else(|| rng.random_range(ENEMY_SPAWN_Y_MIN..ENEMY_SPAWN_Y_MAX));
                    spawns.push(Spawn::Enemy(Enemy::spawn(
                        ids.next(),
                        kind,
                        Vec2::new(x, y),
                        rng,
                    )));
                }
            }
        }
        spawns
    }
}

/// Push `obstacle` right in fixed steps until it overlaps nothing in
/// `occupied`. Returns false if the attempt budget ran out.
pub fn place_without_overlap(obstacle: &mut Obstacle, occupied: &[Rect]) -> bool {
    for _ in 0..MAX_PLACEMENT_ATTEMPTS {
        let bounds = obstacle.bounds();
        if !occupied.iter().any(|r| overlaps(&bounds, r)) {
            return true;
        }
        obstacle.pos.x += PLACEMENT_NUDGE;
    }
    let bounds = obstacle.bounds();
    !occupied.iter().any(|r| overlaps(&bounds, r))
}
