//! Draw pass
//!
//! Converts a `GameState` into a backend-neutral display list of filled
//! rectangles, circles and text. The host rasterises it however it likes.
//! The pass only reads state, so it runs every frame, paused or not.

pub mod shapes;

use glam::Vec2;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, GROUND_Y};
use crate::direction;
use crate::sim::{GamePhase, GameState, Rect};

/// Maximum camera offset (px) at full shake
const SHAKE_PIXELS: f32 = 8.0;

/// One primitive, in playfield pixels
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        rect: Rect,
        color: [f32; 4],
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: [f32; 4],
    },
    /// Outline circle (blast fronts)
    Ring {
        center: Vec2,
        radius: f32,
        width: f32,
        color: [f32; 4],
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        color: [f32; 4],
    },
}

/// A frame's worth of draw commands, back to front
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    /// Camera shake offset applied to the world layer
    pub offset: Vec2,
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn rect(&mut self, rect: Rect, color: [f32; 4]) {
        if !rect.is_empty() && color[3] > 0.0 {
            self.commands.push(DrawCommand::Rect { rect, color });
        }
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        if radius > 0.0 && color[3] > 0.0 {
            self.commands.push(DrawCommand::Circle {
                center,
                radius,
                color,
            });
        }
    }

    pub fn ring(&mut self, center: Vec2, radius: f32, width: f32, color: [f32; 4]) {
        if radius > 0.0 && color[3] > 0.0 {
            self.commands.push(DrawCommand::Ring {
                center,
                radius,
                width,
                color,
            });
        }
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, size: f32, color: [f32; 4]) {
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.into(),
            size,
            color,
        });
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Colors for game elements
pub mod colors {
    pub const SKY: [f32; 4] = [0.08, 0.09, 0.16, 1.0];
    pub const GROUND: [f32; 4] = [0.18, 0.16, 0.14, 1.0];
    pub const LANE_MARK: [f32; 4] = [0.9, 0.8, 0.3, 1.0];
    pub const PLATFORM: [f32; 4] = [0.45, 0.45, 0.5, 1.0];
    pub const PLAYER: [f32; 4] = [0.2, 0.8, 0.4, 1.0];
    pub const WHEEL: [f32; 4] = [0.08, 0.08, 0.08, 1.0];
    pub const HIT_FLASH: [f32; 4] = [1.0, 0.25, 0.25, 1.0];
    pub const OVERLAY: [f32; 4] = [0.0, 0.0, 0.0, 0.55];
    pub const TEXT: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
}

/// Expand a 0xRRGGBB color with the given alpha
pub fn rgba(hex: u32, alpha: f32) -> [f32; 4] {
    [
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
        alpha.clamp(0.0, 1.0),
    ]
}

/// Build the display list for the current state
pub fn build_frame(state: &GameState) -> DrawList {
    let mut list = DrawList {
        offset: direction(state.frame as f32 * 2.3) * state.screen_shake * SHAKE_PIXELS,
        commands: Vec::with_capacity(64 + state.particles.len()),
    };

    draw_background(&mut list, state);

    for platform in &state.platforms.platforms {
        list.rect(Rect::from_pos_size(platform.pos, platform.size), colors::PLATFORM);
    }
    for obstacle in &state.obstacles {
        shapes::obstacle(&mut list, obstacle);
    }
    for power_up in &state.power_ups {
        shapes::power_up(&mut list, power_up);
    }
    for enemy in &state.enemies {
        shapes::enemy(&mut list, enemy);
    }
    shapes::player(&mut list, &state.player);
    for projectile in &state.projectiles {
        list.rect(
            Rect::from_pos_size(projectile.pos, projectile.size),
            rgba(projectile.color, 1.0),
        );
    }
    for particle in state.particles.iter() {
        list.circle(particle.pos, particle.size.max(0.0), rgba(particle.color, 0.9));
    }

    draw_overlay(&mut list, state);
    list
}

fn draw_background(list: &mut DrawList, state: &GameState) {
    list.rect(Rect::new(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT), colors::SKY);
    list.rect(
        Rect::new(0.0, GROUND_Y, CANVAS_WIDTH, CANVAS_HEIGHT - GROUND_Y),
        colors::GROUND,
    );

    // Lane markings scroll with the level
    const DASH: f32 = 40.0;
    const GAP: f32 = 40.0;
    let phase = state.scheduler.scroll_position() % (DASH + GAP);
    let mut x = -phase;
    while x < CANVAS_WIDTH {
        list.rect(Rect::new(x, GROUND_Y + 22.0, DASH, 4.0), colors::LANE_MARK);
        x += DASH + GAP;
    }
}

fn draw_overlay(list: &mut DrawList, state: &GameState) {
    let banner = match state.phase {
        GamePhase::Playing => return,
        GamePhase::Paused => "PAUSED",
        GamePhase::GameOver => "GAME OVER",
        GamePhase::MissionComplete => "MISSION COMPLETE",
    };
    list.rect(Rect::new(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT), colors::OVERLAY);
    list.text(
        Vec2::new(CANVAS_WIDTH * 0.5, CANVAS_HEIGHT * 0.45),
        banner,
        36.0,
        colors::TEXT,
    );
    if state.phase.is_terminal() {
        list.text(
            Vec2::new(CANVAS_WIDTH * 0.5, CANVAS_HEIGHT * 0.58),
            format!("Score {}", state.score),
            20.0,
            colors::TEXT,
        );
    }
}
