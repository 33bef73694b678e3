//! Floating platforms that scroll with the level
//!
//! A fixed number of platforms is recycled: once one leaves the left edge it
//! jumps back in past the rightmost platform at the next scripted height.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Bounded, Rect};

pub const PLATFORM_COUNT: usize = 3;
pub const PLATFORM_SIZE: Vec2 = Vec2::new(120.0, 14.0);
/// Gap between consecutive platforms
pub const PLATFORM_SPACING: f32 = 300.0;
/// Heights (top edge) cycled through as platforms are recycled
pub const HEIGHT_SCRIPT: [f32; 5] = [260.0, 215.0, 180.0, 235.0, 200.0];
/// Allowed penetration when detecting a landing
const LANDING_TOLERANCE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Bounded for Platform {
    fn bounds(&self) -> Rect {
        Rect::from_pos_size(self.pos, self.size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSet {
    pub platforms: Vec<Platform>,
    script_cursor: usize,
}

impl Default for PlatformSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformSet {
    pub fn new() -> Self {
        let mut set = Self {
            platforms: Vec::with_capacity(PLATFORM_COUNT),
            script_cursor: 0,
        };
        for i in 0..PLATFORM_COUNT {
            let y = set.next_height();
            set.platforms.push(Platform {
                pos: Vec2::new(250.0 + i as f32 * (PLATFORM_SIZE.x + PLATFORM_SPACING), y),
                size: PLATFORM_SIZE,
            });
        }
        set
    }

    fn next_height(&mut self) -> f32 {
        let y = HEIGHT_SCRIPT[self.script_cursor % HEIGHT_SCRIPT.len()];
        self.script_cursor += 1;
        y
    }

    /// Scroll left and recycle platforms that left the screen
    pub fn update(&mut self, scroll_dx: f32) {
        for platform in &mut self.platforms {
            platform.pos.x -= scroll_dx;
        }
        for i in 0..self.platforms.len() {
            if self.platforms[i].pos.x + self.platforms[i].size.x < 0.0 {
                let rightmost = self
                    .platforms
                    .iter()
                    .map(|p| p.pos.x + p.size.x)
                    .fold(f32::MIN, f32::max);
                let y = self.next_height();
                let platform = &mut self.platforms[i];
                platform.pos.x = rightmost + PLATFORM_SPACING;
                platform.pos.y = y;
            }
        }
    }

    /// Top edge of the platform the falling box lands on, if any.
    ///
    /// `prev_bottom` is the bottom edge before this frame's movement; only
    /// boxes that were above a platform and crossed its top count.
    pub fn landing_surface(&self, prev_bottom: f32, rect: &Rect) -> Option<f32> {
        self.platforms
            .iter()
            .filter(|p| rect.x < p.pos.x + p.size.x && rect.right() > p.pos.x)
            .filter(|p| prev_bottom <= p.pos.y + LANDING_TOLERANCE && rect.bottom() >= p.pos.y)
            .map(|p| p.pos.y)
            .reduce(f32::min)
    }
}
