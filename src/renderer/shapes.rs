//! Entity shapes for the draw pass

use glam::Vec2;

use super::{DrawList, colors, rgba};
use crate::direction;
use crate::sim::enemy::Enemy;
use crate::sim::geometry::{Bounded, Rect};
use crate::sim::obstacle::{ExplosionParticleKind, Obstacle, ObstacleKind, ObstacleState};
use crate::sim::player::Player;
use crate::sim::powerup::{PowerUp, PowerUpKind};

/// The player's vehicle: body, cab, two spinning wheels
pub fn player(list: &mut DrawList, player: &Player) {
    let body = if player.hit_flash > 0.0 {
        colors::HIT_FLASH
    } else if player.damage_boost {
        rgba(0xffd700, 1.0)
    } else {
        colors::PLAYER
    };
    let (x, y, w, h) = (player.pos.x, player.pos.y, player.size.x, player.size.y);

    list.rect(Rect::new(x, y + h * 0.35, w, h * 0.45), body);
    list.rect(Rect::new(x + w * 0.45, y, w * 0.4, h * 0.4), body);

    let wheel_r = h * 0.22;
    for wx in [x + w * 0.22, x + w * 0.78] {
        let hub = Vec2::new(wx, y + h - wheel_r);
        list.circle(hub, wheel_r, colors::WHEEL);
        // Spoke marker so the spin is visible
        let spoke = hub + direction(player.wheel_angle) * wheel_r * 0.6;
        list.circle(spoke, wheel_r * 0.25, rgba(0x999999, 1.0));
    }
}

pub fn enemy(list: &mut DrawList, enemy: &Enemy) {
    let color = if enemy.hit_flash > 0.0 {
        [1.0, 1.0, 1.0, 1.0]
    } else {
        rgba(enemy.template().color, 1.0)
    };
    list.rect(enemy.bounds(), color);

    // Health bar once damaged
    if enemy.health < enemy.max_health && enemy.max_health > 0.0 {
        let frac = (enemy.health / enemy.max_health).clamp(0.0, 1.0);
        let bar = Rect::new(enemy.pos.x, enemy.pos.y - 6.0, enemy.size.x, 3.0);
        list.rect(bar, rgba(0x440000, 1.0));
        list.rect(
            Rect::new(bar.x, bar.y, bar.width * frac, bar.height),
            rgba(0x22ff44, 1.0),
        );
    }
}

pub fn obstacle(list: &mut DrawList, obstacle: &Obstacle) {
    let spec = obstacle.spec();
    match &obstacle.state {
        ObstacleState::Intact | ObstacleState::Cracking { .. } => {
            // Squash keeps the bottom edge planted
            let h = obstacle.size.y * obstacle.squash_scale();
            let rect = Rect::new(
                obstacle.pos.x,
                obstacle.pos.y + obstacle.size.y - h,
                obstacle.size.x,
                h,
            );
            list.rect(rect, rgba(spec.color, 1.0));
            match obstacle.kind {
                ObstacleKind::Box => {
                    if matches!(obstacle.state, ObstacleState::Cracking { .. }) {
                        list.rect(
                            Rect::new(rect.center().x - 1.0, rect.y, 2.0, rect.height),
                            rgba(0x3b1f0a, 1.0),
                        );
                    }
                }
                ObstacleKind::Car | ObstacleKind::Cybertruck => {
                    let wheel_r = obstacle.size.y * 0.2;
                    for wx in [rect.x + rect.width * 0.2, rect.x + rect.width * 0.8] {
                        list.circle(Vec2::new(wx, rect.bottom() - wheel_r), wheel_r, colors::WHEEL);
                    }
                }
                ObstacleKind::Generic => {}
            }
        }
        ObstacleState::Exploding(explosion) => {
            let center = obstacle.center();
            let fade = 1.0 - explosion.timer / explosion.duration;
            list.circle(center, explosion.radius * 0.35, rgba(0xffcc33, fade * 0.8));
            list.ring(center, explosion.radius, 3.0, rgba(0xff6600, fade * 0.6));
            for p in &explosion.particles {
                let color = match p.kind {
                    ExplosionParticleKind::Fire => rgba(0xff7a1a, p.alpha()),
                    ExplosionParticleKind::Debris => rgba(0x444444, 1.0),
                    ExplosionParticleKind::Smoke => rgba(0x555566, p.alpha() * 0.5),
                };
                list.circle(p.pos, p.size * 0.5, color);
            }
        }
        ObstacleState::Destroyed => {}
    }
}

pub fn power_up(list: &mut DrawList, power_up: &PowerUp) {
    let color = rgba(power_up.kind.color(), 1.0);
    let center = power_up.center();
    match power_up.kind {
        PowerUpKind::Coin => list.circle(center, power_up.size.x * 0.5, color),
        PowerUpKind::Mushroom => {
            list.circle(center - Vec2::new(0.0, 3.0), power_up.size.x * 0.5, color);
            list.rect(
                Rect::new(center.x - 4.0, center.y, 8.0, power_up.size.y * 0.5),
                rgba(0xf5e6c8, 1.0),
            );
        }
        PowerUpKind::Health | PowerUpKind::Charge => {
            list.rect(power_up.bounds(), color);
        }
    }
}
