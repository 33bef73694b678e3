//! Fixed timestep simulation tick
//!
//! Stage order within a tick never changes: player, obstacles, level
//! scheduler, projectiles, enemies, power-ups, particles, platforms, then the
//! game-over check. Entities that die or leave play during a stage are marked
//! and compacted once that stage's pass is over; score, particles and drops
//! produced by a stage are applied right after it.

use glam::Vec2;

use super::autopilot;
use super::enemy::Enemy;
use super::geometry::{Bounded, overlaps};
use super::level::{LevelEvent, Spawn};
use super::obstacle::{DamageOutcome, Obstacle, ObstacleKind};
use super::player::{MoveInput, Player};
use super::powerup::{COIN_POINTS, HEALTH_PICKUP_AMOUNT, PowerUp, PowerUpKind};
use super::projectile::{Owner, ProjectileFate};
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Damage for driving into the side of a solid obstacle
pub const OBSTACLE_CONTACT_DAMAGE: f32 = 10.0;
/// Share of an explosion's damage the player takes
pub const PLAYER_EXPLOSION_FACTOR: f32 = 0.5;
/// Damage a powered-up player deals by ramming an enemy (per frame of contact)
pub const RAM_DAMAGE: f32 = 50.0;
/// Penetration (px) still treated as landing on top of an obstacle
const LANDING_TOLERANCE: f32 = 8.0;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Fire the active weapon (held)
    pub shoot: bool,
    /// Trigger the stampede special ability
    pub special: bool,
    pub switch_weapon: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start over from level 0 (works in any phase)
    pub restart: bool,
    /// Idle/demo mode - the autopilot drives
    pub idle_mode: bool,
}

impl TickInput {
    pub fn movement(&self) -> MoveInput {
        MoveInput {
            left: self.left,
            right: self.right,
            jump: self.jump,
        }
    }
}

/// Advance the game state by `dt` frames
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.restart {
        state.restart();
        return;
    }

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.events.push(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    // Nothing moves while paused or after the run ended
    if state.phase != GamePhase::Playing {
        return;
    }

    state.screen_shake *= 0.9;
    if state.screen_shake < 0.01 {
        state.screen_shake = 0.0;
    }

    let mut input = input.clone();
    if input.idle_mode {
        autopilot::drive(state, &mut input);
    }

    state.frame += 1;
    state.elapsed += dt;
    let scroll_dx = state.scheduler.scroll_step(dt);

    let prev_bottom = update_player(state, &input, dt);
    update_obstacles(state, prev_bottom, scroll_dx, dt);
    update_level(state, dt);
    update_projectiles(state, dt);
    update_enemies(state, dt);
    update_power_ups(state, scroll_dx, dt);
    state.particles.advance(&mut state.rng, dt);
    state.platforms.update(scroll_dx);

    if state.player.is_dead() && state.phase == GamePhase::Playing {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver { score: state.score });
        log::info!("Game over at frame {} with score {}", state.frame, state.score);
    }
}

// === Deferred side effects ===

/// Score, particles and drops collected during a stage
#[derive(Debug, Default)]
struct Effects {
    points: u64,
    events: Vec<GameEvent>,
    bursts: Vec<(Vec2, usize, u32)>,
    drops: Vec<(PowerUpKind, Vec2)>,
    shake: f32,
}

impl Effects {
    fn burst(&mut self, pos: Vec2, count: usize, color: u32) {
        self.bursts.push((pos, count, color));
    }

    fn enemy_hit(&mut self, enemy: &Enemy, killed: bool) {
        if killed {
            self.points += enemy.points;
            self.events.push(GameEvent::EnemyDestroyed {
                kind: enemy.kind,
                points: enemy.points,
            });
            self.burst(enemy.center(), 16, enemy.template().color);
            log::debug!("Enemy {} ({:?}) destroyed", enemy.id, enemy.kind);
        } else {
            self.events.push(GameEvent::EnemyHit);
            self.burst(enemy.center(), 3, 0xffffff);
        }
    }

    /// React to an obstacle hit. Returns true if the obstacle should be removed.
    fn obstacle_hit(&mut self, obstacle: &Obstacle, outcome: DamageOutcome) -> bool {
        let color = obstacle.spec().color;
        match outcome {
            DamageOutcome::Ignored => false,
            DamageOutcome::Absorbed => {
                self.burst(obstacle.center(), 2, 0xffee88);
                false
            }
            DamageOutcome::Cracked => {
                self.events.push(GameEvent::BoxCracked);
                self.burst(obstacle.center(), 6, color);
                false
            }
            DamageOutcome::Destroyed => {
                self.points += obstacle.points;
                self.events.push(GameEvent::ObstacleDestroyed {
                    kind: obstacle.kind,
                    points: obstacle.points,
                });
                self.burst(obstacle.center(), 20, color);
                if let Some(kind) = obstacle.contains {
                    self.drops.push((kind, obstacle.center()));
                }
                true
            }
            DamageOutcome::Detonated => {
                self.points += obstacle.points;
                self.events.push(GameEvent::VehicleExploded {
                    kind: obstacle.kind,
                });
                self.shake += 0.6;
                false
            }
        }
    }

    fn apply(self, state: &mut GameState) {
        state.score = state.score.saturating_add(self.points);
        for (pos, count, color) in self.bursts {
            state.particles.emit(&mut state.rng, pos, count, color);
        }
        for (kind, pos) in self.drops {
            state.power_ups.push(PowerUp::new(kind, pos));
        }
        if self.shake > 0.0 {
            state.add_shake(self.shake);
        }
        state.events.extend(self.events);
    }
}

/// Drop every item whose flag is set, preserving order
fn compact<T>(items: &mut Vec<T>, removed: &[bool]) {
    let mut index = 0;
    items.retain(|_| {
        let keep = !removed.get(index).copied().unwrap_or(false);
        index += 1;
        keep
    });
}

// === Stages ===

/// Movement, weapons and the special ability.
/// Returns the player's bottom edge before moving (for landing checks).
fn update_player(state: &mut GameState, input: &TickInput, dt: f32) -> f32 {
    let player = &mut state.player;
    let prev_bottom = player.pos.y + player.size.y;

    if input.switch_weapon {
        let name = player.switch_weapon();
        state.events.push(GameEvent::WeaponSwitched { name });
    }

    let was_jumping = player.jumping;
    let boosted = player.damage_boost;
    player.update(input.movement(), dt);
    if !was_jumping && player.jumping {
        state.events.push(GameEvent::Jumped);
    }
    if boosted && !player.damage_boost {
        state.events.push(GameEvent::PowerWoreOff);
    }

    if player.vel.y >= 0.0
        && let Some(top) = state.platforms.landing_surface(prev_bottom, &player.bounds())
    {
        player.land_on(top);
    }

    if input.shoot {
        let multiplier = player.damage_multiplier();
        if let Some(projectile) = player.shoot(multiplier) {
            state.projectiles.push(projectile);
            state.events.push(GameEvent::Shot {
                weapon: player.weapon().name,
            });
        }
    }

    if input.special || player.special.active {
        let was_active = player.special.active;
        player.special_ability(dt, &mut state.projectiles);
        if !was_active && player.special.active {
            state.events.push(GameEvent::SpecialFired);
        }
    }

    prev_bottom
}

/// Scroll obstacles and resolve player contact, player fire and explosions
fn update_obstacles(state: &mut GameState, prev_bottom: f32, scroll_dx: f32, dt: f32) {
    let mut effects = Effects::default();
    {
        let GameState {
            obstacles,
            enemies,
            projectiles,
            player,
            rng,
            ..
        } = state;

        let mut removed = vec![false; obstacles.len()];
        let mut consumed = vec![false; projectiles.len()];

        for (i, obstacle) in obstacles.iter_mut().enumerate() {
            if obstacle.update(scroll_dx, dt, rng) {
                removed[i] = true;
                continue;
            }

            if obstacle.is_solid() && overlaps(&player.bounds(), &obstacle.bounds()) {
                let from_above =
                    player.vel.y >= 0.0 && prev_bottom <= obstacle.pos.y + LANDING_TOLERANCE;
                if from_above {
                    player.land_on(obstacle.pos.y);
                    if obstacle.kind == ObstacleKind::Box {
                        let outcome = obstacle.take_damage(1.0, rng);
                        player.bounce(BOX_BOUNCE_IMPULSE);
                        removed[i] |= effects.obstacle_hit(obstacle, outcome);
                    }
                } else {
                    push_out_sideways(player, obstacle);
                    if player.take_contact_damage(OBSTACLE_CONTACT_DAMAGE) {
                        effects.events.push(GameEvent::PlayerHit {
                            damage: OBSTACLE_CONTACT_DAMAGE,
                        });
                    }
                }
            }

            for (j, projectile) in projectiles.iter().enumerate() {
                if !obstacle.is_solid() {
                    break;
                }
                if consumed[j] || !projectile.is_player_owned() {
                    continue;
                }
                if overlaps(&projectile.bounds(), &obstacle.bounds()) {
                    consumed[j] = true;
                    let outcome = obstacle.take_damage(projectile.damage, rng);
                    removed[i] |= effects.obstacle_hit(obstacle, outcome);
                }
            }

            for enemy in enemies.iter_mut() {
                explosion_vs_enemy(obstacle, enemy, &mut effects);
            }
            explosion_vs_player(obstacle, player, &mut effects);

            if obstacle.is_off_screen() {
                removed[i] = true;
            }
        }

        compact(obstacles, &removed);
        compact(projectiles, &consumed);
        enemies.retain(|e| !e.is_dead());
    }
    effects.apply(state);
}

/// Move the player out of a solid obstacle horizontally
fn push_out_sideways(player: &mut Player, obstacle: &Obstacle) {
    if player.center().x < obstacle.center().x {
        player.pos.x = obstacle.pos.x - player.size.x;
    } else {
        player.pos.x = obstacle.pos.x + obstacle.size.x;
    }
    player.pos.x = player.pos.x.clamp(0.0, (CANVAS_WIDTH - player.size.x).max(0.0));
}

/// Damage `enemy` if it's inside `obstacle`'s explosion and this explosion
/// hasn't hurt it yet
fn explosion_vs_enemy(obstacle: &mut Obstacle, enemy: &mut Enemy, effects: &mut Effects) {
    if enemy.is_dead() || !obstacle.is_in_explosion_radius(&*enemy) {
        return;
    }
    let Some(explosion) = obstacle.explosion_mut() else {
        return;
    };
    if explosion.has_hit(enemy.id) {
        return;
    }
    explosion.record_hit(enemy.id);
    let killed = enemy.take_damage(explosion.damage);
    effects.enemy_hit(enemy, killed);
}

/// The player takes reduced damage, at most once per explosion
fn explosion_vs_player(obstacle: &mut Obstacle, player: &mut Player, effects: &mut Effects) {
    if !obstacle.is_in_explosion_radius(&*player) {
        return;
    }
    let Some(explosion) = obstacle.explosion_mut() else {
        return;
    };
    if explosion.player_hit {
        return;
    }
    explosion.player_hit = true;
    let damage = explosion.damage * PLAYER_EXPLOSION_FACTOR;
    player.take_damage(damage);
    effects.events.push(GameEvent::PlayerHit { damage });
}

/// Advance the scroll position, handle level transitions and spawn elements
fn update_level(state: &mut GameState, dt: f32) {
    match state.scheduler.update(dt) {
        Some(LevelEvent::Advanced { index, name }) => {
            state.events.push(GameEvent::LevelAdvanced { index, name });
        }
        Some(LevelEvent::MissionComplete) => {
            state.phase = GamePhase::MissionComplete;
            state.events.push(GameEvent::MissionComplete { score: state.score });
        }
        None => {}
    }

    let spawns = state
        .scheduler
        .update_level_elements(&state.obstacles, &mut state.ids, &mut state.rng);
    for spawn in spawns {
        match spawn {
            Spawn::Obstacle(obstacle) => state.obstacles.push(obstacle),
            Spawn::Enemy(enemy) => state.enemies.push(enemy),
        }
    }
}

/// Move projectiles, drop spent ones and apply enemy fire to the player
fn update_projectiles(state: &mut GameState, dt: f32) {
    let mut effects = Effects::default();
    let mut removed = vec![false; state.projectiles.len()];

    for (i, projectile) in state.projectiles.iter_mut().enumerate() {
        match projectile.advance(dt) {
            ProjectileFate::HitFloor => {
                removed[i] = true;
                effects.burst(projectile.center(), 4, projectile.color);
                continue;
            }
            ProjectileFate::OutOfBounds => {
                removed[i] = true;
                continue;
            }
            ProjectileFate::Alive | ProjectileFate::Bounced => {}
        }

        if projectile.owner == Owner::Enemy
            && overlaps(&projectile.bounds(), &state.player.bounds())
        {
            removed[i] = true;
            state.player.take_damage(projectile.damage);
            effects.events.push(GameEvent::PlayerHit {
                damage: projectile.damage,
            });
        }
    }

    compact(&mut state.projectiles, &removed);
    effects.apply(state);
}

/// Enemy AI, player fire, explosions and ramming
fn update_enemies(state: &mut GameState, dt: f32) {
    let mut effects = Effects::default();
    {
        let GameState {
            enemies,
            obstacles,
            projectiles,
            player,
            rng,
            elapsed,
            ..
        } = state;

        let target = player.center();
        let mut consumed = vec![false; projectiles.len()];
        let mut shots = Vec::new();

        for enemy in enemies.iter_mut() {
            if let Some(shot) = enemy.update(target, *elapsed, dt, rng) {
                shots.push(shot);
            }

            for (j, projectile) in projectiles.iter().enumerate() {
                if enemy.is_dead() {
                    break;
                }
                if consumed[j] || !projectile.is_player_owned() {
                    continue;
                }
                if overlaps(&projectile.bounds(), &enemy.bounds()) {
                    consumed[j] = true;
                    let killed = enemy.take_damage(projectile.damage);
                    effects.enemy_hit(enemy, killed);
                }
            }

            for obstacle in obstacles.iter_mut() {
                explosion_vs_enemy(obstacle, enemy, &mut effects);
            }

            if !enemy.is_dead() && overlaps(&enemy.bounds(), &player.bounds()) {
                if player.is_powered_up() {
                    let killed = enemy.take_damage(RAM_DAMAGE);
                    effects.enemy_hit(enemy, killed);
                } else if player.take_contact_damage(enemy.contact_damage) {
                    effects.events.push(GameEvent::PlayerHit {
                        damage: enemy.contact_damage,
                    });
                }
            }
        }

        enemies.retain(|e| !e.is_dead() && !e.is_out_of_play());
        compact(projectiles, &consumed);
        projectiles.extend(shots);
    }
    effects.apply(state);
}

/// Scroll pickups and apply the ones the player drove through
fn update_power_ups(state: &mut GameState, scroll_dx: f32, dt: f32) {
    let player_bounds = state.player.bounds();
    let mut removed = vec![false; state.power_ups.len()];
    let mut collected = Vec::new();

    for (i, power_up) in state.power_ups.iter_mut().enumerate() {
        power_up.update(scroll_dx, dt);
        if overlaps(&power_up.bounds(), &player_bounds) {
            removed[i] = true;
            collected.push((power_up.kind, power_up.center()));
        } else if power_up.is_off_screen() {
            removed[i] = true;
        }
    }
    compact(&mut state.power_ups, &removed);

    for (kind, pos) in collected {
        apply_power_up(state, kind);
        state.particles.emit(&mut state.rng, pos, 10, kind.color());
    }
}

fn apply_power_up(state: &mut GameState, kind: PowerUpKind) {
    match kind {
        PowerUpKind::Mushroom => {
            // Already big: worth a coin instead
            if !state.player.activate_mushroom_power() {
                state.score = state.score.saturating_add(COIN_POINTS);
            }
        }
        PowerUpKind::Health => state.player.heal(HEALTH_PICKUP_AMOUNT),
        PowerUpKind::Charge => state.player.add_special_charge(),
        PowerUpKind::Coin => state.score = state.score.saturating_add(COIN_POINTS),
    }
    state.events.push(GameEvent::PowerUpCollected { kind });
}
