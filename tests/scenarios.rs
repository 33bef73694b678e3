//! End-to-end gameplay scenarios driven through `tick` and `Game`

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use road_rampage::Game;
use road_rampage::audio::NullAudio;
use road_rampage::hud::UiSink;
use road_rampage::settings::Settings;
use road_rampage::sim::level::{Level, LevelPack};
use road_rampage::sim::obstacle::ObstacleState;
use road_rampage::sim::player::CONTACT_COOLDOWN_FRAMES;
use road_rampage::sim::powerup::{COIN_POINTS, PowerUp, PowerUpKind};
use road_rampage::sim::tick::{OBSTACLE_CONTACT_DAMAGE, PLAYER_EXPLOSION_FACTOR};
use road_rampage::sim::{
    Bounded, DamageOutcome, Enemy, EnemyKind, GameEvent, GamePhase, GameState, Obstacle,
    ObstacleKind, Owner, PowerState, Projectile, TickInput, tick,
};

fn level(name: &str, length: f32) -> Level {
    Level {
        name: name.to_string(),
        length,
        elements: Vec::new(),
    }
}

/// One long empty level so the test owns every entity
fn quiet_pack() -> LevelPack {
    LevelPack::new(vec![level("Test Track", 100_000.0)]).expect("valid pack")
}

fn settled_state() -> GameState {
    let mut state = GameState::new(2024, quiet_pack());
    for _ in 0..5 {
        tick(&mut state, &TickInput::default(), 1.0);
    }
    state.events.clear();
    state
}

fn shot_at(center: Vec2, damage: f32, owner: Owner) -> Projectile {
    let size = Vec2::splat(6.0);
    Projectile::new(center - size * 0.5, Vec2::ZERO, size, damage, 0xffffff, owner)
}

fn held(input: TickInput, state: &mut GameState, ticks: usize) {
    for _ in 0..ticks {
        tick(state, &input, 1.0);
    }
}

/// Park every enemy on the player and drop enemy fire so only contact counts
fn pin_on_player(state: &mut GameState) {
    let center = state.player.center();
    for enemy in &mut state.enemies {
        enemy.pos = center - enemy.size * 0.5;
    }
    state.projectiles.retain(|p| p.is_player_owned());
}

fn player_hits(state: &GameState) -> Vec<f32> {
    state
        .events
        .iter()
        .filter_map(|e| match e {
            GameEvent::PlayerHit { damage } => Some(*damage),
            _ => None,
        })
        .collect()
}

#[derive(Default)]
struct UiLog {
    health: Vec<f32>,
    game_over: bool,
}

#[derive(Clone, Default)]
struct SharedUi(Rc<RefCell<UiLog>>);

impl UiSink for SharedUi {
    fn set_score(&mut self, _score: u64) {}
    fn set_health(&mut self, percent: f32) {
        self.0.borrow_mut().health.push(percent);
    }
    fn set_weapon(&mut self, _name: &str) {}
    fn set_special_charges(&mut self, _charges: u32) {}
    fn set_level_name(&mut self, _name: &str) {}
    fn show_game_over(&mut self, _score: u64) {
        self.0.borrow_mut().game_over = true;
    }
}

fn game_with(ui: &SharedUi) -> Game {
    Game::new(
        Settings::default(),
        quiet_pack(),
        1,
        Box::new(NullAudio),
        Box::new(ui.clone()),
    )
}

#[test]
fn projectile_hit_updates_health_and_hud() {
    let ui = SharedUi::default();
    let mut game = game_with(&ui);
    for _ in 0..5 {
        game.step(&TickInput::default(), 1.0);
    }
    assert_eq!(ui.0.borrow().health, vec![100.0]);

    let center = game.state().player.center();
    game.state_mut()
        .projectiles
        .push(shot_at(center, 30.0, Owner::Enemy));
    game.step(&TickInput::default(), 1.0);

    assert_eq!(game.state().player.health, 70.0);
    assert_eq!(game.phase(), GamePhase::Playing);
    assert_eq!(ui.0.borrow().health, vec![100.0, 70.0]);
    assert!(!ui.0.borrow().game_over);
}

#[test]
fn game_over_reaches_the_ui() {
    let ui = SharedUi::default();
    let mut game = game_with(&ui);
    game.step(&TickInput::default(), 1.0);
    assert!(!ui.0.borrow().game_over);

    game.state_mut().player.take_damage(500.0);
    game.step(&TickInput::default(), 1.0);
    assert_eq!(game.phase(), GamePhase::GameOver);
    assert!(ui.0.borrow().game_over);
    assert_eq!(ui.0.borrow().health.last(), Some(&0.0));
}

#[test]
fn cybertruck_explodes_on_fifth_hit() {
    let mut rng = Pcg32::seed_from_u64(5);
    let mut truck = Obstacle::on_ground(1, ObstacleKind::Cybertruck, 500.0);
    for _ in 0..4 {
        truck.take_damage(35.0, &mut rng);
        assert!(matches!(truck.state, ObstacleState::Intact));
    }
    assert_eq!(truck.take_damage(35.0, &mut rng), DamageOutcome::Detonated);
    let explosion = truck.explosion().expect("exploding");
    assert!(explosion.radius > 0.0);
    assert_eq!(explosion.timer, 0.0);
}

#[test]
fn vehicle_detonated_by_player_fire_in_tick() {
    let mut state = settled_state();
    let id = state.ids.next();
    state
        .obstacles
        .push(Obstacle::on_ground(id, ObstacleKind::Car, 600.0));

    for hit in 1..=3 {
        let center = state.obstacles[0].center();
        state.projectiles.push(shot_at(center, 10.0, Owner::Player));
        tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(state.obstacles[0].is_exploding(), hit == 3);
    }
    assert_eq!(state.score, ObstacleKind::Car.spec().points);
    assert!(state.screen_shake > 0.0);
}

#[test]
fn scout_dies_on_second_hit() {
    let mut state = settled_state();
    let id = state.ids.next();
    let mut rng = Pcg32::seed_from_u64(9);
    let scout = Enemy::spawn(id, EnemyKind::Scout, Vec2::new(500.0, 120.0), &mut rng);
    assert_eq!(scout.health, 30.0);
    let points = scout.points;
    state.enemies.push(scout);

    let center = state.enemies[0].center();
    state.projectiles.push(shot_at(center, 20.0, Owner::Player));
    tick(&mut state, &TickInput::default(), 1.0);
    assert_eq!(state.enemies.len(), 1);
    assert_eq!(state.enemies[0].health, 10.0);
    assert!(!state.enemies[0].is_dead());
    assert_eq!(state.score, 0);

    let center = state.enemies[0].center();
    state.projectiles.push(shot_at(center, 20.0, Owner::Player));
    tick(&mut state, &TickInput::default(), 1.0);
    assert!(state.enemies.is_empty());
    assert_eq!(state.score, points);
}

#[test]
fn one_projectile_hits_one_thing() {
    let mut state = settled_state();
    let box_id = state.ids.next();
    state
        .obstacles
        .push(Obstacle::on_ground(box_id, ObstacleKind::Box, 600.0));
    let center = state.obstacles[0].center();

    // An enemy parked on top of the same spot
    let enemy_id = state.ids.next();
    let mut rng = Pcg32::seed_from_u64(3);
    let mut brute = Enemy::spawn(enemy_id, EnemyKind::Brute, Vec2::ZERO, &mut rng);
    brute.pos = center - brute.size * 0.5;
    let health = brute.health;
    state.enemies.push(brute);

    state.projectiles.push(shot_at(center, 30.0, Owner::Player));
    tick(&mut state, &TickInput::default(), 1.0);
    assert_eq!(state.obstacles[0].hit_count, 1);
    assert_eq!(state.enemies[0].health, health);
    assert!(state.projectiles.is_empty());
}

#[test]
fn smashed_box_drops_its_contents() {
    let mut state = settled_state();
    let id = state.ids.next();
    state.obstacles.push(
        Obstacle::on_ground(id, ObstacleKind::Box, 600.0).with_contents(PowerUpKind::Mushroom),
    );
    for _ in 0..2 {
        let center = state.obstacles[0].center();
        state.projectiles.push(shot_at(center, 1.0, Owner::Player));
        tick(&mut state, &TickInput::default(), 1.0);
    }
    assert!(state.obstacles.is_empty());
    assert_eq!(state.power_ups.len(), 1);
    assert_eq!(state.power_ups[0].kind, PowerUpKind::Mushroom);
    assert_eq!(state.score, ObstacleKind::Box.spec().points);
}

#[test]
fn final_level_completes_instead_of_wrapping() {
    let pack = LevelPack::new(vec![level("Short", 60.0), level("Shorter", 30.0)])
        .expect("valid pack");
    let mut state = GameState::new(1, pack);
    for _ in 0..200 {
        tick(&mut state, &TickInput::default(), 1.0);
        if state.phase != GamePhase::Playing {
            break;
        }
    }
    assert_eq!(state.phase, GamePhase::MissionComplete);
    assert_eq!(state.scheduler.level_index(), 1);
    assert!(state.scheduler.is_complete());

    let advanced = state
        .events
        .iter()
        .filter(|e| matches!(e, GameEvent::LevelAdvanced { .. }))
        .count();
    assert_eq!(advanced, 1);
    assert!(
        state
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::MissionComplete { .. }))
    );

    // Terminal: further ticks change nothing
    let frame = state.frame;
    tick(&mut state, &TickInput::default(), 1.0);
    assert_eq!(state.frame, frame);
}

#[test]
fn restart_returns_to_first_level() {
    let pack = LevelPack::new(vec![level("Short", 30.0), level("Long", 10_000.0)])
        .expect("valid pack");
    let mut state = GameState::new(1, pack);
    for _ in 0..40 {
        tick(&mut state, &TickInput::default(), 1.0);
    }
    assert_eq!(state.scheduler.level_index(), 1);

    let restart = TickInput {
        restart: true,
        ..Default::default()
    };
    tick(&mut state, &restart, 1.0);
    assert_eq!(state.scheduler.level_index(), 0);
    assert_eq!(state.scheduler.game_speed(), 1.0);
    assert!(state.obstacles.is_empty() && state.enemies.is_empty());
}

#[test]
fn autopilot_run_is_reproducible() {
    let run = |seed| {
        let mut state = GameState::new(seed, LevelPack::builtin().expect("builtin levels"));
        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..1500 {
            tick(&mut state, &input, 1.0);
            assert!(state.player.health >= 0.0 && state.player.health <= state.player.max_health);
        }
        (state.score, state.frame, state.player.pos, state.scheduler.scroll_position())
    };
    assert_eq!(run(77), run(77));
}

#[test]
fn no_jump_after_driving_off_a_platform() {
    let mut state = settled_state();
    let platform = state.platforms.platforms[0];
    let top = platform.pos.y;
    state.player.pos.x = platform.pos.x + platform.size.x - 10.0;
    state.player.land_on(top);

    tick(&mut state, &TickInput::default(), 1.0);
    assert!(state.player.grounded);
    assert!((state.player.pos.y + state.player.size.y - top).abs() < 1e-3);

    let right = TickInput {
        right: true,
        ..Default::default()
    };
    held(right, &mut state, 3);
    assert!(!state.player.grounded);
    assert!(state.player.pos.y + state.player.size.y > top);

    let jump = TickInput {
        jump: true,
        ..Default::default()
    };
    tick(&mut state, &jump, 1.0);
    assert!(state.player.vel.y > 0.0);
    assert!(!state.player.jumping);
    assert!(!state.events.contains(&GameEvent::Jumped));

    // Back on the ground the jump works again
    held(TickInput::default(), &mut state, 60);
    assert!(state.player.grounded);
    tick(&mut state, &jump, 1.0);
    assert!(state.player.vel.y < 0.0);
    assert!(state.events.contains(&GameEvent::Jumped));
}

fn shots_fired(dt: f32, game_frames: f32) -> usize {
    let mut state = GameState::new(4, quiet_pack());
    let shoot = TickInput {
        shoot: true,
        ..Default::default()
    };
    let mut shots = 0;
    for _ in 0..(game_frames / dt) as usize {
        tick(&mut state, &shoot, dt);
        shots += state
            .drain_events()
            .iter()
            .filter(|e| matches!(e, GameEvent::Shot { .. }))
            .count();
    }
    assert_eq!(state.elapsed, game_frames);
    shots
}

#[test]
fn fire_rate_follows_game_time() {
    let at_60hz = shots_fired(1.0, 120.0);
    let at_30hz = shots_fired(2.0, 120.0);
    assert_eq!(at_60hz, 14);
    assert_eq!(at_30hz, at_60hz);
}

#[test]
fn enemy_contact_respects_cooldown() {
    let mut state = settled_state();
    let id = state.ids.next();
    let mut rng = Pcg32::seed_from_u64(21);
    let brute = Enemy::spawn(id, EnemyKind::Brute, Vec2::ZERO, &mut rng);
    let damage = brute.contact_damage;
    state.enemies.push(brute);

    pin_on_player(&mut state);
    tick(&mut state, &TickInput::default(), 1.0);
    assert_eq!(state.player.health, 100.0 - damage);
    assert_eq!(player_hits(&state), vec![damage]);

    // Immune while the cooldown runs
    let immune = CONTACT_COOLDOWN_FRAMES as usize - 5;
    for _ in 0..immune {
        pin_on_player(&mut state);
        tick(&mut state, &TickInput::default(), 1.0);
    }
    assert_eq!(state.player.health, 100.0 - damage);

    for _ in 0..10 {
        pin_on_player(&mut state);
        tick(&mut state, &TickInput::default(), 1.0);
    }
    assert_eq!(state.player.health, 100.0 - damage * 2.0);
    assert_eq!(state.enemies.len(), 1);
}

#[test]
fn powered_up_player_rams_enemies() {
    let mut state = settled_state();
    state.player.power = PowerState::Powered { remaining: 600.0 };
    state.player.damage_boost = true;
    // Let the grown size take effect
    tick(&mut state, &TickInput::default(), 1.0);
    assert!(state.player.is_powered_up());

    let id = state.ids.next();
    let mut rng = Pcg32::seed_from_u64(8);
    let scout = Enemy::spawn(id, EnemyKind::Scout, Vec2::ZERO, &mut rng);
    let points = scout.points;
    state.enemies.push(scout);
    pin_on_player(&mut state);
    let score = state.score;

    tick(&mut state, &TickInput::default(), 1.0);
    assert!(state.enemies.is_empty());
    assert_eq!(state.score - score, points);
    assert_eq!(state.player.health, state.player.max_health);
}

#[test]
fn side_contact_with_obstacle_pushes_out_and_hurts() {
    let mut state = settled_state();
    let id = state.ids.next();
    let x = state.player.pos.x + state.player.size.x - 2.0;
    state
        .obstacles
        .push(Obstacle::on_ground(id, ObstacleKind::Generic, x));

    tick(&mut state, &TickInput::default(), 1.0);
    let obstacle = &state.obstacles[0];
    assert!(state.player.pos.x + state.player.size.x <= obstacle.pos.x + 1e-3);
    assert_eq!(state.player.health, 100.0 - OBSTACLE_CONTACT_DAMAGE);
    assert_eq!(player_hits(&state), vec![OBSTACLE_CONTACT_DAMAGE]);

    // Still pressed against it next frame, but within the cooldown
    tick(&mut state, &TickInput::default(), 1.0);
    assert_eq!(state.player.health, 100.0 - OBSTACLE_CONTACT_DAMAGE);
    assert!(state.player.pos.x + state.player.size.x <= state.obstacles[0].pos.x + 1e-3);
}

#[test]
fn explosion_hurts_player_once_at_half_damage() {
    let mut state = settled_state();
    let id = state.ids.next();
    let x = state.player.pos.x + 60.0;
    let mut car = Obstacle::on_ground(id, ObstacleKind::Car, x);
    assert!(car.explode(&mut state.rng));
    state.obstacles.push(car);

    held(TickInput::default(), &mut state, 70);
    let expected = ObstacleKind::Car.spec().explosion_damage * PLAYER_EXPLOSION_FACTOR;
    assert_eq!(player_hits(&state), vec![expected]);
    assert_eq!(state.player.health, 100.0 - expected);
    assert!(state.obstacles.is_empty());
}

#[test]
fn mushroom_grows_then_pays_coins_when_already_big() {
    let mut state = settled_state();
    let center = state.player.center();
    state.power_ups.push(PowerUp::new(PowerUpKind::Mushroom, center));
    tick(&mut state, &TickInput::default(), 1.0);
    assert!(matches!(state.player.power, PowerState::Growing { .. }));
    assert_eq!(state.score, 0);
    assert!(state.events.contains(&GameEvent::PowerUpCollected {
        kind: PowerUpKind::Mushroom
    }));

    held(TickInput::default(), &mut state, 35);
    assert!(state.player.is_powered_up());

    let center = state.player.center();
    state.power_ups.push(PowerUp::new(PowerUpKind::Mushroom, center));
    tick(&mut state, &TickInput::default(), 1.0);
    assert!(state.power_ups.is_empty());
    assert_eq!(state.score, COIN_POINTS);
    assert!(state.player.is_powered_up());
}
