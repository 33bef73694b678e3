//! Road Rampage entry point
//!
//! Headless runner: plays one autopilot run at a simulated 60 Hz, submits
//! the result to the local leaderboard and prints the top scores.
//!
//! Usage: `road-rampage [max_frames] [name]`

use road_rampage::audio::LogAudio;
use road_rampage::consts::FRAME_MS;
use road_rampage::hud::LogUi;
use road_rampage::sim::TickInput;
use road_rampage::sim::level::LevelPack;
use road_rampage::{Game, Leaderboard, ScoreService, Settings};

const SETTINGS_PATH: &str = "road_rampage_settings.json";
const SCORES_PATH: &str = "road_rampage_scores.json";
/// Ten minutes of play
const DEFAULT_MAX_FRAMES: u64 = 36_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Road Rampage (headless) starting...");

    let mut args = std::env::args().skip(1);
    let max_frames = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or(DEFAULT_MAX_FRAMES);
    let name = args.next().unwrap_or_else(|| "AUTO".to_string());

    let settings = Settings::load(SETTINGS_PATH);
    let levels = match LevelPack::builtin() {
        Ok(levels) => levels,
        Err(err) => {
            log::error!("Built-in levels are broken: {err}");
            std::process::exit(1);
        }
    };
    let seed = settings.seed.unwrap_or_else(rand::random);

    let mut game = Game::new(settings, levels, seed, Box::new(LogAudio), Box::new(LogUi));
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };

    let mut now_ms = 0.0;
    let mut frames = 0;
    while !game.is_over() && frames < max_frames {
        game.frame(now_ms, &input);
        now_ms += FRAME_MS;
        frames += 1;
    }

    let state = game.state();
    println!(
        "Run finished after {} frames: {:?}, level {} '{}', score {}",
        state.frame,
        state.phase,
        state.scheduler.level_index() + 1,
        state.scheduler.level_name(),
        state.score
    );

    let mut board = match Leaderboard::load(SCORES_PATH) {
        Ok(board) => board,
        Err(err) => {
            log::warn!("Could not read {SCORES_PATH}: {err}");
            Leaderboard::new()
        }
    };
    if game.is_over() {
        // Failures are already logged; the run itself still counts
        let _ = game.submit_score(&name, &mut board);
    }

    match board.fetch_top_scores() {
        Ok(top) => {
            println!("\nHigh scores:");
            for (rank, entry) in top.iter().enumerate() {
                println!("{:>2}. {:<6} {:>8}", rank + 1, entry.name, entry.score);
            }
        }
        Err(err) => log::warn!("Could not fetch high scores: {err}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser host drives `Game::frame` directly
}
