//! eDeDo headless runner
//!
//! Plays the simulation with the autopilot at the fixed tick rate and logs
//! what happens. Useful for soak runs and for replaying a seed.
//!
//! Usage: `ededo [seed] [ticks] [flash|medium|tank] [config.json]`

use ededo::audio::{AudioManager, LogSink};
use ededo::consts::TICKS_PER_SECOND;
use ededo::sim::{GameEvent, GameState, TickInput, tick};
use ededo::{Character, GameConfig};

/// Command line options, all positional and optional
struct Options {
    seed: u64,
    ticks: u64,
    character: Character,
    config: GameConfig,
}

impl Options {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();

        let seed = args.first().and_then(|s| s.parse().ok()).unwrap_or(1);
        let ticks = args
            .get(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(60 * TICKS_PER_SECOND as u64);
        let character = match args.get(2) {
            Some(name) => Character::from_str(name).unwrap_or_else(|| {
                log::warn!("Unknown character '{}', using Medium", name);
                Character::Medium
            }),
            None => Character::Medium,
        };
        let config = match args.get(3) {
            Some(path) => GameConfig::load_or_default(path),
            None => GameConfig::default(),
        };

        Self {
            seed,
            ticks,
            character,
            config,
        }
    }
}

fn main() {
    env_logger::init();
    let options = Options::from_args();
    log::info!(
        "eDeDo (headless) starting: seed={}, ticks={}, character={}",
        options.seed,
        options.ticks,
        options.character.as_str()
    );

    let mut state = GameState::new(options.config.clone(), options.character, options.seed);
    let mut audio = AudioManager::new(LogSink::default());
    let input = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    let mut runs = 1u32;
    let mut best_level = 1u32;

    for _ in 0..options.ticks {
        tick(&mut state, &input);
        audio.play_all(state.drain_audio());

        for event in state.drain_events() {
            match event {
                GameEvent::LevelCompleted { level } => best_level = best_level.max(level + 1),
                GameEvent::PlayerHit { lives_left } => log::debug!("Hit, {} lives left", lives_left),
                _ => {}
            }
        }

        if state.ready_for_menu() {
            // Start over with the next seed, as a menu would
            runs += 1;
            let seed = options.seed.wrapping_add(runs as u64 - 1);
            state = GameState::new(options.config.clone(), options.character, seed);
        }
    }

    log::info!(
        "Finished: runs={}, best level={}, current level={}, kills={}, lives={}, sounds played={}",
        runs,
        best_level,
        state.level,
        state.total_kills,
        state.player.lives,
        audio.sink().played
    );
}
