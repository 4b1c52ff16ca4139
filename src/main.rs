/// Entry point and game loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use tracing::{error, info};

use config::GameConfig;
use sim::asset;
use sim::event::GameEvent;
use sim::provider::{PlayerProvider, RosterProvider};
use sim::step;
use sim::world::{GameState, Phase};
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

/// Longest guess the input line accepts.
const MAX_GUESS_LEN: usize = 32;
const MESSAGE_TTL: Duration = Duration::from_millis(1800);

fn main() -> Result<()> {
    let config = GameConfig::load();
    let _log_guard = logging::init_logging(&config.logging)?;
    info!(?config, "starting");

    let mut provider = build_provider(&config)?;
    let asset_dirs = asset_dirs(&provider);
    let mut world = GameState::new(&config);

    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let sound = SoundEngine::new();
    let result = game_loop(&mut world, &mut provider, &asset_dirs, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = &result {
        error!(error = %e, "game loop failed");
    }
    result?;

    println!();
    println!("Thanks for playing ProGuesser!");
    println!("Total score: {}", world.match_state.total_score);
    Ok(())
}

fn build_provider(config: &GameConfig) -> Result<RosterProvider> {
    // Separate stream from the game's own RNG, still reproducible.
    let seed = config.seed.map(|s| s.wrapping_add(1));
    // A roster file is read when the first round starts; read errors show
    // up as a retryable fetch failure instead of aborting here.
    let provider = match &config.players_file {
        Some(path) => {
            info!(path = %path.display(), "using roster file");
            RosterProvider::from_path(path, seed)
        }
        None => {
            let provider = RosterProvider::embedded(seed).context("loading built-in roster")?;
            info!(players = provider.len(), "built-in roster ready");
            provider
        }
    };
    Ok(provider)
}

/// Where relative image references are looked up: next to the roster file,
/// then the config search directories.
fn asset_dirs(provider: &RosterProvider) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = provider.base_dir().map(Path::to_path_buf).into_iter().collect();
    for dir in config::candidate_dirs() {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

fn game_loop(
    world: &mut GameState,
    provider: &mut dyn PlayerProvider,
    asset_dirs: &[PathBuf],
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<()> {
    let mut kb = InputState::new();
    let clock = Instant::now();
    let frame = Duration::from_millis(config.frame_ms);

    loop {
        kb.drain_events();
        if kb.ctrl_c_pressed() {
            break;
        }

        let now = clock.elapsed();
        let mut events = Vec::new();
        match handle_keys(world, provider, &kb, now) {
            Flow::Quit => break,
            Flow::Continue(evts) => events.extend(evts),
        }

        // The core never loads bytes; resolve the pending image here.
        if let Some(image) = step::pending_image(world).map(str::to_owned) {
            let status = asset::probe(&image, asset_dirs);
            events.extend(step::image_resolved(world, status, now));
        }

        events.extend(step::advance(world, now));
        process_events(world, sound, &events, now);

        renderer.render(world)?;
        thread::sleep(frame);
    }
    Ok(())
}

enum Flow {
    Continue(Vec<GameEvent>),
    Quit,
}

fn handle_keys(
    world: &mut GameState,
    provider: &mut dyn PlayerProvider,
    kb: &InputState,
    now: Duration,
) -> Flow {
    let enter = kb.was_pressed(KeyCode::Enter);
    let esc = kb.was_pressed(KeyCode::Esc);

    let events = match world.phase {
        Phase::NotStarted => {
            if esc || kb.char_pressed('q') {
                return Flow::Quit;
            }
            if kb.any_pressed(&[KeyCode::Tab, KeyCode::Left, KeyCode::Right, KeyCode::Up, KeyCode::Down]) {
                let next = world.mode.next();
                step::set_mode(world, next);
            }
            if enter { step::start_match(world, provider) } else { vec![] }
        }
        Phase::FetchFailed { .. } => {
            if esc {
                step::restart(world)
            } else if enter || kb.char_pressed('r') {
                step::retry(world, provider)
            } else {
                vec![]
            }
        }
        Phase::RoundActive(_) => {
            if esc {
                step::restart(world)
            } else {
                kb.edit_line(&mut world.guess, MAX_GUESS_LEN);
                if enter { step::submit_guess(world, now) } else { vec![] }
            }
        }
        Phase::RoundSummary(_) => {
            if esc {
                step::restart(world)
            } else if enter {
                step::next_round(world, provider)
            } else {
                vec![]
            }
        }
        Phase::MatchComplete => {
            if kb.char_pressed('q') {
                return Flow::Quit;
            }
            if enter || esc || kb.char_pressed('r') { step::restart(world) } else { vec![] }
        }
    };
    Flow::Continue(events)
}

fn process_events(world: &mut GameState, sound: Option<&SoundEngine>, events: &[GameEvent], now: Duration) {
    for event in events {
        match event {
            GameEvent::WrongGuess { attempts, .. } => {
                let msg = format!("Nope. Miss #{attempts}, -{} points", world.scoring.wrong_answer_penalty);
                world.set_message(&msg, now, MESSAGE_TTL);
            }
            GameEvent::TimeUp => {
                if let Some(round) = world.round() {
                    let msg = format!("Time! That was {}", round.player.name);
                    world.set_message(&msg, now, MESSAGE_TTL);
                }
            }
            GameEvent::PoolReset { pool } => {
                let msg = format!("All {pool} players used, the pool starts over");
                world.set_message(&msg, now, MESSAGE_TTL * 2);
            }
            GameEvent::CorrectGuess { score, seconds_used } => {
                let msg = format!("+{score} points in {seconds_used}s");
                world.set_message(&msg, now, MESSAGE_TTL);
            }
            _ => {}
        }
    }

    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::CorrectGuess { .. } => sfx.play_correct(),
            GameEvent::WrongGuess { .. } => sfx.play_wrong(),
            GameEvent::TimeUp => sfx.play_time_up(),
            GameEvent::CellRevealed { revealed, target, .. } => sfx.play_reveal_blip(*revealed, *target),
            GameEvent::MatchComplete { .. } => sfx.play_match_complete(),
            _ => {}
        }
    }
}
