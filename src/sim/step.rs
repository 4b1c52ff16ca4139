/// State transitions. Every entry point takes the world plus whatever outside
/// input it needs and returns the events it produced.
///
/// Entry points and the phases they act in:
///   start_match     NotStarted
///   retry           FetchFailed
///   image_resolved  RoundActive (image not yet ready)
///   advance         any (only RoundActive has timers to drive)
///   submit_guess    RoundActive (image ready, not guessed)
///   next_round      RoundSummary
///   restart         any
///
/// Called outside its phase, an entry point changes nothing and returns no
/// events. Invalid guesses are silent no-ops, not errors.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::ExhaustionPolicy;
use crate::domain::matcher;
use crate::domain::player::{GameMode, Player};
use crate::domain::scoring;
use super::asset::AssetStatus;
use super::event::GameEvent;
use super::provider::{PlayerProvider, ProviderError};
use super::round::{MatchState, RoundState};
use super::timer::{TickOutcome, TICK};
use super::world::{GameState, Phase};

// ══════════════════════════════════════════════════════════════
// Match lifecycle
// ══════════════════════════════════════════════════════════════

pub fn set_mode(world: &mut GameState, mode: GameMode) {
    if matches!(world.phase, Phase::NotStarted) {
        world.mode = mode;
    }
}

pub fn start_match(world: &mut GameState, provider: &mut dyn PlayerProvider) -> Vec<GameEvent> {
    if !matches!(world.phase, Phase::NotStarted) {
        return vec![];
    }
    world.match_state = MatchState::new();
    world.match_state.current_round = 1;
    info!(mode = world.mode.tag(), rounds = world.scoring.max_rounds, "match started");
    begin_round(world, provider)
}

/// Re-attempt initialization of the round whose fetch failed.
pub fn retry(world: &mut GameState, provider: &mut dyn PlayerProvider) -> Vec<GameEvent> {
    if !matches!(world.phase, Phase::FetchFailed { .. }) {
        return vec![];
    }
    debug!(round = world.match_state.current_round, "retrying player fetch");
    begin_round(world, provider)
}

pub fn next_round(world: &mut GameState, provider: &mut dyn PlayerProvider) -> Vec<GameEvent> {
    if !matches!(world.phase, Phase::RoundSummary(_)) {
        return vec![];
    }
    if world.match_state.current_round >= world.scoring.max_rounds {
        world.match_state.complete = true;
        world.reveal.clear();
        world.guess.clear();
        world.phase = Phase::MatchComplete;
        let total = world.match_state.total_score;
        info!(total, correct = world.match_state.rounds_correct(), "match complete");
        return vec![GameEvent::MatchComplete { total }];
    }
    world.match_state.current_round += 1;
    begin_round(world, provider)
}

/// Back to NotStarted from anywhere. Both timers die with the round.
pub fn restart(world: &mut GameState) -> Vec<GameEvent> {
    if let Phase::RoundActive(round) = &mut world.phase {
        round.timer.stop();
    }
    world.reveal.clear();
    world.match_state = MatchState::new();
    world.guess.clear();
    world.message.clear();
    world.phase = Phase::NotStarted;
    info!("match restarted");
    vec![GameEvent::Restarted]
}

// ══════════════════════════════════════════════════════════════
// Round initialization
// ══════════════════════════════════════════════════════════════

fn begin_round(world: &mut GameState, provider: &mut dyn PlayerProvider) -> Vec<GameEvent> {
    let mut events = Vec::new();
    let round_number = world.match_state.current_round;
    world.guess.clear();
    world.reveal.clear();

    let player = match pick_player(world, provider, &mut events) {
        Ok(p) => p,
        Err(e) => {
            let message = e.to_string();
            warn!(round = round_number, error = %e, "player fetch failed");
            world.phase = Phase::FetchFailed { message: message.clone() };
            events.push(GameEvent::FetchFailed { message });
            return events;
        }
    };

    world.match_state.used_player_ids.insert(player.id);
    let image = player.image_for(world.mode, &mut world.rng);
    world.reveal.reset(&image);
    info!(round = round_number, player = %player.name, image = %image, "round started");
    events.push(GameEvent::RoundStarted { round: round_number, player: player.id });
    world.phase = Phase::RoundActive(RoundState::new(round_number, player, image, &world.scoring));
    events
}

fn pick_player(
    world: &mut GameState,
    provider: &mut dyn PlayerProvider,
    events: &mut Vec<GameEvent>,
) -> Result<Player, ProviderError> {
    let used = &mut world.match_state.used_player_ids;
    match provider.next_player(used, world.mode) {
        Err(ProviderError::PoolExhausted { pool })
            if world.on_pool_exhausted == ExhaustionPolicy::Reset =>
        {
            warn!(pool, "player pool exhausted, players may repeat");
            used.clear();
            events.push(GameEvent::PoolReset { pool });
            provider.next_player(used, world.mode)
        }
        other => other,
    }
}

// ══════════════════════════════════════════════════════════════
// Timers
// ══════════════════════════════════════════════════════════════

/// Image reference the current round is still waiting on.
pub fn pending_image(world: &GameState) -> Option<&str> {
    match &world.phase {
        Phase::RoundActive(round) if !round.image_ready() => Some(&round.image),
        _ => None,
    }
}

/// The round's image finished loading (or failed; the round proceeds either
/// way). Arms the round timer and the reveal.
pub fn image_resolved(world: &mut GameState, status: AssetStatus, now: Duration) -> Vec<GameEvent> {
    let Phase::RoundActive(round) = &mut world.phase else {
        return vec![];
    };
    if round.image_ready() {
        return vec![];
    }
    if status == AssetStatus::Failed {
        warn!(image = %round.image, "image failed to load, revealing placeholder");
    } else {
        debug!(image = %round.image, "image resolved");
    }
    world.reveal.resolve(status, now);
    round.start_time = Some(now);
    round.timer.start(world.scoring.time_per_round, now);
    vec![GameEvent::ImageResolved { status }]
}

/// Drive both tickers up to `now`.
pub fn advance(world: &mut GameState, now: Duration) -> Vec<GameEvent> {
    world.anim_tick = world.anim_tick.wrapping_add(1);
    world.expire_message(now);
    let mut events = Vec::new();
    drive_round(world, now, &mut events);
    events
}

/// Round clock first, then the reveal up to the instant the round closed.
fn drive_round(world: &mut GameState, now: Duration, events: &mut Vec<GameEvent>) {
    let Phase::RoundActive(round) = &mut world.phase else {
        return;
    };

    let mut expired_at = None;
    if let Some(fired) = round.timer.poll(now) {
        for _ in 0..fired.count {
            if round.guessed || !round.timer.accepts(&fired) {
                break;
            }
            let outcome = round.timer.tick(&mut round.current_score, &world.scoring);
            events.push(GameEvent::Tick {
                remaining: round.timer.remaining,
                score: round.current_score,
            });
            if outcome == TickOutcome::Expired {
                let deadline = round
                    .start_time
                    .map(|t| t + TICK * world.scoring.time_per_round);
                expired_at = Some(deadline.map_or(now, |d| d.min(now)));
                break;
            }
        }
    }

    let fresh = world.reveal.poll(expired_at.unwrap_or(now), &mut world.rng);
    let target = world.reveal.target();
    let base = world.reveal.revealed().len() - fresh.len();
    for (i, cell) in fresh.into_iter().enumerate() {
        events.push(GameEvent::CellRevealed { cell, revealed: base + i + 1, target });
    }

    if expired_at.is_some() {
        time_up(world, events);
    }
}

fn time_up(world: &mut GameState, events: &mut Vec<GameEvent>) {
    let Phase::RoundActive(round) = &mut world.phase else {
        return;
    };
    round.timer.stop();
    world.reveal.stop();
    round.guessed = true;
    round.correct = false;
    let result = round.result(0, world.scoring.time_per_round);
    info!(round = round.round_number, player = %round.player.name, "time up");
    world.match_state.record(result);
    close_round(world);
    events.push(GameEvent::TimeUp);
}

// ══════════════════════════════════════════════════════════════
// Guessing
// ══════════════════════════════════════════════════════════════

/// Evaluate the typed guess against the round's player, as of `now`. The
/// round clock is brought up to date first; a guess after expiry is ignored.
pub fn submit_guess(world: &mut GameState, now: Duration) -> Vec<GameEvent> {
    let mut events = Vec::new();
    drive_round(world, now, &mut events);

    let Phase::RoundActive(round) = &mut world.phase else {
        return events;
    };
    if !round.accepts_guess() {
        return events;
    }
    let guess = world.guess.trim();
    if guess.is_empty() {
        return events;
    }

    if matcher::is_accepted(guess, &round.player.name) {
        round.timer.stop();
        world.reveal.stop();
        let score = scoring::final_score(
            round.current_score,
            round.remaining_seconds(),
            &world.scoring,
        );
        let seconds_used = round.elapsed_seconds(&world.scoring);
        round.current_score = score;
        round.guessed = true;
        round.correct = true;
        info!(round = round.round_number, player = %round.player.name, score, seconds_used, "correct guess");
        let result = round.result(score, seconds_used);
        world.match_state.record(result);
        close_round(world);
        events.push(GameEvent::CorrectGuess { score, seconds_used });
    } else {
        debug!(guess = %guess, "wrong guess");
        round.wrong_attempts += 1;
        round.current_score = scoring::penalize(round.current_score, &world.scoring);
        world.guess.clear();
        events.push(GameEvent::WrongGuess {
            attempts: round.wrong_attempts,
            score: round.current_score,
        });
    }
    events
}

/// RoundActive(r) → RoundSummary(r).
fn close_round(world: &mut GameState) {
    let phase = std::mem::replace(&mut world.phase, Phase::NotStarted);
    world.phase = match phase {
        Phase::RoundActive(round) => Phase::RoundSummary(round),
        other => other,
    };
}

// ══════════════════════════════════════════════════════════════
// Tests
// ══════════════════════════════════════════════════════════════
