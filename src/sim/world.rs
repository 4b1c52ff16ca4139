/// GameState: the complete snapshot of a running game.
///
/// ## Machine
///
///   NotStarted ─start─▶ RoundActive ─correct / timeout─▶ RoundSummary
///        ▲                 ▲    │                            │
///        │                 │    └─fetch error─▶ FetchFailed  │ next
///        │                 └──────────retry────────┘         ▼
///        └──────────────restart──────────────────── MatchComplete
///
/// The current round lives inside the phase that owns it, so a round can
/// only be mutated while it is active. Match-level accumulators sit beside
/// the phase and survive round boundaries until `restart`.
///
/// ## Timers
///
/// Two tickers run per round: the round timer (inside `RoundState`) and the
/// reveal ticker (`reveal`). Both are armed when the round's image resolves
/// and stopped on every exit path: correct guess, timeout, next round,
/// restart.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{ExhaustionPolicy, GameConfig, ScoringConfig};
use crate::domain::player::GameMode;
use super::reveal::RevealScheduler;
use super::round::{MatchState, RoundState};

#[derive(Clone, Debug)]
pub enum Phase {
    NotStarted,
    /// Player fetch failed; `retry` re-attempts the same round.
    FetchFailed { message: String },
    RoundActive(RoundState),
    RoundSummary(RoundState),
    MatchComplete,
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::NotStarted => "not-started",
            Phase::FetchFailed { .. } => "fetch-failed",
            Phase::RoundActive(_) => "round-active",
            Phase::RoundSummary(_) => "round-summary",
            Phase::MatchComplete => "match-complete",
        }
    }

    /// The round being played or summarised, if any.
    pub fn round(&self) -> Option<&RoundState> {
        match self {
            Phase::RoundActive(r) | Phase::RoundSummary(r) => Some(r),
            _ => None,
        }
    }
}

pub struct GameState {
    // ── Machine ──
    pub phase: Phase,
    pub mode: GameMode,
    pub match_state: MatchState,

    // ── Rules ──
    pub scoring: ScoringConfig,
    pub on_pool_exhausted: ExhaustionPolicy,

    // ── Per-round presentation ──
    pub reveal: RevealScheduler,
    /// Guess being typed. Cleared on a wrong guess and on round change.
    pub guess: String,

    // ── UI ──
    pub message: String,
    pub message_until: Duration,
    pub anim_tick: u32,

    pub rng: StdRng,
}

impl GameState {
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        GameState {
            phase: Phase::NotStarted,
            mode: config.mode,
            match_state: MatchState::new(),
            scoring: config.scoring.clone(),
            on_pool_exhausted: config.on_pool_exhausted,
            reveal: RevealScheduler::new(&config.reveal),
            guess: String::new(),
            message: String::new(),
            message_until: Duration::ZERO,
            anim_tick: 0,
            rng,
        }
    }

    pub fn round(&self) -> Option<&RoundState> {
        self.phase.round()
    }

    pub fn set_message(&mut self, msg: &str, now: Duration, ttl: Duration) {
        self.message = msg.to_string();
        self.message_until = now + ttl;
    }

    pub fn expire_message(&mut self, now: Duration) {
        if !self.message.is_empty() && now >= self.message_until {
            self.message.clear();
        }
    }
}
