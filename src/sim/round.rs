/// Round and match bookkeeping.
///
/// `RoundState` lives from round start to the next round (or restart).
/// `MatchState` accumulates across rounds and is only appended to or reset
/// wholesale; a `RoundResult` is never touched after it is pushed.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::config::ScoringConfig;
use crate::domain::player::{Player, PlayerId};
use super::timer::RoundTimer;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundResult {
    pub round_number: u32,
    pub player_name: String,
    pub score: u32,
    pub correct: bool,
    pub wrong_attempts: u32,
    pub seconds_used: u32,
}

#[derive(Clone, Debug)]
pub struct RoundState {
    pub round_number: u32,
    pub player: Player,
    /// Image reference shown this round (depends on mode).
    pub image: String,
    /// When the timer was armed; `None` until the image resolves.
    pub start_time: Option<Duration>,
    pub current_score: u32,
    pub wrong_attempts: u32,
    pub guessed: bool,
    pub correct: bool,
    pub timer: RoundTimer,
}

impl RoundState {
    pub fn new(round_number: u32, player: Player, image: String, rules: &ScoringConfig) -> Self {
        RoundState {
            round_number,
            player,
            image,
            start_time: None,
            current_score: rules.base_score,
            wrong_attempts: 0,
            guessed: false,
            correct: false,
            timer: RoundTimer::new(rules.time_per_round),
        }
    }

    pub fn image_ready(&self) -> bool {
        self.start_time.is_some()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.timer.remaining
    }

    pub fn elapsed_seconds(&self, rules: &ScoringConfig) -> u32 {
        rules.time_per_round.saturating_sub(self.timer.remaining)
    }

    /// Can a guess be evaluated right now?
    pub fn accepts_guess(&self) -> bool {
        self.image_ready() && !self.guessed
    }

    pub fn result(&self, score: u32, seconds_used: u32) -> RoundResult {
        RoundResult {
            round_number: self.round_number,
            player_name: self.player.name.clone(),
            score,
            correct: self.correct,
            wrong_attempts: self.wrong_attempts,
            seconds_used,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MatchState {
    pub current_round: u32,
    pub total_score: u32,
    pub used_player_ids: BTreeSet<PlayerId>,
    pub round_results: Vec<RoundResult>,
    pub complete: bool,
}

impl MatchState {
    pub fn new() -> Self {
        MatchState::default()
    }

    /// Record a closed round. Only correct rounds add to the total.
    pub fn record(&mut self, result: RoundResult) {
        if result.correct {
            self.total_score += result.score;
        }
        self.round_results.push(result);
    }

    pub fn rounds_correct(&self) -> usize {
        self.round_results.iter().filter(|r| r.correct).count()
    }

    /// Average points per round over the full match length, rounded.
    pub fn average_score(&self, max_rounds: u32) -> u32 {
        if max_rounds == 0 {
            return 0;
        }
        (self.total_score as f64 / max_rounds as f64).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(round: u32, score: u32, correct: bool) -> RoundResult {
        RoundResult {
            round_number: round,
            player_name: format!("p{round}"),
            score,
            correct,
            wrong_attempts: 0,
            seconds_used: 5,
        }
    }

    #[test]
    fn record_totals_correct_rounds_only() {
        let mut m = MatchState::new();
        m.record(result(1, 140, true));
        m.record(result(2, 0, false));
        m.record(result(3, 95, true));
        assert_eq!(m.total_score, 235);
        assert_eq!(m.round_results.len(), 3);
        assert_eq!(m.rounds_correct(), 2);
    }

    #[test]
    fn average_rounds_half_up() {
        let mut m = MatchState::new();
        m.record(result(1, 125, true));
        assert_eq!(m.average_score(10), 13);
        assert_eq!(m.average_score(0), 0);
    }

    #[test]
    fn new_round_starts_at_base_and_not_ready() {
        let rules = ScoringConfig {
            max_rounds: 10,
            time_per_round: 30,
            base_score: 100,
            time_decay_rate: 2,
            wrong_answer_penalty: 15,
            min_score: 10,
            bonus_rate_per_second: 2.0,
        };
        let player = Player {
            id: 4,
            name: "device".into(),
            headshot: "device.png".into(),
            quote: None,
            images: vec![],
        };
        let r = RoundState::new(1, player, "device.png".into(), &rules);
        assert_eq!(r.current_score, 100);
        assert_eq!(r.remaining_seconds(), 30);
        assert_eq!(r.elapsed_seconds(&rules), 0);
        assert!(!r.image_ready());
        assert!(!r.accepts_guess());
    }
}
