/// Round timer: one tick per second while a round is live.
///
/// Each tick removes a second of budget and decays the round score. When the
/// budget hits zero the tick reports `Expired`; closing the round is up to
/// the caller (see `step::advance`).

use std::time::Duration;

use crate::config::ScoringConfig;
use crate::domain::scoring;
use super::scheduler::{CancelToken, Fired, Ticker};

pub const TICK: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TickOutcome {
    Running,
    Expired,
}

#[derive(Clone, Debug)]
pub struct RoundTimer {
    ticker: Ticker,
    token: Option<CancelToken>,
    pub remaining: u32,
}

impl RoundTimer {
    pub fn new(budget_seconds: u32) -> Self {
        RoundTimer {
            ticker: Ticker::new(TICK),
            token: None,
            remaining: budget_seconds,
        }
    }

    /// Arm the timer with a full budget.
    pub fn start(&mut self, budget_seconds: u32, now: Duration) {
        self.remaining = budget_seconds;
        self.token = Some(self.ticker.start(now));
    }

    pub fn stop(&mut self) {
        self.ticker.cancel();
        self.token = None;
    }

    pub fn is_running(&self) -> bool {
        self.token.is_some_and(|t| self.ticker.is_live(t))
    }

    pub fn poll(&mut self, now: Duration) -> Option<Fired> {
        self.ticker.poll(now)
    }

    /// Is this batch still allowed to mutate the round?
    pub fn accepts(&self, fired: &Fired) -> bool {
        self.token == Some(fired.token) && self.ticker.is_live(fired.token)
    }

    /// Apply one second: budget down (floor 0), score decays (floor `min_score`).
    pub fn tick(&mut self, score: &mut u32, rules: &ScoringConfig) -> TickOutcome {
        self.remaining = self.remaining.saturating_sub(1);
        *score = scoring::decay(*score, rules);
        if self.remaining == 0 {
            TickOutcome::Expired
        } else {
            TickOutcome::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ScoringConfig {
        ScoringConfig {
            max_rounds: 10,
            time_per_round: 3,
            base_score: 100,
            time_decay_rate: 2,
            wrong_answer_penalty: 15,
            min_score: 10,
            bonus_rate_per_second: 2.0,
        }
    }

    #[test]
    fn ticks_decay_and_expire() {
        let r = rules();
        let mut timer = RoundTimer::new(r.time_per_round);
        timer.start(r.time_per_round, Duration::ZERO);
        let mut score = r.base_score;
        assert_eq!(timer.tick(&mut score, &r), TickOutcome::Running);
        assert_eq!((timer.remaining, score), (2, 98));
        assert_eq!(timer.tick(&mut score, &r), TickOutcome::Running);
        assert_eq!(timer.tick(&mut score, &r), TickOutcome::Expired);
        assert_eq!((timer.remaining, score), (0, 94));
    }

    #[test]
    fn remaining_floors_at_zero() {
        let r = rules();
        let mut timer = RoundTimer::new(0);
        let mut score = 50;
        assert_eq!(timer.tick(&mut score, &r), TickOutcome::Expired);
        assert_eq!(timer.remaining, 0);
    }

    #[test]
    fn stopped_timer_rejects_old_batches() {
        let mut timer = RoundTimer::new(30);
        timer.start(30, Duration::ZERO);
        let fired = timer.poll(Duration::from_secs(2)).unwrap();
        assert!(timer.accepts(&fired));
        timer.stop();
        assert!(!timer.accepts(&fired));
        assert!(!timer.is_running());
        assert_eq!(timer.poll(Duration::from_secs(10)), None);
    }

    #[test]
    fn restart_rejects_batches_from_previous_run() {
        let mut timer = RoundTimer::new(30);
        timer.start(30, Duration::ZERO);
        let old = timer.poll(Duration::from_secs(1)).unwrap();
        timer.start(30, Duration::from_secs(1));
        assert!(!timer.accepts(&old));
        assert_eq!(timer.remaining, 30);
    }
}
