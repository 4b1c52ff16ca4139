/// Fixed-interval ticker with explicit cancellation.
///
/// Time is whatever monotonically increasing `Duration` the caller passes as
/// `now` (time since launch in the game loop, synthetic values in tests).
///
/// Every `start` issues a fresh `CancelToken`. A `Fired` batch carries the
/// token it was produced under; consumers apply a fire only while
/// `is_live(token)` holds, so a fire can never outlive `cancel`/`start`.

use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CancelToken(u64);

/// Fires due since the previous poll.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Fired {
    pub token: CancelToken,
    pub count: u32,
}

#[derive(Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<Duration>,
    live: Option<CancelToken>,
    issued: u64,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Ticker {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
            live: None,
            issued: 0,
        }
    }

    /// Start (or restart) the ticker. The first fire is due one interval
    /// after `now`. Any previously issued token dies.
    pub fn start(&mut self, now: Duration) -> CancelToken {
        self.issued += 1;
        let token = CancelToken(self.issued);
        self.live = Some(token);
        self.next_due = Some(now + self.interval);
        token
    }

    pub fn cancel(&mut self) {
        self.live = None;
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.live.is_some()
    }

    pub fn is_live(&self, token: CancelToken) -> bool {
        self.live == Some(token)
    }

    /// Collect every interval boundary crossed up to `now`.
    pub fn poll(&mut self, now: Duration) -> Option<Fired> {
        let token = self.live?;
        let mut due = self.next_due?;
        let mut count = 0u32;
        while due <= now {
            count += 1;
            due += self.interval;
        }
        self.next_due = Some(due);
        if count == 0 {
            None
        } else {
            Some(Fired { token, count })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn idle_ticker_never_fires() {
        let mut t = Ticker::new(ms(100));
        assert!(!t.is_running());
        assert_eq!(t.poll(ms(10_000)), None);
    }

    #[test]
    fn first_fire_one_interval_after_start() {
        let mut t = Ticker::new(ms(1000));
        let tok = t.start(ms(500));
        assert_eq!(t.poll(ms(1499)), None);
        assert_eq!(t.poll(ms(1500)), Some(Fired { token: tok, count: 1 }));
        assert_eq!(t.poll(ms(1600)), None);
        assert_eq!(t.poll(ms(2500)), Some(Fired { token: tok, count: 1 }));
    }

    #[test]
    fn stalled_poll_catches_up() {
        let mut t = Ticker::new(ms(1000));
        let tok = t.start(ms(0));
        assert_eq!(t.poll(ms(3200)), Some(Fired { token: tok, count: 3 }));
        assert_eq!(t.poll(ms(3999)), None);
        assert_eq!(t.poll(ms(4000)), Some(Fired { token: tok, count: 1 }));
    }

    #[test]
    fn cancel_stops_fires_and_kills_token() {
        let mut t = Ticker::new(ms(100));
        let tok = t.start(ms(0));
        t.cancel();
        assert!(!t.is_live(tok));
        assert_eq!(t.poll(ms(1000)), None);
    }

    #[test]
    fn restart_issues_new_token() {
        let mut t = Ticker::new(ms(100));
        let first = t.start(ms(0));
        let second = t.start(ms(50));
        assert_ne!(first, second);
        assert!(!t.is_live(first));
        assert!(t.is_live(second));
        // schedule restarted from 50ms
        assert_eq!(t.poll(ms(149)), None);
        assert_eq!(t.poll(ms(150)), Some(Fired { token: second, count: 1 }));
    }

    #[test]
    fn zero_interval_is_bumped() {
        let mut t = Ticker::new(Duration::ZERO);
        let token = t.start(ms(0));
        assert_eq!(t.poll(ms(3)), Some(Fired { token, count: 3 }));
    }
}
