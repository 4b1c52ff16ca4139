/// Progressive reveal of an N×N grid over an image.
///
/// Lifecycle per image source:
///   1. `reset(src)`     : new source: clear cells, cancel ticker, wait for load
///   2. `resolve(status)`: load finished (failure counts as degraded success),
///                          ticker starts
///   3. `poll(now, rng)` : each fire reveals one random hidden cell until
///                          `min(reveal_steps, cells)` are shown
///
/// `revealed` only grows while the source stays the same. Resetting with the
/// current source is a no-op, so re-rendering never restarts the animation.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::RevealConfig;
use super::asset::AssetStatus;
use super::scheduler::Ticker;

#[derive(Clone, Debug)]
pub struct RevealScheduler {
    grid_size: usize,
    reveal_steps: usize,
    ticker: Ticker,
    source: Option<String>,
    status: Option<AssetStatus>,
    revealed: Vec<usize>,
}

impl RevealScheduler {
    pub fn new(cfg: &RevealConfig) -> Self {
        RevealScheduler {
            grid_size: cfg.grid_size,
            reveal_steps: cfg.reveal_steps,
            ticker: Ticker::new(Duration::from_millis(cfg.interval_ms)),
            source: None,
            status: None,
            revealed: Vec::new(),
        }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn total_cells(&self) -> usize {
        self.grid_size * self.grid_size
    }

    /// Number of cells the animation will reveal in total.
    pub fn target(&self) -> usize {
        self.reveal_steps.min(self.total_cells())
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn status(&self) -> Option<AssetStatus> {
        self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_running()
    }

    /// Cells in reveal order.
    pub fn revealed(&self) -> &[usize] {
        &self.revealed
    }

    pub fn is_revealed(&self, cell: usize) -> bool {
        self.revealed.contains(&cell)
    }

    /// Percentage of the target shown, 0..=100.
    pub fn progress_percent(&self) -> u32 {
        let target = self.target();
        if target == 0 {
            return 100;
        }
        ((self.revealed.len() * 100) / target).min(100) as u32
    }

    /// Key the animation to a new image source. Returns true if state was reset.
    pub fn reset(&mut self, src: &str) -> bool {
        if self.source.as_deref() == Some(src) {
            return false;
        }
        self.ticker.cancel();
        self.source = Some(src.to_string());
        self.status = None;
        self.revealed.clear();
        true
    }

    /// Image load finished. The reveal proceeds whether or not it succeeded.
    /// Ignored when no source is set or a result was already recorded.
    pub fn resolve(&mut self, status: AssetStatus, now: Duration) -> bool {
        if self.source.is_none() || self.status.is_some() {
            return false;
        }
        self.status = Some(status);
        if self.revealed.len() < self.target() {
            self.ticker.start(now);
        }
        true
    }

    pub fn stop(&mut self) {
        self.ticker.cancel();
    }

    /// Drop source and cells entirely (match restart).
    pub fn clear(&mut self) {
        self.ticker.cancel();
        self.source = None;
        self.status = None;
        self.revealed.clear();
    }

    /// Reveal one cell per elapsed interval. Returns the newly revealed cells.
    pub fn poll<R: Rng + ?Sized>(&mut self, now: Duration, rng: &mut R) -> Vec<usize> {
        let fired = match self.ticker.poll(now) {
            Some(f) => f,
            None => return Vec::new(),
        };
        let mut fresh = Vec::new();
        for _ in 0..fired.count {
            if !self.ticker.is_live(fired.token) {
                break;
            }
            match self.reveal_one(rng) {
                Some(cell) => fresh.push(cell),
                None => self.ticker.cancel(),
            }
            if self.revealed.len() >= self.target() {
                self.ticker.cancel();
            }
        }
        fresh
    }

    fn reveal_one<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<usize> {
        if self.revealed.len() >= self.target() {
            return None;
        }
        let hidden: Vec<usize> = (0..self.total_cells())
            .filter(|c| !self.revealed.contains(c))
            .collect();
        let cell = *hidden.choose(rng)?;
        self.revealed.push(cell);
        Some(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn cfg(grid: usize, steps: usize) -> RevealConfig {
        RevealConfig { grid_size: grid, reveal_steps: steps, interval_ms: 1000 }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn nothing_happens_before_load() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut r = RevealScheduler::new(&cfg(5, 25));
        r.reset("a.png");
        assert!(r.poll(secs(100), &mut rng).is_empty());
        assert!(!r.is_ready());
    }

    #[test]
    fn reveals_one_cell_per_interval_without_repeats() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut r = RevealScheduler::new(&cfg(5, 25));
        r.reset("a.png");
        r.resolve(AssetStatus::Loaded, secs(0));
        let mut seen = Vec::new();
        for t in 1..=25 {
            let fresh = r.poll(secs(t), &mut rng);
            assert_eq!(fresh.len(), 1);
            assert!(!seen.contains(&fresh[0]));
            assert!(fresh[0] < 25);
            seen.extend(fresh);
            assert_eq!(r.revealed(), seen.as_slice());
        }
        assert!(!r.is_running());
        assert!(r.poll(secs(60), &mut rng).is_empty());
        assert_eq!(r.progress_percent(), 100);
    }

    #[test]
    fn stops_at_reveal_steps() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut r = RevealScheduler::new(&cfg(5, 7));
        r.reset("a.png");
        r.resolve(AssetStatus::Loaded, secs(0));
        let fresh = r.poll(secs(100), &mut rng);
        assert_eq!(fresh.len(), 7);
        assert_eq!(r.revealed().len(), 7);
        assert!(!r.is_running());
    }

    #[test]
    fn steps_larger_than_grid_cap_at_cell_count() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut r = RevealScheduler::new(&cfg(2, 25));
        assert_eq!(r.target(), 4);
        r.reset("a.png");
        r.resolve(AssetStatus::Loaded, secs(0));
        let mut fresh = r.poll(secs(100), &mut rng);
        fresh.sort_unstable();
        assert_eq!(fresh, vec![0, 1, 2, 3]);
    }

    #[test]
    fn failed_load_still_reveals() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut r = RevealScheduler::new(&cfg(5, 25));
        r.reset("missing.png");
        assert!(r.resolve(AssetStatus::Failed, secs(0)));
        assert_eq!(r.status(), Some(AssetStatus::Failed));
        assert_eq!(r.poll(secs(2), &mut rng).len(), 2);
    }

    #[test]
    fn same_source_does_not_restart() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut r = RevealScheduler::new(&cfg(5, 25));
        r.reset("a.png");
        r.resolve(AssetStatus::Loaded, secs(0));
        r.poll(secs(3), &mut rng);
        assert!(!r.reset("a.png"));
        assert_eq!(r.revealed().len(), 3);
    }

    #[test]
    fn new_source_resets_and_waits() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut r = RevealScheduler::new(&cfg(5, 25));
        r.reset("a.png");
        r.resolve(AssetStatus::Loaded, secs(0));
        r.poll(secs(3), &mut rng);
        assert!(r.reset("b.png"));
        assert!(r.revealed().is_empty());
        assert!(!r.is_ready());
        assert!(r.poll(secs(10), &mut rng).is_empty());
    }

    #[test]
    fn second_resolve_ignored() {
        let mut r = RevealScheduler::new(&cfg(5, 25));
        r.reset("a.png");
        assert!(r.resolve(AssetStatus::Loaded, secs(0)));
        assert!(!r.resolve(AssetStatus::Failed, secs(1)));
        assert_eq!(r.status(), Some(AssetStatus::Loaded));
    }

    #[test]
    fn stop_freezes_cells() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut r = RevealScheduler::new(&cfg(5, 25));
        r.reset("a.png");
        r.resolve(AssetStatus::Loaded, secs(0));
        r.poll(secs(2), &mut rng);
        r.stop();
        assert!(r.poll(secs(20), &mut rng).is_empty());
        assert_eq!(r.revealed().len(), 2);
    }
}
