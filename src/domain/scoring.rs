/// Score arithmetic for a single round.
///
/// The running round score lives in `[min_score, upper_bound]` where
/// `upper_bound = base_score + max_time_bonus`. Every operation here returns
/// a value already clamped to that range.

use crate::config::ScoringConfig;

/// Largest bonus a round can earn (answer at full remaining time).
pub fn max_time_bonus(rules: &ScoringConfig) -> u32 {
    time_bonus(rules.time_per_round, rules)
}

pub fn upper_bound(rules: &ScoringConfig) -> u32 {
    rules.base_score.saturating_add(max_time_bonus(rules))
}

pub fn clamp_score(score: i64, rules: &ScoringConfig) -> u32 {
    score.clamp(rules.min_score as i64, upper_bound(rules) as i64) as u32
}

/// One second of decay.
pub fn decay(score: u32, rules: &ScoringConfig) -> u32 {
    clamp_score(score as i64 - rules.time_decay_rate as i64, rules)
}

/// Wrong-guess penalty.
pub fn penalize(score: u32, rules: &ScoringConfig) -> u32 {
    clamp_score(score as i64 - rules.wrong_answer_penalty as i64, rules)
}

/// `floor(remaining * bonus_rate_per_second)`.
pub fn time_bonus(remaining_seconds: u32, rules: &ScoringConfig) -> u32 {
    (remaining_seconds as f64 * rules.bonus_rate_per_second).floor() as u32
}

/// Score awarded for a correct guess.
pub fn final_score(current: u32, remaining_seconds: u32, rules: &ScoringConfig) -> u32 {
    clamp_score(current as i64 + time_bonus(remaining_seconds, rules) as i64, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn rules() -> ScoringConfig {
        ScoringConfig {
            max_rounds: 10,
            time_per_round: 30,
            base_score: 100,
            time_decay_rate: 2,
            wrong_answer_penalty: 15,
            min_score: 10,
            bonus_rate_per_second: 2.0,
        }
    }

    #[test]
    fn upper_bound_is_base_plus_full_bonus() {
        assert_eq!(max_time_bonus(&rules()), 60);
        assert_eq!(upper_bound(&rules()), 160);
    }

    #[test]
    fn fractional_bonus_rate_floors() {
        let mut r = rules();
        r.bonus_rate_per_second = 1.5;
        assert_eq!(time_bonus(5, &r), 7);
        assert_eq!(upper_bound(&r), 145);
    }

    #[test]
    fn decay_floors_at_min() {
        let r = rules();
        assert_eq!(decay(100, &r), 98);
        assert_eq!(decay(11, &r), 10);
        assert_eq!(decay(10, &r), 10);
    }

    #[test]
    fn penalty_floors_at_min() {
        let r = rules();
        assert_eq!(penalize(100, &r), 85);
        assert_eq!(penalize(20, &r), 10);
    }

    #[test]
    fn answer_at_25_seconds_left() {
        let r = rules();
        let elapsed = 5;
        let mut score = r.base_score;
        for _ in 0..elapsed {
            score = decay(score, &r);
        }
        let expected = clamp_score(100 - elapsed * 2 + 25 * 2, &r);
        assert_eq!(final_score(score, 25, &r), expected);
        assert_eq!(expected, 140);
    }

    #[test]
    fn final_score_is_capped() {
        let mut r = rules();
        r.time_per_round = 10;
        // 100 + 30*2 would be 160 but the cap is 100 + 10*2
        assert_eq!(final_score(100, 30, &r), 120);
    }

    #[test]
    fn random_sequences_stay_in_range() {
        let r = rules();
        let mut rng = StdRng::seed_from_u64(0xC5);
        for _ in 0..200 {
            let mut score = r.base_score;
            for _ in 0..rng.gen_range(1..60) {
                score = match rng.gen_range(0..3) {
                    0 => decay(score, &r),
                    1 => penalize(score, &r),
                    _ => final_score(score, rng.gen_range(0..=r.time_per_round), &r),
                };
                assert!(score >= r.min_score && score <= upper_bound(&r), "score {score} out of range");
            }
        }
    }
}
