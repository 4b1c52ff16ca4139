/// Tolerant answer matching.
///
/// Strategies, first hit wins:
///   1. normalized exact match
///   2. guess contained in name   (guess longer than 2 chars)
///   3. name contained in guess   (name longer than 2 chars)
///   4. steps 1-3 again on the alphabetic-only keys
///   5. steps 1-3 once more on the phonetic keys (`y` read as `i`)
///
/// Cheap heuristic, not an edit-distance matcher. Short fragments (<= 2 chars)
/// never match by containment so "ab" cannot hit "abandon".

use super::normalize::{alpha_only, normalize_name, phonetic};

/// Minimum length (exclusive) a fragment needs to match by containment.
const MIN_FRAGMENT: usize = 2;

fn keys_match(guess: &str, name: &str) -> bool {
    if guess == name {
        return true;
    }
    if guess.chars().count() > MIN_FRAGMENT && name.contains(guess) {
        return true;
    }
    name.chars().count() > MIN_FRAGMENT && guess.contains(name)
}

/// Does `guess` identify the player called `name`?
pub fn is_accepted(guess: &str, name: &str) -> bool {
    let guess = normalize_name(guess);
    let name = normalize_name(name);
    if keys_match(&guess, &name) {
        return true;
    }
    let guess = alpha_only(&guess);
    let name = alpha_only(&name);
    if keys_match(&guess, &name) {
        return true;
    }
    keys_match(&phonetic(&guess), &phonetic(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflexive_for_any_name() {
        for name in ["ZywOo", "s1mple", "NiKo", "huNter-", "", "a", "k0nfig"] {
            assert!(is_accepted(name, name), "{name} should match itself");
        }
    }

    #[test]
    fn leetspeak_guess_matches() {
        assert!(is_accepted("z1w00", "ZywOo"));
        assert!(is_accepted("zyw00", "ZywOo"));
        assert!(is_accepted("Zyw0o", "ZywOo"));
    }

    #[test]
    fn case_insensitive_exact() {
        assert!(is_accepted("Niko", "NiKo"));
        assert!(is_accepted("NIKO", "niko"));
    }

    #[test]
    fn identical_leet_names() {
        assert!(is_accepted("s1mple", "s1mple"));
        assert!(is_accepted("simple", "s1mple"));
    }

    #[test]
    fn short_fragment_is_blocked() {
        assert!(!is_accepted("ab", "abandon"));
        assert!(!is_accepted("z", "ZywOo"));
    }

    #[test]
    fn partial_guess_matches() {
        assert!(is_accepted("zyw", "ZywOo"));
        assert!(is_accepted("dev", "device"));
    }

    #[test]
    fn guess_with_extra_text_matches() {
        assert!(is_accepted("niko the goat", "NiKo"));
    }

    #[test]
    fn short_name_not_found_inside_long_guess() {
        // name of length 2 never matches by reverse containment
        assert!(!is_accepted("box", "bo"));
    }

    #[test]
    fn punctuation_only_difference_matches_on_alpha_pass() {
        assert!(is_accepted("hunter", "huNter-"));
        assert!(is_accepted("m0-nesy", "m0NESY"));
        assert!(is_accepted("b.1.t", "b1t"));
    }

    #[test]
    fn unrelated_guess_rejected() {
        assert!(!is_accepted("device", "ZywOo"));
        assert!(!is_accepted("", "ZywOo"));
    }
}
