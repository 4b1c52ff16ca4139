/// Name normalization for guess comparison.
///
/// Three forms are produced from any input:
///   - `normalize_name`: lowercase, leetspeak digits folded to letters, trimmed.
///   - `alpha_only`    : the normalized form with every non `a-z` char removed.
///   - `phonetic`      : the alpha-only form with `y` folded to `i`, so a
///                        `1` typed for a `y` ("z1w00") still lines up.
///
/// All are total: any string (including "") maps to a comparison key.

/// Leetspeak fold table, applied after lowercasing.
const LEET: [(char, char); 6] = [
    ('0', 'o'),
    ('1', 'i'),
    ('3', 'e'),
    ('4', 'a'),
    ('5', 's'),
    ('7', 't'),
];

fn unleet(c: char) -> char {
    LEET.iter()
        .find(|&&(digit, _)| digit == c)
        .map(|&(_, letter)| letter)
        .unwrap_or(c)
}

/// Canonical comparison string for a guess or a player name.
pub fn normalize_name(raw: &str) -> String {
    let folded: String = raw.to_lowercase().chars().map(unleet).collect();
    folded.trim().to_string()
}

/// Stricter key: normalized form restricted to ASCII lowercase letters.
/// Spaces, punctuation, remaining digits and non-ASCII letters are dropped.
pub fn alpha_only(normalized: &str) -> String {
    normalized.chars().filter(|c| c.is_ascii_lowercase()).collect()
}

/// Loosest key: alpha-only with `y` treated as `i`.
pub fn phonetic(alpha: &str) -> String {
    alpha.chars().map(|c| if c == 'y' { 'i' } else { c }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize_name("  NiKo  "), "niko");
    }

    #[test]
    fn folds_every_leet_digit() {
        assert_eq!(normalize_name("0134 57"), "oiea st");
        assert_eq!(normalize_name("Z1W00"), "ziwoo");
    }

    #[test]
    fn leaves_unmapped_digits() {
        assert_eq!(normalize_name("b1t2"), "bit2");
    }

    #[test]
    fn empty_input_is_fine() {
        assert_eq!(normalize_name(""), "");
        assert_eq!(alpha_only(""), "");
    }

    #[test]
    fn alpha_only_strips_spaces_and_punctuation() {
        assert_eq!(alpha_only(&normalize_name("huNter-")), "hunter");
        assert_eq!(alpha_only(&normalize_name("m0 NE-SY!")), "monesy");
        assert_eq!(alpha_only("dev9ice"), "device");
    }

    #[test]
    fn phonetic_folds_y() {
        assert_eq!(phonetic("zywoo"), "ziwoo");
        assert_eq!(phonetic(&alpha_only(&normalize_name("Z1W00"))), "ziwoo");
    }
}
