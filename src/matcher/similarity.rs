//! Sørensen–Dice bigram similarity (spec §4.1), via the same `strsim` crate
//! the `lrclib-extract` example depends on for fuzzy artist matching.

use strsim::sorensen_dice;

/// Returns 1.0 for exact equality, 0.0 if either operand is empty,
/// otherwise the Dice coefficient over character bigrams.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    if a == b {
        return 1.0;
    }
    sorensen_dice(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_one() {
        assert_eq!(similarity("hey jude", "hey jude"), 1.0);
    }

    #[test]
    fn empty_operand_is_zero() {
        assert_eq!(similarity("", "hey jude"), 0.0);
        assert_eq!(similarity("hey jude", ""), 0.0);
        assert_eq!(similarity("", ""), 0.0);
    }

    #[test]
    fn close_strings_score_high() {
        let score = similarity("yesterday", "yesteday");
        assert!(score > 0.8, "expected high similarity, got {score}");
    }

    #[test]
    fn dissimilar_strings_score_low() {
        let score = similarity("hey jude", "bohemian rhapsody");
        assert!(score < 0.3, "expected low similarity, got {score}");
    }
}
