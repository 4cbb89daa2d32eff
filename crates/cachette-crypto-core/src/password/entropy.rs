//! Password strength estimation.
//!
//! Entropy is modeled as `length × log2(pool)`, where the pool size is
//! inferred from the character classes present in the string. This is the
//! standard brute-force-search estimate; it does not attempt dictionary or
//! pattern analysis.

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Entropy threshold (in bits) separating [`Strength::Weak`] from
/// [`Strength::Strong`]. Policy constant, not derived.
pub const STRONG_THRESHOLD_BITS: f64 = 60.0;

// Inferred pool sizes per character class.
const POOL_LOWERCASE: u32 = 26;
const POOL_UPPERCASE: u32 = 26;
const POOL_DIGITS: u32 = 10;
const POOL_SYMBOLS: u32 = 32;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Strength label derived from estimated entropy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strength {
    /// Below [`STRONG_THRESHOLD_BITS`] bits.
    Weak,
    /// At or above [`STRONG_THRESHOLD_BITS`] bits.
    Strong,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Estimate the entropy of `secret` in bits.
///
/// The per-character pool is the sum of the sizes of the character classes
/// that actually appear: lowercase (26), uppercase (26), digits (10), and
/// everything else (32). An empty string scores 0.
#[must_use]
pub fn estimate_entropy_bits(secret: &str) -> f64 {
    if secret.is_empty() {
        return 0.0;
    }

    let mut has_lower = false;
    let mut has_upper = false;
    let mut has_digit = false;
    let mut has_other = false;

    for c in secret.chars() {
        if c.is_ascii_lowercase() {
            has_lower = true;
        } else if c.is_ascii_uppercase() {
            has_upper = true;
        } else if c.is_ascii_digit() {
            has_digit = true;
        } else {
            has_other = true;
        }
    }

    let mut pool: u32 = 0;
    if has_lower {
        pool = pool.saturating_add(POOL_LOWERCASE);
    }
    if has_upper {
        pool = pool.saturating_add(POOL_UPPERCASE);
    }
    if has_digit {
        pool = pool.saturating_add(POOL_DIGITS);
    }
    if has_other {
        pool = pool.saturating_add(POOL_SYMBOLS);
    }

    let length = secret.chars().count();
    // f64 has 52 mantissa bits; password lengths and pool sizes are far
    // below any precision loss.
    #[allow(clippy::cast_precision_loss)]
    let bits = (length as f64) * f64::from(pool).log2();
    bits
}

/// Classify `secret` against [`STRONG_THRESHOLD_BITS`].
#[must_use]
pub fn strength_of(secret: &str) -> Strength {
    if estimate_entropy_bits(secret) < STRONG_THRESHOLD_BITS {
        Strength::Weak
    } else {
        Strength::Strong
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_scores_zero() {
        assert!((estimate_entropy_bits("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_class_pool_is_26() {
        // 4 lowercase chars: 4 × log2(26) ≈ 18.8 bits.
        let bits = estimate_entropy_bits("aaaa");
        assert!((bits - 4.0 * 26f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn mixed_classes_beat_single_class_at_equal_length() {
        let single = estimate_entropy_bits("aaaaaaaaaaaaaaaa");
        let mixed = estimate_entropy_bits("aB3$xQ9!mK2@pL7#");
        assert_eq!("aaaaaaaaaaaaaaaa".len(), "aB3$xQ9!mK2@pL7#".len());
        assert!(mixed > single);
    }

    #[test]
    fn repetition_does_not_reduce_estimate() {
        // Length × pool is blind to repetition; same classes, same length,
        // same score.
        let a = estimate_entropy_bits("abababab");
        let b = estimate_entropy_bits("aqzwsxed");
        assert!((a - b).abs() < f64::EPSILON);
    }

    #[test]
    fn full_pool_is_94() {
        // lower + upper + digit + symbol: 26 + 26 + 10 + 32.
        let bits = estimate_entropy_bits("aA1!");
        assert!((bits - 4.0 * 94f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn short_password_is_weak() {
        assert_eq!(strength_of("aB3$x"), Strength::Weak);
    }

    #[test]
    fn long_mixed_password_is_strong() {
        // 16 chars over a 94 pool ≈ 104.9 bits.
        assert_eq!(strength_of("aB3$xQ9!mK2@pL7#"), Strength::Strong);
    }

    #[test]
    fn threshold_boundary() {
        // 13 lowercase chars: 13 × log2(26) ≈ 61.1 bits — just Strong.
        assert_eq!(strength_of("abcdefghijklm"), Strength::Strong);
        // 12 lowercase chars: ≈ 56.4 bits — Weak.
        assert_eq!(strength_of("abcdefghijkl"), Strength::Weak);
    }

    #[test]
    fn non_ascii_counts_as_symbol_class() {
        let bits = estimate_entropy_bits("éééé");
        assert!((bits - 4.0 * 32f64.log2()).abs() < 1e-9);
    }
}
