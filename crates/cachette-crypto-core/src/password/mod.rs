//! Candidate secret generation and strength estimation.
//!
//! Three generation strategies behind [`GeneratorStrategy`]:
//! - [`generate_random_password`] — uniform sample from configurable charsets
//! - [`generate_segmented`] — grouped alphanumeric blocks (`Xk9mP-2qRw7-...`)
//! - [`generate_passphrase`] — words drawn from the embedded wordlist
//!
//! All randomness comes from `OsRng` (OS-level CSPRNG). Strength scoring
//! lives in [`entropy`].

pub mod entropy;
pub mod wordlist;

pub use entropy::{estimate_entropy_bits, strength_of, Strength, STRONG_THRESHOLD_BITS};

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::CryptoError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum allowed password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum allowed password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Default password length.
pub const DEFAULT_PASSWORD_LENGTH: usize = 20;

/// Minimum allowed passphrase word count.
pub const MIN_WORD_COUNT: usize = 3;

/// Maximum allowed passphrase word count.
pub const MAX_WORD_COUNT: usize = 10;

/// Default passphrase word count.
pub const DEFAULT_WORD_COUNT: usize = 5;

/// Minimum allowed segment count for segmented passwords.
pub const MIN_SEGMENT_COUNT: usize = 2;

/// Maximum allowed segment count for segmented passwords.
pub const MAX_SEGMENT_COUNT: usize = 8;

/// Default segment count for segmented passwords.
pub const DEFAULT_SEGMENT_COUNT: usize = 4;

/// Length of each alphanumeric segment.
pub const SEGMENT_LENGTH: usize = 5;

// Character sets
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%^&*()-_=+[]{}|;:',.<>?/~";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Configuration for which character sets to include in a random password.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharsetConfig {
    /// Include uppercase letters (A-Z).
    pub uppercase: bool,
    /// Include lowercase letters (a-z).
    pub lowercase: bool,
    /// Include digits (0-9).
    pub digits: bool,
    /// Include symbols (!@#$%^&*...).
    pub symbols: bool,
}

impl Default for CharsetConfig {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            digits: true,
            symbols: true,
        }
    }
}

/// Separator between words in a passphrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PassphraseSeparator {
    /// Hyphen: `word-word-word`
    Hyphen,
    /// Space: `word word word`
    Space,
    /// Dot: `word.word.word`
    Dot,
    /// Underscore: `word_word_word`
    Underscore,
    /// No separator: `wordwordword`
    None,
}

impl PassphraseSeparator {
    /// Returns the string representation of this separator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hyphen => "-",
            Self::Space => " ",
            Self::Dot => ".",
            Self::Underscore => "_",
            Self::None => "",
        }
    }
}

/// A secret-generation strategy with its parameters.
///
/// All variants produce a `String` via [`GeneratorStrategy::generate`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", tag = "strategy")]
pub enum GeneratorStrategy {
    /// Uniform character sample from the enabled charsets.
    Random {
        /// Total password length.
        length: usize,
        /// Which character classes to draw from.
        charsets: CharsetConfig,
    },
    /// Hyphen-joined alphanumeric blocks of [`SEGMENT_LENGTH`] characters.
    Segmented {
        /// Number of blocks.
        segments: usize,
    },
    /// Words drawn uniformly from the embedded wordlist.
    Passphrase {
        /// Number of words.
        word_count: usize,
        /// Separator between words.
        separator: PassphraseSeparator,
        /// Capitalize the first letter of each word.
        capitalize: bool,
        /// Append a random digit (0-9) to the end.
        append_digit: bool,
    },
}

impl GeneratorStrategy {
    /// Generate a candidate secret under this strategy.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::PasswordGeneration`] if the strategy's
    /// parameters are out of range.
    pub fn generate(&self) -> Result<String, CryptoError> {
        match self {
            Self::Random { length, charsets } => generate_random_password(*length, charsets),
            Self::Segmented { segments } => generate_segmented(*segments),
            Self::Passphrase {
                word_count,
                separator,
                capitalize,
                append_digit,
            } => generate_passphrase(*word_count, *separator, *capitalize, *append_digit),
        }
    }
}

impl Default for GeneratorStrategy {
    fn default() -> Self {
        Self::Random {
            length: DEFAULT_PASSWORD_LENGTH,
            charsets: CharsetConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Generate a random password of the given `length` using the specified charsets.
///
/// At least one character from each enabled charset is guaranteed.
/// The remaining positions are filled randomly, then the whole password is
/// Fisher-Yates shuffled to avoid positional bias.
///
/// # Errors
///
/// Returns [`CryptoError::PasswordGeneration`] if:
/// - `length` is outside [`MIN_PASSWORD_LENGTH`]..=[`MAX_PASSWORD_LENGTH`]
/// - No charset is enabled
/// - `length` is less than the number of enabled charsets (can't guarantee one from each)
pub fn generate_random_password(
    length: usize,
    charsets: &CharsetConfig,
) -> Result<String, CryptoError> {
    if !(MIN_PASSWORD_LENGTH..=MAX_PASSWORD_LENGTH).contains(&length) {
        return Err(CryptoError::PasswordGeneration(format!(
            "length must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH}, got {length}"
        )));
    }

    // Build the character pool and collect mandatory characters.
    let mut pool: Vec<u8> = Vec::new();
    let mut mandatory: Vec<u8> = Vec::new();
    let mut rng = rand::rngs::OsRng;

    if charsets.uppercase {
        pool.extend_from_slice(UPPERCASE);
        mandatory.push(UPPERCASE[rng.gen_range(0..UPPERCASE.len())]);
    }
    if charsets.lowercase {
        pool.extend_from_slice(LOWERCASE);
        mandatory.push(LOWERCASE[rng.gen_range(0..LOWERCASE.len())]);
    }
    if charsets.digits {
        pool.extend_from_slice(DIGITS);
        mandatory.push(DIGITS[rng.gen_range(0..DIGITS.len())]);
    }
    if charsets.symbols {
        pool.extend_from_slice(SYMBOLS);
        mandatory.push(SYMBOLS[rng.gen_range(0..SYMBOLS.len())]);
    }

    if pool.is_empty() {
        return Err(CryptoError::PasswordGeneration(
            "at least one charset must be enabled".to_string(),
        ));
    }

    if length < mandatory.len() {
        return Err(CryptoError::PasswordGeneration(format!(
            "length ({length}) must be at least {} to include one character from each enabled charset",
            mandatory.len()
        )));
    }

    // Fill the password: mandatory chars first, then random from the full pool.
    let mut chars: Vec<u8> = mandatory;
    for _ in chars.len()..length {
        chars.push(pool[rng.gen_range(0..pool.len())]);
    }

    // Fisher-Yates shuffle to eliminate positional bias.
    chars.shuffle(&mut rng);

    String::from_utf8(chars)
        .map_err(|_| CryptoError::PasswordGeneration("non-ASCII password bytes".to_string()))
}

/// Generate a segmented password: `segments` blocks of [`SEGMENT_LENGTH`]
/// alphanumeric characters joined by hyphens, e.g. `Xk9mP-2qRw7-fT4nB`.
///
/// Easier to read aloud and retype than a fully random string, at the cost
/// of a smaller per-character pool (no symbols).
///
/// # Errors
///
/// Returns [`CryptoError::PasswordGeneration`] if `segments` is outside
/// [`MIN_SEGMENT_COUNT`]..=[`MAX_SEGMENT_COUNT`].
pub fn generate_segmented(segments: usize) -> Result<String, CryptoError> {
    if !(MIN_SEGMENT_COUNT..=MAX_SEGMENT_COUNT).contains(&segments) {
        return Err(CryptoError::PasswordGeneration(format!(
            "segment count must be between {MIN_SEGMENT_COUNT} and {MAX_SEGMENT_COUNT}, got {segments}"
        )));
    }

    let mut pool: Vec<u8> = Vec::with_capacity(62);
    pool.extend_from_slice(UPPERCASE);
    pool.extend_from_slice(LOWERCASE);
    pool.extend_from_slice(DIGITS);

    let mut rng = rand::rngs::OsRng;
    let blocks: Vec<String> = (0..segments)
        .map(|_| {
            (0..SEGMENT_LENGTH)
                .map(|_| char::from(pool[rng.gen_range(0..pool.len())]))
                .collect()
        })
        .collect();

    Ok(blocks.join("-"))
}

/// Generate a passphrase from the embedded wordlist.
///
/// # Arguments
///
/// * `word_count` — Number of words ([`MIN_WORD_COUNT`]..=[`MAX_WORD_COUNT`]).
/// * `separator` — Separator between words.
/// * `capitalize` — Capitalize the first letter of each word.
/// * `append_digit` — Append a random digit (0-9) to the end.
///
/// # Errors
///
/// Returns [`CryptoError::PasswordGeneration`] if `word_count` is outside the allowed range.
pub fn generate_passphrase(
    word_count: usize,
    separator: PassphraseSeparator,
    capitalize: bool,
    append_digit: bool,
) -> Result<String, CryptoError> {
    if !(MIN_WORD_COUNT..=MAX_WORD_COUNT).contains(&word_count) {
        return Err(CryptoError::PasswordGeneration(format!(
            "word count must be between {MIN_WORD_COUNT} and {MAX_WORD_COUNT}, got {word_count}"
        )));
    }

    let words_pool = wordlist::words();
    let mut rng = rand::rngs::OsRng;

    let words: Vec<String> = (0..word_count)
        .map(|_| {
            let word = words_pool[rng.gen_range(0..words_pool.len())];
            if capitalize {
                let mut chars = word.chars();
                chars.next().map_or_else(String::new, |c| {
                    c.to_uppercase().collect::<String>() + chars.as_str()
                })
            } else {
                word.to_string()
            }
        })
        .collect();

    let mut result = words.join(separator.as_str());

    if append_digit {
        result.push(char::from(DIGITS[rng.gen_range(0..DIGITS.len())]));
    }

    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // ── Random password tests ──────────────────────────────────────

    #[test]
    fn default_length_password() {
        let pw =
            generate_random_password(DEFAULT_PASSWORD_LENGTH, &CharsetConfig::default()).unwrap();
        assert_eq!(pw.len(), DEFAULT_PASSWORD_LENGTH);
    }

    #[test]
    fn min_length_password() {
        let pw = generate_random_password(MIN_PASSWORD_LENGTH, &CharsetConfig::default()).unwrap();
        assert_eq!(pw.len(), MIN_PASSWORD_LENGTH);
    }

    #[test]
    fn max_length_password() {
        let pw = generate_random_password(MAX_PASSWORD_LENGTH, &CharsetConfig::default()).unwrap();
        assert_eq!(pw.len(), MAX_PASSWORD_LENGTH);
    }

    #[test]
    fn below_min_rejected() {
        let result = generate_random_password(MIN_PASSWORD_LENGTH - 1, &CharsetConfig::default());
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("length must be between"));
    }

    #[test]
    fn above_max_rejected() {
        let result = generate_random_password(MAX_PASSWORD_LENGTH + 1, &CharsetConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn no_charset_error() {
        let charsets = CharsetConfig {
            uppercase: false,
            lowercase: false,
            digits: false,
            symbols: false,
        };
        let result = generate_random_password(20, &charsets);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("at least one charset"));
    }

    #[test]
    fn contains_all_enabled_charsets() {
        // Generate 50 passwords and verify each contains at least one from each charset.
        for _ in 0..50 {
            let pw = generate_random_password(20, &CharsetConfig::default()).unwrap();
            assert!(
                pw.chars().any(|c| c.is_ascii_uppercase()),
                "missing uppercase in: {pw}"
            );
            assert!(
                pw.chars().any(|c| c.is_ascii_lowercase()),
                "missing lowercase in: {pw}"
            );
            assert!(
                pw.chars().any(|c| c.is_ascii_digit()),
                "missing digit in: {pw}"
            );
            assert!(
                pw.chars().any(|c| !c.is_ascii_alphanumeric()),
                "missing symbol in: {pw}"
            );
        }
    }

    #[test]
    fn digits_only() {
        let charsets = CharsetConfig {
            uppercase: false,
            lowercase: false,
            digits: true,
            symbols: false,
        };
        let pw = generate_random_password(20, &charsets).unwrap();
        assert!(
            pw.chars().all(|c| c.is_ascii_digit()),
            "not all digits: {pw}"
        );
    }

    #[test]
    fn symbols_only() {
        let charsets = CharsetConfig {
            uppercase: false,
            lowercase: false,
            digits: false,
            symbols: true,
        };
        let pw = generate_random_password(20, &charsets).unwrap();
        let symbol_set: HashSet<u8> = SYMBOLS.iter().copied().collect();
        assert!(
            pw.bytes().all(|b| symbol_set.contains(&b)),
            "not all symbols: {pw}"
        );
    }

    #[test]
    fn uniqueness_random() {
        let passwords: HashSet<String> = (0..100)
            .map(|_| generate_random_password(20, &CharsetConfig::default()).unwrap())
            .collect();
        assert_eq!(passwords.len(), 100, "generated duplicate passwords");
    }

    // ── Segmented tests ────────────────────────────────────────────

    #[test]
    fn segmented_has_expected_shape() {
        let pw = generate_segmented(DEFAULT_SEGMENT_COUNT).unwrap();
        let blocks: Vec<&str> = pw.split('-').collect();
        assert_eq!(blocks.len(), DEFAULT_SEGMENT_COUNT);
        for block in blocks {
            assert_eq!(block.len(), SEGMENT_LENGTH);
            assert!(
                block.chars().all(|c| c.is_ascii_alphanumeric()),
                "non-alphanumeric block in: {pw}"
            );
        }
    }

    #[test]
    fn segmented_bounds_enforced() {
        assert!(generate_segmented(MIN_SEGMENT_COUNT - 1).is_err());
        assert!(generate_segmented(MAX_SEGMENT_COUNT + 1).is_err());
        assert!(generate_segmented(MIN_SEGMENT_COUNT).is_ok());
        assert!(generate_segmented(MAX_SEGMENT_COUNT).is_ok());
    }

    #[test]
    fn uniqueness_segmented() {
        let passwords: HashSet<String> = (0..100)
            .map(|_| generate_segmented(4).unwrap())
            .collect();
        assert_eq!(passwords.len(), 100, "generated duplicate passwords");
    }

    // ── Passphrase tests ───────────────────────────────────────────

    #[test]
    fn default_passphrase() {
        let pp = generate_passphrase(
            DEFAULT_WORD_COUNT,
            PassphraseSeparator::Hyphen,
            false,
            false,
        )
        .unwrap();
        let word_count = pp.split('-').count();
        assert_eq!(word_count, DEFAULT_WORD_COUNT);
    }

    #[test]
    fn below_min_word_count_rejected() {
        let result = generate_passphrase(
            MIN_WORD_COUNT - 1,
            PassphraseSeparator::Hyphen,
            false,
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn above_max_word_count_rejected() {
        let result = generate_passphrase(
            MAX_WORD_COUNT + 1,
            PassphraseSeparator::Hyphen,
            false,
            false,
        );
        assert!(result.is_err());
    }

    #[test]
    fn passphrase_capitalize() {
        let pp = generate_passphrase(5, PassphraseSeparator::Hyphen, true, false).unwrap();
        for word in pp.split('-') {
            let first = word.chars().next().unwrap();
            assert!(first.is_uppercase(), "word '{word}' is not capitalized");
        }
    }

    #[test]
    fn passphrase_append_digit() {
        let pp = generate_passphrase(5, PassphraseSeparator::Hyphen, false, true).unwrap();
        let last = pp.chars().last().unwrap();
        assert!(last.is_ascii_digit(), "last char '{last}' is not a digit");
    }

    #[test]
    fn passphrase_all_separators() {
        let cases = [
            (PassphraseSeparator::Hyphen, '-'),
            (PassphraseSeparator::Space, ' '),
            (PassphraseSeparator::Dot, '.'),
            (PassphraseSeparator::Underscore, '_'),
        ];
        for (sep, ch) in &cases {
            let pp = generate_passphrase(5, *sep, false, false).unwrap();
            assert!(
                pp.contains(*ch),
                "passphrase with {sep:?} separator missing '{ch}': {pp}"
            );
        }
    }

    #[test]
    fn passphrase_no_separator() {
        let pp = generate_passphrase(3, PassphraseSeparator::None, false, false).unwrap();
        // No separator — should be one continuous lowercase string.
        assert!(
            pp.chars().all(|c| c.is_ascii_lowercase()),
            "passphrase with no separator has unexpected chars: {pp}"
        );
    }

    #[test]
    fn uniqueness_passphrase() {
        let passphrases: HashSet<String> = (0..100)
            .map(|_| generate_passphrase(5, PassphraseSeparator::Hyphen, false, false).unwrap())
            .collect();
        assert_eq!(passphrases.len(), 100, "generated duplicate passphrases");
    }

    // ── Strategy dispatch ──────────────────────────────────────────

    #[test]
    fn strategy_dispatch_produces_matching_output() {
        let random = GeneratorStrategy::Random {
            length: 16,
            charsets: CharsetConfig::default(),
        };
        assert_eq!(random.generate().unwrap().len(), 16);

        let segmented = GeneratorStrategy::Segmented { segments: 3 };
        let pw = segmented.generate().unwrap();
        assert_eq!(pw.split('-').count(), 3);

        let passphrase = GeneratorStrategy::Passphrase {
            word_count: 4,
            separator: PassphraseSeparator::Dot,
            capitalize: false,
            append_digit: false,
        };
        assert_eq!(passphrase.generate().unwrap().split('.').count(), 4);
    }

    #[test]
    fn strategy_serde_roundtrip() {
        let strategy = GeneratorStrategy::Passphrase {
            word_count: 5,
            separator: PassphraseSeparator::Hyphen,
            capitalize: true,
            append_digit: true,
        };
        let json = serde_json::to_string(&strategy).unwrap();
        assert!(json.contains("\"strategy\""));
        let back: GeneratorStrategy = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            back,
            GeneratorStrategy::Passphrase { word_count: 5, .. }
        ));
    }
}
