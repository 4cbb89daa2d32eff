//! Breached-password lookup over the k-anonymity range protocol.
//!
//! A password is hashed with SHA-1, and only the first 5 hex characters of
//! the digest leave the process. The transport returns every known suffix
//! under that prefix with its breach count; the match is decided locally.
//! Network access is behind [`RangeTransport`], so this module stays free
//! of HTTP concerns and the lookup degrades to [`BreachStatus::Unknown`]
//! when the transport fails.

use ring::digest;

use crate::error::VaultError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Hex characters of the digest sent to the transport.
const PREFIX_LEN: usize = 5;

/// Hex characters of a full SHA-1 digest.
const DIGEST_HEX_LEN: usize = 40;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Outcome of a breach lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreachStatus {
    /// The password does not appear in the breach corpus.
    Clear,
    /// The password appears, with the number of observations.
    Found(u32),
    /// The lookup could not be completed; no claim either way.
    Unknown,
}

/// Fetches the suffix list for a 5-character digest prefix.
///
/// Implementations own the actual I/O (HTTP client, fixture file, cache).
pub trait RangeTransport {
    /// Return the raw range response body for `prefix`: one
    /// `SUFFIX:COUNT` pair per line.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup cannot be completed.
    fn fetch_range(&self, prefix: &str) -> Result<String, VaultError>;
}

/// Breach lookup over an injected [`RangeTransport`].
#[derive(Debug)]
pub struct BreachChecker<T: RangeTransport> {
    transport: T,
}

// ---------------------------------------------------------------------------
// Protocol helpers
// ---------------------------------------------------------------------------

/// SHA-1 the password and split the uppercase hex digest into
/// `(prefix, suffix)` — 5 and 35 characters.
#[must_use]
pub fn hash_prefix(password: &str) -> (String, String) {
    let digest = digest::digest(&digest::SHA1_FOR_LEGACY_USE_ONLY, password.as_bytes());
    let hex = data_encoding::HEXUPPER.encode(digest.as_ref());
    debug_assert_eq!(hex.len(), DIGEST_HEX_LEN);
    let (prefix, suffix) = hex.split_at(PREFIX_LEN);
    (prefix.to_owned(), suffix.to_owned())
}

/// Scan a range response for `suffix` and return its breach count.
///
/// Lines look like `0018A45C4D1DEF81644B54AB7F969B88D65:3`. Matching is
/// case-insensitive; malformed lines are skipped.
#[must_use]
pub fn parse_range_response(body: &str, suffix: &str) -> BreachStatus {
    for line in body.lines() {
        let Some((candidate, count)) = line.trim().split_once(':') else {
            continue;
        };
        if candidate.eq_ignore_ascii_case(suffix) {
            return match count.trim().parse::<u32>() {
                Ok(n) => BreachStatus::Found(n),
                Err(_) => BreachStatus::Unknown,
            };
        }
    }
    BreachStatus::Clear
}

// ---------------------------------------------------------------------------
// Implementation
// ---------------------------------------------------------------------------

impl<T: RangeTransport> BreachChecker<T> {
    /// Create a checker over the given transport.
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Look up `password` in the breach corpus.
    ///
    /// Transport failure is not an error to the caller; it reports as
    /// [`BreachStatus::Unknown`].
    #[must_use]
    pub fn check(&self, password: &str) -> BreachStatus {
        let (prefix, suffix) = hash_prefix(password);
        match self.transport.fetch_range(&prefix) {
            Ok(body) => parse_range_response(&body, &suffix),
            Err(_) => BreachStatus::Unknown,
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
