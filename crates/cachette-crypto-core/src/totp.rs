//! RFC 6238 TOTP and RFC 4226 HOTP generation.
//!
//! One-time codes are computed with `ring::hmac`. Shared secrets arrive as
//! Base32 strings from provisioning URIs; [`decode_base32`] validates them
//! strictly (RFC 4648 alphabet, legal padding, minimum decoded length)
//! before any code is generated.

use ring::hmac;
use zeroize::Zeroize;

use crate::CryptoError;

// ── Constants ───────────────────────────────────────────────────────

/// Default TOTP period in seconds (RFC 6238 §4).
pub const DEFAULT_PERIOD: u32 = 30;

/// Time-step window for TOTP validation (±1 step per RFC 6238 §5.2).
pub const TOTP_WINDOW: u32 = 1;

/// Minimum decoded secret length in bytes (80 bits, RFC 4226 §4 R6).
const MIN_SECRET_LEN: usize = 10;

/// Constant-time byte comparison for OTP codes.
///
/// The early return on length mismatch is acceptable: the digit count
/// (6 or 8) is public. The constant-time property protects the code value.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

// ── Types ───────────────────────────────────────────────────────────

/// HMAC algorithm used for OTP generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtpAlgorithm {
    /// HMAC-SHA1 (default for most authenticator apps).
    Sha1,
    /// HMAC-SHA256.
    Sha256,
    /// HMAC-SHA512.
    Sha512,
}

impl OtpAlgorithm {
    fn to_ring_algorithm(self) -> hmac::Algorithm {
        match self {
            Self::Sha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            Self::Sha256 => hmac::HMAC_SHA256,
            Self::Sha512 => hmac::HMAC_SHA512,
        }
    }
}

/// Number of digits in an OTP code (6 or 8 only).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OtpDigits {
    /// 6-digit code (standard).
    Six,
    /// 8-digit code.
    Eight,
}

impl OtpDigits {
    /// Return the numeric digit count.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::Six => 6,
            Self::Eight => 8,
        }
    }

    /// Return the modulus (10^digits) for truncation.
    const fn modulus(self) -> u32 {
        match self {
            Self::Six => 1_000_000,
            Self::Eight => 100_000_000,
        }
    }
}

// ── Base32 secret validation ────────────────────────────────────────

/// Decode and validate a Base32-encoded shared secret.
///
/// Accepts the RFC 4648 alphabet `[A-Z2-7]` with optional trailing `=`
/// padding. Legal padding lengths are 0, 1, 3, 4, or 6 characters, and a
/// padded secret must be a whole number of 8-character blocks. The decoded
/// secret must be at least 10 bytes.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedSecret`] naming the violated rule; this
/// is user-input validation, so the reason is surfaced.
pub fn decode_base32(secret: &str) -> Result<Vec<u8>, CryptoError> {
    if secret.is_empty() {
        return Err(CryptoError::MalformedSecret("secret is empty".into()));
    }

    let trimmed = secret.trim_end_matches('=');
    let pad_len = secret.len().saturating_sub(trimmed.len());
    if !matches!(pad_len, 0 | 1 | 3 | 4 | 6) {
        return Err(CryptoError::MalformedSecret(format!(
            "invalid Base32 padding length: {pad_len}"
        )));
    }
    // Padded input must form complete 8-character blocks. Modulo by a
    // nonzero constant cannot panic.
    #[allow(clippy::arithmetic_side_effects)]
    if pad_len > 0 && secret.len() % 8 != 0 {
        return Err(CryptoError::MalformedSecret(
            "padded Base32 must be a multiple of 8 characters".into(),
        ));
    }

    if let Some(c) = trimmed.chars().find(|c| !matches!(c, 'A'..='Z' | '2'..='7')) {
        return Err(CryptoError::MalformedSecret(format!(
            "invalid Base32 character: {c:?}"
        )));
    }

    let bytes = data_encoding::BASE32_NOPAD
        .decode(trimmed.as_bytes())
        .map_err(|e| CryptoError::MalformedSecret(format!("invalid Base32: {e}")))?;

    if bytes.len() < MIN_SECRET_LEN {
        return Err(CryptoError::MalformedSecret(format!(
            "decoded secret too short: {} bytes (minimum {MIN_SECRET_LEN})",
            bytes.len()
        )));
    }

    Ok(bytes)
}

// ── HOTP (RFC 4226) ────────────────────────────────────────────────

/// Generate an HOTP code per RFC 4226.
///
/// # Errors
///
/// Returns `CryptoError::Otp` if the secret is empty.
#[must_use = "OTP code should be used or stored"]
pub fn generate_hotp(
    secret: &[u8],
    counter: u64,
    digits: OtpDigits,
    algorithm: OtpAlgorithm,
) -> Result<String, CryptoError> {
    if secret.is_empty() {
        return Err(CryptoError::Otp("secret must not be empty".to_owned()));
    }

    // HMAC(K, C) with C as 8-byte big-endian (RFC 4226 §5.2).
    let key = hmac::Key::new(algorithm.to_ring_algorithm(), secret);
    let counter_bytes = counter.to_be_bytes();
    let tag = hmac::sign(&key, &counter_bytes);
    let hmac_result = tag.as_ref();

    // Dynamic Truncation (RFC 4226 §5.3): offset from low 4 bits of the
    // last byte, then 31 bits starting at the offset.
    let offset = usize::from(hmac_result[hmac_result.len().wrapping_sub(1)] & 0x0F);
    let binary_code = u32::from_be_bytes([
        hmac_result[offset] & 0x7F,
        hmac_result[offset.wrapping_add(1)],
        hmac_result[offset.wrapping_add(2)],
        hmac_result[offset.wrapping_add(3)],
    ]);

    // modulus is always 1_000_000 or 100_000_000 (never zero).
    let modulus = digits.modulus();
    #[allow(clippy::arithmetic_side_effects)]
    let code = binary_code % modulus;
    let width = usize::from(digits.value());

    Ok(format!("{code:0>width$}"))
}

// ── TOTP (RFC 6238) ────────────────────────────────────────────────

/// Generate a TOTP code per RFC 6238.
///
/// Deterministic given the (secret, time window) pair: any two timestamps
/// inside the same `period`-second window yield the same code.
///
/// # Errors
///
/// Returns `CryptoError::Otp` if `period` is 0 or the secret is empty.
#[must_use = "OTP code should be used or stored"]
pub fn generate_totp(
    secret: &[u8],
    time: u64,
    digits: OtpDigits,
    period: u32,
    algorithm: OtpAlgorithm,
) -> Result<String, CryptoError> {
    if period == 0 {
        return Err(CryptoError::Otp("period must be > 0".to_owned()));
    }

    // T = floor(time / period) per RFC 6238 §4; period validated non-zero.
    let period_u64 = u64::from(period);
    #[allow(clippy::arithmetic_side_effects)]
    let time_step = time / period_u64;
    generate_hotp(secret, time_step, digits, algorithm)
}

/// Generate the standard 6-digit, 30-second, HMAC-SHA1 code from a Base32
/// secret — the common authenticator-app contract.
///
/// # Errors
///
/// Returns [`CryptoError::MalformedSecret`] if the secret fails Base32
/// validation, or `CryptoError::Otp` on generation failure.
pub fn totp_code(base32_secret: &str, time: u64) -> Result<String, CryptoError> {
    let mut secret = decode_base32(base32_secret)?;
    let code = generate_totp(
        &secret,
        time,
        OtpDigits::Six,
        DEFAULT_PERIOD,
        OtpAlgorithm::Sha1,
    );
    secret.zeroize();
    code
}

/// Validate a TOTP code within a ±1 time-step window (RFC 6238 §5.2).
///
/// Every candidate step is checked with constant-time comparison.
///
/// # Errors
///
/// Returns `CryptoError::Otp` if `period` is 0 or the secret is empty.
#[must_use = "validation result should be checked"]
pub fn validate_totp(
    secret: &[u8],
    time: u64,
    code: &str,
    digits: OtpDigits,
    period: u32,
    algorithm: OtpAlgorithm,
) -> Result<bool, CryptoError> {
    if period == 0 {
        return Err(CryptoError::Otp("period must be > 0".to_owned()));
    }

    let period_u64 = u64::from(period);
    #[allow(clippy::arithmetic_side_effects)]
    let time_step = time / period_u64;

    // Saturating bounds: at time_step=0 the window starts at 0, not u64::MAX.
    let start = time_step.saturating_sub(u64::from(TOTP_WINDOW));
    let end = time_step.saturating_add(u64::from(TOTP_WINDOW));

    let mut valid = false;
    let mut step = start;
    loop {
        let expected = generate_hotp(secret, step, digits, algorithm)?;
        if constant_time_eq(expected.as_bytes(), code.as_bytes()) {
            valid = true;
        }
        if step == end {
            break;
        }
        step = step.wrapping_add(1);
    }

    Ok(valid)
}

// ── Tests ───────────────────────────────────────────────────────────
