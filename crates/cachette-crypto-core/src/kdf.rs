//! Argon2id key derivation.
//!
//! This module provides:
//! - [`derive`] — derive a 256-bit key from a password + salt using Argon2id
//! - [`Argon2idParams`] — serializable cost parameter set
//! - [`KdfPreset`] — Fast / Balanced / Maximum preset selector
//!
//! Cost parameters are fixed per deployment by design: derivation latency is
//! bounded by parameter choice, never by a timeout.

use crate::error::CryptoError;
use crate::memory::SecretBytes;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Output length of the KDF in bytes (256 bits).
pub const OUTPUT_LEN: usize = 32;

/// Salt length generated for every vault slot, in bytes.
pub const SALT_LEN: usize = 32;

/// Minimum salt length accepted by [`derive`]. Stricter than argon2's 8.
const MIN_SALT_LEN: usize = 16;

/// 256 MB in KiB.
const MEMORY_256MB: u32 = 262_144;

/// 128 MB in KiB.
const MEMORY_128MB: u32 = 131_072;

/// 64 MB in KiB.
const MEMORY_64MB: u32 = 65_536;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Argon2id parameter set.
///
/// Fields use the `argon2` crate convention:
/// - `m_cost`: memory in KiB (NOT bytes, NOT MB)
/// - `t_cost`: number of iterations
/// - `p_cost`: degree of parallelism
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2idParams {
    /// Memory cost in kibibytes (1 KiB = 1024 bytes).
    pub m_cost: u32,
    /// Number of iterations (time cost).
    pub t_cost: u32,
    /// Degree of parallelism (number of lanes).
    pub p_cost: u32,
}

/// KDF preset selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdfPreset {
    /// Quick unlock on modest hardware.
    Fast,
    /// Recommended daily driver.
    Balanced,
    /// Maximum work factor.
    Maximum,
}

impl KdfPreset {
    /// Return the fixed parameters for this preset.
    #[must_use]
    pub const fn params(self) -> Argon2idParams {
        match self {
            Self::Fast => Argon2idParams {
                m_cost: MEMORY_64MB,
                t_cost: 2,
                p_cost: 4,
            },
            Self::Balanced => Argon2idParams {
                m_cost: MEMORY_128MB,
                t_cost: 3,
                p_cost: 4,
            },
            Self::Maximum => Argon2idParams {
                m_cost: MEMORY_256MB,
                t_cost: 4,
                p_cost: 4,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Core KDF
// ---------------------------------------------------------------------------

/// Derive a 256-bit key from a password and salt using Argon2id.
///
/// Deterministic: the same password + salt + params always yield the same
/// key; a different salt yields an unrelated key. Any password content is
/// accepted, including empty — strength policy belongs to the caller.
/// The intermediate output buffer is zeroized after the key is captured.
///
/// # Errors
///
/// Returns `CryptoError::KeyDerivation` if:
/// - The salt is shorter than 16 bytes
/// - The argon2 cost parameters are out of range (e.g. zero memory)
/// - The derivation itself fails (e.g. memory allocation)
pub fn derive(
    password: &[u8],
    salt: &[u8],
    params: &Argon2idParams,
) -> Result<SecretBytes<OUTPUT_LEN>, CryptoError> {
    if salt.len() < MIN_SALT_LEN {
        return Err(CryptoError::KeyDerivation(format!(
            "salt too short: {} bytes (minimum {MIN_SALT_LEN})",
            salt.len()
        )));
    }

    let argon2_params = argon2::Params::new(
        params.m_cost,
        params.t_cost,
        params.p_cost,
        Some(OUTPUT_LEN),
    )
    .map_err(|e| CryptoError::KeyDerivation(format!("invalid argon2 params: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut output = [0u8; OUTPUT_LEN];
    argon2
        .hash_password_into(password, salt, &mut output)
        .map_err(|e| CryptoError::KeyDerivation(format!("argon2id derivation failed: {e}")))?;

    let key = SecretBytes::<OUTPUT_LEN>::new(output);
    output.zeroize();
    Ok(key)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
