//! AES-256-GCM authenticated encryption.
//!
//! This module provides:
//! - [`encrypt`] — seal plaintext under a key, generating a fresh random nonce
//! - [`decrypt`] — authenticate and open an [`EncryptedBlob`]
//! - [`EncryptedBlob`] — nonce + ciphertext + tag container (serializable)
//!
//! Nonce uniqueness is enforced by construction: callers cannot supply a
//! nonce, [`encrypt`] always draws a fresh 96-bit value from the OS CSPRNG.
//! Decryption is all-or-nothing — a single flipped bit anywhere in the blob
//! yields [`CryptoError::Decryption`], never partial plaintext.

use crate::error::CryptoError;
use crate::memory::SecretBuffer;
use rand::rngs::OsRng;
use rand::RngCore;
use ring::aead;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// AES-256-GCM nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// AES-256-GCM authentication tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// AES-256-GCM key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Minimum valid serialized length: nonce + empty ciphertext + tag.
const MIN_BLOB_LEN: usize = NONCE_LEN + TAG_LEN;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Authenticated ciphertext container — nonce + ciphertext + tag.
///
/// Wire format: `nonce (12 bytes) || ciphertext (variable) || tag (16 bytes)`.
/// The nonce travels with the ciphertext; the tag authenticates nonce,
/// ciphertext, and AAD together.
#[must_use = "encrypted data must be stored or transmitted"]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedBlob {
    /// 96-bit random nonce, unique per encryption.
    pub nonce: [u8; NONCE_LEN],
    /// Encrypted data (same length as the original plaintext).
    pub ciphertext: Vec<u8>,
    /// 128-bit authentication tag.
    pub tag: [u8; TAG_LEN],
}

impl EncryptedBlob {
    /// Serialize to wire format: `nonce || ciphertext || tag`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let capacity = NONCE_LEN
            .saturating_add(self.ciphertext.len())
            .saturating_add(TAG_LEN);
        let mut out = Vec::with_capacity(capacity);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        out
    }

    /// Deserialize from wire format: `nonce || ciphertext || tag`.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::Encryption` if the input is shorter than
    /// 28 bytes (12-byte nonce + 0-byte ciphertext + 16-byte tag).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < MIN_BLOB_LEN {
            return Err(CryptoError::Encryption(format!(
                "encrypted blob too short: {} bytes (minimum {MIN_BLOB_LEN})",
                bytes.len()
            )));
        }

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[..NONCE_LEN]);

        // checked_sub cannot fail after the length guard; kept for the
        // workspace `arithmetic_side_effects = "deny"` lint.
        let ct_len = bytes
            .len()
            .checked_sub(NONCE_LEN.saturating_add(TAG_LEN))
            .ok_or_else(|| CryptoError::Encryption("encrypted blob length underflow".into()))?;

        let ct_start = NONCE_LEN;
        let ct_end = ct_start.saturating_add(ct_len);
        let ciphertext = bytes[ct_start..ct_end].to_vec();

        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&bytes[ct_end..]);

        Ok(Self {
            nonce,
            ciphertext,
            tag,
        })
    }
}

// ---------------------------------------------------------------------------
// Core encryption
// ---------------------------------------------------------------------------

/// Encrypt plaintext using AES-256-GCM with a fresh random 96-bit nonce.
///
/// # Arguments
///
/// - `plaintext` — data to encrypt (may be empty)
/// - `key` — exactly 32 bytes (256-bit AES key)
/// - `aad` — additional authenticated data (authenticated, not encrypted)
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeyMaterial` if the key is not exactly
/// 32 bytes, `CryptoError::Encryption` if the seal operation fails.
pub fn encrypt(plaintext: &[u8], key: &[u8], aad: &[u8]) -> Result<EncryptedBlob, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidKeyMaterial(format!(
            "invalid key length: {} bytes (expected {KEY_LEN})",
            key.len()
        )));
    }

    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key)
        .map_err(|_| CryptoError::Encryption("failed to create AES-256-GCM key".into()))?;
    let less_safe_key = aead::LessSafeKey::new(unbound);

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = aead::Nonce::assume_unique_for_key(nonce_bytes);

    // Encrypt in place — the plaintext copy becomes the ciphertext.
    let mut in_out = plaintext.to_vec();
    let Ok(tag) =
        less_safe_key.seal_in_place_separate_tag(nonce, aead::Aad::from(aad), &mut in_out)
    else {
        in_out.zeroize();
        return Err(CryptoError::Encryption(
            "AES-256-GCM encryption failed".into(),
        ));
    };

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(tag.as_ref());

    Ok(EncryptedBlob {
        nonce: nonce_bytes,
        ciphertext: in_out,
        tag: tag_bytes,
    })
}

/// Decrypt an AES-256-GCM [`EncryptedBlob`].
///
/// Returns the plaintext as a [`SecretBuffer`] (zeroized on drop). The
/// intermediate buffer is zeroized after copying.
///
/// # Errors
///
/// Returns `CryptoError::InvalidKeyMaterial` if the key is not exactly
/// 32 bytes. Returns `CryptoError::Decryption` on authentication failure —
/// wrong key, tampered nonce/ciphertext/tag, or AAD mismatch. No further
/// detail is exposed.
pub fn decrypt(blob: &EncryptedBlob, key: &[u8], aad: &[u8]) -> Result<SecretBuffer, CryptoError> {
    if key.len() != KEY_LEN {
        return Err(CryptoError::InvalidKeyMaterial(format!(
            "invalid key length: {} bytes (expected {KEY_LEN})",
            key.len()
        )));
    }

    let unbound = aead::UnboundKey::new(&aead::AES_256_GCM, key)
        .map_err(|_| CryptoError::Encryption("failed to create AES-256-GCM key".into()))?;
    let less_safe_key = aead::LessSafeKey::new(unbound);

    let nonce = aead::Nonce::assume_unique_for_key(blob.nonce);

    // Build ciphertext || tag for open_in_place.
    let mut ct_tag = Vec::with_capacity(blob.ciphertext.len().saturating_add(TAG_LEN));
    ct_tag.extend_from_slice(&blob.ciphertext);
    ct_tag.extend_from_slice(&blob.tag);

    let plaintext_slice = less_safe_key
        .open_in_place(nonce, aead::Aad::from(aad), &mut ct_tag)
        .map_err(|_| CryptoError::Decryption)?;

    let result = SecretBuffer::new(plaintext_slice)
        .map_err(|e| CryptoError::SecureMemory(format!("secure buffer allocation failed: {e}")))?;
    ct_tag.zeroize();
    Ok(result)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
