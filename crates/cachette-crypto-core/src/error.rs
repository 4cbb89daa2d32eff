//! Cryptographic error types for `cachette-crypto-core`.

use thiserror::Error;

/// Errors produced by cryptographic operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key derivation failed (Argon2id parameter validation, memory allocation).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// Symmetric encryption failure (AES-256-GCM setup or seal).
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Authentication tag verification failed — ciphertext tampered or wrong key.
    ///
    /// Deliberately carries no detail: callers must not be able to tell a
    /// wrong key apart from a flipped ciphertext bit.
    #[error("decryption failed: authentication tag mismatch")]
    Decryption,

    /// Invalid key material (wrong length, corrupted bytes).
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// A user-supplied shared secret failed validation (Base32 alphabet,
    /// padding, length). The reason is surfaced — this is input validation,
    /// not an authentication outcome.
    #[error("malformed secret: {0}")]
    MalformedSecret(String),

    /// TOTP/HOTP generation or validation error.
    #[error("OTP error: {0}")]
    Otp(String),

    /// Password/passphrase generation failure (invalid parameters).
    #[error("password generation error: {0}")]
    PasswordGeneration(String),

    /// Secure memory allocation failure (mlock, CSPRNG).
    #[error("secure memory error: {0}")]
    SecureMemory(String),
}
