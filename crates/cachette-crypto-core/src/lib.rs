//! `cachette-crypto-core` — Pure cryptographic primitives for Cachette.
//!
//! This crate is the audit target: zero network, zero async dependencies.
//! Everything that touches raw key material lives here.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod error;
pub mod memory;

pub mod kdf;
pub mod symmetric;

pub mod totp;

pub mod password;

pub use error::CryptoError;
pub use kdf::{derive, Argon2idParams, KdfPreset, SALT_LEN};
pub use memory::{
    disable_core_dumps, with_secret, LockedRegion, SecretBuffer, SecretBytes,
};
pub use password::{
    estimate_entropy_bits, generate_passphrase, generate_random_password, generate_segmented,
    strength_of, CharsetConfig, GeneratorStrategy, PassphraseSeparator, Strength,
    DEFAULT_PASSWORD_LENGTH, DEFAULT_WORD_COUNT, STRONG_THRESHOLD_BITS,
};
pub use symmetric::{decrypt, encrypt, EncryptedBlob, KEY_LEN, NONCE_LEN, TAG_LEN};
pub use totp::{
    decode_base32, generate_hotp, generate_totp, totp_code, validate_totp, OtpAlgorithm,
    OtpDigits, DEFAULT_PERIOD,
};
