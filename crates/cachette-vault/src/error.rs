//! Vault error types for `cachette-vault`.

use cachette_crypto_core::CryptoError;
use thiserror::Error;

/// Errors produced by vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Cryptographic operation failed (delegated from crypto-core).
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Unlock failed. Deliberately generic: the caller must not be able to
    /// tell a wrong password from a missing decoy slot, a corrupted blob, or
    /// a rejected biometric assertion.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// No vault slot exists yet; the vault must be initialized first.
    #[error("vault is not initialized")]
    VaultNotInitialized,

    /// Attempted to initialize a slot that already holds a vault.
    #[error("slot already initialized: {0}")]
    SlotAlreadyExists(String),

    /// Vault is locked — operation requires an unlocked session.
    #[error("vault is locked")]
    Locked,

    /// Entry not found by ID.
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    /// No biometric credential is registered.
    #[error("no biometric credential registered")]
    BiometricNotRegistered,

    /// Backing store failure (corrupt record, serialization error).
    #[error("storage error: {0}")]
    Storage(String),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
