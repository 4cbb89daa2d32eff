//! Slot-based key-value storage for vault material.
//!
//! Everything the vault persists lives under a fixed, small set of keys:
//! encrypted blobs and salts for the two slots, plus the biometric
//! registration records. [`SlotStore`] abstracts the backing medium so the
//! authentication layer can be tested against [`MemStore`] and shipped on
//! [`FsStore`].

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::error::VaultError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The fixed set of records a vault store can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// Encrypted primary vault payload.
    PrimaryBlob,
    /// Encrypted decoy vault payload.
    DecoyBlob,
    /// KDF salt for the primary slot.
    PrimarySalt,
    /// KDF salt for the decoy slot.
    DecoySalt,
    /// Platform credential identifier for biometric unlock.
    BiometricCredentialId,
    /// Vault password wrapped under the biometric-derived key.
    BiometricWrappedSecret,
    /// Marker record, written last during biometric registration.
    BiometricRegistered,
}

impl StoreKey {
    /// Stable on-disk file name for this record.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::PrimaryBlob => "primary.blob",
            Self::DecoyBlob => "decoy.blob",
            Self::PrimarySalt => "primary.salt",
            Self::DecoySalt => "decoy.salt",
            Self::BiometricCredentialId => "biometric.credential",
            Self::BiometricWrappedSecret => "biometric.wrapped",
            Self::BiometricRegistered => "biometric.registered",
        }
    }
}

/// Backing storage for vault records.
pub trait SlotStore {
    /// Read a record, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] or [`VaultError::Storage`] on backend failure.
    fn read(&self, key: StoreKey) -> Result<Option<Vec<u8>>, VaultError>;

    /// Write a record, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] or [`VaultError::Storage`] on backend failure.
    fn write(&mut self, key: StoreKey, value: &[u8]) -> Result<(), VaultError>;

    /// Delete a record. Deleting an absent record is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] or [`VaultError::Storage`] on backend failure.
    fn delete(&mut self, key: StoreKey) -> Result<(), VaultError>;

    /// Whether a record exists.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] or [`VaultError::Storage`] on backend failure.
    fn exists(&self, key: StoreKey) -> Result<bool, VaultError> {
        Ok(self.read(key)?.is_some())
    }
}

// ---------------------------------------------------------------------------
// Filesystem store
// ---------------------------------------------------------------------------

/// Directory-backed store, one file per [`StoreKey`].
///
/// Writes go to a temporary file in the same directory and are renamed into
/// place, so a crash mid-write never leaves a truncated record.
#[derive(Debug)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, VaultError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: StoreKey) -> PathBuf {
        self.root.join(key.file_name())
    }
}

impl SlotStore for FsStore {
    fn read(&self, key: StoreKey) -> Result<Option<Vec<u8>>, VaultError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(VaultError::Io(e)),
        }
    }

    fn write(&mut self, key: StoreKey, value: &[u8]) -> Result<(), VaultError> {
        let final_path = self.path_for(key);
        let tmp_path = self.root.join(format!("{}.tmp", key.file_name()));

        let mut tmp = fs::File::create(&tmp_path)?;
        tmp.write_all(value)?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&tmp_path, &final_path)?;
        Ok(())
    }

    fn delete(&mut self, key: StoreKey) -> Result<(), VaultError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::Io(e)),
        }
    }

    fn exists(&self, key: StoreKey) -> Result<bool, VaultError> {
        Ok(self.path_for(key).exists())
    }
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// `HashMap`-backed store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemStore {
    records: HashMap<StoreKey, Vec<u8>>,
}

impl MemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemStore {
    fn read(&self, key: StoreKey) -> Result<Option<Vec<u8>>, VaultError> {
        Ok(self.records.get(&key).cloned())
    }

    fn write(&mut self, key: StoreKey, value: &[u8]) -> Result<(), VaultError> {
        self.records.insert(key, value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: StoreKey) -> Result<(), VaultError> {
        self.records.remove(&key);
        Ok(())
    }

    fn exists(&self, key: StoreKey) -> Result<bool, VaultError> {
        Ok(self.records.contains_key(&key))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
