//! Biometric unlock: wrapping the vault password under a platform credential.
//!
//! The platform (Touch ID, Windows Hello, a hardware token) is abstracted
//! behind [`CredentialProvider`]. Registration stores the provider's opaque
//! credential id and the vault password encrypted under a key derived from
//! that id. Biometric unlock asserts user presence, re-derives the wrap key,
//! and recovers the password, which then goes through the normal
//! authentication path.
//!
//! The wrap key is derived with Argon2id over the credential id using a
//! fixed application salt; the credential id is high-entropy platform
//! material, not a user password.

use cachette_crypto_core::kdf::{derive, Argon2idParams, KdfPreset};
use cachette_crypto_core::memory::SecretBuffer;
use cachette_crypto_core::symmetric::{decrypt, encrypt, EncryptedBlob};
use zeroize::Zeroize;

use crate::error::VaultError;
use crate::store::{SlotStore, StoreKey};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Fixed 32-byte salt for the credential-id KDF.
const WRAP_SALT: &[u8; 32] = b"cachette-biometric-wrap-salt-v01";

/// AAD tag binding wrapped secrets to this purpose.
const WRAP_AAD: &[u8] = b"cachette.biometric.wrap.v1";

/// Marker value for [`StoreKey::BiometricRegistered`].
const REGISTERED_MARKER: &[u8] = b"1";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Platform biometric / credential backend.
pub trait CredentialProvider {
    /// Create a new platform credential and return its opaque identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses to create a credential.
    fn create_credential(&mut self) -> Result<Vec<u8>, VaultError>;

    /// Require a live user-presence check for the given credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the user cancels or the check fails.
    fn assert_user_presence(&self, credential_id: &[u8]) -> Result<(), VaultError>;
}

/// Registration and unlock flows over a [`CredentialProvider`].
#[derive(Debug)]
pub struct BiometricManager<P: CredentialProvider> {
    provider: P,
    params: Argon2idParams,
}

impl<P: CredentialProvider> BiometricManager<P> {
    /// Create a manager with the default KDF cost.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            params: KdfPreset::Balanced.params(),
        }
    }

    /// Create a manager with explicit KDF parameters.
    pub const fn with_params(provider: P, params: Argon2idParams) -> Self {
        Self { provider, params }
    }

    /// Borrow the underlying provider.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// Whether a biometric credential is registered.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn is_registered<S: SlotStore>(&self, store: &S) -> Result<bool, VaultError> {
        store.exists(StoreKey::BiometricRegistered)
    }

    /// Register a credential and wrap `password` under it.
    ///
    /// Re-registering replaces the previous credential. The registered
    /// marker is written last, so a crash mid-registration leaves the
    /// feature off rather than half-armed.
    ///
    /// # Errors
    ///
    /// Propagates provider, KDF, encryption, and store failures.
    pub fn register<S: SlotStore>(
        &mut self,
        store: &mut S,
        password: &[u8],
    ) -> Result<(), VaultError> {
        let mut credential_id = self.provider.create_credential()?;
        let result = self.write_registration(store, &credential_id, password);
        credential_id.zeroize();
        result
    }

    fn write_registration<S: SlotStore>(
        &self,
        store: &mut S,
        credential_id: &[u8],
        password: &[u8],
    ) -> Result<(), VaultError> {
        let wrap_key = derive(credential_id, WRAP_SALT, &self.params)?;
        let wrapped = encrypt(password, wrap_key.expose(), WRAP_AAD)?;

        store.write(StoreKey::BiometricCredentialId, credential_id)?;
        store.write(StoreKey::BiometricWrappedSecret, &wrapped.to_bytes())?;
        store.write(StoreKey::BiometricRegistered, REGISTERED_MARKER)
    }

    /// Assert user presence and recover the wrapped vault password.
    ///
    /// The returned password feeds the normal unlock path; biometric unlock
    /// grants nothing the password alone would not.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::BiometricNotRegistered`] when no credential is
    /// registered. A rejected or cancelled presence check, a corrupt wrapped
    /// record, and a revoked credential all collapse into the generic
    /// [`VaultError::AuthenticationFailed`].
    pub fn unlock_password<S: SlotStore>(&self, store: &S) -> Result<SecretBuffer, VaultError> {
        if !self.is_registered(store)? {
            return Err(VaultError::BiometricNotRegistered);
        }

        let mut credential_id = store
            .read(StoreKey::BiometricCredentialId)?
            .ok_or(VaultError::BiometricNotRegistered)?;

        // Presence is a hard precondition: the wrapped record is not read
        // and no key is derived until the platform confirms a fresh assertion.
        if self.provider.assert_user_presence(&credential_id).is_err() {
            credential_id.zeroize();
            return Err(VaultError::AuthenticationFailed);
        }

        let result = self.unwrap_with(store, &credential_id);
        credential_id.zeroize();
        result
    }

    fn unwrap_with<S: SlotStore>(
        &self,
        store: &S,
        credential_id: &[u8],
    ) -> Result<SecretBuffer, VaultError> {
        let wrapped_bytes = store
            .read(StoreKey::BiometricWrappedSecret)?
            .ok_or(VaultError::BiometricNotRegistered)?;

        let wrap_key = derive(credential_id, WRAP_SALT, &self.params)?;
        let wrapped = EncryptedBlob::from_bytes(&wrapped_bytes)
            .map_err(|_| VaultError::AuthenticationFailed)?;
        decrypt(&wrapped, wrap_key.expose(), WRAP_AAD)
            .map_err(|_| VaultError::AuthenticationFailed)
    }

    /// Remove the registration records.
    ///
    /// The marker goes first: if a later delete fails, the feature still
    /// reads as unregistered.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn unregister<S: SlotStore>(&self, store: &mut S) -> Result<(), VaultError> {
        store.delete(StoreKey::BiometricRegistered)?;
        store.delete(StoreKey::BiometricWrappedSecret)?;
        store.delete(StoreKey::BiometricCredentialId)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemStore;

    const TEST_PARAMS: Argon2idParams = Argon2idParams {
        m_cost: 32,
        t_cost: 1,
        p_cost: 1,
    };

    /// Deterministic in-memory provider.
    struct MockProvider {
        id: Vec<u8>,
        presence_ok: bool,
    }

    impl MockProvider {
        fn new(id: &[u8]) -> Self {
            Self {
                id: id.to_vec(),
                presence_ok: true,
            }
        }
    }

    impl CredentialProvider for MockProvider {
        fn create_credential(&mut self) -> Result<Vec<u8>, VaultError> {
            Ok(self.id.clone())
        }

        fn assert_user_presence(&self, credential_id: &[u8]) -> Result<(), VaultError> {
            if self.presence_ok && credential_id == self.id.as_slice() {
                Ok(())
            } else {
                Err(VaultError::AuthenticationFailed)
            }
        }
    }

    fn test_manager(id: &[u8]) -> BiometricManager<MockProvider> {
        BiometricManager::with_params(MockProvider::new(id), TEST_PARAMS)
    }

    /// Store that refuses writes to one key.
    struct FailingStore {
        inner: MemStore,
        fail_on: StoreKey,
    }

    impl SlotStore for FailingStore {
        fn read(&self, key: StoreKey) -> Result<Option<Vec<u8>>, VaultError> {
            self.inner.read(key)
        }

        fn write(&mut self, key: StoreKey, value: &[u8]) -> Result<(), VaultError> {
            if key == self.fail_on {
                return Err(VaultError::Storage("write refused".to_owned()));
            }
            self.inner.write(key, value)
        }

        fn delete(&mut self, key: StoreKey) -> Result<(), VaultError> {
            self.inner.delete(key)
        }
    }

    #[test]
    fn register_then_unlock_recovers_password() {
        let mut store = MemStore::new();
        let mut manager = test_manager(b"credential-xyz");

        manager.register(&mut store, b"master-password").unwrap();
        assert!(manager.is_registered(&store).unwrap());

        let recovered = manager.unlock_password(&store).unwrap();
        assert_eq!(recovered.expose(), b"master-password");
    }

    #[test]
    fn unlock_without_registration_fails() {
        let store = MemStore::new();
        let manager = test_manager(b"credential-xyz");
        let result = manager.unlock_password(&store);
        assert!(matches!(result, Err(VaultError::BiometricNotRegistered)));
    }

    #[test]
    fn presence_failure_blocks_unlock() {
        let mut store = MemStore::new();
        let mut manager = test_manager(b"credential-xyz");
        manager.register(&mut store, b"master-password").unwrap();

        manager.provider.presence_ok = false;
        let result = manager.unlock_password(&store);
        assert!(matches!(result, Err(VaultError::AuthenticationFailed)));
    }

    #[test]
    fn failed_registration_leaves_feature_unarmed() {
        let mut store = FailingStore {
            inner: MemStore::new(),
            fail_on: StoreKey::BiometricWrappedSecret,
        };
        let mut manager = test_manager(b"credential-xyz");

        let result = manager.register(&mut store, b"master-password");
        assert!(matches!(result, Err(VaultError::Storage(_))));
        assert!(!manager.is_registered(&store).unwrap());
        assert!(matches!(
            manager.unlock_password(&store),
            Err(VaultError::BiometricNotRegistered)
        ));
    }

    #[test]
    fn unregister_removes_all_records() {
        let mut store = MemStore::new();
        let mut manager = test_manager(b"credential-xyz");
        manager.register(&mut store, b"master-password").unwrap();

        manager.unregister(&mut store).unwrap();
        assert!(!manager.is_registered(&store).unwrap());
        assert!(!store.exists(StoreKey::BiometricCredentialId).unwrap());
        assert!(!store.exists(StoreKey::BiometricWrappedSecret).unwrap());

        let result = manager.unlock_password(&store);
        assert!(matches!(result, Err(VaultError::BiometricNotRegistered)));
    }

    #[test]
    fn tampered_wrapped_secret_fails_closed() {
        let mut store = MemStore::new();
        let mut manager = test_manager(b"credential-xyz");
        manager.register(&mut store, b"master-password").unwrap();

        let mut wrapped = store
            .read(StoreKey::BiometricWrappedSecret)
            .unwrap()
            .unwrap();
        wrapped[0] ^= 0xFF;
        store
            .write(StoreKey::BiometricWrappedSecret, &wrapped)
            .unwrap();

        let result = manager.unlock_password(&store);
        assert!(matches!(result, Err(VaultError::AuthenticationFailed)));
    }

    #[test]
    fn different_credential_cannot_unwrap() {
        let mut store = MemStore::new();
        let mut manager = test_manager(b"credential-xyz");
        manager.register(&mut store, b"master-password").unwrap();

        // Simulate the platform handing back a different credential id.
        store
            .write(StoreKey::BiometricCredentialId, b"credential-other")
            .unwrap();
        let other = BiometricManager::with_params(
            MockProvider::new(b"credential-other"),
            TEST_PARAMS,
        );
        let result = other.unlock_password(&store);
        assert!(matches!(result, Err(VaultError::AuthenticationFailed)));
    }

    #[test]
    fn reregistration_replaces_previous_wrap() {
        let mut store = MemStore::new();
        let mut manager = test_manager(b"credential-xyz");
        manager.register(&mut store, b"old-password").unwrap();
        manager.register(&mut store, b"new-password").unwrap();

        let recovered = manager.unlock_password(&store).unwrap();
        assert_eq!(recovered.expose(), b"new-password");
    }
}
