//! Vault authentication: slot initialization, unlock, and save.
//!
//! A vault holds up to two independently-keyed slots. The primary slot is
//! the real vault; the decoy slot is an optional second vault that opens
//! under a different password. An unlock attempt tries the slots in a fixed
//! order and reports only success or a single generic failure, so an
//! observer cannot tell whether a decoy exists at all.

use cachette_crypto_core::kdf::{derive, Argon2idParams, KdfPreset, SALT_LEN};
use cachette_crypto_core::memory::SecretBytes;
use cachette_crypto_core::symmetric::{decrypt, encrypt, EncryptedBlob, KEY_LEN};
use rand::rngs::OsRng;
use rand::RngCore;

use crate::entries::VaultContents;
use crate::error::VaultError;
use crate::store::{SlotStore, StoreKey};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Salt used to derive against when a slot has no stored salt, keeping the
/// derivation count of a failed unlock independent of which slots exist.
const ABSENT_SLOT_SALT: [u8; SALT_LEN] = [0u8; SALT_LEN];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Identifies one of the two vault slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotId {
    /// The real vault.
    Primary,
    /// The plausible-deniability vault.
    Decoy,
}

impl SlotId {
    /// Unlock attempt order. Primary is always tried first.
    pub const ALL: [Self; 2] = [Self::Primary, Self::Decoy];

    /// AAD domain-separation tag bound into every blob of this slot.
    #[must_use]
    pub const fn aad_tag(self) -> &'static [u8] {
        match self {
            Self::Primary => b"cachette.slot.primary.v1",
            Self::Decoy => b"cachette.slot.decoy.v1",
        }
    }

    /// Store key of this slot's encrypted payload.
    #[must_use]
    pub const fn blob_key(self) -> StoreKey {
        match self {
            Self::Primary => StoreKey::PrimaryBlob,
            Self::Decoy => StoreKey::DecoyBlob,
        }
    }

    /// Store key of this slot's KDF salt.
    #[must_use]
    pub const fn salt_key(self) -> StoreKey {
        match self {
            Self::Primary => StoreKey::PrimarySalt,
            Self::Decoy => StoreKey::DecoySalt,
        }
    }

    /// Human-readable slot name for error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Decoy => "decoy",
        }
    }
}

/// The symmetric key for an unlocked slot, tied to its origin.
pub struct SessionKey {
    key: SecretBytes<KEY_LEN>,
    origin: SlotId,
}

impl SessionKey {
    /// Which slot this key opens.
    #[must_use]
    pub const fn origin(&self) -> SlotId {
        self.origin
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKey")
            .field("key", &"[REDACTED]")
            .field("origin", &self.origin)
            .finish()
    }
}

/// An unlocked vault: the decrypted contents plus the key that opened them.
///
/// Dropping (or calling [`VaultSession::lock`]) zeroizes the key and the
/// entry secrets.
pub struct VaultSession {
    key: SessionKey,
    /// Decrypted vault payload, edited in place between saves.
    pub contents: VaultContents,
}

impl VaultSession {
    /// Which slot this session was opened from.
    #[must_use]
    pub const fn origin(&self) -> SlotId {
        self.key.origin()
    }

    /// Lock the session, wiping key material.
    pub fn lock(self) {
        drop(self);
    }
}

impl std::fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("origin", &self.origin())
            .field("entries", &self.contents.entries.len())
            .finish()
    }
}

/// Slot lifecycle and authentication over a [`SlotStore`].
#[derive(Debug)]
pub struct VaultAuthenticator<S: SlotStore> {
    store: S,
    params: Argon2idParams,
}

// ---------------------------------------------------------------------------
// Implementation
// ---------------------------------------------------------------------------

impl<S: SlotStore> VaultAuthenticator<S> {
    /// Create an authenticator with the default KDF cost.
    pub fn new(store: S) -> Self {
        Self {
            store,
            params: KdfPreset::Balanced.params(),
        }
    }

    /// Create an authenticator with explicit KDF parameters.
    pub const fn with_params(store: S, params: Argon2idParams) -> Self {
        Self { store, params }
    }

    /// Whether any slot has been initialized.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn is_initialized(&self) -> Result<bool, VaultError> {
        for slot in SlotId::ALL {
            if self.store.exists(slot.blob_key())? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Create a slot: generate its salt, derive its key, and write the
    /// encrypted payload.
    ///
    /// The salt is generated exactly once here and never regenerated for
    /// the life of the slot.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::SlotAlreadyExists`] if the slot already holds
    /// a vault. Propagates KDF, encryption, and store failures.
    pub fn initialize(
        &mut self,
        slot: SlotId,
        password: &[u8],
        contents: &VaultContents,
    ) -> Result<(), VaultError> {
        if self.store.exists(slot.blob_key())? {
            return Err(VaultError::SlotAlreadyExists(slot.name().to_owned()));
        }

        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let key = derive(password, &salt, &self.params)?;
        let blob = encrypt(&contents.to_json()?, key.expose(), slot.aad_tag())?;

        // Salt first: a blob without its salt is unrecoverable, the reverse
        // is harmless.
        self.store.write(slot.salt_key(), &salt)?;
        self.store.write(slot.blob_key(), &blob.to_bytes())?;
        Ok(())
    }

    /// Attempt to unlock the vault with `password`.
    ///
    /// Tries the primary slot, then the decoy slot; the first slot whose
    /// blob decrypts and parses wins. Every failure mode (wrong password,
    /// absent decoy, corrupt blob, malformed payload) collapses into the
    /// same [`VaultError::AuthenticationFailed`].
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::VaultNotInitialized`] when no slot exists,
    /// [`VaultError::AuthenticationFailed`] when no slot opens.
    pub fn unlock(&self, password: &[u8]) -> Result<VaultSession, VaultError> {
        if !self.is_initialized()? {
            return Err(VaultError::VaultNotInitialized);
        }

        for slot in SlotId::ALL {
            if let Some(session) = self.try_slot(slot, password) {
                return Ok(session);
            }
        }

        Err(VaultError::AuthenticationFailed)
    }

    /// Re-encrypt and persist the session's contents.
    ///
    /// Writes only the slot the session was opened from. A decoy session
    /// can never touch the primary blob.
    ///
    /// # Errors
    ///
    /// Propagates encryption and store failures.
    pub fn save(&mut self, session: &VaultSession) -> Result<(), VaultError> {
        let slot = session.origin();
        let blob = encrypt(
            &session.contents.to_json()?,
            session.key.key.expose(),
            slot.aad_tag(),
        )?;
        self.store.write(slot.blob_key(), &blob.to_bytes())?;
        Ok(())
    }

    /// Borrow the backing store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Borrow the backing store mutably (biometric registration writes
    /// through this).
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Try one slot. Any failure, of any kind, yields `None`.
    ///
    /// A slot with no stored salt is derived against [`ABSENT_SLOT_SALT`],
    /// so a failed unlock costs the same number of KDF passes whether or
    /// not a decoy exists.
    fn try_slot(&self, slot: SlotId, password: &[u8]) -> Option<VaultSession> {
        let salt = self.store.read(slot.salt_key()).ok().flatten();
        let blob_bytes = self.store.read(slot.blob_key()).ok().flatten();

        let salt = salt.as_deref().unwrap_or(&ABSENT_SLOT_SALT);
        let key = derive(password, salt, &self.params).ok()?;
        let blob = EncryptedBlob::from_bytes(&blob_bytes?).ok()?;
        let plaintext = decrypt(&blob, key.expose(), slot.aad_tag()).ok()?;
        let contents = VaultContents::from_json(plaintext.expose()).ok()?;

        Some(VaultSession {
            key: SessionKey { key, origin: slot },
            contents,
        })
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::VaultEntry;
    use crate::store::MemStore;

    const TEST_PARAMS: Argon2idParams = Argon2idParams {
        m_cost: 32,
        t_cost: 1,
        p_cost: 1,
    };

    fn test_auth() -> VaultAuthenticator<MemStore> {
        VaultAuthenticator::with_params(MemStore::new(), TEST_PARAMS)
    }

    fn contents_with(title: &str) -> VaultContents {
        let mut c = VaultContents::new();
        c.add(VaultEntry::new(title, "pw", "test"));
        c
    }

    #[test]
    fn unlock_before_initialize_reports_uninitialized() {
        let auth = test_auth();
        let result = auth.unlock(b"anything");
        assert!(matches!(result, Err(VaultError::VaultNotInitialized)));
    }

    #[test]
    fn initialize_then_unlock_primary() {
        let mut auth = test_auth();
        auth.initialize(SlotId::Primary, b"password-a", &contents_with("real"))
            .unwrap();

        let session = auth.unlock(b"password-a").unwrap();
        assert_eq!(session.origin(), SlotId::Primary);
        assert_eq!(session.contents.entries[0].title, "real");
    }

    #[test]
    fn double_initialize_same_slot_rejected() {
        let mut auth = test_auth();
        auth.initialize(SlotId::Primary, b"pw", &VaultContents::new())
            .unwrap();
        let result = auth.initialize(SlotId::Primary, b"other", &VaultContents::new());
        assert!(matches!(result, Err(VaultError::SlotAlreadyExists(_))));
    }

    #[test]
    fn wrong_password_is_generic_failure() {
        let mut auth = test_auth();
        auth.initialize(SlotId::Primary, b"password-a", &VaultContents::new())
            .unwrap();

        let result = auth.unlock(b"password-c");
        assert!(matches!(result, Err(VaultError::AuthenticationFailed)));
    }

    #[test]
    fn decoy_password_opens_decoy() {
        let mut auth = test_auth();
        auth.initialize(SlotId::Primary, b"password-a", &contents_with("real"))
            .unwrap();
        auth.initialize(SlotId::Decoy, b"password-b", &contents_with("decoy"))
            .unwrap();

        let session = auth.unlock(b"password-b").unwrap();
        assert_eq!(session.origin(), SlotId::Decoy);
        assert_eq!(session.contents.entries[0].title, "decoy");
    }

    #[test]
    fn failure_shape_identical_with_and_without_decoy() {
        let mut with_decoy = test_auth();
        with_decoy
            .initialize(SlotId::Primary, b"password-a", &VaultContents::new())
            .unwrap();
        with_decoy
            .initialize(SlotId::Decoy, b"password-b", &VaultContents::new())
            .unwrap();

        let mut without_decoy = test_auth();
        without_decoy
            .initialize(SlotId::Primary, b"password-a", &VaultContents::new())
            .unwrap();

        let e1 = with_decoy.unlock(b"password-c").unwrap_err();
        let e2 = without_decoy.unlock(b"password-c").unwrap_err();
        assert_eq!(e1.to_string(), e2.to_string());
    }

    #[test]
    fn save_writes_back_origin_slot() {
        let mut auth = test_auth();
        auth.initialize(SlotId::Primary, b"pw", &VaultContents::new())
            .unwrap();

        let mut session = auth.unlock(b"pw").unwrap();
        session.contents.add(VaultEntry::new("new", "s", "test"));
        auth.save(&session).unwrap();

        let reopened = auth.unlock(b"pw").unwrap();
        assert_eq!(reopened.contents.entries.len(), 1);
    }

    #[test]
    fn decoy_save_never_touches_primary_blob() {
        let mut auth = test_auth();
        auth.initialize(SlotId::Primary, b"password-a", &contents_with("real"))
            .unwrap();
        auth.initialize(SlotId::Decoy, b"password-b", &contents_with("decoy"))
            .unwrap();

        let primary_before = auth
            .store()
            .read(StoreKey::PrimaryBlob)
            .unwrap()
            .unwrap();

        let mut session = auth.unlock(b"password-b").unwrap();
        session.contents.add(VaultEntry::new("planted", "x", "test"));
        auth.save(&session).unwrap();

        let primary_after = auth
            .store()
            .read(StoreKey::PrimaryBlob)
            .unwrap()
            .unwrap();
        assert_eq!(
            primary_before, primary_after,
            "decoy save must leave the primary blob byte-identical"
        );
    }

    #[test]
    fn resave_without_edits_still_unlocks() {
        let mut auth = test_auth();
        auth.initialize(SlotId::Primary, b"pw", &contents_with("real"))
            .unwrap();

        // The session key handed out by unlock must be the live derived
        // key: saving with it and re-deriving from the password must agree.
        let session = auth.unlock(b"pw").unwrap();
        auth.save(&session).unwrap();

        let reopened = auth.unlock(b"pw").unwrap();
        assert_eq!(reopened.contents.entries[0].title, "real");
    }

    #[test]
    fn missing_salt_with_present_blob_fails_generically() {
        let mut auth = test_auth();
        auth.initialize(SlotId::Primary, b"pw", &VaultContents::new())
            .unwrap();
        auth.store_mut().delete(StoreKey::PrimarySalt).unwrap();

        let result = auth.unlock(b"pw");
        assert!(matches!(result, Err(VaultError::AuthenticationFailed)));
    }

    #[test]
    fn tampered_blob_fails_generically() {
        let mut auth = test_auth();
        auth.initialize(SlotId::Primary, b"pw", &VaultContents::new())
            .unwrap();

        let mut blob = auth
            .store()
            .read(StoreKey::PrimaryBlob)
            .unwrap()
            .unwrap();
        let last = blob.len() - 1;
        blob[last] ^= 0x01;
        auth.store_mut().write(StoreKey::PrimaryBlob, &blob).unwrap();

        let result = auth.unlock(b"pw");
        assert!(matches!(result, Err(VaultError::AuthenticationFailed)));
    }

    #[test]
    fn salt_is_stable_across_saves() {
        let mut auth = test_auth();
        auth.initialize(SlotId::Primary, b"pw", &VaultContents::new())
            .unwrap();

        let salt_before = auth.store().read(StoreKey::PrimarySalt).unwrap().unwrap();
        let session = auth.unlock(b"pw").unwrap();
        auth.save(&session).unwrap();
        let salt_after = auth.store().read(StoreKey::PrimarySalt).unwrap().unwrap();
        assert_eq!(salt_before, salt_after);
    }

    #[test]
    fn session_debug_redacts_key() {
        let mut auth = test_auth();
        auth.initialize(SlotId::Primary, b"pw", &VaultContents::new())
            .unwrap();
        let session = auth.unlock(b"pw").unwrap();
        let repr = format!("{session:?}");
        assert!(!repr.contains("key"), "session debug must not expose key: {repr}");

        let key_repr = format!("{:?}", session.key);
        assert!(key_repr.contains("[REDACTED]"));
    }
}
