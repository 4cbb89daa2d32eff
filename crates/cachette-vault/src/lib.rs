//! `cachette-vault` — Vault business logic for Cachette.
//!
//! Manages slot-based encrypted storage, primary/decoy authentication,
//! entry CRUD with bounded password history, and biometric key wrapping.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod auth;
pub mod biometric;
pub mod breach;
pub mod entries;
pub mod error;
pub mod store;

pub use auth::{SessionKey, SlotId, VaultAuthenticator, VaultSession};
pub use biometric::{BiometricManager, CredentialProvider};
pub use breach::{hash_prefix, parse_range_response, BreachChecker, BreachStatus, RangeTransport};
pub use entries::{record_change, VaultContents, VaultEntry, MAX_HISTORY};
pub use error::VaultError;
pub use store::{FsStore, MemStore, SlotStore, StoreKey};
