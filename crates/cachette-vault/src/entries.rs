//! Vault entries and the decrypted vault object.
//!
//! [`VaultContents`] is the plaintext form of a slot blob: a list of
//! [`VaultEntry`] records. It serializes to JSON before encryption and is
//! zeroized on drop. History rotation lives in [`record_change`].

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::error::VaultError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of prior secrets retained per entry.
pub const MAX_HISTORY: usize = 5;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single stored credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VaultEntry {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Display name (e.g., "GitHub").
    pub title: String,
    /// Username or email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// The current secret (password).
    pub secret: String,
    /// User-assigned category.
    pub category: String,
    /// Base32-encoded TOTP seed, if the entry has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp_seed: Option<String>,
    /// Pinned by the user.
    #[serde(default)]
    pub favorite: bool,
    /// Prior secrets, newest first, at most [`MAX_HISTORY`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<String>,
    /// ISO 8601 creation timestamp.
    pub created_at: String,
    /// ISO 8601 timestamp of the last modification.
    pub updated_at: String,
}

impl VaultEntry {
    /// Create a new entry with a fresh id and timestamps.
    #[must_use]
    pub fn new(title: &str, secret: &str, category: &str) -> Self {
        let now = now_iso8601();
        Self {
            id: generate_id(),
            title: title.to_owned(),
            username: None,
            secret: secret.to_owned(),
            category: category.to_owned(),
            totp_seed: None,
            favorite: false,
            history: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Replace the entry's secret, rotating the old one into history.
    ///
    /// A no-op if `new_secret` equals the current secret: history and
    /// `updated_at` are left untouched.
    pub fn set_secret(&mut self, new_secret: &str) {
        if self.secret == new_secret {
            return;
        }
        record_change(&mut self.history, &self.secret);
        let mut old = std::mem::replace(&mut self.secret, new_secret.to_owned());
        old.zeroize();
        self.updated_at = now_iso8601();
    }
}

/// Zeroize secret data on drop to prevent memory residue.
///
/// Note: `serde` (de)serialization inherently creates intermediate `String`
/// values that cannot be zeroized. This `Drop` impl covers the primary
/// in-memory lifetime of the struct itself.
impl Drop for VaultEntry {
    fn drop(&mut self) {
        self.secret.zeroize();
        if let Some(ref mut u) = self.username {
            u.zeroize();
        }
        if let Some(ref mut seed) = self.totp_seed {
            seed.zeroize();
        }
        for old in self.history.iter_mut() {
            old.zeroize();
        }
    }
}

/// The decrypted payload of a vault slot.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VaultContents {
    /// Payload format version.
    pub version: u32,
    /// All entries in the vault.
    pub entries: Vec<VaultEntry>,
}

impl VaultContents {
    /// Current payload format version.
    pub const VERSION: u32 = 1;

    /// Create an empty vault payload.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            entries: Vec::new(),
        }
    }

    /// Serialize to the JSON form that gets encrypted.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, VaultError> {
        serde_json::to_vec(self).map_err(|e| VaultError::Storage(e.to_string()))
    }

    /// Parse a decrypted slot payload.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Storage`] if the bytes are not a well-formed
    /// vault object.
    pub fn from_json(bytes: &[u8]) -> Result<Self, VaultError> {
        serde_json::from_slice(bytes).map_err(|e| VaultError::Storage(e.to_string()))
    }

    /// Add an entry, returning its id.
    pub fn add(&mut self, entry: VaultEntry) -> String {
        let id = entry.id.clone();
        self.entries.push(entry);
        id
    }

    /// Look up an entry by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&VaultEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Look up an entry mutably by id.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut VaultEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Remove an entry by id.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::EntryNotFound`] if no entry has that id.
    pub fn remove(&mut self, id: &str) -> Result<(), VaultError> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| VaultError::EntryNotFound(id.to_owned()))?;
        self.entries.remove(pos);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// History rotation
// ---------------------------------------------------------------------------

/// Prepend `old_secret` to `history`, newest prior secret first, evicting
/// the oldest element when the bound of [`MAX_HISTORY`] is exceeded.
pub fn record_change(history: &mut Vec<String>, old_secret: &str) {
    history.insert(0, old_secret.to_owned());
    while history.len() > MAX_HISTORY {
        if let Some(mut evicted) = history.pop() {
            evicted.zeroize();
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Generate a UUIDv4-like string using `OsRng`.
///
/// Format: `xxxxxxxx-xxxx-4xxx-yxxx-xxxxxxxxxxxx` where x is random hex
/// and y is one of `{8, 9, a, b}`.
pub(crate) fn generate_id() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);

    // Set version (4) and variant (RFC 4122).
    bytes[6] = (bytes[6] & 0x0F) | 0x40;
    bytes[8] = (bytes[8] & 0x3F) | 0x80;

    format!(
        "{:02x}{:02x}{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3],
        bytes[4], bytes[5],
        bytes[6], bytes[7],
        bytes[8], bytes[9],
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
    )
}

/// Return the current UTC time as an ISO 8601 string.
///
/// Uses `std::time::SystemTime` to avoid pulling in `chrono`.
pub(crate) fn now_iso8601() -> String {
    let duration = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = duration.as_secs();

    let (year, month, day, hour, minute, second) = epoch_to_utc(secs);

    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:{second:02}Z")
}

/// Convert epoch seconds to (year, month, day, hour, minute, second) in UTC.
///
/// This is a simplified civil calendar computation (valid for years 1970–9999).
#[allow(clippy::arithmetic_side_effects)]
const fn epoch_to_utc(epoch_secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    // Algorithm adapted from Howard Hinnant's `civil_from_days`.
    let secs_per_day: u64 = 86_400;
    let total_days = epoch_secs / secs_per_day;
    let remaining_secs = epoch_secs % secs_per_day;

    let hour = remaining_secs / 3600;
    let minute = (remaining_secs % 3600) / 60;
    let second = remaining_secs % 60;

    // Days since 0000-03-01 (shifted epoch for leap year handling).
    let z = total_days + 719_468;
    let era = z / 146_097;
    let doe = z - era * 146_097; // day of era [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = if m <= 2 { y + 1 } else { y };

    (year, m, d, hour, minute, second)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
