use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::ops::Deref;

// NicknameId uniquely identifies a minted nickname token.
// It is a 32 byte identifier derived from the token's name, so the same
// name always collides to the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NicknameId([u8; 32]);

impl fmt::Display for NicknameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format as a hex string with a prefix of the first 6 bytes
        let prefix = hex::encode(&self.0[0..6]);
        write!(f, "nick:{}", prefix)
    }
}

impl Ord for NicknameId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for NicknameId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Deref for NicknameId {
    type Target = [u8; 32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl NicknameId {
    /// Create a NicknameId from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        NicknameId(bytes)
    }

    /// Get a reference to the internal bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Derive the id for a nickname
    ///
    /// Pure function of the name: the same name always produces the same
    /// id, distinct names produce distinct ids up to SHA-256 collisions.
    pub fn derive(name: &str) -> Self {
        let mut hasher = Sha256::new();

        // Domain separator
        hasher.update(b"NicknameToken");
        hasher.update(name.as_bytes());

        NicknameId(hasher.finalize().into())
    }

    /// Full lowercase hex rendering, used when composing token URIs
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// AccountId identifies an account that can own nickname tokens.
///
/// It is a 32 byte identifier, resembling a public key. The hosting
/// environment authenticates callers; the registry only compares ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId([u8; 32]);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = hex::encode(&self.0[0..6]);
        write!(f, "acct:{}", prefix)
    }
}

impl Ord for AccountId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for AccountId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        AccountId([0; 32])
    }
}

impl Deref for AccountId {
    type Target = [u8; 32];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AccountId {
    pub fn new(bytes: [u8; 32]) -> Self {
        AccountId(bytes)
    }

    /// Get a reference to the internal bytes
    pub fn bytes(&self) -> &[u8] {
        &self.0
    }

    /// Derive an account id from an arbitrary seed
    ///
    /// Deterministic, so tests can name accounts by readable seeds.
    pub fn derive(seed: &[u8]) -> Self {
        let mut hasher = Sha256::new();

        hasher.update(b"NicknameAccount");
        hasher.update(seed);

        AccountId(hasher.finalize().into())
    }
}
