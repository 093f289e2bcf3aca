use crate::id::{AccountId, NicknameId};
use serde::{Deserialize, Serialize};

/// A minted nickname token
///
/// The record ties an immutable name to its current owner. The id is
/// always the derived id of the name, so it is fixed at construction and
/// two records for the same name share the same id across re-mints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Nickname {
    /// Unique identifier, derived from the name
    id: NicknameId,

    /// The reserved nickname string
    name: String,

    /// The account that currently owns this token
    owner: AccountId,
}

impl Nickname {
    /// Create a new nickname token owned by `owner`
    pub fn new(name: impl Into<String>, owner: AccountId) -> Self {
        let name = name.into();
        let id = NicknameId::derive(&name);
        Self { id, name, owner }
    }

    /// Get the token id
    pub fn id(&self) -> &NicknameId {
        &self.id
    }

    /// Get the reserved name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the current owner
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Move ownership to another account
    ///
    /// Ownership is exclusive; the previous owner loses the token.
    pub fn set_owner(&mut self, owner: AccountId) {
        self.owner = owner;
    }
}
