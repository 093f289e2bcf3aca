use crate::config::Amount;
use crate::id::NicknameId;
use std::io;
use thiserror::Error;

/// Represents all possible errors surfaced by the nickname registry
///
/// Every variant is a well-defined rejection of a specific request: a
/// failed operation leaves the registry state untouched, and none of these
/// conditions are retried by the registry itself.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Mint attempted for a name currently bound to a live token
    #[error("name already minted: {0}")]
    DuplicateName(String),

    /// Mint payment from a non-administrator does not equal the fixed price
    #[error("wrong mint value: expected {expected}, got {actual}")]
    InvalidPayment { expected: Amount, actual: Amount },

    /// Operation references a token id that does not currently exist
    #[error("no token registered under {0}")]
    NotFound(NicknameId),

    /// Caller lacks the required relationship to the token or registry
    #[error("caller is not token owner nor approved")]
    Unauthorized,

    /// Burn attempted against a token in the protection set
    #[error("token {0} is protected")]
    Protected(NicknameId),

    /// Name violates the registry's length bounds
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// IO errors that occur when reading/writing the commit log
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization errors
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Errors that occur during commit log operations
    #[error("commit log error: {0}")]
    Journal(String),

    /// Anyhow error wrapper for error context
    #[error(transparent)]
    Context(#[from] anyhow::Error),
}

impl From<bincode::Error> for RegistryError {
    fn from(err: bincode::Error) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}
