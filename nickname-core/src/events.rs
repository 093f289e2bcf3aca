use crate::config::Amount;
use crate::id::{AccountId, NicknameId};
use serde::{Deserialize, Serialize};

/// A state change committed by the registry
///
/// Every successful mutating operation produces exactly one event. Events
/// carry everything needed to re-apply the change, so a registry can be
/// rebuilt by replaying its commit log in order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A new token was minted
    Minted {
        id: NicknameId,
        name: String,
        owner: AccountId,
        /// Value attached to the mint (zero for administrator-exempt mints)
        payment: Amount,
    },

    /// Ownership moved between accounts
    Transferred {
        id: NicknameId,
        from: AccountId,
        to: AccountId,
    },

    /// The owner approved another account for this token
    Approved {
        id: NicknameId,
        owner: AccountId,
        approved: AccountId,
    },

    /// A token was destroyed and its name freed
    Burned {
        id: NicknameId,
        name: String,
        owner: AccountId,
    },

    /// A token was added to the protection set
    Protected { id: NicknameId },

    /// The metadata base URI was replaced
    BaseUriChanged { uri: String },

    /// The treasury was drained to the administrator
    Withdrawn { to: AccountId, amount: Amount },
}

impl RegistryEvent {
    /// The token this event concerns, if any
    pub fn token_id(&self) -> Option<&NicknameId> {
        match self {
            RegistryEvent::Minted { id, .. }
            | RegistryEvent::Transferred { id, .. }
            | RegistryEvent::Approved { id, .. }
            | RegistryEvent::Burned { id, .. }
            | RegistryEvent::Protected { id } => Some(id),
            RegistryEvent::BaseUriChanged { .. } | RegistryEvent::Withdrawn { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_id_accessor() {
        let id = NicknameId::derive("alice");
        let owner = AccountId::derive(b"owner");

        let minted = RegistryEvent::Minted {
            id,
            name: "alice".to_string(),
            owner,
            payment: 0,
        };
        assert_eq!(minted.token_id(), Some(&id));

        let withdrawn = RegistryEvent::Withdrawn {
            to: owner,
            amount: 7,
        };
        assert_eq!(withdrawn.token_id(), None);
    }

    #[test]
    fn test_event_round_trips_through_bincode() {
        let event = RegistryEvent::Burned {
            id: NicknameId::derive("alice"),
            name: "alice".to_string(),
            owner: AccountId::derive(b"owner"),
        };
        let bytes = bincode::serialize(&event).unwrap();
        let back: RegistryEvent = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, event);
    }
}
