use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use nickname_core::{
    AccountId, Amount, Nickname, NicknameId, RegistryConfig, RegistryError, RegistryEvent,
};

use crate::ledger::NativeLedger;

/// The nickname token registry
///
/// Sole source of truth for token records, the name uniqueness index, the
/// protection set and the treasury. All mutating operations take `&mut
/// self` and execute under the host's sequential-commit model: each call
/// either fully applies or returns an error with no state change.
/// Precondition checks always run before the first mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NicknameRegistry {
    /// Deployment-time configuration, fixed for the registry's lifetime
    config: RegistryConfig,

    /// All live token records by id
    tokens: HashMap<NicknameId, Nickname>,

    /// Name uniqueness index: at most one live token per name
    names: HashMap<String, NicknameId>,

    /// Per-token approved account, cleared on transfer and burn
    approvals: HashMap<NicknameId, AccountId>,

    /// Tokens vetoed from both burn paths
    protected: HashSet<NicknameId>,

    /// Live-token count per owner
    holdings: HashMap<AccountId, u64>,

    /// Accumulated mint payments awaiting withdrawal
    treasury: Amount,

    /// Prefix for token metadata locations
    base_uri: String,
}

impl NicknameRegistry {
    /// Create an empty registry
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            config,
            tokens: HashMap::new(),
            names: HashMap::new(),
            approvals: HashMap::new(),
            protected: HashSet::new(),
            holdings: HashMap::new(),
            treasury: 0,
            base_uri: String::new(),
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Get the administrator identity
    pub fn administrator(&self) -> &AccountId {
        &self.config.administrator
    }

    /// Accumulated treasury balance
    pub fn treasury(&self) -> Amount {
        self.treasury
    }

    /// Currently configured metadata base URI
    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Number of live tokens
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    fn is_admin(&self, caller: &AccountId) -> bool {
        *caller == self.config.administrator
    }

    fn require_admin(&self, caller: &AccountId) -> Result<(), RegistryError> {
        if self.is_admin(caller) {
            Ok(())
        } else {
            Err(RegistryError::Unauthorized)
        }
    }

    fn validate_name(&self, name: &str) -> Result<(), RegistryError> {
        if name.is_empty() {
            return Err(RegistryError::InvalidName("name must not be empty".to_string()));
        }
        if name.len() > self.config.max_name_len {
            return Err(RegistryError::InvalidName(format!(
                "name exceeds {} bytes",
                self.config.max_name_len
            )));
        }
        Ok(())
    }

    /// Mint a new token for a previously unused name
    ///
    /// Non-administrator callers must attach exactly the configured mint
    /// price; the administrator may attach any amount, including zero.
    /// Whatever value arrives is credited to the treasury.
    pub fn mint(
        &mut self,
        name: &str,
        caller: &AccountId,
        payment: Amount,
    ) -> Result<(NicknameId, RegistryEvent), RegistryError> {
        self.validate_name(name)?;
        if self.names.contains_key(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }
        if !self.is_admin(caller) && payment != self.config.mint_price {
            return Err(RegistryError::InvalidPayment {
                expected: self.config.mint_price,
                actual: payment,
            });
        }

        let token = Nickname::new(name, *caller);
        let id = *token.id();

        self.names.insert(name.to_string(), id);
        self.tokens.insert(id, token);
        *self.holdings.entry(*caller).or_default() += 1;
        self.treasury += payment;

        debug!("minted {} ({:?}) for {}", id, name, caller);

        let event = RegistryEvent::Minted {
            id,
            name: name.to_string(),
            owner: *caller,
            payment,
        };
        Ok((id, event))
    }

    /// Destroy a token as its owner or approved account
    ///
    /// Frees the name for re-mint and drops any approval and protection
    /// membership. Protection vetoes the burn outright.
    pub fn burn(
        &mut self,
        id: &NicknameId,
        caller: &AccountId,
    ) -> Result<RegistryEvent, RegistryError> {
        let token = self.tokens.get(id).ok_or(RegistryError::NotFound(*id))?;
        let authorized =
            token.owner() == caller || self.approvals.get(id) == Some(caller);
        if !authorized {
            return Err(RegistryError::Unauthorized);
        }
        if self.protected.contains(id) {
            return Err(RegistryError::Protected(*id));
        }

        let token = self.remove_token(id);
        debug!("burned {} ({:?})", id, token.name());

        Ok(RegistryEvent::Burned {
            id: *id,
            name: token.name().to_string(),
            owner: *token.owner(),
        })
    }

    /// Destroy any account's token on the administrator's authority
    ///
    /// The governance counterpart of [`burn`](Self::burn): owner consent is
    /// not required, but protection still vetoes.
    pub fn burn_by_voted(
        &mut self,
        id: &NicknameId,
        caller: &AccountId,
    ) -> Result<RegistryEvent, RegistryError> {
        self.require_admin(caller)?;
        if !self.tokens.contains_key(id) {
            return Err(RegistryError::NotFound(*id));
        }
        if self.protected.contains(id) {
            return Err(RegistryError::Protected(*id));
        }

        let token = self.remove_token(id);
        debug!("burned {} ({:?}) by vote", id, token.name());

        Ok(RegistryEvent::Burned {
            id: *id,
            name: token.name().to_string(),
            owner: *token.owner(),
        })
    }

    /// Add a token to the protection set
    ///
    /// Administrator only. Protecting an already-protected token is a
    /// no-op success. There is no inverse operation: protection lasts for
    /// the token's lifetime.
    pub fn protect_from_fire(
        &mut self,
        id: &NicknameId,
        caller: &AccountId,
    ) -> Result<RegistryEvent, RegistryError> {
        self.require_admin(caller)?;
        if !self.tokens.contains_key(id) {
            return Err(RegistryError::NotFound(*id));
        }

        self.protected.insert(*id);
        Ok(RegistryEvent::Protected { id: *id })
    }

    /// Replace the metadata base URI
    pub fn set_base_uri(
        &mut self,
        uri: &str,
        caller: &AccountId,
    ) -> Result<RegistryEvent, RegistryError> {
        self.require_admin(caller)?;
        self.base_uri = uri.to_string();
        Ok(RegistryEvent::BaseUriChanged {
            uri: uri.to_string(),
        })
    }

    /// Resolve the metadata location for a token
    ///
    /// The base URI and the token id are concatenated as-is; any path
    /// separator must be part of the configured base URI.
    pub fn token_uri(&self, id: &NicknameId) -> Result<String, RegistryError> {
        if !self.tokens.contains_key(id) {
            return Err(RegistryError::NotFound(*id));
        }
        Ok(format!("{}{}", self.base_uri, id.to_hex()))
    }

    /// Drain the treasury to the administrator's account
    ///
    /// The full balance is credited through the host ledger and the
    /// treasury counter resets to zero. Draining an empty treasury is a
    /// successful zero transfer.
    pub fn withdraw(
        &mut self,
        caller: &AccountId,
        ledger: &mut dyn NativeLedger,
    ) -> Result<(Amount, RegistryEvent), RegistryError> {
        self.require_admin(caller)?;

        let amount = self.treasury;
        self.treasury = 0;
        ledger.credit(&self.config.administrator, amount);

        debug!("withdrew {} to {}", amount, self.config.administrator);

        let event = RegistryEvent::Withdrawn {
            to: self.config.administrator,
            amount,
        };
        Ok((amount, event))
    }

    /// Move a token to another account
    ///
    /// Caller must be the owner or the approved account. Any approval is
    /// cleared by the transfer.
    pub fn transfer(
        &mut self,
        id: &NicknameId,
        to: &AccountId,
        caller: &AccountId,
    ) -> Result<RegistryEvent, RegistryError> {
        let token = self.tokens.get(id).ok_or(RegistryError::NotFound(*id))?;
        let authorized =
            token.owner() == caller || self.approvals.get(id) == Some(caller);
        if !authorized {
            return Err(RegistryError::Unauthorized);
        }

        let from = *token.owner();
        if let Some(count) = self.holdings.get_mut(&from) {
            *count = count.saturating_sub(1);
        }
        *self.holdings.entry(*to).or_default() += 1;
        self.approvals.remove(id);
        if let Some(token) = self.tokens.get_mut(id) {
            token.set_owner(*to);
        }

        Ok(RegistryEvent::Transferred {
            id: *id,
            from,
            to: *to,
        })
    }

    /// Approve another account for a token
    ///
    /// Only the owner may approve. The approved account can burn or
    /// transfer the token until the approval is consumed.
    pub fn approve(
        &mut self,
        id: &NicknameId,
        approved: &AccountId,
        caller: &AccountId,
    ) -> Result<RegistryEvent, RegistryError> {
        let token = self.tokens.get(id).ok_or(RegistryError::NotFound(*id))?;
        if token.owner() != caller {
            return Err(RegistryError::Unauthorized);
        }

        let owner = *token.owner();
        self.approvals.insert(*id, *approved);
        Ok(RegistryEvent::Approved {
            id: *id,
            owner,
            approved: *approved,
        })
    }

    /// Number of live tokens owned by an account
    pub fn balance_of(&self, account: &AccountId) -> u64 {
        self.holdings.get(account).copied().unwrap_or(0)
    }

    /// Current owner of a token
    pub fn owner_of(&self, id: &NicknameId) -> Result<AccountId, RegistryError> {
        self.tokens
            .get(id)
            .map(|token| *token.owner())
            .ok_or(RegistryError::NotFound(*id))
    }

    /// Get a token record
    pub fn get(&self, id: &NicknameId) -> Option<&Nickname> {
        self.tokens.get(id)
    }

    /// Look up the live token id for a name, if any
    pub fn resolve(&self, name: &str) -> Option<NicknameId> {
        self.names.get(name).copied()
    }

    /// Whether a token is in the protection set
    pub fn is_protected(&self, id: &NicknameId) -> bool {
        self.protected.contains(id)
    }

    /// The approved account for a token, if any
    pub fn approved_for(&self, id: &NicknameId) -> Option<&AccountId> {
        self.approvals.get(id)
    }

    /// Re-apply a committed event without authorization checks
    ///
    /// Used when rebuilding a registry from its commit log: the event was
    /// validated when it was first committed, so replay trusts it. Events
    /// that no longer match the state (a corrupt or truncated log) are
    /// skipped with a warning.
    pub fn apply(&mut self, event: &RegistryEvent) {
        match event {
            RegistryEvent::Minted {
                name,
                owner,
                payment,
                ..
            } => {
                let token = Nickname::new(name.clone(), *owner);
                let id = *token.id();
                self.names.insert(name.clone(), id);
                self.tokens.insert(id, token);
                *self.holdings.entry(*owner).or_default() += 1;
                self.treasury += payment;
            }
            RegistryEvent::Transferred { id, from, to } => {
                if self.tokens.contains_key(id) {
                    if let Some(count) = self.holdings.get_mut(from) {
                        *count = count.saturating_sub(1);
                    }
                    *self.holdings.entry(*to).or_default() += 1;
                    self.approvals.remove(id);
                    if let Some(token) = self.tokens.get_mut(id) {
                        token.set_owner(*to);
                    }
                } else {
                    warn!("skipping transfer of unknown token {}", id);
                }
            }
            RegistryEvent::Approved { id, approved, .. } => {
                if self.tokens.contains_key(id) {
                    self.approvals.insert(*id, *approved);
                } else {
                    warn!("skipping approval of unknown token {}", id);
                }
            }
            RegistryEvent::Burned { id, .. } => {
                if self.tokens.contains_key(id) {
                    self.remove_token(id);
                } else {
                    warn!("skipping burn of unknown token {}", id);
                }
            }
            RegistryEvent::Protected { id } => {
                self.protected.insert(*id);
            }
            RegistryEvent::BaseUriChanged { uri } => {
                self.base_uri = uri.clone();
            }
            RegistryEvent::Withdrawn { amount, .. } => {
                self.treasury = self.treasury.saturating_sub(*amount);
            }
        }
    }

    /// Drop a token and every index entry referring to it
    fn remove_token(&mut self, id: &NicknameId) -> Nickname {
        let token = self
            .tokens
            .remove(id)
            .expect("remove_token called for a live token");
        self.names.remove(token.name());
        self.approvals.remove(id);
        self.protected.remove(id);
        if let Some(count) = self.holdings.get_mut(token.owner()) {
            *count = count.saturating_sub(1);
        }
        token
    }
}
