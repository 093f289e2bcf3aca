use crate::id::AccountId;
use serde::{Deserialize, Serialize};

/// Amounts of the native value unit, in its smallest denomination
pub type Amount = u128;

/// Price of a paid mint, in base units of the native value unit (0.02 of
/// the whole unit)
pub const MINT_PRICE: Amount = 20_000_000_000_000_000;

/// Maximum length of a nickname in bytes
pub const MAX_NAME_LEN: usize = 64;

/// Deployment-time configuration of a registry
///
/// The administrator identity is fixed for the registry's lifetime; there
/// is no handover operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// The single privileged account
    pub administrator: AccountId,

    /// Exact payment required from non-administrator minters
    pub mint_price: Amount,

    /// Upper bound on nickname length, in bytes
    pub max_name_len: usize,
}

impl RegistryConfig {
    /// Create a configuration with the default mint price and name bound
    pub fn new(administrator: AccountId) -> Self {
        Self {
            administrator,
            mint_price: MINT_PRICE,
            max_name_len: MAX_NAME_LEN,
        }
    }

    /// Override the mint price
    pub fn with_mint_price(mut self, mint_price: Amount) -> Self {
        self.mint_price = mint_price;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let admin = AccountId::derive(b"admin");
        let config = RegistryConfig::new(admin);
        assert_eq!(config.administrator, admin);
        assert_eq!(config.mint_price, MINT_PRICE);
        assert_eq!(config.max_name_len, MAX_NAME_LEN);
    }

    #[test]
    fn test_mint_price_override() {
        let config = RegistryConfig::new(AccountId::derive(b"admin")).with_mint_price(42);
        assert_eq!(config.mint_price, 42);
    }
}
