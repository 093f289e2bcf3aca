pub mod config;
pub mod error;
pub mod events;
pub mod id;
pub mod nickname;

// Re-export the main types for convenience
pub use config::{Amount, RegistryConfig};
pub use error::RegistryError;
pub use events::RegistryEvent;
pub use id::{AccountId, NicknameId};
pub use nickname::Nickname;
