pub mod ledger;
pub mod registry;

// Re-export the main types for convenience
pub use ledger::{MockLedger, NativeLedger};
pub use registry::NicknameRegistry;
