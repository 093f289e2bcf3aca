//! Nickname token registry
//!
//! This crate re-exports all the components of the nickname registry.

pub use nickname_core::*;
pub use nickname_journal::*;
pub use nickname_registry::*;
