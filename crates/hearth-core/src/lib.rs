//! Domain models, ports and error handling for the Hearth client data layer.

pub mod blob;
pub mod budget;
pub mod chat;
pub mod config;
pub mod error;
pub mod household;
pub mod identity;
pub mod profile;
pub mod remote;
pub mod time;

// Re-export common error type
pub use error::{HearthError, Result};
