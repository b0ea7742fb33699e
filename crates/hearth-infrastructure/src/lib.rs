//! Infrastructure adapters for Hearth: HTTP transport, configuration and
//! local storage.

pub mod config_service;
pub mod http_transport;
pub mod paths;
pub mod storage;
pub mod toml_ledger_store;

pub use config_service::ConfigService;
pub use http_transport::{HttpActorTransport, http_handle_factory};
pub use paths::HearthPaths;
pub use toml_ledger_store::TomlLedgerStore;
