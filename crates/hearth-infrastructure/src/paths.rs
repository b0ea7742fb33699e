//! Path resolution for Hearth's local files.
//!
//! ```text
//! ~/.config/hearth/            # Config directory
//! └── config.toml              # Client configuration
//!
//! ~/.local/share/hearth/       # Data directory
//! └── ledger/                  # Per-identity budget ledgers
//!     └── budget_entries_<principal>.toml
//! ```

use std::path::PathBuf;

use hearth_core::error::{HearthError, Result};

const APP_DIR: &str = "hearth";

pub struct HearthPaths;

impl HearthPaths {
    /// Returns the Hearth configuration directory (e.g. `~/.config/hearth/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(home_not_found)
    }

    /// Returns the Hearth data directory (e.g. `~/.local/share/hearth/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(home_not_found)
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Default directory for local budget ledgers.
    pub fn ledger_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("ledger"))
    }
}

fn home_not_found() -> HearthError {
    HearthError::config("Cannot find home directory")
}
