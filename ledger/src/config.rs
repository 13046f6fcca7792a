//! Configuration for the ledger.
//!
//! TALLY_ROOT resolution order:
//! 1. Explicit path passed to Config::with_root()
//! 2. TALLY_ROOT environment variable
//! 3. Default: ~/.local/share/tally

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root directory for all ledger data.
    pub tally_root: PathBuf,

    /// Currency code used for display (amounts are stored as integer cents).
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Config {
    /// Create a new config with the given TALLY_ROOT.
    pub fn with_root(tally_root: impl Into<PathBuf>) -> Self {
        Self {
            tally_root: tally_root.into(),
            currency: default_currency(),
        }
    }

    /// Load config from TALLY_ROOT/config.toml, or create default.
    pub fn load() -> Result<Self> {
        let tally_root = resolve_tally_root()?;
        Self::load_from(&tally_root)
    }

    /// Load config from a specific TALLY_ROOT.
    pub fn load_from(tally_root: &Path) -> Result<Self> {
        let config_path = tally_root.join("config.toml");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let mut config: Config = toml::from_str(&contents)
                .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
            // Ensure tally_root matches the actual location
            config.tally_root = tally_root.to_path_buf();
            Ok(config)
        } else {
            Ok(Self::with_root(tally_root))
        }
    }

    /// Save config to TALLY_ROOT/config.toml.
    pub fn save(&self) -> Result<()> {
        let config_path = self.tally_root.join("config.toml");
        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(config_path, contents)?;
        Ok(())
    }

    // Path helpers

    /// Path to the DuckDB database file.
    pub fn db_path(&self) -> PathBuf {
        self.tally_root.join("db/tally.duckdb")
    }

    /// Path to the database directory.
    pub fn db_dir(&self) -> PathBuf {
        self.tally_root.join("db")
    }
}

/// Resolve TALLY_ROOT using the standard resolution order.
fn resolve_tally_root() -> Result<PathBuf> {
    // 1. Environment variable
    if let Ok(path) = std::env::var("TALLY_ROOT") {
        return Ok(PathBuf::from(path));
    }

    // 2. XDG data directory (via directories crate)
    if let Some(proj_dirs) = ProjectDirs::from("", "", "tally") {
        return Ok(proj_dirs.data_dir().to_path_buf());
    }

    // 3. Fallback to ~/.local/share/tally
    let home = std::env::var("HOME")
        .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;
    Ok(PathBuf::from(home).join(".local/share/tally"))
}
