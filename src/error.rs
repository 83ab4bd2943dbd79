use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading or validating a `GameConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Why a shop purchase was turned down.  A rejected purchase never changes
/// coins or upgrades.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("need {cost} coins, have {coins}")]
    InsufficientCoins { cost: u32, coins: u32 },
    #[error("already purchased")]
    AlreadyOwned,
}

/// Top-level error for the terminal front end.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
