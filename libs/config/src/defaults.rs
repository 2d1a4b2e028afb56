//! Deployment defaults
//!
//! Default values used when a configuration file or environment leaves a setting
//! unspecified.

/// Configuration file read when no path is given (optional at that location)
pub const DEFAULT_CONFIG_PATH: &str = "config/deployment.toml";

/// Prefix for environment overrides, e.g. `EPC_DEPLOYMENT__COMPANY_PREFIX`
pub const ENV_PREFIX: &str = "EPC";

/// Separator between nested keys in environment overrides
pub const ENV_SEPARATOR: &str = "__";

/// Reader defaults
pub mod reader {
    /// Transmit power (dBm)
    pub const POWER: u32 = 30;

    pub const MIN_POWER: u32 = 5;
    pub const MAX_POWER: u32 = 33;

    /// Inventory rounds per second requested from the reader
    pub const SCAN_RATE: u32 = 30;

    /// Milliseconds between batched tag events
    pub const EVENT_RATE_MS: u32 = 250;

    pub const SOUND_ENABLED: bool = true;
}

/// Default log filter when neither config nor `RUST_LOG` sets one
pub const LOG_LEVEL: &str = "info";
