//! # Deployment Configuration
//!
//! Loads the settings a provisioning station needs: the GS1 company prefix and
//! IAR prefix of the deployment, reader tuning, and the log filter.
//!
//! ## Sources
//!
//! - **TOML file**: `config/deployment.toml` by default, or an explicit path
//! - **Environment**: `EPC_<SECTION>__<KEY>` overrides any file value
//!
//! ## Usage
//!
//! ```rust,no_run
//! use epc_config::DeploymentConfig;
//!
//! let config = DeploymentConfig::load(None)?;
//! config.validate()?;
//! let filter = config.epc_filter()?;
//! println!("scoping reader to {}", filter.data);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod defaults;
pub mod deployment;

pub use deployment::{
    expand_config_path, AssetDeployment, DeploymentConfig, LoggingSettings, ReaderSettings,
};
