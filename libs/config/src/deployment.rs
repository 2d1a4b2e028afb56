//! Deployment configuration loading and validation

use crate::defaults;
use anyhow::{bail, ensure, Context, Result};
use config_crate::{Config, Environment, File};
use epc_codec::{get_epc_filter_spec, get_max_iar_prefix, partition};
use epc_types::FilterSpec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Full configuration of one provisioning station
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct DeploymentConfig {
    /// Identity of the deployment; absent until a station is assigned one
    #[serde(default)]
    pub deployment: Option<AssetDeployment>,

    #[serde(default)]
    pub reader: ReaderSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

/// GS1 identity shared by every tag a deployment writes
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AssetDeployment {
    /// 6-12 digits, leading zeros significant
    pub company_prefix: String,
    pub iar_prefix: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ReaderSettings {
    /// Transmit power (dBm)
    pub power: u32,
    pub scan_rate: u32,
    pub event_rate: u32,
    pub sound_enabled: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            power: defaults::reader::POWER,
            scan_rate: defaults::reader::SCAN_RATE,
            event_rate: defaults::reader::EVENT_RATE_MS,
            sound_enabled: defaults::reader::SOUND_ENABLED,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
        }
    }
}

impl DeploymentConfig {
    /// Load from `path` (or the optional default file) with `EPC_` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, defaults::ENV_PREFIX)
    }

    /// Load with a custom environment prefix
    pub fn load_from(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let file = match path {
            Some(path) => {
                info!("Loading deployment config: {:?}", path);
                File::from(path).required(true)
            }
            None => {
                debug!("Looking for deployment config at {}", defaults::DEFAULT_CONFIG_PATH);
                File::with_name(defaults::DEFAULT_CONFIG_PATH).required(false)
            }
        };

        // No try_parsing: prefixes are strings and keep their leading zeros
        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator(defaults::ENV_SEPARATOR),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Reject a deployment the codec could never encode for
    pub fn validate(&self) -> Result<()> {
        if let Some(deployment) = &self.deployment {
            deployment.validate()?;
        }
        ensure!(
            (defaults::reader::MIN_POWER..=defaults::reader::MAX_POWER).contains(&self.reader.power),
            "reader.power {} outside {}..={}",
            self.reader.power,
            defaults::reader::MIN_POWER,
            defaults::reader::MAX_POWER
        );
        ensure!(self.reader.scan_rate > 0, "reader.scan_rate must be positive");
        ensure!(self.reader.event_rate > 0, "reader.event_rate must be positive");
        Ok(())
    }

    /// The configured deployment, or an error naming the missing section
    pub fn require_deployment(&self) -> Result<&AssetDeployment> {
        self.deployment
            .as_ref()
            .context("no [deployment] section configured (company_prefix, iar_prefix)")
    }

    /// EPC-bank filter matching every tag of the configured deployment
    pub fn epc_filter(&self) -> Result<FilterSpec> {
        let deployment = self.require_deployment()?;
        get_epc_filter_spec(&deployment.iar_prefix, &deployment.company_prefix).with_context(|| {
            format!(
                "Failed to derive filter for {}.{}",
                deployment.company_prefix, deployment.iar_prefix
            )
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

impl AssetDeployment {
    pub fn new(company_prefix: impl Into<String>, iar_prefix: impl Into<String>) -> Self {
        Self {
            company_prefix: company_prefix.into(),
            iar_prefix: iar_prefix.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let cp = &self.company_prefix;
        if partition::for_company_prefix(cp).is_none() {
            bail!("company_prefix {:?} must be 6 to 12 digits", cp);
        }

        let iar = &self.iar_prefix;
        ensure!(
            !iar.is_empty() && iar.bytes().all(|b| b.is_ascii_digit()),
            "iar_prefix {:?} must be numeric",
            iar
        );
        ensure!(!iar.starts_with('0'), "iar_prefix {:?} must not start with 0", iar);

        let max = get_max_iar_prefix(cp);
        let value: u64 = iar
            .parse()
            .with_context(|| format!("iar_prefix {:?} exceeds {}", iar, max))?;
        ensure!(
            (1..=max).contains(&value),
            "iar_prefix {} out of range 1..={} for a {}-digit company prefix",
            value,
            max,
            cp.len()
        );
        Ok(())
    }
}

/// Expand `~` and `$VAR` in a user-supplied config path
pub fn expand_config_path(raw: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(raw).with_context(|| format!("Failed to expand config path {:?}", raw))?;
    Ok(PathBuf::from(expanded.as_ref()))
}
