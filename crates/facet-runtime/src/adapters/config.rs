//! # Configuration Providers

use crate::domain::entities::{DeploymentConfig, RuntimeConfig};
use crate::domain::value_objects::Address;
use crate::errors::ConfigError;
use crate::ports::outbound::ConfigProvider;
use crate::service::ServiceConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;

// ============================================================================
// StaticConfigProvider - Hardcoded config for testing/development
// ============================================================================

/// Static configuration provider with hardcoded values.
///
/// Useful for tests and embedding. To read a file, use `TomlConfigProvider`.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: ServiceConfig,
}

impl StaticConfigProvider {
    /// Create with default config: no admin, no owner, no forwarders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given execution limits.
    #[must_use]
    pub fn with_runtime(mut self, runtime: RuntimeConfig) -> Self {
        self.config.runtime = runtime;
        self
    }

    /// Use the given construction parameters.
    #[must_use]
    pub fn with_deployment(mut self, deployment: DeploymentConfig) -> Self {
        self.config.deployment = deployment;
        self
    }

    /// Add a trusted forwarder.
    #[must_use]
    pub fn with_forwarder(mut self, forwarder: Address) -> Self {
        self.config.deployment.trusted_forwarders.push(forwarder);
        self
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn service_config(&self) -> ServiceConfig {
        self.config.clone()
    }
}

// ============================================================================
// TomlConfigProvider - Config file loading
// ============================================================================

/// Configuration file structure.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    runtime: RuntimeConfigFile,
    #[serde(default)]
    deployment: DeploymentConfigFile,
}

#[derive(Debug, Deserialize, Default)]
struct RuntimeConfigFile {
    max_call_depth: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
struct DeploymentConfigFile {
    address: Option<String>,
    admin: Option<String>,
    owner: Option<String>,
    #[serde(default)]
    trusted_forwarders: Vec<String>,
}

/// TOML-based configuration provider.
///
/// # Config File Format
///
/// ```toml
/// [runtime]
/// max_call_depth = 128
///
/// [deployment]
/// address = "0xd1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1"
/// admin = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
/// owner = "0x0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e"
/// trusted_forwarders = [
///     "0xf0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0f0",
/// ]
/// ```
///
/// Missing addresses default to zero (no holder).
#[derive(Debug, Clone)]
pub struct TomlConfigProvider {
    config: ServiceConfig,
}

impl TomlConfigProvider {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// `Parse` on malformed TOML, `InvalidAddress` on a bad address field.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let runtime = RuntimeConfig {
            max_call_depth: file
                .runtime
                .max_call_depth
                .unwrap_or(RuntimeConfig::default().max_call_depth),
        };

        let dc = file.deployment;
        let trusted_forwarders = dc
            .trusted_forwarders
            .iter()
            .map(|value| parse_address("trusted_forwarders", value))
            .collect::<Result<Vec<_>, _>>()?;
        let deployment = DeploymentConfig {
            address: parse_optional_address("address", dc.address.as_deref())?,
            admin: parse_optional_address("admin", dc.admin.as_deref())?,
            owner: parse_optional_address("owner", dc.owner.as_deref())?,
            trusted_forwarders,
        };

        Ok(Self {
            config: ServiceConfig {
                runtime,
                deployment,
            },
        })
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn service_config(&self) -> ServiceConfig {
        self.config.clone()
    }
}

fn parse_address(field: &str, value: &str) -> Result<Address, ConfigError> {
    Address::from_hex(value).ok_or_else(|| ConfigError::InvalidAddress {
        field: field.to_string(),
        value: value.to_string(),
    })
}

fn parse_optional_address(field: &str, value: Option<&str>) -> Result<Address, ConfigError> {
    value.map_or(Ok(Address::ZERO), |v| parse_address(field, v))
}

// =============================================================================
// TESTS
// =============================================================================
