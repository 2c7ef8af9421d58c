//! Configuration accepted by the virtual power driver.

use crate::core::domain::{error::ValidationError, value_object::RemotePort};
use serde::Deserialize;
use std::path::PathBuf;

const ENV_PREFIX: &str = "VIRTUAL_POWER_";

/// Raw driver settings, before validation.
///
/// Every field mirrors one configuration option of the driver. Nothing is
/// checked until a [`VirtualPowerManager`](crate::VirtualPowerManager) is
/// constructed from it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VirtualPowerSettings {
    /// Backend identifier, `vbox` or `virsh`.
    pub virtual_power_type: String,
    /// Hypervisor host reachable over SSH.
    pub ssh_host: Option<String>,
    pub ssh_port: u16,
    /// Login on the hypervisor host.
    pub host_user: Option<String>,
    pub host_pass: Option<String>,
    /// Private key used instead of (or in addition to) the password.
    pub host_key: Option<PathBuf>,
    pub connect_timeout_secs: u64,
    pub command_timeout_secs: u64,
}

impl Default for VirtualPowerSettings {
    fn default() -> Self {
        Self {
            virtual_power_type: "vbox".to_string(),
            ssh_host: None,
            ssh_port: RemotePort::DEFAULT.get(),
            host_user: None,
            host_pass: None,
            host_key: None,
            connect_timeout_secs: 10,
            command_timeout_secs: 60,
        }
    }
}

impl VirtualPowerSettings {
    /// Creates a new builder starting from the defaults
    pub fn builder() -> VirtualPowerSettingsBuilder {
        VirtualPowerSettingsBuilder::default()
    }

    /// Reads `VIRTUAL_POWER_*` variables from the process environment.
    ///
    /// Recognized: `TYPE`, `SSH_HOST`, `SSH_PORT`, `HOST_USER`, `HOST_PASS`,
    /// `HOST_KEY`, `CONNECT_TIMEOUT`, `COMMAND_TIMEOUT`.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(kind) = lookup("TYPE") {
            settings.virtual_power_type = kind;
        }
        settings.ssh_host = lookup("SSH_HOST");
        settings.host_user = lookup("HOST_USER");
        settings.host_pass = lookup("HOST_PASS");
        settings.host_key = lookup("HOST_KEY").map(PathBuf::from);
        if let Some(port) = lookup("SSH_PORT") {
            settings.ssh_port = parse_number("SSH_PORT", &port)?;
        }
        if let Some(secs) = lookup("CONNECT_TIMEOUT") {
            settings.connect_timeout_secs = parse_number("CONNECT_TIMEOUT", &secs)?;
        }
        if let Some(secs) = lookup("COMMAND_TIMEOUT") {
            settings.command_timeout_secs = parse_number("COMMAND_TIMEOUT", &secs)?;
        }
        Ok(settings)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ValidationError> {
    value.trim().parse().map_err(|_| ValidationError::Field {
        field: format!("{ENV_PREFIX}{key}"),
        message: format!("'{value}' is not a valid number"),
    })
}

/// Builder for VirtualPowerSettings
#[derive(Debug, Default)]
pub struct VirtualPowerSettingsBuilder {
    settings: VirtualPowerSettings,
}

impl VirtualPowerSettingsBuilder {
    pub fn backend(mut self, virtual_power_type: impl Into<String>) -> Self {
        self.settings.virtual_power_type = virtual_power_type.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.settings.ssh_host = Some(host.into());
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.settings.ssh_port = port;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.settings.host_user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.settings.host_pass = Some(password.into());
        self
    }

    pub fn keyfile(mut self, keyfile: impl Into<PathBuf>) -> Self {
        self.settings.host_key = Some(keyfile.into());
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.settings.connect_timeout_secs = secs;
        self
    }

    pub fn command_timeout_secs(mut self, secs: u64) -> Self {
        self.settings.command_timeout_secs = secs;
        self
    }

    pub fn build(self) -> VirtualPowerSettings {
        self.settings
    }
}
