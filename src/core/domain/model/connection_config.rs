use crate::core::domain::{
    error::ValidationError,
    model::settings::VirtualPowerSettings,
    value_object::{
        RemoteHost, RemotePort, RemoteUsername, validate_host, validate_port, validate_username,
    },
};
use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

/// Validated credentials and limits for the remote execution channel.
///
/// A config always carries a host, a username and at least one credential
/// (password or keyfile); there is no way to build one otherwise.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    host: RemoteHost,
    port: RemotePort,
    username: RemoteUsername,
    password: Option<String>,
    keyfile: Option<PathBuf>,
    connect_timeout: Duration,
    command_timeout: Duration,
}

impl ConnectionConfig {
    /// Validates the connection part of the driver settings.
    ///
    /// Empty strings are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` when the host or username is missing or
    /// malformed, when neither a password nor a keyfile is given, or when a
    /// timeout is zero.
    pub fn from_settings(settings: &VirtualPowerSettings) -> Result<Self, ValidationError> {
        let host = non_empty(settings.ssh_host.as_deref()).ok_or_else(|| {
            ValidationError::missing("ssh_host", "virtual_power_ssh_host not defined")
        })?;
        validate_host(host)?;

        let username = non_empty(settings.host_user.as_deref()).ok_or_else(|| {
            ValidationError::missing("host_user", "virtual_power_host_user not defined")
        })?;
        validate_username(username)?;

        validate_port(settings.ssh_port)?;

        let password = non_empty(settings.host_pass.as_deref()).map(str::to_string);
        let keyfile = settings
            .host_key
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty())
            .cloned();
        if password.is_none() && keyfile.is_none() {
            return Err(ValidationError::missing(
                "host_pass",
                "virtual_power_host_pass and virtual_power_host_key are both unset",
            ));
        }

        if settings.connect_timeout_secs == 0 || settings.command_timeout_secs == 0 {
            return Err(ValidationError::ConstraintViolation(
                "Timeouts must be at least one second".to_string(),
            ));
        }

        Ok(Self {
            host: RemoteHost::new_unchecked(host.to_string()),
            port: RemotePort::new_unchecked(settings.ssh_port),
            username: RemoteUsername::new_unchecked(username.to_string()),
            password,
            keyfile,
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs),
            command_timeout: Duration::from_secs(settings.command_timeout_secs),
        })
    }

    pub fn host(&self) -> &RemoteHost {
        &self.host
    }

    pub fn port(&self) -> RemotePort {
        self.port
    }

    pub fn username(&self) -> &RemoteUsername {
        &self.username
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn keyfile(&self) -> Option<&Path> {
        self.keyfile.as_deref()
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn command_timeout(&self) -> Duration {
        self.command_timeout
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("keyfile", &self.keyfile)
            .field("connect_timeout", &self.connect_timeout)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
