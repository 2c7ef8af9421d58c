//! The remote execution channel seen by the power manager.

use crate::core::domain::{error::VirtualPowerResult, model::connection_config::ConnectionConfig};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

/// Captured result of one remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// Exit status, `None` if the process was killed by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Splits standard output into trimmed, non-empty lines.
    pub fn lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// An established session on the hypervisor host.
///
/// Commands run one at a time; a session is never shared between callers.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// Runs `command` through the remote login shell.
    ///
    /// # Errors
    ///
    /// * `Execution` if `check_exit_code` is set and the command exits non-zero
    /// * `Timeout` if the command outlives the configured command timeout
    /// * `Connection` if the transport itself fails
    async fn execute(&self, command: &str, check_exit_code: bool)
    -> VirtualPowerResult<CommandOutput>;
}

/// Opens [`RemoteShell`] sessions.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    /// # Errors
    ///
    /// Returns `Connection` if the host cannot be reached or rejects the
    /// credentials.
    async fn connect(&self, config: &ConnectionConfig) -> VirtualPowerResult<Box<dyn RemoteShell>>;
}
