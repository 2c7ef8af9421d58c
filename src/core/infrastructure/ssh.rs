//! [`RemoteShell`] over the system OpenSSH client.
//!
//! Each session keeps one multiplexed master connection (`ControlMaster`),
//! so the TCP/auth handshake happens once per manager and every later command
//! rides on it. The master's socket lives in a private directory owned by the
//! session; no other session can attach to it, and the master is told to exit
//! when the session is dropped. Password logins go through `sshpass`, which
//! reads the password from the `SSHPASS` environment variable.

use crate::core::{
    domain::{
        error::{VirtualPowerError, VirtualPowerResult},
        model::connection_config::ConnectionConfig,
    },
    infrastructure::remote_shell::{CommandOutput, Connector, RemoteShell},
};
use async_trait::async_trait;
use std::{path::PathBuf, process::Stdio};
use tempfile::TempDir;
use tokio::process::Command;
use tracing::{debug, warn};

const SSH_PROGRAM: &str = "ssh";
const SSHPASS_PROGRAM: &str = "sshpass";
/// Seconds an idle master outlives its last command if the session is leaked.
const CONTROL_PERSIST_SECS: u64 = 300;

/// Opens [`SshSession`]s.
#[derive(Debug, Clone, Default)]
pub struct SshConnector;

#[async_trait]
impl Connector for SshConnector {
    async fn connect(&self, config: &ConnectionConfig) -> VirtualPowerResult<Box<dyn RemoteShell>> {
        check_keyfile(config).await?;
        let session = SshSession::new(config.clone())?;
        session.open_master().await?;
        Ok(Box::new(session))
    }
}

/// A session on the hypervisor host backed by an SSH master connection.
#[derive(Debug)]
pub struct SshSession {
    config: ConnectionConfig,
    control_path: PathBuf,
    // Dropped after `Drop::drop` has closed the master.
    _control_dir: TempDir,
}

impl SshSession {
    /// Creates a session with its own control socket directory (mode 0700).
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the directory cannot be created.
    pub fn new(config: ConnectionConfig) -> VirtualPowerResult<Self> {
        let control_dir = tempfile::Builder::new()
            .prefix("virtual-power-")
            .tempdir()
            .map_err(|e| {
                VirtualPowerError::Connection(format!("Cannot create control directory: {}", e))
            })?;
        let control_path = control_dir.path().join("master");
        Ok(Self {
            config,
            control_path,
            _control_dir: control_dir,
        })
    }

    pub fn control_path(&self) -> &std::path::Path {
        &self.control_path
    }

    fn destination(&self) -> String {
        format!(
            "{}@{}",
            self.config.username().as_str(),
            self.config.host().as_str()
        )
    }

    /// Builds the local process invocation for a remote command.
    pub(crate) fn command(&self, remote_command: &str) -> Command {
        let use_password = self.config.keyfile().is_none();
        let mut cmd = if use_password {
            let mut cmd = Command::new(SSHPASS_PROGRAM);
            cmd.arg("-e").arg(SSH_PROGRAM);
            if let Some(password) = self.config.password() {
                cmd.env("SSHPASS", password);
            }
            cmd
        } else {
            Command::new(SSH_PROGRAM)
        };

        cmd.args(self.ssh_args(use_password))
            .arg(self.destination())
            .arg("--")
            .arg(remote_command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    pub(crate) fn ssh_args(&self, use_password: bool) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            self.config.port().get().to_string(),
            "-o".to_string(),
            format!(
                "ConnectTimeout={}",
                self.config.connect_timeout().as_secs()
            ),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-o".to_string(),
            "ControlMaster=auto".to_string(),
            "-o".to_string(),
            format!("ControlPath={}", self.control_path.display()),
            "-o".to_string(),
            format!("ControlPersist={CONTROL_PERSIST_SECS}"),
        ];
        match self.config.keyfile() {
            Some(keyfile) if !use_password => {
                args.push("-i".to_string());
                args.push(keyfile.display().to_string());
                args.push("-o".to_string());
                args.push("BatchMode=yes".to_string());
            }
            _ => {
                args.push("-o".to_string());
                args.push("PubkeyAuthentication=no".to_string());
                args.push("-o".to_string());
                args.push("PreferredAuthentications=password,keyboard-interactive".to_string());
            }
        }
        args
    }

    /// Opens the master connection by running a no-op command.
    async fn open_master(&self) -> VirtualPowerResult<()> {
        debug!(host = self.config.host().as_str(), "Opening SSH session");
        self.execute("true", true).await.map(|_| ()).map_err(|e| {
            warn!(host = self.config.host().as_str(), error = %e, "SSH session could not be opened");
            VirtualPowerError::Connection(format!(
                "Cannot reach {}: {}",
                self.destination(),
                e
            ))
        })
    }
}

#[async_trait]
impl RemoteShell for SshSession {
    async fn execute(
        &self,
        command: &str,
        check_exit_code: bool,
    ) -> VirtualPowerResult<CommandOutput> {
        let timeout = self.config.command_timeout();
        let output = tokio::time::timeout(timeout, self.command(command).output())
            .await
            .map_err(|_| VirtualPowerError::Timeout {
                command: command.to_string(),
                after: timeout,
            })?
            .map_err(|e| VirtualPowerError::Connection(format!("Failed to spawn ssh: {}", e)))?;

        let output = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };
        debug!(command, exit_code = ?output.exit_code, "Remote command finished");

        if check_exit_code && !output.is_success() {
            return Err(VirtualPowerError::Execution {
                command: command.to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if !self.control_path.exists() {
            return;
        }
        let closed = std::process::Command::new(SSH_PROGRAM)
            .arg("-o")
            .arg(format!("ControlPath={}", self.control_path.display()))
            .args(["-O", "exit"])
            .arg(self.destination())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        if let Err(e) = closed {
            warn!(error = %e, "Could not close SSH master connection");
        }
    }
}

/// Fails early when the configured private key cannot be read.
pub(crate) async fn check_keyfile(config: &ConnectionConfig) -> VirtualPowerResult<()> {
    let Some(keyfile) = config.keyfile() else {
        return Ok(());
    };
    match tokio::fs::metadata(keyfile).await {
        Ok(metadata) if metadata.is_file() => Ok(()),
        _ => Err(VirtualPowerError::Connection(format!(
            "Keyfile {} does not exist",
            keyfile.display()
        ))),
    }
}
