//! Hypervisor CLI command templates.
//!
//! Every template may contain the `{_NodeName_}` placeholder, which is
//! replaced by the shell-quoted VM name before the command is sent.

use crate::core::domain::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Placeholder substituted with the matched VM name.
pub const NODE_NAME_PLACEHOLDER: &str = "{_NodeName_}";

/// Supported virtualization backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub enum Backend {
    /// Oracle VirtualBox driven through `VBoxManage`.
    VirtualBox,
    /// libvirt driven through `virsh`.
    Virsh,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::VirtualBox => "vbox",
            Backend::Virsh => "virsh",
        }
    }

    /// Returns the command templates for this backend.
    pub fn command_set(&self) -> CommandSet {
        match self {
            Backend::VirtualBox => CommandSet {
                base_cmd: "/usr/bin/VBoxManage",
                list_cmd: "list vms | awk -F'\"' '{print $2}'",
                get_node_macs: "showvminfo --machinereadable {_NodeName_} | grep macaddress | awk -F'\"' '{print $2}'",
                start_cmd: "startvm {_NodeName_}",
                stop_cmd: "controlvm {_NodeName_} poweroff",
                reboot_cmd: "controlvm {_NodeName_} reset",
                list_running_cmd: "list runningvms | sed 's/ {[^}]*}$//'",
            },
            Backend::Virsh => CommandSet {
                base_cmd: "LC_ALL=C /usr/bin/virsh",
                list_cmd: "list --all --name",
                get_node_macs: "dumpxml {_NodeName_} | grep 'mac address' | awk -F\"'\" '{print $2}' | tr -d ':'",
                start_cmd: "start {_NodeName_}",
                stop_cmd: "destroy {_NodeName_}",
                reboot_cmd: "reset {_NodeName_}",
                list_running_cmd: "list --name --state-running",
            },
        }
    }
}

impl FromStr for Backend {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vbox" | "virtualbox" => Ok(Backend::VirtualBox),
            "virsh" | "libvirt" => Ok(Backend::Virsh),
            "" => Err(ValidationError::missing(
                "virtual_power_type",
                "Backend type is required",
            )),
            other => Err(ValidationError::ConstraintViolation(format!(
                "Unsupported virtual power type '{other}' (expected vbox or virsh)"
            ))),
        }
    }
}

impl TryFrom<String> for Backend {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Backend> for String {
    fn from(backend: Backend) -> Self {
        backend.as_str().to_string()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of CLI commands for one backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSet {
    /// Program prefixed to every command.
    pub base_cmd: &'static str,
    /// Prints one VM name per line.
    pub list_cmd: &'static str,
    /// Prints the MAC addresses of `{_NodeName_}`, one per line.
    pub get_node_macs: &'static str,
    pub start_cmd: &'static str,
    pub stop_cmd: &'static str,
    pub reboot_cmd: &'static str,
    /// Prints the names of running VMs, one per line.
    pub list_running_cmd: &'static str,
}

impl CommandSet {
    /// Renders a template into the full command line sent to the host.
    pub fn render(&self, template: &str, node_name: &str) -> String {
        format!(
            "{} {}",
            self.base_cmd,
            template.replace(NODE_NAME_PLACEHOLDER, node_name)
        )
    }
}

/// Quotes `name` as one word for a POSIX shell.
///
/// Names come from the hypervisor listing and may contain anything, so they
/// are wrapped in single quotes, inside which the shell expands nothing.
pub fn shell_quote(name: &str) -> String {
    format!("'{}'", name.replace('\'', r"'\''"))
}
