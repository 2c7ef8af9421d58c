//! Power control for virtual machines that stand in for bare-metal nodes.
//!
//! A [`VirtualPowerManager`] is bound to one node. It logs into the
//! hypervisor host over SSH, finds the VM whose network interfaces carry the
//! node's MAC addresses, and starts, stops or resets it with the hypervisor's
//! own command line (`VBoxManage` or `virsh`).
//!
//! Transitions report their outcome as a [`PowerState`] instead of an error,
//! so a caller driving many nodes only has to look at `active`, `deleted` or
//! `error`.

mod core;
mod power;


pub use crate::core::domain::{
    error::{ValidationError, VirtualPowerError, VirtualPowerResult},
    model::{
        command_set::{Backend, CommandSet, NODE_NAME_PLACEHOLDER, shell_quote},
        connection_config::ConnectionConfig,
        node::{InstanceRecord, NicRecord, NodeRecord},
        power_state::PowerState,
        settings::{VirtualPowerSettings, VirtualPowerSettingsBuilder},
    },
    value_object::{MacAddress, RemoteHost, RemotePort, RemoteUsername},
};
pub use crate::core::infrastructure::{
    remote_shell::{CommandOutput, Connector, RemoteShell},
    ssh::{SshConnector, SshSession},
};
pub use crate::power::{PowerManager, VirtualPowerManager};
