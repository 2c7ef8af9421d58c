//! Records describing the machine a power manager is bound to.
//!
//! Both records come from the node registry and are read-only here.

use serde::{Deserialize, Serialize};

/// A network interface registered for a node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NicRecord {
    /// MAC address as stored in the registry, any delimiter style.
    pub address: String,
    /// Identifier of the switch the interface is wired to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datapath_id: Option<String>,
    /// Switch port number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port_no: Option<u32>,
}

impl NicRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            datapath_id: None,
            port_no: None,
        }
    }

    pub fn with_port(mut self, datapath_id: impl Into<String>, port_no: u32) -> Self {
        self.datapath_id = Some(datapath_id.into());
        self.port_no = Some(port_no);
        self
    }
}

/// The host-side record of a machine that a power manager controls.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NodeRecord {
    /// Registry identifier.
    pub id: u64,
    /// Compute service host that owns the node.
    pub service_host: String,
    /// Number of CPUs.
    #[serde(default)]
    pub cpus: u32,
    /// Memory in megabytes.
    #[serde(default)]
    pub memory_mb: u64,
    /// MAC address the node PXE boots from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prov_mac_address: Option<String>,
    /// Registered interfaces. Their MACs identify the VM on the hypervisor.
    #[serde(default)]
    pub interfaces: Vec<NicRecord>,
}

/// The logical instance scheduled onto a node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InstanceRecord {
    /// Instance UUID.
    pub id: String,
    /// Hostname given to the instance, used in log lines.
    #[serde(default)]
    pub hostname: String,
    /// Registry id of the node the instance is assigned to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<u64>,
}
