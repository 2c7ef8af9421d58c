//! Power control for a VM living on a remote hypervisor.
//!
//! The VM is found by MAC address: every VM the hypervisor CLI lists is asked
//! for its MACs, and the first one that owns a MAC of the node's interfaces
//! becomes the target of the power commands.

use crate::{
    core::{
        domain::{
            error::{ValidationError, VirtualPowerError, VirtualPowerResult},
            model::{
                command_set::{Backend, CommandSet, NODE_NAME_PLACEHOLDER, shell_quote},
                connection_config::ConnectionConfig,
                node::{InstanceRecord, NodeRecord},
                power_state::PowerState,
                settings::VirtualPowerSettings,
            },
            value_object::MacAddress,
        },
        infrastructure::{
            remote_shell::{Connector, RemoteShell},
            ssh::SshConnector,
        },
    },
    power::PowerManager,
};
use async_trait::async_trait;
use tracing::{debug, error, info, instrument, warn};

/// Drives one VM through the hypervisor's command line over SSH.
///
/// A manager is bound to a single node and is not meant to be shared: every
/// operation takes `&mut self` and runs its commands one after another on a
/// connection opened on first use.
///
/// # Examples
///
/// ```no_run
/// use virtual_power::{
///     InstanceRecord, NicRecord, NodeRecord, PowerManager, VirtualPowerManager,
///     VirtualPowerResult, VirtualPowerSettings,
/// };
///
/// #[tokio::main]
/// async fn main() -> VirtualPowerResult<()> {
///     let settings = VirtualPowerSettings::builder()
///         .backend("vbox")
///         .host("10.0.0.1")
///         .user("stack")
///         .keyfile("/home/stack/.ssh/id_ed25519")
///         .build();
///     let node = NodeRecord {
///         id: 1,
///         service_host: "compute-1".to_string(),
///         cpus: 2,
///         memory_mb: 2048,
///         prov_mac_address: None,
///         interfaces: vec![NicRecord::new("08:00:27:ab:cd:ef")],
///     };
///     let instance = InstanceRecord {
///         id: "6c4f0a1e".to_string(),
///         hostname: "bm-1".to_string(),
///         node: Some(1),
///     };
///
///     let mut manager = VirtualPowerManager::new(node, instance, &settings)?;
///     println!("{}", manager.activate_node().await);
///     Ok(())
/// }
/// ```
pub struct VirtualPowerManager<C: Connector = SshConnector> {
    node: NodeRecord,
    instance: InstanceRecord,
    backend: Backend,
    commands: CommandSet,
    connection_data: ConnectionConfig,
    connector: C,
    connection: Option<Box<dyn RemoteShell>>,
    mac_addresses: Vec<MacAddress>,
    matched_name: String,
    /// Unquoted form of `matched_name`, the target of power commands.
    matched_vm: Option<String>,
    state: Option<PowerState>,
}

impl VirtualPowerManager<SshConnector> {
    /// Creates a manager that talks to the hypervisor with the system `ssh`.
    ///
    /// # Errors
    ///
    /// Returns `VirtualPowerError::Validation` if the settings name an unknown
    /// backend, lack a host, user or credential, or if the records are
    /// inconsistent.
    pub fn new(
        node: NodeRecord,
        instance: InstanceRecord,
        settings: &VirtualPowerSettings,
    ) -> VirtualPowerResult<Self> {
        Self::with_connector(node, instance, settings, SshConnector)
    }
}

impl<C: Connector> VirtualPowerManager<C> {
    /// Creates a manager that opens its session through `connector`.
    pub fn with_connector(
        node: NodeRecord,
        instance: InstanceRecord,
        settings: &VirtualPowerSettings,
        connector: C,
    ) -> VirtualPowerResult<Self> {
        let backend: Backend = settings.virtual_power_type.parse()?;

        if let Some(node_id) = instance.node {
            if node_id != node.id {
                return Err(ValidationError::ConstraintViolation(format!(
                    "Instance {} is assigned to node {} but node {} was given",
                    instance.id, node_id, node.id
                ))
                .into());
            }
        }

        let mac_addresses = node
            .interfaces
            .iter()
            .map(|nic| MacAddress::parse(&nic.address))
            .collect::<Result<Vec<_>, _>>()?;

        let connection_data = ConnectionConfig::from_settings(settings)?;

        Ok(Self {
            node,
            instance,
            backend,
            commands: backend.command_set(),
            connection_data,
            connector,
            connection: None,
            mac_addresses,
            matched_name: String::new(),
            matched_vm: None,
            state: None,
        })
    }

    pub fn node(&self) -> &NodeRecord {
        &self.node
    }

    pub fn instance(&self) -> &InstanceRecord {
        &self.instance
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn commands(&self) -> &CommandSet {
        &self.commands
    }

    pub fn connection_data(&self) -> &ConnectionConfig {
        &self.connection_data
    }

    /// Normalized MACs of the node's interfaces.
    pub fn mac_addresses(&self) -> &[MacAddress] {
        &self.mac_addresses
    }

    /// Quoted name found by the last lookup, empty if none matched.
    pub fn matched_name(&self) -> &str {
        &self.matched_name
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Opens the remote session unless one is already open.
    ///
    /// # Errors
    ///
    /// Returns `VirtualPowerError::Connection` if the session cannot be
    /// opened. The manager stays unconnected and the next call tries again.
    pub async fn resolve_connection(&mut self) -> VirtualPowerResult<()> {
        if self.connection.is_none() {
            debug!(
                host = self.connection_data.host().as_str(),
                port = self.connection_data.port().get(),
                "Connecting to hypervisor"
            );
            let shell = self.connector.connect(&self.connection_data).await?;
            self.connection = Some(shell);
        }
        Ok(())
    }

    /// Runs a command template and returns its output lines.
    ///
    /// `{_NodeName_}` is replaced with the current matched name and the
    /// backend's base command is prefixed. Any failure is logged and yields
    /// no lines.
    pub async fn run_command(&mut self, template: &str) -> Vec<String> {
        match self.try_run_command(template).await {
            Ok(lines) => lines,
            Err(e) => {
                error!(command = template, error = %e, "Error running command");
                Vec::new()
            }
        }
    }

    async fn try_run_command(&mut self, template: &str) -> VirtualPowerResult<Vec<String>> {
        self.resolve_connection().await?;
        let target = self
            .matched_vm
            .as_deref()
            .map(shell_quote)
            .unwrap_or_default();
        let command = self.commands.render(template, &target);
        let shell = self
            .connection
            .as_deref()
            .ok_or_else(|| VirtualPowerError::Connection("No session open".to_string()))?;
        let lines = shell.execute(&command, true).await?.lines();
        debug!(command = %command, ?lines, "Result for run_command");
        Ok(lines)
    }

    /// Lists the names of every VM known to the hypervisor.
    pub async fn list_all_nodes(&mut self) -> Vec<String> {
        debug!("Getting full node list");
        let list_cmd = self.commands.list_cmd;
        self.run_command(list_cmd)
            .await
            .into_iter()
            .map(|name| name.trim_matches('"').to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Finds the VM that owns one of this node's MAC addresses.
    ///
    /// Returns the quoted VM name, or an empty string when no VM matched.
    /// The result is also kept as the target of later commands, where it is
    /// shell-quoted so the remote shell never expands anything in it.
    pub async fn locate_node(&mut self) -> String {
        debug!(macs = ?self.mac_addresses, "Looking up name for MAC addresses");
        self.matched_name.clear();
        self.matched_vm = None;

        for candidate in self.list_all_nodes().await {
            let macs_cmd = self
                .commands
                .get_node_macs
                .replace(NODE_NAME_PLACEHOLDER, &shell_quote(&candidate));
            let owned = self
                .run_command(&macs_cmd)
                .await
                .iter()
                .filter_map(|line| MacAddress::parse(line).ok())
                .any(|mac| self.mac_addresses.contains(&mac));
            if owned {
                self.matched_name = format!("\"{candidate}\"");
                debug!(name = %self.matched_name, "Matched VM by MAC address");
                self.matched_vm = Some(candidate);
                break;
            }
        }
        self.matched_name.clone()
    }

    /// Checks whether the located VM appears in the running list.
    ///
    /// A running entry only counts if it is exactly the matched name; a VM
    /// called `testNode01` does not make `testNode` running.
    pub async fn query_power_state(&mut self) -> bool {
        let name = self.locate_node().await;
        if name.is_empty() {
            warn!(
                instance = %self.instance.id,
                macs = ?self.mac_addresses,
                "Node with these MAC addresses not found"
            );
            return false;
        }

        let list_running_cmd = self.commands.list_running_cmd;
        let bare = self.matched_vm.clone().unwrap_or_default();
        self.run_command(list_running_cmd)
            .await
            .iter()
            .any(|line| *line == name || *line == bare)
    }

    #[instrument(skip(self), fields(instance = %self.instance.id, backend = %self.backend))]
    pub async fn activate(&mut self) -> PowerState {
        info!("Activating node");
        let state = if self.locate_node().await.is_empty() {
            warn!("Cannot start a node that was not found");
            PowerState::Error
        } else if !self.power_command(self.commands.start_cmd).await {
            PowerState::Error
        } else if self.query_power_state().await {
            PowerState::Active
        } else {
            PowerState::Error
        };
        self.finish(state)
    }

    /// Stops the VM if it is running, then confirms it is off.
    #[instrument(skip(self), fields(instance = %self.instance.id, backend = %self.backend))]
    pub async fn deactivate(&mut self) -> PowerState {
        info!("Deactivating node");
        if self.query_power_state().await {
            if !self.power_command(self.commands.stop_cmd).await {
                return self.finish(PowerState::Error);
            }
        } else {
            debug!("Node already powered off");
        }
        let state = if self.query_power_state().await {
            PowerState::Error
        } else {
            PowerState::Deleted
        };
        self.finish(state)
    }

    #[instrument(skip(self), fields(instance = %self.instance.id, backend = %self.backend))]
    pub async fn reboot(&mut self) -> PowerState {
        info!("Rebooting node");
        let state = if self.locate_node().await.is_empty() {
            warn!("Cannot reboot a node that was not found");
            PowerState::Error
        } else if !self.power_command(self.commands.reboot_cmd).await {
            PowerState::Error
        } else if self.query_power_state().await {
            PowerState::Active
        } else {
            PowerState::Error
        };
        self.finish(state)
    }

    /// Runs a state-changing command; `false` aborts the transition.
    async fn power_command(&mut self, template: &'static str) -> bool {
        match self.try_run_command(template).await {
            Ok(_) => true,
            Err(e) => {
                error!(command = template, error = %e, "Power command failed");
                false
            }
        }
    }

    fn finish(&mut self, state: PowerState) -> PowerState {
        info!(%state, "Power transition finished");
        self.state = Some(state);
        state
    }
}

#[async_trait]
impl<C: Connector> PowerManager for VirtualPowerManager<C> {
    async fn activate_node(&mut self) -> PowerState {
        self.activate().await
    }

    async fn deactivate_node(&mut self) -> PowerState {
        self.deactivate().await
    }

    async fn reboot_node(&mut self) -> PowerState {
        self.reboot().await
    }

    async fn is_power_on(&mut self) -> bool {
        debug!(instance = %self.instance.hostname, "Checking if node is running");
        self.query_power_state().await
    }

    fn state(&self) -> Option<PowerState> {
        self.state
    }
}
