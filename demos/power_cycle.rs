//! Drives one VM through the virtual power driver.
//!
//! Settings come from `VIRTUAL_POWER_*` variables (a `.env` file works too).
//!
//! ```text
//! cargo run --example power_cycle -- <status|on|off|reboot> <mac> [<mac>...]
//! ```

use tracing_subscriber::EnvFilter;
use virtual_power::{
    InstanceRecord, NicRecord, NodeRecord, PowerManager, VirtualPowerManager, VirtualPowerResult,
    VirtualPowerSettings,
};

#[tokio::main]
async fn main() -> VirtualPowerResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    dotenvy::dotenv().ok();

    let mut args = std::env::args().skip(1);
    let action = args.next().unwrap_or_else(|| "status".to_string());
    let macs: Vec<String> = args.collect();
    if macs.is_empty() {
        eprintln!("usage: power_cycle <status|on|off|reboot> <mac> [<mac>...]");
        std::process::exit(2);
    }

    let settings = VirtualPowerSettings::from_env()?;
    let node = NodeRecord {
        id: 1,
        service_host: "demo".to_string(),
        cpus: 1,
        memory_mb: 1024,
        prov_mac_address: None,
        interfaces: macs.into_iter().map(NicRecord::new).collect(),
    };
    let instance = InstanceRecord {
        id: "demo".to_string(),
        hostname: "demo".to_string(),
        node: Some(1),
    };

    let mut manager = VirtualPowerManager::new(node, instance, &settings)?;
    manager.resolve_connection().await?;

    match action.as_str() {
        "on" => println!("{}", manager.activate_node().await),
        "off" => println!("{}", manager.deactivate_node().await),
        "reboot" => println!("{}", manager.reboot_node().await),
        _ => {
            let name = manager.locate_node().await;
            if name.is_empty() {
                println!("no VM owns these MAC addresses");
            } else {
                let running = manager.is_power_on().await;
                println!("{name}: {}", if running { "running" } else { "stopped" });
            }
        }
    }
    Ok(())
}
