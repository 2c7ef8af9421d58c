mod power_manager;
mod virtual_power_manager;

pub use power_manager::PowerManager;
pub use virtual_power_manager::VirtualPowerManager;
