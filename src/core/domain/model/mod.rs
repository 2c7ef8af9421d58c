pub mod command_set;
pub mod connection_config;
pub mod node;
pub mod power_state;
pub mod settings;
