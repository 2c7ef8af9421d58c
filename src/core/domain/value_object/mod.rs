mod mac_address;
mod remote_host;
mod remote_port;
mod remote_username;

pub use mac_address::MacAddress;
pub use remote_host::RemoteHost;
pub use remote_port::RemotePort;
pub use remote_username::RemoteUsername;

// Re-export validation functions for internal use
pub(crate) use remote_host::validate_host;
pub(crate) use remote_port::validate_port;
pub(crate) use remote_username::validate_username;
