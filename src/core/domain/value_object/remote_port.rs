use crate::core::domain::error::ValidationError;

/// A validated SSH port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemotePort(u16);

impl RemotePort {
    pub const DEFAULT: RemotePort = RemotePort(22);

    /// Creates a new port without validation.
    pub(crate) fn new_unchecked(port: u16) -> Self {
        Self(port)
    }

    /// Returns the port number.
    pub fn get(&self) -> u16 {
        self.0
    }
}

/// Validates a port number.
pub(crate) fn validate_port(port: u16) -> Result<(), ValidationError> {
    if port == 0 {
        return Err(ValidationError::Field {
            field: "ssh_port".to_string(),
            message: "Port cannot be 0".to_string(),
        });
    }
    Ok(())
}
