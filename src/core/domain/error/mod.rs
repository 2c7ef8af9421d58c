use std::time::Duration;
use thiserror::Error;

/// The main error type for virtual power operations.
///
/// Public power transitions never return this type: failures there are folded
/// into [`PowerState::Error`](crate::PowerState). It surfaces from
/// construction, from [`resolve_connection`](crate::VirtualPowerManager::resolve_connection)
/// and from the [`RemoteShell`](crate::RemoteShell) seam.
#[derive(Error, Debug)]
pub enum VirtualPowerError {
    /// Represents errors that occur while opening the remote session
    ///
    /// # Fields
    /// * `0` - A description of what went wrong during the connection attempt
    #[error("Connection error: {0}")]
    Connection(String),

    /// A remote command ran but reported failure
    ///
    /// # Fields
    /// * `command` - The full command line sent to the remote host
    /// * `exit_code` - The exit status, if the process exited normally
    /// * `stderr` - Whatever the command printed on standard error
    #[error("Command `{command}` failed with exit code {exit_code:?}: {stderr}")]
    Execution {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// A remote command did not finish in time
    #[error("Command `{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },

    /// Represents validation failures with detailed context
    ///
    /// # Fields
    /// * `source` - The underlying validation error
    #[error("Validation error: {source}")]
    Validation { source: ValidationError },
}

impl From<ValidationError> for VirtualPowerError {
    fn from(error: ValidationError) -> Self {
        VirtualPowerError::Validation { source: error }
    }
}

/// Specialized error type for configuration and record validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

impl ValidationError {
    pub(crate) fn missing(field: &str, message: &str) -> Self {
        ValidationError::Field {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// Type alias for Results that may fail with a VirtualPowerError
pub type VirtualPowerResult<T> = Result<T, VirtualPowerError>;
