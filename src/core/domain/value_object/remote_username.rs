use crate::core::domain::error::ValidationError;

/// The account used to log into the hypervisor host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUsername(String);

impl RemoteUsername {
    /// Creates a new username without validation.
    pub(crate) fn new_unchecked(username: String) -> Self {
        Self(username)
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validates a POSIX-style login name.
pub(crate) fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::missing(
            "host_user",
            "Username is required",
        ));
    }
    if username.len() > 32 {
        return Err(ValidationError::Format(format!(
            "Username cannot exceed 32 characters (got {})",
            username.len()
        )));
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.';
    if !username.chars().all(allowed) || username.starts_with('-') {
        return Err(ValidationError::Format(
            "Username contains invalid characters. Allowed: alphanumeric, -, _, .".to_string(),
        ));
    }
    Ok(())
}
