use crate::core::domain::error::ValidationError;
use std::fmt;

/// A MAC address normalized to twelve lowercase hex digits.
///
/// Hypervisor CLIs disagree on how they print MACs (`08:00:27:AB:CD:EF`,
/// `080027ABCDEF`, `08-00-27-ab-cd-ef`), so every address is reduced to the
/// same canonical form before two of them are compared.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MacAddress(String);

impl MacAddress {
    /// Parses and normalizes a MAC address.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = normalize_mac(raw);
        validate_mac(&normalized)?;
        Ok(Self(normalized))
    }

    /// Returns the normalized form, e.g. `080027abcdef`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strips delimiters and surrounding noise and lowercases the digits.
pub(crate) fn normalize_mac(raw: &str) -> String {
    raw.trim()
        .trim_matches('"')
        .chars()
        .filter(|c| !matches!(c, ':' | '-' | '.'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Validates an already normalized MAC address.
pub(crate) fn validate_mac(normalized: &str) -> Result<(), ValidationError> {
    if normalized.is_empty() {
        return Err(ValidationError::Field {
            field: "mac_address".to_string(),
            message: "MAC address cannot be empty".to_string(),
        });
    }
    if normalized.len() != 12 {
        return Err(ValidationError::Format(format!(
            "MAC address must have 12 hex digits (got {})",
            normalized.len()
        )));
    }
    if !normalized.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::Format(format!(
            "MAC address contains non-hex characters: {normalized}"
        )));
    }
    Ok(())
}
