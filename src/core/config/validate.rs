use std::collections::HashSet;

use crate::core::config::data::ParameterSpec;
use crate::core::error::SchemaError;

/// Control key reserved for the free-text query.
pub const RESERVED_QUERY_KEY: &str = "text";

/// `[A-Za-z_][A-Za-z0-9_-]*`
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Check a service's parameter list before it is rendered.
///
/// Reports the first offending parameter in declaration order.
pub fn validate_parameters(parameters: &[ParameterSpec]) -> Result<(), SchemaError> {
    let mut seen = HashSet::with_capacity(parameters.len());
    for param in parameters {
        if !is_valid_identifier(&param.name) {
            return Err(SchemaError::InvalidName(param.name.clone()));
        }
        if param.name == RESERVED_QUERY_KEY {
            return Err(SchemaError::ReservedName(param.name.clone()));
        }
        if !seen.insert(param.name.as_str()) {
            return Err(SchemaError::DuplicateName(param.name.clone()));
        }
    }
    Ok(())
}
