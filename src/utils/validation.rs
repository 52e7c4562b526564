use crate::core::names::is_go_keyword;
use crate::utils::error::{GenError, Result};
use regex::Regex;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

const GO_IDENTIFIER_PATTERN: &str = r"^[A-Za-z_][A-Za-z0-9_]*$";

pub fn validate_import_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(GenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Import path cannot be empty".to_string(),
        });
    }

    if let Some(bad) = path
        .chars()
        .find(|c| c.is_whitespace() || matches!(c, '"' | '\\' | '`' | '\0'))
    {
        return Err(GenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: format!("Import path contains invalid character {:?}", bad),
        });
    }

    Ok(())
}

/// An empty prefix is allowed; anything else must be a usable path fragment.
pub fn validate_import_prefix(field_name: &str, prefix: &str) -> Result<()> {
    if prefix.is_empty() {
        return Ok(());
    }
    validate_import_path(field_name, prefix)
}

pub fn validate_go_identifier(field_name: &str, value: &str) -> Result<()> {
    let re = Regex::new(GO_IDENTIFIER_PATTERN).map_err(|e| GenError::ConfigValidationError {
        field: field_name.to_string(),
        message: e.to_string(),
    })?;

    if !re.is_match(value) {
        return Err(GenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a Go identifier (letters, digits, underscores)".to_string(),
        });
    }

    if is_go_keyword(value) {
        return Err(GenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value is a Go keyword".to_string(),
        });
    }

    Ok(())
}

pub fn validate_one_of(field_name: &str, value: &str, allowed: &[&str]) -> Result<()> {
    if !allowed.contains(&value) {
        return Err(GenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Valid values: {}", allowed.join(", ")),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GenError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
