//! Component settings
//!
//! Init and runtime settings are free-form tables whatever the on-disk format.
//! The accessors return `Ok(None)` for a missing key and an
//! [`ContractError::InvalidSetting`] when the key is present with the wrong type.

use serde_json::Value;

use crate::{ContractError, InitError};

/// Settings table of a listener or dispatcher
pub type Settings = serde_json::Map<String, Value>;

/// Builds a component from its configured name and init settings
pub type Constructor<T> = fn(&str, &Settings) -> Result<Box<T>, InitError>;

/// Read a string setting
pub fn get_str<'a>(settings: &'a Settings, key: &str) -> Result<Option<&'a str>, ContractError> {
    match settings.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(type_mismatch(key, "a string", other)),
    }
}

/// Read an unsigned integer setting
///
/// Strings holding a number are accepted, configuration files written by hand
/// often quote numbers.
pub fn get_u64(settings: &Settings, key: &str) -> Result<Option<u64>, ContractError> {
    match settings.get(key) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| ContractError::invalid_setting(key, format!("{n} is not an unsigned integer"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ContractError::invalid_setting(key, format!("'{s}': {e}"))),
        Some(other) => Err(type_mismatch(key, "an unsigned integer", other)),
    }
}

/// Read a floating point setting
pub fn get_f64(settings: &Settings, key: &str) -> Result<Option<f64>, ContractError> {
    match settings.get(key) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| ContractError::invalid_setting(key, format!("{n} is not a number"))),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ContractError::invalid_setting(key, format!("'{s}': {e}"))),
        Some(other) => Err(type_mismatch(key, "a number", other)),
    }
}

/// Read a boolean setting
pub fn get_bool(settings: &Settings, key: &str) -> Result<Option<bool>, ContractError> {
    match settings.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            _ => Err(ContractError::invalid_setting(key, format!("'{s}' is not a boolean"))),
        },
        Some(other) => Err(type_mismatch(key, "a boolean", other)),
    }
}

/// Read a list of strings
///
/// A single string is accepted as a one-element list.
pub fn get_str_list(settings: &Settings, key: &str) -> Result<Option<Vec<String>>, ContractError> {
    match settings.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(type_mismatch(key, "a list of strings", other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        Some(other) => Err(type_mismatch(key, "a list of strings", other)),
    }
}

fn type_mismatch(key: &str, expected: &str, got: &Value) -> ContractError {
    ContractError::invalid_setting(key, format!("expected {expected}, got {got}"))
}
