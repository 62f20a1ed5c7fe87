//! Typed-value wire format shared by the key-value store API and its change
//! stream: every attribute is a single-key object such as `{"S": "abc"}` or
//! `{"N": "42"}`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::ValidationError;

/// One attribute as a map from attribute name to typed value.
pub type Item = HashMap<String, AttributeValue>;

/// A typed attribute value. Numbers travel as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
    B(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    M(HashMap<String, AttributeValue>),
    L(Vec<AttributeValue>),
    SS(Vec<String>),
    NS(Vec<String>),
    BS(Vec<String>),
}

impl AttributeValue {
    pub fn string(value: impl Into<String>) -> Self {
        AttributeValue::S(value.into())
    }

    pub fn number(value: i64) -> Self {
        AttributeValue::N(value.to_string())
    }

    /// Returns the string payload of an `S` value.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the raw numeric string of an `N` value.
    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttributeValue::N(n) => Some(n),
            _ => None,
        }
    }

    /// Parses an `N` value as a signed integer.
    pub fn as_i64(&self, field: &str) -> Result<i64, ValidationError> {
        let raw = self
            .as_n()
            .ok_or_else(|| ValidationError::invalid_format(field, "expected a number value"))?;
        raw.trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::invalid_format(field, format!("'{}' is not an integer", raw)))
    }
}
