//! Per-record tolerance for trigger batches.
//!
//! A batch envelope is parsed once, but each record keeps its raw JSON when it
//! does not have the expected shape. Handlers skip such records instead of
//! failing the whole invocation.

use serde::{Deserialize, Serialize};

/// One element of a batch's `Records` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry<T> {
    Parsed(T),
    Malformed(serde_json::Value),
}

impl<T> BatchEntry<T> {
    pub fn parsed(&self) -> Option<&T> {
        match self {
            BatchEntry::Parsed(record) => Some(record),
            BatchEntry::Malformed(_) => None,
        }
    }
}

impl<T> From<T> for BatchEntry<T> {
    fn from(record: T) -> Self {
        BatchEntry::Parsed(record)
    }
}

/// Short description of a malformed record for logs.
pub(crate) fn describe(raw: &serde_json::Value) -> &'static str {
    match raw {
        serde_json::Value::Object(_) => "object with unexpected fields",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Null => "null",
    }
}
