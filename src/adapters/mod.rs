//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the handlers to external systems:
//! - `aws` - DynamoDB tables and the Pinpoint profile service
//! - `callback` - Provisioning callback delivery over HTTP
//! - `memory` - In-memory implementations for tests and local runs

pub mod aws;
pub mod callback;
pub mod memory;
