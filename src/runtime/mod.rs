//! Serverless runtime integration.
//!
//! Each executable polls the runtime API for the next invocation, runs its
//! handler on the payload and posts back either the JSON result or an
//! error document. One invocation is processed at a time.

mod client;
mod error;

pub use client::{run, Invocation, RuntimeClient, RUNTIME_API_VERSION};
pub use error::{InvocationError, RuntimeError};
