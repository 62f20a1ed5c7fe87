//! Provisioning callback delivery over HTTP.

mod http_responder;

pub use http_responder::HttpProvisioningResponder;
