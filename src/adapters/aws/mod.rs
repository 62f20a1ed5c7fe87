//! AWS adapters.
//!
//! DynamoDB and Pinpoint are reached over plain HTTPS with requests signed
//! by `sigv4`; no SDK is involved.

mod credentials;
mod dynamodb;
mod error;
mod pinpoint;
mod sigv4;

pub use credentials::AwsCredentials;
pub use dynamodb::{DynamoDbClient, DynamoDbScoreDefinitionStore, DynamoDbUserScoreStore};
pub use error::AwsError;
pub use pinpoint::PinpointProfileService;
pub use sigv4::RequestSigner;
