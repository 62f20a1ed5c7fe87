//! ProvisioningResponder port - delivery of the provisioning status document.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::records::ProvisioningResponse;

/// Delivers a status document to a single-use callback URL.
///
/// Delivery is attempted once. Callers log failures and carry on; a failed
/// delivery never changes the outcome being reported.
#[async_trait]
pub trait ProvisioningResponder: Send + Sync {
    async fn respond(
        &self,
        response_url: &str,
        response: &ProvisioningResponse,
    ) -> Result<(), DomainError>;
}
