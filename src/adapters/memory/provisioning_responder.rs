//! Recording provisioning responder for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::records::ProvisioningResponse;
use crate::ports::ProvisioningResponder;

/// Keeps every delivered document instead of sending it.
#[derive(Debug, Clone, Default)]
pub struct RecordingProvisioningResponder {
    delivered: Arc<RwLock<Vec<(String, ProvisioningResponse)>>>,
    fail: bool,
}

impl RecordingProvisioningResponder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A responder whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            delivered: Arc::default(),
            fail: true,
        }
    }

    /// Delivered `(url, document)` pairs, oldest first.
    pub async fn delivered(&self) -> Vec<(String, ProvisioningResponse)> {
        self.delivered.read().await.clone()
    }
}

#[async_trait]
impl ProvisioningResponder for RecordingProvisioningResponder {
    async fn respond(
        &self,
        response_url: &str,
        response: &ProvisioningResponse,
    ) -> Result<(), DomainError> {
        if self.fail {
            return Err(DomainError::new(
                ErrorCode::CallbackDeliveryFailed,
                "injected delivery failure",
            ));
        }
        self.delivered
            .write()
            .await
            .push((response_url.to_string(), response.clone()));
        Ok(())
    }
}
