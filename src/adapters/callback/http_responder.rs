//! Delivers provisioning callback documents with an HTTP PUT.
//!
//! The callback URL is pre-signed for an empty content type, so the request
//! carries `content-type: ""` and an explicit `content-length`.

use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::records::ProvisioningResponse;
use crate::ports::ProvisioningResponder;

/// Provisioning responder using `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpProvisioningResponder {
    http_client: reqwest::Client,
}

impl HttpProvisioningResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl ProvisioningResponder for HttpProvisioningResponder {
    async fn respond(
        &self,
        response_url: &str,
        response: &ProvisioningResponse,
    ) -> Result<(), DomainError> {
        let body = serde_json::to_vec(response).map_err(|e| {
            DomainError::new(
                ErrorCode::InternalError,
                format!("Failed to serialize provisioning response: {}", e),
            )
        })?;

        tracing::debug!(
            status = %response.status,
            body_len = body.len(),
            "Sending provisioning response"
        );

        let result = self
            .http_client
            .put(response_url)
            .header(CONTENT_TYPE, "")
            .header(CONTENT_LENGTH, body.len())
            .body(body)
            .send()
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::CallbackDeliveryFailed, e.to_string())
            })?;

        let status = result.status();
        if !status.is_success() {
            let text = result.text().await.unwrap_or_default();
            return Err(DomainError::new(
                ErrorCode::CallbackDeliveryFailed,
                format!("Callback rejected with status {}", status.as_u16()),
            )
            .with_detail("body", text));
        }

        tracing::info!(status_code = status.as_u16(), "Provisioning response delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::records::ProvisioningStatus;
    use crate::test_support::{http_response, request_body, serve_canned};
    use serde_json::Map;

    fn response() -> ProvisioningResponse {
        ProvisioningResponse {
            status: ProvisioningStatus::Success,
            reason: "See the details in CloudWatch Log Stream: stream-1".to_string(),
            physical_resource_id: "stream-1".to_string(),
            stack_id: "stack-1".to_string(),
            request_id: "req-1".to_string(),
            logical_resource_id: "Seeder".to_string(),
            no_echo: false,
            data: Map::new(),
        }
    }

    #[tokio::test]
    async fn puts_document_with_empty_content_type() {
        let server = serve_canned(vec![http_response("200 OK", &[], "")]).await;
        let url = format!("{}/callback?signature=abc", server.base_url);

        HttpProvisioningResponder::new()
            .respond(&url, &response())
            .await
            .unwrap();

        let requests = server.requests().await;
        let request = &requests[0];
        let lower = request.to_ascii_lowercase();
        assert!(request.starts_with("PUT /callback?signature=abc "));
        assert!(lower.contains("content-type: \r\n") || lower.contains("content-type:\r\n"));
        assert!(lower.contains("content-length:"));

        let json: serde_json::Value = serde_json::from_str(request_body(request)).unwrap();
        assert_eq!(json["Status"], "SUCCESS");
        assert_eq!(json["PhysicalResourceId"], "stream-1");
        assert_eq!(json["Data"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = serve_canned(vec![http_response("403 Forbidden", &[], "denied")]).await;
        let url = format!("{}/callback", server.base_url);

        let err = HttpProvisioningResponder::new()
            .respond(&url, &response())
            .await
            .unwrap_err();

        server.requests().await;
        assert_eq!(err.code, ErrorCode::CallbackDeliveryFailed);
        assert_eq!(err.details.get("body").map(String::as_str), Some("denied"));
    }

    #[tokio::test]
    async fn custom_client_timeout_applies() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            drop(socket);
        });
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(200))
            .build()
            .unwrap();

        let err = HttpProvisioningResponder::with_client(client)
            .respond(&format!("http://{}/callback", addr), &response())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CallbackDeliveryFailed);
    }

    #[tokio::test]
    async fn unreachable_url_is_an_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HttpProvisioningResponder::new()
            .respond(&format!("http://{}/callback", addr), &response())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::CallbackDeliveryFailed);
    }
}
