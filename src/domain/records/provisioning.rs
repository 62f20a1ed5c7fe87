//! Provisioning requests and the status document sent back for them.
//!
//! The provisioning engine invokes the seeder with a request that names a
//! single-use callback URL. Exactly one status document is PUT to that URL.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Lifecycle phase of the provisioned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

/// Request delivered by the provisioning engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisioningRequest {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    /// Present on `Update` and `Delete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProvisioningStatus {
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "FAILED")]
    Failed,
}

impl fmt::Display for ProvisioningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisioningStatus::Success => write!(f, "SUCCESS"),
            ProvisioningStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Status document PUT to the request's callback URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProvisioningResponse {
    pub status: ProvisioningStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    pub data: Map<String, Value>,
}

impl ProvisioningResponse {
    /// Builds the status document for a request.
    ///
    /// Identifiers are echoed verbatim. The physical resource id falls back
    /// to the log stream name when the request does not carry one.
    pub fn for_request(
        request: &ProvisioningRequest,
        status: ProvisioningStatus,
        log_stream_name: &str,
        data: Map<String, Value>,
    ) -> Self {
        Self {
            status,
            reason: format!("See the details in CloudWatch Log Stream: {}", log_stream_name),
            physical_resource_id: request
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| log_stream_name.to_string()),
            stack_id: request.stack_id.clone(),
            request_id: request.request_id.clone(),
            logical_resource_id: request.logical_resource_id.clone(),
            no_echo: false,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_request() -> ProvisioningRequest {
        serde_json::from_value(json!({
            "RequestType": "Create",
            "ServiceToken": "arn:aws:lambda:us-east-1:123456789012:function:seed",
            "ResponseURL": "https://callback.example.com/presigned?sig=abc",
            "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/scoring/guid",
            "RequestId": "req-1",
            "LogicalResourceId": "InitializeScoreDefinitions",
            "ResourceType": "Custom::LoadScoreDefinitions",
            "ResourceProperties": {"ServiceToken": "arn"}
        }))
        .unwrap()
    }

    #[test]
    fn parses_create_request() {
        let request = create_request();
        assert_eq!(request.request_type, RequestType::Create);
        assert_eq!(request.response_url, "https://callback.example.com/presigned?sig=abc");
        assert!(request.physical_resource_id.is_none());
    }

    #[test]
    fn response_serializes_expected_fields() {
        let response = ProvisioningResponse::for_request(
            &create_request(),
            ProvisioningStatus::Success,
            "2024/01/01/[$LATEST]abcdef",
            Map::new(),
        );

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "Status": "SUCCESS",
                "Reason": "See the details in CloudWatch Log Stream: 2024/01/01/[$LATEST]abcdef",
                "PhysicalResourceId": "2024/01/01/[$LATEST]abcdef",
                "StackId": "arn:aws:cloudformation:us-east-1:123456789012:stack/scoring/guid",
                "RequestId": "req-1",
                "LogicalResourceId": "InitializeScoreDefinitions",
                "NoEcho": false,
                "Data": {}
            })
        );
    }

    #[test]
    fn existing_physical_resource_id_is_kept() {
        let mut request = create_request();
        request.request_type = RequestType::Update;
        request.physical_resource_id = Some("existing-id".to_string());

        let response = ProvisioningResponse::for_request(
            &request,
            ProvisioningStatus::Failed,
            "stream",
            Map::new(),
        );
        assert_eq!(response.physical_resource_id, "existing-id");
        assert_eq!(response.status.to_string(), "FAILED");
    }
}
