//! Pinpoint adapter for the `ProfileService` port.
//!
//! Uses the Pinpoint REST API with SigV4 signing (service name
//! `mobiletargeting`):
//!
//! - `GET  /v1/apps/{project}/endpoints/{endpoint}` - endpoint with its user
//! - `GET  /v1/apps/{project}/users/{user}` - every endpoint of a user
//! - `PUT  /v1/apps/{project}/endpoints/{endpoint}` - attribute update

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::foundation::{EndpointId, ProjectId, UserId};
use crate::ports::{
    Endpoint, ProfileService, ProfileServiceError, ENGAGEMENT_SCORE_ATTRIBUTE,
};

use super::credentials::AwsCredentials;
use super::error::AwsError;
use super::sigv4::{uri_encode, RequestSigner};

const SERVICE: &str = "mobiletargeting";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Pinpoint profile service adapter.
#[derive(Debug)]
pub struct PinpointProfileService {
    http_client: reqwest::Client,
    base_url: String,
    signer: RequestSigner,
}

impl PinpointProfileService {
    /// Create an adapter for a region.
    ///
    /// `endpoint` overrides `https://pinpoint.{region}.amazonaws.com`.
    pub fn new(credentials: AwsCredentials, region: &str, endpoint: Option<&str>) -> Self {
        let base_url = endpoint
            .map(|e| e.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://pinpoint.{}.amazonaws.com", region));

        Self {
            http_client: reqwest::Client::new(),
            base_url,
            signer: RequestSigner::new(credentials, region, SERVICE),
        }
    }

    fn endpoint_url(&self, project_id: &ProjectId, endpoint_id: &EndpointId) -> String {
        format!(
            "{}/v1/apps/{}/endpoints/{}",
            self.base_url,
            uri_encode(project_id.as_str(), true),
            uri_encode(endpoint_id.as_str(), true)
        )
    }

    fn user_url(&self, project_id: &ProjectId, user_id: &UserId) -> String {
        format!(
            "{}/v1/apps/{}/users/{}",
            self.base_url,
            uri_encode(project_id.as_str(), true),
            uri_encode(user_id.as_str(), true)
        )
    }

    /// Send a signed request and decode the JSON response.
    async fn send<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<Vec<u8>>,
    ) -> Result<T, AwsError> {
        let url = reqwest::Url::parse(url).map_err(|e| AwsError::InvalidUrl(format!("{}: {}", url, e)))?;
        let payload = body.unwrap_or_default();

        let signed_headers: Vec<(&str, &str)> = if payload.is_empty() {
            Vec::new()
        } else {
            vec![("content-type", JSON_CONTENT_TYPE)]
        };
        let auth = self.signer.sign(
            method.as_str(),
            &url,
            &signed_headers,
            &payload,
            chrono::Utc::now(),
        );

        let mut request = self.http_client.request(method, url);
        for (name, value) in signed_headers {
            request = request.header(name, value);
        }
        for (name, value) in auth {
            request = request.header(name, value);
        }
        if !payload.is_empty() {
            request = request.body(payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(AwsError::from_response(status.as_u16(), &text));
        }

        serde_json::from_str(&text).map_err(|e| AwsError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EndpointResponse {
    id: Option<String>,
    channel_type: Option<String>,
    user: Option<EndpointUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EndpointUser {
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct EndpointsResponse {
    #[serde(default)]
    item: Vec<EndpointResponse>,
}

#[derive(Debug, Deserialize)]
struct UpdateAccepted {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EndpointUpdate {
    user: EndpointUserUpdate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EndpointUserUpdate {
    user_attributes: HashMap<&'static str, Vec<String>>,
}

impl EndpointUpdate {
    fn engagement_score(score: i64) -> Self {
        let mut user_attributes = HashMap::new();
        user_attributes.insert(ENGAGEMENT_SCORE_ATTRIBUTE, vec![score.to_string()]);
        Self {
            user: EndpointUserUpdate { user_attributes },
        }
    }
}

impl EndpointResponse {
    /// Convert to the port type. `fallback_id` is used when the response
    /// omits `Id`.
    fn into_endpoint(self, fallback_id: Option<&EndpointId>) -> Result<Endpoint, ProfileServiceError> {
        let id = match (self.id, fallback_id) {
            (Some(id), _) => EndpointId::new(id)
                .map_err(|e| ProfileServiceError::invalid_response(e.to_string()))?,
            (None, Some(fallback)) => fallback.clone(),
            (None, None) => {
                return Err(ProfileServiceError::invalid_response("endpoint without Id"))
            }
        };
        let user_id = self
            .user
            .and_then(|u| u.user_id)
            .filter(|u| !u.is_empty())
            .map(UserId::new)
            .transpose()
            .map_err(|e| ProfileServiceError::invalid_response(e.to_string()))?;

        Ok(Endpoint {
            id,
            user_id,
            channel_type: self.channel_type,
        })
    }
}

#[async_trait]
impl ProfileService for PinpointProfileService {
    async fn get_endpoint(
        &self,
        project_id: &ProjectId,
        endpoint_id: &EndpointId,
    ) -> Result<Endpoint, ProfileServiceError> {
        let url = self.endpoint_url(project_id, endpoint_id);
        let response: EndpointResponse = self.send(reqwest::Method::GET, &url, None).await?;
        response.into_endpoint(Some(endpoint_id))
    }

    async fn get_user_endpoints(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
    ) -> Result<Vec<Endpoint>, ProfileServiceError> {
        let url = self.user_url(project_id, user_id);
        let response: EndpointsResponse = self.send(reqwest::Method::GET, &url, None).await?;
        response
            .item
            .into_iter()
            .map(|endpoint| endpoint.into_endpoint(None))
            .collect()
    }

    async fn update_engagement_score(
        &self,
        project_id: &ProjectId,
        endpoint_id: &EndpointId,
        score: i64,
    ) -> Result<(), ProfileServiceError> {
        let url = self.endpoint_url(project_id, endpoint_id);
        let body = serde_json::to_vec(&EndpointUpdate::engagement_score(score))
            .map_err(AwsError::from)?;
        self.send::<UpdateAccepted>(reqwest::Method::PUT, &url, Some(body))
            .await?;
        Ok(())
    }
}
