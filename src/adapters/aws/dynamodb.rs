//! DynamoDB adapters for the score definition and user score tables.
//!
//! Talks the DynamoDB JSON protocol directly: every operation is a signed
//! `POST /` with an `X-Amz-Target` header naming the operation.
//!
//! # Tables
//!
//! | Table | Key | Attribute |
//! |-------|-----|-----------|
//! | score definitions | `EventType`, `PinpointProjectId` | `ScoreOffset` (N) |
//! | user scores | `UserId`, `PinpointProjectId` | `Score` (N) |

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventType, ProjectId, UserId};
use crate::domain::records::{AttributeValue, Item, PROJECT_ID_ATTRIBUTE, SCORE_ATTRIBUTE, USER_ID_ATTRIBUTE};
use crate::domain::scoring::ScoreDefinition;
use crate::ports::{ScoreDefinitionRepository, UserScoreRepository};

use super::credentials::AwsCredentials;
use super::error::AwsError;
use super::sigv4::RequestSigner;

const SERVICE: &str = "dynamodb";
const CONTENT_TYPE: &str = "application/x-amz-json-1.0";
const TARGET_PREFIX: &str = "DynamoDB_20120810";

const EVENT_TYPE_ATTRIBUTE: &str = "EventType";
const SCORE_OFFSET_ATTRIBUTE: &str = "ScoreOffset";

/// Signed DynamoDB JSON-protocol client.
#[derive(Debug)]
pub struct DynamoDbClient {
    http_client: reqwest::Client,
    endpoint: reqwest::Url,
    signer: RequestSigner,
}

impl DynamoDbClient {
    /// Create a client for a region.
    ///
    /// `endpoint` overrides the regional endpoint, e.g. for a local
    /// DynamoDB instance.
    pub fn new(
        credentials: AwsCredentials,
        region: &str,
        endpoint: Option<&str>,
    ) -> Result<Self, AwsError> {
        let endpoint = endpoint
            .map(str::to_string)
            .unwrap_or_else(|| format!("https://dynamodb.{}.amazonaws.com/", region));
        let endpoint =
            reqwest::Url::parse(&endpoint).map_err(|e| AwsError::InvalidUrl(format!("{}: {}", endpoint, e)))?;

        Ok(Self {
            http_client: reqwest::Client::new(),
            endpoint,
            signer: RequestSigner::new(credentials, region, SERVICE),
        })
    }

    /// Invoke one operation and decode its response.
    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        body: &serde_json::Value,
    ) -> Result<T, AwsError> {
        let payload = serde_json::to_vec(body)?;
        let target = format!("{}.{}", TARGET_PREFIX, operation);
        let signed_headers = [("content-type", CONTENT_TYPE), ("x-amz-target", target.as_str())];
        let auth = self.signer.sign(
            "POST",
            &self.endpoint,
            &signed_headers,
            &payload,
            chrono::Utc::now(),
        );

        let mut request = self
            .http_client
            .post(self.endpoint.clone())
            .header("content-type", CONTENT_TYPE)
            .header("x-amz-target", &target);
        for (name, value) in auth {
            request = request.header(name, value);
        }

        let response = request.body(payload).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let err = AwsError::from_response(status.as_u16(), &text);
            tracing::warn!(operation, status = status.as_u16(), error = %err, "DynamoDB call failed");
            return Err(err);
        }

        serde_json::from_str(&text).map_err(|e| AwsError::InvalidResponse(format!("{}: {}", operation, e)))
    }
}

#[derive(Debug, Deserialize)]
struct GetItemOutput {
    #[serde(rename = "Item")]
    item: Option<Item>,
}

#[derive(Debug, Deserialize)]
struct UpdateItemOutput {
    #[serde(rename = "Attributes", default)]
    attributes: Item,
}

#[derive(Debug, Deserialize)]
struct PutItemOutput {}

/// Score definition table backed by DynamoDB.
#[derive(Debug, Clone)]
pub struct DynamoDbScoreDefinitionStore {
    client: Arc<DynamoDbClient>,
    table_name: String,
}

impl DynamoDbScoreDefinitionStore {
    pub fn new(client: Arc<DynamoDbClient>, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl ScoreDefinitionRepository for DynamoDbScoreDefinitionStore {
    async fn put(&self, definition: &ScoreDefinition) -> Result<(), DomainError> {
        let body = put_definition_request(&self.table_name, definition);
        self.client.call::<PutItemOutput>("PutItem", &body).await?;
        Ok(())
    }

    async fn find(
        &self,
        event_type: &EventType,
        project_id: &ProjectId,
    ) -> Result<Option<ScoreDefinition>, DomainError> {
        let body = json!({
            "TableName": self.table_name,
            "Key": {
                EVENT_TYPE_ATTRIBUTE: AttributeValue::string(event_type.as_str()),
                PROJECT_ID_ATTRIBUTE: AttributeValue::string(project_id.as_str()),
            },
        });

        let output: GetItemOutput = self.client.call("GetItem", &body).await?;
        let Some(item) = output.item else {
            return Ok(None);
        };

        let offset = item
            .get(SCORE_OFFSET_ATTRIBUTE)
            .ok_or_else(|| DomainError::database("score definition has no ScoreOffset"))?
            .as_i64(SCORE_OFFSET_ATTRIBUTE)?;

        Ok(Some(ScoreDefinition::new(
            event_type.clone(),
            project_id.clone(),
            offset,
        )))
    }
}

fn put_definition_request(table_name: &str, definition: &ScoreDefinition) -> serde_json::Value {
    json!({
        "TableName": table_name,
        "Item": {
            EVENT_TYPE_ATTRIBUTE: AttributeValue::string(definition.event_type.as_str()),
            PROJECT_ID_ATTRIBUTE: AttributeValue::string(definition.project_id.as_str()),
            SCORE_OFFSET_ATTRIBUTE: AttributeValue::number(definition.score_offset),
        },
    })
}

/// User score table backed by DynamoDB.
///
/// Increments use a single `UpdateItem` with `if_not_exists`, so concurrent
/// writers never lose updates and no read happens beforehand.
#[derive(Debug, Clone)]
pub struct DynamoDbUserScoreStore {
    client: Arc<DynamoDbClient>,
    table_name: String,
}

impl DynamoDbUserScoreStore {
    pub fn new(client: Arc<DynamoDbClient>, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl UserScoreRepository for DynamoDbUserScoreStore {
    async fn increment(
        &self,
        user_id: &UserId,
        project_id: &ProjectId,
        offset: i64,
    ) -> Result<i64, DomainError> {
        let body = increment_request(&self.table_name, user_id, project_id, offset);
        let output: UpdateItemOutput = self.client.call("UpdateItem", &body).await?;

        let score = output
            .attributes
            .get(SCORE_ATTRIBUTE)
            .ok_or_else(|| DomainError::database("UpdateItem returned no Score"))?
            .as_i64(SCORE_ATTRIBUTE)?;
        Ok(score)
    }
}

fn increment_request(
    table_name: &str,
    user_id: &UserId,
    project_id: &ProjectId,
    offset: i64,
) -> serde_json::Value {
    json!({
        "TableName": table_name,
        "Key": {
            USER_ID_ATTRIBUTE: AttributeValue::string(user_id.as_str()),
            PROJECT_ID_ATTRIBUTE: AttributeValue::string(project_id.as_str()),
        },
        "UpdateExpression": "SET #score = if_not_exists(#score, :start) + :inc",
        "ExpressionAttributeNames": { "#score": SCORE_ATTRIBUTE },
        "ExpressionAttributeValues": {
            ":start": AttributeValue::number(0),
            ":inc": AttributeValue::number(offset),
        },
        "ReturnValues": "UPDATED_NEW",
    })
}
