//! Engagement events as delivered by the event stream.
//!
//! A batch is `{"Records": [{"kinesis": {"data": "<base64>"}}, ...]}` and each
//! `data` field is base64-encoded JSON carrying at least `event_type` and
//! `client.client_id`.

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::batch::BatchEntry;
use crate::domain::foundation::{EndpointId, EventType, ValidationError};

/// One invocation's worth of stream records.
///
/// Records without the `kinesis.data` string are kept as raw JSON so the rest
/// of the batch can still be scored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamBatch {
    #[serde(rename = "Records", default)]
    pub records: Vec<BatchEntry<StreamRecord>>,
}

impl StreamBatch {
    pub fn new(records: Vec<StreamRecord>) -> Self {
        Self {
            records: records.into_iter().map(BatchEntry::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRecord {
    pub kinesis: StreamPayload,
    #[serde(rename = "eventID", default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamPayload {
    /// Base64-encoded JSON payload.
    pub data: String,
    #[serde(rename = "partitionKey", default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<String>,
    #[serde(rename = "sequenceNumber", default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<String>,
}

/// Why a payload could not be turned into an [`EngagementEvent`].
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload is not a valid event: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload field invalid: {0}")]
    Invalid(#[from] ValidationError),
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    event_type: String,
    client: RawClient,
}

#[derive(Debug, Deserialize)]
struct RawClient {
    client_id: String,
}

/// The fields of an engagement event that scoring needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngagementEvent {
    pub event_type: EventType,
    /// Endpoint that produced the event.
    pub client_id: EndpointId,
}

impl StreamRecord {
    /// Wraps a raw JSON payload the way the stream delivers it.
    pub fn from_payload(payload: &[u8]) -> Self {
        Self {
            kinesis: StreamPayload {
                data: base64::engine::general_purpose::STANDARD.encode(payload),
                partition_key: None,
                sequence_number: None,
            },
            event_id: None,
        }
    }

    /// Decodes and parses the record payload.
    pub fn decode(&self) -> Result<EngagementEvent, PayloadError> {
        let bytes = base64::engine::general_purpose::STANDARD.decode(self.kinesis.data.trim())?;
        let raw: RawEvent = serde_json::from_slice(&bytes)?;
        Ok(EngagementEvent {
            event_type: EventType::new(raw.event_type)?,
            client_id: EndpointId::new(raw.client.client_id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record_for(value: serde_json::Value) -> StreamRecord {
        StreamRecord::from_payload(value.to_string().as_bytes())
    }

    #[test]
    fn decodes_event_type_and_client() {
        let record = record_for(json!({
            "event_type": "_email.click",
            "event_timestamp": 1_565_000_000_000u64,
            "client": {"client_id": "endpoint-1"},
            "attributes": {"campaign_id": "c-1"}
        }));

        let event = record.decode().unwrap();
        assert_eq!(event.event_type.as_str(), "_email.click");
        assert_eq!(event.client_id.as_str(), "endpoint-1");
    }

    #[test]
    fn rejects_invalid_base64() {
        let record = StreamRecord {
            kinesis: StreamPayload {
                data: "%%% not base64 %%%".to_string(),
                partition_key: None,
                sequence_number: None,
            },
            event_id: None,
        };
        assert!(matches!(record.decode(), Err(PayloadError::Base64(_))));
    }

    #[test]
    fn rejects_payload_without_client() {
        let record = record_for(json!({"event_type": "_email.click"}));
        assert!(matches!(record.decode(), Err(PayloadError::Json(_))));
    }

    #[test]
    fn rejects_empty_event_type() {
        let record = record_for(json!({"event_type": "", "client": {"client_id": "e"}}));
        assert!(matches!(record.decode(), Err(PayloadError::Invalid(_))));
    }

    #[test]
    fn batch_parses_stream_envelope() {
        let batch: StreamBatch = serde_json::from_value(json!({
            "Records": [{
                "kinesis": {
                    "partitionKey": "pk",
                    "sequenceNumber": "49590338271490256608559692538361571095921575989136588898",
                    "data": "eyJldmVudF90eXBlIjoiX3Nlc3Npb24uc3RhcnQiLCJjbGllbnQiOnsiY2xpZW50X2lkIjoiYWJjIn19"
                },
                "eventID": "shardId-000000000006:49590338271490256608559692538361571095921575989136588898",
                "eventSource": "aws:kinesis"
            }]
        }))
        .unwrap();

        assert_eq!(batch.records.len(), 1);
        let event = batch.records[0].parsed().unwrap().decode().unwrap();
        assert_eq!(event.event_type.as_str(), "_session.start");
        assert_eq!(event.client_id.as_str(), "abc");
    }

    #[test]
    fn wrongly_shaped_record_does_not_fail_the_batch() {
        let batch: StreamBatch = serde_json::from_value(json!({
            "Records": [
                {"kinesis": {"data": 42}},
                {"eventSource": "aws:kinesis"},
                {"kinesis": {"data": "eyJldmVudF90eXBlIjoiX3Nlc3Npb24uc3RhcnQiLCJjbGllbnQiOnsiY2xpZW50X2lkIjoiYWJjIn19"}}
            ]
        }))
        .unwrap();

        assert_eq!(batch.records.len(), 3);
        assert!(matches!(batch.records[0], BatchEntry::Malformed(_)));
        assert!(matches!(batch.records[1], BatchEntry::Malformed(_)));
        assert!(batch.records[2].parsed().is_some());
    }

    #[test]
    fn batch_without_records_is_empty() {
        let batch: StreamBatch = serde_json::from_value(json!({})).unwrap();
        assert!(batch.records.is_empty());
    }
}
