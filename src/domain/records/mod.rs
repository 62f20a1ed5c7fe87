//! Records module - wire formats of the three triggers.
//!
//! - `engagement` - base64 JSON engagement events from the event stream
//! - `score_change` - score-table change notifications
//! - `provisioning` - provisioning requests and callback documents
//! - `attribute_value` - typed attribute values used by the key-value store
//! - `batch` - per-record tolerance of malformed batch entries

mod attribute_value;
mod batch;
mod engagement;
mod provisioning;
mod score_change;

pub use attribute_value::{AttributeValue, Item};
pub use batch::BatchEntry;
pub(crate) use batch::describe as describe_malformed;
pub use engagement::{EngagementEvent, PayloadError, StreamBatch, StreamPayload, StreamRecord};
pub use provisioning::{ProvisioningRequest, ProvisioningResponse, ProvisioningStatus, RequestType};
pub use score_change::{
    ChangeBatch, ChangeRecord, ChangeRecordError, RowImages, ScoreChange, PROJECT_ID_ATTRIBUTE,
    SCORE_ATTRIBUTE, USER_ID_ATTRIBUTE,
};
