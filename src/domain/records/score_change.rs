//! Change notifications emitted by the score table.
//!
//! Only the new image of a row matters; the old image is never consulted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::attribute_value::{AttributeValue, Item};
use super::batch::BatchEntry;
use crate::domain::foundation::{ProjectId, UserId, ValidationError};

pub const USER_ID_ATTRIBUTE: &str = "UserId";
pub const PROJECT_ID_ATTRIBUTE: &str = "PinpointProjectId";
pub const SCORE_ATTRIBUTE: &str = "Score";

/// One invocation's worth of change records.
///
/// Records whose images do not parse are kept as raw JSON and skipped by the
/// handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeBatch {
    #[serde(rename = "Records", default)]
    pub records: Vec<BatchEntry<ChangeRecord>>,
}

impl ChangeBatch {
    pub fn new(records: Vec<ChangeRecord>) -> Self {
        Self {
            records: records.into_iter().map(BatchEntry::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// `INSERT`, `MODIFY` or `REMOVE`.
    #[serde(rename = "eventName", default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamodb: Option<RowImages>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowImages {
    #[serde(rename = "Keys", default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Item>,
    #[serde(rename = "NewImage", default, skip_serializing_if = "Option::is_none")]
    pub new_image: Option<Item>,
}

#[derive(Debug, Error, PartialEq)]
pub enum ChangeRecordError {
    #[error("change record has no new image")]
    MissingNewImage,

    #[error("new image lacks attribute '{0}'")]
    MissingAttribute(&'static str),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// New score of one user, extracted from a change record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreChange {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub score: i64,
}

impl ChangeRecord {
    /// Builds an `INSERT`/`MODIFY` record for a score row.
    pub fn for_score(event_name: &str, user_id: &str, project_id: &str, score: i64) -> Self {
        let mut image = Item::new();
        image.insert(USER_ID_ATTRIBUTE.to_string(), AttributeValue::string(user_id));
        image.insert(PROJECT_ID_ATTRIBUTE.to_string(), AttributeValue::string(project_id));
        image.insert(SCORE_ATTRIBUTE.to_string(), AttributeValue::number(score));
        Self {
            event_name: Some(event_name.to_string()),
            dynamodb: Some(RowImages {
                keys: None,
                new_image: Some(image),
            }),
        }
    }

    /// Extracts the new score from the record's new image.
    pub fn score_change(&self) -> Result<ScoreChange, ChangeRecordError> {
        let image = self
            .dynamodb
            .as_ref()
            .and_then(|images| images.new_image.as_ref())
            .ok_or(ChangeRecordError::MissingNewImage)?;

        let user_id = string_attribute(image, USER_ID_ATTRIBUTE)?;
        let project_id = string_attribute(image, PROJECT_ID_ATTRIBUTE)?;
        let score = image
            .get(SCORE_ATTRIBUTE)
            .ok_or(ChangeRecordError::MissingAttribute(SCORE_ATTRIBUTE))?
            .as_i64(SCORE_ATTRIBUTE)?;

        Ok(ScoreChange {
            user_id: UserId::new(user_id)?,
            project_id: ProjectId::new(project_id)?,
            score,
        })
    }
}

fn string_attribute<'a>(image: &'a Item, name: &'static str) -> Result<&'a str, ChangeRecordError> {
    let value = image
        .get(name)
        .ok_or(ChangeRecordError::MissingAttribute(name))?;
    value
        .as_s()
        .ok_or_else(|| ValidationError::invalid_format(name, "expected a string value").into())
}
