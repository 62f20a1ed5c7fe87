//! Scores engagement events delivered by the event stream.

use std::sync::Arc;

use engagement_scoring::adapters::aws::{
    AwsCredentials, DynamoDbClient, DynamoDbScoreDefinitionStore, DynamoDbUserScoreStore,
    PinpointProfileService,
};
use engagement_scoring::application::ScoreEngagementEventsHandler;
use engagement_scoring::config::{AppConfig, HandlerKind};
use engagement_scoring::domain::foundation::ProjectId;
use engagement_scoring::domain::records::StreamBatch;
use engagement_scoring::runtime::{self, InvocationError, RuntimeClient};
use engagement_scoring::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = RuntimeClient::from_env()?;

    let handler = match build_handler() {
        Ok(handler) => Arc::new(handler),
        Err(e) => {
            tracing::error!(error = %e, "Initialization failed");
            client
                .report_init_error(&InvocationError::new("InitializationError", e.to_string()))
                .await?;
            return Err(e);
        }
    };

    runtime::run(&client, |invocation| {
        let handler = handler.clone();
        async move {
            let batch: StreamBatch =
                serde_json::from_slice(&invocation.payload).map_err(InvocationError::invalid_event)?;
            let report = handler.handle(&batch).await;
            serde_json::to_value(report).map_err(|e| InvocationError::new("SerializationError", e.to_string()))
        }
    })
    .await?;

    Ok(())
}

fn build_handler() -> Result<ScoreEngagementEventsHandler, Box<dyn std::error::Error>> {
    let config = AppConfig::load();
    telemetry::init_for(&config);
    let config = config?;
    config.validate_for(HandlerKind::Scorer)?;

    let credentials = AwsCredentials::from_env()?;
    let dynamodb = Arc::new(DynamoDbClient::new(
        credentials.clone(),
        &config.aws_region,
        config.dynamodb_endpoint(),
    )?);
    let profiles = PinpointProfileService::new(credentials, &config.aws_region, config.pinpoint_endpoint());

    Ok(ScoreEngagementEventsHandler::new(
        Arc::new(DynamoDbScoreDefinitionStore::new(
            dynamodb.clone(),
            config.scoring_definition_table()?,
        )),
        Arc::new(DynamoDbUserScoreStore::new(dynamodb, config.user_score_table()?)),
        Arc::new(profiles),
        ProjectId::new(config.pinpoint_project_id()?)?,
    ))
}
