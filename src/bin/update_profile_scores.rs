//! Pushes changed user scores onto the users' profile endpoints.

use std::sync::Arc;

use engagement_scoring::adapters::aws::{AwsCredentials, PinpointProfileService};
use engagement_scoring::application::UpdateProfileScoresHandler;
use engagement_scoring::config::{AppConfig, HandlerKind};
use engagement_scoring::domain::records::ChangeBatch;
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
            let batch: ChangeBatch =
                serde_json::from_slice(&invocation.payload).map_err(InvocationError::invalid_event)?;
            let report = handler.handle(&batch).await;
            serde_json::to_value(report).map_err(|e| InvocationError::new("SerializationError", e.to_string()))
        }
    })
    .await?;

    Ok(())
}

fn build_handler() -> Result<UpdateProfileScoresHandler, Box<dyn std::error::Error>> {
    let config = AppConfig::load();
    telemetry::init_for(&config);
    let config = config?;
    config.validate_for(HandlerKind::ProfileUpdater)?;

    let credentials = AwsCredentials::from_env()?;
    let profiles = PinpointProfileService::new(credentials, &config.aws_region, config.pinpoint_endpoint());

    Ok(UpdateProfileScoresHandler::new(Arc::new(profiles)))
}
