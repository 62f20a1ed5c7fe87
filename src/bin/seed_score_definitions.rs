//! Seeds the score definition table when the stack is provisioned.

use std::sync::Arc;
use std::time::Duration;

use engagement_scoring::adapters::aws::{AwsCredentials, DynamoDbClient, DynamoDbScoreDefinitionStore};
use engagement_scoring::adapters::callback::HttpProvisioningResponder;
use engagement_scoring::application::{SeedScoreDefinitionsCommand, SeedScoreDefinitionsHandler};
use engagement_scoring::config::{AppConfig, HandlerKind};
use engagement_scoring::domain::foundation::ProjectId;
use engagement_scoring::domain::records::ProvisioningRequest;
use engagement_scoring::runtime::{self, InvocationError, RuntimeClient};
use engagement_scoring::telemetry;

const CALLBACK_TIMEOUT_SECS: u64 = 30;

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
            let request: ProvisioningRequest =
                serde_json::from_slice(&invocation.payload).map_err(InvocationError::invalid_event)?;
            let result = handler
                .handle(SeedScoreDefinitionsCommand {
                    request,
                    context: invocation.context,
                })
                .await;
            serde_json::to_value(result).map_err(|e| InvocationError::new("SerializationError", e.to_string()))
        }
    })
    .await?;

    Ok(())
}

fn build_handler() -> Result<SeedScoreDefinitionsHandler, Box<dyn std::error::Error>> {
    let config = AppConfig::load();
    telemetry::init_for(&config);
    let config = config?;
    config.validate_for(HandlerKind::Seeder)?;

    let credentials = AwsCredentials::from_env()?;
    let dynamodb = Arc::new(DynamoDbClient::new(
        credentials,
        &config.aws_region,
        config.dynamodb_endpoint(),
    )?);

    let callback_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(CALLBACK_TIMEOUT_SECS))
        .build()?;

    Ok(SeedScoreDefinitionsHandler::new(
        Arc::new(DynamoDbScoreDefinitionStore::new(
            dynamodb,
            config.scoring_definition_table()?,
        )),
        Arc::new(HttpProvisioningResponder::with_client(callback_client)),
        ProjectId::new(config.pinpoint_project_id()?)?,
    ))
}
