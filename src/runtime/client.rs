//! Runtime API client and invocation loop.

use reqwest::header::HeaderMap;
use serde::Serialize;
use std::future::Future;
use tracing::Instrument;

use crate::application::InvocationContext;

use super::error::{InvocationError, RuntimeError};

pub const RUNTIME_API_VERSION: &str = "2018-06-01";

const REQUEST_ID_HEADER: &str = "lambda-runtime-aws-request-id";
const DEADLINE_HEADER: &str = "lambda-runtime-deadline-ms";
const FUNCTION_ARN_HEADER: &str = "lambda-runtime-invoked-function-arn";

/// One invocation fetched from the runtime.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub context: InvocationContext,
    pub payload: Vec<u8>,
}

/// Client for the runtime HTTP API.
#[derive(Debug, Clone)]
pub struct RuntimeClient {
    http_client: reqwest::Client,
    base_url: String,
    log_stream_name: String,
}

impl RuntimeClient {
    /// `api` is the `host:port` of the runtime API.
    pub fn new(api: &str, log_stream_name: impl Into<String>) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: format!("http://{}/{}", api, RUNTIME_API_VERSION),
            log_stream_name: log_stream_name.into(),
        }
    }

    /// Create a client from the runtime's environment.
    ///
    /// Reads:
    /// - `AWS_LAMBDA_RUNTIME_API`
    /// - `AWS_LAMBDA_LOG_STREAM_NAME` (optional)
    pub fn from_env() -> Result<Self, RuntimeError> {
        let api = std::env::var("AWS_LAMBDA_RUNTIME_API").map_err(|_| RuntimeError::MissingRuntimeApi)?;
        let log_stream_name = std::env::var("AWS_LAMBDA_LOG_STREAM_NAME").unwrap_or_default();
        Ok(Self::new(&api, log_stream_name))
    }

    /// Block until the next invocation is available.
    pub async fn next_invocation(&self) -> Result<Invocation, RuntimeError> {
        let response = self
            .http_client
            .get(format!("{}/runtime/invocation/next", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RuntimeError::UnexpectedStatus(response.status().as_u16()));
        }

        let context = context_from_headers(response.headers(), &self.log_stream_name)?;
        let payload = response.bytes().await?.to_vec();
        Ok(Invocation { context, payload })
    }

    pub async fn send_response<T: Serialize>(
        &self,
        request_id: &str,
        body: &T,
    ) -> Result<(), RuntimeError> {
        let url = format!("{}/runtime/invocation/{}/response", self.base_url, request_id);
        self.post(&url, body, false).await
    }

    pub async fn send_error(
        &self,
        request_id: &str,
        error: &InvocationError,
    ) -> Result<(), RuntimeError> {
        let url = format!("{}/runtime/invocation/{}/error", self.base_url, request_id);
        self.post(&url, error, true).await
    }

    /// Report a failure that happened before the first invocation.
    pub async fn report_init_error(&self, error: &InvocationError) -> Result<(), RuntimeError> {
        let url = format!("{}/runtime/init/error", self.base_url);
        self.post(&url, error, true).await
    }

    async fn post<T: Serialize>(&self, url: &str, body: &T, is_error: bool) -> Result<(), RuntimeError> {
        let mut request = self.http_client.post(url).json(body);
        if is_error {
            request = request.header("Lambda-Runtime-Function-Error-Type", "Unhandled");
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(RuntimeError::UnexpectedStatus(response.status().as_u16()));
        }
        Ok(())
    }
}

fn context_from_headers(
    headers: &HeaderMap,
    log_stream_name: &str,
) -> Result<InvocationContext, RuntimeError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let request_id = header(REQUEST_ID_HEADER).ok_or(RuntimeError::MissingHeader(REQUEST_ID_HEADER))?;
    let mut context = InvocationContext::new(request_id, log_stream_name);

    if let Some(deadline) = header(DEADLINE_HEADER).and_then(|v| v.parse::<u64>().ok()) {
        context = context.with_deadline_ms(deadline);
    }
    if let Some(arn) = header(FUNCTION_ARN_HEADER) {
        context = context.with_invoked_function_arn(arn);
    }
    Ok(context)
}

/// Run the invocation loop forever.
///
/// Returns only when the runtime API itself cannot be reached. Handler
/// errors are reported to the runtime and the loop continues.
pub async fn run<F, Fut>(client: &RuntimeClient, handler: F) -> Result<(), RuntimeError>
where
    F: Fn(Invocation) -> Fut,
    Fut: Future<Output = Result<serde_json::Value, InvocationError>>,
{
    loop {
        process_next(client, &handler).await?;
    }
}

async fn process_next<F, Fut>(client: &RuntimeClient, handler: &F) -> Result<(), RuntimeError>
where
    F: Fn(Invocation) -> Fut,
    Fut: Future<Output = Result<serde_json::Value, InvocationError>>,
{
    let invocation = client.next_invocation().await?;
    let request_id = invocation.context.request_id.clone();
    let span = tracing::info_span!("invocation", request_id = %request_id);

    async {
        match handler(invocation).await {
            Ok(body) => {
                if let Err(e) = client.send_response(&request_id, &body).await {
                    tracing::error!(error = %e, "Failed to post invocation response");
                }
            }
            Err(err) => {
                tracing::error!(error_type = %err.error_type, error = %err.error_message, "Invocation failed");
                if let Err(e) = client.send_error(&request_id, &err).await {
                    tracing::error!(error = %e, "Failed to post invocation error");
                }
            }
        }
    }
    .instrument(span)
    .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{http_response, request_body, serve_canned};
    use reqwest::header::HeaderValue;

    fn runtime_host(base_url: &str) -> &str {
        base_url.trim_start_matches("http://")
    }

    #[test]
    fn context_reads_runtime_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("req-1"));
        headers.insert(DEADLINE_HEADER, HeaderValue::from_static("1700000000000"));
        headers.insert(
            FUNCTION_ARN_HEADER,
            HeaderValue::from_static("arn:aws:lambda:us-east-1:123456789012:function:score"),
        );

        let context = context_from_headers(&headers, "stream-1").unwrap();

        assert_eq!(context.request_id, "req-1");
        assert_eq!(context.log_stream_name, "stream-1");
        assert_eq!(context.deadline_ms, Some(1_700_000_000_000));
        assert_eq!(
            context.invoked_function_arn.as_deref(),
            Some("arn:aws:lambda:us-east-1:123456789012:function:score")
        );
    }

    #[test]
    fn context_requires_request_id() {
        let err = context_from_headers(&HeaderMap::new(), "stream-1").unwrap_err();
        assert!(matches!(err, RuntimeError::MissingHeader(REQUEST_ID_HEADER)));
    }

    #[tokio::test]
    async fn successful_invocation_posts_response() {
        let server = serve_canned(vec![
            http_response(
                "200 OK",
                &[("Lambda-Runtime-Aws-Request-Id", "req-1")],
                r#"{"Records":[]}"#,
            ),
            http_response("202 Accepted", &[], ""),
        ])
        .await;
        let client = RuntimeClient::new(runtime_host(&server.base_url), "stream-1");

        process_next(&client, &|invocation: Invocation| async move {
            assert_eq!(invocation.payload, br#"{"Records":[]}"#.to_vec());
            Ok(serde_json::json!({"total": 0}))
        })
        .await
        .unwrap();

        let requests = server.requests().await;
        assert!(requests[0].starts_with("GET /2018-06-01/runtime/invocation/next "));
        assert!(requests[1].starts_with("POST /2018-06-01/runtime/invocation/req-1/response "));
        assert_eq!(request_body(&requests[1]), r#"{"total":0}"#);
    }

    #[tokio::test]
    async fn failed_invocation_posts_error() {
        let server = serve_canned(vec![
            http_response("200 OK", &[("Lambda-Runtime-Aws-Request-Id", "req-2")], "not json"),
            http_response("202 Accepted", &[], ""),
        ])
        .await;
        let client = RuntimeClient::new(runtime_host(&server.base_url), "stream-1");

        process_next(&client, &|_invocation: Invocation| async move {
            Err(InvocationError::invalid_event("expected value"))
        })
        .await
        .unwrap();

        let requests = server.requests().await;
        assert!(requests[1].starts_with("POST /2018-06-01/runtime/invocation/req-2/error "));
        let body: serde_json::Value = serde_json::from_str(request_body(&requests[1])).unwrap();
        assert_eq!(body["errorType"], "InvalidEvent");
    }

    #[tokio::test]
    async fn runtime_api_failure_is_fatal() {
        let server = serve_canned(vec![http_response("500 Internal Server Error", &[], "")]).await;
        let client = RuntimeClient::new(runtime_host(&server.base_url), "stream-1");

        let err = process_next(&client, &|_invocation: Invocation| async move {
            Ok(serde_json::Value::Null)
        })
        .await
        .unwrap_err();

        server.requests().await;
        assert!(matches!(err, RuntimeError::UnexpectedStatus(500)));
    }
}
