use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::ApiError;
use super::types::{JobAccepted, StatusResponse, SubmitBody};
use crate::request::JobRequest;

pub const API_URL: &str = "https://services.data.shom.fr/refmar/api/v1/dl/observations";

/// The three calls of the asynchronous download protocol.
///
/// Implemented by [`ShomClient`] over HTTP; tests provide scripted fakes.
pub trait TideApi {
    /// Submits a job. Succeeds only on `202 Accepted`.
    async fn submit_job(&self, req: &JobRequest) -> Result<JobAccepted, ApiError>;

    /// Queries the status document behind `status_url`.
    async fn job_status(&self, status_url: &str) -> Result<StatusResponse, ApiError>;

    /// Fetches the raw result file behind `download_url`.
    async fn download(&self, download_url: &str) -> Result<Vec<u8>, ApiError>;
}

pub struct ShomClient {
    client: Client,
    base_url: String,
}

impl ShomClient {
    /// Create a client for the given submission endpoint, normally [`API_URL`].
    pub fn with_base_url(
        base_url: String,
        connect_timeout: Duration,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base_url })
    }
}

impl TideApi for ShomClient {
    async fn submit_job(&self, req: &JobRequest) -> Result<JobAccepted, ApiError> {
        let body = SubmitBody::from(req);
        debug!(url = %self.base_url, ?body, "submitting observation job");

        let response = self.client.post(&self.base_url).json(&body).send().await?;

        // Any other code, 2xx included, means the job was not queued.
        if response.status() != StatusCode::ACCEPTED {
            return Err(unexpected_status(response).await);
        }
        parse_json(response).await
    }

    async fn job_status(&self, status_url: &str) -> Result<StatusResponse, ApiError> {
        let response = self.client.get(status_url).send().await?;
        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        parse_json(response).await
    }

    async fn download(&self, download_url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.client.get(download_url).send().await?;
        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}

async fn unexpected_status(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    ApiError::UnexpectedStatus { status, message }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::DateRange;
    use chrono::NaiveDate;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ShomClient {
        ShomClient::with_base_url(
            format!("{}/observations", server.uri()),
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn request() -> JobRequest {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        };
        JobRequest::new(3, &range)
    }

    #[tokio::test]
    async fn submit_accepted_returns_urls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/observations"))
            .and(body_json(json!({
                "station": "3",
                "start": "2024-01-01T00:00:00Z",
                "end": "2024-01-02T23:59:59Z",
                "format": "csv"
            })))
            .respond_with(ResponseTemplate::new(202).set_body_json(json!({
                "status_url": "https://x/status/1",
                "download_url": "https://x/download/1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let accepted = client_for(&server).submit_job(&request()).await.unwrap();
        assert_eq!(accepted.status_url.as_deref(), Some("https://x/status/1"));
        assert_eq!(accepted.download_url.as_deref(), Some("https://x/download/1"));
    }

    #[tokio::test]
    async fn submit_rejects_plain_ok() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status_url": "https://x/status/1",
                "download_url": "https://x/download/1"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).submit_job(&request()).await.unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { status: 200, .. }));
    }

    #[tokio::test]
    async fn submit_reports_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("unknown station"))
            .mount(&server)
            .await;

        let err = client_for(&server).submit_job(&request()).await.unwrap_err();
        match err {
            ApiError::UnexpectedStatus { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "unknown station");
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_malformed_body_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(202).set_body_string("<html>queued</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).submit_job(&request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn submit_network_failure() {
        // Nothing listens on port 1.
        let client = ShomClient::with_base_url(
            "http://127.0.0.1:1/observations".into(),
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();
        let err = client.submit_job(&request()).await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn job_status_reads_status_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "running"})))
            .mount(&server)
            .await;

        let status = client_for(&server)
            .job_status(&format!("{}/status/1", server.uri()))
            .await
            .unwrap();
        assert_eq!(status.status.as_deref(), Some("running"));
    }

    #[tokio::test]
    async fn job_status_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .job_status(&format!("{}/status/1", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { status: 502, .. }));
    }

    #[tokio::test]
    async fn download_returns_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/download/1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a,b\n1,2\n".to_vec()))
            .mount(&server)
            .await;

        let bytes = client_for(&server)
            .download(&format!("{}/download/1", server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, b"a,b\n1,2\n");
    }
}
