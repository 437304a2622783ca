//! reqwest-backed HTTP transport

use super::{Transport, TransportResponse};
use crate::error::{MailError, MailResult};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

/// Transport that posts JSON with a shared `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client (connection pool, proxy, TLS settings)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Build a client whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> MailResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MailError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: String) -> MailResult<TransportResponse> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        debug!(status, bytes = body.len(), "Received provider response");

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_with_client_posts_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/send"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"key":"k"}"#))
            .respond_with(ResponseTemplate::new(202).set_body_string("[]"))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let transport = ReqwestTransport::with_client(client);

        let response = transport
            .post_json(&format!("{}/send", server.uri()), r#"{"key":"k"}"#.to_string())
            .await
            .unwrap();

        assert_eq!(response.status, 202);
        assert!(response.is_success());
        assert_eq!(response.body, b"[]".to_vec());
    }

    #[tokio::test]
    async fn test_error_status_is_returned_not_raised() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let response = ReqwestTransport::new()
            .post_json(&server.uri(), "{}".to_string())
            .await
            .unwrap();

        assert_eq!(response.status, 500);
        assert!(!response.is_success());
        assert_eq!(response.body, b"boom".to_vec());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let err = ReqwestTransport::new()
            .post_json("http://127.0.0.1:1/send", "{}".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, MailError::Transport(_)));
    }
}
