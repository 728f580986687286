//! HTTP finalize relayer.
//!
//! POSTs the proposal's meta-transactions to
//! `{url}/space/{space_id}/{proposal_id}/finalize` and reads back
//! `{ error?, receipt? }`. The body is parsed whatever the HTTP status, since
//! the relayer reports failures in the `error` field.
//!
//! Only connection failures are retried. A request that reached the relayer
//! is never sent twice.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{FinalizeRelayer, Result, TransportError};
use crate::model::{FinalizeRequest, FinalizeResponse};

/// Default relayer endpoint when none is configured.
pub const DEFAULT_RELAYER_URL: &str = "http://localhost:3000";

/// Relayer client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelayerConfig {
    /// Base URL of the relayer.
    pub url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection attempts before giving up.
    pub connect_attempts: usize,
}

impl Default for RelayerConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RELAYER_URL.to_string(),
            timeout_secs: 30,
            connect_attempts: 3,
        }
    }
}

impl RelayerConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Finalize endpoint for a proposal.
    pub fn finalize_url(&self, space_id: &str, proposal_id: u64) -> String {
        format!(
            "{}/space/{}/{}/finalize",
            self.url.trim_end_matches('/'),
            space_id,
            proposal_id
        )
    }
}

/// Relayer client over HTTP.
pub struct HttpFinalizeRelayer {
    client: Client,
    config: RelayerConfig,
}

impl HttpFinalizeRelayer {
    pub fn new(config: RelayerConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(TransportError::Unavailable(
                "relayer URL not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { client, config })
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(self.config.connect_attempts.saturating_sub(1))
            .with_jitter()
    }

    async fn post(&self, url: &str, body: &FinalizeRequest) -> Result<FinalizeResponse> {
        let response = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        debug!(url = %url, status = %status, "Relayer responded");

        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(url = %url, status = %status, error = %e, "Unreadable relayer response");
            TransportError::Serialization(e)
        })
    }
}

#[async_trait]
impl FinalizeRelayer for HttpFinalizeRelayer {
    async fn finalize(
        &self,
        space_id: &str,
        proposal_id: u64,
        request: FinalizeRequest,
    ) -> Result<FinalizeResponse> {
        let url = self.config.finalize_url(space_id, proposal_id);

        (|| async { self.post(&url, &request).await })
            .retry(self.backoff())
            .when(|e| matches!(e, TransportError::Http(err) if err.is_connect()))
            .notify(|e, delay| {
                warn!(url = %url, error = %e, delay = ?delay, "Relayer unreachable, retrying");
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::normalize;
    use crate::model::Transaction;
    use alloy_primitives::{Address, Bytes, U256};
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one HTTP response and hand back the raw request text.
    async fn one_shot_server(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                request.extend_from_slice(&buf[..n]);
                if n == 0 || request_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some(split) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..split]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        raw.len() >= split + 4 + content_length
    }

    fn request() -> FinalizeRequest {
        FinalizeRequest {
            transactions: normalize(&[Transaction::new(
                Address::ZERO,
                U256::from(5),
                Bytes::new(),
            )]),
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = RelayerConfig::default();
        assert_eq!(config.url, DEFAULT_RELAYER_URL);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.connect_attempts, 3);
    }

    #[test]
    fn test_finalize_url() {
        let config = RelayerConfig::default().with_url("https://relayer.example/");
        assert_eq!(
            config.finalize_url("0x06", 12),
            "https://relayer.example/space/0x06/12/finalize"
        );
    }

    #[test]
    fn test_empty_url_rejected() {
        let result = HttpFinalizeRelayer::new(RelayerConfig::default().with_url(""));
        assert!(matches!(result, Err(TransportError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_finalize_posts_transactions() {
        let body = json!({ "receipt": { "transaction_hash": "0xabc" } }).to_string();
        let (url, server) = one_shot_server("200 OK", body).await;

        let relayer = HttpFinalizeRelayer::new(RelayerConfig::default().with_url(url)).unwrap();
        let response = relayer.finalize("0x06", 3, request()).await.unwrap();

        assert!(response.error.is_none());
        assert_eq!(response.receipt, Some(json!({ "transaction_hash": "0xabc" })));

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /space/0x06/3/finalize HTTP/1.1"));
        assert!(raw.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(raw.contains(r#""nonce":0"#));
        assert!(raw.contains(r#""operation":0"#));
    }

    #[tokio::test]
    async fn test_finalize_reads_error_body_on_failure_status() {
        let body = json!({ "error": "proposal not ended" }).to_string();
        let (url, server) = one_shot_server("500 Internal Server Error", body).await;

        let relayer = HttpFinalizeRelayer::new(RelayerConfig::default().with_url(url)).unwrap();
        let response = relayer.finalize("0x06", 3, request()).await.unwrap();

        assert_eq!(response.error, Some(json!("proposal not ended")));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_finalize_unreadable_body() {
        let (url, server) = one_shot_server("502 Bad Gateway", "<html>".to_string()).await;

        let relayer = HttpFinalizeRelayer::new(RelayerConfig::default().with_url(url)).unwrap();
        let result = relayer.finalize("0x06", 3, request()).await;

        assert!(matches!(result, Err(TransportError::Serialization(_))));
        server.await.unwrap();
    }
}
