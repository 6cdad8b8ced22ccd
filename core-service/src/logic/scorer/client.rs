//! Remote Scorer Client
//!
//! HTTP client for the external ML scoring service. The engine wraps every
//! call in its own hard timeout; the client timeout only backs that up.

use std::future::Future;
use std::time::Duration;

use super::types::{ScoreRequest, ScoreResponse, ScorerError, ScorerHealth};
use crate::constants;

/// Contract the engine expects from a scoring dependency
pub trait RemoteScorer: Send + Sync + 'static {
    /// Score one transaction's features
    fn predict(
        &self,
        request: &ScoreRequest,
    ) -> impl Future<Output = Result<ScoreResponse, ScorerError>> + Send;

    /// Liveness probe
    fn health(&self) -> impl Future<Output = Result<ScorerHealth, ScorerError>> + Send;
}

/// Remote scorer configuration
#[derive(Debug, Clone)]
pub struct ScorerConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            base_url: constants::get_scorer_url(),
            timeout: Duration::from_millis(constants::get_scorer_timeout_ms()),
        }
    }
}

/// reqwest-backed scorer speaking the `/predict` JSON contract
pub struct HttpScorer {
    config: ScorerConfig,
    http_client: reqwest::Client,
}

impl HttpScorer {
    pub fn new(config: ScorerConfig) -> Result<Self, ScorerError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScorerError::Network(e.to_string()))?;

        Ok(Self { config, http_client })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

impl RemoteScorer for HttpScorer {
    async fn predict(&self, request: &ScoreRequest) -> Result<ScoreResponse, ScorerError> {
        let url = format!("{}/predict", self.config.base_url.trim_end_matches('/'));

        let response = self.http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScorerError::Timeout(self.config.timeout.as_millis() as u64)
                } else {
                    ScorerError::Network(e.to_string())
                }
            })?;

        if response.status().is_success() {
            response.json().await
                .map_err(|e| ScorerError::Parse(e.to_string()))
        } else {
            Err(ScorerError::Server(response.status().as_u16()))
        }
    }

    async fn health(&self) -> Result<ScorerHealth, ScorerError> {
        let url = format!("{}/", self.config.base_url.trim_end_matches('/'));

        let response = self.http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| ScorerError::Network(e.to_string()))?;

        if response.status().is_success() {
            response.json().await
                .map_err(|e| ScorerError::Parse(e.to_string()))
        } else {
            Err(ScorerError::Server(response.status().as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_scorer_is_an_error() {
        let scorer = HttpScorer::new(ScorerConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout: Duration::from_millis(200),
        })
        .unwrap();

        let request = ScoreRequest {
            amount: 10.0,
            timestamp: 0,
            merchant: "Amazon".to_string(),
            location: "Berlin".to_string(),
        };

        let result = scorer.predict(&request).await;
        assert!(matches!(
            result,
            Err(ScorerError::Network(_)) | Err(ScorerError::Timeout(_))
        ));
    }
}
