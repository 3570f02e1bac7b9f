//! API-based embedder using OpenAI-compatible endpoints.

use std::time::Duration;

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use concierge_types::CollaboratorError;

use crate::embedder::Embedder;

/// Configuration for the API embedder.
#[derive(Debug, Clone)]
pub struct ApiEmbedderConfig {
    /// API base URL (e.g., "https://api.openai.com/v1").
    pub base_url: String,

    /// Embedding model name.
    pub model: String,

    /// API key.
    pub api_key: SecretString,

    /// Vector dimension the model produces.
    pub dimension: usize,

    /// Request timeout.
    pub timeout: Duration,

    /// Maximum retries on rate limiting before degrading.
    pub max_retries: u32,
}

impl ApiEmbedderConfig {
    /// Config for the OpenAI embeddings API.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: model.into(),
            api_key: SecretString::from(api_key.into()),
            dimension: 1536,
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }

    /// Override the base URL (for compatible self-hosted endpoints).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct ApiEmbedder {
    client: Client,
    config: ApiEmbedderConfig,
}

impl ApiEmbedder {
    /// Create a new API embedder.
    pub fn new(config: ApiEmbedderConfig) -> Result<Self, CollaboratorError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CollaboratorError::Unavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Call the endpoint with bounded exponential backoff on rate limits.
    async fn call_with_retry(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, CollaboratorError> {
        let mut backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(60)),
            ..Default::default()
        };

        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(attempt = attempts, batch = texts.len(), "Calling embeddings API");

            match self.make_request(texts).await {
                Ok(vectors) => return Ok(vectors),
                Err(e) if e.is_retryable() && attempts < self.config.max_retries => {
                    match backoff.next_backoff() {
                        Some(duration) => {
                            warn!(
                                error = %e,
                                retry_in_ms = duration.as_millis(),
                                "Embedding call failed, retrying"
                            );
                            tokio::time::sleep(duration).await;
                        }
                        None => return Err(e),
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn make_request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CollaboratorError> {
        #[derive(Serialize)]
        struct EmbeddingRequest<'a> {
            model: &'a str,
            input: &'a [String],
        }

        #[derive(Deserialize)]
        struct EmbeddingResponse {
            data: Vec<EmbeddingDatum>,
        }

        #[derive(Deserialize)]
        struct EmbeddingDatum {
            index: usize,
            embedding: Vec<f32>,
        }

        let url = format!("{}/embeddings", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.api_key.expose_secret()),
            )
            .json(&EmbeddingRequest {
                model: &self.config.model,
                input: texts,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CollaboratorError::Timeout(self.config.timeout)
                } else {
                    CollaboratorError::Unavailable(e.to_string())
                }
            })?;

        if response.status() == 429 {
            return Err(CollaboratorError::RateLimited);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CollaboratorError::Unavailable(format!(
                "HTTP {status}: {body}"
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))?;

        if body.data.len() != texts.len() {
            return Err(CollaboratorError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        // The API documents order preservation but also returns indices;
        // trust the indices.
        let mut vectors = vec![Vec::new(); texts.len()];
        for datum in body.data {
            if datum.index >= vectors.len() {
                return Err(CollaboratorError::InvalidResponse(format!(
                    "embedding index {} out of range",
                    datum.index
                )));
            }
            vectors[datum.index] = datum.embedding;
        }

        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, CollaboratorError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.call_with_retry(texts).await
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}
