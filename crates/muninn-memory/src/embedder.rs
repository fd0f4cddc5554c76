// SPDX-FileCopyrightText: 2026 Muninn Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP embedding adapter for an OpenAI-compatible embeddings endpoint.
//!
//! Handles request construction, bearer authentication, bounded timeouts,
//! and transient error retry. Retrieval treats every failure here as a
//! dependency outage and degrades to an empty result.

use std::time::Duration;

use async_trait::async_trait;
use muninn_config::model::EmbeddingConfig;
use muninn_core::types::{EmbeddingInput, EmbeddingOutput};
use muninn_core::{
    AdapterType, EmbeddingProvider, HealthStatus, MemoryAdapter, MuninnError,
};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// HTTP client for an OpenAI-compatible `/embeddings` endpoint.
///
/// On transient errors (429, 500, 503), retries once after a short delay.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
    max_retries: u32,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
    index: usize,
}

impl HttpEmbedder {
    /// Creates a new embedder from configuration.
    pub fn new(config: &EmbeddingConfig) -> Result<Self, MuninnError> {
        let mut headers = HeaderMap::new();
        if !config.api_key.is_empty() {
            let value = format!("Bearer {}", config.api_key);
            headers.insert(
                "authorization",
                HeaderValue::from_str(&value).map_err(|e| {
                    MuninnError::Config(format!("invalid API key header value: {e}"))
                })?,
            );
        }
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MuninnError::Dependency {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            max_retries: 1,
        })
    }

    /// Overrides the base URL (for testing against a local mock server).
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    async fn request_embeddings(
        &self,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, MuninnError> {
        let url = format!("{}/embeddings", self.base_url);
        let body = EmbeddingsRequest {
            model: &self.model,
            input: texts,
        };

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying embeddings request after transient error");
                tokio::time::sleep(Duration::from_millis(500)).await;
            }

            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| MuninnError::Dependency {
                    message: format!("embeddings request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "embeddings response received");

            if status.is_success() {
                let parsed: EmbeddingsResponse =
                    response.json().await.map_err(|e| MuninnError::Dependency {
                        message: format!("malformed embeddings response: {e}"),
                        source: Some(Box::new(e)),
                    })?;

                let mut data = parsed.data;
                data.sort_by_key(|d| d.index);
                let embeddings: Vec<Vec<f32>> =
                    data.into_iter().map(|d| d.embedding).collect();

                if embeddings.len() != texts.len() {
                    return Err(MuninnError::Dependency {
                        message: format!(
                            "embeddings response returned {} vectors for {} inputs",
                            embeddings.len(),
                            texts.len()
                        ),
                        source: None,
                    });
                }
                for embedding in &embeddings {
                    if embedding.len() != self.dimensions {
                        return Err(MuninnError::Dependency {
                            message: format!(
                                "embedding dimensionality mismatch: expected {}, got {}",
                                self.dimensions,
                                embedding.len()
                            ),
                            source: None,
                        });
                    }
                }
                return Ok(embeddings);
            }

            let body_text = response.text().await.unwrap_or_default();
            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, body = %body_text, "transient error, will retry");
                last_error = Some(MuninnError::Dependency {
                    message: format!("embeddings API returned {status}: {body_text}"),
                    source: None,
                });
                continue;
            }

            return Err(MuninnError::Dependency {
                message: format!("embeddings API returned {status}: {body_text}"),
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| MuninnError::Dependency {
            message: "embeddings request failed after retries".into(),
            source: None,
        }))
    }
}

/// True for HTTP status codes worth a single retry.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[async_trait]
impl MemoryAdapter for HttpEmbedder {
    fn name(&self) -> &str {
        "http-embeddings"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MuninnError> {
        // No cheap ping endpoint exists; the client itself is stateless.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MuninnError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MuninnError> {
        if input.texts.is_empty() {
            return Err(MuninnError::InvalidArgument(
                "embedding input must contain at least one text".into(),
            ));
        }

        let embeddings = self.request_embeddings(&input.texts).await?;
        Ok(EmbeddingOutput {
            dimensions: self.dimensions,
            embeddings,
        })
    }
}
