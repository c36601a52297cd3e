use reqwest::Client as HttpClient;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
};

const EMBEDDING_CACHE_TTL: u64 = 604800; // 1 week in seconds

/// Client for an HTTP embedding service
///
/// Talks to a text-embeddings-inference style endpoint: POST /embed with a
/// list of inputs, returning one vector per input. Vectors are requested
/// normalized so cosine similarity reduces to a dot product downstream.
/// Responses are cached in Redis keyed by a UUIDv5 of the input text.
#[derive(Clone)]
pub struct EmbeddingClient {
    http_client: HttpClient,
    base_url: String,
    cache: Option<Cache>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: Vec<&'a str>,
    normalize: bool,
}

impl EmbeddingClient {
    pub fn new(base_url: String, cache: Option<Cache>) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
            cache,
        }
    }

    /// Embeds a single text, consulting the cache first
    pub async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let key = CacheKey::Embedding(Uuid::new_v5(&Uuid::NAMESPACE_OID, text.as_bytes()));

        if let Some(cache) = &self.cache {
            if let Some(vector) = cache.get::<Vec<f32>>(&key).await {
                tracing::debug!(key = %key, "Embedding cache hit");
                return Ok(vector);
            }
        }

        let vector = self.call_service(text).await?;

        if let Some(cache) = &self.cache {
            cache.set(&key, &vector, EMBEDDING_CACHE_TTL).await;
        }

        Ok(vector)
    }

    /// Calls the embedding service for one text
    async fn call_service(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}/embed", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&EmbedRequest {
                inputs: vec![text],
                normalize: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                "Embedding service request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Embedding service returned status {}: {}",
                status, body
            )));
        }

        let mut vectors: Vec<Vec<f32>> = response.json().await?;

        if vectors.is_empty() {
            return Err(AppError::ExternalApi(
                "Embedding service returned no vectors".to_string(),
            ));
        }

        Ok(vectors.swap_remove(0))
    }
}
