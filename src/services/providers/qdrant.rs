/// Qdrant similarity backend
///
/// Implements `SimilarityBackend` over Qdrant's REST API. Each entity family
/// lives in its own collection with cosine distance; embedding generation is
/// delegated to the configured `EmbeddingClient`.
use reqwest::{Client as HttpClient, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    services::providers::{
        Collection, EmbeddingClient, FieldMatch, PointId, SearchHit, SimilarityBackend,
    },
};

pub struct QdrantBackend {
    http_client: HttpClient,
    base_url: String,
    api_key: Option<String>,
    embedder: EmbeddingClient,
    embedding_dim: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    result: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct RetrieveResponse {
    result: Vec<RetrievedPoint>,
}

#[derive(Deserialize)]
struct RetrievedPoint {
    #[serde(default)]
    vector: Option<Vec<f32>>,
}

/// Builds Qdrant's filter JSON from exact-match conditions
fn filter_json(conditions: &[FieldMatch]) -> Value {
    let must: Vec<Value> = conditions
        .iter()
        .map(|c| json!({ "key": c.key, "match": { "value": c.value } }))
        .collect();

    json!({ "must": must })
}

impl QdrantBackend {
    pub fn new(
        base_url: String,
        api_key: Option<String>,
        embedder: EmbeddingClient,
        embedding_dim: usize,
    ) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url,
            api_key,
            embedder,
            embedding_dim,
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = self.http_client.request(method, url);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("api-key", api_key);
        }
        builder
    }

    /// Turns a non-success response into a backend error with the body text
    async fn check(response: Response, context: &str) -> AppResult<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                status = %status,
                body = %body,
                context = context,
                "Qdrant request failed"
            );
            return Err(AppError::ExternalApi(format!(
                "Qdrant returned status {}: {}",
                status, body
            )));
        }
        Ok(response)
    }

    async fn collection_exists(&self, collection: Collection) -> AppResult<bool> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/collections/{}", collection),
            )
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }

        Self::check(response, "collection lookup").await?;
        Ok(true)
    }

    async fn create_collection(&self, collection: Collection) -> AppResult<()> {
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{}", collection),
            )
            .json(&json!({
                "vectors": {
                    "size": self.embedding_dim,
                    "distance": "Cosine"
                }
            }))
            .send()
            .await?;

        Self::check(response, "collection create").await?;

        tracing::info!(
            collection = %collection,
            dim = self.embedding_dim,
            "Created vector collection"
        );

        Ok(())
    }
}

#[async_trait::async_trait]
impl SimilarityBackend for QdrantBackend {
    async fn ensure_collections(&self) -> AppResult<()> {
        for collection in Collection::ALL {
            if !self.collection_exists(collection).await? {
                self.create_collection(collection).await?;
            }
        }
        Ok(())
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        self.embedder.embed(text).await
    }

    async fn upsert(
        &self,
        collection: Collection,
        id: PointId,
        vector: Vec<f32>,
        payload: Value,
    ) -> AppResult<()> {
        let response = self
            .request(
                reqwest::Method::PUT,
                &format!("/collections/{}/points?wait=true", collection),
            )
            .json(&json!({
                "points": [{
                    "id": id,
                    "vector": vector,
                    "payload": payload
                }]
            }))
            .send()
            .await?;

        Self::check(response, "point upsert").await?;

        tracing::debug!(collection = %collection, id = %id, "Upserted point");

        Ok(())
    }

    async fn search(
        &self,
        collection: Collection,
        vector: Vec<f32>,
        filter: Option<Vec<FieldMatch>>,
        limit: usize,
        score_threshold: Option<f32>,
    ) -> AppResult<Vec<SearchHit>> {
        let mut body = json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true
        });

        if let Some(conditions) = filter {
            body["filter"] = filter_json(&conditions);
        }

        if let Some(threshold) = score_threshold {
            body["score_threshold"] = json!(threshold);
        }

        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{}/points/search", collection),
            )
            .json(&body)
            .send()
            .await?;

        let response = Self::check(response, "point search").await?;
        let parsed: SearchResponse = response.json().await?;

        tracing::debug!(
            collection = %collection,
            hits = parsed.result.len(),
            "Similarity search completed"
        );

        Ok(parsed.result)
    }

    async fn retrieve_vector(
        &self,
        collection: Collection,
        id: PointId,
    ) -> AppResult<Option<Vec<f32>>> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/collections/{}/points", collection),
            )
            .json(&json!({
                "ids": [id],
                "with_vector": true
            }))
            .send()
            .await?;

        let response = Self::check(response, "point retrieve").await?;
        let parsed: RetrieveResponse = response.json().await?;

        Ok(parsed.result.into_iter().next().and_then(|p| p.vector))
    }

    fn name(&self) -> &'static str {
        "qdrant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::course_point_id;

    #[test]
    fn test_filter_json_shape() {
        let conditions = vec![
            FieldMatch::new("program_id", "ai"),
            FieldMatch::new("kind", "elective"),
        ];

        let filter = filter_json(&conditions);

        assert_eq!(
            filter,
            json!({
                "must": [
                    { "key": "program_id", "match": { "value": "ai" } },
                    { "key": "kind", "match": { "value": "elective" } }
                ]
            })
        );
    }

    #[test]
    fn test_search_response_parsing() {
        let raw = json!({
            "result": [
                {
                    "id": "7d8274a6-5ec7-5e3c-8bcd-0bc6f5bbf574",
                    "score": 0.87,
                    "payload": { "name": "Deep Learning", "program_id": "ai" }
                },
                { "id": 42, "score": 0.5 }
            ],
            "status": "ok",
            "time": 0.002
        });

        let parsed: SearchResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.result.len(), 2);
        assert_eq!(parsed.result[0].payload["name"], "Deep Learning");
        assert_eq!(parsed.result[1].id, PointId::Num(42));
        assert!((parsed.result[0].score - 0.87).abs() < 1e-6);
    }

    #[test]
    fn test_retrieve_response_without_vector() {
        let raw = json!({ "result": [ { "payload": {} } ] });
        let parsed: RetrieveResponse = serde_json::from_value(raw).unwrap();
        assert!(parsed.result[0].vector.is_none());
    }

    #[test]
    fn test_upsert_point_body_uses_stable_ids() {
        // Two upserts of the same course must address the same point.
        let first = serde_json::to_value(course_point_id("ai", "NLP")).unwrap();
        let second = serde_json::to_value(course_point_id("ai", "NLP")).unwrap();
        assert_eq!(first, second);
    }
}
