//! Voyage AI embeddings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::embedding::{ensure_success, EmbeddingError, EmbeddingProvider};

const VOYAGE_API_BASE: &str = "https://api.voyageai.com";

#[derive(Clone)]
pub struct VoyageEmbeddingService {
    api_key: String,
    model: String,
    input_type: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct VoyageEmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    input_type: Option<&'a str>, // "query" or "document"
}

#[derive(Debug, Deserialize)]
struct VoyageEmbedData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct VoyageEmbedResponse {
    data: Vec<VoyageEmbedData>,
}

/// Map Cohere-style input types onto Voyage's vocabulary.
fn voyage_input_type(input_type: &str) -> Option<String> {
    match input_type {
        "" | "none" => None,
        "search_document" | "document" => Some("document".to_string()),
        "search_query" | "query" => Some("query".to_string()),
        other => Some(other.to_string()),
    }
}

impl VoyageEmbeddingService {
    pub fn new(
        api_key: String,
        model: String,
        input_type: &str,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            model,
            input_type: voyage_input_type(input_type),
            base_url: VOYAGE_API_BASE.to_string(),
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn embeddings_url(&self) -> String {
        format!("{}/v1/embeddings", self.base_url)
    }
}

#[async_trait]
impl EmbeddingProvider for VoyageEmbeddingService {
    fn name(&self) -> &str {
        "voyage"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let body = VoyageEmbedRequest {
            model: &self.model,
            input: texts,
            input_type: self.input_type.as_deref(),
        };

        let response = self
            .client
            .post(self.embeddings_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let mut parsed: VoyageEmbedResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| EmbeddingError::Decode(e.to_string()))?;

        // The API does not promise response order.
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[test]
    fn test_input_type_mapping() {
        assert_eq!(voyage_input_type("search_document").as_deref(), Some("document"));
        assert_eq!(voyage_input_type("search_query").as_deref(), Some("query"));
        assert_eq!(voyage_input_type(""), None);
    }

    #[tokio::test]
    async fn test_embed_reorders_by_index() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/embeddings")
            .match_header("authorization", "Bearer voyage-key")
            .match_body(Matcher::Json(json!({
                "model": "voyage-3",
                "input": ["a", "b", "c"],
                "input_type": "document"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "object": "list",
                    "data": [
                        {"object": "embedding", "embedding": [3.0], "index": 2},
                        {"object": "embedding", "embedding": [1.0], "index": 0},
                        {"object": "embedding", "embedding": [2.0], "index": 1}
                    ],
                    "model": "voyage-3"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let service = VoyageEmbeddingService::new(
            "voyage-key".to_string(),
            "voyage-3".to_string(),
            "search_document",
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(server.url());

        let vectors = service
            .embed(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(vectors, vec![vec![1.0], vec![2.0], vec![3.0]]);
    }

    #[tokio::test]
    async fn test_server_error_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/embeddings")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        let service = VoyageEmbeddingService::new(
            "voyage-key".to_string(),
            "voyage-3".to_string(),
            "document",
            Duration::from_secs(5),
        )
        .unwrap()
        .with_base_url(server.url());

        let err = service.embed(&["a".to_string()]).await.unwrap_err();
        assert!(matches!(err, EmbeddingError::Provider { status: 500, .. }));
    }
}
