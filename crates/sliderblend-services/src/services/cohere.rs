//! Cohere embeddings (v2 `embed` endpoint).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::embedding::{ensure_success, EmbeddingError, EmbeddingProvider};

const COHERE_API_BASE: &str = "https://api.cohere.com";

#[derive(Clone)]
pub struct CohereEmbeddingService {
    api_key: String,
    model: String,
    input_type: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CohereEmbedRequest<'a> {
    model: &'a str,
    input_type: &'a str,
    embedding_types: [&'static str; 1],
    texts: &'a [String],
}

#[derive(Debug, Deserialize)]
struct CohereEmbeddings {
    float: Vec<Vec<f32>>,
}

#[derive(Debug, Deserialize)]
struct CohereEmbedResponse {
    embeddings: CohereEmbeddings,
}

impl CohereEmbeddingService {
    pub fn new(
        api_key: String,
        model: String,
        input_type: String,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            model,
            input_type,
            base_url: COHERE_API_BASE.to_string(),
            client,
        })
    }

    /// Point the client at another host (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn embed_url(&self) -> String {
        format!("{}/v2/embed", self.base_url)
    }
}

#[async_trait]
impl EmbeddingProvider for CohereEmbeddingService {
    fn name(&self) -> &str {
        "cohere"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let body = CohereEmbedRequest {
            model: &self.model,
            input_type: &self.input_type,
            embedding_types: ["float"],
            texts,
        };

        let response = self
            .client
            .post(self.embed_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let parsed: CohereEmbedResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| EmbeddingError::Decode(e.to_string()))?;

        Ok(parsed.embeddings.float)
    }
}
