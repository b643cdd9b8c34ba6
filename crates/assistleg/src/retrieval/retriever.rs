use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// A query function over one topic's index. The result shape is whatever the
/// backing service produces.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> Result<Value>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    Similarity,
    /// Maximal marginal relevance
    Mmr,
}

/// Search parameters forwarded to the retrieval service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    #[serde(rename = "type")]
    pub search_type: SearchType,
    pub k: usize,
    pub fetch_k: usize,
    pub lambda_mult: f32,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            search_type: SearchType::Mmr,
            k: 5,
            fetch_k: 20,
            lambda_mult: 0.35,
        }
    }
}

/// Client for a retrieval service exposing `POST /v1/retrieve`
pub struct HttpRetriever {
    client: Client,
    host: String,
    collection: String,
    search: SearchParams,
}

impl HttpRetriever {
    pub fn new(host: &str, collection: &str, search: SearchParams) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            host: host.to_string(),
            collection: collection.to_string(),
            search,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    async fn retrieve(&self, query: &str) -> Result<Value> {
        let url = format!("{}/v1/retrieve", self.host.trim_end_matches('/'));
        let payload = json!({
            "collection": self.collection,
            "query": query,
            "search": self.search,
        });

        let response = self.client.post(&url).json(&payload).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(anyhow!(
                "Collection '{}' is not served by {}",
                self.collection,
                self.host
            )),
            status => Err(anyhow!("Retrieval request failed: {}", status)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_search_params_wire_format() {
        let value = serde_json::to_value(SearchParams::default()).unwrap();
        assert_eq!(value["type"], "mmr");
        assert_eq!(value["k"], 5);
        assert_eq!(value["fetch_k"], 20);
    }

    #[tokio::test]
    async fn test_http_retriever_posts_query() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/retrieve"))
            .and(body_partial_json(json!({
                "collection": "codigo_trabajo_vs",
                "query": "obligaciones del empleador",
                "search": {"type": "mmr", "k": 5}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [{"page_content": "Artículo 57. Obligaciones especiales del empleador."}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let retriever = HttpRetriever::new(
            &mock_server.uri(),
            "codigo_trabajo_vs",
            SearchParams::default(),
        )?;
        let result = retriever.retrieve("obligaciones del empleador").await?;
        assert_eq!(
            result["documents"][0]["page_content"],
            "Artículo 57. Obligaciones especiales del empleador."
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_http_retriever_reports_failures() -> Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/retrieve"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let retriever = HttpRetriever::new(&mock_server.uri(), "laboral", SearchParams::default())?;
        let err = retriever.retrieve("contrato").await.unwrap_err();
        assert!(err.to_string().contains("500"));
        Ok(())
    }
}
