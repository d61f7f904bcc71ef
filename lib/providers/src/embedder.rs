//! Text embedding providers.

use std::thread;
use std::time::Duration;

use coldreach_core::Vector;
use rayon::prelude::*;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::{ProviderError, Result};

/// Gemini's OpenAI-compatible endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Maps text to fixed-dimension vectors.
///
/// `embed_many` returns one vector per input in input order, all of the same
/// dimension. `embed_one` must agree with `embed_many` on that dimension.
pub trait EmbeddingProvider: Send + Sync {
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Vector>>;

    fn embed_one(&self, text: &str) -> Result<Vector> {
        self.embed_many(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("no embedding returned".to_string()))
    }
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for &T {
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
        (**self).embed_many(texts)
    }

    fn embed_one(&self, text: &str) -> Result<Vector> {
        (**self).embed_one(text)
    }
}

impl<T: EmbeddingProvider + ?Sized> EmbeddingProvider for Box<T> {
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
        (**self).embed_many(texts)
    }

    fn embed_one(&self, text: &str) -> Result<Vector> {
        (**self).embed_one(text)
    }
}

/// Settings for [`OpenAiEmbedder`]
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    /// Requested output dimension, for models that support truncation
    pub dimensions: Option<usize>,
    pub timeout: Duration,
    /// HTTP-level retries on 429/5xx and transport errors; 0 disables
    pub max_retries: usize,
    /// Largest number of inputs sent in one request
    pub batch_size: usize,
    /// Issue sub-batches concurrently
    pub parallel: bool,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: None,
            timeout: Duration::from_secs(60),
            max_retries: 0,
            batch_size: DEFAULT_BATCH_SIZE,
            parallel: false,
        }
    }
}

/// Blocking embeddings client for OpenAI-compatible endpoints
#[derive(Clone)]
pub struct OpenAiEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    dimensions: Option<usize>,
    max_retries: usize,
    batch_size: usize,
    parallel: bool,
}

impl OpenAiEmbedder {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::InvalidConfig("missing embedding API key".to_string()));
        }
        if config.model.trim().is_empty() {
            return Err(ProviderError::InvalidConfig("missing embedding model name".to_string()));
        }
        if config.batch_size == 0 {
            return Err(ProviderError::InvalidConfig("batch size must be positive".to_string()));
        }

        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|_| ProviderError::InvalidConfig("invalid API key".to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", config.base_url.trim_end_matches('/')),
            model: config.model,
            dimensions: config.dimensions,
            max_retries: config.max_retries,
            batch_size: config.batch_size,
            parallel: config.parallel,
        })
    }

    /// One request for at most `batch_size` inputs
    fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vector>> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: inputs,
            dimensions: self.dimensions,
        };

        let mut attempt = 0usize;
        loop {
            match self.client.post(&self.endpoint).json(&request).send() {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let mut parsed: EmbeddingResponse = resp.json()?;
                        parsed.data.sort_by_key(|entry| entry.index);
                        if parsed.data.len() != inputs.len() {
                            return Err(ProviderError::InvalidResponse(format!(
                                "embedding endpoint returned {} vectors for {} inputs",
                                parsed.data.len(),
                                inputs.len()
                            )));
                        }
                        return Ok(parsed
                            .data
                            .into_iter()
                            .map(|entry| Vector::new(entry.embedding))
                            .collect());
                    }

                    let body = resp
                        .text()
                        .unwrap_or_else(|_| "<body unavailable>".to_string());
                    if should_retry(status) && attempt < self.max_retries {
                        attempt += 1;
                        tracing::warn!(%status, attempt, "embedding request failed, retrying");
                        thread::sleep(retry_backoff(attempt));
                        continue;
                    }
                    return Err(ProviderError::Status {
                        service: "embeddings",
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(err) => {
                    if (err.is_timeout() || err.is_connect()) && attempt < self.max_retries {
                        attempt += 1;
                        tracing::warn!(error = %err, attempt, "embedding request failed, retrying");
                        thread::sleep(retry_backoff(attempt));
                        continue;
                    }
                    return Err(err.into());
                }
            }
        }
    }
}

impl EmbeddingProvider for OpenAiEmbedder {
    /// Sub-batches are reassembled in input order, also when sent in parallel
    fn embed_many(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            inputs = texts.len(),
            batches = texts.len().div_ceil(self.batch_size),
            "requesting embeddings"
        );
        let batches: Vec<Vec<Vector>> = if self.parallel {
            texts
                .par_chunks(self.batch_size)
                .map(|chunk| self.embed_batch(chunk))
                .collect::<Result<_>>()?
        } else {
            texts
                .chunks(self.batch_size)
                .map(|chunk| self.embed_batch(chunk))
                .collect::<Result<_>>()?
        };

        let vectors: Vec<Vector> = batches.into_iter().flatten().collect();
        if let Some(first) = vectors.first() {
            let dim = first.dim();
            if vectors.iter().any(|v| v.dim() != dim) {
                return Err(ProviderError::InvalidResponse(
                    "embedding batch has mixed dimensions".to_string(),
                ));
            }
        }
        Ok(vectors)
    }
}

fn should_retry(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn retry_backoff(attempt: usize) -> Duration {
    let capped = attempt.min(5) as u32;
    Duration::from_millis(250 * (1 << capped))
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(server: &mockito::Server, batch_size: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            api_key: "test-key".to_string(),
            base_url: server.url(),
            batch_size,
            ..Default::default()
        }
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_response_sorted_by_index() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/embeddings")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"data": [
                    {"index": 1, "embedding": [0.0, 1.0]},
                    {"index": 0, "embedding": [1.0, 0.0]}
                ]}"#,
            )
            .create();

        let embedder = OpenAiEmbedder::new(config(&server, 10)).unwrap();
        let vectors = embedder.embed_many(&texts(&["a", "b"])).unwrap();

        mock.assert();
        assert_eq!(vectors[0].as_slice(), &[1.0, 0.0]);
        assert_eq!(vectors[1].as_slice(), &[0.0, 1.0]);
    }

    #[test]
    fn test_splits_into_batches() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(r#"{"data": [{"index": 0, "embedding": [0.5, 0.5]}]}"#)
            .expect(3)
            .create();

        let embedder = OpenAiEmbedder::new(config(&server, 1)).unwrap();
        let vectors = embedder.embed_many(&texts(&["a", "b", "c"])).unwrap();

        mock.assert();
        assert_eq!(vectors.len(), 3);
    }

    #[test]
    fn test_count_mismatch_is_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(r#"{"data": [{"index": 0, "embedding": [1.0]}]}"#)
            .create();

        let embedder = OpenAiEmbedder::new(config(&server, 10)).unwrap();
        let err = embedder.embed_many(&texts(&["a", "b"])).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn test_auth_failure_is_status_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/embeddings")
            .with_status(401)
            .with_body("invalid api key")
            .create();

        let embedder = OpenAiEmbedder::new(config(&server, 10)).unwrap();
        let err = embedder.embed_one("a").unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 401, .. }));
    }

    #[test]
    fn test_empty_input_skips_request() {
        let server = mockito::Server::new();
        let embedder = OpenAiEmbedder::new(config(&server, 10)).unwrap();
        assert!(embedder.embed_many(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_missing_key() {
        let result = OpenAiEmbedder::new(EmbeddingConfig::default());
        assert!(matches!(result, Err(ProviderError::InvalidConfig(_))));
    }

    #[test]
    fn test_parallel_batches_keep_input_order() {
        let mut server = mockito::Server::new();
        let mocks: Vec<mockito::Mock> = (0..4)
            .map(|i| {
                server
                    .mock("POST", "/embeddings")
                    .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                        "input": [format!("text-{i}")]
                    })))
                    .with_status(200)
                    .with_body(format!(r#"{{"data": [{{"index": 0, "embedding": [{i}.0]}}]}}"#))
                    .create()
            })
            .collect();

        let embedder = OpenAiEmbedder::new(EmbeddingConfig {
            parallel: true,
            ..config(&server, 1)
        })
        .unwrap();
        let vectors = embedder
            .embed_many(&texts(&["text-0", "text-1", "text-2", "text-3"]))
            .unwrap();

        for mock in &mocks {
            mock.assert();
        }
        let firsts: Vec<f32> = vectors.iter().map(|v| v.as_slice()[0]).collect();
        assert_eq!(firsts, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_retries_server_error() {
        let mut server = mockito::Server::new();
        let unavailable = server
            .mock("POST", "/embeddings")
            .with_status(503)
            .with_body("overloaded")
            .expect(1)
            .create();
        let ok = server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(r#"{"data": [{"index": 0, "embedding": [0.25, 0.75]}]}"#)
            .expect(1)
            .create();

        let embedder = OpenAiEmbedder::new(EmbeddingConfig {
            max_retries: 1,
            ..config(&server, 10)
        })
        .unwrap();
        let vector = embedder.embed_one("a").unwrap();

        unavailable.assert();
        ok.assert();
        assert_eq!(vector.as_slice(), &[0.25, 0.75]);
    }

    #[test]
    fn test_no_retry_by_default() {
        let mut server = mockito::Server::new();
        let unavailable = server
            .mock("POST", "/embeddings")
            .with_status(503)
            .expect(1)
            .create();

        let embedder = OpenAiEmbedder::new(config(&server, 10)).unwrap();
        let err = embedder.embed_one("a").unwrap_err();

        unavailable.assert();
        assert!(matches!(err, ProviderError::Status { status: 503, .. }));
    }
}
