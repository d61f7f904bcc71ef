//! Model completions behind a single capability trait.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::embedder::DEFAULT_BASE_URL;
use crate::{ProviderError, Result};

pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.0-flash";

/// What the caller expects back from the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    /// A JSON document; the caller still validates it
    Json,
    /// Free text
    Text,
}

/// Opaque text generation
pub trait TextCompletion: Send + Sync {
    fn complete(&self, prompt: &str, mode: CompletionMode) -> Result<String>;
}

impl<T: TextCompletion + ?Sized> TextCompletion for &T {
    fn complete(&self, prompt: &str, mode: CompletionMode) -> Result<String> {
        (**self).complete(prompt, mode)
    }
}

impl<T: TextCompletion + ?Sized> TextCompletion for Box<T> {
    fn complete(&self, prompt: &str, mode: CompletionMode) -> Result<String> {
        (**self).complete(prompt, mode)
    }
}

/// Settings for [`OpenAiChat`]
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_CHAT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: 500,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Chat completions against an OpenAI-compatible endpoint
pub struct OpenAiChat {
    client: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: usize,
}

impl OpenAiChat {
    pub fn new(config: CompletionConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::InvalidConfig("missing model API key".to_string()));
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
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

impl TextCompletion for OpenAiChat {
    fn complete(&self, prompt: &str, mode: CompletionMode) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            response_format: match mode {
                CompletionMode::Json => Some(ResponseFormat { kind: "json_object" }),
                CompletionMode::Text => None,
            },
        };

        tracing::debug!(model = %self.model, ?mode, "requesting completion");
        let resp = self.client.post(&self.endpoint).json(&body).send()?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp
                .text()
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(ProviderError::Status {
                service: "chat completions",
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse = resp.json()?;
        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse("completion has no content".to_string()))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: usize,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn chat(server: &mockito::Server) -> OpenAiChat {
        OpenAiChat::new(CompletionConfig {
            api_key: "k".to_string(),
            base_url: format!("{}/v1/", server.url()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_json_mode_requests_json_object() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": DEFAULT_CHAT_MODEL,
                "response_format": {"type": "json_object"}
            })))
            .with_status(200)
            .with_body(r#"{"choices": [{"message": {"content": "{\"role\": \"SRE\"}"}}]}"#)
            .create();

        let out = chat(&server).complete("extract", CompletionMode::Json).unwrap();
        mock.assert();
        assert_eq!(out, r#"{"role": "SRE"}"#);
    }

    #[test]
    fn test_text_mode() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": [{"message": {"content": "Dear hiring manager"}}]}"#)
            .create();

        let out = chat(&server).complete("write", CompletionMode::Text).unwrap();
        assert_eq!(out, "Dear hiring manager");
    }

    #[test]
    fn test_quota_error() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("quota exceeded")
            .create();

        let err = chat(&server).complete("x", CompletionMode::Text).unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 429, ref body, .. } if body == "quota exceeded"));
    }

    #[test]
    fn test_missing_content() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create();

        let err = chat(&server).complete("x", CompletionMode::Text).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
