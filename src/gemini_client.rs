use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::config::Config;

/// Sampling parameters sent with every request. Fixed, not user-tunable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_k: u32,
    pub top_p: f64,
    pub max_output_tokens: u32,
}

pub const GENERATION_CONFIG: GenerationConfig = GenerationConfig {
    temperature: 2.0,
    top_k: 64,
    top_p: 0.95,
    max_output_tokens: 8192,
};

/// A single-turn request: the full prompt text, nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub text: String,
    pub generation_config: GenerationConfig,
}

impl PromptRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            generation_config: GENERATION_CONFIG,
        }
    }

    fn body(&self) -> GenerateContentRequest<'_> {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![TextPart { text: &self.text }],
            }],
            generation_config: self.generation_config,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("request to Gemini failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gemini returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("unexpected response from Gemini: {0}")]
    MalformedResponse(String),

    #[error("invalid Gemini endpoint: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Anything that can turn a prompt into reply text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &PromptRequest) -> Result<String, GeminiError>;
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?.to_string();

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> Result<Url, GeminiError> {
        let raw = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        Ok(Url::parse_with_params(&raw, &[("key", &self.api_key)])?)
    }

    pub async fn generate_content(&self, request: &PromptRequest) -> Result<String, GeminiError> {
        let body = request.body();

        debug!(
            "Sending request to Gemini API: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let response = self.client.post(self.endpoint()?).json(&body).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            error!("API request failed with status {}: {}", status, text);
            return Err(GeminiError::Status { status, body: text });
        }

        debug!("Received response from Gemini API: {}", text);

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| GeminiError::MalformedResponse(e.to_string()))?;

        parsed.into_text().ok_or_else(|| {
            GeminiError::MalformedResponse("missing candidates[0].content.parts[0].text".to_string())
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &PromptRequest) -> Result<String, GeminiError> {
        self.generate_content(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(base_url: &str) -> GeminiClient {
        let config = Config {
            api_key: Some("test-key".to_string()),
            model: "test-model".to_string(),
            base_url: base_url.to_string(),
            ..Config::default()
        };
        GeminiClient::new(&config).unwrap()
    }

    const PATH: &str = "/models/test-model:generateContent";

    #[test]
    fn body_carries_single_user_turn_and_fixed_parameters() {
        let request = PromptRequest::new("hello there");
        let body = serde_json::to_value(request.body()).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [
                    { "role": "user", "parts": [ { "text": "hello there" } ] }
                ],
                "generationConfig": {
                    "temperature": 2.0,
                    "topK": 64,
                    "topP": 0.95,
                    "maxOutputTokens": 8192
                }
            })
        );
    }

    #[test]
    fn api_key_travels_as_query_parameter() {
        let client = client_for("https://example.com/v1beta/");
        let url = client.endpoint().unwrap();
        assert_eq!(url.path(), "/v1beta/models/test-model:generateContent");
        assert_eq!(url.query(), Some("key=test-key"));
    }

    #[test]
    fn client_requires_api_key() {
        assert!(GeminiClient::new(&Config::default()).is_err());
    }

    #[tokio::test]
    async fn extracts_first_candidate_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", PATH)
            .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
            .match_body(Matcher::PartialJson(json!({
                "contents": [ { "role": "user", "parts": [ { "text": "ping" } ] } ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"candidates":[{"content":{"parts":[{"text":"pong"},{"text":"ignored"}]}},
                   {"content":{"parts":[{"text":"second"}]}}]}"#,
            )
            .create_async()
            .await;

        let reply = client_for(&server.url())
            .generate_content(&PromptRequest::new("ping"))
            .await
            .unwrap();

        assert_eq!(reply, "pong");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(429)
            .with_body("quota exceeded")
            .create_async()
            .await;

        let err = client_for(&server.url())
            .generate_content(&PromptRequest::new("ping"))
            .await
            .unwrap_err();

        match err {
            GeminiError::Status { status, body } => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(body, "quota exceeded");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_candidates_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#)
            .create_async()
            .await;

        let err = client_for(&server.url())
            .generate_content(&PromptRequest::new("ping"))
            .await
            .unwrap_err();

        assert!(matches!(err, GeminiError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>gateway</html>")
            .create_async()
            .await;

        let err = client_for(&server.url())
            .generate_content(&PromptRequest::new("ping"))
            .await
            .unwrap_err();

        assert!(matches!(err, GeminiError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let err = client_for("http://127.0.0.1:1")
            .generate_content(&PromptRequest::new("ping"))
            .await
            .unwrap_err();

        assert!(matches!(err, GeminiError::Transport(_)));
    }
}
