use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use super::{GenerateError, Generation, Generator, TokenUsage};
use crate::auth::AuthStorage;
use crate::consts::{API_KEY_ENV, DEFAULT_API_BASE, DEFAULT_MODEL, PROVIDER};
use crate::conversation::Content;

/// A generator that calls the Gemini `generateContent` endpoint.
pub struct GeminiGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
    auth: Arc<AuthStorage>,
}

impl GeminiGenerator {
    pub fn new(model: Option<String>, auth: Arc<AuthStorage>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            auth,
        }
    }

    /// Point at a different API host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn api_key(&self) -> Result<String, GenerateError> {
        self.auth
            .get_api_key(PROVIDER, API_KEY_ENV)
            .map_err(GenerateError::Credentials)?
            .ok_or(GenerateError::MissingApiKey)
    }

    fn into_generation(resp: ApiResponse) -> Generation {
        let text = resp
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .unwrap_or_default();

        let usage = resp.usage_metadata.map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        });

        Generation { text, usage }
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn check_ready(&self) -> Result<(), GenerateError> {
        self.api_key().map(|_| ())
    }

    async fn generate(&self, contents: &[Content]) -> Result<Generation, GenerateError> {
        let api_key = self.api_key()?;

        // Key goes in a header so it never shows up in URLs or error messages.
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&ApiRequest { contents })
            .send()
            .await
            .map_err(|e| GenerateError::Transport(e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "generation API error");
            return Err(GenerateError::Api {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let api_resp: ApiResponse = resp
            .json()
            .await
            .map_err(|e| GenerateError::Transport(e.without_url()))?;
        let generation = Self::into_generation(api_resp);

        if let Some(usage) = generation.usage {
            debug!(
                input = usage.input_tokens,
                output = usage.output_tokens,
                "token usage"
            );
        }

        Ok(generation)
    }
}

// --- API types ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    contents: &'a [Content],
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
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

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Generation {
        GeminiGenerator::into_generation(serde_json::from_str(json).unwrap())
    }

    fn generator() -> GeminiGenerator {
        let auth = Arc::new(AuthStorage::open(":memory:").unwrap());
        GeminiGenerator::new(None, auth)
    }

    #[test]
    fn first_candidate_first_part() {
        let generation = parse(
            r#"{"candidates": [
                {"content": {"role": "model", "parts": [{"text": "first"}, {"text": "second"}]}},
                {"content": {"role": "model", "parts": [{"text": "other"}]}}
            ]}"#,
        );
        assert_eq!(generation.text, "first");
        assert!(generation.usage.is_none());
    }

    #[test]
    fn missing_candidates_is_empty_text() {
        assert_eq!(parse("{}").text, "");
        assert_eq!(parse(r#"{"candidates": []}"#).text, "");
    }

    #[test]
    fn missing_content_is_empty_text() {
        assert_eq!(parse(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).text, "");
    }

    #[test]
    fn non_text_part_is_empty_text() {
        let generation = parse(
            r#"{"candidates": [{"content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "AA"}}]}}]}"#,
        );
        assert_eq!(generation.text, "");
    }

    #[test]
    fn usage_metadata_is_read() {
        let generation = parse(
            r#"{"candidates": [{"content": {"parts": [{"text": "x"}]}}],
                "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 30, "totalTokenCount": 150}}"#,
        );
        assert_eq!(
            generation.usage,
            Some(TokenUsage {
                input_tokens: 120,
                output_tokens: 30
            })
        );
    }

    #[test]
    fn default_model_and_endpoint() {
        let generator = generator();
        assert_eq!(generator.model(), DEFAULT_MODEL);
        assert_eq!(
            generator.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let generator = generator().with_base_url("http://127.0.0.1:9999/");
        assert!(generator.endpoint().starts_with("http://127.0.0.1:9999/v1beta/"));
    }

    #[test]
    fn request_body_shape() {
        let contents = vec![Content::user_text("hello")];
        let value = serde_json::to_value(ApiRequest {
            contents: &contents,
        })
        .unwrap();
        assert_eq!(
            value,
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }
}
