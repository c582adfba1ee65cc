//! The request handler core: turns a [`SolveRequest`] into prompts,
//! calls the generator, and relays the answer.

mod engine;

pub use engine::Solver;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::conversation::Content;
use crate::generator::GenerateError;
use crate::image::ImageError;

/// How an image becomes an answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PipelineMode {
    /// Extract the graph's data as JSON, then solve from the data.
    #[default]
    TwoStep,
    /// Solve straight from the image in one call.
    Direct,
}

impl PipelineMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PipelineMode::TwoStep => "two-step",
            PipelineMode::Direct => "direct",
        }
    }
}

impl fmt::Display for PipelineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "two-step" => Ok(PipelineMode::TwoStep),
            "direct" => Ok(PipelineMode::Direct),
            other => Err(format!("unknown pipeline: {other}")),
        }
    }
}

/// Body of `POST /api/solve`.
///
/// An image starts a new problem. Without one, `question` continues the
/// conversation in `history`, which the client sends back verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolveRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Content>>,
}

impl SolveRequest {
    pub fn image(image: impl Into<String>) -> Self {
        Self {
            image: Some(image.into()),
            ..Self::default()
        }
    }

    pub fn follow_up(question: impl Into<String>, history: Vec<Content>) -> Self {
        Self {
            question: Some(question.into()),
            history: Some(history),
            ..Self::default()
        }
    }
}

/// Successful answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResponse {
    pub result: String,
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("API key is not configured.")]
    MissingApiKey,
    #[error("Image or question is required.")]
    MissingInput,
    #[error(transparent)]
    InvalidImage(#[from] ImageError),
    #[error(transparent)]
    Generate(GenerateError),
}

impl From<GenerateError> for SolveError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::MissingApiKey => SolveError::MissingApiKey,
            other => SolveError::Generate(other),
        }
    }
}

/// Anything that answers solve requests: the local [`Solver`] or a remote
/// server reached over HTTP.
#[async_trait]
pub trait Tutor: Send + Sync {
    async fn ask(&self, request: &SolveRequest) -> Result<String>;
}

#[async_trait]
impl<T: Tutor + ?Sized> Tutor for Arc<T> {
    async fn ask(&self, request: &SolveRequest) -> Result<String> {
        (**self).ask(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pipeline_parses_its_own_names() {
        for mode in [PipelineMode::TwoStep, PipelineMode::Direct] {
            assert_eq!(mode.as_str().parse::<PipelineMode>().unwrap(), mode);
        }
        assert!("three-step".parse::<PipelineMode>().is_err());
    }

    #[test]
    fn pipeline_serializes_kebab() {
        assert_eq!(
            serde_json::to_value(PipelineMode::TwoStep).unwrap(),
            json!("two-step")
        );
    }

    #[test]
    fn request_fields_are_optional() {
        let request: SolveRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.image.is_none());
        assert!(request.question.is_none());
        assert!(request.history.is_none());
    }

    #[test]
    fn follow_up_request_shape() {
        let request = SolveRequest::follow_up("なぜ?", vec![Content::user_text("q")]);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"question": "なぜ?", "history": [{"role": "user", "parts": [{"text": "q"}]}]})
        );
    }

    #[test]
    fn missing_key_maps_to_its_own_variant() {
        assert!(matches!(
            SolveError::from(GenerateError::MissingApiKey),
            SolveError::MissingApiKey
        ));
        assert!(matches!(
            SolveError::from(GenerateError::Unavailable("x".to_string())),
            SolveError::Generate(_)
        ));
    }

    #[test]
    fn client_facing_messages() {
        assert_eq!(
            SolveError::MissingApiKey.to_string(),
            "API key is not configured."
        );
        assert_eq!(
            SolveError::MissingInput.to_string(),
            "Image or question is required."
        );
    }
}
