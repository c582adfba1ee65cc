use async_trait::async_trait;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{GenerateError, Generation, Generator};
use crate::conversation::Content;

/// One scripted answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(Generation),
    Fail(String),
}

impl Reply {
    pub fn text(text: &str) -> Self {
        Reply::Text(Generation::text(text))
    }
}

/// A scripted generator for tests. Returns pre-defined replies in order
/// and records every conversation it was asked about.
pub struct MockGenerator {
    replies: Vec<Reply>,
    index: AtomicUsize,
    requests: Mutex<Vec<Vec<Content>>>,
    configured: bool,
}

impl MockGenerator {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies,
            index: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            configured: true,
        }
    }

    /// Text-only replies.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Reply::text(t)).collect())
    }

    /// A generator without an API key.
    pub fn unconfigured() -> Self {
        Self {
            configured: false,
            ..Self::new(Vec::new())
        }
    }

    /// Conversations received so far, in call order.
    pub fn requests(&self) -> Vec<Vec<Content>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Generator for MockGenerator {
    fn model(&self) -> &str {
        "mock"
    }

    async fn check_ready(&self) -> Result<(), GenerateError> {
        if self.configured {
            Ok(())
        } else {
            Err(GenerateError::MissingApiKey)
        }
    }

    async fn generate(&self, contents: &[Content]) -> Result<Generation, GenerateError> {
        self.check_ready().await?;
        self.requests.lock().unwrap().push(contents.to_vec());

        let i = self.index.fetch_add(1, Ordering::SeqCst);
        match self.replies.get(i) {
            Some(Reply::Text(generation)) => Ok(generation.clone()),
            Some(Reply::Fail(reason)) => Err(GenerateError::Api {
                status: 500,
                reason: reason.clone(),
            }),
            None => Err(GenerateError::Unavailable(format!(
                "MockGenerator: no more replies (called {} times)",
                i + 1
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_order_and_records() {
        let generator = MockGenerator::texts(&["one", "two"]);
        let contents = vec![Content::user_text("q")];

        assert_eq!(generator.generate(&contents).await.unwrap().text, "one");
        assert_eq!(generator.generate(&contents).await.unwrap().text, "two");
        assert_eq!(generator.calls(), 2);
        assert_eq!(generator.requests()[0], contents);
    }

    #[tokio::test]
    async fn exhausted_script_fails() {
        let generator = MockGenerator::texts(&[]);
        let err = generator.generate(&[]).await.unwrap_err();
        assert!(err.to_string().contains("no more replies"));
    }

    #[tokio::test]
    async fn scripted_failure() {
        let generator = MockGenerator::new(vec![Reply::Fail("boom".to_string())]);
        assert!(matches!(
            generator.generate(&[]).await,
            Err(GenerateError::Api { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn unconfigured_is_not_ready() {
        let generator = MockGenerator::unconfigured();
        assert!(matches!(
            generator.check_ready().await,
            Err(GenerateError::MissingApiKey)
        ));
        assert_eq!(generator.calls(), 0);
    }
}
