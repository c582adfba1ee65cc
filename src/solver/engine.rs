use anyhow::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::{PipelineMode, SolveError, SolveRequest, Tutor};
use crate::conversation::{Content, Part};
use crate::extract::parse_extraction;
use crate::generator::{Generator, TokenUsage};
use crate::image::DataUrl;
use crate::prompts::extract::build_extractor_prompt;
use crate::prompts::solve::{build_direct_prompt, build_solver_prompt};

/// Wires a [`Generator`] to the prompt pipeline.
pub struct Solver {
    generator: Arc<dyn Generator>,
    mode: PipelineMode,
    usage: Mutex<TokenUsage>,
}

impl Solver {
    pub fn new(generator: Arc<dyn Generator>, mode: PipelineMode) -> Self {
        Self {
            generator,
            mode,
            usage: Mutex::new(TokenUsage::default()),
        }
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    pub fn model(&self) -> &str {
        self.generator.model()
    }

    /// Tokens used by every call this solver has made.
    pub fn session_usage(&self) -> TokenUsage {
        *self.usage.lock().unwrap()
    }

    /// Answer one request. An image takes precedence over a question.
    pub async fn handle(&self, request: &SolveRequest) -> Result<String, SolveError> {
        self.generator.check_ready().await?;

        if let Some(image) = request.image.as_deref().filter(|s| !s.is_empty()) {
            let image = DataUrl::parse(image)?;
            return self.solve_image(&image).await;
        }

        if let Some(question) = request.question.as_deref().filter(|s| !s.is_empty()) {
            let history = request.history.as_deref().unwrap_or_default();
            return self.follow_up(history, question).await;
        }

        Err(SolveError::MissingInput)
    }

    /// First answer for a photographed problem.
    pub async fn solve_image(&self, image: &DataUrl) -> Result<String, SolveError> {
        match self.mode {
            PipelineMode::TwoStep => self.extract_then_solve(image).await,
            PipelineMode::Direct => {
                info!("calling direct solver");
                let parts = vec![Part::text(build_direct_prompt()), image.to_part()];
                self.call(vec![Content::user(parts)]).await
            }
        }
    }

    /// Continue a conversation. `history` is used as-is.
    pub async fn follow_up(
        &self,
        history: &[Content],
        question: &str,
    ) -> Result<String, SolveError> {
        let mut contents = history.to_vec();
        contents.push(Content::user_text(question));
        info!(turns = contents.len(), "calling follow-up");
        self.call(contents).await
    }

    /// Extractor call, then a solver call built from its JSON.
    ///
    /// A successful extraction sends the solver text only. When extraction
    /// fails, the fallback object tells the model to read the image, so the
    /// image is attached to that solver call as well.
    async fn extract_then_solve(&self, image: &DataUrl) -> Result<String, SolveError> {
        info!(mime = image.mime_type(), "calling extractor");
        let extractor = Content::user(vec![Part::text(build_extractor_prompt()), image.to_part()]);
        let raw = self.call(vec![extractor]).await?;
        debug!(response = %raw, "extractor response");

        let extraction = parse_extraction(&raw);
        let mut parts = vec![Part::text(build_solver_prompt(extraction.value()))];
        if extraction.is_failed() {
            parts.push(image.to_part());
        }

        info!(extracted = !extraction.is_failed(), "calling solver");
        self.call(vec![Content::user(parts)]).await
    }

    async fn call(&self, contents: Vec<Content>) -> Result<String, SolveError> {
        let generation = self.generator.generate(&contents).await?;
        if let Some(usage) = generation.usage {
            self.usage.lock().unwrap().add(usage);
        }
        Ok(generation.text)
    }
}

#[async_trait]
impl Tutor for Solver {
    async fn ask(&self, request: &SolveRequest) -> Result<String> {
        Ok(self.handle(request).await?)
    }
}
