//! Terminal client: the same solve-then-chat flow as the browser client.

pub mod history;
pub mod remote;
pub mod render;

use anyhow::{Result, bail};
use tracing::warn;

use crate::conversation::Conversation;
use crate::image::DataUrl;
use crate::solver::{SolveRequest, Tutor};
use history::HistoryStore;

/// One problem and its follow-up thread.
pub struct ChatSession {
    tutor: Box<dyn Tutor>,
    history: Option<HistoryStore>,
    conversation: Conversation,
}

impl ChatSession {
    pub fn new(tutor: Box<dyn Tutor>, history: Option<HistoryStore>) -> Self {
        Self {
            tutor,
            history,
            conversation: Conversation::new(),
        }
    }

    /// Solve a new problem. Any previous thread is discarded first.
    pub async fn start(&mut self, image: &DataUrl) -> Result<String> {
        self.conversation.clear();

        let image_url = image.to_string();
        let answer = self.tutor.ask(&SolveRequest::image(image_url.as_str())).await?;

        if let Some(history) = &self.history
            && let Err(e) = history.save(&image_url, &answer)
        {
            warn!(error = %e, "failed to save history");
        }

        self.conversation.seed(&answer);
        Ok(answer)
    }

    /// Ask about the current problem. Blank input is ignored (`Ok(None)`).
    /// The thread only grows when the answer arrives.
    pub async fn follow_up(&mut self, question: &str) -> Result<Option<String>> {
        let question = question.trim();
        if question.is_empty() {
            return Ok(None);
        }
        if self.conversation.is_empty() {
            bail!("no problem loaded yet");
        }

        let request = SolveRequest::follow_up(question, self.conversation.turns().to_vec());
        let answer = self.tutor.ask(&request).await?;

        self.conversation.push_user_text(question);
        self.conversation.push_model_text(&answer);
        Ok(Some(answer))
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn history(&self) -> Option<&HistoryStore> {
        self.history.as_ref()
    }

    /// Drop the current thread.
    pub fn reset(&mut self) {
        self.conversation.clear();
    }
}
