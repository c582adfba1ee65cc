//! Conversation turns in the generation API's wire shape.
//!
//! The browser keeps these as plain JSON and sends them back verbatim, so
//! the types here deserialize exactly what the API (and the client) emit.

use serde::{Deserialize, Serialize};

use crate::consts::INITIAL_QUESTION;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// Base64 image payload attached to a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    #[serde(alias = "mimeType")]
    pub mime_type: String,
    pub data: String,
}

/// One piece of a turn: text or an inline image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(alias = "inlineData")]
        inline_data: Blob,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text { text } => Some(text),
            Part::Inline { .. } => None,
        }
    }
}

/// A single turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Role::User,
            parts,
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![Part::text(text)])
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.parts.iter().filter_map(Part::as_text).collect()
    }
}

/// The follow-up thread a client keeps after the first answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Content>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the thread from the first answer to an image.
    pub fn seed(&mut self, initial_answer: &str) {
        self.turns.clear();
        self.push_user_text(INITIAL_QUESTION);
        self.push_model_text(initial_answer);
    }

    pub fn push_user_text(&mut self, text: &str) {
        self.turns.push(Content::user_text(text));
    }

    pub fn push_model_text(&mut self, text: &str) {
        self.turns.push(Content::model_text(text));
    }

    /// Contents to send for a follow-up question. Does not record the question.
    pub fn follow_up(&self, question: &str) -> Vec<Content> {
        let mut contents = self.turns.clone();
        contents.push(Content::user_text(question));
        contents
    }

    pub fn turns(&self) -> &[Content] {
        &self.turns
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl From<Vec<Content>> for Conversation {
    fn from(turns: Vec<Content>) -> Self {
        Self { turns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_part_serializes_flat() {
        let value = serde_json::to_value(Content::user_text("hi")).unwrap();
        assert_eq!(value, json!({"role": "user", "parts": [{"text": "hi"}]}));
    }

    #[test]
    fn inline_part_uses_snake_case() {
        let content = Content::user(vec![Part::Inline {
            inline_data: Blob {
                mime_type: "image/png".to_string(),
                data: "AAAA".to_string(),
            },
        }]);
        let value = serde_json::to_value(content).unwrap();
        assert_eq!(
            value["parts"][0],
            json!({"inline_data": {"mime_type": "image/png", "data": "AAAA"}})
        );
    }

    #[test]
    fn inline_part_accepts_camel_case() {
        let part: Part = serde_json::from_value(json!({
            "inlineData": {"mimeType": "image/jpeg", "data": "BBBB"}
        }))
        .unwrap();
        match part {
            Part::Inline { inline_data } => {
                assert_eq!(inline_data.mime_type, "image/jpeg");
                assert_eq!(inline_data.data, "BBBB");
            }
            _ => panic!("expected Inline"),
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result: Result<Content, _> =
            serde_json::from_value(json!({"role": "system", "parts": []}));
        assert!(result.is_err());
    }

    #[test]
    fn seed_starts_fresh_thread() {
        let mut conversation = Conversation::new();
        conversation.push_user_text("stale");
        conversation.seed("答え");

        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.turns()[0].role, Role::User);
        assert_eq!(conversation.turns()[0].text(), INITIAL_QUESTION);
        assert_eq!(conversation.turns()[1].role, Role::Model);
        assert_eq!(conversation.turns()[1].text(), "答え");
    }

    #[test]
    fn follow_up_does_not_mutate() {
        let mut conversation = Conversation::new();
        conversation.seed("answer");

        let contents = conversation.follow_up("why?");
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[2].text(), "why?");
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn conversation_is_a_plain_array_on_the_wire() {
        let mut conversation = Conversation::new();
        conversation.seed("answer");
        let value = serde_json::to_value(&conversation).unwrap();
        assert!(value.is_array());
        assert_eq!(value.as_array().unwrap().len(), 2);
    }
}
