//! Streaming wellness chat.

mod client;
mod sse;

pub use client::ChatClient;
pub use sse::{SseDecoder, SseItem};

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Message history plus the reply currently streaming in.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    /// Set while an assistant reply is in flight.
    pending: bool,
}

impl Conversation {
    /// Start with the assistant's greeting.
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(greeting)],
            pending: false,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Record the user's message and open an empty assistant reply.
    ///
    /// Returns the history to send, which excludes the empty reply.
    pub fn send(&mut self, input: &str) -> Result<Vec<ChatMessage>, ChatError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.pending {
            return Err(ChatError::Busy);
        }
        self.messages.push(ChatMessage::user(text));
        let outgoing = self.messages.clone();
        self.messages.push(ChatMessage::assistant(""));
        self.pending = true;
        Ok(outgoing)
    }

    /// Append streamed text to the open reply.
    pub fn append(&mut self, delta: &str) {
        if !self.pending {
            return;
        }
        if let Some(last) = self.messages.last_mut() {
            last.content.push_str(delta);
        }
    }

    /// Close the reply. An empty reply is dropped rather than kept.
    pub fn finish(&mut self) {
        if !self.pending {
            return;
        }
        self.pending = false;
        if self.messages.last().is_some_and(|m| m.content.is_empty()) {
            self.messages.pop();
        }
    }

    /// Abandon the reply after a hard failure, discarding partial text.
    pub fn fail(&mut self) {
        if !self.pending {
            return;
        }
        self.pending = false;
        self.messages.pop();
    }
}
