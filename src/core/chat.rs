//! Append-only conversation log between the user and the assistant.

use chrono::{DateTime, Local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sender: Sender, text: impl Into<String>) -> &ChatMessage {
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id: self.next_id,
            sender,
            text: text.into(),
            timestamp: Local::now(),
        });
        &self.messages[self.messages.len() - 1]
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drop every message. Ids keep increasing across clears.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
