//! The core models for keeping chat transcripts in memory.
use crate::deepseek::{Message, Role};

pub const GREETING: &str = "Hello! How can I help you today? 😊";

/// An ordered, append-only list of messages making up one chat.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conversation(Vec<Message>);

impl Conversation {
    /// A new conversation always opens with the assistant greeting.
    pub fn seeded() -> Self {
        Self(vec![Message::new(Role::Assistant, GREETING)])
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn push(&mut self, msg: Message) {
        self.0.push(msg)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of messages the user has sent in this conversation.
    pub fn user_turns(&self) -> usize {
        self.0.iter().filter(|m| m.role() == Role::User).count()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::seeded()
    }
}

/// Handle to a conversation owned by a `Session`. Two equal ids
/// always refer to the same underlying conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConversationId(pub(crate) usize);
