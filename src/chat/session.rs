use std::time::{Duration, Instant};

use thiserror::Error;

use super::models::{Conversation, ConversationId};
use crate::deepseek::{Completion, CompletionError, Message, Role};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("No archived chat at index {index} (archive holds {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// The outcome of submitting one user message.
#[derive(Debug)]
pub struct Turn {
    /// The reply, or why there isn't one. Either way the transcript
    /// already has an assistant message for it.
    pub reply: Result<String, CompletionError>,
    /// Wall clock time spent waiting on the completion.
    pub elapsed: Duration,
}

impl Turn {
    /// The text that was appended to the transcript for this turn.
    pub fn transcript_text(&self) -> String {
        match &self.reply {
            Ok(text) => text.clone(),
            Err(e) => e.to_transcript_text(),
        }
    }
}

/// All chats for one user session.
///
/// Conversations are kept in an append-only arena and referred to by
/// `ConversationId`. The archive stores ids rather than copies, so
/// reopening an archived chat and continuing it extends the archived
/// entry itself.
#[derive(Debug)]
pub struct Session {
    conversations: Vec<Conversation>,
    active: ConversationId,
    // Most recently archived first
    archive: Vec<ConversationId>,
    selected_index: Option<usize>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            conversations: vec![Conversation::seeded()],
            active: ConversationId(0),
            archive: Vec::new(),
            selected_index: None,
        }
    }

    fn create_conversation(&mut self) -> ConversationId {
        self.conversations.push(Conversation::seeded());
        ConversationId(self.conversations.len() - 1)
    }

    /// Archives the active chat at the front of the archive and opens
    /// a freshly seeded one. Chats without user turns are archived
    /// too.
    pub fn start_new_chat(&mut self) {
        // The active conversation is always seeded so it is never empty
        if !self.active_conversation().is_empty() {
            self.archive.insert(0, self.active);
        }
        self.active = self.create_conversation();
        self.selected_index = None;
        tracing::info!("Started new chat, {} archived", self.archive.len());
    }

    /// Makes the archived chat at `index` the active one.
    pub fn select_archived(&mut self, index: usize) -> Result<(), SessionError> {
        let id = *self
            .archive
            .get(index)
            .ok_or(SessionError::IndexOutOfRange {
                index,
                len: self.archive.len(),
            })?;
        self.active = id;
        self.selected_index = Some(index);
        tracing::info!("Opened archived chat at index {}", index);
        Ok(())
    }

    pub fn append(&mut self, role: Role, content: &str) {
        let id = self.active;
        self.conversation_mut(id).push(Message::new(role, content));
    }

    /// Adds the user's message, asks `client` for a reply to the
    /// whole conversation and adds that reply. Failures are added as
    /// the assistant's reply, so the active chat always grows by two
    /// messages.
    pub async fn submit<C>(&mut self, text: &str, client: &C) -> Turn
    where
        C: Completion + ?Sized,
    {
        self.append(Role::User, text);

        let start = Instant::now();
        let reply = client.complete(self.active_messages()).await;
        let elapsed = start.elapsed();

        let turn = Turn { reply, elapsed };
        self.append(Role::Assistant, &turn.transcript_text());
        tracing::debug!("Completed turn in {:.2}s", elapsed.as_secs_f64());
        turn
    }

    pub fn active_id(&self) -> ConversationId {
        self.active
    }

    pub fn active_conversation(&self) -> &Conversation {
        self.conversation(self.active)
    }

    pub fn active_messages(&self) -> &[Message] {
        self.active_conversation().messages()
    }

    pub fn conversation(&self, id: ConversationId) -> &Conversation {
        // Ids are only minted by this session and the arena never
        // shrinks
        &self.conversations[id.0]
    }

    fn conversation_mut(&mut self, id: ConversationId) -> &mut Conversation {
        &mut self.conversations[id.0]
    }

    pub fn archived(&self, index: usize) -> Option<&Conversation> {
        self.archive.get(index).map(|id| self.conversation(*id))
    }

    pub fn archived_id(&self, index: usize) -> Option<ConversationId> {
        self.archive.get(index).copied()
    }

    pub fn archive_len(&self) -> usize {
        self.archive.len()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// Titles for the archived chats in archive order. The newest chat
    /// gets the highest number so numbers stay stable as more chats
    /// are archived.
    pub fn chat_titles(&self) -> Vec<String> {
        let len = self.archive.len();
        (0..len).map(|i| format!("💬 Chat {}", len - i)).collect()
    }

    /// Maps a chat number as shown by `chat_titles` to its archive
    /// index.
    pub fn index_for_chat_number(&self, number: usize) -> Option<usize> {
        let len = self.archive.len();
        if number == 0 || number > len {
            return None;
        }
        Some(len - number)
    }
}
