//! In-memory chat transcripts for a single session.
mod models;
mod session;

pub use models::{Conversation, ConversationId, GREETING};
pub use session::{Session, SessionError, Turn};
