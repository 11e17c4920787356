//! Client for the DeepSeek chat completions API.
mod core;
pub use self::core::{
    Completion, CompletionError, DeepSeekClient, Message, Role, completion, completion_payload,
    extract_reply,
};
