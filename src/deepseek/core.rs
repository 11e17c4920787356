use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

use crate::core::AppConfig;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

/// One turn of a conversation. Messages are never edited after they
/// are created so the fields are only readable.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Reasons a chat completion did not produce a reply.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The API answered with anything other than 200. Holds the
    /// numeric status code and the raw response body.
    #[error("{status} - {body}")]
    Status { status: u16, body: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// A 200 response without `choices[0].message.content`
    #[error("Unexpected response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    /// The text shown in the transcript in place of a reply.
    pub fn to_transcript_text(&self) -> String {
        format!("⚠️ Error: {}", self)
    }
}

/// Anything that can turn a conversation into the next assistant
/// reply.
#[async_trait]
pub trait Completion {
    async fn complete(&self, messages: &[Message]) -> Result<String, CompletionError>;
}

/// Builds the JSON payload for a chat completion request.
pub fn completion_payload(messages: &[Message], model: &str) -> Value {
    json!({
        "model": model,
        "messages": messages,
    })
}

/// Pulls the reply out of a successful chat completion response body.
pub fn extract_reply(body: &str) -> Result<String, CompletionError> {
    let resp: Value = serde_json::from_str(body)
        .map_err(|_| CompletionError::MalformedResponse(body.to_string()))?;
    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(String::from)
        .ok_or_else(|| CompletionError::MalformedResponse(body.to_string()))
}

/// Sends the full conversation to the chat completions endpoint and
/// waits for the complete reply. There is no retry and no streaming.
pub async fn completion(
    client: &reqwest::Client,
    messages: &[Message],
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<String, CompletionError> {
    let payload = completion_payload(messages, model);
    let url = format!("{}/v1/chat/completions", api_hostname.trim_end_matches("/"));
    tracing::debug!("POST {} with {} messages", url, messages.len());

    let response = client
        .post(url)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if status != reqwest::StatusCode::OK {
        return Err(CompletionError::Status {
            status: status.as_u16(),
            body,
        });
    }

    extract_reply(&body)
}

/// Chat completion client for the DeepSeek API.
pub struct DeepSeekClient {
    client: reqwest::Client,
    api_hostname: String,
    api_key: String,
    model: String,
}

impl DeepSeekClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_hostname: config.api_hostname.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Completion for DeepSeekClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, CompletionError> {
        let result = completion(
            &self.client,
            messages,
            &self.api_hostname,
            &self.api_key,
            &self.model,
        )
        .await;
        if let Err(e) = &result {
            tracing::warn!("Chat completion failed: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn test_client(url: &str) -> DeepSeekClient {
        DeepSeekClient::new(&AppConfig {
            api_hostname: url.to_string(),
            api_key: String::from("test-key"),
            model: String::from("deepseek-chat"),
        })
    }

    #[test]
    fn test_message_serialization() {
        let msg = Message::new(Role::User, "Hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, json!({"role": "user", "content": "Hello"}));
    }

    #[test]
    fn test_message_deserialization() {
        let msg: Message =
            serde_json::from_str(r#"{"role": "assistant", "content": "Hi there"}"#).unwrap();
        assert_eq!(msg.role(), Role::Assistant);
        assert_eq!(msg.content(), "Hi there");
    }

    #[test]
    fn test_payload_mirrors_messages_in_order() {
        let messages = vec![
            Message::new(Role::Assistant, "Hello!"),
            Message::new(Role::User, "hi"),
            Message::new(Role::Assistant, "reply"),
            Message::new(Role::User, "again"),
        ];
        let payload = completion_payload(&messages, "deepseek-chat");

        assert_eq!(payload["model"], "deepseek-chat");
        let sent = payload["messages"].as_array().unwrap();
        assert_eq!(sent.len(), messages.len());
        for (sent, msg) in sent.iter().zip(messages.iter()) {
            assert_eq!(sent["role"], json!(msg.role()));
            assert_eq!(sent["content"], msg.content());
        }
    }

    #[test]
    fn test_extract_reply() {
        let body = r#"{"choices": [{"index": 0, "message": {"role": "assistant", "content": "Hello!"}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), "Hello!");
    }

    #[test]
    fn test_extract_reply_missing_content() {
        let body = r#"{"choices": []}"#;
        let err = extract_reply(body).unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(b) if b == body));
    }

    #[test]
    fn test_extract_reply_not_json() {
        let err = extract_reply("<html>oops</html>").unwrap_err();
        assert!(matches!(err, CompletionError::MalformedResponse(_)));
    }

    #[test]
    fn test_status_error_transcript_text() {
        let err = CompletionError::Status {
            status: 500,
            body: String::from("server error"),
        };
        assert_eq!(err.to_transcript_text(), "⚠️ Error: 500 - server error");
    }

    #[tokio::test]
    async fn test_completion_basic() {
        let mut server = mockito::Server::new_async().await;

        let response_body = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "created": 1694268190,
            "model": "deepseek-chat",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Hello!"
                },
                "finish_reason": "stop"
            }]
        }"#;

        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "model": "deepseek-chat",
                "messages": [
                    {"role": "assistant", "content": "Hello! How can I help you today? 😊"},
                    {"role": "user", "content": "Hi"}
                ]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response_body)
            .create_async()
            .await;

        let messages = vec![
            Message::new(Role::Assistant, "Hello! How can I help you today? 😊"),
            Message::new(Role::User, "Hi"),
        ];
        let result = test_client(&server.url()).complete(&messages).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "Hello!");
    }

    #[tokio::test]
    async fn test_completion_error_status() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(500)
            .with_body("server error")
            .create_async()
            .await;

        let messages = vec![Message::new(Role::User, "Hi")];
        let result = test_client(&server.url()).complete(&messages).await;

        mock.assert_async().await;
        match result {
            Err(CompletionError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "server error");
            }
            other => panic!("Expected a status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_completion_unauthorized() {
        let mut server = mockito::Server::new_async().await;

        let body = r#"{"error":{"message":"Authentication Fails","type":"authentication_error"}}"#;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body(body)
            .create_async()
            .await;

        let messages = vec![Message::new(Role::User, "Hi")];
        let err = test_client(&server.url())
            .complete(&messages)
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.to_transcript_text(), format!("⚠️ Error: 401 - {}", body));
    }

    #[tokio::test]
    async fn test_completion_malformed_response() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let messages = vec![Message::new(Role::User, "Hi")];
        let result = test_client(&server.url()).complete(&messages).await;

        mock.assert_async().await;
        assert!(matches!(result, Err(CompletionError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_completion_trims_trailing_slash() {
        let mut server = mockito::Server::new_async().await;

        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": [{"message": {"role": "assistant", "content": "ok"}}]}"#)
            .create_async()
            .await;

        let url = format!("{}/", server.url());
        let messages = vec![Message::new(Role::User, "Hi")];
        let result = test_client(&url).complete(&messages).await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_completion_transport_error() {
        // Nothing listens on port 1
        let messages = vec![Message::new(Role::User, "Hi")];
        let result = test_client("http://127.0.0.1:1").complete(&messages).await;
        assert!(matches!(result, Err(CompletionError::Transport(_))));
    }
}
