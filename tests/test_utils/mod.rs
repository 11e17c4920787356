//! Test utilities for integration tests
use deepchat::core::AppConfig;
use deepchat::deepseek::DeepSeekClient;
use serde_json::json;

pub const TEST_API_KEY: &str = "test-api-key";

/// Creates a client that talks to the mock server at `url`.
pub fn test_client(url: &str) -> DeepSeekClient {
    let config = AppConfig {
        api_hostname: url.to_string(),
        api_key: TEST_API_KEY.to_string(),
        model: String::from("deepseek-chat"),
    };
    DeepSeekClient::new(&config)
}

/// A successful chat completion response containing `content`.
pub fn completion_body(content: &str) -> String {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1694268190,
        "model": "deepseek-chat",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": content
            },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}
