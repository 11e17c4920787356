use std::env;

pub const DEFAULT_API_HOSTNAME: &str = "https://api.deepseek.com";
pub const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_hostname: String,
    pub api_key: String,
    pub model: String,
}

impl AppConfig {
    /// Replaces the model and API host when they were given on the
    /// command line.
    pub fn with_overrides(mut self, model: Option<String>, api_hostname: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        if let Some(api_hostname) = api_hostname {
            self.api_hostname = api_hostname;
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let api_hostname =
            env::var("DEEPSEEK_API_HOST").unwrap_or_else(|_| DEFAULT_API_HOSTNAME.to_string());
        // A missing key is not an error here, the API rejects the
        // first request instead
        let api_key = env::var("DEEPSEEK_API_KEY").unwrap_or_default();
        if api_key.is_empty() {
            tracing::warn!("DEEPSEEK_API_KEY is not set, requests will be unauthorized");
        }
        let model = env::var("DEEPSEEK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Self {
            api_hostname,
            api_key,
            model,
        }
    }
}
