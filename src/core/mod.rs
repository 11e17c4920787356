mod config;
pub use config::AppConfig;
pub use config::{DEFAULT_API_HOSTNAME, DEFAULT_MODEL};
