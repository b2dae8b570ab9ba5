use crate::errors::{ClientError, ClientResult};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub token_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> ClientResult<Self> {
        dotenvy::dotenv().ok();

        let request_timeout_secs = env_var_or("BS_REQUEST_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| ClientError::Config(format!("BS_REQUEST_TIMEOUT_SECS: {e}")))?;

        Ok(Self {
            api_base_url: env_var_or("BS_API_BASE_URL", "http://localhost:5000"),
            token_path: PathBuf::from(env_var_or("BS_TOKEN_PATH", ".bs_token")),
            request_timeout_secs,
        })
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
