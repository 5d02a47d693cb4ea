// src/config.rs

use std::env;
use std::path::PathBuf;
use dotenvy::dotenv;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: Url,
    pub token_file: PathBuf,
    pub log_dir: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let api_url = env::var("API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string())
            .parse()
            .expect("API_URL must be a valid URL");

        let token_file = env::var("TOKEN_FILE")
            .unwrap_or_else(|_| ".quiz_client/token.json".to_string())
            .into();

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string())
            .into();

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            api_url,
            token_file,
            log_dir,
            rust_log,
        }
    }
}
