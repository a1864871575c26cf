use std::env;

use super::parse_var;
use crate::error::AppError;

/// HTTP listener configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let host = env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("BACKEND_PORT", 3001u16)?;
        Ok(Self { host, port })
    }
}
