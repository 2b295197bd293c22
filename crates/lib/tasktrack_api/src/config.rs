//! API server configuration.

use tasktrack_core::config::AuthConfig;

/// Default CORS origin (the web frontend's dev server).
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// Token signing and password hashing settings.
    pub auth: AuthConfig,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
}

impl ApiConfig {
    /// Configuration with the default bind address and CORS origin.
    pub fn new(auth: AuthConfig) -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".into(),
            auth,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.into()],
        }
    }
}
