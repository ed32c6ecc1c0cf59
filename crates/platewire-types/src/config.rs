//! Server configuration, loaded from `config.toml` in the data directory.

use serde::{Deserialize, Serialize};

/// Top-level server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host the server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the server binds to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Number of messages sent in the history backlog on a new connection.
    #[serde(default = "default_replay_limit")]
    pub replay_limit: u32,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// Access token settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 signing secret for access tokens.
    #[serde(default = "default_secret")]
    pub secret: String,

    /// Lifetime of tokens minted by `platewire token`.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
}

impl AuthConfig {
    /// Placeholder secret used when no config file overrides it. The server
    /// warns loudly when this is in effect.
    pub const DEV_SECRET: &'static str = "platewire-dev-secret";
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            replay_limit: default_replay_limit(),
            auth: AuthConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            token_ttl_secs: default_token_ttl(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_replay_limit() -> u32 {
    50
}

fn default_secret() -> String {
    AuthConfig::DEV_SECRET.to_string()
}

fn default_token_ttl() -> i64 {
    86_400
}
