//! HTTP server and client-side endpoints.

use serde::{Deserialize, Serialize};

fn default_bind() -> String {
    String::from("127.0.0.1:8787")
}

fn default_server_url() -> String {
    String::from("http://127.0.0.1:8787")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Socket address `phub serve` listens on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Externally reachable base URL of this server, used to build
    /// `/download` links handed to the local agent. Empty means
    /// `client.server_url`.
    #[serde(default)]
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            public_url: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Base URL of the Plughub server the CLI publishes through.
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
        }
    }
}
