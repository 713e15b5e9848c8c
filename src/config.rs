//! Server configuration from environment variables
//!
//! | Variable                | Default                              |
//! |-------------------------|--------------------------------------|
//! | `HOST`                  | `0.0.0.0`                            |
//! | `PORT`                  | `3000`                               |
//! | `FORM_PATHNAME`         | `form/form.json`                     |
//! | `BLOB_BACKEND`          | `vercel` if a token is set, else `memory` |
//! | `BLOB_READ_WRITE_TOKEN` | unset                                |
//! | `BLOB_API_URL`          | `https://blob.vercel-storage.com`    |
//! | `BLOB_PUBLIC_BASE_URL`  | `memory://blob`                      |
//! | `FORM_WRITE_TOKEN`      | unset (writes are open)              |

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::document::DEFAULT_FORM_PATHNAME;

const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BLOB_API_URL: &str = "https://blob.vercel-storage.com";
pub const DEFAULT_MEMORY_BASE_URL: &str = "memory://blob";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name} value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("BLOB_BACKEND=vercel requires BLOB_READ_WRITE_TOKEN")]
    MissingBlobToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobBackend {
    Vercel,
    Memory,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub form_pathname: String,
    pub blob_backend: BlobBackend,
    pub blob_token: Option<String>,
    pub blob_api_url: String,
    pub memory_base_url: String,
    pub write_token: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("form_pathname", &self.form_pathname)
            .field("blob_backend", &self.blob_backend)
            .field("blob_token", &self.blob_token.as_ref().map(|_| "<redacted>"))
            .field("blob_api_url", &self.blob_api_url)
            .field("memory_base_url", &self.memory_base_url)
            .field("write_token", &self.write_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let host = match var("HOST") {
            Some(raw) => raw.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "HOST",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let port = match var("PORT") {
            Some(raw) => raw.parse().map_err(|e: std::num::ParseIntError| ConfigError::Invalid {
                name: "PORT",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let blob_token = var("BLOB_READ_WRITE_TOKEN");
        let blob_backend = match var("BLOB_BACKEND").map(|v| v.to_ascii_lowercase()) {
            Some(v) if v == "vercel" => BlobBackend::Vercel,
            Some(v) if v == "memory" => BlobBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "BLOB_BACKEND",
                    value: other,
                    reason: "expected \"vercel\" or \"memory\"".to_string(),
                })
            }
            None if blob_token.is_some() => BlobBackend::Vercel,
            None => BlobBackend::Memory,
        };
        if blob_backend == BlobBackend::Vercel && blob_token.is_none() {
            return Err(ConfigError::MissingBlobToken);
        }

        Ok(Self {
            host,
            port,
            form_pathname: var("FORM_PATHNAME")
                .map(|p| p.trim_start_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_FORM_PATHNAME.to_string()),
            blob_backend,
            blob_token,
            blob_api_url: var("BLOB_API_URL").unwrap_or_else(|| DEFAULT_BLOB_API_URL.to_string()),
            memory_base_url: var("BLOB_PUBLIC_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MEMORY_BASE_URL.to_string()),
            write_token: var("FORM_WRITE_TOKEN"),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
