//! Configuration loading and representation.
//!
//! Everything comes from environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `BIND_ADDR` | `0.0.0.0:8080` | Listen address |
//! | `JWT_SECRET` | insecure dev secret | HS256 signing key |
//! | `TOKEN_TTL_SECS` | `3600` | Access token lifetime |
//! | `AUTH_SCHEMES` | `token,session` | Enabled request authentication schemes, in resolution order |
//! | `USE_PERSISTENT_STORES` | `false` | `true` selects Postgres (`DATABASE_URL` required) |

use std::net::SocketAddr;

use thiserror::Error;

use subway_auth::AuthScheme;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be set: {reason}")]
    Missing { key: &'static str, reason: &'static str },

    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Where stations and members live.
#[derive(Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Postgres { database_url: String },
}

impl core::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InMemory => f.write_str("InMemory"),
            Self::Postgres { .. } => f.write_str("Postgres { database_url: <redacted> }"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub auth_schemes: Vec<AuthScheme>,
    pub storage: StorageConfig,
}

impl core::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("auth_schemes", &self.auth_schemes)
            .field("storage", &self.storage)
            .finish()
    }
}

impl AppConfig {
    /// In-memory configuration with both auth schemes enabled (tests/dev).
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            token_ttl: chrono::Duration::hours(1),
            auth_schemes: vec![AuthScheme::Token, AuthScheme::Session],
            storage: StorageConfig::InMemory,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind_addr = match lookup("BIND_ADDR") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::Invalid {
                key: "BIND_ADDR",
                message: format!("{e}"),
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 8080)),
        };

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            Some(_) => {
                return Err(ConfigError::Invalid {
                    key: "JWT_SECRET",
                    message: "must not be empty".to_string(),
                });
            }
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let token_ttl = match lookup("TOKEN_TTL_SECS") {
            Some(raw) => {
                let secs: i64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                    key: "TOKEN_TTL_SECS",
                    message: format!("{e}"),
                })?;
                if secs <= 0 {
                    return Err(ConfigError::Invalid {
                        key: "TOKEN_TTL_SECS",
                        message: format!("must be positive, got {secs}"),
                    });
                }
                chrono::Duration::seconds(secs)
            }
            None => chrono::Duration::hours(1),
        };

        let auth_schemes = match lookup("AUTH_SCHEMES") {
            Some(raw) => parse_schemes(&raw)?,
            None => vec![AuthScheme::Token, AuthScheme::Session],
        };

        let use_persistent = lookup("USE_PERSISTENT_STORES")
            .map(|raw| raw.trim().parse::<bool>())
            .transpose()
            .map_err(|e| ConfigError::Invalid {
                key: "USE_PERSISTENT_STORES",
                message: format!("{e}"),
            })?
            .unwrap_or(false);

        let storage = if use_persistent {
            let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing {
                key: "DATABASE_URL",
                reason: "USE_PERSISTENT_STORES=true",
            })?;
            StorageConfig::Postgres { database_url }
        } else {
            StorageConfig::InMemory
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            auth_schemes,
            storage,
        })
    }
}

fn parse_schemes(raw: &str) -> Result<Vec<AuthScheme>, ConfigError> {
    let mut schemes = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let scheme: AuthScheme = part.parse().map_err(|message| ConfigError::Invalid {
            key: "AUTH_SCHEMES",
            message,
        })?;
        if !schemes.contains(&scheme) {
            schemes.push(scheme);
        }
    }
    if schemes.is_empty() {
        return Err(ConfigError::Invalid {
            key: "AUTH_SCHEMES",
            message: "at least one scheme is required".to_string(),
        });
    }
    Ok(schemes)
}
