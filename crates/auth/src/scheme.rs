use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a request proves who it is.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// `Authorization: Bearer <token>`.
    Token,
    /// Session cookie issued by `/login/session`.
    Session,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Session => "session",
        }
    }
}

impl core::fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "token" | "bearer" => Ok(Self::Token),
            "session" | "form" => Ok(Self::Session),
            other => Err(format!("unknown auth scheme '{other}' (expected token or session)")),
        }
    }
}
