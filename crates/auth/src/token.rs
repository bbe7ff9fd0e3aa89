//! Bearer token issuance and validation (HS256 JWT).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use thiserror::Error;

use crate::{Principal, TokenClaims, TokenValidationError, validate_claims};

/// Opaque bearer credential handed to clients.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encode(String),

    #[error("failed to decode token: {0}")]
    Decode(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Mints tokens for authenticated principals.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<AccessToken, TokenError>;
}

/// Resolves a presented token back to the claims it was issued with.
///
/// Must reject tampered, malformed, expired and not-yet-valid tokens.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError>;
}

/// Symmetric-key JWT issuer/validator.
#[derive(Clone)]
pub struct Hs256Jwt {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: chrono::Duration,
}

impl Hs256Jwt {
    pub fn new(secret: &[u8], ttl: chrono::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks run in `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

impl core::fmt::Debug for Hs256Jwt {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256Jwt").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl TokenIssuer for Hs256Jwt {
    fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<AccessToken, TokenError> {
        let claims = TokenClaims::for_principal(principal, now, self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map(AccessToken)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }
}

impl TokenValidator for Hs256Jwt {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &Self::validation())
            .map_err(|e| TokenError::Decode(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use subway_core::MemberId;

    fn jwt(secret: &str) -> Hs256Jwt {
        Hs256Jwt::new(secret.as_bytes(), Duration::minutes(10))
    }

    fn principal() -> Principal {
        Principal::new(MemberId::from_raw(17), "member@example.com")
    }

    #[test]
    fn issued_token_resolves_to_same_principal() {
        let jwt = jwt("test-secret");
        let now = Utc::now();
        let token = jwt.issue(&principal(), now).unwrap();

        let claims = jwt.validate(token.as_str(), now).unwrap();
        assert_eq!(claims.principal(), principal());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let now = Utc::now();
        let token = jwt("secret-a").issue(&principal(), now).unwrap();

        let err = jwt("secret-b").validate(token.as_str(), now).unwrap_err();
        assert!(matches!(err, TokenError::Decode(_)));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let jwt = jwt("test-secret");
        let now = Utc::now();
        let token = jwt.issue(&principal(), now).unwrap();

        let other = Principal::new(MemberId::from_raw(18), "member@example.com");
        let forged_payload = jwt.issue(&other, now).unwrap();

        // Splice the other token's payload onto the original signature.
        let mut parts: Vec<&str> = token.as_str().split('.').collect();
        let forged: Vec<&str> = forged_payload.as_str().split('.').collect();
        parts[1] = forged[1];
        let tampered = parts.join(".");

        assert!(jwt.validate(&tampered, now).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let jwt = jwt("test-secret");
        let issued = Utc::now() - Duration::minutes(30);
        let token = jwt.issue(&principal(), issued).unwrap();

        let err = jwt.validate(token.as_str(), Utc::now()).unwrap_err();
        assert_eq!(err, TokenError::Claims(TokenValidationError::Expired));
    }

    #[test]
    fn garbage_is_rejected() {
        let jwt = jwt("test-secret");
        assert!(jwt.validate("not-a-token", Utc::now()).is_err());
        assert!(jwt.validate("", Utc::now()).is_err());
    }

    #[test]
    fn debug_output_hides_token() {
        let token = jwt("test-secret").issue(&principal(), Utc::now()).unwrap();
        assert_eq!(format!("{token:?}"), "AccessToken(<redacted>)");
    }
}
