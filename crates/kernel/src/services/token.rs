//! Bearer token decoding.
//!
//! Wraps `jsonwebtoken` behind the two validation modes the kernel needs:
//! strict verification for auth-sensitive callers, lenient claim extraction
//! for access logging.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use thiserror::Error;

/// Claims mapping extracted from a token.
pub type UserInfo = Map<String, Value>;

/// How thoroughly a token is checked before its claims are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Verify the signature and reject expired tokens.
    Strict,

    /// Extract claims without enforcing signature or expiry.
    ///
    /// The result is identity-as-claimed, never authorization. Only the
    /// access log uses this mode.
    Lenient,
}

/// Token decoding errors.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed or unverifiable token")]
    Decode(#[from] jsonwebtoken::errors::Error),

    #[error("token claims are not a JSON object")]
    NotAnObject,
}

/// Bearer token decoding service (HS256).
pub struct TokenService {
    decoding_key: DecodingKey,
}

impl TokenService {
    /// Create a token service from the shared HMAC secret.
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret),
        }
    }

    /// Decode a token and return its claims mapping.
    ///
    /// Validates the signature and `exp` claim in [`ValidationMode::Strict`];
    /// skips both in [`ValidationMode::Lenient`]. The `aud` claim is never
    /// validated (this service doesn't know the expected audience).
    pub fn decode(&self, token: &str, mode: ValidationMode) -> Result<UserInfo, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        match mode {
            ValidationMode::Strict => {}
            ValidationMode::Lenient => {
                validation.insecure_disable_signature_validation();
                validation.validate_exp = false;
                validation.required_spec_claims.clear();
            }
        }

        let data = jsonwebtoken::decode::<Value>(token, &self.decoding_key, &validation)?;
        match data.claims {
            Value::Object(claims) => Ok(claims),
            _ => Err(TokenError::NotAnObject),
        }
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish()
    }
}
