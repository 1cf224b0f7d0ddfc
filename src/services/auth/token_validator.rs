use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;
use tracing::debug;

use crate::services::auth::{claims::TokenClaims, role::Role};

/// Largest accepted clock-skew allowance.
pub const MAX_LEEWAY_SECONDS: u64 = 300;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("empty '{0}' claim")]
    EmptyClaim(&'static str),
}

/// HS256 access-token verifier.
///
/// `jsonwebtoken::Validation` checks signature, algorithm, `exp` and `iss`.
#[derive(Clone)]
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenValidator")
            .field("validation", &self.validation)
            .finish()
    }
}

impl TokenValidator {
    /// `leeway_seconds` is capped at [`MAX_LEEWAY_SECONDS`].
    pub fn new(secret: &[u8], issuer: &str, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = leeway_seconds.min(MAX_LEEWAY_SECONDS);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Verify and decode a token.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let data =
            jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?;

        if data.claims.sub.trim().is_empty() {
            return Err(TokenError::EmptyClaim("sub"));
        }

        Ok(data.claims)
    }

    pub fn extract_username(&self, token: &str) -> Result<String, TokenError> {
        self.decode(token).map(|c| c.sub)
    }

    pub fn extract_role(&self, token: &str) -> Result<Role, TokenError> {
        self.decode(token).map(|c| c.role)
    }

    /// Signature verifies, subject equals `expected_username`, and now < exp.
    ///
    /// Never fails: malformed, foreign or expired tokens are simply invalid.
    pub fn is_token_valid(&self, token: &str, expected_username: &str) -> bool {
        self.is_token_valid_at(token, expected_username, chrono::Utc::now().timestamp())
    }

    fn is_token_valid_at(&self, token: &str, expected_username: &str, now: i64) -> bool {
        match self.decode(token) {
            Ok(claims) => {
                let deadline = i64::try_from(self.validation.leeway)
                    .ok()
                    .and_then(|leeway| claims.exp.checked_add(leeway));
                claims.sub == expected_username && deadline.is_some_and(|d| now < d)
            }
            Err(err) => {
                debug!(error = %err, "token rejected");
                false
            }
        }
    }
}
