use jsonwebtoken::{Algorithm, EncodingKey, Header};
use tracing::error;
use uuid::Uuid;

use crate::error::AppError;
use crate::services::auth::{claims::TokenClaims, role::Role};

/// Longest accepted access-token lifetime (1 day).
pub const MAX_TTL_SECONDS: u64 = 24 * 60 * 60;

/// Signs HS256 access tokens with the process-wide secret.
#[derive(Clone)]
pub struct TokenIssuer {
    issuer: String,
    ttl_seconds: u64,
    encoding_key: EncodingKey,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenIssuer {
    /// `ttl_seconds` is capped at [`MAX_TTL_SECONDS`].
    pub fn new(secret: &[u8], issuer: String, ttl_seconds: u64) -> Self {
        Self {
            issuer,
            ttl_seconds: ttl_seconds.min(MAX_TTL_SECONDS),
            encoding_key: EncodingKey::from_secret(secret),
        }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Issue a token for `username` valid from now for `ttl_seconds`.
    pub fn issue(&self, username: &str, role: Role) -> Result<String, AppError> {
        self.issue_at(username, role, chrono::Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    pub fn issue_at(&self, username: &str, role: Role, now: i64) -> Result<String, AppError> {
        if username.trim().is_empty() {
            return Err(AppError::bad_request(
                "INVALID_SUBJECT",
                "username must not be empty",
            ));
        }

        let exp = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or_else(|| {
                error!(now, ttl_seconds = self.ttl_seconds, "token expiry out of range");
                AppError::Internal
            })?;

        let claims = TokenClaims {
            iss: self.issuer.clone(),
            sub: username.to_string(),
            role,
            iat: now,
            exp,
            jti: Uuid::new_v4().to_string(),
        };

        let mut header = Header::new(Algorithm::HS256);
        header.typ = Some("JWT".to_string());
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign JWT");
            AppError::Internal
        })
    }
}
