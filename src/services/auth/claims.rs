use serde::{Deserialize, Serialize};

use crate::services::auth::role::Role;

/// Access token claims.
///
/// - `sub` is the username
/// - `role` is the clean role name (`"ADMIN"`), one per token
/// - `iat` / `exp` are unix seconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub iss: String,
    pub sub: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}
