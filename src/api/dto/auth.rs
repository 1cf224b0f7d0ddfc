/*
 * Responsibility
 * - /auth 系の request/response DTO
 * - validation (形式チェック) 用の validate()
 */
use serde::{Deserialize, Serialize};

use crate::services::auth::Role;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<Role, &'static str> {
        if self.username.trim().is_empty() {
            return Err("username is required");
        }
        if self.password.is_empty() {
            return Err("password is required");
        }
        self.role
            .parse::<Role>()
            .map_err(|_| "role must be USER or ADMIN")
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    /// Always "Bearer"
    pub token_type: &'static str,
    /// Seconds until expiry.
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub username: String,
    pub role: Role,
    pub authorities: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(username: &str, password: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: password.into(),
            role: role.into(),
        }
    }

    #[test]
    fn validate_returns_parsed_role() {
        assert_eq!(req("admin", "admin123", "admin").validate(), Ok(Role::Admin));
    }

    #[test]
    fn validate_rejects_blank_and_unknown() {
        assert!(req("", "pw", "USER").validate().is_err());
        assert!(req("u", "", "USER").validate().is_err());
        assert!(req("u", "pw", "ROOT").validate().is_err());
    }
}
