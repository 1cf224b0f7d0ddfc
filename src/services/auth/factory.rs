/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::repos::user_repo::UserRepo;
use crate::services::auth::{AuthService, TokenIssuer, TokenValidator};

pub fn build_auth_service(config: &Config, users: Arc<dyn UserRepo>) -> Arc<AuthService> {
    let secret = config.jwt_secret.as_bytes();

    let issuer = TokenIssuer::new(
        secret,
        config.auth_issuer.clone(),
        config.access_token_ttl_seconds,
    );
    let validator = TokenValidator::new(
        secret,
        &config.auth_issuer,
        config.access_token_leeway_seconds,
    );

    Arc::new(AuthService::new(users, issuer, validator, config.bcrypt_cost))
}
