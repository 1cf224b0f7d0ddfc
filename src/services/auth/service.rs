use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::error::AppError;
use crate::repos::error::RepoError;
use crate::repos::user_repo::{UserRecord, UserRepo};
use crate::services::auth::{
    password::{self, MAX_PASSWORD_BYTES},
    role::Role,
    token_issuer::TokenIssuer,
    token_validator::TokenValidator,
};

/// Service that orchestrates registration, login and per-request
/// credential checks over a pluggable credential store.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepo>,
    issuer: TokenIssuer,
    validator: TokenValidator,
    bcrypt_cost: u32,
    // Hashed once at the configured cost; unknown users are verified against
    // it so both failure paths pay for one bcrypt check.
    dummy_hash: Arc<OnceCell<String>>,
}

const DUMMY_PASSWORD: &str = "person-auth-api-dummy-password";

/// Service-level return type to keep handlers thin.
#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: u64,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepo>,
        issuer: TokenIssuer,
        validator: TokenValidator,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            issuer,
            validator,
            bcrypt_cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Persist a new credential record with a salted hash.
    pub async fn register(
        &self,
        username: &str,
        raw_password: &str,
        role: Role,
    ) -> Result<UserRecord, AppError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AppError::bad_request("INVALID_USERNAME", "username is required"));
        }
        if raw_password.is_empty() {
            return Err(AppError::bad_request("INVALID_PASSWORD", "password is required"));
        }
        if raw_password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::bad_request(
                "INVALID_PASSWORD",
                format!("password must be <= {MAX_PASSWORD_BYTES} bytes"),
            ));
        }

        let hash = password::hash_password(raw_password, self.bcrypt_cost).await?;
        let record = self
            .users
            .create(username, &hash, role)
            .await
            .map_err(|e| match e {
                RepoError::Conflict => {
                    AppError::conflict("USERNAME_TAKEN", "username already registered")
                }
                other => other.into(),
            })?;

        info!(username = %record.username, role = %record.role, "user registered");
        Ok(record)
    }

    /// Verify credentials and issue a token. Unknown user and wrong password
    /// are indistinguishable to the caller.
    pub async fn login(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Result<IssuedToken, AppError> {
        let user = self
            .verify_credentials(username, raw_password)
            .await?
            .ok_or(AppError::Unauthorized)?;

        let token = self.issuer.issue(&user.username, user.role)?;
        info!(username = %user.username, role = %user.role, "token issued");

        Ok(IssuedToken {
            token,
            expires_in: self.issuer.ttl_seconds(),
        })
    }

    /// `Ok(None)` when the user is unknown or the password does not match.
    pub async fn verify_credentials(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| password::hash_password(DUMMY_PASSWORD, self.bcrypt_cost))
                .await?;
            let _ = password::verify_password(raw_password, dummy).await?;
            warn!(username, "credential check failed: unknown user");
            return Ok(None);
        };

        if !password::verify_password(raw_password, &user.password_hash).await? {
            warn!(username, "credential check failed: bad password");
            return Ok(None);
        }

        Ok(Some(user))
    }

    /// Resolve a bearer token to its credential record.
    ///
    /// `None` when the token is unreadable, the subject no longer exists, or
    /// the validator rejects it for that subject.
    pub async fn authenticate_bearer(&self, token: &str) -> Option<UserRecord> {
        let username = match self.validator.extract_username(token) {
            Ok(username) => username,
            Err(err) => {
                warn!(error = %err, "bearer token rejected");
                return None;
            }
        };

        let user = match self.users.find_by_username(&username).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(username = %username, "bearer token subject not found");
                return None;
            }
            Err(err) => {
                warn!(
                    error = %err,
                    backend = self.users.backend_name(),
                    "credential lookup failed"
                );
                return None;
            }
        };

        self.validator
            .is_token_valid(token, &user.username)
            .then_some(user)
    }

    /// HTTP Basic: resolve username/password to the credential record.
    pub async fn authenticate_basic(
        &self,
        username: &str,
        raw_password: &str,
    ) -> Option<UserRecord> {
        match self.verify_credentials(username, raw_password).await {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "basic credential check failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::user_repo::MemoryUserRepo;

    const SECRET: &[u8] = b"service-test-secret-service-test-secret";

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryUserRepo::new()),
            TokenIssuer::new(SECRET, "test".into(), 3600),
            TokenValidator::new(SECRET, "test", 0),
            4,
        )
    }

    #[tokio::test]
    async fn register_then_login_issues_token_for_subject() {
        let auth = service();
        auth.register("admin", "admin123", Role::Admin).await.unwrap();

        let issued = auth.login("admin", "admin123").await.unwrap();
        assert!(!issued.token.is_empty());
        assert_eq!(issued.expires_in, 3600);
        let claims = auth.validator().decode(&issued.token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn stored_password_is_hashed() {
        let auth = service();
        let record = auth.register("user", "1234", Role::User).await.unwrap();
        assert_ne!(record.password_hash, "1234");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_unauthorized() {
        let auth = service();
        auth.register("user", "1234", Role::User).await.unwrap();

        assert!(matches!(
            auth.login("user", "4321").await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            auth.login("ghost", "1234").await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let auth = service();
        auth.register("user", "1234", Role::User).await.unwrap();
        let err = auth.register("user", "other", Role::Admin).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { code: "USERNAME_TAKEN", .. }));
    }

    #[tokio::test]
    async fn username_is_stored_trimmed() {
        let auth = service();
        let record = auth.register("  admin ", "admin123", Role::Admin).await.unwrap();
        assert_eq!(record.username, "admin");

        let err = auth.register("admin", "other", Role::User).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { code: "USERNAME_TAKEN", .. }));
        assert!(auth.login("admin", "admin123").await.is_ok());
    }

    #[tokio::test]
    async fn unknown_user_still_runs_a_bcrypt_check() {
        let auth = service();
        assert!(!auth.dummy_hash.initialized());

        assert!(auth.verify_credentials("ghost", "pw").await.unwrap().is_none());
        let dummy = auth.dummy_hash.get().unwrap();
        assert!(dummy.starts_with("$2"));
        // cost is carried in the hash prefix, e.g. "$2b$04$"
        assert!(dummy.contains("$04$"));
    }

    #[tokio::test]
    async fn blank_fields_are_bad_requests() {
        let auth = service();
        assert!(matches!(
            auth.register(" ", "pw", Role::User).await,
            Err(AppError::BadRequest { .. })
        ));
        assert!(matches!(
            auth.register("u", "", Role::User).await,
            Err(AppError::BadRequest { .. })
        ));
        let long = "x".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(matches!(
            auth.register("u", &long, Role::User).await,
            Err(AppError::BadRequest { .. })
        ));
    }

    #[tokio::test]
    async fn bearer_for_deleted_or_unknown_subject_is_rejected() {
        let auth = service();
        // signed correctly, but nobody named "ghost" was ever registered
        let token = TokenIssuer::new(SECRET, "test".into(), 3600)
            .issue("ghost", Role::Admin)
            .unwrap();
        assert!(auth.authenticate_bearer(&token).await.is_none());
    }

    #[tokio::test]
    async fn bearer_and_basic_resolve_the_same_record() {
        let auth = service();
        auth.register("admin", "admin123", Role::Admin).await.unwrap();
        let issued = auth.login("admin", "admin123").await.unwrap();

        let via_bearer = auth.authenticate_bearer(&issued.token).await.unwrap();
        let via_basic = auth.authenticate_basic("admin", "admin123").await.unwrap();
        assert_eq!(via_bearer, via_basic);
        assert!(auth.authenticate_basic("admin", "nope").await.is_none());
    }
}
